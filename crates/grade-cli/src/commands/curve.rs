//! Tone curve command.

use crate::CurveArgs;
use anyhow::{Context, Result};
use grade_ops::{ControlPoint, ToneCurve};

pub fn run(args: CurveArgs, verbose: bool) -> Result<()> {
    let points = if args.points.is_empty() {
        ControlPoint::default_set()
    } else {
        args.points
    };
    let curve = ToneCurve::new(points, args.size)?;

    if args.json {
        let json = serde_json::to_string(curve.lookup()).context("Failed to serialize lookup")?;
        println!("{json}");
        return Ok(());
    }

    if verbose {
        for (i, p) in curve.points().iter().enumerate() {
            println!("point {i}: x={:.4} y={:.4} size={:.4}", p.x, p.y, p.size);
        }
    }

    let last = (curve.len() - 1) as f64;
    for (i, value) in curve.lookup().iter().enumerate() {
        println!("{i:>4}  {:.4}  {value:.6}", i as f64 / last);
    }
    Ok(())
}
