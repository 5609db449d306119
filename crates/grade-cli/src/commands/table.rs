//! Gamut table command.
//!
//! Builds the table and prints the limits of one hue row.

use crate::TableArgs;
use anyhow::{Result, bail};
use grade_ops::GamutTable;
use std::time::Instant;

pub fn run(args: TableArgs, verbose: bool) -> Result<()> {
    if !(0.0..=1.0).contains(&args.row) {
        bail!("--row must be in [0, 1], got {}", args.row);
    }

    let start = Instant::now();
    let table = GamutTable::build(args.resolution)?;
    let elapsed = start.elapsed();

    let res = table.resolution();
    let empty = table.empty_slices();
    let degenerate = table
        .cells()
        .iter()
        .filter(|cell| cell.lightness_range().span() <= 0.0)
        .count();

    println!("Gamut table {res}x{res}");
    println!("  Build time:   {:.1} ms", elapsed.as_secs_f64() * 1000.0);
    println!("  Cells:        {}", table.cells().len());
    println!("  Empty slices: {empty}");
    if verbose {
        println!("  Zero span:    {degenerate}");
    }

    let j = ((args.row * res as f64) as usize).min(res - 1);
    let hue = (j as f64 + 0.5) / res as f64;
    println!();
    println!("Row {j} (hue {hue:.4})");
    println!("  {:>8}  {:>8}  {:>8}  {:>10}", "axis1", "min L", "max L", "max C");

    let columns = args.columns.clamp(1, res);
    for k in 0..columns {
        let i = if columns == 1 { 0 } else { k * (res - 1) / (columns - 1) };
        let Some(cell) = table.cell(i, j) else {
            continue;
        };
        let axis1 = (i as f64 + 0.5) / res as f64;
        println!(
            "  {axis1:>8.4}  {:>8.4}  {:>8.4}  {:>10.4}",
            cell.min_lightness, cell.max_lightness, cell.max_chroma
        );
    }

    Ok(())
}
