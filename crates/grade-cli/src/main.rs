//! grade - diagnostics for the LCh grading engine
//!
//! Builds gamut tables, tone curves and renders over synthetic charts, and
//! reports what the engine computed.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use grade_ops::ControlPoint;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "grade")]
#[command(author, version, about = "LCh color grading diagnostics")]
#[command(long_about = "
Runs the LCh grading engine on synthetic input and prints what it computed.

Examples:
  grade table                           # Build the 256x256 gamut table
  grade table -r 64 --row 0.33          # Smaller table, limits along one hue row
  grade curve -p 0.3,0.2,0.01 -n 16     # Lookup for a single control point
  grade render --intensity 0.5          # Grade a hue/lightness chart
  grade render --params session.json --viewport 1920x1080
  grade params > session.json           # Default settings document
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output (debug logging unless RUST_LOG is set)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Number of threads (0 = auto)
    #[arg(short = 'j', long, global = true, default_value = "0")]
    threads: usize,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the gamut boundary table and print its limits
    #[command(visible_alias = "t")]
    Table(TableArgs),

    /// Print a tone curve lookup
    #[command(visible_alias = "c")]
    Curve(CurveArgs),

    /// Grade a synthetic chart and report statistics
    #[command(visible_alias = "r")]
    Render(RenderArgs),

    /// Print the default grading settings as JSON
    Params,
}

#[derive(Args)]
struct TableArgs {
    /// Cells per axis
    #[arg(short, long, default_value = "256")]
    resolution: usize,

    /// Hue of the row to print, in [0, 1]
    #[arg(long, default_value = "0.0")]
    row: f64,

    /// Number of columns printed along the row
    #[arg(long, default_value = "16")]
    columns: usize,
}

#[derive(Args)]
struct CurveArgs {
    /// Control point as x,y,size (repeatable; defaults to the session point)
    #[arg(short, long = "point", value_parser = parse_point)]
    points: Vec<ControlPoint>,

    /// Lookup length
    #[arg(short = 'n', long, default_value = "256")]
    size: usize,

    /// Print as a JSON array
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct RenderArgs {
    /// Chart width
    #[arg(short, long, default_value = "360")]
    width: u32,

    /// Chart height
    #[arg(short = 'H', long, default_value = "200")]
    height: u32,

    /// Viewport as WxH (defaults to the chart size)
    #[arg(long, value_parser = parse_size)]
    viewport: Option<(u32, u32)>,

    /// Chroma of the chart
    #[arg(long, default_value = "0.15")]
    chroma: f64,

    /// Settings document (params + points)
    #[arg(long)]
    params: Option<PathBuf>,

    /// Override the bend intensity
    #[arg(short, long)]
    intensity: Option<f64>,

    /// Override the exposure
    #[arg(short, long)]
    exposure: Option<f64>,

    /// Derive the exposure from the chart's brightest channel
    #[arg(long)]
    auto_exposure: bool,

    /// Override the dither slider (amplitude 2^-v, 0 disables)
    #[arg(long)]
    dither: Option<f64>,

    /// Mark out-of-gamut results
    #[arg(long)]
    gamut_border: bool,

    /// Gamut table cells per axis
    #[arg(long, default_value = "256")]
    table_resolution: usize,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

fn parse_point(s: &str) -> Result<ControlPoint, String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    let [x, y, size] = parts.as_slice() else {
        return Err(format!("expected x,y,size, got '{s}'"));
    };
    let num = |v: &str| v.parse::<f64>().map_err(|e| format!("'{v}': {e}"));
    Ok(ControlPoint::new(num(*x)?, num(*y)?, num(*size)?))
}

fn parse_size(s: &str) -> Result<(u32, u32), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WxH, got '{s}'"))?;
    let w = w.trim().parse::<u32>().map_err(|e| format!("width '{w}': {e}"))?;
    let h = h.trim().parse::<u32>().map_err(|e| format!("height '{h}': {e}"))?;
    if w == 0 || h == 0 {
        return Err(format!("viewport must not be empty, got '{s}'"));
    }
    Ok((w, h))
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Configure thread pool
    if cli.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(cli.threads)
            .build_global()
            .context("Failed to configure thread pool")?;
    }

    match cli.command {
        Commands::Table(args) => commands::table::run(args, cli.verbose),
        Commands::Curve(args) => commands::curve::run(args, cli.verbose),
        Commands::Render(args) => commands::render::run(args, cli.verbose),
        Commands::Params => commands::print_default_settings(),
    }
}
