//! BS Lab CLI
//!
//! Reads a compute request (JSON file or stdin), prints the result JSON on
//! stdout and optionally writes each heatmap as CSV. Logs go to stderr.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Once;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use bs_lab::prelude::*;

#[derive(Parser)]
#[command(name = "bs_lab")]
#[command(about = "Black-Scholes prices, Greeks, implied vol and metric heatmaps")]
struct Args {
    /// Request JSON file ("-" or absent reads stdin)
    #[arg(long, short)]
    request: Option<PathBuf>,

    /// Engine config JSON file
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Report vega and rho per 1% and theta per day
    #[arg(long)]
    display_units: bool,

    /// Run the built-in three ticker request instead of reading one
    #[arg(long)]
    demo: bool,

    /// Days to expiry for --demo
    #[arg(long, default_value = "30")]
    days: f64,

    /// Directory for heatmap CSV files
    #[arg(long)]
    csv_dir: Option<PathBuf>,

    /// Pretty-print the result JSON
    #[arg(long)]
    pretty: bool,
}

static INIT_LOGGING: Once = Once::new();

fn init_logging() {
    INIT_LOGGING.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_target(false)
            .with_writer(io::stderr)
            .init();
    });
}

fn main() {
    init_logging();
    let args = Args::parse();

    if let Err(e) = run(&args) {
        error!("{}", e);
        process::exit(1);
    }
}

fn run(args: &Args) -> LabResult<()> {
    let mut config = match &args.config {
        Some(path) => EngineConfig::from_json_file(path)?,
        None => EngineConfig::default(),
    };
    if args.display_units {
        config.units = GreekUnits::Display;
    }
    let engine = ComputeEngine::new(config);

    let request = if args.demo {
        ComputeRequest::lab_default(TimeHorizon::days(args.days))
    } else {
        let payload = read_payload(args.request.as_deref())?;
        match parse_request(&payload) {
            Ok(request) => request,
            Err(failure) => return emit(&failure, args.pretty),
        }
    };

    let result = engine.compute(&request);
    emit(&result, args.pretty)?;

    for t in &result.tickers {
        info!(
            "{}: call {:.4} put {:.4} delta {:.4} iv {}",
            t.ticker,
            t.call,
            t.put,
            t.delta,
            t.iv.map_or_else(|| t.iv_status.as_str().to_string(), |v| format!("{:.4}", v))
        );
    }

    if let (Some(grids), Some(h)) = (&result.heatmap, &request.heatmap) {
        let ranges = value_ranges(grids, h.view_mode, h.scale_mode);
        for ((ticker, grid), range) in result.tickers.iter().zip(grids).zip(&ranges) {
            let (ny, nx) = grid.shape();
            match range {
                Some((lo, hi)) => info!(
                    "{} {} grid {}x{}: colour range [{:.4}, {:.4}]",
                    ticker.ticker,
                    h.metric.label(),
                    ny,
                    nx,
                    lo,
                    hi
                ),
                None => info!(
                    "{} {} grid {}x{}: no finite values",
                    ticker.ticker,
                    h.metric.label(),
                    ny,
                    nx
                ),
            }
        }

        if let Some(dir) = &args.csv_dir {
            write_csvs(dir, &result.tickers, grids, h.metric)?;
        }
    }

    Ok(())
}

/// Print the result JSON; an `error` result is also returned as an `Err`
fn emit(result: &ComputeResult, pretty: bool) -> LabResult<()> {
    let json = if pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };
    println!("{}", json);

    match &result.error {
        Some(msg) => Err(LabError::validation(msg.clone())),
        None => Ok(()),
    }
}

/// Parse a request, turning malformed JSON into an `error` result
fn parse_request(payload: &str) -> Result<ComputeRequest, ComputeResult> {
    serde_json::from_str(payload)
        .map_err(|e| ComputeResult::failure(LabError::from(e).to_string()))
}

fn read_payload(path: Option<&Path>) -> LabResult<String> {
    match path {
        Some(p) if p != Path::new("-") => Ok(fs::read_to_string(p)?),
        _ => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

fn write_csvs(
    dir: &Path,
    tickers: &[TickerResult],
    grids: &[HeatmapGrid],
    metric: Metric,
) -> LabResult<()> {
    fs::create_dir_all(dir)?;
    let metric_name = metric.label().to_lowercase().replace(' ', "_");
    for (ticker, grid) in tickers.iter().zip(grids) {
        let path = dir.join(format!("heatmap_{}_{}.csv", ticker.ticker, metric_name));
        grid.write_csv(fs::File::create(&path)?)?;
        info!("Wrote {:?}", path);
    }
    Ok(())
}
