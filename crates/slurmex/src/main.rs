//! slurmex - Prometheus metrics from Slurm REST snapshots.

mod collect;
mod output;
mod polling;
mod render;

use clap::Parser;
use miette::Result;
use polling::{CollectorConfig, CollectorService};
use render::OutputFormat;
use slurmex_cli::Args;
use tracing_subscriber::EnvFilter;

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level);

    let format: OutputFormat = args.format.parse().map_err(|e: String| miette::miette!(e))?;
    let config = CollectorConfig {
        dir: args.dir.clone(),
        output: args.output_path(),
        format,
        interval: args.interval(),
        aggregation: args.aggregation_config(),
    };
    let service = CollectorService::new(config);

    if args.once {
        service.run_once().await.map_err(|e| miette::miette!("{}", e))?;
    } else {
        service.run().await;
    }

    Ok(())
}
