//! Periodic collection service.

use crate::collect::collect;
use crate::output::emit;
use crate::render::{render, OutputFormat};
use camino::Utf8PathBuf;
use slurmex_api::Snapshot;
use slurmex_metrics::AggregationConfig;
use std::time::Duration;
use tokio::time::interval;

type CycleResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Configuration for the collector service.
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// Directory holding the saved REST responses.
    pub dir: Utf8PathBuf,
    /// Where to write the exposition; stdout when `None`.
    pub output: Option<Utf8PathBuf>,
    pub format: OutputFormat,
    pub interval: Duration,
    pub aggregation: AggregationConfig,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            dir: Utf8PathBuf::from("."),
            output: None,
            format: OutputFormat::Prometheus,
            interval: Duration::from_secs(30),
            aggregation: AggregationConfig::default(),
        }
    }
}

/// Loads a snapshot, aggregates it and writes the result, once per tick.
pub struct CollectorService {
    config: CollectorConfig,
}

impl CollectorService {
    pub fn new(config: CollectorConfig) -> Self {
        Self { config }
    }

    /// Run a single collection cycle.
    pub async fn run_once(&self) -> CycleResult {
        let snapshot = Snapshot::load(&self.config.dir)?;
        let collection = collect(&snapshot, &self.config.aggregation);
        let rendered = render(&collection, self.config.format)?;

        let output = self.config.output.as_deref();
        emit(output, &rendered)?;

        match output {
            Some(path) => tracing::info!(
                "Wrote metrics for {} endpoints to {}",
                snapshot.present().len(),
                path
            ),
            None => tracing::debug!("Wrote metrics to stdout"),
        }
        Ok(())
    }

    /// Collect on every tick until Ctrl-C.
    pub async fn run(self) {
        let mut ticker = interval(self.config.interval);
        tracing::info!(
            "Collecting from {} every {}s",
            self.config.dir,
            self.config.interval.as_secs()
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.run_once().await {
                        tracing::error!("Error collecting from {}: {}", self.config.dir, e);
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Shutting down");
                    return;
                }
            }
        }
    }
}
