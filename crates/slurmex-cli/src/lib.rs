//! CLI argument parsing for slurmex.

use camino::Utf8PathBuf;
use clap::Parser;
use slurmex_metrics::{AggregationConfig, PlaceholderNodes};
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "slurmex")]
#[command(about = "Turn Slurm REST snapshots into Prometheus metrics")]
pub struct Args {
    /// Snapshot directory holding jobs.json, nodes.json, partitions.json, diag.json, shares.json
    #[arg(default_value = ".")]
    pub dir: Utf8PathBuf,

    /// Where to write the metrics ("-" for stdout)
    #[arg(short, long, default_value = "-")]
    pub output: String,

    /// Output format (prometheus or json)
    #[arg(long, default_value = "prometheus")]
    pub format: String,

    /// Collection interval in seconds
    #[arg(long, default_value = "30")]
    pub interval: u64,

    /// Collect a single time and exit
    #[arg(long)]
    pub once: bool,

    /// TRES name counted as a GPU
    #[arg(long, default_value = "gres/gpu")]
    pub gpu_tres: String,

    /// Separator between node states in the node status label
    #[arg(long, default_value = "|")]
    pub state_delimiter: String,

    /// Nodes reporting exactly this many CPUs are left out of cluster CPU totals
    #[arg(long, default_value = "1")]
    pub placeholder_cpus: u32,

    /// Count every node in cluster CPU totals
    #[arg(long)]
    pub no_placeholder_filter: bool,

    /// Abort account and user metrics on the first bad job instead of skipping it
    #[arg(long)]
    pub strict: bool,

    /// Log level filter (overridden by RUST_LOG)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Args {
    /// Aggregation settings selected on the command line.
    pub fn aggregation_config(&self) -> AggregationConfig {
        let base = if self.strict {
            AggregationConfig::strict()
        } else {
            AggregationConfig::default()
        };
        let placeholder_nodes = if self.no_placeholder_filter {
            PlaceholderNodes::Disabled
        } else {
            PlaceholderNodes::CpuCount(self.placeholder_cpus)
        };

        AggregationConfig {
            placeholder_nodes,
            gpu_tres: self.gpu_tres.clone(),
            state_delimiter: self.state_delimiter.clone(),
            ..base
        }
    }

    /// Output path, or None for stdout.
    pub fn output_path(&self) -> Option<Utf8PathBuf> {
        match self.output.as_str() {
            "-" => None,
            path => Some(Utf8PathBuf::from(path)),
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slurmex_metrics::{ErrorPolicy, Family};

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["slurmex"]);
        assert_eq!(args.dir, Utf8PathBuf::from("."));
        assert!(args.output_path().is_none());
        assert_eq!(args.interval(), Duration::from_secs(30));

        let config = args.aggregation_config();
        assert_eq!(config.placeholder_nodes, PlaceholderNodes::CpuCount(1));
        assert_eq!(config.gpu_tres, "gres/gpu");
        assert_eq!(config.policy(Family::Accounts), ErrorPolicy::SkipAndLog);
    }

    #[test]
    fn test_flags() {
        let args = Args::parse_from([
            "slurmex",
            "/var/lib/slurmex",
            "--output",
            "/var/lib/node_exporter/slurm.prom",
            "--no-placeholder-filter",
            "--strict",
            "--state-delimiter",
            ",",
        ]);
        assert_eq!(
            args.output_path(),
            Some(Utf8PathBuf::from("/var/lib/node_exporter/slurm.prom"))
        );

        let config = args.aggregation_config();
        assert_eq!(config.placeholder_nodes, PlaceholderNodes::Disabled);
        assert_eq!(config.state_delimiter, ",");
        assert_eq!(config.policy(Family::Users), ErrorPolicy::FailFast);
    }
}
