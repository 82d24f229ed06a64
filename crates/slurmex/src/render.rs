//! Prometheus and JSON exposition of a collection.
//!
//! Each call builds a fresh registry, so a family that failed this cycle
//! simply has no samples in the output.

use crate::collect::Collection;
use prometheus::{Encoder, Gauge, GaugeVec, Opts, Registry, TextEncoder};
use slurmex_metrics::{JobMetrics, NodeMetrics, PartitionMetrics, SchedulerMetrics};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
    #[error("Exposition is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Output format for a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Prometheus,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "prometheus" | "prom" | "text" => Ok(Self::Prometheus),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown output format: {}", other)),
        }
    }
}

/// Render a collection in the requested format.
pub fn render(collection: &Collection, format: OutputFormat) -> Result<String, RenderError> {
    match format {
        OutputFormat::Prometheus => render_prometheus(collection),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(collection)?),
    }
}

/// Registry for a single cycle.
struct Exposition {
    registry: Registry,
}

impl Exposition {
    fn new() -> Self {
        Self {
            registry: Registry::new(),
        }
    }

    fn gauge(&self, name: &str, help: &str, value: f64) -> prometheus::Result<()> {
        let gauge = Gauge::new(name, help)?;
        gauge.set(value);
        self.registry.register(Box::new(gauge))
    }

    fn gauge_vec(&self, name: &str, help: &str, labels: &[&str]) -> prometheus::Result<GaugeVec> {
        let vec = GaugeVec::new(Opts::new(name, help), labels)?;
        self.registry.register(Box::new(vec.clone()))?;
        Ok(vec)
    }

    /// One gauge with a sample per map key.
    fn keyed<T>(
        &self,
        name: &str,
        help: &str,
        label: &str,
        map: &BTreeMap<String, T>,
        value: impl Fn(&T) -> f64,
    ) -> prometheus::Result<()> {
        let vec = self.gauge_vec(name, help, &[label])?;
        for (key, metrics) in map {
            vec.with_label_values(&[key.as_str()]).set(value(metrics));
        }
        Ok(())
    }

    fn encode(&self) -> Result<String, RenderError> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

type JobField = fn(&JobMetrics) -> u64;
type NodeField = fn(&NodeMetrics) -> u64;
type PartitionField = fn(&PartitionMetrics) -> f64;

fn job_tallies(
    e: &Exposition,
    scope: &str,
    map: &BTreeMap<String, JobMetrics>,
) -> prometheus::Result<()> {
    let fields: [(&str, &str, JobField); 5] = [
        ("jobs_pending", "Pending jobs for", |m| m.pending),
        ("cpus_pending", "Pending cpus for", |m| m.pending_cpus),
        ("jobs_running", "Running jobs for", |m| m.running),
        ("cpus_running", "Running cpus for", |m| m.running_cpus),
        ("jobs_suspended", "Suspended jobs for", |m| m.suspended),
    ];
    for (suffix, help, value) in fields {
        e.keyed(
            &format!("slurm_{}_{}", scope, suffix),
            &format!("{} {}", help, scope),
            scope,
            map,
            |m| value(m) as f64,
        )?;
    }
    Ok(())
}

fn node_inventory(e: &Exposition, nodes: &BTreeMap<String, NodeMetrics>) -> prometheus::Result<()> {
    let fields: [(&str, &str, NodeField); 6] = [
        ("slurm_node_cpu_alloc", "Allocated CPUs per node", |m| m.cpu_alloc),
        ("slurm_node_cpu_idle", "Idle CPUs per node", |m| m.cpu_idle),
        ("slurm_node_cpu_other", "Other CPUs per node", |m| m.cpu_other),
        ("slurm_node_cpu_total", "Total CPUs per node", |m| m.cpu_total),
        ("slurm_node_mem_alloc", "Allocated memory per node", |m| m.mem_alloc),
        ("slurm_node_mem_total", "Total memory per node", |m| m.mem_total),
    ];
    for (name, help, value) in fields {
        let vec = e.gauge_vec(name, help, &["node", "status"])?;
        for (node, m) in nodes {
            vec.with_label_values(&[node.as_str(), m.status.as_str()])
                .set(value(m) as f64);
        }
    }
    Ok(())
}

fn partition_figures(
    e: &Exposition,
    partitions: &BTreeMap<String, PartitionMetrics>,
) -> prometheus::Result<()> {
    let fields: [(&str, &str, PartitionField); 5] = [
        ("cpus_allocated", "Allocated CPUs for partition", |m| m.cpus_allocated as f64),
        ("cpus_idle", "Idle CPUs for partition", |m| m.cpus_idle as f64),
        ("cpus_other", "Other CPUs for partition", |m| m.cpus_other as f64),
        ("cpus_total", "Total CPUs for partition", |m| m.cpus_total as f64),
        ("jobs_pending", "Pending jobs for partition", |m| m.jobs_pending as f64),
    ];
    for (suffix, help, value) in fields {
        let name = format!("slurm_partition_{}", suffix);
        e.keyed(&name, help, "partition", partitions, value)?;
    }
    Ok(())
}

fn scheduler_stats(e: &Exposition, s: &SchedulerMetrics) -> prometheus::Result<()> {
    let stats = [
        ("threads", "number of scheduler threads", s.threads),
        ("queue_size", "length of the scheduler queue", s.queue_size),
        ("dbd_queue_size", "length of the DBD agent queue", s.dbd_queue_size),
        ("last_cycle", "scheduler last cycle time in (microseconds)", s.last_cycle),
        ("mean_cycle", "scheduler mean cycle time in (microseconds)", s.mean_cycle),
        ("cycle_per_minute", "number scheduler cycles per minute", s.cycle_per_minute),
        (
            "backfill_last_cycle",
            "scheduler backfill last cycle time in (microseconds)",
            s.backfill_last_cycle,
        ),
        (
            "backfill_mean_cycle",
            "scheduler backfill mean cycle time in (microseconds)",
            s.backfill_mean_cycle,
        ),
        ("backfill_depth_mean", "scheduler backfill mean depth", s.backfill_depth_mean),
        (
            "backfilled_jobs_since_start_total",
            "number of jobs started thanks to backfilling since last slurm start",
            s.total_backfilled_jobs_since_start,
        ),
        (
            "backfilled_jobs_since_cycle_total",
            "number of jobs started thanks to backfilling since last time stats where reset",
            s.total_backfilled_jobs_since_cycle,
        ),
        (
            "backfilled_heterogeneous_total",
            "number of heterogeneous job components started thanks to backfilling",
            s.total_backfilled_heterogeneous,
        ),
    ];
    for (suffix, help, value) in stats {
        e.gauge(
            &format!("slurm_scheduler_{}", suffix),
            &format!("Information provided by the Slurm sdiag command, {}", help),
            value as f64,
        )?;
    }
    Ok(())
}

/// Render a collection as Prometheus text format.
///
/// Families come out sorted by name and samples by label value.
pub fn render_prometheus(c: &Collection) -> Result<String, RenderError> {
    let e = Exposition::new();

    if let Some(accounts) = &c.accounts {
        job_tallies(&e, "account", accounts)?;
    }

    if let Some(users) = &c.users {
        job_tallies(&e, "user", users)?;
    }

    if let Some(cpus) = &c.cpus {
        e.gauge("slurm_cpus_alloc", "Allocated CPUs", cpus.alloc as f64)?;
        e.gauge("slurm_cpus_idle", "Idle CPUs", cpus.idle as f64)?;
        e.gauge("slurm_cpus_other", "Mix CPUs", cpus.other as f64)?;
        e.gauge("slurm_cpus_total", "Total CPUs", cpus.total as f64)?;
    }

    if let Some(gpus) = &c.gpus {
        e.gauge("slurm_gpus_alloc", "Allocated GPUs", gpus.alloc as f64)?;
        e.gauge("slurm_gpus_idle", "Idle GPUs", gpus.idle as f64)?;
        e.gauge("slurm_gpus_other", "Other GPUs", gpus.other as f64)?;
        e.gauge("slurm_gpus_total", "Total GPUs", gpus.total as f64)?;
        e.gauge("slurm_gpus_utilization", "Total GPU utilization", gpus.utilization)?;
    }

    if let Some(nodes) = &c.nodes {
        node_inventory(&e, nodes)?;
    }

    if let Some(t) = &c.node_states {
        let states = [
            ("alloc", "Allocated nodes", t.alloc),
            ("comp", "Completing nodes", t.comp),
            ("down", "Down nodes", t.down),
            ("drain", "Drain nodes", t.drain),
            ("err", "Error nodes", t.err),
            ("fail", "Fail nodes", t.fail),
            ("idle", "Idle nodes", t.idle),
            ("maint", "Maint nodes", t.maint),
            ("mix", "Mix nodes", t.mix),
            ("resv", "Reserved nodes", t.resv),
        ];
        for (state, help, count) in states {
            e.gauge(&format!("slurm_nodes_{}", state), help, count as f64)?;
        }
    }

    if let Some(q) = &c.queue {
        let counts = [
            ("pending", "Pending jobs in queue", q.pending),
            ("pending_dependency", "Pending jobs because of dependency in queue", q.pending_dep),
            ("running", "Running jobs in the cluster", q.running),
            ("suspended", "Suspended jobs in the cluster", q.suspended),
            ("cancelled", "Cancelled jobs in the cluster", q.cancelled),
            ("completing", "Completing jobs in the cluster", q.completing),
            ("completed", "Completed jobs in the cluster", q.completed),
            ("configuring", "Configuring jobs in the cluster", q.configuring),
            ("failed", "Number of failed jobs", q.failed),
            ("timeout", "Jobs stopped by timeout", q.timeout),
            ("preempted", "Number of preempted jobs", q.preempted),
            ("node_fail", "Number of jobs stopped due to node fail", q.node_fail),
            ("out_of_memory", "Jobs stopped for running out of memory", q.out_of_memory),
        ];
        for (state, help, count) in counts {
            e.gauge(&format!("slurm_queue_{}", state), help, count as f64)?;
        }
    }

    if let Some(s) = &c.scheduler {
        scheduler_stats(&e, s)?;
    }

    if let Some(fairshare) = &c.fairshare {
        let help = "FairShare for account";
        e.keyed("slurm_account_fairshare", help, "account", fairshare, |m| m.fairshare)?;
    }

    if let Some(partitions) = &c.partitions {
        partition_figures(&e, partitions)?;
    }

    if let Some(at) = c.collected_at {
        e.gauge(
            "slurm_exporter_last_collection_timestamp_seconds",
            "Unix time the snapshot was loaded",
            at.timestamp() as f64,
        )?;
    }

    e.encode()
}

#[cfg(test)]
mod tests {
    use super::*;
    use slurmex_metrics::{ClusterCpuMetrics, FairShareMetrics};

    #[test]
    fn test_render_cluster_gauges() {
        let c = Collection {
            cpus: Some(ClusterCpuMetrics {
                alloc: 4,
                idle: 2,
                other: -1,
                total: 5,
            }),
            ..Collection::default()
        };

        let out = render_prometheus(&c).unwrap();
        assert!(out.contains("# HELP slurm_cpus_alloc Allocated CPUs\n"));
        assert!(out.contains("# TYPE slurm_cpus_alloc gauge\n"));
        assert!(out.contains("slurm_cpus_alloc 4\n"));
        assert!(out.contains("slurm_cpus_other -1\n"));
        assert!(!out.contains("slurm_gpus"));
    }

    #[test]
    fn test_render_keyed_in_key_order() {
        let mut accounts = BTreeMap::new();
        accounts.insert(
            "zoo".to_string(),
            JobMetrics {
                running: 2,
                ..JobMetrics::default()
            },
        );
        accounts.insert("abc".to_string(), JobMetrics::default());
        let c = Collection {
            accounts: Some(accounts),
            ..Collection::default()
        };

        let out = render_prometheus(&c).unwrap();
        let abc = out.find("slurm_account_jobs_running{account=\"abc\"} 0").unwrap();
        let zoo = out.find("slurm_account_jobs_running{account=\"zoo\"} 2").unwrap();
        assert!(abc < zoo);
    }

    #[test]
    fn test_render_node_labels() {
        let mut nodes = BTreeMap::new();
        nodes.insert(
            "n01".to_string(),
            NodeMetrics {
                cpu_total: 32,
                status: "mix|drain".to_string(),
                ..NodeMetrics::default()
            },
        );
        let c = Collection {
            nodes: Some(nodes),
            ..Collection::default()
        };

        let out = render_prometheus(&c).unwrap();
        assert!(out.contains("slurm_node_cpu_total{node=\"n01\",status=\"mix|drain\"} 32\n"));
    }

    #[test]
    fn test_render_escapes_label_values() {
        let mut fairshare = BTreeMap::new();
        fairshare.insert("a\"b".to_string(), FairShareMetrics { fairshare: 0.5 });
        let c = Collection {
            fairshare: Some(fairshare),
            ..Collection::default()
        };

        let out = render_prometheus(&c).unwrap();
        assert!(out.contains("slurm_account_fairshare{account=\"a\\\"b\"} 0.5\n"));
    }

    #[test]
    fn test_render_json() {
        let c = Collection {
            cpus: Some(ClusterCpuMetrics::default()),
            ..Collection::default()
        };
        let out = render(&c, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["cpus"]["total"], 0);
        assert!(value["gpus"].is_null());
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("Prometheus".parse::<OutputFormat>().unwrap(), OutputFormat::Prometheus);
        assert!("xml".parse::<OutputFormat>().is_err());
    }
}
