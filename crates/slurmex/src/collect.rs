//! Run every aggregator against one snapshot.

use chrono::{DateTime, Utc};
use serde::Serialize;
use slurmex_api::Snapshot;
use slurmex_metrics::{
    aggregate_accounts, aggregate_cpus, aggregate_fairshare, aggregate_gpus,
    aggregate_node_states, aggregate_nodes, aggregate_partitions, aggregate_queue,
    aggregate_scheduler, aggregate_users, AccountMetricsMap, AggregateError, AggregationConfig,
    ClusterCpuMetrics, ClusterGpuMetrics, Family, FairShareMetricsMap, NodeMetricsMap,
    NodeStateTally, PartitionMetricsMap, QueueMetrics, SchedulerMetrics, UserMetricsMap,
};

/// Metrics from one collection cycle.
///
/// A family is `None` when its inputs were missing or its aggregation failed.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Collection {
    pub accounts: Option<AccountMetricsMap>,
    pub users: Option<UserMetricsMap>,
    pub cpus: Option<ClusterCpuMetrics>,
    pub gpus: Option<ClusterGpuMetrics>,
    pub nodes: Option<NodeMetricsMap>,
    pub node_states: Option<NodeStateTally>,
    pub queue: Option<QueueMetrics>,
    pub scheduler: Option<SchedulerMetrics>,
    pub fairshare: Option<FairShareMetricsMap>,
    pub partitions: Option<PartitionMetricsMap>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failed: Vec<String>,
    pub collected_at: Option<DateTime<Utc>>,
}

impl Collection {
    fn keep<T>(&mut self, family: Family, result: Result<T, AggregateError>) -> Option<T> {
        match result {
            Ok(metrics) => Some(metrics),
            Err(e) => {
                tracing::error!("Failed to collect {} metrics: {}", family, e);
                self.failed.push(family.to_string());
                None
            }
        }
    }
}

/// Aggregate every metric family whose inputs are present in the snapshot.
pub fn collect(snapshot: &Snapshot, config: &AggregationConfig) -> Collection {
    let mut c = Collection {
        collected_at: Some(snapshot.loaded_at),
        ..Collection::default()
    };

    if let Some(jobs) = &snapshot.jobs {
        c.accounts = c.keep(Family::Accounts, aggregate_accounts(jobs, config));
        c.users = c.keep(Family::Users, aggregate_users(jobs, config));
        c.queue = c.keep(Family::Queue, aggregate_queue(jobs, config));
    }

    if let Some(nodes) = &snapshot.nodes {
        c.gpus = c.keep(Family::Gpus, aggregate_gpus(nodes, config));
        c.nodes = c.keep(Family::Nodes, aggregate_nodes(nodes, config));
        c.node_states = c.keep(Family::NodeStates, aggregate_node_states(nodes, config));
    }

    if let (Some(nodes), Some(jobs)) = (&snapshot.nodes, &snapshot.jobs) {
        c.cpus = c.keep(Family::Cpus, aggregate_cpus(nodes, jobs, config));
    }

    if let (Some(partitions), Some(nodes), Some(jobs)) =
        (&snapshot.partitions, &snapshot.nodes, &snapshot.jobs)
    {
        c.partitions = c.keep(
            Family::Partitions,
            aggregate_partitions(partitions, nodes, jobs, config),
        );
    }

    if let Some(diag) = &snapshot.diag {
        c.scheduler = Some(aggregate_scheduler(diag));
    }

    if let Some(shares) = &snapshot.shares {
        c.fairshare = c.keep(Family::FairShare, aggregate_fairshare(shares, config));
    }

    tracing::debug!(
        "Collected metrics from {:?} ({} failed)",
        snapshot.present(),
        c.failed.len()
    );
    c
}
