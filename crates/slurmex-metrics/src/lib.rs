//! Metric aggregation for slurmex.
//!
//! Folds one snapshot of Slurm REST responses into metric records: job
//! tallies per account and user, cluster CPU/GPU figures, node inventory and
//! state counts, queue counts, scheduler diagnostics, fair-share levels and
//! per-partition figures.

pub mod aggregate;
pub mod config;
pub mod types;

pub use aggregate::{
    aggregate_accounts, aggregate_cpus, aggregate_fairshare, aggregate_gpus,
    aggregate_node_states, aggregate_nodes, aggregate_partitions, aggregate_queue,
    aggregate_scheduler, aggregate_users,
};
pub use config::{AggregateError, AggregationConfig, ErrorPolicy, Family, PlaceholderNodes};
pub use types::{
    AccountJobMetrics, AccountMetricsMap, ClusterCpuMetrics, ClusterGpuMetrics, FairShareMetrics,
    FairShareMetricsMap, JobMetrics, NodeMetrics, NodeMetricsMap, NodeStateTally,
    PartitionMetrics, PartitionMetricsMap, QueueMetrics, SchedulerMetrics, UserJobMetrics,
    UserMetricsMap,
};
