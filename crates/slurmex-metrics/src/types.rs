//! Metric records produced by the aggregators.
//!
//! All records are rebuilt from scratch every collection cycle.

use serde::Serialize;
use std::collections::BTreeMap;

/// Job tallies for one account or one user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct JobMetrics {
    pub pending: u64,
    pub pending_cpus: u64,
    pub running: u64,
    pub running_cpus: u64,
    pub suspended: u64,
}

pub type AccountJobMetrics = JobMetrics;
pub type UserJobMetrics = JobMetrics;

/// Cluster-wide CPU figures.
///
/// `other` is derived and goes negative when the idle and allocated figures
/// overshoot the counted total.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClusterCpuMetrics {
    pub alloc: i64,
    pub idle: i64,
    pub other: i64,
    pub total: i64,
}

/// Cluster-wide GPU figures.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClusterGpuMetrics {
    pub alloc: i64,
    pub idle: i64,
    /// Not derivable from TRES; always zero
    pub other: i64,
    pub total: i64,
    /// alloc / total, or 0.0 on a cluster without GPUs
    pub utilization: f64,
}

/// Inventory of a single node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NodeMetrics {
    pub mem_alloc: u64,
    pub mem_total: u64,
    pub cpu_alloc: u64,
    pub cpu_idle: u64,
    pub cpu_other: u64,
    pub cpu_total: u64,
    /// Node states joined with the configured delimiter, e.g. `mix|drain`
    pub status: String,
}

/// Occurrences of each tallied node state across the cluster.
///
/// A node in several states is counted once per state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NodeStateTally {
    pub alloc: u64,
    pub comp: u64,
    pub down: u64,
    pub drain: u64,
    pub err: u64,
    pub fail: u64,
    pub idle: u64,
    pub maint: u64,
    pub mix: u64,
    pub resv: u64,
}

/// Job counts by state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QueueMetrics {
    /// Pending without a dependency
    pub pending: u64,
    /// Pending on another job
    pub pending_dep: u64,
    pub running: u64,
    pub suspended: u64,
    pub cancelled: u64,
    pub completing: u64,
    pub completed: u64,
    pub configuring: u64,
    pub failed: u64,
    pub timeout: u64,
    pub preempted: u64,
    pub node_fail: u64,
    pub out_of_memory: u64,
}

/// Scheduler diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SchedulerMetrics {
    pub threads: i64,
    pub queue_size: i64,
    pub dbd_queue_size: i64,
    pub last_cycle: i64,
    pub mean_cycle: i64,
    pub cycle_per_minute: i64,
    pub backfill_last_cycle: i64,
    pub backfill_mean_cycle: i64,
    pub backfill_depth_mean: i64,
    pub total_backfilled_jobs_since_start: i64,
    pub total_backfilled_jobs_since_cycle: i64,
    pub total_backfilled_heterogeneous: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FairShareMetrics {
    pub fairshare: f64,
}

/// CPU and queue figures for one partition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PartitionMetrics {
    pub cpus_allocated: i64,
    pub cpus_idle: i64,
    pub cpus_other: i64,
    pub cpus_total: i64,
    pub jobs_pending: u64,
}

pub type AccountMetricsMap = BTreeMap<String, AccountJobMetrics>;
pub type UserMetricsMap = BTreeMap<String, UserJobMetrics>;
pub type NodeMetricsMap = BTreeMap<String, NodeMetrics>;
pub type FairShareMetricsMap = BTreeMap<String, FairShareMetrics>;
pub type PartitionMetricsMap = BTreeMap<String, PartitionMetrics>;
