//! Slurm REST (v0.0.41) response models.
//!
//! Only the fields the metrics need are modelled. Everything is optional:
//! slurmrestd omits fields freely between releases and configurations.

use serde::{Deserialize, Serialize};

/// Slurm's "no value" wrapper for numbers that may be unset or infinite.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct NoVal<T> {
    pub set: bool,
    pub infinite: bool,
    pub number: Option<T>,
}

/// Response of `GET /slurm/v0.0.41/jobs`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct JobsResponse {
    pub jobs: Vec<JobInfo>,
}

/// A single job entry.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct JobInfo {
    pub job_id: Option<u64>,
    pub name: Option<String>,
    pub account: Option<String>,
    pub user_name: Option<String>,
    /// Partition name, comma-separated when the job was submitted to several
    pub partition: Option<String>,
    /// State flags, e.g. `["PENDING"]`
    pub job_state: Option<Vec<String>>,
    pub cpus: Option<NoVal<u32>>,
    /// Dependency expression, empty when the job has none
    pub dependency: Option<String>,
}

/// Response of `GET /slurm/v0.0.41/nodes`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct NodesResponse {
    pub nodes: Vec<Node>,
}

/// A single node entry.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Node {
    pub name: Option<String>,
    pub hostname: Option<String>,
    /// State flags, e.g. `["MIXED", "DRAIN"]`
    pub state: Option<Vec<String>>,
    pub cpus: Option<u32>,
    pub alloc_cpus: Option<u32>,
    pub alloc_idle_cpus: Option<u32>,
    /// Allocated memory (MB)
    pub alloc_memory: Option<u64>,
    /// Configured memory (MB)
    pub real_memory: Option<u64>,
    /// Configured TRES, e.g. `cpu=48,mem=1020522M,billing=48,gres/gpu=4`
    pub tres: Option<String>,
    /// TRES currently in use
    pub tres_used: Option<String>,
    pub partitions: Option<Vec<String>>,
}

/// Response of `GET /slurm/v0.0.41/partitions`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct PartitionsResponse {
    pub partitions: Vec<Partition>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Partition {
    pub name: Option<String>,
    pub cpus: PartitionCpus,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct PartitionCpus {
    pub total: Option<u32>,
}

/// Response of `GET /slurm/v0.0.41/diag`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct DiagResponse {
    pub statistics: Statistics,
}

/// Scheduler statistics as reported by sdiag.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Statistics {
    pub server_thread_count: Option<i64>,
    pub agent_queue_size: Option<i64>,
    pub dbd_agent_queue_size: Option<i64>,
    pub schedule_cycle_last: Option<i64>,
    pub schedule_cycle_mean: Option<i64>,
    pub schedule_cycle_per_minute: Option<i64>,
    pub bf_cycle_last: Option<i64>,
    pub bf_cycle_mean: Option<i64>,
    pub bf_depth_mean: Option<i64>,
    pub bf_backfilled_jobs: Option<i64>,
    pub bf_last_backfilled_jobs: Option<i64>,
    pub bf_backfilled_het_jobs: Option<i64>,
}

/// Response of `GET /slurm/v0.0.41/shares`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SharesResponse {
    pub shares: SharesList,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SharesList {
    pub shares: Vec<Share>,
}

/// Fair-share association entry.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Share {
    pub name: Option<String>,
    pub fairshare: Option<FairShare>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct FairShare {
    pub factor: Option<f64>,
    pub level: Option<f64>,
}
