//! Aggregators folding REST collections into metric records.
//!
//! Every aggregator is a pure function of its inputs: it reads the raw
//! responses, allocates a fresh result and shares no state with the others.

mod cpus;
mod fairshare;
mod gpus;
mod jobs;
mod nodes;
mod partitions;
mod queue;
mod scheduler;

pub use cpus::aggregate_cpus;
pub use fairshare::aggregate_fairshare;
pub use gpus::aggregate_gpus;
pub use jobs::{aggregate_accounts, aggregate_users};
pub use nodes::{aggregate_node_states, aggregate_nodes};
pub use partitions::aggregate_partitions;
pub use queue::aggregate_queue;
pub use scheduler::aggregate_scheduler;

use slurmex_api::{JobInfo, Node, Partition, Share};

/// Human-readable record name for log and error messages.
pub(crate) fn job_label(idx: usize, job: &JobInfo) -> String {
    match job.job_id {
        Some(id) => format!("job {}", id),
        None => format!("job #{}", idx),
    }
}

pub(crate) fn node_label(idx: usize, node: &Node) -> String {
    match node.name.as_deref().or(node.hostname.as_deref()) {
        Some(name) => format!("node {}", name),
        None => format!("node #{}", idx),
    }
}

pub(crate) fn partition_label(idx: usize, partition: &Partition) -> String {
    match partition.name.as_deref() {
        Some(name) => format!("partition {}", name),
        None => format!("partition #{}", idx),
    }
}

pub(crate) fn share_label(idx: usize, share: &Share) -> String {
    match share.name.as_deref() {
        Some(name) => format!("share {}", name),
        None => format!("share #{}", idx),
    }
}
