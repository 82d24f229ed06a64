//! Partition metrics, cross-referencing partitions, nodes and jobs.
//!
//! CPU usage is gathered from the nodes' side: a node can belong to several
//! partitions, and a job running on it in one partition still occupies CPUs
//! that every other partition sharing the node would see. Each membership
//! therefore receives the node's full allocated and idle counts, and partition
//! totals do not add up to the cluster total.

use super::{job_label, node_label, partition_label};
use crate::config::{AggregateError, AggregationConfig, ErrorPolicy, Family};
use crate::types::PartitionMetricsMap;
use slurmex_api::{JobsResponse, NodesResponse, PartitionsResponse};
use slurmex_parsers::split_names;

/// A node's partition memberships and the CPU figures it contributes.
#[derive(Debug)]
struct Membership<'a> {
    partitions: &'a [String],
    alloc_cpus: i64,
    idle_cpus: i64,
}

/// Node → partitions adjacency for one cycle.
fn memberships<'a>(
    nodes: &'a NodesResponse,
    policy: ErrorPolicy,
) -> Result<Vec<Membership<'a>>, AggregateError> {
    let mut adjacency = Vec::with_capacity(nodes.nodes.len());
    for (idx, node) in nodes.nodes.iter().enumerate() {
        if policy
            .resolve(Family::Partitions, || node_label(idx, node), node.name())?
            .is_none()
        {
            continue;
        }
        adjacency.push(Membership {
            partitions: node.partition_names(),
            alloc_cpus: node.alloc_cpus_or_zero() as i64,
            idle_cpus: node.idle_cpus_or_zero() as i64,
        });
    }
    Ok(adjacency)
}

/// Build per-partition CPU figures and pending job counts.
///
/// Partition names seen on nodes or jobs but absent from the partition
/// listing get a record of their own, with a total of zero.
pub fn aggregate_partitions(
    partitions: &PartitionsResponse,
    nodes: &NodesResponse,
    jobs: &JobsResponse,
    config: &AggregationConfig,
) -> Result<PartitionMetricsMap, AggregateError> {
    let policy = config.policy(Family::Partitions);
    let mut metrics = PartitionMetricsMap::new();

    // Seed totals from the partition listing
    for (idx, partition) in partitions.partitions.iter().enumerate() {
        let resolved = partition
            .name()
            .and_then(|name| Ok((name, partition.total_cpus()?)));
        let Some((name, total)) =
            policy.resolve(Family::Partitions, || partition_label(idx, partition), resolved)?
        else {
            continue;
        };
        metrics.entry(name.to_string()).or_default().cpus_total = i64::from(total);
    }

    // Fan node CPUs out to every partition the node belongs to
    for membership in memberships(nodes, policy)? {
        for name in membership.partitions {
            let pm = metrics.entry(name.clone()).or_default();
            pm.cpus_allocated += membership.alloc_cpus;
            pm.cpus_idle += membership.idle_cpus;
        }
    }

    for pm in metrics.values_mut() {
        pm.cpus_other = pm.cpus_total - pm.cpus_allocated - pm.cpus_idle;
    }

    // Jobs submitted to several partitions count against each
    for (idx, job) in jobs.jobs.iter().enumerate() {
        let Some(names) =
            policy.resolve(Family::Partitions, || job_label(idx, job), job.partition_name())?
        else {
            continue;
        };
        for name in split_names(names) {
            metrics.entry(name.to_string()).or_default().jobs_pending += 1;
        }
    }

    Ok(metrics)
}
