//! Cluster-wide CPU tally.

use super::{job_label, node_label};
use crate::config::{AggregateError, AggregationConfig, Family};
use crate::types::ClusterCpuMetrics;
use slurmex_api::{JobsResponse, NodesResponse};
use slurmex_parsers::JobState;

/// Sum allocated, idle and total CPUs across the cluster.
///
/// Allocated CPUs come from running jobs, total and idle CPUs from the nodes.
/// Placeholder nodes (see [`crate::PlaceholderNodes`]) are left out of both.
pub fn aggregate_cpus(
    nodes: &NodesResponse,
    jobs: &JobsResponse,
    config: &AggregationConfig,
) -> Result<ClusterCpuMetrics, AggregateError> {
    let policy = config.policy(Family::Cpus);
    let mut cm = ClusterCpuMetrics::default();

    for (idx, job) in jobs.jobs.iter().enumerate() {
        let running_cpus = job.state().and_then(|state| match state {
            JobState::Running => job.cpus().map(Some),
            _ => Ok(None),
        });
        let resolved = policy.resolve(Family::Cpus, || job_label(idx, job), running_cpus)?;
        if let Some(Some(cpus)) = resolved {
            cm.alloc += i64::from(cpus);
        }
    }

    for (idx, node) in nodes.nodes.iter().enumerate() {
        let label = || node_label(idx, node);

        let Some(cpus) = policy.resolve(Family::Cpus, label, node.total_cpus())? else {
            continue;
        };
        if config.placeholder_nodes.is_placeholder(cpus) {
            continue;
        }

        let idle = node.states().and_then(|states| {
            let schedulable = states.iter().filter(|s| s.is_schedulable()).count() as i64;
            if schedulable == 0 {
                return Ok(0);
            }
            Ok(schedulable * i64::from(node.idle_cpus()?))
        });
        let Some(idle) = policy.resolve(Family::Cpus, label, idle)? else {
            continue;
        };

        cm.total += i64::from(cpus);
        cm.idle += idle;
    }

    cm.other = cm.total - cm.idle - cm.alloc;
    Ok(cm)
}
