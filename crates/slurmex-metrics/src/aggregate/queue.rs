//! Job queue tally by state.

use super::job_label;
use crate::config::{AggregateError, AggregationConfig, Family};
use crate::types::QueueMetrics;
use slurmex_api::JobsResponse;
use slurmex_parsers::JobState;

impl QueueMetrics {
    /// Count one job. Pending jobs are split on whether they wait on a dependency.
    pub fn record(&mut self, state: JobState, has_dependency: bool) {
        let counter = match state {
            JobState::Pending if has_dependency => &mut self.pending_dep,
            JobState::Pending => &mut self.pending,
            JobState::Running => &mut self.running,
            JobState::Suspended => &mut self.suspended,
            JobState::Cancelled => &mut self.cancelled,
            JobState::Completing => &mut self.completing,
            JobState::Completed => &mut self.completed,
            JobState::Configuring => &mut self.configuring,
            JobState::Failed => &mut self.failed,
            JobState::Timeout => &mut self.timeout,
            JobState::Preempted => &mut self.preempted,
            JobState::NodeFail => &mut self.node_fail,
            JobState::OutOfMemory => &mut self.out_of_memory,
        };
        *counter += 1;
    }
}

/// Count jobs in each state.
pub fn aggregate_queue(
    jobs: &JobsResponse,
    config: &AggregationConfig,
) -> Result<QueueMetrics, AggregateError> {
    let policy = config.policy(Family::Queue);
    let mut qm = QueueMetrics::default();

    for (idx, job) in jobs.jobs.iter().enumerate() {
        if let Some(state) = policy.resolve(Family::Queue, || job_label(idx, job), job.state())? {
            qm.record(state, job.has_dependency());
        }
    }

    Ok(qm)
}
