//! Scheduler diagnostics passthrough.

use crate::types::SchedulerMetrics;
use slurmex_api::DiagResponse;

/// Copy the sdiag statistics, substituting zero for absent fields.
pub fn aggregate_scheduler(diag: &DiagResponse) -> SchedulerMetrics {
    let s = &diag.statistics;
    let or_zero = |v: Option<i64>| v.unwrap_or(0);

    SchedulerMetrics {
        threads: or_zero(s.server_thread_count),
        queue_size: or_zero(s.agent_queue_size),
        dbd_queue_size: or_zero(s.dbd_agent_queue_size),
        last_cycle: or_zero(s.schedule_cycle_last),
        mean_cycle: or_zero(s.schedule_cycle_mean),
        cycle_per_minute: or_zero(s.schedule_cycle_per_minute),
        backfill_last_cycle: or_zero(s.bf_cycle_last),
        backfill_mean_cycle: or_zero(s.bf_cycle_mean),
        backfill_depth_mean: or_zero(s.bf_depth_mean),
        total_backfilled_jobs_since_cycle: or_zero(s.bf_backfilled_jobs),
        // TODO: bf_last_backfilled_jobs counts the last cycle only; find the
        // field that actually accumulates since slurmctld start.
        total_backfilled_jobs_since_start: or_zero(s.bf_last_backfilled_jobs),
        total_backfilled_heterogeneous: or_zero(s.bf_backfilled_het_jobs),
    }
}
