//! Per-account and per-user job tallies.

use super::job_label;
use crate::config::{AggregateError, AggregationConfig, Family};
use crate::types::{AccountMetricsMap, JobMetrics, UserMetricsMap};
use slurmex_api::{FieldError, JobInfo, JobsResponse};
use slurmex_parsers::JobState;
use std::collections::BTreeMap;

impl JobMetrics {
    /// Count one job in the given state.
    pub fn record(&mut self, state: JobState, cpus: u32) {
        match state {
            JobState::Pending => {
                self.pending += 1;
                self.pending_cpus += u64::from(cpus);
            }
            JobState::Running => {
                self.running += 1;
                self.running_cpus += u64::from(cpus);
            }
            JobState::Suspended => self.suspended += 1,
            _ => {}
        }
    }
}

/// Tally jobs under the key returned by `key_of`.
fn tally_by<F>(
    jobs: &JobsResponse,
    family: Family,
    config: &AggregationConfig,
    key_of: F,
) -> Result<BTreeMap<String, JobMetrics>, AggregateError>
where
    F: Fn(&JobInfo) -> Result<&str, FieldError>,
{
    let policy = config.policy(family);
    let mut tallies: BTreeMap<String, JobMetrics> = BTreeMap::new();

    for (idx, job) in jobs.jobs.iter().enumerate() {
        let label = || job_label(idx, job);
        let Some(key) = policy.resolve(family, label, key_of(job))? else {
            continue;
        };

        // The key exists from its first sighting, even if this job is skipped
        let tally = tallies.entry(key.to_string()).or_default();

        let resolved = job.state().and_then(|state| Ok((state, job.cpus()?)));
        if let Some((state, cpus)) = policy.resolve(family, label, resolved)? {
            tally.record(state, cpus);
        }
    }

    Ok(tallies)
}

/// Tally pending, running and suspended jobs per account.
pub fn aggregate_accounts(
    jobs: &JobsResponse,
    config: &AggregationConfig,
) -> Result<AccountMetricsMap, AggregateError> {
    tally_by(jobs, Family::Accounts, config, JobInfo::account)
}

/// Tally pending, running and suspended jobs per user.
pub fn aggregate_users(
    jobs: &JobsResponse,
    config: &AggregationConfig,
) -> Result<UserMetricsMap, AggregateError> {
    tally_by(jobs, Family::Users, config, JobInfo::user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::fixtures::job;
    use serde_json::json;

    fn jobs(list: Vec<JobInfo>) -> JobsResponse {
        JobsResponse { jobs: list }
    }

    #[test]
    fn test_aggregate_accounts() {
        let resp = jobs(vec![
            job("lab", "PENDING", 2),
            job("lab", "PENDING", 3),
            job("lab", "RUNNING", 8),
            job("lab", "SUSPENDED", 4),
            job("other", "RUNNING", 1),
            job("other", "COMPLETED", 16),
        ]);

        let accounts = aggregate_accounts(&resp, &AggregationConfig::default()).unwrap();
        assert_eq!(accounts.len(), 2);

        let lab = &accounts["lab"];
        assert_eq!(lab.pending, 2);
        assert_eq!(lab.pending_cpus, 5);
        assert_eq!(lab.running, 1);
        assert_eq!(lab.running_cpus, 8);
        assert_eq!(lab.suspended, 1);

        let other = &accounts["other"];
        assert_eq!(other.running, 1);
        assert_eq!(other.running_cpus, 1);
        assert_eq!(other.pending, 0);
    }

    #[test]
    fn test_aggregate_accounts_skips_bad_records() {
        let no_account: JobInfo =
            serde_json::from_value(json!({"job_state": ["RUNNING"], "cpus": {"number": 4}}))
                .unwrap();
        let bad_state = job("lab", "BOOT_FAIL", 4);
        let no_cpus: JobInfo =
            serde_json::from_value(json!({"account": "lab", "job_state": ["PENDING"]})).unwrap();

        let resp = jobs(vec![no_account, bad_state, no_cpus, job("lab", "RUNNING", 2)]);
        let accounts = aggregate_accounts(&resp, &AggregationConfig::default()).unwrap();

        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts["lab"].running, 1);
        assert_eq!(accounts["lab"].pending, 0);
    }

    #[test]
    fn test_account_seen_only_on_bad_jobs_is_zeroed() {
        let resp = jobs(vec![job("lab", "BOOT_FAIL", 1), job("other", "RUNNING", 2)]);
        let accounts = aggregate_accounts(&resp, &AggregationConfig::default()).unwrap();

        assert_eq!(accounts.len(), 2);
        assert_eq!(accounts["lab"], JobMetrics::default());
        assert_eq!(accounts["other"].running, 1);
    }

    #[test]
    fn test_aggregate_accounts_strict() {
        let resp = jobs(vec![job("lab", "RUNNING", 2), job("lab", "BOOT_FAIL", 4)]);
        let err = aggregate_accounts(&resp, &AggregationConfig::strict()).unwrap_err();
        assert_eq!(err.family, Family::Accounts);
        assert_eq!(err.record, "job #1");
    }

    #[test]
    fn test_aggregate_users() {
        let resp = jobs(vec![job("lab", "PENDING", 2), job("lab", "RUNNING", 6)]);
        let users = aggregate_users(&resp, &AggregationConfig::default()).unwrap();
        let user = &users["lab-user"];
        assert_eq!(user.pending, 1);
        assert_eq!(user.pending_cpus, 2);
        assert_eq!(user.running_cpus, 6);
    }

    #[test]
    fn test_aggregate_users_skips_bad_records() {
        let no_user: JobInfo = serde_json::from_value(
            json!({"account": "lab", "job_state": ["PENDING"], "cpus": {"number": 2}}),
        )
        .unwrap();
        let mut bad_state = job("lab", "BOOT_FAIL", 4);
        bad_state.user_name = Some("bob".to_string());

        let resp = jobs(vec![no_user, bad_state, job("lab", "RUNNING", 6)]);
        let users = aggregate_users(&resp, &AggregationConfig::default()).unwrap();

        assert_eq!(users.len(), 2);
        assert_eq!(users["bob"], JobMetrics::default());
        assert_eq!(users["lab-user"].running, 1);
        assert_eq!(users["lab-user"].running_cpus, 6);
    }

    #[test]
    fn test_aggregate_is_repeatable() {
        let resp = jobs(vec![job("a", "PENDING", 2), job("b", "RUNNING", 6)]);
        let config = AggregationConfig::default();
        assert_eq!(
            aggregate_accounts(&resp, &config).unwrap(),
            aggregate_accounts(&resp, &config).unwrap()
        );
    }
}
