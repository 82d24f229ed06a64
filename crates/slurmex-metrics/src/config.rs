//! Aggregation settings and per-family error policy.

use slurmex_api::FieldError;
use slurmex_parsers::GPU_TRES;
use std::fmt;
use thiserror::Error;

/// Metric families, one per aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    Accounts,
    Users,
    Cpus,
    Gpus,
    Nodes,
    NodeStates,
    Queue,
    Scheduler,
    FairShare,
    Partitions,
}

impl Family {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accounts => "accounts",
            Self::Users => "users",
            Self::Cpus => "cpus",
            Self::Gpus => "gpus",
            Self::Nodes => "node",
            Self::NodeStates => "nodes",
            Self::Queue => "queue",
            Self::Scheduler => "scheduler",
            Self::FairShare => "fairshare",
            Self::Partitions => "partitions",
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A record-level failure that aborted an aggregation.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{family} metrics: {record}: {source}")]
pub struct AggregateError {
    pub family: Family,
    pub record: String,
    #[source]
    pub source: FieldError,
}

/// What an aggregator does with a record it cannot resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Abort the whole aggregation
    #[default]
    FailFast,
    /// Log the record, drop it, keep going
    SkipAndLog,
}

impl ErrorPolicy {
    /// Apply the policy to one record's resolution result.
    ///
    /// `Ok(None)` means the record was skipped.
    pub fn resolve<T>(
        &self,
        family: Family,
        record: impl FnOnce() -> String,
        result: Result<T, FieldError>,
    ) -> Result<Option<T>, AggregateError> {
        match (result, self) {
            (Ok(value), _) => Ok(Some(value)),
            (Err(source), Self::SkipAndLog) => {
                tracing::warn!("Skipping {} in {} metrics: {}", record(), family, source);
                Ok(None)
            }
            (Err(source), Self::FailFast) => Err(AggregateError {
                family,
                record: record(),
                source,
            }),
        }
    }
}

/// Which nodes the cluster CPU tally treats as unprovisioned placeholders.
///
/// Some sites register hosts that only need Slurm client commands; slurmctld
/// tracks those with a single CPU and no partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderNodes {
    /// Nodes reporting exactly this many CPUs are placeholders
    CpuCount(u32),
    /// Count every node
    Disabled,
}

impl Default for PlaceholderNodes {
    fn default() -> Self {
        Self::CpuCount(1)
    }
}

impl PlaceholderNodes {
    pub fn is_placeholder(&self, cpus: u32) -> bool {
        match self {
            Self::CpuCount(n) => cpus == *n,
            Self::Disabled => false,
        }
    }
}

/// Settings shared by all aggregators.
#[derive(Debug, Clone)]
pub struct AggregationConfig {
    pub accounts: ErrorPolicy,
    pub users: ErrorPolicy,
    pub cpus: ErrorPolicy,
    pub gpus: ErrorPolicy,
    pub nodes: ErrorPolicy,
    pub node_states: ErrorPolicy,
    pub queue: ErrorPolicy,
    pub fairshare: ErrorPolicy,
    pub partitions: ErrorPolicy,
    pub placeholder_nodes: PlaceholderNodes,
    /// TRES name counted as a GPU
    pub gpu_tres: String,
    /// Separator for the node status label
    pub state_delimiter: String,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            accounts: ErrorPolicy::SkipAndLog,
            users: ErrorPolicy::SkipAndLog,
            cpus: ErrorPolicy::FailFast,
            gpus: ErrorPolicy::FailFast,
            nodes: ErrorPolicy::FailFast,
            node_states: ErrorPolicy::FailFast,
            queue: ErrorPolicy::FailFast,
            fairshare: ErrorPolicy::FailFast,
            partitions: ErrorPolicy::FailFast,
            placeholder_nodes: PlaceholderNodes::default(),
            gpu_tres: GPU_TRES.to_string(),
            state_delimiter: "|".to_string(),
        }
    }
}

impl AggregationConfig {
    /// Fail fast everywhere, including the account and user tallies.
    pub fn strict() -> Self {
        Self {
            accounts: ErrorPolicy::FailFast,
            users: ErrorPolicy::FailFast,
            ..Self::default()
        }
    }

    pub fn policy(&self, family: Family) -> ErrorPolicy {
        match family {
            Family::Accounts => self.accounts,
            Family::Users => self.users,
            Family::Cpus => self.cpus,
            Family::Gpus => self.gpus,
            Family::Nodes => self.nodes,
            Family::NodeStates => self.node_states,
            Family::Queue => self.queue,
            Family::FairShare => self.fairshare,
            Family::Partitions => self.partitions,
            // Diagnostics are zero-filled and cannot fail
            Family::Scheduler => ErrorPolicy::SkipAndLog,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn missing() -> FieldError {
        FieldError::Missing {
            record: "job",
            field: "account name",
        }
    }

    #[test]
    fn test_default_policies() {
        let config = AggregationConfig::default();
        assert_eq!(config.policy(Family::Accounts), ErrorPolicy::SkipAndLog);
        assert_eq!(config.policy(Family::Users), ErrorPolicy::SkipAndLog);
        assert_eq!(config.policy(Family::Cpus), ErrorPolicy::FailFast);
        assert_eq!(config.policy(Family::Partitions), ErrorPolicy::FailFast);

        let strict = AggregationConfig::strict();
        assert_eq!(strict.policy(Family::Accounts), ErrorPolicy::FailFast);
    }

    #[test]
    fn test_resolve_skip() {
        let result: Result<Option<u32>, _> =
            ErrorPolicy::SkipAndLog.resolve(Family::Accounts, || "job 1".to_string(), Err(missing()));
        assert_eq!(result.unwrap(), None);
    }

    #[test]
    fn test_resolve_fail_fast() {
        let err = ErrorPolicy::FailFast
            .resolve::<u32>(Family::Queue, || "job 7".to_string(), Err(missing()))
            .unwrap_err();
        assert_eq!(err.family, Family::Queue);
        assert_eq!(err.record, "job 7");
        assert_eq!(
            err.to_string(),
            "queue metrics: job 7: account name not found in job"
        );
    }

    #[test]
    fn test_resolve_ok() {
        let value = ErrorPolicy::FailFast
            .resolve(Family::Queue, || unreachable!(), Ok(3))
            .unwrap();
        assert_eq!(value, Some(3));
    }

    #[test]
    fn test_placeholder_nodes() {
        assert!(PlaceholderNodes::default().is_placeholder(1));
        assert!(!PlaceholderNodes::default().is_placeholder(48));
        assert!(!PlaceholderNodes::Disabled.is_placeholder(1));
        assert!(PlaceholderNodes::CpuCount(2).is_placeholder(2));
    }
}
