//! Typed access to optional record fields.
//!
//! Strict accessors return a [`FieldError`] naming the record and field when a
//! value the metrics depend on is absent. Lenient accessors default to zero.

use crate::types::{JobInfo, Node, Partition, Share};
use slurmex_parsers::{
    classify_job_state, classify_node_states, tres_count, JobState, NodeState, ParseError,
};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FieldError {
    #[error("{field} not found in {record}")]
    Missing {
        record: &'static str,
        field: &'static str,
    },
    #[error(transparent)]
    Invalid(#[from] ParseError),
}

fn required<'a, T: ?Sized>(
    value: Option<&'a T>,
    record: &'static str,
    field: &'static str,
) -> Result<&'a T, FieldError> {
    value.ok_or(FieldError::Missing { record, field })
}

impl JobInfo {
    pub fn account(&self) -> Result<&str, FieldError> {
        required(self.account.as_deref(), "job", "account name")
    }

    pub fn user(&self) -> Result<&str, FieldError> {
        required(self.user_name.as_deref(), "job", "user name")
    }

    pub fn partition_name(&self) -> Result<&str, FieldError> {
        required(self.partition.as_deref(), "job", "partition name")
    }

    /// Requested CPU count.
    pub fn cpus(&self) -> Result<u32, FieldError> {
        self.cpus
            .as_ref()
            .and_then(|c| c.number)
            .ok_or(FieldError::Missing {
                record: "job",
                field: "cpu count",
            })
    }

    /// Classified job state.
    ///
    /// Only the first flag is consulted; the aggregators count each job once.
    pub fn state(&self) -> Result<JobState, FieldError> {
        let first = self
            .job_state
            .as_ref()
            .and_then(|states| states.first())
            .ok_or(FieldError::Missing {
                record: "job",
                field: "job state",
            })?;
        Ok(classify_job_state(first)?)
    }

    /// Whether the job waits on another job.
    pub fn has_dependency(&self) -> bool {
        self.dependency
            .as_deref()
            .is_some_and(|d| !d.trim().is_empty())
    }
}

impl Node {
    pub fn name(&self) -> Result<&str, FieldError> {
        required(self.name.as_deref(), "node", "node name")
    }

    pub fn hostname(&self) -> Result<&str, FieldError> {
        required(self.hostname.as_deref(), "node", "hostname")
    }

    /// Every state flag of the node, classified in order.
    pub fn states(&self) -> Result<Vec<NodeState>, FieldError> {
        match self.state.as_deref() {
            Some(raw) if !raw.is_empty() => Ok(classify_node_states(raw)?),
            _ => Err(FieldError::Missing {
                record: "node",
                field: "node state",
            }),
        }
    }

    /// Configured CPU count.
    pub fn total_cpus(&self) -> Result<u32, FieldError> {
        self.cpus.ok_or(FieldError::Missing {
            record: "node",
            field: "cpu count",
        })
    }

    /// Idle CPU count, required by the cluster CPU tally.
    pub fn idle_cpus(&self) -> Result<u32, FieldError> {
        self.alloc_idle_cpus.ok_or(FieldError::Missing {
            record: "node",
            field: "idle cpu count",
        })
    }

    /// Partitions this node belongs to; absent means none.
    pub fn partition_names(&self) -> &[String] {
        self.partitions.as_deref().unwrap_or_default()
    }

    pub fn alloc_memory(&self) -> u64 {
        self.alloc_memory.unwrap_or(0)
    }

    pub fn total_memory(&self) -> u64 {
        self.real_memory.unwrap_or(0)
    }

    pub fn alloc_cpus_or_zero(&self) -> u64 {
        self.alloc_cpus.map(u64::from).unwrap_or(0)
    }

    pub fn idle_cpus_or_zero(&self) -> u64 {
        self.alloc_idle_cpus.map(u64::from).unwrap_or(0)
    }

    pub fn total_cpus_or_zero(&self) -> u64 {
        self.cpus.map(u64::from).unwrap_or(0)
    }

    /// The API exposes no "other" CPU figure for a node.
    pub fn other_cpus(&self) -> u64 {
        0
    }

    /// Configured count of the TRES matching `tag`. Absent TRES counts as none.
    pub fn tres_total(&self, tag: &str) -> Result<u64, FieldError> {
        Ok(tres_count(self.tres.as_deref().unwrap_or_default(), tag)?)
    }

    /// In-use count of the TRES matching `tag`.
    pub fn tres_used(&self, tag: &str) -> Result<u64, FieldError> {
        Ok(tres_count(self.tres_used.as_deref().unwrap_or_default(), tag)?)
    }
}

impl Partition {
    pub fn name(&self) -> Result<&str, FieldError> {
        required(self.name.as_deref(), "partition", "partition name")
    }

    pub fn total_cpus(&self) -> Result<u32, FieldError> {
        self.cpus.total.ok_or(FieldError::Missing {
            record: "partition",
            field: "total cpus",
        })
    }
}

impl Share {
    pub fn name(&self) -> Result<&str, FieldError> {
        required(self.name.as_deref(), "share", "name")
    }

    pub fn fairshare_level(&self) -> Result<f64, FieldError> {
        self.fairshare
            .as_ref()
            .and_then(|f| f.level)
            .ok_or(FieldError::Missing {
                record: "share",
                field: "fairshare level",
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn job(value: serde_json::Value) -> JobInfo {
        serde_json::from_value(value).unwrap()
    }

    fn node(value: serde_json::Value) -> Node {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_job_state_uses_first_flag() {
        let j = job(json!({"job_state": ["RUNNING", "REQUEUED"]}));
        assert_eq!(j.state().unwrap(), JobState::Running);
    }

    #[test]
    fn test_job_state_missing() {
        let err = job(json!({})).state().unwrap_err();
        assert_eq!(err.to_string(), "job state not found in job");

        let err = job(json!({"job_state": []})).state().unwrap_err();
        assert!(matches!(err, FieldError::Missing { field: "job state", .. }));
    }

    #[test]
    fn test_job_state_unrecognized() {
        let err = job(json!({"job_state": ["BOOT_FAIL"]})).state().unwrap_err();
        assert!(matches!(err, FieldError::Invalid(ParseError::UnrecognizedJobState(_))));
    }

    #[test]
    fn test_job_cpus() {
        let j = job(json!({"cpus": {"set": true, "infinite": false, "number": 8}}));
        assert_eq!(j.cpus().unwrap(), 8);
        assert!(job(json!({"cpus": {"set": false}})).cpus().is_err());
        assert!(job(json!({})).cpus().is_err());
    }

    #[test]
    fn test_job_dependency() {
        assert!(job(json!({"dependency": "afterok:12"})).has_dependency());
        assert!(!job(json!({"dependency": ""})).has_dependency());
        assert!(!job(json!({})).has_dependency());
    }

    #[test]
    fn test_node_states() {
        let n = node(json!({"state": ["MIXED", "DRAIN"]}));
        assert_eq!(n.states().unwrap(), vec![NodeState::Mix, NodeState::Drain]);

        let err = node(json!({"state": []})).states().unwrap_err();
        assert_eq!(err.to_string(), "node state not found in node");
    }

    #[test]
    fn test_node_lenient_fields() {
        let n = node(json!({"name": "n01"}));
        assert_eq!(n.alloc_memory(), 0);
        assert_eq!(n.total_cpus_or_zero(), 0);
        assert!(n.partition_names().is_empty());
        assert_eq!(n.tres_total("gres/gpu").unwrap(), 0);
    }

    #[test]
    fn test_node_tres() {
        let n = node(json!({
            "tres": "cpu=48,mem=1020522M,billing=48,gres/gpu=4",
            "tres_used": "cpu=12,mem=2000M,gres/gpu=1"
        }));
        assert_eq!(n.tres_total("gres/gpu").unwrap(), 4);
        assert_eq!(n.tres_used("gres/gpu").unwrap(), 1);
    }

    #[test]
    fn test_share_fields() {
        let s: Share = serde_json::from_value(json!({"name": "lab"})).unwrap();
        assert_eq!(s.name().unwrap(), "lab");
        assert!(s.fairshare_level().is_err());
    }
}
