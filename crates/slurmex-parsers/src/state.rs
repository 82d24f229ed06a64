//! Job and node state classification.
//!
//! Slurm reports states as free-form upper-case flags (`RUNNING`, `MIXED`,
//! `DRAIN`, ...). Each classifier lower-cases the flag and matches it against
//! an ordered table of anchored prefix rules, compiled once per process.

use crate::ParseError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

/// Classified Slurm job state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum JobState {
    Pending,
    Running,
    Suspended,
    Cancelled,
    Completing,
    Completed,
    Configuring,
    Failed,
    Timeout,
    Preempted,
    NodeFail,
    OutOfMemory,
}

impl JobState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Suspended => "suspended",
            Self::Cancelled => "cancelled",
            Self::Completing => "completing",
            Self::Completed => "completed",
            Self::Configuring => "configuring",
            Self::Failed => "failed",
            Self::Timeout => "timeout",
            Self::Preempted => "preempted",
            Self::NodeFail => "node_fail",
            Self::OutOfMemory => "out_of_memory",
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classified Slurm node state.
///
/// A node usually carries several of these at once (e.g. `Mix` and `Drain`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeState {
    Alloc,
    Comp,
    Down,
    Drain,
    Fail,
    Err,
    Idle,
    Maint,
    Mix,
    Resv,
    NotResponding,
    Invalid,
    InvalidReg,
}

impl NodeState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Alloc => "alloc",
            Self::Comp => "comp",
            Self::Down => "down",
            Self::Drain => "drain",
            Self::Fail => "fail",
            Self::Err => "err",
            Self::Idle => "idle",
            Self::Maint => "maint",
            Self::Mix => "mix",
            Self::Resv => "resv",
            Self::NotResponding => "not_responding",
            Self::Invalid => "invalid",
            Self::InvalidReg => "invalid_reg",
        }
    }

    /// Whether the node can hand out CPUs in this state.
    pub fn is_schedulable(&self) -> bool {
        matches!(self, Self::Mix | Self::Alloc | Self::Idle)
    }
}

impl fmt::Display for NodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn compile<T: Copy>(rules: &[(&str, T)]) -> Vec<(Regex, T)> {
    rules
        .iter()
        .map(|(pattern, state)| (Regex::new(pattern).expect("valid state rule"), *state))
        .collect()
}

static JOB_STATE_RULES: Lazy<Vec<(Regex, JobState)>> = Lazy::new(|| {
    compile(&[
        ("^completed", JobState::Completed),
        ("^pending", JobState::Pending),
        ("^failed", JobState::Failed),
        ("^running", JobState::Running),
        ("^suspended", JobState::Suspended),
        ("^out_of_memory", JobState::OutOfMemory),
        ("^timeout", JobState::Timeout),
        ("^cancelled", JobState::Cancelled),
        ("^completing", JobState::Completing),
        ("^configuring", JobState::Configuring),
        ("^node_fail", JobState::NodeFail),
        ("^preempted", JobState::Preempted),
    ])
});

// `invalid_reg` is listed ahead of `invalid` so the longer flag stays reachable.
static NODE_STATE_RULES: Lazy<Vec<(Regex, NodeState)>> = Lazy::new(|| {
    compile(&[
        ("^alloc", NodeState::Alloc),
        ("^comp", NodeState::Comp),
        ("^down", NodeState::Down),
        ("^drain", NodeState::Drain),
        ("^fail", NodeState::Fail),
        ("^err", NodeState::Err),
        ("^idle", NodeState::Idle),
        ("^maint", NodeState::Maint),
        ("^mix", NodeState::Mix),
        ("^res", NodeState::Resv),
        ("^not_responding", NodeState::NotResponding),
        ("^invalid_reg", NodeState::InvalidReg),
        ("^invalid", NodeState::Invalid),
    ])
});

fn first_match<T: Copy>(rules: &[(Regex, T)], token: &str) -> Option<T> {
    rules
        .iter()
        .find(|(re, _)| re.is_match(token))
        .map(|(_, state)| *state)
}

/// Classify a single job state flag (case-insensitive).
pub fn classify_job_state(raw: &str) -> Result<JobState, ParseError> {
    let token = raw.to_lowercase();
    first_match(&JOB_STATE_RULES, &token).ok_or(ParseError::UnrecognizedJobState(token))
}

/// Classify a single node state flag (case-insensitive).
pub fn classify_node_state(raw: &str) -> Result<NodeState, ParseError> {
    let token = raw.to_lowercase();
    first_match(&NODE_STATE_RULES, &token).ok_or(ParseError::UnrecognizedNodeState(token))
}

/// Classify every flag of a node, preserving input order.
///
/// Fails on the first unrecognized flag; no partial result is returned.
pub fn classify_node_states<S: AsRef<str>>(raw: &[S]) -> Result<Vec<NodeState>, ParseError> {
    raw.iter().map(|s| classify_node_state(s.as_ref())).collect()
}

/// Join node states into a single label value, e.g. `mix|drain`.
pub fn join_node_states(states: &[NodeState], delim: &str) -> String {
    states
        .iter()
        .map(NodeState::as_str)
        .collect::<Vec<_>>()
        .join(delim)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_job_state() {
        assert_eq!(classify_job_state("RUNNING").unwrap(), JobState::Running);
        assert_eq!(classify_job_state("completed").unwrap(), JobState::Completed);
        assert_eq!(classify_job_state("COMPLETING").unwrap(), JobState::Completing);
        assert_eq!(classify_job_state("CONFIGURING").unwrap(), JobState::Configuring);
        assert_eq!(
            classify_job_state("Out_Of_Memory").unwrap(),
            JobState::OutOfMemory
        );
        assert_eq!(classify_job_state("NODE_FAIL").unwrap(), JobState::NodeFail);
        assert_eq!(classify_job_state("PREEMPTED").unwrap(), JobState::Preempted);
        assert_eq!(classify_job_state("PENDING").unwrap(), JobState::Pending);
        assert_eq!(classify_job_state("SUSPENDED").unwrap(), JobState::Suspended);
        assert_eq!(classify_job_state("CANCELLED").unwrap(), JobState::Cancelled);
        assert_eq!(classify_job_state("TIMEOUT").unwrap(), JobState::Timeout);
        assert_eq!(classify_job_state("FAILED").unwrap(), JobState::Failed);
    }

    #[test]
    fn test_classify_job_state_unknown() {
        let err = classify_job_state("BOOT_FAIL").unwrap_err();
        assert!(matches!(err, ParseError::UnrecognizedJobState(ref s) if s == "boot_fail"));
        assert!(classify_job_state("").is_err());
        // Prefix rules are anchored at the start
        assert!(classify_job_state("not_running").is_err());
    }

    #[test]
    fn test_classify_node_states_in_order() {
        let states = classify_node_states(&["MIXED", "DRAIN"]).unwrap();
        assert_eq!(states, vec![NodeState::Mix, NodeState::Drain]);

        let states = classify_node_states(&["IDLE", "RESERVED", "NOT_RESPONDING"]).unwrap();
        assert_eq!(
            states,
            vec![NodeState::Idle, NodeState::Resv, NodeState::NotResponding]
        );
    }

    #[test]
    fn test_classify_node_state_invalid_variants() {
        assert_eq!(classify_node_state("INVALID").unwrap(), NodeState::Invalid);
        assert_eq!(
            classify_node_state("INVALID_REG").unwrap(),
            NodeState::InvalidReg
        );
    }

    #[test]
    fn test_classify_node_states_fails_whole_call() {
        let err = classify_node_states(&["IDLE", "PLANNED"]).unwrap_err();
        assert!(matches!(err, ParseError::UnrecognizedNodeState(ref s) if s == "planned"));
    }

    #[test]
    fn test_join_node_states() {
        let states = vec![NodeState::Alloc, NodeState::Drain];
        assert_eq!(join_node_states(&states, "|"), "alloc|drain");
        assert_eq!(join_node_states(&[], "|"), "");
    }

    #[test]
    fn test_is_schedulable() {
        assert!(NodeState::Mix.is_schedulable());
        assert!(NodeState::Idle.is_schedulable());
        assert!(!NodeState::Drain.is_schedulable());
    }
}
