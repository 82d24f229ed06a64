//! Shared parsing utilities for Slurm REST payloads.
//!
//! This crate turns the loosely-typed strings the REST API hands back
//! (state flags, TRES descriptors, comma-separated name lists) into
//! closed types the aggregators can match on.

pub mod state;
pub mod tres;

pub use state::{
    classify_job_state, classify_node_state, classify_node_states, join_node_states, JobState,
    NodeState,
};
pub use tres::{tres_count, GPU_TRES};

use thiserror::Error;

/// Error raised when a raw API string cannot be interpreted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("failed to match job state against known states: {0}")]
    UnrecognizedJobState(String),
    #[error("failed to match node state against known states: {0}")]
    UnrecognizedNodeState(String),
    #[error("found resource in tres but failed to parse: {fragment}")]
    MalformedResource { fragment: String },
}

/// Split a comma-separated name list, dropping empty entries.
///
/// Slurm returns multi-partition jobs as `"short,long"`.
pub fn split_names(s: &str) -> Vec<&str> {
    s.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_names() {
        assert_eq!(split_names("A,B"), vec!["A", "B"]);
        assert_eq!(split_names("short"), vec!["short"]);
        assert_eq!(split_names(" a , b ,"), vec!["a", "b"]);
        assert!(split_names("").is_empty());
    }

    #[test]
    fn test_parse_error_names_token() {
        let err = ParseError::UnrecognizedNodeState("planned".to_string());
        assert!(err.to_string().contains("planned"));
    }
}
