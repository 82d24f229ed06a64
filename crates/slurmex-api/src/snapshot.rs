//! Snapshot directories of saved REST responses.
//!
//! A fetcher writes one `<endpoint>.json` file per endpoint into a directory;
//! a snapshot is the set of those responses for one collection cycle.

use crate::endpoint::Endpoint;
use crate::types::{DiagResponse, JobsResponse, NodesResponse, PartitionsResponse, SharesResponse};
use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: Utf8PathBuf,
        source: std::io::Error,
    },
    #[error("JSON parse error in {path}: {source}")]
    Json {
        path: Utf8PathBuf,
        source: serde_json::Error,
    },
    #[error("Snapshot directory not found: {0}")]
    NotFound(Utf8PathBuf),
}

/// One cycle's worth of REST responses. Missing endpoints are `None`.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub jobs: Option<JobsResponse>,
    pub nodes: Option<NodesResponse>,
    pub partitions: Option<PartitionsResponse>,
    pub diag: Option<DiagResponse>,
    pub shares: Option<SharesResponse>,
    pub loaded_at: DateTime<Utc>,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            jobs: None,
            nodes: None,
            partitions: None,
            diag: None,
            shares: None,
            loaded_at: Utc::now(),
        }
    }
}

/// Parse a single saved response file.
pub fn parse_response_file<T: DeserializeOwned>(path: &Utf8Path) -> Result<T, SnapshotError> {
    let content = std::fs::read_to_string(path).map_err(|source| SnapshotError::Io {
        path: path.to_owned(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| SnapshotError::Json {
        path: path.to_owned(),
        source,
    })
}

fn load_endpoint<T: DeserializeOwned>(
    dir: &Utf8Path,
    endpoint: Endpoint,
) -> Result<Option<T>, SnapshotError> {
    let path = dir.join(endpoint.file_name());
    if !path.is_file() {
        tracing::debug!(
            "No {} response in snapshot: expected GET {} saved at {}",
            endpoint,
            endpoint.path(),
            path
        );
        return Ok(None);
    }
    parse_response_file(&path).map(Some)
}

impl Snapshot {
    /// Load every endpoint response found in `dir`.
    pub fn load(dir: &Utf8Path) -> Result<Self, SnapshotError> {
        if !dir.is_dir() {
            return Err(SnapshotError::NotFound(dir.to_owned()));
        }

        Ok(Self {
            jobs: load_endpoint(dir, Endpoint::Jobs)?,
            nodes: load_endpoint(dir, Endpoint::Nodes)?,
            partitions: load_endpoint(dir, Endpoint::Partitions)?,
            diag: load_endpoint(dir, Endpoint::Diag)?,
            shares: load_endpoint(dir, Endpoint::Shares)?,
            loaded_at: Utc::now(),
        })
    }

    /// Endpoints with a response in this snapshot.
    pub fn present(&self) -> Vec<Endpoint> {
        Endpoint::ALL
            .into_iter()
            .filter(|e| match e {
                Endpoint::Jobs => self.jobs.is_some(),
                Endpoint::Nodes => self.nodes.is_some(),
                Endpoint::Partitions => self.partitions.is_some(),
                Endpoint::Diag => self.diag.is_some(),
                Endpoint::Shares => self.shares.is_some(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_dir() -> (TempDir, Utf8PathBuf) {
        let temp = TempDir::new().unwrap();
        let path = Utf8Path::from_path(temp.path()).unwrap().to_path_buf();
        (temp, path)
    }

    #[test]
    fn test_load_missing_dir() {
        let (_temp, dir) = temp_dir();
        let result = Snapshot::load(&dir.join("nope"));
        assert!(matches!(result, Err(SnapshotError::NotFound(_))));
    }

    #[test]
    fn test_load_partial_snapshot() {
        let (_temp, dir) = temp_dir();
        std::fs::write(
            dir.join("jobs.json"),
            r#"{"jobs": [{"account": "lab", "job_state": ["RUNNING"]}]}"#,
        )
        .unwrap();
        std::fs::write(dir.join("diag.json"), r#"{"statistics": {}}"#).unwrap();

        let snapshot = Snapshot::load(&dir).unwrap();
        assert_eq!(snapshot.jobs.as_ref().unwrap().jobs.len(), 1);
        assert!(snapshot.nodes.is_none());
        assert_eq!(snapshot.present(), vec![Endpoint::Jobs, Endpoint::Diag]);
    }

    #[test]
    fn test_load_malformed_file() {
        let (_temp, dir) = temp_dir();
        std::fs::write(dir.join("nodes.json"), "{not json").unwrap();

        let err = Snapshot::load(&dir).unwrap_err();
        match err {
            SnapshotError::Json { path, .. } => assert!(path.ends_with("nodes.json")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
