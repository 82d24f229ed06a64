//! REST endpoints the metrics are built from.

use std::fmt;

/// Slurm REST API version the models target.
pub const API_VERSION: &str = "v0.0.41";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Jobs,
    Nodes,
    Partitions,
    Diag,
    Shares,
}

impl Endpoint {
    pub const ALL: [Endpoint; 5] = [
        Endpoint::Jobs,
        Endpoint::Nodes,
        Endpoint::Partitions,
        Endpoint::Diag,
        Endpoint::Shares,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Self::Jobs => "jobs",
            Self::Nodes => "nodes",
            Self::Partitions => "partitions",
            Self::Diag => "diag",
            Self::Shares => "shares",
        }
    }

    /// URL path on slurmrestd, e.g. `/slurm/v0.0.41/jobs`.
    pub fn path(&self) -> String {
        format!("/slurm/{}/{}", API_VERSION, self.key())
    }

    /// File name of the saved response inside a snapshot directory.
    pub fn file_name(&self) -> String {
        format!("{}.json", self.key())
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_paths() {
        assert_eq!(Endpoint::Jobs.path(), "/slurm/v0.0.41/jobs");
        assert_eq!(Endpoint::Shares.path(), "/slurm/v0.0.41/shares");
        assert_eq!(Endpoint::Diag.file_name(), "diag.json");
    }
}
