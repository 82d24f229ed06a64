//! Slurm REST API models for slurmex.
//!
//! Deserializes saved slurmrestd responses and exposes typed accessors
//! over their optional fields.

pub mod endpoint;
pub mod fields;
pub mod snapshot;
pub mod types;

pub use endpoint::{Endpoint, API_VERSION};
pub use fields::FieldError;
pub use snapshot::{parse_response_file, Snapshot, SnapshotError};
pub use types::{
    DiagResponse, FairShare, JobInfo, JobsResponse, NoVal, Node, NodesResponse, Partition,
    PartitionCpus, PartitionsResponse, Share, SharesList, SharesResponse,
    Statistics,
};
