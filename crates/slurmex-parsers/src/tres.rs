//! TRES string parsing.
//!
//! Slurm describes node resources as comma-separated `name=value` pairs:
//!
//! ```text
//! cpu=48,mem=1020522M,billing=48,gres/gpu=4
//! ```

use crate::ParseError;

/// Default TRES tag for GPUs.
pub const GPU_TRES: &str = "gres/gpu";

/// Extract the count of the first resource named `tag`.
///
/// A fragment matches when it contains `tag=`, so `gres/gpumem=16G` is not a
/// match for `gres/gpu`. Returns 0 if no pair matches. A matching pair that is
/// not exactly `name=integer` is an error.
pub fn tres_count(tres: &str, tag: &str) -> Result<u64, ParseError> {
    let needle = format!("{tag}=");
    for fragment in tres.split(',') {
        if !fragment.contains(&needle) {
            continue;
        }
        let parts: Vec<&str> = fragment.split('=').collect();
        if parts.len() != 2 {
            return Err(ParseError::MalformedResource {
                fragment: fragment.to_string(),
            });
        }
        return parts[1].parse().map_err(|_| ParseError::MalformedResource {
            fragment: fragment.to_string(),
        });
    }
    Ok(0)
}
