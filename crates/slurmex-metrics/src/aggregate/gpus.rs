//! Cluster-wide GPU tally.
//!
//! GPU counts come from the node TRES strings rather than GRES, which carry
//! per-model names and index ranges:
//!
//! ```text
//! tres      => cpu=48,mem=1020522M,billing=48,gres/gpu=4   # 4 total gpus
//! tres_used => cpu=48,mem=1020522M,billing=48,gres/gpu=4   # 4 used gpus
//! tres      => cpu=1,mem=1M,billing=1                      # 0 total gpus
//! ```

use super::node_label;
use crate::config::{AggregateError, AggregationConfig, Family};
use crate::types::ClusterGpuMetrics;
use slurmex_api::NodesResponse;

/// Sum total and allocated GPUs over every node and derive idle and
/// utilization from them.
pub fn aggregate_gpus(
    nodes: &NodesResponse,
    config: &AggregationConfig,
) -> Result<ClusterGpuMetrics, AggregateError> {
    let policy = config.policy(Family::Gpus);
    let tag = config.gpu_tres.as_str();
    let mut gm = ClusterGpuMetrics::default();

    for (idx, node) in nodes.nodes.iter().enumerate() {
        let counts = node
            .tres_total(tag)
            .and_then(|total| Ok((total, node.tres_used(tag)?)));
        let Some((total, alloc)) = policy.resolve(Family::Gpus, || node_label(idx, node), counts)?
        else {
            continue;
        };

        let (total, alloc) = (total as i64, alloc as i64);
        gm.total += total;
        gm.alloc += alloc;
        gm.idle += total - alloc;
    }

    gm.utilization = if gm.total > 0 {
        gm.alloc as f64 / gm.total as f64
    } else {
        0.0
    };
    Ok(gm)
}
