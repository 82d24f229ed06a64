//! Per-node inventory and cluster node-state tally.

use super::node_label;
use crate::config::{AggregateError, AggregationConfig, Family};
use crate::types::{NodeMetrics, NodeMetricsMap, NodeStateTally};
use slurmex_api::NodesResponse;
use slurmex_parsers::{join_node_states, NodeState};

/// Build memory and CPU figures for every node, keyed by hostname.
pub fn aggregate_nodes(
    nodes: &NodesResponse,
    config: &AggregationConfig,
) -> Result<NodeMetricsMap, AggregateError> {
    let policy = config.policy(Family::Nodes);
    let mut inventory = NodeMetricsMap::new();

    for (idx, node) in nodes.nodes.iter().enumerate() {
        let resolved = node
            .hostname()
            .and_then(|hostname| Ok((hostname, node.states()?)));
        let Some((hostname, states)) =
            policy.resolve(Family::Nodes, || node_label(idx, node), resolved)?
        else {
            continue;
        };

        inventory.insert(
            hostname.to_string(),
            NodeMetrics {
                mem_alloc: node.alloc_memory(),
                mem_total: node.total_memory(),
                cpu_alloc: node.alloc_cpus_or_zero(),
                cpu_idle: node.idle_cpus_or_zero(),
                cpu_other: node.other_cpus(),
                cpu_total: node.total_cpus_or_zero(),
                status: join_node_states(&states, &config.state_delimiter),
            },
        );
    }

    Ok(inventory)
}

impl NodeStateTally {
    /// Count one occurrence of `state`. States outside the tally are ignored.
    pub fn record(&mut self, state: NodeState) {
        match state {
            NodeState::Alloc => self.alloc += 1,
            NodeState::Comp => self.comp += 1,
            NodeState::Down => self.down += 1,
            NodeState::Drain => self.drain += 1,
            NodeState::Err => self.err += 1,
            NodeState::Fail => self.fail += 1,
            NodeState::Idle => self.idle += 1,
            NodeState::Maint => self.maint += 1,
            NodeState::Mix => self.mix += 1,
            NodeState::Resv => self.resv += 1,
            NodeState::NotResponding | NodeState::Invalid | NodeState::InvalidReg => {}
        }
    }
}

/// Count node state occurrences across the cluster.
pub fn aggregate_node_states(
    nodes: &NodesResponse,
    config: &AggregationConfig,
) -> Result<NodeStateTally, AggregateError> {
    let policy = config.policy(Family::NodeStates);
    let mut tally = NodeStateTally::default();

    for (idx, node) in nodes.nodes.iter().enumerate() {
        let Some(states) =
            policy.resolve(Family::NodeStates, || node_label(idx, node), node.states())?
        else {
            continue;
        };
        for state in states {
            tally.record(state);
        }
    }

    Ok(tally)
}
