//! Fanout substitution
//!
//! FCN gates drive a bounded number of neighbors, so nodes with many
//! consumers are split into chains of fanout buffers. Every buffer of a chain
//! feeds `degree - 1` consumers plus the next buffer; the last one feeds up to
//! `degree` consumers.

use crate::error::{NetworkError, Result};
use crate::network::{LogicNetwork, NodeId, NodeKind};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Fanout substitution configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FanoutParams {
    /// Maximum number of consumers of a fanout buffer
    pub degree: usize,
    /// Nodes with more consumers than this are substituted
    pub threshold: usize,
}

impl Default for FanoutParams {
    fn default() -> Self {
        Self {
            degree: 2,
            threshold: 1,
        }
    }
}

/// Return a copy of `ntk` in which no node exceeds `params.threshold` consumers
/// except fanout buffers, which drive at most `params.degree` consumers.
pub fn fanout_substitution(ntk: &LogicNetwork, params: &FanoutParams) -> Result<LogicNetwork> {
    if params.degree < 2 {
        return Err(NetworkError::InvalidFanoutDegree(params.degree));
    }

    let fanouts = ntk.fanout_counts();
    let mut result = LogicNetwork::new(ntk.name());
    let mut mapping: Vec<NodeId> = Vec::with_capacity(ntk.size());
    let mut drivers: Vec<VecDeque<NodeId>> = vec![VecDeque::new(); ntk.size()];
    let mut inserted = 0usize;

    for (id, node) in ntk.nodes() {
        let new_id = match node.kind {
            NodeKind::Pi => result.create_pi(node.name.clone().unwrap_or_default()),
            NodeKind::Gate(gate) => {
                let fanins: Vec<NodeId> = node
                    .fanins
                    .iter()
                    .map(|f| take_driver(&mut drivers, &mapping, *f))
                    .collect();
                let new_id = result.create_gate(gate, &fanins)?;
                if let Some(name) = &node.name {
                    result.set_node_name(new_id, name.clone());
                }
                new_id
            }
        };
        mapping.push(new_id);

        let consumers = fanouts[id.index()];
        if consumers > params.threshold {
            let before = result.size();
            drivers[id.index()] = build_chain(&mut result, new_id, consumers, params.degree);
            inserted += result.size() - before;
        }
    }

    for po in ntk.pos() {
        let signal = take_driver(&mut drivers, &mapping, po.signal);
        result.create_po(signal, po.name.clone());
    }

    log::debug!(
        "Fanout substitution inserted {} buffers into '{}'",
        inserted,
        ntk.name()
    );

    Ok(result)
}

/// Create the buffer chain for `root` and return one driver per consumer
fn build_chain(
    ntk: &mut LogicNetwork,
    root: NodeId,
    consumers: usize,
    degree: usize,
) -> VecDeque<NodeId> {
    let mut drivers = VecDeque::with_capacity(consumers);
    let mut current = ntk.create_buf(root);
    let mut remaining = consumers;

    while remaining > degree {
        for _ in 0..degree - 1 {
            drivers.push_back(current);
        }
        remaining -= degree - 1;
        current = ntk.create_buf(current);
    }
    for _ in 0..remaining {
        drivers.push_back(current);
    }

    drivers
}

fn take_driver(drivers: &mut [VecDeque<NodeId>], mapping: &[NodeId], old: NodeId) -> NodeId {
    drivers[old.index()]
        .pop_front()
        .unwrap_or(mapping[old.index()])
}
