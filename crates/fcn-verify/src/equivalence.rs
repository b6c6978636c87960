//! Exhaustive equivalence checking
//!
//! Simulates the layout along its stored data flow and compares it with the
//! source network on every input assignment. Inputs and outputs are matched
//! by position.

use crate::error::{Result, VerifyError};
use crate::graph::DataFlowGraph;
use fcn_layout::{GateKind, GateLevelLayout, Tile};
use fcn_network::LogicNetwork;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Largest input count checked exhaustively
pub const MAX_EXHAUSTIVE_INPUTS: usize = 20;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquivalenceResult {
    pub equivalent: bool,
    /// First input assignment (PI order) on which the two disagree
    pub counterexample: Option<Vec<bool>>,
    pub vectors_checked: u64,
}

/// Output values of `lyt` (PO order) for one input assignment (PI order)
pub fn simulate_layout(lyt: &GateLevelLayout, inputs: &[bool]) -> Result<Vec<bool>> {
    if inputs.len() != lyt.num_pis() {
        return Err(VerifyError::InputCount {
            expected: lyt.num_pis(),
            actual: inputs.len(),
        });
    }
    let order = DataFlowGraph::from_layout(lyt)
        .topological_order()
        .ok_or(VerifyError::CyclicDataFlow)?;

    let input_values: HashMap<Tile, bool> = lyt.pis().into_iter().zip(inputs.iter().copied()).collect();
    let mut values: HashMap<Tile, bool> = HashMap::with_capacity(order.len());

    for t in order {
        let Some(node) = lyt.node(&t) else {
            continue;
        };
        let mut operands = Vec::with_capacity(node.fanins.len());
        for f in &node.fanins {
            let value = values
                .get(f)
                .copied()
                .ok_or(VerifyError::UnplacedFanin { tile: t, fanin: *f })?;
            operands.push(value);
        }
        let value = match node.kind {
            GateKind::Pi => input_values.get(&t).copied().unwrap_or(false),
            GateKind::Po => operands.first().copied().unwrap_or(false),
            GateKind::Logic(gate) => gate.evaluate(&operands),
        };
        values.insert(t, value);
    }

    Ok(lyt
        .pos()
        .iter()
        .map(|t| values.get(t).copied().unwrap_or(false))
        .collect())
}

/// Compare `lyt` against `ntk` on all input assignments
pub fn check_equivalence(ntk: &LogicNetwork, lyt: &GateLevelLayout) -> Result<EquivalenceResult> {
    if ntk.num_pis() != lyt.num_pis() || ntk.num_pos() != lyt.num_pos() {
        return Err(VerifyError::InterfaceMismatch {
            network_pis: ntk.num_pis(),
            network_pos: ntk.num_pos(),
            layout_pis: lyt.num_pis(),
            layout_pos: lyt.num_pos(),
        });
    }
    let n = ntk.num_pis();
    if n > MAX_EXHAUSTIVE_INPUTS {
        return Err(VerifyError::TooManyInputs(n));
    }

    let mut result = EquivalenceResult {
        equivalent: true,
        ..Default::default()
    };
    for assignment in 0..(1u64 << n) {
        let inputs: Vec<bool> = (0..n).map(|i| (assignment >> i) & 1 == 1).collect();
        result.vectors_checked += 1;
        if ntk.simulate(&inputs)? != simulate_layout(lyt, &inputs)? {
            log::info!(
                "Layout '{}' differs from network '{}' on {:?}",
                lyt.layout_name(),
                ntk.name(),
                inputs
            );
            result.equivalent = false;
            result.counterexample = Some(inputs);
            break;
        }
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fcn_network::blueprints;

    /// Hand-placed `f = (a & b) | c` on a 2DDWave grid
    fn and_or_layout() -> GateLevelLayout {
        let mut lyt = GateLevelLayout::new(Tile::new(2, 2, 0), "and_or");
        let a = lyt.create_pi("a", Tile::new(1, 0, 0));
        let b = lyt.create_pi("b", Tile::new(0, 1, 0));
        let c = lyt.create_pi("c", Tile::new(2, 0, 0));
        let and = lyt.create_and(a, b, Tile::new(1, 1, 0));
        let or = lyt.create_or(and, c, Tile::new(2, 1, 0));
        lyt.create_po(or, "f", Tile::new(2, 2, 0));
        lyt
    }

    #[test]
    fn test_simulation() {
        let lyt = and_or_layout();
        assert_eq!(simulate_layout(&lyt, &[true, true, false]).unwrap(), vec![true]);
        assert_eq!(simulate_layout(&lyt, &[true, false, false]).unwrap(), vec![false]);
        assert!(simulate_layout(&lyt, &[true]).is_err());
    }

    #[test]
    fn test_equivalent_layout() {
        let result = check_equivalence(&blueprints::and_or_network(), &and_or_layout()).unwrap();
        assert!(result.equivalent);
        assert_eq!(result.vectors_checked, 8);
        assert!(result.counterexample.is_none());
    }

    #[test]
    fn test_counterexample() {
        let mut lyt = and_or_layout();
        lyt.clear_tile(&Tile::new(1, 1, 0));
        lyt.create_nand(Tile::new(1, 0, 0), Tile::new(0, 1, 0), Tile::new(1, 1, 0));

        let result = check_equivalence(&blueprints::and_or_network(), &lyt).unwrap();
        assert!(!result.equivalent);
        assert_eq!(result.counterexample, Some(vec![false, false, false]));
    }

    #[test]
    fn test_interface_mismatch() {
        let err = check_equivalence(&blueprints::half_adder_network(), &and_or_layout()).unwrap_err();
        assert!(matches!(err, VerifyError::InterfaceMismatch { .. }));
    }
}
