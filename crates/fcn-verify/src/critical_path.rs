//! Critical-path length and throughput
//!
//! Every tile holds a signal for one clock phase, so path length is counted
//! in tiles. A synchronization element on a tile adds `cycles * K` phases.
//!
//! When the operands of a gate arrive over paths of different length, the
//! layout can only accept a new input vector once the slower operand has
//! caught up. The largest such difference `d` anywhere upstream of an output
//! bounds the throughput to `1 + ceil(d / K)` clock cycles per input vector.

use crate::graph::DataFlowGraph;
use fcn_layout::{Clocked, GateLevelLayout, Tile};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Timing summary of a gate-level layout
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriticalPathStats {
    /// Longest input-to-output path in clock phases
    pub critical_path_length: u64,
    /// Clock cycles per input vector (1 is fully pipelined)
    pub throughput: u64,
    /// Tiles along one critical path, input first
    pub critical_path: Vec<Tile>,
    /// The data flow is cyclic; length and throughput are meaningless
    pub cyclic: bool,
}

#[derive(Debug, Clone, Copy, Default)]
struct Delay {
    length: u64,
    diff: u64,
}

/// Analyse the stored data flow of `lyt`
pub fn critical_path_length_and_throughput(lyt: &GateLevelLayout) -> CriticalPathStats {
    let graph = DataFlowGraph::from_layout(lyt);
    let Some(order) = graph.topological_order() else {
        log::warn!("Layout '{}' has cyclic data flow", lyt.layout_name());
        return CriticalPathStats {
            cyclic: true,
            ..Default::default()
        };
    };

    let k = lyt.num_clocks() as u64;
    let mut delays: HashMap<Tile, Delay> = HashMap::with_capacity(order.len());
    let mut slowest_fanin: HashMap<Tile, Tile> = HashMap::new();

    for t in &order {
        let extra = lyt.get_synchronization_element(t) as u64 * k;
        let placed: Vec<(Tile, Delay)> = lyt
            .fanins(t)
            .into_iter()
            .filter_map(|f| delays.get(&f).map(|d| (f, *d)))
            .collect();

        let delay = match placed.iter().max_by_key(|(_, d)| d.length) {
            None => Delay {
                length: 1 + extra,
                diff: 0,
            },
            Some((slowest, max)) => {
                let min = placed.iter().map(|(_, d)| d.length).min().unwrap_or(max.length);
                let upstream = placed.iter().map(|(_, d)| d.diff).max().unwrap_or(0);
                slowest_fanin.insert(*t, *slowest);
                Delay {
                    length: max.length + 1 + extra,
                    diff: upstream.max(max.length - min),
                }
            }
        };
        delays.insert(*t, delay);
    }

    let outputs: Vec<Tile> = if lyt.num_pos() > 0 {
        lyt.pos()
    } else {
        order.clone()
    };
    let Some((end, end_delay)) = outputs
        .iter()
        .filter_map(|t| delays.get(t).map(|d| (*t, *d)))
        .max_by_key(|(_, d)| d.length)
    else {
        return CriticalPathStats::default();
    };

    let max_diff = outputs
        .iter()
        .filter_map(|t| delays.get(t))
        .map(|d| d.diff)
        .max()
        .unwrap_or(0);

    let mut path = vec![end];
    let mut current = end;
    while let Some(prev) = slowest_fanin.get(&current) {
        path.push(*prev);
        current = *prev;
    }
    path.reverse();

    CriticalPathStats {
        critical_path_length: end_delay.length,
        throughput: 1 + max_diff.div_ceil(k.max(1)),
        critical_path: path,
        cyclic: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_straight_line() {
        let mut lyt = GateLevelLayout::new(Tile::new(3, 0, 0), "line");
        let a = lyt.create_pi("a", Tile::new(0, 0, 0));
        let w = lyt.create_buf(a, Tile::new(1, 0, 0));
        let n = lyt.create_not(w, Tile::new(2, 0, 0));
        lyt.create_po(n, "f", Tile::new(3, 0, 0));

        let stats = critical_path_length_and_throughput(&lyt);
        assert_eq!(stats.critical_path_length, 4);
        assert_eq!(stats.throughput, 1);
        assert_eq!(stats.critical_path.len(), 4);
        assert_eq!(stats.critical_path[0], a);
        assert!(!stats.cyclic);
    }

    #[test]
    fn test_balanced_gate() {
        // a and b both reach the AND after two tiles
        let mut lyt = GateLevelLayout::new(Tile::new(2, 2, 0), "bal");
        let a = lyt.create_pi("a", Tile::new(1, 0, 0));
        let b = lyt.create_pi("b", Tile::new(0, 1, 0));
        let g = lyt.create_and(a, b, Tile::new(1, 1, 0));
        lyt.create_po(g, "f", Tile::new(2, 1, 0));

        let stats = critical_path_length_and_throughput(&lyt);
        assert_eq!(stats.critical_path_length, 3);
        assert_eq!(stats.throughput, 1);
    }

    #[test]
    fn test_unbalanced_gate_lowers_throughput() {
        let mut lyt = GateLevelLayout::new(Tile::new(2, 2, 0), "unbal");
        let a = lyt.create_pi("a", Tile::new(0, 0, 0));
        let w1 = lyt.create_buf(a, Tile::new(1, 0, 0));
        let w2 = lyt.create_buf(w1, Tile::new(2, 0, 0));
        let b = lyt.create_pi("b", Tile::new(1, 1, 0));
        let g = lyt.create_and(w2, b, Tile::new(2, 1, 0));
        lyt.create_po(g, "f", Tile::new(2, 2, 0));

        let stats = critical_path_length_and_throughput(&lyt);
        assert_eq!(stats.critical_path_length, 5);
        // operand lengths 3 and 1
        assert_eq!(stats.throughput, 2);
    }

    #[test]
    fn test_synchronization_element_adds_a_cycle() {
        let mut lyt = GateLevelLayout::new(Tile::new(2, 0, 0), "se");
        let a = lyt.create_pi("a", Tile::new(0, 0, 0));
        let w = lyt.create_buf(a, Tile::new(1, 0, 0));
        lyt.create_po(w, "f", Tile::new(2, 0, 0));
        lyt.assign_synchronization_element(&w, 1);

        let stats = critical_path_length_and_throughput(&lyt);
        assert_eq!(stats.critical_path_length, 3 + 4);
    }

    #[test]
    fn test_cyclic_layout() {
        let mut lyt = GateLevelLayout::new(Tile::new(1, 0, 0), "c");
        let t0 = Tile::new(0, 0, 0);
        let t1 = Tile::new(1, 0, 0);
        lyt.create_buf(t1, t0);
        lyt.create_buf(t0, t1);

        assert!(critical_path_length_and_throughput(&lyt).cyclic);
    }
}
