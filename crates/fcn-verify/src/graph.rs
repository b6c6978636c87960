//! Data-flow graph of a gate-level layout
//!
//! Nodes are occupied tiles, edges follow the stored fanin lists. Fanins that
//! point to empty tiles have no edge.

use fcn_layout::{GateLevelLayout, Tile};
use petgraph::algo::{is_cyclic_directed, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;

pub struct DataFlowGraph {
    graph: DiGraph<Tile, ()>,
    index: HashMap<Tile, NodeIndex>,
}

impl DataFlowGraph {
    pub fn from_layout(lyt: &GateLevelLayout) -> Self {
        let mut graph = DiGraph::<Tile, ()>::new();
        let mut index = HashMap::new();

        for t in lyt.occupied_tiles() {
            index.insert(t, graph.add_node(t));
        }
        for node in lyt.nodes() {
            let Some(&consumer) = index.get(&node.tile) else {
                continue;
            };
            for fanin in &node.fanins {
                if let Some(&driver) = index.get(fanin) {
                    graph.add_edge(driver, consumer, ());
                }
            }
        }

        Self { graph, index }
    }

    pub fn is_cyclic(&self) -> bool {
        is_cyclic_directed(&self.graph)
    }

    /// Tiles with every driver before its consumers, `None` if cyclic
    pub fn topological_order(&self) -> Option<Vec<Tile>> {
        toposort(&self.graph, None)
            .ok()
            .map(|order| order.into_iter().map(|n| self.graph[n]).collect())
    }

    pub fn contains(&self, t: &Tile) -> bool {
        self.index.contains_key(t)
    }

    pub fn num_edges(&self) -> usize {
        self.graph.edge_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_follows_data_flow() {
        let mut lyt = GateLevelLayout::new(Tile::new(2, 2, 0), "g");
        // place consumers before drivers so tile order differs from data flow
        let a = Tile::new(2, 2, 0);
        let w = Tile::new(1, 1, 0);
        let o = Tile::new(0, 0, 0);
        lyt.create_po(w, "f", o);
        lyt.create_buf(a, w);
        lyt.create_pi("a", a);

        let g = DataFlowGraph::from_layout(&lyt);
        assert!(!g.is_cyclic());
        assert_eq!(g.num_edges(), 2);
        assert_eq!(g.topological_order().unwrap(), vec![a, w, o]);
    }

    #[test]
    fn test_cycle_detection() {
        let mut lyt = GateLevelLayout::new(Tile::new(1, 0, 0), "c");
        let t0 = Tile::new(0, 0, 0);
        let t1 = Tile::new(1, 0, 0);
        lyt.create_buf(t1, t0);
        lyt.create_buf(t0, t1);

        let g = DataFlowGraph::from_layout(&lyt);
        assert!(g.is_cyclic());
        assert!(g.topological_order().is_none());
    }
}
