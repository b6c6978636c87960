//! Turn a decoded model into a gate-level layout

use super::encoding::{Instance, Placement};
use fcn_layout::{ClockingScheme, GateLevelLayout, Signal, Tile};
use fcn_network::LogicNetwork;
use std::sync::Arc;

/// Build the layout of `ntk` described by `placement`.
///
/// Primary inputs and outputs are created in network order, so the layout's
/// interface lines up with the network's. Names are carried over.
pub(crate) fn build_layout(
    ntk: &LogicNetwork,
    inst: &Instance,
    placement: &Placement,
    scheme: Arc<ClockingScheme>,
) -> GateLevelLayout {
    let aspect_ratio = Tile::new(
        placement.width - 1,
        placement.height - 1,
        placement.layers - 1,
    );
    let mut lyt = GateLevelLayout::with_scheme(aspect_ratio, scheme, ntk.name());

    for (t, clock) in &placement.clock_numbers {
        lyt.assign_clock_number(t, *clock);
    }
    for t in &placement.synchronization_elements {
        lyt.assign_synchronization_element(t, 1);
    }

    for &pi in ntk.pis() {
        let name = ntk.node_name(pi).unwrap_or_default().to_string();
        lyt.create_pi(name, placement.vertex_tiles[pi.index()]);
    }

    for (id, node) in ntk.gates() {
        let Some(gate) = node.gate_type() else {
            continue;
        };
        let v = id.index();
        let fanins: Vec<Signal> = inst.in_edges[v]
            .iter()
            .map(|e| route(&mut lyt, inst, placement, *e))
            .collect();
        let t = lyt.create_gate(gate, &fanins, placement.vertex_tiles[v]);
        if let Some(name) = &node.name {
            lyt.set_name(&t, name.clone());
        }
    }

    for (j, po) in ntk.pos().iter().enumerate() {
        let v = ntk.size() + j;
        if let Some(&e) = inst.in_edges[v].first() {
            let signal = route(&mut lyt, inst, placement, e);
            lyt.create_po(signal, po.name.clone(), placement.vertex_tiles[v]);
        }
    }

    lyt
}

/// Lay the wires of edge `e` and return the signal arriving at its consumer
fn route(lyt: &mut GateLevelLayout, inst: &Instance, placement: &Placement, e: usize) -> Signal {
    let (src, _) = inst.edges[e];
    let mut signal = placement.vertex_tiles[src];
    for t in &placement.edge_paths[e] {
        signal = lyt.create_buf(signal, *t);
    }
    signal
}
