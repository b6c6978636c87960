//! Gate-level layout
//!
//! A clocked layout whose tiles host the nodes of a logic network. Every
//! placed node occupies exactly one tile and signals are identified by the
//! tile that produces them.
//!
//! Data-flow edges are stored per node when the node is created. They are
//! independent of the clocking relation, which only constrains which
//! placements are legal; the design-rule checker compares the two.

use crate::clocked::{Clocked, ClockedLayout};
use crate::clocking::ClockingScheme;
use crate::error::Result;
use crate::tile::{Direction, Tile, Topology};
use fcn_network::GateType;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A signal is named by the tile of the node driving it
pub type Signal = Tile;

/// Identifier of a node placed in a layout. Ids of cleared nodes are handed
/// out again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LayoutNodeId(pub u32);

/// What a placed node computes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GateKind {
    Pi,
    Po,
    Logic(GateType),
}

impl GateKind {
    /// Number of fanins the node must have
    pub fn arity(self) -> usize {
        match self {
            GateKind::Pi => 0,
            GateKind::Po => 1,
            GateKind::Logic(g) => g.arity(),
        }
    }
}

/// A node placed on a tile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutNode {
    pub kind: GateKind,
    pub tile: Tile,
    /// Tiles providing the operands, in operand order
    pub fanins: Vec<Tile>,
    /// Tiles consuming this node's signal
    pub fanouts: Vec<Tile>,
    pub name: Option<String>,
}

/// Clocked layout populated with logic
#[derive(Debug, Clone)]
pub struct GateLevelLayout {
    clocked: ClockedLayout,
    name: String,
    /// Slot per node; `None` once its tile was cleared
    nodes: Vec<Option<LayoutNode>>,
    /// Cleared slots, reused by the next placement
    free_slots: Vec<LayoutNodeId>,
    tile_to_node: HashMap<Tile, LayoutNodeId>,
    inputs: Vec<LayoutNodeId>,
    outputs: Vec<LayoutNodeId>,
}

impl GateLevelLayout {
    /// Empty layout clocked with the default scheme
    pub fn new(aspect_ratio: Tile, name: impl Into<String>) -> Self {
        Self::from_clocked(ClockedLayout::new(aspect_ratio), name)
    }

    pub fn with_scheme(aspect_ratio: Tile, scheme: Arc<ClockingScheme>, name: impl Into<String>) -> Self {
        Self::from_clocked(ClockedLayout::with_scheme(aspect_ratio, scheme), name)
    }

    pub fn with_scheme_name(aspect_ratio: Tile, scheme: &str, name: impl Into<String>) -> Result<Self> {
        Ok(Self::from_clocked(
            ClockedLayout::with_scheme_name(aspect_ratio, scheme)?,
            name,
        ))
    }

    pub fn from_clocked(clocked: ClockedLayout, name: impl Into<String>) -> Self {
        Self {
            clocked,
            name: name.into(),
            nodes: Vec::new(),
            free_slots: Vec::new(),
            tile_to_node: HashMap::new(),
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    pub fn clocked(&self) -> &ClockedLayout {
        &self.clocked
    }

    pub fn clocked_mut(&mut self) -> &mut ClockedLayout {
        &mut self.clocked
    }

    pub fn resize(&mut self, aspect_ratio: Tile) {
        self.clocked.resize(aspect_ratio);
    }

    pub fn assign_clock_number(&mut self, t: &Tile, clock: u8) {
        self.clocked.assign_clock_number(t, clock);
    }

    pub fn assign_synchronization_element(&mut self, t: &Tile, cycles: u8) {
        self.clocked.assign_synchronization_element(t, cycles);
    }

    pub fn num_se(&self) -> usize {
        self.clocked.num_se()
    }

    pub fn layout_name(&self) -> &str {
        &self.name
    }

    pub fn set_layout_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    // ------------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------------

    fn place(&mut self, kind: GateKind, fanins: Vec<Tile>, t: Tile, name: Option<String>) -> Signal {
        debug_assert!(
            self.is_empty_tile(&t),
            "tile {} is already occupied",
            t
        );
        self.clear_tile(&t);

        let id = self
            .free_slots
            .pop()
            .unwrap_or(LayoutNodeId(self.nodes.len() as u32));
        for fanin in &fanins {
            if let Some(driver) = self.node_mut(fanin) {
                driver.fanouts.push(t);
            }
        }
        // consumers that were left dangling by an earlier clear_tile reconnect
        let fanouts: Vec<Tile> = self
            .nodes
            .iter()
            .flatten()
            .filter(|n| n.fanins.contains(&t))
            .map(|n| n.tile)
            .collect();

        match kind {
            GateKind::Pi => self.inputs.push(id),
            GateKind::Po => self.outputs.push(id),
            GateKind::Logic(_) => {}
        }
        let node = Some(LayoutNode {
            kind,
            tile: t,
            fanins,
            fanouts,
            name,
        });
        match self.nodes.get_mut(id.0 as usize) {
            Some(slot) => *slot = node,
            None => self.nodes.push(node),
        }
        self.tile_to_node.insert(t, id);
        t
    }

    pub fn create_pi(&mut self, name: impl Into<String>, t: Tile) -> Signal {
        self.place(GateKind::Pi, Vec::new(), t, Some(name.into()))
    }

    pub fn create_po(&mut self, s: Signal, name: impl Into<String>, t: Tile) -> Signal {
        self.place(GateKind::Po, vec![s], t, Some(name.into()))
    }

    /// Place a gate of any type; `fanins` must match its arity
    pub fn create_gate(&mut self, gate: GateType, fanins: &[Signal], t: Tile) -> Signal {
        debug_assert_eq!(fanins.len(), gate.arity());
        self.place(GateKind::Logic(gate), fanins.to_vec(), t, None)
    }

    pub fn create_buf(&mut self, a: Signal, t: Tile) -> Signal {
        self.create_gate(GateType::Buf, &[a], t)
    }

    pub fn create_not(&mut self, a: Signal, t: Tile) -> Signal {
        self.create_gate(GateType::Not, &[a], t)
    }

    pub fn create_and(&mut self, a: Signal, b: Signal, t: Tile) -> Signal {
        self.create_gate(GateType::And, &[a, b], t)
    }

    pub fn create_nand(&mut self, a: Signal, b: Signal, t: Tile) -> Signal {
        self.create_gate(GateType::Nand, &[a, b], t)
    }

    pub fn create_or(&mut self, a: Signal, b: Signal, t: Tile) -> Signal {
        self.create_gate(GateType::Or, &[a, b], t)
    }

    pub fn create_nor(&mut self, a: Signal, b: Signal, t: Tile) -> Signal {
        self.create_gate(GateType::Nor, &[a, b], t)
    }

    pub fn create_xor(&mut self, a: Signal, b: Signal, t: Tile) -> Signal {
        self.create_gate(GateType::Xor, &[a, b], t)
    }

    pub fn create_xnor(&mut self, a: Signal, b: Signal, t: Tile) -> Signal {
        self.create_gate(GateType::Xnor, &[a, b], t)
    }

    pub fn create_maj(&mut self, a: Signal, b: Signal, c: Signal, t: Tile) -> Signal {
        self.create_gate(GateType::Maj, &[a, b, c], t)
    }

    /// Remove the node on `t`, if any. Consumers keep referring to `t` until
    /// a new node is placed there.
    pub fn clear_tile(&mut self, t: &Tile) {
        let Some(id) = self.tile_to_node.remove(t) else {
            return;
        };
        let Some(node) = self.nodes[id.0 as usize].take() else {
            return;
        };
        for fanin in &node.fanins {
            if let Some(driver) = self.node_mut(fanin) {
                driver.fanouts.retain(|f| f != t);
            }
        }
        self.inputs.retain(|i| *i != id);
        self.outputs.retain(|o| *o != id);
        self.free_slots.push(id);
    }

    /// Move the node on `from` to the empty tile `to`, rewiring its
    /// neighbors. Returns `false` if `from` is empty.
    pub fn move_node(&mut self, from: &Tile, to: &Tile) -> bool {
        if from == to {
            return self.tile_to_node.contains_key(from);
        }
        debug_assert!(self.is_empty_tile(to), "tile {} is already occupied", to);
        let Some(id) = self.tile_to_node.remove(from) else {
            return false;
        };

        let (fanins, fanouts) = match self.nodes[id.0 as usize].as_mut() {
            Some(node) => {
                node.tile = *to;
                (node.fanins.clone(), node.fanouts.clone())
            }
            None => return false,
        };
        for fanin in &fanins {
            if let Some(driver) = self.node_mut(fanin) {
                replace_all(&mut driver.fanouts, from, to);
            }
        }
        for fanout in &fanouts {
            if let Some(consumer) = self.node_mut(fanout) {
                replace_all(&mut consumer.fanins, from, to);
            }
        }
        self.tile_to_node.insert(*to, id);
        true
    }

    pub fn set_name(&mut self, t: &Tile, name: impl Into<String>) {
        if let Some(node) = self.node_mut(t) {
            node.name = Some(name.into());
        }
    }

    // ------------------------------------------------------------------------
    // Node access
    // ------------------------------------------------------------------------

    fn node_mut(&mut self, t: &Tile) -> Option<&mut LayoutNode> {
        let id = *self.tile_to_node.get(t)?;
        self.nodes.get_mut(id.0 as usize)?.as_mut()
    }

    pub fn node(&self, t: &Tile) -> Option<&LayoutNode> {
        let id = self.tile_to_node.get(t)?;
        self.nodes.get(id.0 as usize)?.as_ref()
    }

    fn node_by_id(&self, id: LayoutNodeId) -> Option<&LayoutNode> {
        self.nodes.get(id.0 as usize)?.as_ref()
    }

    pub fn get_node(&self, t: &Tile) -> Option<LayoutNodeId> {
        self.tile_to_node.get(t).copied()
    }

    pub fn get_tile(&self, id: LayoutNodeId) -> Option<Tile> {
        self.node_by_id(id).map(|n| n.tile)
    }

    /// Placed nodes in slot order
    pub fn nodes(&self) -> impl Iterator<Item = &LayoutNode> + '_ {
        self.nodes.iter().flatten()
    }

    pub fn node_kind(&self, t: &Tile) -> Option<GateKind> {
        self.node(t).map(|n| n.kind)
    }

    pub fn gate_type_of(&self, t: &Tile) -> Option<GateType> {
        match self.node_kind(t)? {
            GateKind::Logic(g) => Some(g),
            _ => None,
        }
    }

    pub fn name(&self, t: &Tile) -> Option<&str> {
        self.node(t).and_then(|n| n.name.as_deref())
    }

    pub fn pi_at(&self, index: usize) -> Option<Tile> {
        self.inputs.get(index).and_then(|id| self.get_tile(*id))
    }

    pub fn po_at(&self, index: usize) -> Option<Tile> {
        self.outputs.get(index).and_then(|id| self.get_tile(*id))
    }

    pub fn input_name(&self, index: usize) -> Option<&str> {
        self.pi_at(index).and_then(|t| self.name(&t))
    }

    pub fn output_name(&self, index: usize) -> Option<&str> {
        self.po_at(index).and_then(|t| self.name(&t))
    }

    // ------------------------------------------------------------------------
    // Tile classification
    // ------------------------------------------------------------------------

    pub fn is_empty_tile(&self, t: &Tile) -> bool {
        !self.tile_to_node.contains_key(t)
    }

    pub fn is_pi_tile(&self, t: &Tile) -> bool {
        self.node_kind(t) == Some(GateKind::Pi)
    }

    pub fn is_po_tile(&self, t: &Tile) -> bool {
        self.node_kind(t) == Some(GateKind::Po)
    }

    /// Logic gate other than a wire
    pub fn is_gate_tile(&self, t: &Tile) -> bool {
        matches!(self.gate_type_of(t), Some(g) if g != GateType::Buf)
    }

    pub fn is_wire_tile(&self, t: &Tile) -> bool {
        self.gate_type_of(t) == Some(GateType::Buf)
    }

    pub fn is_inv_tile(&self, t: &Tile) -> bool {
        self.gate_type_of(t) == Some(GateType::Not)
    }

    /// Wire that drives more than one consumer
    pub fn is_fanout_tile(&self, t: &Tile) -> bool {
        self.is_wire_tile(t) && self.fanout_size(t) > 1
    }

    /// Wire on the crossing layer
    pub fn is_crossing_tile(&self, t: &Tile) -> bool {
        t.z == 1 && self.is_wire_tile(t)
    }

    // ------------------------------------------------------------------------
    // Counts and enumeration
    // ------------------------------------------------------------------------

    pub fn num_pis(&self) -> usize {
        self.inputs.len()
    }

    pub fn num_pos(&self) -> usize {
        self.outputs.len()
    }

    pub fn num_gates(&self) -> usize {
        self.nodes().filter(|n| self.is_gate_tile(&n.tile)).count()
    }

    pub fn num_wires(&self) -> usize {
        self.nodes().filter(|n| self.is_wire_tile(&n.tile)).count()
    }

    pub fn num_crossings(&self) -> usize {
        self.nodes().filter(|n| self.is_crossing_tile(&n.tile)).count()
    }

    /// Number of placed nodes of any kind
    pub fn size(&self) -> usize {
        self.tile_to_node.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tile_to_node.is_empty()
    }

    pub fn pis(&self) -> Vec<Tile> {
        self.inputs.iter().filter_map(|id| self.get_tile(*id)).collect()
    }

    pub fn pos(&self) -> Vec<Tile> {
        self.outputs.iter().filter_map(|id| self.get_tile(*id)).collect()
    }

    pub fn gates(&self) -> Vec<Tile> {
        self.nodes()
            .filter(|n| self.is_gate_tile(&n.tile))
            .map(|n| n.tile)
            .collect()
    }

    pub fn wires(&self) -> Vec<Tile> {
        self.nodes()
            .filter(|n| self.is_wire_tile(&n.tile))
            .map(|n| n.tile)
            .collect()
    }

    /// Occupied tiles in ascending coordinate order
    pub fn occupied_tiles(&self) -> Vec<Tile> {
        let mut tiles: Vec<Tile> = self.tile_to_node.keys().copied().collect();
        tiles.sort();
        tiles
    }

    // ------------------------------------------------------------------------
    // Data flow
    // ------------------------------------------------------------------------

    pub fn fanins(&self, t: &Tile) -> Vec<Tile> {
        self.node(t).map(|n| n.fanins.clone()).unwrap_or_default()
    }

    pub fn fanouts(&self, t: &Tile) -> Vec<Tile> {
        self.node(t).map(|n| n.fanouts.clone()).unwrap_or_default()
    }

    pub fn fanin_size(&self, t: &Tile) -> usize {
        self.node(t).map_or(0, |n| n.fanins.len())
    }

    pub fn fanout_size(&self, t: &Tile) -> usize {
        self.node(t).map_or(0, |n| n.fanouts.len())
    }

    /// `s` feeds the node on `t`
    pub fn is_incoming_signal(&self, t: &Tile, s: &Signal) -> bool {
        self.node(t).is_some_and(|n| n.fanins.contains(s))
    }

    /// The node on `t` feeds `s`
    pub fn is_outgoing_signal(&self, t: &Tile, s: &Signal) -> bool {
        self.node(t).is_some_and(|n| n.fanouts.contains(s))
    }

    /// Compass directions the inputs of `t` arrive from
    pub fn incoming_directions(&self, t: &Tile) -> Vec<Direction> {
        self.node(t)
            .map(|n| {
                n.fanins
                    .iter()
                    .filter_map(|f| self.direction_between(t, f))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Compass directions the output of `t` leaves towards
    pub fn outgoing_directions(&self, t: &Tile) -> Vec<Direction> {
        self.node(t)
            .map(|n| {
                n.fanouts
                    .iter()
                    .filter_map(|f| self.direction_between(t, f))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn has_incoming_signal_from(&self, t: &Tile, direction: Direction) -> bool {
        self.incoming_directions(t).contains(&direction)
    }

    pub fn has_outgoing_signal_towards(&self, t: &Tile, direction: Direction) -> bool {
        self.outgoing_directions(t).contains(&direction)
    }

    pub fn has_north_incoming_signal(&self, t: &Tile) -> bool {
        self.has_incoming_signal_from(t, Direction::North)
    }

    pub fn has_north_eastern_incoming_signal(&self, t: &Tile) -> bool {
        self.has_incoming_signal_from(t, Direction::NorthEast)
    }

    pub fn has_east_incoming_signal(&self, t: &Tile) -> bool {
        self.has_incoming_signal_from(t, Direction::East)
    }

    pub fn has_south_eastern_incoming_signal(&self, t: &Tile) -> bool {
        self.has_incoming_signal_from(t, Direction::SouthEast)
    }

    pub fn has_south_incoming_signal(&self, t: &Tile) -> bool {
        self.has_incoming_signal_from(t, Direction::South)
    }

    pub fn has_south_western_incoming_signal(&self, t: &Tile) -> bool {
        self.has_incoming_signal_from(t, Direction::SouthWest)
    }

    pub fn has_west_incoming_signal(&self, t: &Tile) -> bool {
        self.has_incoming_signal_from(t, Direction::West)
    }

    pub fn has_north_western_incoming_signal(&self, t: &Tile) -> bool {
        self.has_incoming_signal_from(t, Direction::NorthWest)
    }

    pub fn has_north_outgoing_signal(&self, t: &Tile) -> bool {
        self.has_outgoing_signal_towards(t, Direction::North)
    }

    pub fn has_north_eastern_outgoing_signal(&self, t: &Tile) -> bool {
        self.has_outgoing_signal_towards(t, Direction::NorthEast)
    }

    pub fn has_east_outgoing_signal(&self, t: &Tile) -> bool {
        self.has_outgoing_signal_towards(t, Direction::East)
    }

    pub fn has_south_eastern_outgoing_signal(&self, t: &Tile) -> bool {
        self.has_outgoing_signal_towards(t, Direction::SouthEast)
    }

    pub fn has_south_outgoing_signal(&self, t: &Tile) -> bool {
        self.has_outgoing_signal_towards(t, Direction::South)
    }

    pub fn has_south_western_outgoing_signal(&self, t: &Tile) -> bool {
        self.has_outgoing_signal_towards(t, Direction::SouthWest)
    }

    pub fn has_west_outgoing_signal(&self, t: &Tile) -> bool {
        self.has_outgoing_signal_towards(t, Direction::West)
    }

    pub fn has_north_western_outgoing_signal(&self, t: &Tile) -> bool {
        self.has_outgoing_signal_towards(t, Direction::NorthWest)
    }

    /// Some input enters on the side opposite to where some output leaves
    pub fn has_opposite_incoming_and_outgoing_signals(&self, t: &Tile) -> bool {
        let outgoing = self.outgoing_directions(t);
        self.incoming_directions(t)
            .iter()
            .any(|d| outgoing.contains(&d.opposite()))
    }
}

fn replace_all(tiles: &mut [Tile], from: &Tile, to: &Tile) {
    for t in tiles.iter_mut().filter(|t| *t == from) {
        *t = *to;
    }
}

impl Topology for GateLevelLayout {
    fn aspect_ratio(&self) -> Tile {
        self.clocked.aspect_ratio()
    }
}

impl Clocked for GateLevelLayout {
    fn clocking_scheme(&self) -> &ClockingScheme {
        self.clocked.clocking_scheme()
    }

    fn get_clock_number(&self, t: &Tile) -> u8 {
        self.clocked.get_clock_number(t)
    }

    fn get_synchronization_element(&self, t: &Tile) -> u8 {
        self.clocked.get_synchronization_element(t)
    }
}

impl fmt::Display for GateLevelLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::print::render_gate_level_layout(
            self,
            &crate::print::PrintOptions::default(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// `a -> NOT -> f` flowing east along row 0 of a 2DDWave layout
    fn inverter_row() -> GateLevelLayout {
        let mut lyt = GateLevelLayout::new(Tile::new(2, 1, 0), "inv");
        let a = lyt.create_pi("a", Tile::new(0, 0, 0));
        let n = lyt.create_not(a, Tile::new(1, 0, 0));
        lyt.create_po(n, "f", Tile::new(2, 0, 0));
        lyt
    }

    #[test]
    fn test_creation_and_counts() {
        let lyt = inverter_row();
        assert_eq!(lyt.num_pis(), 1);
        assert_eq!(lyt.num_pos(), 1);
        assert_eq!(lyt.num_gates(), 1);
        assert_eq!(lyt.num_wires(), 0);
        assert_eq!(lyt.size(), 3);
        assert!(lyt.is_pi_tile(&Tile::new(0, 0, 0)));
        assert!(lyt.is_gate_tile(&Tile::new(1, 0, 0)));
        assert!(lyt.is_inv_tile(&Tile::new(1, 0, 0)));
        assert!(lyt.is_po_tile(&Tile::new(2, 0, 0)));
        assert!(lyt.is_empty_tile(&Tile::new(0, 1, 0)));
        assert_eq!(lyt.input_name(0), Some("a"));
        assert_eq!(lyt.output_name(0), Some("f"));
        assert_eq!(lyt.layout_name(), "inv");
    }

    #[test]
    fn test_data_flow_edges() {
        let lyt = inverter_row();
        let n = Tile::new(1, 0, 0);
        assert_eq!(lyt.fanins(&n), vec![Tile::new(0, 0, 0)]);
        assert_eq!(lyt.fanouts(&n), vec![Tile::new(2, 0, 0)]);
        assert!(lyt.is_incoming_signal(&n, &Tile::new(0, 0, 0)));
        assert!(lyt.is_outgoing_signal(&n, &Tile::new(2, 0, 0)));
        assert!(lyt.has_west_incoming_signal(&n));
        assert!(lyt.has_east_outgoing_signal(&n));
        assert!(!lyt.has_north_incoming_signal(&n));
        assert!(lyt.has_opposite_incoming_and_outgoing_signals(&n));
    }

    #[test]
    fn test_clear_tile_is_idempotent() {
        let mut lyt = inverter_row();
        let n = Tile::new(1, 0, 0);
        lyt.clear_tile(&n);
        lyt.clear_tile(&n);
        assert!(lyt.is_empty_tile(&n));
        assert_eq!(lyt.num_gates(), 0);
        assert_eq!(lyt.fanout_size(&Tile::new(0, 0, 0)), 0);
        // the output still waits for its operand
        assert_eq!(lyt.fanins(&Tile::new(2, 0, 0)), vec![n]);

        lyt.create_buf(Tile::new(0, 0, 0), n);
        assert_eq!(lyt.fanouts(&n), vec![Tile::new(2, 0, 0)]);
        assert_eq!(lyt.num_wires(), 1);
    }

    #[test]
    fn test_cleared_slots_are_reused() {
        let mut lyt = inverter_row();
        let n = Tile::new(1, 0, 0);
        let id = lyt.get_node(&n).unwrap();
        for _ in 0..10 {
            lyt.clear_tile(&n);
            lyt.create_not(Tile::new(0, 0, 0), n);
        }
        assert_eq!(lyt.nodes.len(), 3);
        assert_eq!(lyt.get_node(&n), Some(id));
        assert_eq!(lyt.get_tile(id), Some(n));
        assert_eq!(lyt.nodes().count(), 3);
        assert_eq!(lyt.fanouts(&Tile::new(0, 0, 0)), vec![n]);
    }

    #[test]
    fn test_clearing_io_updates_lists() {
        let mut lyt = inverter_row();
        lyt.clear_tile(&Tile::new(0, 0, 0));
        lyt.clear_tile(&Tile::new(2, 0, 0));
        assert_eq!(lyt.num_pis(), 0);
        assert_eq!(lyt.num_pos(), 0);
        assert!(lyt.pis().is_empty());
    }

    #[test]
    fn test_move_node_rewires_neighbors() {
        let mut lyt = GateLevelLayout::new(Tile::new(2, 2, 0), "mv");
        let a = lyt.create_pi("a", Tile::new(0, 0, 0));
        let w = lyt.create_buf(a, Tile::new(1, 0, 0));
        lyt.create_po(w, "f", Tile::new(2, 0, 0));

        assert!(lyt.move_node(&Tile::new(1, 0, 0), &Tile::new(1, 1, 0)));
        assert!(lyt.is_empty_tile(&Tile::new(1, 0, 0)));
        assert_eq!(lyt.fanouts(&a), vec![Tile::new(1, 1, 0)]);
        assert_eq!(lyt.fanins(&Tile::new(2, 0, 0)), vec![Tile::new(1, 1, 0)]);
        assert!(!lyt.move_node(&Tile::new(0, 2, 0), &Tile::new(1, 2, 0)));
    }

    #[test]
    fn test_crossings_and_fanouts() {
        let mut lyt = GateLevelLayout::new(Tile::new(2, 2, 1), "x");
        let a = lyt.create_pi("a", Tile::new(1, 0, 0));
        let f = lyt.create_buf(a, Tile::new(1, 1, 0));
        let c = lyt.create_buf(f, Tile::new(1, 1, 1));
        lyt.create_po(c, "o1", Tile::new(1, 2, 0));
        lyt.create_po(f, "o2", Tile::new(2, 1, 0));

        assert!(lyt.is_fanout_tile(&f));
        assert!(lyt.is_crossing_tile(&c));
        assert_eq!(lyt.num_crossings(), 1);
        assert_eq!(lyt.num_wires(), 2);
        assert!(lyt.has_south_outgoing_signal(&c));
        assert_eq!(lyt.wires(), vec![f, c]);
    }

    #[test]
    fn test_get_node_and_tile_are_linked() {
        let lyt = inverter_row();
        for t in lyt.occupied_tiles() {
            let id = lyt.get_node(&t).unwrap();
            assert_eq!(lyt.get_tile(id), Some(t));
        }
        assert!(lyt.get_node(&Tile::new(0, 1, 0)).is_none());
    }
}
