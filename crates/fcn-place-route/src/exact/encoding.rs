//! CNF encoding of one candidate layout size
//!
//! Vertices are the network nodes followed by one vertex per primary output.
//! Every fanin relation is an edge that has to be routed as a chain of wire
//! tiles from the driver's tile to the consumer's tile.
//!
//! Variables, with `g` a ground tile, `t` any tile and `p` a directed pair of
//! neighboring tiles that the clocking admits:
//! - `tv[v][g]`: vertex `v` sits on `g`
//! - `tw[e][t]`: edge `e` has a wire on `t`
//! - `tc[e][p]`: edge `e` passes from the first tile of `p` to the second
//!
//! Tiles are indexed `z * area + y * width + x`, so ground tiles come first.

use crate::error::{PhysicalDesignError, Result};
use crate::sat::{at_most_one, exactly_one, Lit, SatBackend};
use fcn_layout::{ClockingScheme, Tile, TileLayout, Topology};
use fcn_network::{GateType, LogicNetwork};

// ============================================================================
// Problem instance
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum VertexKind {
    Pi,
    Po,
    Gate(GateType),
}

/// Vertices and edges to place and route
#[derive(Debug, Clone)]
pub(crate) struct Instance {
    pub kinds: Vec<VertexKind>,
    /// `(source, target)` per edge
    pub edges: Vec<(usize, usize)>,
    /// Incoming edges per vertex, in operand order
    pub in_edges: Vec<Vec<usize>>,
    pub out_edges: Vec<Vec<usize>>,
}

impl Instance {
    pub fn from_network(ntk: &LogicNetwork) -> Self {
        let mut kinds: Vec<VertexKind> = ntk
            .nodes()
            .map(|(_, node)| match node.gate_type() {
                Some(g) => VertexKind::Gate(g),
                None => VertexKind::Pi,
            })
            .collect();
        kinds.extend(std::iter::repeat(VertexKind::Po).take(ntk.num_pos()));

        let n = kinds.len();
        let mut inst = Self {
            kinds,
            edges: Vec::new(),
            in_edges: vec![Vec::new(); n],
            out_edges: vec![Vec::new(); n],
        };
        for (id, node) in ntk.nodes() {
            for fanin in &node.fanins {
                inst.add_edge(fanin.index(), id.index());
            }
        }
        for (j, po) in ntk.pos().iter().enumerate() {
            inst.add_edge(po.signal.index(), ntk.size() + j);
        }
        inst
    }

    fn add_edge(&mut self, src: usize, dst: usize) {
        let e = self.edges.len();
        self.edges.push((src, dst));
        self.out_edges[src].push(e);
        self.in_edges[dst].push(e);
    }

    pub fn num_vertices(&self) -> usize {
        self.kinds.len()
    }

    fn is_io(&self, v: usize) -> bool {
        matches!(self.kinds[v], VertexKind::Pi | VertexKind::Po)
    }

    /// Logic other than a plain wire
    fn is_logic(&self, v: usize) -> bool {
        matches!(self.kinds[v], VertexKind::Gate(g) if g != GateType::Buf)
    }
}

/// Which constraint groups to emit
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct EncodingOptions {
    pub crossings: bool,
    pub border_io: bool,
    pub synchronize: bool,
    pub straight_inverters: bool,
    pub synchronization_elements: bool,
    pub topolinano: bool,
}

/// A decoded model
#[derive(Debug, Clone)]
pub(crate) struct Placement {
    pub width: u32,
    pub height: u32,
    pub layers: u8,
    pub vertex_tiles: Vec<Tile>,
    /// Wire tiles per edge, from driver to consumer, both excluded
    pub edge_paths: Vec<Vec<Tile>>,
    /// Phases of irregular schemes
    pub clock_numbers: Vec<(Tile, u8)>,
    pub synchronization_elements: Vec<Tile>,
}

impl Placement {
    pub fn num_wires(&self) -> usize {
        self.edge_paths.iter().map(Vec::len).sum()
    }

    pub fn num_crossings(&self) -> usize {
        self.edge_paths
            .iter()
            .flatten()
            .filter(|t| t.z > 0)
            .count()
    }
}

// ============================================================================
// Encoding
// ============================================================================

pub(crate) struct Encoding {
    width: u32,
    height: u32,
    layers: u8,
    area: usize,
    tiles: Vec<Tile>,
    pairs: Vec<(usize, usize)>,
    in_pairs: Vec<Vec<usize>>,
    out_pairs: Vec<Vec<usize>>,
    tv: Vec<Vec<Lit>>,
    tw: Vec<Vec<Lit>>,
    tc: Vec<Vec<Lit>>,
    /// One-hot phase per ground tile; empty for regular schemes
    clk: Vec<Vec<Lit>>,
    /// Synchronization element per ground tile; empty unless enabled
    se: Vec<Lit>,
    /// Some wire on the tile
    wire_occ: Vec<Lit>,
}

impl Encoding {
    pub fn new<B: SatBackend + ?Sized>(
        backend: &mut B,
        inst: &Instance,
        scheme: &ClockingScheme,
        opts: &EncodingOptions,
        width: u32,
        height: u32,
    ) -> Self {
        let layers: u8 = if opts.crossings { 2 } else { 1 };
        let grid = TileLayout::new(Tile::new(width - 1, height - 1, layers - 1));
        let tiles: Vec<Tile> = grid.coordinates().collect();
        let area = (width * height) as usize;

        let mut enc = Self {
            width,
            height,
            layers,
            area,
            pairs: Vec::new(),
            in_pairs: vec![Vec::new(); tiles.len()],
            out_pairs: vec![Vec::new(); tiles.len()],
            tiles,
            tv: Vec::new(),
            tw: Vec::new(),
            tc: Vec::new(),
            clk: Vec::new(),
            se: Vec::new(),
            wire_occ: Vec::new(),
        };
        enc.build_pairs(&grid, scheme);

        let num_tiles = enc.tiles.len();
        let num_pairs = enc.pairs.len();
        enc.tv = (0..inst.num_vertices())
            .map(|_| (0..area).map(|_| backend.new_lit()).collect())
            .collect();
        enc.tw = (0..inst.edges.len())
            .map(|_| (0..num_tiles).map(|_| backend.new_lit()).collect())
            .collect();
        enc.tc = (0..inst.edges.len())
            .map(|_| (0..num_pairs).map(|_| backend.new_lit()).collect())
            .collect();

        enc.encode_placement(backend);
        enc.encode_routing(backend, inst);
        enc.encode_exclusivity(backend);
        if !scheme.is_regular() {
            enc.encode_open_clocking(backend, scheme.num_clocks);
        }
        if opts.border_io {
            enc.encode_border_io(backend, inst);
        }
        if opts.straight_inverters {
            enc.encode_straight_inverters(backend, inst);
        }
        if opts.topolinano && layers > 1 {
            enc.encode_topolinano(backend, inst);
        }
        // linear schemes fix every path length by position, so a global
        // clock would only rule out layouts
        if opts.synchronize && !scheme.is_linear() {
            enc.encode_synchronization(backend, inst, opts.synchronization_elements, scheme.num_clocks);
        }
        enc
    }

    fn index(&self, t: &Tile) -> usize {
        t.z as usize * self.area + (t.y * self.width + t.x) as usize
    }

    fn ground_of(&self, i: usize) -> usize {
        i % self.area
    }

    /// Directed neighbor pairs a signal may travel along. Regular schemes
    /// fix the direction; irregular ones leave it to the phase variables.
    fn build_pairs(&mut self, grid: &TileLayout, scheme: &ClockingScheme) {
        let k = scheme.num_clocks;
        for i in 0..self.tiles.len() {
            let t1 = self.tiles[i];
            for n in grid.adjacent_coordinates(&Tile::ground(t1.x, t1.y)) {
                if scheme.is_regular() && (scheme.clock_number(&t1) + 1) % k != scheme.clock_number(&n) {
                    continue;
                }
                for z in 0..self.layers {
                    let j = self.index(&Tile::new(n.x, n.y, z));
                    let p = self.pairs.len();
                    self.pairs.push((i, j));
                    self.out_pairs[i].push(p);
                    self.in_pairs[j].push(p);
                }
            }
        }
    }

    fn encode_placement<B: SatBackend + ?Sized>(&self, backend: &mut B) {
        for lits in &self.tv {
            exactly_one(backend, lits);
        }
        for g in 0..self.area {
            let column: Vec<Lit> = self.tv.iter().map(|lits| lits[g]).collect();
            at_most_one(backend, &column);
        }
    }

    /// Every edge forms a simple chain of wires from its driver to its
    /// consumer.
    fn encode_routing<B: SatBackend + ?Sized>(&self, backend: &mut B, inst: &Instance) {
        for (e, &(u, v)) in inst.edges.iter().enumerate() {
            let tc = &self.tc[e];
            let tw = &self.tw[e];

            for g in 0..self.area {
                let mut leaves = vec![!self.tv[u][g]];
                leaves.extend(self.out_pairs[g].iter().map(|p| tc[*p]));
                backend.add_clause(&leaves);

                let mut arrives = vec![!self.tv[v][g]];
                arrives.extend(self.in_pairs[g].iter().map(|p| tc[*p]));
                backend.add_clause(&arrives);

                for p in &self.in_pairs[g] {
                    backend.add_clause(&[!self.tv[u][g], !tc[*p]]);
                }
                for p in &self.out_pairs[g] {
                    backend.add_clause(&[!self.tv[v][g], !tc[*p]]);
                }
            }

            for t in 0..self.tiles.len() {
                let ins: Vec<Lit> = self.in_pairs[t].iter().map(|p| tc[*p]).collect();
                let outs: Vec<Lit> = self.out_pairs[t].iter().map(|p| tc[*p]).collect();

                let mut fed = vec![!tw[t]];
                fed.extend(&ins);
                backend.add_clause(&fed);
                let mut feeds = vec![!tw[t]];
                feeds.extend(&outs);
                backend.add_clause(&feeds);

                at_most_one(backend, &ins);
                at_most_one(backend, &outs);
            }

            for (p, &(i, j)) in self.pairs.iter().enumerate() {
                let mut from = vec![!tc[p], tw[i]];
                if i < self.area {
                    from.push(self.tv[u][i]);
                }
                backend.add_clause(&from);

                let mut to = vec![!tc[p], tw[j]];
                if j < self.area {
                    to.push(self.tv[v][j]);
                }
                backend.add_clause(&to);
            }
        }

        // distinct edges never share a connection
        for p in 0..self.pairs.len() {
            let users: Vec<Lit> = self.tc.iter().map(|lits| lits[p]).collect();
            at_most_one(backend, &users);
        }
    }

    fn encode_exclusivity<B: SatBackend + ?Sized>(&mut self, backend: &mut B) {
        for g in 0..self.area {
            let occupied = backend.new_lit();
            for lits in &self.tv {
                backend.add_clause(&[!lits[g], occupied]);
            }
            for lits in &self.tw {
                backend.add_clause(&[!lits[g], !occupied]);
            }
        }

        self.wire_occ = Vec::with_capacity(self.tiles.len());
        for t in 0..self.tiles.len() {
            let wires: Vec<Lit> = self.tw.iter().map(|lits| lits[t]).collect();
            at_most_one(backend, &wires);

            let occ = backend.new_lit();
            for w in &wires {
                backend.add_clause(&[!*w, occ]);
            }
            self.wire_occ.push(occ);
        }

        // crossing wires only pass over wires of other edges
        if self.layers > 1 {
            for g in 0..self.area {
                let c = g + self.area;
                for lits in &self.tw {
                    backend.add_clause(&[!lits[c], !lits[g]]);
                    let mut below = vec![!lits[c]];
                    below.extend(self.tw.iter().map(|other| other[g]));
                    backend.add_clause(&below);
                }
            }
        }
    }

    fn encode_open_clocking<B: SatBackend + ?Sized>(&mut self, backend: &mut B, num_clocks: u8) {
        let k = num_clocks as usize;
        self.clk = (0..self.area)
            .map(|_| (0..k).map(|_| backend.new_lit()).collect())
            .collect();
        for phases in &self.clk {
            exactly_one(backend, phases);
        }

        for (p, &(i, j)) in self.pairs.iter().enumerate() {
            let used = backend.new_lit();
            for lits in &self.tc {
                backend.add_clause(&[!lits[p], used]);
            }
            let (gi, gj) = (self.ground_of(i), self.ground_of(j));
            for c in 0..k {
                backend.add_clause(&[!used, !self.clk[gi][c], self.clk[gj][(c + 1) % k]]);
            }
        }
    }

    fn encode_border_io<B: SatBackend + ?Sized>(&self, backend: &mut B, inst: &Instance) {
        for v in (0..inst.num_vertices()).filter(|v| inst.is_io(*v)) {
            for g in 0..self.area {
                let t = self.tiles[g];
                let border =
                    t.x == 0 || t.y == 0 || t.x + 1 == self.width || t.y + 1 == self.height;
                if !border {
                    backend.add_clause(&[!self.tv[v][g]]);
                }
            }
        }
    }

    /// Inverters pass their signal straight through
    fn encode_straight_inverters<B: SatBackend + ?Sized>(&self, backend: &mut B, inst: &Instance) {
        for v in 0..inst.num_vertices() {
            if inst.kinds[v] != VertexKind::Gate(GateType::Not) {
                continue;
            }
            for &e_in in &inst.in_edges[v] {
                for &e_out in &inst.out_edges[v] {
                    for g in 0..self.area {
                        let here = self.tiles[g];
                        for &p_in in &self.in_pairs[g] {
                            let src = self.tiles[self.pairs[p_in].0];
                            for &p_out in &self.out_pairs[g] {
                                let dst = self.tiles[self.pairs[p_out].1];
                                let straight =
                                    src.x + dst.x == 2 * here.x && src.y + dst.y == 2 * here.y;
                                if !straight {
                                    backend.add_clause(&[
                                        !self.tv[v][g],
                                        !self.tc[e_in][p_in],
                                        !self.tc[e_out][p_out],
                                    ]);
                                }
                            }
                        }
                    }
                }
            }
        }
    }

    /// No gate next to a crossing
    fn encode_topolinano<B: SatBackend + ?Sized>(&self, backend: &mut B, inst: &Instance) {
        let grid = TileLayout::new(Tile::new(self.width - 1, self.height - 1, 0));
        let crossing: Vec<Lit> = (0..self.area)
            .map(|g| {
                let cr = backend.new_lit();
                for lits in &self.tw {
                    backend.add_clause(&[!lits[g + self.area], cr]);
                }
                cr
            })
            .collect();

        for v in (0..inst.num_vertices()).filter(|v| inst.is_logic(*v)) {
            for g in 0..self.area {
                for n in grid.adjacent_coordinates(&self.tiles[g]) {
                    backend.add_clause(&[!self.tv[v][g], !crossing[self.index(&n)]]);
                }
            }
        }
    }

    /// Every vertex receives all of its operands in the same clock phase.
    ///
    /// `time[v][k]` holds when `v` computes at step `k` (primary inputs at 0)
    /// and `at[e][t][k]` when the signal of `e` occupies `t` at step `k`.
    /// A synchronization element delays a signal by one full clock cycle.
    fn encode_synchronization<B: SatBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        inst: &Instance,
        synchronization_elements: bool,
        num_clocks: u8,
    ) {
        let k_clocks = num_clocks as usize;
        let horizon = time_horizon(self.tiles.len(), num_clocks, synchronization_elements);

        if synchronization_elements {
            self.se = (0..self.area)
                .map(|g| {
                    let se = backend.new_lit();
                    let mut wired = vec![!se];
                    wired.extend(self.tw.iter().map(|lits| lits[g]));
                    backend.add_clause(&wired);
                    se
                })
                .collect();
        }

        let time: Vec<Vec<Lit>> = (0..inst.num_vertices())
            .map(|_| (0..horizon).map(|_| backend.new_lit()).collect())
            .collect();
        for (v, steps) in time.iter().enumerate() {
            exactly_one(backend, steps);
            if inst.kinds[v] == VertexKind::Pi {
                backend.add_clause(&[steps[0]]);
            }
        }

        for (e, &(u, v)) in inst.edges.iter().enumerate() {
            let at: Vec<Vec<Lit>> = (0..self.tiles.len())
                .map(|_| (0..horizon).map(|_| backend.new_lit()).collect())
                .collect();

            for g in 0..self.area {
                for k in 0..horizon {
                    backend.add_clause(&[!self.tv[u][g], !time[u][k], at[g][k]]);
                    backend.add_clause(&[!self.tv[v][g], !at[g][k], time[v][k]]);
                }
            }

            for (p, &(i, j)) in self.pairs.iter().enumerate() {
                let tc = self.tc[e][p];
                for k in 0..horizon {
                    if self.se.is_empty() {
                        propagate(backend, &[!tc, !at[i][k]], at[j].get(k + 1));
                    } else {
                        let se = self.se[self.ground_of(j)];
                        propagate(backend, &[!tc, !at[i][k], se], at[j].get(k + 1));
                        propagate(backend, &[!tc, !at[i][k], !se], at[j].get(k + 1 + k_clocks));
                    }
                }
            }
        }
    }

    // ------------------------------------------------------------------------
    // Objectives
    // ------------------------------------------------------------------------

    pub fn wire_occupancy(&self) -> &[Lit] {
        &self.wire_occ
    }

    pub fn crossing_occupancy(&self) -> &[Lit] {
        &self.wire_occ[self.area.min(self.wire_occ.len())..]
    }

    // ------------------------------------------------------------------------
    // Decoding
    // ------------------------------------------------------------------------

    pub fn decode<B: SatBackend + ?Sized>(&self, backend: &B, inst: &Instance) -> Result<Placement> {
        let mut vertex_index = Vec::with_capacity(inst.num_vertices());
        for (v, lits) in self.tv.iter().enumerate() {
            let g = lits
                .iter()
                .position(|l| backend.value(*l))
                .ok_or_else(|| PhysicalDesignError::Internal(format!("vertex {} is unplaced", v)))?;
            vertex_index.push(g);
        }

        let mut edge_paths = Vec::with_capacity(inst.edges.len());
        for (e, &(u, v)) in inst.edges.iter().enumerate() {
            edge_paths.push(self.trace(backend, e, vertex_index[u], vertex_index[v])?);
        }

        let clock_numbers = self
            .clk
            .iter()
            .enumerate()
            .filter_map(|(g, phases)| {
                phases
                    .iter()
                    .position(|l| backend.value(*l))
                    .map(|c| (self.tiles[g], c as u8))
            })
            .collect();

        let synchronization_elements = self
            .se
            .iter()
            .enumerate()
            .filter(|(_, se)| backend.value(**se))
            .map(|(g, _)| self.tiles[g])
            .filter(|t| edge_paths.iter().flatten().any(|w: &Tile| w.x == t.x && w.y == t.y))
            .collect();

        Ok(Placement {
            width: self.width,
            height: self.height,
            layers: self.layers,
            vertex_tiles: vertex_index.iter().map(|g| self.tiles[*g]).collect(),
            edge_paths,
            clock_numbers,
            synchronization_elements,
        })
    }

    /// Follow the connections of edge `e` from its driver to its consumer
    fn trace<B: SatBackend + ?Sized>(
        &self,
        backend: &B,
        e: usize,
        from: usize,
        to: usize,
    ) -> Result<Vec<Tile>> {
        let mut path = Vec::new();
        let mut current = from;
        for _ in 0..=self.tiles.len() {
            let next = self.out_pairs[current]
                .iter()
                .find(|p| backend.value(self.tc[e][**p]))
                .map(|p| self.pairs[*p].1)
                .ok_or_else(|| {
                    PhysicalDesignError::Internal(format!("edge {} ends at {}", e, self.tiles[current]))
                })?;
            if next == to {
                return Ok(path);
            }
            path.push(self.tiles[next]);
            current = next;
        }
        Err(PhysicalDesignError::Internal(format!("edge {} does not terminate", e)))
    }
}

/// Steps needed to time any signal. A signal visits each tile at most once
/// and every visited tile may hold a synchronization element.
fn time_horizon(num_tiles: usize, num_clocks: u8, synchronization_elements: bool) -> usize {
    let per_tile = if synchronization_elements { 1 + num_clocks as usize } else { 1 };
    num_tiles * per_tile + 1
}

/// `premise -> next`, or just `!premise` past the time horizon
fn propagate<B: SatBackend + ?Sized>(backend: &mut B, premise: &[Lit], next: Option<&Lit>) {
    let mut clause = premise.to_vec();
    if let Some(next) = next {
        clause.push(*next);
    }
    backend.add_clause(&clause);
}
