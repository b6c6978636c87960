//! Design-rule checking for gate-level layouts
//!
//! Walks every occupied tile and compares the stored data flow against the
//! structural and clocking rules. Findings are either warnings (the layout
//! still works) or design rule violations (DRVs). Every category can be
//! switched off through [`DrvParams`].

use crate::graph::DataFlowGraph;
use fcn_layout::{Clocked, GateKind, GateLevelLayout, LayoutNode, Tile, Topology};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;

// ============================================================================
// Configuration
// ============================================================================

/// Which checks to run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DrvParams {
    /// Fanins and fanouts must refer to placed nodes
    pub unplaced_nodes: bool,
    /// Warn about placed nodes that drive nothing
    pub placed_dead_nodes: bool,
    /// Connected tiles must be cardinal neighbors
    pub non_adjacent_connections: bool,
    /// Operand counts and fanin/fanout lists must agree
    pub missing_connections: bool,
    /// Only wires may occupy the crossing layer, and only above wires
    pub crossing_gates: bool,
    /// Every edge must follow the clocking relation
    pub clocked_data_flow: bool,
    /// The layout must have inputs and outputs
    pub has_io: bool,
    /// Inputs must drive something, outputs must read something
    pub empty_io: bool,
    /// Inputs have no fanins, outputs have exactly one fanin and no fanouts
    pub io_pins: bool,
    /// Inputs and outputs must sit on the layout border
    pub border_io: bool,
    /// The data flow must be acyclic
    pub acyclic_data_flow: bool,
}

impl Default for DrvParams {
    fn default() -> Self {
        Self {
            unplaced_nodes: true,
            placed_dead_nodes: true,
            non_adjacent_connections: true,
            missing_connections: true,
            crossing_gates: true,
            clocked_data_flow: true,
            has_io: true,
            empty_io: true,
            io_pins: true,
            border_io: false,
            acyclic_data_flow: true,
        }
    }
}

// ============================================================================
// Results
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Warning,
    Violation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DrvCategory {
    UnplacedNodes,
    PlacedDeadNodes,
    NonAdjacentConnections,
    MissingConnections,
    CrossingGates,
    ClockedDataFlow,
    HasIo,
    EmptyIo,
    IoPins,
    BorderIo,
    AcyclicDataFlow,
}

impl DrvCategory {
    pub fn name(self) -> &'static str {
        match self {
            DrvCategory::UnplacedNodes => "unplaced_nodes",
            DrvCategory::PlacedDeadNodes => "placed_dead_nodes",
            DrvCategory::NonAdjacentConnections => "non_adjacent_connections",
            DrvCategory::MissingConnections => "missing_connections",
            DrvCategory::CrossingGates => "crossing_gates",
            DrvCategory::ClockedDataFlow => "clocked_data_flow",
            DrvCategory::HasIo => "has_io",
            DrvCategory::EmptyIo => "empty_io",
            DrvCategory::IoPins => "io_pins",
            DrvCategory::BorderIo => "border_io",
            DrvCategory::AcyclicDataFlow => "acyclic_data_flow",
        }
    }
}

/// A single finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrvReport {
    pub severity: Severity,
    pub category: DrvCategory,
    pub tile: Option<Tile>,
    pub message: String,
}

impl fmt::Display for DrvReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Warning => "warning",
            Severity::Violation => "error",
        };
        write!(f, "{}: ", level)?;
        if let Some(tile) = &self.tile {
            write!(f, "{}: ", tile)?;
        }
        write!(f, "{} [{}]", self.message, self.category.name())
    }
}

/// Outcome of a design-rule check
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DrvStats {
    pub warnings: usize,
    pub drvs: usize,
    pub reports: Vec<DrvReport>,
}

impl DrvStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_clean(&self) -> bool {
        self.drvs == 0
    }

    fn warn(&mut self, category: DrvCategory, tile: Option<Tile>, message: String) {
        self.warnings += 1;
        self.reports.push(DrvReport {
            severity: Severity::Warning,
            category,
            tile,
            message,
        });
    }

    fn violation(&mut self, category: DrvCategory, tile: Option<Tile>, message: String) {
        self.drvs += 1;
        self.reports.push(DrvReport {
            severity: Severity::Violation,
            category,
            tile,
            message,
        });
    }
}

// ============================================================================
// Checks
// ============================================================================

/// Check `lyt` against the rules enabled in `params`. The report is also
/// streamed to `out` if given.
pub fn gate_level_drvs(
    lyt: &GateLevelLayout,
    params: &DrvParams,
    out: Option<&mut dyn io::Write>,
) -> DrvStats {
    let mut stats = DrvStats::new();

    if params.has_io {
        if lyt.num_pis() == 0 {
            stats.violation(DrvCategory::HasIo, None, "layout has no primary inputs".into());
        }
        if lyt.num_pos() == 0 {
            stats.violation(DrvCategory::HasIo, None, "layout has no primary outputs".into());
        }
    }

    for t in lyt.occupied_tiles() {
        if let Some(node) = lyt.node(&t) {
            check_node(lyt, params, node, &mut stats);
        }
    }

    if params.acyclic_data_flow && DataFlowGraph::from_layout(lyt).is_cyclic() {
        stats.violation(
            DrvCategory::AcyclicDataFlow,
            None,
            "data flow contains a cycle".into(),
        );
    }

    log::debug!(
        "DRV check of '{}': {} warnings, {} DRVs",
        lyt.layout_name(),
        stats.warnings,
        stats.drvs
    );

    if let Some(out) = out {
        if let Err(e) = write_report(out, lyt, &stats) {
            log::warn!("Failed to write DRV report: {}", e);
        }
    }

    stats
}

fn check_node(lyt: &GateLevelLayout, params: &DrvParams, node: &LayoutNode, stats: &mut DrvStats) {
    let t = node.tile;
    let here = Some(t);

    if params.unplaced_nodes {
        for f in node.fanins.iter().filter(|f| lyt.is_empty_tile(f)) {
            stats.violation(
                DrvCategory::UnplacedNodes,
                here,
                format!("reads from empty tile {}", f),
            );
        }
        for f in node.fanouts.iter().filter(|f| lyt.is_empty_tile(f)) {
            stats.violation(
                DrvCategory::UnplacedNodes,
                here,
                format!("drives empty tile {}", f),
            );
        }
    }

    if params.placed_dead_nodes
        && matches!(node.kind, GateKind::Logic(_))
        && node.fanouts.is_empty()
    {
        stats.warn(
            DrvCategory::PlacedDeadNodes,
            here,
            "placed node drives nothing".into(),
        );
    }

    if params.missing_connections {
        if matches!(node.kind, GateKind::Logic(_)) && node.fanins.len() != node.kind.arity() {
            stats.violation(
                DrvCategory::MissingConnections,
                here,
                format!(
                    "expects {} operands, has {}",
                    node.kind.arity(),
                    node.fanins.len()
                ),
            );
        }
        for f in &node.fanins {
            if !lyt.is_empty_tile(f) && !lyt.is_outgoing_signal(f, &t) {
                stats.violation(
                    DrvCategory::MissingConnections,
                    here,
                    format!("fanin {} does not list this tile as a fanout", f),
                );
            }
        }
        for o in &node.fanouts {
            if !lyt.is_empty_tile(o) && !lyt.is_incoming_signal(o, &t) {
                stats.violation(
                    DrvCategory::MissingConnections,
                    here,
                    format!("fanout {} does not list this tile as a fanin", o),
                );
            }
        }
    }

    if params.non_adjacent_connections {
        for f in &node.fanins {
            if !lyt.is_adjacent_elevation_of(&t, f) {
                stats.violation(
                    DrvCategory::NonAdjacentConnections,
                    here,
                    format!("fanin {} is not adjacent", f),
                );
            }
        }
    }

    if params.clocked_data_flow {
        for f in &node.fanins {
            if !lyt.is_incoming_clocked(&t, f) {
                stats.violation(
                    DrvCategory::ClockedDataFlow,
                    here,
                    format!(
                        "fanin {} is clocked {} but this tile is clocked {}",
                        f,
                        lyt.get_clock_number(f),
                        lyt.get_clock_number(&t)
                    ),
                );
            }
        }
    }

    if params.crossing_gates && lyt.is_crossing_layer(&t) {
        if !lyt.is_wire_tile(&t) {
            stats.violation(
                DrvCategory::CrossingGates,
                here,
                "only wires may occupy the crossing layer".into(),
            );
        } else {
            let ground = lyt.below(&t);
            if !lyt.is_empty_tile(&ground) && !lyt.is_wire_tile(&ground) {
                stats.violation(
                    DrvCategory::CrossingGates,
                    here,
                    format!("crosses over non-wire tile {}", ground),
                );
            }
        }
    }

    match node.kind {
        GateKind::Pi => {
            if params.empty_io && node.fanouts.is_empty() {
                stats.violation(DrvCategory::EmptyIo, here, "input drives nothing".into());
            }
            if params.io_pins && !node.fanins.is_empty() {
                stats.violation(DrvCategory::IoPins, here, "input has fanins".into());
            }
        }
        GateKind::Po => {
            if params.empty_io && node.fanins.is_empty() {
                stats.violation(DrvCategory::EmptyIo, here, "output reads nothing".into());
            }
            if params.io_pins && (node.fanins.len() > 1 || !node.fanouts.is_empty()) {
                stats.violation(
                    DrvCategory::IoPins,
                    here,
                    "output must have one fanin and no fanouts".into(),
                );
            }
        }
        GateKind::Logic(_) => {}
    }

    if params.border_io
        && matches!(node.kind, GateKind::Pi | GateKind::Po)
        && !lyt.is_at_any_border(&t)
    {
        stats.violation(
            DrvCategory::BorderIo,
            here,
            "I/O pin is not on the layout border".into(),
        );
    }
}

fn write_report(out: &mut dyn io::Write, lyt: &GateLevelLayout, stats: &DrvStats) -> io::Result<()> {
    writeln!(out, "[i] DRV check of '{}'", lyt.layout_name())?;
    for report in &stats.reports {
        writeln!(out, "    {}", report)?;
    }
    writeln!(
        out,
        "[i] {} warnings, {} DRVs",
        stats.warnings, stats.drvs
    )
}
