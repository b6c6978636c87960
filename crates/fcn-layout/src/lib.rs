//! FCN layouts
//!
//! Layers, leaf first:
//! - `coordinates`: offset, cube and SiQAD coordinates with lazy enumeration
//! - `tile`: aspect-ratio bounded Cartesian grid ([`Topology`])
//! - `clocking` / `clocked`: clocking schemes and clocked layouts ([`Clocked`])
//! - `gate_level`: logic placed on clocked tiles
//! - `print`: ASCII rendering for debugging

pub mod clocked;
pub mod clocking;
pub mod coordinates;
pub mod error;
pub mod gate_level;
pub mod print;
pub mod tile;

pub use clocked::{Clocked, ClockedLayout};
pub use clocking::{clocking_schemes, get_clocking_scheme, ClockingScheme};
pub use coordinates::{
    to_fiction_coord, to_siqad_coord, CoordIter, Coordinate, CubeCoord, OffsetCoord, SiqadCoord,
};
pub use error::{LayoutError, Result};
pub use gate_level::{GateKind, GateLevelLayout, LayoutNode, LayoutNodeId, Signal};
pub use print::{print_gate_level_layout, render_gate_level_layout, PrintOptions};
pub use tile::{Direction, Tile, TileLayout, Topology};
