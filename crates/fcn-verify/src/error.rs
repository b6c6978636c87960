//! Error types for verification

use fcn_layout::Tile;
use fcn_network::NetworkError;
use thiserror::Error;

/// Errors that can occur during verification
#[derive(Debug, Error)]
pub enum VerifyError {
    /// Exhaustive simulation is limited to small input counts
    #[error("Too many primary inputs for exhaustive checking: {0} (limit {limit})", limit = crate::equivalence::MAX_EXHAUSTIVE_INPUTS)]
    TooManyInputs(usize),

    /// The layout's data flow contains a cycle
    #[error("Layout data flow is cyclic")]
    CyclicDataFlow,

    /// A node reads from an empty tile
    #[error("Tile {tile} reads from empty tile {fanin}")]
    UnplacedFanin { tile: Tile, fanin: Tile },

    /// Network and layout disagree on their interface
    #[error("Interface mismatch: network has {network_pis} inputs/{network_pos} outputs, layout has {layout_pis}/{layout_pos}")]
    InterfaceMismatch {
        network_pis: usize,
        network_pos: usize,
        layout_pis: usize,
        layout_pos: usize,
    },

    /// Simulation received the wrong number of input values
    #[error("Expected {expected} input values, got {actual}")]
    InputCount { expected: usize, actual: usize },

    /// Network evaluation failed
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),
}

/// Result type for verification operations
pub type Result<T> = std::result::Result<T, VerifyError>;
