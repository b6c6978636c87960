//! Error types for logic network construction

use crate::network::GateType;
use thiserror::Error;

/// Errors that can occur while building or evaluating a logic network
#[derive(Debug, Error)]
pub enum NetworkError {
    /// A signal refers to a node that does not exist
    #[error("Unknown node {0}")]
    UnknownNode(u32),

    /// A gate was created with the wrong number of fanins
    #[error("{gate} expects {expected} fanins, got {actual}")]
    ArityMismatch {
        gate: GateType,
        expected: usize,
        actual: usize,
    },

    /// Fanins must be defined before the nodes that read them
    #[error("Node {node} reads node {fanin} which is not defined before it")]
    NotTopological { node: u32, fanin: u32 },

    /// A primary input appears in the node list without being registered (or vice versa)
    #[error("Primary input list is inconsistent with node {0}")]
    InconsistentInputs(u32),

    /// Simulation received the wrong number of input values
    #[error("Expected {expected} input values, got {actual}")]
    InputCount { expected: usize, actual: usize },

    /// Fanout substitution requires every fanout node to drive at least two consumers
    #[error("Invalid fanout degree {0}, must be at least 2")]
    InvalidFanoutDegree(usize),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for network operations
pub type Result<T> = std::result::Result<T, NetworkError>;
