//! Error types for physical design

use fcn_layout::LayoutError;
use fcn_network::NetworkError;
use thiserror::Error;

/// Errors that can occur during physical design
///
/// Running out of time is not an error: `exact` reports it as `Ok(None)`.
#[derive(Debug, Error)]
pub enum PhysicalDesignError {
    /// Clocking scheme name not in the registry
    #[error("Unknown clocking scheme: {0}")]
    UnknownClockingScheme(String),

    /// A gate needs more inputs than any tile can receive
    #[error("Node {node} has fan-in {fanin}, but at most {max} is supported")]
    HighDegreeFanin { node: String, fanin: usize, max: usize },

    /// The network branches, but the scheme cannot fan a signal out
    #[error("Network needs fanouts, but the clocking scheme allows an out-degree of {max_out_degree}")]
    UnsupportedFanout { max_out_degree: usize },

    /// Nothing to place
    #[error("Network has no nodes to place")]
    EmptyNetwork,

    /// Backend failure while solving
    #[error("SAT solver error: {0}")]
    Solver(String),

    /// The extracted layout failed its self-check
    #[error("Extracted layout has {0} design rule violations")]
    DesignRuleViolations(usize),

    /// Worker thread ended without reporting
    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Network(#[from] NetworkError),
}

impl From<LayoutError> for PhysicalDesignError {
    fn from(err: LayoutError) -> Self {
        match err {
            LayoutError::UnknownClockingScheme(name) => PhysicalDesignError::UnknownClockingScheme(name),
        }
    }
}

/// Result type for physical design operations
pub type Result<T> = std::result::Result<T, PhysicalDesignError>;
