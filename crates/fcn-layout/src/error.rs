//! Error types for layout construction

use thiserror::Error;

/// Errors that can occur while constructing layouts
#[derive(Debug, Error)]
pub enum LayoutError {
    /// No clocking scheme with this name exists
    #[error("Unknown clocking scheme: {0}")]
    UnknownClockingScheme(String),
}

/// Result type for layout operations
pub type Result<T> = std::result::Result<T, LayoutError>;
