//! Verification and analysis of gate-level layouts
//!
//! - Design-rule checking over stored data flow and clocking
//! - Critical-path length and throughput
//! - Exhaustive equivalence against the source network

pub mod critical_path;
pub mod drv;
pub mod equivalence;
pub mod error;
pub mod graph;

pub use critical_path::{critical_path_length_and_throughput, CriticalPathStats};
pub use drv::{gate_level_drvs, DrvCategory, DrvParams, DrvReport, DrvStats, Severity};
pub use equivalence::{check_equivalence, simulate_layout, EquivalenceResult};
pub use error::{Result, VerifyError};
