//! Physical design for FCN layouts
//!
//! Maps logic networks onto clocked gate-level layouts:
//! - `exact`: SAT-based placement and routing of minimal area
//! - `path_finding`: distance functions and clocking-aware A*
//! - `sat`: the solver interface used by `exact`

pub mod error;
pub mod exact;
pub mod path_finding;
pub mod sat;

pub use error::{PhysicalDesignError, Result};
pub use exact::{exact, ExactParams, ExactStats, TechnologyConstraints};
pub use path_finding::{a_star, a_star_distance, euclidean_distance, manhattan_distance, AStarParams};
pub use sat::{SatBackend, VarisatBackend};
