//! Path finding on clocked layouts

pub mod astar;
pub mod distance;

pub use astar::{a_star, a_star_distance, AStarParams, Obstruction};
pub use distance::{euclidean_distance, manhattan_distance};
