//! Technology-independent logic networks
//!
//! This crate provides the input model consumed by FCN physical design:
//! - A DAG of primary inputs, gates and named primary outputs
//! - Fanout substitution to bound the out-degree of every node
//! - A small library of benchmark networks

pub mod blueprints;
pub mod error;
pub mod fanout;
pub mod network;

pub use error::{NetworkError, Result};
pub use fanout::{fanout_substitution, FanoutParams};
pub use network::{GateType, LogicNetwork, Node, NodeId, NodeKind, Output};
