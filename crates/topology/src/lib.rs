//! Warp-gate network: nearest-neighbour-per-pyramid maintenance and routing.
//!
//! # Invariants
//!
//! - The graph is simple and undirected: no self loops, at most one gate per
//!   pair, and both ends list each other.
//! - Every gated system holds at most one gate per pyramid, filed under the
//!   pyramid the neighbour actually falls in.
//! - All mutation goes through a [`TopologyTxn`]; an uncommitted or failed
//!   transaction leaves the graph exactly as it found it.
//! - Routing only crosses active gates. Inactive gates still hold their
//!   buckets.

pub mod coordinator;
pub mod graph;
pub mod manager;
pub mod route;

pub use coordinator::TopologyCoordinator;
pub use graph::{GateGraph, GateKey, InvariantViolation, TopologyEvent, WarpGate, gate_key};
pub use manager::{TopologyChange, TopologyTxn};
pub use route::{Route, RouteOutcome, WarpRoutePathfinder};
