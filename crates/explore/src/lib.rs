//! Exploration: per-actor explored coordinates and nearest-unexplored search.
//!
//! # Invariants
//!
//! - Searches are pure reads over an [`ExploredSet`] snapshot.
//! - `closest_unexplored` is exact over the whole lattice. Orbital search is
//!   exact only up to the sampling radius threshold.
//! - Equal distances always resolve to the smallest coordinate.

pub mod explored;
pub mod search;
pub mod shell;

pub use explored::{ExplorationLedger, ExploredCoordinate, ExploredSet};
pub use search::ExplorationSearch;
pub use shell::{chebyshev_shell, ring_candidates};
