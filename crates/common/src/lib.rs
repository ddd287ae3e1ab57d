//! Shared types for the warpspace engine: lattice coordinates, the bounded
//! coordinate domain, the error taxonomy and the engine configuration.
//!
//! # Invariants
//! - Coordinates outside the declared domain are rejected, never clamped.
//! - The seed is always passed explicitly; nothing here holds global state.

mod config;
mod direction;
mod domain;
mod error;
mod types;

pub use config::{ConfigError, RouteConfig, SearchConfig, UniverseConfig};
pub use direction::Direction;
pub use domain::{CoordinateDomain, MAX_AXIS_EXTENT};
pub use error::{CoreError, CoreResult, ErrorKind};
pub use types::{ActorId, Coordinate};

/// Highest ship/building tier accepted by the attribute generator.
pub const MAX_TIER: u8 = 5;
