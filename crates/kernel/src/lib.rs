//! Universe kernel: seeded system, mineral and attribute generation plus
//! the idempotent realize store.
//!
//! # Invariants
//! - Generators are pure: identical inputs give byte-identical output, with
//!   no dependence on call history, wall-clock time or global state.
//! - The declared origin always yields the fixed hub record.
//! - Each output field reads its own non-overlapping digest byte range.
//! - A realized record is stored once and never regenerated.

pub mod attributes;
pub mod digest;
pub mod minerals;
pub mod system;
pub mod universe;

pub use attributes::{AttributeSet, HullClass, Race, Stat, generate_attributes};
pub use digest::SeedDigest;
pub use minerals::{Mineral, MineralTier, available_minerals};
pub use system::{Commodity, StarType, SystemGenerator, SystemRecord};
pub use universe::{SystemCatalog, Universe, UniverseEvent};
