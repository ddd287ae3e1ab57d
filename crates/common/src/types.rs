use glam::{DVec3, IVec3};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for an exploring actor (player, fleet, probe).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorId(pub Uuid);

impl ActorId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ActorId {
    fn default() -> Self {
        Self::new()
    }
}

/// Integer lattice coordinate of a star system.
///
/// Ordering is lexicographic on `(x, y, z)`; every tie-break in the engine
/// relies on it, so it must stay derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Coordinate {
    pub const ORIGIN: Coordinate = Coordinate { x: 0, y: 0, z: 0 };

    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Component-wise difference `other - self` as a lattice vector. Both
    /// ends must lie in a validated domain.
    pub fn delta_to(self, other: Coordinate) -> IVec3 {
        other.as_ivec3() - self.as_ivec3()
    }

    /// Exact squared Euclidean distance. Used for every comparison so that
    /// ordering never depends on floating-point rounding. Exact for any two
    /// points of a validated domain.
    pub fn distance_squared(self, other: Coordinate) -> i64 {
        let dx = i64::from(other.x) - i64::from(self.x);
        let dy = i64::from(other.y) - i64::from(self.y);
        let dz = i64::from(other.z) - i64::from(self.z);
        dx * dx + dy * dy + dz * dz
    }

    pub fn distance(self, other: Coordinate) -> f64 {
        (self.distance_squared(other) as f64).sqrt()
    }

    pub fn distance_from_origin(self) -> f64 {
        self.distance(Self::ORIGIN)
    }

    pub fn as_ivec3(self) -> IVec3 {
        IVec3::new(self.x, self.y, self.z)
    }

    pub fn as_dvec3(self) -> DVec3 {
        DVec3::new(f64::from(self.x), f64::from(self.y), f64::from(self.z))
    }

    /// Little-endian bytes of `x ‖ y ‖ z`, the canonical hashing form.
    pub fn to_le_bytes(self) -> [u8; 12] {
        let mut out = [0u8; 12];
        out[0..4].copy_from_slice(&self.x.to_le_bytes());
        out[4..8].copy_from_slice(&self.y.to_le_bytes());
        out[8..12].copy_from_slice(&self.z.to_le_bytes());
        out
    }
}

impl From<IVec3> for Coordinate {
    fn from(v: IVec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}
