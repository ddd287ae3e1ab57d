use glam::IVec3;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;
use crate::types::Coordinate;

/// One of the six axis directions. Doubles as a *pyramid*: the region of
/// space whose dominant axis and sign match the direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    PosX,
    NegX,
    PosY,
    NegY,
    PosZ,
    NegZ,
}

impl Direction {
    pub const ALL: [Direction; 6] = [
        Self::PosX,
        Self::NegX,
        Self::PosY,
        Self::NegY,
        Self::PosZ,
        Self::NegZ,
    ];

    /// Pyramid containing `delta`: the axis of greatest magnitude with its
    /// sign, ties broken x > y > z. `None` only for the zero vector.
    pub fn classify(delta: IVec3) -> Option<Self> {
        let (ax, ay, az) = (
            delta.x.unsigned_abs(),
            delta.y.unsigned_abs(),
            delta.z.unsigned_abs(),
        );
        if ax == 0 && ay == 0 && az == 0 {
            return None;
        }
        let dir = if ax >= ay && ax >= az {
            if delta.x > 0 { Self::PosX } else { Self::NegX }
        } else if ay >= az {
            if delta.y > 0 { Self::PosY } else { Self::NegY }
        } else if delta.z > 0 {
            Self::PosZ
        } else {
            Self::NegZ
        };
        Some(dir)
    }

    /// Pyramid of `to` as seen from `from`.
    pub fn between(from: Coordinate, to: Coordinate) -> Option<Self> {
        Self::classify(from.delta_to(to))
    }

    pub fn opposite(self) -> Self {
        match self {
            Self::PosX => Self::NegX,
            Self::NegX => Self::PosX,
            Self::PosY => Self::NegY,
            Self::NegY => Self::PosY,
            Self::PosZ => Self::NegZ,
            Self::NegZ => Self::PosZ,
        }
    }

    /// Strict half-space test on this direction's axis only; the other two
    /// axes are unconstrained.
    pub fn half_space_contains(self, from: Coordinate, point: Coordinate) -> bool {
        match self {
            Self::PosX => point.x > from.x,
            Self::NegX => point.x < from.x,
            Self::PosY => point.y > from.y,
            Self::NegY => point.y < from.y,
            Self::PosZ => point.z > from.z,
            Self::NegZ => point.z < from.z,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::PosX => "+x",
            Self::NegX => "-x",
            Self::PosY => "+y",
            Self::NegY => "-y",
            Self::PosZ => "+z",
            Self::NegZ => "-z",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        let normalized = if normalized.len() == 1 {
            format!("+{normalized}")
        } else {
            normalized
        };
        Self::ALL
            .into_iter()
            .find(|d| d.as_str() == normalized)
            .ok_or_else(|| CoreError::UnknownDirection(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_nonzero_delta_has_exactly_one_pyramid() {
        for x in -3..=3 {
            for y in -3..=3 {
                for z in -3..=3 {
                    let delta = IVec3::new(x, y, z);
                    let dir = Direction::classify(delta);
                    if delta == IVec3::ZERO {
                        assert!(dir.is_none());
                        continue;
                    }
                    let dir = dir.unwrap();
                    // the opposite delta lands in the opposite pyramid, never the same one
                    assert_eq!(Direction::classify(-delta), Some(dir.opposite()));
                    assert_ne!(Direction::classify(-delta), Some(dir));
                }
            }
        }
    }

    fn pyramid(x: i32, y: i32, z: i32) -> Option<Direction> {
        Direction::classify(IVec3::new(x, y, z))
    }

    #[test]
    fn ties_break_x_then_y_then_z() {
        assert_eq!(pyramid(2, 2, 2), Some(Direction::PosX));
        assert_eq!(pyramid(-2, 2, 0), Some(Direction::NegX));
        assert_eq!(pyramid(0, -3, 3), Some(Direction::NegY));
        assert_eq!(pyramid(1, 1, -4), Some(Direction::NegZ));
    }

    #[test]
    fn dominant_axis_wins() {
        assert_eq!(pyramid(1, 5, -2), Some(Direction::PosY));
        assert_eq!(pyramid(-9, 5, 2), Some(Direction::NegX));
    }

    #[test]
    fn half_space_ignores_off_axis() {
        let from = Coordinate::new(0, 0, 0);
        assert!(Direction::PosX.half_space_contains(from, Coordinate::new(1, 50, -50)));
        assert!(!Direction::PosX.half_space_contains(from, Coordinate::new(0, 1, 0)));
        assert!(Direction::NegZ.half_space_contains(from, Coordinate::new(9, 9, -1)));
    }

    #[test]
    fn parse_directions() {
        assert_eq!("+x".parse::<Direction>().unwrap(), Direction::PosX);
        assert_eq!("-Z".parse::<Direction>().unwrap(), Direction::NegZ);
        assert_eq!("y".parse::<Direction>().unwrap(), Direction::PosY);
        assert!("up".parse::<Direction>().is_err());
    }

    #[test]
    fn extreme_components_do_not_overflow() {
        let delta = IVec3::new(i32::MIN, i32::MAX, 0);
        assert_eq!(Direction::classify(delta), Some(Direction::NegX));
    }
}
