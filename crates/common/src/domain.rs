use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::types::Coordinate;

/// Largest magnitude either axis bound may take. Keeps every axis delta in
/// `i32`, every squared distance in `i64` and the lattice size in `u64`.
pub const MAX_AXIS_EXTENT: i32 = 1 << 20;

/// The bounded lattice every coordinate must live on.
///
/// Each axis spans `min..=max` in increments of `step`, starting at `min`.
/// The declared origin `(0, 0, 0)` must be a lattice point, and neither bound
/// may exceed [`MAX_AXIS_EXTENT`] in magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordinateDomain {
    pub min: i32,
    pub max: i32,
    pub step: i32,
}

impl Default for CoordinateDomain {
    fn default() -> Self {
        Self {
            min: -100,
            max: 100,
            step: 1,
        }
    }
}

impl CoordinateDomain {
    /// Build a domain and check its shape.
    pub fn new(min: i32, max: i32, step: i32) -> CoreResult<Self> {
        let domain = Self { min, max, step };
        domain.validate()?;
        Ok(domain)
    }

    pub fn validate(&self) -> CoreResult<()> {
        if self.step <= 0 {
            return Err(CoreError::InvalidDomain(format!(
                "step must be positive, got {}",
                self.step
            )));
        }
        if self.min > self.max {
            return Err(CoreError::InvalidDomain(format!(
                "min {} exceeds max {}",
                self.min, self.max
            )));
        }
        let extent = self.min.unsigned_abs().max(self.max.unsigned_abs());
        if extent > MAX_AXIS_EXTENT.unsigned_abs() {
            return Err(CoreError::InvalidDomain(format!(
                "axis bounds {}..={} exceed +/-{MAX_AXIS_EXTENT}",
                self.min, self.max
            )));
        }
        if !self.axis_contains(0) {
            return Err(CoreError::InvalidDomain(
                "origin (0, 0, 0) must be a lattice point".into(),
            ));
        }
        Ok(())
    }

    /// Number of lattice points along one axis.
    pub fn points_per_axis(&self) -> u64 {
        ((i64::from(self.max) - i64::from(self.min)) / i64::from(self.step) + 1) as u64
    }

    /// Total lattice size.
    pub fn total_points(&self) -> u64 {
        self.points_per_axis().pow(3)
    }

    fn axis_contains(&self, v: i32) -> bool {
        v >= self.min
            && v <= self.max
            && (i64::from(v) - i64::from(self.min)) % i64::from(self.step) == 0
    }

    pub fn contains(&self, c: Coordinate) -> bool {
        self.axis_contains(c.x) && self.axis_contains(c.y) && self.axis_contains(c.z)
    }

    /// Reject (never clamp) coordinates outside the lattice.
    pub fn check(&self, c: Coordinate) -> CoreResult<Coordinate> {
        if self.contains(c) {
            Ok(c)
        } else {
            Err(CoreError::OutOfDomain(c))
        }
    }

    /// Lattice index of an in-domain axis value.
    pub fn axis_index(&self, v: i32) -> i64 {
        (i64::from(v) - i64::from(self.min)) / i64::from(self.step)
    }

    /// Axis value at a lattice index, or `None` when the index falls outside.
    pub fn axis_value(&self, index: i64) -> Option<i32> {
        if index < 0 || index >= self.points_per_axis() as i64 {
            return None;
        }
        i32::try_from(i64::from(self.min) + index * i64::from(self.step)).ok()
    }

    /// Nearest lattice value to `v` on one axis, clamped into range.
    ///
    /// Only used for snapping sampled points; validation never clamps.
    pub fn snap_axis(&self, v: f64) -> i32 {
        let last = self.points_per_axis() as i64 - 1;
        let index = ((v - f64::from(self.min)) / f64::from(self.step)).round() as i64;
        let index = index.clamp(0, last);
        (i64::from(self.min) + index * i64::from(self.step)) as i32
    }

    /// Largest distance from the origin to any lattice point.
    pub fn max_radius(&self) -> f64 {
        let extent = f64::from(self.min.unsigned_abs().max(self.max.unsigned_abs()));
        (3.0 * extent * extent).sqrt()
    }

    /// Iterate every lattice point in `(x, y, z)` order.
    pub fn iter(&self) -> impl Iterator<Item = Coordinate> + '_ {
        let n = self.points_per_axis() as i64;
        (0..n).flat_map(move |ix| {
            (0..n).flat_map(move |iy| {
                (0..n).filter_map(move |iz| {
                    Some(Coordinate::new(
                        self.axis_value(ix)?,
                        self.axis_value(iy)?,
                        self.axis_value(iz)?,
                    ))
                })
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> CoordinateDomain {
        CoordinateDomain::new(0, 9, 3).unwrap()
    }

    #[test]
    fn default_domain_is_valid() {
        let domain = CoordinateDomain::default();
        domain.validate().unwrap();
        assert_eq!(domain.points_per_axis(), 201);
    }

    #[test]
    fn small_lattice_has_64_points() {
        let domain = small();
        assert_eq!(domain.total_points(), 64);
        assert_eq!(domain.iter().count(), 64);
    }

    #[test]
    fn contains_respects_step() {
        let domain = small();
        assert!(domain.contains(Coordinate::new(0, 3, 9)));
        assert!(!domain.contains(Coordinate::new(1, 3, 9)));
        assert!(!domain.contains(Coordinate::new(12, 0, 0)));
        assert!(!domain.contains(Coordinate::new(-3, 0, 0)));
    }

    #[test]
    fn check_rejects_without_clamping() {
        let domain = CoordinateDomain::default();
        let outside = Coordinate::new(101, 0, 0);
        assert_eq!(domain.check(outside), Err(CoreError::OutOfDomain(outside)));
        assert_eq!(domain.check(Coordinate::ORIGIN), Ok(Coordinate::ORIGIN));
    }

    #[test]
    fn invalid_shapes_are_rejected() {
        assert!(CoordinateDomain::new(0, 9, 0).is_err());
        assert!(CoordinateDomain::new(5, 1, 1).is_err());
        // origin off-lattice
        assert!(CoordinateDomain::new(1, 10, 3).is_err());
    }

    #[test]
    fn wide_domains_are_rejected() {
        let err = CoordinateDomain::new(-2_000_000_000, 2_000_000_000, 1).unwrap_err();
        assert!(matches!(err, CoreError::InvalidDomain(_)));
        assert!(CoordinateDomain::new(0, MAX_AXIS_EXTENT + 1, 1).is_err());
        assert!(CoordinateDomain::new(-MAX_AXIS_EXTENT - 1, 0, 1).is_err());
    }

    #[test]
    fn widest_domain_fits_every_measure() {
        let domain = CoordinateDomain::new(-MAX_AXIS_EXTENT, MAX_AXIS_EXTENT, 1).unwrap();
        assert_eq!(domain.points_per_axis(), 2 * (1 << 20) + 1);
        assert_eq!(domain.total_points(), domain.points_per_axis().pow(3));

        let low = Coordinate::new(domain.min, domain.min, domain.min);
        let high = Coordinate::new(domain.max, domain.max, domain.max);
        assert!(domain.contains(low) && domain.contains(high));
        let span = 2 * i64::from(MAX_AXIS_EXTENT);
        assert_eq!(low.distance_squared(high), 3 * span * span);
        assert_eq!(low.delta_to(high).x, 2 * MAX_AXIS_EXTENT);
        assert!((domain.max_radius() - high.distance_from_origin()).abs() < 1e-6);
    }

    #[test]
    fn axis_index_round_trips() {
        let domain = small();
        assert_eq!(domain.axis_index(6), 2);
        assert_eq!(domain.axis_value(2), Some(6));
        assert_eq!(domain.axis_value(4), None);
        assert_eq!(domain.axis_value(-1), None);
    }

    #[test]
    fn snap_axis_rounds_to_lattice() {
        let domain = small();
        assert_eq!(domain.snap_axis(4.4), 3);
        assert_eq!(domain.snap_axis(4.6), 6);
        assert_eq!(domain.snap_axis(100.0), 9);
        assert_eq!(domain.snap_axis(-7.0), 0);
    }

    #[test]
    fn max_radius_reaches_corner() {
        let domain = small();
        let corner = Coordinate::new(9, 9, 9);
        assert!((domain.max_radius() - corner.distance_from_origin()).abs() < 1e-9);
    }
}
