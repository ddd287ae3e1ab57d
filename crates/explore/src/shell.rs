use glam::DVec3;
use std::collections::BTreeSet;
use warpspace_common::{Coordinate, CoordinateDomain, SearchConfig};

/// Golden angle in radians, `pi * (3 - sqrt(5))`.
const GOLDEN_ANGLE: f64 = 2.399_963_229_728_653;

/// Lattice points at Chebyshev distance exactly `k` (in lattice steps) from
/// `center`, clipped to the domain. `center` must be a lattice point.
///
/// Every point of shell `k` is at least `k * step` away from `center`.
pub fn chebyshev_shell(domain: &CoordinateDomain, center: Coordinate, k: i64) -> Vec<Coordinate> {
    let (cx, cy, cz) = (
        domain.axis_index(center.x),
        domain.axis_index(center.y),
        domain.axis_index(center.z),
    );
    let mut out = Vec::new();
    if k == 0 {
        out.push(center);
        return out;
    }
    for dx in -k..=k {
        let Some(x) = domain.axis_value(cx + dx) else {
            continue;
        };
        for dy in -k..=k {
            let Some(y) = domain.axis_value(cy + dy) else {
                continue;
            };
            let on_face = dx.abs() == k || dy.abs() == k;
            let mut push = |dz: i64| {
                if let Some(z) = domain.axis_value(cz + dz) {
                    out.push(Coordinate::new(x, y, z));
                }
            };
            if on_face {
                for dz in -k..=k {
                    push(dz);
                }
            } else {
                push(-k);
                push(k);
            }
        }
    }
    out
}

/// Whether the Chebyshev shell `k` around `center` still has any lattice
/// point inside the domain.
pub fn shell_in_domain(domain: &CoordinateDomain, center: Coordinate, k: i64) -> bool {
    let last = domain.points_per_axis() as i64 - 1;
    [center.x, center.y, center.z].into_iter().any(|v| {
        let i = domain.axis_index(v);
        i - k >= 0 || i + k <= last
    })
}

/// Candidate lattice points on the ring (spherical shell around the origin)
/// of radius `radius`, sorted and deduplicated.
///
/// Up to `sampling_radius_threshold` the ring is enumerated exactly: every
/// lattice point whose distance from the origin is within `ring_tolerance`
/// of `radius`. Larger rings are approximated by `sample_count` golden-angle
/// spiral points plus the six axis extremes, each snapped to the lattice.
/// The sampled form bounds cost and does not guarantee coverage.
pub fn ring_candidates(
    domain: &CoordinateDomain,
    config: &SearchConfig,
    radius: u32,
) -> Vec<Coordinate> {
    if radius <= config.sampling_radius_threshold {
        exact_ring(domain, radius, config.ring_tolerance)
    } else {
        sampled_ring(domain, radius, config)
    }
}

fn exact_ring(domain: &CoordinateDomain, radius: u32, tolerance: f64) -> Vec<Coordinate> {
    let r = f64::from(radius);
    let outer = r + tolerance;
    let inner = (r - tolerance).max(0.0);
    let (outer_sq, inner_sq) = (outer * outer, inner * inner);

    let axis: Vec<i32> = (0..domain.points_per_axis() as i64)
        .filter_map(|i| domain.axis_value(i))
        .filter(|v| f64::from(*v).abs() <= outer)
        .collect();

    let mut out = Vec::new();
    for &x in &axis {
        let xx = f64::from(x) * f64::from(x);
        for &y in &axis {
            let xy = xx + f64::from(y) * f64::from(y);
            if xy > outer_sq {
                continue;
            }
            for &z in &axis {
                let d = xy + f64::from(z) * f64::from(z);
                if d >= inner_sq && d <= outer_sq {
                    out.push(Coordinate::new(x, y, z));
                }
            }
        }
    }
    out
}

fn sampled_ring(domain: &CoordinateDomain, radius: u32, config: &SearchConfig) -> Vec<Coordinate> {
    let r = f64::from(radius);
    let slack = config.ring_tolerance + f64::from(domain.step);
    let (lo, hi) = (f64::from(domain.min), f64::from(domain.max));
    let half_step = f64::from(domain.step) / 2.0;
    let snap = |p: DVec3| {
        if [p.x, p.y, p.z]
            .iter()
            .any(|v| *v < lo - half_step || *v > hi + half_step)
        {
            return None;
        }
        let snapped = Coordinate::new(
            domain.snap_axis(p.x),
            domain.snap_axis(p.y),
            domain.snap_axis(p.z),
        );
        ((snapped.as_dvec3().length() - r).abs() <= slack).then_some(snapped)
    };

    let samples = config.sample_count;
    let n = f64::from(samples.max(1));
    let spiral = (0..samples).map(|i| {
        let fi = f64::from(i);
        let y = 1.0 - 2.0 * (fi + 0.5) / n;
        let ring = (1.0 - y * y).max(0.0).sqrt();
        let theta = GOLDEN_ANGLE * fi;
        DVec3::new(theta.cos() * ring, y, theta.sin() * ring)
    });
    let extremes = [
        DVec3::X,
        DVec3::NEG_X,
        DVec3::Y,
        DVec3::NEG_Y,
        DVec3::Z,
        DVec3::NEG_Z,
    ];

    let points: BTreeSet<Coordinate> = spiral
        .chain(extremes)
        .filter_map(|unit| snap(unit * r))
        .collect();
    points.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> CoordinateDomain {
        CoordinateDomain::new(0, 9, 3).unwrap()
    }

    #[test]
    fn shells_partition_the_lattice() {
        let domain = small();
        let center = Coordinate::new(3, 6, 0);
        let mut seen = BTreeSet::new();
        let mut k = 0;
        while shell_in_domain(&domain, center, k) {
            for p in chebyshev_shell(&domain, center, k) {
                assert!(domain.contains(p));
                assert!(seen.insert(p), "{p} appears in two shells");
            }
            k += 1;
        }
        assert_eq!(seen.len(), 64);
    }

    #[test]
    fn shell_points_respect_lower_bound() {
        let domain = CoordinateDomain::new(-6, 6, 1).unwrap();
        let center = Coordinate::new(1, -2, 0);
        for k in 0..4 {
            for p in chebyshev_shell(&domain, center, k) {
                assert!(center.distance_squared(p) >= k * k);
            }
        }
    }

    #[test]
    fn exact_ring_matches_brute_force() {
        let domain = CoordinateDomain::new(-10, 10, 1).unwrap();
        let config = SearchConfig::default();
        let ring = ring_candidates(&domain, &config, 5);
        let expected: Vec<Coordinate> = domain
            .iter()
            .filter(|p| (p.distance_from_origin() - 5.0).abs() <= config.ring_tolerance)
            .collect();
        assert_eq!(ring, expected);
        assert!(ring.contains(&Coordinate::new(0, 0, 5)));
        assert!(ring.contains(&Coordinate::new(3, 4, 0)));
    }

    #[test]
    fn ring_zero_is_origin() {
        let domain = small();
        let ring = ring_candidates(&domain, &SearchConfig::default(), 0);
        assert_eq!(ring, vec![Coordinate::ORIGIN]);
    }

    #[test]
    fn sampled_ring_includes_axis_extremes() {
        let domain = CoordinateDomain::default();
        let config = SearchConfig {
            sampling_radius_threshold: 10,
            sample_count: 64,
            ring_tolerance: 0.5,
        };
        let ring = ring_candidates(&domain, &config, 40);
        for p in [
            Coordinate::new(40, 0, 0),
            Coordinate::new(-40, 0, 0),
            Coordinate::new(0, 40, 0),
            Coordinate::new(0, -40, 0),
            Coordinate::new(0, 0, 40),
            Coordinate::new(0, 0, -40),
        ] {
            assert!(ring.contains(&p), "missing {p}");
        }
        assert!(ring.len() <= 70);
        assert!(ring.iter().all(|p| domain.contains(*p)));
        assert!(ring.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn sampled_ring_beyond_the_faces_stays_on_the_ring() {
        let domain = CoordinateDomain::default();
        let config = SearchConfig::default();
        let slack = config.ring_tolerance + f64::from(domain.step);
        for radius in [config.sampling_radius_threshold + 1, 120, 150] {
            let ring = ring_candidates(&domain, &config, radius);
            assert!(!ring.is_empty(), "r={radius} has no candidates");
            for p in &ring {
                assert!(domain.contains(*p));
                let off = (p.distance_from_origin() - f64::from(radius)).abs();
                assert!(off <= slack, "r={radius}: {p} is {off:.2} off the ring");
            }
        }
        // no axis extreme survives once the ring leaves the cube
        let ring = ring_candidates(&domain, &config, 150);
        assert!(!ring.contains(&Coordinate::new(-100, 0, 0)));
        assert!(!ring.contains(&Coordinate::new(100, 0, 0)));
    }

    #[test]
    fn sampled_ring_outside_the_domain_is_empty() {
        let domain = CoordinateDomain::default();
        let config = SearchConfig::default();
        assert!(ring_candidates(&domain, &config, 200).is_empty());
    }

    #[test]
    fn sampled_ring_is_deterministic() {
        let domain = CoordinateDomain::default();
        let config = SearchConfig {
            sampling_radius_threshold: 0,
            ..SearchConfig::default()
        };
        assert_eq!(
            ring_candidates(&domain, &config, 77),
            ring_candidates(&domain, &config, 77)
        );
    }
}
