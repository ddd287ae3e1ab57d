use warpspace_common::{Coordinate, CoordinateDomain, CoreResult, Direction, SearchConfig};

use crate::explored::ExploredSet;
use crate::shell::{chebyshev_shell, ring_candidates, shell_in_domain};

/// Nearest-unexplored queries for one actor over a snapshot of its explored
/// set.
///
/// Distances compare as exact squared integers. Equal distances resolve to
/// the smallest coordinate. The snapshot may be stale by the time results
/// are used; it is never mutated here.
#[derive(Debug, Clone)]
pub struct ExplorationSearch {
    domain: CoordinateDomain,
    config: SearchConfig,
    explored: ExploredSet,
    position: Coordinate,
}

impl ExplorationSearch {
    /// Search engine for an actor standing at the origin.
    pub fn new(domain: CoordinateDomain, config: SearchConfig, explored: ExploredSet) -> Self {
        Self {
            domain,
            config,
            explored,
            position: Coordinate::ORIGIN,
        }
    }

    /// Move the actor. The position must be a lattice point.
    pub fn at(mut self, position: Coordinate) -> CoreResult<Self> {
        self.position = self.domain.check(position)?;
        Ok(self)
    }

    pub fn position(&self) -> Coordinate {
        self.position
    }

    pub fn domain(&self) -> &CoordinateDomain {
        &self.domain
    }

    pub fn explored(&self) -> &ExploredSet {
        &self.explored
    }

    /// Lattice size.
    pub fn total(&self) -> u64 {
        self.domain.total_points()
    }

    /// Explored lattice points.
    pub fn explored_count(&self) -> u64 {
        self.explored.count_in(&self.domain)
    }

    pub fn all_explored(&self) -> bool {
        self.explored_count() == self.total()
    }

    /// Share of the lattice explored, in percent.
    pub fn progress_percentage(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        100.0 * self.explored_count() as f64 / total as f64
    }

    /// Nearest unexplored lattice point to the actor, optionally limited to
    /// the open half-space beyond the actor along `direction`. Off-axis
    /// components are unconstrained.
    ///
    /// Scans Chebyshev shells outward and stops once no further shell can
    /// beat the best hit, so the answer is exact.
    pub fn closest_unexplored(&self, direction: Option<Direction>) -> Option<Coordinate> {
        let step = i64::from(self.domain.step);
        let mut best: Option<(i64, Coordinate)> = None;
        let mut k: i64 = 0;

        while shell_in_domain(&self.domain, self.position, k) {
            let bound = k * step;
            if best.is_some_and(|(d, _)| bound * bound > d) {
                break;
            }
            for p in chebyshev_shell(&self.domain, self.position, k) {
                if self.explored.contains(p) {
                    continue;
                }
                if direction.is_some_and(|d| !d.half_space_contains(self.position, p)) {
                    continue;
                }
                let candidate = (self.position.distance_squared(p), p);
                if best.is_none_or(|b| candidate < b) {
                    best = Some(candidate);
                }
            }
            k += 1;
        }

        tracing::trace!(position = %self.position, ?direction, shells = k, "closest_unexplored");
        best.map(|(_, p)| p)
    }

    /// Nearest unexplored point on the actor's orbital ring, measured from
    /// the origin.
    ///
    /// Tries the actor's own ring first, then each larger ring up to the
    /// domain's corner, then falls back inward toward the origin. The first
    /// ring with any unexplored candidate wins; within it the point nearest
    /// the actor is returned. Rings past the sampling threshold are
    /// approximated, so a sparse unexplored point there can be missed.
    pub fn closest_unexplored_orbital(&self) -> Option<Coordinate> {
        let _span = tracing::info_span!("closest_unexplored_orbital", position = %self.position)
            .entered();
        let start = self.position.distance_from_origin().round() as u32;
        let outermost = self.domain.max_radius().ceil() as u32;

        let outward = start..=outermost.max(start);
        let inward = (0..start).rev();
        for radius in outward.chain(inward) {
            if let Some(hit) = self.nearest_on_ring(radius) {
                tracing::debug!(radius, %hit, "orbital hit");
                return Some(hit);
            }
        }
        None
    }

    fn nearest_on_ring(&self, radius: u32) -> Option<Coordinate> {
        ring_candidates(&self.domain, &self.config, radius)
            .into_iter()
            .filter(|p| !self.explored.contains(*p))
            .min_by_key(|p| (self.position.distance_squared(*p), *p))
    }
}
