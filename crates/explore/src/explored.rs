use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use warpspace_common::{ActorId, Coordinate, CoordinateDomain};

/// A coordinate an actor has scanned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExploredCoordinate {
    pub coordinate: Coordinate,
    /// Whether a system was found there. Only ever flips `false -> true`.
    pub has_system: bool,
}

/// Per-actor store of explored coordinates.
///
/// Uses BTreeMap for deterministic iteration order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExplorationLedger {
    actors: BTreeMap<ActorId, BTreeMap<Coordinate, ExploredCoordinate>>,
}

impl ExplorationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `actor` explored `coordinate`. Returns `true` if this is
    /// the first mark for that coordinate.
    ///
    /// Re-marking is idempotent, except that `has_system` may be raised from
    /// `false` to `true`; it is never lowered.
    pub fn mark(&mut self, actor: ActorId, coordinate: Coordinate, has_system: bool) -> bool {
        let entries = self.actors.entry(actor).or_default();
        match entries.get_mut(&coordinate) {
            Some(existing) => {
                existing.has_system |= has_system;
                false
            }
            None => {
                entries.insert(
                    coordinate,
                    ExploredCoordinate {
                        coordinate,
                        has_system,
                    },
                );
                tracing::trace!(?actor, %coordinate, has_system, "coordinate explored");
                true
            }
        }
    }

    pub fn get(&self, actor: ActorId, coordinate: Coordinate) -> Option<&ExploredCoordinate> {
        self.actors.get(&actor)?.get(&coordinate)
    }

    /// Explicit markers of `actor`, in coordinate order.
    pub fn markers(&self, actor: ActorId) -> impl Iterator<Item = &ExploredCoordinate> {
        self.actors.get(&actor).into_iter().flat_map(|m| m.values())
    }

    pub fn marker_count(&self, actor: ActorId) -> usize {
        self.actors.get(&actor).map_or(0, |m| m.len())
    }

    /// The actor's explored set: explicit markers plus the coordinates of
    /// systems the actor already visited.
    pub fn explored_set(
        &self,
        actor: ActorId,
        visited: impl IntoIterator<Item = Coordinate>,
    ) -> ExploredSet {
        let mut set: ExploredSet = self.markers(actor).map(|m| m.coordinate).collect();
        set.extend(visited);
        set
    }
}

/// Snapshot of the coordinates one actor has explored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExploredSet {
    coordinates: HashSet<Coordinate>,
}

impl ExploredSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, coordinate: Coordinate) -> bool {
        self.coordinates.insert(coordinate)
    }

    pub fn contains(&self, coordinate: Coordinate) -> bool {
        self.coordinates.contains(&coordinate)
    }

    pub fn len(&self) -> usize {
        self.coordinates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coordinates.is_empty()
    }

    /// Explored coordinates that are lattice points of `domain`. Strays
    /// outside the lattice never count toward progress.
    pub fn count_in(&self, domain: &CoordinateDomain) -> u64 {
        let on_lattice = self.coordinates.iter().filter(|c| domain.contains(**c));
        on_lattice.count() as u64
    }
}

impl FromIterator<Coordinate> for ExploredSet {
    fn from_iter<I: IntoIterator<Item = Coordinate>>(iter: I) -> Self {
        Self {
            coordinates: iter.into_iter().collect(),
        }
    }
}

impl Extend<Coordinate> for ExploredSet {
    fn extend<I: IntoIterator<Item = Coordinate>>(&mut self, iter: I) {
        self.coordinates.extend(iter);
    }
}
