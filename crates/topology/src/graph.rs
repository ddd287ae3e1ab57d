use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use warpspace_common::{Coordinate, Direction};

/// Unordered pair key: the smaller coordinate always comes first.
pub type GateKey = (Coordinate, Coordinate);

pub fn gate_key(a: Coordinate, b: Coordinate) -> GateKey {
    if a <= b { (a, b) } else { (b, a) }
}

/// An undirected warp gate between two gated systems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarpGate {
    pub a: Coordinate,
    pub b: Coordinate,
    pub active: bool,
}

impl WarpGate {
    pub fn key(&self) -> GateKey {
        gate_key(self.a, self.b)
    }

    pub fn other(&self, end: Coordinate) -> Coordinate {
        if self.a == end { self.b } else { self.a }
    }
}

/// A record of every topology mutation. Each event carries enough to be
/// reversed, which is how transactions roll back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TopologyEvent {
    SystemGated {
        system: Coordinate,
    },
    SystemDegated {
        system: Coordinate,
    },
    GateOpened {
        gate: WarpGate,
    },
    GateClosed {
        gate: WarpGate,
    },
    GateStatusChanged {
        a: Coordinate,
        b: Coordinate,
        old: bool,
        new: bool,
    },
}

impl TopologyEvent {
    /// Produce the inverse event (for rollback).
    pub fn inverse(&self) -> Self {
        match self {
            Self::SystemGated { system } => Self::SystemDegated { system: *system },
            Self::SystemDegated { system } => Self::SystemGated { system: *system },
            Self::GateOpened { gate } => Self::GateClosed { gate: *gate },
            Self::GateClosed { gate } => Self::GateOpened { gate: *gate },
            Self::GateStatusChanged { a, b, old, new } => Self::GateStatusChanged {
                a: *a,
                b: *b,
                old: *new,
                new: *old,
            },
        }
    }
}

/// A broken structural rule found by [`GateGraph::verify_invariants`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    SelfLoop(Coordinate),
    DanglingGate(GateKey),
    /// A bucket entry with no matching gate, or a gate missing from a bucket.
    AsymmetricBucket {
        node: Coordinate,
        direction: Direction,
    },
    /// A neighbour filed under a bucket that does not match its pyramid.
    MisfiledNeighbor {
        node: Coordinate,
        direction: Direction,
        neighbor: Coordinate,
    },
    /// Two gates claim the same bucket.
    CrowdedBucket {
        node: Coordinate,
        direction: Direction,
    },
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SelfLoop(c) => write!(f, "self loop at {c}"),
            Self::DanglingGate((a, b)) => write!(f, "gate {a}-{b} references an ungated system"),
            Self::AsymmetricBucket { node, direction } => {
                write!(f, "bucket {direction} of {node} disagrees with its gate")
            }
            Self::MisfiledNeighbor {
                node,
                direction,
                neighbor,
            } => write!(f, "{neighbor} filed under {direction} of {node}"),
            Self::CrowdedBucket { node, direction } => {
                write!(f, "bucket {direction} of {node} holds more than one gate")
            }
        }
    }
}

/// The warp-gate graph: gated systems, their per-direction buckets and the
/// gates between them.
///
/// Each node holds at most one gate per pyramid. A gate `A–B` sits in
/// bucket `Direction::between(A, B)` of `A` and the opposite bucket of `B`.
/// Uses BTreeMap throughout for deterministic iteration order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GateGraph {
    buckets: BTreeMap<Coordinate, BTreeMap<Direction, Coordinate>>,
    gates: BTreeMap<GateKey, WarpGate>,
    version: u64,
    /// Append-only log of committed mutations.
    #[serde(skip)]
    event_log: Vec<TopologyEvent>,
}

impl GateGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Monotonic counter bumped by every committed transaction.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn node_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn gate_count(&self) -> usize {
        self.gates.len()
    }

    pub fn contains(&self, system: Coordinate) -> bool {
        self.buckets.contains_key(&system)
    }

    /// Gated systems in ascending coordinate order.
    pub fn nodes(&self) -> impl Iterator<Item = Coordinate> + '_ {
        self.buckets.keys().copied()
    }

    pub fn gates(&self) -> impl Iterator<Item = &WarpGate> {
        self.gates.values()
    }

    pub fn gate(&self, a: Coordinate, b: Coordinate) -> Option<&WarpGate> {
        self.gates.get(&gate_key(a, b))
    }

    pub fn has_gate(&self, a: Coordinate, b: Coordinate) -> bool {
        self.gates.contains_key(&gate_key(a, b))
    }

    /// Neighbour held in `system`'s bucket for `direction`.
    pub fn bucket(&self, system: Coordinate, direction: Direction) -> Option<Coordinate> {
        self.buckets.get(&system)?.get(&direction).copied()
    }

    /// All `(direction, neighbour)` pairs of `system`, in direction order.
    pub fn buckets_of(&self, system: Coordinate) -> Vec<(Direction, Coordinate)> {
        self.buckets
            .get(&system)
            .map(|b| b.iter().map(|(d, n)| (*d, *n)).collect())
            .unwrap_or_default()
    }

    /// Neighbours over any gate, active or not, in ascending coordinate order.
    pub fn neighbors(&self, system: Coordinate) -> Vec<Coordinate> {
        let mut out: Vec<Coordinate> = self
            .buckets
            .get(&system)
            .map(|b| b.values().copied().collect())
            .unwrap_or_default();
        out.sort();
        out
    }

    /// Neighbours over active gates only, in ascending coordinate order.
    pub fn active_neighbors(&self, system: Coordinate) -> Vec<Coordinate> {
        self.neighbors(system)
            .into_iter()
            .filter(|n| self.gate(system, *n).is_some_and(|g| g.active))
            .collect()
    }

    pub fn degree(&self, system: Coordinate) -> usize {
        self.buckets.get(&system).map_or(0, |b| b.len())
    }

    /// Drain and return the committed event log.
    pub fn drain_events(&mut self) -> Vec<TopologyEvent> {
        std::mem::take(&mut self.event_log)
    }

    /// Read-only access to the committed event log.
    pub fn events(&self) -> &[TopologyEvent] {
        &self.event_log
    }

    pub(crate) fn record_commit(&mut self, events: Vec<TopologyEvent>) {
        self.version += 1;
        self.event_log.extend(events);
    }

    /// Apply one event to the structure without logging it.
    ///
    /// Callers guarantee the preconditions (both ends gated, buckets free);
    /// [`crate::TopologyTxn`] is the only writer.
    pub(crate) fn apply(&mut self, event: &TopologyEvent) {
        match event {
            TopologyEvent::SystemGated { system } => {
                self.buckets.entry(*system).or_default();
            }
            TopologyEvent::SystemDegated { system } => {
                debug_assert_eq!(self.degree(*system), 0, "degating a linked system");
                self.buckets.remove(system);
            }
            TopologyEvent::GateOpened { gate } => {
                if let Some(dir) = Direction::between(gate.a, gate.b) {
                    self.buckets.entry(gate.a).or_default().insert(dir, gate.b);
                    self.buckets
                        .entry(gate.b)
                        .or_default()
                        .insert(dir.opposite(), gate.a);
                    self.gates.insert(gate.key(), *gate);
                }
            }
            TopologyEvent::GateClosed { gate } => {
                if let Some(dir) = Direction::between(gate.a, gate.b) {
                    if let Some(b) = self.buckets.get_mut(&gate.a) {
                        b.remove(&dir);
                    }
                    if let Some(b) = self.buckets.get_mut(&gate.b) {
                        b.remove(&dir.opposite());
                    }
                }
                self.gates.remove(&gate.key());
            }
            TopologyEvent::GateStatusChanged { a, b, new, .. } => {
                if let Some(gate) = self.gates.get_mut(&gate_key(*a, *b)) {
                    gate.active = *new;
                }
            }
        }
    }

    /// Reconstruct a graph from a sequence of committed events (for replay).
    pub fn replay(events: &[TopologyEvent]) -> Self {
        let mut graph = Self::new();
        for event in events {
            graph.apply(event);
        }
        graph
    }

    /// Every structural rule the graph currently breaks. Empty means healthy.
    pub fn verify_invariants(&self) -> Vec<InvariantViolation> {
        let mut violations = Vec::new();
        let mut claimed: BTreeSet<(Coordinate, Direction)> = BTreeSet::new();

        for (key, gate) in &self.gates {
            if gate.a == gate.b {
                violations.push(InvariantViolation::SelfLoop(gate.a));
                continue;
            }
            if !self.contains(gate.a) || !self.contains(gate.b) {
                violations.push(InvariantViolation::DanglingGate(*key));
                continue;
            }
            let Some(dir) = Direction::between(gate.a, gate.b) else {
                continue;
            };
            for (node, d, other) in [(gate.a, dir, gate.b), (gate.b, dir.opposite(), gate.a)] {
                if !claimed.insert((node, d)) {
                    violations.push(InvariantViolation::CrowdedBucket { node, direction: d });
                }
                if self.bucket(node, d) != Some(other) {
                    violations.push(InvariantViolation::AsymmetricBucket { node, direction: d });
                }
            }
        }

        for (node, buckets) in &self.buckets {
            for (dir, neighbor) in buckets {
                if Direction::between(*node, *neighbor) != Some(*dir) {
                    violations.push(InvariantViolation::MisfiledNeighbor {
                        node: *node,
                        direction: *dir,
                        neighbor: *neighbor,
                    });
                }
                if !self.has_gate(*node, *neighbor) {
                    violations.push(InvariantViolation::AsymmetricBucket {
                        node: *node,
                        direction: *dir,
                    });
                }
            }
        }
        violations
    }

    /// Compute a deterministic hash of the graph for comparison.
    /// Uses canonical (BTreeMap) iteration order.
    pub fn state_hash(&self) -> u64 {
        let mut h: u64 = 0xcbf2_9ce4_8422_2325; // FNV offset basis
        let mix = |h: &mut u64, bytes: &[u8]| {
            for &b in bytes {
                *h ^= b as u64;
                *h = h.wrapping_mul(0x0100_0000_01b3);
            }
        };
        for node in self.buckets.keys() {
            mix(&mut h, &node.to_le_bytes());
        }
        for gate in self.gates.values() {
            mix(&mut h, &gate.a.to_le_bytes());
            mix(&mut h, &gate.b.to_le_bytes());
            mix(&mut h, &[u8::from(gate.active)]);
        }
        h
    }
}
