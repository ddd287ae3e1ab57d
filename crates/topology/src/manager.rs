use std::collections::{BTreeMap, VecDeque};
use warpspace_common::{Coordinate, CoreError, CoreResult, Direction};
use warpspace_kernel::SystemCatalog;

use crate::graph::{GateGraph, GateKey, TopologyEvent, WarpGate};

/// Net effect of a committed transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopologyChange {
    pub opened: Vec<WarpGate>,
    pub closed: Vec<WarpGate>,
    /// Graph version after the commit.
    pub version: u64,
}

impl TopologyChange {
    pub fn is_empty(&self) -> bool {
        self.opened.is_empty() && self.closed.is_empty()
    }
}

/// A single structural change to a [`GateGraph`].
///
/// Every mutation is applied immediately and journaled. `commit` keeps the
/// changes and bumps the graph version; `rollback`, or dropping the
/// transaction uncommitted, replays the journal's inverses in reverse so no
/// partial change survives.
///
/// Bucket rules: a node `C` is an eligible partner for `N` when `C`'s bucket
/// facing `N` is empty, already holds `N`, or holds something strictly
/// farther from `C` than `N`; the same holds on `N`'s side. Connecting
/// displaces farther occupants, and every bucket emptied that way is queued
/// for repair. Repairs run until no gated pair is mutually eligible without
/// sharing a gate.
///
/// Pairs rank by `(distance², lower end, upper end)`, a total order both ends
/// agree on. Every connect swaps two worse gates for one better one, so the
/// ascending list of gate ranks strictly improves and the repair loop ends.
pub struct TopologyTxn<'g> {
    graph: &'g mut GateGraph,
    journal: Vec<TopologyEvent>,
    repair_queue: VecDeque<(Coordinate, Direction)>,
    finished: bool,
}

impl<'g> TopologyTxn<'g> {
    pub fn begin(graph: &'g mut GateGraph) -> Self {
        Self {
            graph,
            journal: Vec::new(),
            repair_queue: VecDeque::new(),
            finished: false,
        }
    }

    /// The graph as seen inside the transaction, uncommitted changes included.
    pub fn graph(&self) -> &GateGraph {
        self.graph
    }

    /// Number of journaled events so far.
    pub fn pending(&self) -> usize {
        self.journal.len()
    }

    /// Gate `system` into the network and connect it to the nearest eligible
    /// system in each of its six pyramids.
    ///
    /// Idempotent: linking an already linked system changes nothing unless
    /// the surroundings moved since.
    pub fn link(&mut self, catalog: &impl SystemCatalog, system: Coordinate) -> CoreResult<()> {
        let _span = tracing::info_span!("topology_link", %system).entered();
        require_realized(catalog, system)?;
        if !self.graph.contains(system) {
            self.record(TopologyEvent::SystemGated { system });
        }
        for direction in Direction::ALL {
            self.connect_nearest(system, direction);
        }
        self.drain_repairs();
        Ok(())
    }

    /// Offer `system` to every other gated system: each one whose bucket
    /// facing `system` is empty or holds something strictly farther switches
    /// to `system`, provided `system`'s own bucket accepts it.
    pub fn relink_neighbors(&mut self, system: Coordinate) -> CoreResult<()> {
        let _span = tracing::info_span!("topology_relink", %system).entered();
        if !self.graph.contains(system) {
            return Err(CoreError::NotGated(system));
        }
        let others: Vec<Coordinate> = self.graph.nodes().filter(|n| *n != system).collect();
        for other in others {
            if self.eligible(other, system) && !self.graph.has_gate(other, system) {
                self.connect(other, system);
            }
        }
        self.drain_repairs();
        Ok(())
    }

    /// [`Self::link`] followed by [`Self::relink_neighbors`].
    pub fn insert(&mut self, catalog: &impl SystemCatalog, system: Coordinate) -> CoreResult<()> {
        self.link(catalog, system)?;
        self.relink_neighbors(system)
    }

    /// Remove `system` and all of its gates, then repair the bucket each
    /// former neighbour lost. Unlinking an ungated system is a no-op.
    pub fn unlink(&mut self, catalog: &impl SystemCatalog, system: Coordinate) -> CoreResult<()> {
        let _span = tracing::info_span!("topology_unlink", %system).entered();
        require_realized(catalog, system)?;
        if !self.graph.contains(system) {
            return Ok(());
        }
        let former = self.graph.buckets_of(system);
        for (direction, neighbor) in &former {
            if let Some(gate) = self.graph.gate(system, *neighbor).copied() {
                self.record(TopologyEvent::GateClosed { gate });
            }
            self.repair_queue.push_back((*neighbor, direction.opposite()));
        }
        self.record(TopologyEvent::SystemDegated { system });
        tracing::debug!(%system, former_neighbors = former.len(), "system unlinked");
        self.drain_repairs();
        Ok(())
    }

    /// Toggle whether the gate between `a` and `b` carries traffic. Inactive
    /// gates still occupy their buckets.
    pub fn set_gate_active(
        &mut self,
        a: Coordinate,
        b: Coordinate,
        active: bool,
    ) -> CoreResult<()> {
        let gate = self
            .graph
            .gate(a, b)
            .copied()
            .ok_or(CoreError::UnknownGate(a, b))?;
        if gate.active != active {
            self.record(TopologyEvent::GateStatusChanged {
                a: gate.a,
                b: gate.b,
                old: gate.active,
                new: active,
            });
        }
        Ok(())
    }

    /// Keep every change and bump the graph version (only if something
    /// changed).
    pub fn commit(mut self) -> TopologyChange {
        self.finished = true;
        let journal = std::mem::take(&mut self.journal);
        let (opened, closed) = net_gate_diff(&journal);
        if !journal.is_empty() {
            self.graph.record_commit(journal);
        }
        let change = TopologyChange {
            opened,
            closed,
            version: self.graph.version(),
        };
        tracing::debug!(
            opened = change.opened.len(),
            closed = change.closed.len(),
            version = change.version,
            "topology committed"
        );
        change
    }

    /// Undo every journaled change.
    pub fn rollback(mut self) {
        self.undo();
    }

    fn undo(&mut self) {
        self.finished = true;
        if self.journal.is_empty() {
            return;
        }
        tracing::debug!(events = self.journal.len(), "topology rollback");
        while let Some(event) = self.journal.pop() {
            self.graph.apply(&event.inverse());
        }
    }

    fn record(&mut self, event: TopologyEvent) {
        tracing::trace!(?event, "topology event");
        self.graph.apply(&event);
        self.journal.push(event);
    }

    /// Whether a gate `a–b` may be opened without leaving either end with a
    /// worse partner in the shared bucket.
    fn eligible(&self, a: Coordinate, b: Coordinate) -> bool {
        let Some(direction) = Direction::between(a, b) else {
            return false;
        };
        self.side_accepts(a, direction, b) && self.side_accepts(b, direction.opposite(), a)
    }

    fn side_accepts(&self, node: Coordinate, direction: Direction, candidate: Coordinate) -> bool {
        match self.graph.bucket(node, direction) {
            None => true,
            Some(current) if current == candidate => true,
            Some(current) => closer(node, candidate, current),
        }
    }

    /// Fill `node`'s bucket for `direction` with the nearest eligible
    /// candidate, unless it already holds something at least as close.
    fn connect_nearest(&mut self, node: Coordinate, direction: Direction) {
        if !self.graph.contains(node) {
            return;
        }
        let best = self
            .graph
            .nodes()
            .filter(|c| *c != node && Direction::between(node, *c) == Some(direction))
            .filter(|c| self.eligible(node, *c))
            .min_by_key(|c| (node.distance_squared(*c), *c));
        let Some(best) = best else {
            return;
        };
        if let Some(current) = self.graph.bucket(node, direction) {
            if current == best || !closer(node, best, current) {
                return;
            }
        }
        self.connect(node, best);
    }

    /// Open `a–b`, closing whatever each end held in the shared bucket.
    fn connect(&mut self, a: Coordinate, b: Coordinate) {
        let Some(direction) = Direction::between(a, b) else {
            return;
        };
        for (end, facing) in [(a, direction), (b, direction.opposite())] {
            let other = if end == a { b } else { a };
            if let Some(occupant) = self.graph.bucket(end, facing) {
                if occupant == other {
                    continue;
                }
                if let Some(gate) = self.graph.gate(end, occupant).copied() {
                    tracing::debug!(%end, %occupant, "gate displaced");
                    self.record(TopologyEvent::GateClosed { gate });
                    self.repair_queue.push_back((occupant, facing.opposite()));
                }
            }
        }
        if !self.graph.has_gate(a, b) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            tracing::debug!(a = %lo, b = %hi, "gate opened");
            self.record(TopologyEvent::GateOpened {
                gate: WarpGate {
                    a: lo,
                    b: hi,
                    active: true,
                },
            });
        }
    }

    /// Refill emptied buckets until nothing is left to repair.
    ///
    /// A pair can only become mutually eligible when one of its buckets is
    /// emptied, and every emptied bucket is queued, so refilling the queued
    /// side with its nearest eligible candidate covers every new pair.
    fn drain_repairs(&mut self) {
        let mut repairs = 0usize;
        while let Some((node, direction)) = self.repair_queue.pop_front() {
            tracing::trace!(%node, %direction, "repairing bucket");
            self.connect_nearest(node, direction);
            repairs += 1;
        }
        if repairs > 0 {
            tracing::debug!(repairs, "buckets repaired");
        }
    }
}

impl Drop for TopologyTxn<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.undo();
        }
    }
}

/// Whether `x` is strictly closer to `origin` than `y`, with coordinate
/// order breaking exact distance ties.
fn closer(origin: Coordinate, x: Coordinate, y: Coordinate) -> bool {
    (origin.distance_squared(x), x) < (origin.distance_squared(y), y)
}

fn require_realized(catalog: &impl SystemCatalog, system: Coordinate) -> CoreResult<()> {
    if catalog.is_realized(system) {
        Ok(())
    } else {
        Err(CoreError::UnknownSystem(system))
    }
}

fn net_gate_diff(journal: &[TopologyEvent]) -> (Vec<WarpGate>, Vec<WarpGate>) {
    let mut opened: BTreeMap<GateKey, WarpGate> = BTreeMap::new();
    let mut closed: BTreeMap<GateKey, WarpGate> = BTreeMap::new();
    for event in journal {
        match event {
            TopologyEvent::GateOpened { gate } => {
                if closed.remove(&gate.key()).is_none() {
                    opened.insert(gate.key(), *gate);
                }
            }
            TopologyEvent::GateClosed { gate } => {
                if opened.remove(&gate.key()).is_none() {
                    closed.insert(gate.key(), *gate);
                }
            }
            _ => {}
        }
    }
    (opened.into_values().collect(), closed.into_values().collect())
}
