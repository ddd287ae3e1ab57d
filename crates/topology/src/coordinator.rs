use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use warpspace_common::{Coordinate, CoreError, CoreResult};
use warpspace_kernel::SystemCatalog;

use crate::graph::GateGraph;
use crate::manager::{TopologyChange, TopologyTxn};

/// The single serialization point for topology changes.
///
/// Every mutation runs as one [`TopologyTxn`] under the lock, so two links
/// can never both see the same empty bucket. Readers take an owned
/// [`GateGraph`] snapshot and work on it without holding the lock.
#[derive(Debug, Clone, Default)]
pub struct TopologyCoordinator {
    graph: Arc<Mutex<GateGraph>>,
}

impl TopologyCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_graph(graph: GateGraph) -> Self {
        Self {
            graph: Arc::new(Mutex::new(graph)),
        }
    }

    // A panicking writer already rolled back through the transaction's Drop,
    // so a poisoned graph is still consistent.
    fn lock(&self) -> MutexGuard<'_, GateGraph> {
        self.graph.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Owned copy of the current graph. May be stale by the time it is used.
    pub fn snapshot(&self) -> GateGraph {
        self.lock().clone()
    }

    pub fn version(&self) -> u64 {
        self.lock().version()
    }

    /// Run `f` inside one transaction. An `Err` from `f` rolls everything
    /// back.
    pub fn mutate<F>(&self, f: F) -> CoreResult<TopologyChange>
    where
        F: FnOnce(&mut TopologyTxn<'_>) -> CoreResult<()>,
    {
        let mut graph = self.lock();
        let mut txn = TopologyTxn::begin(&mut graph);
        match f(&mut txn) {
            Ok(()) => Ok(txn.commit()),
            Err(err) => {
                txn.rollback();
                Err(err)
            }
        }
    }

    /// Like [`Self::mutate`], but fails with [`CoreError::Conflict`] when the
    /// graph moved past `expected_version` since the caller last read it.
    pub fn mutate_at<F>(&self, expected_version: u64, f: F) -> CoreResult<TopologyChange>
    where
        F: FnOnce(&mut TopologyTxn<'_>) -> CoreResult<()>,
    {
        let mut graph = self.lock();
        let actual = graph.version();
        if actual != expected_version {
            tracing::debug!(expected_version, actual, "topology conflict");
            return Err(CoreError::Conflict {
                expected: expected_version,
                actual,
            });
        }
        let mut txn = TopologyTxn::begin(&mut graph);
        match f(&mut txn) {
            Ok(()) => Ok(txn.commit()),
            Err(err) => {
                txn.rollback();
                Err(err)
            }
        }
    }

    pub fn link(
        &self,
        catalog: &impl SystemCatalog,
        system: Coordinate,
    ) -> CoreResult<TopologyChange> {
        self.mutate(|txn| txn.link(catalog, system))
    }

    pub fn relink_neighbors(&self, system: Coordinate) -> CoreResult<TopologyChange> {
        self.mutate(|txn| txn.relink_neighbors(system))
    }

    pub fn insert(
        &self,
        catalog: &impl SystemCatalog,
        system: Coordinate,
    ) -> CoreResult<TopologyChange> {
        self.mutate(|txn| txn.insert(catalog, system))
    }

    pub fn unlink(
        &self,
        catalog: &impl SystemCatalog,
        system: Coordinate,
    ) -> CoreResult<TopologyChange> {
        self.mutate(|txn| txn.unlink(catalog, system))
    }

    pub fn set_gate_active(
        &self,
        a: Coordinate,
        b: Coordinate,
        active: bool,
    ) -> CoreResult<TopologyChange> {
        self.mutate(|txn| txn.set_gate_active(a, b, active))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use warpspace_common::{CoordinateDomain, ErrorKind};
    use warpspace_kernel::Universe;

    fn c(x: i32, y: i32, z: i32) -> Coordinate {
        Coordinate::new(x, y, z)
    }

    fn universe(systems: &[Coordinate]) -> Universe {
        let mut u = Universe::new("abc", CoordinateDomain::default());
        for s in systems {
            u.realize(*s).unwrap();
        }
        u
    }

    #[test]
    fn failed_batch_leaves_graph_untouched() {
        let u = universe(&[c(0, 0, 0), c(3, 0, 0)]);
        let coord = TopologyCoordinator::new();
        let err = coord
            .mutate(|txn| {
                txn.insert(&u, c(0, 0, 0))?;
                txn.insert(&u, c(3, 0, 0))?;
                txn.insert(&u, c(7, 7, 7))
            })
            .unwrap_err();
        assert_eq!(err, CoreError::UnknownSystem(c(7, 7, 7)));
        let snap = coord.snapshot();
        assert_eq!(snap.node_count(), 0);
        assert_eq!(snap.gate_count(), 0);
        assert_eq!(coord.version(), 0);
    }

    #[test]
    fn stale_version_conflicts() {
        let u = universe(&[c(0, 0, 0), c(3, 0, 0)]);
        let coord = TopologyCoordinator::new();
        let seen = coord.version();
        coord.insert(&u, c(0, 0, 0)).unwrap();

        let err = coord
            .mutate_at(seen, |txn| txn.insert(&u, c(3, 0, 0)))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(coord.snapshot().node_count(), 1);

        // retry against the fresh version
        let change = coord
            .mutate_at(coord.version(), |txn| txn.insert(&u, c(3, 0, 0)))
            .unwrap();
        assert_eq!(change.opened.len(), 1);
    }

    #[test]
    fn snapshot_is_detached() {
        let u = universe(&[c(0, 0, 0), c(3, 0, 0)]);
        let coord = TopologyCoordinator::new();
        coord.insert(&u, c(0, 0, 0)).unwrap();
        let snap = coord.snapshot();
        coord.insert(&u, c(3, 0, 0)).unwrap();
        assert_eq!(snap.node_count(), 1);
        assert_eq!(coord.snapshot().node_count(), 2);
    }

    #[test]
    fn concurrent_inserts_keep_invariants() {
        let mut systems = Vec::new();
        for x in 0..4 {
            for y in 0..4 {
                systems.push(c(x * 3, y * 3, (x + y) % 3));
            }
        }
        let u = Arc::new(universe(&systems));
        let coord = TopologyCoordinator::new();

        let handles: Vec<_> = systems
            .chunks(4)
            .map(|chunk| {
                let coord = coord.clone();
                let u = Arc::clone(&u);
                let chunk = chunk.to_vec();
                thread::spawn(move || {
                    for s in chunk {
                        coord.insert(u.as_ref(), s).unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let snap = coord.snapshot();
        assert_eq!(snap.node_count(), systems.len());
        assert!(snap.verify_invariants().is_empty());
        assert_eq!(coord.version(), systems.len() as u64);
    }
}
