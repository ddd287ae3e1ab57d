use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use warpspace_common::{Coordinate, CoordinateDomain, CoreResult};

use crate::system::{SystemGenerator, SystemRecord};

/// Read access to realized systems, the contract the topology and
/// exploration layers consume. Storage-backed collaborators implement this
/// as a synchronous lookup.
pub trait SystemCatalog {
    /// The realized record at `coordinate`, if any.
    fn system_at(&self, coordinate: Coordinate) -> Option<SystemRecord>;

    /// Coordinates of every realized system.
    fn realized_coordinates(&self) -> Vec<Coordinate>;

    fn is_realized(&self, coordinate: Coordinate) -> bool {
        self.system_at(coordinate).is_some()
    }
}

/// An event record produced by every mutation of the universe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum UniverseEvent {
    /// A system was realized for the first time.
    Realized { record: SystemRecord },
}

/// The realized part of a seeded universe.
///
/// Generation is pure; realization is the one-time act of storing the
/// generated record. Re-realizing returns the stored record unchanged and
/// never regenerates.
///
/// Uses BTreeMap for deterministic iteration order across all platforms.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Universe {
    seed: String,
    domain: CoordinateDomain,
    systems: BTreeMap<Coordinate, SystemRecord>,
    /// Append-only event log of all realizations.
    #[serde(skip)]
    event_log: Vec<UniverseEvent>,
}

impl Universe {
    /// Create an empty universe over `domain` seeded with `seed`.
    pub fn new(seed: impl Into<String>, domain: CoordinateDomain) -> Self {
        Self {
            seed: seed.into(),
            domain,
            systems: BTreeMap::new(),
            event_log: Vec::new(),
        }
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }

    pub fn domain(&self) -> CoordinateDomain {
        self.domain
    }

    fn generator(&self) -> SystemGenerator {
        SystemGenerator::new(self.domain)
    }

    /// Number of realized systems.
    pub fn system_count(&self) -> usize {
        self.systems.len()
    }

    /// Read-only access to all realized systems.
    pub fn systems(&self) -> &BTreeMap<Coordinate, SystemRecord> {
        &self.systems
    }

    /// Get a realized system.
    pub fn get(&self, coordinate: Coordinate) -> Option<&SystemRecord> {
        self.systems.get(&coordinate)
    }

    /// Drain and return the event log.
    pub fn drain_events(&mut self) -> Vec<UniverseEvent> {
        std::mem::take(&mut self.event_log)
    }

    /// Read-only access to the event log.
    pub fn events(&self) -> &[UniverseEvent] {
        &self.event_log
    }

    /// The stored record if realized, otherwise a fresh generation that is
    /// not stored.
    pub fn preview(&self, coordinate: Coordinate) -> CoreResult<SystemRecord> {
        if let Some(stored) = self.systems.get(&coordinate) {
            return Ok(stored.clone());
        }
        self.generator().generate(&self.seed, coordinate)
    }

    /// Realize the system at `coordinate`.
    ///
    /// The first call generates and stores; later calls return the stored
    /// record untouched and log nothing.
    pub fn realize(&mut self, coordinate: Coordinate) -> CoreResult<&SystemRecord> {
        if !self.systems.contains_key(&coordinate) {
            let record = self.generator().generate(&self.seed, coordinate)?;
            tracing::debug!(%coordinate, name = %record.name, "realized system");
            self.event_log.push(UniverseEvent::Realized {
                record: record.clone(),
            });
            self.systems.insert(coordinate, record);
        }
        Ok(&self.systems[&coordinate])
    }

    /// Store a record produced elsewhere (e.g. loaded from storage).
    /// First write wins, like [`Universe::realize`].
    pub fn adopt(&mut self, record: SystemRecord) -> CoreResult<&SystemRecord> {
        let coordinate = self.domain.check(record.coordinate)?;
        if !self.systems.contains_key(&coordinate) {
            self.event_log.push(UniverseEvent::Realized {
                record: record.clone(),
            });
            self.systems.insert(coordinate, record);
        }
        Ok(&self.systems[&coordinate])
    }

    /// Reconstruct a universe from a sequence of events (for replay).
    pub fn replay(
        seed: impl Into<String>,
        domain: CoordinateDomain,
        events: &[UniverseEvent],
    ) -> Self {
        let mut universe = Self::new(seed, domain);
        for event in events {
            match event {
                UniverseEvent::Realized { record } => {
                    universe
                        .systems
                        .entry(record.coordinate)
                        .or_insert_with(|| record.clone());
                }
            }
        }
        universe
    }

    /// Compute a deterministic hash of the realized state for comparison.
    /// Uses canonical (BTreeMap) iteration order.
    pub fn state_hash(&self) -> u64 {
        let mut h: u64 = 0xcbf2_9ce4_8422_2325; // FNV offset basis
        let mix = |h: &mut u64, bytes: &[u8]| {
            for &b in bytes {
                *h ^= b as u64;
                *h = h.wrapping_mul(0x0100_0000_01b3);
            }
        };
        mix(&mut h, self.seed.as_bytes());
        for (coordinate, record) in &self.systems {
            mix(&mut h, &coordinate.to_le_bytes());
            mix(&mut h, record.name.as_bytes());
            let shape = [record.star_type as u8, record.planet_count, record.hazard_level];
            mix(&mut h, &shape);
            for price in record.prices.values() {
                mix(&mut h, &price.to_le_bytes());
            }
        }
        h
    }
}

impl SystemCatalog for Universe {
    fn system_at(&self, coordinate: Coordinate) -> Option<SystemRecord> {
        self.systems.get(&coordinate).cloned()
    }

    fn realized_coordinates(&self) -> Vec<Coordinate> {
        self.systems.keys().copied().collect()
    }

    fn is_realized(&self, coordinate: Coordinate) -> bool {
        self.systems.contains_key(&coordinate)
    }
}
