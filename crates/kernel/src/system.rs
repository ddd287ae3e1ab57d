use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Range;

use warpspace_common::{Coordinate, CoordinateDomain, CoreResult};

use crate::digest::SeedDigest;
use crate::minerals::{Mineral, available_minerals};

/// Spectral class of a system's primary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StarType {
    BlueGiant,
    WhiteDwarf,
    YellowDwarf,
    OrangeDwarf,
    RedDwarf,
    RedGiant,
    NeutronStar,
    BinaryStar,
    Pulsar,
    BlackHole,
}

impl StarType {
    /// All variants in digest-index order. Reordering changes every universe.
    pub const ALL: [StarType; 10] = [
        Self::BlueGiant,
        Self::WhiteDwarf,
        Self::YellowDwarf,
        Self::OrangeDwarf,
        Self::RedDwarf,
        Self::RedGiant,
        Self::NeutronStar,
        Self::BinaryStar,
        Self::Pulsar,
        Self::BlackHole,
    ];
}

impl fmt::Display for StarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::BlueGiant => "blue giant",
            Self::WhiteDwarf => "white dwarf",
            Self::YellowDwarf => "yellow dwarf",
            Self::OrangeDwarf => "orange dwarf",
            Self::RedDwarf => "red dwarf",
            Self::RedGiant => "red giant",
            Self::NeutronStar => "neutron star",
            Self::BinaryStar => "binary star",
            Self::Pulsar => "pulsar",
            Self::BlackHole => "black hole",
        };
        f.write_str(s)
    }
}

/// Tradeable goods with a seeded base price per system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Commodity {
    Food,
    Water,
    Fuel,
    Ore,
    Electronics,
    Medicine,
}

impl Commodity {
    pub const ALL: [Commodity; 6] = [
        Self::Food,
        Self::Water,
        Self::Fuel,
        Self::Ore,
        Self::Electronics,
        Self::Medicine,
    ];

    /// Galactic reference price in credits.
    pub fn reference_price(self) -> u32 {
        match self {
            Self::Food => 20,
            Self::Water => 10,
            Self::Fuel => 35,
            Self::Ore => 50,
            Self::Electronics => 120,
            Self::Medicine => 90,
        }
    }
}

pub const MAX_PLANETS: u8 = 12;
pub const MAX_HAZARD: u8 = 100;
/// Seeded prices land in this percentage band of the reference price.
pub const PRICE_PERCENT: (u64, u64) = (70, 130);

/// Byte ranges of the system digest. Each range feeds exactly one field and
/// no two ranges overlap, so perturbing one field's bytes leaves every
/// other field untouched.
pub mod layout {
    use std::ops::Range;

    pub const STAR_TYPE: Range<usize> = 0..2;
    pub const PLANET_COUNT: Range<usize> = 2..4;
    pub const HAZARD: Range<usize> = 4..6;
    /// One two-byte range per [`super::Commodity`], in `Commodity::ALL` order.
    pub const PRICES: [Range<usize>; 6] = [6..8, 8..10, 10..12, 12..14, 14..16, 16..18];
    pub const NAME_PREFIX: Range<usize> = 18..20;
    pub const NAME_SUFFIX: Range<usize> = 20..22;
    pub const NAME_NUMBER: Range<usize> = 22..24;

    pub fn all() -> Vec<Range<usize>> {
        let mut ranges = vec![STAR_TYPE, PLANET_COUNT, HAZARD];
        ranges.extend(PRICES);
        ranges.extend([NAME_PREFIX, NAME_SUFFIX, NAME_NUMBER]);
        ranges
    }
}

const NAME_PREFIXES: &[&str] = &[
    "Aldra", "Bexar", "Caelum", "Dhara", "Eridu", "Fenra", "Galen", "Hesper", "Ilion", "Jorvik",
    "Kepra", "Lyric", "Marrow", "Nadir", "Orrin", "Pallas", "Quorra", "Rhea", "Sabik", "Talos",
    "Umbra", "Vesta", "Wyld", "Xantha", "Yaren", "Zephyr", "Auric", "Borea", "Cygna", "Delph",
    "Essen", "Fornax",
];

const NAME_SUFFIXES: &[&str] = &[
    "Vox", "Reach", "Drift", "Gate", "Spire", "Hollow", "Crown", "Deep", "Rift", "Haven", "Fold",
    "Verge", "Cairn", "Wake", "Shoal", "Tor",
];

/// A generated (and possibly realized) star system.
///
/// Every field is a function of `(seed, coordinate)` only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemRecord {
    pub coordinate: Coordinate,
    pub name: String,
    pub star_type: StarType,
    pub planet_count: u8,
    pub hazard_level: u8,
    pub minerals: Vec<Mineral>,
    pub prices: BTreeMap<Commodity, u32>,
}

impl SystemRecord {
    /// The fixed record at the declared origin. Never seed-derived.
    pub fn hub() -> Self {
        let star_type = StarType::YellowDwarf;
        Self {
            coordinate: Coordinate::ORIGIN,
            name: "Nexus Prime".into(),
            star_type,
            planet_count: 8,
            hazard_level: 0,
            minerals: available_minerals(star_type, 0.0),
            prices: Commodity::ALL
                .iter()
                .map(|c| (*c, c.reference_price()))
                .collect(),
        }
    }

    /// Decode a record from a digest. Public so callers can verify the
    /// field-to-byte-range contract directly.
    pub fn from_digest(coordinate: Coordinate, digest: &SeedDigest) -> Self {
        let star_type =
            StarType::ALL[digest.pick(layout::STAR_TYPE, StarType::ALL.len() as u64) as usize];
        let planet_count = digest.pick(layout::PLANET_COUNT, u64::from(MAX_PLANETS) + 1) as u8;
        let hazard_level = digest.pick(layout::HAZARD, u64::from(MAX_HAZARD) + 1) as u8;

        let prices = Commodity::ALL
            .iter()
            .zip(layout::PRICES)
            .map(|(commodity, range)| (*commodity, seeded_price(*commodity, digest, range)))
            .collect();

        let prefix =
            NAME_PREFIXES[digest.pick(layout::NAME_PREFIX, NAME_PREFIXES.len() as u64) as usize];
        let suffix =
            NAME_SUFFIXES[digest.pick(layout::NAME_SUFFIX, NAME_SUFFIXES.len() as u64) as usize];
        let number = digest.pick(layout::NAME_NUMBER, 1000);

        Self {
            coordinate,
            name: format!("{prefix} {suffix}-{number:03}"),
            star_type,
            planet_count,
            hazard_level,
            minerals: available_minerals(star_type, coordinate.distance_from_origin()),
            prices,
        }
    }

    pub fn is_hub(&self) -> bool {
        self.coordinate == Coordinate::ORIGIN
    }
}

fn seeded_price(commodity: Commodity, digest: &SeedDigest, range: Range<usize>) -> u32 {
    let percent = digest.span(range, PRICE_PERCENT.0, PRICE_PERCENT.1);
    (u64::from(commodity.reference_price()) * percent / 100) as u32
}

/// Digest of `seed ‖ x ‖ y ‖ z`.
pub fn system_digest(seed: &str, coordinate: Coordinate) -> SeedDigest {
    SeedDigest::of(&[seed.as_bytes(), &coordinate.to_le_bytes()])
}

/// Coordinate-seeded system generator.
///
/// Holds only the declared domain; the seed is passed on every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemGenerator {
    domain: CoordinateDomain,
}

impl SystemGenerator {
    pub fn new(domain: CoordinateDomain) -> Self {
        Self { domain }
    }

    pub fn domain(&self) -> CoordinateDomain {
        self.domain
    }

    /// Generate the system at `coordinate`.
    ///
    /// Total over the domain: the only failure is an out-of-domain coordinate.
    pub fn generate(&self, seed: &str, coordinate: Coordinate) -> CoreResult<SystemRecord> {
        self.domain.check(coordinate)?;
        if coordinate == Coordinate::ORIGIN {
            return Ok(SystemRecord::hub());
        }
        let record = SystemRecord::from_digest(coordinate, &system_digest(seed, coordinate));
        tracing::trace!(
            %coordinate,
            name = %record.name,
            star = %record.star_type,
            "generated system"
        );
        Ok(record)
    }
}
