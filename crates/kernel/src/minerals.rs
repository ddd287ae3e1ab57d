//! Mineral availability: a pure function of star type and distance from origin.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::system::StarType;

/// Rarity tier. Farther bands unlock progressively rarer tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MineralTier {
    Common,
    Uncommon,
    Rare,
    Exotic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Mineral {
    // common
    Iron,
    Nickel,
    Silicon,
    // uncommon
    Copper,
    Titanium,
    Cobalt,
    // rare
    Platinum,
    Iridium,
    Palladium,
    // exotic
    Helium3,
    Tritium,
    // star-type signatures
    Ionite,
    Diamantine,
    Solarium,
    Amberite,
    Cinnabar,
    Hematine,
    Neutronium,
    Gemellite,
    Pulsite,
    Singularite,
    // available to everyone far enough out
    Voidstone,
}

impl Mineral {
    pub fn tier(self) -> MineralTier {
        match self {
            Self::Iron | Self::Nickel | Self::Silicon => MineralTier::Common,
            Self::Copper | Self::Titanium | Self::Cobalt => MineralTier::Uncommon,
            Self::Platinum | Self::Iridium | Self::Palladium => MineralTier::Rare,
            Self::Helium3 | Self::Tritium | Self::Voidstone => MineralTier::Exotic,
            // signatures count as rare
            _ => MineralTier::Rare,
        }
    }
}

/// Distance band from the origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DistanceBand {
    Near,
    Mid,
    Far,
    VeryFar,
}

/// Upper (exclusive) distance bounds of the near, mid and far bands.
pub const BAND_LIMITS: [f64; 3] = [15.0, 40.0, 80.0];
/// Beyond this distance each star type contributes its signature mineral.
pub const SIGNATURE_THRESHOLD: f64 = 50.0;
/// Beyond this distance [`Mineral::Voidstone`] is always available.
pub const ULTRA_RARE_THRESHOLD: f64 = 120.0;

const COMMON: &[Mineral] = &[Mineral::Iron, Mineral::Nickel, Mineral::Silicon];
const UNCOMMON: &[Mineral] = &[Mineral::Copper, Mineral::Titanium, Mineral::Cobalt];
const RARE: &[Mineral] = &[Mineral::Platinum, Mineral::Iridium, Mineral::Palladium];
const EXOTIC: &[Mineral] = &[Mineral::Helium3, Mineral::Tritium];

impl DistanceBand {
    pub fn of(distance: f64) -> Self {
        if distance < BAND_LIMITS[0] {
            Self::Near
        } else if distance < BAND_LIMITS[1] {
            Self::Mid
        } else if distance < BAND_LIMITS[2] {
            Self::Far
        } else {
            Self::VeryFar
        }
    }

    /// Tiers unlocked in this band; each band widens the previous one.
    pub fn tiers(self) -> &'static [MineralTier] {
        use MineralTier::*;
        match self {
            Self::Near => &[Common],
            Self::Mid => &[Common, Uncommon],
            Self::Far => &[Common, Uncommon, Rare],
            Self::VeryFar => &[Common, Uncommon, Rare, Exotic],
        }
    }
}

fn tier_minerals(tier: MineralTier) -> &'static [Mineral] {
    match tier {
        MineralTier::Common => COMMON,
        MineralTier::Uncommon => UNCOMMON,
        MineralTier::Rare => RARE,
        MineralTier::Exotic => EXOTIC,
    }
}

/// The rare mineral each star type yields past [`SIGNATURE_THRESHOLD`].
pub fn signature_mineral(star: StarType) -> Mineral {
    match star {
        StarType::BlueGiant => Mineral::Ionite,
        StarType::WhiteDwarf => Mineral::Diamantine,
        StarType::YellowDwarf => Mineral::Solarium,
        StarType::OrangeDwarf => Mineral::Amberite,
        StarType::RedDwarf => Mineral::Cinnabar,
        StarType::RedGiant => Mineral::Hematine,
        StarType::NeutronStar => Mineral::Neutronium,
        StarType::BinaryStar => Mineral::Gemellite,
        StarType::Pulsar => Mineral::Pulsite,
        StarType::BlackHole => Mineral::Singularite,
    }
}

/// Minerals obtainable around a star of type `star` at `distance` from the
/// origin, sorted and free of duplicates.
pub fn available_minerals(star: StarType, distance: f64) -> Vec<Mineral> {
    let mut set: BTreeSet<Mineral> = DistanceBand::of(distance)
        .tiers()
        .iter()
        .flat_map(|tier| tier_minerals(*tier).iter().copied())
        .collect();
    if distance >= SIGNATURE_THRESHOLD {
        set.insert(signature_mineral(star));
    }
    if distance >= ULTRA_RARE_THRESHOLD {
        set.insert(Mineral::Voidstone);
    }
    set.into_iter().collect()
}
