//! Game rules the formulation depends on: slot capacities, stat names the
//! constraints refer to, soft-cap tables and the big-M constants.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::catalog::SlotType;

pub const MAX_CHAR_LEVEL: u32 = 200;

/// Upper bound of the count variable for set-less rings.
pub const RING_MAX_COUNT: i32 = 2;

/// Set tier counter upper bound and number of per-set tier indicators.
pub const SET_TIER_MAX: i32 = 9;
pub const SET_TIER_INDICATORS: i32 = 10;

/// Equip conditions: `stat > threshold` / `stat < threshold`.
pub const EQUIP_CONDITION_BIG_M: f64 = 100_000.0;
pub const EQUIP_CONDITION_EPSILON: f64 = 1.0;

/// RHS sentinel for a stat with no requested floor.
pub const NO_MINIMUM: f64 = -10_000.0;

pub const STAT_POINT_TIERS: usize = 6;
pub const STAT_POINT_TIER_SWITCHES: usize = 5;
/// Points spent per stat point in each tier.
pub const STAT_POINT_TIER_COSTS: [f64; STAT_POINT_TIERS] = [0.5, 1.0, 2.0, 3.0, 4.0, 5.0];
/// Tier size used when the class table leaves a tier open.
pub const UNCAPPED_TIER: f64 = 1991.0;
pub const TIER_ORDER_BIG_M: f64 = 1990.0;
pub const TIER_FILL_BIG_M: f64 = 2000.0;

pub const MAXIMUM_TROPHIES: f64 = 6.0;

pub const HP_STAT: &str = "HP";
pub const AP_KEY: &str = "ap";
pub const MP_KEY: &str = "mp";
pub const RANGE_KEY: &str = "range";

/// Weight nudged when the solver has to be re-run.
pub const PERTURBATION_KEY: &str = "vit";
pub const PERTURBATION_DELTA: f64 = 1.0;

/// Weight entry carried alongside stat weights that is not a stat.
pub const MELEENESS_KEY: &str = "meleeness";

pub const CAWWOT_DOFUS: &str = "Cawwot Dofus";
pub const GELANO_EXO: &str = "Gelano (#1)";
pub const GELANO_PLAIN: &str = "Gelano (#2)";

pub const DAMAGE_TYPES: [&str; 5] = ["neut", "earth", "fire", "water", "air"];

/// Secondary stats counted towards a minimum floor, with their multipliers.
pub const STAT_DEPENDENCIES: &[(&str, &[(&str, f64)])] = &[
    ("Dodge", &[("Agility", 0.1)]),
    ("Lock", &[("Agility", 0.1)]),
    ("AP Reduction", &[("Wisdom", 0.1)]),
    ("MP Reduction", &[("Wisdom", 0.1)]),
    ("AP Parry", &[("Wisdom", 0.1)]),
    ("MP Parry", &[("Wisdom", 0.1)]),
    (
        "Initiative",
        &[
            ("Agility", 1.0),
            ("Intelligence", 1.0),
            ("Strength", 1.0),
            ("Chance", 1.0),
        ],
    ),
    ("Prospecting", &[("Chance", 0.1)]),
    ("Pods", &[("Strength", 5.0)]),
    ("HP", &[("Vitality", 1.0)]),
];

pub fn slot_capacity(slot: SlotType) -> i32 {
    match slot {
        SlotType::Ring => 2,
        SlotType::Dofus => 6,
        SlotType::Hat
        | SlotType::Cloak
        | SlotType::Amulet
        | SlotType::Belt
        | SlotType::Boots
        | SlotType::Weapon
        | SlotType::Shield
        | SlotType::Pet => 1,
    }
}

/// Health a character has before any gear or points.
pub fn base_hp(level: u32) -> f64 {
    55.0 + 5.0 * (level.max(1) as f64 - 1.0)
}

/// Playable classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CharacterClass {
    Cra,
    Ecaflip,
    Eniripsa,
    Enutrof,
    Feca,
    Foggernaut,
    Iop,
    Masqueraider,
    Osamodas,
    Pandawa,
    Rogue,
    Sacrier,
    Sadida,
    Sram,
    Xelor,
    Eliotrope,
    Huppermage,
    Ouginak,
    Forgelance,
}

impl CharacterClass {
    pub const ALL: [CharacterClass; 19] = [
        CharacterClass::Cra,
        CharacterClass::Ecaflip,
        CharacterClass::Eniripsa,
        CharacterClass::Enutrof,
        CharacterClass::Feca,
        CharacterClass::Foggernaut,
        CharacterClass::Iop,
        CharacterClass::Masqueraider,
        CharacterClass::Osamodas,
        CharacterClass::Pandawa,
        CharacterClass::Rogue,
        CharacterClass::Sacrier,
        CharacterClass::Sadida,
        CharacterClass::Sram,
        CharacterClass::Xelor,
        CharacterClass::Eliotrope,
        CharacterClass::Huppermage,
        CharacterClass::Ouginak,
        CharacterClass::Forgelance,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CharacterClass::Cra => "Cra",
            CharacterClass::Ecaflip => "Ecaflip",
            CharacterClass::Eniripsa => "Eniripsa",
            CharacterClass::Enutrof => "Enutrof",
            CharacterClass::Feca => "Feca",
            CharacterClass::Foggernaut => "Foggernaut",
            CharacterClass::Iop => "Iop",
            CharacterClass::Masqueraider => "Masqueraider",
            CharacterClass::Osamodas => "Osamodas",
            CharacterClass::Pandawa => "Pandawa",
            CharacterClass::Rogue => "Rogue",
            CharacterClass::Sacrier => "Sacrier",
            CharacterClass::Sadida => "Sadida",
            CharacterClass::Sram => "Sram",
            CharacterClass::Xelor => "Xelor",
            CharacterClass::Eliotrope => "Eliotrope",
            CharacterClass::Huppermage => "Huppermage",
            CharacterClass::Ouginak => "Ouginak",
            CharacterClass::Forgelance => "Forgelance",
        }
    }
}

impl fmt::Display for CharacterClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CharacterClass {
    type Err = String;

    /// Parse a class from its display name (case-insensitive)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CharacterClass::ALL
            .iter()
            .copied()
            .find(|class| class.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown character class {}", s))
    }
}

/// Cumulative stat totals at which each point tier ends; `None` leaves the
/// tier open.
pub type TierCaps = [Option<i32>; STAT_POINT_TIERS];

const VITALITY_CAPS: TierCaps = [Some(0), None, None, None, None, None];
const WISDOM_CAPS: TierCaps = [Some(0), Some(0), Some(0), None, None, None];
const ELEMENT_CAPS: TierCaps = [Some(0), Some(100), Some(200), Some(300), None, None];
// Sacrier vitality costs half a point.
const SACRIER_VITALITY_CAPS: TierCaps = [None, None, None, None, None, None];

const STANDARD_SOFT_CAPS: &[(&str, TierCaps)] = &[
    ("vit", VITALITY_CAPS),
    ("wis", WISDOM_CAPS),
    ("str", ELEMENT_CAPS),
    ("int", ELEMENT_CAPS),
    ("cha", ELEMENT_CAPS),
    ("agi", ELEMENT_CAPS),
];

const SACRIER_SOFT_CAPS: &[(&str, TierCaps)] = &[
    ("vit", SACRIER_VITALITY_CAPS),
    ("wis", WISDOM_CAPS),
    ("str", ELEMENT_CAPS),
    ("int", ELEMENT_CAPS),
    ("cha", ELEMENT_CAPS),
    ("agi", ELEMENT_CAPS),
];

/// Soft-cap ladder of every main stat for a class, keyed by stat key.
pub fn soft_caps(class: CharacterClass) -> &'static [(&'static str, TierCaps)] {
    match class {
        CharacterClass::Sacrier => SACRIER_SOFT_CAPS,
        _ => STANDARD_SOFT_CAPS,
    }
}

/// Size of tier `tier` in stat points, or `None` when the tier is open.
pub fn tier_size(caps: &TierCaps, tier: usize) -> Option<i32> {
    if tier >= 1 {
        if let (Some(previous), Some(current)) = (caps[tier - 1], caps[tier]) {
            return Some(current - previous);
        }
    }
    caps[tier]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_character_class_from_str() {
        assert_eq!("iop".parse::<CharacterClass>(), Ok(CharacterClass::Iop));
        assert_eq!("Huppermage".parse::<CharacterClass>(), Ok(CharacterClass::Huppermage));
        assert!("Warrior".parse::<CharacterClass>().is_err());
    }

    #[test]
    fn test_tier_size_uses_differences_of_cumulative_caps() {
        assert_eq!(tier_size(&ELEMENT_CAPS, 0), Some(0));
        assert_eq!(tier_size(&ELEMENT_CAPS, 1), Some(100));
        assert_eq!(tier_size(&ELEMENT_CAPS, 3), Some(100));
        assert_eq!(tier_size(&ELEMENT_CAPS, 4), None);
        assert_eq!(tier_size(&WISDOM_CAPS, 2), Some(0));
    }

    #[test]
    fn test_every_class_has_six_main_stat_ladders() {
        for class in CharacterClass::ALL {
            assert_eq!(soft_caps(class).len(), 6, "{}", class);
        }
    }

    #[test]
    fn test_base_hp() {
        assert_eq!(base_hp(1), 55.0);
        assert_eq!(base_hp(200), 1050.0);
    }
}
