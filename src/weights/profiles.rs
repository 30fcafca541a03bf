//! Per-class build profiles.
//!
//! A profile has a class-wide row and per-element rows. A parameter missing
//! from an element row falls back to the class-wide row, then to
//! [`DEFAULT_PROFILE`]. Hybrid rows (two elements joined as `"agi/int"`)
//! exist only for classes whose damage spells mix elements.

use crate::constants::CharacterClass;

/// Tunable inputs of the weight formulas. Flags are stored as 0.0 / 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Param {
    EndgameMinAp,
    EndgameMinMp,
    /// Share of melee attacks, 0.0 (ranged) to 1.0 (melee).
    Meleeness,
    /// Neutral damage weight as a fraction of earth damage weight.
    NeutralDamage,
    RangeImportance,
    ApReductionImportance,
    MpReductionImportance,
    LockImportance,
    DodgeImportance,
    VitalityImportance,
    PushbackDamageImportance,
    HealsImportance,
    SummonsAreImportant,
    MinSummonsLowLevel,
    MinSummonsHighLevel,
    PowerEffectiveness,
    TrapsAreImportant,
    EarthDamage,
    FireDamage,
    WaterDamage,
    AirDamage,
    /// Critical damage weight relative to damage for half-crit characters.
    CriticalDamage,
    FireResist,
    PercentFireResist,
}

pub type ProfileRow = &'static [(Param, f64)];

/// One class's overrides.
#[derive(Debug, Clone, Copy)]
pub struct Profile {
    pub all: ProfileRow,
    pub hybrids: &'static [(&'static str, ProfileRow)],
}

impl Profile {
    pub fn has_hybrids(&self) -> bool {
        !self.hybrids.is_empty()
    }

    /// Row for a single element key (`"str"`) or a hybrid key (`"agi/str"`).
    pub fn element_row(&self, key: &str) -> Option<ProfileRow> {
        ELEMENT_ROWS
            .iter()
            .chain(self.hybrids.iter())
            .find(|(name, _)| *name == key)
            .map(|(_, row)| *row)
    }
}

pub const DEFAULT_PROFILE: ProfileRow = &[
    (Param::EndgameMinAp, 11.0),
    (Param::EndgameMinMp, 6.0),
    (Param::Meleeness, 0.5),
    (Param::NeutralDamage, 0.1),
    (Param::RangeImportance, 1.0),
    (Param::ApReductionImportance, 0.0),
    (Param::MpReductionImportance, 0.0),
    (Param::LockImportance, 0.4),
    (Param::DodgeImportance, 0.4),
    (Param::VitalityImportance, 0.5),
    (Param::PushbackDamageImportance, 0.0),
    (Param::HealsImportance, 0.0),
    (Param::SummonsAreImportant, 0.0),
    (Param::MinSummonsLowLevel, 1.0),
    (Param::MinSummonsHighLevel, 1.0),
    (Param::PowerEffectiveness, 1.0),
    (Param::TrapsAreImportant, 0.0),
    (Param::EarthDamage, 0.0),
    (Param::FireDamage, 0.0),
    (Param::WaterDamage, 0.0),
    (Param::AirDamage, 0.0),
    (Param::CriticalDamage, 0.45),
    (Param::FireResist, 0.0),
    (Param::PercentFireResist, 0.0),
];

/// Every class weights its chosen element's damage at six times the stat.
const ELEMENT_ROWS: &[(&str, ProfileRow)] = &[
    ("str", &[(Param::EarthDamage, 6.0)]),
    ("int", &[(Param::FireDamage, 6.0)]),
    ("cha", &[(Param::WaterDamage, 6.0)]),
    ("agi", &[(Param::AirDamage, 6.0)]),
];

const HUPPERMAGE_HYBRIDS: &[(&str, ProfileRow)] = &[
    ("agi/int", &[(Param::AirDamage, 6.0), (Param::FireDamage, 6.0)]),
    ("agi/str", &[(Param::EarthDamage, 6.0), (Param::AirDamage, 6.0)]),
    ("cha/int", &[(Param::FireDamage, 6.0), (Param::WaterDamage, 6.0)]),
    ("cha/str", &[(Param::EarthDamage, 6.0), (Param::WaterDamage, 6.0)]),
];

pub fn lookup(row: ProfileRow, param: Param) -> Option<f64> {
    row.iter().find(|(p, _)| *p == param).map(|(_, v)| *v)
}

pub fn default_value(param: Param) -> f64 {
    lookup(DEFAULT_PROFILE, param).unwrap_or(0.0)
}

pub fn profile(class: CharacterClass) -> Profile {
    use Param::*;

    let all: ProfileRow = match class {
        CharacterClass::Cra => &[
            (MpReductionImportance, 0.6),
            (LockImportance, 0.1),
            (DodgeImportance, 0.9),
            (VitalityImportance, 0.4),
            (PushbackDamageImportance, 0.2),
            (Meleeness, 0.0),
            (PowerEffectiveness, 1.0),
        ],
        CharacterClass::Ecaflip => &[
            (RangeImportance, 0.5),
            (CriticalDamage, 0.4),
            (VitalityImportance, 0.6),
            (PowerEffectiveness, 1.0),
        ],
        CharacterClass::Eniripsa => &[
            (ApReductionImportance, 0.1),
            (MpReductionImportance, 0.1),
            (LockImportance, 0.1),
            (PushbackDamageImportance, 0.05),
            (HealsImportance, 0.05),
            (PowerEffectiveness, 1.0),
        ],
        CharacterClass::Enutrof => &[
            (ApReductionImportance, 0.1),
            (MpReductionImportance, 1.0),
            (DodgeImportance, 0.5),
            (MinSummonsLowLevel, 2.0),
            (MinSummonsHighLevel, 2.0),
            (PowerEffectiveness, 1.0),
        ],
        CharacterClass::Feca => &[
            (RangeImportance, 0.5),
            (NeutralDamage, 1.0),
            (ApReductionImportance, 0.2),
            (MpReductionImportance, 0.2),
            (LockImportance, 0.6),
            (CriticalDamage, 0.25),
            (PowerEffectiveness, 1.0),
        ],
        CharacterClass::Foggernaut => &[
            (RangeImportance, 0.5),
            (LockImportance, 0.2),
            (DodgeImportance, 0.5),
            (VitalityImportance, 0.7),
            (HealsImportance, 0.15),
            (MpReductionImportance, 0.1),
            (CriticalDamage, 0.3),
            (PowerEffectiveness, 1.0),
        ],
        CharacterClass::Iop => &[
            (RangeImportance, 0.0),
            (MpReductionImportance, 0.1),
            (LockImportance, 0.6),
            (PowerEffectiveness, 1.0),
        ],
        CharacterClass::Masqueraider => &[
            (Meleeness, 0.8),
            (RangeImportance, 0.5),
            (MpReductionImportance, 0.1),
            (DodgeImportance, 0.1),
            (VitalityImportance, 0.8),
            (PushbackDamageImportance, 0.1),
            (PowerEffectiveness, 1.0),
        ],
        CharacterClass::Osamodas => &[
            (LockImportance, 0.5),
            (DodgeImportance, 0.6),
            (VitalityImportance, 0.6),
            (RangeImportance, 0.0),
            (SummonsAreImportant, 1.0),
            (MinSummonsLowLevel, 2.0),
            (MinSummonsHighLevel, 3.0),
            (PowerEffectiveness, 1.0),
        ],
        CharacterClass::Pandawa => &[
            (RangeImportance, 0.5),
            (DodgeImportance, 0.3),
            (MinSummonsHighLevel, 2.0),
            (PowerEffectiveness, 1.0),
        ],
        // Power also scales bomb damage.
        CharacterClass::Rogue => &[
            (Meleeness, 0.0),
            (VitalityImportance, 0.6),
            (RangeImportance, 0.5),
            (CriticalDamage, 0.25),
            (PowerEffectiveness, 1.2),
        ],
        CharacterClass::Sacrier => &[
            (Meleeness, 1.0),
            (RangeImportance, 0.25),
            (LockImportance, 0.7),
            (VitalityImportance, 0.7),
            (PowerEffectiveness, 1.0),
        ],
        CharacterClass::Sadida => &[
            (RangeImportance, 0.0),
            (MpReductionImportance, 0.5),
            (DodgeImportance, 0.6),
            (MinSummonsLowLevel, 2.0),
            (MinSummonsHighLevel, 3.0),
            (PowerEffectiveness, 1.0),
        ],
        CharacterClass::Sram => &[
            (RangeImportance, 1.0),
            (MpReductionImportance, 0.2),
            (LockImportance, 0.8),
            (TrapsAreImportant, 1.0),
            (CriticalDamage, 0.35),
            (PowerEffectiveness, 1.0),
        ],
        CharacterClass::Xelor => &[
            (Meleeness, 0.4),
            (RangeImportance, 0.5),
            (ApReductionImportance, 1.0),
            (DodgeImportance, 0.5),
            (PowerEffectiveness, 1.0),
        ],
        CharacterClass::Eliotrope => &[
            (Meleeness, 0.1),
            (RangeImportance, 0.0),
            (DodgeImportance, 0.5),
            (PowerEffectiveness, 1.0),
        ],
        CharacterClass::Huppermage => &[
            (DodgeImportance, 0.3),
            (LockImportance, 0.5),
            (PowerEffectiveness, 1.0),
        ],
        CharacterClass::Ouginak => &[
            (VitalityImportance, 0.7),
            (RangeImportance, 0.0),
            (DodgeImportance, 0.3),
            (LockImportance, 0.6),
            (MpReductionImportance, 0.3),
            (PowerEffectiveness, 1.0),
        ],
        CharacterClass::Forgelance => &[
            (Meleeness, 0.5),
            (RangeImportance, 0.5),
            (DodgeImportance, 0.5),
            (LockImportance, 0.5),
            (MpReductionImportance, 0.2),
            (VitalityImportance, 0.6),
            (PowerEffectiveness, 1.0),
        ],
    };

    let hybrids = match class {
        CharacterClass::Huppermage => HUPPERMAGE_HYBRIDS,
        _ => &[],
    };

    Profile { all, hybrids }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_profile_covers_every_param() {
        let params = [
            Param::EndgameMinAp,
            Param::EndgameMinMp,
            Param::Meleeness,
            Param::NeutralDamage,
            Param::RangeImportance,
            Param::ApReductionImportance,
            Param::MpReductionImportance,
            Param::LockImportance,
            Param::DodgeImportance,
            Param::VitalityImportance,
            Param::PushbackDamageImportance,
            Param::HealsImportance,
            Param::SummonsAreImportant,
            Param::MinSummonsLowLevel,
            Param::MinSummonsHighLevel,
            Param::PowerEffectiveness,
            Param::TrapsAreImportant,
            Param::EarthDamage,
            Param::FireDamage,
            Param::WaterDamage,
            Param::AirDamage,
            Param::CriticalDamage,
            Param::FireResist,
            Param::PercentFireResist,
        ];
        for param in params {
            assert!(lookup(DEFAULT_PROFILE, param).is_some(), "{:?}", param);
        }
    }

    #[test]
    fn test_only_huppermage_has_hybrid_rows() {
        for class in CharacterClass::ALL {
            assert_eq!(profile(class).has_hybrids(), class == CharacterClass::Huppermage);
        }
        let hupper = profile(CharacterClass::Huppermage);
        assert_eq!(lookup(hupper.element_row("agi/int").unwrap(), Param::FireDamage), Some(6.0));
        assert!(profile(CharacterClass::Iop).element_row("agi/int").is_none());
    }

    #[test]
    fn test_single_element_rows_are_shared() {
        let row = profile(CharacterClass::Cra).element_row("cha").unwrap();
        assert_eq!(lookup(row, Param::WaterDamage), Some(6.0));
        assert_eq!(lookup(row, Param::EarthDamage), None);
    }
}
