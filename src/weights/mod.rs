//! Build-weight heuristic: turns a class, a level and a set of qualitative
//! aspects into objective weights and minimum-stat floors.
//!
//! Everything here is a pure function of its arguments. All weights are
//! rounded half-to-even as the final step so that equal inputs always give
//! bit-identical integer maps.

pub mod profiles;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{CharacterClass, DAMAGE_TYPES, MAX_CHAR_LEVEL};
use crate::model::request::{BuildOptions, BuildRequest, DofusOption};

use profiles::{default_value, lookup, profile, Param, Profile};

/// Base multiplier applied to every weight.
const BASE: f64 = 20.0;

/// Heals per point of Intelligence.
const INT_PER_HEALS: f64 = 5.0;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum WeightsError {
    #[error("unknown aspect: {0}")]
    UnknownAspect(String),
    #[error("character level {0} is outside 1..={max}", max = MAX_CHAR_LEVEL)]
    InvalidLevel(u32),
}

/// A qualitative build intent. Declaration order is display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aspect {
    Str,
    Int,
    Cha,
    Agi,
    Vit,
    Res,
    Omni,
    Wis,
    GlassCannon,
    Dam,
    Crit,
    NonCrit,
    Heal,
    #[serde(rename = "aprape")]
    ApReduction,
    #[serde(rename = "mprape")]
    MpReduction,
    Pvp,
    Duel,
    Trap,
    Summon,
    Pushback,
    #[serde(rename = "pp")]
    Prospecting,
    Pods,
}

impl Aspect {
    pub const ALL: [Aspect; 22] = [
        Aspect::Str,
        Aspect::Int,
        Aspect::Cha,
        Aspect::Agi,
        Aspect::Vit,
        Aspect::Res,
        Aspect::Omni,
        Aspect::Wis,
        Aspect::GlassCannon,
        Aspect::Dam,
        Aspect::Crit,
        Aspect::NonCrit,
        Aspect::Heal,
        Aspect::ApReduction,
        Aspect::MpReduction,
        Aspect::Pvp,
        Aspect::Duel,
        Aspect::Trap,
        Aspect::Summon,
        Aspect::Pushback,
        Aspect::Prospecting,
        Aspect::Pods,
    ];

    /// The four main stats an element aspect stands for.
    pub const ELEMENTS: [Aspect; 4] = [Aspect::Str, Aspect::Int, Aspect::Cha, Aspect::Agi];

    pub fn key(&self) -> &'static str {
        match self {
            Aspect::Str => "str",
            Aspect::Int => "int",
            Aspect::Cha => "cha",
            Aspect::Agi => "agi",
            Aspect::Vit => "vit",
            Aspect::Res => "res",
            Aspect::Omni => "omni",
            Aspect::Wis => "wis",
            Aspect::GlassCannon => "glasscannon",
            Aspect::Dam => "dam",
            Aspect::Crit => "crit",
            Aspect::NonCrit => "noncrit",
            Aspect::Heal => "heal",
            Aspect::ApReduction => "aprape",
            Aspect::MpReduction => "mprape",
            Aspect::Pvp => "pvp",
            Aspect::Duel => "duel",
            Aspect::Trap => "trap",
            Aspect::Summon => "summon",
            Aspect::Pushback => "pushback",
            Aspect::Prospecting => "pp",
            Aspect::Pods => "pods",
        }
    }

    pub fn short_name(&self) -> &'static str {
        match self {
            Aspect::Str => "Str",
            Aspect::Int => "Int",
            Aspect::Cha => "Cha",
            Aspect::Agi => "Agi",
            Aspect::Vit => "Vit",
            Aspect::Res => "Res",
            Aspect::Omni => "Omni",
            Aspect::Wis => "Leecher",
            Aspect::GlassCannon => "Glass Cannon",
            Aspect::Dam => "Dam",
            Aspect::Crit => "Crit",
            Aspect::NonCrit => "Non-Crit",
            Aspect::Heal => "Heals",
            Aspect::ApReduction => "AP Red",
            Aspect::MpReduction => "MP Red",
            Aspect::Pvp => "PVP",
            Aspect::Duel => "Duel",
            Aspect::Trap => "Traps",
            Aspect::Summon => "Summons",
            Aspect::Pushback => "Pushback",
            Aspect::Prospecting => "PP",
            Aspect::Pods => "Pods",
        }
    }

    pub fn is_element(&self) -> bool {
        Aspect::ELEMENTS.contains(self)
    }
}

impl fmt::Display for Aspect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Aspect {
    type Err = WeightsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Aspect::ALL
            .iter()
            .copied()
            .find(|aspect| aspect.key() == s)
            .ok_or_else(|| WeightsError::UnknownAspect(s.to_string()))
    }
}

/// Parse aspect keys, failing on the first unknown one.
pub fn parse_aspects<'a, I>(keys: I) -> Result<BTreeSet<Aspect>, WeightsError>
where
    I: IntoIterator<Item = &'a str>,
{
    keys.into_iter().map(str::parse).collect()
}

/// Chosen main stats, or all four for an omni build.
pub fn elements(aspects: &BTreeSet<Aspect>) -> Vec<Aspect> {
    if aspects.contains(&Aspect::Omni) {
        return Aspect::ELEMENTS.to_vec();
    }
    Aspect::ELEMENTS
        .iter()
        .copied()
        .filter(|element| aspects.contains(element))
        .collect()
}

/// How per-element parameter values are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    Max,
    FloatAvg,
}

/// Value of `param` for a class and its chosen elements.
///
/// With several elements, every element contributes once and every matching
/// hybrid row contributes twice.
pub fn param_for_build(class: CharacterClass, elements: &[Aspect], param: Param, policy: Policy) -> f64 {
    let profile = profile(class);
    match elements {
        [] => class_value(&profile, param),
        [element] => element_value(&profile, element.key(), param)
            .unwrap_or_else(|| class_value(&profile, param)),
        _ => {
            let mut values = Vec::new();
            if profile.has_hybrids() {
                for (i, first) in elements.iter().enumerate() {
                    for second in &elements[i + 1..] {
                        let mut pair = [first.key(), second.key()];
                        pair.sort_unstable();
                        if let Some(value) = element_value(&profile, &pair.join("/"), param) {
                            values.push(value);
                            values.push(value);
                        }
                    }
                }
            }
            for element in elements {
                values.push(
                    element_value(&profile, element.key(), param)
                        .unwrap_or_else(|| class_value(&profile, param)),
                );
            }
            match policy {
                Policy::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
                Policy::FloatAvg => values.iter().sum::<f64>() / values.len() as f64,
            }
        }
    }
}

fn element_value(profile: &Profile, key: &str, param: Param) -> Option<f64> {
    profile.element_row(key).and_then(|row| lookup(row, param))
}

fn class_value(profile: &Profile, param: Param) -> f64 {
    lookup(profile.all, param).unwrap_or_else(|| default_value(param))
}

fn set(w: &mut BTreeMap<String, f64>, key: &str, value: f64) {
    w.insert(key.to_string(), value);
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a * (1.0 - t) + b * t
}

/// Derived objective weights (by stat key) and minimum floors (by stat name).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildWeights {
    pub objective: BTreeMap<String, i64>,
    pub minimums: BTreeMap<String, i32>,
}

impl BuildWeights {
    /// Replace the request's objective and merge the floors into its minimums.
    pub fn apply(&self, request: &mut BuildRequest) {
        request.objective_values = self
            .objective
            .iter()
            .map(|(key, value)| (key.clone(), *value as f64))
            .collect();
        request
            .minimum_stats
            .stats
            .extend(self.minimums.iter().map(|(name, value)| (name.clone(), *value)));
    }
}

/// Objective weights and minimum floors for a build.
pub fn weights(
    class: CharacterClass,
    level: u32,
    aspects: &BTreeSet<Aspect>,
) -> Result<BuildWeights, WeightsError> {
    if level == 0 || level > MAX_CHAR_LEVEL {
        return Err(WeightsError::InvalidLevel(level));
    }
    Ok(BuildWeights {
        objective: objective_weights(class, level, aspects),
        minimums: minimum_floors(class, level, aspects),
    })
}

struct Build<'a> {
    class: CharacterClass,
    elements: Vec<Aspect>,
    aspects: &'a BTreeSet<Aspect>,
}

impl Build<'_> {
    fn has(&self, aspect: Aspect) -> bool {
        self.aspects.contains(&aspect)
    }

    fn has_element(&self, element: Aspect) -> bool {
        self.elements.contains(&element)
    }

    fn max(&self, param: Param) -> f64 {
        param_for_build(self.class, &self.elements, param, Policy::Max)
    }

    fn avg(&self, param: Param) -> f64 {
        param_for_build(self.class, &self.elements, param, Policy::FloatAvg)
    }
}

/// Objective weights keyed by stat key.
pub fn objective_weights(class: CharacterClass, level: u32, aspects: &BTreeSet<Aspect>) -> BTreeMap<String, i64> {
    let build = Build {
        class,
        elements: elements(aspects),
        aspects,
    };
    let b = BASE;
    let level_pct = level as f64 / 200.0;
    let mut w: BTreeMap<String, f64> = BTreeMap::new();

    set(&mut w, "ap", (20.0 + 100.0 * level_pct) * b);
    set(&mut w, "mp", (20.0 + 100.0 * level_pct) * b);
    set(
        &mut w,
        "range",
        (16.0 + 80.0 * level_pct) * build.avg(Param::RangeImportance) * b,
    );

    let mut attack_factor = match build.elements.len() {
        0 => 0.0,
        1 => 6.0,
        2 => 5.0,
        3 => 3.0,
        _ => 2.0,
    };
    if build.has(Aspect::GlassCannon) {
        attack_factor *= 1.5;
    }
    let dam_mult = if build.has(Aspect::Dam) { 2.0 } else { 1.0 };
    let res_per_factor = 2.0 + (10.0 * level_pct * level_pct);

    let lock = build.avg(Param::LockImportance) * 10.0 * b;
    let dodge = build.avg(Param::DodgeImportance) * 10.0 * b;
    set(&mut w, "lock", lock);
    set(&mut w, "dodge", dodge);
    let vit = if build.has(Aspect::Vit) {
        1.5 * b
    } else {
        (build.avg(Param::VitalityImportance) + 0.5) * b
    };
    set(&mut w, "vit", vit);
    set(&mut w, "hp", vit);

    let mut wis = (if build.has(Aspect::Wis) { 25.0 } else { 2.0 }) * b;
    let element_weight = |element| {
        if build.has_element(element) {
            attack_factor * b
        } else {
            0.0
        }
    };
    let mut strength = element_weight(Aspect::Str);
    let mut intelligence = element_weight(Aspect::Int);
    let mut agility = element_weight(Aspect::Agi);
    let mut chance = element_weight(Aspect::Cha);
    agility = agility.max((dodge + lock) / 10.0);

    let mut power = match build.elements.len() {
        0 => 0.0,
        1 => 3.2,
        2 => 5.0,
        3 => 5.2,
        _ => 5.5,
    } * b;
    if build.has(Aspect::GlassCannon) {
        power *= 1.5;
    }
    power *= build.avg(Param::PowerEffectiveness);
    set(&mut w, "pow", power);

    let earth = strength * build.max(Param::EarthDamage) * dam_mult;
    let fire = intelligence * build.max(Param::FireDamage) * dam_mult;
    let air = agility * build.max(Param::AirDamage) * dam_mult;
    let water = chance * build.max(Param::WaterDamage) * dam_mult;
    let neutral = build.max(Param::NeutralDamage) * earth;
    set(&mut w, "earthdam", earth);
    set(&mut w, "firedam", fire);
    set(&mut w, "airdam", air);
    set(&mut w, "waterdam", water);
    set(&mut w, "neutdam", neutral);
    let mut dam = neutral + earth + fire + air + water;

    let res_w = (if build.has(Aspect::Res) { 1.5 } else { 1.0 })
        * (if build.has(Aspect::GlassCannon) { 0.5 } else { 1.0 })
        * b;
    let resper_w = res_per_factor * res_w;
    for damage_type in DAMAGE_TYPES {
        set(&mut w, &format!("{}res", damage_type), res_w);
        set(&mut w, &format!("{}resper", damage_type), resper_w);
    }
    let linear_res_bonus_factor = 0.5 * level_pct + 0.5;
    set(
        &mut w,
        "fireres",
        res_w * (1.0 + build.avg(Param::FireResist) * linear_res_bonus_factor),
    );
    set(
        &mut w,
        "fireresper",
        resper_w * (1.0 + build.avg(Param::PercentFireResist)),
    );

    let mut apred = build.avg(Param::ApReductionImportance) * 12.0 * b;
    let mut mpred = build.avg(Param::MpReductionImportance) * 12.0 * b;
    let apres = if build.has(Aspect::Pvp) { 5.0 * b } else { 1.0 * b };
    let mpres = if build.has(Aspect::Pvp) { 2.0 * b } else { 1.0 * b };
    let minimum_red = if build.elements.is_empty() { 20.0 * b } else { 5.0 * b };
    if build.has(Aspect::ApReduction) {
        apred = (2.5 * apred).max(minimum_red);
    }
    if build.has(Aspect::MpReduction) {
        mpred = (2.5 * mpred).max(minimum_red);
    }
    set(&mut w, "apred", apred);
    set(&mut w, "mpred", mpred);
    set(&mut w, "apres", apres);
    set(&mut w, "mpres", mpres);
    wis = wis.max((apred + mpred + apres + mpres) / 10.0);

    if build.has(Aspect::Dam) {
        dam = dam.max(30.0 * b);
    }
    set(&mut w, "dam", dam);

    let mut heals = build.avg(Param::HealsImportance) * 8.0 * b;
    if build.has(Aspect::Heal) {
        heals = 4.0 * b + heals * 1.5;
        intelligence = intelligence.max(heals / INT_PER_HEALS);
    }
    set(&mut w, "heals", heals);

    if build.max(Param::TrapsAreImportant) > 0.0 {
        let (trapdam, trapdamper) = if build.has(Aspect::Trap) {
            (10.0 * b, 3.0 * b)
        } else {
            (3.0 * b, 1.0 * b)
        };
        set(&mut w, "trapdam", trapdam);
        set(&mut w, "trapdamper", trapdamper);
    }

    let prospecting = if build.has(Aspect::Prospecting) {
        10.0 * b
    } else if !build.has(Aspect::Pvp) {
        0.2 * b
    } else {
        0.0
    };
    set(&mut w, "pp", prospecting);
    chance = chance.max(prospecting / 10.0);

    let initiative = if build.has(Aspect::Duel) {
        0.3 * b
    } else if build.has(Aspect::Pvp) {
        0.1 * b
    } else {
        0.03 * b
    };
    set(&mut w, "init", initiative);

    if build.has(Aspect::Pods) {
        let pods = 10.0 * b;
        set(&mut w, "pod", pods);
        strength = strength.max(pods / 5.0);
    }

    let pushback = if build.has(Aspect::Pushback) {
        15.0 * b
    } else {
        build.avg(Param::PushbackDamageImportance) * 10.0 * b
    };
    set(&mut w, "pshdam", pushback);

    let summon = if build.max(Param::SummonsAreImportant) > 0.0 {
        if build.has(Aspect::Summon) { 40.0 * b } else { 10.0 * b }
    } else if build.has(Aspect::Summon) {
        20.0 * b
    } else {
        0.0
    };
    set(&mut w, "summon", summon);

    set(&mut w, "pshres", 0.1 * b);
    set(
        &mut w,
        "crires",
        if build.has(Aspect::Pvp) { 2.0 * res_w } else { 0.2 * res_w },
    );

    let (critical_hits, critical_damage) = if build.has(Aspect::Crit) {
        (140.0 * b, 1.85 * dam * build.avg(Param::CriticalDamage))
    } else if build.has(Aspect::NonCrit) {
        (-4.0 * b, 0.0)
    } else {
        (12.0 * b, dam * build.avg(Param::CriticalDamage))
    };
    set(&mut w, "ch", critical_hits);
    set(&mut w, "cridam", critical_damage);

    let final_damage_w = power * lerp(2.0, 12.0, level_pct);
    let meleeness = build.avg(Param::Meleeness);

    let melee_attack = lerp(0.1, 0.7, meleeness);
    set(&mut w, "permedam", melee_attack * final_damage_w);
    set(&mut w, "perrandam", (1.0 - melee_attack) * final_damage_w);

    let weapon = lerp(0.0, 0.25, level_pct);
    set(&mut w, "perweadam", weapon * final_damage_w);
    set(&mut w, "perspedam", (1.0 - weapon) * final_damage_w);

    let melee_defense = lerp(0.2, 0.4, meleeness);
    set(&mut w, "respermee", melee_defense * resper_w * 5.0);
    set(&mut w, "resperran", (1.0 - melee_defense) * resper_w * 5.0);
    set(&mut w, "resperwea", melee_defense * resper_w * 5.0);
    set(&mut w, "meleeness", meleeness);

    set(&mut w, "wis", wis);
    set(&mut w, "str", strength);
    set(&mut w, "int", intelligence);
    set(&mut w, "agi", agility);
    set(&mut w, "cha", chance);

    w.into_iter()
        .map(|(key, value)| (key, value.round_ties_even() as i64))
        .collect()
}

/// Stat names of the floors the heuristic sets.
const AP_NAME: &str = "AP";
const MP_NAME: &str = "MP";
const RANGE_NAME: &str = "Range";
const SUMMON_NAME: &str = "Summon";

/// Minimum AP, MP, Range and Summon floors keyed by stat name.
pub fn minimum_floors(class: CharacterClass, level: u32, aspects: &BTreeSet<Aspect>) -> BTreeMap<String, i32> {
    let build = Build {
        class,
        elements: elements(aspects),
        aspects,
    };

    let (ap, mp, range) = match level {
        0..=59 => (6.0, 3.0, 0.0),
        60..=119 => (8.0, 4.0, 2.0),
        120..=159 => (9.0, 5.0, 3.0),
        160..=198 => (10.0, 5.0, 4.0),
        199 => (11.0, 5.0, 4.0),
        _ => (
            build.max(Param::EndgameMinAp),
            build.max(Param::EndgameMinMp),
            4.0,
        ),
    };
    let range = (range * build.avg(Param::RangeImportance)).round_ties_even();

    let mut summon = match level {
        0..=39 => 1.0,
        40..=179 => build.max(Param::MinSummonsLowLevel),
        _ => build.max(Param::MinSummonsHighLevel),
    };
    if build.has(Aspect::Summon) {
        summon += 1.0;
    }

    [
        (AP_NAME, ap),
        (MP_NAME, mp),
        (RANGE_NAME, range),
        (SUMMON_NAME, summon),
    ]
    .into_iter()
    .map(|(name, value)| (name.to_string(), value as i32))
    .collect()
}

/// Options that fit the aspects: leeching builds only use the Cawwot Dofus.
pub fn suggested_options(aspects: &BTreeSet<Aspect>, options: &BuildOptions) -> BuildOptions {
    BuildOptions {
        dofus: if aspects.contains(&Aspect::Wis) {
            DofusOption::Cawwot
        } else {
            DofusOption::All
        },
        ..options.clone()
    }
}

/// Short label for a build, e.g. `"Str/Int Crit Dam/PVP"`.
pub fn build_line(aspects: &BTreeSet<Aspect>) -> String {
    let mut sections: [Vec<Aspect>; 3] = Default::default();
    for aspect in aspects {
        if aspect.is_element() {
            sections[0].push(*aspect);
        } else if matches!(aspect, Aspect::Crit | Aspect::NonCrit) {
            sections[1].push(*aspect);
        } else if *aspect != Aspect::Omni {
            sections[2].push(*aspect);
        }
    }
    if aspects.contains(&Aspect::Omni) {
        sections[0] = vec![Aspect::Omni];
    }

    sections
        .iter()
        .filter(|section| !section.is_empty())
        .map(|section| {
            section
                .iter()
                .map(Aspect::short_name)
                .collect::<Vec<_>>()
                .join("/")
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aspects(keys: &[&str]) -> BTreeSet<Aspect> {
        parse_aspects(keys.iter().copied()).unwrap()
    }

    #[test]
    fn test_parse_aspects() {
        assert_eq!(
            aspects(&["str", "aprape", "pp"]),
            [Aspect::Str, Aspect::ApReduction, Aspect::Prospecting].into_iter().collect()
        );
        assert_eq!(
            parse_aspects(["str", "balanced"]),
            Err(WeightsError::UnknownAspect("balanced".to_string()))
        );
        let parsed: BTreeSet<Aspect> = serde_json::from_str(r#"["glasscannon", "mprape"]"#).unwrap();
        assert!(parsed.contains(&Aspect::GlassCannon));
        assert!(parsed.contains(&Aspect::MpReduction));
    }

    #[test]
    fn test_elements() {
        assert_eq!(elements(&aspects(&["agi", "str", "dam"])), vec![Aspect::Str, Aspect::Agi]);
        assert_eq!(elements(&aspects(&["omni", "str"])), Aspect::ELEMENTS.to_vec());
        assert!(elements(&aspects(&["vit"])).is_empty());
    }

    #[test]
    fn test_param_for_build_falls_back_to_class_then_default() {
        let none: [Aspect; 0] = [];
        assert_eq!(
            param_for_build(CharacterClass::Cra, &none, Param::DodgeImportance, Policy::FloatAvg),
            0.9
        );
        assert_eq!(
            param_for_build(CharacterClass::Cra, &none, Param::RangeImportance, Policy::FloatAvg),
            1.0
        );
        assert_eq!(
            param_for_build(CharacterClass::Iop, &[Aspect::Str], Param::EarthDamage, Policy::Max),
            6.0
        );
        assert_eq!(
            param_for_build(CharacterClass::Iop, &[Aspect::Str], Param::FireDamage, Policy::Max),
            0.0
        );
    }

    #[test]
    fn test_param_for_build_aggregates_elements() {
        let pair = [Aspect::Str, Aspect::Int];
        assert_eq!(
            param_for_build(CharacterClass::Iop, &pair, Param::EarthDamage, Policy::Max),
            6.0
        );
        assert_eq!(
            param_for_build(CharacterClass::Iop, &pair, Param::EarthDamage, Policy::FloatAvg),
            3.0
        );
        // The cha/str hybrid row counts twice next to two single rows.
        let hybrid = [Aspect::Str, Aspect::Cha];
        assert_eq!(
            param_for_build(CharacterClass::Huppermage, &hybrid, Param::EarthDamage, Policy::FloatAvg),
            (6.0 + 6.0 + 6.0 + 0.0) / 4.0
        );
        // str/int has no hybrid row.
        assert_eq!(
            param_for_build(CharacterClass::Huppermage, &pair, Param::FireDamage, Policy::FloatAvg),
            3.0
        );
    }

    #[test]
    fn test_iop_strength_damage_weights() {
        let w = weights(CharacterClass::Iop, 200, &aspects(&["str", "dam"])).unwrap();
        let objective = &w.objective;
        assert_eq!(objective["ap"], 2400);
        assert_eq!(objective["mp"], 2400);
        assert_eq!(objective["range"], 0);
        assert_eq!(objective["str"], 120);
        assert_eq!(objective["earthdam"], 1440);
        assert_eq!(objective["neutdam"], 144);
        assert_eq!(objective["dam"], 1584);
        assert_eq!(objective["pow"], 64);
        assert_eq!(objective["lock"], 120);
        assert_eq!(objective["dodge"], 80);
        assert_eq!(objective["agi"], 20);
        assert_eq!(objective["vit"], 20);
        assert_eq!(objective["hp"], 20);
        assert_eq!(objective["wis"], 40);
        assert_eq!(objective["neutres"], 20);
        assert_eq!(objective["neutresper"], 240);
        assert_eq!(objective["ch"], 240);
        assert_eq!(objective["cridam"], 713);
        // 0.5 rounds half to even.
        assert_eq!(objective["meleeness"], 0);
        assert!(!objective.contains_key("trapdam"));
    }

    #[test]
    fn test_weights_are_deterministic() {
        let set = aspects(&["agi", "int", "crit", "pvp", "glasscannon"]);
        let first = weights(CharacterClass::Huppermage, 173, &set).unwrap();
        let second = weights(CharacterClass::Huppermage, 173, &set).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_aspect_step_multipliers() {
        let noncrit = objective_weights(CharacterClass::Iop, 200, &aspects(&["str", "noncrit"]));
        assert_eq!(noncrit["ch"], -80);
        assert_eq!(noncrit["cridam"], 0);

        let plain = objective_weights(CharacterClass::Iop, 200, &aspects(&["str"]));
        let glass = objective_weights(CharacterClass::Iop, 200, &aspects(&["str", "glasscannon"]));
        assert_eq!(glass["str"], plain["str"] * 3 / 2);
        assert_eq!(glass["neutres"] * 2, plain["neutres"]);

        let sram = objective_weights(CharacterClass::Sram, 100, &aspects(&["trap"]));
        assert_eq!(sram["trapdam"], 200);
        assert_eq!(sram["trapdamper"], 60);
    }

    #[test]
    fn test_minimum_floors_by_level_band() {
        let none = BTreeSet::new();
        let low = minimum_floors(CharacterClass::Cra, 50, &none);
        assert_eq!((low["AP"], low["MP"], low["Range"], low["Summon"]), (6, 3, 0, 1));

        let mid = minimum_floors(CharacterClass::Cra, 150, &none);
        assert_eq!((mid["AP"], mid["MP"], mid["Range"]), (9, 5, 3));

        let endgame = minimum_floors(CharacterClass::Iop, 200, &aspects(&["str", "dam"]));
        assert_eq!((endgame["AP"], endgame["MP"], endgame["Range"]), (11, 6, 0));

        // Range 4 * 0.5 importance, summons from the high level policy plus one.
        let osa = minimum_floors(CharacterClass::Osamodas, 199, &aspects(&["summon"]));
        assert_eq!(osa["AP"], 11);
        assert_eq!(osa["Range"], 0);
        assert_eq!(osa["Summon"], 4);
        let xelor = minimum_floors(CharacterClass::Xelor, 190, &none);
        assert_eq!(xelor["Range"], 2);
    }

    #[test]
    fn test_invalid_level_is_rejected() {
        assert_eq!(
            weights(CharacterClass::Iop, 0, &BTreeSet::new()),
            Err(WeightsError::InvalidLevel(0))
        );
        assert!(weights(CharacterClass::Iop, 201, &BTreeSet::new()).is_err());
    }

    #[test]
    fn test_apply_fills_request() {
        let w = weights(CharacterClass::Iop, 200, &aspects(&["str"])).unwrap();
        let mut request = BuildRequest::new(CharacterClass::Iop, 200);
        request.minimum_stats.stats.insert("Vitality".to_string(), 1000);
        w.apply(&mut request);
        assert_eq!(request.objective_values["ap"], 2400.0);
        assert_eq!(request.minimum_stats.stats["AP"], 11);
        assert_eq!(request.minimum_stats.stats["Vitality"], 1000);
    }

    #[test]
    fn test_suggested_options() {
        let options = suggested_options(&aspects(&["wis"]), &BuildOptions::default());
        assert_eq!(options.dofus, DofusOption::Cawwot);
        let options = suggested_options(&aspects(&["str"]), &options);
        assert_eq!(options.dofus, DofusOption::All);
    }

    #[test]
    fn test_build_line() {
        assert_eq!(build_line(&aspects(&["pvp", "int", "str", "crit", "dam"])), "Str/Int Crit Dam/PVP");
        assert_eq!(build_line(&aspects(&["omni", "agi", "wis"])), "Omni Leecher");
        assert_eq!(build_line(&BTreeSet::new()), "");
    }
}
