use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::catalog::ItemId;
use crate::constants::CharacterClass;

/// One optimization request against a pre-built model.
///
/// Every collection is ordered so that equal requests serialize identically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildRequest {
    pub char_level: u32,
    /// Base stat values keyed by stat name.
    #[serde(default)]
    pub base_stats_by_attr: BTreeMap<String, i32>,
    #[serde(default)]
    pub minimum_stats: MinimumStats,
    /// Equipment slot name to the item locked into it, if any.
    #[serde(default)]
    pub locked_equips: BTreeMap<String, Option<ItemId>>,
    #[serde(default)]
    pub forbidden_equips: BTreeSet<ItemId>,
    /// Objective weight per stat key.
    #[serde(default)]
    pub objective_values: BTreeMap<String, f64>,
    #[serde(default)]
    pub options: BuildOptions,
    pub char_class: CharacterClass,
    #[serde(default)]
    pub stat_points_to_distribute: i32,
}

impl BuildRequest {
    pub fn new(char_class: CharacterClass, char_level: u32) -> Self {
        BuildRequest {
            char_level,
            base_stats_by_attr: BTreeMap::new(),
            minimum_stats: MinimumStats::default(),
            locked_equips: BTreeMap::new(),
            forbidden_equips: BTreeSet::new(),
            objective_values: BTreeMap::new(),
            options: BuildOptions::default(),
            char_class,
            stat_points_to_distribute: 0,
        }
    }

    /// Item ids locked into some slot, with how many slots each occupies.
    pub fn locked_item_counts(&self) -> BTreeMap<ItemId, u32> {
        let mut counts = BTreeMap::new();
        for item in self.locked_equips.values().flatten() {
            *counts.entry(*item).or_insert(0) += 1;
        }
        counts
    }

    /// Canonical serialization used to memoize results.
    pub fn cache_key(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Stat floors keyed by stat name, plus multi-stat floors keyed by the
/// advanced minimum's display name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MinimumStats {
    #[serde(flatten)]
    pub stats: BTreeMap<String, i32>,
    #[serde(default, rename = "adv_mins")]
    pub advanced: BTreeMap<String, i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
enum FlagOrMode {
    Flag(bool),
    Mode(String),
}

/// Which Dofus-slot items may be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "FlagOrMode", into = "FlagOrMode")]
pub enum DofusOption {
    #[default]
    All,
    None,
    /// Exclude items counted by the light-set trophy rule.
    LightSet,
    /// Only the Cawwot Dofus.
    Cawwot,
}

impl TryFrom<FlagOrMode> for DofusOption {
    type Error = String;

    fn try_from(value: FlagOrMode) -> Result<Self, Self::Error> {
        match value {
            FlagOrMode::Flag(true) => Ok(DofusOption::All),
            FlagOrMode::Flag(false) => Ok(DofusOption::None),
            FlagOrMode::Mode(mode) => match mode.as_str() {
                "lightset" => Ok(DofusOption::LightSet),
                "cawwot" => Ok(DofusOption::Cawwot),
                other => Err(format!("unknown dofus option {}", other)),
            },
        }
    }
}

impl From<DofusOption> for FlagOrMode {
    fn from(value: DofusOption) -> Self {
        match value {
            DofusOption::All => FlagOrMode::Flag(true),
            DofusOption::None => FlagOrMode::Flag(false),
            DofusOption::LightSet => FlagOrMode::Mode("lightset".to_string()),
            DofusOption::Cawwot => FlagOrMode::Mode("cawwot".to_string()),
        }
    }
}

/// MP exotic: a forged +1 MP, none, or the Gelano ring variant that grants it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "FlagOrMode", into = "FlagOrMode")]
pub enum MpExo {
    Yes,
    #[default]
    No,
    Gelano,
}

impl TryFrom<FlagOrMode> for MpExo {
    type Error = String;

    fn try_from(value: FlagOrMode) -> Result<Self, Self::Error> {
        match value {
            FlagOrMode::Flag(true) => Ok(MpExo::Yes),
            FlagOrMode::Flag(false) => Ok(MpExo::No),
            FlagOrMode::Mode(mode) if mode == "gelano" => Ok(MpExo::Gelano),
            FlagOrMode::Mode(other) => Err(format!("unknown mp_exo option {}", other)),
        }
    }
}

impl From<MpExo> for FlagOrMode {
    fn from(value: MpExo) -> Self {
        match value {
            MpExo::Yes => FlagOrMode::Flag(true),
            MpExo::No => FlagOrMode::Flag(false),
            MpExo::Gelano => FlagOrMode::Mode("gelano".to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildOptions {
    #[serde(default)]
    pub dofus: DofusOption,
    #[serde(default)]
    pub ap_exo: bool,
    #[serde(default)]
    pub mp_exo: MpExo,
    #[serde(default)]
    pub range_exo: bool,
    #[serde(default = "allowed")]
    pub dragoturkey: bool,
    #[serde(default = "allowed")]
    pub seemyool: bool,
    #[serde(default = "allowed")]
    pub rhineetle: bool,
}

fn allowed() -> bool {
    true
}

impl Default for BuildOptions {
    fn default() -> Self {
        BuildOptions {
            dofus: DofusOption::All,
            ap_exo: false,
            mp_exo: MpExo::No,
            range_exo: false,
            dragoturkey: true,
            seemyool: true,
            rhineetle: true,
        }
    }
}

impl BuildOptions {
    /// Mount families the request excludes from the pet slot.
    pub fn excluded_mounts(&self) -> impl Iterator<Item = &'static str> {
        [
            ("Dragoturkey", self.dragoturkey),
            ("Seemyool", self.seemyool),
            ("Rhineetle", self.rhineetle),
        ]
        .into_iter()
        .filter(|(_, allowed)| !allowed)
        .map(|(name, _)| name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_options_accept_flags_and_modes() {
        let options: BuildOptions = serde_json::from_value(json!({
            "dofus": "lightset",
            "ap_exo": true,
            "mp_exo": "gelano",
            "dragoturkey": false
        }))
        .unwrap();
        assert_eq!(options.dofus, DofusOption::LightSet);
        assert_eq!(options.mp_exo, MpExo::Gelano);
        assert!(options.seemyool);
        assert_eq!(options.excluded_mounts().collect::<Vec<_>>(), vec!["Dragoturkey"]);

        let options: BuildOptions = serde_json::from_value(json!({"dofus": false, "mp_exo": true})).unwrap();
        assert_eq!(options.dofus, DofusOption::None);
        assert_eq!(options.mp_exo, MpExo::Yes);
    }

    #[test]
    fn test_unknown_option_mode_is_rejected() {
        let result: Result<BuildOptions, _> = serde_json::from_value(json!({"dofus": "all"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_options_serialize_back_to_flags() {
        let value = serde_json::to_value(BuildOptions::default()).unwrap();
        assert_eq!(value["dofus"], json!(true));
        assert_eq!(value["mp_exo"], json!(false));
    }

    #[test]
    fn test_request_deserializes_with_defaults() {
        let request: BuildRequest = serde_json::from_value(json!({
            "char_level": 200,
            "char_class": "Iop",
            "minimum_stats": {"Vitality": 1000, "adv_mins": {"Elemental Resistances": 100}},
            "locked_equips": {"ring1": 12, "ring2": 12, "hat": null}
        }))
        .unwrap();
        assert_eq!(request.minimum_stats.stats["Vitality"], 1000);
        assert_eq!(request.minimum_stats.advanced.len(), 1);
        assert_eq!(request.locked_item_counts()[&12], 2);
        assert_eq!(request.options, BuildOptions::default());
    }

    #[test]
    fn test_minimum_stats_are_keyed_by_stat_name() {
        let minimums: MinimumStats =
            serde_json::from_str(r#"{"Vitality": 1000, "AP": 11, "adv_mins": {"Summons": 3}}"#).unwrap();
        assert_eq!(minimums.stats.get("Vitality"), Some(&1000));
        assert_eq!(minimums.stats.get("AP"), Some(&11));
        assert!(!minimums.stats.contains_key("adv_mins"));
        assert_eq!(minimums.advanced.get("Summons"), Some(&3));

        let value = serde_json::to_value(&minimums).unwrap();
        assert_eq!(value, json!({"Vitality": 1000, "AP": 11, "adv_mins": {"Summons": 3}}));

        let empty: MinimumStats = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, MinimumStats::default());
    }

    #[test]
    fn test_cache_key_is_stable() {
        let mut a = BuildRequest::new(CharacterClass::Cra, 150);
        a.objective_values.insert("vit".to_string(), 10.0);
        a.objective_values.insert("agi".to_string(), 100.0);
        let mut b = BuildRequest::new(CharacterClass::Cra, 150);
        b.objective_values.insert("agi".to_string(), 100.0);
        b.objective_values.insert("vit".to_string(), 10.0);
        assert_eq!(a.cache_key().unwrap(), b.cache_key().unwrap());
    }
}
