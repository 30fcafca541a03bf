//! Read-only item catalog consumed by the optimizer.
//!
//! The catalog is produced elsewhere (scraping and ETL are not part of this
//! crate); here it is only loaded from its JSON dump and indexed.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type ItemId = u32;
pub type SetId = u32;
pub type StatId = u32;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("unknown item {0}")]
    UnknownItem(String),

    #[error("unknown stat {0}")]
    UnknownStat(String),

    #[error("unknown set {0}")]
    UnknownSet(String),

    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Equipment body location an item occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SlotType {
    Hat,
    Cloak,
    Amulet,
    Ring,
    Belt,
    Boots,
    Weapon,
    Shield,
    Pet,
    Dofus,
}

impl SlotType {
    pub const ALL: [SlotType; 10] = [
        SlotType::Hat,
        SlotType::Cloak,
        SlotType::Amulet,
        SlotType::Ring,
        SlotType::Belt,
        SlotType::Boots,
        SlotType::Weapon,
        SlotType::Shield,
        SlotType::Pet,
        SlotType::Dofus,
    ];
}

impl fmt::Display for SlotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Named special rule an item takes part in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemCondition(pub String);

impl ItemCondition {
    /// Trophy that restricts how many big set bonuses can be worn with it
    pub const LIGHT_SET: &'static str = "light_set";
    /// Only one prysmaradite can be equipped
    pub const PRYSMARADITE: &'static str = "prysmaradite";

    pub fn new(name: impl Into<String>) -> Self {
        ItemCondition(name.into())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatLine {
    pub stat: StatId,
    pub value: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquipCondition {
    pub stat: StatId,
    pub threshold: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub slot: SlotType,
    pub level: u32,
    #[serde(default)]
    pub set: Option<SetId>,
    #[serde(default)]
    pub stats: Vec<StatLine>,
    /// The item can only be worn while `stat > threshold`.
    #[serde(default)]
    pub min_conditions: Vec<EquipCondition>,
    /// The item can only be worn while `stat < threshold`.
    #[serde(default)]
    pub max_conditions: Vec<EquipCondition>,
    #[serde(default)]
    pub conditions: BTreeSet<ItemCondition>,
    /// Weapons only; a one-handed weapon leaves the shield slot usable.
    #[serde(default)]
    pub one_handed: bool,
    #[serde(default)]
    pub removed: bool,
}

impl Item {
    pub fn has_condition(&self, name: &str) -> bool {
        self.conditions.iter().any(|condition| condition.0 == name)
    }

    /// How many copies of the item can be worn at once.
    pub fn max_count(&self) -> i32 {
        if self.slot == SlotType::Ring && self.set.is_none() {
            crate::constants::RING_MAX_COUNT
        } else {
            1
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SetBonus {
    pub pieces: u32,
    pub stat: StatId,
    pub value: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemSet {
    pub id: SetId,
    pub name: String,
    pub items: Vec<ItemId>,
    #[serde(default)]
    pub bonuses: Vec<SetBonus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stat {
    pub id: StatId,
    pub name: String,
    pub key: String,
    #[serde(default)]
    pub max: Option<i32>,
    #[serde(default)]
    pub main: bool,
}

/// Cosmetic variants of one mechanically identical item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AliasGroup {
    pub name: String,
    pub items: Vec<ItemId>,
}

/// Floor on the sum of several stats, e.g. total elemental resistance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvancedMinimum {
    pub key: String,
    pub name: String,
    pub stats: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogData {
    pub items: Vec<Item>,
    #[serde(default)]
    pub sets: Vec<ItemSet>,
    pub stats: Vec<Stat>,
    #[serde(default)]
    pub alias_groups: Vec<AliasGroup>,
    #[serde(default)]
    pub advanced_minimums: Vec<AdvancedMinimum>,
}

/// Indexed, immutable catalog.
#[derive(Debug, Clone)]
pub struct Catalog {
    data: CatalogData,
    item_index: HashMap<ItemId, usize>,
    item_name_index: HashMap<String, usize>,
    set_index: HashMap<SetId, usize>,
    stat_index: HashMap<StatId, usize>,
    stat_name_index: HashMap<String, usize>,
    stat_key_index: HashMap<String, usize>,
    alias_of_item: HashMap<ItemId, usize>,
}

impl Catalog {
    pub fn new(data: CatalogData) -> Self {
        let item_index = data
            .items
            .iter()
            .enumerate()
            .map(|(idx, item)| (item.id, idx))
            .collect();
        // Removed items stay addressable by id but not by name, so a retired
        // variant never shadows the live one.
        let item_name_index = data
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| !item.removed)
            .map(|(idx, item)| (item.name.clone(), idx))
            .collect();
        let set_index = data
            .sets
            .iter()
            .enumerate()
            .map(|(idx, set)| (set.id, idx))
            .collect();
        let stat_index = data
            .stats
            .iter()
            .enumerate()
            .map(|(idx, stat)| (stat.id, idx))
            .collect();
        let stat_name_index = data
            .stats
            .iter()
            .enumerate()
            .map(|(idx, stat)| (stat.name.clone(), idx))
            .collect();
        let stat_key_index = data
            .stats
            .iter()
            .enumerate()
            .map(|(idx, stat)| (stat.key.clone(), idx))
            .collect();
        let mut alias_of_item = HashMap::new();
        for (idx, group) in data.alias_groups.iter().enumerate() {
            for item in &group.items {
                alias_of_item.insert(*item, idx);
            }
        }

        Catalog {
            data,
            item_index,
            item_name_index,
            set_index,
            stat_index,
            stat_name_index,
            stat_key_index,
            alias_of_item,
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let data: CatalogData = serde_json::from_str(json)?;
        Ok(Catalog::new(data))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path)?;
        Catalog::from_json_str(&json)
    }

    pub fn data(&self) -> &CatalogData {
        &self.data
    }

    /// Items that can still be equipped, in catalog order.
    pub fn available_items(&self) -> impl Iterator<Item = &Item> {
        self.data.items.iter().filter(|item| !item.removed)
    }

    pub fn sets(&self) -> &[ItemSet] {
        &self.data.sets
    }

    pub fn stats(&self) -> &[Stat] {
        &self.data.stats
    }

    pub fn main_stats(&self) -> impl Iterator<Item = &Stat> {
        self.data.stats.iter().filter(|stat| stat.main)
    }

    pub fn alias_groups(&self) -> &[AliasGroup] {
        &self.data.alias_groups
    }

    pub fn advanced_minimums(&self) -> &[AdvancedMinimum] {
        &self.data.advanced_minimums
    }

    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.item_index.get(&id).map(|&idx| &self.data.items[idx])
    }

    pub fn item_by_name(&self, name: &str) -> Option<&Item> {
        self.item_name_index.get(name).map(|&idx| &self.data.items[idx])
    }

    pub fn require_item_by_name(&self, name: &str) -> Result<&Item, CatalogError> {
        self.item_by_name(name)
            .ok_or_else(|| CatalogError::UnknownItem(name.to_string()))
    }

    pub fn set(&self, id: SetId) -> Option<&ItemSet> {
        self.set_index.get(&id).map(|&idx| &self.data.sets[idx])
    }

    pub fn stat(&self, id: StatId) -> Option<&Stat> {
        self.stat_index.get(&id).map(|&idx| &self.data.stats[idx])
    }

    pub fn stat_by_name(&self, name: &str) -> Option<&Stat> {
        self.stat_name_index.get(name).map(|&idx| &self.data.stats[idx])
    }

    pub fn require_stat_by_name(&self, name: &str) -> Result<&Stat, CatalogError> {
        self.stat_by_name(name)
            .ok_or_else(|| CatalogError::UnknownStat(name.to_string()))
    }

    pub fn stat_by_key(&self, key: &str) -> Option<&Stat> {
        self.stat_key_index.get(key).map(|&idx| &self.data.stats[idx])
    }

    /// Alias group the item belongs to, if it has cosmetic variants.
    pub fn alias_group_of(&self, item: ItemId) -> Option<&AliasGroup> {
        self.alias_of_item
            .get(&item)
            .map(|&idx| &self.data.alias_groups[idx])
    }

    /// Variants of an alias group that can still be equipped.
    pub fn available_alias_members<'a>(
        &'a self,
        group: &'a AliasGroup,
    ) -> impl Iterator<Item = &'a Item> + 'a {
        group
            .items
            .iter()
            .filter_map(|id| self.item(*id))
            .filter(|item| !item.removed)
    }
}
