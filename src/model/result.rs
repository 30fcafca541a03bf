use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use super::constraints::stat_point_id;
use super::{COUNT, SET_INDICATOR, STAT, STAT_POINT};
use crate::catalog::{Catalog, ItemId};
use crate::constants::STAT_POINT_TIERS;
use crate::problem::Assignment;

/// Smallest piece count that grants a set bonus.
const MIN_BONUS_PIECES: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuildStatus {
    Optimal,
    Infeasible,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetBonusTier {
    pub set_name: String,
    pub pieces: u32,
}

/// Outcome of one request, detached from the model that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildResult {
    pub status: BuildStatus,
    pub items: BTreeMap<ItemId, u32>,
    pub set_bonuses: Vec<SetBonusTier>,
    /// Final stat totals keyed by stat name.
    pub stat_totals: BTreeMap<String, i64>,
    /// Points allocated per main stat, keyed by stat key.
    pub stat_points: BTreeMap<String, i64>,
}

impl BuildResult {
    pub fn infeasible() -> Self {
        BuildResult {
            status: BuildStatus::Infeasible,
            items: BTreeMap::new(),
            set_bonuses: Vec::new(),
            stat_totals: BTreeMap::new(),
            stat_points: BTreeMap::new(),
        }
    }

    pub fn from_assignment(assignment: &Assignment, catalog: &Catalog) -> Self {
        let items = assignment
            .by_category(COUNT)
            .filter(|(_, count)| *count > 0)
            .filter_map(|(id, count)| id.parse::<ItemId>().ok().map(|id| (id, count as u32)))
            .collect();

        let mut set_bonuses: Vec<SetBonusTier> = assignment
            .by_category(SET_INDICATOR)
            .filter(|(_, active)| *active > 0)
            .filter_map(|(id, _)| {
                let (set_id, pieces) = id.rsplit_once('_')?;
                let pieces: u32 = pieces.parse().ok()?;
                let set = catalog.set(set_id.parse().ok()?)?;
                (pieces >= MIN_BONUS_PIECES).then(|| SetBonusTier {
                    set_name: set.name.clone(),
                    pieces,
                })
            })
            .collect();
        set_bonuses.sort_by(|a, b| a.set_name.cmp(&b.set_name));

        let stat_totals = catalog
            .stats()
            .iter()
            .map(|stat| (stat.name.clone(), assignment.value(STAT, stat.id)))
            .collect();

        let stat_points = catalog
            .main_stats()
            .map(|stat| {
                let points = (0..STAT_POINT_TIERS)
                    .map(|tier| assignment.value(STAT_POINT, stat_point_id(tier, stat.id)))
                    .sum();
                (stat.key.clone(), points)
            })
            .collect();

        BuildResult {
            status: BuildStatus::Optimal,
            items,
            set_bonuses,
            stat_totals,
            stat_points,
        }
    }

    pub fn is_optimal(&self) -> bool {
        self.status == BuildStatus::Optimal
    }

    /// Equipped item ids, repeated by count.
    pub fn equipped_item_ids(&self) -> Vec<ItemId> {
        self.items
            .iter()
            .flat_map(|(id, count)| std::iter::repeat(*id).take(*count as usize))
            .collect()
    }

    pub fn stat_total(&self, name: &str) -> i64 {
        self.stat_totals.get(name).copied().unwrap_or(0)
    }

    /// Human-readable summary of sets, stats and gear.
    pub fn describe(&self, catalog: &Catalog) -> String {
        if !self.is_optimal() {
            return "Infeasible".to_string();
        }
        let mut out = String::from("Sets:\n");
        for bonus in &self.set_bonuses {
            let _ = writeln!(out, "{} ({} pieces)", bonus.set_name, bonus.pieces);
        }
        out.push_str("\nStats:\n");
        for stat in catalog.stats() {
            let _ = writeln!(out, "{}: {}", stat.name, self.stat_total(&stat.name));
        }
        out.push_str("\nGear:\n");
        for id in self.equipped_item_ids() {
            match catalog.item(id) {
                Some(item) => {
                    let _ = writeln!(out, "{}", item.name);
                }
                None => {
                    let _ = writeln!(out, "#{}", id);
                }
            }
        }
        out
    }
}
