//! Structural constraints of the loadout model and their per-request
//! right-hand sides.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use log::{debug, warn};

use super::request::{BuildOptions, DofusOption, MinimumStats, MpExo};
use super::{
    Model, COUNT, PRESENCE, PRYSMARADITE, SET_INDICATOR, SET_TIER, STAT, STAT_POINT,
    STAT_POINT_FULL, TROPHIES, TROPHY_RULE,
};
use crate::catalog::{Catalog, ItemCondition, ItemId, SlotType};
use crate::constants::{
    base_hp, slot_capacity, soft_caps, tier_size, CharacterClass, AP_KEY, CAWWOT_DOFUS,
    EQUIP_CONDITION_BIG_M, EQUIP_CONDITION_EPSILON, GELANO_EXO, GELANO_PLAIN, HP_STAT,
    MAXIMUM_TROPHIES, MP_KEY, NO_MINIMUM, RANGE_KEY, SET_TIER_INDICATORS, SET_TIER_MAX,
    STAT_DEPENDENCIES, STAT_POINT_TIERS, STAT_POINT_TIER_COSTS, STAT_POINT_TIER_SWITCHES,
    TIER_FILL_BIG_M, TIER_ORDER_BIG_M, UNCAPPED_TIER,
};
use crate::error::Result;
use crate::problem::{term, RestrictionKind, Term};

/// Key of the single stat-point budget row.
const BUDGET_KEY: &str = "all";

pub(super) fn indicator_id(set: u32, pieces: i32) -> String {
    format!("{}_{}", set, pieces)
}

pub(super) fn stat_point_id(tier: usize, stat: u32) -> String {
    format!("{}_{}", tier, stat)
}

fn tier_key(stat_key: &str, tier: usize) -> String {
    format!("{}_{}", stat_key, tier)
}

impl Model {
    pub(super) fn create_variables(&mut self) -> Result<()> {
        let catalog = Arc::clone(&self.catalog);

        for item in catalog.available_items() {
            self.problem
                .declare_variable(COUNT, item.id, Some(0), Some(item.max_count()))?;
        }
        for item in catalog.available_items() {
            self.problem.declare_variable(PRESENCE, item.id, Some(0), Some(1))?;
        }
        for set in catalog.sets() {
            self.problem
                .declare_variable(SET_TIER, set.id, Some(0), Some(SET_TIER_MAX))?;
            for pieces in 0..SET_TIER_INDICATORS {
                self.problem
                    .declare_variable(SET_INDICATOR, indicator_id(set.id, pieces), Some(0), Some(1))?;
            }
        }
        for stat in catalog.stats() {
            self.problem.declare_variable(STAT, stat.id, None, stat.max)?;
        }
        for stat in catalog.main_stats() {
            for tier in 0..STAT_POINT_TIERS {
                self.problem
                    .declare_variable(STAT_POINT, stat_point_id(tier, stat.id), Some(0), None)?;
            }
            for tier in 0..STAT_POINT_TIER_SWITCHES {
                self.problem.declare_variable(
                    STAT_POINT_FULL,
                    stat_point_id(tier, stat.id),
                    Some(0),
                    Some(1),
                )?;
            }
        }
        self.problem.declare_variable(TROPHY_RULE, 1, Some(0), Some(1))?;
        self.problem.declare_variable(TROPHY_RULE, 2, Some(0), Some(1))?;
        self.problem.declare_variable(TROPHIES, 1, Some(0), Some(1))?;
        self.problem.declare_variable(PRYSMARADITE, 1, Some(0), Some(1))?;
        Ok(())
    }

    pub(super) fn create_constraints(&mut self) -> Result<()> {
        let catalog = Arc::clone(&self.catalog);
        self.create_slot_constraints(&catalog)?;
        self.create_presence_constraints(&catalog)?;
        self.create_gate_constraints(&catalog)?;
        self.create_locked_equip_constraints(&catalog)?;
        self.create_set_constraints(&catalog)?;
        self.create_stat_total_constraints(&catalog)?;
        self.create_condition_constraints(&catalog)?;
        self.create_minimum_stat_constraints(&catalog)?;
        self.create_stat_point_constraints(&catalog)?;
        self.create_light_set_constraints(&catalog)?;
        self.create_prysmaradite_constraints(&catalog)?;
        Ok(())
    }

    fn create_slot_constraints(&mut self, catalog: &Catalog) -> Result<()> {
        for slot in SlotType::ALL {
            let terms: Vec<Term> = catalog
                .available_items()
                .filter(|item| item.slot == slot)
                .map(|item| term(1.0, COUNT, item.id))
                .collect();
            self.problem
                .constrain_le(slot_capacity(slot) as f64, terms)?;
        }
        Ok(())
    }

    fn create_presence_constraints(&mut self, catalog: &Catalog) -> Result<()> {
        for item in catalog.available_items() {
            self.problem.constrain_le(
                0.0,
                vec![term(1.0, PRESENCE, item.id), term(-1.0, COUNT, item.id)],
            )?;
            self.problem.constrain_le(
                0.0,
                vec![
                    term(-(item.max_count() as f64), PRESENCE, item.id),
                    term(1.0, COUNT, item.id),
                ],
            )?;
        }
        Ok(())
    }

    /// Level and forbidden gates; both start closed until `setup` opens them.
    fn create_gate_constraints(&mut self, catalog: &Catalog) -> Result<()> {
        for item in catalog.available_items() {
            let level = self
                .problem
                .constrain_le(0.0, vec![term(1.0, PRESENCE, item.id)])?;
            self.restrictions.insert(RestrictionKind::Level, item.id, level);

            let forbidden = self
                .problem
                .constrain_le(0.0, vec![term(1.0, PRESENCE, item.id)])?;
            self.restrictions
                .insert(RestrictionKind::Forbidden, item.id, forbidden);
        }
        Ok(())
    }

    fn create_locked_equip_constraints(&mut self, catalog: &Catalog) -> Result<()> {
        for item in catalog.available_items() {
            let handle = self
                .problem
                .constrain_le(0.0, vec![term(-1.0, COUNT, item.id)])?;
            self.restrictions.insert(RestrictionKind::Locked, item.id, handle);
        }
        for group in catalog.alias_groups() {
            let terms: Vec<Term> = catalog
                .available_alias_members(group)
                .map(|item| term(-1.0, COUNT, item.id))
                .collect();
            let handle = self.problem.constrain_le(0.0, terms)?;
            self.restrictions
                .insert(RestrictionKind::LockedAlias, &group.name, handle);
        }
        Ok(())
    }

    /// Tier counter equals pieces worn; indicator `k` is on exactly when
    /// `k` pieces are worn.
    fn create_set_constraints(&mut self, catalog: &Catalog) -> Result<()> {
        let big_m = SET_TIER_MAX as f64;
        for set in catalog.sets() {
            let mut terms: Vec<Term> = set
                .items
                .iter()
                .filter_map(|id| catalog.item(*id))
                .filter(|item| !item.removed)
                .map(|item| term(1.0, COUNT, item.id))
                .collect();
            terms.push(term(-1.0, SET_TIER, set.id));
            self.problem.constrain_eq(0.0, terms)?;

            for pieces in 1..SET_TIER_INDICATORS {
                self.problem.constrain_le(
                    0.0,
                    vec![
                        term(pieces as f64, SET_INDICATOR, indicator_id(set.id, pieces)),
                        term(-1.0, SET_TIER, set.id),
                    ],
                )?;
            }
            for pieces in 0..SET_TIER_INDICATORS {
                self.problem.constrain_le(
                    big_m + pieces as f64,
                    vec![
                        term(big_m, SET_INDICATOR, indicator_id(set.id, pieces)),
                        term(1.0, SET_TIER, set.id),
                    ],
                )?;
            }
            let indicators: Vec<Term> = (0..SET_TIER_INDICATORS)
                .map(|pieces| term(1.0, SET_INDICATOR, indicator_id(set.id, pieces)))
                .collect();
            self.problem.constrain_eq(1.0, indicators)?;
        }
        Ok(())
    }

    fn create_stat_total_constraints(&mut self, catalog: &Catalog) -> Result<()> {
        for stat in catalog.stats() {
            let mut terms = vec![term(-1.0, STAT, stat.id)];
            for item in catalog.available_items() {
                for line in item.stats.iter().filter(|line| line.stat == stat.id) {
                    terms.push(term(line.value as f64, COUNT, item.id));
                }
            }
            for set in catalog.sets() {
                for bonus in set.bonuses.iter().filter(|bonus| bonus.stat == stat.id) {
                    if bonus.pieces as i32 > SET_TIER_MAX {
                        debug!("Ignoring {}-piece bonus of set {}", bonus.pieces, set.name);
                        continue;
                    }
                    terms.push(term(
                        bonus.value as f64,
                        SET_INDICATOR,
                        indicator_id(set.id, bonus.pieces as i32),
                    ));
                }
            }
            if stat.main {
                for tier in 0..STAT_POINT_TIERS {
                    terms.push(term(1.0, STAT_POINT, stat_point_id(tier, stat.id)));
                }
            }
            let handle = self.problem.constrain_eq(0.0, terms)?;
            self.restrictions
                .insert(RestrictionKind::StatTotal, &stat.name, handle);
        }
        Ok(())
    }

    /// `stat > threshold` (minimum) and `stat < threshold` (maximum), binding
    /// only while the item is worn.
    fn create_condition_constraints(&mut self, catalog: &Catalog) -> Result<()> {
        let big_m = EQUIP_CONDITION_BIG_M;
        let epsilon = EQUIP_CONDITION_EPSILON;
        for item in catalog.available_items() {
            for condition in &item.min_conditions {
                self.problem.constrain_le(
                    big_m - condition.threshold as f64 - epsilon,
                    vec![
                        term(big_m, PRESENCE, item.id),
                        term(-1.0, STAT, condition.stat),
                    ],
                )?;
            }
            for condition in &item.max_conditions {
                self.problem.constrain_le(
                    big_m + condition.threshold as f64 - epsilon,
                    vec![
                        term(big_m, PRESENCE, item.id),
                        term(1.0, STAT, condition.stat),
                    ],
                )?;
            }
        }
        Ok(())
    }

    fn create_minimum_stat_constraints(&mut self, catalog: &Catalog) -> Result<()> {
        for stat in catalog.stats() {
            let mut terms = vec![term(-1.0, STAT, stat.id)];
            if let Some((_, dependencies)) = STAT_DEPENDENCIES
                .iter()
                .find(|(name, _)| *name == stat.name)
            {
                for (secondary, multiplier) in dependencies.iter() {
                    let secondary = catalog.require_stat_by_name(secondary)?;
                    terms.push(term(-multiplier, STAT, secondary.id));
                }
            }
            let handle = self.problem.constrain_le(-NO_MINIMUM, terms)?;
            self.restrictions
                .insert(RestrictionKind::MinimumStat, &stat.name, handle);
        }

        for minimum in catalog.advanced_minimums() {
            let terms = minimum
                .stats
                .iter()
                .map(|name| {
                    catalog
                        .require_stat_by_name(name)
                        .map(|stat| term(-1.0, STAT, stat.id))
                })
                .collect::<std::result::Result<Vec<_>, _>>()?;
            let handle = self.problem.constrain_le(-NO_MINIMUM, terms)?;
            self.restrictions
                .insert(RestrictionKind::AdvancedMinimum, &minimum.key, handle);
        }
        Ok(())
    }

    /// Piecewise-linear soft cap: tier `i + 1` stays empty until tier `i`
    /// is full, and every tier costs more points than the previous one.
    fn create_stat_point_constraints(&mut self, catalog: &Catalog) -> Result<()> {
        let mut budget = Vec::new();
        for stat in catalog.main_stats() {
            for tier in 1..STAT_POINT_TIERS {
                self.problem.constrain_le(
                    TIER_ORDER_BIG_M,
                    vec![
                        term(1.0, STAT_POINT, stat_point_id(tier, stat.id)),
                        term(TIER_ORDER_BIG_M, STAT_POINT_FULL, stat_point_id(tier - 1, stat.id)),
                    ],
                )?;
            }
            for tier in 0..STAT_POINT_TIERS {
                let handle = self.problem.constrain_le(
                    0.0,
                    vec![term(1.0, STAT_POINT, stat_point_id(tier, stat.id))],
                )?;
                self.restrictions
                    .insert(RestrictionKind::StatPointCap, tier_key(&stat.key, tier), handle);
            }
            for tier in 0..STAT_POINT_TIER_SWITCHES {
                let handle = self.problem.constrain_le(
                    0.0,
                    vec![
                        term(-1.0, STAT_POINT, stat_point_id(tier, stat.id)),
                        term(-TIER_FILL_BIG_M, STAT_POINT_FULL, stat_point_id(tier, stat.id)),
                    ],
                )?;
                self.restrictions
                    .insert(RestrictionKind::StatPointFill, tier_key(&stat.key, tier), handle);
            }
            for (tier, cost) in STAT_POINT_TIER_COSTS.iter().enumerate() {
                budget.push(term(*cost, STAT_POINT, stat_point_id(tier, stat.id)));
            }
        }
        let handle = self.problem.constrain_le(0.0, budget)?;
        self.restrictions
            .insert(RestrictionKind::StatPointBudget, BUDGET_KEY, handle);
        Ok(())
    }

    /// While a light-set item is worn, at most one 3-piece or two 2-piece
    /// bonuses and no 4+-piece bonus may be active.
    fn create_light_set_constraints(&mut self, catalog: &Catalog) -> Result<()> {
        let big_m = 2.0 * catalog.sets().len() as f64 + 2.0;

        let mut low_tiers: Vec<Term> = Vec::new();
        let mut high_tiers: Vec<Term> = Vec::new();
        for set in catalog.sets() {
            low_tiers.push(term(1.0, SET_INDICATOR, indicator_id(set.id, 2)));
            low_tiers.push(term(2.0, SET_INDICATOR, indicator_id(set.id, 3)));
            for pieces in 4..SET_TIER_INDICATORS {
                high_tiers.push(term(1.0, SET_INDICATOR, indicator_id(set.id, pieces)));
            }
        }
        low_tiers.push(term(-big_m, TROPHY_RULE, 1));
        high_tiers.push(term(-big_m, TROPHY_RULE, 2));

        self.problem.constrain_le(2.0, low_tiers)?;
        self.problem
            .constrain_le(big_m, vec![term(big_m, TROPHY_RULE, 1), term(1.0, TROPHIES, 1)])?;
        self.problem.constrain_le(0.0, high_tiers)?;
        self.problem
            .constrain_le(big_m, vec![term(big_m, TROPHY_RULE, 2), term(1.0, TROPHIES, 1)])?;

        let mut trophies: Vec<Term> = catalog
            .available_items()
            .filter(|item| item.has_condition(ItemCondition::LIGHT_SET))
            .map(|item| term(1.0, COUNT, item.id))
            .collect();
        trophies.push(term(-MAXIMUM_TROPHIES, TROPHIES, 1));
        self.problem.constrain_le(0.0, trophies)?;
        Ok(())
    }

    fn create_prysmaradite_constraints(&mut self, catalog: &Catalog) -> Result<()> {
        let mut terms: Vec<Term> = catalog
            .available_items()
            .filter(|item| item.has_condition(ItemCondition::PRYSMARADITE))
            .map(|item| term(1.0, COUNT, item.id))
            .collect();
        terms.push(term(-1.0, PRYSMARADITE, 1));
        self.problem.constrain_le(0.0, terms)?;
        Ok(())
    }

    pub(super) fn modify_level_constraints(&mut self, char_level: u32) -> Result<()> {
        let catalog = Arc::clone(&self.catalog);
        for item in catalog.available_items() {
            let eligible = if char_level >= item.level { 1.0 } else { 0.0 };
            self.restrictions.set_rhs(
                &mut self.problem,
                RestrictionKind::Level,
                &item.id.to_string(),
                eligible,
            )?;
        }
        Ok(())
    }

    pub(super) fn modify_stat_total_constraints(
        &mut self,
        base_stats: &BTreeMap<String, i32>,
        options: &BuildOptions,
    ) -> Result<()> {
        let catalog = Arc::clone(&self.catalog);
        for stat in catalog.stats() {
            let mut value = base_stats.get(&stat.name).copied().unwrap_or(0) as f64;
            let exo = match stat.key.as_str() {
                AP_KEY => options.ap_exo,
                RANGE_KEY => options.range_exo,
                MP_KEY => options.mp_exo == MpExo::Yes,
                _ => false,
            };
            if exo {
                value += 1.0;
            }
            self.restrictions.set_rhs(
                &mut self.problem,
                RestrictionKind::StatTotal,
                &stat.name,
                -value,
            )?;
        }
        Ok(())
    }

    pub(super) fn modify_minimum_stat_constraints(
        &mut self,
        minimums: &MinimumStats,
        char_level: u32,
    ) -> Result<()> {
        let catalog = Arc::clone(&self.catalog);
        for stat in catalog.stats() {
            let floor = minimums
                .stats
                .get(&stat.name)
                .map(|v| *v as f64)
                .unwrap_or(NO_MINIMUM);
            let mut rhs = -floor;
            if stat.name == HP_STAT {
                rhs += base_hp(char_level);
            }
            self.restrictions
                .set_rhs(&mut self.problem, RestrictionKind::MinimumStat, &stat.name, rhs)?;
        }
        for minimum in catalog.advanced_minimums() {
            let floor = minimums
                .advanced
                .get(&minimum.name)
                .map(|v| *v as f64)
                .unwrap_or(NO_MINIMUM);
            self.restrictions.set_rhs(
                &mut self.problem,
                RestrictionKind::AdvancedMinimum,
                &minimum.key,
                -floor,
            )?;
        }
        Ok(())
    }

    pub(super) fn modify_locked_equip_constraints(
        &mut self,
        locked: &BTreeMap<ItemId, u32>,
    ) -> Result<()> {
        let catalog = Arc::clone(&self.catalog);
        let mut item_requirements: BTreeMap<ItemId, f64> = BTreeMap::new();
        let mut group_requirements: BTreeMap<&str, (f64, u32)> = BTreeMap::new();

        for (&id, &occurrences) in locked {
            let Some(item) = catalog.item(id).filter(|item| !item.removed) else {
                warn!("Ignoring lock on unavailable item {}", id);
                continue;
            };
            match catalog.alias_group_of(id) {
                Some(group) => {
                    let entry = group_requirements
                        .entry(group.name.as_str())
                        .or_insert((item.max_count() as f64, 0));
                    entry.1 += occurrences;
                }
                None => {
                    let required = occurrences.min(item.max_count() as u32);
                    item_requirements.insert(id, required as f64);
                }
            }
        }

        for item in catalog.available_items() {
            let required = item_requirements.get(&item.id).copied().unwrap_or(0.0);
            self.restrictions.set_rhs(
                &mut self.problem,
                RestrictionKind::Locked,
                &item.id.to_string(),
                -required,
            )?;
        }
        for group in catalog.alias_groups() {
            let required = group_requirements
                .get(group.name.as_str())
                .map(|(max_count, occurrences)| max_count.min(*occurrences as f64))
                .unwrap_or(0.0);
            self.restrictions.set_rhs(
                &mut self.problem,
                RestrictionKind::LockedAlias,
                &group.name,
                -required,
            )?;
        }
        Ok(())
    }

    pub(super) fn modify_forbidden_items_constraints(
        &mut self,
        forbidden: &BTreeSet<ItemId>,
        options: &BuildOptions,
    ) -> Result<()> {
        let catalog = Arc::clone(&self.catalog);

        let mut expanded = forbidden.clone();
        for id in forbidden {
            if let Some(group) = catalog.alias_group_of(*id) {
                expanded.extend(group.items.iter().copied());
            }
        }
        let excluded_mounts: Vec<&str> = options.excluded_mounts().collect();

        for item in catalog.available_items() {
            let is_dofus = item.slot == SlotType::Dofus;
            let excluded = expanded.contains(&item.id)
                || match options.dofus {
                    DofusOption::All => false,
                    DofusOption::None => is_dofus,
                    DofusOption::LightSet => {
                        is_dofus && item.has_condition(ItemCondition::LIGHT_SET)
                    }
                    DofusOption::Cawwot => is_dofus && item.name != CAWWOT_DOFUS,
                }
                || (item.slot == SlotType::Pet
                    && excluded_mounts.iter().any(|mount| item.name.contains(mount)));

            let gelano_allowed = if item.name == GELANO_EXO {
                options.mp_exo == MpExo::Gelano
            } else if item.name == GELANO_PLAIN {
                options.mp_exo != MpExo::Gelano
            } else {
                true
            };

            let allowed = if excluded || !gelano_allowed { 0.0 } else { 1.0 };
            self.restrictions.set_rhs(
                &mut self.problem,
                RestrictionKind::Forbidden,
                &item.id.to_string(),
                allowed,
            )?;
        }
        Ok(())
    }

    pub(super) fn modify_stat_point_constraints(
        &mut self,
        class: CharacterClass,
        stat_points: i32,
    ) -> Result<()> {
        let catalog = Arc::clone(&self.catalog);
        for stat in catalog.main_stats() {
            for tier in 0..STAT_POINT_TIERS {
                let key = tier_key(&stat.key, tier);
                self.restrictions
                    .set_rhs(&mut self.problem, RestrictionKind::StatPointCap, &key, 0.0)?;
                if tier < STAT_POINT_TIER_SWITCHES {
                    self.restrictions
                        .set_rhs(&mut self.problem, RestrictionKind::StatPointFill, &key, 0.0)?;
                }
            }
        }

        for (stat_key, caps) in soft_caps(class) {
            if !catalog.stat_by_key(stat_key).is_some_and(|stat| stat.main) {
                debug!("Catalog has no main stat {}, skipping its point tiers", stat_key);
                continue;
            }
            for tier in 0..STAT_POINT_TIERS {
                let size = tier_size(caps, tier).map_or(UNCAPPED_TIER, |size| size as f64);
                let key = tier_key(stat_key, tier);
                self.restrictions
                    .set_rhs(&mut self.problem, RestrictionKind::StatPointCap, &key, size)?;
                if tier < STAT_POINT_TIER_SWITCHES {
                    self.restrictions
                        .set_rhs(&mut self.problem, RestrictionKind::StatPointFill, &key, -size)?;
                }
            }
        }

        self.restrictions.set_rhs(
            &mut self.problem,
            RestrictionKind::StatPointBudget,
            BUDGET_KEY,
            stat_points as f64,
        )?;
        Ok(())
    }
}
