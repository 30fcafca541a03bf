#![allow(dead_code)]

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use loadout_ilp::domain::solver::{RawSolution, SolveStatus, Solver, SolverError};
use loadout_ilp::domain::solvers::GlpkSolver;
use loadout_ilp::model::adjustments::ADJUSTMENTS;
use loadout_ilp::problem::LinearProgram;
use loadout_ilp::{
    parse_aspects, weights, BuildRequest, Catalog, CatalogData, CharacterClass, Model,
};
use serde_json::json;

pub const VITALITY: u32 = 1;
pub const STRENGTH: u32 = 3;
pub const AP: u32 = 7;
pub const MP: u32 = 8;

pub const GOBBALL_SET: u32 = 1;
pub const GOBBALL_HEADGEAR: u32 = 101;
pub const ROYAL_GOBBALL_HEADGEAR: u32 = 102;
pub const CROW_CLOAK: u32 = 202;
pub const GELANO_EXO: u32 = 901;
pub const GELANO_PLAIN: u32 = 902;
pub const RING_OF_STRENGTH: u32 = 903;
pub const CRIMSON_HAMMER: u32 = 602;
pub const ALMOND_DRAGOTURKEY: u32 = 802;
pub const CAWWOT_DOFUS: u32 = 1001;
pub const TROPHY_OF_STRENGTH: u32 = 1002;
pub const PRYSMARADITE_OF_POWER: u32 = 1003;
pub const PRYSMARADITE_OF_LIFE: u32 = 1004;

/// Ids of the adjustment-table items start here; they all require level 201.
const UNREACHABLE_ITEMS_START: u32 = 5000;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn stat(id: u32, name: &str, key: &str) -> serde_json::Value {
    json!({"id": id, "name": name, "key": key})
}

/// Small catalog: one Gobball set, a high-level alternative per slot and the
/// special items every option and condition rule needs.
pub fn catalog() -> Arc<Catalog> {
    let mut stats = vec![
        json!({"id": VITALITY, "name": "Vitality", "key": "vit", "main": true}),
        json!({"id": 2, "name": "Wisdom", "key": "wis", "main": true}),
        json!({"id": STRENGTH, "name": "Strength", "key": "str", "main": true}),
        json!({"id": 4, "name": "Intelligence", "key": "int", "main": true}),
        json!({"id": 5, "name": "Chance", "key": "cha", "main": true}),
        json!({"id": 6, "name": "Agility", "key": "agi", "main": true}),
        json!({"id": AP, "name": "AP", "key": "ap", "max": 12}),
        json!({"id": MP, "name": "MP", "key": "mp", "max": 6}),
        json!({"id": 9, "name": "Range", "key": "range", "max": 6}),
    ];
    stats.extend([
        stat(10, "Summon", "summon"),
        stat(11, "HP", "hp"),
        stat(12, "Dodge", "dodge"),
        stat(13, "Lock", "lock"),
        stat(14, "Initiative", "init"),
        stat(15, "Prospecting", "pp"),
        stat(16, "Pods", "pod"),
        stat(17, "AP Reduction", "apred"),
        stat(18, "MP Reduction", "mpred"),
        stat(19, "AP Parry", "apres"),
        stat(20, "MP Parry", "mpres"),
        stat(21, "Damage", "dam"),
        stat(22, "Earth Damage", "earthdam"),
        stat(23, "Power", "pow"),
        stat(24, "Critical Hits", "ch"),
        stat(25, "Neutral Resist", "neutres"),
    ]);

    let mut items = vec![
        json!({"id": GOBBALL_HEADGEAR, "name": "Gobball Headgear", "slot": "Hat", "level": 1, "set": GOBBALL_SET,
               "stats": [{"stat": VITALITY, "value": 20}, {"stat": STRENGTH, "value": 10}]}),
        json!({"id": ROYAL_GOBBALL_HEADGEAR, "name": "Royal Gobball Headgear", "slot": "Hat", "level": 150,
               "stats": [{"stat": STRENGTH, "value": 50}, {"stat": VITALITY, "value": 30}, {"stat": AP, "value": 1}]}),
        json!({"id": 201, "name": "Gobball Cape", "slot": "Cloak", "level": 1, "set": GOBBALL_SET,
               "stats": [{"stat": VITALITY, "value": 20}, {"stat": STRENGTH, "value": 10}]}),
        json!({"id": CROW_CLOAK, "name": "Crow Cloak", "slot": "Cloak", "level": 180,
               "stats": [{"stat": STRENGTH, "value": 60}, {"stat": AP, "value": 1}],
               "min_conditions": [{"stat": STRENGTH, "threshold": 100}]}),
        json!({"id": 301, "name": "Gobball Amulet", "slot": "Amulet", "level": 1, "set": GOBBALL_SET,
               "stats": [{"stat": VITALITY, "value": 20}, {"stat": STRENGTH, "value": 10}]}),
        json!({"id": 302, "name": "Gargandyas Necklace", "slot": "Amulet", "level": 190,
               "stats": [{"stat": STRENGTH, "value": 40}, {"stat": VITALITY, "value": 40}, {"stat": AP, "value": 1}]}),
        json!({"id": 401, "name": "Gobball Belt", "slot": "Belt", "level": 1, "set": GOBBALL_SET,
               "stats": [{"stat": VITALITY, "value": 20}, {"stat": STRENGTH, "value": 10}]}),
        json!({"id": 402, "name": "Kralamoure Belt", "slot": "Belt", "level": 160,
               "stats": [{"stat": STRENGTH, "value": 40}, {"stat": MP, "value": 1}]}),
        json!({"id": 501, "name": "Gobball Boots", "slot": "Boots", "level": 1, "set": GOBBALL_SET,
               "stats": [{"stat": VITALITY, "value": 20}, {"stat": STRENGTH, "value": 10}]}),
        json!({"id": 502, "name": "Pandawushu Sandals", "slot": "Boots", "level": 170,
               "stats": [{"stat": STRENGTH, "value": 40}, {"stat": MP, "value": 1}]}),
        json!({"id": 601, "name": "Gobball Hammer", "slot": "Weapon", "level": 1,
               "stats": [{"stat": STRENGTH, "value": 20}]}),
        json!({"id": CRIMSON_HAMMER, "name": "Crimson Hammer", "slot": "Weapon", "level": 190,
               "stats": [{"stat": STRENGTH, "value": 60}, {"stat": 22, "value": 10}, {"stat": AP, "value": 1}]}),
        json!({"id": 701, "name": "Ancient Shield", "slot": "Shield", "level": 100,
               "stats": [{"stat": VITALITY, "value": 50}, {"stat": 25, "value": 20}]}),
        json!({"id": 801, "name": "Bow Meow", "slot": "Pet", "level": 1,
               "stats": [{"stat": STRENGTH, "value": 30}]}),
        json!({"id": ALMOND_DRAGOTURKEY, "name": "Almond Dragoturkey", "slot": "Pet", "level": 60,
               "stats": [{"stat": STRENGTH, "value": 40}, {"stat": VITALITY, "value": 100}]}),
        json!({"id": GELANO_EXO, "name": "Gelano (#1)", "slot": "Ring", "level": 60,
               "stats": [{"stat": MP, "value": 1}, {"stat": STRENGTH, "value": 10}]}),
        json!({"id": GELANO_PLAIN, "name": "Gelano (#2)", "slot": "Ring", "level": 60,
               "stats": [{"stat": MP, "value": 1}, {"stat": STRENGTH, "value": 10}]}),
        json!({"id": RING_OF_STRENGTH, "name": "Ring of Strength", "slot": "Ring", "level": 1,
               "stats": [{"stat": STRENGTH, "value": 15}]}),
        json!({"id": CAWWOT_DOFUS, "name": "Cawwot Dofus", "slot": "Dofus", "level": 1,
               "stats": [{"stat": VITALITY, "value": 100}]}),
        json!({"id": TROPHY_OF_STRENGTH, "name": "Major Trophy of Strength", "slot": "Dofus", "level": 100,
               "stats": [{"stat": STRENGTH, "value": 80}], "conditions": ["light_set"]}),
        json!({"id": PRYSMARADITE_OF_POWER, "name": "Prysmaradite of Power", "slot": "Dofus", "level": 150,
               "stats": [{"stat": 23, "value": 40}], "conditions": ["prysmaradite"]}),
        json!({"id": PRYSMARADITE_OF_LIFE, "name": "Prysmaradite of Life", "slot": "Dofus", "level": 150,
               "stats": [{"stat": VITALITY, "value": 150}], "conditions": ["prysmaradite"]}),
        json!({"id": 1006, "name": "Ochre Dofus", "slot": "Dofus", "level": 160,
               "stats": [{"stat": AP, "value": 1}]}),
        json!({"id": 1007, "name": "Old Gobball Ring", "slot": "Ring", "level": 1, "removed": true,
               "stats": [{"stat": STRENGTH, "value": 500}]}),
    ];

    let listed: BTreeSet<String> = items
        .iter()
        .filter_map(|item| item["name"].as_str().map(str::to_string))
        .collect();
    let unreachable = ADJUSTMENTS
        .iter()
        .filter(|adjustment| !listed.contains(adjustment.item))
        .enumerate()
        .map(|(i, adjustment)| {
            json!({"id": UNREACHABLE_ITEMS_START + i as u32, "name": adjustment.item, "slot": "Dofus", "level": 201})
        })
        .collect::<Vec<_>>();
    items.extend(unreachable);

    let data: CatalogData = serde_json::from_value(json!({
        "items": items,
        "sets": [{
            "id": GOBBALL_SET,
            "name": "Gobball Set",
            "items": [GOBBALL_HEADGEAR, 201, 301, 401, 501],
            "bonuses": [
                {"pieces": 2, "stat": VITALITY, "value": 20},
                {"pieces": 3, "stat": STRENGTH, "value": 20},
                {"pieces": 4, "stat": AP, "value": 1},
                {"pieces": 5, "stat": AP, "value": 1},
                {"pieces": 5, "stat": MP, "value": 1},
                {"pieces": 5, "stat": STRENGTH, "value": 40}
            ]
        }],
        "stats": stats,
        "alias_groups": [{"name": "Gelano", "items": [GELANO_EXO, GELANO_PLAIN]}],
        "advanced_minimums": [{"key": "res", "name": "Resistances", "stats": ["Neutral Resist"]}]
    }))
    .unwrap();
    Arc::new(Catalog::new(data))
}

pub fn glpk_model() -> Model {
    Model::new(catalog(), Box::new(GlpkSolver::new())).unwrap()
}

/// Level 200 Iop with the game's base AP/MP and every stat point to spend.
pub fn base_request(class: CharacterClass, level: u32) -> BuildRequest {
    let mut request = BuildRequest::new(class, level);
    request.base_stats_by_attr.insert("AP".to_string(), if level >= 100 { 7 } else { 6 });
    request.base_stats_by_attr.insert("MP".to_string(), 3);
    request.base_stats_by_attr.insert("Summon".to_string(), 1);
    request.stat_points_to_distribute = 5 * (level as i32 - 1);
    request
}

/// [`base_request`] with weights and floors derived from `aspects`.
pub fn weighted_request(class: CharacterClass, level: u32, aspects: &[&str]) -> BuildRequest {
    let mut request = base_request(class, level);
    let aspects = parse_aspects(aspects.iter().copied()).unwrap();
    weights(class, level, &aspects).unwrap().apply(&mut request);
    request
}

/// Fails a fixed number of times, then delegates; counts every call.
pub struct FlakySolver {
    failures_left: AtomicU32,
    calls: Arc<AtomicUsize>,
    inner: Box<dyn Solver>,
}

impl FlakySolver {
    pub fn new(failures: u32, calls: Arc<AtomicUsize>, inner: Box<dyn Solver>) -> Self {
        FlakySolver {
            failures_left: AtomicU32::new(failures),
            calls,
            inner,
        }
    }
}

impl Solver for FlakySolver {
    fn solve(&self, program: &LinearProgram, time_limit: Duration) -> Result<RawSolution, SolverError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let failing = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(SolverError::ExecutionFailed("scripted failure".to_string()));
        }
        self.inner.solve(program, time_limit)
    }

    fn name(&self) -> &str {
        "Flaky"
    }
}

/// Reports every variable at zero without solving anything.
pub struct ZeroSolver;

impl Solver for ZeroSolver {
    fn solve(&self, program: &LinearProgram, _time_limit: Duration) -> Result<RawSolution, SolverError> {
        std::thread::sleep(Duration::from_millis(10));
        Ok(RawSolution {
            status: SolveStatus::Optimal,
            values: vec![0.0; program.variables.len()],
        })
    }

    fn name(&self) -> &str {
        "Zero"
    }
}
