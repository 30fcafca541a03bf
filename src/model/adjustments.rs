//! Objective terms for items whose effect is not a plain stat line.
//!
//! Each entry prices an item's special effect in terms of other objective
//! weights and the character level. The formulas are game-design content and
//! are kept exactly as authored, including the ones that look inconsistent
//! between similar items.

use std::collections::BTreeMap;

use crate::catalog::{Catalog, CatalogError, ItemId};

pub type Weights = BTreeMap<String, f64>;

pub type AdjustmentFn = fn(&Weights, f64) -> f64;

/// Item name and the presence weight it receives.
pub struct Adjustment {
    pub item: &'static str,
    pub weight: AdjustmentFn,
}

fn w(weights: &Weights, key: &str) -> f64 {
    weights.get(key).copied().unwrap_or(0.0)
}

/// Melee plus ranged percent damage, each scaled by `factor`.
fn final_damage(weights: &Weights, factor: f64) -> f64 {
    w(weights, "permedam") * factor + w(weights, "perrandam") * factor
}

/// Melee plus ranged percent resistance, each scaled by `factor`.
fn final_resistance(weights: &Weights, factor: f64) -> f64 {
    w(weights, "respermee") * factor + w(weights, "resperran") * factor
}

/// Shield spread over the first turns of a fight.
fn prytekt(weights: &Weights, level: f64, first: f64, second: f64, third: f64) -> f64 {
    w(weights, "hp") * ((0.7 * first + 0.85 * second + third) / 4.0) * level / 200.0
}

const RYKKE_DISTANCE_ATTACKS: f64 = 3.0;
const JAHASH_RESISTS: f64 = 1.5;
const ELEMENT_RESISTANCES: [&str; 5] = [
    "neutresper",
    "airresper",
    "earthresper",
    "fireresper",
    "waterresper",
];
const ELEMENT_DAMAGES: [&str; 5] = ["neutdam", "earthdam", "firedam", "airdam", "waterdam"];
/// Expected health of a level 200 character.
const REFERENCE_HP: f64 = 4500.0;

pub static ADJUSTMENTS: &[Adjustment] = &[
    Adjustment {
        item: "Crimson Dofus",
        weight: |w, _| final_damage(w, 5.0),
    },
    Adjustment {
        item: "Emerald Dofus",
        weight: |wt, level| w(wt, "hp") * 0.5 * level,
    },
    Adjustment {
        item: "Turquoise Dofus",
        weight: |wt, _| w(wt, "ch") * 5.0,
    },
    Adjustment {
        item: "Dofusteuse",
        weight: |wt, _| {
            w(wt, "agi") * 75.0 + w(wt, "cha") * 75.0 + w(wt, "int") * 75.0 + w(wt, "str") * 75.0
        },
    },
    Adjustment {
        item: "Cawwot Dofus",
        weight: |wt, _| w(wt, "apres") * 12.5 + w(wt, "mpres") * 12.5,
    },
    Adjustment {
        item: "Vulbis Dofus",
        weight: |wt, _| final_damage(wt, 5.0) + w(wt, "lock") * 10.0,
    },
    Adjustment {
        item: "Black-Spotted Dofus",
        weight: |wt, level| w(wt, "dam") * 10.0 + w(wt, "hp") * 150.0 * level / 200.0 / 2.0,
    },
    Adjustment {
        item: "Ebony Dofus",
        weight: |wt, level| w(wt, "pow") * 60.0 * level / 200.0,
    },
    Adjustment {
        item: "Ivory Dofus",
        weight: |w, _| final_resistance(w, 10.0),
    },
    Adjustment {
        item: "Ochre Dofus",
        weight: |wt, _| w(wt, "ap") * 0.2 + w(wt, "dodge") * 16.0,
    },
    Adjustment {
        item: "Cloudy Dofus",
        weight: |w, _| final_damage(w, 15.0),
    },
    Adjustment {
        item: "Watchers Dofus",
        weight: |wt, level| (w(wt, "heals") * 10.0 + 2500.0) * level / 200.0,
    },
    Adjustment {
        item: "Dokoko",
        weight: |wt, level| w(wt, "hp") * (REFERENCE_HP * 10.0 / 100.0) * (1.0 / 3.0) * level / 200.0,
    },
    Adjustment {
        item: "Abyssal Dofus",
        weight: |wt, _| w(wt, "ap") * 0.5 + w(wt, "mp") * 0.5,
    },
    Adjustment {
        item: "Lavasmith Dofus",
        weight: |wt, level| w(wt, "hp") * 100.0 * level / 200.0,
    },
    Adjustment {
        item: "Silver Dofus",
        weight: |wt, level| w(wt, "hp") * (REFERENCE_HP * 20.0 / 100.0) * 0.2 * level / 200.0,
    },
    Adjustment {
        item: "Sparkling Silver Dofus",
        weight: |wt, level| {
            w(wt, "hp") * (REFERENCE_HP * 30.0 / 100.0) * 0.2 * level / 200.0
                + w(wt, "respermee") * 20.0 * 0.2
                + w(wt, "resperran") * 20.0 * 0.2
        },
    },
    Adjustment {
        item: "Crocobur 3",
        weight: |wt, level| w(wt, "hp") * level / 2.0 + w(wt, "perrandam") * level / 200.0,
    },
    Adjustment {
        item: "Buhorado Feather",
        weight: |wt, _| w(wt, "pshdam") * 10.0 * w(wt, "ch") / 100.0,
    },
    Adjustment {
        item: "Fallanster's Rectitude",
        weight: |w, _| final_resistance(w, 8.0),
    },
    Adjustment {
        item: "Death-Defying",
        weight: |w, _| final_resistance(w, 2.5),
    },
    Adjustment {
        item: "Bram Worldbeard's Crown",
        weight: |wt, _| w(wt, "perweadam") * 7.5,
    },
    Adjustment {
        item: "Ganymede's Diadem 1",
        weight: |wt, _| w(wt, "ap"),
    },
    Adjustment {
        item: "Ganymede's Diadem 2",
        weight: |wt, _| w(wt, "ap"),
    },
    Adjustment {
        item: "Rykke Errel's Bravery",
        weight: |wt, _| {
            w(wt, "hp") * 200.0 * RYKKE_DISTANCE_ATTACKS
                - w(wt, "perrandam") * 5.0 * RYKKE_DISTANCE_ATTACKS
        },
    },
    Adjustment {
        item: "Jahash Jurgen's Nobility",
        weight: |wt, _| {
            ELEMENT_RESISTANCES
                .iter()
                .map(|key| w(wt, key) * JAHASH_RESISTS)
                .sum()
        },
    },
    Adjustment {
        item: "Thousand-League Boots",
        weight: |wt, _| w(wt, "mp"),
    },
    Adjustment {
        item: "Kicked Ass Boots",
        weight: |wt, _| w(wt, "dodge") * 30.0 + w(wt, "pshdam") * 50.0,
    },
    Adjustment {
        item: "Dodge's Audacity",
        weight: |wt, _| w(wt, "dodge") * 50.0 + w(wt, "ch") * 5.0 + w(wt, "pshdam") * 40.0,
    },
    Adjustment {
        item: "Lady Jhessica's Courage",
        weight: |wt, _| w(wt, "lock") * 50.0,
    },
    Adjustment {
        item: "Cocoa Dofus 2",
        weight: |wt, level| w(wt, "hp") * 50.0 * level / 200.0,
    },
    Adjustment {
        item: "Prytekt",
        weight: |w, level| prytekt(w, level, 550.0, 200.0, 100.0),
    },
    Adjustment {
        item: "Shiny Prytekt",
        weight: |w, level| prytekt(w, level, 150.0, 450.0, 150.0),
    },
    Adjustment {
        item: "Iridescent Prytekt",
        weight: |w, level| prytekt(w, level, 100.0, 200.0, 350.0),
    },
    Adjustment {
        item: "Pryssure",
        weight: |wt, _| w(wt, "ap") * 0.75 - final_damage(wt, 7.5),
    },
    Adjustment {
        item: "Shiny Pryssure",
        weight: |wt, _| w(wt, "ap") * 1.0 - final_damage(wt, 17.5),
    },
    Adjustment {
        item: "Iridescent Pryssure",
        weight: |wt, _| w(wt, "ap") * 1.0 - final_damage(wt, 12.5),
    },
    Adjustment {
        item: "Surpryz",
        weight: |wt, _| w(wt, "ch") * 11.25,
    },
    Adjustment {
        item: "Shiny Surpryz",
        weight: |wt, _| w(wt, "ch") * 17.5,
    },
    Adjustment {
        item: "Iridescent Surpryz",
        weight: |wt, _| w(wt, "ch") * 25.0,
    },
    Adjustment {
        item: "Pryndsight",
        weight: |wt, _| w(wt, "pow") * 100.0,
    },
    Adjustment {
        item: "Shiny Pryndsight",
        weight: |wt, _| w(wt, "pow") * 100.0,
    },
    Adjustment {
        item: "Iridescent Pryndsight",
        weight: |wt, _| w(wt, "pow") * 100.0,
    },
    Adjustment {
        item: "Prycapture",
        weight: |wt, _| w(wt, "mp") * 0.5,
    },
    Adjustment {
        item: "Shiny Prycapture",
        weight: |wt, _| w(wt, "mp") * 0.5 - w(wt, "ap") * 0.5,
    },
    Adjustment {
        item: "Iridescent Prycapture",
        weight: |wt, _| w(wt, "mp") * 0.5 - w(wt, "ap") * 1.0,
    },
    Adjustment {
        item: "Prygenerate",
        weight: |wt, level| w(wt, "hp") * 0.15 * 3.0 * level,
    },
    Adjustment {
        item: "Shiny Prygenerate",
        weight: |wt, level| w(wt, "hp") * 0.3 * 1.5 * level,
    },
    Adjustment {
        item: "Iridescent Prygenerate",
        weight: |wt, level| w(wt, "hp") * 1.0 * 0.5 * level,
    },
    Adjustment {
        item: "Prysipitate",
        weight: |wt, _| w(wt, "ap") * 0.5,
    },
    Adjustment {
        item: "Shiny Prysipitate",
        weight: |wt, _| w(wt, "ap") * 0.75 - w(wt, "mp") * 0.5,
    },
    Adjustment {
        item: "Iridescent Prysipitate",
        weight: |wt, _| w(wt, "ap") * 1.0 - w(wt, "mp") * 1.0,
    },
    Adjustment {
        item: "Spryritual",
        weight: |wt, _| w(wt, "apres") * 100.0,
    },
    Adjustment {
        item: "Prysical",
        weight: |wt, _| w(wt, "mpres") * 100.0,
    },
    Adjustment {
        item: "Pryank",
        weight: |w, _| final_resistance(w, 7.5),
    },
    Adjustment {
        item: "Shiny Pryank",
        weight: |w, _| final_resistance(w, 7.5),
    },
    Adjustment {
        item: "Iridescent Pryank",
        weight: |w, _| final_resistance(w, 7.5),
    },
    Adjustment {
        item: "Disaprys",
        weight: |wt, level| w(wt, "hp") * 0.5 * level,
    },
    Adjustment {
        item: "Prywitchment",
        weight: |wt, level| w(wt, "hp") * 0.5 * level,
    },
    Adjustment {
        item: "Pryshield",
        weight: |wt, level| w(wt, "hp") * 2.0 * level * 1.5,
    },
    Adjustment {
        item: "Pryximity",
        weight: |wt, level| w(wt, "hp") * 2.0 * level * 2.0,
    },
    Adjustment {
        item: "Prymune",
        weight: |w, _| final_resistance(w, 10.0),
    },
    Adjustment {
        item: "Gravprysy",
        weight: |wt, _| w(wt, "dodge") * 50.0 + w(wt, "lock") * 50.0,
    },
    Adjustment {
        item: "War's Halbaxe",
        weight: |wt, _| w(wt, "mpres") * 10.0 + w(wt, "lock") * 15.0 + w(wt, "mp") * 0.25,
    },
    Adjustment {
        item: "Corruption Pestilence",
        weight: |w, _| final_damage(w, 2.0),
    },
    Adjustment {
        item: "Servitude's Embrace",
        weight: |wt, _| w(wt, "dodge") * 20.0 + w(wt, "lock") * 20.0,
    },
    Adjustment {
        item: "Misery's Flail-Scale",
        weight: |w, _| final_resistance(w, 4.0),
    },
    Adjustment {
        item: "Domakuro",
        weight: |wt, _| ELEMENT_DAMAGES.iter().map(|key| w(wt, key)).sum::<f64>() * 16.0,
    },
    Adjustment {
        item: "Dorigami",
        weight: |_, level| 20.0 * level * 1.25,
    },
    Adjustment {
        item: "Nightmare Dofus",
        weight: |wt, _| w(wt, "heals") * 10.0 + w(wt, "pow") * 50.0 + final_damage(wt, 5.0),
    },
    Adjustment {
        item: "Sylvan Dofus 2",
        weight: |wt, level| {
            w(wt, "pow") * 50.0 + w(wt, "hp") * (REFERENCE_HP * 10.0 / 100.0) * 0.2 * level / 200.0
        },
    },
];

/// An adjustment bound to the catalog item it prices.
#[derive(Clone, Copy)]
pub struct ResolvedAdjustment {
    pub item: ItemId,
    pub weight: AdjustmentFn,
}

/// Bind every table entry to its item; a missing name means the catalog and
/// the table disagree.
pub fn resolve(catalog: &Catalog) -> Result<Vec<ResolvedAdjustment>, CatalogError> {
    ADJUSTMENTS
        .iter()
        .map(|adjustment| {
            catalog
                .require_item_by_name(adjustment.item)
                .map(|item| ResolvedAdjustment {
                    item: item.id,
                    weight: adjustment.weight,
                })
        })
        .collect()
}
