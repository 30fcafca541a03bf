use log::warn;
use thiserror::Error;

use crate::catalog::Catalog;
use crate::constants::{MAX_CHAR_LEVEL, MELEENESS_KEY};
use crate::model::request::BuildRequest;

#[derive(Error, Debug, PartialEq, Eq)]
#[error("{details}")]
pub struct ValidationError {
    pub details: String,
}

impl ValidationError {
    fn new(details: String) -> Self {
        ValidationError { details }
    }
}

/// Reject requests the model cannot represent.
///
/// Names the model would skip (objective keys, minimum names, forbidden ids)
/// are only logged.
pub fn validate_request(request: &BuildRequest, catalog: &Catalog) -> Result<(), ValidationError> {
    if request.char_level == 0 || request.char_level > MAX_CHAR_LEVEL {
        return Err(ValidationError::new(format!(
            "Character level {} is outside 1..={}",
            request.char_level, MAX_CHAR_LEVEL,
        )));
    }

    if request.stat_points_to_distribute < 0 {
        return Err(ValidationError::new(format!(
            "Stat points to distribute must not be negative, got {}",
            request.stat_points_to_distribute,
        )));
    }

    for (slot, id) in &request.locked_equips {
        let Some(id) = id else { continue };
        match catalog.item(*id) {
            None => {
                return Err(ValidationError::new(format!(
                    "Locked equip {} refers to missing item {}",
                    slot, id,
                )))
            }
            Some(item) if item.removed => {
                return Err(ValidationError::new(format!(
                    "Locked equip {} refers to removed item {}",
                    slot, item.name,
                )))
            }
            Some(_) => {}
        }
    }

    for key in request.objective_values.keys() {
        if key != MELEENESS_KEY && catalog.stat_by_key(key).is_none() {
            warn!("Objective contains unknown stat key {}", key);
        }
    }
    for name in request.minimum_stats.stats.keys() {
        if catalog.stat_by_name(name).is_none() {
            warn!("Minimum for unknown stat {} is ignored", name);
        }
    }
    for name in request.minimum_stats.advanced.keys() {
        if !catalog.advanced_minimums().iter().any(|m| &m.name == name) {
            warn!("Unknown advanced minimum {} is ignored", name);
        }
    }
    for id in &request.forbidden_equips {
        if catalog.item(*id).is_none() {
            warn!("Forbidden item {} is not in the catalog", id);
        }
    }

    Ok(())
}
