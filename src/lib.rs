//! # Loadout ILP
//!
//! Equipment loadout optimizer: picks the items, set bonuses and stat point
//! allocation that maximize a weighted objective under the game's equip
//! rules, formulated as an integer linear program.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use loadout_ilp::{
//!     parse_aspects, Catalog, CharacterClass, BuildRequest, Optimizer, OptimizerConfig,
//! };
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let catalog = Arc::new(Catalog::from_path("catalog.json")?);
//!     let config = OptimizerConfig::from_env();
//!     let optimizer = Optimizer::new(catalog, &config)?;
//!
//!     let request = BuildRequest::new(CharacterClass::Iop, 200);
//!     let aspects = parse_aspects(["str", "dam"])?;
//!     let result = optimizer.optimize_with_aspects(request, &aspects)?;
//!     println!("{}", result.describe(optimizer.catalog()));
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod config;
pub mod constants;
pub mod convert;
pub mod domain;
pub mod error;
pub mod model;
pub mod pool;
pub mod problem;
pub mod weights;

pub use catalog::{Catalog, CatalogData, CatalogError, Item, ItemId, SlotType};
pub use config::OptimizerConfig;
pub use constants::CharacterClass;
pub use domain::solver::{Solver, SolverError};
pub use domain::solver_factory::{create_configured_solver, create_solver, SolverType};
pub use error::{OptimizerError, Result};
pub use model::request::{BuildOptions, BuildRequest, DofusOption, MinimumStats, MpExo};
pub use model::result::{BuildResult, BuildStatus, SetBonusTier};
pub use model::{Model, ModelState};
pub use pool::{ModelPool, Optimizer, ResultCache};
pub use weights::{parse_aspects, weights, Aspect, BuildWeights};
