//! The loadout optimization model.
//!
//! A [`Model`] declares every variable and structural constraint once, from
//! the catalog. Each request then goes through [`Model::setup`], which only
//! rewrites right-hand sides and the objective, followed by [`Model::run`]
//! and [`Model::extract`].

pub mod adjustments;
mod constraints;
pub mod request;
pub mod result;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use thiserror::Error;

use crate::catalog::Catalog;
use crate::constants::{MELEENESS_KEY, PERTURBATION_DELTA, PERTURBATION_KEY};
use crate::domain::solver::Solver;
use crate::error::Result;
use crate::problem::{Problem, ProblemStatus, Restrictions};

use adjustments::{ResolvedAdjustment, Weights};
use request::BuildRequest;
use result::BuildResult;

pub const COUNT: &str = "x";
pub const PRESENCE: &str = "p";
pub const SET_TIER: &str = "s";
pub const SET_INDICATOR: &str = "ss";
pub const STAT: &str = "stat";
pub const STAT_POINT: &str = "stat_point";
pub const STAT_POINT_FULL: &str = "stat_point_max";
pub const TROPHY_RULE: &str = "ytrophy";
pub const TROPHIES: &str = "trophies";
pub const PRYSMARADITE: &str = "prysmaradite";

pub const DEFAULT_TIME_LIMIT: Duration = Duration::from_secs(90);

/// Where a model is in its request cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelState {
    /// Variables and constraints exist; no request applied yet.
    Structural,
    Parameterized,
    Solved,
    Extracted,
}

impl fmt::Display for ModelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ModelState::Structural => "structural",
            ModelState::Parameterized => "parameterized",
            ModelState::Solved => "solved",
            ModelState::Extracted => "extracted",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("cannot {operation} a model in the {state} state")]
    InvalidState {
        operation: &'static str,
        state: ModelState,
    },

    #[error("a model pool needs at least one model")]
    EmptyPool,
}

pub struct Model {
    catalog: Arc<Catalog>,
    solver: Box<dyn Solver>,
    time_limit: Duration,
    problem: Problem,
    restrictions: Restrictions,
    adjustments: Vec<ResolvedAdjustment>,
    state: ModelState,
    objective_values: Weights,
    char_level: u32,
}

impl Model {
    /// Build the full formulation for `catalog`.
    ///
    /// Fails if an item priced by the adjustment table is missing from the
    /// catalog.
    pub fn new(catalog: Arc<Catalog>, solver: Box<dyn Solver>) -> Result<Self> {
        let adjustments = adjustments::resolve(&catalog)?;
        let mut model = Model {
            catalog,
            solver,
            time_limit: DEFAULT_TIME_LIMIT,
            problem: Problem::new(),
            restrictions: Restrictions::new(),
            adjustments,
            state: ModelState::Structural,
            objective_values: Weights::new(),
            char_level: 0,
        };
        model.create_variables()?;
        model.create_constraints()?;
        info!(
            "Built model with {} variables and {} constraints using {}",
            model.problem.variable_count(),
            model.problem.constraint_count(),
            model.solver.name()
        );
        Ok(model)
    }

    pub fn with_time_limit(mut self, time_limit: Duration) -> Self {
        self.time_limit = time_limit;
        self
    }

    pub fn state(&self) -> ModelState {
        self.state
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn problem(&self) -> &Problem {
        &self.problem
    }

    /// Apply a request: right-hand sides and objective only.
    pub fn setup(&mut self, request: &BuildRequest) -> Result<()> {
        debug!(
            "Setting up {} level {} request",
            request.char_class, request.char_level
        );
        self.modify_level_constraints(request.char_level)?;
        self.modify_stat_total_constraints(&request.base_stats_by_attr, &request.options)?;
        self.modify_minimum_stat_constraints(&request.minimum_stats, request.char_level)?;
        self.modify_locked_equip_constraints(&request.locked_item_counts())?;
        self.modify_forbidden_items_constraints(&request.forbidden_equips, &request.options)?;
        self.modify_stat_point_constraints(request.char_class, request.stat_points_to_distribute)?;

        self.objective_values = request.objective_values.clone();
        self.char_level = request.char_level;
        self.write_objective_function(&request.objective_values, request.char_level);

        self.state = ModelState::Parameterized;
        Ok(())
    }

    /// Objective: weighted stat totals plus the per-item adjustments.
    pub fn write_objective_function(&mut self, weights: &Weights, level: u32) {
        self.problem.init_objective();

        for (key, value) in weights {
            if key == MELEENESS_KEY {
                continue;
            }
            match self.catalog.stat_by_key(key) {
                Some(stat) => self.problem.accumulate_objective(STAT, stat.id, *value),
                None => warn!("Could not find stat {}", key),
            }
        }

        let level = level as f64;
        for adjustment in &self.adjustments {
            self.problem
                .accumulate_objective(PRESENCE, adjustment.item, (adjustment.weight)(weights, level));
        }

        self.problem.finish_objective();
    }

    /// Solve, retrying solver failures up to `retries` times with a nudged
    /// objective. Infeasibility is returned, never retried.
    pub fn run(&mut self, retries: u32) -> Result<ProblemStatus> {
        if !matches!(self.state, ModelState::Parameterized | ModelState::Solved) {
            return Err(ModelError::InvalidState {
                operation: "run",
                state: self.state,
            }
            .into());
        }

        let mut remaining = retries;
        loop {
            match self.problem.solve(self.solver.as_ref(), self.time_limit) {
                Ok(status) => {
                    info!("{} finished with {:?}", self.solver.name(), status);
                    self.state = ModelState::Solved;
                    return Ok(status);
                }
                Err(error) if remaining > 0 => {
                    remaining -= 1;
                    warn!(
                        "{} failed ({}); retrying with perturbed objective, {} retries left",
                        self.solver.name(),
                        error,
                        remaining
                    );
                    self.perturb_objective();
                }
                Err(error) => return Err(error.into()),
            }
        }
    }

    fn perturb_objective(&mut self) {
        *self
            .objective_values
            .entry(PERTURBATION_KEY.to_string())
            .or_insert(0.0) += PERTURBATION_DELTA;
        let weights = self.objective_values.clone();
        self.write_objective_function(&weights, self.char_level);
    }

    /// Decode the last solve into a model-independent result.
    pub fn extract(&mut self) -> Result<BuildResult> {
        if !matches!(self.state, ModelState::Solved | ModelState::Extracted) {
            return Err(ModelError::InvalidState {
                operation: "extract",
                state: self.state,
            }
            .into());
        }
        let result = match (self.problem.status(), self.problem.read_assignment()) {
            (ProblemStatus::Optimal, Some(assignment)) => {
                BuildResult::from_assignment(assignment, &self.catalog)
            }
            _ => BuildResult::infeasible(),
        };
        self.state = ModelState::Extracted;
        Ok(result)
    }

    /// One full request cycle.
    pub fn optimize(&mut self, request: &BuildRequest, retries: u32) -> Result<BuildResult> {
        self.setup(request)?;
        self.run(retries)?;
        self.extract()
    }
}
