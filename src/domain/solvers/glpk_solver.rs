use std::time::Duration;

use log::{debug, warn};

use crate::convert::{from_glpk_solution, to_glpk_objective, to_glpk_polyhedron};
use crate::domain::solver::{RawSolution, SolveStatus, Solver, SolverError};
use crate::problem::LinearProgram;

use glpk_rust::{solve_ilps as glpk_solve_ilps, Solution};

const NO_TERMINAL_OUTPUT: bool = false;
const MAXIMIZE: bool = true;

/// GLPK solver implementation
pub struct GlpkSolver;

impl GlpkSolver {
    pub fn new() -> Self {
        GlpkSolver
    }
}

impl Default for GlpkSolver {
    fn default() -> Self {
        GlpkSolver::new()
    }
}

impl Solver for GlpkSolver {
    fn solve(&self, program: &LinearProgram, time_limit: Duration) -> Result<RawSolution, SolverError> {
        // glpk-rust exposes no time limit.
        debug!(
            "GLPK solving {} columns / {} rows, ignoring time limit of {:?}",
            program.variables.len(),
            program.rows.len(),
            time_limit
        );

        let mut polyhedron = to_glpk_polyhedron(program);
        let objective = to_glpk_objective(program);

        let mut solutions: Vec<Solution> = glpk_solve_ilps(
            &mut polyhedron,
            vec![objective],
            MAXIMIZE,
            NO_TERMINAL_OUTPUT,
        );

        let solution = solutions
            .pop()
            .ok_or_else(|| SolverError::ExecutionFailed("GLPK returned no solution".to_string()))?;

        let error = solution.error.clone();
        let raw = from_glpk_solution(solution, program);
        if raw.status == SolveStatus::Undefined {
            let details = error.unwrap_or_else(|| "undefined status".to_string());
            warn!("GLPK failed: {}", details);
            return Err(SolverError::ExecutionFailed(details));
        }
        Ok(raw)
    }

    fn name(&self) -> &str {
        "GLPK"
    }
}
