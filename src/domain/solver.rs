use std::time::Duration;

use thiserror::Error;

use crate::problem::LinearProgram;

/// Outcome reported by a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    Optimal,
    /// A feasible but not proven optimal point, e.g. after hitting the time limit.
    Feasible,
    Infeasible,
    Unbounded,
    Undefined,
}

/// Column values in declaration order plus the backend's status.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSolution {
    pub status: SolveStatus,
    pub values: Vec<f64>,
}

impl RawSolution {
    pub fn without_values(status: SolveStatus) -> Self {
        RawSolution {
            status,
            values: Vec::new(),
        }
    }
}

#[derive(Error, Debug)]
pub enum SolverError {
    #[error("solver backend unavailable: {0}")]
    Unavailable(String),

    #[error("solver execution failed: {0}")]
    ExecutionFailed(String),

    #[error("solver returned no usable solution ({0:?})")]
    NoSolution(SolveStatus),

    #[error("could not exchange files with the solver: {0}")]
    Io(#[from] std::io::Error),
}

/// Common interface for ILP backends
pub trait Solver: Send + Sync {
    /// Maximize `program.objective` subject to the program's rows and bounds.
    ///
    /// Infeasibility is reported through [`RawSolution::status`]; `Err` is
    /// reserved for backend failures the caller may retry.
    fn solve(&self, program: &LinearProgram, time_limit: Duration) -> Result<RawSolution, SolverError>;

    /// Get the solver name for logging/debugging
    fn name(&self) -> &str;
}
