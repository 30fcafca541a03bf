use thiserror::Error;

use crate::catalog::CatalogError;
use crate::domain::solver::SolverError;
use crate::domain::validate::ValidationError;
use crate::model::ModelError;
use crate::problem::ProblemError;
use crate::weights::WeightsError;

/// Result type for optimizer operations
pub type Result<T> = std::result::Result<T, OptimizerError>;

/// Errors that can surface from building or running an optimizer model
#[derive(Error, Debug)]
pub enum OptimizerError {
    /// Catalog lookups failed or the catalog does not match the model's tables
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// The generic constraint registry was misused
    #[error("Problem error: {0}")]
    Problem(#[from] ProblemError),

    /// The external solver failed and retries were exhausted
    #[error("Solver error: {0}")]
    Solver(#[from] SolverError),

    /// The model was driven out of order
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    /// The build request was rejected before reaching the model
    #[error("Invalid request: {0}")]
    InvalidRequest(#[from] ValidationError),

    /// Weight derivation failed
    #[error("Weights error: {0}")]
    Weights(#[from] WeightsError),
}
