use std::ops::Bound;
use std::time::Duration;

use crate::domain::solver::{RawSolution, SolveStatus, Solver, SolverError};
use crate::problem::{LinearProgram, Sense as RowSense};

use ::highs::{ColProblem, HighsModelStatus, Sense};

/// HiGHS solver implementation
pub struct HighsSolver;

impl HighsSolver {
    pub fn new() -> Self {
        HighsSolver
    }

    fn convert_status(model_status: HighsModelStatus) -> SolveStatus {
        match model_status {
            HighsModelStatus::Optimal => SolveStatus::Optimal,
            HighsModelStatus::ReachedTimeLimit => SolveStatus::Feasible,
            HighsModelStatus::Infeasible => SolveStatus::Infeasible,
            HighsModelStatus::UnboundedOrInfeasible => SolveStatus::Unbounded,
            HighsModelStatus::Unbounded => SolveStatus::Unbounded,
            _ => SolveStatus::Undefined,
        }
    }

    fn column_bounds(lower: Option<i32>, upper: Option<i32>) -> (Bound<f64>, Bound<f64>) {
        (
            lower.map_or(Bound::Unbounded, |v| Bound::Included(v as f64)),
            upper.map_or(Bound::Unbounded, |v| Bound::Included(v as f64)),
        )
    }
}

impl Default for HighsSolver {
    fn default() -> Self {
        HighsSolver::new()
    }
}

impl Solver for HighsSolver {
    fn solve(&self, program: &LinearProgram, time_limit: Duration) -> Result<RawSolution, SolverError> {
        let mut problem = ColProblem::new();

        let rows: Vec<_> = program
            .rows
            .iter()
            .map(|row| match row.sense {
                RowSense::LessOrEqual => problem.add_row(..=row.rhs),
                RowSense::Equal => problem.add_row(row.rhs..=row.rhs),
            })
            .collect();

        // HiGHS takes the matrix column by column.
        let mut col_data: Vec<Vec<(usize, f64)>> = vec![Vec::new(); program.variables.len()];
        for (row_idx, row) in program.rows.iter().enumerate() {
            for (col, val) in &row.terms {
                col_data[*col].push((row_idx, *val));
            }
        }

        for (col_idx, var) in program.variables.iter().enumerate() {
            let row_factors: Vec<_> = col_data[col_idx]
                .iter()
                .map(|(row_idx, val)| (rows[*row_idx], *val))
                .collect();
            problem.add_integer_column(
                program.objective[col_idx],
                Self::column_bounds(var.lower, var.upper),
                &row_factors,
            );
        }

        let mut model = problem.optimise(Sense::Maximise);
        model.set_option("output_flag", false);
        model.set_option("time_limit", time_limit.as_secs_f64());
        let solved = model.solve();

        let status = Self::convert_status(solved.status());
        if status == SolveStatus::Undefined {
            return Err(SolverError::ExecutionFailed(format!(
                "HiGHS finished with {:?}",
                solved.status()
            )));
        }
        if !matches!(status, SolveStatus::Optimal | SolveStatus::Feasible) {
            return Ok(RawSolution::without_values(status));
        }

        let values = solved.get_solution().columns().to_vec();
        Ok(RawSolution { status, values })
    }

    fn name(&self) -> &str {
        "HiGHS"
    }
}
