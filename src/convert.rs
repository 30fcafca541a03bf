//! Conversion between [`LinearProgram`] and the integer-only GLPK polyhedron.

use std::collections::HashMap;

use log::warn;

use crate::domain::solver::{RawSolution, SolveStatus};
use crate::problem::{LinearProgram, Row, Sense};

use glpk_rust::{
    Bound, IntegerSparseMatrix as GlpkMatrix, Solution, SparseLEIntegerPolyhedron as GlpkPoly,
    Status as GlpkStatus, Variable as GlpkVar,
};

/// Stand-in for an open variable bound.
pub const UNBOUNDED: i32 = 1_000_000;

/// Row multipliers tried, in order, to make a row integral.
const ROW_SCALES: [f64; 8] = [1.0, 2.0, 4.0, 5.0, 10.0, 20.0, 100.0, 1000.0];
const INTEGRALITY_TOLERANCE: f64 = 1e-9;

fn is_integral(value: f64) -> bool {
    (value - value.round()).abs() < INTEGRALITY_TOLERANCE
}

/// Smallest multiplier that turns every coefficient and the rhs into an integer.
pub fn row_scale(row: &Row) -> f64 {
    ROW_SCALES
        .iter()
        .copied()
        .find(|scale| {
            is_integral(row.rhs * scale)
                && row
                    .terms
                    .iter()
                    .all(|(_, coefficient)| is_integral(coefficient * scale))
        })
        .unwrap_or_else(|| {
            warn!("Row with rhs {} cannot be scaled to integers exactly; rounding", row.rhs);
            ROW_SCALES[ROW_SCALES.len() - 1]
        })
}

struct LeMatrix {
    rows: Vec<i32>,
    cols: Vec<i32>,
    vals: Vec<i32>,
    b: Vec<i32>,
}

impl LeMatrix {
    fn push(&mut self, terms: &[(usize, f64)], rhs: f64, scale: f64, sign: f64) {
        let row = self.b.len() as i32;
        for (column, coefficient) in terms {
            self.rows.push(row);
            self.cols.push(*column as i32);
            self.vals.push((sign * coefficient * scale).round() as i32);
        }
        self.b.push((sign * rhs * scale).round() as i32);
    }
}

/// Build the GLPK polyhedron, borrowing variable names from `program`.
///
/// Equalities become a `<=` row and its negation.
pub fn to_glpk_polyhedron(program: &LinearProgram) -> GlpkPoly<'_> {
    let mut matrix = LeMatrix {
        rows: Vec::new(),
        cols: Vec::new(),
        vals: Vec::new(),
        b: Vec::new(),
    };

    for row in &program.rows {
        let scale = row_scale(row);
        matrix.push(&row.terms, row.rhs, scale, 1.0);
        if row.sense == Sense::Equal {
            matrix.push(&row.terms, row.rhs, scale, -1.0);
        }
    }

    let variables: Vec<GlpkVar<'_>> = program
        .variables
        .iter()
        .map(|v| GlpkVar {
            id: v.name.as_str(),
            bound: (v.lower.unwrap_or(-UNBOUNDED), v.upper.unwrap_or(UNBOUNDED)),
        })
        .collect();

    let b: Vec<Bound> = matrix.b.iter().map(|&v| (0, v)).collect();

    GlpkPoly {
        a: GlpkMatrix {
            rows: matrix.rows,
            cols: matrix.cols,
            vals: matrix.vals,
        },
        b,
        variables,
        double_bound: false,
    }
}

/// Objective keyed by variable name, zero coefficients omitted.
pub fn to_glpk_objective(program: &LinearProgram) -> HashMap<&str, f64> {
    program
        .variables
        .iter()
        .zip(program.objective.iter())
        .filter(|(_, coefficient)| **coefficient != 0.0)
        .map(|(variable, coefficient)| (variable.name.as_str(), *coefficient))
        .collect()
}

impl From<GlpkStatus> for SolveStatus {
    fn from(s: GlpkStatus) -> Self {
        match s {
            GlpkStatus::Optimal => SolveStatus::Optimal,
            GlpkStatus::Feasible => SolveStatus::Feasible,
            GlpkStatus::Infeasible | GlpkStatus::NoFeasible | GlpkStatus::EmptySpace => {
                SolveStatus::Infeasible
            }
            GlpkStatus::Unbounded => SolveStatus::Unbounded,
            GlpkStatus::Undefined | GlpkStatus::SimplexFailed | GlpkStatus::MIPFailed => {
                SolveStatus::Undefined
            }
        }
    }
}

/// Reorder GLPK's name-keyed values into column order.
pub fn from_glpk_solution(solution: Solution, program: &LinearProgram) -> RawSolution {
    let status: SolveStatus = solution.status.into();
    if !matches!(status, SolveStatus::Optimal | SolveStatus::Feasible) {
        return RawSolution::without_values(status);
    }
    let values = program
        .variables
        .iter()
        .map(|v| {
            solution
                .solution
                .get(v.name.as_str())
                .copied()
                .unwrap_or(0) as f64
        })
        .collect();
    RawSolution { status, values }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::Variable;

    fn program_with_rows(rows: Vec<Row>) -> LinearProgram {
        LinearProgram {
            variables: vec![
                Variable {
                    name: "x_1".to_string(),
                    lower: Some(0),
                    upper: None,
                },
                Variable {
                    name: "y_1".to_string(),
                    lower: None,
                    upper: Some(3),
                },
            ],
            rows,
            objective: vec![1.5, 0.0],
        }
    }

    #[test]
    fn test_row_scale_picks_smallest_integral_multiplier() {
        let row = Row {
            terms: vec![(0, 0.5), (1, 1.0)],
            sense: Sense::LessOrEqual,
            rhs: 3.0,
        };
        assert_eq!(row_scale(&row), 2.0);

        let row = Row {
            terms: vec![(0, 0.1)],
            sense: Sense::LessOrEqual,
            rhs: -10000.0,
        };
        assert_eq!(row_scale(&row), 10.0);
    }

    #[test]
    fn test_equality_rows_are_split() {
        let program = program_with_rows(vec![Row {
            terms: vec![(0, 1.0), (1, -1.0)],
            sense: Sense::Equal,
            rhs: -2.0,
        }]);
        let poly = to_glpk_polyhedron(&program);
        assert_eq!(poly.b, vec![(0, -2), (0, 2)]);
        assert_eq!(poly.a.rows, vec![0, 0, 1, 1]);
        assert_eq!(poly.a.vals, vec![1, -1, -1, 1]);
    }

    #[test]
    fn test_open_bounds_are_replaced() {
        let program = program_with_rows(vec![]);
        let poly = to_glpk_polyhedron(&program);
        assert_eq!(poly.variables[0].bound, (0, UNBOUNDED));
        assert_eq!(poly.variables[1].bound, (-UNBOUNDED, 3));
    }

    #[test]
    fn test_objective_skips_zero_coefficients() {
        let program = program_with_rows(vec![]);
        let objective = to_glpk_objective(&program);
        assert_eq!(objective.len(), 1);
        assert_eq!(objective.get("x_1"), Some(&1.5));
    }
}
