//! Generic integer-program registry.
//!
//! Variables are addressed by a composite `(category, id)` key, constraints
//! are built once and keep a handle so only their right-hand side changes
//! between solves. The numeric work is delegated to a [`Solver`] backend.

pub mod restrictions;

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::time::Duration;

use log::debug;
use thiserror::Error;

use crate::domain::solver::{SolveStatus, Solver, SolverError};

pub use restrictions::{RestrictionKind, Restrictions};

#[derive(Error, Debug)]
pub enum ProblemError {
    #[error("variable {0} declared twice")]
    DuplicateVariable(VarKey),

    #[error("constraint references undeclared variable {0}")]
    UnknownVariable(VarKey),

    #[error("no {0:?} restriction registered for {1}")]
    UnknownRestriction(RestrictionKind, String),
}

/// Composite variable key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarKey {
    pub category: String,
    pub id: String,
}

impl VarKey {
    pub fn new(category: &str, id: impl fmt::Display) -> Self {
        VarKey {
            category: category.to_string(),
            id: id.to_string(),
        }
    }
}

impl fmt::Display for VarKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.category, self.id)
    }
}

/// One `coefficient * variable` term of a linear expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Term {
    pub coefficient: f64,
    pub key: VarKey,
}

pub fn term(coefficient: f64, category: &str, id: impl fmt::Display) -> Term {
    Term {
        coefficient,
        key: VarKey::new(category, id),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: String,
    pub lower: Option<i32>,
    pub upper: Option<i32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    LessOrEqual,
    Equal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// `(column, coefficient)` pairs.
    pub terms: Vec<(usize, f64)>,
    pub sense: Sense,
    pub rhs: f64,
}

impl Row {
    fn is_satisfied_when_empty(&self) -> bool {
        match self.sense {
            Sense::LessOrEqual => self.rhs >= 0.0,
            Sense::Equal => self.rhs == 0.0,
        }
    }
}

/// Maximization problem handed to the solver backends.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinearProgram {
    pub variables: Vec<Variable>,
    pub rows: Vec<Row>,
    /// Dense objective, one coefficient per variable.
    pub objective: Vec<f64>,
}

/// Handle to a constraint whose right-hand side may be changed later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConstraintHandle(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProblemStatus {
    NotSolved,
    Optimal,
    Infeasible,
    SolverError,
}

/// Solved value of every variable.
#[derive(Debug, Clone, Default)]
pub struct Assignment {
    values: HashMap<VarKey, i64>,
}

impl Assignment {
    pub fn get(&self, key: &VarKey) -> Option<i64> {
        self.values.get(key).copied()
    }

    /// Value of `(category, id)`, zero when the variable does not exist.
    pub fn value(&self, category: &str, id: impl fmt::Display) -> i64 {
        self.get(&VarKey::new(category, id)).unwrap_or(0)
    }

    /// Every `(id, value)` of a category.
    pub fn by_category<'a>(&'a self, category: &'a str) -> impl Iterator<Item = (&'a str, i64)> + 'a {
        self.values
            .iter()
            .filter(move |(key, _)| key.category == category)
            .map(|(key, value)| (key.id.as_str(), *value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(VarKey, i64)> for Assignment {
    fn from_iter<I: IntoIterator<Item = (VarKey, i64)>>(iter: I) -> Self {
        Assignment {
            values: iter.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Problem {
    program: LinearProgram,
    keys: Vec<VarKey>,
    index: HashMap<VarKey, usize>,
    objective_terms: BTreeMap<VarKey, f64>,
    status: ProblemStatus,
    assignment: Option<Assignment>,
}

impl Default for Problem {
    fn default() -> Self {
        Problem::new()
    }
}

impl Problem {
    pub fn new() -> Self {
        Problem {
            program: LinearProgram::default(),
            keys: Vec::new(),
            index: HashMap::new(),
            objective_terms: BTreeMap::new(),
            status: ProblemStatus::NotSolved,
            assignment: None,
        }
    }

    /// Declare an integer variable; `None` leaves that side unbounded.
    pub fn declare_variable(
        &mut self,
        category: &str,
        id: impl fmt::Display,
        min: Option<i32>,
        max: Option<i32>,
    ) -> Result<(), ProblemError> {
        let key = VarKey::new(category, id);
        if self.index.contains_key(&key) {
            return Err(ProblemError::DuplicateVariable(key));
        }
        self.index.insert(key.clone(), self.keys.len());
        self.program.variables.push(Variable {
            name: key.to_string(),
            lower: min,
            upper: max,
        });
        self.program.objective.push(0.0);
        self.keys.push(key);
        Ok(())
    }

    pub fn has_variable(&self, key: &VarKey) -> bool {
        self.index.contains_key(key)
    }

    pub fn init_objective(&mut self) {
        self.objective_terms.clear();
    }

    /// Add `weight` to the objective coefficient of `(category, id)`.
    pub fn accumulate_objective(&mut self, category: &str, id: impl fmt::Display, weight: f64) {
        *self
            .objective_terms
            .entry(VarKey::new(category, id))
            .or_insert(0.0) += weight;
    }

    /// Write the accumulated terms into the program's dense objective.
    pub fn finish_objective(&mut self) {
        self.program.objective.iter_mut().for_each(|c| *c = 0.0);
        for (key, weight) in &self.objective_terms {
            match self.index.get(key) {
                Some(&column) => self.program.objective[column] = *weight,
                None => debug!("Dropping objective term for undeclared variable {}", key),
            }
        }
    }

    pub fn objective_coefficient(&self, key: &VarKey) -> Option<f64> {
        self.index.get(key).map(|&column| self.program.objective[column])
    }

    /// `Σ terms <= rhs`
    pub fn constrain_le(&mut self, rhs: f64, terms: Vec<Term>) -> Result<ConstraintHandle, ProblemError> {
        self.push_row(Sense::LessOrEqual, rhs, terms)
    }

    /// `Σ terms == rhs`
    pub fn constrain_eq(&mut self, rhs: f64, terms: Vec<Term>) -> Result<ConstraintHandle, ProblemError> {
        self.push_row(Sense::Equal, rhs, terms)
    }

    fn push_row(&mut self, sense: Sense, rhs: f64, terms: Vec<Term>) -> Result<ConstraintHandle, ProblemError> {
        let mut columns: Vec<(usize, f64)> = Vec::with_capacity(terms.len());
        for term in terms {
            let column = *self
                .index
                .get(&term.key)
                .ok_or_else(|| ProblemError::UnknownVariable(term.key.clone()))?;
            // Merge repeated variables so backends see one entry per column.
            match columns.iter_mut().find(|(c, _)| *c == column) {
                Some(entry) => entry.1 += term.coefficient,
                None => columns.push((column, term.coefficient)),
            }
        }
        columns.retain(|(_, coefficient)| *coefficient != 0.0);

        self.program.rows.push(Row {
            terms: columns,
            sense,
            rhs,
        });
        Ok(ConstraintHandle(self.program.rows.len() - 1))
    }

    pub fn set_rhs(&mut self, handle: ConstraintHandle, rhs: f64) {
        self.program.rows[handle.0].rhs = rhs;
    }

    pub fn rhs(&self, handle: ConstraintHandle) -> f64 {
        self.program.rows[handle.0].rhs
    }

    pub fn program(&self) -> &LinearProgram {
        &self.program
    }

    pub fn variable_count(&self) -> usize {
        self.program.variables.len()
    }

    pub fn constraint_count(&self) -> usize {
        self.program.rows.len()
    }

    /// Run the backend and record the outcome.
    ///
    /// Infeasibility is a status, not an error; an `Err` means the backend
    /// itself failed and the caller may retry.
    pub fn solve(
        &mut self,
        solver: &dyn Solver,
        time_limit: Duration,
    ) -> Result<ProblemStatus, SolverError> {
        self.assignment = None;

        if self
            .program
            .rows
            .iter()
            .any(|row| row.terms.is_empty() && !row.is_satisfied_when_empty())
        {
            debug!("Empty constraint row cannot be satisfied; skipping solver");
            self.status = ProblemStatus::Infeasible;
            return Ok(self.status);
        }

        let solution = match solver.solve(&self.program, time_limit) {
            Ok(solution) => solution,
            Err(error) => {
                self.status = ProblemStatus::SolverError;
                return Err(error);
            }
        };

        self.status = match solution.status {
            SolveStatus::Optimal | SolveStatus::Feasible => {
                if solution.values.len() != self.keys.len() {
                    self.status = ProblemStatus::SolverError;
                    return Err(SolverError::ExecutionFailed(format!(
                        "{} returned {} values for {} variables",
                        solver.name(),
                        solution.values.len(),
                        self.keys.len()
                    )));
                }
                self.assignment = Some(
                    self.keys
                        .iter()
                        .cloned()
                        .zip(solution.values.iter().map(|v| v.round() as i64))
                        .collect(),
                );
                ProblemStatus::Optimal
            }
            SolveStatus::Infeasible => ProblemStatus::Infeasible,
            status @ (SolveStatus::Unbounded | SolveStatus::Undefined) => {
                self.status = ProblemStatus::SolverError;
                return Err(SolverError::NoSolution(status));
            }
        };
        Ok(self.status)
    }

    pub fn status(&self) -> ProblemStatus {
        self.status
    }

    pub fn read_assignment(&self) -> Option<&Assignment> {
        self.assignment.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::solver::RawSolution;

    struct FixedSolver(RawSolution);

    impl Solver for FixedSolver {
        fn solve(&self, _program: &LinearProgram, _time_limit: Duration) -> Result<RawSolution, SolverError> {
            Ok(self.0.clone())
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    fn two_variable_problem() -> Problem {
        let mut problem = Problem::new();
        problem.declare_variable("x", 1, Some(0), Some(1)).unwrap();
        problem.declare_variable("x", 2, Some(0), None).unwrap();
        problem
    }

    #[test]
    fn test_declare_variable_rejects_duplicates() {
        let mut problem = two_variable_problem();
        assert!(matches!(
            problem.declare_variable("x", 1, None, None),
            Err(ProblemError::DuplicateVariable(_))
        ));
    }

    #[test]
    fn test_accumulate_objective_sums_on_collision() {
        let mut problem = two_variable_problem();
        problem.init_objective();
        problem.accumulate_objective("x", 1, 2.0);
        problem.accumulate_objective("x", 1, 3.5);
        problem.accumulate_objective("missing", 1, 10.0);
        problem.finish_objective();
        assert_eq!(problem.objective_coefficient(&VarKey::new("x", 1)), Some(5.5));
        assert_eq!(problem.program().objective, vec![5.5, 0.0]);
    }

    #[test]
    fn test_constrain_merges_terms_and_rhs_is_mutable() {
        let mut problem = two_variable_problem();
        let handle = problem
            .constrain_le(4.0, vec![term(1.0, "x", 1), term(2.0, "x", 2), term(1.0, "x", 1)])
            .unwrap();
        assert_eq!(problem.program().rows[0].terms, vec![(0, 2.0), (1, 2.0)]);
        problem.set_rhs(handle, 7.0);
        assert_eq!(problem.rhs(handle), 7.0);
    }

    #[test]
    fn test_constrain_with_unknown_variable_fails() {
        let mut problem = two_variable_problem();
        assert!(matches!(
            problem.constrain_eq(0.0, vec![term(1.0, "y", 1)]),
            Err(ProblemError::UnknownVariable(_))
        ));
    }

    #[test]
    fn test_solve_records_assignment() {
        let mut problem = two_variable_problem();
        let solver = FixedSolver(RawSolution {
            status: SolveStatus::Optimal,
            values: vec![1.0, 2.9999999],
        });
        let status = problem.solve(&solver, Duration::from_secs(1)).unwrap();
        assert_eq!(status, ProblemStatus::Optimal);
        let assignment = problem.read_assignment().unwrap();
        assert_eq!(assignment.value("x", 2), 3);
        assert_eq!(assignment.by_category("x").count(), 2);
    }

    #[test]
    fn test_solve_maps_unbounded_to_solver_error() {
        let mut problem = two_variable_problem();
        let solver = FixedSolver(RawSolution {
            status: SolveStatus::Unbounded,
            values: vec![],
        });
        assert!(problem.solve(&solver, Duration::from_secs(1)).is_err());
        assert_eq!(problem.status(), ProblemStatus::SolverError);
        assert!(problem.read_assignment().is_none());
    }

    #[test]
    fn test_violated_empty_row_is_infeasible_without_solving() {
        let mut problem = two_variable_problem();
        problem.constrain_le(-1.0, vec![]).unwrap();
        let solver = FixedSolver(RawSolution {
            status: SolveStatus::Optimal,
            values: vec![0.0, 0.0],
        });
        let status = problem.solve(&solver, Duration::from_secs(1)).unwrap();
        assert_eq!(status, ProblemStatus::Infeasible);
    }
}
