//! CBC driven as an external process through CPLEX-LP files.

use std::fmt::Write as _;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use log::{debug, warn};
use uuid::Uuid;

use crate::domain::solver::{RawSolution, SolveStatus, Solver, SolverError};
use crate::problem::{LinearProgram, Sense};

const TERMS_PER_LINE: usize = 8;

/// CBC solver implementation
pub struct CbcSolver {
    binary: PathBuf,
    tmp_dir: PathBuf,
}

impl CbcSolver {
    pub fn new(binary: impl Into<PathBuf>, tmp_dir: impl Into<PathBuf>) -> Self {
        CbcSolver {
            binary: binary.into(),
            tmp_dir: tmp_dir.into(),
        }
    }
}

/// Files of one run; removed when dropped.
struct RunFiles {
    model: PathBuf,
    solution: PathBuf,
}

impl RunFiles {
    fn new(dir: &Path) -> Self {
        let stem = format!("problem_{}", Uuid::new_v4());
        RunFiles {
            model: dir.join(format!("{}.lp", stem)),
            solution: dir.join(format!("{}.sol", stem)),
        }
    }
}

impl Drop for RunFiles {
    fn drop(&mut self) {
        for path in [&self.model, &self.solution] {
            if let Err(e) = fs::remove_file(path) {
                if e.kind() != ErrorKind::NotFound {
                    warn!("Could not remove solver file {}: {}", path.display(), e);
                }
            }
        }
    }
}

fn column_name(index: usize) -> String {
    format!("c{}", index)
}

fn write_expression(out: &mut String, terms: impl Iterator<Item = (usize, f64)>) {
    let mut written = 0;
    for (column, coefficient) in terms {
        if written > 0 && written % TERMS_PER_LINE == 0 {
            out.push_str("\n   ");
        }
        let sign = if coefficient < 0.0 { '-' } else { '+' };
        let _ = write!(out, " {} {} {}", sign, coefficient.abs(), column_name(column));
        written += 1;
    }
    if written == 0 {
        // LP format needs at least one term.
        out.push_str(" 0 c0");
    }
}

/// Render the program in CPLEX-LP format.
pub fn to_lp_format(program: &LinearProgram) -> String {
    let mut out = String::from("Maximize\n obj:");
    write_expression(
        &mut out,
        program
            .objective
            .iter()
            .copied()
            .enumerate()
            .filter(|(_, c)| *c != 0.0),
    );

    out.push_str("\nSubject To\n");
    for (index, row) in program.rows.iter().enumerate() {
        if row.terms.is_empty() {
            continue;
        }
        let _ = write!(out, " r{}:", index);
        write_expression(&mut out, row.terms.iter().copied());
        let operator = match row.sense {
            Sense::LessOrEqual => "<=",
            Sense::Equal => "=",
        };
        let _ = writeln!(out, " {} {}", operator, row.rhs);
    }

    out.push_str("Bounds\n");
    for (index, variable) in program.variables.iter().enumerate() {
        let name = column_name(index);
        match (variable.lower, variable.upper) {
            (None, None) => {
                let _ = writeln!(out, " {} free", name);
            }
            (lower, upper) => {
                let lower = lower.map_or("-inf".to_string(), |v| v.to_string());
                let upper = upper.map_or("+inf".to_string(), |v| v.to_string());
                let _ = writeln!(out, " {} <= {} <= {}", lower, name, upper);
            }
        }
    }

    out.push_str("General\n");
    for chunk in (0..program.variables.len()).collect::<Vec<_>>().chunks(TERMS_PER_LINE * 2) {
        let names: Vec<String> = chunk.iter().map(|&i| column_name(i)).collect();
        let _ = writeln!(out, " {}", names.join(" "));
    }
    out.push_str("End\n");
    out
}

fn parse_status(line: &str) -> SolveStatus {
    let line = line.trim_start();
    if line.starts_with("Optimal") {
        SolveStatus::Optimal
    } else if line.starts_with("Stopped on time") || line.starts_with("Stopped on iterations") {
        if line.contains("no integer solution") {
            SolveStatus::Undefined
        } else {
            SolveStatus::Feasible
        }
    } else if line.starts_with("Infeasible") || line.starts_with("Integer infeasible") {
        SolveStatus::Infeasible
    } else if line.starts_with("Unbounded") {
        SolveStatus::Unbounded
    } else {
        SolveStatus::Undefined
    }
}

/// Parse a CBC `-solu` file into column-ordered values.
pub fn parse_solution(content: &str, columns: usize) -> Result<RawSolution, SolverError> {
    let mut lines = content.lines();
    let status = lines
        .next()
        .map(parse_status)
        .ok_or_else(|| SolverError::ExecutionFailed("empty CBC solution file".to_string()))?;

    if !matches!(status, SolveStatus::Optimal | SolveStatus::Feasible) {
        return Ok(RawSolution::without_values(status));
    }

    let mut values = vec![0.0; columns];
    for line in lines {
        let tokens: Vec<&str> = line
            .split_whitespace()
            .skip_while(|t| *t == "**")
            .collect();
        if tokens.len() < 3 {
            continue;
        }
        let index = tokens[1]
            .strip_prefix('c')
            .and_then(|i| i.parse::<usize>().ok())
            .filter(|i| *i < columns);
        let value = tokens[2].parse::<f64>().ok();
        match (index, value) {
            (Some(index), Some(value)) => values[index] = value,
            _ => debug!("Skipping CBC solution line {:?}", line),
        }
    }
    Ok(RawSolution { status, values })
}

impl Solver for CbcSolver {
    fn solve(&self, program: &LinearProgram, time_limit: Duration) -> Result<RawSolution, SolverError> {
        let files = RunFiles::new(&self.tmp_dir);
        fs::write(&files.model, to_lp_format(program))?;

        let output = Command::new(&self.binary)
            .arg(&files.model)
            .arg("-sec")
            .arg(time_limit.as_secs().max(1).to_string())
            .arg("-timeMode")
            .arg("elapsed")
            .arg("-solve")
            .arg("-solu")
            .arg(&files.solution)
            .output()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => {
                    SolverError::Unavailable(format!("{} not found", self.binary.display()))
                }
                _ => SolverError::Io(e),
            })?;

        if !output.status.success() {
            return Err(SolverError::ExecutionFailed(format!(
                "CBC exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let content = fs::read_to_string(&files.solution).map_err(|e| {
            SolverError::ExecutionFailed(format!("CBC wrote no solution file: {}", e))
        })?;
        let solution = parse_solution(&content, program.variables.len())?;
        if solution.status == SolveStatus::Undefined {
            return Err(SolverError::ExecutionFailed(format!(
                "CBC reported {:?}",
                content.lines().next().unwrap_or_default()
            )));
        }
        Ok(solution)
    }

    fn name(&self) -> &str {
        "CBC"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::{Row, Variable};

    fn small_program() -> LinearProgram {
        LinearProgram {
            variables: vec![
                Variable {
                    name: "x_1".to_string(),
                    lower: Some(0),
                    upper: Some(1),
                },
                Variable {
                    name: "stat_Vitality".to_string(),
                    lower: None,
                    upper: None,
                },
            ],
            rows: vec![Row {
                terms: vec![(0, 2.0), (1, -0.5)],
                sense: Sense::Equal,
                rhs: -3.0,
            }],
            objective: vec![1.0, 0.0],
        }
    }

    #[test]
    fn test_to_lp_format() {
        let lp = to_lp_format(&small_program());
        assert!(lp.starts_with("Maximize\n obj: + 1 c0\n"));
        assert!(lp.contains(" r0: + 2 c0 - 0.5 c1 = -3\n"));
        assert!(lp.contains(" 0 <= c0 <= 1\n"));
        assert!(lp.contains(" c1 free\n"));
        assert!(lp.contains("General\n c0 c1\n"));
        assert!(lp.ends_with("End\n"));
    }

    #[test]
    fn test_parse_solution_optimal() {
        let content = "Optimal - objective value 12.00000000\n\
                       \x20     0 c0                     1                       0\n\
                       \x20     1 c1                    -4                       0\n";
        let solution = parse_solution(content, 3).unwrap();
        assert_eq!(solution.status, SolveStatus::Optimal);
        assert_eq!(solution.values, vec![1.0, -4.0, 0.0]);
    }

    #[test]
    fn test_parse_solution_time_limit_and_markers() {
        let content = "Stopped on time - objective value 3.5\n\
                       ** 2 c2 1 0\n";
        let solution = parse_solution(content, 3).unwrap();
        assert_eq!(solution.status, SolveStatus::Feasible);
        assert_eq!(solution.values[2], 1.0);
    }

    #[test]
    fn test_parse_solution_infeasible() {
        let solution = parse_solution("Infeasible - objective value 0\n", 2).unwrap();
        assert_eq!(solution.status, SolveStatus::Infeasible);
        assert!(solution.values.is_empty());
    }

    #[test]
    fn test_missing_binary_is_unavailable() {
        let solver = CbcSolver::new("/nonexistent/cbc-binary", std::env::temp_dir());
        let result = solver.solve(&small_program(), Duration::from_secs(1));
        assert!(matches!(result, Err(SolverError::Unavailable(_))));
    }
}
