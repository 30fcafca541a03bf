use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use dotenv::dotenv;
use log::warn;

use crate::domain::solver_factory::SolverType;

const DEFAULT_TIME_LIMIT_SECS: u64 = 90;
const DEFAULT_RETRIES: u32 = 2;
const DEFAULT_CBC_PATH: &str = "cbc";
const DEFAULT_POOL_SIZE: usize = 1;
const DEFAULT_CACHE_SIZE: usize = 256;

/// Runtime settings for building and running models.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizerConfig {
    pub solver: SolverType,
    pub time_limit: Duration,
    /// Extra attempts after a solver failure.
    pub retries: u32,
    pub cbc_path: PathBuf,
    /// Where the CBC backend writes its problem and solution files.
    pub tmp_dir: PathBuf,
    /// Number of pre-built models, i.e. concurrent requests.
    pub pool_size: usize,
    pub cache_size: usize,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        OptimizerConfig {
            solver: SolverType::Glpk,
            time_limit: Duration::from_secs(DEFAULT_TIME_LIMIT_SECS),
            retries: DEFAULT_RETRIES,
            cbc_path: PathBuf::from(DEFAULT_CBC_PATH),
            tmp_dir: env::temp_dir(),
            pool_size: DEFAULT_POOL_SIZE,
            cache_size: DEFAULT_CACHE_SIZE,
        }
    }
}

impl OptimizerConfig {
    /// Read settings from the environment, loading `.env` first if present.
    pub fn from_env() -> Self {
        dotenv().ok();
        Self::from_vars(|name| env::var(name).ok())
    }

    /// Build from any variable lookup; unset or unparsable values fall back
    /// to the defaults.
    pub fn from_vars<F>(var: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = OptimizerConfig::default();

        let solver = match var("SOLVER") {
            Some(name) => SolverType::from_str(&name).unwrap_or_else(|| {
                warn!("Unknown solver {}, using {:?}", name, defaults.solver);
                defaults.solver
            }),
            None => defaults.solver,
        };

        OptimizerConfig {
            solver,
            time_limit: parsed::<u64>(&var, "SOLVER_TIME_LIMIT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.time_limit),
            retries: parsed(&var, "SOLVER_RETRIES").unwrap_or(defaults.retries),
            cbc_path: var("CBC_PATH").map(PathBuf::from).unwrap_or(defaults.cbc_path),
            tmp_dir: var("SOLVER_TMP_DIR").map(PathBuf::from).unwrap_or(defaults.tmp_dir),
            pool_size: parsed::<usize>(&var, "MODEL_POOL_SIZE")
                .filter(|size| *size > 0)
                .unwrap_or(defaults.pool_size),
            cache_size: parsed(&var, "RESULT_CACHE_SIZE").unwrap_or(defaults.cache_size),
        }
    }
}

fn parsed<T: FromStr>(var: &impl Fn(&str) -> Option<String>, name: &str) -> Option<T> {
    var(name).and_then(|value| value.parse::<T>().ok())
}
