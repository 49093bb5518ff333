use serde::{Deserialize, Serialize};
use std::{env, path::PathBuf};
use thiserror::Error;
use validator::Validate;

pub const ENV_MAX_FIXPOINT_ITERATIONS: &str = "SYSVAR_ANALYZER_MAX_FIXPOINT_ITERATIONS";
pub const ENV_CHECK_LITERALS: &str = "SYSVAR_ANALYZER_CHECK_LITERALS";

/// Errors raised while assembling an [`AnalyzerConfig`]
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{key} is set but unreadable: {source}")]
    EnvVar {
        key: String,
        #[source]
        source: env::VarError,
    },

    #[error("Invalid value `{value}` for {key}: {source}")]
    Parse {
        key: String,
        value: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Cannot read analyzer config {}: {source}", path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed analyzer config {}: {source}", path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

/// Analyzer configuration with validation
#[derive(Clone, Debug, PartialEq, Validate, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Upper bound on plan-changing applications of a single fixpoint rule
    #[validate(range(
        min = 1,
        max = 1000,
        message = "Max fixpoint iterations must be between 1 and 1000"
    ))]
    pub max_fixpoint_iterations: usize,

    /// Whether literal `SET` values are checked against the target's type
    pub check_literal_assignments: bool,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            max_fixpoint_iterations: 8,
            check_literal_assignments: true,
        }
    }
}

impl AnalyzerConfig {
    /// Create configuration from environment variables with validation
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self {
            max_fixpoint_iterations: parse_env_var(ENV_MAX_FIXPOINT_ITERATIONS, "8")?,
            check_literal_assignments: parse_env_var(ENV_CHECK_LITERALS, "true")?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Create configuration from CLI arguments with validation
    pub fn from_cli(cli: CliConfig) -> Result<Self, ConfigError> {
        let config = Self {
            max_fixpoint_iterations: cli.max_fixpoint_iterations,
            check_literal_assignments: cli.check_literal_assignments,
        };

        config.validate()?;
        Ok(config)
    }

    /// Load an analyzer config file. Keys absent from the file keep their
    /// defaults.
    pub fn from_yaml_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;

        let config: Self = serde_yaml::from_str(&content).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Merge with another configuration (CLI overrides environment)
    pub fn merge(&mut self, other: Self) {
        self.max_fixpoint_iterations = other.max_fixpoint_iterations;
        self.check_literal_assignments = other.check_literal_assignments;
    }
}

/// CLI configuration (parsed from command line arguments)
#[derive(Clone, Debug)]
pub struct CliConfig {
    pub max_fixpoint_iterations: usize,
    pub check_literal_assignments: bool,
}

/// Read `key` from the environment, falling back to `default` only when the
/// variable is unset.
fn parse_env_var<T: std::str::FromStr>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let value = match env::var(key) {
        Ok(value) => value,
        Err(env::VarError::NotPresent) => default.to_string(),
        Err(source) => {
            return Err(ConfigError::EnvVar {
                key: key.to_string(),
                source,
            })
        }
    };
    value.trim().parse().map_err(|e| ConfigError::Parse {
        key: key.to_string(),
        value,
        source: Box::new(e),
    })
}
