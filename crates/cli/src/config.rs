use std::path::PathBuf;

/// Default dataset path when neither `GRIDVAL_INPUT` nor an argument is given.
pub const DEFAULT_INPUT: &str = "data/export.csv";

/// Default output directory for generated reports.
pub const DEFAULT_REPORT_DIR: &str = "rapports";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be a boolean (true/false/1/0), got '{value}'")]
    InvalidBool { var: &'static str, value: String },

    #[error("{var} must not be empty")]
    Empty { var: &'static str },
}

/// Run configuration loaded from environment variables.
///
/// The schema is not configurable here; it is built in code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    /// Dataset to validate (`.csv` or `.json`).
    pub input: PathBuf,
    /// Directory the JSON and markdown reports are written to.
    pub report_dir: PathBuf,
    /// Run the validators on the rayon pool.
    pub parallel: bool,
}

impl CliConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var              | Default           |
    /// |----------------------|-------------------|
    /// | `GRIDVAL_INPUT`      | `data/export.csv` |
    /// | `GRIDVAL_REPORT_DIR` | `rapports`        |
    /// | `GRIDVAL_PARALLEL`   | `true`            |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as [`CliConfig::from_env`] with an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let input = path_var(&lookup, "GRIDVAL_INPUT", DEFAULT_INPUT)?;
        let report_dir = path_var(&lookup, "GRIDVAL_REPORT_DIR", DEFAULT_REPORT_DIR)?;

        let parallel = match lookup("GRIDVAL_PARALLEL") {
            None => true,
            Some(value) => parse_bool(&value).ok_or(ConfigError::InvalidBool {
                var: "GRIDVAL_PARALLEL",
                value,
            })?,
        };

        Ok(Self {
            input,
            report_dir,
            parallel,
        })
    }

    /// Override the input path (first positional argument).
    pub fn with_input(mut self, input: impl Into<PathBuf>) -> Self {
        self.input = input.into();
        self
    }
}

fn path_var<F>(lookup: &F, var: &'static str, default: &str) -> Result<PathBuf, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(PathBuf::from(default)),
        Some(value) if value.trim().is_empty() => Err(ConfigError::Empty { var }),
        Some(value) => Ok(PathBuf::from(value.trim())),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
