//! Application configuration.
//!
//! Aggregates configuration into a single Config struct that can be loaded
//! from YAML files or environment variables.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::extensions::ITERATIONS_TABLE;
use crate::model::WorkspaceState;

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "runview.yaml";
/// Environment variable for configuration file path.
pub const CONFIG_ENV_VAR: &str = "RUNVIEW_CONFIG";
/// Prefix for configuration environment variables.
pub const CONFIG_ENV_PREFIX: &str = "RUNVIEW";
/// Environment variable for logging configuration.
pub const LOG_ENV_VAR: &str = "RUNVIEW_LOG";

/// Default run list file.
pub const DEFAULT_RUNS_PATH: &str = "runs.json";
/// Default subfeed fixture directory.
pub const DEFAULT_FEEDS_ROOT: &str = "feeds";

/// Errors from loading configuration or the inputs it points at.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Load(#[from] ::config::ConfigError),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Main application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where the run list comes from.
    pub workspace: WorkspaceConfig,
    /// Where subfeed fixtures live.
    pub feeds: FeedsConfig,
    /// Which run-view extensions to register.
    pub extensions: ExtensionsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WorkspaceConfig {
    /// JSON file holding `{"runs": [...]}`.
    pub runs_path: PathBuf,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            runs_path: PathBuf::from(DEFAULT_RUNS_PATH),
        }
    }
}

impl WorkspaceConfig {
    /// Read the run list.
    pub fn load_runs(&self) -> Result<WorkspaceState, ConfigError> {
        load_runs_from(&self.runs_path)
    }
}

fn load_runs_from(path: &Path) -> Result<WorkspaceState, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FeedsConfig {
    /// Root directory of JSONL subfeed fixtures.
    pub root: PathBuf,
}

impl Default for FeedsConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from(DEFAULT_FEEDS_ROOT),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ExtensionsConfig {
    /// Extension names, in render order.
    pub enabled: Vec<String>,
}

impl Default for ExtensionsConfig {
    fn default() -> Self {
        Self {
            enabled: vec![ITERATIONS_TABLE.to_string()],
        }
    }
}

impl Config {
    /// Load configuration from file and environment.
    ///
    /// Configuration sources (in order of priority, later overrides earlier):
    /// 1. `runview.yaml` in current directory (if exists)
    /// 2. File specified by `path` argument (if provided)
    /// 3. File specified by `CONFIG_ENV_VAR` environment variable (if set)
    /// 4. Environment variables with `CONFIG_ENV_PREFIX` prefix
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        use ::config::{Config as ConfigLib, Environment, File, FileFormat};

        let mut builder = ConfigLib::builder()
            .add_source(File::new(DEFAULT_CONFIG_FILE, FileFormat::Yaml).required(false));

        if let Some(config_path) = path {
            builder = builder.add_source(File::new(config_path, FileFormat::Yaml).required(true));
        }

        if let Ok(config_path) = std::env::var(CONFIG_ENV_VAR) {
            builder = builder.add_source(File::new(&config_path, FileFormat::Yaml).required(true));
        }

        let config = builder
            .add_source(
                Environment::with_prefix(CONFIG_ENV_PREFIX)
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("extensions.enabled")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Create config for testing.
    pub fn for_test() -> Self {
        Self::default()
    }
}
