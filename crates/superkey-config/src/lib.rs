//! Worker configuration for SuperKey
//!
//! The worker reads a small YAML file with the AWS region, the resource
//! name prefix and the policy for unresolved placeholders. Every field has a
//! default, so running without a config file is fine.

pub mod error;

pub use error::*;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use superkey_core::{ProviderSettings, UnresolvedSubstitution};
use tracing::{debug, warn};

/// Direct path to a config file
pub const CONFIG_PATH_ENV: &str = "SUPERKEY_CONFIG_PATH";
pub const REGION_ENV: &str = "SUPERKEY_REGION";
pub const NAME_PREFIX_ENV: &str = "SUPERKEY_NAME_PREFIX";
pub const UNRESOLVED_SUBSTITUTIONS_ENV: &str = "SUPERKEY_UNRESOLVED_SUBSTITUTIONS";

const DEFAULT_REGION: &str = "us-east-1";
const DEFAULT_NAME_PREFIX: &str = "redhat";

/// Candidate file names in the current directory, highest priority first
const LOCAL_CANDIDATES: [&str; 2] = ["superkey.local.yaml", "superkey.yaml"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    pub region: String,
    pub name_prefix: String,
    pub unresolved_substitutions: UnresolvedSubstitution,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_string(),
            name_prefix: DEFAULT_NAME_PREFIX.to_string(),
            unresolved_substitutions: UnresolvedSubstitution::default(),
        }
    }
}

impl WorkerConfig {
    /// Parse a config file without applying env overrides
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        // An empty file parses as null, which means "all defaults"
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(&content).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply `SUPERKEY_*` environment overrides. Empty values are ignored.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Some(region) = non_empty_var(REGION_ENV) {
            self.region = region;
        }
        if let Some(prefix) = non_empty_var(NAME_PREFIX_ENV) {
            self.name_prefix = prefix;
        }
        if let Some(policy) = non_empty_var(UNRESOLVED_SUBSTITUTIONS_ENV) {
            self.unresolved_substitutions = policy
                .parse::<UnresolvedSubstitution>()
                .map_err(|message| ConfigError::InvalidValue {
                    field: "unresolved_substitutions",
                    message,
                })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.region.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "region",
                message: "must not be empty".to_string(),
            });
        }
        if self.name_prefix.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "name_prefix",
                message: "must not be empty".to_string(),
            });
        }
        if self.name_prefix.contains('/') {
            return Err(ConfigError::InvalidValue {
                field: "name_prefix",
                message: format!("'{}' must not contain '/'", self.name_prefix),
            });
        }
        Ok(())
    }

    /// Settings handed to providers
    pub fn provider_settings(&self) -> ProviderSettings {
        ProviderSettings::new(self.name_prefix.clone())
            .with_unresolved_substitutions(self.unresolved_substitutions)
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// SuperKey's directory under the user config dir
pub fn get_config_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join("superkey"))
        .ok_or(ConfigError::ConfigDirNotFound)
}

/// Locate the worker config file.
///
/// Search order:
/// 1. `SUPERKEY_CONFIG_PATH` (direct path)
/// 2. Current directory: superkey.local.yaml, superkey.yaml
/// 3. `<config dir>/superkey/config.yaml`
pub fn find_config_file() -> Option<PathBuf> {
    if let Ok(config_path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Some(path);
        }
        warn!(path = %path.display(), "{} points to a missing file, ignoring", CONFIG_PATH_ENV);
    }

    if let Ok(current_dir) = std::env::current_dir() {
        for filename in LOCAL_CANDIDATES {
            let path = current_dir.join(filename);
            if path.exists() {
                return Some(path);
            }
        }
    }

    if let Ok(config_dir) = get_config_dir() {
        let global_config = config_dir.join("config.yaml");
        if global_config.exists() {
            return Some(global_config);
        }
    }

    None
}

/// Discover, parse, override from env and validate
pub fn load() -> Result<WorkerConfig> {
    let mut config = match find_config_file() {
        Some(path) => {
            debug!(path = %path.display(), "Loading worker config");
            WorkerConfig::from_file(&path)?
        }
        None => {
            debug!("No worker config file found, using defaults");
            WorkerConfig::default()
        }
    };

    config.apply_env_overrides()?;
    config.validate()?;
    Ok(config)
}
