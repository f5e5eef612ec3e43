//! core::config
//!
//! Configuration schema and loading.
//!
//! # Overview
//!
//! There are two configuration scopes:
//! - **Global**: User-level settings
//! - **Repo**: Repository-level settings, written by `init`
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Global config file
//! 3. Repo config file
//! 4. CLI flags (not handled here)
//!
//! # Global Config Locations
//!
//! Searched in order:
//! 1. `$VMS_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/vms/config.toml`
//! 3. `vms/config.toml` under the platform config dir (`~/.config` on Linux)
//!
//! # Repo Config Location
//!
//! `<root>/.vms/config.toml`
//!
//! # Example
//!
//! ```no_run
//! use vms::core::config::Config;
//! use std::path::Path;
//!
//! let config = Config::load(Some(Path::new("/path/to/repo/.vms/config.toml"))).unwrap();
//! println!("Protected branch: {}", config.default_branch());
//! println!("Shard prefix: {}", config.shard_prefix_len());
//! ```

pub mod schema;

pub use schema::{GlobalConfig, RepoConfig};

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::types::BranchName;
use schema::{DEFAULT_BRANCH, DEFAULT_COMPRESSION_LEVEL, DEFAULT_SHARD_PREFIX_LEN};

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("failed to write config file '{path}': {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Merged configuration from all sources.
///
/// Accessors apply precedence rules automatically: repo config overrides
/// global config, which overrides built-in defaults.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Global configuration
    pub global: GlobalConfig,
    /// Repository configuration (if in a repo)
    pub repo: Option<RepoConfig>,
}

impl Config {
    /// Load configuration from default locations.
    ///
    /// If `repo_config` is provided and exists, it is loaded too.
    ///
    /// # Errors
    ///
    /// Returns an error if config files exist but cannot be parsed or fail
    /// validation. Missing config files are not an error.
    pub fn load(repo_config: Option<&Path>) -> Result<Self, ConfigError> {
        let global = Self::load_global()?;
        global.validate()?;

        let repo = match repo_config {
            Some(path) if path.exists() => {
                let repo: RepoConfig = read_toml(path)?;
                repo.validate()?;
                Some(repo)
            }
            _ => None,
        };

        Ok(Config { global, repo })
    }

    /// Load global configuration from standard locations.
    fn load_global() -> Result<GlobalConfig, ConfigError> {
        if let Ok(path) = std::env::var("VMS_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return read_toml(&path);
            }
        }

        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("vms/config.toml");
            if path.exists() {
                return read_toml(&path);
            }
        }

        // Not `~/.vms`, which would make the home directory look like a repository.
        if let Some(config_dir) = dirs::config_dir() {
            let path = config_dir.join("vms/config.toml");
            if path.exists() {
                return read_toml(&path);
            }
        }

        Ok(GlobalConfig::default())
    }

    /// Write repo config atomically.
    ///
    /// Writes to a temp file in the same directory, syncs it, then renames.
    pub fn write_repo(path: &Path, config: &RepoConfig) -> Result<(), ConfigError> {
        let contents =
            toml::to_string_pretty(config).map_err(|e| ConfigError::InvalidValue(e.to_string()))?;

        let temp_path = path.with_extension("toml.tmp");
        let write_err = |source| ConfigError::WriteError {
            path: temp_path.clone(),
            source,
        };

        let mut file = fs::File::create(&temp_path).map_err(write_err)?;
        file.write_all(contents.as_bytes()).map_err(write_err)?;
        file.sync_all().map_err(write_err)?;

        fs::rename(&temp_path, path).map_err(|e| ConfigError::WriteError {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(())
    }

    /// Build the repo config `init` writes for a new repository.
    pub fn initial_repo_config(&self, default_branch: &BranchName) -> RepoConfig {
        RepoConfig {
            default_branch: Some(default_branch.to_string()),
            shard_prefix_len: Some(DEFAULT_SHARD_PREFIX_LEN),
            compression_level: Some(DEFAULT_COMPRESSION_LEVEL),
            lock: Some(false),
        }
    }

    // =========================================================================
    // Accessor methods with precedence
    // =========================================================================

    /// The protected branch.
    ///
    /// Repo config > global config > "master". Values were validated at load.
    pub fn default_branch(&self) -> BranchName {
        self.repo
            .as_ref()
            .and_then(|r| r.default_branch.as_deref())
            .or(self.global.default_branch.as_deref())
            .and_then(|name| BranchName::new(name).ok())
            .unwrap_or_else(|| BranchName::from_static(DEFAULT_BRANCH))
    }

    pub fn shard_prefix_len(&self) -> usize {
        self.repo
            .as_ref()
            .and_then(|r| r.shard_prefix_len)
            .unwrap_or(DEFAULT_SHARD_PREFIX_LEN)
    }

    pub fn compression_level(&self) -> u32 {
        self.repo
            .as_ref()
            .and_then(|r| r.compression_level)
            .unwrap_or(DEFAULT_COMPRESSION_LEVEL)
    }

    pub fn lock_enabled(&self) -> bool {
        self.repo.as_ref().and_then(|r| r.lock).unwrap_or(false)
    }

    /// Whether prompts are shown by default. CLI flags override this.
    pub fn interactive(&self) -> bool {
        self.global.interactive.unwrap_or(true)
    }
}

fn read_toml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;

    toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_without_files() {
        let config = Config::default();
        assert_eq!(config.default_branch().as_str(), "master");
        assert_eq!(config.shard_prefix_len(), 2);
        assert_eq!(config.compression_level(), 9);
        assert!(!config.lock_enabled());
    }

    #[test]
    fn repo_overrides_global() {
        let config = Config {
            global: GlobalConfig {
                default_branch: Some("main".into()),
                interactive: None,
            },
            repo: Some(RepoConfig {
                default_branch: Some("trunk".into()),
                ..Default::default()
            }),
        };
        assert_eq!(config.default_branch().as_str(), "trunk");
    }

    #[test]
    fn global_used_when_repo_silent() {
        let config = Config {
            global: GlobalConfig {
                default_branch: Some("main".into()),
                interactive: Some(false),
            },
            repo: Some(RepoConfig::default()),
        };
        assert_eq!(config.default_branch().as_str(), "main");
        assert!(!config.interactive());
    }

    #[test]
    fn write_then_load_repo_config() {
        let temp = TempDir::new().expect("create temp dir");
        let path = temp.path().join("config.toml");

        let branch = BranchName::new("main").unwrap();
        let repo = Config::default().initial_repo_config(&branch);
        Config::write_repo(&path, &repo).expect("write");

        let loaded = Config::load(Some(&path)).expect("load");
        assert_eq!(loaded.repo, Some(repo));
        assert!(!temp.path().join("config.toml.tmp").exists());
    }

    #[test]
    fn invalid_repo_config_is_an_error() {
        let temp = TempDir::new().expect("create temp dir");
        let path = temp.path().join("config.toml");
        fs::write(&path, "shard_prefix_len = 40\n").unwrap();

        assert!(matches!(
            Config::load(Some(&path)),
            Err(ConfigError::InvalidValue(_))
        ));
    }

    #[test]
    fn malformed_repo_config_is_a_parse_error() {
        let temp = TempDir::new().expect("create temp dir");
        let path = temp.path().join("config.toml");
        fs::write(&path, "this is not toml = = =").unwrap();

        assert!(matches!(
            Config::load(Some(&path)),
            Err(ConfigError::ParseError { .. })
        ));
    }
}
