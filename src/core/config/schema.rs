//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Validation
//!
//! Config values are validated after parsing to ensure they conform to
//! expected formats (e.g., the default branch must be a valid branch name).

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::core::types::BranchName;

/// Default name of the protected branch.
pub const DEFAULT_BRANCH: &str = "master";

/// Default length of the shard directory prefix, in hex characters.
pub const DEFAULT_SHARD_PREFIX_LEN: usize = 2;

/// Default zlib level for stored objects.
pub const DEFAULT_COMPRESSION_LEVEL: u32 = 9;

/// Global configuration (user scope).
///
/// # Example
///
/// ```toml
/// default_branch = "main"
/// interactive = true
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfig {
    /// Branch name used by `init` for new repositories
    pub default_branch: Option<String>,

    /// Default interactive mode
    pub interactive: Option<bool>,
}

impl GlobalConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(branch) = &self.default_branch {
            validate_branch(branch)?;
        }
        Ok(())
    }
}

/// Repository configuration, written once by `init`.
///
/// # Example
///
/// ```toml
/// default_branch = "master"
/// shard_prefix_len = 2
/// compression_level = 9
/// lock = false
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RepoConfig {
    /// The protected branch of this repository
    pub default_branch: Option<String>,

    /// Hex characters of an object id used as its shard directory
    pub shard_prefix_len: Option<usize>,

    /// zlib compression level for objects (0-9)
    pub compression_level: Option<u32>,

    /// Hold an exclusive lock file for each mutating command
    pub lock: Option<bool>,
}

impl RepoConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(branch) = &self.default_branch {
            validate_branch(branch)?;
        }

        if let Some(len) = self.shard_prefix_len {
            if !(1..=8).contains(&len) {
                return Err(ConfigError::InvalidValue(format!(
                    "shard_prefix_len must be between 1 and 8, got {}",
                    len
                )));
            }
        }

        if let Some(level) = self.compression_level {
            if level > 9 {
                return Err(ConfigError::InvalidValue(format!(
                    "compression_level must be between 0 and 9, got {}",
                    level
                )));
            }
        }

        Ok(())
    }
}

fn validate_branch(branch: &str) -> Result<(), ConfigError> {
    BranchName::new(branch)
        .map(|_| ())
        .map_err(|e| ConfigError::InvalidValue(format!("invalid default branch name: {}", e)))
}
