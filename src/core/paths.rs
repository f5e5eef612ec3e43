//! core::paths
//!
//! Centralized path routing for repository storage locations.
//!
//! # Storage Layout
//!
//! All repository data is stored under `<root>/.vms/`:
//! - `HEAD` - Active branch name
//! - `index` - Staged changes
//! - `log` - Commit log stack
//! - `config.toml` - Repository configuration
//! - `lock` - Exclusive lock file (only when locking is enabled)
//! - `branches/<name>` - Branch tips
//! - `objects/<prefix>/<suffix>` - Permanent objects
//! - `cache/<id>` - Staged but uncommitted blobs
//!
//! **Hard rule:** no code outside this module joins `.vms` paths by hand.
//!
//! # Example
//!
//! ```
//! use vms::core::paths::RepoPaths;
//! use std::path::PathBuf;
//!
//! let paths = RepoPaths::new(PathBuf::from("/work"));
//! assert_eq!(paths.head_path(), PathBuf::from("/work/.vms/HEAD"));
//! assert!(paths.is_managed_path(&PathBuf::from("/work/.vms/index")));
//! assert!(!paths.is_managed_path(&PathBuf::from("/work/src/main.rs")));
//! ```

use std::path::{Component, Path, PathBuf};

use thiserror::Error;

use super::types::{BranchName, ObjectId};

/// Name of the repository directory inside the working tree root.
pub const REPO_DIR_NAME: &str = ".vms";

/// Errors from working-tree path normalization.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathError {
    #[error("path '{0}' is outside the repository")]
    OutsideRepository(PathBuf),

    #[error("path '{0}' is inside the repository's internal directory")]
    Managed(PathBuf),

    #[error("path '{0}' names the repository root, not a file")]
    Root(PathBuf),
}

/// Centralized path routing for repository storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoPaths {
    /// Root of the working tree (the directory containing `.vms`).
    pub root: PathBuf,
}

impl RepoPaths {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Walk up from `start` to the nearest directory containing `.vms`.
    pub fn discover(start: &Path) -> Option<Self> {
        start
            .ancestors()
            .find(|dir| dir.join(REPO_DIR_NAME).is_dir())
            .map(|dir| Self::new(dir.to_path_buf()))
    }

    // =========================================================================
    // Repository storage
    // =========================================================================

    /// `<root>/.vms`
    pub fn repo_dir(&self) -> PathBuf {
        self.root.join(REPO_DIR_NAME)
    }

    pub fn head_path(&self) -> PathBuf {
        self.repo_dir().join("HEAD")
    }

    pub fn index_path(&self) -> PathBuf {
        self.repo_dir().join("index")
    }

    pub fn log_path(&self) -> PathBuf {
        self.repo_dir().join("log")
    }

    pub fn config_path(&self) -> PathBuf {
        self.repo_dir().join("config.toml")
    }

    pub fn lock_path(&self) -> PathBuf {
        self.repo_dir().join("lock")
    }

    pub fn branches_dir(&self) -> PathBuf {
        self.repo_dir().join("branches")
    }

    pub fn branch_path(&self, name: &BranchName) -> PathBuf {
        self.branches_dir().join(name.as_str())
    }

    pub fn objects_dir(&self) -> PathBuf {
        self.repo_dir().join("objects")
    }

    /// Shard directory for objects whose id starts with `prefix`.
    pub fn shard_dir(&self, prefix: &str) -> PathBuf {
        self.objects_dir().join(prefix)
    }

    /// Permanent location of an object.
    pub fn object_path(&self, id: &ObjectId, prefix_len: usize) -> PathBuf {
        self.shard_dir(id.prefix(prefix_len)).join(id.suffix(prefix_len))
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.repo_dir().join("cache")
    }

    /// Cache location of a staged object (flat, no sharding).
    pub fn cache_path(&self, id: &ObjectId) -> PathBuf {
        self.cache_dir().join(id.as_str())
    }

    // =========================================================================
    // Working tree
    // =========================================================================

    /// Whether `path` lies inside `.vms`.
    ///
    /// Relative paths are taken relative to the root.
    pub fn is_managed_path(&self, path: &Path) -> bool {
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        };
        normalize(&absolute).starts_with(self.repo_dir())
    }

    /// Absolute location of a root-relative tracked path.
    pub fn work_path(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    /// Turn a user-supplied path (relative to `cwd`) into a root-relative,
    /// `/`-separated tracked path.
    ///
    /// # Example
    ///
    /// ```
    /// use vms::core::paths::RepoPaths;
    /// use std::path::{Path, PathBuf};
    ///
    /// let paths = RepoPaths::new(PathBuf::from("/work"));
    /// let rel = paths.tracked_path(Path::new("/work/src"), Path::new("../README.md")).unwrap();
    /// assert_eq!(rel, "README.md");
    /// assert!(paths.tracked_path(Path::new("/work"), Path::new(".vms/HEAD")).is_err());
    /// assert!(paths.tracked_path(Path::new("/work"), Path::new("../elsewhere")).is_err());
    /// ```
    pub fn tracked_path(&self, cwd: &Path, path: &Path) -> Result<String, PathError> {
        let absolute = normalize(&cwd.join(path));
        let relative = absolute
            .strip_prefix(&self.root)
            .map_err(|_| PathError::OutsideRepository(path.to_path_buf()))?;

        if relative.as_os_str().is_empty() {
            return Err(PathError::Root(path.to_path_buf()));
        }
        if relative.starts_with(REPO_DIR_NAME) {
            return Err(PathError::Managed(path.to_path_buf()));
        }

        let parts: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        Ok(parts.join("/"))
    }
}

/// Lexically resolve `.` and `..` without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
