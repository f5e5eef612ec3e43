//! repo
//!
//! The repository handle and the on-disk components it owns.
//!
//! # Modules
//!
//! - [`fs`] - Filesystem helpers with path-carrying errors
//! - [`objects`] - Content-addressed blob and commit store
//! - [`index`] - Staging area
//! - [`refs`] - Branch tips and HEAD
//! - [`log`] - Commit log stack
//!
//! # Architecture
//!
//! A [`Repository`] carries the working tree root explicitly. Every
//! component borrows its [`RepoPaths`] from the handle, so nothing depends on
//! the process working directory after discovery.
//!
//! # Example
//!
//! ```
//! use vms::repo::Repository;
//!
//! let temp = tempfile::TempDir::new().unwrap();
//! let (repo, sentinel) = Repository::init(temp.path()).unwrap();
//!
//! let branch = repo.refs().current_branch().unwrap();
//! assert_eq!(repo.refs().branch_tip(&branch).unwrap(), sentinel);
//! assert!(repo.index().load().unwrap().is_empty());
//! ```

pub mod fs;
pub mod index;
pub mod log;
pub mod objects;
pub mod refs;

pub use index::{Index, IndexEntry, IndexUpdate, StagedChanges};
pub use log::{CommitLog, LogEntry};
pub use objects::{ObjectKind, ObjectStore};
pub use refs::Refs;

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::core::config::{Config, ConfigError};
use crate::core::object::Commit;
use crate::core::ops::{LockError, RepoLock};
use crate::core::paths::RepoPaths;
use crate::core::types::{BranchName, ObjectId, TypeError};

/// Errors from repository storage.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A filesystem operation failed.
    #[error("failed to {op} '{path}': {source}")]
    Io {
        op: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },

    /// A loaded object does not hash to the id it was stored under.
    #[error("integrity violation: object {expected} hashes to {actual}")]
    Integrity { expected: ObjectId, actual: ObjectId },

    #[error("object {0} not found")]
    ObjectNotFound(ObjectId),

    #[error("no object matches '{0}'")]
    NoMatchingObject(String),

    #[error("'{prefix}' is ambiguous ({matches} objects match)")]
    AmbiguousId { prefix: String, matches: usize },

    #[error("abbreviated id '{prefix}' is too short (need at least {min} characters)")]
    ShortIdTooShort { prefix: String, min: usize },

    #[error("object {id} is a {found}, not a {expected}")]
    WrongKind {
        id: ObjectId,
        expected: ObjectKind,
        found: ObjectKind,
    },

    /// Stored data could not be decoded.
    #[error("corrupt {what}: {message}")]
    Corrupt { what: String, message: String },

    #[error("branch '{0}' does not exist")]
    BranchNotFound(BranchName),

    #[error("branch '{0}' already exists")]
    BranchExists(BranchName),

    #[error("cannot delete the default branch '{0}'")]
    DeleteDefaultBranch(BranchName),

    #[error("cannot delete the active branch '{0}'")]
    DeleteActiveBranch(BranchName),

    #[error("not a vms repository (or any parent up to /): {0}")]
    NotInitialized(PathBuf),

    #[error("a vms repository already exists at {0}")]
    AlreadyInitialized(PathBuf),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Type(#[from] TypeError),
}

impl StoreError {
    /// Whether this error means on-disk data can no longer be trusted.
    pub fn is_integrity_violation(&self) -> bool {
        matches!(self, StoreError::Integrity { .. })
    }
}

/// An open repository.
#[derive(Debug, Clone)]
pub struct Repository {
    paths: RepoPaths,
    config: Config,
}

impl Repository {
    /// Create a repository rooted at `root`.
    ///
    /// Returns the handle and the id of the sentinel commit every branch
    /// starts from.
    ///
    /// # Errors
    ///
    /// - [`StoreError::AlreadyInitialized`] if `root` or any ancestor already
    ///   holds a repository
    pub fn init(root: &Path) -> Result<(Self, ObjectId), StoreError> {
        if let Some(existing) = RepoPaths::discover(root) {
            return Err(StoreError::AlreadyInitialized(existing.root));
        }

        let paths = RepoPaths::new(root.to_path_buf());
        let global = Config::load(None)?;
        let default_branch = global.default_branch();

        fs::make_dir(&paths.objects_dir())?;
        fs::make_dir(&paths.branches_dir())?;
        fs::make_dir(&paths.cache_dir())?;

        let repo_config = global.initial_repo_config(&default_branch);
        Config::write_repo(&paths.config_path(), &repo_config)?;
        let config = Config::load(Some(&paths.config_path()))?;

        let repo = Self { paths, config };
        repo.index().save(&StagedChanges::default())?;
        repo.log().save(&[])?;

        let sentinel = Commit::sentinel();
        let objects = repo.objects();
        let id = objects.put_commit(&sentinel)?;
        objects.promote(&id)?;

        let refs = repo.refs();
        refs.create_branch(&default_branch, &id)?;
        refs.switch_head(&default_branch)?;

        info!(root = %repo.paths.root.display(), branch = %default_branch, "initialized repository");
        Ok((repo, id))
    }

    /// Open the repository containing `start`.
    ///
    /// # Errors
    ///
    /// - [`StoreError::NotInitialized`] if no `.vms` directory is found at
    ///   or above `start`
    pub fn open(start: &Path) -> Result<Self, StoreError> {
        let paths = RepoPaths::discover(start)
            .ok_or_else(|| StoreError::NotInitialized(start.to_path_buf()))?;
        let config = Config::load(Some(&paths.config_path()))?;
        debug!(root = %paths.root.display(), "opened repository");
        Ok(Self { paths, config })
    }

    pub fn paths(&self) -> &RepoPaths {
        &self.paths
    }

    pub fn root(&self) -> &Path {
        &self.paths.root
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The branch that can never be deleted.
    pub fn default_branch(&self) -> BranchName {
        self.config.default_branch()
    }

    pub fn objects(&self) -> ObjectStore<'_> {
        ObjectStore::new(
            &self.paths,
            self.config.shard_prefix_len(),
            self.config.compression_level(),
        )
    }

    pub fn index(&self) -> Index<'_> {
        Index::new(&self.paths)
    }

    pub fn refs(&self) -> Refs<'_> {
        Refs::new(&self.paths, self.default_branch())
    }

    pub fn log(&self) -> CommitLog<'_> {
        CommitLog::new(&self.paths)
    }

    /// Whether `path` lies inside the repository's internal directory.
    pub fn is_managed_path(&self, path: &Path) -> bool {
        self.paths.is_managed_path(path)
    }

    /// The active branch, its tip id, and the tip commit.
    pub fn head(&self) -> Result<(BranchName, ObjectId, Commit), StoreError> {
        let refs = self.refs();
        let branch = refs.current_branch()?;
        let tip = refs.branch_tip(&branch)?;
        let commit = self.objects().get_commit(&tip)?;
        Ok((branch, tip, commit))
    }

    /// Take the exclusive repository lock when the config enables it.
    pub fn lock(&self) -> Result<Option<RepoLock>, LockError> {
        if !self.config.lock_enabled() {
            return Ok(None);
        }
        RepoLock::acquire(&self.paths).map(Some)
    }
}
