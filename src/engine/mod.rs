//! engine
//!
//! Orchestrates repository commands.
//!
//! # Architecture
//!
//! Each command is a function taking an open [`Repository`] and returning a
//! typed outcome. The engine never prints; the CLI layer formats outcomes.
//!
//! Commands that overwrite working files consult a [`Confirm`]
//! collaborator first and report a declined outcome instead of failing.
//!
//! Mutating commands hold the repository lock (when enabled) for their
//! whole duration and order their writes so that a branch pointer only ever
//! moves after every object it references is stored.
//!
//! # Modules
//!
//! - [`stage`] - Stage and unstage working files
//! - [`commit`] - Record staged changes as a commit
//! - [`status`] - Staged, unstaged, and untracked changes
//! - [`checkout`] - Switch branches and restore files
//! - [`branch`] - Create and delete branches
//! - [`inspect`] - Commit log and commit/file info
//! - [`merge`] - Fast-forward and three-way merges

pub mod branch;
pub mod checkout;
pub mod commit;
pub mod inspect;
pub mod merge;
pub mod stage;
pub mod status;

pub use branch::{mkbranch, rmbranch};
pub use checkout::{checkout_branch, checkout_files, CheckoutOutcome, RestoreOutcome};
pub use commit::{commit, CommitOutcome};
pub use inspect::{info, log, InfoReport};
pub use merge::{merge, MergeOutcome, Resolution};
pub use stage::{stage, unstage, StageReport};
pub use status::{status, StatusReport, UnstagedChange};

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::object::Commit;
use crate::core::ops::LockError;
use crate::core::paths::PathError;
use crate::core::types::{BranchName, ObjectId, TypeError};
use crate::repo::{ObjectKind, Repository, StoreError};

/// Execution context for commands.
///
/// Contains global settings derived from CLI flags that affect command behavior.
#[derive(Debug, Clone)]
pub struct Context {
    /// Working directory override.
    pub cwd: Option<PathBuf>,
    /// Debug logging enabled.
    pub debug: bool,
    /// Quiet mode (minimal output).
    pub quiet: bool,
    /// Interactive prompts enabled.
    pub interactive: bool,
    /// Answer every confirmation with yes.
    pub assume_yes: bool,
}

impl Default for Context {
    fn default() -> Self {
        Self {
            cwd: None,
            debug: false,
            quiet: false,
            interactive: true,
            assume_yes: false,
        }
    }
}

impl Context {
    /// The directory commands run in, always absolute.
    pub fn working_dir(&self) -> Result<PathBuf, EngineError> {
        match &self.cwd {
            Some(dir) if dir.is_absolute() => Ok(dir.clone()),
            Some(dir) => Ok(std::env::current_dir()
                .map_err(EngineError::WorkingDir)?
                .join(dir)),
            None => std::env::current_dir().map_err(EngineError::WorkingDir),
        }
    }
}

/// Errors from engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Lock(#[from] LockError),

    #[error(transparent)]
    Path(#[from] PathError),

    #[error(transparent)]
    Type(#[from] TypeError),

    #[error("cannot determine working directory: {0}")]
    WorkingDir(std::io::Error),

    /// A path given to `stage` is neither a file, a directory, nor tracked.
    #[error("pathspec '{0}' did not match any file")]
    NoSuchPath(PathBuf),

    #[error("'{0}' is not staged")]
    NotStaged(String),

    #[error("'{path}' is not tracked in commit {commit}")]
    PathNotInCommit { path: String, commit: ObjectId },

    #[error("{id} is a {kind}, not a commit")]
    NotACommit { id: ObjectId, kind: ObjectKind },

    #[error("please enter a commit message")]
    EmptyMessage,

    #[error("cannot merge a branch with itself")]
    MergeWithSelf,

    #[error("you have staged changes; commit or unstage them before merging")]
    DirtyIndex,

    #[error("branches '{0}' and '{1}' share no history")]
    NoCommonAncestor(BranchName, BranchName),
}

impl EngineError {
    /// Whether this error means on-disk data can no longer be trusted.
    pub fn is_integrity_violation(&self) -> bool {
        matches!(self, EngineError::Store(e) if e.is_integrity_violation())
    }
}

/// A yes/no question asked before destructive overwrites.
pub trait Confirm {
    fn confirm(&mut self, message: &str) -> bool;
}

/// Answers yes to everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysConfirm;

impl Confirm for AlwaysConfirm {
    fn confirm(&mut self, _message: &str) -> bool {
        true
    }
}

/// Answers no to everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NeverConfirm;

impl Confirm for NeverConfirm {
    fn confirm(&mut self, _message: &str) -> bool {
        false
    }
}

/// Create a repository in `dir`.
pub fn init(dir: &Path) -> Result<(Repository, ObjectId), EngineError> {
    Ok(Repository::init(dir)?)
}

/// Open the repository containing the context's working directory.
pub fn open(ctx: &Context) -> Result<Repository, EngineError> {
    Ok(Repository::open(&ctx.working_dir()?)?)
}

/// Expand a possibly abbreviated commit id and load the commit.
pub(crate) fn resolve_commit(
    repo: &Repository,
    reference: &str,
) -> Result<(ObjectId, Commit), EngineError> {
    let objects = repo.objects();
    let id = objects.resolve_short_id(reference)?;
    match objects.get_commit(&id) {
        Ok(commit) => Ok((id, commit)),
        Err(StoreError::WrongKind { id, found, .. }) => Err(EngineError::NotACommit { id, kind: found }),
        Err(e) => Err(e.into()),
    }
}

/// Parse a branch name and check that it exists.
pub(crate) fn existing_branch(repo: &Repository, name: &str) -> Result<BranchName, EngineError> {
    let branch = BranchName::new(name)?;
    if !repo.refs().exists(&branch)? {
        return Err(StoreError::BranchNotFound(branch).into());
    }
    Ok(branch)
}

#[cfg(test)]
mod tests {
    use super::*;

    mod context {
        use super::*;

        #[test]
        fn default_values() {
            let ctx = Context::default();
            assert!(ctx.cwd.is_none());
            assert!(!ctx.debug);
            assert!(!ctx.quiet);
            assert!(ctx.interactive);
            assert!(!ctx.assume_yes);
        }

        #[test]
        fn cwd_override_wins() {
            let ctx = Context {
                cwd: Some(PathBuf::from("/custom")),
                ..Default::default()
            };
            assert_eq!(ctx.working_dir().unwrap(), PathBuf::from("/custom"));
        }
    }

    mod engine_error {
        use super::*;
        use crate::core::hash::hash_bytes;

        #[test]
        fn integrity_is_detected_through_wrapping() {
            let err = EngineError::from(StoreError::Integrity {
                expected: hash_bytes(b"a"),
                actual: hash_bytes(b"b"),
            });
            assert!(err.is_integrity_violation());
            assert!(!EngineError::DirtyIndex.is_integrity_violation());
        }

        #[test]
        fn display_formatting() {
            let err = EngineError::NotStaged("a.txt".into());
            assert_eq!(err.to_string(), "'a.txt' is not staged");
        }
    }

    mod resolve {
        use super::*;
        use tempfile::TempDir;

        #[test]
        fn short_sentinel_id_resolves() {
            let temp = TempDir::new().expect("create temp dir");
            let (repo, sentinel) = init(temp.path()).expect("init");
            let (id, commit) = resolve_commit(&repo, sentinel.short(8)).expect("resolve");
            assert_eq!(id, sentinel);
            assert_eq!(commit.message(), Commit::SENTINEL_MESSAGE);
        }

        #[test]
        fn blob_id_is_not_a_commit() {
            let temp = TempDir::new().expect("create temp dir");
            let (repo, _) = init(temp.path()).expect("init");
            let objects = repo.objects();
            let blob = objects.put_blob(b"data").unwrap();
            objects.promote(&blob).unwrap();

            assert!(matches!(
                resolve_commit(&repo, blob.as_str()),
                Err(EngineError::NotACommit { kind: ObjectKind::Blob, .. })
            ));
        }

        #[test]
        fn unknown_branch() {
            let temp = TempDir::new().expect("create temp dir");
            let (repo, _) = init(temp.path()).expect("init");
            assert!(matches!(
                existing_branch(&repo, "nope"),
                Err(EngineError::Store(StoreError::BranchNotFound(_)))
            ));
        }
    }
}
