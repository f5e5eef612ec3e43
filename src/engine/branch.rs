//! engine::branch
//!
//! Create and delete branches.

use tracing::info;

use super::{resolve_commit, EngineError};
use crate::core::types::{BranchName, ObjectId};
use crate::repo::Repository;

/// Create `name` at `at`, or at the active branch's tip when `at` is `None`.
pub fn mkbranch(repo: &Repository, name: &str, at: Option<&str>) -> Result<(BranchName, ObjectId), EngineError> {
    let _lock = repo.lock()?;
    let branch = BranchName::new(name)?;

    let tip = match at {
        Some(reference) => resolve_commit(repo, reference)?.0,
        None => {
            let refs = repo.refs();
            refs.branch_tip(&refs.current_branch()?)?
        }
    };

    repo.refs().create_branch(&branch, &tip)?;
    info!(%branch, %tip, "created branch");
    Ok((branch, tip))
}

/// Delete `name`. The default and the active branch are refused.
pub fn rmbranch(repo: &Repository, name: &str) -> Result<BranchName, EngineError> {
    let _lock = repo.lock()?;
    let branch = BranchName::new(name)?;
    repo.refs().delete_branch(&branch)?;
    info!(%branch, "deleted branch");
    Ok(branch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repo::StoreError;
    use tempfile::TempDir;

    fn setup() -> (TempDir, Repository) {
        let temp = TempDir::new().expect("create temp dir");
        let (repo, _) = Repository::init(temp.path()).expect("init");
        (temp, repo)
    }

    #[test]
    fn mkbranch_defaults_to_current_tip() {
        let (_temp, repo) = setup();
        let (_, tip, _) = repo.head().unwrap();
        let (branch, at) = mkbranch(&repo, "feature", None).unwrap();
        assert_eq!(at, tip);
        assert_eq!(repo.refs().branch_tip(&branch).unwrap(), tip);
    }

    #[test]
    fn mkbranch_at_abbreviated_commit() {
        let (_temp, repo) = setup();
        let (_, tip, _) = repo.head().unwrap();
        let (_, at) = mkbranch(&repo, "old", Some(tip.short(10))).unwrap();
        assert_eq!(at, tip);
    }

    #[test]
    fn mkbranch_rejects_bad_and_duplicate_names() {
        let (_temp, repo) = setup();
        assert!(matches!(mkbranch(&repo, "bad name", None), Err(EngineError::Type(_))));
        mkbranch(&repo, "dup", None).unwrap();
        assert!(matches!(
            mkbranch(&repo, "dup", None),
            Err(EngineError::Store(StoreError::BranchExists(_)))
        ));
    }

    #[test]
    fn rmbranch_protections() {
        let (_temp, repo) = setup();
        let default = repo.default_branch();
        assert!(matches!(
            rmbranch(&repo, default.as_str()),
            Err(EngineError::Store(StoreError::DeleteDefaultBranch(_)))
        ));

        mkbranch(&repo, "topic", None).unwrap();
        repo.refs().switch_head(&BranchName::new("topic").unwrap()).unwrap();
        assert!(matches!(
            rmbranch(&repo, "topic"),
            Err(EngineError::Store(StoreError::DeleteActiveBranch(_)))
        ));

        repo.refs().switch_head(&default).unwrap();
        assert_eq!(rmbranch(&repo, "topic").unwrap().as_str(), "topic");
    }
}
