//! engine::commit
//!
//! Record the staged changes as a new commit on the active branch.
//!
//! # Write order
//!
//! 1. Promote staged blobs into the permanent store
//! 2. Store the commit object
//! 3. Advance the branch pointer
//! 4. Push the log entry
//! 5. Clear the index and the cache
//!
//! A failure before step 3 leaves only orphaned objects behind.

use tracing::info;

use super::EngineError;
use crate::core::object::Commit;
use crate::core::status::has_relative_changes;
use crate::core::types::{BranchName, ObjectId};
use crate::repo::{LogEntry, Repository};

/// Result of a commit attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    Committed {
        id: ObjectId,
        branch: BranchName,
        parent: ObjectId,
    },
    /// The staged changes do not alter the current tree.
    NothingToCommit,
}

/// Commit the index to the active branch.
pub fn commit(repo: &Repository, message: &str) -> Result<CommitOutcome, EngineError> {
    if message.trim().is_empty() {
        return Err(EngineError::EmptyMessage);
    }

    let _lock = repo.lock()?;
    let (branch, parent_id, parent) = repo.head()?;
    let staged = repo.index().load()?;

    let tree = staged.apply_to(parent.tree());
    if !has_relative_changes(&tree, parent.tree()) && !has_relative_changes(parent.tree(), &tree) {
        return Ok(CommitOutcome::NothingToCommit);
    }

    let commit = Commit::child_of(&parent_id, message, tree);
    let id = write_commit(repo, &branch, &commit, &staged.blob_ids())?;

    info!(%branch, %id, "committed");
    Ok(CommitOutcome::Committed {
        id,
        branch,
        parent: parent_id,
    })
}

/// Store `commit` and its blobs, then move `branch` to it.
///
/// Shared by plain commits and merge commits.
pub(crate) fn write_commit(
    repo: &Repository,
    branch: &BranchName,
    commit: &Commit,
    blobs: &[ObjectId],
) -> Result<ObjectId, EngineError> {
    let objects = repo.objects();
    for blob in blobs {
        objects.promote(blob)?;
    }
    let id = objects.put_commit(commit)?;
    objects.promote(&id)?;

    repo.refs().set_branch_tip(branch, &id)?;
    repo.log().push(LogEntry::from_commit(id.clone(), commit))?;
    repo.index().clear()?;
    objects.clear_cache()?;
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::stage::stage;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn setup() -> (TempDir, Repository) {
        let temp = TempDir::new().expect("create temp dir");
        let (repo, _) = Repository::init(temp.path()).expect("init");
        (temp, repo)
    }

    fn stage_file(repo: &Repository, path: &str, content: &str) {
        std::fs::write(repo.paths().work_path(path), content).unwrap();
        stage(repo, repo.root(), &[PathBuf::from(path)]).unwrap();
    }

    #[test]
    fn empty_index_is_nothing_to_commit() {
        let (_temp, repo) = setup();
        assert_eq!(commit(&repo, "noop").unwrap(), CommitOutcome::NothingToCommit);
    }

    #[test]
    fn blank_message_is_rejected() {
        let (_temp, repo) = setup();
        assert!(matches!(commit(&repo, "  "), Err(EngineError::EmptyMessage)));
    }

    #[test]
    fn commit_advances_branch_and_clears_state() {
        let (_temp, repo) = setup();
        let (_, sentinel, _) = repo.head().unwrap();
        stage_file(&repo, "a.txt", "hello");

        let CommitOutcome::Committed { id, branch, parent } = commit(&repo, "first").unwrap() else {
            panic!("expected a commit");
        };
        assert_eq!(parent, sentinel);
        assert_eq!(repo.refs().branch_tip(&branch).unwrap(), id);
        assert!(repo.index().load().unwrap().is_empty());
        assert_eq!(
            crate::repo::fs::list_entries(&repo.paths().cache_dir()).names().unwrap().count(),
            0
        );

        let stored = repo.objects().get_commit(&id).unwrap();
        assert_eq!(stored.message(), "first");
        let blob = stored.tree().get("a.txt").unwrap();
        assert_eq!(repo.objects().get_blob(blob).unwrap().content(), b"hello");

        let log = repo.log().entries_newest_first().unwrap();
        assert_eq!(log[0].id, id);
    }

    #[test]
    fn deletion_removes_path_from_tree() {
        let (_temp, repo) = setup();
        stage_file(&repo, "a.txt", "a");
        stage_file(&repo, "b.txt", "b");
        commit(&repo, "two files").unwrap();

        std::fs::remove_file(repo.paths().work_path("a.txt")).unwrap();
        stage(&repo, repo.root(), &[PathBuf::from("a.txt")]).unwrap();

        let CommitOutcome::Committed { id, .. } = commit(&repo, "drop a").unwrap() else {
            panic!("expected a commit");
        };
        let tree = repo.objects().get_commit(&id).unwrap().tree().clone();
        assert!(!tree.contains("a.txt"));
        assert!(tree.contains("b.txt"));
    }

    #[test]
    fn same_content_shared_between_commits() {
        let (_temp, repo) = setup();
        stage_file(&repo, "a.txt", "shared");
        commit(&repo, "one").unwrap();
        stage_file(&repo, "copy.txt", "shared");

        // Promoting an already permanent blob is tolerated.
        assert!(matches!(commit(&repo, "two").unwrap(), CommitOutcome::Committed { .. }));
    }
}
