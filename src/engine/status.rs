//! engine::status
//!
//! Staged, unstaged, and untracked changes.
//!
//! Staged changes compare the prospective tree (parent tree with the index
//! applied) against the parent tree. Unstaged changes compare the working
//! files against the prospective tree.

use super::EngineError;
use crate::core::hash::hash_bytes;
use crate::core::paths::REPO_DIR_NAME;
use crate::core::status::FileStatus;
use crate::core::types::BranchName;
use crate::repo::fs;
use crate::repo::Repository;

/// How a tracked working file differs from what the next commit would record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnstagedChange {
    Modified,
    Deleted,
}

impl std::fmt::Display for UnstagedChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnstagedChange::Modified => f.write_str("modified"),
            UnstagedChange::Deleted => f.write_str("deleted"),
        }
    }
}

/// Snapshot of the repository state for `status`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub branch: BranchName,
    pub branches: Vec<BranchName>,
    /// Staged paths classified as new, modified, or deleted.
    pub staged: Vec<(String, FileStatus)>,
    pub unstaged: Vec<(String, UnstagedChange)>,
    pub untracked: Vec<String>,
}

impl StatusReport {
    pub fn is_clean(&self) -> bool {
        self.staged.is_empty() && self.unstaged.is_empty() && self.untracked.is_empty()
    }
}

/// Compute the repository status.
pub fn status(repo: &Repository) -> Result<StatusReport, EngineError> {
    let (branch, _, head) = repo.head()?;
    let branches = repo.refs().list_branches()?.into_iter().collect();
    let staged_changes = repo.index().load()?;
    let prospective = staged_changes.apply_to(head.tree());

    let staged = staged_changes
        .iter()
        .map(|(path, _)| (path.to_string(), FileStatus::of(path, &prospective, head.tree())))
        .filter(|(_, status)| matches!(status, FileStatus::New | FileStatus::Modified | FileStatus::Deleted))
        .collect();

    let mut unstaged = Vec::new();
    for (path, id) in prospective.iter() {
        let work = repo.paths().work_path(path);
        match fs::stat(&work)? {
            Some(fs::EntryKind::File) => {
                if &hash_bytes(&fs::read_file(&work)?) != id {
                    unstaged.push((path.to_string(), UnstagedChange::Modified));
                }
            }
            _ => unstaged.push((path.to_string(), UnstagedChange::Deleted)),
        }
    }

    let untracked = fs::list_files_recursive(repo.root(), &[REPO_DIR_NAME])?
        .into_iter()
        .filter(|path| !prospective.contains(path))
        .collect();

    Ok(StatusReport {
        branch,
        branches,
        staged,
        unstaged,
        untracked,
    })
}
