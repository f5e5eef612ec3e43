//! engine::inspect
//!
//! Read-only views: the commit log and commit/file info.

use std::path::Path;

use super::{resolve_commit, EngineError};
use crate::core::object::Commit;
use crate::core::types::ObjectId;
use crate::repo::{LogEntry, Repository};

/// What `info` shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InfoReport {
    /// Commit metadata and its tracked files.
    Commit { id: ObjectId, commit: Commit },
    /// Content of one file as of a commit.
    File {
        commit: ObjectId,
        path: String,
        content: Vec<u8>,
    },
}

/// The commit log, newest first.
pub fn log(repo: &Repository) -> Result<Vec<LogEntry>, EngineError> {
    Ok(repo.log().entries_newest_first()?)
}

/// Describe a commit, or one file in it when `path` is given.
pub fn info(
    repo: &Repository,
    cwd: &Path,
    reference: &str,
    path: Option<&Path>,
) -> Result<InfoReport, EngineError> {
    let (id, commit) = resolve_commit(repo, reference)?;

    let Some(path) = path else {
        return Ok(InfoReport::Commit { id, commit });
    };

    let rel = repo.paths().tracked_path(cwd, path)?;
    let blob = commit
        .tree()
        .get(&rel)
        .ok_or_else(|| EngineError::PathNotInCommit {
            path: rel.clone(),
            commit: id.clone(),
        })?;
    let content = repo.objects().get_blob(blob)?.into_content();

    Ok(InfoReport::File {
        commit: id,
        path: rel,
        content,
    })
}
