//! engine::merge
//!
//! Merge another branch into the active branch.
//!
//! # Algorithm
//!
//! 1. Find the split point of the two tips ([`CommitGraph::split_point`])
//! 2. Split point is the source tip: nothing to merge
//! 3. Split point is the target tip: fast-forward the target to the source
//! 4. Otherwise classify every path of the three trees with
//!    [`FileStatus`] against the split tree and apply a [`Resolution`]
//!
//! A three-way merge always produces a commit with both tips as parents.
//! Conflicting files are committed with conflict markers in them and
//! reported so they can be resolved in a follow-up commit.
//!
//! # Conflict format
//!
//! ```text
//! <<<<<<< <target branch>
//! <target content>
//! =======
//! <source content>
//! >>>>>>> <source branch>
//! ```

use std::collections::BTreeSet;

use tracing::{debug, info, warn};

use super::commit::write_commit;
use super::{existing_branch, Confirm, EngineError};
use crate::core::graph::CommitGraph;
use crate::core::object::{Commit, Tree};
use crate::core::status::FileStatus;
use crate::core::types::{BranchName, ObjectId, Timestamp};
use crate::repo::fs;
use crate::repo::{IndexEntry, Repository, StagedChanges};

/// Result of a merge attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The source tip is already an ancestor of the target.
    AlreadyMerged { source: BranchName, target: BranchName },
    Declined,
    FastForward {
        source: BranchName,
        target: BranchName,
        tip: ObjectId,
        updated: Vec<String>,
        removed: Vec<String>,
    },
    Merged {
        source: BranchName,
        target: BranchName,
        id: ObjectId,
        split: ObjectId,
        taken: Vec<String>,
        deleted: Vec<String>,
        conflicts: Vec<String>,
    },
}

/// What a three-way merge does with one path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Leave the target's version (or absence) as it is.
    KeepTarget,
    /// Check out and stage the source's version.
    TakeSource,
    /// Remove the file and stage its deletion.
    Delete,
    /// Both sides changed the path differently.
    Conflict,
}

impl Resolution {
    /// Decide a path from its status on each side relative to the split tree.
    ///
    /// `same_content` tells whether both sides now hold the same blob; it
    /// only matters when both sides added or both modified the path.
    ///
    /// # Example
    ///
    /// ```
    /// use vms::core::status::FileStatus;
    /// use vms::engine::Resolution;
    ///
    /// let r = Resolution::decide(FileStatus::Modified, FileStatus::Unmodified, false);
    /// assert_eq!(r, Resolution::TakeSource);
    ///
    /// let r = Resolution::decide(FileStatus::Modified, FileStatus::Modified, false);
    /// assert_eq!(r, Resolution::Conflict);
    /// ```
    pub fn decide(source: FileStatus, target: FileStatus, same_content: bool) -> Self {
        use crate::core::status::FileStatus::*;

        match (source, target) {
            (New, NotFound) | (Modified, Deleted) | (Modified, Unmodified) => Resolution::TakeSource,
            (NotFound, New) | (Deleted, Modified) | (Unmodified, Modified) => Resolution::KeepTarget,
            (Deleted, Unmodified) => Resolution::Delete,
            (Unmodified, Deleted) | (Deleted, Deleted) | (Unmodified, Unmodified) => {
                Resolution::KeepTarget
            }
            (Modified, Modified) | (New, New) if same_content => Resolution::KeepTarget,
            (Modified, Modified) | (New, New) => Resolution::Conflict,
            // Remaining pairs cannot arise from one split tree.
            _ => Resolution::KeepTarget,
        }
    }
}

/// Merge branch `source` into the active branch.
///
/// # Errors
///
/// - [`EngineError::MergeWithSelf`] when `source` is the active branch
/// - [`EngineError::DirtyIndex`] when changes are staged
pub fn merge(repo: &Repository, source: &str, confirm: &mut dyn Confirm) -> Result<MergeOutcome, EngineError> {
    let _lock = repo.lock()?;
    let source = existing_branch(repo, source)?;
    let refs = repo.refs();
    let target = refs.current_branch()?;
    if source == target {
        return Err(EngineError::MergeWithSelf);
    }
    if !repo.index().load()?.is_empty() {
        return Err(EngineError::DirtyIndex);
    }

    let source_tip = refs.branch_tip(&source)?;
    let target_tip = refs.branch_tip(&target)?;

    let objects = repo.objects();
    let mut graph = CommitGraph::new(&objects);
    let split = graph
        .split_point(&target_tip, &source_tip)?
        .ok_or_else(|| EngineError::NoCommonAncestor(target.clone(), source.clone()))?;
    debug!(%source, %target, %split, "merge base");

    if split == source_tip {
        return Ok(MergeOutcome::AlreadyMerged { source, target });
    }

    let message = format!(
        "Merge '{}' into '{}'? Working files may be overwritten.",
        source, target
    );
    if !confirm.confirm(&message) {
        return Ok(MergeOutcome::Declined);
    }

    let source_commit = graph.commit(&source_tip)?.clone();
    let target_commit = graph.commit(&target_tip)?.clone();

    if split == target_tip {
        return fast_forward(repo, source, target, source_tip, &source_commit, &target_commit);
    }

    let split_commit = graph.commit(&split)?.clone();
    three_way(
        repo,
        Sides {
            source,
            target,
            source_tip,
            target_tip,
            split,
        },
        source_commit.tree(),
        target_commit.tree(),
        split_commit.tree(),
    )
}

fn fast_forward(
    repo: &Repository,
    source: BranchName,
    target: BranchName,
    source_tip: ObjectId,
    source_commit: &Commit,
    target_commit: &Commit,
) -> Result<MergeOutcome, EngineError> {
    let source_tree = source_commit.tree();
    let target_tree = target_commit.tree();
    let objects = repo.objects();

    let mut writes = Vec::new();
    for (path, id) in source_tree.iter() {
        if FileStatus::of(path, source_tree, target_tree).introduces_content() {
            writes.push((path.to_string(), objects.get_blob(id)?.into_content()));
        }
    }
    let removed: Vec<String> = target_tree
        .paths()
        .filter(|path| !source_tree.contains(path))
        .map(str::to_string)
        .collect();

    for (path, content) in &writes {
        fs::write_work_file(&repo.paths().work_path(path), content)?;
    }
    for path in &removed {
        fs::remove_file(&repo.paths().work_path(path))?;
    }

    repo.refs().set_branch_tip(&target, &source_tip)?;
    repo.index().clear()?;

    info!(%source, %target, tip = %source_tip, "fast-forwarded");
    Ok(MergeOutcome::FastForward {
        source,
        target,
        tip: source_tip,
        updated: writes.into_iter().map(|(path, _)| path).collect(),
        removed,
    })
}

struct Sides {
    source: BranchName,
    target: BranchName,
    source_tip: ObjectId,
    target_tip: ObjectId,
    split: ObjectId,
}

/// A working-tree change planned by the three-way merge.
enum Action {
    Write { path: String, content: Vec<u8> },
    Remove { path: String },
}

fn three_way(
    repo: &Repository,
    sides: Sides,
    source_tree: &Tree,
    target_tree: &Tree,
    split_tree: &Tree,
) -> Result<MergeOutcome, EngineError> {
    let objects = repo.objects();

    let paths: BTreeSet<&str> = source_tree
        .paths()
        .chain(target_tree.paths())
        .chain(split_tree.paths())
        .collect();

    let mut staged = StagedChanges::default();
    let mut actions = Vec::new();
    let mut taken = Vec::new();
    let mut deleted = Vec::new();
    let mut conflicts = Vec::new();

    for path in paths {
        let given = FileStatus::of(path, source_tree, split_tree);
        let current = FileStatus::of(path, target_tree, split_tree);
        let same = source_tree.get(path) == target_tree.get(path);

        match Resolution::decide(given, current, same) {
            Resolution::KeepTarget => {}
            Resolution::TakeSource => {
                let Some(id) = source_tree.get(path) else { continue };
                let content = objects.get_blob(id)?.into_content();
                staged.insert(path, IndexEntry::Tracked(id.clone()));
                actions.push(Action::Write {
                    path: path.to_string(),
                    content,
                });
                taken.push(path.to_string());
            }
            Resolution::Delete => {
                staged.insert(path, IndexEntry::MarkedForDeletion);
                actions.push(Action::Remove {
                    path: path.to_string(),
                });
                deleted.push(path.to_string());
            }
            Resolution::Conflict => {
                let ours = load_side(repo, target_tree, path)?;
                let theirs = load_side(repo, source_tree, path)?;
                let content = conflict_content(&sides.target, &ours, &sides.source, &theirs);
                let id = objects.put_blob(&content)?;
                staged.insert(path, IndexEntry::Tracked(id));
                actions.push(Action::Write {
                    path: path.to_string(),
                    content,
                });
                warn!(%path, "merge conflict");
                conflicts.push(path.to_string());
            }
        }
    }

    for action in &actions {
        match action {
            Action::Write { path, content } => {
                fs::write_work_file(&repo.paths().work_path(path), content)?
            }
            Action::Remove { path } => fs::remove_file(&repo.paths().work_path(path))?,
        }
    }
    repo.index().save(&staged)?;

    let commit = Commit::new(
        Timestamp::now(),
        format!("Merged {} into {}.", sides.source, sides.target),
        Some(sides.target_tip.clone()),
        Some(sides.source_tip.clone()),
        staged.apply_to(target_tree),
    );
    let id = write_commit(repo, &sides.target, &commit, &staged.blob_ids())?;

    info!(
        source = %sides.source,
        target = %sides.target,
        %id,
        conflicts = conflicts.len(),
        "merged"
    );
    Ok(MergeOutcome::Merged {
        source: sides.source,
        target: sides.target,
        id,
        split: sides.split,
        taken,
        deleted,
        conflicts,
    })
}

fn load_side(repo: &Repository, tree: &Tree, path: &str) -> Result<Vec<u8>, EngineError> {
    match tree.get(path) {
        Some(id) => Ok(repo.objects().get_blob(id)?.into_content()),
        None => Ok(Vec::new()),
    }
}

/// Join both versions of a file between conflict markers.
pub fn conflict_content(target: &BranchName, ours: &[u8], source: &BranchName, theirs: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(ours.len() + theirs.len() + 64);
    out.extend_from_slice(format!("<<<<<<< {}\n", target).as_bytes());
    push_section(&mut out, ours);
    out.extend_from_slice(b"=======\n");
    push_section(&mut out, theirs);
    out.extend_from_slice(format!(">>>>>>> {}\n", source).as_bytes());
    out
}

fn push_section(out: &mut Vec<u8>, content: &[u8]) {
    out.extend_from_slice(content);
    if !content.is_empty() && !content.ends_with(b"\n") {
        out.push(b'\n');
    }
}
