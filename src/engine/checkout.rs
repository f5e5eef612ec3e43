//! engine::checkout
//!
//! Switch branches and restore files from a commit.
//!
//! Both operations load and verify every blob they will write before the
//! first working file changes, so an integrity failure leaves the working
//! tree untouched.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::{existing_branch, resolve_commit, Confirm, EngineError};
use crate::core::hash::hash_bytes;
use crate::core::object::Tree;
use crate::core::types::{BranchName, ObjectId};
use crate::repo::fs;
use crate::repo::{IndexUpdate, Repository};

/// Result of `checkout branch`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutOutcome {
    AlreadyActive(BranchName),
    Declined,
    Switched {
        branch: BranchName,
        written: usize,
        removed: usize,
    },
}

/// Result of `checkout files`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreOutcome {
    Declined,
    Restored { commit: ObjectId, paths: Vec<String> },
}

/// Make `name` the active branch and replace the working tree with its tip.
///
/// Asks for confirmation when staged changes would be discarded, or when a
/// working file with uncommitted edits or an untracked working file would
/// be overwritten or removed.
pub fn checkout_branch(
    repo: &Repository,
    name: &str,
    confirm: &mut dyn Confirm,
) -> Result<CheckoutOutcome, EngineError> {
    let _lock = repo.lock()?;
    let target = existing_branch(repo, name)?;
    let (current, _, head) = repo.head()?;
    if target == current {
        return Ok(CheckoutOutcome::AlreadyActive(target));
    }

    let tip = repo.refs().branch_tip(&target)?;
    let commit = repo.objects().get_commit(&tip)?;
    let tree = commit.tree();

    let staged = repo.index().load()?;
    let clobbered = untracked_overwrites(repo, head.tree(), tree)?;
    let edited = dirty_tracked(repo, head.tree(), tree)?;

    if !staged.is_empty() || !clobbered.is_empty() || !edited.is_empty() {
        let mut message = format!("Switch to '{}'?", target);
        if !staged.is_empty() {
            message.push_str(&format!(" {} staged change(s) will be discarded.", staged.len()));
        }
        if !edited.is_empty() {
            message.push_str(&format!(
                " Uncommitted edits to {} file(s) will be lost: {}.",
                edited.len(),
                edited.join(", ")
            ));
        }
        if !clobbered.is_empty() {
            message.push_str(&format!(
                " {} untracked file(s) will be overwritten: {}.",
                clobbered.len(),
                clobbered.join(", ")
            ));
        }
        if !confirm.confirm(&message) {
            return Ok(CheckoutOutcome::Declined);
        }
    }

    let contents = load_blobs(repo, tree, tree.paths())?;
    for (path, content) in &contents {
        fs::write_work_file(&repo.paths().work_path(path), content)?;
    }

    let mut removed = 0;
    for path in head.tree().paths().filter(|p| !tree.contains(p)) {
        fs::remove_file(&repo.paths().work_path(path))?;
        removed += 1;
    }

    repo.index().clear()?;
    repo.refs().switch_head(&target)?;
    info!(branch = %target, written = contents.len(), removed, "checked out branch");

    Ok(CheckoutOutcome::Switched {
        branch: target,
        written: contents.len(),
        removed,
    })
}

/// Restore working files from a commit.
///
/// An empty `paths` selects every file of the commit. Restored paths are
/// dropped from the index.
pub fn checkout_files(
    repo: &Repository,
    cwd: &Path,
    reference: &str,
    paths: &[PathBuf],
    confirm: &mut dyn Confirm,
) -> Result<RestoreOutcome, EngineError> {
    let _lock = repo.lock()?;
    let (id, commit) = resolve_commit(repo, reference)?;
    let tree = commit.tree();

    let selected: Vec<String> = if paths.is_empty() {
        tree.paths().map(str::to_string).collect()
    } else {
        let mut selected = Vec::with_capacity(paths.len());
        for input in paths {
            let rel = repo.paths().tracked_path(cwd, input)?;
            if !tree.contains(&rel) {
                return Err(EngineError::PathNotInCommit {
                    path: rel,
                    commit: id,
                });
            }
            selected.push(rel);
        }
        selected
    };

    let contents = load_blobs(repo, tree, selected.iter().map(String::as_str))?;

    let mut overwritten = 0;
    for (path, content) in &contents {
        if differs_on_disk(repo, path, content)? {
            overwritten += 1;
        }
    }
    if overwritten > 0 {
        let message = format!(
            "Overwrite {} working file(s) with their versions from {}?",
            overwritten,
            id.short(8)
        );
        if !confirm.confirm(&message) {
            return Ok(RestoreOutcome::Declined);
        }
    }

    for (path, content) in &contents {
        fs::write_work_file(&repo.paths().work_path(path), content)?;
    }

    repo.index()
        .update(selected.iter().cloned().map(IndexUpdate::Unstage))?;

    debug!(commit = %id, files = selected.len(), "restored files");
    Ok(RestoreOutcome::Restored {
        commit: id,
        paths: selected,
    })
}

/// Working files untracked by `current` that `target` would overwrite with
/// different content.
fn untracked_overwrites(repo: &Repository, current: &Tree, target: &Tree) -> Result<Vec<String>, EngineError> {
    let mut clobbered = Vec::new();
    for (path, id) in target.iter() {
        if current.contains(path) {
            continue;
        }
        let work = repo.paths().work_path(path);
        if let Some(fs::EntryKind::File) = fs::stat(&work)? {
            if &hash_bytes(&fs::read_file(&work)?) != id {
                clobbered.push(path.to_string());
            }
        }
    }
    Ok(clobbered)
}

/// Working files tracked by `current` whose edits the switch to `target`
/// would overwrite or remove.
fn dirty_tracked(repo: &Repository, current: &Tree, target: &Tree) -> Result<Vec<String>, EngineError> {
    let mut edited = Vec::new();
    for (path, id) in current.iter() {
        let work = repo.paths().work_path(path);
        if let Some(fs::EntryKind::File) = fs::stat(&work)? {
            let on_disk = hash_bytes(&fs::read_file(&work)?);
            if &on_disk != id && target.get(path) != Some(&on_disk) {
                edited.push(path.to_string());
            }
        }
    }
    Ok(edited)
}

fn differs_on_disk(repo: &Repository, path: &str, content: &[u8]) -> Result<bool, EngineError> {
    let work = repo.paths().work_path(path);
    match fs::stat(&work)? {
        Some(fs::EntryKind::File) => Ok(fs::read_file(&work)? != content),
        _ => Ok(false),
    }
}

/// Load and verify the blobs for `paths` of `tree`.
fn load_blobs<'t>(
    repo: &Repository,
    tree: &Tree,
    paths: impl Iterator<Item = &'t str>,
) -> Result<Vec<(String, Vec<u8>)>, EngineError> {
    let objects = repo.objects();
    let mut contents = Vec::new();
    for path in paths {
        if let Some(id) = tree.get(path) {
            contents.push((path.to_string(), objects.get_blob(id)?.into_content()));
        }
    }
    Ok(contents)
}
