//! repo::refs
//!
//! Branch tips and HEAD.
//!
//! # Storage
//!
//! - `<root>/.vms/HEAD` - Name of the active branch
//! - `<root>/.vms/branches/<name>` - Commit id the branch points to
//!
//! Branch names may contain `/`, in which case the branch file lives in a
//! nested directory.
//!
//! # Invariants
//!
//! - The default branch can never be deleted
//! - The active branch can never be deleted
//! - HEAD names a branch, never a commit

use std::collections::BTreeSet;

use tracing::debug;

use super::fs;
use super::StoreError;
use crate::core::paths::RepoPaths;
use crate::core::types::{BranchName, ObjectId};

/// Branch pointers and the active-branch selector.
pub struct Refs<'a> {
    paths: &'a RepoPaths,
    default_branch: BranchName,
}

impl<'a> Refs<'a> {
    pub fn new(paths: &'a RepoPaths, default_branch: BranchName) -> Self {
        Self {
            paths,
            default_branch,
        }
    }

    /// The protected branch.
    pub fn default_branch(&self) -> &BranchName {
        &self.default_branch
    }

    /// Name of the active branch.
    pub fn current_branch(&self) -> Result<BranchName, StoreError> {
        let raw = read_text(&self.paths.head_path())?;
        BranchName::new(raw.trim()).map_err(|e| StoreError::Corrupt {
            what: "HEAD".into(),
            message: e.to_string(),
        })
    }

    /// Point HEAD at `name`, which must exist.
    pub fn switch_head(&self, name: &BranchName) -> Result<(), StoreError> {
        if !self.exists(name)? {
            return Err(StoreError::BranchNotFound(name.clone()));
        }
        fs::write_file(&self.paths.head_path(), name.as_str().as_bytes())?;
        debug!(branch = %name, "switched HEAD");
        Ok(())
    }

    pub fn exists(&self, name: &BranchName) -> Result<bool, StoreError> {
        Ok(matches!(
            fs::stat(&self.paths.branch_path(name))?,
            Some(fs::EntryKind::File)
        ))
    }

    /// Commit id at the tip of `name`.
    pub fn branch_tip(&self, name: &BranchName) -> Result<ObjectId, StoreError> {
        if !self.exists(name)? {
            return Err(StoreError::BranchNotFound(name.clone()));
        }
        let raw = read_text(&self.paths.branch_path(name))?;
        ObjectId::new(raw.trim()).map_err(|e| StoreError::Corrupt {
            what: format!("branch '{}'", name),
            message: e.to_string(),
        })
    }

    /// Move an existing branch to `id`.
    pub fn set_branch_tip(&self, name: &BranchName, id: &ObjectId) -> Result<(), StoreError> {
        if !self.exists(name)? {
            return Err(StoreError::BranchNotFound(name.clone()));
        }
        self.write_tip(name, id)
    }

    /// Create a branch pointing at `at`.
    pub fn create_branch(&self, name: &BranchName, at: &ObjectId) -> Result<(), StoreError> {
        if fs::stat(&self.paths.branch_path(name))?.is_some() {
            return Err(StoreError::BranchExists(name.clone()));
        }
        self.write_tip(name, at)?;
        debug!(branch = %name, tip = %at, "created branch");
        Ok(())
    }

    /// Delete a branch.
    ///
    /// # Errors
    ///
    /// - [`StoreError::DeleteDefaultBranch`] for the protected branch
    /// - [`StoreError::DeleteActiveBranch`] for the branch HEAD names
    /// - [`StoreError::BranchNotFound`] if there is no such branch
    pub fn delete_branch(&self, name: &BranchName) -> Result<(), StoreError> {
        if name == &self.default_branch {
            return Err(StoreError::DeleteDefaultBranch(name.clone()));
        }
        if name == &self.current_branch()? {
            return Err(StoreError::DeleteActiveBranch(name.clone()));
        }
        if !self.exists(name)? {
            return Err(StoreError::BranchNotFound(name.clone()));
        }

        let path = self.paths.branch_path(name);
        fs::remove_file(&path)?;

        // Drop directories left empty by nested names.
        let branches_dir = self.paths.branches_dir();
        let mut dir = path.parent().map(|p| p.to_path_buf());
        while let Some(current) = dir {
            if current == branches_dir || !fs::remove_empty_dir(&current)? {
                break;
            }
            dir = current.parent().map(|p| p.to_path_buf());
        }

        debug!(branch = %name, "deleted branch");
        Ok(())
    }

    /// All branch names in ascending order.
    pub fn list_branches(&self) -> Result<BTreeSet<BranchName>, StoreError> {
        fs::list_files_recursive(&self.paths.branches_dir(), &[])?
            .into_iter()
            .map(|name| BranchName::new(name).map_err(StoreError::from))
            .collect()
    }

    fn write_tip(&self, name: &BranchName, id: &ObjectId) -> Result<(), StoreError> {
        fs::write_file(&self.paths.branch_path(name), id.as_str().as_bytes())
    }
}

fn read_text(path: &std::path::Path) -> Result<String, StoreError> {
    let bytes = fs::read_file(path)?;
    String::from_utf8(bytes).map_err(|e| StoreError::Corrupt {
        what: path.display().to_string(),
        message: e.to_string(),
    })
}
