//! repo::log
//!
//! The commit log stack.
//!
//! `<root>/.vms/log` is a JSON array of [`LogEntry`] records, oldest first.
//! Every commit and merge commit on any branch pushes one record.

use serde::{Deserialize, Serialize};

use super::fs;
use super::StoreError;
use crate::core::object::Commit;
use crate::core::paths::RepoPaths;
use crate::core::types::{ObjectId, Timestamp};

/// One commit as recorded in the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: ObjectId,
    pub timestamp: Timestamp,
    pub message: String,
    pub first_parent: Option<ObjectId>,
    pub second_parent: Option<ObjectId>,
}

impl LogEntry {
    pub fn from_commit(id: ObjectId, commit: &Commit) -> Self {
        Self {
            id,
            timestamp: commit.timestamp(),
            message: commit.message().to_string(),
            first_parent: commit.first_parent().cloned(),
            second_parent: commit.second_parent().cloned(),
        }
    }
}

/// Persisted log stack.
pub struct CommitLog<'a> {
    paths: &'a RepoPaths,
}

impl<'a> CommitLog<'a> {
    pub fn new(paths: &'a RepoPaths) -> Self {
        Self { paths }
    }

    /// All entries, oldest first. A missing log reads as empty.
    pub fn load(&self) -> Result<Vec<LogEntry>, StoreError> {
        let path = self.paths.log_path();
        if fs::stat(&path)?.is_none() {
            return Ok(Vec::new());
        }
        serde_json::from_slice(&fs::read_file(&path)?).map_err(|e| StoreError::Corrupt {
            what: "log".into(),
            message: e.to_string(),
        })
    }

    pub fn save(&self, entries: &[LogEntry]) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(entries).map_err(|e| StoreError::Corrupt {
            what: "log".into(),
            message: e.to_string(),
        })?;
        fs::write_file(&self.paths.log_path(), &bytes)
    }

    /// Push an entry on top of the stack.
    pub fn push(&self, entry: LogEntry) -> Result<(), StoreError> {
        let mut entries = self.load()?;
        entries.push(entry);
        self.save(&entries)
    }

    /// Entries newest first.
    pub fn entries_newest_first(&self) -> Result<Vec<LogEntry>, StoreError> {
        let mut entries = self.load()?;
        entries.reverse();
        Ok(entries)
    }
}
