//! repo::index
//!
//! The staging area.
//!
//! # Storage
//!
//! `<root>/.vms/index` holds one JSON object mapping each staged path to a
//! blob id, or to the string `"DELETED"` for a staged removal. The whole map
//! is loaded and rewritten on every mutation.
//!
//! # Example
//!
//! ```
//! use vms::core::hash::hash_bytes;
//! use vms::repo::{IndexEntry, StagedChanges};
//!
//! let mut staged = StagedChanges::default();
//! staged.insert("a.txt", IndexEntry::Tracked(hash_bytes(b"a")));
//! staged.insert("old.txt", IndexEntry::MarkedForDeletion);
//!
//! let json = serde_json::to_string(&staged).unwrap();
//! assert!(json.contains("\"old.txt\":\"DELETED\""));
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::fs;
use super::StoreError;
use crate::core::object::Tree;
use crate::core::paths::RepoPaths;
use crate::core::types::{ObjectId, TypeError};

const DELETE_MARKER: &str = "DELETED";

/// What the next commit does with a staged path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum IndexEntry {
    /// Record this blob for the path.
    Tracked(ObjectId),
    /// Drop the path from the tree.
    MarkedForDeletion,
}

impl IndexEntry {
    pub fn blob(&self) -> Option<&ObjectId> {
        match self {
            IndexEntry::Tracked(id) => Some(id),
            IndexEntry::MarkedForDeletion => None,
        }
    }
}

impl TryFrom<String> for IndexEntry {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        if s == DELETE_MARKER {
            Ok(IndexEntry::MarkedForDeletion)
        } else {
            ObjectId::new(s).map(IndexEntry::Tracked)
        }
    }
}

impl From<IndexEntry> for String {
    fn from(entry: IndexEntry) -> Self {
        match entry {
            IndexEntry::Tracked(id) => id.into(),
            IndexEntry::MarkedForDeletion => DELETE_MARKER.to_string(),
        }
    }
}

/// The staged path mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StagedChanges(BTreeMap<String, IndexEntry>);

impl StagedChanges {
    pub fn get(&self, path: &str) -> Option<&IndexEntry> {
        self.0.get(path)
    }

    pub fn insert(&mut self, path: impl Into<String>, entry: IndexEntry) -> Option<IndexEntry> {
        self.0.insert(path.into(), entry)
    }

    pub fn remove(&mut self, path: &str) -> Option<IndexEntry> {
        self.0.remove(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.0.contains_key(path)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Entries in ascending path order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &IndexEntry)> {
        self.0.iter().map(|(path, entry)| (path.as_str(), entry))
    }

    /// Blob ids referenced by tracked entries, without duplicates.
    pub fn blob_ids(&self) -> Vec<ObjectId> {
        let mut ids: Vec<ObjectId> = self.0.values().filter_map(IndexEntry::blob).cloned().collect();
        ids.sort();
        ids.dedup();
        ids
    }

    /// The tree that results from applying these changes to `base`.
    pub fn apply_to(&self, base: &Tree) -> Tree {
        let mut tree = base.clone();
        for (path, entry) in &self.0 {
            match entry {
                IndexEntry::Tracked(id) => {
                    tree.put(path.clone(), id.clone());
                }
                IndexEntry::MarkedForDeletion => {
                    tree.remove(path);
                }
            }
        }
        tree
    }
}

/// One change applied by [`Index::update`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexUpdate {
    Stage(String, IndexEntry),
    Unstage(String),
}

/// The persisted staging area.
pub struct Index<'a> {
    paths: &'a RepoPaths,
}

impl<'a> Index<'a> {
    pub fn new(paths: &'a RepoPaths) -> Self {
        Self { paths }
    }

    /// Read the staged changes. A missing index file reads as empty.
    pub fn load(&self) -> Result<StagedChanges, StoreError> {
        let path = self.paths.index_path();
        if fs::stat(&path)?.is_none() {
            return Ok(StagedChanges::default());
        }
        let bytes = fs::read_file(&path)?;
        serde_json::from_slice(&bytes).map_err(|e| StoreError::Corrupt {
            what: "index".into(),
            message: e.to_string(),
        })
    }

    /// Replace the staged changes.
    pub fn save(&self, staged: &StagedChanges) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(staged).map_err(|e| StoreError::Corrupt {
            what: "index".into(),
            message: e.to_string(),
        })?;
        fs::write_file(&self.paths.index_path(), &bytes)
    }

    /// Apply `updates` in order with a single load and save.
    ///
    /// Returns the staged changes as saved.
    pub fn update(&self, updates: impl IntoIterator<Item = IndexUpdate>) -> Result<StagedChanges, StoreError> {
        let mut staged = self.load()?;
        for update in updates {
            match update {
                IndexUpdate::Stage(path, entry) => {
                    debug!(%path, entry = %String::from(entry.clone()), "staging");
                    staged.insert(path, entry);
                }
                IndexUpdate::Unstage(path) => {
                    if staged.remove(&path).is_some() {
                        debug!(%path, "unstaged");
                    }
                }
            }
        }
        self.save(&staged)?;
        Ok(staged)
    }

    /// Stage `entry` for `path`, replacing any previous entry.
    pub fn stage(&self, path: &str, entry: IndexEntry) -> Result<(), StoreError> {
        self.update([IndexUpdate::Stage(path.to_string(), entry)])?;
        Ok(())
    }

    /// Remove `path` from the index. Returns whether it was staged.
    pub fn unstage(&self, path: &str) -> Result<bool, StoreError> {
        if !self.is_staged(path)? {
            return Ok(false);
        }
        self.update([IndexUpdate::Unstage(path.to_string())])?;
        Ok(true)
    }

    pub fn is_staged(&self, path: &str) -> Result<bool, StoreError> {
        Ok(self.load()?.contains(path))
    }

    /// Empty the index.
    pub fn clear(&self) -> Result<(), StoreError> {
        self.save(&StagedChanges::default())
    }
}
