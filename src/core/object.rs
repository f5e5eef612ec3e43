//! core::object
//!
//! The two stored object kinds and the tree mapping they share.
//!
//! # Invariants
//!
//! - A [`Blob`]'s id is the hash of its bytes
//! - A [`Commit`]'s id is recomputed from its fields, never stored inside it
//! - A [`Tree`] iterates in ascending path order, which is the order the
//!   commit hash consumes
//! - Nothing hands out a mutable alias to a commit's tree; callers copy the
//!   tree, edit the copy through [`Tree::put`] / [`Tree::remove`], and build a
//!   new commit from it

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::hash::{hash_bytes, hash_commit_fields, CommitFields};
use super::types::{ObjectId, Timestamp};

/// One file's content at a point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    content: Vec<u8>,
}

impl Blob {
    pub fn new(content: impl Into<Vec<u8>>) -> Self {
        Self {
            content: content.into(),
        }
    }

    pub fn id(&self) -> ObjectId {
        hash_bytes(&self.content)
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub fn into_content(self) -> Vec<u8> {
        self.content
    }
}

/// Mapping of working-tree-relative path to blob id.
///
/// # Example
///
/// ```
/// use vms::core::hash::hash_bytes;
/// use vms::core::object::Tree;
///
/// let mut tree = Tree::new();
/// tree.put("b.txt", hash_bytes(b"b"));
/// tree.put("a.txt", hash_bytes(b"a"));
///
/// let paths: Vec<_> = tree.paths().collect();
/// assert_eq!(paths, vec!["a.txt", "b.txt"]);
/// assert!(tree.contains("a.txt"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tree(BTreeMap<String, ObjectId>);

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &str) -> Option<&ObjectId> {
        self.0.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.0.contains_key(path)
    }

    /// Insert or replace the blob for `path`, returning the previous one.
    pub fn put(&mut self, path: impl Into<String>, blob: ObjectId) -> Option<ObjectId> {
        self.0.insert(path.into(), blob)
    }

    pub fn remove(&mut self, path: &str) -> Option<ObjectId> {
        self.0.remove(path)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Entries in ascending path order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ObjectId)> {
        self.0.iter().map(|(path, id)| (path.as_str(), id))
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl FromIterator<(String, ObjectId)> for Tree {
    fn from_iter<T: IntoIterator<Item = (String, ObjectId)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// An immutable snapshot of the tracked tree plus lineage metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    timestamp: Timestamp,
    message: String,
    first_parent: Option<ObjectId>,
    second_parent: Option<ObjectId>,
    tree: Tree,
}

impl Commit {
    /// Message recorded on the sentinel commit.
    pub const SENTINEL_MESSAGE: &'static str = "initial commit";

    pub fn new(
        timestamp: Timestamp,
        message: impl Into<String>,
        first_parent: Option<ObjectId>,
        second_parent: Option<ObjectId>,
        tree: Tree,
    ) -> Self {
        Self {
            timestamp,
            message: message.into(),
            first_parent,
            second_parent,
            tree,
        }
    }

    /// The root commit every repository starts from.
    ///
    /// It has no parents, an empty tree, and the epoch timestamp, so every
    /// repository shares the same sentinel id.
    pub fn sentinel() -> Self {
        Self::new(Timestamp::epoch(), Self::SENTINEL_MESSAGE, None, None, Tree::new())
    }

    /// A commit whose first parent is `parent` and whose tree is `tree`.
    pub fn child_of(parent: &ObjectId, message: impl Into<String>, tree: Tree) -> Self {
        Self::new(Timestamp::now(), message, Some(parent.clone()), None, tree)
    }

    /// Recompute this commit's id from its fields.
    pub fn id(&self) -> ObjectId {
        hash_commit_fields(CommitFields {
            timestamp: self.timestamp,
            message: &self.message,
            first_parent: self.first_parent.as_ref(),
            second_parent: self.second_parent.as_ref(),
            entries: self.tree.iter(),
        })
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn first_parent(&self) -> Option<&ObjectId> {
        self.first_parent.as_ref()
    }

    pub fn second_parent(&self) -> Option<&ObjectId> {
        self.second_parent.as_ref()
    }

    /// Both parents in order, skipping absent ones.
    pub fn parents(&self) -> impl Iterator<Item = &ObjectId> {
        self.first_parent.iter().chain(self.second_parent.iter())
    }

    pub fn is_merge(&self) -> bool {
        self.second_parent.is_some()
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> Tree {
        let mut tree = Tree::new();
        tree.put("a.txt", hash_bytes(b"a"));
        tree.put("dir/b.txt", hash_bytes(b"b"));
        tree
    }

    #[test]
    fn blob_id_is_content_hash() {
        assert_eq!(Blob::new("hello").id(), hash_bytes(b"hello"));
    }

    #[test]
    fn sentinel_is_stable() {
        assert_eq!(Commit::sentinel().id(), Commit::sentinel().id());
        assert!(Commit::sentinel().tree().is_empty());
        assert_eq!(Commit::sentinel().parents().count(), 0);
    }

    #[test]
    fn tree_insertion_order_does_not_change_id() {
        let mut reversed = Tree::new();
        reversed.put("dir/b.txt", hash_bytes(b"b"));
        reversed.put("a.txt", hash_bytes(b"a"));

        let ts = Timestamp::from_seconds(42).unwrap();
        let a = Commit::new(ts, "m", None, None, sample_tree());
        let b = Commit::new(ts, "m", None, None, reversed);
        assert_eq!(a.id(), b.id());
    }

    #[test]
    fn tree_changes_change_id() {
        let ts = Timestamp::from_seconds(42).unwrap();
        let base = Commit::new(ts, "m", None, None, sample_tree());

        let mut edited = base.tree().clone();
        edited.put("a.txt", hash_bytes(b"changed"));
        let changed = Commit::new(ts, "m", None, None, edited);

        assert_ne!(base.id(), changed.id());
        // The original commit's tree is untouched by edits to the copy.
        assert_eq!(base.tree().get("a.txt"), Some(&hash_bytes(b"a")));
    }

    #[test]
    fn commit_json_roundtrip_preserves_id() {
        let parent = Commit::sentinel().id();
        let commit = Commit::child_of(&parent, "first", sample_tree());
        let json = serde_json::to_string(&commit).unwrap();
        let back: Commit = serde_json::from_str(&json).unwrap();
        assert_eq!(back, commit);
        assert_eq!(back.id(), commit.id());
    }

    #[test]
    fn merge_commit_lists_both_parents() {
        let a = hash_bytes(b"a");
        let b = hash_bytes(b"b");
        let merge = Commit::new(Timestamp::epoch(), "merge", Some(a.clone()), Some(b.clone()), Tree::new());
        assert!(merge.is_merge());
        assert_eq!(merge.parents().collect::<Vec<_>>(), vec![&a, &b]);
    }
}
