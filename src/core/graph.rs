//! core::graph
//!
//! Commit graph traversal.
//!
//! # Architecture
//!
//! The commit graph is a DAG where:
//! - Nodes are commits
//! - Edges point from child to parent (first and optional second parent)
//! - The root is the sentinel commit created at init
//!
//! Nothing is persisted here. [`CommitGraph`] loads commits on demand from a
//! [`CommitSource`] and memoizes them for the lifetime of one command.
//!
//! # Split point search
//!
//! [`CommitGraph::split_point`] expands two breadth-first frontiers, one per
//! branch tip, through a single FIFO queue. The first commit one frontier
//! reaches that the other has already recorded is the split point. This is
//! the first common ancestor met by the frontiers, which is not always the
//! lowest common ancestor in criss-cross histories.

use std::collections::{HashMap, HashSet, VecDeque};

use tracing::debug;

use super::object::Commit;
use super::types::ObjectId;

/// Anything that can load a commit by id.
pub trait CommitSource {
    type Error;

    fn load_commit(&self, id: &ObjectId) -> Result<Commit, Self::Error>;
}

impl CommitSource for HashMap<ObjectId, Commit> {
    type Error = ObjectId;

    fn load_commit(&self, id: &ObjectId) -> Result<Commit, Self::Error> {
        self.get(id).cloned().ok_or_else(|| id.clone())
    }
}

/// Which tip a frontier started from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    A,
    B,
}

/// Lazily loaded view of the commit DAG.
pub struct CommitGraph<'a, S: CommitSource> {
    source: &'a S,
    nodes: HashMap<ObjectId, Commit>,
}

impl<'a, S: CommitSource> CommitGraph<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self {
            source,
            nodes: HashMap::new(),
        }
    }

    /// Get a commit, loading it on first access.
    pub fn commit(&mut self, id: &ObjectId) -> Result<&Commit, S::Error> {
        if !self.nodes.contains_key(id) {
            let commit = self.source.load_commit(id)?;
            self.nodes.insert(id.clone(), commit);
        }
        Ok(&self.nodes[id])
    }

    /// Parents of a commit, first parent first.
    pub fn parents(&mut self, id: &ObjectId) -> Result<Vec<ObjectId>, S::Error> {
        Ok(self.commit(id)?.parents().cloned().collect())
    }

    /// Number of commits loaded so far.
    pub fn loaded(&self) -> usize {
        self.nodes.len()
    }

    /// All ancestors of `id` (excluding itself) in breadth-first order.
    ///
    /// # Example
    ///
    /// ```
    /// use std::collections::HashMap;
    /// use vms::core::graph::CommitGraph;
    /// use vms::core::object::{Commit, Tree};
    ///
    /// let root = Commit::sentinel();
    /// let child = Commit::child_of(&root.id(), "child", Tree::new());
    /// let commits: HashMap<_, _> = [(root.id(), root.clone()), (child.id(), child.clone())]
    ///     .into_iter()
    ///     .collect();
    ///
    /// let mut graph = CommitGraph::new(&commits);
    /// assert_eq!(graph.ancestors(&child.id()).unwrap(), vec![root.id()]);
    /// ```
    pub fn ancestors(&mut self, id: &ObjectId) -> Result<Vec<ObjectId>, S::Error> {
        let mut result = Vec::new();
        let mut seen = HashSet::new();
        let mut queue = VecDeque::new();

        seen.insert(id.clone());
        queue.push_back(id.clone());

        while let Some(current) = queue.pop_front() {
            for parent in self.parents(&current)? {
                if seen.insert(parent.clone()) {
                    result.push(parent.clone());
                    queue.push_back(parent);
                }
            }
        }

        Ok(result)
    }

    /// Whether `ancestor` is reachable from `descendant` (or equal to it).
    pub fn is_ancestor(
        &mut self,
        ancestor: &ObjectId,
        descendant: &ObjectId,
    ) -> Result<bool, S::Error> {
        if ancestor == descendant {
            return Ok(true);
        }
        Ok(self.ancestors(descendant)?.contains(ancestor))
    }

    /// Find the split point of two tips.
    ///
    /// Returns `None` only if the histories share no commit at all, which
    /// cannot happen for commits descending from one sentinel.
    pub fn split_point(
        &mut self,
        a: &ObjectId,
        b: &ObjectId,
    ) -> Result<Option<ObjectId>, S::Error> {
        if a == b {
            return Ok(Some(a.clone()));
        }

        let mut seen_a: HashSet<ObjectId> = HashSet::from([a.clone()]);
        let mut seen_b: HashSet<ObjectId> = HashSet::from([b.clone()]);
        let mut seen_any: HashSet<ObjectId> = HashSet::from([a.clone(), b.clone()]);
        let mut queue = VecDeque::from([a.clone(), b.clone()]);

        while let Some(current) = queue.pop_front() {
            let origin = if seen_a.contains(&current) {
                Origin::A
            } else {
                Origin::B
            };

            for parent in self.parents(&current)? {
                let own = match origin {
                    Origin::A => &mut seen_a,
                    Origin::B => &mut seen_b,
                };
                // Already queued from this side through another path.
                if !own.insert(parent.clone()) {
                    continue;
                }
                if !seen_any.insert(parent.clone()) {
                    debug!(split = %parent, loaded = self.loaded(), "found split point");
                    return Ok(Some(parent));
                }
                queue.push_back(parent);
            }
        }

        Ok(None)
    }
}
