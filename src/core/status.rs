//! core::status
//!
//! Relative file status between two trees.
//!
//! One classifier serves both uses: staged-change reporting compares the
//! prospective tree against the parent commit's tree, and merge
//! classification compares a branch tip's tree against the split point's
//! tree. Only the inputs differ.

use super::object::Tree;

/// Status of a path in snapshot `a` relative to snapshot `b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileStatus {
    /// Present in `a`, absent in `b`.
    New,
    /// Present in both with different blob ids.
    Modified,
    /// Present in both with the same blob id.
    Unmodified,
    /// Absent in `a`, present in `b`.
    Deleted,
    /// Absent in both.
    NotFound,
}

impl FileStatus {
    /// Classify `path` in `a` relative to `b`.
    ///
    /// # Example
    ///
    /// ```
    /// use vms::core::hash::hash_bytes;
    /// use vms::core::object::Tree;
    /// use vms::core::status::FileStatus;
    ///
    /// let mut a = Tree::new();
    /// a.put("f", hash_bytes(b"1"));
    /// let b = Tree::new();
    ///
    /// assert_eq!(FileStatus::of("f", &a, &b), FileStatus::New);
    /// assert_eq!(FileStatus::of("f", &b, &a), FileStatus::Deleted);
    /// assert_eq!(FileStatus::of("g", &a, &b), FileStatus::NotFound);
    /// ```
    pub fn of(path: &str, a: &Tree, b: &Tree) -> Self {
        match (a.get(path), b.get(path)) {
            (Some(_), None) => FileStatus::New,
            (None, Some(_)) => FileStatus::Deleted,
            (Some(x), Some(y)) if x == y => FileStatus::Unmodified,
            (Some(_), Some(_)) => FileStatus::Modified,
            (None, None) => FileStatus::NotFound,
        }
    }

    /// The status seen from the other side.
    pub fn inverse(self) -> Self {
        match self {
            FileStatus::New => FileStatus::Deleted,
            FileStatus::Deleted => FileStatus::New,
            other => other,
        }
    }

    /// True for New and Modified.
    pub fn introduces_content(self) -> bool {
        matches!(self, FileStatus::New | FileStatus::Modified)
    }
}

impl std::fmt::Display for FileStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            FileStatus::New => "new file",
            FileStatus::Modified => "modified",
            FileStatus::Unmodified => "unmodified",
            FileStatus::Deleted => "deleted",
            FileStatus::NotFound => "not found",
        };
        f.write_str(label)
    }
}

/// True iff any path of `candidate` is not `Unmodified` against `reference`.
///
/// Paths only present in `reference` are not visited; callers that also
/// need removals check the reverse direction as well.
pub fn has_relative_changes(candidate: &Tree, reference: &Tree) -> bool {
    candidate
        .paths()
        .any(|path| FileStatus::of(path, candidate, reference) != FileStatus::Unmodified)
}
