//! core::hash
//!
//! Content addressing.
//!
//! Blob ids are the SHA-256 of the file bytes. Commit ids are the SHA-256 of
//! a canonical serialization whose field order is frozen:
//!
//! ```text
//! timestamp, message, first-parent id, second-parent id,
//! then (path, blob id) for every tree entry in ascending path order
//! ```
//!
//! Each field is followed by a NUL byte so that adjacent fields cannot run
//! into each other. Changing this layout changes every commit id and breaks
//! existing repositories.

use sha2::{Digest, Sha256};

use super::types::{ObjectId, Timestamp};

/// Hash raw content into an object id.
///
/// # Example
///
/// ```
/// use vms::core::hash::hash_bytes;
///
/// assert_eq!(hash_bytes(b"hello"), hash_bytes(b"hello"));
/// assert_ne!(hash_bytes(b"hello"), hash_bytes(b"world"));
/// ```
pub fn hash_bytes(content: &[u8]) -> ObjectId {
    ObjectId::from_digest(&Sha256::digest(content))
}

/// Canonical commit metadata fed to [`hash_commit_fields`].
pub struct CommitFields<'a, I> {
    pub timestamp: Timestamp,
    pub message: &'a str,
    pub first_parent: Option<&'a ObjectId>,
    pub second_parent: Option<&'a ObjectId>,
    /// Tree entries; must already be in ascending path order.
    pub entries: I,
}

/// Hash commit metadata in the frozen field order.
pub fn hash_commit_fields<'a, I>(fields: CommitFields<'a, I>) -> ObjectId
where
    I: IntoIterator<Item = (&'a str, &'a ObjectId)>,
{
    let mut hasher = Sha256::new();

    hasher.update(fields.timestamp.seconds().to_string().as_bytes());
    hasher.update(b"\0");
    hasher.update(fields.message.as_bytes());
    hasher.update(b"\0");
    hasher.update(fields.first_parent.map(ObjectId::as_str).unwrap_or("").as_bytes());
    hasher.update(b"\0");
    hasher.update(fields.second_parent.map(ObjectId::as_str).unwrap_or("").as_bytes());
    hasher.update(b"\0");

    for (path, blob) in fields.entries {
        hasher.update(path.as_bytes());
        hasher.update(b"\0");
        hasher.update(blob.as_str().as_bytes());
        hasher.update(b"\n");
    }

    ObjectId::from_digest(&hasher.finalize())
}
