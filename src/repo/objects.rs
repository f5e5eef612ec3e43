//! repo::objects
//!
//! Content-addressed object store.
//!
//! # Architecture
//!
//! Objects are written first to a flat cache (`cache/<id>`) and promoted to
//! the permanent store (`objects/<prefix>/<suffix>`) at commit time. The
//! permanent copy is made read-only and never rewritten.
//!
//! # Encoding
//!
//! An object file is the zlib stream of `kind NUL payload`. A blob's payload
//! is its raw bytes; a commit's payload is its JSON record.
//!
//! # Integrity
//!
//! Every load from the permanent store recomputes the id from the decoded
//! content and fails with [`StoreError::Integrity`] on mismatch.

use std::io::{Read, Write};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use tracing::debug;

use super::fs;
use super::StoreError;
use crate::core::graph::CommitSource;
use crate::core::hash::hash_bytes;
use crate::core::object::{Blob, Commit};
use crate::core::paths::RepoPaths;
use crate::core::types::ObjectId;

/// Shortest abbreviated id accepted by [`ObjectStore::resolve_short_id`].
pub const MIN_SHORT_ID_LEN: usize = 4;

/// The two kinds of stored object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Blob,
    Commit,
}

impl ObjectKind {
    fn tag(self) -> &'static [u8] {
        match self {
            ObjectKind::Blob => b"blob",
            ObjectKind::Commit => b"commit",
        }
    }

    fn from_tag(tag: &[u8]) -> Option<Self> {
        match tag {
            b"blob" => Some(ObjectKind::Blob),
            b"commit" => Some(ObjectKind::Commit),
            _ => None,
        }
    }
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ObjectKind::Blob => f.write_str("blob"),
            ObjectKind::Commit => f.write_str("commit"),
        }
    }
}

/// Blob and commit persistence under content-derived ids.
pub struct ObjectStore<'a> {
    paths: &'a RepoPaths,
    prefix_len: usize,
    level: u32,
}

impl<'a> ObjectStore<'a> {
    pub fn new(paths: &'a RepoPaths, prefix_len: usize, level: u32) -> Self {
        Self {
            paths,
            prefix_len,
            level,
        }
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Store blob content in the cache and return its id.
    ///
    /// Writing content that is already cached is a no-op.
    pub fn put_blob(&self, content: &[u8]) -> Result<ObjectId, StoreError> {
        let id = hash_bytes(content);
        self.put_cached(&id, ObjectKind::Blob, content)?;
        Ok(id)
    }

    /// Store a commit in the cache and return its id.
    pub fn put_commit(&self, commit: &Commit) -> Result<ObjectId, StoreError> {
        let id = commit.id();
        let payload = serde_json::to_vec(commit).map_err(|e| StoreError::Corrupt {
            what: format!("commit {}", id),
            message: e.to_string(),
        })?;
        self.put_cached(&id, ObjectKind::Commit, &payload)?;
        Ok(id)
    }

    fn put_cached(&self, id: &ObjectId, kind: ObjectKind, payload: &[u8]) -> Result<(), StoreError> {
        let path = self.paths.cache_path(id);
        if fs::stat(&path)?.is_some() {
            debug!(%id, "object already cached");
            return Ok(());
        }
        let encoded = encode(kind, payload, self.level, id)?;
        fs::write_file(&path, &encoded)?;
        debug!(%id, %kind, bytes = payload.len(), "cached object");
        Ok(())
    }

    /// Move an object from the cache into the permanent store.
    ///
    /// Promoting an id that is already permanent only drops the cached copy.
    pub fn promote(&self, id: &ObjectId) -> Result<(), StoreError> {
        let cached = self.paths.cache_path(id);
        let permanent = self.paths.object_path(id, self.prefix_len);

        if fs::stat(&permanent)?.is_some() {
            fs::remove_file(&cached)?;
            debug!(%id, "object already permanent");
            return Ok(());
        }
        if fs::stat(&cached)?.is_none() {
            return Err(StoreError::ObjectNotFound(id.clone()));
        }

        fs::make_dir(&self.paths.shard_dir(id.prefix(self.prefix_len)))?;
        fs::move_file(&cached, &permanent)?;
        fs::set_read_only(&permanent)?;
        debug!(%id, "promoted object");
        Ok(())
    }

    /// Remove every cached object.
    pub fn clear_cache(&self) -> Result<(), StoreError> {
        let dir = self.paths.cache_dir();
        for name in fs::list_entries(&dir).names()? {
            fs::remove_file(&dir.join(name))?;
        }
        Ok(())
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Whether `id` is in the permanent store.
    pub fn contains(&self, id: &ObjectId) -> Result<bool, StoreError> {
        Ok(fs::stat(&self.paths.object_path(id, self.prefix_len))?.is_some())
    }

    /// Load and verify a blob.
    pub fn get_blob(&self, id: &ObjectId) -> Result<Blob, StoreError> {
        let payload = self.read_permanent(id, ObjectKind::Blob)?;
        let blob = Blob::new(payload);
        verify(id, blob.id())?;
        Ok(blob)
    }

    /// Load and verify a commit.
    pub fn get_commit(&self, id: &ObjectId) -> Result<Commit, StoreError> {
        let payload = self.read_permanent(id, ObjectKind::Commit)?;
        let commit: Commit =
            serde_json::from_slice(&payload).map_err(|e| StoreError::Corrupt {
                what: format!("commit {}", id),
                message: e.to_string(),
            })?;
        verify(id, commit.id())?;
        Ok(commit)
    }

    fn read_permanent(&self, id: &ObjectId, expected: ObjectKind) -> Result<Vec<u8>, StoreError> {
        let (found, payload) = self.read_raw(id)?;
        if found != expected {
            return Err(StoreError::WrongKind {
                id: id.clone(),
                expected,
                found,
            });
        }
        Ok(payload)
    }

    fn read_raw(&self, id: &ObjectId) -> Result<(ObjectKind, Vec<u8>), StoreError> {
        let path = self.paths.object_path(id, self.prefix_len);
        if fs::stat(&path)?.is_none() {
            return Err(StoreError::ObjectNotFound(id.clone()));
        }
        decode(&fs::read_file(&path)?, id)
    }

    /// Expand an abbreviated id.
    ///
    /// The prefix's first `prefix_len` characters select the shard directory;
    /// the rest must match the start of exactly one entry in it.
    pub fn resolve_short_id(&self, prefix: &str) -> Result<ObjectId, StoreError> {
        let prefix = prefix.to_ascii_lowercase();

        if !prefix.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(StoreError::NoMatchingObject(prefix));
        }
        if prefix.len() == ObjectId::HEX_LEN {
            let id = ObjectId::new(prefix)?;
            return if self.contains(&id)? {
                Ok(id)
            } else {
                Err(StoreError::ObjectNotFound(id))
            };
        }
        if prefix.len() > ObjectId::HEX_LEN {
            return Err(StoreError::NoMatchingObject(prefix));
        }
        let min = MIN_SHORT_ID_LEN.max(self.prefix_len);
        if prefix.len() < min {
            return Err(StoreError::ShortIdTooShort { prefix, min });
        }

        let (head, rest) = prefix.split_at(self.prefix_len);
        let shard = self.paths.shard_dir(head);
        if fs::stat(&shard)?.is_none() {
            return Err(StoreError::NoMatchingObject(prefix));
        }

        let matches: Vec<String> = fs::list_entries(&shard)
            .names()?
            .filter(|name| name.starts_with(rest))
            .collect();

        match matches.as_slice() {
            [only] => Ok(ObjectId::new(format!("{}{}", head, only))?),
            [] => Err(StoreError::NoMatchingObject(prefix)),
            many => Err(StoreError::AmbiguousId {
                prefix,
                matches: many.len(),
            }),
        }
    }
}

impl CommitSource for ObjectStore<'_> {
    type Error = StoreError;

    fn load_commit(&self, id: &ObjectId) -> Result<Commit, StoreError> {
        self.get_commit(id)
    }
}

fn verify(expected: &ObjectId, actual: ObjectId) -> Result<(), StoreError> {
    if &actual != expected {
        return Err(StoreError::Integrity {
            expected: expected.clone(),
            actual,
        });
    }
    Ok(())
}

fn encode(kind: ObjectKind, payload: &[u8], level: u32, id: &ObjectId) -> Result<Vec<u8>, StoreError> {
    let corrupt = |e: std::io::Error| StoreError::Corrupt {
        what: format!("object {}", id),
        message: e.to_string(),
    };
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::new(level));
    encoder.write_all(kind.tag()).map_err(corrupt)?;
    encoder.write_all(b"\0").map_err(corrupt)?;
    encoder.write_all(payload).map_err(corrupt)?;
    encoder.finish().map_err(corrupt)
}

fn decode(bytes: &[u8], id: &ObjectId) -> Result<(ObjectKind, Vec<u8>), StoreError> {
    let corrupt = |message: String| StoreError::Corrupt {
        what: format!("object {}", id),
        message,
    };

    let mut raw = Vec::new();
    ZlibDecoder::new(bytes)
        .read_to_end(&mut raw)
        .map_err(|e| corrupt(e.to_string()))?;

    let split = raw
        .iter()
        .position(|&b| b == 0)
        .ok_or_else(|| corrupt("missing object header".into()))?;
    let kind = ObjectKind::from_tag(&raw[..split])
        .ok_or_else(|| corrupt("unknown object kind".into()))?;

    Ok((kind, raw.split_off(split + 1)))
}
