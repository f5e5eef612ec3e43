//! core::ops::lock
//!
//! Exclusive repository lock for mutating commands.
//!
//! The index, branch files, log, and cache are rewritten in place without
//! coordination. With `lock = true` in the repository config, each mutating
//! command holds this lock from start to finish; otherwise no lock is taken
//! and concurrent invocations remain unsafe.
//!
//! # Storage
//!
//! - `<root>/.vms/lock` - Holds the owning process id while locked
//!
//! # Invariants
//!
//! - Acquisition never waits; a held lock fails the command immediately
//! - The OS lock is dropped with the guard, so a crashed process never
//!   leaves the repository locked

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use thiserror::Error;
use tracing::debug;

use crate::core::paths::RepoPaths;

#[derive(Debug, Error)]
pub enum LockError {
    #[error("repository is locked by another vms process{}", holder_suffix(.holder))]
    Held { holder: Option<u32> },

    #[error("cannot {op} lock file {path}: {source}")]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

fn holder_suffix(holder: &Option<u32>) -> String {
    holder.map(|pid| format!(" (pid {})", pid)).unwrap_or_default()
}

/// Guard for the repository lock; dropping it unlocks.
#[derive(Debug)]
pub struct RepoLock {
    path: PathBuf,
    file: File,
}

impl RepoLock {
    /// Take the lock or fail with [`LockError::Held`].
    pub fn acquire(paths: &RepoPaths) -> Result<Self, LockError> {
        let path = paths.lock_path();
        let io_err = |op, source| LockError::Io {
            op,
            path: path.clone(),
            source,
        };

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| io_err("open", e))?;

        if let Err(e) = file.try_lock_exclusive() {
            if e.kind() != io::ErrorKind::WouldBlock {
                return Err(io_err("lock", e));
            }
            return Err(LockError::Held {
                holder: read_holder(&mut file),
            });
        }

        file.set_len(0).map_err(|e| io_err("truncate", e))?;
        write!(file, "{}", std::process::id()).map_err(|e| io_err("write", e))?;
        debug!(path = %path.display(), "acquired repository lock");

        Ok(Self { path, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for RepoLock {
    fn drop(&mut self) {
        let _ = self.file.set_len(0);
        let _ = FileExt::unlock(&self.file);
    }
}

/// Best-effort read of the pid written by the current holder.
fn read_holder(file: &mut File) -> Option<u32> {
    let mut text = String::new();
    file.seek(SeekFrom::Start(0)).ok()?;
    file.read_to_string(&mut text).ok()?;
    text.trim().parse().ok()
}
