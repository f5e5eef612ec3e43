//! core::ops
//!
//! Coordination between concurrent invocations.
//!
//! # Modules
//!
//! - [`lock`] - Exclusive repository lock
//!
//! # Architecture
//!
//! Every mutating command, when locking is enabled in the repository config:
//! 1. Acquires the exclusive repo lock
//! 2. Performs its writes
//! 3. Releases the lock on drop

pub mod lock;

pub use lock::{LockError, RepoLock};
