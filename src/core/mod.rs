//! core
//!
//! Core domain types, algorithms, and configuration for vms.
//!
//! # Modules
//!
//! - [`types`] - Strong types: ObjectId, BranchName, Timestamp
//! - [`hash`] - Content addressing for blobs and commits
//! - [`object`] - Blob, Tree, and Commit
//! - [`status`] - Relative file status between two trees
//! - [`graph`] - Commit graph traversal and split point search
//! - [`paths`] - Centralized path routing for repository storage
//! - [`config`] - Configuration schema and loading
//! - [`ops`] - Repository locking
//!
//! # Design Principles
//!
//! - Strong typing prevents invalid states at compile time
//! - Nothing in `core` except `paths`, `config`, and `ops` touches the filesystem
//! - All hashing and traversal is deterministic

pub mod config;
pub mod graph;
pub mod hash;
pub mod object;
pub mod ops;
pub mod paths;
pub mod status;
pub mod types;
