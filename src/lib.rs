//! vms - A small local version control system
//!
//! vms snapshots a working directory into content-addressed commits,
//! keeps named branches, and merges them with a three-way file-level merge.
//! Everything lives in a `.vms` directory at the repository root.
//!
//! # Architecture
//!
//! The codebase follows a layered architecture:
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to engine)
//! - [`engine`] - Command semantics: staging, commits, checkout, merge
//! - [`repo`] - On-disk state: object store, index, refs, commit log
//! - [`core`] - Domain types, hashing, commit graph, paths, configuration
//! - [`ui`] - Output formatting and confirmation prompts
//!
//! # Correctness Invariants
//!
//! 1. An object's id is the SHA-256 of its content and is re-checked on load
//! 2. Permanent objects are immutable once promoted
//! 3. A branch tip moves only after its commit is durable
//! 4. Failed loads report integrity violations instead of returning data

pub mod cli;
pub mod core;
pub mod engine;
pub mod repo;
pub mod ui;
