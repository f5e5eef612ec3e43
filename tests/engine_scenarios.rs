//! Engine-level scenarios across staging, commits, branches, and inspection.
//!
//! These tests drive the engine API against real repositories in temporary
//! directories, the way the CLI handlers do.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use vms::core::status::FileStatus;
use vms::engine::{
    self, checkout_branch, checkout_files, commit, info, log, mkbranch, rmbranch, stage, status,
    unstage, AlwaysConfirm, CheckoutOutcome, CommitOutcome, EngineError, InfoReport,
    NeverConfirm, RestoreOutcome,
};
use vms::repo::{IndexEntry, Repository, StoreError};

// =============================================================================
// Test Fixtures
// =============================================================================

struct TestRepo {
    _dir: TempDir,
    repo: Repository,
}

impl TestRepo {
    fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        let (repo, _) = engine::init(dir.path()).expect("failed to init repo");
        Self { _dir: dir, repo }
    }

    fn write(&self, path: &str, content: &str) {
        let full = self.repo.paths().work_path(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(full, content).unwrap();
    }

    fn read(&self, path: &str) -> String {
        fs::read_to_string(self.repo.paths().work_path(path)).unwrap()
    }

    fn remove(&self, path: &str) {
        fs::remove_file(self.repo.paths().work_path(path)).unwrap();
    }

    fn stage(&self, paths: &[&str]) {
        let paths: Vec<PathBuf> = paths.iter().map(PathBuf::from).collect();
        stage(&self.repo, self.repo.root(), &paths).expect("stage failed");
    }

    fn commit(&self, message: &str) -> vms::core::types::ObjectId {
        match commit(&self.repo, message).expect("commit failed") {
            CommitOutcome::Committed { id, .. } => id,
            CommitOutcome::NothingToCommit => panic!("expected a commit for '{}'", message),
        }
    }
}

// =============================================================================
// End-to-end
// =============================================================================

#[test]
fn hello_world_history() {
    let t = TestRepo::new();

    t.write("a.txt", "hello");
    t.stage(&["a.txt"]);
    let first = t.commit("first");

    t.write("a.txt", "world");
    t.stage(&["a.txt"]);
    let second = t.commit("second");

    let entries = log(&t.repo).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].id, second);
    assert_eq!(entries[0].message, "second");
    assert_eq!(entries[0].first_parent.as_ref(), Some(&first));
    assert_eq!(entries[1].id, first);

    let report = info(&t.repo, t.repo.root(), second.short(10), Some(Path::new("a.txt"))).unwrap();
    match report {
        InfoReport::File { content, commit, .. } => {
            assert_eq!(commit, second);
            assert_eq!(content, b"world");
        }
        other => panic!("expected file content, got {:?}", other),
    }

    let report = info(&t.repo, t.repo.root(), first.as_str(), Some(Path::new("a.txt"))).unwrap();
    assert!(matches!(report, InfoReport::File { content, .. } if content == b"hello"));
}

#[test]
fn committing_twice_without_changes_is_a_noop() {
    let t = TestRepo::new();
    t.write("a.txt", "hello");
    t.stage(&["a.txt"]);
    t.commit("first");

    assert_eq!(commit(&t.repo, "again").unwrap(), CommitOutcome::NothingToCommit);

    // Restaging identical content leaves nothing in the index.
    t.stage(&["a.txt"]);
    assert!(t.repo.index().load().unwrap().is_empty());
    assert_eq!(log(&t.repo).unwrap().len(), 1);
}

#[test]
fn empty_message_is_rejected() {
    let t = TestRepo::new();
    t.write("a.txt", "hello");
    t.stage(&["a.txt"]);
    assert!(matches!(commit(&t.repo, "  "), Err(EngineError::EmptyMessage)));
}

// =============================================================================
// Staging
// =============================================================================

#[test]
fn staging_same_file_twice_reuses_cache_object() {
    let t = TestRepo::new();
    t.write("a.txt", "content");
    t.stage(&["a.txt"]);
    let first = t.repo.index().load().unwrap();
    t.stage(&["a.txt"]);
    let second = t.repo.index().load().unwrap();

    assert_eq!(first, second);
    let cached = fs::read_dir(&t.repo.paths().cache_dir()).unwrap().count();
    assert_eq!(cached, 1);
}

#[test]
fn deletion_propagates_to_commit() {
    let t = TestRepo::new();
    t.write("a.txt", "keep");
    t.write("b.txt", "drop");
    t.stage(&["."]);
    t.commit("both");

    t.remove("b.txt");
    t.stage(&["b.txt"]);
    assert_eq!(
        t.repo.index().load().unwrap().get("b.txt"),
        Some(&IndexEntry::MarkedForDeletion)
    );

    let report = status(&t.repo).unwrap();
    assert_eq!(report.staged, vec![("b.txt".to_string(), FileStatus::Deleted)]);
    assert!(report.untracked.is_empty());
    assert!(report.unstaged.is_empty());

    t.commit("drop b");
    let (_, _, head) = t.repo.head().unwrap();
    assert!(head.tree().contains("a.txt"));
    assert!(!head.tree().contains("b.txt"));
    assert!(t.repo.index().load().unwrap().is_empty());
}

#[test]
fn staging_directory_picks_up_nested_files() {
    let t = TestRepo::new();
    t.write("src/lib.txt", "lib");
    t.write("src/deep/mod.txt", "mod");
    t.write("top.txt", "top");
    t.stage(&["src"]);

    let staged = t.repo.index().load().unwrap();
    assert!(staged.contains("src/lib.txt"));
    assert!(staged.contains("src/deep/mod.txt"));
    assert!(!staged.contains("top.txt"));
}

#[test]
fn unstage_drops_entries_and_reports_unknown_paths() {
    let t = TestRepo::new();
    t.write("a.txt", "a");
    t.stage(&["a.txt"]);

    let removed = unstage(&t.repo, t.repo.root(), &[PathBuf::from("a.txt")]).unwrap();
    assert_eq!(removed, vec!["a.txt"]);
    assert!(t.repo.index().load().unwrap().is_empty());

    assert!(matches!(
        unstage(&t.repo, t.repo.root(), &[PathBuf::from("a.txt")]),
        Err(EngineError::NotStaged(_))
    ));
}

#[test]
fn staging_repository_internals_is_refused() {
    let t = TestRepo::new();
    let result = stage(&t.repo, t.repo.root(), &[PathBuf::from(".vms/HEAD")]);
    assert!(matches!(result, Err(EngineError::Path(_))));
}

#[test]
fn missing_untracked_path_is_an_error() {
    let t = TestRepo::new();
    let result = stage(&t.repo, t.repo.root(), &[PathBuf::from("ghost.txt")]);
    assert!(matches!(result, Err(EngineError::NoSuchPath(_))));
}

// =============================================================================
// Branches
// =============================================================================

#[test]
fn default_branch_cannot_be_deleted() {
    let t = TestRepo::new();
    mkbranch(&t.repo, "feature", None).unwrap();
    checkout_branch(&t.repo, "feature", &mut NeverConfirm).unwrap();

    let default = t.repo.default_branch();
    assert!(matches!(
        rmbranch(&t.repo, default.as_str()),
        Err(EngineError::Store(StoreError::DeleteDefaultBranch(_)))
    ));
}

#[test]
fn active_branch_cannot_be_deleted() {
    let t = TestRepo::new();
    mkbranch(&t.repo, "feature", None).unwrap();
    checkout_branch(&t.repo, "feature", &mut NeverConfirm).unwrap();

    assert!(matches!(
        rmbranch(&t.repo, "feature"),
        Err(EngineError::Store(StoreError::DeleteActiveBranch(_)))
    ));

    checkout_branch(&t.repo, t.repo.default_branch().as_str(), &mut NeverConfirm).unwrap();
    assert_eq!(rmbranch(&t.repo, "feature").unwrap().as_str(), "feature");
}

#[test]
fn branch_at_older_commit_checks_out_old_tree() {
    let t = TestRepo::new();
    t.write("a.txt", "v1");
    t.stage(&["a.txt"]);
    let first = t.commit("v1");
    t.write("a.txt", "v2");
    t.write("b.txt", "new");
    t.stage(&["."]);
    t.commit("v2");

    let (_, tip) = mkbranch(&t.repo, "old", Some(first.short(8))).unwrap();
    assert_eq!(tip, first);

    let outcome = checkout_branch(&t.repo, "old", &mut NeverConfirm).unwrap();
    assert!(matches!(outcome, CheckoutOutcome::Switched { .. }));
    assert_eq!(t.read("a.txt"), "v1");
    assert!(!t.repo.paths().work_path("b.txt").exists());
}

#[test]
fn checkout_with_staged_changes_asks_first() {
    let t = TestRepo::new();
    mkbranch(&t.repo, "feature", None).unwrap();
    t.write("a.txt", "pending");
    t.stage(&["a.txt"]);

    let outcome = checkout_branch(&t.repo, "feature", &mut NeverConfirm).unwrap();
    assert_eq!(outcome, CheckoutOutcome::Declined);
    assert_eq!(t.repo.refs().current_branch().unwrap(), t.repo.default_branch());

    let outcome = checkout_branch(&t.repo, "feature", &mut AlwaysConfirm).unwrap();
    assert!(matches!(outcome, CheckoutOutcome::Switched { .. }));
    assert!(t.repo.index().load().unwrap().is_empty());
}

#[test]
fn checkout_with_unstaged_edits_asks_first() {
    let t = TestRepo::new();
    t.write("a.txt", "v1");
    t.stage(&["a.txt"]);
    t.commit("v1");
    mkbranch(&t.repo, "feature", None).unwrap();
    t.write("a.txt", "v2");
    t.write("b.txt", "new");
    t.stage(&["."]);
    t.commit("v2");

    t.write("a.txt", "unsaved a");
    t.write("b.txt", "unsaved b");

    let outcome = checkout_branch(&t.repo, "feature", &mut NeverConfirm).unwrap();
    assert_eq!(outcome, CheckoutOutcome::Declined);
    assert_eq!(t.repo.refs().current_branch().unwrap(), t.repo.default_branch());
    assert_eq!(t.read("a.txt"), "unsaved a");
    assert_eq!(t.read("b.txt"), "unsaved b");

    let outcome = checkout_branch(&t.repo, "feature", &mut AlwaysConfirm).unwrap();
    assert!(matches!(outcome, CheckoutOutcome::Switched { removed: 1, .. }));
    assert_eq!(t.read("a.txt"), "v1");
    assert!(!t.repo.paths().work_path("b.txt").exists());
}

#[test]
fn edit_matching_target_content_switches_without_asking() {
    let t = TestRepo::new();
    t.write("a.txt", "v1");
    t.stage(&["a.txt"]);
    t.commit("v1");
    mkbranch(&t.repo, "feature", None).unwrap();
    t.write("a.txt", "v2");
    t.stage(&["a.txt"]);
    t.commit("v2");

    t.write("a.txt", "v1");

    let outcome = checkout_branch(&t.repo, "feature", &mut NeverConfirm).unwrap();
    assert!(matches!(outcome, CheckoutOutcome::Switched { .. }));
    assert_eq!(t.read("a.txt"), "v1");
}

// =============================================================================
// Restoring files
// =============================================================================

#[test]
fn restore_single_file_from_older_commit() {
    let t = TestRepo::new();
    t.write("a.txt", "old");
    t.stage(&["a.txt"]);
    let first = t.commit("old");
    t.write("a.txt", "new");
    t.stage(&["a.txt"]);
    t.commit("new");

    let outcome = checkout_files(
        &t.repo,
        t.repo.root(),
        first.as_str(),
        &[PathBuf::from("a.txt")],
        &mut AlwaysConfirm,
    )
    .unwrap();
    assert!(matches!(outcome, RestoreOutcome::Restored { ref paths, .. } if paths == &["a.txt"]));
    assert_eq!(t.read("a.txt"), "old");
}

#[test]
fn declined_restore_leaves_files_alone() {
    let t = TestRepo::new();
    t.write("a.txt", "old");
    t.stage(&["a.txt"]);
    let first = t.commit("old");
    t.write("a.txt", "edited");

    let outcome =
        checkout_files(&t.repo, t.repo.root(), first.as_str(), &[], &mut NeverConfirm).unwrap();
    assert_eq!(outcome, RestoreOutcome::Declined);
    assert_eq!(t.read("a.txt"), "edited");
}

#[test]
fn restoring_untracked_path_fails() {
    let t = TestRepo::new();
    t.write("a.txt", "old");
    t.stage(&["a.txt"]);
    let first = t.commit("old");

    let result = checkout_files(
        &t.repo,
        t.repo.root(),
        first.as_str(),
        &[PathBuf::from("missing.txt")],
        &mut AlwaysConfirm,
    );
    assert!(matches!(result, Err(EngineError::PathNotInCommit { .. })));
}

// =============================================================================
// Reopening
// =============================================================================

#[test]
fn state_survives_reopen_from_subdirectory() {
    let t = TestRepo::new();
    t.write("nested/a.txt", "a");
    t.stage(&["nested"]);
    let id = t.commit("nested");

    let reopened = Repository::open(&t.repo.paths().work_path("nested")).unwrap();
    let (branch, tip, _) = reopened.head().unwrap();
    assert_eq!(branch, t.repo.default_branch());
    assert_eq!(tip, id);
}
