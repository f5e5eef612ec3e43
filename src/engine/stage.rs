//! engine::stage
//!
//! Stage and unstage working files.
//!
//! Every path is resolved before the index is touched, so one bad path
//! leaves the index exactly as it was.

use std::path::{Path, PathBuf};

use tracing::debug;

use super::EngineError;
use crate::core::hash::hash_bytes;
use crate::core::object::Tree;
use crate::core::paths::{PathError, REPO_DIR_NAME};
use crate::repo::fs::{self, EntryKind};
use crate::repo::{IndexEntry, IndexUpdate, Repository};

/// What `stage` did to each path.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StageReport {
    /// Paths staged with new content.
    pub staged: Vec<String>,
    /// Paths staged for removal.
    pub deleted: Vec<String>,
    /// Paths identical to the current commit, dropped from the index.
    pub unchanged: Vec<String>,
}

enum Target {
    File(String),
    Removal(String),
}

/// Stage files, directories, or removed tracked paths.
pub fn stage(repo: &Repository, cwd: &Path, inputs: &[PathBuf]) -> Result<StageReport, EngineError> {
    let _lock = repo.lock()?;
    let (_, _, head) = repo.head()?;

    let mut targets = Vec::new();
    for input in inputs {
        targets.extend(resolve(repo, head.tree(), cwd, input)?);
    }

    let objects = repo.objects();
    let mut updates = Vec::with_capacity(targets.len());
    let mut report = StageReport::default();

    for target in targets {
        match target {
            Target::File(path) => {
                let content = fs::read_file(&repo.paths().work_path(&path))?;
                let id = hash_bytes(&content);
                if head.tree().get(&path) == Some(&id) {
                    updates.push(IndexUpdate::Unstage(path.clone()));
                    report.unchanged.push(path);
                    continue;
                }
                objects.put_blob(&content)?;
                debug!(%path, blob = %id, "staged file");
                updates.push(IndexUpdate::Stage(path.clone(), IndexEntry::Tracked(id)));
                report.staged.push(path);
            }
            Target::Removal(path) => {
                debug!(%path, "staged removal");
                updates.push(IndexUpdate::Stage(path.clone(), IndexEntry::MarkedForDeletion));
                report.deleted.push(path);
            }
        }
    }

    repo.index().update(updates)?;
    Ok(report)
}

/// Remove paths from the index.
///
/// A directory unstages everything staged beneath it. Returns the paths
/// removed from the index.
pub fn unstage(repo: &Repository, cwd: &Path, inputs: &[PathBuf]) -> Result<Vec<String>, EngineError> {
    let _lock = repo.lock()?;
    let index = repo.index();
    let staged = index.load()?;

    let mut selected = Vec::new();
    for input in inputs {
        let prefix = relative(repo, cwd, input)?;
        let matches: Vec<String> = staged
            .iter()
            .map(|(path, _)| path)
            .filter(|path| under(path, &prefix))
            .map(str::to_string)
            .collect();
        if matches.is_empty() {
            return Err(EngineError::NotStaged(display_path(&prefix, input)));
        }
        selected.extend(matches);
    }

    selected.sort();
    selected.dedup();
    index.update(selected.iter().cloned().map(IndexUpdate::Unstage))?;
    Ok(selected)
}

/// Root-relative form of a user path; the repository root itself is "".
fn relative(repo: &Repository, cwd: &Path, input: &Path) -> Result<String, EngineError> {
    match repo.paths().tracked_path(cwd, input) {
        Ok(path) => Ok(path),
        Err(PathError::Root(_)) => Ok(String::new()),
        Err(e) => Err(e.into()),
    }
}

fn resolve(repo: &Repository, tracked: &Tree, cwd: &Path, input: &Path) -> Result<Vec<Target>, EngineError> {
    let rel = relative(repo, cwd, input)?;
    let abs = if rel.is_empty() {
        repo.root().to_path_buf()
    } else {
        repo.paths().work_path(&rel)
    };

    match fs::stat(&abs)? {
        Some(EntryKind::File) => Ok(vec![Target::File(rel)]),
        Some(EntryKind::Dir) => {
            let skip: &[&str] = if rel.is_empty() { &[REPO_DIR_NAME] } else { &[] };
            let files = fs::list_files_recursive(&abs, skip)?;
            let on_disk: Vec<String> = files.into_iter().map(|f| join(&rel, &f)).collect();

            let mut targets: Vec<Target> = tracked
                .paths()
                .filter(|path| under(path, &rel) && !on_disk.iter().any(|f| f == path))
                .map(|path| Target::Removal(path.to_string()))
                .collect();
            targets.extend(on_disk.into_iter().map(Target::File));
            Ok(targets)
        }
        None => {
            let removed: Vec<Target> = tracked
                .paths()
                .filter(|path| under(path, &rel))
                .map(|path| Target::Removal(path.to_string()))
                .collect();
            if removed.is_empty() {
                Err(EngineError::NoSuchPath(input.to_path_buf()))
            } else {
                Ok(removed)
            }
        }
    }
}

/// Whether `path` is `prefix` or lies beneath it.
fn under(path: &str, prefix: &str) -> bool {
    prefix.is_empty()
        || path == prefix
        || (path.starts_with(prefix) && path.as_bytes().get(prefix.len()) == Some(&b'/'))
}

fn join(dir: &str, file: &str) -> String {
    if dir.is_empty() {
        file.to_string()
    } else {
        format!("{}/{}", dir, file)
    }
}

fn display_path(rel: &str, input: &Path) -> String {
    if rel.is_empty() {
        input.display().to_string()
    } else {
        rel.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::commit::commit;
    use tempfile::TempDir;

    fn setup() -> (TempDir, Repository) {
        let temp = TempDir::new().expect("create temp dir");
        let (repo, _) = Repository::init(temp.path()).expect("init");
        (temp, repo)
    }

    fn write(repo: &Repository, path: &str, content: &str) {
        let abs = repo.paths().work_path(path);
        std::fs::create_dir_all(abs.parent().unwrap()).unwrap();
        std::fs::write(abs, content).unwrap();
    }

    fn paths(items: &[&str]) -> Vec<PathBuf> {
        items.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn stage_single_file() {
        let (_temp, repo) = setup();
        write(&repo, "a.txt", "hello");

        let report = stage(&repo, repo.root(), &paths(&["a.txt"])).unwrap();
        assert_eq!(report.staged, vec!["a.txt"]);
        assert!(repo.index().is_staged("a.txt").unwrap());
    }

    #[test]
    fn stage_directory_recursively_from_subdir() {
        let (_temp, repo) = setup();
        write(&repo, "src/a.rs", "a");
        write(&repo, "src/nested/b.rs", "b");
        write(&repo, "other.txt", "o");

        let cwd = repo.root().join("src");
        let report = stage(&repo, &cwd, &paths(&["."])).unwrap();
        assert_eq!(report.staged, vec!["src/a.rs", "src/nested/b.rs"]);
        assert!(!repo.index().is_staged("other.txt").unwrap());
    }

    #[test]
    fn stage_root_skips_repository_dir() {
        let (_temp, repo) = setup();
        write(&repo, "a.txt", "a");

        let report = stage(&repo, repo.root(), &paths(&["."])).unwrap();
        assert_eq!(report.staged, vec!["a.txt"]);
    }

    #[test]
    fn unknown_path_leaves_index_untouched() {
        let (_temp, repo) = setup();
        write(&repo, "a.txt", "a");

        let err = stage(&repo, repo.root(), &paths(&["a.txt", "missing.txt"])).unwrap_err();
        assert!(matches!(err, EngineError::NoSuchPath(_)));
        assert!(repo.index().load().unwrap().is_empty());
    }

    #[test]
    fn internal_paths_are_rejected() {
        let (_temp, repo) = setup();
        assert!(matches!(
            stage(&repo, repo.root(), &paths(&[".vms/HEAD"])),
            Err(EngineError::Path(PathError::Managed(_)))
        ));
    }

    #[test]
    fn removed_tracked_file_stages_deletion() {
        let (_temp, repo) = setup();
        write(&repo, "a.txt", "a");
        stage(&repo, repo.root(), &paths(&["a.txt"])).unwrap();
        commit(&repo, "add a").unwrap();

        std::fs::remove_file(repo.paths().work_path("a.txt")).unwrap();
        let report = stage(&repo, repo.root(), &paths(&["a.txt"])).unwrap();
        assert_eq!(report.deleted, vec!["a.txt"]);
        assert_eq!(
            repo.index().load().unwrap().get("a.txt"),
            Some(&IndexEntry::MarkedForDeletion)
        );
    }

    #[test]
    fn restaging_committed_content_unstages() {
        let (_temp, repo) = setup();
        write(&repo, "a.txt", "v1");
        stage(&repo, repo.root(), &paths(&["a.txt"])).unwrap();
        commit(&repo, "v1").unwrap();

        write(&repo, "a.txt", "v2");
        stage(&repo, repo.root(), &paths(&["a.txt"])).unwrap();
        write(&repo, "a.txt", "v1");
        let report = stage(&repo, repo.root(), &paths(&["a.txt"])).unwrap();

        assert_eq!(report.unchanged, vec!["a.txt"]);
        assert!(repo.index().load().unwrap().is_empty());
    }

    #[test]
    fn staging_twice_keeps_one_cache_object() {
        let (_temp, repo) = setup();
        write(&repo, "a.txt", "same");
        stage(&repo, repo.root(), &paths(&["a.txt"])).unwrap();
        let first = repo.index().load().unwrap();
        stage(&repo, repo.root(), &paths(&["a.txt"])).unwrap();

        assert_eq!(repo.index().load().unwrap(), first);
        let cached = fs::list_entries(&repo.paths().cache_dir()).names().unwrap().count();
        assert_eq!(cached, 1);
    }

    #[test]
    fn unstage_requires_staged_path() {
        let (_temp, repo) = setup();
        write(&repo, "a.txt", "a");
        write(&repo, "b.txt", "b");
        stage(&repo, repo.root(), &paths(&["a.txt"])).unwrap();

        assert!(matches!(
            unstage(&repo, repo.root(), &paths(&["a.txt", "b.txt"])),
            Err(EngineError::NotStaged(p)) if p == "b.txt"
        ));
        // Nothing was removed by the failed call.
        assert!(repo.index().is_staged("a.txt").unwrap());

        assert_eq!(unstage(&repo, repo.root(), &paths(&["a.txt"])).unwrap(), vec!["a.txt"]);
        assert!(repo.index().load().unwrap().is_empty());
    }

    #[test]
    fn under_matches_whole_components() {
        assert!(under("src/a.rs", "src"));
        assert!(under("src", "src"));
        assert!(!under("srcx/a.rs", "src"));
        assert!(under("anything", ""));
    }
}
