//! repo::fs
//!
//! Filesystem helpers used by the storage layer.
//!
//! Every helper reports failures as [`StoreError::Io`] carrying the
//! operation and path, so callers never need to add that context themselves.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use super::StoreError;

fn io_err(op: &'static str, path: &Path) -> impl FnOnce(io::Error) -> StoreError {
    let path = path.to_path_buf();
    move |source| StoreError::Io { op, path, source }
}

/// Create a directory and any missing parents.
pub fn make_dir(path: &Path) -> Result<(), StoreError> {
    fs::create_dir_all(path).map_err(io_err("create directory", path))
}

/// Read a whole file.
pub fn read_file(path: &Path) -> Result<Vec<u8>, StoreError> {
    fs::read(path).map_err(io_err("read", path))
}

/// Write a file atomically (temp file, fsync, rename).
///
/// Parent directories are created as needed.
pub fn write_file(path: &Path, contents: &[u8]) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        make_dir(parent)?;
    }

    let mut temp_name = path.file_name().unwrap_or_default().to_os_string();
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);

    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp_path)
        .map_err(io_err("create", &temp_path))?;
    file.write_all(contents)
        .map_err(io_err("write", &temp_path))?;
    file.sync_all().map_err(io_err("sync", &temp_path))?;

    fs::rename(&temp_path, path).map_err(io_err("rename into", path))
}

/// Write a working-tree file in place, creating parent directories.
pub fn write_work_file(path: &Path, contents: &[u8]) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        make_dir(parent)?;
    }
    fs::write(path, contents).map_err(io_err("write", path))
}

/// Remove a file. A file that is already gone is not an error.
pub fn remove_file(path: &Path) -> Result<(), StoreError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(io_err("remove", path)(e)),
    }
}

/// Remove a directory if it has no entries. Returns whether it was removed.
pub fn remove_empty_dir(path: &Path) -> Result<bool, StoreError> {
    if list_entries(path).names()?.next().is_some() {
        return Ok(false);
    }
    fs::remove_dir(path).map_err(io_err("remove directory", path))?;
    Ok(true)
}

/// Move `src` to `dst`, replacing `dst` if present.
pub fn move_file(src: &Path, dst: &Path) -> Result<(), StoreError> {
    fs::rename(src, dst).map_err(io_err("move", src))
}

/// Mark a file read-only.
pub fn set_read_only(path: &Path) -> Result<(), StoreError> {
    let mut perms = fs::metadata(path)
        .map_err(io_err("stat", path))?
        .permissions();
    perms.set_readonly(true);
    fs::set_permissions(path, perms).map_err(io_err("chmod", path))
}

/// What lives at a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
}

/// Stat a path; `Ok(None)` when nothing is there.
pub fn stat(path: &Path) -> Result<Option<EntryKind>, StoreError> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_dir() => Ok(Some(EntryKind::Dir)),
        Ok(_) => Ok(Some(EntryKind::File)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(io_err("stat", path)(e)),
    }
}

/// A directory listing that can be iterated any number of times.
///
/// Each call to [`EntryList::names`] re-reads the directory, so the listing
/// reflects the directory at the moment of iteration.
#[derive(Debug, Clone)]
pub struct EntryList {
    dir: PathBuf,
}

/// List the entries of a directory.
pub fn list_entries(dir: &Path) -> EntryList {
    EntryList {
        dir: dir.to_path_buf(),
    }
}

impl EntryList {
    /// Entry names in ascending order.
    pub fn names(&self) -> Result<impl Iterator<Item = String>, StoreError> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.dir).map_err(io_err("list", &self.dir))? {
            let entry = entry.map_err(io_err("list", &self.dir))?;
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        Ok(names.into_iter())
    }
}

/// All files under `dir`, as `/`-separated paths relative to `dir`.
///
/// Directories named in `skip` are not descended into at the top level.
pub fn list_files_recursive(dir: &Path, skip: &[&str]) -> Result<Vec<String>, StoreError> {
    let mut files = Vec::new();
    let mut pending = vec![(dir.to_path_buf(), String::new())];

    while let Some((current, prefix)) = pending.pop() {
        for name in list_entries(&current).names()? {
            if prefix.is_empty() && skip.contains(&name.as_str()) {
                continue;
            }
            let path = current.join(&name);
            let relative = if prefix.is_empty() {
                name
            } else {
                format!("{}/{}", prefix, name)
            };
            match stat(&path)? {
                Some(EntryKind::Dir) => pending.push((path, relative)),
                Some(EntryKind::File) => files.push(relative),
                None => {}
            }
        }
    }

    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn write_file_is_atomic_and_creates_parents() {
        let temp = TempDir::new().expect("create temp dir");
        let path = temp.path().join("a/b/c.txt");

        write_file(&path, b"hello").expect("write");
        assert_eq!(read_file(&path).unwrap(), b"hello");
        assert!(!temp.path().join("a/b/c.txt.tmp").exists());
    }

    #[test]
    fn remove_missing_file_is_ok() {
        let temp = TempDir::new().expect("create temp dir");
        remove_file(&temp.path().join("nope")).expect("remove");
    }

    #[test]
    fn read_missing_file_reports_path() {
        let temp = TempDir::new().expect("create temp dir");
        let path = temp.path().join("nope");
        match read_file(&path) {
            Err(StoreError::Io { op, path: p, .. }) => {
                assert_eq!(op, "read");
                assert_eq!(p, path);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn stat_distinguishes_kinds() {
        let temp = TempDir::new().expect("create temp dir");
        fs::write(temp.path().join("f"), "x").unwrap();
        assert_eq!(stat(temp.path()).unwrap(), Some(EntryKind::Dir));
        assert_eq!(stat(&temp.path().join("f")).unwrap(), Some(EntryKind::File));
        assert_eq!(stat(&temp.path().join("g")).unwrap(), None);
    }

    #[test]
    fn entry_list_is_restartable() {
        let temp = TempDir::new().expect("create temp dir");
        fs::write(temp.path().join("b"), "").unwrap();
        fs::write(temp.path().join("a"), "").unwrap();

        let list = list_entries(temp.path());
        let first: Vec<_> = list.names().unwrap().collect();
        fs::write(temp.path().join("c"), "").unwrap();
        let second: Vec<_> = list.names().unwrap().collect();

        assert_eq!(first, vec!["a", "b"]);
        assert_eq!(second, vec!["a", "b", "c"]);
    }

    #[test]
    fn recursive_listing_skips_top_level_dirs() {
        let temp = TempDir::new().expect("create temp dir");
        fs::create_dir_all(temp.path().join(".vms/objects")).unwrap();
        fs::create_dir_all(temp.path().join("src/nested")).unwrap();
        fs::write(temp.path().join(".vms/HEAD"), "").unwrap();
        fs::write(temp.path().join("src/nested/.vms"), "").unwrap();
        fs::write(temp.path().join("src/lib.rs"), "").unwrap();
        fs::write(temp.path().join("README"), "").unwrap();

        let files = list_files_recursive(temp.path(), &[".vms"]).unwrap();
        assert_eq!(files, vec!["README", "src/lib.rs", "src/nested/.vms"]);
    }

    #[test]
    fn read_only_after_chmod() {
        let temp = TempDir::new().expect("create temp dir");
        let path = temp.path().join("obj");
        fs::write(&path, "x").unwrap();
        set_read_only(&path).unwrap();
        assert!(fs::metadata(&path).unwrap().permissions().readonly());
    }
}
