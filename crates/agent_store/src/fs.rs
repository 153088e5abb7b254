//! Filesystem capability used by [`crate::JsonStore`].
//!
//! The store only ever needs four operations, so callers can swap the real
//! disk for [`MemoryFilesystem`] in tests.

use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

pub trait Filesystem: Send + Sync {
    fn exists(&self, path: &Path) -> bool;
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;
    fn read_to_string(&self, path: &Path) -> io::Result<String>;
    fn write(&self, path: &Path, contents: &str) -> io::Result<()>;
}

/// Real disk access through `std::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdFilesystem;

impl Filesystem for StdFilesystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        std::fs::write(path, contents)
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    files: BTreeMap<PathBuf, String>,
    dirs: BTreeSet<PathBuf>,
    create_dir_calls: Vec<PathBuf>,
    writes: Vec<(PathBuf, String)>,
    failing_writes: BTreeSet<PathBuf>,
}

/// In-memory filesystem that records every directory creation and write.
#[derive(Debug, Default)]
pub struct MemoryFilesystem {
    state: Mutex<MemoryState>,
}

impl MemoryFilesystem {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_file(self, path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        self.insert_file(path, contents);
        self
    }

    pub fn insert_file(&self, path: impl Into<PathBuf>, contents: impl Into<String>) {
        lock_unpoisoned(&self.state)
            .files
            .insert(path.into(), contents.into());
    }

    /// Makes every later write to `path` fail with an I/O error.
    pub fn fail_writes_to(&self, path: impl Into<PathBuf>) {
        lock_unpoisoned(&self.state)
            .failing_writes
            .insert(path.into());
    }

    #[must_use]
    pub fn file(&self, path: impl AsRef<Path>) -> Option<String> {
        lock_unpoisoned(&self.state)
            .files
            .get(path.as_ref())
            .cloned()
    }

    #[must_use]
    pub fn create_dir_calls(&self) -> Vec<PathBuf> {
        lock_unpoisoned(&self.state).create_dir_calls.clone()
    }

    #[must_use]
    pub fn writes(&self) -> Vec<(PathBuf, String)> {
        lock_unpoisoned(&self.state).writes.clone()
    }

    #[must_use]
    pub fn writes_to(&self, path: impl AsRef<Path>) -> usize {
        let path = path.as_ref();
        lock_unpoisoned(&self.state)
            .writes
            .iter()
            .filter(|(written, _)| written == path)
            .count()
    }
}

impl Filesystem for MemoryFilesystem {
    fn exists(&self, path: &Path) -> bool {
        let state = lock_unpoisoned(&self.state);
        state.files.contains_key(path) || state.dirs.contains(path)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        let mut state = lock_unpoisoned(&self.state);
        state.create_dir_calls.push(path.to_path_buf());
        for ancestor in path.ancestors() {
            if !ancestor.as_os_str().is_empty() {
                state.dirs.insert(ancestor.to_path_buf());
            }
        }
        Ok(())
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        lock_unpoisoned(&self.state)
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such file"))
    }

    fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        let mut state = lock_unpoisoned(&self.state);
        if state.failing_writes.contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "write rejected",
            ));
        }
        state
            .writes
            .push((path.to_path_buf(), contents.to_owned()));
        state.files.insert(path.to_path_buf(), contents.to_owned());
        Ok(())
    }
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[cfg(test)]
mod tests {
    use super::{Filesystem, MemoryFilesystem};
    use std::io::ErrorKind;
    use std::path::Path;

    #[test]
    fn create_dir_all_marks_ancestors_as_existing() {
        let fs = MemoryFilesystem::new();
        fs.create_dir_all(Path::new("/data/agent")).expect("create");

        assert!(fs.exists(Path::new("/data/agent")));
        assert!(fs.exists(Path::new("/data")));
        assert_eq!(fs.create_dir_calls().len(), 1);
    }

    #[test]
    fn missing_file_reads_as_not_found() {
        let fs = MemoryFilesystem::new();
        let error = fs
            .read_to_string(Path::new("/nope.json"))
            .expect_err("missing file must fail");
        assert_eq!(error.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn failing_write_leaves_previous_contents() {
        let fs = MemoryFilesystem::new().with_file("/cookie.json", "{}");
        fs.fail_writes_to("/cookie.json");

        assert!(fs.write(Path::new("/cookie.json"), "[]").is_err());
        assert_eq!(fs.file("/cookie.json").as_deref(), Some("{}"));
        assert!(fs.writes().is_empty());
    }
}
