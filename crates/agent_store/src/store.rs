use std::fmt;
use std::io;
use std::path::Path;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::StoreError;
use crate::fs::{Filesystem, StdFilesystem};

/// Reads and writes pretty-printed JSON documents through a [`Filesystem`].
#[derive(Clone)]
pub struct JsonStore {
    fs: Arc<dyn Filesystem>,
}

impl fmt::Debug for JsonStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonStore").finish_non_exhaustive()
    }
}

impl Default for JsonStore {
    fn default() -> Self {
        Self::on_disk()
    }
}

impl JsonStore {
    #[must_use]
    pub fn new(fs: Arc<dyn Filesystem>) -> Self {
        Self { fs }
    }

    #[must_use]
    pub fn on_disk() -> Self {
        Self::new(Arc::new(StdFilesystem))
    }

    #[must_use]
    pub fn exists(&self, path: &Path) -> bool {
        self.fs.exists(path)
    }

    /// Creates `path` and its parents unless it already exists.
    pub fn ensure_directory(&self, path: &Path) -> Result<(), StoreError> {
        if self.fs.exists(path) {
            return Ok(());
        }

        debug!(path = %path.display(), "creating data directory");
        self.fs
            .create_dir_all(path)
            .map_err(|source| StoreError::io("creating directory", path, source))
    }

    /// Reads and parses a document. Does not check existence first: a
    /// missing file is reported as [`StoreError::NotFound`].
    pub fn read_document<T: DeserializeOwned>(&self, path: &Path) -> Result<T, StoreError> {
        let raw = self.fs.read_to_string(path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                StoreError::NotFound {
                    path: path.to_path_buf(),
                }
            } else {
                StoreError::io("reading document", path, source)
            }
        })?;

        serde_json::from_str(&raw).map_err(|source| StoreError::parse(path, source))
    }

    /// Serializes `value` with two-space indentation and overwrites `path`.
    pub fn write_document<T: Serialize + ?Sized>(
        &self,
        path: &Path,
        value: &T,
    ) -> Result<(), StoreError> {
        let raw = serde_json::to_string_pretty(value)
            .map_err(|source| StoreError::serialize(path, source))?;

        self.fs
            .write(path, &raw)
            .map_err(|source| StoreError::io("writing document", path, source))
    }
}

#[cfg(test)]
mod tests {
    use super::JsonStore;
    use crate::fs::MemoryFilesystem;
    use serde_json::{json, Value};
    use std::path::Path;
    use std::sync::Arc;

    #[test]
    fn write_document_uses_two_space_indentation() {
        let fs = Arc::new(MemoryFilesystem::new());
        let store = JsonStore::new(fs.clone());

        store
            .write_document(Path::new("/d/feed.json"), &json!({"data": []}))
            .expect("write");

        assert_eq!(
            fs.file("/d/feed.json").as_deref(),
            Some("{\n  \"data\": []\n}")
        );
    }

    #[test]
    fn read_document_distinguishes_missing_from_malformed() {
        let fs = Arc::new(MemoryFilesystem::new().with_file("/d/bad.json", "{not json"));
        let store = JsonStore::new(fs);

        let missing = store
            .read_document::<Value>(Path::new("/d/none.json"))
            .expect_err("missing");
        assert!(missing.is_not_found());

        let malformed = store
            .read_document::<Value>(Path::new("/d/bad.json"))
            .expect_err("malformed");
        assert!(matches!(malformed, crate::StoreError::Parse { .. }));
    }
}
