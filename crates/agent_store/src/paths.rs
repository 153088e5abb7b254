use std::path::{Path, PathBuf};

pub const DEFAULT_DATA_DIR: &str = "./moltbook_data";

pub const CREDENTIALS_FILE: &str = "credentials.json";
pub const COOKIE_FILE: &str = "cookie.json";
pub const FEED_FILE: &str = "feed.json";
pub const POSTS_FILE: &str = "posts.json";
pub const REGISTRATION_FILE: &str = "registration.json";

/// Layout of the local data directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPaths {
    root: PathBuf,
}

impl Default for DataPaths {
    fn default() -> Self {
        Self::new(DEFAULT_DATA_DIR)
    }
}

impl DataPaths {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn credentials(&self) -> PathBuf {
        self.root.join(CREDENTIALS_FILE)
    }

    #[must_use]
    pub fn cookies(&self) -> PathBuf {
        self.root.join(COOKIE_FILE)
    }

    #[must_use]
    pub fn feed(&self) -> PathBuf {
        self.root.join(FEED_FILE)
    }

    #[must_use]
    pub fn posts(&self) -> PathBuf {
        self.root.join(POSTS_FILE)
    }

    /// Legacy document some installs still carry claim info in.
    #[must_use]
    pub fn registration(&self) -> PathBuf {
        self.root.join(REGISTRATION_FILE)
    }
}
