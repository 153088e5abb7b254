//! Local persistence for the moltbook client.
//!
//! Everything on disk is a pretty-printed JSON document under one data
//! directory (see [`DataPaths`]). Access goes through the narrow
//! [`Filesystem`] capability so tests can run against [`MemoryFilesystem`].

mod credentials;
mod error;
mod fs;
mod paths;
mod schema;
mod store;

pub use credentials::CredentialStore;
pub use error::StoreError;
pub use fs::{Filesystem, MemoryFilesystem, StdFilesystem};
pub use paths::{
    DataPaths, COOKIE_FILE, CREDENTIALS_FILE, DEFAULT_DATA_DIR, FEED_FILE, POSTS_FILE,
    REGISTRATION_FILE,
};
pub use schema::{ClaimInfo, Credentials, RegistrationRecord};
pub use store::JsonStore;
