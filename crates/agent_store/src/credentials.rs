use tracing::debug;

use crate::error::StoreError;
use crate::paths::DataPaths;
use crate::schema::{ClaimInfo, Credentials, RegistrationRecord};
use crate::store::JsonStore;

/// Credential documents under a [`DataPaths`] root.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    store: JsonStore,
    paths: DataPaths,
}

impl CredentialStore {
    #[must_use]
    pub fn new(store: JsonStore, paths: DataPaths) -> Self {
        Self { store, paths }
    }

    #[must_use]
    pub fn paths(&self) -> &DataPaths {
        &self.paths
    }

    /// `None` when no credentials document exists yet.
    pub fn load(&self) -> Result<Option<Credentials>, StoreError> {
        let path = self.paths.credentials();
        if !self.store.exists(&path) {
            return Ok(None);
        }
        self.store.read_document(&path).map(Some)
    }

    /// The stored key, or `None` when there is no document or the key is empty.
    pub fn load_api_key(&self) -> Result<Option<String>, StoreError> {
        Ok(self
            .load()?
            .map(|credentials| credentials.api_key)
            .filter(|key| !key.is_empty()))
    }

    pub fn load_claim_info(&self) -> Result<Option<ClaimInfo>, StoreError> {
        Ok(self.load()?.map(|credentials| credentials.claim_info()))
    }

    /// Claim info from the legacy registration document. Absence and
    /// unreadable contents both yield `None`.
    #[must_use]
    pub fn load_registration_claim(&self) -> Option<ClaimInfo> {
        let path = self.paths.registration();
        match self.store.read_document::<RegistrationRecord>(&path) {
            Ok(record) => Some(record.into()),
            Err(error) => {
                debug!(path = %path.display(), %error, "no usable registration document");
                None
            }
        }
    }

    /// Overwrites the whole credentials document.
    pub fn save(&self, credentials: &Credentials) -> Result<(), StoreError> {
        self.store.ensure_directory(self.paths.root())?;
        self.store
            .write_document(&self.paths.credentials(), credentials)
    }
}
