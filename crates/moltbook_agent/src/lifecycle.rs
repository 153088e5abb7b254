use std::io;

use agent_store::{ClaimInfo, CredentialStore, Credentials, StoreError};
use async_trait::async_trait;
use moltbook_api::{ApiError, RegisteredAgent};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Storage(#[from] StoreError),
    #[error("registration failed: {0}")]
    Registration(#[from] ApiError),
    #[error("registration was abandoned before an agent was created")]
    Aborted,
    #[error("prompt failed: {0}")]
    Prompt(#[from] io::Error),
}

/// An agent created by a [`Registrar`], with the name it was registered under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAgent {
    pub name: String,
    pub agent: RegisteredAgent,
}

/// Obtains a freshly registered agent, typically by asking the operator.
#[async_trait]
pub trait Registrar: Send {
    async fn register(&mut self) -> Result<NewAgent, LifecycleError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    NoCredentials,
    Registering,
    HaveCredentials,
}

/// The key to use for this run and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiKeyResult {
    pub api_key: String,
    /// `None` when the stored name is empty.
    pub agent_name: Option<String>,
    pub claim_url: Option<String>,
    pub verification_code: Option<String>,
    /// Registration ran during this resolution.
    pub is_new: bool,
}

impl ApiKeyResult {
    #[must_use]
    pub fn claim_info(&self) -> ClaimInfo {
        ClaimInfo {
            claim_url: self.claim_url.clone(),
            verification_code: self.verification_code.clone(),
        }
    }
}

/// Decides once per run whether to reuse stored credentials or register.
///
/// A stored non-empty key always wins, even if the platform has since
/// revoked it; recovering from that means deleting `credentials.json`.
#[derive(Debug)]
pub struct CredentialLifecycle {
    credentials: CredentialStore,
    state: LifecycleState,
}

impl CredentialLifecycle {
    #[must_use]
    pub fn new(credentials: CredentialStore) -> Self {
        Self {
            credentials,
            state: LifecycleState::NoCredentials,
        }
    }

    #[must_use]
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub async fn resolve(
        &mut self,
        registrar: &mut dyn Registrar,
    ) -> Result<ApiKeyResult, LifecycleError> {
        if let Some(stored) = self.stored_credentials()? {
            self.state = LifecycleState::HaveCredentials;
            return Ok(self.reuse(stored));
        }

        info!("no stored api key, registering a new agent");
        self.state = LifecycleState::Registering;
        let NewAgent { name, agent } = match registrar.register().await {
            Ok(new_agent) => new_agent,
            Err(error) => {
                self.state = LifecycleState::NoCredentials;
                return Err(error);
            }
        };

        let claim = ClaimInfo {
            claim_url: non_empty(agent.claim_url),
            verification_code: non_empty(agent.verification_code),
        };
        let credentials = Credentials::new(agent.api_key, name).with_claim(claim);
        if let Err(error) = self.credentials.save(&credentials) {
            self.state = LifecycleState::NoCredentials;
            return Err(error.into());
        }
        self.state = LifecycleState::HaveCredentials;
        info!(agent = %credentials.agent_name, "saved credentials for new agent");

        Ok(ApiKeyResult {
            agent_name: non_empty(credentials.agent_name),
            api_key: credentials.api_key,
            claim_url: credentials.claim_url,
            verification_code: credentials.verification_code,
            is_new: true,
        })
    }

    fn stored_credentials(&self) -> Result<Option<Credentials>, StoreError> {
        Ok(self
            .credentials
            .load()?
            .filter(|stored| !stored.api_key.is_empty()))
    }

    fn reuse(&self, stored: Credentials) -> ApiKeyResult {
        let mut claim = stored.claim_info();
        if claim.claim_url.is_none() {
            if let Some(legacy) = self
                .credentials
                .load_registration_claim()
                .filter(ClaimInfo::has_any)
            {
                debug!("using claim info from registration document");
                claim = legacy;
            }
        }

        ApiKeyResult {
            api_key: stored.api_key,
            agent_name: non_empty(stored.agent_name),
            claim_url: claim.claim_url,
            verification_code: claim.verification_code,
            is_new: false,
        }
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}
