use std::fmt;
use std::sync::Arc;

use agent_store::JsonStore;
use serde_json::Value;
use tracing::debug;

use crate::config::ApiConfig;
use crate::envelope::{normalize_feed, FeedPage};
use crate::error::ApiError;
use crate::payload::PostInput;
use crate::register::{register_agent, RegisteredAgent};
use crate::routes::with_query;
use crate::session::{RequestOptions, SessionTransport};
use crate::transport::{HttpTransport, ReqwestTransport};

pub const DEFAULT_FEED_LIMIT: u32 = 10;

struct ClientInner {
    transport: Arc<dyn HttpTransport>,
    store: JsonStore,
    session: SessionTransport,
}

/// Entry point for every platform call.
///
/// Cheap to clone; clones share one transport and one cookie jar.
#[derive(Clone)]
pub struct MoltbookClient {
    inner: Arc<ClientInner>,
}

impl fmt::Debug for MoltbookClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MoltbookClient")
            .field("session", &self.inner.session)
            .finish_non_exhaustive()
    }
}

impl MoltbookClient {
    /// Client over `reqwest` and the real disk.
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let transport = Arc::new(ReqwestTransport::new(&config)?);
        Self::with_parts(config, transport, JsonStore::on_disk())
    }

    /// Client over caller-supplied capabilities. Creates the data directory
    /// and loads the saved cookie jar.
    pub fn with_parts(
        config: ApiConfig,
        transport: Arc<dyn HttpTransport>,
        store: JsonStore,
    ) -> Result<Self, ApiError> {
        let session = SessionTransport::new(config, transport.clone(), store.clone())?;
        Ok(Self {
            inner: Arc::new(ClientInner {
                transport,
                store,
                session,
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        self.inner.session.config()
    }

    #[must_use]
    pub fn store(&self) -> &JsonStore {
        &self.inner.store
    }

    #[must_use]
    pub fn session(&self) -> &SessionTransport {
        &self.inner.session
    }

    pub async fn request(
        &self,
        api_key: &str,
        path: &str,
        options: RequestOptions,
    ) -> Result<Value, ApiError> {
        self.inner.session.send(api_key, path, options).await
    }

    pub async fn register_agent(
        &self,
        name: &str,
        description: &str,
    ) -> Result<RegisteredAgent, ApiError> {
        register_agent(self.inner.transport.as_ref(), self.config(), name, description).await
    }

    /// Newest-first feed page. The normalized page is also written to
    /// `feed.json`.
    pub async fn get_feed(&self, api_key: &str, page: u32, limit: u32) -> Result<FeedPage, ApiError> {
        let (page, limit) = (page.to_string(), limit.to_string());
        let path = with_query(
            "/feed",
            [("sort", "new"), ("limit", limit.as_str()), ("page", page.as_str())],
        );

        let body = self.request(api_key, &path, RequestOptions::get()).await?;
        let feed = normalize_feed(body);
        debug!(items = feed.len(), page = %page, "fetched feed");

        self.store()
            .write_document(&self.config().paths.feed(), &feed)?;
        Ok(feed)
    }

    /// Creates a post and writes the response to `posts.json`.
    pub async fn create_post(&self, api_key: &str, input: PostInput) -> Result<Value, ApiError> {
        let options = RequestOptions::post().with_json(&input.into_payload())?;
        let response = self.request(api_key, "/posts", options).await?;

        self.store()
            .write_document(&self.config().paths.posts(), &response)?;
        Ok(response)
    }

    pub async fn get_agent_status(&self, api_key: &str) -> Result<Value, ApiError> {
        self.request(api_key, "/agents/status", RequestOptions::get())
            .await
    }

    #[must_use]
    pub fn with_api_key(&self, api_key: impl Into<String>) -> AgentSession {
        AgentSession {
            client: self.clone(),
            api_key: api_key.into(),
        }
    }
}

/// A client bound to one agent's key.
#[derive(Clone)]
pub struct AgentSession {
    client: MoltbookClient,
    api_key: String,
}

impl fmt::Debug for AgentSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentSession")
            .field("client", &self.client)
            .finish_non_exhaustive()
    }
}

impl AgentSession {
    #[must_use]
    pub fn client(&self) -> &MoltbookClient {
        &self.client
    }

    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub async fn request(&self, path: &str, options: RequestOptions) -> Result<Value, ApiError> {
        self.client.request(&self.api_key, path, options).await
    }

    pub async fn get_feed(&self, page: u32, limit: u32) -> Result<FeedPage, ApiError> {
        self.client.get_feed(&self.api_key, page, limit).await
    }

    pub async fn create_post(&self, input: impl Into<PostInput>) -> Result<Value, ApiError> {
        self.client.create_post(&self.api_key, input.into()).await
    }

    pub async fn get_agent_status(&self) -> Result<Value, ApiError> {
        self.client.get_agent_status(&self.api_key).await
    }

    pub async fn claim_status(&self) -> Result<ClaimStatus, ApiError> {
        self.get_agent_status()
            .await
            .map(|body| ClaimStatus::from_response(&body))
    }
}

/// Claim state read from an `/agents/status` response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimStatus {
    Claimed,
    /// Any other reported status, e.g. `pending_claim`.
    Pending(String),
    /// The response carried no string `status`.
    Unknown,
}

impl ClaimStatus {
    #[must_use]
    pub fn from_response(body: &Value) -> Self {
        match body.get("status").and_then(Value::as_str) {
            Some("claimed") => Self::Claimed,
            Some(other) => Self::Pending(other.to_string()),
            None => Self::Unknown,
        }
    }

    #[must_use]
    pub fn is_claimed(&self) -> bool {
        matches!(self, Self::Claimed)
    }

    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Claimed => "claimed",
            Self::Pending(status) => status,
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::ClaimStatus;
    use serde_json::json;

    #[test]
    fn claim_status_reads_top_level_status() {
        assert_eq!(
            ClaimStatus::from_response(&json!({"status": "claimed"})),
            ClaimStatus::Claimed
        );
        assert_eq!(
            ClaimStatus::from_response(&json!({"success": true, "status": "pending_claim"})),
            ClaimStatus::Pending("pending_claim".to_string())
        );
        assert_eq!(
            ClaimStatus::from_response(&json!({"data": {"status": "claimed"}})),
            ClaimStatus::Unknown
        );
        assert_eq!(ClaimStatus::Unknown.to_string(), "unknown");
    }
}
