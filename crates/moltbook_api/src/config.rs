use std::path::PathBuf;
use std::time::Duration;

use agent_store::DataPaths;

use crate::routes::DEFAULT_BASE_URL;

/// Transport configuration for platform requests.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Origin plus versioned API prefix, e.g. `https://www.moltbook.com/api/v1`.
    pub base_url: String,
    /// Local data directory layout (cookie jar and response snapshots).
    pub paths: DataPaths,
    /// Optional `User-Agent` override.
    pub user_agent: Option<String>,
    /// Optional request timeout applied by the HTTP client.
    pub timeout: Option<Duration>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            paths: DataPaths::default(),
            user_agent: None,
            timeout: None,
        }
    }
}

impl ApiConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.paths = DataPaths::new(data_dir);
        self
    }

    pub fn with_paths(mut self, paths: DataPaths) -> Self {
        self.paths = paths;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn user_agent(&self) -> String {
        self.user_agent
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_owned)
            .unwrap_or_else(|| format!("moltbook-tui/{}", env!("CARGO_PKG_VERSION")))
    }
}
