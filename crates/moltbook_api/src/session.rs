use std::sync::Arc;

use agent_store::JsonStore;
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::config::ApiConfig;
use crate::cookies::CookieJar;
use crate::envelope::normalize_response;
use crate::error::{ApiError, DEFAULT_REQUEST_ERROR};
use crate::headers::{merge_request_headers, HeaderInput, HEADER_COOKIE, HEADER_SET_COOKIE};
use crate::routes::join_endpoint;
use crate::transport::{HttpRequest, HttpTransport};

/// Method, extra headers and body for one authenticated call.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: HeaderInput,
    pub body: Option<Vec<u8>>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self::get()
    }
}

impl RequestOptions {
    fn with_method(method: Method) -> Self {
        Self {
            method,
            headers: HeaderInput::None,
            body: None,
        }
    }

    #[must_use]
    pub fn get() -> Self {
        Self::with_method(Method::GET)
    }

    #[must_use]
    pub fn post() -> Self {
        Self::with_method(Method::POST)
    }

    #[must_use]
    pub fn delete() -> Self {
        Self::with_method(Method::DELETE)
    }

    #[must_use]
    pub fn patch() -> Self {
        Self::with_method(Method::PATCH)
    }

    pub fn with_json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, ApiError> {
        self.body = Some(serde_json::to_vec(body).map_err(ApiError::Encode)?);
        Ok(self)
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    #[must_use]
    pub fn with_headers(mut self, headers: impl Into<HeaderInput>) -> Self {
        self.headers = headers.into();
        self
    }
}

/// Authenticated calls sharing one persisted cookie jar.
///
/// The jar lock is held from header construction until the post-call save,
/// so calls through one session are serialized.
pub struct SessionTransport {
    config: ApiConfig,
    transport: Arc<dyn HttpTransport>,
    store: JsonStore,
    jar: Mutex<CookieJar>,
}

impl std::fmt::Debug for SessionTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTransport")
            .field("base_url", &self.config.base_url)
            .field("data_dir", &self.config.paths.root())
            .finish_non_exhaustive()
    }
}

impl SessionTransport {
    /// Ensures the data directory and loads the saved jar (empty if absent or unreadable).
    pub fn new(
        config: ApiConfig,
        transport: Arc<dyn HttpTransport>,
        store: JsonStore,
    ) -> Result<Self, ApiError> {
        store.ensure_directory(config.paths.root())?;
        let jar = CookieJar::load(&store, &config.paths.cookies())?;
        debug!(cookies = jar.cookies().len(), "loaded cookie jar");

        Ok(Self {
            config,
            transport,
            store,
            jar: Mutex::new(jar),
        })
    }

    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Snapshot of the in-memory jar.
    pub async fn cookie_jar(&self) -> CookieJar {
        self.jar.lock().await.clone()
    }

    /// Sends one authenticated call and returns the normalized JSON body.
    ///
    /// The jar is saved after every call that reached the server, whatever
    /// the business outcome. A save failure is returned only when the call
    /// itself succeeded; otherwise the call's error wins and the save
    /// failure is logged.
    pub async fn send(
        &self,
        api_key: &str,
        path: &str,
        options: RequestOptions,
    ) -> Result<Value, ApiError> {
        let RequestOptions {
            method,
            headers,
            body,
        } = options;
        let url = join_endpoint(&self.config.base_url, path);

        let mut jar = self.jar.lock().await;

        let mut headers = merge_request_headers(Some(api_key), headers);
        if let Some(cookie) = jar.cookie_header(&url) {
            headers.insert(HEADER_COOKIE, cookie);
        }

        let response = self
            .transport
            .send(HttpRequest {
                method: method.clone(),
                url: url.clone(),
                headers,
                body,
            })
            .await?;
        debug!(%method, path, status = response.status.as_u16(), "authenticated call");

        jar.store_response_cookies(response.header_values(HEADER_SET_COOKIE), &url);
        let saved = jar.save(&self.store, &self.config.paths.cookies());
        drop(jar);

        let outcome = parse_body(response.status, &response.body, path)
            .and_then(|body| normalize_response(response.status, body));

        match (outcome, saved) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(save_error)) => Err(save_error.into()),
            (Err(error), Ok(())) => Err(error),
            (Err(error), Err(save_error)) => {
                warn!(%save_error, "cookie jar save failed after a failed call");
                Err(error)
            }
        }
    }
}

/// Parses the body as JSON. A non-OK response with an unreadable body is a
/// plain request failure rather than a decode error.
fn parse_body(status: reqwest::StatusCode, body: &[u8], path: &str) -> Result<Value, ApiError> {
    match serde_json::from_slice(body) {
        Ok(value) => Ok(value),
        Err(_) if !status.is_success() => Err(ApiError::RequestFailed {
            status,
            message: DEFAULT_REQUEST_ERROR.to_string(),
        }),
        Err(source) => Err(ApiError::Decode {
            path: path.to_string(),
            source,
        }),
    }
}
