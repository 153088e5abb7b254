use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::config::ApiConfig;
use crate::error::{error_message, ApiError, DEFAULT_REGISTRATION_ERROR};
use crate::headers::{HeaderSet, CONTENT_TYPE_JSON, HEADER_CONTENT_TYPE};
use crate::routes::join_endpoint;
use crate::transport::{HttpRequest, HttpTransport};

pub const REGISTER_PATH: &str = "/agents/register";

/// Credentials handed out for a freshly registered agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredAgent {
    pub api_key: String,
    #[serde(default)]
    pub claim_url: String,
    #[serde(default)]
    pub verification_code: String,
}

#[derive(Debug, Serialize)]
struct RegisterRequest<'a> {
    name: &'a str,
    description: &'a str,
}

/// Registers a new agent.
///
/// The only unauthenticated call: no bearer header and no cookie jar. A
/// single attempt is made.
pub async fn register_agent(
    transport: &dyn HttpTransport,
    config: &ApiConfig,
    name: &str,
    description: &str,
) -> Result<RegisteredAgent, ApiError> {
    let body = serde_json::to_vec(&RegisterRequest { name, description }).map_err(ApiError::Encode)?;

    let mut headers = HeaderSet::new();
    headers.insert(HEADER_CONTENT_TYPE, CONTENT_TYPE_JSON);

    let response = transport
        .send(HttpRequest {
            method: Method::POST,
            url: join_endpoint(&config.base_url, REGISTER_PATH),
            headers,
            body: Some(body),
        })
        .await?;

    debug!(status = response.status.as_u16(), "register response");

    let parsed = serde_json::from_slice::<Value>(&response.body);
    if !response.is_ok() {
        let message = match &parsed {
            Ok(body) => error_message(body, DEFAULT_REGISTRATION_ERROR),
            Err(_) => DEFAULT_REGISTRATION_ERROR.to_string(),
        };
        return Err(ApiError::RegistrationFailed {
            status: response.status,
            message,
        });
    }

    let mut body = parsed.map_err(|source| ApiError::Decode {
        path: REGISTER_PATH.to_string(),
        source,
    })?;
    let agent = body
        .get_mut("agent")
        .map(Value::take)
        .unwrap_or(Value::Null);
    let agent: RegisteredAgent = serde_json::from_value(agent).map_err(|source| ApiError::Decode {
        path: REGISTER_PATH.to_string(),
        source,
    })?;

    info!(name, "registered agent");
    Ok(agent)
}
