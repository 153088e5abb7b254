use agent_store::StoreError;
use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Message used when a failed response carries no `error` field.
pub const DEFAULT_REQUEST_ERROR: &str = "Request failed";
/// Message used when a failed registration carries no `error` field.
pub const DEFAULT_REGISTRATION_ERROR: &str = "Registration failed";

#[derive(Debug, Error)]
pub enum ApiError {
    /// Business failure (`success: false`) or non-OK status on an
    /// authenticated call. Displays the server message verbatim.
    #[error("{message}")]
    RequestFailed { status: StatusCode, message: String },

    #[error("{message}")]
    RegistrationFailed { status: StatusCode, message: String },

    #[error("request error: {0}")]
    Transport(String),

    #[error("failed to decode response from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("invalid header {name}")]
    InvalidHeader { name: String },

    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl ApiError {
    /// Status carried by server-reported failures.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::RequestFailed { status, .. } | Self::RegistrationFailed { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(error: reqwest::Error) -> Self {
        Self::Transport(error.to_string())
    }
}

/// `body.error` when it is a non-empty string, else `fallback`.
///
/// An object-shaped `error` with a `message` field is also accepted.
pub fn error_message(body: &Value, fallback: &str) -> String {
    let explicit = match body.get("error") {
        Some(Value::String(message)) => Some(message.as_str()),
        Some(Value::Object(fields)) => fields.get("message").and_then(Value::as_str),
        _ => None,
    };

    explicit
        .filter(|message| !message.is_empty())
        .unwrap_or(fallback)
        .to_string()
}
