use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{error_message, ApiError, DEFAULT_REQUEST_ERROR};

/// Applies the platform's response policy to a parsed body.
///
/// 1. An object carrying a `success` key fails only when `success` is
///    `false`; any other value returns the whole body unchanged.
/// 2. Otherwise a non-OK status fails.
/// 3. Otherwise the body is returned unchanged.
///
/// Failures carry `body.error`, or `"Request failed"` when absent.
pub fn normalize_response(status: StatusCode, body: Value) -> Result<Value, ApiError> {
    if let Some(success) = body.as_object().and_then(|object| object.get("success")) {
        if success == &Value::Bool(false) {
            return Err(request_failed(status, &body));
        }
        return Ok(body);
    }

    if !status.is_success() {
        return Err(request_failed(status, &body));
    }

    Ok(body)
}

fn request_failed(status: StatusCode, body: &Value) -> ApiError {
    ApiError::RequestFailed {
        status,
        message: error_message(body, DEFAULT_REQUEST_ERROR),
    }
}

/// A feed response reduced to the one shape the client renders.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedPage {
    #[serde(default)]
    pub data: Vec<Value>,
    /// Any sibling fields of `data` (paging hints and the like).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FeedPage {
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// `title` of each item, with `""` for items that have none.
    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.data
            .iter()
            .map(|item| item.get("title").and_then(Value::as_str).unwrap_or(""))
    }
}

/// Reduces a normalized feed body to a [`FeedPage`].
///
/// `{success, data}` envelopes are unwrapped to their `data`. The result
/// always has a `data` array: a bare array is wrapped, and any other shape
/// (including a non-array `data` field) yields an empty one.
pub fn normalize_feed(body: Value) -> FeedPage {
    let inner = match body {
        Value::Object(mut object) if object.contains_key("success") && object.contains_key("data") => {
            object.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    };

    match inner {
        Value::Array(items) => FeedPage {
            data: items,
            extra: Map::new(),
        },
        Value::Object(mut object) if object.contains_key("data") => {
            let data = match object.remove("data") {
                Some(Value::Array(items)) => items,
                _ => Vec::new(),
            };
            FeedPage {
                data,
                extra: object,
            }
        }
        _ => FeedPage::default(),
    }
}
