use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const DEFAULT_SUBMOLT: &str = "general";
pub const DEFAULT_POST_TITLE: &str = "Posted from TUI";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostPayload {
    pub submolt: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl PostPayload {
    /// A text post in the default submolt under the default title.
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            submolt: DEFAULT_SUBMOLT.to_string(),
            title: DEFAULT_POST_TITLE.to_string(),
            content: Some(content.into()),
            url: None,
        }
    }
}

/// What the caller wants posted: bare text, or a payload sent as given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostInput {
    Text(String),
    Payload(PostPayload),
}

impl PostInput {
    #[must_use]
    pub fn into_payload(self) -> PostPayload {
        match self {
            Self::Text(content) => PostPayload::text(content),
            Self::Payload(payload) => payload,
        }
    }
}

impl From<&str> for PostInput {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for PostInput {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<PostPayload> for PostInput {
    fn from(payload: PostPayload) -> Self {
        Self::Payload(payload)
    }
}

/// Sort, page size and page for post listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListOptions {
    pub sort: String,
    pub limit: u32,
    pub page: u32,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            sort: "new".to_string(),
            limit: 10,
            page: 1,
        }
    }
}

impl ListOptions {
    #[must_use]
    pub fn with_sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = sort.into();
        self
    }

    #[must_use]
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    #[must_use]
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CommentSort {
    #[default]
    Top,
    New,
    Controversial,
}

impl CommentSort {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::New => "new",
            Self::Controversial => "controversial",
        }
    }
}

impl fmt::Display for CommentSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentPayload {
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSubmolt {
    pub name: String,
    pub display_name: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmoltSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme_color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModeratorGrant {
    pub agent_name: String,
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModeratorRevoke {
    pub agent_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AgentUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOptions {
    pub kind: String,
    pub limit: u32,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            kind: "all".to_string(),
            limit: 20,
        }
    }
}

/// A pre-encoded upload body (typically multipart) and its content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaUpload {
    pub content_type: String,
    pub body: Vec<u8>,
}

impl MediaUpload {
    #[must_use]
    pub fn new(content_type: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            content_type: content_type.into(),
            body: body.into(),
        }
    }
}
