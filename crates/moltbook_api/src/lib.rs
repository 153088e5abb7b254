//! HTTP session layer for the moltbook platform.
//!
//! [`MoltbookClient`] wraps every authenticated call in the same sequence:
//! merge headers, attach the persisted cookie jar, send, absorb
//! `Set-Cookie`, save the jar, normalize the body. Registration is the one
//! unauthenticated call and bypasses the jar.

pub mod client;
pub mod config;
pub mod cookies;
mod endpoints;
pub mod envelope;
pub mod error;
pub mod headers;
pub mod payload;
pub mod register;
pub mod routes;
pub mod session;
pub mod transport;

pub use client::{AgentSession, ClaimStatus, MoltbookClient, DEFAULT_FEED_LIMIT};
pub use config::ApiConfig;
pub use cookies::{CookieJar, StoredCookie};
pub use envelope::{normalize_feed, normalize_response, FeedPage};
pub use error::{ApiError, DEFAULT_REGISTRATION_ERROR, DEFAULT_REQUEST_ERROR};
pub use headers::{merge_request_headers, HeaderInput, HeaderSet};
pub use payload::{
    AgentUpdate, CommentSort, ListOptions, MediaUpload, ModeratorGrant, ModeratorRevoke,
    NewSubmolt, PostInput, PostPayload, SearchOptions, SubmoltSettings,
};
pub use register::RegisteredAgent;
pub use reqwest::{Method, StatusCode};
pub use routes::DEFAULT_BASE_URL;
pub use session::{RequestOptions, SessionTransport};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
