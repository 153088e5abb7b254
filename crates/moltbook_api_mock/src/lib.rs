//! Scripted implementation of the `moltbook_api` transport seam.
//!
//! Replays canned platform responses without a network so session, endpoint
//! and startup-flow tests can assert on exactly what was sent.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use moltbook_api::{ApiError, HttpRequest, HttpResponse, HttpTransport, StatusCode};
use serde_json::Value;

enum Scripted {
    Respond(HttpResponse),
    Fail(String),
}

/// Replays queued responses in order and records every request it sees.
///
/// Running out of responses is reported as a transport failure.
#[derive(Default)]
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_json(self, status: u16, body: Value) -> Self {
        self.push_json(status, body);
        self
    }

    #[must_use]
    pub fn with_response(self, response: HttpResponse) -> Self {
        self.push_response(response);
        self
    }

    #[must_use]
    pub fn with_failure(self, message: impl Into<String>) -> Self {
        lock_unpoisoned(&self.script).push_back(Scripted::Fail(message.into()));
        self
    }

    pub fn push_json(&self, status: u16, body: Value) {
        self.push_response(json_response(status, body));
    }

    pub fn push_response(&self, response: HttpResponse) {
        lock_unpoisoned(&self.script).push_back(Scripted::Respond(response));
    }

    #[must_use]
    pub fn requests(&self) -> Vec<HttpRequest> {
        lock_unpoisoned(&self.requests).clone()
    }

    #[must_use]
    pub fn request_count(&self) -> usize {
        lock_unpoisoned(&self.requests).len()
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        lock_unpoisoned(&self.script).len()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let url = request.url.clone();
        lock_unpoisoned(&self.requests).push(request);

        match lock_unpoisoned(&self.script).pop_front() {
            Some(Scripted::Respond(response)) => Ok(response),
            Some(Scripted::Fail(message)) => Err(ApiError::Transport(message)),
            None => Err(ApiError::Transport(format!("no scripted response for {url}"))),
        }
    }
}

/// A response with a JSON body and no headers.
#[must_use]
pub fn json_response(status: u16, body: Value) -> HttpResponse {
    HttpResponse {
        status: StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        headers: Vec::new(),
        body: body.to_string().into_bytes(),
    }
}

/// Adds one `Set-Cookie` header to `response`.
#[must_use]
pub fn with_set_cookie(mut response: HttpResponse, value: &str) -> HttpResponse {
    response
        .headers
        .push(("set-cookie".to_string(), value.to_string()));
    response
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
