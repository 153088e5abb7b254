use std::net::IpAddr;
use std::path::Path;

use agent_store::{JsonStore, StoreError};
use cookie::Cookie;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::{debug, warn};
use url::Url;

/// One cookie as remembered between runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCookie {
    pub name: String,
    pub value: String,
    pub domain: String,
    /// Set when the response carried no `Domain` attribute; the cookie is
    /// then only returned to the exact host that set it.
    #[serde(default)]
    pub host_only: bool,
    pub path: String,
    #[serde(default)]
    pub secure: bool,
    #[serde(default)]
    pub http_only: bool,
    /// Unix seconds. `None` means a session cookie.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
}

impl StoredCookie {
    fn is_expired(&self, now: i64) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now)
    }

    fn same_slot(&self, other: &StoredCookie) -> bool {
        self.name == other.name && self.domain == other.domain && self.path == other.path
    }

    fn matches(&self, url: &Url) -> bool {
        let Some(host) = url.host_str() else {
            return false;
        };
        let host = host.to_ascii_lowercase();

        let domain_ok = if self.host_only {
            host == self.domain
        } else {
            domain_matches(&host, &self.domain)
        };

        domain_ok && path_matches(url.path(), &self.path) && (!self.secure || url.scheme() == "https")
    }
}

/// Cookie state for the platform origin, persisted as `{"cookies": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookieJar {
    #[serde(default)]
    cookies: Vec<StoredCookie>,
}

impl CookieJar {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the jar saved at `path`.
    ///
    /// A missing file yields an empty jar, and so does a file that is not a
    /// jar this client wrote (another cookie library's format, truncated
    /// JSON). It is overwritten by the next save. Read failures still error.
    pub fn load(store: &JsonStore, path: &Path) -> Result<Self, StoreError> {
        if !store.exists(path) {
            return Ok(Self::default());
        }
        match store.read_document(path) {
            Ok(jar) => Ok(jar),
            Err(error @ StoreError::Parse { .. }) => {
                warn!(%error, "discarding unreadable cookie jar");
                Ok(Self::default())
            }
            Err(error) => Err(error),
        }
    }

    pub fn save(&self, store: &JsonStore, path: &Path) -> Result<(), StoreError> {
        store.write_document(path, self)
    }

    #[must_use]
    pub fn cookies(&self) -> &[StoredCookie] {
        &self.cookies
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    pub fn store_response_cookies<'a>(
        &mut self,
        set_cookie_values: impl IntoIterator<Item = &'a str>,
        request_url: &str,
    ) {
        self.store_response_cookies_at(set_cookie_values, request_url, unix_now());
    }

    /// Absorbs `Set-Cookie` values received for `request_url`.
    ///
    /// Unparseable values and cookies whose `Domain` does not cover the
    /// request host are ignored. A cookie that is already expired removes
    /// any stored cookie with the same name, domain and path.
    pub fn store_response_cookies_at<'a>(
        &mut self,
        set_cookie_values: impl IntoIterator<Item = &'a str>,
        request_url: &str,
        now: i64,
    ) {
        let Ok(url) = Url::parse(request_url) else {
            debug!(url = request_url, "ignoring cookies for unparseable url");
            return;
        };
        let Some(host) = url.host_str().map(str::to_ascii_lowercase) else {
            return;
        };

        for raw in set_cookie_values {
            let parsed = match Cookie::parse(raw) {
                Ok(parsed) => parsed,
                Err(error) => {
                    debug!(%error, "ignoring malformed set-cookie header");
                    continue;
                }
            };

            let Some(stored) = to_stored(&parsed, &host, url.path(), now) else {
                continue;
            };

            self.cookies.retain(|existing| !existing.same_slot(&stored));
            if !stored.is_expired(now) {
                self.cookies.push(stored);
            }
        }

        self.cookies.retain(|cookie| !cookie.is_expired(now));
    }

    pub fn cookie_header(&self, request_url: &str) -> Option<String> {
        self.cookie_header_at(request_url, unix_now())
    }

    /// `Cookie` header value for `request_url`, or `None` when nothing applies.
    ///
    /// Longer paths are listed first; otherwise insertion order is kept.
    pub fn cookie_header_at(&self, request_url: &str, now: i64) -> Option<String> {
        let url = Url::parse(request_url).ok()?;

        let mut matching: Vec<&StoredCookie> = self
            .cookies
            .iter()
            .filter(|cookie| !cookie.is_expired(now) && cookie.matches(&url))
            .collect();
        if matching.is_empty() {
            return None;
        }
        matching.sort_by(|left, right| right.path.len().cmp(&left.path.len()));

        Some(
            matching
                .iter()
                .map(|cookie| format!("{}={}", cookie.name, cookie.value))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }
}

fn to_stored(parsed: &Cookie<'_>, host: &str, request_path: &str, now: i64) -> Option<StoredCookie> {
    let (domain, host_only) = match parsed.domain() {
        Some(domain) if !domain.trim().is_empty() => {
            let domain = domain.trim().trim_start_matches('.').to_ascii_lowercase();
            if !domain_acceptable(host, &domain) {
                debug!(cookie = parsed.name(), %domain, host, "rejecting cookie for foreign domain");
                return None;
            }
            (domain, false)
        }
        _ => (host.to_string(), true),
    };

    let path = match parsed.path() {
        Some(path) if path.starts_with('/') => path.to_string(),
        _ => default_path(request_path),
    };

    // Max-Age takes precedence over Expires.
    let expires_at = match parsed.max_age() {
        Some(max_age) => Some(now.saturating_add(max_age.whole_seconds())),
        None => parsed
            .expires()
            .and_then(|expiration| expiration.datetime())
            .map(OffsetDateTime::unix_timestamp),
    };

    Some(StoredCookie {
        name: parsed.name().to_string(),
        value: parsed.value().to_string(),
        domain,
        host_only,
        path,
        secure: parsed.secure().unwrap_or(false),
        http_only: parsed.http_only().unwrap_or(false),
        expires_at,
    })
}

/// Whether a `Domain` attribute may be stored for a response from `host`.
///
/// Single-label domains (`com`) and IP literals only count when they are
/// exactly the host; otherwise the cookie would leak to unrelated sites.
fn domain_acceptable(host: &str, domain: &str) -> bool {
    if host == domain {
        return true;
    }
    if !domain.contains('.') || domain.parse::<IpAddr>().is_ok() || host.parse::<IpAddr>().is_ok() {
        return false;
    }
    domain_matches(host, domain)
}

fn domain_matches(host: &str, domain: &str) -> bool {
    host == domain
        || host
            .strip_suffix(domain)
            .is_some_and(|prefix| prefix.ends_with('.'))
}

fn path_matches(request_path: &str, cookie_path: &str) -> bool {
    if request_path == cookie_path {
        return true;
    }
    request_path.starts_with(cookie_path)
        && (cookie_path.ends_with('/')
            || request_path[cookie_path.len()..].starts_with('/'))
}

/// Directory of the request path, `/` when there is none.
fn default_path(request_path: &str) -> String {
    match request_path.rfind('/') {
        Some(0) | None => "/".to_string(),
        Some(index) => request_path[..index].to_string(),
    }
}

fn unix_now() -> i64 {
    OffsetDateTime::now_utc().unix_timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_store::MemoryFilesystem;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    const API: &str = "https://www.moltbook.com/api/v1/feed";
    const NOW: i64 = 1_700_000_000;

    #[test]
    fn session_cookie_is_returned_to_the_same_host() {
        let mut jar = CookieJar::new();
        jar.store_response_cookies_at(["sid=abc; Path=/; HttpOnly"], API, NOW);

        assert_eq!(jar.cookie_header_at(API, NOW).as_deref(), Some("sid=abc"));
        assert_eq!(jar.cookie_header_at("https://moltbook.com/api/v1", NOW), None);
        assert!(jar.cookies()[0].host_only);
        assert!(jar.cookies()[0].http_only);
    }

    #[test]
    fn domain_cookie_covers_subdomains() {
        let mut jar = CookieJar::new();
        jar.store_response_cookies_at(["region=eu; Domain=.moltbook.com; Path=/"], API, NOW);

        assert_eq!(
            jar.cookie_header_at("https://api.moltbook.com/x", NOW).as_deref(),
            Some("region=eu")
        );
        assert_eq!(jar.cookie_header_at("https://notmoltbook.com/x", NOW), None);
    }

    #[test]
    fn foreign_domain_is_rejected() {
        let mut jar = CookieJar::new();
        jar.store_response_cookies_at(["evil=1; Domain=example.org"], API, NOW);

        assert!(jar.is_empty());
    }

    #[test]
    fn top_level_and_ip_domains_are_rejected() {
        let mut jar = CookieJar::new();
        jar.store_response_cookies_at(["sc=1; Domain=com; Path=/"], API, NOW);
        jar.store_response_cookies_at(["sc=2; Domain=.com; Path=/"], API, NOW);
        assert!(jar.is_empty());
        assert_eq!(jar.cookie_header_at("https://evil.com/", NOW), None);

        jar.store_response_cookies_at(["ip=1; Domain=0.0.1; Path=/"], "http://10.0.0.1/", NOW);
        assert!(jar.is_empty());

        jar.store_response_cookies_at(["ip=2; Domain=10.0.0.1; Path=/"], "http://10.0.0.1/", NOW);
        jar.store_response_cookies_at(["dev=1; Domain=localhost; Path=/"], "http://localhost/", NOW);
        assert_eq!(
            jar.cookie_header_at("http://10.0.0.1/x", NOW).as_deref(),
            Some("ip=2")
        );
        assert_eq!(
            jar.cookie_header_at("http://localhost/x", NOW).as_deref(),
            Some("dev=1")
        );
    }

    #[test]
    fn default_path_is_the_request_directory() {
        let mut jar = CookieJar::new();
        jar.store_response_cookies_at(["scoped=1"], API, NOW);

        assert_eq!(jar.cookies()[0].path, "/api/v1");
        assert!(jar
            .cookie_header_at("https://www.moltbook.com/api/v1/posts", NOW)
            .is_some());
        assert_eq!(jar.cookie_header_at("https://www.moltbook.com/api/v10", NOW), None);
        assert_eq!(jar.cookie_header_at("https://www.moltbook.com/", NOW), None);
    }

    #[test]
    fn max_age_expires_and_zero_deletes() {
        let mut jar = CookieJar::new();
        jar.store_response_cookies_at(["t=1; Path=/; Max-Age=60"], API, NOW);
        assert_eq!(jar.cookie_header_at(API, NOW + 59).as_deref(), Some("t=1"));
        assert_eq!(jar.cookie_header_at(API, NOW + 60), None);

        jar.store_response_cookies_at(["t=; Path=/; Max-Age=0"], API, NOW + 1);
        assert!(jar.is_empty());
    }

    #[test]
    fn past_expires_removes_existing_cookie() {
        let mut jar = CookieJar::new();
        jar.store_response_cookies_at(["sid=abc; Path=/"], API, NOW);
        jar.store_response_cookies_at(
            ["sid=gone; Path=/; Expires=Thu, 01 Jan 1970 00:00:00 GMT"],
            API,
            NOW,
        );

        assert!(jar.is_empty());
    }

    #[test]
    fn newer_value_replaces_same_slot_and_secure_needs_https() {
        let mut jar = CookieJar::new();
        jar.store_response_cookies_at(["sid=1; Path=/; Secure"], API, NOW);
        jar.store_response_cookies_at(["sid=2; Path=/; Secure", "theme=dark; Path=/"], API, NOW);

        assert_eq!(jar.cookies().len(), 2);
        assert_eq!(
            jar.cookie_header_at(API, NOW).as_deref(),
            Some("sid=2; theme=dark")
        );
        assert_eq!(
            jar.cookie_header_at("http://www.moltbook.com/api/v1/feed", NOW).as_deref(),
            Some("theme=dark")
        );
    }

    #[test]
    fn jar_survives_save_and_load() {
        let fs = Arc::new(MemoryFilesystem::new());
        let store = JsonStore::new(fs.clone());
        let path = Path::new("/data/cookie.json");

        assert_eq!(CookieJar::load(&store, path).expect("absent jar"), CookieJar::new());

        let mut jar = CookieJar::new();
        jar.store_response_cookies_at(["sid=abc; Path=/; Max-Age=3600"], API, NOW);
        jar.save(&store, path).expect("save");

        let restored = CookieJar::load(&store, path).expect("load");
        assert_eq!(restored, jar);
        assert!(fs.file("/data/cookie.json").is_some_and(|raw| raw.contains("\"cookies\"")));
    }

    #[test]
    fn foreign_jar_format_loads_empty() {
        let fs = Arc::new(MemoryFilesystem::new().with_file(
            "/data/cookie.json",
            r#"{"version":"tough-cookie@4.1.3","cookies":[{"key":"sid","value":"x","domain":"www.moltbook.com","path":"/","hostOnly":true}]}"#,
        ));
        let store = JsonStore::new(fs);

        let jar = CookieJar::load(&store, Path::new("/data/cookie.json")).expect("tolerated");
        assert!(jar.is_empty());
    }
}
