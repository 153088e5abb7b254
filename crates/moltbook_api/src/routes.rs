/// Default origin plus API prefix for platform requests.
pub const DEFAULT_BASE_URL: &str = "https://www.moltbook.com/api/v1";

/// Join the configured base URL with an endpoint path.
///
/// An empty base falls back to [`DEFAULT_BASE_URL`]; a trailing slash on the
/// base and a missing leading slash on the path are both tolerated.
pub fn join_endpoint(base: &str, path: &str) -> String {
    let base = if base.trim().is_empty() {
        DEFAULT_BASE_URL
    } else {
        base.trim()
    };
    let base = base.trim_end_matches('/');

    if path.is_empty() {
        base.to_string()
    } else if path.starts_with('/') {
        format!("{base}{path}")
    } else {
        format!("{base}/{path}")
    }
}

/// Form-encode query pairs, `application/x-www-form-urlencoded` style.
pub fn query_string<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}

/// Percent-encode one path segment so ids and names cannot add segments or
/// start a query.
pub fn path_segment(raw: &str) -> String {
    // The form serializer escapes a literal `+`, so every `+` it emits is a space.
    url::form_urlencoded::byte_serialize(raw.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

/// `path?query`, or `path` alone when there are no pairs.
pub fn with_query<'a>(path: &str, pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> String {
    let query = query_string(pairs);
    if query.is_empty() {
        path.to_string()
    } else {
        format!("{path}?{query}")
    }
}
