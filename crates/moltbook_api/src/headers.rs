use std::collections::BTreeMap;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::error::ApiError;

pub const HEADER_AUTHORIZATION: &str = "Authorization";
pub const HEADER_CONTENT_TYPE: &str = "Content-Type";
pub const HEADER_COOKIE: &str = "Cookie";
pub const HEADER_SET_COOKIE: &str = "set-cookie";
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Caller-supplied request headers in any of the accepted shapes.
///
/// Converted once into a [`HeaderSet`] before a request is built.
#[derive(Debug, Clone, Default)]
pub enum HeaderInput {
    #[default]
    None,
    Map(HeaderMap),
    Pairs(Vec<(String, String)>),
    Mapping(BTreeMap<String, String>),
}

impl HeaderInput {
    pub fn into_header_set(self) -> HeaderSet {
        let mut set = HeaderSet::new();
        match self {
            Self::None => {}
            Self::Pairs(pairs) => {
                for (name, value) in pairs {
                    set.insert(name, value);
                }
            }
            Self::Mapping(mapping) => {
                for (name, value) in mapping {
                    set.insert(name, value);
                }
            }
            Self::Map(map) => {
                for name in map.keys() {
                    let joined = map
                        .get_all(name)
                        .iter()
                        .filter_map(|value| value.to_str().ok())
                        .collect::<Vec<_>>()
                        .join(", ");
                    set.insert(name.as_str(), joined);
                }
            }
        }
        set
    }
}

impl From<HeaderMap> for HeaderInput {
    fn from(map: HeaderMap) -> Self {
        Self::Map(map)
    }
}

impl From<Vec<(String, String)>> for HeaderInput {
    fn from(pairs: Vec<(String, String)>) -> Self {
        Self::Pairs(pairs)
    }
}

impl From<BTreeMap<String, String>> for HeaderInput {
    fn from(mapping: BTreeMap<String, String>) -> Self {
        Self::Mapping(mapping)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for HeaderInput {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::Pairs(
            iter.into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        )
    }
}

/// Ordered header list with case-insensitive names.
///
/// Inserting a name that is already present replaces the value in place and
/// keeps the original position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderSet {
    entries: Vec<(String, String)>,
}

impl HeaderSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.position(&name) {
            Some(index) => self.entries[index].1 = value,
            None => self.entries.push((name, value)),
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.position(name)
            .map(|index| self.entries[index].1.as_str())
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn extend(&mut self, other: HeaderSet) {
        for (name, value) in other.entries {
            self.insert(name, value);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_header_map(&self) -> Result<HeaderMap, ApiError> {
        let mut map = HeaderMap::with_capacity(self.entries.len());
        for (name, value) in &self.entries {
            let header_name = HeaderName::from_bytes(name.trim().as_bytes())
                .map_err(|_| ApiError::InvalidHeader { name: name.clone() })?;
            let header_value = HeaderValue::from_str(value.trim())
                .map_err(|_| ApiError::InvalidHeader { name: name.clone() })?;
            map.insert(header_name, header_value);
        }
        Ok(map)
    }

    fn position(&self, name: &str) -> Option<usize> {
        let name = name.trim();
        self.entries
            .iter()
            .position(|(existing, _)| existing.trim().eq_ignore_ascii_case(name))
    }
}

/// Headers for an authenticated call.
///
/// Order of application: bearer authorization, then caller headers (which
/// may override it), then a JSON content type when none was supplied.
pub fn merge_request_headers(api_key: Option<&str>, extra: HeaderInput) -> HeaderSet {
    let mut headers = HeaderSet::new();

    if let Some(key) = api_key {
        headers.insert(HEADER_AUTHORIZATION, format!("Bearer {key}"));
    }

    headers.extend(extra.into_header_set());

    if !headers.contains(HEADER_CONTENT_TYPE) {
        headers.insert(HEADER_CONTENT_TYPE, CONTENT_TYPE_JSON);
    }

    headers
}
