//! URL query-string codec
//!
//! Screens keep part of their state in the URL query (`?selectedPools=...&sortBy=...`).
//! This module converts between query strings and an ordered key/value map
//! without disturbing parameters it was not asked to touch.
//!
//! ## Value encoding
//!
//! - strings are written as-is (then percent-encoded)
//! - `null` means "no parameter" and is omitted
//! - any other JSON value is written as compact JSON text
//!
//! [`decode_value`] reverses this: JSON first, raw string as fallback.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Ordered query parameters. Keys are unique; insertion order is kept.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Set `key`, keeping its position if already present.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        if let Some(slot) = self.pairs.iter_mut().find(|(k, _)| k == key) {
            slot.1 = value;
        } else {
            self.pairs.push((key.to_string(), value));
        }
    }

    pub fn remove(&mut self, key: &str) {
        self.pairs.retain(|(k, _)| k != key);
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Order-insensitive comparison of two parameter sets.
    pub fn same_pairs(&self, other: &QueryParams) -> bool {
        self.len() == other.len() && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }

    /// Serialize without a leading `?`.
    pub fn to_query_string(&self) -> String {
        self.pairs
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

fn decode_component(s: &str) -> String {
    let spaced = s.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|c| c.into_owned())
        .unwrap_or(spaced)
}

/// Parse a query string (with or without leading `?`).
///
/// Values are percent-decoded. For duplicate keys the last occurrence wins.
pub fn parse(qs: &str) -> QueryParams {
    let mut params = QueryParams::new();
    let qs = qs.trim().trim_start_matches('?');
    for part in qs.split('&').filter(|p| !p.is_empty()) {
        let mut it = part.splitn(2, '=');
        let key = decode_component(it.next().unwrap_or_default());
        if key.is_empty() {
            continue;
        }
        let value = decode_component(it.next().unwrap_or_default());
        params.set(&key, value);
    }
    params
}

/// Query-parameter text for a JSON value; `None` for `null`.
pub fn encode_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Decode a query-parameter value written by [`encode_value`].
pub fn decode_value<T: DeserializeOwned>(raw: &str) -> Option<T> {
    serde_json::from_str(raw)
        .or_else(|_| serde_json::from_value(Value::String(raw.to_string())))
        .ok()
}

/// Serialize an object into a query string; `null` members are omitted.
pub fn obj_to_query_string(obj: &Map<String, Value>) -> String {
    let mut params = QueryParams::new();
    for (key, value) in obj {
        if let Some(encoded) = encode_value(value) {
            params.set(key, encoded);
        }
    }
    params.to_query_string()
}

/// Return `qs` with `key` set to `value`, or removed when `value` is `None`.
///
/// All other keys keep their values and relative order.
pub fn replace_query_param(qs: &str, key: &str, value: Option<&str>) -> String {
    let mut params = parse(qs);
    match value {
        Some(v) => params.set(key, v),
        None => params.remove(key),
    }
    params.to_query_string()
}

/// Merge query fragments; later fragments override earlier keys. `None`s are skipped.
pub fn join_query_strings<'a, I>(fragments: I) -> String
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let mut merged = QueryParams::new();
    for fragment in fragments.into_iter().flatten() {
        for (k, v) in parse(fragment).iter() {
            merged.set(k, v);
        }
    }
    merged.to_query_string()
}
