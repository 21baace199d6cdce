//! Request adapter and the per-request plugin store.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde_json::{Map, Value};
use url::form_urlencoded;

use crate::error::Error;
use crate::event::RequestRecord;

/// Accessors over one inbound edge request, plus the per-request plugin
/// store.
///
/// Cloning hands out another handle to the same request — handlers further
/// down the dispatch observe plugin writes made by the ones before them.
/// Both the record and the store live exactly as long as the dispatch; the
/// engine retains nothing across requests.
#[derive(Clone)]
pub struct Request {
    record: Arc<RequestRecord>,
    plugins: Arc<Mutex<HashMap<String, Value>>>,
}

impl Request {
    /// Wraps the platform record for one dispatch, with a fresh plugin
    /// store.
    pub fn new(record: RequestRecord) -> Self {
        Self {
            record: Arc::new(record),
            plugins: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// The underlying platform record.
    pub fn data(&self) -> &RequestRecord {
        &self.record
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.record
            .headers
            .get(&name.to_ascii_lowercase())
            .and_then(|entries| entries.first())
            .map(|entry| entry.value.as_str())
    }

    /// True when the `Accept` header matches `mime_type` exactly.
    pub fn is(&self, mime_type: &str) -> bool {
        self.header("accept") == Some(mime_type)
    }

    /// The HTTP method, as the platform spells it.
    pub fn method(&self) -> &str {
        &self.record.method
    }

    /// The serialized query parameters.
    pub fn query_string(&self) -> &str {
        &self.record.querystring
    }

    /// The relative path of the requested object.
    pub fn uri(&self) -> &str {
        &self.record.uri
    }

    /// The client IP (remote address).
    pub fn client_ip(&self) -> &str {
        &self.record.client_ip
    }

    /// The base64-encoded body payload, empty when the platform sent none.
    pub fn body(&self) -> &str {
        self.record
            .body
            .as_ref()
            .map_or("", |body| body.data.as_str())
    }

    /// Request parameters as a JSON object — from the query string when one
    /// is present, otherwise from the decoded body. Absent when neither
    /// yields any.
    pub fn params(&self) -> Option<Value> {
        let params = if !self.query_string().is_empty() {
            parse_params(self.query_string())
        } else {
            parse_body(self.body())?
        };

        match &params {
            Value::Object(map) if map.is_empty() => None,
            _ => Some(params),
        }
    }

    /// A single named request parameter.
    pub fn param(&self, name: &str) -> Option<Value> {
        self.params()?.get(name).cloned()
    }

    /// The value stored under `name`.
    ///
    /// An unknown name is the fatal [`Error::PluginMissing`], not an absent
    /// value — a handler reading a plugin its predecessors never wrote is a
    /// wiring bug worth aborting on.
    pub fn plugin(&self, name: &str) -> Result<Value, Error> {
        self.store()
            .get(name)
            .cloned()
            .ok_or_else(|| Error::PluginMissing(name.to_owned()))
    }

    /// Sets or overwrites the value stored under `name`.
    pub fn set_plugin(&self, name: impl Into<String>, value: impl Into<Value>) {
        self.store().insert(name.into(), value.into());
    }

    // The store never straddles a handler call while locked, so a poisoned
    // mutex still guards a consistent map.
    fn store(&self) -> MutexGuard<'_, HashMap<String, Value>> {
        self.plugins.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Serialized `name=value` pairs into a JSON object of strings.
fn parse_params(raw: &str) -> Value {
    let map: Map<String, Value> = form_urlencoded::parse(raw.as_bytes())
        .map(|(name, value)| (name.into_owned(), Value::String(value.into_owned())))
        .collect();

    Value::Object(map)
}

/// Base64 body payload into a JSON object: JSON composites pass through,
/// form-encoded pairs parse, anything else is absent.
fn parse_body(data: &str) -> Option<Value> {
    let bytes = BASE64.decode(data).ok()?;
    let text = String::from_utf8(bytes).ok()?;

    if let Ok(value @ (Value::Array(_) | Value::Object(_))) = serde_json::from_str(&text) {
        return Some(value);
    }
    if is_params(&text) {
        return Some(parse_params(&text));
    }
    None
}

/// True when `raw` parses into at least one real `name=value` pair rather
/// than collapsing to a single bare token.
fn is_params(raw: &str) -> bool {
    form_urlencoded::parse(raw.as_bytes())
        .next()
        .is_some_and(|(name, _)| name != raw)
}
