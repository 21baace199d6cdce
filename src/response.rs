//! Response adapter and typed body finalization.
//!
//! Handlers share one response handle per dispatch and mutate it in place:
//! set headers, set a pending status, finalize a body. Nothing here decides
//! whether the dispatch keeps going — a finalized response does not stop
//! later handlers from overwriting it. The hosting glue reads
//! [`Response::data`] once the dispatch settles and hands the record back
//! to the platform.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use bytes::Bytes;
use serde_json::Value;

use crate::event::{BodyEncoding, HeaderEntry, ResponseRecord};

/// What a handler hands to a body finalizer.
///
/// [`Response::send`] dispatches on the variant: binary encodes base64,
/// JSON composites serialize to JSON text, everything else becomes plain
/// text. The `From` impls let handlers pass bytes, strings, and JSON
/// values directly.
#[derive(Debug)]
pub enum Body {
    /// Raw bytes, delivered base64-encoded.
    Binary(Bytes),
    /// A structured value; arrays and objects serialize to JSON text, any
    /// other value is coerced to plain text.
    Json(Value),
    /// Plain text.
    Text(String),
    /// No body.
    Empty,
}

impl From<Bytes> for Body {
    fn from(bytes: Bytes) -> Self {
        Self::Binary(bytes)
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Binary(Bytes::from(bytes))
    }
}

impl From<Value> for Body {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

impl From<&str> for Body {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<()> for Body {
    fn from(_: ()) -> Self {
        Self::Empty
    }
}

/// Accessors over one outbound edge response.
///
/// Cheap to clone — every handle mutates the same underlying record.
/// `status` returns the handle so status and body chain naturally:
///
/// ```rust
/// use verge::Response;
///
/// let res = Response::new();
/// res.status(201).json(serde_json::json!({"id": 42}));
/// ```
#[derive(Clone)]
pub struct Response {
    state: Arc<Mutex<ResponseRecord>>,
}

impl Response {
    /// A fresh response: headers empty, status pending, no body.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(ResponseRecord::default())),
        }
    }

    /// Snapshot of the accumulated platform record.
    pub fn data(&self) -> ResponseRecord {
        self.state().clone()
    }

    /// Sets a header, preserving the caller's casing in the stored entry.
    /// Empty names or values are ignored.
    pub fn set_header(&self, name: &str, value: &str) {
        if name.is_empty() || value.is_empty() {
            return;
        }

        self.state().headers.insert(
            name.to_ascii_lowercase(),
            vec![HeaderEntry { key: name.to_owned(), value: value.to_owned() }],
        );
    }

    /// Sets the pending status; returns the handle for chaining.
    pub fn status(&self, code: u16) -> &Self {
        self.state().status = Some(code);
        self
    }

    /// Finalizes the body from whatever the handler supplies — see [`Body`]
    /// for the dispatch rules. `Body::Empty` leaves the body absent.
    pub fn send(&self, body: impl Into<Body>) -> &Self {
        match body.into() {
            Body::Binary(bytes) => self.finish(BASE64.encode(&bytes), BodyEncoding::Base64),
            Body::Json(value) => match value {
                Value::Array(_) | Value::Object(_) => {
                    self.finish(value.to_string(), BodyEncoding::Text)
                }
                other => self.finish(coerce_text(other), BodyEncoding::Text),
            },
            Body::Text(text) => self.finish(text, BodyEncoding::Text),
            Body::Empty => self,
        }
    }

    /// Finalizes a JSON text body. Anything that is not an array or object
    /// serializes as the empty object.
    pub fn json(&self, value: impl Into<Value>) -> &Self {
        match value.into() {
            value @ (Value::Array(_) | Value::Object(_)) => {
                self.finish(value.to_string(), BodyEncoding::Text)
            }
            _ => self.finish("{}".to_owned(), BodyEncoding::Text),
        }
    }

    /// Finalizes a plain-text body.
    pub fn text(&self, value: impl ToString) -> &Self {
        self.finish(value.to_string(), BodyEncoding::Text)
    }

    /// Finalizes a base64-encoded binary body.
    pub fn binary(&self, bytes: impl Into<Bytes>) -> &Self {
        self.finish(BASE64.encode(&bytes.into()), BodyEncoding::Base64)
    }

    fn finish(&self, body: String, encoding: BodyEncoding) -> &Self {
        let mut state = self.state();
        state.body = Some(body);
        state.body_encoding = Some(encoding);
        drop(state);
        self
    }

    // Held only inside these short accessors, never across handler code, so
    // a poisoned lock still guards a consistent record.
    fn state(&self) -> MutexGuard<'_, ResponseRecord> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}

/// Plain-text coercion for non-composite JSON values: strings drop their
/// quotes, everything else keeps its JSON spelling.
fn coerce_text(value: Value) -> String {
    match value {
        Value::String(text) => text,
        other => other.to_string(),
    }
}
