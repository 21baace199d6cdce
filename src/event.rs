//! Platform event records.
//!
//! The hosting platform hands every invocation a JSON event holding the
//! inbound request and a blank response. These types are the serde model of
//! that record — the [`Request`](crate::Request) and
//! [`Response`](crate::Response) adapters wrap them, the hosting glue
//! deserializes the request half on the way in and serializes the response
//! half on the way out. verge never owns the event format; it consumes it.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Header map as the platform ships it: lowercase name → entry list, where
/// each entry preserves the original header casing in `key`.
pub type Headers = HashMap<String, Vec<HeaderEntry>>;

/// One header entry.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct HeaderEntry {
    pub key: String,
    pub value: String,
}

/// The inbound request record.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestRecord {
    #[serde(default)]
    pub client_ip: String,
    #[serde(default)]
    pub headers: Headers,
    pub method: String,
    #[serde(default)]
    pub querystring: String,
    pub uri: String,
    #[serde(default)]
    pub body: Option<RequestBody>,
}

/// Body payload of the inbound request. `data` is base64 text regardless of
/// what the client sent.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestBody {
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub data: String,
    #[serde(default)]
    pub encoding: String,
    #[serde(default)]
    pub input_truncated: bool,
}

/// The outbound response record, accumulated by the
/// [`Response`](crate::Response) adapter during a dispatch.
///
/// `status` stays `null` until a handler sets it; `body` and `bodyEncoding`
/// are omitted from the serialized reply until a body is finalized.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseRecord {
    #[serde(default)]
    pub headers: Headers,
    #[serde(default)]
    pub status: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_encoding: Option<BodyEncoding>,
}

/// How the response body bytes are to be interpreted by the platform.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyEncoding {
    Base64,
    Text,
}
