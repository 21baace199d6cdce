//! Shared fixtures: platform event JSON and a collecting logger.

#![allow(dead_code)]

use std::sync::Mutex;

use verge::{Logger, Request, RequestRecord};

/// A request adapter over the standard fixture record.
pub fn request(method: &str, uri: &str) -> Request {
    Request::new(record(method, uri))
}

/// A platform request record, deserialized from event JSON the way the
/// hosting glue would receive it.
pub fn record(method: &str, uri: &str) -> RequestRecord {
    let raw = format!(
        r#"{{
            "clientIp": "203.0.113.178",
            "headers": {{
                "host": [{{"key": "Host", "value": "example.com"}}],
                "accept": [{{"key": "Accept", "value": "application/json"}}]
            }},
            "method": "{method}",
            "querystring": "",
            "uri": "{uri}"
        }}"#
    );

    serde_json::from_str(&raw).expect("request fixture")
}

/// Collects informational messages instead of tracing them.
#[derive(Default)]
pub struct MemoryLogger {
    messages: Mutex<Vec<String>>,
}

impl MemoryLogger {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl Logger for MemoryLogger {
    fn info(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_owned());
    }
}
