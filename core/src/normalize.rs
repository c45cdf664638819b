//! Decodes base64 file payloads embedded in execution results.
//!
//! A result is first classified into an [`Envelope`]; only the two recognized
//! envelope shapes are touched, everything else passes through as-is. Decoding
//! problems are written next to the payload instead of being raised.

use base64::Engine;
use serde_json::{Map, Value};
use tracing::{debug, warn};

pub const DECODED_CONTENT: &str = "decoded_content";
pub const CONTENT_TYPE: &str = "content_type";
pub const PARSED_JSON: &str = "parsed_json";
pub const JSON_PARSE_ERROR: &str = "json_parse_error";
pub const DECODE_ERROR: &str = "decode_error";

const STRUCTURED_SUFFIXES: &[&str] = &[".json"];

/// The shape of an execution result as far as decoding is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Envelope {
    /// Sub-results listed under `content.results`.
    List,
    /// A single result carrying `data` directly.
    Single,
    /// Nothing we know how to decode.
    Opaque,
}

impl Envelope {
    pub fn classify(result: &Value) -> Self {
        let Some(obj) = result.as_object() else {
            return Envelope::Opaque;
        };
        if obj
            .get("content")
            .and_then(|c| c.get("results"))
            .is_some_and(Value::is_array)
        {
            Envelope::List
        } else if obj.contains_key("data") {
            Envelope::Single
        } else {
            Envelope::Opaque
        }
    }
}

/// Normalize `result` in place. Returns the envelope it was classified as.
pub fn normalize(result: &mut Value) -> Envelope {
    let envelope = Envelope::classify(result);
    match envelope {
        Envelope::List => {
            if let Some(items) = result
                .pointer_mut("/content/results")
                .and_then(Value::as_array_mut)
            {
                for item in items.iter_mut() {
                    decode_item(item);
                }
            }
        }
        Envelope::Single => decode_item(result),
        Envelope::Opaque => {}
    }
    envelope
}

/// Convenience for callers holding an owned result.
pub fn normalized(mut result: Value) -> Value {
    normalize(&mut result);
    result
}

fn decode_item(item: &mut Value) {
    let Some(obj) = item.as_object_mut() else {
        return;
    };
    // A missing flag counts as success; only an explicit `false` opts out.
    if obj.get("success").and_then(Value::as_bool) == Some(false) {
        return;
    }
    if let Some(data) = obj.get_mut("data").and_then(Value::as_object_mut) {
        decode_payload(data);
    }
}

fn decode_payload(data: &mut Map<String, Value>) {
    if data.get("encoding").and_then(Value::as_str) != Some("base64") {
        return;
    }
    let Some(encoded) = data.get("content").and_then(Value::as_str) else {
        return;
    };

    // GitHub wraps base64 at 60 columns.
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = match base64::engine::general_purpose::STANDARD.decode(compact.as_bytes()) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("Could not decode base64 payload: {}", e);
            data.insert(DECODE_ERROR.to_string(), Value::String(e.to_string()));
            return;
        }
    };
    let text = String::from_utf8_lossy(&bytes).into_owned();

    if is_structured(data) {
        match serde_json::from_str::<Value>(&text) {
            Ok(parsed) => {
                data.insert(PARSED_JSON.to_string(), parsed);
            }
            Err(e) => {
                debug!("Decoded payload is not valid JSON: {}", e);
                data.insert(JSON_PARSE_ERROR.to_string(), Value::String(e.to_string()));
            }
        }
    }

    data.insert(DECODED_CONTENT.to_string(), Value::String(text));
    data.insert(CONTENT_TYPE.to_string(), Value::String("decoded".to_string()));
}

fn is_structured(data: &Map<String, Value>) -> bool {
    let name = data
        .get("name")
        .or_else(|| data.get("path"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_ascii_lowercase();
    STRUCTURED_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
}
