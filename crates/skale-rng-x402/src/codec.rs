//! Wire formats for the paid endpoint.
//!
//! Requests are plain JSON objects. Responses come either as one JSON
//! document or as an event stream of `data:` lines, where the last line
//! carrying valid JSON wins.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::response::{ErrorResponse, SettleResponse};
use crate::X402Error;

pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const EVENT_STREAM_CONTENT_TYPE: &str = "text/event-stream";

const DONE_MARKER: &str = "[DONE]";

/// Serialize a request body, dropping `null` and empty-string fields.
pub fn encode_request_body(body: &Value) -> Result<Vec<u8>, X402Error> {
    let cleaned = match body {
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(_, v)| !v.is_null() && v.as_str() != Some(""))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        ),
        other => other.clone(),
    };
    Ok(serde_json::to_vec(&cleaned)?)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    Json,
    EventStream,
}

impl ResponseFormat {
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Json => JSON_CONTENT_TYPE,
            Self::EventStream => EVENT_STREAM_CONTENT_TYPE,
        }
    }

    /// Format of a response, from its `Content-Type`. Anything that is not an event stream is JSON.
    pub fn from_content_type(content_type: Option<&str>) -> Self {
        match content_type {
            Some(ct) if ct.to_ascii_lowercase().contains(EVENT_STREAM_CONTENT_TYPE) => {
                Self::EventStream
            }
            _ => Self::Json,
        }
    }

    /// Pick the format to answer with, given the caller's `Accept` header.
    /// The event stream is used only when listed ahead of JSON.
    pub fn negotiate(accept: Option<&str>) -> Self {
        let Some(accept) = accept else {
            return Self::Json;
        };
        let accept = accept.to_ascii_lowercase();
        match (
            accept.find(EVENT_STREAM_CONTENT_TYPE),
            accept.find(JSON_CONTENT_TYPE),
        ) {
            (Some(sse), Some(json)) if sse < json => Self::EventStream,
            (Some(_), None) => Self::EventStream,
            _ => Self::Json,
        }
    }
}

/// A decoded response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded<T> {
    Structured(T),
    /// JSON body that did not parse into `T`; kept verbatim.
    Text(String),
}

pub fn decode_body<T: DeserializeOwned>(
    format: ResponseFormat,
    body: &[u8],
) -> Result<Decoded<T>, X402Error> {
    let text = String::from_utf8_lossy(body);
    match format {
        ResponseFormat::Json => Ok(
            match serde_json::from_str::<Value>(&text).and_then(serde_json::from_value::<T>) {
                Ok(value) => Decoded::Structured(value),
                Err(_) => Decoded::Text(text.into_owned()),
            },
        ),
        ResponseFormat::EventStream => parse_event_stream(&text).map(Decoded::Structured),
    }
}

/// Return the temporally last `data:` payload that is valid JSON, as `T`.
///
/// Only that payload is considered. If it does not have the shape of `T` the
/// stream is rejected rather than falling back to an older frame.
pub fn parse_event_stream<T: DeserializeOwned>(text: &str) -> Result<T, X402Error> {
    let last = text
        .lines()
        .rev()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(str::trim)
        .filter(|payload| !payload.is_empty() && *payload != DONE_MARKER)
        .find_map(|payload| serde_json::from_str::<Value>(payload).ok())
        .ok_or_else(|| X402Error::FormatError("unexpected response format".to_string()))?;

    serde_json::from_value(last)
        .map_err(|e| X402Error::FormatError(format!("unexpected response format: {e}")))
}

/// Render a paid result as an event stream: settlement, result, then `[DONE]`.
pub fn encode_event_stream<T: Serialize>(
    settlement: Option<&SettleResponse>,
    result: &T,
) -> Result<String, X402Error> {
    let mut out = String::new();
    if let Some(settle) = settlement {
        out.push_str("event: payment\n");
        out.push_str(&format!("data: {}\n\n", serde_json::to_string(settle)?));
    }
    out.push_str(&format!("data: {}\n\n", serde_json::to_string(result)?));
    out.push_str(&format!("data: {DONE_MARKER}\n\n"));
    Ok(out)
}

/// Human-readable message for a failed response.
pub fn error_message(status: u16, body: &[u8]) -> String {
    if let Ok(err) = serde_json::from_slice::<ErrorResponse>(body) {
        if !err.error.trim().is_empty() {
            return err.error;
        }
    }
    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if !text.is_empty() {
        return text.to_string();
    }
    format!("request failed with status {status}")
}
