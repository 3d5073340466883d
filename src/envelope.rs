//! Provider response envelope handling
//!
//! A successful answer looks like `{"response": {"header": {...}, "body":
//! {"items": [...]}}}`. `items` is an array, or a bare object when there is
//! exactly one row. Error answers may be XML or plain text.

use serde_json::{Map, Value};

use crate::constants::{BODY_EXCERPT_CHARS, PROVIDER_OK_CODE};
use crate::models::{Direction, FlightRecord, Terminal};

/// Why a 200 response did not yield items
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EnvelopeError {
    #[error("response body is not JSON")]
    NotJson,
    #[error("response.body.items is missing")]
    MissingItems,
    #[error("response.body.items is neither an object nor an array")]
    MalformedItems,
    #[error("provider error {code}: {message}")]
    Provider { code: String, message: String },
}

/// Extract the item list from a response body.
///
/// A null or blank `items` counts as zero rows.
pub fn extract_items(body: &str) -> Result<Vec<Value>, EnvelopeError> {
    let mut root: Value = serde_json::from_str(body).map_err(|_| EnvelopeError::NotJson)?;

    if let Some(items) = root.pointer_mut("/response/body/items") {
        return normalize_items(items.take());
    }

    if let Some(header) = root.pointer("/response/header") {
        let code = header.get("resultCode").and_then(scalar_string);
        if let Some(code) = code.filter(|c| c != PROVIDER_OK_CODE) {
            let message = header
                .get("resultMsg")
                .and_then(scalar_string)
                .unwrap_or_default();
            return Err(EnvelopeError::Provider { code, message });
        }
    }

    Err(EnvelopeError::MissingItems)
}

fn normalize_items(items: Value) -> Result<Vec<Value>, EnvelopeError> {
    match items {
        Value::Array(items) => Ok(items),
        Value::Object(_) => Ok(vec![items]),
        Value::Null => Ok(Vec::new()),
        Value::String(s) if s.trim().is_empty() => Ok(Vec::new()),
        _ => Err(EnvelopeError::MalformedItems),
    }
}

/// Bounded single-line excerpt of a response body for diagnostics
pub fn excerpt(body: &str) -> String {
    let flat: String = body
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let mut out: String = flat.chars().take(BODY_EXCERPT_CHARS).collect();
    if flat.chars().count() > BODY_EXCERPT_CHARS {
        out.push_str("...");
    }
    out
}

/// Strings are trimmed; numbers are rendered; everything else is absent
fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// First present value among alternate key spellings
fn field(item: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| item.get(*k))
        .find_map(scalar_string)
}

/// Map one provider item to a record. Non-object items yield `None`.
pub fn to_record(item: &Value, direction: Direction, terminal: Terminal) -> Option<FlightRecord> {
    let item = item.as_object()?;

    let counter = match direction {
        Direction::Departure => field(item, &["chkinrange", "chkinRange", "checkinRange"]),
        Direction::Arrival => None,
    };

    Some(FlightRecord {
        direction,
        terminal,
        gate: field(item, &["gatenumber", "gateNumber", "gate"]).unwrap_or_default(),
        counter,
        scheduled: field(item, &["scheduleDateTime", "scheduleDatetime", "scheduledatetime"])
            .unwrap_or_default(),
        estimated: field(item, &["estimatedDateTime", "estimatedDatetime", "estimateddatetime"]),
        flight: field(item, &["flightId", "flightid", "flightNo"]).unwrap_or_default(),
        airline: field(item, &["airline", "airlineName"]).unwrap_or_default(),
        airport: field(item, &["airport", "airportName"]).unwrap_or_default(),
        remark: field(item, &["remark", "status"]).unwrap_or_default(),
    })
}
