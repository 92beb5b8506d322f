//! Lenient decoding of feed elements.
//!
//! Each field is read with its own parse-with-default helper instead of a
//! strict `Deserialize` impl, so one bad value never rejects a record:
//!
//! | field       | reads as | fallback        |
//! |-------------|----------|-----------------|
//! | `id`        | integer  | `0`             |
//! | `longitude` | float    | `0.0`           |
//! | `latitude`  | float    | `0.0`           |
//! | `mag`       | float    | `0.0`           |
//! | `time`      | date     | decode time     |
//! | `place`     | string   | `""`            |
//!
//! Numbers given as strings are accepted, booleans count as `1`/`0`, and a
//! numeric `place` is rendered as text. Only the outer shape is strict: the
//! body must be a JSON array.

use chrono::{DateTime, Utc};
use serde_json::Value;
use thiserror::Error;

use crate::model::Earthquake;

/// `yyyy-MM-dd'T'HH:mm:ss.SSSZ`, e.g. `2016-02-24T10:00:00.000-0800`.
///
/// The offset may also be written as `Z` for UTC (`2016-02-24T18:00:00.000Z`).
pub const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%#z";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FeedError {
    #[error("expected a JSON array of earthquakes, found {0}")]
    NotAnArray(&'static str),
}

/// Decode a whole response body. Every array element becomes one record.
pub fn decode_feed(body: &Value) -> Result<Vec<Earthquake>, FeedError> {
    let items = body
        .as_array()
        .ok_or_else(|| FeedError::NotAnArray(kind_of(body)))?;
    let now = Utc::now();
    Ok(items.iter().map(|item| decode_record(item, now)).collect())
}

/// Decode one element, using `now` when `time` is missing or unparseable.
pub fn decode_record(item: &Value, now: DateTime<Utc>) -> Earthquake {
    let time = string_or_empty(item.get("time"));
    let timestamp = parse_time(&time).unwrap_or_else(|| {
        tracing::debug!(raw_time = %time, "quake.decode.time_fallback");
        now
    });

    Earthquake::new(
        int_or_zero(item.get("id")),
        float_or_zero(item.get("longitude")),
        float_or_zero(item.get("latitude")),
        float_or_zero(item.get("mag")),
        timestamp,
        string_or_empty(item.get("place")),
    )
}

pub fn parse_time(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_str(raw.trim(), TIME_FORMAT)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

pub fn int_or_zero(v: Option<&Value>) -> i64 {
    match v {
        Some(Value::Number(n)) => n
            .as_i64()
            .unwrap_or_else(|| truncate(n.as_f64().unwrap_or_default())),
        Some(Value::String(s)) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| parse_finite(s).map(truncate))
                .unwrap_or_default()
        }
        Some(Value::Bool(b)) => i64::from(*b),
        _ => 0,
    }
}

pub fn float_or_zero(v: Option<&Value>) -> f64 {
    match v {
        Some(Value::Number(n)) => n.as_f64().unwrap_or_default(),
        Some(Value::String(s)) => parse_finite(s.trim()).unwrap_or_default(),
        Some(Value::Bool(b)) => f64::from(u8::from(*b)),
        _ => 0.0,
    }
}

pub fn string_or_empty(v: Option<&Value>) -> String {
    match v {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

fn parse_finite(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|f| f.is_finite())
}

// `as` saturates at the i64 bounds.
fn truncate(f: f64) -> i64 {
    f.trunc() as i64
}

fn kind_of(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
