//! Lenient readers for controller JSON.
//!
//! Firmware versions disagree on whether identifiers such as MCC or cell id are
//! strings or numbers, and whether counters are numbers or numeric strings. These
//! helpers accept either and never fail: anything unusable reads as absent.

use serde_json::{Number, Value};

pub(crate) fn lenient_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

pub(crate) fn string_or_empty(value: Option<&Value>) -> String {
    lenient_string(value).unwrap_or_default()
}

pub(crate) fn lenient_f64(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Like [`lenient_f64`], but keeps integers integral so `-85` is republished as
/// `-85` and not `-85.0`.
pub(crate) fn lenient_number(value: Option<&Value>) -> Option<Number> {
    match value? {
        Value::Number(n) => Some(n.clone()),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .map(Number::from)
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(Number::from_f64))
        }
        _ => None,
    }
}

pub(crate) fn lenient_i64(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub(crate) fn lenient_u64(value: Option<&Value>) -> Option<u64> {
    lenient_i64(value).and_then(|v| u64::try_from(v).ok())
}

pub(crate) fn lenient_bool(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_i64().is_some_and(|n| n != 0),
        _ => false,
    }
}
