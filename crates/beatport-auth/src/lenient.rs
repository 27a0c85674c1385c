//! Best-effort field decoding for token JSON
//!
//! Token endpoints and hand-edited token files are not always typed the way
//! we would like. These decoders never fail on a wrong type: they fall back
//! to a default the rest of the crate already treats conservatively.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::constants::DEFAULT_EXPIRES_IN_SECS;

/// A string, with `null` or any non-string value read as `""`.
pub(crate) fn string_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        _ => Ok(String::new()),
    }
}

/// Seconds from any non-negative JSON number, else `DEFAULT_EXPIRES_IN_SECS`.
pub(crate) fn seconds_or_default<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(non_negative(&value).unwrap_or(DEFAULT_EXPIRES_IN_SECS))
}

/// Milliseconds from any non-negative JSON number, else 0 (already expired).
pub(crate) fn millis_or_zero<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(non_negative(&value).unwrap_or(0))
}

pub(crate) fn default_expires_in() -> u64 {
    DEFAULT_EXPIRES_IN_SECS
}

fn non_negative(value: &Value) -> Option<u64> {
    if let Some(n) = value.as_u64() {
        return Some(n);
    }
    value
        .as_f64()
        .filter(|f| f.is_finite() && *f >= 0.0)
        .map(|f| f as u64)
}
