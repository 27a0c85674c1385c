//! The persisted token record
//!
//! `expires_at` is a unix timestamp in milliseconds, computed locally from
//! `expires_in` when a token response is turned into a record. It is never
//! read from the token endpoint.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::lenient;
use crate::token::TokenResponse;

/// The single bearer token this client holds, as stored on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenRecord {
    pub access_token: String,
    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub refresh_token: String,
    /// Seconds of validity reported at issuance. Informational only.
    #[serde(
        default = "lenient::default_expires_in",
        deserialize_with = "lenient::seconds_or_default"
    )]
    pub expires_in: u64,
    /// Expiration as unix timestamp in milliseconds. Missing or non-numeric
    /// values load as 0, so partial records count as expired.
    #[serde(default, deserialize_with = "lenient::millis_or_zero")]
    pub expires_at: u64,
    /// Server-supplied fields passed through untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TokenRecord {
    /// Build a record from a token endpoint response issued at `issued_at_millis`.
    pub fn issue(response: TokenResponse, issued_at_millis: u64) -> Self {
        let TokenResponse {
            access_token,
            refresh_token,
            expires_in,
            mut extra,
        } = response;

        // Our own field; a server value must not shadow the computed one.
        extra.remove("expires_at");

        Self {
            access_token,
            refresh_token,
            expires_in,
            expires_at: issued_at_millis.saturating_add(expires_in.saturating_mul(1000)),
            extra,
        }
    }

    pub fn is_valid_at(&self, now_millis: u64) -> bool {
        now_millis < self.expires_at
    }

    /// Whether the access token is still usable right now.
    pub fn is_valid(&self) -> bool {
        self.is_valid_at(now_millis())
    }
}

/// Current wall-clock time as unix milliseconds.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
