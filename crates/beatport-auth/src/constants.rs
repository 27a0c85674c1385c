//! Beatport API constants
//!
//! Public endpoints of the Beatport v4 API. The password grant is accepted
//! directly at the token endpoint; no client registration values are needed.

/// Token endpoint for both the password grant and the refresh grant
pub const TOKEN_ENDPOINT: &str = "https://api.beatport.com/v4/auth/o/token/";

/// Base URL that authenticated endpoint paths are appended to
pub const API_BASE_URL: &str = "https://api.beatport.com/v4";

/// Token introspection endpoint, relative to `API_BASE_URL`
pub const INTROSPECT_ENDPOINT: &str = "auth/o/introspect/";

/// Well-known relative path of the persisted token record
pub const TOKEN_FILE: &str = ".beatport_token.json";

/// Lifetime assumed when the token endpoint omits `expires_in`
pub const DEFAULT_EXPIRES_IN_SECS: u64 = 3600;
