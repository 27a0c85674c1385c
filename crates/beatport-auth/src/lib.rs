//! Beatport OAuth token lifecycle library
//!
//! Acquires a bearer token with the OAuth2 password grant, keeps it in a
//! `TokenStore`, refreshes it when it has expired, and attaches it to API
//! calls. The crate has no dependency on the CLI binary and can be used and
//! tested on its own.
//!
//! Token flow:
//! 1. `TokenManager::acquire_token()` exchanges username/password at the token endpoint
//! 2. The response becomes a `TokenRecord` with a locally computed `expires_at`
//! 3. The record is written through `TokenStore::save()`
//! 4. `TokenManager::get_valid_token()` reloads it on every call and refreshes once expired
//! 5. `TokenManager::authenticated_request()` sends the token as `Authorization: Bearer`

pub mod constants;
pub mod error;
mod lenient;
pub mod manager;
pub mod record;
pub mod store;
pub mod token;

#[cfg(test)]
mod testing;

pub use constants::*;
pub use error::{Error, Result};
pub use manager::{Endpoints, TokenManager};
pub use record::{TokenRecord, now_millis};
pub use store::{FileTokenStore, MemoryTokenStore, TokenStore};
pub use token::{Credentials, TokenResponse, request_password_grant, request_refresh_grant};
