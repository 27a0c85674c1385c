//! OAuth token endpoint exchange
//!
//! Handles the two token endpoint interactions:
//! 1. Password grant (username/password for the initial token)
//! 2. Refresh grant (refresh token for a new access/refresh pair)
//!
//! Both POST form-encoded bodies to the same endpoint with different grant
//! types. Neither persists anything; that is the manager's job once a
//! response has been turned into a `TokenRecord`.

use common::Secret;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::lenient;

/// Username/password pair for the password grant.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: Secret<String>,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: Secret::new(password.into()),
        }
    }
}

/// Response from the token endpoint for both grants.
///
/// `expires_in` is a delta in seconds from the response time. Fields the
/// endpoint returns beyond the three we interpret (`token_type`, `scope`, ...)
/// are kept in `extra` and persisted untouched.
#[derive(Debug, Deserialize, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    /// Empty when the endpoint omits it or sends `null`
    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub refresh_token: String,
    #[serde(
        default = "lenient::default_expires_in",
        deserialize_with = "lenient::seconds_or_default"
    )]
    pub expires_in: u64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Constructor for the error kind a failed grant maps to.
type FailureKind = fn(Option<u16>, String, Option<String>) -> Error;

/// Exchange a username and password for tokens.
pub async fn request_password_grant(
    client: &reqwest::Client,
    token_url: &str,
    credentials: &Credentials,
) -> Result<TokenResponse> {
    let form = [
        ("grant_type", "password"),
        ("username", credentials.username.as_str()),
        ("password", credentials.password.expose().as_str()),
    ];
    post_grant(client, token_url, &form, Error::auth).await
}

/// Exchange a refresh token for a new access/refresh pair.
pub async fn request_refresh_grant(
    client: &reqwest::Client,
    token_url: &str,
    refresh_token: &str,
) -> Result<TokenResponse> {
    let form = [
        ("grant_type", "refresh_token"),
        ("refresh_token", refresh_token),
    ];
    post_grant(client, token_url, &form, Error::refresh).await
}

async fn post_grant(
    client: &reqwest::Client,
    token_url: &str,
    form: &[(&str, &str)],
    fail: FailureKind,
) -> Result<TokenResponse> {
    let response = client
        .post(token_url)
        .form(form)
        .send()
        .await
        .map_err(|e| fail(None, format!("token request failed: {e}"), None))?;

    let status = response.status();
    let body = response.text().await.map_err(|e| {
        fail(
            Some(status.as_u16()),
            format!("reading token response: {e}"),
            None,
        )
    })?;

    if !status.is_success() {
        return Err(fail(
            Some(status.as_u16()),
            format!("token endpoint returned {status}"),
            Some(body),
        ));
    }

    let parsed = serde_json::from_str::<TokenResponse>(&body);
    parsed.map_err(|e| {
        fail(
            Some(status.as_u16()),
            format!("invalid token response: {e}"),
            Some(body),
        )
    })
}
