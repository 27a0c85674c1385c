//! Token lifecycle manager
//!
//! Owns the one bearer token this client uses. The token moves through three
//! states:
//! - Absent: nothing stored. Only `acquire_token` leaves this state.
//! - Valid: stored and `now < expires_at`. Used as-is, no network.
//! - Expired: stored but past `expires_at`. Refreshed lazily the next time a
//!   token is asked for.
//!
//! `is_valid` and `refresh` expose the two halves of that decision
//! separately; `get_valid_token` composes them. Nothing here retries: every
//! failure is returned to the caller as-is.

use std::sync::Arc;

use reqwest::Method;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::constants::{API_BASE_URL, INTROSPECT_ENDPOINT, TOKEN_ENDPOINT};
use crate::error::{Error, Result};
use crate::record::{TokenRecord, now_millis};
use crate::store::TokenStore;
use crate::token::{self, Credentials, TokenResponse};

/// Where the token endpoint and the API live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub token_url: String,
    pub base_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            token_url: TOKEN_ENDPOINT.to_string(),
            base_url: API_BASE_URL.to_string(),
        }
    }
}

impl Endpoints {
    /// Full URL for an API path given relative to `base_url`.
    pub fn api_url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }
}

pub struct TokenManager {
    client: reqwest::Client,
    store: Arc<dyn TokenStore>,
    endpoints: Endpoints,
}

impl TokenManager {
    pub fn new(client: reqwest::Client, store: Arc<dyn TokenStore>, endpoints: Endpoints) -> Self {
        Self {
            client,
            store,
            endpoints,
        }
    }

    /// Exchange credentials for a new token and persist it.
    ///
    /// On failure the stored record is left exactly as it was.
    pub async fn acquire_token(&self, credentials: &Credentials) -> Result<TokenRecord> {
        let response =
            token::request_password_grant(&self.client, &self.endpoints.token_url, credentials)
                .await
                .inspect_err(|e| log_upstream_failure(e, "password grant failed"))?;

        let record = self.persist(response).await?;
        info!(
            username = %credentials.username,
            expires_at = record.expires_at,
            "acquired new access token"
        );
        Ok(record)
    }

    /// Exchange `refresh_token` for a new access/refresh pair and persist it.
    pub async fn refresh_with(&self, refresh_token: &str) -> Result<TokenRecord> {
        if refresh_token.is_empty() {
            return Err(Error::NotAuthenticated(
                "stored token has no refresh token; authenticate with credentials".into(),
            ));
        }

        let response =
            token::request_refresh_grant(&self.client, &self.endpoints.token_url, refresh_token)
                .await
                .inspect_err(|e| log_upstream_failure(e, "refresh grant failed"))?;

        let record = self.persist(response).await?;
        info!(expires_at = record.expires_at, "refreshed access token");
        Ok(record)
    }

    /// Refresh the stored token using its own refresh token.
    pub async fn refresh(&self) -> Result<TokenRecord> {
        let record = self.load_required().await?;
        self.refresh_with(&record.refresh_token).await
    }

    /// Whether a stored token exists and has not yet expired. Never touches
    /// the network.
    pub async fn is_valid(&self) -> bool {
        match self.store.load().await {
            Ok(Some(record)) => record.is_valid(),
            Ok(None) => false,
            Err(e) => {
                warn!(error = %e, "token store unreadable, treating token as invalid");
                false
            }
        }
    }

    /// Access token ready for use, refreshing it first if it has expired.
    pub async fn get_valid_token(&self) -> Result<String> {
        let record = self.load_required().await?;

        if record.is_valid() {
            debug!(expires_at = record.expires_at, "using stored token");
            return Ok(record.access_token);
        }

        info!(expires_at = record.expires_at, "stored token expired, refreshing");
        let refreshed = self.refresh_with(&record.refresh_token).await?;
        Ok(refreshed.access_token)
    }

    /// Issue one authenticated call to `endpoint` (relative to the API base).
    ///
    /// `body` is sent as JSON only for POST, PUT and PATCH. No request is
    /// made when no token can be obtained. An empty success body yields
    /// `Value::Null`.
    pub async fn authenticated_request(
        &self,
        endpoint: &str,
        method: Method,
        params: &[(&str, &str)],
        body: Option<&Value>,
    ) -> Result<Value> {
        let token = self.get_valid_token().await?;
        let url = self.endpoints.api_url(endpoint);

        let mut request = self
            .client
            .request(method.clone(), &url)
            .bearer_auth(&token)
            .query(params);

        if sends_body(&method) {
            if let Some(body) = body {
                request = request.json(body);
            }
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::request(None, format!("{method} {url} failed: {e}"), None))
            .inspect_err(|e| log_upstream_failure(e, "API request failed"))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            Error::request(
                Some(status.as_u16()),
                format!("reading response from {url}: {e}"),
                None,
            )
        })?;

        if !status.is_success() {
            let err = Error::request(
                Some(status.as_u16()),
                format!("{method} {url} returned {status}"),
                Some(text),
            );
            log_upstream_failure(&err, "API request rejected");
            return Err(err);
        }

        debug!(%method, %url, status = status.as_u16(), "API request succeeded");

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        let parsed = serde_json::from_str::<Value>(&text);
        parsed.map_err(|e| {
            Error::request(
                Some(status.as_u16()),
                format!("invalid JSON from {url}: {e}"),
                Some(text),
            )
        })
    }

    /// Ask the API to describe the current token.
    pub async fn introspect(&self) -> Result<Value> {
        self.authenticated_request(INTROSPECT_ENDPOINT, Method::GET, &[], None)
            .await
    }

    async fn persist(&self, response: TokenResponse) -> Result<TokenRecord> {
        let record = TokenRecord::issue(response, now_millis());
        self.store.save(&record).await?;
        Ok(record)
    }

    async fn load_required(&self) -> Result<TokenRecord> {
        self.store.load().await?.ok_or_else(|| {
            Error::NotAuthenticated("no stored token; authenticate with credentials".into())
        })
    }
}

fn sends_body(method: &Method) -> bool {
    *method == Method::POST || *method == Method::PUT || *method == Method::PATCH
}

fn log_upstream_failure(error: &Error, context: &str) {
    warn!(
        status = ?error.status(),
        body = error.body().unwrap_or("<no body>"),
        error = %error,
        "{context}"
    );
}
