//! In-process stand-in for the Beatport token endpoint and API

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::body::Body;
use axum::extract::{Form, State};
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::json;
use tokio::net::TcpListener;

use crate::manager::Endpoints;

#[derive(Default)]
struct Counters {
    password: AtomicUsize,
    refresh: AtomicUsize,
    api: AtomicUsize,
}

/// Mock upstream bound to an ephemeral localhost port.
///
/// The token route accepts `USERNAME`/`PASSWORD` and `REFRESH_TOKEN`; any
/// other credential gets a 401 `invalid_grant`. Every other path echoes the
/// request back as JSON, except `.../broken/` (500) and `.../empty/` (204).
pub(crate) struct MockServer {
    url: String,
    counters: Arc<Counters>,
    _handle: tokio::task::JoinHandle<()>,
}

impl MockServer {
    pub const USERNAME: &'static str = "dj@example.com";
    pub const PASSWORD: &'static str = "hunter2";
    pub const REFRESH_TOKEN: &'static str = "xyz";
    /// Refresh token answered with a 200 whose body is not JSON
    pub const GARBLED_REFRESH: &'static str = "rt_garbled";
    /// Refresh token answered with a null refresh token and a float lifetime
    pub const LOOSE_REFRESH: &'static str = "rt_loose";

    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let counters = Arc::new(Counters::default());

        let app = Router::new()
            .route("/auth/o/token/", post(token_handler))
            .fallback(api_handler)
            .with_state(counters.clone());

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            url: format!("http://{addr}"),
            counters,
            _handle: handle,
        }
    }

    pub fn token_url(&self) -> String {
        format!("{}/auth/o/token/", self.url)
    }

    pub fn endpoints(&self) -> Endpoints {
        Endpoints {
            token_url: self.token_url(),
            base_url: self.url.clone(),
        }
    }

    pub fn password_grants(&self) -> usize {
        self.counters.password.load(Ordering::SeqCst)
    }

    pub fn refresh_grants(&self) -> usize {
        self.counters.refresh.load(Ordering::SeqCst)
    }

    pub fn api_calls(&self) -> usize {
        self.counters.api.load(Ordering::SeqCst)
    }
}

fn invalid_grant() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "error": "invalid_grant",
            "error_description": "Invalid credentials given."
        })),
    )
        .into_response()
}

fn form_field<'a>(form: &'a HashMap<String, String>, name: &str) -> &'a str {
    form.get(name).map(String::as_str).unwrap_or("")
}

async fn token_handler(
    State(counters): State<Arc<Counters>>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    match form_field(&form, "grant_type") {
        "password" => {
            counters.password.fetch_add(1, Ordering::SeqCst);
            if form_field(&form, "username") != MockServer::USERNAME
                || form_field(&form, "password") != MockServer::PASSWORD
            {
                return invalid_grant();
            }
            Json(json!({
                "access_token": "abc",
                "refresh_token": "xyz",
                "expires_in": 3600,
                "token_type": "Bearer",
                "scope": "app:locker user:dj"
            }))
            .into_response()
        }
        "refresh_token" => {
            counters.refresh.fetch_add(1, Ordering::SeqCst);
            let refresh = form_field(&form, "refresh_token");
            if refresh == MockServer::GARBLED_REFRESH {
                return (StatusCode::OK, "<html>maintenance</html>").into_response();
            }
            if refresh == MockServer::LOOSE_REFRESH {
                return Json(json!({
                    "access_token": "loose",
                    "refresh_token": null,
                    "expires_in": 1800.0
                }))
                .into_response();
            }
            if refresh != MockServer::REFRESH_TOKEN {
                return invalid_grant();
            }
            Json(json!({
                "access_token": "refreshed",
                "refresh_token": "xyz2",
                "expires_in": 3600,
                "token_type": "Bearer"
            }))
            .into_response()
        }
        _ => (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "unsupported_grant_type"})),
        )
            .into_response(),
    }
}

async fn api_handler(State(counters): State<Arc<Counters>>, request: Request<Body>) -> Response {
    counters.api.fetch_add(1, Ordering::SeqCst);

    let authorization = request
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();
    let content_type = request
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let query = request.uri().query().unwrap_or("").to_string();

    if !authorization.starts_with("Bearer ") {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "Authentication credentials were not provided."})),
        )
            .into_response();
    }
    if path.ends_with("/broken/") {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"detail": "upstream exploded"})),
        )
            .into_response();
    }
    if path.ends_with("/empty/") {
        return StatusCode::NO_CONTENT.into_response();
    }

    let body_bytes = axum::body::to_bytes(request.into_body(), 1024 * 1024)
        .await
        .unwrap();
    let body = String::from_utf8_lossy(&body_bytes).to_string();

    Json(json!({
        "method": method,
        "path": path,
        "query": query,
        "authorization": authorization,
        "content_type": content_type,
        "body": body,
    }))
    .into_response()
}
