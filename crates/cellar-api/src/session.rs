//! Password-cookie sessions.
//!
//! One shared password guards the instance. A successful login sets an
//! `HttpOnly` cookie holding the session secret; the auth middleware checks
//! it on every request. When no password is configured the instance is open,
//! and when guest mode is enabled GET requests pass without a cookie.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Request, State},
    http::{HeaderMap, HeaderValue, Method, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

pub const COOKIE_NAME: &str = "session";

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SessionStatus {
    pub authenticated: bool,
    pub guest: bool,
}

/// Extract the session cookie value from the `Cookie` header, if present.
fn cookie_value(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get(header::COOKIE)?.to_str().ok()?;
    raw.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == COOKIE_NAME).then(|| value.to_string())
    })
}

fn has_valid_session(state: &AppState, headers: &HeaderMap) -> bool {
    match state.config.session_secret() {
        // No password configured: open instance.
        None => true,
        Some(secret) => cookie_value(headers).is_some_and(|value| value == secret),
    }
}

fn set_cookie(value: &str, max_age_secs: i64) -> HeaderValue {
    let cookie =
        format!("{COOKIE_NAME}={value}; HttpOnly; Path=/; SameSite=Lax; Max-Age={max_age_secs}");
    HeaderValue::from_str(&cookie)
        .unwrap_or_else(|_| HeaderValue::from_static("session=; Max-Age=0"))
}

/// `POST /api/session`: exchange the password for a session cookie.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> Response {
    let Some(password) = state.config.auth.password.as_deref() else {
        return (
            StatusCode::CONFLICT,
            "no password configured; instance is open",
        )
            .into_response();
    };

    if request.password != password {
        tracing::warn!("login rejected: wrong password");
        return (StatusCode::UNAUTHORIZED, "wrong password").into_response();
    }

    // session_secret() is Some whenever a password is set.
    let secret = state.config.session_secret().unwrap_or(password);
    let mut response = Json(SessionStatus {
        authenticated: true,
        guest: false,
    })
    .into_response();
    response.headers_mut().insert(
        header::SET_COOKIE,
        set_cookie(secret, state.config.auth.session_max_age_secs),
    );
    tracing::info!("session opened");
    response
}

/// `DELETE /api/session`: clear the cookie.
pub async fn logout() -> Response {
    let mut response = StatusCode::NO_CONTENT.into_response();
    response
        .headers_mut()
        .insert(header::SET_COOKIE, set_cookie("", 0));
    response
}

/// `GET /api/session`: report whether the caller is authenticated.
pub async fn status(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    Json(SessionStatus {
        authenticated: has_valid_session(&state, &headers),
        guest: state.config.guest.enabled,
    })
    .into_response()
}

/// Middleware guarding everything behind `/api` except the session routes.
pub async fn require_session(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    if has_valid_session(&state, request.headers()) {
        return next.run(request).await;
    }
    if state.config.guest.enabled && request.method() == Method::GET {
        return next.run(request).await;
    }

    tracing::debug!(path = %request.uri().path(), "unauthenticated request rejected");
    (StatusCode::UNAUTHORIZED, "session required").into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers_with_cookie(raw: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(raw).unwrap());
        headers
    }

    #[test]
    fn cookie_parsing_handles_multiple_pairs() {
        let headers = headers_with_cookie("theme=dark; session=s3cret; lang=en");
        assert_eq!(cookie_value(&headers), Some("s3cret".to_string()));

        let headers = headers_with_cookie("theme=dark");
        assert_eq!(cookie_value(&headers), None);
    }

    #[test]
    fn set_cookie_carries_attributes() {
        let value = set_cookie("s3cret", 2_592_000);
        let raw = value.to_str().unwrap();
        assert!(raw.starts_with("session=s3cret;"));
        assert!(raw.contains("HttpOnly"));
        assert!(raw.contains("SameSite=Lax"));
        assert!(raw.contains("Max-Age=2592000"));
    }
}
