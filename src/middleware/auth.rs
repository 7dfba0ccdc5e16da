// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session authentication for page handlers and session-backed endpoints.

use crate::config::{Config, SESSION_COOKIE};
use crate::error::AppError;
use crate::services::SessionError;
use crate::AppState;
use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use std::sync::Arc;

/// Build the session cookie with the attributes shared by set and clear.
pub fn session_cookie(config: &Config, value: String, max_age: time::Duration) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.secure_cookies())
        .max_age(max_age)
        .build()
}

/// Cookie that deletes `__session` in the browser.
pub fn expired_session_cookie(config: &Config) -> Cookie<'static> {
    session_cookie(config, String::new(), time::Duration::ZERO)
}

/// Authenticated user extracted from a verified `__session` cookie.
///
/// Verification runs on every request. A missing or invalid session
/// redirects to sign-in. A cookie that fails verification is cleared in the
/// same response.
#[derive(Debug, Clone)]
pub struct SessionUser {
    pub uid: String,
    pub email: Option<String>,
}

impl FromRequestParts<Arc<AppState>> for SessionUser {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);

        let token = match jar.get(SESSION_COOKIE) {
            Some(cookie) if !cookie.value().is_empty() => cookie.value().to_string(),
            _ => return Err(AppError::Unauthorized.into_response()),
        };

        let reject = || {
            let jar = CookieJar::new().add(expired_session_cookie(&state.config));
            (jar, AppError::InvalidToken).into_response()
        };

        match state.verifier.verify_session(&token).await {
            Ok(session) => Ok(SessionUser {
                uid: session.uid,
                email: session.email,
            }),
            Err(SessionError::Invalid(reason)) => {
                tracing::info!(reason = %reason, path = %parts.uri.path(), "Rejected session cookie");
                Err(reject())
            }
            Err(SessionError::Transient(reason)) => {
                tracing::error!(reason = %reason, "Session verification transient failure");
                Err(reject())
            }
        }
    }
}
