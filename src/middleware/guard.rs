// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Route guard: cheap session-cookie presence check at the edge.
//!
//! The guard never verifies the token. Page handlers do that through the
//! `SessionUser` extractor.

use crate::config::{AUTH_PREFIXES, PROTECTED_PREFIXES, SESSION_COOKIE};
use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;

pub const SIGNIN_PATH: &str = "/signin";
pub const DASHBOARD_PATH: &str = "/dashboard";

/// Outcome of the guard for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    RedirectToSignIn,
    RedirectToDashboard,
}

/// Decide what to do with a request for `path`.
pub fn decide(path: &str, has_session: bool) -> GuardDecision {
    let under = |prefixes: &[&str]| prefixes.iter().any(|prefix| matches_prefix(path, prefix));

    if !has_session && under(PROTECTED_PREFIXES) {
        GuardDecision::RedirectToSignIn
    } else if has_session && under(AUTH_PREFIXES) {
        GuardDecision::RedirectToDashboard
    } else {
        GuardDecision::Allow
    }
}

/// Segment-aware prefix match: `/dashboard` covers `/dashboard/x` but not
/// `/dashboards`.
fn matches_prefix(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// Middleware applying [`decide`] to every request.
pub async fn route_guard(jar: CookieJar, request: Request, next: Next) -> Response {
    let has_session = jar
        .get(SESSION_COOKIE)
        .is_some_and(|cookie| !cookie.value().is_empty());

    match decide(request.uri().path(), has_session) {
        GuardDecision::Allow => next.run(request).await,
        GuardDecision::RedirectToSignIn => {
            tracing::debug!(path = %request.uri().path(), "No session cookie, redirecting to sign-in");
            Redirect::temporary(SIGNIN_PATH).into_response()
        }
        GuardDecision::RedirectToDashboard => {
            tracing::debug!(path = %request.uri().path(), "Already signed in, redirecting to dashboard");
            Redirect::temporary(DASHBOARD_PATH).into_response()
        }
    }
}
