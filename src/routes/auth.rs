// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Account and session routes.

use crate::config::AuthMode;
use crate::error::{AppError, Result};
use crate::middleware::auth::{expired_session_cookie, session_cookie};
use crate::models::profile::validate_uid;
use crate::models::UserProfile;
use crate::routes::extract::ValidatedJson;
use crate::routes::MutationResponse;
use crate::services::dev_session::{create_dev_session_token, DEV_SESSION_TTL_SECS};
use crate::time_utils::now_rfc3339;
use crate::AppState;
use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

pub fn routes(auth_mode: AuthMode) -> Router<Arc<AppState>> {
    let router = Router::new()
        .route("/api/auth/create-user", post(create_user))
        .route("/api/auth/logout", post(logout));

    match auth_mode {
        AuthMode::Development => router.route("/api/auth/dev-session", post(dev_session)),
        AuthMode::Firebase => router,
    }
}

/// Body for initial profile creation after sign-up.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateUserRequest {
    #[validate(custom(function = "validate_uid"))]
    pub uid: String,
    #[validate(email)]
    pub email: String,
}

/// Create the initial profile document for a newly signed-up user.
///
/// This overwrites any existing document for the uid, so the sign-up flow
/// must call it exactly once.
async fn create_user(
    State(state): State<Arc<AppState>>,
    ValidatedJson(body): ValidatedJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<MutationResponse>)> {
    let now = now_rfc3339();
    let profile = UserProfile::new_account(&body.uid, &body.email, now);

    state.store.create_profile(&profile).await?;

    tracing::info!(uid = %body.uid, "Created user profile");

    Ok((
        StatusCode::CREATED,
        Json(MutationResponse::ok("User profile created")),
    ))
}

/// Clear the session cookie.
async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> (StatusCode, CookieJar) {
    (
        StatusCode::NO_CONTENT,
        jar.add(expired_session_cookie(&state.config)),
    )
}

/// Body for minting a development session.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DevSessionRequest {
    #[validate(custom(function = "validate_uid"))]
    pub uid: String,
    #[validate(email)]
    pub email: Option<String>,
}

/// Issue a development session cookie. Only routed in development auth mode.
async fn dev_session(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    ValidatedJson(body): ValidatedJson<DevSessionRequest>,
) -> Result<(StatusCode, CookieJar)> {
    let token = create_dev_session_token(
        &body.uid,
        body.email.as_deref(),
        &state.config.dev_session_key,
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!("Session token creation failed: {}", e)))?;

    tracing::info!(uid = %body.uid, "Issued development session");

    let max_age = time::Duration::seconds(DEV_SESSION_TTL_SECS as i64);
    Ok((
        StatusCode::NO_CONTENT,
        jar.add(session_cookie(&state.config, token, max_age)),
    ))
}
