// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Server-side page handlers.
//!
//! Each page verifies the session, resolves the user's role and either
//! redirects or returns a view descriptor for the frontend to render.

use crate::middleware::SessionUser;
use crate::models::{ManagerSummary, TalentSummary, UserType};
use crate::services::{directory, roles};
use crate::AppState;
use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub const ONBOARDING_PATH: &str = "/onboarding";
pub const CHOOSE_ROLE_PATH: &str = "/choose-role";
const SET_ROLE_PATH: &str = "/api/user/set-role";

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(ONBOARDING_PATH, get(onboarding_page))
        .route(CHOOSE_ROLE_PATH, get(choose_role_page))
        .route("/dashboard", get(dashboard_page))
}

/// Onboarding form to show the signed-in user.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct OnboardingView {
    pub uid: String,
    pub email: Option<String>,
    pub user_type: UserType,
    pub form: String,
    pub submit_path: String,
    pub profile_completed: bool,
}

/// Role selection for a user without a role.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ChooseRoleView {
    pub uid: String,
    pub roles: Vec<UserType>,
    pub submit_path: String,
}

/// Role-specific dashboard content.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DashboardView {
    pub uid: String,
    pub user_type: UserType,
    pub full_name: Option<String>,
    pub profile_completed: bool,
    pub status: Option<String>,
    pub featured_talent: Vec<TalentSummary>,
    pub managers: Vec<ManagerSummary>,
}

async fn onboarding_page(State(state): State<Arc<AppState>>, user: SessionUser) -> Response {
    let profile = roles::resolve_profile(state.store.as_ref(), &user.uid).await;

    let Some(user_type) = profile.as_ref().and_then(|p| p.resolved_user_type()) else {
        tracing::debug!(uid = %user.uid, "No role yet, sending to role selection");
        return Redirect::temporary(CHOOSE_ROLE_PATH).into_response();
    };

    let form = user_type.onboarding_form();
    Json(OnboardingView {
        email: user
            .email
            .or_else(|| profile.as_ref().and_then(|p| p.email.clone())),
        uid: user.uid,
        user_type,
        form: form.to_string(),
        submit_path: format!("/api/onboarding/{form}"),
        profile_completed: profile.is_some_and(|p| p.profile_completed),
    })
    .into_response()
}

async fn choose_role_page(State(state): State<Arc<AppState>>, user: SessionUser) -> Response {
    if roles::resolve_user_type(state.store.as_ref(), &user.uid)
        .await
        .is_some()
    {
        return Redirect::temporary(ONBOARDING_PATH).into_response();
    }

    Json(ChooseRoleView {
        uid: user.uid,
        roles: UserType::ALL.to_vec(),
        submit_path: SET_ROLE_PATH.to_string(),
    })
    .into_response()
}

async fn dashboard_page(State(state): State<Arc<AppState>>, user: SessionUser) -> Response {
    let profile = roles::resolve_profile(state.store.as_ref(), &user.uid).await;

    let Some((profile, user_type)) =
        profile.and_then(|p| p.resolved_user_type().map(|user_type| (p, user_type)))
    else {
        return Redirect::temporary(CHOOSE_ROLE_PATH).into_response();
    };

    // A failed listing leaves that section empty instead of failing the page.
    let (featured_talent, managers) = match user_type {
        UserType::Manager => {
            let talent = directory::featured_talent(state.store.as_ref())
                .await
                .unwrap_or_else(|e| {
                    tracing::warn!(error = %e, "Featured talent unavailable");
                    Vec::new()
                });
            (talent, Vec::new())
        }
        UserType::Youth => {
            let managers = directory::managers(state.store.as_ref())
                .await
                .unwrap_or_else(|e| {
                    tracing::warn!(error = %e, "Manager directory unavailable");
                    Vec::new()
                });
            (Vec::new(), managers)
        }
    };

    Json(DashboardView {
        uid: user.uid,
        user_type,
        full_name: profile.full_name,
        profile_completed: profile.profile_completed,
        status: profile.status,
        featured_talent,
        managers,
    })
    .into_response()
}
