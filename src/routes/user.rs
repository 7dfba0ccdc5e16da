// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Role assignment and community directory endpoints.

use crate::error::Result;
use crate::middleware::SessionUser;
use crate::models::profile::validate_uid;
use crate::models::{ManagerSummary, ProfilePatch, TalentSummary, UserType};
use crate::routes::extract::ValidatedJson;
use crate::routes::MutationResponse;
use crate::services::{directory, roles};
use crate::time_utils::now_rfc3339;
use crate::AppState;
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/user/set-role", post(set_role))
        .route("/api/user/featured-talent", get(get_featured_talent))
        .route("/api/user/managers", get(get_managers))
        .route("/api/user/role", get(get_role))
}

// ─── Role ────────────────────────────────────────────────────

/// Role selection. Values outside [`UserType`] fail deserialization.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SetRoleRequest {
    #[validate(custom(function = "validate_uid"))]
    pub uid: String,
    pub user_type: UserType,
}

/// Record the role a user picked. Last writer wins.
async fn set_role(
    State(state): State<Arc<AppState>>,
    ValidatedJson(body): ValidatedJson<SetRoleRequest>,
) -> Result<Json<MutationResponse>> {
    let patch = ProfilePatch {
        uid: Some(body.uid.clone()),
        user_type: Some(body.user_type),
        updated_at: Some(now_rfc3339()),
        ..Default::default()
    };

    state.store.merge_profile(&body.uid, &patch).await?;

    tracing::info!(uid = %body.uid, user_type = %body.user_type, "Set user role");

    Ok(Json(MutationResponse::ok("Role updated")))
}

/// Role of the signed-in user.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RoleResponse {
    pub uid: String,
    pub user_type: Option<UserType>,
}

async fn get_role(State(state): State<Arc<AppState>>, user: SessionUser) -> Json<RoleResponse> {
    let user_type = roles::resolve_user_type(state.store.as_ref(), &user.uid).await;
    Json(RoleResponse {
        uid: user.uid,
        user_type,
    })
}

// ─── Directory ───────────────────────────────────────────────

async fn get_featured_talent(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<TalentSummary>>> {
    let talent = directory::featured_talent(state.store.as_ref()).await?;
    Ok(Json(talent))
}

async fn get_managers(State(state): State<Arc<AppState>>) -> Result<Json<Vec<ManagerSummary>>> {
    let managers = directory::managers(state.store.as_ref()).await?;
    Ok(Json(managers))
}
