// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Onboarding form submissions, one endpoint per role.

use crate::error::{AppError, Result};
use crate::models::profile::{validate_uid, STATUS_PENDING_REVIEW};
use crate::models::{ProfilePatch, UserType};
use crate::routes::extract::ValidatedJson;
use crate::routes::MutationResponse;
use crate::time_utils::now_rfc3339;
use crate::AppState;
use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use chrono::NaiveDate;
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/onboarding/manager-basic", post(submit_manager_basic))
        .route("/api/onboarding/youth-basic", post(submit_youth_basic))
}

/// Basic manager profile form.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ManagerBasicForm {
    #[validate(custom(function = "validate_uid"))]
    pub uid: String,
    #[validate(length(min = 1, max = 100))]
    pub full_name: Option<String>,
    #[validate(length(max = 32))]
    pub phone: Option<String>,
    #[validate(length(max = 100))]
    pub location: Option<String>,
    #[validate(length(max = 2000))]
    pub bio: Option<String>,
    #[validate(url)]
    pub profile_image_url: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub company_name: Option<String>,
    #[validate(length(max = 100))]
    pub job_title: Option<String>,
    #[validate(url)]
    pub website: Option<String>,
    #[validate(length(max = 20))]
    pub talent_interests: Option<Vec<String>>,
}

/// Basic youth profile form.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct YouthBasicForm {
    #[validate(custom(function = "validate_uid"))]
    pub uid: String,
    #[validate(length(min = 1, max = 100))]
    pub full_name: Option<String>,
    #[validate(length(max = 32))]
    pub phone: Option<String>,
    #[validate(length(max = 100))]
    pub location: Option<String>,
    #[validate(length(max = 2000))]
    pub bio: Option<String>,
    #[validate(url)]
    pub profile_image_url: Option<String>,
    /// Calendar date, `YYYY-MM-DD`
    #[cfg_attr(feature = "binding-generation", ts(type = "string | null"))]
    pub date_of_birth: Option<NaiveDate>,
    #[validate(length(max = 30))]
    pub skills: Option<Vec<String>>,
    #[validate(email)]
    pub guardian_email: Option<String>,
    #[validate(url)]
    pub portfolio_url: Option<String>,
}

/// Fields every onboarding submission writes alongside the form data.
fn submission_patch(uid: String, user_type: UserType) -> ProfilePatch {
    ProfilePatch {
        uid: Some(uid),
        user_type: Some(user_type),
        profile_completed: Some(false),
        status: Some(STATUS_PENDING_REVIEW.to_string()),
        updated_at: Some(now_rfc3339()),
        ..Default::default()
    }
}

impl ManagerBasicForm {
    pub fn into_patch(self) -> ProfilePatch {
        ProfilePatch {
            full_name: self.full_name,
            phone: self.phone,
            location: self.location,
            bio: self.bio,
            profile_image_url: self.profile_image_url,
            company_name: self.company_name,
            job_title: self.job_title,
            website: self.website,
            talent_interests: self.talent_interests,
            ..submission_patch(self.uid, UserType::Manager)
        }
    }
}

impl YouthBasicForm {
    pub fn into_patch(self) -> ProfilePatch {
        ProfilePatch {
            full_name: self.full_name,
            phone: self.phone,
            location: self.location,
            bio: self.bio,
            profile_image_url: self.profile_image_url,
            date_of_birth: self.date_of_birth.map(|d| d.format("%Y-%m-%d").to_string()),
            skills: self.skills,
            guardian_email: self.guardian_email,
            portfolio_url: self.portfolio_url,
            ..submission_patch(self.uid, UserType::Youth)
        }
    }
}

/// Merge-write a submission and report success.
async fn save_submission(
    state: &AppState,
    patch: ProfilePatch,
) -> Result<(StatusCode, Json<MutationResponse>)> {
    let uid = patch
        .uid
        .clone()
        .ok_or_else(|| AppError::BadRequest("uid is required".to_string()))?;

    state.store.merge_profile(&uid, &patch).await?;

    tracing::info!(
        uid = %uid,
        user_type = ?patch.user_type,
        fields = patch.field_names().len(),
        "Saved onboarding submission"
    );

    Ok((
        StatusCode::CREATED,
        Json(MutationResponse::ok("Profile saved")),
    ))
}

async fn submit_manager_basic(
    State(state): State<Arc<AppState>>,
    ValidatedJson(form): ValidatedJson<ManagerBasicForm>,
) -> Result<(StatusCode, Json<MutationResponse>)> {
    save_submission(&state, form.into_patch()).await
}

async fn submit_youth_basic(
    State(state): State<Arc<AppState>>,
    ValidatedJson(form): ValidatedJson<YouthBasicForm>,
) -> Result<(StatusCode, Json<MutationResponse>)> {
    if let Some(date_of_birth) = form.date_of_birth {
        if date_of_birth > chrono::Utc::now().date_naive() {
            return Err(AppError::BadRequest(
                "dateOfBirth must not be in the future".to_string(),
            ));
        }
    }

    save_submission(&state, form.into_patch()).await
}
