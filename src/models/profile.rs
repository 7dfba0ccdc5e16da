// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User profile model for storage and API.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::ValidationError;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Status written by every onboarding submission until review completes.
pub const STATUS_PENDING_REVIEW: &str = "pending_review";

/// Firebase Auth uids are at most 128 characters.
const MAX_UID_LEN: usize = 128;

/// Which side of the marketplace a user is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum UserType {
    Youth,
    Manager,
}

impl UserType {
    pub const ALL: [UserType; 2] = [UserType::Youth, UserType::Manager];

    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::Youth => "youth",
            UserType::Manager => "manager",
        }
    }

    /// Name of the onboarding form presented to this role.
    pub fn onboarding_form(&self) -> &'static str {
        match self {
            UserType::Youth => "youth-basic",
            UserType::Manager => "manager-basic",
        }
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "youth" => Ok(UserType::Youth),
            "manager" => Ok(UserType::Manager),
            other => Err(format!("unknown user type: {other}")),
        }
    }
}

/// User profile stored in Firestore at `users/{uid}`.
///
/// `userType` is the canonical role field. Older documents may carry a
/// `role` field instead; it is read as a fallback and never written.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Firebase Auth uid (also used as document ID)
    #[serde(default)]
    pub uid: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_type: Option<UserType>,
    #[serde(default, rename = "role", skip_serializing)]
    pub legacy_role: Option<String>,
    /// Document ID supplied by the Firestore client on reads
    #[serde(default, rename = "_firestore_id", skip_serializing)]
    pub document_id: Option<String>,
    #[serde(default)]
    pub profile_completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// When the account document was created (RFC 3339)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// Last merge-write (RFC 3339)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,

    // ─── Onboarding fields (shared) ──────────────────────────────
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image_url: Option<String>,

    // ─── Manager fields ──────────────────────────────────────────
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub talent_interests: Option<Vec<String>>,

    // ─── Youth fields ────────────────────────────────────────────
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skills: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guardian_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub portfolio_url: Option<String>,
}

impl UserProfile {
    /// Initial document written right after sign-up.
    pub fn new_account(uid: &str, email: &str, created_at: String) -> Self {
        Self {
            uid: uid.to_string(),
            email: Some(email.to_string()),
            user_type: None,
            profile_completed: false,
            created_at: Some(created_at),
            ..Default::default()
        }
    }

    /// Fill `uid` from the document key when the stored document lacks it.
    ///
    /// Documents created by a merge-write that did not carry `uid` would
    /// otherwise read back with an empty uid.
    pub fn with_document_id(mut self, id: &str) -> Self {
        if self.uid.is_empty() {
            self.uid = id.to_string();
        }
        self
    }

    /// Role of this user, preferring `userType` over the legacy `role` field.
    pub fn resolved_user_type(&self) -> Option<UserType> {
        self.user_type.or_else(|| {
            self.legacy_role
                .as_deref()
                .and_then(|role| role.parse().ok())
        })
    }
}

/// Partial profile update applied with merge semantics.
///
/// Only fields that are `Some` are written; everything else in the stored
/// document is left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_type: Option<UserType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_completed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub talent_interests: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skills: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guardian_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub portfolio_url: Option<String>,
}

impl ProfilePatch {
    /// The patch as a JSON object holding only the fields being written.
    pub fn to_fields(&self) -> serde_json::Map<String, serde_json::Value> {
        match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(fields)) => fields,
            _ => serde_json::Map::new(),
        }
    }

    /// Document field paths touched by this patch (the update mask).
    pub fn field_names(&self) -> Vec<String> {
        self.to_fields().keys().cloned().collect()
    }
}

/// Validate a Firebase uid used as a Firestore document ID.
pub fn validate_uid(uid: &str) -> Result<(), ValidationError> {
    let invalid = |message: &'static str| {
        let mut err = ValidationError::new("uid");
        err.message = Some(message.into());
        Err(err)
    };

    if uid.is_empty() {
        return invalid("uid must not be empty");
    }
    if uid.len() > MAX_UID_LEN {
        return invalid("uid must be at most 128 characters");
    }
    if uid.trim() != uid {
        return invalid("uid must not have surrounding whitespace");
    }
    if uid.contains('/') || uid == "." || uid == ".." {
        return invalid("uid is not a valid document identifier");
    }
    Ok(())
}
