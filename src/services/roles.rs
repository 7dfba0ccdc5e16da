// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Role resolution for a verified user.
//!
//! A missing profile and a failed lookup both mean "no role yet": callers
//! send the user to role selection instead of surfacing an error.

use crate::db::ProfileStore;
use crate::models::{UserProfile, UserType};

/// Fetch the profile for `uid`, treating store failures as missing.
pub async fn resolve_profile(store: &dyn ProfileStore, uid: &str) -> Option<UserProfile> {
    match store.get_profile(uid).await {
        Ok(profile) => profile,
        Err(e) => {
            tracing::warn!(uid, error = %e, "Profile lookup failed, treating as no role");
            None
        }
    }
}

/// The user's role, or `None` if they have not chosen one.
pub async fn resolve_user_type(store: &dyn ProfileStore, uid: &str) -> Option<UserType> {
    resolve_profile(store, uid)
        .await
        .and_then(|profile| profile.resolved_user_type())
}
