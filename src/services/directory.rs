// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Community directory listings.

use crate::db::{ProfileQuery, ProfileStore};
use crate::error::AppError;
use crate::models::{ManagerSummary, TalentSummary, UserType};

pub const FEATURED_TALENT_LIMIT: u32 = 8;
pub const MANAGER_LIMIT: u32 = 5;

// Role matching goes through `resolved_user_type`, so documents that only
// carry the legacy `role` field are listed the same way the resolver
// classifies them.

/// Completed youth profiles, abbreviated for the featured-talent strip.
pub async fn featured_talent(store: &dyn ProfileStore) -> Result<Vec<TalentSummary>, AppError> {
    let query = ProfileQuery {
        user_type: UserType::Youth,
        completed_only: true,
        limit: FEATURED_TALENT_LIMIT,
    };

    let profiles = store.list_profiles(&query).await?;

    // The listing invariants hold whatever the backend returned.
    Ok(profiles
        .into_iter()
        .filter(|p| p.resolved_user_type() == Some(UserType::Youth) && p.profile_completed)
        .take(FEATURED_TALENT_LIMIT as usize)
        .map(TalentSummary::from)
        .collect())
}

/// Manager profiles, abbreviated for the manager directory.
pub async fn managers(store: &dyn ProfileStore) -> Result<Vec<ManagerSummary>, AppError> {
    let query = ProfileQuery {
        user_type: UserType::Manager,
        completed_only: false,
        limit: MANAGER_LIMIT,
    };

    let profiles = store.list_profiles(&query).await?;

    Ok(profiles
        .into_iter()
        .filter(|p| p.resolved_user_type() == Some(UserType::Manager))
        .take(MANAGER_LIMIT as usize)
        .map(ManagerSummary::from)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryStore;
    use crate::models::ProfilePatch;
    use serde_json::{json, Value};

    fn insert_raw(store: &MemoryStore, uid: &str, document: Value) {
        if let Value::Object(document) = document {
            store.insert_document(uid, document);
        }
    }

    #[tokio::test]
    async fn test_legacy_role_documents_are_listed() {
        let store = MemoryStore::new();
        insert_raw(
            &store,
            "legacy-youth",
            json!({ "role": "youth", "profileCompleted": true, "fullName": "Old Timer" }),
        );
        insert_raw(&store, "legacy-manager", json!({ "role": "manager" }));

        let talent = featured_talent(&store).await.unwrap();
        assert_eq!(talent.len(), 1);
        assert_eq!(talent[0].uid, "legacy-youth");

        let managers = managers(&store).await.unwrap();
        assert_eq!(managers.len(), 1);
        assert_eq!(managers[0].uid, "legacy-manager");
    }

    #[tokio::test]
    async fn test_user_type_wins_over_legacy_role() {
        let store = MemoryStore::new();
        insert_raw(
            &store,
            "switched",
            json!({ "userType": "manager", "role": "youth", "profileCompleted": true }),
        );

        assert!(featured_talent(&store).await.unwrap().is_empty());
        assert_eq!(managers(&store).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_incomplete_youth_not_featured() {
        let store = MemoryStore::new();
        store
            .merge_profile(
                "y1",
                &ProfilePatch {
                    user_type: Some(UserType::Youth),
                    profile_completed: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(featured_talent(&store).await.unwrap().is_empty());
    }
}
