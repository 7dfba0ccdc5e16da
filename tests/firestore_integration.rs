// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore integration tests.
//!
//! These tests require the Firestore emulator to be running and
//! FIRESTORE_EMULATOR_HOST to point at it. They are skipped otherwise.

use talent_onboarding::db::{ProfileQuery, ProfileStore};
use talent_onboarding::models::{ProfilePatch, UserProfile, UserType};

mod common;
use common::test_db;

/// Generate a unique uid for test isolation.
fn unique_uid(prefix: &str) -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("{prefix}-{nanos}")
}

// ═══════════════════════════════════════════════════════════════════════════
// PROFILE TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_create_and_get_profile() {
    require_emulator!();

    let db = test_db().await;
    let uid = unique_uid("create");

    assert!(db.get_profile(&uid).await.unwrap().is_none());

    let profile = UserProfile::new_account(&uid, "a@b.com", "2026-01-01T00:00:00Z".to_string());
    db.create_profile(&profile).await.unwrap();

    let stored = db.get_profile(&uid).await.unwrap().unwrap();
    assert_eq!(stored.uid, uid);
    assert_eq!(stored.email.as_deref(), Some("a@b.com"));
    assert_eq!(stored.user_type, None);
    assert!(!stored.profile_completed);
}

#[tokio::test]
async fn test_merge_keeps_untouched_fields() {
    require_emulator!();

    let db = test_db().await;
    let uid = unique_uid("merge");

    let profile = UserProfile::new_account(&uid, "a@b.com", "2026-01-01T00:00:00Z".to_string());
    db.create_profile(&profile).await.unwrap();

    db.merge_profile(
        &uid,
        &ProfilePatch {
            user_type: Some(UserType::Manager),
            company_name: Some("Acme".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    db.merge_profile(
        &uid,
        &ProfilePatch {
            company_name: Some("Globex".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let stored = db.get_profile(&uid).await.unwrap().unwrap();
    assert_eq!(stored.email.as_deref(), Some("a@b.com"));
    assert_eq!(stored.created_at.as_deref(), Some("2026-01-01T00:00:00Z"));
    assert_eq!(stored.user_type, Some(UserType::Manager));
    assert_eq!(stored.company_name.as_deref(), Some("Globex"));
}

#[tokio::test]
async fn test_merge_creates_missing_document() {
    require_emulator!();

    let db = test_db().await;
    let uid = unique_uid("implicit");

    db.merge_profile(
        &uid,
        &ProfilePatch {
            uid: Some(uid.clone()),
            user_type: Some(UserType::Youth),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let stored = db.get_profile(&uid).await.unwrap().unwrap();
    assert_eq!(stored.resolved_user_type(), Some(UserType::Youth));
}

#[tokio::test]
async fn test_uid_read_from_document_id() {
    require_emulator!();

    let db = test_db().await;
    let uid = unique_uid("no-uid-field");

    db.merge_profile(
        &uid,
        &ProfilePatch {
            user_type: Some(UserType::Manager),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let stored = db.get_profile(&uid).await.unwrap().unwrap();
    assert_eq!(stored.uid, uid);
}

#[tokio::test]
async fn test_list_profiles_filters() {
    require_emulator!();

    let db = test_db().await;
    let done = unique_uid("list-done");
    let pending = unique_uid("list-pending");

    for (uid, completed) in [(&done, true), (&pending, false)] {
        db.merge_profile(
            uid,
            &ProfilePatch {
                uid: Some(uid.to_string()),
                user_type: Some(UserType::Youth),
                profile_completed: Some(completed),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    }

    let listed = db
        .list_profiles(&ProfileQuery {
            user_type: UserType::Youth,
            completed_only: true,
            limit: 1000,
        })
        .await
        .unwrap();

    assert!(listed.iter().all(|p| p.profile_completed));
    assert!(listed.iter().any(|p| p.uid == done));
    assert!(!listed.iter().any(|p| p.uid == pending));
}
