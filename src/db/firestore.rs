// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed profile operations.

use crate::config::Config;
use crate::db::{collections, ProfileQuery, ProfileStore};
use crate::error::AppError;
use crate::models::{ProfilePatch, UserProfile};
use async_trait::async_trait;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// Uses the configured service account when both the client email and
    /// private key are present, and Application Default Credentials
    /// otherwise. For local development with the emulator, set
    /// FIRESTORE_EMULATOR_HOST.
    pub async fn new(config: &Config) -> Result<Self, AppError> {
        let project_id = config.firebase_project_id.as_str();

        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = match config.service_account_json() {
            Some(credentials) => {
                let options = firestore::FirestoreDbOptions::new(project_id.to_string());
                firestore::FirestoreDb::with_options_token_source(
                    options,
                    gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
                    gcloud_sdk::TokenSourceType::Json(credentials),
                )
                .await
            }
            None => {
                tracing::warn!(
                    project = project_id,
                    "Service account credentials incomplete, using Application Default Credentials"
                );
                firestore::FirestoreDb::new(project_id).await
            }
        }
        .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }
}

#[async_trait]
impl ProfileStore for FirestoreDb {
    async fn get_profile(&self, uid: &str) -> Result<Option<UserProfile>, AppError> {
        let profile: Option<UserProfile> = self
            .get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(uid)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(profile.map(|p| p.with_document_id(uid)))
    }

    async fn create_profile(&self, profile: &UserProfile) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(&profile.uid)
            .object(profile)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    async fn merge_profile(&self, uid: &str, patch: &ProfilePatch) -> Result<(), AppError> {
        let fields = patch.field_names();
        if fields.is_empty() {
            return Ok(());
        }

        // The update mask restricts the write to the patched fields, which
        // gives merge semantics; the document is created if missing.
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .fields(fields)
            .in_col(collections::USERS)
            .document_id(uid)
            .object(patch)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    async fn list_profiles(&self, query: &ProfileQuery) -> Result<Vec<UserProfile>, AppError> {
        let user_type = query.user_type.as_str();
        let completed_only = query.completed_only;

        // Legacy documents carry only `role`. Callers re-check the resolved
        // role, since a document may match on `role` while its `userType`
        // says otherwise.
        let profiles: Vec<UserProfile> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::USERS)
            .filter(move |q| {
                let role_matches = q.for_any([
                    q.field("userType").eq(user_type),
                    q.field("role").eq(user_type),
                ]);
                if completed_only {
                    q.for_all([role_matches, q.field("profileCompleted").eq(true)])
                } else {
                    q.for_all([role_matches])
                }
            })
            .limit(query.limit)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(profiles
            .into_iter()
            .map(|p| match p.document_id.clone() {
                Some(id) => p.with_document_id(&id),
                None => p,
            })
            .collect())
    }
}
