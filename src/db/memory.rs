// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process profile store for local development and tests.
//!
//! Documents are kept as JSON objects so merge-writes behave like Firestore
//! update masks: only the patched keys change.

use crate::db::{ProfileQuery, ProfileStore};
use crate::error::AppError;
use crate::models::{ProfilePatch, UserProfile};
use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::{Map, Value};
use std::sync::Arc;

type Document = Map<String, Value>;

/// Profile store backed by a concurrent map.
#[derive(Clone, Default)]
pub struct MemoryStore {
    documents: Arc<DashMap<String, Document>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw stored document, for inspecting exactly what was written.
    pub fn raw_document(&self, uid: &str) -> Option<Document> {
        self.documents.get(uid).map(|doc| doc.value().clone())
    }

    /// Store a document exactly as given, bypassing the profile types.
    ///
    /// Used to seed documents written by older clients, such as ones that
    /// only carry the legacy `role` field.
    pub fn insert_document(&self, uid: &str, document: Document) {
        self.documents.insert(uid.to_string(), document);
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

fn decode(uid: &str, document: &Document) -> Result<UserProfile, AppError> {
    serde_json::from_value::<UserProfile>(Value::Object(document.clone()))
        .map(|profile| profile.with_document_id(uid))
        .map_err(|e| AppError::Database(format!("Malformed profile document: {}", e)))
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn get_profile(&self, uid: &str) -> Result<Option<UserProfile>, AppError> {
        self.documents
            .get(uid)
            .map(|doc| decode(uid, doc.value()))
            .transpose()
    }

    async fn create_profile(&self, profile: &UserProfile) -> Result<(), AppError> {
        let document = match serde_json::to_value(profile) {
            Ok(Value::Object(document)) => document,
            Ok(_) => {
                return Err(AppError::Database(
                    "Profile did not serialize to an object".to_string(),
                ))
            }
            Err(e) => return Err(AppError::Database(e.to_string())),
        };

        self.documents.insert(profile.uid.clone(), document);
        Ok(())
    }

    async fn merge_profile(&self, uid: &str, patch: &ProfilePatch) -> Result<(), AppError> {
        let fields = patch.to_fields();
        if fields.is_empty() {
            return Ok(());
        }

        // The entry guard holds the shard lock, so each merge is atomic
        // with respect to concurrent writers of the same document.
        let mut document = self.documents.entry(uid.to_string()).or_default();
        document.extend(fields);
        Ok(())
    }

    async fn list_profiles(&self, query: &ProfileQuery) -> Result<Vec<UserProfile>, AppError> {
        let mut matches: Vec<UserProfile> = self
            .documents
            .iter()
            .filter_map(|entry| match decode(entry.key(), entry.value()) {
                Ok(profile) => Some(profile),
                Err(e) => {
                    tracing::warn!(uid = %entry.key(), error = %e, "Skipping malformed profile");
                    None
                }
            })
            .filter(|profile| profile.resolved_user_type() == Some(query.user_type))
            .filter(|profile| !query.completed_only || profile.profile_completed)
            .collect();

        matches.sort_by(|a, b| a.uid.cmp(&b.uid));
        matches.truncate(query.limit as usize);
        Ok(matches)
    }
}
