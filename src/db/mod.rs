// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Profile store: the trait handlers depend on, plus its backends.

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::MemoryStore;

use crate::error::AppError;
use crate::models::{ProfilePatch, UserProfile, UserType};
use async_trait::async_trait;

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
}

/// Filter for directory listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfileQuery {
    pub user_type: UserType,
    /// Only include profiles with `profileCompleted = true`
    pub completed_only: bool,
    pub limit: u32,
}

/// Document store holding one profile per uid.
///
/// Every write is a single-document write; no multi-document transactions.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Fetch a profile. A missing document is `Ok(None)`, not an error.
    async fn get_profile(&self, uid: &str) -> Result<Option<UserProfile>, AppError>;

    /// Write a complete profile document, replacing any existing one.
    async fn create_profile(&self, profile: &UserProfile) -> Result<(), AppError>;

    /// Merge the fields present in `patch` into `users/{uid}`.
    ///
    /// Creates the document if it does not exist.
    async fn merge_profile(&self, uid: &str, patch: &ProfilePatch) -> Result<(), AppError>;

    /// List profiles matching `query`, ordered by uid, at most `query.limit`.
    async fn list_profiles(&self, query: &ProfileQuery) -> Result<Vec<UserProfile>, AppError>;
}
