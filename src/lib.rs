// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Talent Onboarding: account, role and onboarding backend for a
//! talent/manager matchmaking platform.
//!
//! Identity comes from Firebase Auth session cookies and profiles live in
//! the Firestore `users` collection.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::{AuthMode, Config, StoreBackend};
use db::{FirestoreDb, MemoryStore, ProfileStore};
use services::{DevSessionVerifier, FirebaseSessionVerifier, SessionVerifier, TokenKind};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn ProfileStore>,
    pub verifier: Arc<dyn SessionVerifier>,
}

impl AppState {
    /// Build the store and session verifier selected by `config`.
    ///
    /// Runs once at startup; handlers only ever see the finished state.
    pub async fn initialize(config: Config) -> anyhow::Result<Self> {
        let store: Arc<dyn ProfileStore> = match config.store_backend {
            StoreBackend::Firestore => Arc::new(FirestoreDb::new(&config).await?),
            StoreBackend::Memory => {
                tracing::warn!("Using in-memory profile store; data is lost on restart");
                Arc::new(MemoryStore::new())
            }
        };

        let verifier: Arc<dyn SessionVerifier> = match config.auth_mode {
            AuthMode::Firebase => Arc::new(FirebaseSessionVerifier::new(
                &config.firebase_project_id,
                TokenKind::SessionCookie,
            )?),
            AuthMode::Development => {
                tracing::warn!("Development auth mode: sessions are self-signed");
                Arc::new(DevSessionVerifier::new(config.dev_session_key.clone()))
            }
        };

        tracing::info!(
            auth_mode = %config.auth_mode,
            store_backend = %config.store_backend,
            "Application state initialized"
        );

        Ok(Self::with_dependencies(config, store, verifier))
    }

    /// Assemble state from already-built dependencies.
    pub fn with_dependencies(
        config: Config,
        store: Arc<dyn ProfileStore>,
        verifier: Arc<dyn SessionVerifier>,
    ) -> Self {
        Self {
            config,
            store,
            verifier,
        }
    }
}
