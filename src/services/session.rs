// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session token verification seam.

use async_trait::async_trait;

/// Identity extracted from a verified session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedSession {
    pub uid: String,
    pub email: Option<String>,
}

/// Session verification error categories.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SessionError {
    /// The token is malformed, expired, or its claims do not match.
    #[error("invalid session: {0}")]
    Invalid(String),
    /// Verification could not run (e.g. signing keys unreachable).
    #[error("session verification unavailable: {0}")]
    Transient(String),
}

/// Verifies session tokens against the identity provider.
///
/// One implementation is chosen at startup from configuration.
#[async_trait]
pub trait SessionVerifier: Send + Sync {
    async fn verify_session(&self, token: &str) -> Result<VerifiedSession, SessionError>;
}
