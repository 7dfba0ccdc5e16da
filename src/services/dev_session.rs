// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Development session tokens (HS256, signed with a local key).
//!
//! Selected at startup with `AUTH_MODE=development` in place of Firebase.

use crate::services::session::{SessionError, SessionVerifier, VerifiedSession};
use async_trait::async_trait;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

/// Lifetime of a development session, matching the Firebase session cookie
/// lifetime used by the frontend.
pub const DEV_SESSION_TTL_SECS: u64 = 5 * 24 * 60 * 60;

/// JWT claims structure.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (Firebase uid)
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
}

/// Verifier for locally signed development sessions.
pub struct DevSessionVerifier {
    signing_key: Vec<u8>,
}

impl DevSessionVerifier {
    pub fn new(signing_key: Vec<u8>) -> Self {
        Self { signing_key }
    }
}

#[async_trait]
impl SessionVerifier for DevSessionVerifier {
    async fn verify_session(&self, token: &str) -> Result<VerifiedSession, SessionError> {
        let key = DecodingKey::from_secret(&self.signing_key);
        let validation = Validation::new(Algorithm::HS256);

        let token_data = decode::<Claims>(token, &key, &validation)
            .map_err(|e| SessionError::Invalid(format!("JWT validation failed: {e}")))?;

        if token_data.claims.sub.is_empty() {
            return Err(SessionError::Invalid("empty sub claim".to_string()));
        }

        Ok(VerifiedSession {
            uid: token_data.claims.sub,
            email: token_data.claims.email,
        })
    }
}

/// Create a development session token.
pub fn create_dev_session_token(
    uid: &str,
    email: Option<&str>,
    signing_key: &[u8],
) -> anyhow::Result<String> {
    use jsonwebtoken::{encode, EncodingKey, Header};
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();

    let claims = Claims {
        sub: uid.to_string(),
        email: email.map(str::to_string),
        iat: now as usize,
        exp: (now + DEV_SESSION_TTL_SECS) as usize,
    };

    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &[u8] = b"test_signing_key_32_bytes_long!!";

    #[tokio::test]
    async fn test_token_roundtrip() {
        let token = create_dev_session_token("u1", Some("a@b.com"), KEY).unwrap();
        let session = DevSessionVerifier::new(KEY.to_vec())
            .verify_session(&token)
            .await
            .unwrap();

        assert_eq!(session.uid, "u1");
        assert_eq!(session.email.as_deref(), Some("a@b.com"));
    }

    #[tokio::test]
    async fn test_wrong_key_rejected() {
        let token = create_dev_session_token("u1", None, KEY).unwrap();
        let result = DevSessionVerifier::new(b"another_key".to_vec())
            .verify_session(&token)
            .await;

        assert!(matches!(result, Err(SessionError::Invalid(_))));
    }

    #[tokio::test]
    async fn test_garbage_rejected() {
        let result = DevSessionVerifier::new(KEY.to_vec())
            .verify_session("not.a.jwt")
            .await;
        assert!(matches!(result, Err(SessionError::Invalid(_))));
    }
}
