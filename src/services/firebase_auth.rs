// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firebase session cookie and ID token verification.
//!
//! Tokens are RS256 JWTs signed by Google. The signing certificates are
//! fetched from Google and cached for the `max-age` they are served with;
//! verified sessions themselves are never cached.

use crate::services::session::{SessionError, SessionVerifier, VerifiedSession};
use anyhow::Context;
use async_trait::async_trait;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use reqwest::header::CACHE_CONTROL;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tokio::sync::{Mutex, RwLock};

const SESSION_COOKIE_CERTS_URL: &str =
    "https://www.googleapis.com/identitytoolkit/v3/relyingparty/publicKeys";
const ID_TOKEN_CERTS_URL: &str =
    "https://www.googleapis.com/robot/v1/metadata/x509/securetoken@system.gserviceaccount.com";
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);
/// Minimum spacing between refreshes triggered by an unknown `kid`.
const MIN_FORCED_REFRESH_INTERVAL: Duration = Duration::from_secs(60);
const CLOCK_SKEW_SECS: u64 = 60;
const MAX_UID_LEN: usize = 128;

/// Which kind of Firebase token is being verified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Session cookies minted by the Admin SDK (`createSessionCookie`).
    SessionCookie,
    /// Client ID tokens from the Firebase Auth SDK.
    IdToken,
}

impl TokenKind {
    fn certs_url(&self) -> &'static str {
        match self {
            TokenKind::SessionCookie => SESSION_COOKIE_CERTS_URL,
            TokenKind::IdToken => ID_TOKEN_CERTS_URL,
        }
    }

    fn issuer(&self, project_id: &str) -> String {
        match self {
            TokenKind::SessionCookie => format!("https://session.firebase.google.com/{project_id}"),
            TokenKind::IdToken => format!("https://securetoken.google.com/{project_id}"),
        }
    }
}

#[derive(Clone)]
enum VerifierMode {
    Google,
    StaticKey {
        kid: String,
        decoding_key: Arc<DecodingKey>,
    },
}

type KeyMap = Arc<HashMap<String, Arc<DecodingKey>>>;

#[derive(Clone)]
struct KeyCacheEntry {
    keys_by_kid: KeyMap,
    fetched_at: Instant,
    expires_at: Instant,
}

/// Verifier for Firebase-issued session tokens.
pub struct FirebaseSessionVerifier {
    http_client: reqwest::Client,
    kind: TokenKind,
    certs_url: String,
    project_id: String,
    expected_issuer: String,
    mode: VerifierMode,
    key_cache: RwLock<Option<KeyCacheEntry>>,
    refresh_lock: Mutex<()>,
    min_forced_refresh: Duration,
}

impl FirebaseSessionVerifier {
    /// Create a production verifier that fetches and caches Google's certificates.
    pub fn new(project_id: &str, kind: TokenKind) -> anyhow::Result<Self> {
        let verifier = Self::build(project_id, kind, VerifierMode::Google)?;

        tracing::info!(
            project = %verifier.project_id,
            issuer = %verifier.expected_issuer,
            kind = ?kind,
            "Initialized Firebase session verifier"
        );

        Ok(verifier)
    }

    /// Create a verifier that fetches certificates from `certs_url` instead
    /// of Google's endpoint for `kind`.
    ///
    /// Used to run the fetch and cache path against a local server.
    pub fn new_with_certs_url(
        project_id: &str,
        kind: TokenKind,
        certs_url: impl Into<String>,
    ) -> anyhow::Result<Self> {
        let mut verifier = Self::build(project_id, kind, VerifierMode::Google)?;
        verifier.certs_url = certs_url.into();
        Ok(verifier)
    }

    /// Create a verifier with a static RSA public key.
    ///
    /// This is intended for deterministic local/integration tests.
    pub fn new_with_static_key(
        project_id: &str,
        kind: TokenKind,
        kid: impl Into<String>,
        decoding_key: DecodingKey,
    ) -> anyhow::Result<Self> {
        let kid = kid.into();
        if kid.trim().is_empty() {
            anyhow::bail!("static key kid must not be empty");
        }

        Self::build(
            project_id,
            kind,
            VerifierMode::StaticKey {
                kid,
                decoding_key: Arc::new(decoding_key),
            },
        )
    }

    fn build(project_id: &str, kind: TokenKind, mode: VerifierMode) -> anyhow::Result<Self> {
        if project_id.trim().is_empty() {
            anyhow::bail!("Firebase project id must not be empty");
        }

        let http_client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .context("failed building certificate HTTP client")?;

        Ok(Self {
            http_client,
            kind,
            certs_url: kind.certs_url().to_string(),
            project_id: project_id.to_string(),
            expected_issuer: kind.issuer(project_id),
            mode,
            key_cache: RwLock::new(None),
            refresh_lock: Mutex::new(()),
            min_forced_refresh: MIN_FORCED_REFRESH_INTERVAL,
        })
    }

    async fn decoding_key_for_kid(&self, kid: &str) -> Result<Arc<DecodingKey>, SessionError> {
        match &self.mode {
            VerifierMode::StaticKey {
                kid: static_kid,
                decoding_key,
            } => {
                if kid == static_kid {
                    return Ok(decoding_key.clone());
                }

                return Err(SessionError::Invalid(format!(
                    "unknown JWT kid for static verifier: {kid}"
                )));
            }
            VerifierMode::Google => {}
        }

        if let Some(key) = self.lookup_cached_key(kid).await {
            return Ok(key);
        }

        // Keys rotate; a kid we have not seen may be newer than our cache.
        // Forced refreshes are throttled so unknown kids cannot drive one
        // certificate fetch per request.
        for force_refresh in [false, true] {
            let keys = self.refresh_keys(force_refresh).await?;
            if let Some(key) = keys.get(kid) {
                return Ok(key.clone());
            }
        }

        Err(SessionError::Invalid(format!(
            "JWT kid not found in signing certificates after refresh: {kid}"
        )))
    }

    async fn lookup_cached_key(&self, kid: &str) -> Option<Arc<DecodingKey>> {
        let cache = self.key_cache.read().await;
        let now = Instant::now();
        cache
            .as_ref()
            .filter(|entry| entry.expires_at > now)
            .and_then(|entry| entry.keys_by_kid.get(kid))
            .cloned()
    }

    /// Return the current key set, fetching it first when the cache has
    /// expired, or when forced and the last fetch is older than
    /// `min_forced_refresh`.
    async fn refresh_keys(&self, force_refresh: bool) -> Result<KeyMap, SessionError> {
        let _guard = self.refresh_lock.lock().await;

        if let Some(entry) = self.key_cache.read().await.as_ref() {
            let now = Instant::now();
            if force_refresh {
                if now.duration_since(entry.fetched_at) < self.min_forced_refresh {
                    tracing::debug!("Skipping forced certificate refresh, last fetch too recent");
                    return Ok(entry.keys_by_kid.clone());
                }
            } else if entry.expires_at > now {
                return Ok(entry.keys_by_kid.clone());
            }
        }

        let certs_url = self.certs_url.as_str();
        tracing::debug!(certs_url, "Refreshing Firebase signing certificates");

        let response = self
            .http_client
            .get(certs_url)
            .send()
            .await
            .map_err(|e| SessionError::Transient(format!("certificate request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(SessionError::Transient(format!(
                "certificate request returned status {}",
                response.status()
            )));
        }

        let ttl = cache_ttl_from_headers(response.headers(), DEFAULT_CACHE_TTL);

        let certificates: HashMap<String, String> = response
            .json()
            .await
            .map_err(|e| SessionError::Transient(format!("invalid certificate JSON: {e}")))?;

        let keys_by_kid = keys_from_certificates(certificates);
        if keys_by_kid.is_empty() {
            return Err(SessionError::Transient(
                "certificate response did not include any usable RSA keys".to_string(),
            ));
        }

        let keys_by_kid = Arc::new(keys_by_kid);
        let fetched_at = Instant::now();
        *self.key_cache.write().await = Some(KeyCacheEntry {
            keys_by_kid: keys_by_kid.clone(),
            fetched_at,
            expires_at: fetched_at + ttl,
        });

        tracing::debug!(ttl_secs = ttl.as_secs(), "Firebase certificate cache refreshed");
        Ok(keys_by_kid)
    }
}

#[async_trait]
impl SessionVerifier for FirebaseSessionVerifier {
    async fn verify_session(&self, token: &str) -> Result<VerifiedSession, SessionError> {
        if token.is_empty() {
            return Err(SessionError::Invalid("session token is empty".to_string()));
        }

        let header = decode_header(token)
            .map_err(|e| SessionError::Invalid(format!("invalid JWT header: {e}")))?;

        if header.alg != Algorithm::RS256 {
            return Err(SessionError::Invalid(format!(
                "unexpected JWT alg: {:?}",
                header.alg
            )));
        }

        let kid = header
            .kid
            .ok_or_else(|| SessionError::Invalid("missing JWT kid".to_string()))?;

        let decoding_key = self.decoding_key_for_kid(&kid).await?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
        validation.set_issuer(&[self.expected_issuer.as_str()]);
        validation.set_audience(&[self.project_id.as_str()]);
        validation.leeway = CLOCK_SKEW_SECS;

        let claims = decode::<FirebaseClaims>(token, decoding_key.as_ref(), &validation)
            .map_err(|e| SessionError::Invalid(format!("JWT validation failed: {e}")))?
            .claims;

        validate_not_in_future("iat", claims.iat)?;
        validate_not_in_future("auth_time", claims.auth_time)?;

        if claims.sub.is_empty() || claims.sub.len() > MAX_UID_LEN {
            return Err(SessionError::Invalid(
                "sub claim is not a valid uid".to_string(),
            ));
        }

        tracing::debug!(uid = %claims.sub, "Firebase session verified");

        Ok(VerifiedSession {
            uid: claims.sub,
            email: claims.email,
        })
    }
}

#[derive(Debug, Deserialize)]
struct FirebaseClaims {
    sub: String,
    iat: Option<usize>,
    auth_time: Option<usize>,
    email: Option<String>,
}

/// Parse a `{kid: PEM certificate}` map into decoding keys, skipping bad entries.
fn keys_from_certificates(
    certificates: HashMap<String, String>,
) -> HashMap<String, Arc<DecodingKey>> {
    let mut keys_by_kid = HashMap::new();

    for (kid, pem) in certificates {
        if kid.trim().is_empty() {
            continue;
        }

        match DecodingKey::from_rsa_pem(pem.as_bytes()) {
            Ok(key) => {
                keys_by_kid.insert(kid, Arc::new(key));
            }
            Err(e) => {
                tracing::warn!(error = %e, kid = %kid, "Skipping invalid signing certificate");
            }
        }
    }

    keys_by_kid
}

fn validate_not_in_future(claim: &str, value: Option<usize>) -> Result<(), SessionError> {
    let Some(value) = value else {
        return Err(SessionError::Invalid(format!("missing {claim} claim")));
    };

    if value as u64 > now_unix_secs() + CLOCK_SKEW_SECS {
        return Err(SessionError::Invalid(format!(
            "{claim} claim is in the future"
        )));
    }

    Ok(())
}

fn cache_ttl_from_headers(headers: &reqwest::header::HeaderMap, fallback: Duration) -> Duration {
    let Some(max_age) = headers
        .get(CACHE_CONTROL)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_cache_control_max_age)
    else {
        return fallback;
    };

    Duration::from_secs(max_age)
}

fn parse_cache_control_max_age(value: &str) -> Option<u64> {
    for directive in value.split(',') {
        let directive = directive.trim();

        if let Some(raw) = directive.strip_prefix("max-age=") {
            let raw = raw.trim_matches('"');
            if let Ok(seconds) = raw.parse::<u64>() {
                return Some(seconds);
            }
        }
    }

    None
}

fn now_unix_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::header, http::StatusCode, routing::get, Json, Router};
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const PROJECT: &str = "talent-test";
    const KID: &str = "test-kid";
    const PRIVATE_KEY: &[u8] = include_bytes!("../../tests/fixtures/signing_key.pem");
    const PUBLIC_KEY: &[u8] = include_bytes!("../../tests/fixtures/signing_key.pub.pem");
    const CERTIFICATE: &str = include_str!("../../tests/fixtures/signing_cert.pem");

    fn verifier(kind: TokenKind) -> FirebaseSessionVerifier {
        FirebaseSessionVerifier::new_with_static_key(
            PROJECT,
            kind,
            KID,
            DecodingKey::from_rsa_pem(PUBLIC_KEY).unwrap(),
        )
        .unwrap()
    }

    fn sign(claims: serde_json::Value, kid: &str) -> String {
        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some(kid.to_string());
        encode(&header, &claims, &EncodingKey::from_rsa_pem(PRIVATE_KEY).unwrap()).unwrap()
    }

    fn session_claims() -> serde_json::Value {
        let now = now_unix_secs();
        json!({
            "iss": format!("https://session.firebase.google.com/{PROJECT}"),
            "aud": PROJECT,
            "sub": "u1",
            "email": "a@b.com",
            "iat": now,
            "auth_time": now,
            "exp": now + 3600,
        })
    }

    #[tokio::test]
    async fn verifies_valid_session_cookie() {
        let token = sign(session_claims(), KID);
        let session = verifier(TokenKind::SessionCookie)
            .verify_session(&token)
            .await
            .unwrap();

        assert_eq!(session.uid, "u1");
        assert_eq!(session.email.as_deref(), Some("a@b.com"));
    }

    #[tokio::test]
    async fn rejects_wrong_audience() {
        let mut claims = session_claims();
        claims["aud"] = json!("other-project");

        let result = verifier(TokenKind::SessionCookie)
            .verify_session(&sign(claims, KID))
            .await;
        assert!(matches!(result, Err(SessionError::Invalid(_))));
    }

    #[tokio::test]
    async fn rejects_id_token_where_session_cookie_expected() {
        let mut claims = session_claims();
        claims["iss"] = json!(format!("https://securetoken.google.com/{PROJECT}"));
        let token = sign(claims, KID);

        let result = verifier(TokenKind::SessionCookie).verify_session(&token).await;
        assert!(matches!(result, Err(SessionError::Invalid(_))));

        let session = verifier(TokenKind::IdToken).verify_session(&token).await.unwrap();
        assert_eq!(session.uid, "u1");
    }

    #[tokio::test]
    async fn rejects_expired_token() {
        let mut claims = session_claims();
        claims["exp"] = json!(now_unix_secs() - 3600);

        let result = verifier(TokenKind::SessionCookie)
            .verify_session(&sign(claims, KID))
            .await;
        assert!(matches!(result, Err(SessionError::Invalid(_))));
    }

    #[tokio::test]
    async fn rejects_unknown_kid_and_hs256() {
        let v = verifier(TokenKind::SessionCookie);

        let result = v.verify_session(&sign(session_claims(), "other-kid")).await;
        assert!(matches!(result, Err(SessionError::Invalid(_))));

        let hs256 = encode(
            &Header::new(Algorithm::HS256),
            &session_claims(),
            &EncodingKey::from_secret(b"secret"),
        )
        .unwrap();
        let result = v.verify_session(&hs256).await;
        assert!(matches!(result, Err(SessionError::Invalid(_))));

        let result = v.verify_session("").await;
        assert!(matches!(result, Err(SessionError::Invalid(_))));
    }

    #[tokio::test]
    async fn rejects_future_auth_time_and_empty_sub() {
        let v = verifier(TokenKind::SessionCookie);

        let mut claims = session_claims();
        claims["auth_time"] = json!(now_unix_secs() + 3600);
        let result = v.verify_session(&sign(claims, KID)).await;
        assert!(matches!(result, Err(SessionError::Invalid(_))));

        let mut claims = session_claims();
        claims["sub"] = json!("");
        let result = v.verify_session(&sign(claims, KID)).await;
        assert!(matches!(result, Err(SessionError::Invalid(_))));
    }

    struct CertServer {
        url: String,
        hits: Arc<AtomicUsize>,
        certs: Arc<std::sync::Mutex<HashMap<String, String>>>,
    }

    impl CertServer {
        fn hits(&self) -> usize {
            self.hits.load(Ordering::SeqCst)
        }

        fn serve_kids(&self, kids: &[&str]) {
            *self.certs.lock().unwrap() = kids
                .iter()
                .map(|kid| (kid.to_string(), CERTIFICATE.to_string()))
                .collect();
        }
    }

    /// Serve `{kid: certificate}` on a local port, counting requests.
    async fn spawn_cert_server(cache_control: &'static str, status: StatusCode) -> CertServer {
        let hits = Arc::new(AtomicUsize::new(0));
        let certs = Arc::new(std::sync::Mutex::new(HashMap::from([(
            KID.to_string(),
            CERTIFICATE.to_string(),
        )])));

        let app = Router::new().route(
            "/certs",
            get({
                let hits = hits.clone();
                let certs = certs.clone();
                move || async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    let body = certs.lock().unwrap().clone();
                    (status, [(header::CACHE_CONTROL, cache_control)], Json(body))
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        CertServer {
            url: format!("http://{addr}/certs"),
            hits,
            certs,
        }
    }

    fn remote_verifier(url: &str) -> FirebaseSessionVerifier {
        FirebaseSessionVerifier::new_with_certs_url(PROJECT, TokenKind::SessionCookie, url)
            .unwrap()
    }

    #[tokio::test]
    async fn fetched_certificates_are_cached() {
        let server = spawn_cert_server("public, max-age=3600", StatusCode::OK).await;
        let v = remote_verifier(&server.url);

        for _ in 0..3 {
            let session = v.verify_session(&sign(session_claims(), KID)).await.unwrap();
            assert_eq!(session.uid, "u1");
        }
        assert_eq!(server.hits(), 1);
    }

    #[tokio::test]
    async fn expired_certificates_are_refetched() {
        let server = spawn_cert_server("max-age=0", StatusCode::OK).await;
        let v = remote_verifier(&server.url);

        v.verify_session(&sign(session_claims(), KID)).await.unwrap();
        v.verify_session(&sign(session_claims(), KID)).await.unwrap();
        assert_eq!(server.hits(), 2);
    }

    #[tokio::test]
    async fn unknown_kid_refresh_is_throttled() {
        let server = spawn_cert_server("max-age=3600", StatusCode::OK).await;
        let v = remote_verifier(&server.url);

        v.verify_session(&sign(session_claims(), KID)).await.unwrap();

        for _ in 0..5 {
            let result = v.verify_session(&sign(session_claims(), "unknown-kid")).await;
            assert!(matches!(result, Err(SessionError::Invalid(_))));
        }
        assert_eq!(server.hits(), 1);
    }

    #[tokio::test]
    async fn rotated_kid_found_after_forced_refresh() {
        let server = spawn_cert_server("max-age=3600", StatusCode::OK).await;
        let mut v = remote_verifier(&server.url);

        v.verify_session(&sign(session_claims(), KID)).await.unwrap();
        server.serve_kids(&["rotated-kid"]);

        // Still inside the throttle window.
        let result = v.verify_session(&sign(session_claims(), "rotated-kid")).await;
        assert!(matches!(result, Err(SessionError::Invalid(_))));
        assert_eq!(server.hits(), 1);

        v.min_forced_refresh = Duration::ZERO;
        let session = v
            .verify_session(&sign(session_claims(), "rotated-kid"))
            .await
            .unwrap();
        assert_eq!(session.uid, "u1");
        assert_eq!(server.hits(), 2);
    }

    #[tokio::test]
    async fn certificate_fetch_failures_are_transient() {
        let server = spawn_cert_server("max-age=3600", StatusCode::INTERNAL_SERVER_ERROR).await;
        let result = remote_verifier(&server.url)
            .verify_session(&sign(session_claims(), KID))
            .await;
        assert!(matches!(result, Err(SessionError::Transient(_))));

        let server = spawn_cert_server("max-age=3600", StatusCode::OK).await;
        server.serve_kids(&[]);
        let result = remote_verifier(&server.url)
            .verify_session(&sign(session_claims(), KID))
            .await;
        assert!(matches!(result, Err(SessionError::Transient(_))));

        let closed = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/certs", closed.local_addr().unwrap());
        drop(closed);
        let result = remote_verifier(&url)
            .verify_session(&sign(session_claims(), KID))
            .await;
        assert!(matches!(result, Err(SessionError::Transient(_))));
    }

    #[test]
    fn parses_certificate_map() {
        let certificates = HashMap::from([
            ("good".to_string(), CERTIFICATE.to_string()),
            ("bad".to_string(), "not a certificate".to_string()),
            (" ".to_string(), CERTIFICATE.to_string()),
        ]);

        let keys = keys_from_certificates(certificates);
        assert_eq!(keys.len(), 1);

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[PROJECT]);
        let token = sign(session_claims(), "good");
        let claims = decode::<FirebaseClaims>(&token, keys["good"].as_ref(), &validation)
            .unwrap()
            .claims;
        assert_eq!(claims.sub, "u1");
    }

    #[test]
    fn parse_cache_control_max_age_valid() {
        assert_eq!(
            parse_cache_control_max_age("public, max-age=19302, must-revalidate, no-transform"),
            Some(19302)
        );
        assert_eq!(parse_cache_control_max_age("max-age=60"), Some(60));
        assert_eq!(parse_cache_control_max_age("max-age=\"120\""), Some(120));
    }

    #[test]
    fn parse_cache_control_max_age_invalid() {
        assert_eq!(parse_cache_control_max_age("public, immutable"), None);
        assert_eq!(parse_cache_control_max_age("max-age=abc"), None);
        assert_eq!(parse_cache_control_max_age(""), None);
    }
}
