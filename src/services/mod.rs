// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod dev_session;
pub mod directory;
pub mod firebase_auth;
pub mod roles;
pub mod session;

pub use dev_session::{create_dev_session_token, DevSessionVerifier};
pub use firebase_auth::{FirebaseSessionVerifier, TokenKind};
pub use session::{SessionError, SessionVerifier, VerifiedSession};
