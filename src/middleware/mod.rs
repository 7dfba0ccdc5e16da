// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Middleware modules (route guard, session authentication, security).

pub mod auth;
pub mod guard;
pub mod security;

pub use auth::SessionUser;
pub use guard::route_guard;
