// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod community;
pub mod directory;
pub mod profile;

pub use community::{CommunityPost, Job};
pub use directory::{ManagerSummary, TalentSummary};
pub use profile::{ProfilePatch, UserProfile, UserType};
