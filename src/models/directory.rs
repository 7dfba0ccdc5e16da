// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Abbreviated profile summaries for the community directory.

use crate::models::UserProfile;
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

const HEADLINE_MAX_CHARS: usize = 140;

/// Featured youth talent card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct TalentSummary {
    pub uid: String,
    pub full_name: Option<String>,
    pub location: Option<String>,
    pub headline: Option<String>,
    pub skills: Vec<String>,
    pub profile_image_url: Option<String>,
}

/// Manager card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ManagerSummary {
    pub uid: String,
    pub full_name: Option<String>,
    pub company_name: Option<String>,
    pub job_title: Option<String>,
    pub location: Option<String>,
    pub profile_image_url: Option<String>,
}

impl From<UserProfile> for TalentSummary {
    fn from(profile: UserProfile) -> Self {
        Self {
            headline: profile.bio.as_deref().map(headline),
            uid: profile.uid,
            full_name: profile.full_name,
            location: profile.location,
            skills: profile.skills.unwrap_or_default(),
            profile_image_url: profile.profile_image_url,
        }
    }
}

impl From<UserProfile> for ManagerSummary {
    fn from(profile: UserProfile) -> Self {
        Self {
            uid: profile.uid,
            full_name: profile.full_name,
            company_name: profile.company_name,
            job_title: profile.job_title,
            location: profile.location,
            profile_image_url: profile.profile_image_url,
        }
    }
}

/// First line of a bio, cut to a card-sized headline.
fn headline(bio: &str) -> String {
    let first_line = bio.lines().next().unwrap_or_default().trim();
    if first_line.chars().count() <= HEADLINE_MAX_CHARS {
        return first_line.to_string();
    }

    let mut cut: String = first_line.chars().take(HEADLINE_MAX_CHARS - 1).collect();
    cut.push('…');
    cut
}
