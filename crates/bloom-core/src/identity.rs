//! Identity profile metadata embedded in agent tokens.
//!
//! The profile is produced upstream (by the matching engine) and travels with
//! the token so the dashboard can render it. It is carried inside the signed
//! envelope but is not part of the wallet-signed message.

use serde::{Deserialize, Serialize};

/// Personality archetype of an identity card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PersonalityType {
    #[serde(rename = "The Visionary")]
    Visionary,
    #[serde(rename = "The Explorer")]
    Explorer,
    #[serde(rename = "The Cultivator")]
    Cultivator,
    #[serde(rename = "The Optimizer")]
    Optimizer,
    #[serde(rename = "The Innovator")]
    Innovator,
}

/// How the profile was derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileMode {
    /// Derived from scraped social data.
    Data,
    /// Derived from a manual Q&A.
    Manual,
}

/// Identity card data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityData {
    pub personality_type: PersonalityType,

    pub tagline: String,

    pub description: String,

    #[serde(default)]
    pub main_categories: Vec<String>,

    #[serde(default)]
    pub sub_categories: Vec<String>,

    /// Confidence in the profile, 0-100.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<u8>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<ProfileMode>,
}
