//! crates/studylens_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or web framework; they
//! carry serde derives only because the API returns them on the wire.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The kind of content a [`Source`] was ingested from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Pdf,
    Txt,
    Md,
    Youtube,
}

impl SourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::Pdf => "pdf",
            SourceType::Txt => "txt",
            SourceType::Md => "md",
            SourceType::Youtube => "youtube",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pdf" => Some(SourceType::Pdf),
            "txt" => Some(SourceType::Txt),
            "md" => Some(SourceType::Md),
            "youtube" => Some(SourceType::Youtube),
            _ => None,
        }
    }
}

/// The user's stored theme preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
    Light,
    Dark,
    System,
}

impl ThemePreference {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemePreference::Light => "light",
            ThemePreference::Dark => "dark",
            ThemePreference::System => "system",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "light" => Some(ThemePreference::Light),
            "dark" => Some(ThemePreference::Dark),
            "system" => Some(ThemePreference::System),
            _ => None,
        }
    }
}

/// Represents an authenticated user.
///
/// The id is an opaque string issued by the external identity provider,
/// not something this service generates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_image_url: Option<String>,
    pub auth_method: String,
    pub theme_preference: ThemePreference,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert-or-update payload for [`User`], keyed by id.
///
/// Used both for first-login provisioning and theme-preference updates.
#[derive(Debug, Clone)]
pub struct UpsertUser {
    pub id: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_image_url: Option<String>,
    pub theme_preference: Option<ThemePreference>,
}

/// One uploaded or linked content item plus its extracted text.
///
/// Immutable after creation except for explicit update/delete. `content`
/// is `None` when extraction failed; `metadata` is free-form key/value
/// (file size, word count, video duration, and so on).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    pub id: Uuid,
    pub user_id: String,
    #[serde(rename = "type")]
    pub source_type: SourceType,
    pub title: String,
    pub original_link: Option<String>,
    pub content: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

/// Fields required to create a [`Source`].
#[derive(Debug, Clone)]
pub struct NewSource {
    pub user_id: String,
    pub source_type: SourceType,
    pub title: String,
    pub original_link: Option<String>,
    pub content: Option<String>,
    pub metadata: Option<serde_json::Value>,
}

/// Partial update for a [`Source`]; `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct SourceUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    pub metadata: Option<serde_json::Value>,
}

/// The structured result of one summarization pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResult {
    pub summary: String,
    #[serde(default)]
    pub key_points: Vec<String>,
}

/// One AI summarization pass over exactly one [`Source`].
///
/// A source may accumulate several sessions if it is re-summarized.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiSession {
    pub id: Uuid,
    pub user_id: String,
    pub source_id: Uuid,
    pub summary: SummaryResult,
    /// Placeholder for semantic-search vectors; never populated today.
    pub embeddings: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

/// Fields required to create an [`AiSession`].
#[derive(Debug, Clone)]
pub struct NewAiSession {
    pub user_id: String,
    pub source_id: Uuid,
    pub summary: SummaryResult,
}

/// Partial update for an [`AiSession`].
#[derive(Debug, Clone, Default)]
pub struct SessionUpdate {
    pub summary: Option<SummaryResult>,
    pub embeddings: Option<serde_json::Value>,
}

/// The structured result of one question-answering call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QaResult {
    pub answer: String,
    #[serde(default)]
    pub source_chunks: Vec<String>,
    pub confidence: f64,
}

/// One question/answer exchange within an [`AiSession`]. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Qa {
    pub id: Uuid,
    pub session_id: Uuid,
    pub question: String,
    pub answer: String,
    pub source_chunks: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields required to create a [`Qa`].
#[derive(Debug, Clone)]
pub struct NewQa {
    pub session_id: Uuid,
    pub question: String,
    pub answer: String,
    pub source_chunks: Vec<String>,
}
