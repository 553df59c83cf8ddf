//! Core data models for the naskah content layer.
//!
//! These types are shared across all naskah crates and represent the
//! catalog's domain entities: manuscripts, journal posts with their
//! comments, and guestbook entries, plus the value types returned by the
//! generative augmentation service.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Error;

// =============================================================================
// MANUSCRIPT TYPES
// =============================================================================

/// Loan/condition status of a cataloged manuscript.
///
/// Stored as text in the database; parsing an unknown value is an error
/// rather than a silent default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ManuscriptStatus {
    Available,
    OnLoan,
    Damaged,
}

impl ManuscriptStatus {
    /// Database/text representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "Available",
            Self::OnLoan => "OnLoan",
            Self::Damaged => "Damaged",
        }
    }
}

impl fmt::Display for ManuscriptStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ManuscriptStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Available" => Ok(Self::Available),
            "OnLoan" => Ok(Self::OnLoan),
            "Damaged" => Ok(Self::Damaged),
            _ => Err(Error::Serialization(format!(
                "unknown manuscript status: {}",
                s
            ))),
        }
    }
}

/// A cataloged manuscript record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manuscript {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub inventory_code: String,
    pub digital_code: String,
    pub status: ManuscriptStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub copyist: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub copy_year: Option<i32>,
    pub page_count: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ink: Option<String>,
    pub category: String,
    pub language: String,
    pub script: String,
    /// Physical dimensions, e.g. "20cm x 30cm".
    pub size: String,
    pub description: String,
    pub condition: String,
    pub readability: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colophon: Option<String>,
    pub cover_image_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_folder_url: Option<String>,
    pub created_at_utc: DateTime<Utc>,
}

// =============================================================================
// POST AND COMMENT TYPES
// =============================================================================

/// A journal post with its comments inlined.
///
/// `content` is plain text using a minimal block convention:
/// blank-line-separated paragraphs, with `#`-prefixed heading lines.
/// Comments are ordered by creation time ascending and are only ever
/// mutated through `PostRepository::add_comment`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub summary: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub created_at_utc: DateTime<Utc>,
    pub comments: Vec<Comment>,
}

/// A comment on a journal post. Always carries its owning post id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author: String,
    pub text: String,
    pub created_at_utc: DateTime<Utc>,
}

// =============================================================================
// GUESTBOOK TYPES
// =============================================================================

/// A visitor guestbook entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuestbookEntry {
    pub id: Uuid,
    pub name: String,
    pub message: String,
    pub created_at_utc: DateTime<Utc>,
}

// =============================================================================
// AUGMENTATION VALUE TYPES
// =============================================================================

/// Field values proposed by the generative service for a manuscript title.
///
/// Decoded from the service's JSON output through a strict validation step;
/// a response that is not a JSON object is rejected wholesale rather than
/// partially applied. Every field is optional — the model may decline any
/// of them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ManuscriptAutofill {
    pub author: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub language: Option<String>,
    pub script: Option<String>,
    pub condition: Option<String>,
    pub readability: Option<String>,
}

/// A source citation attached to a grounded answer.
///
/// Either side may be absent depending on which retrieval path the
/// service used for the citation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroundingSource {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub web: Option<SourceRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retrieved_context: Option<SourceRef>,
}

/// Reference to a cited document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceRef {
    pub uri: Option<String>,
    pub title: Option<String>,
}

/// Answer to a grounded search query, with zero or more citations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroundedAnswer {
    pub text: String,
    pub sources: Vec<GroundingSource>,
}
