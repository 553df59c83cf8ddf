//! Core traits for the naskah content layer.
//!
//! These traits define the interfaces that concrete implementations must
//! satisfy, enabling pluggable backends and testability.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::*;

// =============================================================================
// PAGINATION
// =============================================================================

/// Request for one page of a listing, with an optional search term.
///
/// Pages are 1-based. A `None` or whitespace-only search term means no
/// filter; repositories match non-empty terms case-insensitively as
/// substrings across their entity's searchable columns.
#[derive(Debug, Clone)]
pub struct PageRequest {
    pub page: i64,
    pub per_page: i64,
    pub search: Option<String>,
}

impl PageRequest {
    /// Create a request for the given page with no search filter.
    pub fn new(page: i64, per_page: i64) -> Self {
        Self {
            page,
            per_page,
            search: None,
        }
    }

    /// Attach a search term.
    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    /// Validate pagination bounds.
    pub fn validate(&self) -> Result<()> {
        if self.page < 1 {
            return Err(Error::InvalidInput(format!(
                "page must be >= 1, got {}",
                self.page
            )));
        }
        if self.per_page < 1 {
            return Err(Error::InvalidInput(format!(
                "per_page must be >= 1, got {}",
                self.per_page
            )));
        }
        Ok(())
    }

    /// Zero-based row offset for this page.
    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.per_page
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, 20)
    }
}

/// One page of results plus the total count of matching rows.
///
/// `total` counts everything the filter matches, not just this page, so
/// callers can compute page counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
}

impl<T> Page<T> {
    /// Number of pages needed to enumerate all matching rows.
    pub fn page_count(&self, per_page: i64) -> i64 {
        if per_page < 1 {
            return 0;
        }
        (self.total + per_page - 1) / per_page
    }
}

// =============================================================================
// MANUSCRIPT REPOSITORY
// =============================================================================

/// Request for creating a manuscript. Identity and creation timestamp are
/// assigned by the store.
#[derive(Debug, Clone)]
pub struct CreateManuscriptRequest {
    pub title: String,
    pub author: String,
    pub inventory_code: String,
    pub digital_code: String,
    pub status: ManuscriptStatus,
    pub copyist: Option<String>,
    pub copy_year: Option<i32>,
    pub page_count: i32,
    pub ink: Option<String>,
    pub category: String,
    pub language: String,
    pub script: String,
    pub size: String,
    pub description: String,
    pub condition: String,
    pub readability: String,
    pub colophon: Option<String>,
    pub cover_image_url: String,
    pub external_folder_url: Option<String>,
}

/// Partial update of a manuscript. `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct UpdateManuscriptRequest {
    pub title: Option<String>,
    pub author: Option<String>,
    pub inventory_code: Option<String>,
    pub digital_code: Option<String>,
    pub status: Option<ManuscriptStatus>,
    pub copyist: Option<String>,
    pub copy_year: Option<i32>,
    pub page_count: Option<i32>,
    pub ink: Option<String>,
    pub category: Option<String>,
    pub language: Option<String>,
    pub script: Option<String>,
    pub size: Option<String>,
    pub description: Option<String>,
    pub condition: Option<String>,
    pub readability: Option<String>,
    pub colophon: Option<String>,
    pub cover_image_url: Option<String>,
    pub external_folder_url: Option<String>,
}

/// Repository for manuscript CRUD operations.
#[async_trait]
pub trait ManuscriptRepository: Send + Sync {
    /// List manuscripts, newest first, optionally filtered by a search
    /// term over title/description/author.
    async fn list(&self, req: PageRequest) -> Result<Page<Manuscript>>;

    /// Fetch one manuscript. `Ok(None)` when the id does not exist.
    async fn get(&self, id: Uuid) -> Result<Option<Manuscript>>;

    /// Insert a manuscript and return the stored record.
    async fn create(&self, req: CreateManuscriptRequest) -> Result<Manuscript>;

    /// Apply a partial update and return the updated record.
    async fn update(&self, id: Uuid, req: UpdateManuscriptRequest) -> Result<Manuscript>;

    /// Delete a manuscript. Deleting a missing id is a no-op.
    async fn delete(&self, id: Uuid) -> Result<()>;
}

// =============================================================================
// POST REPOSITORY
// =============================================================================

/// Request for creating a journal post. Comments are never part of the
/// post payload.
#[derive(Debug, Clone)]
pub struct CreatePostRequest {
    pub title: String,
    pub author: String,
    pub summary: String,
    pub content: String,
    pub image_url: Option<String>,
}

/// Partial update of a journal post. Comments cannot be updated here.
#[derive(Debug, Clone, Default)]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub author: Option<String>,
    pub summary: Option<String>,
    pub content: Option<String>,
    pub image_url: Option<String>,
}

/// Request for appending a comment to a post.
#[derive(Debug, Clone)]
pub struct CreateCommentRequest {
    pub author: String,
    pub text: String,
}

/// Repository for journal posts and their comments.
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// List posts, newest first, optionally filtered by a search term
    /// over title/summary/author. Comments are inlined, oldest first.
    async fn list(&self, req: PageRequest) -> Result<Page<Post>>;

    /// Fetch one post with its comments. `Ok(None)` when the id does not
    /// exist.
    async fn get(&self, id: Uuid) -> Result<Option<Post>>;

    /// Insert a post and return the stored record (empty comments).
    async fn create(&self, req: CreatePostRequest) -> Result<Post>;

    /// Apply a partial update and return the updated record with its
    /// comments.
    async fn update(&self, id: Uuid, req: UpdatePostRequest) -> Result<Post>;

    /// Delete a post and, via the store's cascade, its comments.
    async fn delete(&self, id: Uuid) -> Result<()>;

    /// Append a comment to an existing post and return the stored record.
    async fn add_comment(&self, post_id: Uuid, req: CreateCommentRequest) -> Result<Comment>;
}

// =============================================================================
// GUESTBOOK REPOSITORY
// =============================================================================

/// Request for creating a guestbook entry.
#[derive(Debug, Clone)]
pub struct CreateGuestbookEntryRequest {
    pub name: String,
    pub message: String,
}

/// Repository for guestbook entries. No search columns are defined for
/// this entity.
#[async_trait]
pub trait GuestbookRepository: Send + Sync {
    /// List entries, newest first.
    async fn list(&self, page: i64, per_page: i64) -> Result<Page<GuestbookEntry>>;

    /// Insert an entry and return the stored record.
    async fn create(&self, req: CreateGuestbookEntryRequest) -> Result<GuestbookEntry>;

    /// Delete an entry. Deleting a missing id is a no-op.
    async fn delete(&self, id: Uuid) -> Result<()>;
}

// =============================================================================
// GENERATION BACKEND
// =============================================================================

/// One generation call against the remote service.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub prompt: String,
    /// Sampling temperature; `None` uses the service default.
    pub temperature: Option<f32>,
    /// Ask the service for JSON-formatted output.
    pub json_output: bool,
    /// Enable the service's external-search grounding tool for this call.
    pub web_search: bool,
}

impl GenerateRequest {
    /// Plain free-text request at the given temperature.
    pub fn text(prompt: impl Into<String>, temperature: f32) -> Self {
        Self {
            prompt: prompt.into(),
            temperature: Some(temperature),
            json_output: false,
            web_search: false,
        }
    }

    /// JSON-output request at the given temperature.
    pub fn json(prompt: impl Into<String>, temperature: f32) -> Self {
        Self {
            prompt: prompt.into(),
            temperature: Some(temperature),
            json_output: true,
            web_search: false,
        }
    }

    /// Free-text request with the external-search tool enabled.
    pub fn grounded(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            temperature: None,
            json_output: false,
            web_search: true,
        }
    }
}

/// Raw reply from the generative service.
#[derive(Debug, Clone)]
pub struct GenerateReply {
    pub text: String,
    /// Citations from grounding metadata; empty when the search tool was
    /// not used or the service returned none.
    pub sources: Vec<GroundingSource>,
}

/// Backend for text generation against a remote generative service.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Run one generation request.
    async fn generate(&self, req: GenerateRequest) -> Result<GenerateReply>;

    /// Get the model name being used.
    fn model_name(&self) -> &str;
}
