//! Note domain model.
//!
//! # Invariants
//! - `title` is non-empty after trimming.
//! - A set `subcategory_uuid` requires a set `category_uuid`, and the
//!   category must equal the subcategory's parent. The structural half
//!   is checked here; the parent match is enforced by the note service
//!   against the store.
//! - `category_uuid == None` means the note is "unlisted".

use crate::model::category::CategoryId;
use crate::model::subcategory::SubcategoryId;
use crate::model::{now_ms, ValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for one note.
pub type NoteId = Uuid;

/// Free-text note, optionally filed under a category/subcategory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Stable global ID, immutable after creation.
    pub uuid: NoteId,
    /// Display title; a note without one is not savable.
    pub title: String,
    /// Free text body, may be empty.
    pub content: String,
    /// Owning category; `None` means unlisted.
    pub category_uuid: Option<CategoryId>,
    /// Owning subcategory; requires `category_uuid`.
    pub subcategory_uuid: Option<SubcategoryId>,
    /// Epoch ms creation timestamp.
    pub created_at: i64,
    /// Epoch ms, refreshed on every mutation.
    pub updated_at: i64,
}

impl Note {
    /// Creates an unlisted note with a fresh id and current timestamps.
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        let now = now_ms();
        Self {
            uuid: Uuid::new_v4(),
            title: title.into(),
            content: content.into(),
            category_uuid: None,
            subcategory_uuid: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Creates a note with caller-provided timestamps and links.
    ///
    /// Used by the import path; link consistency is the caller's job.
    pub fn with_timestamps(
        title: impl Into<String>,
        content: impl Into<String>,
        category_uuid: Option<CategoryId>,
        subcategory_uuid: Option<SubcategoryId>,
        created_at: i64,
        updated_at: i64,
    ) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            title: title.into(),
            content: content.into(),
            category_uuid,
            subcategory_uuid,
            created_at,
            updated_at,
        }
    }

    /// Returns whether the note is filed under no category.
    pub fn is_unlisted(&self) -> bool {
        self.category_uuid.is_none()
    }

    /// Checks structural invariants before persistence.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        if self.subcategory_uuid.is_some() && self.category_uuid.is_none() {
            return Err(ValidationError::SubcategoryWithoutCategory);
        }
        Ok(())
    }
}
