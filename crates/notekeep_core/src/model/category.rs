//! Category domain model.
//!
//! # Invariants
//! - `uuid` is stable and never reused for another category.
//! - `name` is non-empty after trimming.
//! - `color_hex` always holds a normalized `RRGGBB` value.

use crate::color::{normalize_hex, NoteColor, DEFAULT_COLOR_HEX};
use crate::model::{now_ms, EntityKind, ValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for one category.
pub type CategoryId = Uuid;

/// Top-level grouping for notes and subcategories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Stable global ID, immutable after creation.
    pub uuid: CategoryId,
    /// Display name, unique in practice (import matches on it).
    pub name: String,
    /// Normalized `RRGGBB` color, palette blue by default.
    pub color_hex: String,
    /// Epoch ms creation timestamp.
    pub created_at: i64,
    /// Epoch ms, refreshed on every mutation.
    pub updated_at: i64,
}

impl Category {
    /// Creates a category with a fresh id and current timestamps.
    pub fn new(name: impl Into<String>, color: Option<NoteColor>) -> Self {
        let now = now_ms();
        Self {
            uuid: Uuid::new_v4(),
            name: name.into(),
            color_hex: color.map_or_else(|| DEFAULT_COLOR_HEX.to_string(), |value| value.hex()),
            created_at: now,
            updated_at: now,
        }
    }

    /// Creates a category with caller-provided timestamps.
    ///
    /// Used by the import path, where creation time comes from the
    /// document rather than the clock.
    pub fn with_timestamps(
        name: impl Into<String>,
        color_hex: &str,
        created_at: i64,
        updated_at: i64,
    ) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: name.into(),
            color_hex: normalize_hex(color_hex)
                .unwrap_or_else(|| DEFAULT_COLOR_HEX.to_string()),
            created_at,
            updated_at,
        }
    }

    /// Parsed palette color for rendering.
    pub fn color(&self) -> NoteColor {
        NoteColor::from_hex(&self.color_hex)
    }

    /// Checks structural invariants before persistence.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName(EntityKind::Category));
        }
        Ok(())
    }
}
