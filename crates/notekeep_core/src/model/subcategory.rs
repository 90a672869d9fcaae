//! SubCategory domain model.
//!
//! # Invariants
//! - Exactly one owning category, set at creation, reassigned only via
//!   explicit update.
//! - `color_hex` inherits the parent's value when not specified.

use crate::color::{normalize_hex, NoteColor, DEFAULT_COLOR_HEX};
use crate::model::category::{Category, CategoryId};
use crate::model::{now_ms, EntityKind, ValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for one subcategory.
pub type SubcategoryId = Uuid;

/// Second-level grouping, always owned by one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subcategory {
    /// Stable global ID, immutable after creation.
    pub uuid: SubcategoryId,
    /// Display name; import matches on `(name, parent)`.
    pub name: String,
    /// Normalized `RRGGBB` color.
    pub color_hex: String,
    /// Owning category.
    pub category_uuid: CategoryId,
    /// Epoch ms creation timestamp.
    pub created_at: i64,
    /// Epoch ms, refreshed on every mutation.
    pub updated_at: i64,
}

impl Subcategory {
    /// Creates a subcategory under `parent` with a fresh id.
    ///
    /// Without an explicit color the parent's `color_hex` is inherited.
    pub fn new(parent: &Category, name: impl Into<String>, color: Option<NoteColor>) -> Self {
        let now = now_ms();
        Self {
            uuid: Uuid::new_v4(),
            name: name.into(),
            color_hex: color.map_or_else(|| parent.color_hex.clone(), |value| value.hex()),
            category_uuid: parent.uuid,
            created_at: now,
            updated_at: now,
        }
    }

    /// Creates a subcategory with caller-provided timestamps.
    ///
    /// Used by the import path.
    pub fn with_timestamps(
        category_uuid: CategoryId,
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
            category_uuid,
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
            return Err(ValidationError::EmptyName(EntityKind::SubCategory));
        }
        Ok(())
    }
}
