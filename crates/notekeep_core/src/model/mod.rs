//! Domain model for the category/subcategory/note hierarchy.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Provide lifecycle constructors that stamp ids and timestamps.
//!
//! # Invariants
//! - Every entity is identified by a stable `Uuid` that is never reused.
//! - `updated_at` is refreshed on every mutation.
//! - Write paths must call `validate()` before reaching storage.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};

pub mod category;
pub mod note;
pub mod subcategory;

/// Entity kinds held by the store.
///
/// Shared by validation errors, repository errors and change events so
/// callers can branch on "what kind of record" without extra strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Category,
    SubCategory,
    Note,
}

impl EntityKind {
    /// Stable lowercase label used in log lines and error text.
    pub fn label(self) -> &'static str {
        match self {
            Self::Category => "category",
            Self::SubCategory => "subcategory",
            Self::Note => "note",
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Validation failure raised before any storage mutation is attempted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Category or subcategory name is empty after trimming.
    EmptyName(EntityKind),
    /// Note title is empty after trimming.
    EmptyTitle,
    /// Note carries a subcategory link without a category link.
    SubcategoryWithoutCategory,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName(kind) => write!(f, "{kind} name must not be empty"),
            Self::EmptyTitle => write!(f, "note title must not be empty"),
            Self::SubcategoryWithoutCategory => {
                write!(f, "note cannot reference a subcategory without a category")
            }
        }
    }
}

impl Error for ValidationError {}

/// Current wall-clock time as epoch milliseconds.
///
/// Storage and model timestamps share this unit; ISO-8601 appears only
/// at the transfer boundary.
pub(crate) fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or(0)
}
