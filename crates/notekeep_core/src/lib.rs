//! Core domain logic for notekeep.
//! This crate is the single source of truth for business invariants.

pub mod color;
pub mod db;
pub mod events;
pub mod logging;
pub mod model;
pub mod query;
pub mod repo;
pub mod service;
pub mod transfer;

pub use color::{normalize_hex, NoteColor, DEFAULT_COLOR_HEX};
pub use events::{ChangeHub, ChangeKind, ChangeSubscription, StoreEvent};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::category::{Category, CategoryId};
pub use model::note::{Note, NoteId};
pub use model::subcategory::{Subcategory, SubcategoryId};
pub use model::{EntityKind, ValidationError};
pub use query::{NoteQuery, NoteScope, NoteSortKey, SortDirection};
pub use repo::category_repo::{CategoryRepository, SqliteCategoryRepository};
pub use repo::note_repo::{NoteRepository, SqliteNoteRepository};
pub use repo::subcategory_repo::{SqliteSubcategoryRepository, SubcategoryRepository};
pub use repo::{RepoError, RepoResult};
pub use service::catalog_service::{CatalogService, CategoryDeleteOutcome, CategorySummary};
pub use service::note_service::NoteService;
pub use service::{ServiceError, ServiceResult};
pub use transfer::{
    default_export_filename, export_document, export_to_file, export_to_string, import_document,
    import_from_file, ExportDocument, ExportError, ImportError, ImportSummary,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
