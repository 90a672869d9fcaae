//! JSON document to entity graph import.
//!
//! # Responsibility
//! - Rehydrate an export document into the store, reconciling against
//!   existing rows by name.
//! - Report per-record skips without failing the whole import.
//!
//! # Invariants
//! - A document that fails to parse (or lacks `categories`) aborts
//!   before any mutation.
//! - All mutations run inside one transaction; a storage failure rolls
//!   the import back as a unit.
//! - Matching: category by exact `name`, subcategory by
//!   `(name, parent)`, note by `(title, category, subcategory)`.
//!   Matched categories/subcategories adopt the document color but
//!   keep their timestamps; matched notes are skipped, which makes
//!   re-importing the same document idempotent.
//! - Created rows get fresh ids; document ids are never trusted (a
//!   re-import into the same store would collide on primary keys).

use crate::color::{normalize_hex, DEFAULT_COLOR_HEX};
use crate::db::DbError;
use crate::events::{ChangeHub, StoreEvent};
use crate::model::category::Category;
use crate::model::note::Note;
use crate::model::subcategory::Subcategory;
use crate::model::EntityKind;
use crate::repo::category_repo::{CategoryRepository, SqliteCategoryRepository};
use crate::repo::note_repo::{NoteRepository, SqliteNoteRepository};
use crate::repo::subcategory_repo::{SqliteSubcategoryRepository, SubcategoryRepository};
use crate::repo::RepoError;
use crate::transfer::{parse_timestamp, ExportDocument, NoteEntry};
use log::{error, info, warn};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::time::Instant;

/// Import-layer error.
#[derive(Debug)]
pub enum ImportError {
    /// Document is not valid JSON or lacks the expected shape; nothing
    /// was mutated.
    InvalidFormat(String),
    Repo(RepoError),
    Db(DbError),
    Io(std::io::Error),
}

impl Display for ImportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidFormat(message) => write!(f, "invalid import format: {message}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Io(err) => write!(f, "failed to read import file: {err}"),
        }
    }
}

impl Error for ImportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidFormat(_) => None,
            Self::Repo(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Io(err) => Some(err),
        }
    }
}

impl From<RepoError> for ImportError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<DbError> for ImportError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<std::io::Error> for ImportError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

/// Outcome counters for one import run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub categories_created: usize,
    pub categories_matched: usize,
    pub subcategories_created: usize,
    pub subcategories_matched: usize,
    pub notes_created: usize,
    /// Notes suppressed by the `(title, category, subcategory)` dedupe.
    pub notes_skipped: usize,
    /// Records dropped for missing mandatory fields (`name`/`title`).
    pub records_skipped: usize,
}

/// Imports one JSON document into the store.
///
/// When a hub is given, bulk `Refreshed` events fire after the commit
/// for every entity kind the import touched.
pub fn import_document(
    conn: &mut Connection,
    json: &str,
    hub: Option<&ChangeHub>,
) -> Result<ImportSummary, ImportError> {
    let started_at = Instant::now();

    let document: ExportDocument = match serde_json::from_str(json) {
        Ok(document) => document,
        Err(err) => {
            error!(
                "event=import module=transfer status=error error_code=invalid_format error={err}"
            );
            return Err(ImportError::InvalidFormat(err.to_string()));
        }
    };

    let tx = conn.transaction().map_err(DbError::from)?;
    let summary = apply_document(&tx, &document)?;
    tx.commit().map_err(DbError::from)?;

    info!(
        "event=import module=transfer status=ok duration_ms={} categories_created={} categories_matched={} subcategories_created={} subcategories_matched={} notes_created={} notes_skipped={} records_skipped={}",
        started_at.elapsed().as_millis(),
        summary.categories_created,
        summary.categories_matched,
        summary.subcategories_created,
        summary.subcategories_matched,
        summary.notes_created,
        summary.notes_skipped,
        summary.records_skipped,
    );

    if let Some(hub) = hub {
        if summary.categories_created > 0 || summary.categories_matched > 0 {
            hub.publish(&StoreEvent::refreshed(EntityKind::Category));
        }
        if summary.subcategories_created > 0 || summary.subcategories_matched > 0 {
            hub.publish(&StoreEvent::refreshed(EntityKind::SubCategory));
        }
        hub.publish(&StoreEvent::refreshed(EntityKind::Note));
    }

    Ok(summary)
}

/// Reads and imports one JSON file.
pub fn import_from_file(
    conn: &mut Connection,
    path: impl AsRef<Path>,
    hub: Option<&ChangeHub>,
) -> Result<ImportSummary, ImportError> {
    let json = std::fs::read_to_string(path.as_ref())?;
    import_document(conn, &json, hub)
}

fn apply_document(
    conn: &Connection,
    document: &ExportDocument,
) -> Result<ImportSummary, ImportError> {
    let categories = SqliteCategoryRepository::try_new(conn)?;
    let subcategories = SqliteSubcategoryRepository::try_new(conn)?;
    let notes = SqliteNoteRepository::try_new(conn)?;
    let mut summary = ImportSummary::default();

    for entry in &document.categories {
        let Some(name) = present(entry.name.as_deref()) else {
            warn!("event=import_skip module=transfer reason=missing_name kind=category");
            summary.records_skipped += 1;
            continue;
        };

        let entry_color = entry.color_hex.as_deref().and_then(normalize_hex);
        let category = match categories.find_by_name(name)? {
            Some(mut existing) => {
                if let Some(color_hex) = &entry_color {
                    if *color_hex != existing.color_hex {
                        categories.set_color(existing.uuid, color_hex)?;
                        existing.color_hex = color_hex.clone();
                    }
                }
                summary.categories_matched += 1;
                existing
            }
            None => {
                let fresh = Category::with_timestamps(
                    name,
                    entry_color.as_deref().unwrap_or(DEFAULT_COLOR_HEX),
                    parse_timestamp(entry.created_at.as_deref()),
                    parse_timestamp(entry.updated_at.as_deref()),
                );
                categories.create(&fresh)?;
                summary.categories_created += 1;
                fresh
            }
        };

        import_notes(&notes, &entry.notes, &category, None, &mut summary)?;

        for subcategory_entry in &entry.subcategories {
            let Some(subcategory_name) = present(subcategory_entry.name.as_deref()) else {
                warn!("event=import_skip module=transfer reason=missing_name kind=subcategory");
                summary.records_skipped += 1;
                continue;
            };

            let subcategory_color = subcategory_entry
                .color_hex
                .as_deref()
                .and_then(normalize_hex);
            let subcategory =
                match subcategories.find_by_name_in_category(subcategory_name, category.uuid)? {
                    Some(existing) => {
                        if let Some(color_hex) = &subcategory_color {
                            if *color_hex != existing.color_hex {
                                subcategories.set_color(existing.uuid, color_hex)?;
                            }
                        }
                        summary.subcategories_matched += 1;
                        existing
                    }
                    None => {
                        let fresh = Subcategory::with_timestamps(
                            category.uuid,
                            subcategory_name,
                            subcategory_color
                                .as_deref()
                                .unwrap_or(category.color_hex.as_str()),
                            parse_timestamp(subcategory_entry.created_at.as_deref()),
                            parse_timestamp(subcategory_entry.updated_at.as_deref()),
                        );
                        subcategories.create(&fresh)?;
                        summary.subcategories_created += 1;
                        fresh
                    }
                };

            import_notes(
                &notes,
                &subcategory_entry.notes,
                &category,
                Some(&subcategory),
                &mut summary,
            )?;
        }
    }

    for entry in &document.unlisted_notes {
        import_unlisted_note(&notes, entry, &mut summary)?;
    }

    Ok(summary)
}

fn import_notes(
    notes: &SqliteNoteRepository<'_>,
    entries: &[NoteEntry],
    category: &Category,
    subcategory: Option<&Subcategory>,
    summary: &mut ImportSummary,
) -> Result<(), ImportError> {
    for entry in entries {
        let Some(title) = present(entry.title.as_deref()) else {
            warn!("event=import_skip module=transfer reason=missing_title kind=note");
            summary.records_skipped += 1;
            continue;
        };

        let subcategory_uuid = subcategory.map(|value| value.uuid);
        if notes
            .find_duplicate(title, Some(category.uuid), subcategory_uuid)?
            .is_some()
        {
            summary.notes_skipped += 1;
            continue;
        }

        let note = Note::with_timestamps(
            title,
            entry.content.clone().unwrap_or_default(),
            Some(category.uuid),
            subcategory_uuid,
            parse_timestamp(entry.created_at.as_deref()),
            parse_timestamp(entry.updated_at.as_deref()),
        );
        notes.create(&note)?;
        summary.notes_created += 1;
    }
    Ok(())
}

fn import_unlisted_note(
    notes: &SqliteNoteRepository<'_>,
    entry: &NoteEntry,
    summary: &mut ImportSummary,
) -> Result<(), ImportError> {
    let Some(title) = present(entry.title.as_deref()) else {
        warn!("event=import_skip module=transfer reason=missing_title kind=note");
        summary.records_skipped += 1;
        return Ok(());
    };

    if notes.find_duplicate(title, None, None)?.is_some() {
        summary.notes_skipped += 1;
        return Ok(());
    }

    let note = Note::with_timestamps(
        title,
        entry.content.clone().unwrap_or_default(),
        None,
        None,
        parse_timestamp(entry.created_at.as_deref()),
        parse_timestamp(entry.updated_at.as_deref()),
    );
    notes.create(&note)?;
    summary.notes_created += 1;
    Ok(())
}

/// Trims and rejects empty strings; mandatory-field gate.
fn present(value: Option<&str>) -> Option<&str> {
    let trimmed = value?.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}
