//! Entity graph to JSON document conversion.
//!
//! # Responsibility
//! - Flatten the category -> subcategory -> note tree into one
//!   [`ExportDocument`].
//! - Serialize and write the document to disk.
//!
//! # Invariants
//! - A category's `notes` array holds direct notes only; notes filed
//!   under a subcategory appear once, inside that subcategory.
//! - Categories are ordered by name, notes by the default query order.

use crate::model::note::Note;
use crate::model::now_ms;
use crate::query::{NoteQuery, NoteScope};
use crate::repo::category_repo::{CategoryRepository, SqliteCategoryRepository};
use crate::repo::note_repo::{NoteRepository, SqliteNoteRepository};
use crate::repo::subcategory_repo::{SqliteSubcategoryRepository, SubcategoryRepository};
use crate::repo::RepoError;
use crate::transfer::{format_timestamp, CategoryEntry, ExportDocument, NoteEntry, SubcategoryEntry};
use log::{error, info};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::time::Instant;

/// Export-layer error.
#[derive(Debug)]
pub enum ExportError {
    Repo(RepoError),
    Serialize(serde_json::Error),
    Io(std::io::Error),
}

impl Display for ExportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::Serialize(err) => write!(f, "failed to serialize export document: {err}"),
            Self::Io(err) => write!(f, "failed to write export file: {err}"),
        }
    }
}

impl Error for ExportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Serialize(err) => Some(err),
            Self::Io(err) => Some(err),
        }
    }
}

impl From<RepoError> for ExportError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<serde_json::Error> for ExportError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialize(value)
    }
}

impl From<std::io::Error> for ExportError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

/// Builds the export document for the whole store.
pub fn export_document(conn: &Connection) -> Result<ExportDocument, ExportError> {
    let categories = SqliteCategoryRepository::try_new(conn)?;
    let subcategories = SqliteSubcategoryRepository::try_new(conn)?;
    let notes = SqliteNoteRepository::try_new(conn)?;

    let mut category_entries = Vec::new();
    for category in categories.list()? {
        let direct_notes = notes.list(&NoteQuery::scoped(NoteScope::Category(category.uuid)))?;

        let mut subcategory_entries = Vec::new();
        for subcategory in subcategories.list_for_category(category.uuid)? {
            let subcategory_notes =
                notes.list(&NoteQuery::scoped(NoteScope::Subcategory(subcategory.uuid)))?;
            subcategory_entries.push(SubcategoryEntry {
                id: Some(subcategory.uuid.to_string()),
                name: Some(subcategory.name),
                color_hex: Some(subcategory.color_hex),
                created_at: Some(format_timestamp(subcategory.created_at)),
                updated_at: Some(format_timestamp(subcategory.updated_at)),
                notes: subcategory_notes.iter().map(note_entry).collect(),
            });
        }

        category_entries.push(CategoryEntry {
            id: Some(category.uuid.to_string()),
            name: Some(category.name),
            color_hex: Some(category.color_hex),
            created_at: Some(format_timestamp(category.created_at)),
            updated_at: Some(format_timestamp(category.updated_at)),
            notes: direct_notes.iter().map(note_entry).collect(),
            subcategories: subcategory_entries,
        });
    }

    let unlisted = notes.list(&NoteQuery::scoped(NoteScope::Unlisted))?;

    Ok(ExportDocument {
        export_date: Some(format_timestamp(now_ms())),
        categories: category_entries,
        unlisted_notes: unlisted.iter().map(note_entry).collect(),
    })
}

/// Exports the whole store as a pretty-printed JSON string.
pub fn export_to_string(conn: &Connection) -> Result<String, ExportError> {
    let document = export_document(conn)?;
    Ok(serde_json::to_string_pretty(&document)?)
}

/// Exports the whole store to a file at `path`.
pub fn export_to_file(conn: &Connection, path: impl AsRef<Path>) -> Result<(), ExportError> {
    let started_at = Instant::now();
    let result = export_to_string(conn)
        .and_then(|json| std::fs::write(path.as_ref(), json).map_err(ExportError::from));

    match &result {
        Ok(()) => info!(
            "event=export module=transfer status=ok path={} duration_ms={}",
            path.as_ref().display(),
            started_at.elapsed().as_millis()
        ),
        Err(err) => error!(
            "event=export module=transfer status=error path={} duration_ms={} error={err}",
            path.as_ref().display(),
            started_at.elapsed().as_millis()
        ),
    }

    result
}

fn note_entry(note: &Note) -> NoteEntry {
    NoteEntry {
        id: Some(note.uuid.to_string()),
        title: Some(note.title.clone()),
        content: Some(note.content.clone()),
        created_at: Some(format_timestamp(note.created_at)),
        updated_at: Some(format_timestamp(note.updated_at)),
    }
}
