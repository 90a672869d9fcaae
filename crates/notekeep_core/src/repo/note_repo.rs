//! Note repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD and predicate-query APIs over `notes` storage.
//! - Own the bulk link-cleanup statements services run before parent
//!   deletes (unlist, detach).
//!
//! # Invariants
//! - Write paths call `Note::validate()` before SQL mutations.
//! - Query ordering is deterministic: sort key plus `uuid ASC`.
//! - `detach_subcategory` preserves the category link;
//!   `unlist_for_category` clears both links.

use crate::model::category::CategoryId;
use crate::model::note::{Note, NoteId};
use crate::model::subcategory::SubcategoryId;
use crate::model::EntityKind;
use crate::query::{build_order_clause, build_where_clause, NoteQuery};
use crate::repo::{ensure_connection_ready, parse_stored_uuid, RepoError, RepoResult};
use rusqlite::{params, params_from_iter, Connection, Row};

const NOTE_SELECT_SQL: &str = "SELECT
    uuid,
    title,
    content,
    category_uuid,
    subcategory_uuid,
    created_at,
    updated_at
FROM notes";

/// Repository interface for note CRUD and query operations.
pub trait NoteRepository {
    /// Persists one note and returns its stable id.
    fn create(&self, note: &Note) -> RepoResult<NoteId>;
    /// Replaces title, content and links; `updated_at` refreshed
    /// storage-side.
    fn update(&self, note: &Note) -> RepoResult<()>;
    /// Loads one note by id.
    fn get(&self, id: NoteId) -> RepoResult<Option<Note>>;
    /// Lists notes matching one composite query.
    fn list(&self, query: &NoteQuery) -> RepoResult<Vec<Note>>;
    /// Counts notes matching one composite query (sort ignored).
    fn count(&self, query: &NoteQuery) -> RepoResult<u64>;
    /// Finds one note with the same `(title, category, subcategory)`
    /// triple; the import dedupe predicate.
    fn find_duplicate(
        &self,
        title: &str,
        category_uuid: Option<CategoryId>,
        subcategory_uuid: Option<SubcategoryId>,
    ) -> RepoResult<Option<NoteId>>;
    /// Clears both links on every note owned directly or indirectly by
    /// one category. Returns the number of notes unlisted.
    fn unlist_for_category(&self, category_uuid: CategoryId) -> RepoResult<usize>;
    /// Clears the subcategory link on every note of one subcategory,
    /// keeping the category link. Returns the number of notes moved.
    fn detach_subcategory(&self, subcategory_uuid: SubcategoryId) -> RepoResult<usize>;
    /// Points every note of one subcategory at a new owning category.
    /// Run when a subcategory is reassigned, so `note.category` keeps
    /// matching the subcategory's parent.
    fn relink_subcategory_notes(
        &self,
        subcategory_uuid: SubcategoryId,
        category_uuid: CategoryId,
    ) -> RepoResult<usize>;
    /// Deletes one note row.
    fn delete(&self, id: NoteId) -> RepoResult<()>;
}

/// SQLite-backed note repository.
pub struct SqliteNoteRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteNoteRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "notes")?;
        Ok(Self { conn })
    }
}

impl NoteRepository for SqliteNoteRepository<'_> {
    fn create(&self, note: &Note) -> RepoResult<NoteId> {
        note.validate()?;

        self.conn.execute(
            "INSERT INTO notes (
                uuid,
                title,
                content,
                category_uuid,
                subcategory_uuid,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                note.uuid.to_string(),
                note.title.as_str(),
                note.content.as_str(),
                note.category_uuid.map(|value| value.to_string()),
                note.subcategory_uuid.map(|value| value.to_string()),
                note.created_at,
                note.updated_at,
            ],
        )?;

        Ok(note.uuid)
    }

    fn update(&self, note: &Note) -> RepoResult<()> {
        note.validate()?;

        let changed = self.conn.execute(
            "UPDATE notes
             SET
                title = ?2,
                content = ?3,
                category_uuid = ?4,
                subcategory_uuid = ?5,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            params![
                note.uuid.to_string(),
                note.title.as_str(),
                note.content.as_str(),
                note.category_uuid.map(|value| value.to_string()),
                note.subcategory_uuid.map(|value| value.to_string()),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                kind: EntityKind::Note,
                id: note.uuid,
            });
        }

        Ok(())
    }

    fn get(&self, id: NoteId) -> RepoResult<Option<Note>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{NOTE_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_note_row(row)?));
        }
        Ok(None)
    }

    fn list(&self, query: &NoteQuery) -> RepoResult<Vec<Note>> {
        let (where_sql, bind_values) = build_where_clause(query);
        let order_sql = build_order_clause(query);
        let sql = format!("{NOTE_SELECT_SQL} {where_sql} {order_sql};");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next()? {
            notes.push(parse_note_row(row)?);
        }
        Ok(notes)
    }

    fn count(&self, query: &NoteQuery) -> RepoResult<u64> {
        let (where_sql, bind_values) = build_where_clause(query);
        let sql = format!("SELECT COUNT(*) FROM notes {where_sql};");

        let count: i64 =
            self.conn
                .query_row(&sql, params_from_iter(bind_values), |row| row.get(0))?;
        Ok(count as u64)
    }

    fn find_duplicate(
        &self,
        title: &str,
        category_uuid: Option<CategoryId>,
        subcategory_uuid: Option<SubcategoryId>,
    ) -> RepoResult<Option<NoteId>> {
        // IS instead of = so NULL links compare as equal.
        let mut stmt = self.conn.prepare(
            "SELECT uuid
             FROM notes
             WHERE title = ?1
               AND category_uuid IS ?2
               AND subcategory_uuid IS ?3
             LIMIT 1;",
        )?;
        let mut rows = stmt.query(params![
            title,
            category_uuid.map(|value| value.to_string()),
            subcategory_uuid.map(|value| value.to_string()),
        ])?;
        if let Some(row) = rows.next()? {
            let uuid_text: String = row.get(0)?;
            return Ok(Some(parse_stored_uuid(&uuid_text, "notes.uuid")?));
        }
        Ok(None)
    }

    fn unlist_for_category(&self, category_uuid: CategoryId) -> RepoResult<usize> {
        let changed = self.conn.execute(
            "UPDATE notes
             SET
                category_uuid = NULL,
                subcategory_uuid = NULL,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE category_uuid = ?1;",
            [category_uuid.to_string()],
        )?;
        Ok(changed)
    }

    fn detach_subcategory(&self, subcategory_uuid: SubcategoryId) -> RepoResult<usize> {
        let changed = self.conn.execute(
            "UPDATE notes
             SET
                subcategory_uuid = NULL,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE subcategory_uuid = ?1;",
            [subcategory_uuid.to_string()],
        )?;
        Ok(changed)
    }

    fn relink_subcategory_notes(
        &self,
        subcategory_uuid: SubcategoryId,
        category_uuid: CategoryId,
    ) -> RepoResult<usize> {
        let changed = self.conn.execute(
            "UPDATE notes
             SET
                category_uuid = ?2,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE subcategory_uuid = ?1;",
            params![subcategory_uuid.to_string(), category_uuid.to_string()],
        )?;
        Ok(changed)
    }

    fn delete(&self, id: NoteId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM notes WHERE uuid = ?1;", [id.to_string()])?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                kind: EntityKind::Note,
                id,
            });
        }

        Ok(())
    }
}

fn parse_note_row(row: &Row<'_>) -> RepoResult<Note> {
    let uuid_text: String = row.get("uuid")?;
    let category_text: Option<String> = row.get("category_uuid")?;
    let subcategory_text: Option<String> = row.get("subcategory_uuid")?;

    let category_uuid = match category_text {
        Some(value) => Some(parse_stored_uuid(&value, "notes.category_uuid")?),
        None => None,
    };
    let subcategory_uuid = match subcategory_text {
        Some(value) => Some(parse_stored_uuid(&value, "notes.subcategory_uuid")?),
        None => None,
    };

    Ok(Note {
        uuid: parse_stored_uuid(&uuid_text, "notes.uuid")?,
        title: row.get("title")?,
        content: row.get("content")?,
        category_uuid,
        subcategory_uuid,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
