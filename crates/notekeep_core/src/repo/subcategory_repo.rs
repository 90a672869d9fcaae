//! SubCategory repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD APIs over `subcategories` storage.
//! - Support the `(name, parent)` matching the import path relies on.
//!
//! # Invariants
//! - Write paths call `Subcategory::validate()` before SQL mutations.
//! - Listing is deterministic: `name COLLATE NOCASE ASC, uuid ASC`.
//! - `delete` does not cascade; notes must be detached first.

use crate::model::category::CategoryId;
use crate::model::subcategory::{Subcategory, SubcategoryId};
use crate::model::EntityKind;
use crate::repo::{ensure_connection_ready, parse_stored_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

const SUBCATEGORY_SELECT_SQL: &str = "SELECT
    uuid,
    name,
    color_hex,
    category_uuid,
    created_at,
    updated_at
FROM subcategories";

/// Repository interface for subcategory CRUD operations.
pub trait SubcategoryRepository {
    /// Persists one subcategory and returns its stable id.
    fn create(&self, subcategory: &Subcategory) -> RepoResult<SubcategoryId>;
    /// Replaces name, color and parent link; `updated_at` refreshed
    /// storage-side.
    fn update(&self, subcategory: &Subcategory) -> RepoResult<()>;
    /// Replaces only the color, leaving timestamps untouched
    /// (import-path helper).
    fn set_color(&self, id: SubcategoryId, color_hex: &str) -> RepoResult<()>;
    /// Loads one subcategory by id.
    fn get(&self, id: SubcategoryId) -> RepoResult<Option<Subcategory>>;
    /// Finds one subcategory by exact name under one parent.
    fn find_by_name_in_category(
        &self,
        name: &str,
        category_uuid: CategoryId,
    ) -> RepoResult<Option<Subcategory>>;
    /// Lists subcategories of one category sorted by name.
    fn list_for_category(&self, category_uuid: CategoryId) -> RepoResult<Vec<Subcategory>>;
    /// Lists all subcategories sorted by name.
    fn list(&self) -> RepoResult<Vec<Subcategory>>;
    /// Deletes one subcategory row. Callers must detach dependent
    /// notes first.
    fn delete(&self, id: SubcategoryId) -> RepoResult<()>;
    /// Counts all subcategories.
    fn count(&self) -> RepoResult<u64>;
}

/// SQLite-backed subcategory repository.
pub struct SqliteSubcategoryRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSubcategoryRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "subcategories")?;
        Ok(Self { conn })
    }
}

impl SubcategoryRepository for SqliteSubcategoryRepository<'_> {
    fn create(&self, subcategory: &Subcategory) -> RepoResult<SubcategoryId> {
        subcategory.validate()?;

        self.conn.execute(
            "INSERT INTO subcategories (
                uuid,
                name,
                color_hex,
                category_uuid,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                subcategory.uuid.to_string(),
                subcategory.name.as_str(),
                subcategory.color_hex.as_str(),
                subcategory.category_uuid.to_string(),
                subcategory.created_at,
                subcategory.updated_at,
            ],
        )?;

        Ok(subcategory.uuid)
    }

    fn update(&self, subcategory: &Subcategory) -> RepoResult<()> {
        subcategory.validate()?;

        let changed = self.conn.execute(
            "UPDATE subcategories
             SET
                name = ?2,
                color_hex = ?3,
                category_uuid = ?4,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            params![
                subcategory.uuid.to_string(),
                subcategory.name.as_str(),
                subcategory.color_hex.as_str(),
                subcategory.category_uuid.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                kind: EntityKind::SubCategory,
                id: subcategory.uuid,
            });
        }

        Ok(())
    }

    fn set_color(&self, id: SubcategoryId, color_hex: &str) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE subcategories SET color_hex = ?2 WHERE uuid = ?1;",
            params![id.to_string(), color_hex],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                kind: EntityKind::SubCategory,
                id,
            });
        }

        Ok(())
    }

    fn get(&self, id: SubcategoryId) -> RepoResult<Option<Subcategory>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SUBCATEGORY_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_subcategory_row(row)?));
        }
        Ok(None)
    }

    fn find_by_name_in_category(
        &self,
        name: &str,
        category_uuid: CategoryId,
    ) -> RepoResult<Option<Subcategory>> {
        let mut stmt = self.conn.prepare(&format!(
            "{SUBCATEGORY_SELECT_SQL} WHERE name = ?1 AND category_uuid = ?2 LIMIT 1;"
        ))?;
        let mut rows = stmt.query(params![name, category_uuid.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_subcategory_row(row)?));
        }
        Ok(None)
    }

    fn list_for_category(&self, category_uuid: CategoryId) -> RepoResult<Vec<Subcategory>> {
        let mut stmt = self.conn.prepare(&format!(
            "{SUBCATEGORY_SELECT_SQL}
             WHERE category_uuid = ?1
             ORDER BY name COLLATE NOCASE ASC, uuid ASC;"
        ))?;
        let mut rows = stmt.query([category_uuid.to_string()])?;
        let mut subcategories = Vec::new();
        while let Some(row) = rows.next()? {
            subcategories.push(parse_subcategory_row(row)?);
        }
        Ok(subcategories)
    }

    fn list(&self) -> RepoResult<Vec<Subcategory>> {
        let mut stmt = self.conn.prepare(&format!(
            "{SUBCATEGORY_SELECT_SQL} ORDER BY name COLLATE NOCASE ASC, uuid ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut subcategories = Vec::new();
        while let Some(row) = rows.next()? {
            subcategories.push(parse_subcategory_row(row)?);
        }
        Ok(subcategories)
    }

    fn delete(&self, id: SubcategoryId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM subcategories WHERE uuid = ?1;",
            [id.to_string()],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                kind: EntityKind::SubCategory,
                id,
            });
        }

        Ok(())
    }

    fn count(&self) -> RepoResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM subcategories;", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

fn parse_subcategory_row(row: &Row<'_>) -> RepoResult<Subcategory> {
    let uuid_text: String = row.get("uuid")?;
    let category_text: String = row.get("category_uuid")?;
    Ok(Subcategory {
        uuid: parse_stored_uuid(&uuid_text, "subcategories.uuid")?,
        name: row.get("name")?,
        color_hex: row.get("color_hex")?,
        category_uuid: parse_stored_uuid(&category_text, "subcategories.category_uuid")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
