//! Category repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide stable CRUD APIs over `categories` storage.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths call `Category::validate()` before SQL mutations.
//! - Listing is deterministic: `name COLLATE NOCASE ASC, uuid ASC`.
//! - `delete` does not cascade; a category that still owns rows fails
//!   at the foreign-key layer.

use crate::model::category::{Category, CategoryId};
use crate::model::EntityKind;
use crate::repo::{ensure_connection_ready, parse_stored_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

const CATEGORY_SELECT_SQL: &str = "SELECT
    uuid,
    name,
    color_hex,
    created_at,
    updated_at
FROM categories";

/// Repository interface for category CRUD operations.
pub trait CategoryRepository {
    /// Persists one category and returns its stable id.
    fn create(&self, category: &Category) -> RepoResult<CategoryId>;
    /// Replaces name and color; `updated_at` is refreshed storage-side.
    fn update(&self, category: &Category) -> RepoResult<()>;
    /// Replaces only the color, leaving timestamps untouched.
    ///
    /// Import-path helper: matched categories adopt the document's
    /// color without counting as a user edit.
    fn set_color(&self, id: CategoryId, color_hex: &str) -> RepoResult<()>;
    /// Loads one category by id.
    fn get(&self, id: CategoryId) -> RepoResult<Option<Category>>;
    /// Finds one category by exact name.
    fn find_by_name(&self, name: &str) -> RepoResult<Option<Category>>;
    /// Lists all categories sorted by name.
    fn list(&self) -> RepoResult<Vec<Category>>;
    /// Deletes one category row. Callers must reparent or unlist
    /// dependent rows first.
    fn delete(&self, id: CategoryId) -> RepoResult<()>;
    /// Counts all categories.
    fn count(&self) -> RepoResult<u64>;
}

/// SQLite-backed category repository.
pub struct SqliteCategoryRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCategoryRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "categories")?;
        Ok(Self { conn })
    }
}

impl CategoryRepository for SqliteCategoryRepository<'_> {
    fn create(&self, category: &Category) -> RepoResult<CategoryId> {
        category.validate()?;

        self.conn.execute(
            "INSERT INTO categories (uuid, name, color_hex, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                category.uuid.to_string(),
                category.name.as_str(),
                category.color_hex.as_str(),
                category.created_at,
                category.updated_at,
            ],
        )?;

        Ok(category.uuid)
    }

    fn update(&self, category: &Category) -> RepoResult<()> {
        category.validate()?;

        let changed = self.conn.execute(
            "UPDATE categories
             SET
                name = ?2,
                color_hex = ?3,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            params![
                category.uuid.to_string(),
                category.name.as_str(),
                category.color_hex.as_str(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                kind: EntityKind::Category,
                id: category.uuid,
            });
        }

        Ok(())
    }

    fn set_color(&self, id: CategoryId, color_hex: &str) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE categories SET color_hex = ?2 WHERE uuid = ?1;",
            params![id.to_string(), color_hex],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                kind: EntityKind::Category,
                id,
            });
        }

        Ok(())
    }

    fn get(&self, id: CategoryId) -> RepoResult<Option<Category>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CATEGORY_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_category_row(row)?));
        }
        Ok(None)
    }

    fn find_by_name(&self, name: &str) -> RepoResult<Option<Category>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CATEGORY_SELECT_SQL} WHERE name = ?1 LIMIT 1;"))?;
        let mut rows = stmt.query([name])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_category_row(row)?));
        }
        Ok(None)
    }

    fn list(&self) -> RepoResult<Vec<Category>> {
        let mut stmt = self.conn.prepare(&format!(
            "{CATEGORY_SELECT_SQL} ORDER BY name COLLATE NOCASE ASC, uuid ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut categories = Vec::new();
        while let Some(row) = rows.next()? {
            categories.push(parse_category_row(row)?);
        }
        Ok(categories)
    }

    fn delete(&self, id: CategoryId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM categories WHERE uuid = ?1;", [id.to_string()])?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                kind: EntityKind::Category,
                id,
            });
        }

        Ok(())
    }

    fn count(&self) -> RepoResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM categories;", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

fn parse_category_row(row: &Row<'_>) -> RepoResult<Category> {
    let uuid_text: String = row.get("uuid")?;
    Ok(Category {
        uuid: parse_stored_uuid(&uuid_text, "categories.uuid")?,
        name: row.get("name")?,
        color_hex: row.get("color_hex")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
