//! Note filter and sort specifications.
//!
//! # Responsibility
//! - Describe UI selection state (scope, search text, sort) as a typed
//!   query value.
//! - Build the SQL fragments the note repository binds and executes.
//!
//! # Invariants
//! - All filter parts combine with logical AND.
//! - Search matches title OR content, case-insensitively, and is
//!   ignored when blank.
//! - Result ordering is deterministic: the chosen sort key plus a
//!   `uuid ASC` tiebreak.

use crate::model::category::CategoryId;
use crate::model::subcategory::SubcategoryId;
use rusqlite::types::Value;

/// Which slice of the note collection a query targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoteScope {
    /// Every note, listed or not.
    #[default]
    All,
    /// Direct notes of one category (notes filed under one of its
    /// subcategories are excluded).
    Category(CategoryId),
    /// Notes of one subcategory.
    Subcategory(SubcategoryId),
    /// Notes with no category link.
    Unlisted,
}

/// Single-key sort field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoteSortKey {
    Title,
    Content,
    CreatedAt,
    #[default]
    UpdatedAt,
}

/// Sort direction, independent of the sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}

/// Composite note query built from independently-optional inputs.
///
/// The default is the main list view: all notes, no search, most
/// recently updated first.
#[derive(Debug, Clone, Default)]
pub struct NoteQuery {
    pub scope: NoteScope,
    /// Substring filter over title OR content; blank means "off".
    pub search: Option<String>,
    pub sort_key: NoteSortKey,
    pub direction: SortDirection,
}

impl NoteQuery {
    /// Query for one scope with the default sort.
    pub fn scoped(scope: NoteScope) -> Self {
        Self {
            scope,
            ..Self::default()
        }
    }

    /// Returns the query with a search filter applied.
    pub fn with_search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }
}

/// Builds the WHERE clause and bind values for one query.
///
/// The returned fragment always starts with `WHERE` and is safe to
/// append to a `SELECT ... FROM notes` statement.
pub(crate) fn build_where_clause(query: &NoteQuery) -> (String, Vec<Value>) {
    let mut sql = String::from("WHERE 1 = 1");
    let mut bind_values: Vec<Value> = Vec::new();

    match query.scope {
        NoteScope::All => {}
        NoteScope::Category(category_uuid) => {
            sql.push_str(" AND category_uuid = ? AND subcategory_uuid IS NULL");
            bind_values.push(Value::Text(category_uuid.to_string()));
        }
        NoteScope::Subcategory(subcategory_uuid) => {
            sql.push_str(" AND subcategory_uuid = ?");
            bind_values.push(Value::Text(subcategory_uuid.to_string()));
        }
        NoteScope::Unlisted => {
            sql.push_str(" AND category_uuid IS NULL");
        }
    }

    // LIKE is case-insensitive for ASCII in SQLite, which matches the
    // search contract.
    if let Some(pattern) = search_pattern(query.search.as_deref()) {
        sql.push_str(" AND (title LIKE ? ESCAPE '\\' OR content LIKE ? ESCAPE '\\')");
        bind_values.push(Value::Text(pattern.clone()));
        bind_values.push(Value::Text(pattern));
    }

    (sql, bind_values)
}

/// Builds the ORDER BY clause for one query.
pub(crate) fn build_order_clause(query: &NoteQuery) -> String {
    let column = match query.sort_key {
        NoteSortKey::Title => "title COLLATE NOCASE",
        NoteSortKey::Content => "content COLLATE NOCASE",
        NoteSortKey::CreatedAt => "created_at",
        NoteSortKey::UpdatedAt => "updated_at",
    };
    let direction = match query.direction {
        SortDirection::Ascending => "ASC",
        SortDirection::Descending => "DESC",
    };
    format!("ORDER BY {column} {direction}, uuid ASC")
}

/// Turns search text into a `%...%` LIKE pattern, or `None` when the
/// text is blank after trimming.
fn search_pattern(search: Option<&str>) -> Option<String> {
    let text = search?.trim();
    if text.is_empty() {
        return None;
    }
    Some(format!("%{}%", escape_like(text)))
}

/// Escapes LIKE metacharacters so user text matches literally.
fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
