//! Import/export of the full entity graph as one JSON document.
//!
//! # Responsibility
//! - Define the tree-shaped wire document (camelCase keys, ISO-8601
//!   dates, max nesting category -> subcategory).
//! - Convert between epoch-ms storage timestamps and wire strings.
//!
//! # Invariants
//! - Wire dates are ISO-8601/RFC-3339 UTC strings.
//! - Document fields other than `categories` are lenient: missing
//!   per-record fields default instead of failing the whole import.

use crate::model::now_ms;
use chrono::{DateTime, Local, SecondsFormat};
use serde::{Deserialize, Serialize};

pub mod export;
pub mod import;

pub use export::{export_document, export_to_file, export_to_string, ExportError};
pub use import::{import_document, import_from_file, ImportError, ImportSummary};

/// Top-level export/import document.
///
/// `categories` is mandatory: a document without it is not a notes
/// export and is rejected before any mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    #[serde(default)]
    pub export_date: Option<String>,
    pub categories: Vec<CategoryEntry>,
    #[serde(default)]
    pub unlisted_notes: Vec<NoteEntry>,
}

/// One category with its direct notes and subcategories.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryEntry {
    #[serde(default)]
    pub id: Option<String>,
    /// Mandatory on import; entries without a name are skipped.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub color_hex: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub notes: Vec<NoteEntry>,
    #[serde(default)]
    pub subcategories: Vec<SubcategoryEntry>,
}

/// One subcategory with its notes. Subcategories do not nest further.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubcategoryEntry {
    #[serde(default)]
    pub id: Option<String>,
    /// Mandatory on import; entries without a name are skipped.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub color_hex: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub notes: Vec<NoteEntry>,
}

/// One note entry; links are implied by document position.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteEntry {
    #[serde(default)]
    pub id: Option<String>,
    /// Mandatory on import; entries without a title are skipped.
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Formats an epoch-ms timestamp as an ISO-8601 UTC string.
pub(crate) fn format_timestamp(epoch_ms: i64) -> String {
    DateTime::from_timestamp_millis(epoch_ms)
        .unwrap_or_default()
        .to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parses a wire date; `None` (absent or unparsable) means "use now".
pub(crate) fn parse_timestamp(value: Option<&str>) -> i64 {
    value
        .and_then(|text| DateTime::parse_from_rfc3339(text).ok())
        .map(|parsed| parsed.timestamp_millis())
        .unwrap_or_else(now_ms)
}

/// Default export filename: `NotesExport_<yyyyMMdd_HHmmss>.json`.
pub fn default_export_filename(now: DateTime<Local>) -> String {
    now.format("NotesExport_%Y%m%d_%H%M%S.json").to_string()
}

/// Current local time, for [`default_export_filename`] callers that do
/// not use `chrono` themselves.
pub fn local_now() -> DateTime<Local> {
    Local::now()
}

#[cfg(test)]
mod tests {
    use super::{default_export_filename, format_timestamp, parse_timestamp};
    use chrono::{Local, TimeZone};

    #[test]
    fn timestamps_round_trip_through_wire_format() {
        let wire = format_timestamp(1_700_000_000_000);
        assert_eq!(wire, "2023-11-14T22:13:20Z");
        assert_eq!(parse_timestamp(Some(wire.as_str())), 1_700_000_000_000);
    }

    #[test]
    fn unparsable_wire_date_defaults_to_now() {
        let before = crate::model::now_ms();
        let parsed = parse_timestamp(Some("last tuesday"));
        assert!(parsed >= before);
    }

    #[test]
    fn export_filename_matches_pattern() {
        let now = Local.with_ymd_and_hms(2026, 8, 7, 9, 30, 5).unwrap();
        assert_eq!(
            default_export_filename(now),
            "NotesExport_20260807_093005.json"
        );
    }
}
