/*!
 * Database models for translation persistence.
 */

use serde::{Deserialize, Serialize};
use std::fmt;

/// A stored translation row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationRecord {
    /// Database ID
    pub id: i64,
    /// Source text, the unique key
    pub source_text: String,
    /// Translated text
    pub target_text: String,
    /// Title of the story or document the first fetch belonged to
    pub context_title: Option<String>,
    /// Creation timestamp (RFC 3339)
    pub created_at: String,
}

impl TranslationRecord {
    /// Create a new record, timestamped now
    pub fn new(source_text: String, target_text: String, context_title: Option<String>) -> Self {
        Self {
            id: 0, // Will be assigned by database
            source_text,
            target_text,
            context_title,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub(crate) fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            source_text: row.get(1)?,
            target_text: row.get(2)?,
            context_title: row.get(3)?,
            created_at: row.get(4)?,
        })
    }
}

/// Store statistics
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreStats {
    /// Number of stored translations
    pub total_entries: i64,
    /// Entries created under a context title
    pub titled_entries: i64,
    /// Distinct context titles
    pub titles: i64,
    /// Database file size in bytes
    pub file_size_bytes: u64,
}

impl fmt::Display for StoreStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Translations: {} ({} in {} titles), Size: {} KB",
            self.total_entries,
            self.titled_entries,
            self.titles,
            self.file_size_bytes / 1024
        )
    }
}
