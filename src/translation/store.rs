/*!
 * Translation store contract.
 *
 * A store maps source text to its translation. Keys are compared
 * byte-for-byte and each key is written at most once: the first save wins
 * and later saves for the same key report `SaveOutcome::DuplicateKey`.
 */

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::database::models::TranslationRecord;
use crate::errors::StoreError;

/// A stored translation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationEntry {
    /// Source text
    pub source: String,
    /// Translated text
    pub target: String,
}

impl TranslationEntry {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

impl From<TranslationRecord> for TranslationEntry {
    fn from(record: TranslationRecord) -> Self {
        Self {
            source: record.source_text,
            target: record.target_text,
        }
    }
}

/// Result of a save
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The entry was written
    Inserted,
    /// An entry for this source already existed and was left untouched
    DuplicateKey,
}

/// Keyed translation storage
#[async_trait]
pub trait TranslationStore: Send + Sync {
    /// Exact-match lookup, no side effects
    async fn lookup(&self, source: &str) -> Result<Option<String>, StoreError>;

    /// Insert a new entry unless one exists for `source`
    async fn save(
        &self,
        source: &str,
        target: &str,
        context_title: Option<&str>,
    ) -> Result<SaveOutcome, StoreError>;
}
