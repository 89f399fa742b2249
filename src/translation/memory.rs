/*!
 * Process-local translation store.
 *
 * Keeps entries in memory behind a read-write lock. Used for ephemeral
 * runs and as the store in tests; nothing survives the process.
 */

use async_trait::async_trait;
use log::debug;
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::database::models::StoreStats;
use crate::errors::StoreError;
use crate::translation::store::{SaveOutcome, TranslationEntry, TranslationStore};
use crate::translation::truncate_text;

/// Stored value with the title it was saved under
#[derive(Debug, Clone)]
struct MemoryRecord {
    target: String,
    context_title: Option<String>,
    /// Insertion order
    seq: usize,
}

/// In-memory translation store
#[derive(Clone, Default)]
pub struct MemoryStore {
    /// Entries keyed by source text
    entries: Arc<RwLock<HashMap<String, MemoryRecord>>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-filled with entries
    pub fn with_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = TranslationEntry>,
    {
        let map = entries
            .into_iter()
            .enumerate()
            .map(|(seq, e)| {
                (
                    e.source,
                    MemoryRecord {
                        target: e.target,
                        context_title: None,
                        seq,
                    },
                )
            })
            .collect();
        Self {
            entries: Arc::new(RwLock::new(map)),
        }
    }

    /// Get the number of entries in the store
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Title the entry for `source` was saved under
    pub fn context_title(&self, source: &str) -> Option<String> {
        self.entries
            .read()
            .get(source)
            .and_then(|r| r.context_title.clone())
    }

    /// Entries saved under `title`, oldest first
    pub fn entries_for_title(&self, title: &str) -> Vec<TranslationEntry> {
        let entries = self.entries.read();
        let mut matching: Vec<(&String, &MemoryRecord)> = entries
            .iter()
            .filter(|(_, r)| r.context_title.as_deref() == Some(title))
            .collect();
        matching.sort_by_key(|(_, r)| r.seq);
        matching
            .into_iter()
            .map(|(source, r)| TranslationEntry::new(source.clone(), r.target.clone()))
            .collect()
    }

    /// Entry and title counts
    pub fn stats(&self) -> StoreStats {
        let entries = self.entries.read();
        let titles: HashSet<&str> = entries
            .values()
            .filter_map(|r| r.context_title.as_deref())
            .collect();
        let titled = entries.values().filter(|r| r.context_title.is_some()).count();

        StoreStats {
            total_entries: entries.len() as i64,
            titled_entries: titled as i64,
            titles: titles.len() as i64,
            file_size_bytes: 0,
        }
    }
}

#[async_trait]
impl TranslationStore for MemoryStore {
    async fn lookup(&self, source: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.read().get(source).map(|r| r.target.clone()))
    }

    async fn save(
        &self,
        source: &str,
        target: &str,
        context_title: Option<&str>,
    ) -> Result<SaveOutcome, StoreError> {
        let mut entries = self.entries.write();
        if entries.contains_key(source) {
            debug!("Translation for '{}' already in memory", truncate_text(source, 30));
            return Ok(SaveOutcome::DuplicateKey);
        }

        let seq = entries.len();
        entries.insert(
            source.to_string(),
            MemoryRecord {
                target: target.to_string(),
                context_title: context_title.map(str::to_string),
                seq,
            },
        );
        Ok(SaveOutcome::Inserted)
    }
}
