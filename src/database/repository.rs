/*!
 * SQLite-backed translation store.
 *
 * One row per source text. Inserts never overwrite: a conflicting save is
 * reported as `SaveOutcome::DuplicateKey` and the first row stays.
 */

use anyhow::Result;
use async_trait::async_trait;
use log::{debug, warn};
use rusqlite::{params, OptionalExtension};

use super::connection::DatabaseConnection;
use super::models::{StoreStats, TranslationRecord};
use crate::errors::StoreError;
use crate::translation::store::{SaveOutcome, TranslationStore};
use crate::translation::truncate_text;

/// Repository for database operations
#[derive(Clone)]
pub struct Repository {
    /// Database connection
    db: DatabaseConnection,
}

impl Repository {
    /// Create a new repository with the given database connection
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a repository with an in-memory database (for testing)
    pub fn new_in_memory() -> Result<Self> {
        let db = DatabaseConnection::new_in_memory()?;
        Ok(Self::new(db))
    }

    /// Get the underlying connection
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Get the translation for a source text
    pub async fn get_translation(&self, source_text: &str) -> Result<Option<String>> {
        let source_text = source_text.to_string();

        self.db
            .execute_async(move |conn| {
                let result = conn
                    .query_row(
                        "SELECT target_text FROM translations WHERE source_text = ?1",
                        [&source_text],
                        |row| row.get(0),
                    )
                    .optional()?;
                Ok(result)
            })
            .await
    }

    /// Get the full record for a source text
    pub async fn get_record(&self, source_text: &str) -> Result<Option<TranslationRecord>> {
        let source_text = source_text.to_string();

        self.db
            .execute_async(move |conn| {
                let result = conn
                    .query_row(
                        r#"
                        SELECT id, source_text, target_text, context_title, created_at
                        FROM translations WHERE source_text = ?1
                        "#,
                        [&source_text],
                        TranslationRecord::from_row,
                    )
                    .optional()?;
                Ok(result)
            })
            .await
    }

    /// Insert a record unless its source text is already stored.
    ///
    /// Returns `true` when the row was written.
    pub async fn insert_translation(&self, record: &TranslationRecord) -> Result<bool> {
        let record = record.clone();

        self.db
            .execute_async(move |conn| {
                let inserted = conn.execute(
                    r#"
                    INSERT INTO translations (source_text, target_text, context_title, created_at)
                    VALUES (?1, ?2, ?3, ?4)
                    ON CONFLICT(source_text) DO NOTHING
                    "#,
                    params![
                        record.source_text,
                        record.target_text,
                        record.context_title,
                        record.created_at,
                    ],
                )?;
                Ok(inserted == 1)
            })
            .await
    }

    /// All records created under a context title, oldest first
    pub async fn entries_for_title(&self, title: &str) -> Result<Vec<TranslationRecord>> {
        let title = title.to_string();

        self.db
            .execute_async(move |conn| {
                let mut stmt = conn.prepare(
                    r#"
                    SELECT id, source_text, target_text, context_title, created_at
                    FROM translations
                    WHERE context_title = ?1
                    ORDER BY id
                    "#,
                )?;

                let records = stmt
                    .query_map([&title], TranslationRecord::from_row)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(records)
            })
            .await
    }

    /// Get store statistics
    pub async fn stats(&self) -> Result<StoreStats> {
        let file_size_bytes = self.db.file_size();

        self.db
            .execute_async(move |conn| {
                let (total_entries, titled_entries, titles): (i64, i64, i64) = conn.query_row(
                    r#"
                    SELECT COUNT(*), COUNT(context_title), COUNT(DISTINCT context_title)
                    FROM translations
                    "#,
                    [],
                    |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
                )?;

                Ok(StoreStats {
                    total_entries,
                    titled_entries,
                    titles,
                    file_size_bytes,
                })
            })
            .await
    }
}

#[async_trait]
impl TranslationStore for Repository {
    async fn lookup(&self, source: &str) -> Result<Option<String>, StoreError> {
        let found = self.get_translation(source).await?;
        debug!(
            "Store {} for '{}'",
            if found.is_some() { "hit" } else { "miss" },
            truncate_text(source, 30)
        );
        Ok(found)
    }

    async fn save(
        &self,
        source: &str,
        target: &str,
        context_title: Option<&str>,
    ) -> Result<SaveOutcome, StoreError> {
        let record = TranslationRecord::new(
            source.to_string(),
            target.to_string(),
            context_title.map(str::to_string),
        );

        if self.insert_translation(&record).await? {
            debug!("Stored translation for '{}'", truncate_text(source, 30));
            Ok(SaveOutcome::Inserted)
        } else {
            warn!(
                "Translation for '{}' already stored, keeping the existing entry",
                truncate_text(source, 30)
            );
            Ok(SaveOutcome::DuplicateKey)
        }
    }
}
