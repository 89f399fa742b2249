/*!
 * Translation service: the single entry point for lookups.
 *
 * Reads the store first and only fetches on a miss. Misses go through a
 * gate and re-check the store once inside it, so concurrent requests for
 * the same text wait for the first fetch instead of starting their own.
 */

use log::{debug, error, info, warn};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::errors::{FetchError, TranslationError};
use crate::translation::coordinator::TranslationFetcher;
use crate::translation::store::{SaveOutcome, TranslationStore};
use crate::translation::{truncate_text, FetchRequest};

/// Usage counters for one service instance
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServiceStats {
    /// Requests answered from the store
    pub hits: usize,
    /// Requests that needed a fetch
    pub misses: usize,
    /// Fetches that returned a translation
    pub fetches: usize,
    /// Fetches that failed
    pub failures: usize,
}

impl fmt::Display for ServiceStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Store hits: {}, misses: {} (fetched: {}, failed: {})",
            self.hits, self.misses, self.fetches, self.failures
        )
    }
}

#[derive(Default)]
struct Counters {
    hits: AtomicUsize,
    misses: AtomicUsize,
    fetches: AtomicUsize,
    failures: AtomicUsize,
}

/// Store-first translation lookup
pub struct TranslationService {
    store: Arc<dyn TranslationStore>,
    fetcher: Arc<dyn TranslationFetcher>,
    /// Held from the second store check until the result is saved
    miss_gate: Mutex<()>,
    counters: Counters,
}

impl TranslationService {
    pub fn new(store: Arc<dyn TranslationStore>, fetcher: Arc<dyn TranslationFetcher>) -> Self {
        Self {
            store,
            fetcher,
            miss_gate: Mutex::new(()),
            counters: Counters::default(),
        }
    }

    /// Translate `source`, from the store when possible
    pub async fn get_translation(&self, source: &str) -> Result<String, TranslationError> {
        self.translate(FetchRequest::new(source)).await
    }

    /// Translate a request that may carry a context title
    pub async fn translate(&self, request: FetchRequest) -> Result<String, TranslationError> {
        if request.text.trim().is_empty() {
            return Err(TranslationError::NoText);
        }

        if let Some(stored) = self.store.lookup(&request.text).await? {
            self.counters.hits.fetch_add(1, Ordering::Relaxed);
            debug!("Serving '{}' from store", truncate_text(&request.text, 30));
            return Ok(stored);
        }

        let _gate = self.miss_gate.lock().await;

        // Another caller may have stored it while we waited
        if let Some(stored) = self.store.lookup(&request.text).await? {
            self.counters.hits.fetch_add(1, Ordering::Relaxed);
            debug!("'{}' was stored while waiting", truncate_text(&request.text, 30));
            return Ok(stored);
        }

        self.counters.misses.fetch_add(1, Ordering::Relaxed);
        let translated = match self.fetcher.fetch_translation(request.clone()).await {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => {
                self.counters.failures.fetch_add(1, Ordering::Relaxed);
                warn!("Fetcher returned empty text for '{}'", truncate_text(&request.text, 30));
                return Err(TranslationError::UpstreamUnavailable(FetchError::Timeout));
            }
            Err(e) => {
                self.counters.failures.fetch_add(1, Ordering::Relaxed);
                return Err(TranslationError::UpstreamUnavailable(e));
            }
        };
        self.counters.fetches.fetch_add(1, Ordering::Relaxed);

        match self
            .store
            .save(&request.text, &translated, request.context_title.as_deref())
            .await
        {
            Ok(SaveOutcome::Inserted) => {
                info!(
                    "New translation: '{}' -> '{}'",
                    truncate_text(&request.text, 30),
                    truncate_text(&translated, 30)
                );
                Ok(translated)
            }
            Ok(SaveOutcome::DuplicateKey) => {
                // First writer wins; answer with what the store holds
                match self.store.lookup(&request.text).await {
                    Ok(Some(existing)) => Ok(existing),
                    Ok(None) => {
                        warn!(
                            "Stored entry for '{}' vanished after a duplicate save",
                            truncate_text(&request.text, 30)
                        );
                        Ok(translated)
                    }
                    Err(e) => {
                        warn!(
                            "Failed to re-read stored translation for '{}': {}",
                            truncate_text(&request.text, 30),
                            e
                        );
                        Ok(translated)
                    }
                }
            }
            Err(e) => {
                error!(
                    "Failed to store translation for '{}': {}",
                    truncate_text(&request.text, 30),
                    e
                );
                Ok(translated)
            }
        }
    }

    /// Snapshot of the usage counters
    pub fn stats(&self) -> ServiceStats {
        ServiceStats {
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            fetches: self.counters.fetches.load(Ordering::Relaxed),
            failures: self.counters.failures.load(Ordering::Relaxed),
        }
    }
}
