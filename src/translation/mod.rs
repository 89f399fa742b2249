/*!
 * Translation lookup core.
 *
 * - `store`: the keyed store contract
 * - `memory`: in-memory store
 * - `extractor`: reads one translation off the remote page
 * - `coordinator`: owns the single browser session, one fetch at a time
 * - `service`: store lookup, then fetch, then save
 */

use serde::{Deserialize, Serialize};

use crate::errors::FetchError;

pub mod coordinator;
pub mod extractor;
pub mod memory;
pub mod service;
pub mod store;

pub use self::coordinator::{SessionCoordinator, SessionState, TranslationFetcher};
pub use self::extractor::Extractor;
pub use self::memory::MemoryStore;
pub use self::service::{ServiceStats, TranslationService};
pub use self::store::{SaveOutcome, TranslationEntry, TranslationStore};

/// Input to a single fetch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchRequest {
    /// Text to translate
    pub text: String,
    /// Groups related fetches, e.g. the paragraphs of one story
    pub context_title: Option<String>,
}

impl FetchRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            context_title: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.context_title = Some(title.into());
        self
    }
}

/// Translated text, never empty, or why there is none
pub type FetchResult = Result<String, FetchError>;

/// Truncate text to a maximum number of characters with ellipsis
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
