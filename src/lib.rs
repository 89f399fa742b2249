/*!
 * # Hola - cached Spanish to English translation lookup
 *
 * A Rust library that answers "what is the translation of this text?" from a
 * local store when it can, and otherwise reads the answer off a remote
 * translation web page through an automated browser session.
 *
 * ## Features
 *
 * - Store-first lookup: each distinct source text is fetched at most once
 * - Single browser session at a time, started lazily and always closed
 * - Bounded polling of the page's output with a configurable deadline
 * - SQLite persistence, or an in-memory store for ephemeral runs
 * - Paragraph files translated under a story title, with bilingual transcripts
 *
 * ## Architecture
 *
 * - `app_config`: Configuration management
 * - `browser`: Browser session seam and its WebDriver backend
 * - `database`: SQLite translation store
 * - `translation`: Lookup core:
 *   - `translation::store`: Store contract and in-memory store
 *   - `translation::extractor`: Reads one translation off the page
 *   - `translation::coordinator`: One fetch, one session, at a time
 *   - `translation::service`: Lookup, fetch, save
 * - `transcript`: Bilingual story transcripts
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
 * - `language_utils`: ISO language code utilities
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod browser;
pub mod database;
pub mod errors;
pub mod file_utils;
pub mod language_utils;
pub mod transcript;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::{Controller, FileReport, StoreBackend};
pub use errors::{AppError, FetchError, StoreError, TranslationError};
pub use language_utils::{get_language_name, language_codes_match};
pub use translation::{FetchRequest, FetchResult, SaveOutcome, TranslationService, TranslationStore};
