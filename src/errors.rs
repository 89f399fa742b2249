/*!
 * Error types for the hola application.
 *
 * This module contains custom error types for the different layers of the
 * lookup path, using the thiserror crate for ergonomic error definitions:
 * - `FetchError`: failures while driving an automation session
 * - `StoreError`: genuine persistence failures
 * - `TranslationError`: what callers of the translation service observe
 * - `AppError`: top-level wrapper for the binary
 */

use thiserror::Error;

/// Errors that can occur while fetching a translation from the remote page
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The output surface never showed any content before the deadline
    #[error("Timed out waiting for translated text")]
    Timeout,

    /// A structural locator did not resolve to any element
    #[error("Page element not found: {0}")]
    ElementNotFound(String),

    /// The automation session could not be started or driven
    #[error("Session error: {0}")]
    Session(String),
}

/// Errors raised by a translation store
///
/// Duplicate keys are not errors; see `SaveOutcome::DuplicateKey`.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The persistence layer failed
    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<anyhow::Error> for StoreError {
    fn from(error: anyhow::Error) -> Self {
        Self::Storage(format!("{:#}", error))
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(error: rusqlite::Error) -> Self {
        Self::Storage(error.to_string())
    }
}

/// Errors returned by the translation service
#[derive(Error, Debug)]
pub enum TranslationError {
    /// The request carried no text to translate
    #[error("No text to translate")]
    NoText,

    /// The remote translation page could not produce a result
    #[error("Translation upstream unavailable: {0}")]
    UpstreamUnavailable(#[from] FetchError),

    /// The store failed for a reason other than a duplicate key
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl TranslationError {
    /// Whether the caller, rather than the system, is at fault
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::NoText)
    }

    /// HTTP-equivalent status code for an API boundary
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NoText => 400,
            Self::UpstreamUnavailable(_) => 503,
            Self::Store(_) => 500,
        }
    }
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Invalid or unreadable configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from the translation service
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    /// Error from the store
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl AppError {
    /// Process exit code: 2 for caller mistakes, 1 for everything else
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Translation(e) if e.is_client_error() => 2,
            _ => 1,
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
