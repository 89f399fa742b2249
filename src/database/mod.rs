/*!
 * Database module for persistent storage of translations.
 *
 * This module provides SQLite-based persistence for the translation store:
 * one row per distinct source text, enforced by a unique index, plus the
 * context title of the fetch that produced it.
 */

pub mod schema;
pub mod connection;
pub mod repository;
pub mod models;

// Re-export main types
pub use connection::DatabaseConnection;
pub use repository::Repository;
