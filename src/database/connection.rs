/*!
 * SQLite handle shared by every store operation.
 *
 * Statements run on the blocking pool through `execute_async`. File-backed
 * stores set a busy timeout so a second process writing the same key waits
 * for the first writer's lock and then sees the conflict, instead of failing
 * with `SQLITE_BUSY`.
 */

use anyhow::{Context, Result};
use log::{debug, info};
use parking_lot::Mutex;
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use super::schema;
use crate::app_config::StoreConfig;

const DEFAULT_DB_FILENAME: &str = "hola.db";
const DEFAULT_DB_DIRNAME: &str = "hola";

/// Where the rows live
#[derive(Debug, Clone, PartialEq)]
enum Location {
    File(PathBuf),
    Memory,
}

/// Shared SQLite connection for the translation store
#[derive(Clone)]
pub struct DatabaseConnection {
    location: Location,
    connection: Arc<Mutex<Connection>>,
}

impl DatabaseConnection {
    /// Open the store described by `config`, the data directory when no path is set
    pub fn from_config(config: &StoreConfig) -> Result<Self> {
        let path = match &config.path {
            Some(path) => path.clone(),
            None => Self::default_database_path()?,
        };
        Self::open(path, config.busy_timeout())
    }

    /// Open a store file with the default busy timeout
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        Self::open(db_path, StoreConfig::default().busy_timeout())
    }

    /// Open a store file, creating it and its directory when missing
    pub fn open<P: AsRef<Path>>(db_path: P, busy_timeout: Duration) -> Result<Self> {
        let db_path = db_path.as_ref().to_path_buf();
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create store directory: {:?}", parent))?;
        }

        info!("Opening translation store at {:?}", db_path);
        let conn = Connection::open(&db_path)
            .with_context(|| format!("Failed to open translation store: {:?}", db_path))?;
        conn.busy_timeout(busy_timeout)
            .context("Failed to set store busy timeout")?;
        schema::initialize_schema(&conn)?;

        Ok(Self {
            location: Location::File(db_path),
            connection: Arc::new(Mutex::new(conn)),
        })
    }

    /// Private in-memory store
    pub fn new_in_memory() -> Result<Self> {
        debug!("Creating in-memory translation store");
        let conn = Connection::open_in_memory().context("Failed to create in-memory store")?;
        schema::initialize_schema(&conn)?;

        Ok(Self {
            location: Location::Memory,
            connection: Arc::new(Mutex::new(conn)),
        })
    }

    /// `<data dir>/hola/hola.db`
    pub fn default_database_path() -> Result<PathBuf> {
        let base_dir = dirs::data_local_dir()
            .or_else(dirs::data_dir)
            .or_else(|| dirs::home_dir().map(|h| h.join(".local").join("share")))
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;

        Ok(base_dir.join(DEFAULT_DB_DIRNAME).join(DEFAULT_DB_FILENAME))
    }

    /// Store file, `None` for in-memory stores
    pub fn path(&self) -> Option<&Path> {
        match &self.location {
            Location::File(path) => Some(path),
            Location::Memory => None,
        }
    }

    pub fn is_file_backed(&self) -> bool {
        matches!(self.location, Location::File(_))
    }

    /// Run `f` against the connection on the blocking pool
    pub async fn execute_async<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.connection.clone();

        tokio::task::spawn_blocking(move || f(&conn.lock()))
            .await
            .context("Store task panicked")?
    }

    /// Size of the store file in bytes, 0 for in-memory stores
    pub fn file_size(&self) -> u64 {
        self.path()
            .and_then(|path| std::fs::metadata(path).ok())
            .map_or(0, |m| m.len())
    }
}
