use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use rusqlite::Connection;
use tracing::{info, warn};

use crate::config::{StoreConfig, DEFAULT_BUSY_TIMEOUT_MS};
use crate::error::StoreError;
use crate::schema;

/// Thread-safe SQLite connection wrapper.
/// Uses parking_lot::Mutex for synchronous access (rusqlite is not Sync).
/// The slot is emptied by [`Database::close`]; later calls see `Closed`.
pub struct Database {
    conn: Arc<Mutex<Option<Connection>>>,
    path: PathBuf,
}

impl Database {
    /// Open or create the database described by `config`.
    pub fn open(config: &StoreConfig) -> Result<Self, StoreError> {
        let path = config.database_path();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StoreError::init(&path, format!("create dir: {e}")))?;
        }

        let conn = Connection::open(&path).map_err(|e| StoreError::init(&path, e))?;
        initialize(&conn, config.busy_timeout_ms).map_err(|e| StoreError::init(&path, e))?;

        info!(path = %path.display(), "score database opened");

        Ok(Self {
            conn: Arc::new(Mutex::new(Some(conn))),
            path,
        })
    }

    /// Open an in-memory database (for testing).
    pub fn in_memory() -> Result<Self, StoreError> {
        let path = PathBuf::from(":memory:");
        let conn = Connection::open_in_memory().map_err(|e| StoreError::init(&path, e))?;
        initialize(&conn, DEFAULT_BUSY_TIMEOUT_MS).map_err(|e| StoreError::init(&path, e))?;

        Ok(Self {
            conn: Arc::new(Mutex::new(Some(conn))),
            path,
        })
    }

    /// Execute a closure with the database connection.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&Connection) -> Result<T, StoreError>,
    {
        let conn = self.conn.lock();
        match conn.as_ref() {
            Some(conn) => f(conn),
            None => Err(StoreError::Closed),
        }
    }

    /// Release the connection. Returns `false` if it was already released.
    pub fn close(&self) -> bool {
        let Some(conn) = self.conn.lock().take() else {
            return false;
        };
        if let Err((_, e)) = conn.close() {
            // The handle is dropped either way; nothing left to retry.
            warn!(path = %self.path.display(), error = %e, "score database closed uncleanly");
        } else {
            info!(path = %self.path.display(), "score database closed");
        }
        true
    }

    pub fn is_open(&self) -> bool {
        self.conn.lock().is_some()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
            path: self.path.clone(),
        }
    }
}

fn initialize(conn: &Connection, busy_timeout_ms: u32) -> Result<(), String> {
    conn.execute_batch(&schema::pragmas(busy_timeout_ms))
        .map_err(|e| format!("pragmas: {e}"))?;

    conn.execute_batch(schema::CREATE_TABLES)
        .map_err(|e| format!("schema: {e}"))?;

    // Set schema version if not present
    let version: Option<u32> = conn
        .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
            row.get(0)
        })
        .ok();

    if version.is_none() {
        conn.execute(
            "INSERT INTO schema_version (version) VALUES (?1)",
            [schema::SCHEMA_VERSION],
        )
        .map_err(|e| format!("schema version: {e}"))?;
    }

    Ok(())
}
