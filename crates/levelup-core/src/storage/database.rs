//! SQLite-based state storage.
//!
//! Provides persistent storage for:
//! - The serialized game state, keyed by namespace
//! - Arbitrary key-value application state

use std::path::{Path, PathBuf};

use rusqlite::{params, Connection};

use super::migrations;
use super::snapshot;
use super::StateStorage;
use crate::error::StorageError;
use crate::game::GameState;

/// File name of the database inside the data directory.
pub const DB_FILE_NAME: &str = "levelup.db";

/// SQLite database holding the `kv` table.
pub struct Database {
    conn: Connection,
    path: Option<PathBuf>,
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Location on disk, `None` for in-memory databases.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Open the database at `path`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path).map_err(|source| StorageError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self {
            conn,
            path: Some(path.to_path_buf()),
        };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory().map_err(|source| StorageError::OpenFailed {
            path: PathBuf::from(":memory:"),
            source,
        })?;
        let db = Self { conn, path: None };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), StorageError> {
        migrations::migrate(&self.conn).map_err(|e| StorageError::MigrationFailed(e.to_string()))
    }

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, rusqlite::Error> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)",
            params![key, value, chrono::Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    /// Remove a key from the kv store. Missing keys are not an error.
    pub fn kv_delete(&self, key: &str) -> Result<(), rusqlite::Error> {
        self.conn.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }
}

/// [`StateStorage`] backed by one row of the `kv` table.
pub struct SqliteStorage {
    db: Database,
    namespace: String,
}

impl SqliteStorage {
    pub fn new(db: Database, namespace: impl Into<String>) -> Self {
        Self {
            db,
            namespace: namespace.into(),
        }
    }

    /// In-memory database under the default namespace.
    pub fn in_memory() -> Result<Self, StorageError> {
        Ok(Self::new(Database::open_memory()?, super::DEFAULT_NAMESPACE))
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }
}

impl StateStorage for SqliteStorage {
    fn load(&self) -> Result<Option<GameState>, StorageError> {
        match self.db.kv_get(&self.namespace)? {
            Some(blob) => snapshot::decode(&blob).map(Some),
            None => Ok(None),
        }
    }

    fn save(&mut self, state: &GameState) -> Result<(), StorageError> {
        let blob = snapshot::encode(state)?;
        self.db.kv_set(&self.namespace, &blob)?;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        self.db.kv_delete(&self.namespace)?;
        Ok(())
    }
}
