mod config;
pub mod database;
mod file;
mod memory;
pub mod migrations;
pub mod snapshot;

pub use config::{Config, DashboardConfig, LogConfig, PlayerConfig, StorageBackend, StorageConfig};
pub use database::{Database, SqliteStorage};
pub use file::JsonFileStorage;
pub use memory::MemoryStorage;

use std::path::{Path, PathBuf};

use crate::error::StorageError;
use crate::game::GameState;

/// Namespace the state blob is stored under unless configured otherwise.
pub const DEFAULT_NAMESPACE: &str = "game-storage";

/// Durable home for the serialized game state.
///
/// Implementations store one blob; `save` replaces it wholesale.
pub trait StateStorage {
    /// Read the persisted state, or `None` if nothing was saved yet.
    fn load(&self) -> Result<Option<GameState>, StorageError>;

    /// Replace the persisted state.
    fn save(&mut self, state: &GameState) -> Result<(), StorageError>;

    /// Remove the persisted state.
    fn clear(&mut self) -> Result<(), StorageError>;
}

impl<T: StateStorage + ?Sized> StateStorage for Box<T> {
    fn load(&self) -> Result<Option<GameState>, StorageError> {
        (**self).load()
    }

    fn save(&mut self, state: &GameState) -> Result<(), StorageError> {
        (**self).save(state)
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        (**self).clear()
    }
}

/// Returns `~/.config/levelup[-dev]/`.
///
/// `LEVELUP_DATA_DIR` overrides the location entirely; otherwise
/// `LEVELUP_ENV=dev` selects the development directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let dir = match std::env::var_os("LEVELUP_DATA_DIR") {
        Some(custom) if !custom.is_empty() => PathBuf::from(custom),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("LEVELUP_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("levelup-dev")
            } else {
                base_dir.join("levelup")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Open the backend selected by `config` inside `dir`.
///
/// # Errors
/// Returns an error if the backend cannot be opened.
pub fn open_storage(config: &StorageConfig, dir: &Path) -> Result<Box<dyn StateStorage>, StorageError> {
    let storage: Box<dyn StateStorage> = match config.backend {
        StorageBackend::Sqlite => {
            let db = Database::open(&dir.join(database::DB_FILE_NAME))?;
            Box::new(SqliteStorage::new(db, &config.namespace))
        }
        StorageBackend::Json => Box::new(JsonFileStorage::new(
            dir.join(format!("{}.json", config.namespace)),
        )),
    };
    tracing::debug!(backend = ?config.backend, dir = %dir.display(), "opened state storage");
    Ok(storage)
}
