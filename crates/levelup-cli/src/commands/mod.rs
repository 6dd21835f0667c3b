//! Subcommand implementations. Every command prints pretty JSON on stdout.

pub mod attr;
pub mod config;
pub mod game;
pub mod player;
pub mod quest;

use std::path::PathBuf;

use levelup_core::error::Result;
use levelup_core::storage::{data_dir, open_storage};
use levelup_core::{Config, CoreError, Event, ProgressionStore};
use serde::Serialize;

pub type CliResult = Result<()>;

/// Data directory and config shared by all commands.
pub struct AppContext {
    pub data_dir: PathBuf,
    pub config: Config,
}

impl AppContext {
    pub fn load() -> Result<Self> {
        let data_dir = data_dir()?;
        let config = Config::load_from(&data_dir)?;
        Ok(Self { data_dir, config })
    }

    /// Like [`load`](Self::load), but a broken config file yields defaults.
    pub fn load_or_default() -> Result<Self> {
        let data_dir = data_dir()?;
        let config = Config::load_or_default(&data_dir);
        Ok(Self { data_dir, config })
    }

    /// Open the configured backend and rehydrate the store.
    pub fn open_store(&self) -> Result<ProgressionStore> {
        tracing::debug!(data_dir = %self.data_dir.display(), "opening progression store");
        let storage = open_storage(&self.config.storage, &self.data_dir)?;
        let store =
            ProgressionStore::open(storage, self.config.player_defaults(), Box::new(announce))?;
        Ok(store)
    }

    /// Open the store, starting fresh if the saved state is unreadable.
    pub fn open_store_or_reset(&self) -> Result<ProgressionStore> {
        let storage = open_storage(&self.config.storage, &self.data_dir)?;
        let store = ProgressionStore::open_or_reset(
            storage,
            self.config.player_defaults(),
            Box::new(announce),
        )?;
        Ok(store)
    }
}

fn announce(event: &Event) {
    match event {
        Event::LevelUp {
            attribute, level, ..
        } => eprintln!("LEVEL UP! {attribute} reached level {level}"),
        Event::DailyReset { reset_count, .. } if *reset_count > 0 => {
            eprintln!("A new day: {reset_count} daily quest(s) reopened")
        }
        _ => {}
    }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Surface any write failure before the process exits.
pub fn finish(store: &mut ProgressionStore) -> CliResult {
    store.flush()?;
    Ok(())
}

pub fn not_found(id: &str) -> CoreError {
    CoreError::Custom(format!("quest not found: {id}"))
}
