//! # LevelUp Core Library
//!
//! Core logic for a gamified productivity tracker: quests award XP to five
//! life attributes, attributes level up on a fixed curve, the player has hp,
//! and daily quests reopen every calendar day.
//!
//! The `levelup` CLI binary is a thin layer over this crate; any other shell
//! (mobile, desktop) drives the same [`ProgressionStore`].
//!
//! ## Architecture
//!
//! - **Leveling**: pure XP/level curve functions
//! - **Game**: attributes, quests and the serializable game state
//! - **Store**: the single mutable owner of the state, emitting [`Event`]s
//!   to a [`FeedbackSink`] and writing through a [`StateStorage`]
//! - **Storage**: SQLite, JSON file and in-memory backends plus TOML
//!   configuration

pub mod error;
pub mod events;
pub mod feedback;
pub mod game;
pub mod leveling;
pub mod storage;
pub mod store;

pub use error::{ConfigError, CoreError, StorageError, ValidationError};
pub use events::Event;
pub use feedback::{FeedbackSink, NoopFeedback, RecordingFeedback};
pub use game::{
    Attribute, AttributeName, Attributes, Difficulty, GameState, HistoryEntry, PlayerDefaults,
    Task, TaskDraft, TaskId, TaskPatch, XpGain,
};
pub use leveling::{level_from_xp, progress_to_next_level, total_xp_for_level, Progress};
pub use storage::{Config, Database, JsonFileStorage, MemoryStorage, SqliteStorage, StateStorage};
pub use store::{CompletionOutcome, DailyReset, ProgressionStore};
