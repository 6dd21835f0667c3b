//! Game model: attributes, quests and the persisted game state.

mod attribute;
mod state;
mod task;

pub use attribute::{AttributeName, Attribute, Attributes, XpGain};
pub use state::{
    calendar_date, GameState, HistoryEntry, PlayerDefaults, DEFAULT_MAX_HP, DEFAULT_USER_NAME,
};
pub use task::{Difficulty, Task, TaskDraft, TaskId, TaskPatch, SECONDARY_XP_RATIO};
