use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::game::{AttributeName, TaskId};

/// Every state change in the store produces an Event.
/// Feedback sinks (haptics, confetti, terminal banners) subscribe to them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TaskAdded {
        task_id: TaskId,
        at: DateTime<Utc>,
    },
    TaskUpdated {
        task_id: TaskId,
        at: DateTime<Utc>,
    },
    TaskCompleted {
        task_id: TaskId,
        xp_gained: u64,
        level_up: bool,
        at: DateTime<Utc>,
    },
    /// One per attribute whose level rose during a completion.
    LevelUp {
        attribute: AttributeName,
        level: u32,
        at: DateTime<Utc>,
    },
    TaskUncompleted {
        task_id: TaskId,
        at: DateTime<Utc>,
    },
    TaskDeleted {
        task_id: TaskId,
        at: DateTime<Utc>,
    },
    PlayerDamaged {
        amount: u32,
        hp: u32,
        at: DateTime<Utc>,
    },
    PlayerHealed {
        amount: u32,
        hp: u32,
        at: DateTime<Utc>,
    },
    /// Calendar date changed; daily quests were reopened.
    DailyReset {
        reset_count: usize,
        at: DateTime<Utc>,
    },
    UserRenamed {
        user_name: String,
        at: DateTime<Utc>,
    },
    GameReset {
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn at(&self) -> DateTime<Utc> {
        match self {
            Event::TaskAdded { at, .. }
            | Event::TaskUpdated { at, .. }
            | Event::TaskCompleted { at, .. }
            | Event::LevelUp { at, .. }
            | Event::TaskUncompleted { at, .. }
            | Event::TaskDeleted { at, .. }
            | Event::PlayerDamaged { at, .. }
            | Event::PlayerHealed { at, .. }
            | Event::DailyReset { at, .. }
            | Event::UserRenamed { at, .. }
            | Event::GameReset { at } => *at,
        }
    }

    pub fn is_level_up(&self) -> bool {
        matches!(self, Event::LevelUp { .. })
    }
}
