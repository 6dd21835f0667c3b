//! Quest (task) types.

use chrono::serde::{ts_milliseconds, ts_milliseconds_option};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::AttributeName;
use crate::error::ValidationError;

/// Share of the primary reward granted to the secondary attribute.
pub const SECONDARY_XP_RATIO: f64 = 0.5;

/// Unique quest identifier (UUID v4 string).
pub type TaskId = String;

/// Quest difficulty; determines the XP reward.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Trivial,
    #[default]
    Easy,
    Medium,
    Hard,
    Epic,
}

impl Difficulty {
    pub const ALL: [Difficulty; 5] = [
        Difficulty::Trivial,
        Difficulty::Easy,
        Difficulty::Medium,
        Difficulty::Hard,
        Difficulty::Epic,
    ];

    /// XP granted to the primary attribute on completion.
    pub fn xp_reward(&self) -> u64 {
        match self {
            Difficulty::Trivial => 50,
            Difficulty::Easy => 100,
            Difficulty::Medium => 250,
            Difficulty::Hard => 500,
            Difficulty::Epic => 1000,
        }
    }

    /// XP granted to the secondary attribute: `floor(reward * 0.5)`.
    pub fn secondary_xp_reward(&self) -> u64 {
        (self.xp_reward() as f64 * SECONDARY_XP_RATIO).floor() as u64
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Trivial => "trivial",
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
            Difficulty::Epic => "epic",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Difficulty::ALL
            .into_iter()
            .find(|d| d.as_str() == normalized)
            .ok_or_else(|| ValidationError::InvalidValue {
                field: "difficulty".to_string(),
                message: format!("unknown difficulty '{s}'; expected trivial|easy|medium|hard|epic"),
            })
    }
}

/// A user-defined quest.
///
/// Timestamps are persisted as epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique identifier
    pub id: TaskId,
    /// Quest title
    pub title: String,
    /// Optional free-form notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub difficulty: Difficulty,
    /// Primary attribute receiving the full reward
    pub attribute: AttributeName,
    /// Optional secondary attribute receiving half the reward
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute_secondary: Option<AttributeName>,
    pub completed: bool,
    /// Daily quests revert to incomplete when the calendar date changes
    #[serde(default)]
    pub is_daily: bool,
    #[serde(with = "ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(
        default,
        with = "ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    pub(crate) fn from_draft(draft: TaskDraft, id: TaskId, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: draft.title,
            description: draft.description,
            difficulty: draft.difficulty,
            attribute: draft.attribute,
            attribute_secondary: draft.attribute_secondary,
            completed: false,
            is_daily: draft.is_daily,
            created_at: now,
            completed_at: None,
        }
    }

    /// XP this quest awards across all of its attributes.
    ///
    /// A secondary equal to the primary still earns its half on top.
    pub fn total_reward(&self) -> u64 {
        let secondary = if self.attribute_secondary.is_some() {
            self.difficulty.secondary_xp_reward()
        } else {
            0
        };
        self.difficulty.xp_reward() + secondary
    }
}

/// Payload for creating a quest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDraft {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub difficulty: Difficulty,
    pub attribute: AttributeName,
    #[serde(default)]
    pub attribute_secondary: Option<AttributeName>,
    #[serde(default)]
    pub is_daily: bool,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>, difficulty: Difficulty, attribute: AttributeName) -> Self {
        Self {
            title: title.into(),
            description: None,
            difficulty,
            attribute,
            attribute_secondary: None,
            is_daily: false,
        }
    }

    pub fn with_secondary(mut self, secondary: AttributeName) -> Self {
        self.attribute_secondary = Some(secondary);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn daily(mut self, is_daily: bool) -> Self {
        self.is_daily = is_daily;
        self
    }

    /// Input checks for front ends. The store itself accepts any draft.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        Ok(())
    }
}

/// Partial update for an existing quest.
///
/// `None` leaves the field as is. Completion state is not patchable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    #[serde(default)]
    pub title: Option<String>,
    /// `Some(None)` clears the description
    #[serde(default)]
    pub description: Option<Option<String>>,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    #[serde(default)]
    pub attribute: Option<AttributeName>,
    /// `Some(None)` clears the secondary attribute
    #[serde(default)]
    pub attribute_secondary: Option<Option<AttributeName>>,
    #[serde(default)]
    pub is_daily: Option<bool>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self == &TaskPatch::default()
    }

    /// Merge into `task`. Returns `true` if any field changed.
    pub(crate) fn apply(&self, task: &mut Task) -> bool {
        let before = task.clone();
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(description) = &self.description {
            task.description = description.clone();
        }
        if let Some(difficulty) = self.difficulty {
            task.difficulty = difficulty;
        }
        if let Some(attribute) = self.attribute {
            task.attribute = attribute;
        }
        if let Some(secondary) = self.attribute_secondary {
            task.attribute_secondary = secondary;
        }
        if let Some(is_daily) = self.is_daily {
            task.is_daily = is_daily;
        }
        *task != before
    }
}
