//! Aggregate game state as persisted.

use chrono::serde::ts_milliseconds;
use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{Attribute, AttributeName, Attributes, Task};

pub const DEFAULT_USER_NAME: &str = "Hunter";
pub const DEFAULT_MAX_HP: u32 = 100;

/// Local calendar date of `at`; daily quests roll over on this boundary.
pub fn calendar_date(at: DateTime<Utc>) -> NaiveDate {
    at.with_timezone(&Local).date_naive()
}

/// Values a new or reset game starts from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerDefaults {
    pub user_name: String,
    pub max_hp: u32,
}

impl Default for PlayerDefaults {
    fn default() -> Self {
        Self {
            user_name: DEFAULT_USER_NAME.to_string(),
            max_hp: DEFAULT_MAX_HP,
        }
    }
}

/// XP earned on one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub date: NaiveDate,
    pub xp_gained: u64,
}

/// Everything the progression store owns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub(crate) attributes: Attributes,
    pub(crate) hp: u32,
    pub(crate) max_hp: u32,
    pub(crate) user_name: String,
    /// Newest first
    #[serde(default)]
    pub(crate) tasks: Vec<Task>,
    #[serde(default)]
    pub(crate) history: Vec<HistoryEntry>,
    #[serde(with = "ts_milliseconds")]
    pub(crate) last_login: DateTime<Utc>,
}

impl GameState {
    /// Fresh game: every attribute at level 1, full hp, no quests.
    pub fn initial(defaults: &PlayerDefaults, now: DateTime<Utc>) -> Self {
        Self {
            attributes: Attributes::new(),
            hp: defaults.max_hp,
            max_hp: defaults.max_hp,
            user_name: defaults.user_name.clone(),
            tasks: Vec::new(),
            history: Vec::new(),
            last_login: now,
        }
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn attribute(&self, name: AttributeName) -> &Attribute {
        self.attributes.get(name)
    }

    pub fn hp(&self) -> u32 {
        self.hp
    }

    pub fn max_hp(&self) -> u32 {
        self.max_hp
    }

    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn last_login(&self) -> DateTime<Utc> {
        self.last_login
    }

    /// Quests not yet completed, newest first.
    pub fn active_tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter().filter(|t| !t.completed)
    }

    pub fn completed_tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter().filter(|t| t.completed)
    }

    /// The first `limit` active quests, as shown on the dashboard.
    pub fn dashboard_tasks(&self, limit: usize) -> Vec<&Task> {
        self.active_tasks().take(limit).collect()
    }

    /// Radar chart ceiling: the highest attribute level, but at least `min_scale`.
    pub fn chart_scale(&self, min_scale: u32) -> u32 {
        self.attributes.max_level().max(min_scale)
    }

    pub(crate) fn task_index(&self, id: &str) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == id)
    }

    /// Add `xp` to the history entry for `date`, creating it if needed.
    pub(crate) fn record_xp(&mut self, date: NaiveDate, xp: u64) {
        match self.history.iter_mut().find(|entry| entry.date == date) {
            Some(entry) => entry.xp_gained = entry.xp_gained.saturating_add(xp),
            None => self.history.push(HistoryEntry {
                date,
                xp_gained: xp,
            }),
        }
    }

    /// Repair invariants on state read from storage.
    ///
    /// Recomputes attribute levels from XP and clamps `hp` into `[0, max_hp]`.
    /// Returns the number of repaired fields.
    pub(crate) fn normalize(&mut self) -> usize {
        let mut repaired = self.attributes.normalize();
        if self.hp > self.max_hp {
            self.hp = self.max_hp;
            repaired += 1;
        }
        repaired
    }
}
