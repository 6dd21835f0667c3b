//! Progression store: the single owner of game state.
//!
//! Every mutation is applied in memory first, then announced to the feedback
//! sink, then written through the configured [`StateStorage`]. Persistence
//! failures never roll back in-memory state; they are logged and kept for
//! [`ProgressionStore::take_persist_error`].
//!
//! Lookups by id that miss are silent no-ops.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::StorageError;
use crate::events::Event;
use crate::feedback::{FeedbackSink, NoopFeedback};
use crate::game::{
    calendar_date, Attribute, AttributeName, Attributes, GameState, HistoryEntry, PlayerDefaults,
    Task, TaskDraft, TaskId, TaskPatch, XpGain,
};
use crate::leveling::Progress;
use crate::storage::{MemoryStorage, StateStorage};

/// Result of [`ProgressionStore::complete_task`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionOutcome {
    /// Any awarded attribute crossed a level threshold
    pub level_up: bool,
    /// Per-attribute awards; empty when nothing happened
    pub awards: Vec<XpGain>,
}

impl CompletionOutcome {
    pub fn xp_gained(&self) -> u64 {
        self.awards.iter().map(|a| a.xp).sum()
    }
}

/// Result of [`ProgressionStore::check_daily_reset`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyReset {
    /// The calendar date changed since the last login
    pub rolled_over: bool,
    /// Daily quests that were reopened
    pub reset_count: usize,
}

pub struct ProgressionStore {
    state: GameState,
    defaults: PlayerDefaults,
    storage: Box<dyn StateStorage>,
    feedback: Box<dyn FeedbackSink>,
    persist_error: Option<StorageError>,
    opening_reset: DailyReset,
}

impl ProgressionStore {
    /// Rehydrate from `storage`, or start a fresh game if it is empty.
    ///
    /// Runs the daily reset check right after loading.
    ///
    /// # Errors
    /// Returns an error if the stored blob cannot be read or decoded.
    pub fn open(
        storage: Box<dyn StateStorage>,
        defaults: PlayerDefaults,
        feedback: Box<dyn FeedbackSink>,
    ) -> Result<Self, StorageError> {
        Self::open_at(storage, defaults, feedback, Utc::now())
    }

    /// [`open`](Self::open) with an explicit clock reading.
    pub fn open_at(
        storage: Box<dyn StateStorage>,
        defaults: PlayerDefaults,
        feedback: Box<dyn FeedbackSink>,
        now: DateTime<Utc>,
    ) -> Result<Self, StorageError> {
        let loaded = storage.load()?;
        Ok(Self::assemble(loaded, storage, defaults, feedback, now))
    }

    /// Like [`open`](Self::open), but an unreadable blob is discarded and the
    /// game starts fresh instead of failing.
    ///
    /// # Errors
    /// Returns an error if the backend itself fails, or if the unreadable blob
    /// cannot be removed.
    pub fn open_or_reset(
        storage: Box<dyn StateStorage>,
        defaults: PlayerDefaults,
        feedback: Box<dyn FeedbackSink>,
    ) -> Result<Self, StorageError> {
        Self::open_or_reset_at(storage, defaults, feedback, Utc::now())
    }

    pub fn open_or_reset_at(
        mut storage: Box<dyn StateStorage>,
        defaults: PlayerDefaults,
        feedback: Box<dyn FeedbackSink>,
        now: DateTime<Utc>,
    ) -> Result<Self, StorageError> {
        let loaded = match storage.load() {
            Ok(loaded) => loaded,
            Err(err @ (StorageError::Corrupt(_) | StorageError::UnsupportedVersion { .. })) => {
                tracing::warn!(error = %err, "discarding unreadable game state");
                storage.clear()?;
                None
            }
            Err(err) => return Err(err),
        };
        Ok(Self::assemble(loaded, storage, defaults, feedback, now))
    }

    fn assemble(
        loaded: Option<GameState>,
        storage: Box<dyn StateStorage>,
        defaults: PlayerDefaults,
        feedback: Box<dyn FeedbackSink>,
        now: DateTime<Utc>,
    ) -> Self {
        let state = match loaded {
            Some(state) => {
                tracing::debug!(
                    tasks = state.tasks().len(),
                    user = state.user_name(),
                    "rehydrated game state"
                );
                state
            }
            None => {
                tracing::info!("no saved game found, starting fresh");
                GameState::initial(&defaults, now)
            }
        };

        let mut store = Self {
            state,
            defaults,
            storage,
            feedback,
            persist_error: None,
            opening_reset: DailyReset::default(),
        };
        store.opening_reset = store.check_daily_reset_at(now);
        store
    }

    /// Fresh game backed by [`MemoryStorage`], with no feedback.
    pub fn in_memory(defaults: PlayerDefaults) -> Self {
        Self {
            state: GameState::initial(&defaults, Utc::now()),
            defaults,
            storage: Box::new(MemoryStorage::new()),
            feedback: Box::new(NoopFeedback),
            persist_error: None,
            opening_reset: DailyReset::default(),
        }
    }

    /// Replace the feedback sink.
    pub fn set_feedback(&mut self, feedback: Box<dyn FeedbackSink>) {
        self.feedback = feedback;
    }

    // ── reads ───────────────────────────────────────────────────────────

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Daily reset performed while opening the store.
    pub fn opening_reset(&self) -> DailyReset {
        self.opening_reset
    }

    pub fn defaults(&self) -> &PlayerDefaults {
        &self.defaults
    }

    pub fn attributes(&self) -> &Attributes {
        self.state.attributes()
    }

    pub fn attribute(&self, name: AttributeName) -> &Attribute {
        self.state.attribute(name)
    }

    /// Progress of `name` towards its next level.
    pub fn progress(&self, name: AttributeName) -> Progress {
        self.state.attribute(name).progress()
    }

    pub fn tasks(&self) -> &[Task] {
        self.state.tasks()
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.state.task(id)
    }

    pub fn active_tasks(&self) -> Vec<&Task> {
        self.state.active_tasks().collect()
    }

    pub fn completed_tasks(&self) -> Vec<&Task> {
        self.state.completed_tasks().collect()
    }

    pub fn dashboard_tasks(&self, limit: usize) -> Vec<&Task> {
        self.state.dashboard_tasks(limit)
    }

    pub fn chart_scale(&self, min_scale: u32) -> u32 {
        self.state.chart_scale(min_scale)
    }

    pub fn hp(&self) -> u32 {
        self.state.hp()
    }

    pub fn max_hp(&self) -> u32 {
        self.state.max_hp()
    }

    pub fn user_name(&self) -> &str {
        self.state.user_name()
    }

    pub fn history(&self) -> &[HistoryEntry] {
        self.state.history()
    }

    pub fn last_login(&self) -> DateTime<Utc> {
        self.state.last_login()
    }

    // ── quests ──────────────────────────────────────────────────────────

    /// Add a quest at the front of the list and return its id.
    pub fn add_task(&mut self, draft: TaskDraft) -> TaskId {
        self.add_task_at(draft, Utc::now())
    }

    pub fn add_task_at(&mut self, draft: TaskDraft, now: DateTime<Utc>) -> TaskId {
        let id = Uuid::new_v4().to_string();
        let task = Task::from_draft(draft, id.clone(), now);
        tracing::debug!(
            task_id = %id,
            difficulty = %task.difficulty,
            attribute = %task.attribute,
            "quest added"
        );
        self.state.tasks.insert(0, task);
        self.commit(vec![Event::TaskAdded {
            task_id: id.clone(),
            at: now,
        }]);
        id
    }

    /// Merge `patch` into the quest `id`. Completion and XP are untouched.
    pub fn update_task(&mut self, id: &str, patch: &TaskPatch) {
        self.update_task_at(id, patch, Utc::now())
    }

    pub fn update_task_at(&mut self, id: &str, patch: &TaskPatch, now: DateTime<Utc>) {
        let Some(index) = self.state.task_index(id) else {
            tracing::debug!(task_id = id, "update ignored: quest not found");
            return;
        };
        if !patch.apply(&mut self.state.tasks[index]) {
            return;
        }
        tracing::debug!(task_id = id, "quest updated");
        self.commit(vec![Event::TaskUpdated {
            task_id: id.to_string(),
            at: now,
        }]);
    }

    /// Complete the quest `id` and award XP.
    ///
    /// The primary attribute gets the full difficulty reward, then the
    /// secondary (if any) half of it, rounded down, even when both name the
    /// same attribute. Completing a missing or already
    /// completed quest changes nothing and reports no level-up.
    pub fn complete_task(&mut self, id: &str) -> CompletionOutcome {
        self.complete_task_at(id, Utc::now())
    }

    pub fn complete_task_at(&mut self, id: &str, now: DateTime<Utc>) -> CompletionOutcome {
        let Some(index) = self.state.task_index(id) else {
            tracing::debug!(task_id = id, "complete ignored: quest not found");
            return CompletionOutcome::default();
        };
        let task = &self.state.tasks[index];
        if task.completed {
            tracing::debug!(task_id = id, "complete ignored: quest already completed");
            return CompletionOutcome::default();
        }

        let difficulty = task.difficulty;
        let primary = task.attribute;
        let secondary = task.attribute_secondary;

        let mut awards = vec![self
            .state
            .attributes
            .get_mut(primary)
            .gain(difficulty.xp_reward())];
        if let Some(secondary) = secondary {
            awards.push(
                self.state
                    .attributes
                    .get_mut(secondary)
                    .gain(difficulty.secondary_xp_reward()),
            );
        }

        let task = &mut self.state.tasks[index];
        task.completed = true;
        task.completed_at = Some(now);

        let outcome = CompletionOutcome {
            level_up: awards.iter().any(XpGain::leveled_up),
            awards,
        };
        self.state.record_xp(calendar_date(now), outcome.xp_gained());

        let mut events = vec![Event::TaskCompleted {
            task_id: id.to_string(),
            xp_gained: outcome.xp_gained(),
            level_up: outcome.level_up,
            at: now,
        }];
        for gain in outcome.awards.iter().filter(|g| g.leveled_up()) {
            tracing::info!(attribute = %gain.attribute, level = gain.level_after, "level up");
            events.push(Event::LevelUp {
                attribute: gain.attribute,
                level: gain.level_after,
                at: now,
            });
        }
        tracing::debug!(task_id = id, xp = outcome.xp_gained(), "quest completed");
        self.commit(events);
        outcome
    }

    /// Reopen a completed quest.
    ///
    /// XP and levels earned by the completion are kept.
    pub fn uncomplete_task(&mut self, id: &str) {
        self.uncomplete_task_at(id, Utc::now())
    }

    pub fn uncomplete_task_at(&mut self, id: &str, now: DateTime<Utc>) {
        let Some(index) = self.state.task_index(id) else {
            tracing::debug!(task_id = id, "uncomplete ignored: quest not found");
            return;
        };
        let task = &mut self.state.tasks[index];
        if !task.completed && task.completed_at.is_none() {
            return;
        }
        task.completed = false;
        task.completed_at = None;
        tracing::debug!(task_id = id, "quest reopened");
        self.commit(vec![Event::TaskUncompleted {
            task_id: id.to_string(),
            at: now,
        }]);
    }

    /// Remove the quest `id`. Earned XP is kept.
    pub fn delete_task(&mut self, id: &str) {
        self.delete_task_at(id, Utc::now())
    }

    pub fn delete_task_at(&mut self, id: &str, now: DateTime<Utc>) {
        let Some(index) = self.state.task_index(id) else {
            tracing::debug!(task_id = id, "delete ignored: quest not found");
            return;
        };
        self.state.tasks.remove(index);
        tracing::debug!(task_id = id, "quest deleted");
        self.commit(vec![Event::TaskDeleted {
            task_id: id.to_string(),
            at: now,
        }]);
    }

    // ── player ──────────────────────────────────────────────────────────

    /// Lose `amount` hp, never dropping below zero.
    pub fn damage_player(&mut self, amount: u32) {
        self.damage_player_at(amount, Utc::now())
    }

    pub fn damage_player_at(&mut self, amount: u32, now: DateTime<Utc>) {
        let hp = self.state.hp.saturating_sub(amount);
        if hp == self.state.hp {
            return;
        }
        self.state.hp = hp;
        if hp == 0 {
            tracing::info!("player hp reached zero");
        }
        self.commit(vec![Event::PlayerDamaged { amount, hp, at: now }]);
    }

    /// Regain `amount` hp, never exceeding `max_hp`.
    pub fn heal_player(&mut self, amount: u32) {
        self.heal_player_at(amount, Utc::now())
    }

    pub fn heal_player_at(&mut self, amount: u32, now: DateTime<Utc>) {
        let hp = self.state.hp.saturating_add(amount).min(self.state.max_hp);
        if hp == self.state.hp {
            return;
        }
        self.state.hp = hp;
        self.commit(vec![Event::PlayerHealed { amount, hp, at: now }]);
    }

    pub fn set_user_name(&mut self, name: impl Into<String>) {
        self.set_user_name_at(name, Utc::now())
    }

    pub fn set_user_name_at(&mut self, name: impl Into<String>, now: DateTime<Utc>) {
        let name = name.into();
        if name == self.state.user_name {
            return;
        }
        self.state.user_name = name.clone();
        self.commit(vec![Event::UserRenamed {
            user_name: name,
            at: now,
        }]);
    }

    // ── lifecycle ───────────────────────────────────────────────────────

    /// Reopen daily quests if the local calendar date changed since the last login.
    ///
    /// Must run once per session; [`open`](Self::open) already does so.
    pub fn check_daily_reset(&mut self) -> DailyReset {
        self.check_daily_reset_at(Utc::now())
    }

    pub fn check_daily_reset_at(&mut self, now: DateTime<Utc>) -> DailyReset {
        if calendar_date(self.state.last_login) == calendar_date(now) {
            return DailyReset::default();
        }

        let mut reset_count = 0;
        for task in self.state.tasks.iter_mut().filter(|t| t.is_daily) {
            if task.completed {
                reset_count += 1;
            }
            task.completed = false;
            task.completed_at = None;
        }
        self.state.last_login = now;

        tracing::info!(reset_count, "new day, daily quests reopened");
        self.commit(vec![Event::DailyReset {
            reset_count,
            at: now,
        }]);
        DailyReset {
            rolled_over: true,
            reset_count,
        }
    }

    /// Wipe all progress back to the initial state.
    pub fn reset_game(&mut self) {
        self.reset_game_at(Utc::now())
    }

    pub fn reset_game_at(&mut self, now: DateTime<Utc>) {
        self.state = GameState::initial(&self.defaults, now);
        tracing::info!("game reset");
        self.commit(vec![Event::GameReset { at: now }]);
    }

    // ── persistence ─────────────────────────────────────────────────────

    /// Write the current state now.
    ///
    /// # Errors
    /// Returns the storage error; in-memory state is unaffected.
    pub fn flush(&mut self) -> Result<(), StorageError> {
        self.storage.save(&self.state)?;
        self.persist_error = None;
        Ok(())
    }

    /// Most recent persistence failure since the last successful write.
    pub fn take_persist_error(&mut self) -> Option<StorageError> {
        self.persist_error.take()
    }

    fn commit(&mut self, events: Vec<Event>) {
        for event in &events {
            self.feedback.notify(event);
        }
        match self.storage.save(&self.state) {
            Ok(()) => self.persist_error = None,
            Err(err) => {
                tracing::warn!(error = %err, "failed to persist game state");
                self.persist_error = Some(err);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::RecordingFeedback;
    use crate::game::Difficulty;
    use chrono::{Duration, TimeZone};

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, d, 12, 0, 0).unwrap()
    }

    fn store_with(storage: MemoryStorage, feedback: RecordingFeedback) -> ProgressionStore {
        ProgressionStore::open_at(
            Box::new(storage),
            PlayerDefaults::default(),
            Box::new(feedback),
            day(1),
        )
        .unwrap()
    }

    fn store() -> ProgressionStore {
        store_with(MemoryStorage::new(), RecordingFeedback::new())
    }

    fn quest(difficulty: Difficulty, attribute: AttributeName) -> TaskDraft {
        TaskDraft::new("quest", difficulty, attribute)
    }

    /// Storage whose saves always fail.
    struct BrokenStorage;

    impl StateStorage for BrokenStorage {
        fn load(&self) -> Result<Option<GameState>, StorageError> {
            Ok(None)
        }
        fn save(&mut self, _state: &GameState) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("disk unplugged".to_string()))
        }
        fn clear(&mut self) -> Result<(), StorageError> {
            Ok(())
        }
    }

    #[test]
    fn add_task_prepends_incomplete_task() {
        let mut store = store();
        let first = store.add_task_at(quest(Difficulty::Easy, AttributeName::Love), day(1));
        let second = store.add_task_at(quest(Difficulty::Hard, AttributeName::Love), day(1));

        assert_ne!(first, second);
        assert_eq!(store.tasks()[0].id, second);
        assert_eq!(store.tasks()[1].id, first);
        let task = store.task(&first).unwrap();
        assert!(!task.completed);
        assert_eq!(task.created_at, day(1));
    }

    #[test]
    fn add_task_accepts_empty_title() {
        let mut store = store();
        let id = store.add_task(TaskDraft::new("", Difficulty::Easy, AttributeName::Love));
        assert_eq!(store.task(&id).unwrap().title, "");
    }

    #[test]
    fn medium_quest_on_fresh_attribute() {
        let mut store = store();
        let id = store.add_task(quest(Difficulty::Medium, AttributeName::Intelligence));
        let outcome = store.complete_task_at(&id, day(1));

        assert!(!outcome.level_up);
        let attr = store.attribute(AttributeName::Intelligence);
        assert_eq!(attr.total_xp(), 250);
        assert_eq!(attr.level(), 1);
        let task = store.task(&id).unwrap();
        assert!(task.completed);
        assert_eq!(task.completed_at, Some(day(1)));
    }

    #[test]
    fn five_medium_quests_level_up_exactly_once() {
        let mut store = store();
        let mut level_ups = 0;
        for i in 0..5 {
            let id = store.add_task(quest(Difficulty::Medium, AttributeName::Strength));
            let outcome = store.complete_task_at(&id, day(1));
            if outcome.level_up {
                level_ups += 1;
                assert_eq!(i, 3, "the fourth completion crosses 1000 XP");
            }
        }
        assert_eq!(level_ups, 1);
        let attr = store.attribute(AttributeName::Strength);
        assert_eq!(attr.total_xp(), 1250);
        assert_eq!(attr.level(), 2);
    }

    #[test]
    fn completing_twice_is_a_no_op() {
        let storage = MemoryStorage::new();
        let recorder = RecordingFeedback::new();
        let mut store = store_with(storage.clone(), recorder.clone());
        let id = store.add_task(quest(Difficulty::Epic, AttributeName::Network));
        store.complete_task_at(&id, day(1));

        let snapshot = store.state().clone();
        let saves = storage.save_count();
        let events = recorder.events().len();

        let again = store.complete_task_at(&id, day(1) + Duration::minutes(5));
        assert_eq!(again, CompletionOutcome::default());
        assert_eq!(store.state(), &snapshot);
        assert_eq!(storage.save_count(), saves);
        assert_eq!(recorder.events().len(), events);
    }

    #[test]
    fn completing_unknown_quest_is_a_no_op() {
        let mut store = store();
        let before = store.state().clone();
        assert!(!store.complete_task("missing").level_up);
        store.update_task("missing", &TaskPatch::default());
        store.uncomplete_task("missing");
        store.delete_task("missing");
        assert_eq!(store.state(), &before);
    }

    #[test]
    fn epic_quest_splits_reward_with_secondary() {
        let mut store = store();
        let id = store.add_task(
            quest(Difficulty::Epic, AttributeName::Strength).with_secondary(AttributeName::Family),
        );
        let outcome = store.complete_task_at(&id, day(1));

        assert!(outcome.level_up);
        assert_eq!(outcome.awards.len(), 2);
        assert_eq!(store.attribute(AttributeName::Strength).total_xp(), 1000);
        assert_eq!(store.attribute(AttributeName::Strength).level(), 2);
        assert_eq!(store.attribute(AttributeName::Family).total_xp(), 500);
        assert_eq!(store.attribute(AttributeName::Family).level(), 1);
    }

    #[test]
    fn secondary_level_up_counts() {
        let mut store = store();
        let warmup = store.add_task(quest(Difficulty::Hard, AttributeName::Love));
        store.complete_task_at(&warmup, day(1));
        assert_eq!(store.attribute(AttributeName::Love).total_xp(), 500);

        let id = store.add_task(
            quest(Difficulty::Epic, AttributeName::Intelligence)
                .with_secondary(AttributeName::Love),
        );
        // primary 0 -> 1000 (level 2), secondary 500 -> 1000 (level 2)
        let outcome = store.complete_task_at(&id, day(1));
        assert!(outcome.awards.iter().all(XpGain::leveled_up));
        assert!(outcome.level_up);
    }

    #[test]
    fn secondary_equal_to_primary_stacks_both_awards() {
        let mut store = store();
        let id = store.add_task(
            quest(Difficulty::Epic, AttributeName::Love).with_secondary(AttributeName::Love),
        );
        let outcome = store.complete_task_at(&id, day(1));
        assert_eq!(outcome.awards.len(), 2);
        assert_eq!(outcome.xp_gained(), 1500);
        assert!(outcome.level_up);
        let love = store.attribute(AttributeName::Love);
        assert_eq!(love.total_xp(), 1500);
        assert_eq!(love.level(), 2);
    }

    #[test]
    fn level_invariant_holds_after_completions() {
        let mut store = store();
        for difficulty in Difficulty::ALL.into_iter().cycle().take(40) {
            let id = store.add_task(
                quest(difficulty, AttributeName::Network).with_secondary(AttributeName::Love),
            );
            store.complete_task_at(&id, day(1));
        }
        for attr in store.attributes().iter() {
            assert_eq!(
                attr.level(),
                crate::leveling::level_from_xp(attr.total_xp() as i64)
            );
        }
    }

    #[test]
    fn uncomplete_keeps_xp() {
        let mut store = store();
        let id = store.add_task(quest(Difficulty::Epic, AttributeName::Intelligence));
        store.complete_task_at(&id, day(1));
        store.uncomplete_task_at(&id, day(1));

        let task = store.task(&id).unwrap();
        assert!(!task.completed);
        assert!(task.completed_at.is_none());
        let attr = store.attribute(AttributeName::Intelligence);
        assert_eq!(attr.total_xp(), 1000);
        assert_eq!(attr.level(), 2);

        // Completing again awards XP again
        store.complete_task_at(&id, day(1));
        assert_eq!(store.attribute(AttributeName::Intelligence).total_xp(), 2000);
    }

    #[test]
    fn update_task_merges_fields_without_touching_completion() {
        let mut store = store();
        let id = store.add_task(quest(Difficulty::Easy, AttributeName::Love));
        store.complete_task_at(&id, day(1));

        let patch = TaskPatch {
            title: Some("Date night".to_string()),
            difficulty: Some(Difficulty::Hard),
            is_daily: Some(true),
            ..TaskPatch::default()
        };
        store.update_task(&id, &patch);

        let task = store.task(&id).unwrap();
        assert_eq!(task.title, "Date night");
        assert_eq!(task.difficulty, Difficulty::Hard);
        assert!(task.is_daily);
        assert!(task.completed);
        assert_eq!(store.attribute(AttributeName::Love).total_xp(), 100);
    }

    #[test]
    fn delete_task_keeps_xp() {
        let mut store = store();
        let id = store.add_task(quest(Difficulty::Hard, AttributeName::Strength));
        store.complete_task_at(&id, day(1));
        store.delete_task(&id);
        assert!(store.task(&id).is_none());
        assert!(store.tasks().is_empty());
        assert_eq!(store.attribute(AttributeName::Strength).total_xp(), 500);
    }

    #[test]
    fn hp_is_clamped() {
        let mut store = store();
        store.damage_player(150);
        assert_eq!(store.hp(), 0);
        store.heal_player(30);
        assert_eq!(store.hp(), 30);
        store.heal_player(u32::MAX);
        assert_eq!(store.hp(), 100);
    }

    #[test]
    fn daily_reset_same_day_is_no_op() {
        let mut store = store();
        let id = store.add_task(quest(Difficulty::Easy, AttributeName::Family).daily(true));
        store.complete_task_at(&id, day(1));

        let first = store.check_daily_reset_at(day(1) + Duration::minutes(5));
        let second = store.check_daily_reset_at(day(1) + Duration::minutes(10));
        assert_eq!(first, DailyReset::default());
        assert_eq!(second, DailyReset::default());
        assert!(store.task(&id).unwrap().completed);
    }

    #[test]
    fn daily_reset_reopens_only_daily_quests() {
        let mut store = store();
        let daily = store.add_task(quest(Difficulty::Easy, AttributeName::Family).daily(true));
        let once = store.add_task(quest(Difficulty::Easy, AttributeName::Family));
        store.complete_task_at(&daily, day(1));
        store.complete_task_at(&once, day(1));

        let reset = store.check_daily_reset_at(day(2));
        assert_eq!(
            reset,
            DailyReset {
                rolled_over: true,
                reset_count: 1
            }
        );
        assert!(!store.task(&daily).unwrap().completed);
        assert!(store.task(&daily).unwrap().completed_at.is_none());
        assert!(store.task(&once).unwrap().completed);
        assert_eq!(store.last_login(), day(2));
        assert_eq!(store.attribute(AttributeName::Family).total_xp(), 200);

        assert!(!store.check_daily_reset_at(day(2) + Duration::hours(1)).rolled_over);
    }

    #[test]
    fn reset_game_restores_initial_state() {
        let mut store = store();
        let id = store.add_task(quest(Difficulty::Epic, AttributeName::Love));
        store.complete_task_at(&id, day(1));
        store.damage_player(40);
        store.set_user_name("Ranger");

        store.reset_game_at(day(3));
        assert_eq!(
            store.state(),
            &GameState::initial(&PlayerDefaults::default(), day(3))
        );
        assert_eq!(store.user_name(), "Hunter");
        assert_eq!(store.hp(), 100);
        assert!(store.history().is_empty());
    }

    #[test]
    fn history_accumulates_daily_xp() {
        let mut store = store();
        let a = store.add_task(
            quest(Difficulty::Epic, AttributeName::Love).with_secondary(AttributeName::Family),
        );
        let b = store.add_task(quest(Difficulty::Trivial, AttributeName::Love));
        store.complete_task_at(&a, day(1));
        store.complete_task_at(&b, day(1));
        store.check_daily_reset_at(day(2));
        let c = store.add_task(quest(Difficulty::Easy, AttributeName::Love));
        store.complete_task_at(&c, day(2));

        let history = store.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].xp_gained, 1550);
        assert_eq!(history[1].xp_gained, 100);
    }

    #[test]
    fn every_mutation_is_persisted() {
        let storage = MemoryStorage::new();
        let mut store = store_with(storage.clone(), RecordingFeedback::new());
        let id = store.add_task_at(quest(Difficulty::Medium, AttributeName::Love), day(1));
        store.complete_task_at(&id, day(1));
        store.set_user_name_at("Bard", day(1));

        let reopened = store_with(storage.clone(), RecordingFeedback::new());
        assert_eq!(reopened.state(), store.state());
        assert_eq!(storage.save_count(), 3);
    }

    #[test]
    fn open_runs_daily_reset_on_stale_state() {
        let storage = MemoryStorage::new();
        let id = {
            let mut store = store_with(storage.clone(), RecordingFeedback::new());
            let id = store.add_task(quest(Difficulty::Easy, AttributeName::Family).daily(true));
            store.complete_task_at(&id, day(1));
            id
        };

        let recorder = RecordingFeedback::new();
        let store = ProgressionStore::open_at(
            Box::new(storage),
            PlayerDefaults::default(),
            Box::new(recorder.clone()),
            day(2),
        )
        .unwrap();
        assert!(!store.task(&id).unwrap().completed);
        assert_eq!(store.opening_reset().reset_count, 1);
        assert!(matches!(
            recorder.events().as_slice(),
            [Event::DailyReset { reset_count: 1, .. }]
        ));
    }

    #[test]
    fn open_surfaces_corrupt_blob() {
        let storage = MemoryStorage::new();
        storage.set_blob("nope");
        let result = ProgressionStore::open(
            Box::new(storage),
            PlayerDefaults::default(),
            Box::new(NoopFeedback),
        );
        assert!(matches!(result, Err(StorageError::Corrupt(_))));
    }

    #[test]
    fn open_or_reset_discards_corrupt_blob() {
        let storage = MemoryStorage::new();
        storage.set_blob("{garbage");
        let mut store = ProgressionStore::open_or_reset_at(
            Box::new(storage.clone()),
            PlayerDefaults::default(),
            Box::new(NoopFeedback),
            day(4),
        )
        .unwrap();
        assert!(storage.blob().is_none());
        assert_eq!(
            store.state(),
            &GameState::initial(&PlayerDefaults::default(), day(4))
        );

        store.reset_game_at(day(4));
        let reopened = store_with(storage, RecordingFeedback::new());
        assert_eq!(reopened.user_name(), "Hunter");
    }

    #[test]
    fn open_or_reset_discards_future_version() {
        let storage = MemoryStorage::new();
        let mut writer = storage.clone();
        writer
            .save(&GameState::initial(&PlayerDefaults::default(), day(1)))
            .unwrap();
        let blob = storage.blob().unwrap().replace("\"version\":1", "\"version\":7");
        storage.set_blob(blob);

        assert!(matches!(
            ProgressionStore::open_at(
                Box::new(storage.clone()),
                PlayerDefaults::default(),
                Box::new(NoopFeedback),
                day(1),
            ),
            Err(StorageError::UnsupportedVersion { found: 7, .. })
        ));
        let store = ProgressionStore::open_or_reset_at(
            Box::new(storage),
            PlayerDefaults::default(),
            Box::new(NoopFeedback),
            day(1),
        )
        .unwrap();
        assert!(store.tasks().is_empty());
    }

    #[test]
    fn open_or_reset_keeps_readable_state() {
        let storage = MemoryStorage::new();
        {
            let mut store = store_with(storage.clone(), RecordingFeedback::new());
            store.set_user_name_at("Druid", day(1));
        }
        let store = ProgressionStore::open_or_reset_at(
            Box::new(storage),
            PlayerDefaults::default(),
            Box::new(NoopFeedback),
            day(1),
        )
        .unwrap();
        assert_eq!(store.user_name(), "Druid");
    }

    #[test]
    fn feedback_receives_level_up_events() {
        let recorder = RecordingFeedback::new();
        let mut store = store_with(MemoryStorage::new(), recorder.clone());
        let id = store.add_task(
            quest(Difficulty::Epic, AttributeName::Strength).with_secondary(AttributeName::Love),
        );
        store.complete_task_at(&id, day(1));

        assert_eq!(recorder.level_ups(), 1);
        let events = recorder.events();
        assert!(matches!(events[0], Event::TaskAdded { .. }));
        assert!(matches!(
            events[1],
            Event::TaskCompleted {
                xp_gained: 1500,
                level_up: true,
                ..
            }
        ));
        assert!(matches!(
            events[2],
            Event::LevelUp {
                attribute: AttributeName::Strength,
                level: 2,
                ..
            }
        ));
    }

    #[test]
    fn persistence_failure_keeps_memory_state() {
        let mut store = ProgressionStore::open_at(
            Box::new(BrokenStorage),
            PlayerDefaults::default(),
            Box::new(NoopFeedback),
            day(1),
        )
        .unwrap();

        let id = store.add_task(quest(Difficulty::Hard, AttributeName::Network));
        let outcome = store.complete_task_at(&id, day(1));
        assert!(!outcome.level_up);
        assert_eq!(store.attribute(AttributeName::Network).total_xp(), 500);
        assert!(store.task(&id).unwrap().completed);

        assert!(matches!(
            store.take_persist_error(),
            Some(StorageError::Unavailable(_))
        ));
        assert!(store.take_persist_error().is_none());
        assert!(store.flush().is_err());
    }

    #[test]
    fn in_memory_store_starts_fresh() {
        let mut store = ProgressionStore::in_memory(PlayerDefaults {
            user_name: "Monk".to_string(),
            max_hp: 80,
        });
        assert_eq!(store.user_name(), "Monk");
        assert_eq!(store.hp(), 80);
        assert!(store.flush().is_ok());
        assert_eq!(store.chart_scale(10), 10);
        assert_eq!(store.progress(AttributeName::Love).needed, 1000);
    }
}
