//! Quest management commands.

use clap::{Subcommand, ValueEnum};
use levelup_core::{AttributeName, Difficulty, TaskDraft, TaskPatch, ValidationError};
use serde_json::json;

use super::{finish, not_found, print_json, AppContext, CliResult};

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum StatusFilter {
    Active,
    Completed,
    All,
}

#[derive(Subcommand)]
pub enum QuestAction {
    /// Create a new quest
    Add {
        /// Quest title
        title: String,
        /// trivial, easy, medium, hard or epic
        #[arg(long, short, default_value = "easy")]
        difficulty: Difficulty,
        /// Attribute receiving the full reward
        #[arg(long, short)]
        attribute: AttributeName,
        /// Attribute receiving half the reward
        #[arg(long)]
        secondary: Option<AttributeName>,
        /// Reopen this quest every day
        #[arg(long)]
        daily: bool,
        /// Quest description
        #[arg(long)]
        description: Option<String>,
    },
    /// List quests, newest first
    List {
        #[arg(long, value_enum, default_value = "all")]
        status: StatusFilter,
    },
    /// Show one quest
    Show {
        /// Quest ID
        id: String,
    },
    /// Edit quest fields
    Edit {
        /// Quest ID
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long, conflicts_with = "clear_description")]
        description: Option<String>,
        #[arg(long)]
        clear_description: bool,
        #[arg(long)]
        difficulty: Option<Difficulty>,
        #[arg(long)]
        attribute: Option<AttributeName>,
        #[arg(long, conflicts_with = "clear_secondary")]
        secondary: Option<AttributeName>,
        #[arg(long)]
        clear_secondary: bool,
        /// true or false
        #[arg(long)]
        daily: Option<bool>,
    },
    /// Complete a quest and collect XP
    Complete {
        /// Quest ID
        id: String,
    },
    /// Reopen a completed quest (XP is kept)
    Uncomplete {
        /// Quest ID
        id: String,
    },
    /// Delete a quest (XP is kept)
    Delete {
        /// Quest ID
        id: String,
    },
}

pub fn run(ctx: &AppContext, action: QuestAction) -> CliResult {
    let mut store = ctx.open_store()?;

    match action {
        QuestAction::Add {
            title,
            difficulty,
            attribute,
            secondary,
            daily,
            description,
        } => {
            let mut draft = TaskDraft::new(title, difficulty, attribute).daily(daily);
            if let Some(secondary) = secondary {
                draft = draft.with_secondary(secondary);
            }
            if let Some(description) = description {
                draft = draft.with_description(description);
            }
            draft.validate()?;

            let id = store.add_task(draft);
            finish(&mut store)?;
            let task = store.task(&id).ok_or_else(|| not_found(&id))?;
            print_json(task)?;
        }
        QuestAction::List { status } => {
            let tasks = match status {
                StatusFilter::Active => store.active_tasks(),
                StatusFilter::Completed => store.completed_tasks(),
                StatusFilter::All => store.tasks().iter().collect(),
            };
            print_json(&tasks)?;
        }
        QuestAction::Show { id } => {
            let task = store.task(&id).ok_or_else(|| not_found(&id))?;
            print_json(&json!({
                "task": task,
                "reward": task.total_reward(),
            }))?;
        }
        QuestAction::Edit {
            id,
            title,
            description,
            clear_description,
            difficulty,
            attribute,
            secondary,
            clear_secondary,
            daily,
        } => {
            if store.task(&id).is_none() {
                return Err(not_found(&id));
            }
            let patch = TaskPatch {
                title,
                description: if clear_description {
                    Some(None)
                } else {
                    description.map(Some)
                },
                difficulty,
                attribute,
                attribute_secondary: if clear_secondary {
                    Some(None)
                } else {
                    secondary.map(Some)
                },
                is_daily: daily,
            };
            if patch.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
                return Err(ValidationError::EmptyTitle.into());
            }

            store.update_task(&id, &patch);
            finish(&mut store)?;
            let task = store.task(&id).ok_or_else(|| not_found(&id))?;
            print_json(task)?;
        }
        QuestAction::Complete { id } => {
            if store.task(&id).is_none() {
                return Err(not_found(&id));
            }
            let outcome = store.complete_task(&id);
            finish(&mut store)?;
            let task = store.task(&id).ok_or_else(|| not_found(&id))?;
            print_json(&json!({
                "task": task,
                "levelUp": outcome.level_up,
                "xpGained": outcome.xp_gained(),
                "awards": outcome.awards,
            }))?;
        }
        QuestAction::Uncomplete { id } => {
            if store.task(&id).is_none() {
                return Err(not_found(&id));
            }
            store.uncomplete_task(&id);
            finish(&mut store)?;
            let task = store.task(&id).ok_or_else(|| not_found(&id))?;
            print_json(task)?;
        }
        QuestAction::Delete { id } => {
            if store.task(&id).is_none() {
                return Err(not_found(&id));
            }
            store.delete_task(&id);
            finish(&mut store)?;
            print_json(&json!({ "deleted": id }))?;
        }
    }
    Ok(())
}
