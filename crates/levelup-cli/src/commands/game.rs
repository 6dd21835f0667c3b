//! Whole-game commands: dashboard, daily reset, full reset, history.

use clap::Subcommand;
use levelup_core::CoreError;
use serde_json::json;

use super::{finish, print_json, AppContext, CliResult};

#[derive(Subcommand)]
pub enum GameAction {
    /// Attribute levels, hp and the first few active quests
    Dashboard,
    /// Reopen daily quests if the day changed
    DailyReset,
    /// Wipe all progress, even if the saved state is unreadable
    Reset {
        /// Confirm the reset
        #[arg(long)]
        yes: bool,
    },
    /// XP gained per day
    History,
}

pub fn run(ctx: &AppContext, action: GameAction) -> CliResult {
    match action {
        GameAction::Dashboard => {
            let store = ctx.open_store()?;
            let dashboard = &ctx.config.dashboard;
            let attributes: Vec<_> = store
                .attributes()
                .iter()
                .map(|a| json!({ "name": a.name(), "level": a.level() }))
                .collect();
            print_json(&json!({
                "userName": store.user_name(),
                "hp": store.hp(),
                "maxHp": store.max_hp(),
                "attributes": attributes,
                "chartScale": store.chart_scale(dashboard.chart_min_scale),
                "activeQuests": store.dashboard_tasks(dashboard.active_quest_limit),
            }))
        }
        GameAction::DailyReset => {
            let mut store = ctx.open_store()?;
            // Opening the store already ran the check.
            let reset = store.opening_reset();
            finish(&mut store)?;
            print_json(&reset)
        }
        GameAction::Reset { yes } => {
            if !yes {
                return Err(CoreError::Custom(
                    "refusing to reset without --yes".to_string(),
                ));
            }
            let mut store = ctx.open_store_or_reset()?;
            store.reset_game();
            finish(&mut store)?;
            print_json(store.state())
        }
        GameAction::History => print_json(ctx.open_store()?.history()),
    }
}
