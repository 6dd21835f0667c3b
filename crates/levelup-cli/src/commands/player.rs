//! Player hp and identity commands.

use clap::Subcommand;
use levelup_core::{ProgressionStore, ValidationError};
use serde_json::{json, Value};

use super::{finish, print_json, AppContext, CliResult};

#[derive(Subcommand)]
pub enum PlayerAction {
    /// Show name, hp and overall level
    Status,
    /// Lose hp (never below zero)
    Damage {
        amount: u32,
    },
    /// Regain hp (never above max hp)
    Heal {
        amount: u32,
    },
    /// Change the player name
    Rename {
        name: String,
    },
}

fn status(store: &ProgressionStore) -> Value {
    json!({
        "userName": store.user_name(),
        "hp": store.hp(),
        "maxHp": store.max_hp(),
        "maxLevel": store.attributes().max_level(),
        "totalXp": store.attributes().total_xp(),
    })
}

pub fn run(ctx: &AppContext, action: PlayerAction) -> CliResult {
    let mut store = ctx.open_store()?;

    match action {
        PlayerAction::Status => {}
        PlayerAction::Damage { amount } => store.damage_player(amount),
        PlayerAction::Heal { amount } => store.heal_player(amount),
        PlayerAction::Rename { name } => {
            if name.trim().is_empty() {
                return Err(ValidationError::InvalidValue {
                    field: "name".to_string(),
                    message: "must not be empty".to_string(),
                }
                .into());
            }
            store.set_user_name(name);
        }
    }
    finish(&mut store)?;
    print_json(&status(&store))
}
