use clap::Subcommand;
use levelup_core::{Config, ConfigError};

use super::{print_json, AppContext, CliResult};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a config value
    Get {
        /// Dot-separated key (e.g. "player.max_hp", "storage.backend")
        key: String,
    },
    /// Set a config value
    Set {
        /// Dot-separated key
        key: String,
        /// New value
        value: String,
    },
    /// List all config values
    List,
    /// Reset config to defaults
    Reset,
}

pub fn run(ctx: &AppContext, action: ConfigAction) -> CliResult {
    match action {
        ConfigAction::Get { key } => match ctx.config.get(&key) {
            Some(value) => println!("{value}"),
            None => return Err(ConfigError::UnknownKey(key).into()),
        },
        ConfigAction::Set { key, value } => {
            let mut config = ctx.config.clone();
            config.set(&key, &value)?;
            config.save_to(&ctx.data_dir)?;
            println!("ok");
        }
        ConfigAction::List => print_json(&ctx.config)?,
        ConfigAction::Reset => {
            Config::default().save_to(&ctx.data_dir)?;
            println!("config reset to defaults");
        }
    }
    Ok(())
}
