//! Attribute inspection commands.

use clap::Subcommand;
use levelup_core::{Attribute, AttributeName, ProgressionStore};
use serde_json::{json, Value};

use super::{print_json, AppContext, CliResult};

#[derive(Subcommand)]
pub enum AttrAction {
    /// List all attributes
    List,
    /// Show one attribute with progress to the next level
    Show {
        /// intelligence, strength, love, network or family
        name: AttributeName,
    },
}

fn describe(store: &ProgressionStore, attr: &Attribute) -> Value {
    json!({
        "name": attr.name(),
        "level": attr.level(),
        "totalXp": attr.total_xp(),
        "progress": store.progress(attr.name()),
    })
}

pub fn run(ctx: &AppContext, action: AttrAction) -> CliResult {
    let store = ctx.open_store()?;

    match action {
        AttrAction::List => {
            let attrs: Vec<Value> = store
                .attributes()
                .iter()
                .map(|a| describe(&store, a))
                .collect();
            print_json(&attrs)?;
        }
        AttrAction::Show { name } => {
            print_json(&describe(&store, store.attribute(name)))?;
        }
    }
    Ok(())
}
