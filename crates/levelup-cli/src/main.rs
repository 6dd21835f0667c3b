use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, reload, EnvFilter, Registry};

mod commands;

#[derive(Parser)]
#[command(name = "levelup", version, about = "LevelUp: level up your life one quest at a time")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Quest management
    Quest {
        #[command(subcommand)]
        action: commands::quest::QuestAction,
    },
    /// Attribute levels and progress
    Attr {
        #[command(subcommand)]
        action: commands::attr::AttrAction,
    },
    /// Player hp and name
    Player {
        #[command(subcommand)]
        action: commands::player::PlayerAction,
    },
    /// Dashboard, daily reset and full reset
    Game {
        #[command(subcommand)]
        action: commands::game::GameAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

type FilterHandle = reload::Handle<EnvFilter, Registry>;

/// Logs go to stderr; stdout carries JSON only.
///
/// Returns a handle for switching to the configured level once the config is
/// loaded, or `None` when `RUST_LOG` decides the filter.
fn init_tracing() -> Option<FilterHandle> {
    let from_env = EnvFilter::try_from_default_env().ok();
    let configurable = from_env.is_none();
    let (filter, handle) =
        reload::Layer::new(from_env.unwrap_or_else(|| EnvFilter::new("warn")));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
    configurable.then_some(handle)
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> commands::CliResult {
    let filter = init_tracing();
    let ctx = match &cli.command {
        // Must work even when the current config cannot be parsed.
        Commands::Config {
            action: commands::config::ConfigAction::Reset,
        } => commands::AppContext::load_or_default()?,
        _ => commands::AppContext::load()?,
    };
    if let Some(filter) = filter {
        if let Err(e) = filter.reload(EnvFilter::new(&ctx.config.log.level)) {
            tracing::warn!(error = %e, "could not apply configured log level");
        }
    }

    match cli.command {
        Commands::Quest { action } => commands::quest::run(&ctx, action),
        Commands::Attr { action } => commands::attr::run(&ctx, action),
        Commands::Player { action } => commands::player::run(&ctx, action),
        Commands::Game { action } => commands::game::run(&ctx, action),
        Commands::Config { action } => commands::config::run(&ctx, action),
    }
}
