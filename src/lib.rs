//! rAttendance library root.
//! Exposes the CLI parser, the high-level `run()` function, the attendance
//! engine and the client-side optimistic store.

pub mod cli;
pub mod client;
pub mod config;
pub mod core;
pub mod db;
pub mod errors;
pub mod models;
pub mod ui;
pub mod utils;

use clap::Parser;
use cli::parser::{Cli, Commands};
use config::Config;
use errors::AppResult;
use tracing::Level;

/// Central command dispatcher
pub fn dispatch(cli: &Cli, cfg: &Config) -> AppResult<()> {
    match &cli.command {
        Commands::Init => cli::commands::init::handle(cli),
        Commands::Config { .. } => cli::commands::config::handle(&cli.command, cfg),
        Commands::Db { .. } => cli::commands::db::handle(&cli.command, cfg),
        Commands::Log { .. } => cli::commands::log::handle(cli, cfg),
        Commands::Ingest(_) => cli::commands::ingest::handle(cli, cfg),
        Commands::Period { .. } => cli::commands::period::handle(cli, cfg),
        Commands::Validate { .. } | Commands::Summary { .. } => {
            cli::commands::review::handle(cli, cfg)
        }
        Commands::Finalize { .. } => cli::commands::finalize::handle(cli, cfg),
        Commands::Unlock { .. } => cli::commands::unlock::handle(cli, cfg),
        Commands::Edit(_) | Commands::Resolve { .. } => cli::commands::edit::handle(cli, cfg),
        Commands::Export { .. } => cli::commands::export::handle(&cli.command, cfg),
    }
}

/// Diagnostics to stderr at the configured level. A second call (tests
/// driving `run` more than once) keeps the first subscriber.
pub fn init_tracing(level: &str) {
    let level = level.parse::<Level>().unwrap_or(Level::WARN);
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Entry point used by main.rs
pub fn run() -> AppResult<()> {
    let cli = Cli::parse();

    let mut cfg = Config::load()?;
    if let Some(custom_db) = &cli.db {
        cfg.database = custom_db.clone();
    }

    init_tracing(&cfg.log_level);

    dispatch(&cli, &cfg)
}
