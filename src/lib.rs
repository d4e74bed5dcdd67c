pub mod cli;
pub mod core;
pub mod store;

use anyhow::Result;
use tracing::{debug, info};

/// Commands that operate on a loaded configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    List {
        archived: bool,
        search: Option<String>,
    },
    Analytics,
    RemindSync {
        dry_run: bool,
    },
    RemindList,
    RemindCancel {
        id: String,
    },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("subsage starting...");

    let config = match config_path {
        Some(path) => crate::core::config::AppConfig::load_from_path(path)?,
        None => crate::core::config::AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    match command {
        AppCommand::List { archived, search } => cli::list::run(
            &config.records(),
            &config.reminder_settings()?,
            archived,
            search.as_deref(),
        ),
        AppCommand::Analytics => cli::analytics::run(&config.records()),
        AppCommand::RemindSync { dry_run } => cli::remind::sync(&config, dry_run).await,
        AppCommand::RemindList => cli::remind::list(&config),
        AppCommand::RemindCancel { id } => cli::remind::cancel(&config, &id).await,
    }
}
