use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use subsage::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// List subscriptions
    List {
        /// Show archived subscriptions instead of active ones
        #[arg(short, long)]
        archived: bool,
        /// Only show subscriptions whose name contains this text
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Display monthly spending analytics
    Analytics,
    /// Manage renewal reminders
    #[command(subcommand)]
    Remind(RemindCommands),
}

#[derive(Subcommand)]
enum RemindCommands {
    /// Schedule reminders for all subscriptions in the configuration
    Sync {
        /// Compute reminders without touching the queue
        #[arg(long)]
        dry_run: bool,
    },
    /// Show pending reminders
    List,
    /// Cancel the pending reminder of one subscription
    Cancel {
        /// Subscription id
        id: String,
    },
}

impl From<Commands> for subsage::AppCommand {
    fn from(cmd: Commands) -> subsage::AppCommand {
        match cmd {
            Commands::List { archived, search } => subsage::AppCommand::List { archived, search },
            Commands::Analytics => subsage::AppCommand::Analytics,
            Commands::Remind(RemindCommands::Sync { dry_run }) => {
                subsage::AppCommand::RemindSync { dry_run }
            }
            Commands::Remind(RemindCommands::List) => subsage::AppCommand::RemindList,
            Commands::Remind(RemindCommands::Cancel { id }) => {
                subsage::AppCommand::RemindCancel { id }
            }
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => subsage::cli::setup::setup(),
        Some(cmd) => subsage::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
