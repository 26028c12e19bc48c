use anyhow::Result;
use clap::{Parser, Subcommand};
use nprtrack::core::history::Period;
use nprtrack::core::log::init_logging;
use std::path::PathBuf;

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

impl From<Commands> for nprtrack::AppCommand {
    fn from(cmd: Commands) -> nprtrack::AppCommand {
        match cmd {
            Commands::Symbols => nprtrack::AppCommand::Symbols,
            Commands::Fetch {
                symbol,
                period,
                plot,
                save,
            } => nprtrack::AppCommand::Fetch {
                symbol,
                period,
                plot,
                save,
            },
            Commands::Rate => nprtrack::AppCommand::Rate,
            Commands::Alert {
                symbol,
                target,
                email,
            } => nprtrack::AppCommand::Alert {
                symbol,
                target,
                recipient: email,
            },
            Commands::App => nprtrack::AppCommand::App,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// List the symbols offered in the app
    Symbols,
    /// Fetch a symbol's history and show it in NPR
    Fetch {
        symbol: String,
        /// History window (1d, 5d, 1mo, 3mo, 6mo, 1y, 2y, 5y, max)
        #[arg(short, long)]
        period: Option<Period>,
        /// Draw the chart below the table
        #[arg(long)]
        plot: bool,
        /// Also write the chart to this file as text
        #[arg(long, value_name = "PATH", requires = "plot")]
        save: Option<PathBuf>,
    },
    /// Show the current USD to NPR rate and its source
    Rate,
    /// Email when a symbol's last close is at or above a target (USD)
    Alert {
        symbol: String,
        target: f64,
        email: String,
    },
    /// Interactive chart viewer (default)
    App,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let command = cli.command.unwrap_or(Commands::App);
    init_logging(cli.verbose, matches!(command, Commands::App));

    let result = match command {
        Commands::Setup => nprtrack::cli::setup::setup(),
        cmd => nprtrack::run_command(cmd.into(), cli.config_path.as_deref()).await,
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
