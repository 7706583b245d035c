//! appwarden CLI -- installed software inventory, search and audit
//!
//! # Module Structure
//!
//! - [`cli`]: clap argument definitions
//! - [`commands`]: one handler per subcommand (`list`, `search`, `audit`, `config`)
//! - [`output`]: text / JSON rendering
//! - [`error`]: `CliError` and exit-code mapping
//! - [`logging`]: tracing subscriber setup

mod cli;
mod commands;
mod error;
mod logging;
mod output;

use clap::Parser;
use colored::Colorize;

use appwarden_core::config::{AppwardenConfig, GeneralConfig};

use crate::cli::{Cli, Commands};
use crate::error::CliError;
use crate::output::OutputWriter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let loaded = AppwardenConfig::load_or_default(&cli.config).await;

    // config validate/show report a broken file themselves
    let general = match &loaded {
        Ok(config) => config.general.clone(),
        Err(_) => GeneralConfig::default(),
    };
    logging::init_tracing(&general, cli.log_level.as_deref())?;
    appwarden_core::metrics::describe_all();

    tracing::debug!(config = %cli.config.display(), "appwarden starting");

    let writer = OutputWriter::new(cli.output);
    let snapshot = cli.snapshot.as_deref();

    match cli.command {
        Commands::Config(args) => commands::config::execute(args, &cli.config, &writer).await,
        Commands::List(args) => commands::list::execute(args, &loaded?, snapshot, &writer).await,
        Commands::Search(args) => {
            commands::search::execute(args, &loaded?, snapshot, &writer).await
        }
        Commands::Audit(args) => commands::audit::execute(args, &loaded?, snapshot, &writer).await,
    }
}
