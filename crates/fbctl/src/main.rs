//! fbctl - manage Firebase-style projects from the command line
//!
//! This is the main entry point for the fbctl command-line interface.

mod cli;
mod commands;
mod output;
mod prompt;
mod session;
mod utils;

use anyhow::Result;
use clap::Parser;
use fbctl_api::ApiError;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::{Cli, Commands};
use session::Session;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.global.verbose, cli.global.quiet);

    let session = Session::load(&cli.global)?;

    let result = match cli.command {
        Commands::Database(cmd) => commands::database::run(cmd, &session).await,
        Commands::Ext(cmd) => commands::ext::run(cmd, &session).await,
        Commands::Functions(cmd) => commands::functions::run(cmd, &session).await,
        Commands::Hosting(cmd) => commands::hosting::run(cmd, &session).await,
        Commands::Deploy(cmd) => commands::deploy::run(cmd, &session).await,
        Commands::Emulators(cmd) => commands::emulators::run(cmd, &session),
    };

    // Service errors carry their own exit code
    if let Err(err) = &result {
        if let Some(ApiError::Service { exit_code, .. }) = err.downcast_ref::<ApiError>() {
            output::error(&format!("{:#}", err));
            std::process::exit(*exit_code);
        }
    }
    result
}

/// Initialize tracing with appropriate verbosity
fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("info"),
            2 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}
