//! `mirrorwatch`: one-shot command-line client for the mirror testing backend.

mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

/// Logs go to stderr so `-o json` stays machine-readable.
fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "mirrorwatch", &mut std::io::stdout());
            Ok(())
        }

        // Shows the settings themselves, so it must not require a valid server.
        Command::Config => commands::config_cmd::handle(&cli.global),

        Command::Status => {
            let config = config::resolve(&cli.global)?;
            commands::status::handle(&config, &cli.global).await
        }

        Command::Trigger => {
            let config = config::resolve(&cli.global)?;
            commands::trigger::handle(&config, &cli.global).await
        }
    }
}
