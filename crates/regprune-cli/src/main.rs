//! regprune CLI - retention cleanup for Docker registries.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::{Cli, Commands};

/// Exit status for fatal errors other than configuration.
const EXIT_FAILURE: u8 = 1;

/// Exit status when the retention configuration cannot be read.
const EXIT_CONFIG: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    // Logs go to stderr so a JSON report on stdout stays parseable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "regprune=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Clean(args) => commands::clean::run(&args).await,
        Commands::Check(args) => commands::check::run(&args),
        Commands::Version => {
            println!("regprune {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %format!("{err:#}"), "run aborted");
            eprintln!("Error: {err:#}");
            ExitCode::from(exit_status_for(&err))
        }
    }
}

fn exit_status_for(err: &anyhow::Error) -> u8 {
    let config_unreadable = err.chain().any(|cause| {
        cause
            .downcast_ref::<regprune_core::Error>()
            .is_some_and(regprune_core::Error::is_fatal)
    });

    if config_unreadable {
        EXIT_CONFIG
    } else {
        EXIT_FAILURE
    }
}
