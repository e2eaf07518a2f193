#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod commands;
mod config;
mod lambda;
mod telemetry;

use std::process;

use anyhow::Context;
use ipsdoc_locator::{Handler, Locator};
use ipsdoc_storage::OpendalStore;

use crate::config::{Cli, Command};

// Tracing target constants
pub const TRACING_TARGET_STARTUP: &str = "ipsdoc_cli::startup";
pub const TRACING_TARGET_SHUTDOWN: &str = "ipsdoc_cli::shutdown";
pub const TRACING_TARGET_CONFIG: &str = "ipsdoc_cli::config";
pub const TRACING_TARGET_LAMBDA: &str = "ipsdoc_cli::lambda";

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        tracing::info!(
            target: TRACING_TARGET_SHUTDOWN,
            "application terminated successfully"
        );
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_SHUTDOWN,
            error = %error,
            "application terminated with error"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

/// Main application entry point.
async fn run() -> anyhow::Result<()> {
    let cli = Cli::init();

    telemetry::init_tracing(&cli.telemetry)?;
    cli.log();
    cli.validate()?;

    let handler = create_handler(&cli)?;

    match cli.command {
        Command::Serve(args) => lambda::serve(&handler, &args).await,
        Command::Invoke(args) => commands::invoke(&handler, &args).await,
        Command::Share(args) => commands::share(&handler, &args).await,
    }
}

/// Creates the request handler over the configured object store.
fn create_handler(cli: &Cli) -> anyhow::Result<Handler> {
    let store = OpendalStore::new(cli.storage.clone()).context("failed to create object store")?;
    Ok(Handler::new(Locator::new(store), cli.lookup.clone()))
}
