//! CLI configuration management.
//!
//! This module defines the complete CLI configuration hierarchy:
//!
//! ```text
//! Cli
//! ├── command: Command             # serve | invoke | share
//! ├── storage: StorageConfig       # Backend, region, endpoint, credentials
//! ├── lookup: LookupDefaults       # Default bucket and prefix
//! └── telemetry: TelemetryConfig   # Log format and colors
//! ```
//!
//! All configuration can be provided via CLI arguments or environment variables.
//! Use `--help` to see all available options.
//!
//! # Example
//!
//! ```bash
//! # Run inside AWS Lambda
//! DEFAULT_BUCKET_NAME=advisor-ips-documents-bucket LOG_FORMAT=json ipsdoc serve
//!
//! # Local lookup against LocalStack
//! ipsdoc --s3-endpoint http://localhost:4566 invoke --event '{"clientName":"Acme"}'
//! ```

mod command;
mod telemetry;

use std::process;

use anyhow::Context;
use clap::Parser;
pub use command::{Command, InvokeArgs, ServeArgs, ShareArgs};
use ipsdoc_locator::LookupDefaults;
use ipsdoc_storage::StorageConfig;
pub use telemetry::{LogFormat, TelemetryConfig};

use crate::{TRACING_TARGET_CONFIG, TRACING_TARGET_STARTUP};

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "ipsdoc")]
#[command(about = "Client IPS document lookup for AWS Lambda")]
#[command(version)]
pub struct Cli {
    /// Operation to run.
    #[command(subcommand)]
    pub command: Command,

    /// Object store connection.
    #[clap(flatten)]
    pub storage: StorageConfig,

    /// Defaults for fields a lookup request omits.
    #[clap(flatten)]
    pub lookup: LookupDefaults,

    /// Logging output.
    #[clap(flatten)]
    pub telemetry: TelemetryConfig,
}

impl Cli {
    /// Loads environment variables from .env file (if enabled) and parses CLI arguments.
    ///
    /// This is the preferred way to initialize the CLI configuration as it ensures
    /// .env files are loaded before clap parses arguments, allowing environment
    /// variables from .env to be used as defaults.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    /// Loads environment variables from .env file if the dotenv feature is enabled.
    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    /// No-op when dotenv feature is disabled.
    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Validates all configuration values.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.storage
            .validate()
            .context("invalid storage configuration")?;

        if let Command::Share(args) = &self.command {
            args.validate().context("invalid share arguments")?;
        }

        Ok(())
    }

    /// Logs configuration (no sensitive information).
    pub fn log(&self) {
        tracing::info!(
            target: TRACING_TARGET_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            command = self.command.name(),
            "starting ipsdoc"
        );

        tracing::debug!(
            target: TRACING_TARGET_STARTUP,
            pid = process::id(),
            arch = std::env::consts::ARCH,
            os = std::env::consts::OS,
            features = ?Self::enabled_features(),
            "Build information"
        );

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            backend = %self.storage.backend,
            region = %self.storage.region,
            endpoint = ?self.storage.endpoint,
            static_credentials = self.storage.access_key_id.is_some(),
            max_keys = self.storage.max_keys,
            "Storage configuration"
        );

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            default_bucket = %self.lookup.bucket_name,
            default_prefix = %self.lookup.prefix,
            "Lookup defaults"
        );
    }

    /// Returns a list of enabled compile-time features.
    fn enabled_features() -> Vec<&'static str> {
        [cfg!(feature = "dotenv").then_some("dotenv")]
        .into_iter()
        .flatten()
        .collect()
    }
}
