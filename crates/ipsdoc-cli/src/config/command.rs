//! Subcommands and their arguments.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result as AnyhowResult, anyhow};
use clap::{Args, Subcommand};
use serde_json::{Value, json};

/// Longest lifetime S3 accepts for a SigV4 presigned URL (7 days).
const MAX_PRESIGN_SECS: u64 = 7 * 24 * 60 * 60;

/// Operation to run.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Run the AWS Lambda runtime loop, handling one lookup per event.
    Serve(ServeArgs),
    /// Handle a single lookup event locally and print the response.
    Invoke(InvokeArgs),
    /// Print a presigned read URL for one object.
    Share(ShareArgs),
}

impl Command {
    /// Returns the subcommand name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Serve(_) => "serve",
            Self::Invoke(_) => "invoke",
            Self::Share(_) => "share",
        }
    }
}

/// Arguments for `serve`.
#[derive(Debug, Clone, Args)]
pub struct ServeArgs {
    /// Render the response body as a JSON string (API Gateway proxy shape).
    #[arg(long, env = "STRINGIFY_BODY", default_value_t = false)]
    pub stringify_body: bool,
}

/// Arguments for `invoke`.
#[derive(Debug, Clone, Args)]
pub struct InvokeArgs {
    /// Event JSON given inline.
    #[arg(long, conflicts_with = "file")]
    pub event: Option<String>,

    /// Path to a file holding the event JSON.
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Render the response body as a JSON string (API Gateway proxy shape).
    #[arg(long, default_value_t = false)]
    pub stringify_body: bool,
}

impl InvokeArgs {
    /// Event used when neither `--event` nor `--file` is given.
    pub fn sample_event() -> Value {
        json!({
            "bucketName": ipsdoc_locator::DEFAULT_BUCKET_NAME,
            "clientName": "Client_Name_1",
            "prefix": ipsdoc_locator::DEFAULT_PREFIX,
        })
    }

    /// Reads and parses the event to invoke with.
    pub fn load_event(&self) -> AnyhowResult<Value> {
        let raw = match (&self.event, &self.file) {
            (Some(event), _) => event.clone(),
            (None, Some(path)) => std::fs::read_to_string(path)
                .with_context(|| format!("failed to read event file {}", path.display()))?,
            (None, None) => return Ok(Self::sample_event()),
        };

        serde_json::from_str(&raw).context("event is not valid JSON")
    }
}

/// Arguments for `share`.
#[derive(Debug, Clone, Args)]
pub struct ShareArgs {
    /// Object key to share.
    #[arg(long)]
    pub key: String,

    /// Bucket holding the object (defaults to the default bucket).
    #[arg(long)]
    pub bucket: Option<String>,

    /// URL lifetime in seconds.
    #[arg(long, default_value_t = 3600)]
    pub expires_in: u64,
}

impl ShareArgs {
    /// Validates the arguments.
    pub fn validate(&self) -> AnyhowResult<()> {
        if self.key.is_empty() {
            return Err(anyhow!("object key must not be empty"));
        }

        if self.expires_in == 0 || self.expires_in > MAX_PRESIGN_SECS {
            return Err(anyhow!(
                "Expiration {} seconds is invalid. Must be between 1 and {MAX_PRESIGN_SECS} seconds.",
                self.expires_in
            ));
        }

        Ok(())
    }

    /// Returns the URL lifetime as a `Duration`.
    pub const fn expiration(&self) -> Duration {
        Duration::from_secs(self.expires_in)
    }
}
