//! Logging output configuration.

use clap::{Args, ValueEnum};

/// Log line format.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line, for CloudWatch Logs Insights.
    Json,
}

/// Logging output configuration.
///
/// The level filter itself comes from `RUST_LOG` (default: info).
#[derive(Debug, Clone, Args)]
pub struct TelemetryConfig {
    /// Log line format.
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value = "text")]
    pub log_format: LogFormat,

    /// Emit ANSI colors in text logs. Keep off inside Lambda.
    #[arg(long, env = "LOG_ANSI", default_value_t = false)]
    pub log_ansi: bool,
}
