//! Telemetry and observability.

mod tracing;

pub use self::tracing::init_tracing;
