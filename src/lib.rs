//! Query hook that turns completed database queries into structured log records.
//!
//! Failed queries are always logged at error level; successful queries are
//! logged at debug level only when they take at least the configured slow
//! threshold. Fast successful queries produce no output.

pub mod capture;
pub mod config;
pub mod context;
pub mod error;
pub mod event;
pub mod hook;
pub mod observer;
pub mod record;
pub mod replay;
pub mod sink;

pub use capture::{CaptureLayer, CapturedEvent, CapturedEvents};
pub use config::{HookSettings, LogFormat, LoggingSettings, ReplayConfig};
pub use context::QueryContext;
pub use error::ReplayError;
pub use event::{operation_from_query, QueryError, QueryEvent};
pub use hook::{duration_millis, HookOptions, QueryHook, QueryLogHook};
pub use observer::{ObservedRecord, ObservedSink};
pub use record::{
    Field, FieldValue, LogAction, Severity, StructuredRecord, ERROR_FIELD, OPERATION_FIELD,
    OPERATION_TIME_FIELD,
};
pub use sink::{LogSink, TracingSink, TRACING_TARGET};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize tracing/logging
///
/// `RUST_LOG` takes precedence over `level`. Fails if a global subscriber is
/// already installed.
pub fn init_tracing(level: &str, format: LogFormat) -> Result<(), ReplayError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(filter);

    let result = match format {
        LogFormat::Json => registry.with(fmt::layer().json().with_target(true)).try_init(),
        LogFormat::Text => registry.with(fmt::layer().with_target(true)).try_init(),
    };

    result.map_err(|e| ReplayError::Subscriber(e.to_string()))
}
