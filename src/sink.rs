//! Logging sinks that receive classified query records
//!
//! The hook never formats output itself. A sink receives the message and the
//! ordered field set and decides how to render, store or ship it.

use crate::record::{find_field, Field, FieldValue, Severity, OPERATION_FIELD, OPERATION_TIME_FIELD, ERROR_FIELD};

/// Target used for events emitted through [`TracingSink`]
pub const TRACING_TARGET: &str = "query_hook";

/// Leveled structured logging capability
///
/// Implementations must be cheap to call from the query completion path and
/// manage their own backpressure.
pub trait LogSink: Send + Sync {
    fn debug(&self, message: &str, fields: &[Field]);

    fn error(&self, message: &str, fields: &[Field]);

    /// Dispatch to the method matching `severity`
    fn log(&self, severity: Severity, message: &str, fields: &[Field]) {
        match severity {
            Severity::Debug => self.debug(message, fields),
            Severity::Error => self.error(message, fields),
        }
    }
}

/// Sink that forwards records to the `tracing` facade
///
/// Records are emitted under the `query_hook` target with `operation`,
/// `operation_time_ms` and (for failures) `error` as event fields. Whatever
/// subscriber the application installed handles formatting.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl TracingSink {
    pub fn new() -> Self {
        Self
    }
}

struct EventFields<'a> {
    operation: &'a str,
    operation_time_ms: i64,
    error: Option<&'a (dyn std::error::Error + 'static)>,
}

impl<'a> EventFields<'a> {
    fn from_fields(fields: &'a [Field]) -> Self {
        let operation = match find_field(fields, OPERATION_FIELD) {
            Some(FieldValue::String(s)) => s.as_str(),
            _ => "",
        };
        let operation_time_ms = match find_field(fields, OPERATION_TIME_FIELD) {
            Some(FieldValue::Int64(ms)) => *ms,
            _ => 0,
        };
        let error = match find_field(fields, ERROR_FIELD) {
            Some(FieldValue::Error(err)) => Some(&**err as &(dyn std::error::Error + 'static)),
            _ => None,
        };

        Self {
            operation,
            operation_time_ms,
            error,
        }
    }
}

impl LogSink for TracingSink {
    fn debug(&self, message: &str, fields: &[Field]) {
        let f = EventFields::from_fields(fields);
        tracing::debug!(
            target: TRACING_TARGET,
            operation = f.operation,
            operation_time_ms = f.operation_time_ms,
            error = f.error,
            "{}",
            message
        );
    }

    fn error(&self, message: &str, fields: &[Field]) {
        let f = EventFields::from_fields(fields);
        tracing::error!(
            target: TRACING_TARGET,
            operation = f.operation,
            operation_time_ms = f.operation_time_ms,
            error = f.error,
            "{}",
            message
        );
    }
}
