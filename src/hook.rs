//! Query hook that logs failed and slow queries
//!
//! Hosts call [`QueryHook::before_query`] before executing a query and
//! [`QueryHook::after_query`] exactly once after every attempt, including
//! failed ones. [`QueryLogHook`] turns each completed event into at most one
//! record on its sink:
//!
//! | Event                              | Emitted                         |
//! |------------------------------------|---------------------------------|
//! | error present                      | error, 3 fields (any duration)  |
//! | no error, `elapsed >= threshold`   | debug, 2 fields                 |
//! | no error, `elapsed < threshold`    | nothing                         |
//!
//! The slow comparison is inclusive: a query that takes exactly the
//! threshold is logged. With the default zero threshold every successful
//! query is logged at debug.

use crate::context::QueryContext;
use crate::event::QueryEvent;
use crate::record::{LogAction, StructuredRecord};
use crate::sink::LogSink;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Two-phase extension point invoked by the host execution pipeline
pub trait QueryHook: Send + Sync {
    /// Called before the query executes
    fn before_query(&self, ctx: QueryContext) -> QueryContext;

    /// Called once the query attempt completed, successfully or not
    fn after_query(&self, ctx: &QueryContext, event: &QueryEvent);
}

/// Options for [`QueryLogHook::new`]
#[derive(Clone, Default)]
pub struct HookOptions {
    /// Destination for emitted records. `None` turns emission into a no-op.
    pub sink: Option<Arc<dyn LogSink>>,

    /// Successful queries at or above this duration are logged at debug
    pub slow_threshold: Duration,
}

impl HookOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn with_slow_threshold(mut self, threshold: Duration) -> Self {
        self.slow_threshold = threshold;
        self
    }
}

impl fmt::Debug for HookOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookOptions")
            .field("sink", &self.sink.is_some())
            .field("slow_threshold", &self.slow_threshold)
            .finish()
    }
}

/// Hook that classifies completed queries and logs errors and slow queries
///
/// Configuration is fixed at construction; the hook holds no mutable state
/// and can be shared across threads freely.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use std::time::Duration;
/// use query_hook_log::{HookOptions, ObservedSink, QueryContext, QueryEvent, QueryHook, QueryLogHook, Severity};
///
/// let sink = Arc::new(ObservedSink::new(Severity::Debug));
/// let hook = QueryLogHook::new(
///     HookOptions::new()
///         .with_sink(sink.clone())
///         .with_slow_threshold(Duration::from_millis(200)),
/// );
///
/// let ctx = hook.before_query(QueryContext::new());
/// hook.after_query(&ctx, &QueryEvent::new("SELECT 1"));
/// assert!(sink.is_empty());
/// ```
#[derive(Clone, Debug)]
pub struct QueryLogHook {
    options: HookOptions,
}

impl QueryLogHook {
    pub fn new(options: HookOptions) -> Self {
        Self { options }
    }

    pub fn slow_threshold(&self) -> Duration {
        self.options.slow_threshold
    }

    pub fn has_sink(&self) -> bool {
        self.options.sink.is_some()
    }

    /// Decide what to log for `event` given how long it took
    ///
    /// Pure: no clock reads, no emission.
    pub fn classify(&self, event: &QueryEvent, elapsed: Duration) -> LogAction {
        let record = StructuredRecord::new(event.operation.as_str(), duration_millis(elapsed));

        if let Some(err) = &event.error {
            return LogAction::Error(record.with_error(Arc::clone(err)));
        }

        if elapsed >= self.options.slow_threshold {
            LogAction::Debug(record)
        } else {
            LogAction::Suppress
        }
    }

    /// Classify `event` with an already measured elapsed time and emit the result
    ///
    /// Returns the action taken. Used by hosts that time queries themselves.
    pub fn log_elapsed(&self, event: &QueryEvent, elapsed: Duration) -> LogAction {
        let action = self.classify(event, elapsed);
        self.emit(event, &action);
        action
    }

    fn emit(&self, event: &QueryEvent, action: &LogAction) {
        let Some(sink) = &self.options.sink else {
            return;
        };

        match action {
            LogAction::Suppress => {}
            LogAction::Debug(record) => sink.debug(&event.query, record.fields()),
            LogAction::Error(record) => sink.error(&event.query, record.fields()),
        }
    }
}

impl QueryHook for QueryLogHook {
    fn before_query(&self, ctx: QueryContext) -> QueryContext {
        ctx
    }

    fn after_query(&self, _ctx: &QueryContext, event: &QueryEvent) {
        self.log_elapsed(event, event.start_time.elapsed());
    }
}

/// Whole milliseconds in `elapsed`, truncated
pub fn duration_millis(elapsed: Duration) -> i64 {
    i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX)
}
