//! Completed-query events handed to hooks by the host pipeline

use std::sync::Arc;
use std::time::Instant;

/// Error value carried by a failed query
///
/// Shared so the same value can travel from the host, through the event,
/// into the emitted record without being copied or re-rendered.
pub type QueryError = Arc<dyn std::error::Error + Send + Sync + 'static>;

/// Longest operation label derived from query text
const MAX_OPERATION_LEN: usize = 16;

/// One completed attempt to execute a query
///
/// Produced by the host once per attempt. Hooks only read it.
#[derive(Clone, Debug)]
pub struct QueryEvent {
    /// Captured before execution began
    pub start_time: Instant,

    /// Literal query text
    pub query: String,

    /// Operation label (e.g. "SELECT", "INSERT")
    pub operation: String,

    /// Execution failure, if any
    pub error: Option<QueryError>,
}

impl QueryEvent {
    /// Create an event starting now, deriving the operation label from the query
    ///
    /// # Example
    ///
    /// ```
    /// use query_hook_log::QueryEvent;
    ///
    /// let event = QueryEvent::new("select * from users where id = $1");
    /// assert_eq!(event.operation, "SELECT");
    /// assert!(event.error.is_none());
    /// ```
    pub fn new(query: impl Into<String>) -> Self {
        let query = query.into();
        let operation = operation_from_query(&query);

        Self {
            start_time: Instant::now(),
            query,
            operation,
            error: None,
        }
    }

    /// Override the start timestamp
    pub fn with_start_time(mut self, start_time: Instant) -> Self {
        self.start_time = start_time;
        self
    }

    /// Override the derived operation label
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = operation.into();
        self
    }

    /// Mark the event as failed
    pub fn with_error<E>(mut self, error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.error = Some(Arc::new(error));
        self
    }

    /// Mark the event as failed with an already shared error value
    pub fn with_shared_error(mut self, error: QueryError) -> Self {
        self.error = Some(error);
        self
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Derive an operation label from query text
///
/// Takes the leading keyword (split on any whitespace) capped at 16
/// characters. The label is ASCII upper-cased so `select` and `SELECT`
/// share one operation value. An empty or all-whitespace query yields an
/// empty label.
pub fn operation_from_query(query: &str) -> String {
    query
        .split_whitespace()
        .next()
        .map(|keyword| {
            keyword
                .chars()
                .take(MAX_OPERATION_LEN)
                .collect::<String>()
                .to_ascii_uppercase()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;
    use std::time::Duration;

    #[derive(Debug)]
    struct DbError;

    impl fmt::Display for DbError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "database error")
        }
    }

    impl std::error::Error for DbError {}

    #[test]
    fn test_operation_from_query() {
        assert_eq!(operation_from_query("SELECT * FROM users"), "SELECT");
        assert_eq!(operation_from_query("  insert into t values (1)"), "INSERT");
        assert_eq!(operation_from_query("\n\tDELETE\nFROM t"), "DELETE");
        assert_eq!(operation_from_query("BEGIN"), "BEGIN");
    }

    #[test]
    fn test_operation_from_empty_query() {
        assert_eq!(operation_from_query(""), "");
        assert_eq!(operation_from_query("   \n"), "");
    }

    #[test]
    fn test_operation_is_capped() {
        let label = operation_from_query("abcdefghijklmnopqrstuvwxyz rest");
        assert_eq!(label, "ABCDEFGHIJKLMNOP");
    }

    #[test]
    fn test_event_builders() {
        let start = Instant::now() - Duration::from_millis(50);
        let event = QueryEvent::new("UPDATE users SET name = $1")
            .with_start_time(start)
            .with_operation("custom")
            .with_error(DbError);

        assert_eq!(event.start_time, start);
        assert_eq!(event.operation, "custom");
        assert!(event.is_error());
        assert_eq!(event.error.unwrap().to_string(), "database error");
    }

    #[test]
    fn test_shared_error_is_not_copied() {
        let err: QueryError = Arc::new(DbError);
        let event = QueryEvent::new("SELECT 1").with_shared_error(Arc::clone(&err));

        assert!(Arc::ptr_eq(event.error.as_ref().unwrap(), &err));
    }
}
