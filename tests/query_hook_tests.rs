/// Integration tests for the query log hook against an observed sink
use query_hook_log::{
    Field, FieldValue, HookOptions, ObservedSink, QueryContext, QueryEvent, QueryHook,
    QueryLogHook, Severity, ERROR_FIELD, OPERATION_FIELD, OPERATION_TIME_FIELD,
};
use std::sync::Arc;
use std::time::{Duration, Instant};

const QUERY: &str = "SELECT * FROM users WHERE id = $1";

#[derive(Debug)]
struct DatabaseError;

impl std::fmt::Display for DatabaseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "database error")
    }
}

impl std::error::Error for DatabaseError {}

fn observed_hook(min: Severity, threshold: Duration) -> (QueryLogHook, Arc<ObservedSink>) {
    let sink = Arc::new(ObservedSink::new(min));
    let hook = QueryLogHook::new(
        HookOptions::new()
            .with_sink(sink.clone())
            .with_slow_threshold(threshold),
    );
    (hook, sink)
}

fn elapsed_field(fields: &[Field]) -> i64 {
    match fields[1].value {
        FieldValue::Int64(ms) => ms,
        ref other => panic!("operation_time_ms should be an integer, got {:?}", other),
    }
}

#[test]
fn test_zero_threshold_logs_fast_query_at_debug() {
    let (hook, sink) = observed_hook(Severity::Debug, Duration::ZERO);
    let event = QueryEvent::new(QUERY);

    hook.after_query(&QueryContext::new(), &event);

    let logs = sink.all();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].message, QUERY);
    assert_eq!(logs[0].severity, Severity::Debug);
    assert_eq!(
        logs[0].fields,
        vec![
            Field::string(OPERATION_FIELD, event.operation.clone()),
            Field::int64(OPERATION_TIME_FIELD, 0),
        ]
    );
}

#[test]
fn test_slow_query_logged_at_debug() {
    let (hook, sink) = observed_hook(Severity::Debug, Duration::from_millis(200));
    let event = QueryEvent::new(QUERY).with_start_time(Instant::now() - Duration::from_millis(300));

    hook.after_query(&QueryContext::new(), &event);

    let logs = sink.all();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].message, QUERY);
    assert_eq!(logs[0].severity, Severity::Debug);
    assert_eq!(logs[0].fields.len(), 2);
    assert_eq!(logs[0].fields[0], Field::string(OPERATION_FIELD, "SELECT"));
    let ms = elapsed_field(&logs[0].fields);
    assert!((300..1_000).contains(&ms), "unexpected operation_time_ms {}", ms);
}

#[test]
fn test_fast_query_below_threshold_is_suppressed() {
    let (hook, sink) = observed_hook(Severity::Debug, Duration::from_millis(200));

    hook.after_query(&QueryContext::new(), &QueryEvent::new(QUERY));

    assert_eq!(sink.len(), 0);
}

#[test]
fn test_failed_query_logged_at_error() {
    // Observer at error level still sees the failure
    let (hook, sink) = observed_hook(Severity::Error, Duration::from_secs(60));
    let event = QueryEvent::new(QUERY).with_error(DatabaseError);

    hook.after_query(&QueryContext::new(), &event);

    let logs = sink.all();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].message, QUERY);
    assert_eq!(logs[0].severity, Severity::Error);
    assert_eq!(logs[0].fields.len(), 3);
    assert_eq!(logs[0].fields[0], Field::string(OPERATION_FIELD, "SELECT"));
    assert_eq!(logs[0].fields[1], Field::int64(OPERATION_TIME_FIELD, 0));
    assert_eq!(logs[0].fields[2].key, ERROR_FIELD);
    assert_eq!(logs[0].fields[2].value.to_string(), "database error");
}

#[test]
fn test_slow_failed_query_logged_once_at_error() {
    let (hook, sink) = observed_hook(Severity::Debug, Duration::from_millis(10));
    let event = QueryEvent::new("DELETE FROM sessions")
        .with_start_time(Instant::now() - Duration::from_millis(50))
        .with_error(DatabaseError);

    hook.after_query(&QueryContext::new(), &event);

    let logs = sink.all();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].severity, Severity::Error);
    assert_eq!(logs[0].fields[0], Field::string(OPERATION_FIELD, "DELETE"));
}

#[test]
fn test_debug_records_dropped_by_error_level_observer() {
    let (hook, sink) = observed_hook(Severity::Error, Duration::ZERO);

    hook.after_query(&QueryContext::new(), &QueryEvent::new(QUERY));

    assert!(sink.is_empty());
}

#[test]
fn test_repeated_events_are_not_deduplicated() {
    let (hook, sink) = observed_hook(Severity::Debug, Duration::ZERO);
    let event = QueryEvent::new(QUERY).with_error(DatabaseError);
    let ctx = QueryContext::new();

    hook.after_query(&ctx, &event);
    hook.after_query(&ctx, &event);

    let logs = sink.all();
    assert_eq!(logs.len(), 2);
    assert_eq!(logs[0], logs[1]);
}

#[test]
fn test_before_query_is_passthrough() {
    let (hook, sink) = observed_hook(Severity::Debug, Duration::ZERO);
    let mut ctx = QueryContext::new().child();
    ctx.set_attribute("table", "users");

    let returned = hook.before_query(ctx.clone());

    assert_eq!(returned, ctx);
    assert!(sink.is_empty());
}

#[test]
fn test_hook_as_trait_object() {
    let (hook, sink) = observed_hook(Severity::Debug, Duration::ZERO);
    let hooks: Vec<Box<dyn QueryHook>> = vec![Box::new(hook.clone()), Box::new(hook)];

    let event = QueryEvent::new("INSERT INTO users (name) VALUES ($1)");
    for h in &hooks {
        let ctx = h.before_query(QueryContext::new());
        h.after_query(&ctx, &event);
    }

    assert_eq!(sink.len(), 2);
    assert!(sink
        .all()
        .iter()
        .all(|r| r.fields[0] == Field::string(OPERATION_FIELD, "INSERT")));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_after_query() {
    let (hook, sink) = observed_hook(Severity::Debug, Duration::from_millis(100));
    let hook = Arc::new(hook);

    let mut handles = Vec::new();
    for i in 0..64 {
        let hook = hook.clone();
        handles.push(tokio::spawn(async move {
            let event = if i % 2 == 0 {
                QueryEvent::new(format!("SELECT {}", i)).with_error(DatabaseError)
            } else {
                QueryEvent::new(format!("SELECT {}", i))
            };
            let ctx = hook.before_query(QueryContext::new());
            hook.after_query(&ctx, &event);
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    // Only the failures are logged; the fast successes stay below the threshold
    let logs = sink.all();
    assert_eq!(logs.len(), 32);
    assert!(logs.iter().all(|r| r.severity == Severity::Error));
}
