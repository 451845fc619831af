use super::*;
use crate::client::ExecResult;
use crate::error::OrmError;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

#[derive(Default)]
struct Recorder {
    calls: Mutex<Vec<String>>,
}

impl QueryHook for Recorder {
    fn before_query(&self, ctx: &mut QueryContext, event: &QueryEvent<'_>) {
        ctx.fields.insert("seen".into(), "yes".into());
        self.calls
            .lock()
            .unwrap()
            .push(format!("before {}", event.sql));
    }

    fn after_query(&self, ctx: &QueryContext, event: &QueryEvent<'_>, outcome: QueryOutcome<'_>) {
        self.calls.lock().unwrap().push(format!(
            "after {} ok={} seen={}",
            event.sql,
            outcome.is_ok(),
            ctx.fields.get("seen").map(String::as_str).unwrap_or("no"),
        ));
    }
}

fn event(sql: &str) -> QueryEvent<'_> {
    QueryEvent::new(QueryType::from_sql(sql), sql, None)
}

#[test]
fn test_query_type_detection() {
    assert_eq!(QueryType::from_sql("SELECT 1"), QueryType::Other);
    assert_eq!(
        QueryType::from_sql("INSERT INTO events (id) VALUES"),
        QueryType::Insert
    );
    assert_eq!(
        QueryType::from_sql("-- load\n/* nightly */ insert INTO t SELECT * FROM s"),
        QueryType::Insert
    );
    assert_eq!(
        QueryType::from_sql("OPTIMIZE TABLE events FINAL"),
        QueryType::Other
    );
    assert_eq!(QueryType::from_sql(""), QueryType::Other);
    assert_eq!(QueryType::Insert.as_str(), "INSERT");
}

#[test]
fn test_query_context_builders() {
    let ctx = QueryContext::new()
        .with_tag("nightly")
        .with_field("tenant", "acme")
        .with_timeout(Duration::from_secs(60));
    assert_eq!(ctx.tag.as_deref(), Some("nightly"));
    assert_eq!(ctx.fields.get("tenant").map(String::as_str), Some("acme"));
    let remaining = ctx.remaining().unwrap();
    assert!(remaining <= Duration::from_secs(60));
    assert!(remaining > Duration::from_secs(50));

    assert_eq!(QueryContext::new().remaining(), None);

    let expired = QueryContext {
        deadline: Some(Instant::now()),
        ..Default::default()
    };
    assert_eq!(expired.remaining(), Some(Duration::ZERO));
}

#[test]
fn test_composite_hook_runs_in_order() {
    let first = Arc::new(Recorder::default());
    let second = Arc::new(Recorder::default());
    let hook = CompositeHook::new()
        .add_arc(first.clone())
        .add_arc(second.clone());
    assert_eq!(hook.len(), 2);

    let mut ctx = QueryContext::new();
    let ev = event("INSERT INTO t VALUES");
    hook.before_query(&mut ctx, &ev);
    hook.after_query(&ctx, &ev, Ok(&ExecResult::new(1)));

    let expected = vec![
        "before INSERT INTO t VALUES".to_string(),
        "after INSERT INTO t VALUES ok=true seen=yes".to_string(),
    ];
    assert_eq!(*first.calls.lock().unwrap(), expected);
    assert_eq!(*second.calls.lock().unwrap(), expected);
}

#[test]
fn test_noop_and_empty_composite() {
    let mut ctx = QueryContext::new();
    let ev = event("SELECT 1");
    NoopHook.before_query(&mut ctx, &ev);
    CompositeHook::new().after_query(&ctx, &ev, Err(&OrmError::Cancelled));
    assert!(CompositeHook::new().is_empty());
    assert!(ctx.fields.is_empty());
}

#[test]
fn test_stats_hook() {
    let hook = StatsHook::new();

    hook.record(
        "INSERT INTO a VALUES",
        QueryType::Insert,
        Duration::from_millis(10),
        Ok(&ExecResult::new(5)),
    );
    hook.record(
        "INSERT INTO b SELECT * FROM c",
        QueryType::Insert,
        Duration::from_millis(30),
        Ok(&ExecResult::new(7)),
    );
    hook.record(
        "OPTIMIZE TABLE a",
        QueryType::Other,
        Duration::from_millis(20),
        Err(&OrmError::server(60, "Table default.a doesn't exist")),
    );

    let stats = hook.stats();
    assert_eq!(stats.total_queries, 3);
    assert_eq!(stats.failed_queries, 1);
    assert_eq!(stats.insert_count, 2);
    assert_eq!(stats.rows_written, 12);
    assert_eq!(stats.total_duration, Duration::from_millis(60));
    assert_eq!(stats.max_duration, Duration::from_millis(30));
    assert_eq!(
        stats.slowest_query.as_deref(),
        Some("INSERT INTO b SELECT * FROM c")
    );

    hook.reset();
    assert_eq!(hook.stats(), QueryStats::default());
}

#[test]
fn test_stats_hook_via_trait() {
    let hook = StatsHook::new();
    let ctx = QueryContext::new();
    let ev = event("INSERT INTO t VALUES");
    hook.after_query(&ctx, &ev, Err(&OrmError::Timeout(Duration::from_secs(1))));
    let stats = hook.stats();
    assert_eq!(stats.total_queries, 1);
    assert_eq!(stats.failed_queries, 1);
    assert_eq!(stats.rows_written, 0);
}

#[test]
fn test_truncate_sql_bytes_respects_char_boundary() {
    assert_eq!(truncate_sql_bytes("SELECT 1", 100), "SELECT 1");
    assert_eq!(truncate_sql_bytes("SELECT 1", 6), "SELECT");
    // 'é' is two bytes; cutting in the middle backs off.
    assert_eq!(truncate_sql_bytes("é", 1), "");
}

#[cfg(feature = "tracing")]
#[test]
fn test_tracing_hook_truncation() {
    let hook = TracingHook::new().max_sql_length(10);
    assert_eq!(hook.truncate_sql("INSERT INTO events VALUES"), "INSERT INT...");
    assert_eq!(hook.truncate_sql("SELECT 1"), "SELECT 1");
    let hook = hook.no_truncate();
    assert_eq!(
        hook.truncate_sql("INSERT INTO events VALUES"),
        "INSERT INTO events VALUES"
    );
}
