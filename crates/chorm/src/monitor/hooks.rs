use super::types::{QueryContext, QueryEvent, QueryHook, QueryOutcome, QueryType};
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// A no-op hook that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHook;

impl QueryHook for NoopHook {}

/// A composite hook that delegates to multiple hooks in registration order.
#[derive(Clone, Default)]
pub struct CompositeHook {
    hooks: Vec<Arc<dyn QueryHook>>,
}

impl CompositeHook {
    /// Create an empty composite hook.
    pub fn new() -> Self {
        Self { hooks: Vec::new() }
    }

    /// Add a hook.
    #[allow(clippy::should_implement_trait)]
    pub fn add<H: QueryHook + 'static>(mut self, hook: H) -> Self {
        self.hooks.push(Arc::new(hook));
        self
    }

    /// Add an Arc-wrapped hook.
    pub fn add_arc(mut self, hook: Arc<dyn QueryHook>) -> Self {
        self.hooks.push(hook);
        self
    }

    /// Number of registered hooks.
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    /// Check if no hook is registered.
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

impl QueryHook for CompositeHook {
    fn before_query(&self, ctx: &mut QueryContext, event: &QueryEvent<'_>) {
        for hook in &self.hooks {
            hook.before_query(ctx, event);
        }
    }

    fn after_query(&self, ctx: &QueryContext, event: &QueryEvent<'_>, outcome: QueryOutcome<'_>) {
        for hook in &self.hooks {
            hook.after_query(ctx, event, outcome);
        }
    }
}

/// A hook that tracks execution statistics.
#[derive(Debug, Default)]
pub struct StatsHook {
    total_queries: AtomicU64,
    failed_queries: AtomicU64,
    insert_count: AtomicU64,
    rows_written: AtomicU64,
    total_duration_nanos: AtomicU64,
    max_duration_nanos: AtomicU64,
    slowest_query: Mutex<Option<String>>,
}

/// Collected query statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryStats {
    /// Total number of executions that reached the connection.
    pub total_queries: u64,
    /// Number of executions that returned an error.
    pub failed_queries: u64,
    /// Number of INSERT statements.
    pub insert_count: u64,
    /// Rows reported written by successful executions.
    pub rows_written: u64,
    /// Total execution time.
    pub total_duration: Duration,
    /// Slowest execution time.
    pub max_duration: Duration,
    /// Slowest statement.
    pub slowest_query: Option<String>,
}

impl StatsHook {
    /// Create a new stats hook.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a snapshot of current statistics.
    pub fn stats(&self) -> QueryStats {
        QueryStats {
            total_queries: self.total_queries.load(Ordering::Relaxed),
            failed_queries: self.failed_queries.load(Ordering::Relaxed),
            insert_count: self.insert_count.load(Ordering::Relaxed),
            rows_written: self.rows_written.load(Ordering::Relaxed),
            total_duration: Duration::from_nanos(self.total_duration_nanos.load(Ordering::Relaxed)),
            max_duration: Duration::from_nanos(self.max_duration_nanos.load(Ordering::Relaxed)),
            slowest_query: self
                .slowest_query
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .clone(),
        }
    }

    /// Reset all statistics.
    pub fn reset(&self) {
        self.total_queries.store(0, Ordering::Relaxed);
        self.failed_queries.store(0, Ordering::Relaxed);
        self.insert_count.store(0, Ordering::Relaxed);
        self.rows_written.store(0, Ordering::Relaxed);
        self.total_duration_nanos.store(0, Ordering::Relaxed);
        self.max_duration_nanos.store(0, Ordering::Relaxed);
        *self.slowest_query.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }

    pub(crate) fn record(&self, sql: &str, query_type: QueryType, duration: Duration, outcome: QueryOutcome<'_>) {
        let duration_nanos = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);

        self.total_queries.fetch_add(1, Ordering::Relaxed);
        let prev_total = self
            .total_duration_nanos
            .fetch_add(duration_nanos, Ordering::Relaxed);
        if prev_total.checked_add(duration_nanos).is_none() {
            // Saturate instead of wrapping.
            self.total_duration_nanos.store(u64::MAX, Ordering::Relaxed);
        }

        if query_type == QueryType::Insert {
            self.insert_count.fetch_add(1, Ordering::Relaxed);
        }

        match outcome {
            Ok(res) => {
                self.rows_written
                    .fetch_add(res.rows_affected(), Ordering::Relaxed);
            }
            Err(_) => {
                self.failed_queries.fetch_add(1, Ordering::Relaxed);
            }
        }

        // Only the new maximum records its SQL.
        let mut current_max = self.max_duration_nanos.load(Ordering::Relaxed);
        while duration_nanos > current_max {
            match self.max_duration_nanos.compare_exchange_weak(
                current_max,
                duration_nanos,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => {
                    *self.slowest_query.lock().unwrap_or_else(|e| e.into_inner()) =
                        Some(sql.to_string());
                    break;
                }
                Err(updated) => current_max = updated,
            }
        }
    }
}

impl QueryHook for StatsHook {
    fn after_query(&self, _ctx: &QueryContext, event: &QueryEvent<'_>, outcome: QueryOutcome<'_>) {
        self.record(event.sql, event.query_type, event.elapsed(), outcome);
    }
}

impl<H: QueryHook + ?Sized> QueryHook for Arc<H> {
    fn before_query(&self, ctx: &mut QueryContext, event: &QueryEvent<'_>) {
        (**self).before_query(ctx, event);
    }

    fn after_query(&self, ctx: &QueryContext, event: &QueryEvent<'_>, outcome: QueryOutcome<'_>) {
        (**self).after_query(ctx, event, outcome);
    }
}
