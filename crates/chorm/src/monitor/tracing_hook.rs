use super::truncate_sql_bytes;
use super::types::{QueryContext, QueryEvent, QueryHook, QueryOutcome};
use std::time::Duration;
use tracing::Level;

/// A `tracing`-based hook that emits every statement sent to ClickHouse.
///
/// The SQL is logged before execution at `level`. Failures and executions
/// slower than `slow_query_threshold` are logged again at WARN afterwards.
///
/// Enable via the crate feature: `chorm = { features = ["tracing"] }`.
#[derive(Debug, Clone)]
pub struct TracingHook {
    /// Tracing event level to emit at.
    pub level: Level,
    /// Truncate long SQL strings (in bytes). `None` means no truncation.
    pub max_sql_length: Option<usize>,
    /// Executions slower than this are reported at WARN.
    pub slow_query_threshold: Option<Duration>,
}

impl Default for TracingHook {
    fn default() -> Self {
        Self {
            level: Level::DEBUG,
            max_sql_length: Some(200),
            slow_query_threshold: None,
        }
    }
}

impl TracingHook {
    /// Create a new hook with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the tracing event level.
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Set maximum SQL length to display.
    pub fn max_sql_length(mut self, len: usize) -> Self {
        self.max_sql_length = Some(len);
        self
    }

    /// Disable SQL truncation.
    pub fn no_truncate(mut self) -> Self {
        self.max_sql_length = None;
        self
    }

    /// Report executions slower than `threshold`.
    pub fn slow_query_threshold(mut self, threshold: Duration) -> Self {
        self.slow_query_threshold = Some(threshold);
        self
    }

    pub(crate) fn truncate_sql(&self, sql: &str) -> String {
        match self.max_sql_length {
            Some(max) if sql.len() > max => format!("{}...", truncate_sql_bytes(sql, max)),
            _ => sql.to_string(),
        }
    }
}

impl QueryHook for TracingHook {
    fn before_query(&self, ctx: &mut QueryContext, event: &QueryEvent<'_>) {
        macro_rules! emit_at_level {
            ($level:expr, $($field:tt)*) => {
                match $level {
                    Level::ERROR => tracing::error!($($field)*),
                    Level::WARN  => tracing::warn!($($field)*),
                    Level::INFO  => tracing::info!($($field)*),
                    Level::DEBUG => tracing::debug!($($field)*),
                    Level::TRACE => tracing::trace!($($field)*),
                }
            };
        }

        let sql = self.truncate_sql(event.sql);
        let tag = ctx.tag.as_deref().unwrap_or("-");
        emit_at_level!(
            self.level,
            target: "chorm.sql",
            query_type = event.query_type.as_str(),
            tag,
            has_model = event.model.is_some(),
            sql = %sql,
            fields = ?ctx.fields,
        );
    }

    fn after_query(&self, ctx: &QueryContext, event: &QueryEvent<'_>, outcome: QueryOutcome<'_>) {
        let elapsed = event.elapsed();
        let duration_ms = elapsed.as_secs_f64() * 1000.0;
        let tag = ctx.tag.as_deref().unwrap_or("-");
        match outcome {
            Err(err) => {
                let sql = self.truncate_sql(event.sql);
                tracing::warn!(
                    target: "chorm.sql",
                    query_type = event.query_type.as_str(),
                    tag,
                    duration_ms,
                    error = %err,
                    sql = %sql,
                    "query failed"
                );
            }
            Ok(res) => {
                if self.slow_query_threshold.is_some_and(|t| elapsed > t) {
                    let sql = self.truncate_sql(event.sql);
                    tracing::warn!(
                        target: "chorm.sql",
                        query_type = event.query_type.as_str(),
                        tag,
                        duration_ms,
                        rows = res.rows_affected(),
                        sql = %sql,
                        "slow query"
                    );
                }
            }
        }
    }
}
