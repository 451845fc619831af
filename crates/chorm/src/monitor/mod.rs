//! Query hooks for statement execution.
//!
//! Every execution that reaches the connection calls
//! [`QueryHook::before_query`] once before the statement is sent and
//! [`QueryHook::after_query`] once after the connection returned. Hooks
//! observe; they cannot abort or rewrite a statement.
//!
//! # Example
//!
//! ```rust,ignore
//! use chorm::monitor::{CompositeHook, StatsHook, QueryHook, QueryContext, QueryEvent};
//! use std::sync::Arc;
//!
//! struct TagHook;
//!
//! impl QueryHook for TagHook {
//!     fn before_query(&self, ctx: &mut QueryContext, _event: &QueryEvent<'_>) {
//!         ctx.fields.insert("service".into(), "ingest".into());
//!     }
//! }
//!
//! let stats = Arc::new(StatsHook::new());
//! let db = Db::new(conn)
//!     .with_hook(CompositeHook::new().add(TagHook).add_arc(stats.clone()));
//! ```

mod hooks;
mod types;

#[cfg(feature = "tracing")]
mod tracing_hook;

#[cfg(test)]
mod tests;

pub use hooks::{CompositeHook, NoopHook, QueryStats, StatsHook};
pub use types::{QueryContext, QueryEvent, QueryHook, QueryOutcome, QueryType};

#[cfg(feature = "tracing")]
pub use tracing_hook::TracingHook;

pub(crate) fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}
