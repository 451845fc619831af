use crate::client::ExecResult;
use crate::error::OrmError;
use crate::model::TableModel;
use std::collections::BTreeMap;
use std::fmt;
use std::time::{Duration, Instant};

/// The type of SQL operation being performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryType {
    /// INSERT statement
    Insert,
    /// Other SQL (e.g., DDL, ALTER)
    Other,
}

impl QueryType {
    /// Detect query type from SQL string.
    pub fn from_sql(sql: &str) -> Self {
        let trimmed = strip_sql_prefix(sql);
        if starts_with_keyword(trimmed, "INSERT") {
            QueryType::Insert
        } else {
            QueryType::Other
        }
    }

    /// Upper-case operation name.
    pub fn as_str(self) -> &'static str {
        match self {
            QueryType::Insert => "INSERT",
            QueryType::Other => "OTHER",
        }
    }
}

/// Strip leading whitespace, SQL comments (`--` and `/* */`), and parentheses.
fn strip_sql_prefix(sql: &str) -> &str {
    let mut s = sql;
    loop {
        let before = s;
        s = s.trim_start();
        if s.starts_with("--") {
            match s.find('\n') {
                Some(pos) => {
                    s = &s[pos + 1..];
                    continue;
                }
                None => return "",
            }
        }
        if s.starts_with("/*") {
            match s.find("*/") {
                Some(pos) => {
                    s = &s[pos + 2..];
                    continue;
                }
                None => return "",
            }
        }
        if let Some(rest) = s.strip_prefix('(') {
            s = rest;
            continue;
        }
        if s == before {
            break;
        }
    }
    s
}

fn starts_with_keyword(s: &str, keyword: &str) -> bool {
    match s.get(0..keyword.len()) {
        Some(prefix) => prefix.eq_ignore_ascii_case(keyword),
        None => false,
    }
}

/// Per-execution request context.
///
/// Created by the caller (or defaulted), enriched by hooks in
/// [`QueryHook::before_query`], then passed unchanged to the connection and
/// to [`QueryHook::after_query`].
#[derive(Debug, Clone, Default)]
pub struct QueryContext {
    /// Optional query name/tag for identification.
    pub tag: Option<String>,
    /// Optional structured fields for observability (low-cardinality).
    pub fields: BTreeMap<String, String>,
    /// Deadline the connection should honour, if any.
    pub deadline: Option<Instant>,
}

impl QueryContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tag to identify this query.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Add a structured field (low-cardinality).
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Set a deadline `timeout` from now.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some(Instant::now() + timeout);
        self
    }

    /// Set an absolute deadline.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Time left before the deadline. `None` means no deadline.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }
}

/// A single execution attempt, as seen by hooks.
#[derive(Clone, Copy)]
pub struct QueryEvent<'a> {
    /// Detected query type.
    pub query_type: QueryType,
    /// The rendered statement.
    pub sql: &'a str,
    /// The model bound to the statement, if any.
    pub model: Option<&'a dyn TableModel>,
    /// When the attempt started (before the `before_query` hooks ran).
    pub started_at: Instant,
}

impl<'a> QueryEvent<'a> {
    /// Create an event starting now.
    pub fn new(query_type: QueryType, sql: &'a str, model: Option<&'a dyn TableModel>) -> Self {
        Self {
            query_type,
            sql,
            model,
            started_at: Instant::now(),
        }
    }

    /// Time since the attempt started.
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }
}

impl fmt::Debug for QueryEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryEvent")
            .field("query_type", &self.query_type)
            .field("sql", &self.sql)
            .field("has_model", &self.model.is_some())
            .field("started_at", &self.started_at)
            .finish()
    }
}

/// Result of an execution attempt, as seen by hooks.
pub type QueryOutcome<'a> = Result<&'a ExecResult, &'a OrmError>;

/// Trait for observing the query execution lifecycle.
///
/// Hooks are notified exactly once before and once after every execution
/// attempt that reaches the connection, including failed ones. They cannot
/// change control flow.
pub trait QueryHook: Send + Sync {
    /// Called before the statement is sent. May enrich `ctx`.
    fn before_query(&self, ctx: &mut QueryContext, event: &QueryEvent<'_>) {
        let _ = (ctx, event);
    }

    /// Called after the connection returned, successfully or not.
    fn after_query(&self, ctx: &QueryContext, event: &QueryEvent<'_>, outcome: QueryOutcome<'_>) {
        let _ = (ctx, event, outcome);
    }
}
