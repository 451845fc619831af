//! Database handle tying a connection, a formatter and hooks together.

use crate::client::{Connection, ExecResult};
use crate::error::OrmError;
use crate::formatter::Formatter;
use crate::monitor::{CompositeHook, QueryContext, QueryEvent, QueryHook};
use crate::query::InsertQuery;
use std::sync::Arc;

/// Entry point for building and executing statements.
///
/// `Db` is shared by reference; statements borrow it for their lifetime.
///
/// # Example
/// ```ignore
/// let db = Db::new(conn).add_hook(StatsHook::new());
/// db.insert().model(&event).exec().await?;
/// ```
pub struct Db<C> {
    conn: C,
    formatter: Formatter,
    hook: Option<Arc<dyn QueryHook>>,
}

impl<C: Connection> Db<C> {
    /// Wrap a connection with the default formatter and no hooks.
    pub fn new(conn: C) -> Self {
        Self {
            conn,
            formatter: Formatter::new(),
            hook: None,
        }
    }

    /// Set the formatter used to render statements.
    pub fn with_formatter(mut self, formatter: Formatter) -> Self {
        self.formatter = formatter;
        self
    }

    /// Set a query hook, replacing any existing one.
    pub fn with_hook<H: QueryHook + 'static>(mut self, hook: H) -> Self {
        self.hook = Some(Arc::new(hook));
        self
    }

    /// Set a query hook from an Arc, replacing any existing one.
    pub fn with_hook_arc(mut self, hook: Arc<dyn QueryHook>) -> Self {
        self.hook = Some(hook);
        self
    }

    /// Add a query hook.
    ///
    /// If a hook is already set, this composes it with the new hook (existing first).
    pub fn add_hook<H: QueryHook + 'static>(self, hook: H) -> Self {
        self.add_hook_arc(Arc::new(hook))
    }

    /// Add a query hook from an `Arc`.
    pub fn add_hook_arc(mut self, hook: Arc<dyn QueryHook>) -> Self {
        self.hook = Some(match self.hook.take() {
            None => hook,
            Some(existing) => Arc::new(CompositeHook::new().add_arc(existing).add_arc(hook)),
        });
        self
    }

    /// The formatter statements are rendered with.
    pub fn formatter(&self) -> &Formatter {
        &self.formatter
    }

    /// The underlying connection.
    pub fn connection(&self) -> &C {
        &self.conn
    }

    /// Start an `INSERT` statement.
    pub fn insert(&self) -> InsertQuery<'_, C> {
        InsertQuery::new(self)
    }

    pub(crate) fn before_query(&self, ctx: &mut QueryContext, event: &QueryEvent<'_>) {
        if let Some(hook) = &self.hook {
            hook.before_query(ctx, event);
        }
    }

    pub(crate) fn after_query(
        &self,
        ctx: &QueryContext,
        event: &QueryEvent<'_>,
        outcome: &Result<ExecResult, OrmError>,
    ) {
        if let Some(hook) = &self.hook {
            hook.after_query(ctx, event, outcome.as_ref());
        }
    }
}

impl<C> std::fmt::Debug for Db<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Db")
            .field("formatter", &self.formatter)
            .field("has_hook", &self.hook.is_some())
            .finish_non_exhaustive()
    }
}
