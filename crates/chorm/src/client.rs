//! Connection trait implemented by ClickHouse transports.

use crate::error::OrmResult;
use crate::model::{Field, TableModel};
use crate::monitor::QueryContext;
use std::sync::Arc;

/// Outcome of an executed statement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecResult {
    rows_affected: u64,
}

impl ExecResult {
    /// Create a result reporting `rows_affected` written rows.
    pub fn new(rows_affected: u64) -> Self {
        Self { rows_affected }
    }

    /// Number of rows written by the statement.
    pub fn rows_affected(&self) -> u64 {
        self.rows_affected
    }
}

/// A live ClickHouse connection (or pool) that statements are executed on.
///
/// The query builders render SQL and hand it over; network I/O, cancellation
/// and deadlines from [`QueryContext`] are the implementation's job. Errors
/// are returned to the caller unchanged.
pub trait Connection: Send + Sync {
    /// Execute a statement that carries everything in its text.
    fn exec(
        &self,
        ctx: &QueryContext,
        sql: &str,
    ) -> impl std::future::Future<Output = OrmResult<ExecResult>> + Send;

    /// Execute an `INSERT ... VALUES` whose rows come from `model`.
    ///
    /// `fields` lists the columns of the statement, in order, so the
    /// implementation can stream the matching per-column values.
    fn insert(
        &self,
        ctx: &QueryContext,
        model: &dyn TableModel,
        sql: &str,
        fields: &[Field],
    ) -> impl std::future::Future<Output = OrmResult<ExecResult>> + Send;
}

impl<C: Connection> Connection for &C {
    fn exec(
        &self,
        ctx: &QueryContext,
        sql: &str,
    ) -> impl std::future::Future<Output = OrmResult<ExecResult>> + Send {
        (**self).exec(ctx, sql)
    }

    fn insert(
        &self,
        ctx: &QueryContext,
        model: &dyn TableModel,
        sql: &str,
        fields: &[Field],
    ) -> impl std::future::Future<Output = OrmResult<ExecResult>> + Send {
        (**self).insert(ctx, model, sql, fields)
    }
}

impl<C: Connection> Connection for Arc<C> {
    fn exec(
        &self,
        ctx: &QueryContext,
        sql: &str,
    ) -> impl std::future::Future<Output = OrmResult<ExecResult>> + Send {
        (**self).exec(ctx, sql)
    }

    fn insert(
        &self,
        ctx: &QueryContext,
        model: &dyn TableModel,
        sql: &str,
        fields: &[Field],
    ) -> impl std::future::Future<Output = OrmResult<ExecResult>> + Send {
        (**self).insert(ctx, model, sql, fields)
    }
}
