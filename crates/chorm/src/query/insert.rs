//! `INSERT` statement builder.

use super::Query;
use super::base::{QueryBase, append_columns, append_joined};
use crate::client::{Connection, ExecResult};
use crate::db::Db;
use crate::error::{OrmError, OrmResult};
use crate::formatter::Formatter;
use crate::fragment::{FilterList, Fragment, Sep};
use crate::ident::Ident;
use crate::model::TableModel;
use crate::monitor::{QueryContext, QueryEvent, QueryType};
use crate::value::IntoArgs;

/// Builder for `INSERT INTO ... VALUES` and `INSERT INTO ... SELECT` statements.
///
/// With a single table the statement ends in ` VALUES` and rows are supplied
/// by the connection (from the bound model). When additional tables are
/// registered the statement selects from them instead, filtered by the
/// `where_*` conditions.
///
/// # Example
/// ```ignore
/// // INSERT INTO dst SELECT * FROM src WHERE id > 100
/// db.insert()
///     .table("dst")
///     .table_expr("src", ())
///     .where_expr("id > ?", (100,))
///     .exec()
///     .await?;
/// ```
pub struct InsertQuery<'a, C> {
    db: &'a Db<C>,
    base: QueryBase<'a>,
    filters: FilterList,
}

impl<'a, C: Connection> InsertQuery<'a, C> {
    pub fn new(db: &'a Db<C>) -> Self {
        Self {
            db,
            base: QueryBase::new(),
            filters: FilterList::new(),
        }
    }

    /// Bind a model. Its table is the insert target unless overridden, and
    /// its fields are the default column list.
    pub fn model(mut self, model: &'a dyn TableModel) -> Self {
        self.base.set_model(model);
        self
    }

    /// Record an error. Only the first recorded error is kept.
    pub fn err(mut self, err: OrmError) -> Self {
        self.base.set_err(err);
        self
    }

    // ── tables ──

    /// Add a table by name. The first table is the insert target when no model
    /// or override is set; further tables are selected from.
    pub fn table(mut self, name: &str) -> Self {
        self.base.add_table_name(name);
        self
    }

    /// Add several tables by name.
    pub fn tables<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            self.base.add_table_name(name.as_ref());
        }
        self
    }

    /// Add a table expression, e.g. a table function call.
    pub fn table_expr(mut self, sql: impl Into<String>, args: impl IntoArgs) -> Self {
        self.base.add_table(Fragment::query(sql, args));
        self
    }

    /// Override the insert target table.
    pub fn model_table(mut self, name: &str) -> Self {
        match Ident::parse(name) {
            Ok(ident) => self.base.set_model_table(Fragment::Ident(ident)),
            Err(e) => self.base.set_err(e),
        }
        self
    }

    /// Override the insert target with an expression.
    pub fn model_table_expr(mut self, sql: impl Into<String>, args: impl IntoArgs) -> Self {
        self.base.set_model_table(Fragment::query(sql, args));
        self
    }

    /// Add a `SETTINGS` clause entry, e.g. `setting("async_insert = ?", (1,))`.
    pub fn setting(mut self, sql: impl Into<String>, args: impl IntoArgs) -> Self {
        self.base.add_setting(Fragment::query(sql, args));
        self
    }

    // ── columns ──

    /// Add a column by name.
    pub fn column(mut self, name: &str) -> Self {
        self.base.add_column_name(name);
        self
    }

    /// Add several columns by name.
    pub fn columns<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            self.base.add_column_name(name.as_ref());
        }
        self
    }

    /// Add a column expression.
    pub fn column_expr(mut self, sql: impl Into<String>, args: impl IntoArgs) -> Self {
        self.base.add_column(Fragment::query(sql, args));
        self
    }

    /// Drop a model column from the default column list. `"*"` drops all.
    pub fn exclude_column(mut self, name: &str) -> Self {
        self.base.exclude_column(name);
        self
    }

    /// Drop several model columns from the default column list.
    pub fn exclude_columns<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            self.base.exclude_column(name.as_ref());
        }
        self
    }

    // ── filters ──

    /// Add a filter joined with AND.
    pub fn where_expr(mut self, sql: impl Into<String>, args: impl IntoArgs) -> Self {
        self.filters.push(Sep::And, Fragment::query(sql, args));
        self
    }

    /// Add a filter joined with OR.
    pub fn where_or(mut self, sql: impl Into<String>, args: impl IntoArgs) -> Self {
        self.filters.push(Sep::Or, Fragment::query(sql, args));
        self
    }

    /// Add a parenthesized group of filters.
    ///
    /// ```ignore
    /// // ... WHERE (ts > 0) AND ((kind = 'a') OR (kind = 'b'))
    /// q.where_expr("ts > ?", (0,)).where_group(Sep::And, |g| {
    ///     g.or(Fragment::query("kind = ?", ("a",)))
    ///         .or(Fragment::query("kind = ?", ("b",)))
    /// })
    /// ```
    pub fn where_group(mut self, sep: Sep, f: impl FnOnce(FilterList) -> FilterList) -> Self {
        let group = f(FilterList::new());
        self.filters.push(sep, Fragment::Filters(group));
        self
    }

    // ── rendering ──

    /// Render with the database's formatter.
    pub fn to_sql(&self) -> OrmResult<String> {
        self.build_sql(self.db.formatter())
    }

    fn append_values(&self, fmter: &Formatter, out: &mut String, target_sql: &str) -> OrmResult<()> {
        let others = self.base.other_tables(fmter, target_sql)?;
        if others.is_empty() {
            out.push_str(" VALUES");
            return Ok(());
        }

        out.push_str(" SELECT ");
        let fields = self.base.resolve_fields()?;
        if fields.is_empty() {
            out.push('*');
        } else {
            append_columns(fmter, out, &fields)?;
        }

        out.push_str(" FROM ");
        append_joined(fmter, out, others)?;

        if !self.filters.is_empty() {
            out.push_str(" WHERE ");
            self.filters.append_query(fmter, out)?;
        }
        Ok(())
    }

    // ── execution ──

    /// Render and execute the statement with a default context.
    pub async fn exec(&self) -> OrmResult<ExecResult> {
        self.exec_with(QueryContext::new()).await
    }

    /// Render and execute the statement.
    ///
    /// Render errors are returned before any hook runs or the connection is
    /// touched. Otherwise hooks see exactly one `before_query` and one
    /// `after_query`, and the connection's result is returned unchanged.
    pub async fn exec_with(&self, mut ctx: QueryContext) -> OrmResult<ExecResult> {
        let sql = self.to_sql()?;
        let model = self.base.model();
        let fields = match model {
            Some(_) => self.base.resolve_fields()?,
            None => Vec::new(),
        };

        let event = QueryEvent::new(QueryType::from_sql(&sql), &sql, model);
        self.db.before_query(&mut ctx, &event);

        let conn = self.db.connection();
        let result = match model {
            Some(model) => conn.insert(&ctx, model, &sql, &fields).await,
            None => conn.exec(&ctx, &sql).await,
        };

        self.db.after_query(&ctx, &event, &result);
        result
    }
}

impl<C: Connection> Query for InsertQuery<'_, C> {
    fn operation(&self) -> &'static str {
        "INSERT"
    }

    fn append_query(&self, fmter: &Formatter, out: &mut String) -> OrmResult<()> {
        if let Some(err) = self.base.err() {
            return Err(err.clone());
        }

        let start = out.len();
        let res = self.append_statement(fmter, out);
        if res.is_err() {
            out.truncate(start);
        }
        res
    }
}

impl<C: Connection> InsertQuery<'_, C> {
    fn append_statement(&self, fmter: &Formatter, out: &mut String) -> OrmResult<()> {
        let target = self.base.resolve_insert_table()?;
        out.push_str("INSERT INTO ");
        let start = out.len();
        target.append_query(fmter, out)?;
        let target_sql = out[start..].to_string();

        let fields = self.base.resolve_fields()?;
        if !fields.is_empty() {
            out.push_str(" (");
            append_columns(fmter, out, &fields)?;
            out.push(')');
        }

        self.append_values(fmter, out, &target_sql)?;
        self.base.append_settings(fmter, out)
    }
}

impl<C> std::fmt::Debug for InsertQuery<'_, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InsertQuery")
            .field("tables", &self.base.tables())
            .field("filters", &self.filters)
            .field("err", &self.base.err())
            .finish_non_exhaustive()
    }
}
