//! Safe SQL fragments.
//!
//! A [`Fragment`] is an immutable piece of SQL that knows how to render itself
//! into an output buffer. Builders only ever store fragments, so identifiers
//! are validated once, arguments are escaped by the [`Formatter`], and raw SQL
//! is an explicit opt-in.
//!
//! # Example
//! ```ignore
//! use chorm::{Fragment, Formatter};
//!
//! let f = Fragment::query("event_time > ? AND kind IN ?", ("2024-01-01", Value::tuple(["a", "b"])));
//! assert_eq!(
//!     f.to_sql(&Formatter::new())?,
//!     "event_time > '2024-01-01' AND kind IN ('a', 'b')"
//! );
//! ```

use crate::error::OrmResult;
use crate::formatter::Formatter;
use crate::ident::{Ident, IntoIdent};
use crate::value::{IntoArgs, Value};

/// A piece of SQL that renders itself through a [`Formatter`].
#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    /// A validated identifier, quoted per the formatter's rule.
    Ident(Ident),
    /// A template whose `?` placeholders are replaced with escaped `args`.
    Query { sql: String, args: Vec<Value> },
    /// Trusted SQL appended verbatim.
    Raw(String),
    /// Filters joined with AND/OR.
    Filters(FilterList),
}

impl Fragment {
    /// Parse and validate an identifier fragment.
    pub fn ident(name: impl IntoIdent) -> OrmResult<Self> {
        name.into_ident().map(Fragment::Ident)
    }

    /// Create a parameterized fragment.
    ///
    /// The placeholder count is checked when the fragment is rendered.
    pub fn query(sql: impl Into<String>, args: impl IntoArgs) -> Self {
        Fragment::Query {
            sql: sql.into(),
            args: args.into_args(),
        }
    }

    /// Create a raw fragment. The caller vouches for its safety.
    pub fn raw(sql: impl Into<String>) -> Self {
        Fragment::Raw(sql.into())
    }

    /// Check whether this fragment renders to nothing.
    ///
    /// A template with arguments is never empty, so its placeholder count is
    /// always checked on render.
    pub fn is_empty(&self) -> bool {
        match self {
            Fragment::Ident(_) => false,
            Fragment::Query { sql, args } => sql.is_empty() && args.is_empty(),
            Fragment::Raw(sql) => sql.is_empty(),
            Fragment::Filters(list) => list.is_empty(),
        }
    }

    /// Append the rendered SQL to `out`.
    pub fn append_query(&self, fmter: &Formatter, out: &mut String) -> OrmResult<()> {
        match self {
            Fragment::Ident(ident) => {
                fmter.append_ident(out, ident);
                Ok(())
            }
            Fragment::Query { sql, args } => fmter.append_query(out, sql, args),
            Fragment::Raw(sql) => {
                out.push_str(sql);
                Ok(())
            }
            Fragment::Filters(list) => list.append_query(fmter, out),
        }
    }

    /// Render into a fresh string.
    pub fn to_sql(&self, fmter: &Formatter) -> OrmResult<String> {
        let mut out = String::new();
        self.append_query(fmter, &mut out)?;
        Ok(out)
    }
}

impl From<Ident> for Fragment {
    fn from(ident: Ident) -> Self {
        Fragment::Ident(ident)
    }
}

impl From<FilterList> for Fragment {
    fn from(list: FilterList) -> Self {
        Fragment::Filters(list)
    }
}

/// Boolean separator placed before a filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sep {
    And,
    Or,
}

impl Sep {
    /// The separator token including surrounding spaces.
    pub fn as_sql(self) -> &'static str {
        match self {
            Sep::And => " AND ",
            Sep::Or => " OR ",
        }
    }
}

/// A filter and the separator joining it to the previous one.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub sep: Sep,
    pub fragment: Fragment,
}

/// An ordered list of filters forming one boolean expression.
///
/// The separator of the first rendered filter is ignored. A lone filter is
/// rendered as-is; with two or more, every filter is wrapped in parentheses so
/// operator precedence inside a filter never leaks into its neighbours.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterList {
    filters: Vec<Filter>,
}

impl FilterList {
    /// Create an empty filter list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a filter with an explicit separator.
    pub fn push(&mut self, sep: Sep, fragment: Fragment) {
        self.filters.push(Filter { sep, fragment });
    }

    /// Append a filter joined with AND.
    pub fn and(mut self, fragment: Fragment) -> Self {
        self.push(Sep::And, fragment);
        self
    }

    /// Append a filter joined with OR.
    pub fn or(mut self, fragment: Fragment) -> Self {
        self.push(Sep::Or, fragment);
        self
    }

    /// Check if no filter renders any SQL.
    pub fn is_empty(&self) -> bool {
        self.filters.iter().all(|f| f.fragment.is_empty())
    }

    /// Number of registered filters, including empty ones.
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Iterate over the registered filters.
    pub fn iter(&self) -> impl Iterator<Item = &Filter> {
        self.filters.iter()
    }

    /// Append the joined expression to `out`. An empty list appends nothing.
    pub fn append_query(&self, fmter: &Formatter, out: &mut String) -> OrmResult<()> {
        let live: Vec<&Filter> = self
            .filters
            .iter()
            .filter(|f| !f.fragment.is_empty())
            .collect();
        let wrap = live.len() > 1;

        for (i, filter) in live.into_iter().enumerate() {
            if i > 0 {
                out.push_str(filter.sep.as_sql());
            }
            if wrap {
                out.push('(');
            }
            filter.fragment.append_query(fmter, out)?;
            if wrap {
                out.push(')');
            }
        }
        Ok(())
    }
}
