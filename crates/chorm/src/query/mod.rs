//! Statement builders.
//!
//! Builders collect [`Fragment`](crate::Fragment)s through a consuming
//! `self -> Self` chain and render them on demand. Invalid input is recorded
//! as the builder's first error instead of panicking; rendering then returns
//! that error and no SQL.

mod base;
mod insert;

#[cfg(test)]
mod tests;

use crate::error::OrmResult;
use crate::formatter::Formatter;

pub use base::QueryBase;
pub use insert::InsertQuery;

/// A statement that renders itself as SQL.
pub trait Query {
    /// Upper-case operation name, e.g. `"INSERT"`.
    fn operation(&self) -> &'static str;

    /// Append the full statement to `out`.
    ///
    /// On error `out` is left as it was.
    fn append_query(&self, fmter: &Formatter, out: &mut String) -> OrmResult<()>;

    /// Render the full statement into a fresh string.
    fn build_sql(&self, fmter: &Formatter) -> OrmResult<String> {
        let mut out = String::new();
        self.append_query(fmter, &mut out)?;
        Ok(out)
    }
}
