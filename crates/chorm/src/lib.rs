//! # chorm
//!
//! Injection-safe SQL construction for ClickHouse.
//!
//! ## Features
//!
//! - **Safe fragments**: identifiers, `?`-parameterized templates and raw SQL compose into one
//!   statement without string concatenation
//! - **ClickHouse literals**: arguments are rendered as escaped ClickHouse literals
//!   (`toDateTime(..)`, `unhex(..)`, arrays, tuples)
//! - **INSERT builder**: `INSERT ... VALUES` for model rows, `INSERT ... SELECT` from other tables
//! - **First error wins**: invalid builder input is reported on render, never as partial SQL
//! - **Pluggable transport**: bring any [`Connection`]; the builder only renders and dispatches
//! - **Query hooks**: observe every execution before and after it runs
//!
//! ## Example
//!
//! ```ignore
//! use chorm::{Db, Field, Fragment, TableModel};
//!
//! struct Event { id: u64, kind: String }
//!
//! impl TableModel for Event {
//!     fn insert_table(&self) -> Fragment { Fragment::raw("events") }
//!     fn fields(&self) -> Vec<Field> { vec![Field::column("id"), Field::column("kind")] }
//! }
//!
//! let db = Db::new(conn);
//!
//! // INSERT INTO events (id, kind) VALUES
//! db.insert().model(&event).exec().await?;
//!
//! // INSERT INTO events_daily SELECT * FROM events WHERE (ts >= today()) AND (kind = 'click')
//! db.insert()
//!     .table("events_daily")
//!     .table("events")
//!     .where_expr("ts >= today()", ())
//!     .where_expr("kind = ?", ("click",))
//!     .exec()
//!     .await?;
//! ```

pub mod client;
pub mod db;
pub mod error;
pub mod formatter;
pub mod fragment;
pub mod ident;
pub mod model;
pub mod monitor;
pub mod query;
pub mod value;

pub use client::{Connection, ExecResult};
pub use db::Db;
pub use error::{OrmError, OrmResult};
pub use formatter::{Formatter, IdentQuote};
pub use fragment::{Filter, FilterList, Fragment, Sep};
pub use ident::{Ident, IdentPart, IntoIdent};
pub use model::{Field, TableModel};
pub use monitor::{
    CompositeHook, NoopHook, QueryContext, QueryEvent, QueryHook, QueryOutcome, QueryStats,
    QueryType, StatsHook,
};
pub use query::{InsertQuery, Query, QueryBase};
pub use value::{IntoArgs, Value};

#[cfg(feature = "tracing")]
pub use monitor::TracingHook;
