//! Rendering tests for the query builders.

use super::Query;
use crate::client::{Connection, ExecResult};
use crate::db::Db;
use crate::error::{OrmError, OrmResult};
use crate::formatter::{Formatter, IdentQuote};
use crate::fragment::{Fragment, Sep};
use crate::model::{Field, TableModel};
use crate::monitor::QueryContext;
use crate::value::Value;

struct NullConn;

impl Connection for NullConn {
    async fn exec(&self, _: &QueryContext, _: &str) -> OrmResult<ExecResult> {
        Ok(ExecResult::default())
    }

    async fn insert(
        &self,
        _: &QueryContext,
        _: &dyn TableModel,
        _: &str,
        _: &[Field],
    ) -> OrmResult<ExecResult> {
        Ok(ExecResult::default())
    }
}

struct Event;

impl TableModel for Event {
    fn insert_table(&self) -> Fragment {
        Fragment::raw("events")
    }

    fn fields(&self) -> Vec<Field> {
        vec![
            Field::column("id"),
            Field::column("kind"),
            Field::column("Event Time"),
        ]
    }
}

fn db() -> Db<NullConn> {
    Db::new(NullConn)
}

#[test]
fn test_insert_values_from_table() {
    let db = db();
    assert_eq!(db.insert().table("t").to_sql().unwrap(), "INSERT INTO t VALUES");
    assert_eq!(db.insert().operation(), "INSERT");
}

#[test]
fn test_insert_values_from_model() {
    let db = db();
    let sql = db.insert().model(&Event).to_sql().unwrap();
    assert_eq!(sql, r#"INSERT INTO events (id, kind, "Event Time") VALUES"#);
}

#[test]
fn test_model_with_same_table_stays_values() {
    let db = db();
    let sql = db
        .insert()
        .model(&Event)
        .table("events")
        .exclude_column("Event Time")
        .to_sql()
        .unwrap();
    assert_eq!(sql, "INSERT INTO events (id, kind) VALUES");
}

#[test]
fn test_insert_select_with_filter() {
    let db = db();
    let sql = db
        .insert()
        .table("dst")
        .table_expr("src", ())
        .where_expr("id > ?", (100,))
        .to_sql()
        .unwrap();
    assert_eq!(sql, "INSERT INTO dst SELECT * FROM src WHERE id > 100");
}

#[test]
fn test_insert_select_without_filter() {
    let db = db();
    let sql = db.insert().table("t").table("u").to_sql().unwrap();
    assert_eq!(sql, "INSERT INTO t SELECT * FROM u");
}

#[test]
fn test_insert_select_with_columns_and_several_sources() {
    let db = db();
    let sql = db
        .insert()
        .tables(["dst", "a"])
        .table_expr("remote(?, db.b)", ("host:9000",))
        .columns(["id", "kind"])
        .where_expr("id > ?", (1,))
        .where_or("kind = ?", ("x",))
        .to_sql()
        .unwrap();
    assert_eq!(
        sql,
        "INSERT INTO dst (id, kind) SELECT id, kind FROM a, remote('host:9000', db.b) \
         WHERE (id > 1) OR (kind = 'x')"
    );
}

#[test]
fn test_model_with_other_table_selects() {
    let db = db();
    let sql = db
        .insert()
        .model(&Event)
        .table("events_buffer")
        .exclude_column("*")
        .to_sql()
        .unwrap();
    assert_eq!(sql, "INSERT INTO events SELECT * FROM events_buffer");
}

#[test]
fn test_where_group() {
    let db = db();
    let sql = db
        .insert()
        .table("dst")
        .table("src")
        .where_expr("ts > ?", (0,))
        .where_group(Sep::And, |g| {
            g.or(Fragment::query("kind = ?", ("a",)))
                .or(Fragment::query("kind = ?", ("b",)))
        })
        .to_sql()
        .unwrap();
    assert_eq!(
        sql,
        "INSERT INTO dst SELECT * FROM src WHERE (ts > 0) AND ((kind = 'a') OR (kind = 'b'))"
    );
}

#[test]
fn test_empty_group_emits_no_where() {
    let db = db();
    let sql = db
        .insert()
        .table("dst")
        .table("src")
        .where_group(Sep::And, |g| g)
        .to_sql()
        .unwrap();
    assert_eq!(sql, "INSERT INTO dst SELECT * FROM src");
}

#[test]
fn test_filters_ignored_for_values_shape() {
    let db = db();
    let sql = db.insert().table("t").where_expr("x > 1", ()).to_sql().unwrap();
    assert_eq!(sql, "INSERT INTO t VALUES");
}

#[test]
fn test_model_table_override() {
    let db = db();
    let sql = db
        .insert()
        .model(&Event)
        .model_table("events_v2")
        .exclude_column("Event Time")
        .to_sql()
        .unwrap();
    assert_eq!(sql, "INSERT INTO events_v2 (id, kind) VALUES");

    let sql = db
        .insert()
        .model(&Event)
        .model_table_expr("?", (Value::from(Fragment::ident("db.events_v3").unwrap()),))
        .column("id")
        .to_sql()
        .unwrap();
    assert_eq!(sql, "INSERT INTO db.events_v3 (id) VALUES");
}

#[test]
fn test_settings_come_last() {
    let db = db();
    let sql = db
        .insert()
        .table("dst")
        .table("src")
        .setting("max_threads = ?", (8,))
        .setting("insert_deduplicate = 0", ())
        .where_expr("id > 1", ())
        .to_sql()
        .unwrap();
    assert_eq!(
        sql,
        "INSERT INTO dst SELECT * FROM src WHERE id > 1 SETTINGS max_threads = 8, insert_deduplicate = 0"
    );

    let sql = db
        .insert()
        .table("t")
        .setting("async_insert = 1", ())
        .to_sql()
        .unwrap();
    assert_eq!(sql, "INSERT INTO t VALUES SETTINGS async_insert = 1");
}

#[test]
fn test_column_expr_without_model() {
    let db = db();
    let sql = db
        .insert()
        .table("t")
        .column("a")
        .column_expr("b", ())
        .to_sql()
        .unwrap();
    assert_eq!(sql, "INSERT INTO t (a, b) VALUES");
}

#[test]
fn test_quoted_identifiers_follow_formatter() {
    let db = Db::new(NullConn).with_formatter(Formatter::new().with_ident_quote(IdentQuote::Backtick));
    let sql = db.insert().model(&Event).to_sql().unwrap();
    assert_eq!(sql, "INSERT INTO events (id, kind, `Event Time`) VALUES");
}

#[test]
fn test_missing_table_is_config_error() {
    let db = db();
    let err = db.insert().column("a").to_sql().unwrap_err();
    assert_eq!(err, OrmError::config("query does not have a table"));
}

#[test]
fn test_unknown_model_column() {
    let db = db();
    let err = db.insert().model(&Event).column("nope").to_sql().unwrap_err();
    assert!(err.is_config());
    assert!(err.to_string().contains(r#"column "nope" does not exist in model"#));
}

#[test]
fn test_first_error_wins() {
    let db = db();
    let q = db
        .insert()
        .table("t")
        .err(OrmError::validation("first"))
        .table("bad name; --")
        .err(OrmError::validation("third"));
    assert_eq!(q.to_sql().unwrap_err(), OrmError::validation("first"));

    let q = db.insert().table("bad name; --").table("t");
    assert!(q.to_sql().is_err());
}

#[test]
fn test_error_returns_no_sql() {
    let db = db();
    let q = db.insert().table("t").err(OrmError::validation("boom"));
    let mut out = String::from("-- prefix");
    assert!(q.append_query(db.formatter(), &mut out).is_err());
    assert_eq!(out, "-- prefix");
}

#[test]
fn test_failed_render_leaves_buffer_untouched() {
    let db = db();
    let mut out = String::from("-- prefix");

    let err = db.insert().column("a").append_query(db.formatter(), &mut out).unwrap_err();
    assert!(err.is_config());
    assert_eq!(out, "-- prefix");

    let err = db
        .insert()
        .table("dst")
        .table("src")
        .where_expr("id = ?", ())
        .append_query(db.formatter(), &mut out)
        .unwrap_err();
    assert!(err.is_fragment());
    assert_eq!(out, "-- prefix");
}

#[test]
fn test_empty_filter_template_with_args_fails() {
    let db = db();
    let err = db
        .insert()
        .table("dst")
        .table("src")
        .where_expr("", (1,))
        .to_sql()
        .unwrap_err();
    assert_eq!(err, OrmError::fragment("", 0, 1));

    let err = db
        .insert()
        .table("dst")
        .table("src")
        .where_expr("x > 1", ())
        .where_expr("", (1, 2))
        .to_sql()
        .unwrap_err();
    assert_eq!(err, OrmError::fragment("", 0, 2));

    // A template that is empty with no arguments is still skipped.
    let sql = db
        .insert()
        .table("dst")
        .table("src")
        .where_expr("", ())
        .to_sql()
        .unwrap();
    assert_eq!(sql, "INSERT INTO dst SELECT * FROM src");
}

#[test]
fn test_placeholder_mismatch() {
    let db = db();
    let err = db
        .insert()
        .table("dst")
        .table("src")
        .where_expr("a = ? AND b = ?", (1,))
        .to_sql()
        .unwrap_err();
    assert_eq!(err, OrmError::fragment("a = ? AND b = ?", 2, 1));
}

#[test]
fn test_render_is_idempotent() {
    let db = db();
    let q = db
        .insert()
        .model(&Event)
        .table("events_buffer")
        .where_expr("kind IN ?", (Value::tuple(["a", "b"]),))
        .setting("max_threads = ?", (2,));
    let first = q.to_sql().unwrap();
    assert_eq!(first, q.to_sql().unwrap());
    assert_eq!(first, q.build_sql(&Formatter::new()).unwrap());
    assert_eq!(
        first,
        r#"INSERT INTO events (id, kind, "Event Time") SELECT id, kind, "Event Time" FROM events_buffer WHERE kind IN ('a', 'b') SETTINGS max_threads = 2"#
    );
}
