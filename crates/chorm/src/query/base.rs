//! State shared by statement builders.

use crate::error::{OrmError, OrmResult};
use crate::formatter::Formatter;
use crate::fragment::Fragment;
use crate::ident::Ident;
use crate::model::{Field, TableModel};
use std::collections::BTreeSet;

/// Accumulated builder state: bound model, tables, columns and settings.
///
/// Every setter appends; the only value that is ever replaced is the model
/// table override. The first error recorded sticks and is returned by every
/// render.
#[derive(Clone, Default)]
pub struct QueryBase<'a> {
    model: Option<&'a dyn TableModel>,
    tables: Vec<Fragment>,
    model_table: Option<Fragment>,
    columns: Vec<Fragment>,
    excluded: BTreeSet<String>,
    settings: Vec<Fragment>,
    err: Option<OrmError>,
}

/// Which explicit table, if any, supplied the insert target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TargetSource {
    Override,
    Model,
    FirstTable,
}

impl<'a> QueryBase<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `err` unless an earlier error is already recorded.
    pub fn set_err(&mut self, err: OrmError) {
        if self.err.is_none() {
            self.err = Some(err);
        }
    }

    /// The recorded error, if any.
    pub fn err(&self) -> Option<&OrmError> {
        self.err.as_ref()
    }

    pub fn set_model(&mut self, model: &'a dyn TableModel) {
        self.model = Some(model);
    }

    pub fn model(&self) -> Option<&'a dyn TableModel> {
        self.model
    }

    pub fn add_table(&mut self, table: Fragment) {
        self.tables.push(table);
    }

    /// Parse `name` as an identifier and add it as a table.
    pub fn add_table_name(&mut self, name: &str) {
        match Ident::parse(name) {
            Ok(ident) => self.tables.push(Fragment::Ident(ident)),
            Err(e) => self.set_err(e),
        }
    }

    pub fn tables(&self) -> &[Fragment] {
        &self.tables
    }

    pub fn set_model_table(&mut self, table: Fragment) {
        self.model_table = Some(table);
    }

    pub fn add_column(&mut self, column: Fragment) {
        self.columns.push(column);
    }

    /// Parse `name` as an identifier and add it as a column.
    pub fn add_column_name(&mut self, name: &str) {
        match Ident::parse(name) {
            Ok(ident) => self.columns.push(Fragment::Ident(ident)),
            Err(e) => self.set_err(e),
        }
    }

    pub fn exclude_column(&mut self, name: impl Into<String>) {
        self.excluded.insert(name.into());
    }

    pub fn add_setting(&mut self, setting: Fragment) {
        self.settings.push(setting);
    }

    fn target(&self) -> Option<(Fragment, TargetSource)> {
        if let Some(table) = &self.model_table {
            return Some((table.clone(), TargetSource::Override));
        }
        if let Some(model) = self.model {
            return Some((model.insert_table(), TargetSource::Model));
        }
        self.tables
            .first()
            .map(|t| (t.clone(), TargetSource::FirstTable))
    }

    /// The table rows are inserted into.
    ///
    /// Precedence: model table override, then the bound model, then the
    /// first explicit table.
    pub fn resolve_insert_table(&self) -> OrmResult<Fragment> {
        self.target()
            .map(|(table, _)| table)
            .ok_or_else(|| OrmError::config("query does not have a table"))
    }

    /// The column list of the statement, in order.
    pub fn resolve_fields(&self) -> OrmResult<Vec<Field>> {
        if !self.columns.is_empty() {
            return self
                .columns
                .iter()
                .map(|col| self.column_field(col))
                .collect();
        }

        let Some(model) = self.model else {
            return Ok(Vec::new());
        };
        if self.excluded.contains("*") {
            return Ok(Vec::new());
        }
        Ok(model
            .fields()
            .into_iter()
            .filter(|f| !self.excluded.contains(&f.name))
            .collect())
    }

    fn column_field(&self, col: &Fragment) -> OrmResult<Field> {
        match col {
            Fragment::Ident(ident) => {
                let name = ident.name();
                match self.model {
                    Some(model) => model.field(name).ok_or_else(|| {
                        OrmError::config(format!("column {name:?} does not exist in model"))
                    }),
                    None => Ok(Field::new(name, col.clone())),
                }
            }
            Fragment::Query { sql, .. } | Fragment::Raw(sql) => Ok(Field::new(sql.clone(), col.clone())),
            Fragment::Filters(_) => Ok(Field::new(String::new(), col.clone())),
        }
    }

    /// Tables to select from when inserting from other tables.
    ///
    /// Excludes the table that supplied the insert target and any table that
    /// renders exactly like the target.
    pub fn other_tables(&self, fmter: &Formatter, target_sql: &str) -> OrmResult<Vec<&Fragment>> {
        let skip_first = matches!(self.target(), Some((_, TargetSource::FirstTable)));
        let mut others = Vec::new();
        for (i, table) in self.tables.iter().enumerate() {
            if i == 0 && skip_first {
                continue;
            }
            if table.to_sql(fmter)? == target_sql {
                continue;
            }
            others.push(table);
        }
        Ok(others)
    }

    /// Append ` SETTINGS s1, s2` when any setting is present.
    pub fn append_settings(&self, fmter: &Formatter, out: &mut String) -> OrmResult<()> {
        if self.settings.is_empty() {
            return Ok(());
        }
        out.push_str(" SETTINGS ");
        append_joined(fmter, out, self.settings.iter())
    }
}

/// Append fragments separated by `, `.
pub(crate) fn append_joined<'f>(
    fmter: &Formatter,
    out: &mut String,
    items: impl IntoIterator<Item = &'f Fragment>,
) -> OrmResult<()> {
    for (i, item) in items.into_iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        item.append_query(fmter, out)?;
    }
    Ok(())
}

/// Append column expressions separated by `, `.
pub(crate) fn append_columns(fmter: &Formatter, out: &mut String, fields: &[Field]) -> OrmResult<()> {
    append_joined(fmter, out, fields.iter().map(|f| &f.expr))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Row;

    impl TableModel for Row {
        fn insert_table(&self) -> Fragment {
            Fragment::raw("events")
        }

        fn fields(&self) -> Vec<Field> {
            vec![Field::column("id"), Field::column("kind"), Field::column("ts")]
        }
    }

    fn names(fields: &[Field]) -> Vec<&str> {
        fields.iter().map(|f| f.name.as_str()).collect()
    }

    #[test]
    fn first_error_wins() {
        let mut base = QueryBase::new();
        base.set_err(OrmError::validation("first"));
        base.set_err(OrmError::validation("second"));
        assert_eq!(base.err(), Some(&OrmError::validation("first")));
    }

    #[test]
    fn invalid_names_record_errors() {
        let mut base = QueryBase::new();
        base.add_table_name("events; DROP TABLE x");
        base.add_column_name("ok");
        assert!(base.err().is_some());
        assert!(base.tables().is_empty());
    }

    #[test]
    fn table_precedence() {
        let row = Row;
        let fmter = Formatter::new();

        let mut base = QueryBase::new();
        assert!(base.resolve_insert_table().unwrap_err().is_config());

        base.add_table_name("explicit");
        assert_eq!(base.resolve_insert_table().unwrap().to_sql(&fmter).unwrap(), "explicit");

        base.set_model(&row);
        assert_eq!(base.resolve_insert_table().unwrap().to_sql(&fmter).unwrap(), "events");

        base.set_model_table(Fragment::raw("override"));
        assert_eq!(base.resolve_insert_table().unwrap().to_sql(&fmter).unwrap(), "override");
    }

    #[test]
    fn model_fields_minus_excluded() {
        let row = Row;
        let mut base = QueryBase::new();
        base.set_model(&row);
        assert_eq!(names(&base.resolve_fields().unwrap()), vec!["id", "kind", "ts"]);

        base.exclude_column("kind");
        base.exclude_column("not_a_column");
        assert_eq!(names(&base.resolve_fields().unwrap()), vec!["id", "ts"]);

        base.exclude_column("*");
        assert!(base.resolve_fields().unwrap().is_empty());
    }

    #[test]
    fn explicit_columns_use_model_metadata() {
        let row = Row;
        let mut base = QueryBase::new();
        base.set_model(&row);
        base.add_column_name("ts");
        base.add_column_name("id");
        assert_eq!(names(&base.resolve_fields().unwrap()), vec!["ts", "id"]);

        base.add_column_name("missing");
        let err = base.resolve_fields().unwrap_err();
        assert_eq!(err, OrmError::config(r#"column "missing" does not exist in model"#));
    }

    #[test]
    fn explicit_columns_without_model() {
        let mut base = QueryBase::new();
        base.add_column_name("a");
        base.add_column(Fragment::query("toDate(?)", ("2024-01-01",)));
        let fields = base.resolve_fields().unwrap();
        assert_eq!(names(&fields), vec!["a", "toDate(?)"]);
        assert!(QueryBase::new().resolve_fields().unwrap().is_empty());
    }

    #[test]
    fn resolution_is_idempotent() {
        let row = Row;
        let mut base = QueryBase::new();
        base.set_model(&row);
        base.exclude_column("ts");
        assert_eq!(base.resolve_fields().unwrap(), base.resolve_fields().unwrap());
        assert_eq!(base.resolve_insert_table().unwrap(), base.resolve_insert_table().unwrap());
    }

    #[test]
    fn other_tables_skip_target() {
        let fmter = Formatter::new();
        let mut base = QueryBase::new();
        base.add_table_name("dst");
        base.add_table_name("src");
        base.add_table_name("dst");
        let others = base.other_tables(&fmter, "dst").unwrap();
        assert_eq!(others, vec![&Fragment::ident("src").unwrap()]);
    }

    #[test]
    fn settings_are_joined() {
        let fmter = Formatter::new();
        let mut base = QueryBase::new();
        let mut out = String::new();
        base.append_settings(&fmter, &mut out).unwrap();
        assert_eq!(out, "");

        base.add_setting(Fragment::raw("async_insert = 1"));
        base.add_setting(Fragment::query("max_threads = ?", (4,)));
        base.append_settings(&fmter, &mut out).unwrap();
        assert_eq!(out, " SETTINGS async_insert = 1, max_threads = 4");
    }
}
