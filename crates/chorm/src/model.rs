//! Table model metadata.
//!
//! A bound model tells an insert query which table to write and which columns
//! it has. Implementations are usually generated by a model layer; they must be
//! deterministic for a given model type.

use crate::fragment::Fragment;
use crate::ident::Ident;

/// A column of a table model.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Column name as known to the model.
    pub name: String,
    /// SQL written into the column list of the statement.
    pub expr: Fragment,
}

impl Field {
    /// Create a field with an explicit column expression.
    pub fn new(name: impl Into<String>, expr: Fragment) -> Self {
        Self {
            name: name.into(),
            expr,
        }
    }

    /// Create a field whose column expression is its name, quoted if needed.
    pub fn column(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            expr: Fragment::Ident(Ident::from_name(&name)),
            name,
        }
    }
}

/// Metadata for a model bound to a query.
///
/// # Example
/// ```ignore
/// struct Event { id: u64, kind: String }
///
/// impl TableModel for Event {
///     fn insert_table(&self) -> Fragment {
///         Fragment::raw("analytics.events")
///     }
///
///     fn fields(&self) -> Vec<Field> {
///         vec![Field::column("id"), Field::column("kind")]
///     }
/// }
/// ```
pub trait TableModel: Send + Sync {
    /// The table rows of this model are inserted into.
    fn insert_table(&self) -> Fragment;

    /// All insertable columns, in table order.
    fn fields(&self) -> Vec<Field>;

    /// Look up a field by name.
    fn field(&self, name: &str) -> Option<Field> {
        self.fields().into_iter().find(|f| f.name == name)
    }
}
