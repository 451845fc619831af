//! Argument values substituted into `?` placeholders.
//!
//! A [`Value`] is rendered by the [`Formatter`](crate::Formatter) as an escaped
//! ClickHouse literal, so user data never reaches the statement text unescaped.

use crate::error::{OrmError, OrmResult};
use crate::fragment::Fragment;
use crate::ident::Ident;
use bytes::Bytes;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value as JsonValue;
use uuid::Uuid;

/// A literal value bound to a placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    /// Rendered at `f32` precision.
    Float32(f32),
    String(String),
    Bytes(Bytes),
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
    Uuid(Uuid),
    Json(JsonValue),
    #[cfg(feature = "rust_decimal")]
    Decimal(rust_decimal::Decimal),
    /// Rendered as `[a, b, ...]`.
    Array(Vec<Value>),
    /// Rendered as `(a, b, ...)`, e.g. for `IN ?`.
    Tuple(Vec<Value>),
    /// Nested safe SQL rendered inline (identifiers, sub-expressions).
    Fragment(Box<Fragment>),
}

impl Value {
    /// Serialize any `serde` value into a JSON argument.
    pub fn json<T: serde::Serialize + ?Sized>(value: &T) -> OrmResult<Self> {
        serde_json::to_value(value)
            .map(Value::Json)
            .map_err(|e| OrmError::validation(format!("cannot serialize JSON argument: {e}")))
    }

    /// Build a tuple argument, e.g. for `id IN ?`.
    pub fn tuple<T: Into<Value>>(values: impl IntoIterator<Item = T>) -> Self {
        Value::Tuple(values.into_iter().map(Into::into).collect())
    }
}

macro_rules! impl_from_value {
    ($variant:ident as $target:ty: $($t:ty),+) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::$variant(v as $target)
                }
            }
        )+
    };
}

impl_from_value!(Int as i64: i8, i16, i32, i64, isize);
impl_from_value!(UInt as u64: u8, u16, u32, u64, usize);
impl_from_value!(Float as f64: f64);

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float32(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::String(v.clone())
    }
}

impl From<Bytes> for Value {
    fn from(v: Bytes) -> Self {
        Value::Bytes(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Date(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::DateTime(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::DateTime(v.and_utc())
    }
}

impl From<Uuid> for Value {
    fn from(v: Uuid) -> Self {
        Value::Uuid(v)
    }
}

impl From<JsonValue> for Value {
    fn from(v: JsonValue) -> Self {
        Value::Json(v)
    }
}

#[cfg(feature = "rust_decimal")]
impl From<rust_decimal::Decimal> for Value {
    fn from(v: rust_decimal::Decimal) -> Self {
        Value::Decimal(v)
    }
}

impl From<Fragment> for Value {
    fn from(v: Fragment) -> Self {
        Value::Fragment(Box::new(v))
    }
}

impl From<Ident> for Value {
    fn from(v: Ident) -> Self {
        Value::Fragment(Box::new(Fragment::Ident(v)))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::Array(v.into_iter().map(Into::into).collect())
    }
}

/// Converts builder arguments into the ordered list bound to `?` placeholders.
///
/// Implemented for `()`, tuples of up to eight values, arrays and vectors.
/// A single array argument must be wrapped in a tuple: `("id IN ?", (vec![1, 2],))`
/// would otherwise bind two separate arguments.
pub trait IntoArgs {
    fn into_args(self) -> Vec<Value>;
}

impl IntoArgs for () {
    fn into_args(self) -> Vec<Value> {
        Vec::new()
    }
}

impl<T: Into<Value>> IntoArgs for Vec<T> {
    fn into_args(self) -> Vec<Value> {
        self.into_iter().map(Into::into).collect()
    }
}

impl<T: Into<Value>, const N: usize> IntoArgs for [T; N] {
    fn into_args(self) -> Vec<Value> {
        self.into_iter().map(Into::into).collect()
    }
}

macro_rules! impl_into_args_tuple {
    ($($name:ident),+) => {
        impl<$($name: Into<Value>),+> IntoArgs for ($($name,)+) {
            #[allow(non_snake_case)]
            fn into_args(self) -> Vec<Value> {
                let ($($name,)+) = self;
                vec![$($name.into()),+]
            }
        }
    };
}

impl_into_args_tuple!(A);
impl_into_args_tuple!(A, B);
impl_into_args_tuple!(A, B, C);
impl_into_args_tuple!(A, B, C, D);
impl_into_args_tuple!(A, B, C, D, E);
impl_into_args_tuple!(A, B, C, D, E, F);
impl_into_args_tuple!(A, B, C, D, E, F, G);
impl_into_args_tuple!(A, B, C, D, E, F, G, H);
