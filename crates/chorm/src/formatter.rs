//! ClickHouse SQL formatting.
//!
//! [`Formatter`] is a small immutable value passed into every render call. It
//! substitutes `?` placeholders with escaped literals and writes identifiers
//! using the configured quote character.

use crate::error::{OrmError, OrmResult};
use crate::ident::Ident;
use crate::value::Value;

/// Quote character used for identifiers that need quoting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IdentQuote {
    /// `"name"`
    #[default]
    Double,
    /// `` `name` ``
    Backtick,
}

impl IdentQuote {
    pub fn as_char(self) -> char {
        match self {
            IdentQuote::Double => '"',
            IdentQuote::Backtick => '`',
        }
    }
}

/// Stateless SQL renderer for the ClickHouse dialect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Formatter {
    ident_quote: IdentQuote,
}

impl Formatter {
    /// Create a formatter with double-quoted identifiers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the identifier quote character.
    pub fn with_ident_quote(mut self, quote: IdentQuote) -> Self {
        self.ident_quote = quote;
        self
    }

    /// Append a validated identifier.
    pub fn append_ident(&self, out: &mut String, ident: &Ident) {
        ident.write_sql(out, self.ident_quote);
    }

    /// Append `sql`, replacing each `?` with the escaped literal of the next argument.
    ///
    /// `\?` is written as a literal `?`. The number of placeholders must match
    /// `args.len()` exactly; nothing is appended when it does not.
    pub fn append_query(&self, out: &mut String, sql: &str, args: &[Value]) -> OrmResult<()> {
        let expected = count_placeholders(sql);
        if expected != args.len() {
            return Err(OrmError::fragment(sql, expected, args.len()));
        }

        let mut args = args.iter();
        let mut chars = sql.chars().peekable();
        while let Some(ch) = chars.next() {
            match ch {
                '\\' if chars.peek() == Some(&'?') => {
                    chars.next();
                    out.push('?');
                }
                '?' => {
                    // Counted above, so there is always a next argument.
                    if let Some(arg) = args.next() {
                        self.append_value(out, arg)?;
                    }
                }
                _ => out.push(ch),
            }
        }
        Ok(())
    }

    /// Render a template into a fresh string.
    pub fn format(&self, sql: &str, args: &[Value]) -> OrmResult<String> {
        let mut out = String::with_capacity(sql.len());
        self.append_query(&mut out, sql, args)?;
        Ok(out)
    }

    /// Append a value as a ClickHouse literal.
    pub fn append_value(&self, out: &mut String, value: &Value) -> OrmResult<()> {
        match value {
            Value::Null => out.push_str("NULL"),
            Value::Bool(v) => out.push_str(if *v { "true" } else { "false" }),
            Value::Int(v) => out.push_str(&v.to_string()),
            Value::UInt(v) => out.push_str(&v.to_string()),
            Value::Float(v) => append_float(out, *v),
            Value::Float32(v) => append_float(out, *v),
            Value::String(s) => append_string(out, s),
            Value::Bytes(b) => {
                out.push_str("unhex('");
                for byte in b.iter() {
                    out.push(HEX[(byte >> 4) as usize] as char);
                    out.push(HEX[(byte & 0x0f) as usize] as char);
                }
                out.push_str("')");
            }
            Value::Date(d) => {
                out.push_str("toDate('");
                out.push_str(&d.format("%Y-%m-%d").to_string());
                out.push_str("')");
            }
            Value::DateTime(dt) => {
                if dt.timestamp_subsec_nanos() == 0 {
                    out.push_str("toDateTime('");
                    out.push_str(&dt.format("%Y-%m-%d %H:%M:%S").to_string());
                    out.push_str("', 'UTC')");
                } else {
                    out.push_str("toDateTime64('");
                    out.push_str(&dt.format("%Y-%m-%d %H:%M:%S%.9f").to_string());
                    out.push_str("', 9, 'UTC')");
                }
            }
            Value::Uuid(u) => {
                out.push_str("toUUID('");
                out.push_str(&u.hyphenated().to_string());
                out.push_str("')");
            }
            Value::Json(j) => append_string(out, &j.to_string()),
            #[cfg(feature = "rust_decimal")]
            Value::Decimal(d) => out.push_str(&d.to_string()),
            Value::Array(items) => {
                out.push('[');
                self.append_list(out, items)?;
                out.push(']');
            }
            Value::Tuple(items) => {
                out.push('(');
                if items.is_empty() {
                    // `IN ()` is not valid SQL; `IN (NULL)` matches nothing.
                    out.push_str("NULL");
                } else {
                    self.append_list(out, items)?;
                }
                out.push(')');
            }
            Value::Fragment(f) => f.append_query(self, out)?,
        }
        Ok(())
    }

    fn append_list(&self, out: &mut String, items: &[Value]) -> OrmResult<()> {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            self.append_value(out, item)?;
        }
        Ok(())
    }
}

const HEX: &[u8; 16] = b"0123456789abcdef";

/// Count `?` placeholders, skipping escaped `\?`.
pub(crate) fn count_placeholders(sql: &str) -> usize {
    let mut count = 0;
    let mut chars = sql.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' if chars.peek() == Some(&'?') => {
                chars.next();
            }
            '?' => count += 1,
            _ => {}
        }
    }
    count
}

fn append_float<F: Into<f64> + std::fmt::Debug + Copy>(out: &mut String, v: F) {
    let wide: f64 = v.into();
    if wide.is_nan() {
        out.push_str("nan");
    } else if wide.is_infinite() {
        out.push_str(if wide > 0.0 { "inf" } else { "-inf" });
    } else {
        // Debug keeps the shortest round-trip form and uses exponents for large values.
        out.push_str(&format!("{v:?}"));
    }
}

fn append_string(out: &mut String, s: &str) {
    out.push('\'');
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\0' => out.push_str("\\0"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(ch),
        }
    }
    out.push('\'');
}
