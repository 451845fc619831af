//! Safe SQL identifier handling.
//!
//! This module provides [`Ident`] which represents a ClickHouse identifier
//! (database/table/column), supporting dotted notation and quoted identifiers.
//!
//! - Unquoted parts are validated against: `[A-Za-z_][A-Za-z0-9_$]*`
//! - Quoted parts (`"..."` or `` `...` ``) allow any characters except NUL;
//!   the quote character is escaped by doubling it
//!
//! # Example
//! ```ignore
//! use chorm::Ident;
//!
//! let t = Ident::parse("analytics.events")?;
//! let c = Ident::parse(r#""CamelCase"."EventTable""#)?;
//! # Ok::<(), chorm::OrmError>(())
//! ```

use crate::error::{OrmError, OrmResult};
use crate::formatter::IdentQuote;

/// A part of a SQL identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentPart {
    /// Unquoted identifier: must match `[A-Za-z_][A-Za-z0-9_$]*`.
    Unquoted(String),
    /// Quoted identifier: allows any characters except NUL.
    Quoted(String),
}

impl IdentPart {
    /// The unescaped name of this part.
    pub fn as_str(&self) -> &str {
        match self {
            IdentPart::Unquoted(s) | IdentPart::Quoted(s) => s,
        }
    }
}

/// A SQL identifier (column, table, or database name).
///
/// Supports dotted notation (e.g., `db.table`) and quoted identifiers
/// (e.g., `"CamelCase"."Events"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub parts: Vec<IdentPart>,
}

/// Returns true if `name` can be written without quotes.
fn is_simple_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c == '$' || c.is_ascii_alphanumeric())
}

fn write_quoted(out: &mut String, name: &str, quote: IdentQuote) {
    let q = quote.as_char();
    out.push(q);
    for ch in name.chars() {
        if ch == q {
            out.push(q);
        }
        out.push(ch);
    }
    out.push(q);
}

impl Ident {
    /// Create a quoted identifier.
    pub fn quoted(name: &str) -> OrmResult<Self> {
        if name.is_empty() {
            return Err(OrmError::validation("Empty quoted identifier"));
        }
        if name.contains('\0') {
            return Err(OrmError::validation(
                "Identifier cannot contain NUL character",
            ));
        }
        Ok(Self {
            parts: vec![IdentPart::Quoted(name.to_string())],
        })
    }

    /// Build a single-part identifier from trusted metadata (e.g. a model column).
    ///
    /// The name is written bare when it is a plain identifier and quoted otherwise.
    pub fn from_name(name: &str) -> Self {
        let part = if is_simple_name(name) {
            IdentPart::Unquoted(name.to_string())
        } else {
            IdentPart::Quoted(name.to_string())
        };
        Self { parts: vec![part] }
    }

    /// Parse an identifier string, supporting dotted and quoted forms.
    ///
    /// - Dotted: `db.table`
    /// - Quoted: `"CamelCase"."Events"` or `` `CamelCase`.`Events` ``
    /// - Mixed: `analytics."Events".id`
    pub fn parse(s: &str) -> OrmResult<Self> {
        if s.is_empty() {
            return Err(OrmError::validation("Identifier cannot be empty"));
        }
        if s.contains('\0') {
            return Err(OrmError::validation(
                "Identifier cannot contain NUL character",
            ));
        }

        let mut parts = Vec::new();
        let mut chars = s.chars().peekable();

        while chars.peek().is_some() {
            // Consume '.' between parts (but require there is a next part).
            if !parts.is_empty() {
                match chars.next() {
                    Some('.') => {
                        if chars.peek().is_none() {
                            return Err(OrmError::validation(format!(
                                "Trailing '.' in identifier {s:?}"
                            )));
                        }
                    }
                    Some(c) => {
                        return Err(OrmError::validation(format!(
                            "Expected '.' between identifier parts, got '{c}' in {s:?}"
                        )));
                    }
                    None => break,
                }
            }

            // Quoted identifier part.
            if let Some(&q @ ('"' | '`')) = chars.peek() {
                chars.next(); // opening quote
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some(c) if c == q => {
                            // Escaped quote: "" or ``
                            if chars.peek() == Some(&q) {
                                chars.next();
                                name.push(q);
                            } else {
                                break;
                            }
                        }
                        Some(c) => name.push(c),
                        None => {
                            return Err(OrmError::validation(format!(
                                "Unclosed quoted identifier {s:?}"
                            )));
                        }
                    }
                }
                if name.is_empty() {
                    return Err(OrmError::validation("Empty quoted identifier"));
                }
                parts.push(IdentPart::Quoted(name));
                continue;
            }

            // Unquoted identifier part.
            let mut name = String::new();
            while let Some(&c) = chars.peek() {
                if c == '.' {
                    break;
                }
                let valid = if name.is_empty() {
                    c == '_' || c.is_ascii_alphabetic()
                } else {
                    c == '_' || c == '$' || c.is_ascii_alphanumeric()
                };
                if !valid {
                    return Err(OrmError::validation(format!(
                        "Invalid character '{c}' in identifier {s:?}"
                    )));
                }
                name.push(c);
                chars.next();
            }
            if name.is_empty() {
                return Err(OrmError::validation(format!(
                    "Empty identifier segment in {s:?}"
                )));
            }
            parts.push(IdentPart::Unquoted(name));
        }

        if parts.is_empty() {
            return Err(OrmError::validation("Empty identifier"));
        }

        Ok(Self { parts })
    }

    /// The unescaped name of the last part (e.g. the column of `t.column`).
    pub fn name(&self) -> &str {
        self.parts.last().map(IdentPart::as_str).unwrap_or_default()
    }

    /// Render the identifier as SQL using double quotes for quoted parts.
    pub fn to_sql(&self) -> String {
        let mut out = String::new();
        self.write_sql(&mut out, IdentQuote::Double);
        out
    }

    pub(crate) fn write_sql(&self, out: &mut String, quote: IdentQuote) {
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                out.push('.');
            }
            match part {
                IdentPart::Unquoted(s) => out.push_str(s),
                IdentPart::Quoted(s) => write_quoted(out, s, quote),
            }
        }
    }
}

/// Convert an input into an [`Ident`].
///
/// This is mainly for ergonomics in builder APIs.
pub trait IntoIdent {
    fn into_ident(self) -> OrmResult<Ident>;
}

impl IntoIdent for Ident {
    fn into_ident(self) -> OrmResult<Ident> {
        Ok(self)
    }
}

impl IntoIdent for &Ident {
    fn into_ident(self) -> OrmResult<Ident> {
        Ok(self.clone())
    }
}

impl IntoIdent for &str {
    fn into_ident(self) -> OrmResult<Ident> {
        Ident::parse(self)
    }
}

impl IntoIdent for String {
    fn into_ident(self) -> OrmResult<Ident> {
        Ident::parse(&self)
    }
}

impl IntoIdent for &String {
    fn into_ident(self) -> OrmResult<Ident> {
        Ident::parse(self)
    }
}
