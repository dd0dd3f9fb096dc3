//! Per-backend SQL spelling: identifier quoting and placeholders.

use crate::models::DatabaseType;

impl DatabaseType {
    /// Quote an identifier for interpolation into statement text.
    ///
    /// Embedded quote characters are doubled, so any string yields exactly one
    /// identifier token.
    pub fn quote_identifier(&self, ident: &str) -> String {
        let quote = match self {
            Self::MySQL => '`',
            Self::PostgreSQL | Self::SQLite => '"',
        };
        let mut quoted = String::with_capacity(ident.len() + 2);
        quoted.push(quote);
        for c in ident.chars() {
            if c == quote {
                quoted.push(quote);
            }
            quoted.push(c);
        }
        quoted.push(quote);
        quoted
    }

    /// Positional placeholder for the `n`th bound value (1-based).
    pub fn placeholder(&self, n: usize) -> String {
        match self {
            Self::PostgreSQL => format!("${}", n),
            Self::MySQL | Self::SQLite => "?".to_string(),
        }
    }

    /// Left-hand side of a `LIKE` filter on `column`.
    ///
    /// PostgreSQL has no implicit cast to text, so non-text columns are cast.
    pub fn like_target(&self, column: &str) -> String {
        let quoted = self.quote_identifier(column);
        match self {
            Self::PostgreSQL => format!("CAST({} AS TEXT)", quoted),
            Self::MySQL | Self::SQLite => quoted,
        }
    }

    /// Placeholder for a text value stored into a column of type `type_name`.
    ///
    /// PostgreSQL does not coerce text parameters to other types, so the
    /// placeholder is cast to the column type when the type name is a plain
    /// type spelling.
    pub fn typed_placeholder(&self, n: usize, type_name: Option<&str>) -> String {
        let placeholder = self.placeholder(n);
        match (self, type_name) {
            (Self::PostgreSQL, Some(ty)) if is_plain_type_name(ty) => {
                format!("CAST({} AS {})", placeholder, ty)
            }
            _ => placeholder,
        }
    }
}

fn is_plain_type_name(type_name: &str) -> bool {
    !type_name.trim().is_empty()
        && type_name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | ' ' | '[' | ']'))
}
