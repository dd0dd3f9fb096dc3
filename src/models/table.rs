//! Table-shape models: validated table names, primary keys and column types.

use crate::db::types::is_temporal_type;
use crate::error::{ConsoleError, ConsoleResult};
use crate::models::ColumnMetadata;
use serde::Serialize;

/// A table name matching `^[A-Za-z_][A-Za-z0-9_]*$`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TableName(String);

impl TableName {
    pub fn parse(name: impl Into<String>) -> ConsoleResult<Self> {
        let name = name.into();
        if Self::is_valid(&name) {
            Ok(Self(name))
        } else {
            Err(ConsoleError::invalid_table_name(name))
        }
    }

    pub fn is_valid(name: &str) -> bool {
        let mut chars = name.chars();
        match chars.next() {
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
            _ => return false,
        }
        chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TableName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Primary-key columns of a table in key ordinal order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PrimaryKeySet(Vec<String>);

impl PrimaryKeySet {
    pub fn new(columns: Vec<String>) -> Self {
        Self(columns)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.0.iter().any(|c| c == column)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Column name to SQL type name for the selected table, in column order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ColumnTypes(Vec<ColumnMetadata>);

impl ColumnTypes {
    pub fn new(columns: Vec<ColumnMetadata>) -> Self {
        Self(columns)
    }

    pub fn get(&self, column: &str) -> Option<&ColumnMetadata> {
        self.0.iter().find(|c| c.name == column)
    }

    pub fn type_name(&self, column: &str) -> Option<&str> {
        self.get(column).map(|c| c.type_name.as_str())
    }

    /// DATE, TIME, TIMESTAMP and their zoned variants are not editable.
    ///
    /// Columns with no known type are treated as non-temporal.
    pub fn is_temporal(&self, column: &str) -> bool {
        self.type_name(column).is_some_and(is_temporal_type)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.get(column).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|c| c.name.as_str())
    }

    pub fn columns(&self) -> &[ColumnMetadata] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
