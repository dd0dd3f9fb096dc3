//! Query-related data models.
//!
//! This module defines bound parameters, column metadata and result sets.

use crate::models::projection::RowProjection;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Default cap on rows fetched for one grid or query.
pub const DEFAULT_ROW_LIMIT: u32 = 1000;

/// Maximum allowed row cap.
pub const MAX_ROW_LIMIT: u32 = 10000;

/// Default query timeout in seconds.
pub const DEFAULT_QUERY_TIMEOUT_SECS: u64 = 30;

/// A parameter value for parameterized statements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryParam {
    Null,
    Bool(bool),
    /// Stored as i64 for maximum range
    Int(i64),
    /// Unsigned values above `i64::MAX` (MySQL `BIGINT UNSIGNED`)
    UInt(u64),
    Float(f64),
    String(String),
}

impl QueryParam {
    /// Check if this parameter is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Get the type name of this parameter for debugging.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::UInt(_) => "uint",
            Self::Float(_) => "float",
            Self::String(_) => "string",
        }
    }

    /// Bind a projected cell value back into a statement.
    ///
    /// Arrays and objects (JSON columns) are bound as their serialized text.
    pub fn from_json(value: &JsonValue) -> Self {
        match value {
            JsonValue::Null => Self::Null,
            JsonValue::Bool(b) => Self::Bool(*b),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Int(i)
                } else if let Some(u) = n.as_u64() {
                    Self::UInt(u)
                } else if let Some(f) = n.as_f64() {
                    Self::Float(f)
                } else {
                    Self::String(n.to_string())
                }
            }
            JsonValue::String(s) => Self::String(s.clone()),
            other => Self::String(other.to_string()),
        }
    }

    /// Text for PostgreSQL, where every value is cast server-side to the column type.
    pub fn into_text(self) -> Self {
        match self {
            Self::Null => Self::Null,
            Self::Bool(b) => Self::String(b.to_string()),
            Self::Int(i) => Self::String(i.to_string()),
            Self::UInt(u) => Self::String(u.to_string()),
            Self::Float(f) => Self::String(f.to_string()),
            Self::String(s) => Self::String(s),
        }
    }
}

impl From<Option<String>> for QueryParam {
    fn from(value: Option<String>) -> Self {
        value.map(QueryParam::String).unwrap_or(QueryParam::Null)
    }
}

/// Metadata for a result column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMetadata {
    pub name: String,
    pub type_name: String,
}

impl ColumnMetadata {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }
}

/// Rows of one statement, projected in column order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResultSet {
    pub columns: Vec<ColumnMetadata>,
    pub rows: Vec<RowProjection>,
    /// True when more rows existed than the row cap allowed
    pub truncated: bool,
    pub execution_time_ms: u64,
}

impl ResultSet {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_keeps_native_types() {
        assert_eq!(QueryParam::from_json(&json!(null)), QueryParam::Null);
        assert_eq!(QueryParam::from_json(&json!(true)), QueryParam::Bool(true));
        assert_eq!(QueryParam::from_json(&json!(42)), QueryParam::Int(42));
        assert_eq!(QueryParam::from_json(&json!(1.5)), QueryParam::Float(1.5));
        assert_eq!(
            QueryParam::from_json(&json!(u64::MAX)),
            QueryParam::UInt(u64::MAX)
        );
        assert_eq!(
            QueryParam::from_json(&json!("abc")),
            QueryParam::String("abc".to_string())
        );
        assert_eq!(
            QueryParam::from_json(&json!({"a": 1})),
            QueryParam::String(r#"{"a":1}"#.to_string())
        );
    }

    #[test]
    fn test_into_text_leaves_null_alone() {
        assert_eq!(QueryParam::Null.into_text(), QueryParam::Null);
        assert_eq!(
            QueryParam::Int(7).into_text(),
            QueryParam::String("7".to_string())
        );
        assert_eq!(
            QueryParam::Bool(false).into_text(),
            QueryParam::String("false".to_string())
        );
    }

    #[test]
    fn test_column_metadata_shape() {
        let column = serde_json::to_value(ColumnMetadata::new("total", "INTEGER")).unwrap();
        assert_eq!(column, json!({ "name": "total", "type_name": "INTEGER" }));
    }

    #[test]
    fn test_option_string_into_param() {
        assert_eq!(QueryParam::from(None::<String>), QueryParam::Null);
        assert_eq!(
            QueryParam::from(Some("x".to_string())),
            QueryParam::String("x".to_string())
        );
        assert!(QueryParam::Null.is_null());
        assert_eq!(QueryParam::Float(0.5).type_name(), "float");
    }
}
