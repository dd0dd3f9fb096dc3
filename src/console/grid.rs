//! Grid and filter descriptions for the table browser.

use crate::console::notice::Notice;
use crate::error::{ConsoleError, ConsoleResult};
use crate::models::{ColumnMetadata, ColumnTypes, PrimaryKeySet, RowProjection, TableName};
use serde::Serialize;
use std::collections::HashMap;

/// A text filter bound to one grid column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterField {
    pub column: String,
    pub placeholder: String,
    pub value: String,
}

impl FilterField {
    fn new(column: &str) -> Self {
        Self {
            column: column.to_string(),
            placeholder: format!("Filter {}", column),
            value: String::new(),
        }
    }
}

/// One filter field per column, in column order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FilterSet(Vec<FilterField>);

impl FilterSet {
    /// Empty filters for every column of `types`.
    pub fn for_columns(types: &ColumnTypes) -> Self {
        Self(types.names().map(FilterField::new).collect())
    }

    /// A copy with `values` applied. Columns not named keep an empty value.
    ///
    /// Fails on a column that has no filter field.
    pub fn with_values(
        &self,
        table: &TableName,
        values: &HashMap<String, String>,
    ) -> ConsoleResult<Self> {
        if let Some(unknown) = values
            .keys()
            .find(|column| !self.0.iter().any(|f| &f.column == *column))
        {
            return Err(ConsoleError::unknown_column(table.as_str(), unknown.as_str()));
        }
        Ok(Self(
            self.0
                .iter()
                .map(|field| FilterField {
                    value: values.get(&field.column).cloned().unwrap_or_default(),
                    ..field.clone()
                })
                .collect(),
        ))
    }

    /// `(column, value)` for every non-empty filter.
    pub fn active(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .filter(|f| !f.value.is_empty())
            .map(|f| (f.column.as_str(), f.value.as_str()))
    }

    pub fn is_active(&self) -> bool {
        self.active().next().is_some()
    }

    pub fn fields(&self) -> &[FilterField] {
        &self.0
    }
}

/// What the page renders for the selected table.
#[derive(Debug, Clone, Serialize)]
pub struct GridView {
    pub table: TableName,
    pub columns: Vec<ColumnMetadata>,
    pub primary_keys: PrimaryKeySet,
    pub rows: Vec<RowProjection>,
    pub truncated: bool,
    pub filters: FilterSet,
    /// Set when `rows` stopped at the row cap
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<Notice>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn types() -> ColumnTypes {
        ColumnTypes::new(vec![
            ColumnMetadata::new("id", "INTEGER"),
            ColumnMetadata::new("name", "TEXT"),
        ])
    }

    #[test]
    fn test_filter_per_column_with_placeholder() {
        let filters = FilterSet::for_columns(&types());
        let fields = filters.fields();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[1].column, "name");
        assert_eq!(fields[1].placeholder, "Filter name");
        assert!(!filters.is_active());
    }

    #[test]
    fn test_with_values_keeps_column_order() {
        let table = TableName::parse("accounts").unwrap();
        let values = HashMap::from([
            ("name".to_string(), "al".to_string()),
            ("id".to_string(), String::new()),
        ]);
        let filters = FilterSet::for_columns(&types())
            .with_values(&table, &values)
            .unwrap();
        assert_eq!(filters.active().collect::<Vec<_>>(), vec![("name", "al")]);
    }

    #[test]
    fn test_with_values_rejects_unknown_column() {
        let table = TableName::parse("accounts").unwrap();
        let values = HashMap::from([("nope".to_string(), "x".to_string())]);
        let err = FilterSet::for_columns(&types())
            .with_values(&table, &values)
            .unwrap_err();
        assert!(matches!(err, ConsoleError::UnknownColumn { .. }));
    }
}
