//! Edit form generated from a selected row.

use crate::error::{ConsoleError, ConsoleResult};
use crate::models::{
    ColumnTypes, PrimaryKeySet, QueryParam, RowProjection, TableName, cell_text,
};
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};
use std::collections::HashMap;

/// One editable column. `value: None` is SQL `NULL`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormField {
    pub column: String,
    pub type_name: Option<String>,
    pub value: Option<String>,
    /// The cell as it was read, before rendering to text
    #[serde(skip)]
    pub original: JsonValue,
}

impl FormField {
    /// The submitted text, if it differs from what the form showed.
    fn edited<'a>(
        &self,
        submitted: &'a HashMap<String, Option<String>>,
    ) -> Option<&'a Option<String>> {
        submitted
            .get(&self.column)
            .filter(|value| **value != self.value)
    }
}

/// Editable fields of one row plus the key that identifies it.
///
/// Primary-key and temporal columns never become fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EditForm {
    pub table: TableName,
    /// Grid position of the row, `None` for a blank insert form
    pub row_index: Option<usize>,
    pub fields: Vec<FormField>,
    /// Primary-key values of the selected row
    pub key: Map<String, JsonValue>,
}

fn is_editable(column: &str, primary_keys: &PrimaryKeySet, types: &ColumnTypes) -> bool {
    !primary_keys.contains(column) && !types.is_temporal(column)
}

impl EditForm {
    /// Build the form for `row`, taking field values from its cells.
    pub fn for_row(
        table: &TableName,
        row_index: usize,
        row: &RowProjection,
        primary_keys: &PrimaryKeySet,
        types: &ColumnTypes,
    ) -> Self {
        let fields = row
            .iter()
            .filter(|(column, _)| is_editable(column, primary_keys, types))
            .map(|(column, value)| FormField {
                column: column.to_string(),
                type_name: types.type_name(column).map(String::from),
                value: cell_text(value),
                original: value.clone(),
            })
            .collect();

        let key = primary_keys
            .iter()
            .map(|pk| {
                let value = row.get(pk).cloned().unwrap_or(JsonValue::Null);
                (pk.to_string(), value)
            })
            .collect();

        Self {
            table: table.clone(),
            row_index: Some(row_index),
            fields,
            key,
        }
    }

    /// An empty form for inserting into a table with no row selected.
    pub fn blank(table: &TableName, primary_keys: &PrimaryKeySet, types: &ColumnTypes) -> Self {
        let fields = types
            .columns()
            .iter()
            .filter(|c| is_editable(&c.name, primary_keys, types))
            .map(|c| FormField {
                column: c.name.clone(),
                type_name: Some(c.type_name.clone()),
                value: None,
                original: JsonValue::Null,
            })
            .collect();

        Self {
            table: table.clone(),
            row_index: None,
            fields,
            key: Map::new(),
        }
    }

    /// Assignments for an update: only the fields the submission changed.
    ///
    /// A field whose submitted text equals what the form showed is left out,
    /// so untouched columns are never rewritten. Naming a column that is not
    /// a field (including key and temporal columns) fails.
    pub fn changes(
        &self,
        submitted: &HashMap<String, Option<String>>,
    ) -> ConsoleResult<Vec<(String, QueryParam)>> {
        self.check_columns(submitted)?;
        Ok(self
            .fields
            .iter()
            .filter_map(|field| {
                field
                    .edited(submitted)
                    .map(|value| (field.column.clone(), QueryParam::from(value.clone())))
            })
            .collect())
    }

    /// Every field's value for an insert, in field order.
    ///
    /// Edited fields take the submitted text; the rest keep the value read
    /// from the selected row, bound with its native type.
    pub fn values(
        &self,
        submitted: &HashMap<String, Option<String>>,
    ) -> ConsoleResult<Vec<(String, QueryParam)>> {
        self.check_columns(submitted)?;
        Ok(self
            .fields
            .iter()
            .map(|field| {
                let value = match field.edited(submitted) {
                    Some(text) => QueryParam::from(text.clone()),
                    None => QueryParam::from_json(&field.original),
                };
                (field.column.clone(), value)
            })
            .collect())
    }

    fn check_columns(&self, submitted: &HashMap<String, Option<String>>) -> ConsoleResult<()> {
        match submitted
            .keys()
            .find(|column| !self.fields.iter().any(|f| &f.column == *column))
        {
            Some(unknown) => Err(ConsoleError::unknown_column(
                self.table.as_str(),
                unknown.as_str(),
            )),
            None => Ok(()),
        }
    }

    /// Predicate values identifying the selected row, in key order.
    pub fn key_params(&self) -> Vec<(String, QueryParam)> {
        self.key
            .iter()
            .map(|(column, value)| (column.clone(), QueryParam::from_json(value)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ColumnMetadata;
    use serde_json::json;

    fn account_row() -> RowProjection {
        RowProjection::from_pairs(vec![
            ("id".to_string(), json!(1)),
            ("name".to_string(), json!("a")),
            ("created_at".to_string(), json!("2024-01-02T03:04:05")),
            ("nickname".to_string(), json!(null)),
        ])
    }

    fn account_types() -> ColumnTypes {
        ColumnTypes::new(vec![
            ColumnMetadata::new("id", "INTEGER"),
            ColumnMetadata::new("name", "TEXT"),
            ColumnMetadata::new("created_at", "DATETIME"),
            ColumnMetadata::new("nickname", "TEXT"),
        ])
    }

    fn form() -> EditForm {
        let table = TableName::parse("accounts").unwrap();
        let pks = PrimaryKeySet::new(vec!["id".to_string()]);
        EditForm::for_row(&table, 0, &account_row(), &pks, &account_types())
    }

    #[test]
    fn test_form_skips_key_and_temporal_columns() {
        let form = form();
        let columns: Vec<&str> = form.fields.iter().map(|f| f.column.as_str()).collect();
        assert_eq!(columns, vec!["name", "nickname"]);
        assert_eq!(form.fields[0].value.as_deref(), Some("a"));
        // NULL stays NULL
        assert_eq!(form.fields[1].value, None);
        assert_eq!(form.key_params(), vec![("id".to_string(), QueryParam::Int(1))]);
    }

    #[test]
    fn test_single_editable_field() {
        let row = RowProjection::from_pairs(vec![
            ("id".to_string(), json!(1)),
            ("name".to_string(), json!("a")),
            ("created_at".to_string(), json!("2024-01-02 03:04:05")),
        ]);
        let table = TableName::parse("accounts").unwrap();
        let pks = PrimaryKeySet::new(vec!["id".to_string()]);
        let form = EditForm::for_row(&table, 0, &row, &pks, &account_types());
        assert_eq!(form.fields.len(), 1);
        assert_eq!(form.fields[0].column, "name");
    }

    fn flag_form() -> EditForm {
        let row = RowProjection::from_pairs(vec![
            ("id".to_string(), json!(1)),
            ("name".to_string(), json!("a")),
            ("active".to_string(), json!(true)),
            ("score".to_string(), json!(2.5)),
        ]);
        let types = ColumnTypes::new(vec![
            ColumnMetadata::new("id", "INTEGER"),
            ColumnMetadata::new("name", "TEXT"),
            ColumnMetadata::new("active", "BOOLEAN"),
            ColumnMetadata::new("score", "REAL"),
        ]);
        let table = TableName::parse("flags").unwrap();
        let pks = PrimaryKeySet::new(vec!["id".to_string()]);
        EditForm::for_row(&table, 0, &row, &pks, &types)
    }

    #[test]
    fn test_changes_leave_out_untouched_fields() {
        // The page sends every input, edited or not
        let submitted = HashMap::from([
            ("name".to_string(), Some("b".to_string())),
            ("active".to_string(), Some("true".to_string())),
            ("score".to_string(), Some("2.5".to_string())),
        ]);
        let changes = flag_form().changes(&submitted).unwrap();
        assert_eq!(
            changes,
            vec![("name".to_string(), QueryParam::String("b".to_string()))]
        );

        assert!(flag_form().changes(&HashMap::new()).unwrap().is_empty());
    }

    #[test]
    fn test_changes_can_set_null() {
        let submitted = HashMap::from([("name".to_string(), None)]);
        let changes = form().changes(&submitted).unwrap();
        assert_eq!(changes, vec![("name".to_string(), QueryParam::Null)]);
    }

    #[test]
    fn test_values_keep_native_types_of_untouched_fields() {
        let submitted = HashMap::from([("name".to_string(), Some("b".to_string()))]);
        let values = flag_form().values(&submitted).unwrap();
        assert_eq!(
            values,
            vec![
                ("name".to_string(), QueryParam::String("b".to_string())),
                ("active".to_string(), QueryParam::Bool(true)),
                ("score".to_string(), QueryParam::Float(2.5)),
            ]
        );
    }

    #[test]
    fn test_submission_rejects_key_and_unknown_columns() {
        for column in ["id", "created_at", "ghost"] {
            let submitted = HashMap::from([(column.to_string(), Some("x".to_string()))]);
            let err = form().changes(&submitted).unwrap_err();
            assert!(matches!(err, ConsoleError::UnknownColumn { .. }), "{column}");
            let err = form().values(&submitted).unwrap_err();
            assert!(matches!(err, ConsoleError::UnknownColumn { .. }), "{column}");
        }
    }

    #[test]
    fn test_blank_form() {
        let table = TableName::parse("accounts").unwrap();
        let pks = PrimaryKeySet::new(vec!["id".to_string()]);
        let form = EditForm::blank(&table, &pks, &account_types());
        assert_eq!(form.row_index, None);
        assert!(form.key.is_empty());
        assert!(form.fields.iter().all(|f| f.value.is_none()));
        assert_eq!(form.fields.len(), 2);
    }
}
