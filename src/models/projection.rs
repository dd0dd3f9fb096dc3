//! Row projection: one result row as an ordered column label to value mapping.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// One result row keyed by column label, in result-metadata order.
///
/// SQL `NULL` is always [`JsonValue::Null`], never an empty string. Labels are
/// unique: when a result carries the same label twice the later columns are
/// keyed `label#2`, `label#3`, ... (see [`unique_labels`]).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowProjection(Map<String, JsonValue>);

impl RowProjection {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Build a projection from raw `(label, value)` pairs, resolving duplicate labels.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, JsonValue)>,
    {
        let (labels, values): (Vec<String>, Vec<JsonValue>) = pairs.into_iter().unzip();
        let labels = unique_labels(labels.iter().map(String::as_str));
        Self(labels.into_iter().zip(values).collect())
    }

    pub fn get(&self, column: &str) -> Option<&JsonValue> {
        self.0.get(column)
    }

    /// True when the column exists and holds SQL `NULL`.
    pub fn is_null(&self, column: &str) -> bool {
        matches!(self.0.get(column), Some(JsonValue::Null))
    }

    /// Column labels in order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &JsonValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_map(self) -> Map<String, JsonValue> {
        self.0
    }
}

/// Make result labels unique, keeping the first occurrence as-is.
pub fn unique_labels<'a, I>(labels: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen: Vec<String> = Vec::new();
    for label in labels {
        let mut candidate = label.to_string();
        let mut n = 2;
        while seen.contains(&candidate) {
            candidate = format!("{}#{}", label, n);
            n += 1;
        }
        seen.push(candidate);
    }
    seen
}

/// Render a cell for a text input. `None` means SQL `NULL`.
pub fn cell_text(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::Null => None,
        JsonValue::Bool(b) => Some(b.to_string()),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
