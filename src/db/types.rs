//! Database-agnostic type mappings.
//!
//! This module turns database-specific rows into [`RowProjection`]s.
//!
//! # Architecture
//!
//! Type conversion uses a two-phase approach:
//! 1. `TypeCategory` classifies column types into logical categories
//! 2. Database-specific decoders handle the actual value extraction
//!
//! SQL `NULL` is detected from the raw value before any decoding, so a NULL
//! cell always projects to JSON `null`.

use crate::models::{ColumnMetadata, DatabaseType, RowProjection, unique_labels};
use serde_json::Value as JsonValue;
use sqlx::mysql::{MySqlRow, MySqlTypeInfo, MySqlValueRef};
use sqlx::postgres::{PgRow, PgTypeInfo, PgValueRef};
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Decode, Row, Type, TypeInfo, ValueRef};

// =============================================================================
// Type Classification
// =============================================================================

/// Logical category for database column types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeCategory {
    Integer,
    Float,
    Decimal,
    Boolean,
    Text,
    Binary,
    Json,
    Uuid,
    Temporal,
    Unknown,
}

/// True for DATE, TIME, TIMESTAMP, TIME WITH TIME ZONE and TIMESTAMP WITH TIME ZONE
/// (including driver spellings such as TIMESTAMPTZ, TIMETZ and DATETIME).
pub fn is_temporal_type(type_name: &str) -> bool {
    let lower = type_name.trim().to_lowercase();
    matches!(
        lower.as_str(),
        "date" | "time" | "timetz" | "timestamp" | "timestamptz" | "datetime"
    ) || lower.starts_with("timestamp")
        || lower.starts_with("time ")
        || lower.starts_with("time(")
        || lower.starts_with("datetime(")
}

/// Classify a database type name into a logical category.
pub fn categorize_type(type_name: &str, db: DatabaseType) -> TypeCategory {
    let lower = type_name.to_lowercase();

    if is_temporal_type(&lower) {
        return TypeCategory::Temporal;
    }

    // Decimal/Numeric - check first as it overlaps with "numeric" in float checks
    if lower.contains("decimal") || lower.contains("numeric") {
        // SQLite's NUMERIC is actually a float
        if db == DatabaseType::SQLite && lower == "numeric" {
            return TypeCategory::Float;
        }
        return TypeCategory::Decimal;
    }

    // Integer types ("interval" and "point" also contain "int")
    if (lower.starts_with("int") && !lower.starts_with("interval"))
        || lower.contains("bigint")
        || lower.contains("smallint")
        || lower.contains("tinyint")
        || lower.contains("mediumint")
        || lower.contains("serial")
        || lower == "tiny"
    {
        return TypeCategory::Integer;
    }

    // Boolean
    if lower == "bool" || lower == "boolean" {
        return TypeCategory::Boolean;
    }

    // Float types
    if lower.contains("float")
        || lower.contains("double")
        || lower == "real"
        || lower == "float4"
        || lower == "float8"
    {
        return TypeCategory::Float;
    }

    // JSON types
    if lower == "json" || lower == "jsonb" {
        return TypeCategory::Json;
    }

    // UUID (PostgreSQL)
    if lower == "uuid" {
        return TypeCategory::Uuid;
    }

    // Binary types
    if lower.contains("blob") || lower.contains("binary") || lower == "bytea" {
        return TypeCategory::Binary;
    }

    if lower.contains("char") || lower.contains("text") || lower == "name" {
        return TypeCategory::Text;
    }

    TypeCategory::Unknown
}

// =============================================================================
// Decimal Type Support
// =============================================================================

/// Wrapper type for raw DECIMAL/NUMERIC values as strings.
/// This preserves the exact database representation.
#[derive(Debug)]
pub struct RawDecimal(pub String);

impl Type<sqlx::MySql> for RawDecimal {
    fn type_info() -> MySqlTypeInfo {
        <String as Type<sqlx::MySql>>::type_info()
    }

    fn compatible(ty: &MySqlTypeInfo) -> bool {
        let name = ty.name().to_lowercase();
        name.contains("decimal") || name.contains("numeric")
    }
}

impl<'r> Decode<'r, sqlx::MySql> for RawDecimal {
    fn decode(value: MySqlValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as Decode<sqlx::MySql>>::decode(value)?;
        Ok(RawDecimal(s.to_string()))
    }
}

impl Type<sqlx::Postgres> for RawDecimal {
    fn type_info() -> PgTypeInfo {
        <String as Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &PgTypeInfo) -> bool {
        let name = ty.name().to_lowercase();
        name.contains("numeric") || name.contains("decimal")
    }
}

impl<'r> Decode<'r, sqlx::Postgres> for RawDecimal {
    fn decode(value: PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as Decode<sqlx::Postgres>>::decode(value)?;
        Ok(RawDecimal(s.to_string()))
    }
}

// =============================================================================
// Binary Encoding
// =============================================================================

/// Decode binary data to a JSON value: UTF-8 text when valid, base64 otherwise.
pub fn decode_binary_value(bytes: &[u8]) -> JsonValue {
    use base64::{Engine as _, engine::general_purpose::STANDARD};

    match std::str::from_utf8(bytes) {
        Ok(s) => JsonValue::String(s.to_string()),
        Err(_) => JsonValue::String(STANDARD.encode(bytes)),
    }
}

fn number_from_f64(v: f64) -> JsonValue {
    serde_json::Number::from_f64(v)
        .map(JsonValue::Number)
        .unwrap_or_else(|| JsonValue::String(v.to_string()))
}

fn undecodable(type_name: &str, idx: usize, err: sqlx::Error) -> JsonValue {
    tracing::warn!(column = idx, type_name, error = %err, "Failed to decode column value");
    JsonValue::Null
}

// =============================================================================
// Row Projection Trait
// =============================================================================

/// Trait for projecting database rows into ordered name/value mappings.
pub trait RowToProjection {
    /// Project the row in metadata order, labels made unique.
    fn project(&self) -> RowProjection;

    /// Column metadata in the same order and with the same labels as [`project`](Self::project).
    fn column_metadata(&self) -> Vec<ColumnMetadata>;
}

macro_rules! impl_row_projection {
    ($row:ty, $db:expr, $decoder:path) => {
        impl RowToProjection for $row {
            fn project(&self) -> RowProjection {
                let labels = unique_labels(self.columns().iter().map(|c| c.name()));
                let values = self.columns().iter().enumerate().map(|(idx, col)| {
                    let type_name = col.type_info().name();
                    let category = categorize_type(type_name, $db);
                    $decoder(self, idx, type_name, category)
                });
                RowProjection::from_pairs(labels.into_iter().zip(values))
            }

            fn column_metadata(&self) -> Vec<ColumnMetadata> {
                let labels = unique_labels(self.columns().iter().map(|c| c.name()));
                self.columns()
                    .iter()
                    .zip(labels)
                    .map(|(col, label)| ColumnMetadata::new(label, col.type_info().name()))
                    .collect()
            }
        }
    };
}

impl_row_projection!(MySqlRow, DatabaseType::MySQL, mysql::decode_column);
impl_row_projection!(PgRow, DatabaseType::PostgreSQL, postgres::decode_column);
impl_row_projection!(SqliteRow, DatabaseType::SQLite, sqlite::decode_column);

// =============================================================================
// Database-Specific Decoders
// =============================================================================

mod mysql {
    use super::*;
    use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

    pub fn decode_column(
        row: &MySqlRow,
        idx: usize,
        type_name: &str,
        category: TypeCategory,
    ) -> JsonValue {
        match row.try_get_raw(idx) {
            Ok(raw) if raw.is_null() => return JsonValue::Null,
            Ok(_) => {}
            Err(e) => return undecodable(type_name, idx, e),
        }
        match category {
            TypeCategory::Decimal => match row.try_get::<RawDecimal, _>(idx) {
                Ok(v) => JsonValue::String(v.0),
                Err(e) => undecodable(type_name, idx, e),
            },
            TypeCategory::Integer => decode_integer(row, idx, type_name),
            TypeCategory::Boolean => row
                .try_get::<bool, _>(idx)
                .map(JsonValue::Bool)
                .unwrap_or_else(|e| undecodable(type_name, idx, e)),
            TypeCategory::Float => match row.try_get::<f64, _>(idx) {
                Ok(v) => number_from_f64(v),
                Err(_) => row
                    .try_get::<f32, _>(idx)
                    .map(|v| number_from_f64(v as f64))
                    .unwrap_or_else(|e| undecodable(type_name, idx, e)),
            },
            TypeCategory::Binary => row
                .try_get::<Vec<u8>, _>(idx)
                .map(|v| decode_binary_value(&v))
                .unwrap_or_else(|e| undecodable(type_name, idx, e)),
            // MySQL JSON type should be decoded as serde_json::Value directly
            TypeCategory::Json => row
                .try_get::<JsonValue, _>(idx)
                .unwrap_or_else(|e| undecodable(type_name, idx, e)),
            TypeCategory::Temporal => decode_temporal(row, idx, type_name),
            _ => decode_text(row, idx, type_name),
        }
    }

    fn decode_integer(row: &MySqlRow, idx: usize, type_name: &str) -> JsonValue {
        if let Ok(v) = row.try_get::<i64, _>(idx) {
            return JsonValue::Number(v.into());
        }
        if let Ok(v) = row.try_get::<i32, _>(idx) {
            return JsonValue::Number(v.into());
        }
        if let Ok(v) = row.try_get::<i16, _>(idx) {
            return JsonValue::Number(v.into());
        }
        if let Ok(v) = row.try_get::<i8, _>(idx) {
            return JsonValue::Number(v.into());
        }
        // Unsigned columns
        if let Ok(v) = row.try_get::<u64, _>(idx) {
            return JsonValue::Number(v.into());
        }
        if let Ok(v) = row.try_get::<u32, _>(idx) {
            return JsonValue::Number(v.into());
        }
        match row.try_get::<u8, _>(idx) {
            Ok(v) => JsonValue::Number(v.into()),
            Err(e) => undecodable(type_name, idx, e),
        }
    }

    fn decode_temporal(row: &MySqlRow, idx: usize, type_name: &str) -> JsonValue {
        let text = match type_name.to_uppercase().as_str() {
            "DATE" => row.try_get::<NaiveDate, _>(idx).map(|v| v.to_string()),
            "TIME" => row.try_get::<NaiveTime, _>(idx).map(|v| v.to_string()),
            "DATETIME" => row
                .try_get::<NaiveDateTime, _>(idx)
                .map(|v| v.format("%Y-%m-%dT%H:%M:%S%.f").to_string()),
            "TIMESTAMP" => row
                .try_get::<DateTime<Utc>, _>(idx)
                .map(|v| v.to_rfc3339()),
            _ => row.try_get::<String, _>(idx),
        };
        text.map(JsonValue::String)
            .unwrap_or_else(|e| undecodable(type_name, idx, e))
    }

    fn decode_text(row: &MySqlRow, idx: usize, type_name: &str) -> JsonValue {
        match row.try_get::<String, _>(idx) {
            Ok(v) => JsonValue::String(v),
            Err(_) => row
                .try_get::<Vec<u8>, _>(idx)
                .map(|v| decode_binary_value(&v))
                .unwrap_or_else(|e| undecodable(type_name, idx, e)),
        }
    }
}

mod postgres {
    use super::*;
    use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};
    use sqlx::postgres::types::PgTimeTz;

    pub fn decode_column(
        row: &PgRow,
        idx: usize,
        type_name: &str,
        category: TypeCategory,
    ) -> JsonValue {
        match row.try_get_raw(idx) {
            Ok(raw) if raw.is_null() => return JsonValue::Null,
            Ok(_) => {}
            Err(e) => return undecodable(type_name, idx, e),
        }
        match category {
            TypeCategory::Decimal => match row.try_get::<RawDecimal, _>(idx) {
                Ok(v) => JsonValue::String(v.0),
                Err(e) => undecodable(type_name, idx, e),
            },
            TypeCategory::Integer => decode_integer(row, idx, type_name),
            TypeCategory::Boolean => row
                .try_get::<bool, _>(idx)
                .map(JsonValue::Bool)
                .unwrap_or_else(|e| undecodable(type_name, idx, e)),
            TypeCategory::Float => match row.try_get::<f64, _>(idx) {
                Ok(v) => number_from_f64(v),
                Err(_) => row
                    .try_get::<f32, _>(idx)
                    .map(|v| number_from_f64(v as f64))
                    .unwrap_or_else(|e| undecodable(type_name, idx, e)),
            },
            TypeCategory::Binary => row
                .try_get::<Vec<u8>, _>(idx)
                .map(|v| decode_binary_value(&v))
                .unwrap_or_else(|e| undecodable(type_name, idx, e)),
            TypeCategory::Json => row
                .try_get::<JsonValue, _>(idx)
                .unwrap_or_else(|e| undecodable(type_name, idx, e)),
            TypeCategory::Uuid => row
                .try_get::<sqlx::types::Uuid, _>(idx)
                .map(|v| JsonValue::String(v.to_string()))
                .unwrap_or_else(|e| undecodable(type_name, idx, e)),
            TypeCategory::Temporal => decode_temporal(row, idx, type_name),
            _ => row
                .try_get::<String, _>(idx)
                .map(JsonValue::String)
                .unwrap_or_else(|e| undecodable(type_name, idx, e)),
        }
    }

    fn decode_integer(row: &PgRow, idx: usize, type_name: &str) -> JsonValue {
        if let Ok(v) = row.try_get::<i64, _>(idx) {
            return JsonValue::Number(v.into());
        }
        if let Ok(v) = row.try_get::<i32, _>(idx) {
            return JsonValue::Number(v.into());
        }
        match row.try_get::<i16, _>(idx) {
            Ok(v) => JsonValue::Number(v.into()),
            Err(e) => undecodable(type_name, idx, e),
        }
    }

    fn decode_temporal(row: &PgRow, idx: usize, type_name: &str) -> JsonValue {
        let text = match type_name.to_uppercase().as_str() {
            "DATE" => row.try_get::<NaiveDate, _>(idx).map(|v| v.to_string()),
            "TIME" => row.try_get::<NaiveTime, _>(idx).map(|v| v.to_string()),
            "TIMETZ" => row
                .try_get::<PgTimeTz<NaiveTime, FixedOffset>, _>(idx)
                .map(|v| format!("{}{}", v.time, v.offset)),
            "TIMESTAMP" => row
                .try_get::<NaiveDateTime, _>(idx)
                .map(|v| v.format("%Y-%m-%dT%H:%M:%S%.f").to_string()),
            "TIMESTAMPTZ" => row
                .try_get::<DateTime<Utc>, _>(idx)
                .map(|v| v.to_rfc3339()),
            _ => row.try_get::<String, _>(idx),
        };
        text.map(JsonValue::String)
            .unwrap_or_else(|e| undecodable(type_name, idx, e))
    }
}

mod sqlite {
    use super::*;

    pub fn decode_column(
        row: &SqliteRow,
        idx: usize,
        type_name: &str,
        category: TypeCategory,
    ) -> JsonValue {
        match row.try_get_raw(idx) {
            Ok(raw) if raw.is_null() => return JsonValue::Null,
            Ok(_) => {}
            Err(e) => return undecodable(type_name, idx, e),
        }
        // SQLite is dynamically typed: the declared type is a hint, so fall
        // back through the storage classes when the hint does not match.
        let preferred = match category {
            TypeCategory::Integer => decode_integer(row, idx),
            TypeCategory::Boolean => row.try_get::<bool, _>(idx).ok().map(JsonValue::Bool),
            TypeCategory::Float | TypeCategory::Decimal => decode_float(row, idx),
            TypeCategory::Binary => row
                .try_get::<Vec<u8>, _>(idx)
                .ok()
                .map(|v| decode_binary_value(&v)),
            _ => decode_text(row, idx, type_name),
        };
        preferred
            .or_else(|| decode_text(row, idx, type_name))
            .or_else(|| decode_integer(row, idx))
            .or_else(|| decode_float(row, idx))
            .or_else(|| {
                row.try_get::<Vec<u8>, _>(idx)
                    .ok()
                    .map(|v| decode_binary_value(&v))
            })
            .unwrap_or_else(|| {
                undecodable(
                    type_name,
                    idx,
                    sqlx::Error::Decode("unsupported SQLite storage class".into()),
                )
            })
    }

    fn decode_integer(row: &SqliteRow, idx: usize) -> Option<JsonValue> {
        row.try_get::<i64, _>(idx)
            .ok()
            .map(|v| JsonValue::Number(v.into()))
    }

    fn decode_float(row: &SqliteRow, idx: usize) -> Option<JsonValue> {
        row.try_get::<f64, _>(idx).ok().map(number_from_f64)
    }

    fn decode_text(row: &SqliteRow, idx: usize, type_name: &str) -> Option<JsonValue> {
        let v = row.try_get::<String, _>(idx).ok()?;
        if type_name.to_lowercase().contains("json") {
            if let Ok(json) = serde_json::from_str::<JsonValue>(&v) {
                return Some(json);
            }
        }
        Some(JsonValue::String(v))
    }
}
