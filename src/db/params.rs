//! Parameter binding for console statements.
//!
//! Every statement the console builds itself (filters, updates, inserts,
//! catalog lookups) binds its values through [`bind_param`], whatever the
//! backend.

use crate::models::QueryParam;
use sqlx::encode::IsNull;
use sqlx::error::BoxDynError;
use sqlx::query::Query;
use sqlx::{Database, Encode, MySql, Postgres, Sqlite, Type};

/// Bind one parameter, keeping its native type.
pub(crate) fn bind_param<'q, DB>(
    query: Query<'q, DB, <DB as Database>::Arguments<'q>>,
    param: &'q QueryParam,
) -> Query<'q, DB, <DB as Database>::Arguments<'q>>
where
    DB: Database,
    bool: Encode<'q, DB> + Type<DB>,
    i64: Encode<'q, DB> + Type<DB>,
    f64: Encode<'q, DB> + Type<DB>,
    &'q str: Encode<'q, DB> + Type<DB>,
    Option<&'q str>: Encode<'q, DB>,
    Unsigned: Encode<'q, DB> + Type<DB>,
{
    match param {
        QueryParam::Null => query.bind(None::<&'q str>),
        QueryParam::Bool(v) => query.bind(*v),
        QueryParam::Int(v) => query.bind(*v),
        QueryParam::UInt(v) => query.bind(Unsigned(*v)),
        QueryParam::Float(v) => query.bind(*v),
        QueryParam::String(v) => query.bind(v.as_str()),
    }
}

/// A `u64` beyond `i64::MAX`.
///
/// Only MySQL has a native unsigned 64-bit type; PostgreSQL and SQLite
/// receive the decimal text.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Unsigned(pub u64);

impl Type<MySql> for Unsigned {
    fn type_info() -> <MySql as Database>::TypeInfo {
        <u64 as Type<MySql>>::type_info()
    }
}

impl<'q> Encode<'q, MySql> for Unsigned {
    fn encode_by_ref(
        &self,
        buf: &mut <MySql as Database>::ArgumentBuffer<'q>,
    ) -> Result<IsNull, BoxDynError> {
        <u64 as Encode<'q, MySql>>::encode_by_ref(&self.0, buf)
    }
}

impl Type<Postgres> for Unsigned {
    fn type_info() -> <Postgres as Database>::TypeInfo {
        <String as Type<Postgres>>::type_info()
    }
}

impl<'q> Encode<'q, Postgres> for Unsigned {
    fn encode_by_ref(
        &self,
        buf: &mut <Postgres as Database>::ArgumentBuffer<'q>,
    ) -> Result<IsNull, BoxDynError> {
        <String as Encode<'q, Postgres>>::encode(self.0.to_string(), buf)
    }
}

impl Type<Sqlite> for Unsigned {
    fn type_info() -> <Sqlite as Database>::TypeInfo {
        <String as Type<Sqlite>>::type_info()
    }
}

impl<'q> Encode<'q, Sqlite> for Unsigned {
    fn encode_by_ref(
        &self,
        buf: &mut <Sqlite as Database>::ArgumentBuffer<'q>,
    ) -> Result<IsNull, BoxDynError> {
        <String as Encode<'q, Sqlite>>::encode(self.0.to_string(), buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::Row;
    use sqlx::sqlite::SqlitePoolOptions;

    #[tokio::test]
    async fn test_bind_param_keeps_storage_classes() {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();

        let params = vec![
            QueryParam::Null,
            QueryParam::Bool(true),
            QueryParam::Int(7),
            QueryParam::UInt(u64::MAX),
            QueryParam::Float(0.5),
            QueryParam::String("x".to_string()),
        ];
        let mut query = sqlx::query(
            "SELECT typeof(?), typeof(?), typeof(?), CAST(? AS TEXT), typeof(?), typeof(?)",
        );
        for param in &params {
            query = bind_param(query, param);
        }
        let row = query.fetch_one(&pool).await.unwrap();

        let got: Vec<String> = (0..6).map(|i| row.get::<String, _>(i)).collect();
        assert_eq!(
            got,
            vec!["null", "integer", "integer", "18446744073709551615", "real", "text"]
        );
    }
}
