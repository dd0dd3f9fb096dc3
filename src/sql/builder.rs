//! Statement synthesis for the table browser.
//!
//! Every value goes through a bound parameter. Table and column names are
//! validated by the caller and quoted here.

use crate::error::{ConsoleError, ConsoleResult};
use crate::models::{ColumnTypes, DatabaseType, QueryParam, TableName};

/// Statement text plus its positional parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlStatement {
    pub sql: String,
    pub params: Vec<QueryParam>,
}

/// Incrementally builds statement text and keeps placeholders in step with
/// the bound parameters.
#[derive(Debug)]
pub struct StatementBuilder {
    db: DatabaseType,
    sql: String,
    params: Vec<QueryParam>,
}

impl StatementBuilder {
    pub fn new(db: DatabaseType) -> Self {
        Self {
            db,
            sql: String::new(),
            params: Vec::new(),
        }
    }

    pub fn push_sql(&mut self, sql: &str) -> &mut Self {
        self.sql.push_str(sql);
        self
    }

    pub fn push_identifier(&mut self, ident: &str) -> &mut Self {
        let quoted = self.db.quote_identifier(ident);
        self.sql.push_str(&quoted);
        self
    }

    /// Append a placeholder and bind `param` to it.
    ///
    /// With a plain column type name on PostgreSQL the value is sent as text
    /// and cast server-side.
    pub fn push_bind(&mut self, param: QueryParam, type_name: Option<&str>) -> &mut Self {
        let n = self.params.len() + 1;
        let placeholder = self.db.typed_placeholder(n, type_name);
        // A cast placeholder expects its value as text
        let param = if placeholder != self.db.placeholder(n) {
            param.into_text()
        } else {
            param
        };
        self.sql.push_str(&placeholder);
        self.params.push(param);
        self
    }

    pub fn build(self) -> SqlStatement {
        SqlStatement {
            sql: self.sql,
            params: self.params,
        }
    }
}

/// `SELECT * FROM <table>`
pub fn select_all(db: DatabaseType, table: &TableName) -> SqlStatement {
    let mut b = StatementBuilder::new(db);
    b.push_sql("SELECT * FROM ").push_identifier(table.as_str());
    b.build()
}

/// `SELECT * FROM <table> WHERE 1=1 AND <col> LIKE ? ...`
///
/// Empty filter values are skipped. Values are bound as `%value%`; `%` and
/// `_` inside a value still act as wildcards.
pub fn select_filtered<'a, I>(db: DatabaseType, table: &TableName, filters: I) -> SqlStatement
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut b = StatementBuilder::new(db);
    b.push_sql("SELECT * FROM ")
        .push_identifier(table.as_str())
        .push_sql(" WHERE 1=1");
    for (column, value) in filters {
        if value.is_empty() {
            continue;
        }
        b.push_sql(" AND ")
            .push_sql(&db.like_target(column))
            .push_sql(" LIKE ")
            .push_bind(QueryParam::String(format!("%{}%", value)), None);
    }
    b.build()
}

/// `UPDATE <table> SET c1 = ?, ... WHERE pk1 = ? AND ...`
///
/// Refuses to build a statement without assignments or without a key
/// predicate, so an update can never touch more than the keyed row.
pub fn update_row(
    db: DatabaseType,
    table: &TableName,
    assignments: &[(String, QueryParam)],
    key: &[(String, QueryParam)],
    types: &ColumnTypes,
) -> ConsoleResult<SqlStatement> {
    if key.is_empty() {
        return Err(ConsoleError::missing_primary_key(table.as_str()));
    }
    if assignments.is_empty() {
        return Err(ConsoleError::invalid_input("Nothing was changed, so there is nothing to update."));
    }

    let mut b = StatementBuilder::new(db);
    b.push_sql("UPDATE ")
        .push_identifier(table.as_str())
        .push_sql(" SET ");
    for (i, (column, value)) in assignments.iter().enumerate() {
        if i > 0 {
            b.push_sql(", ");
        }
        b.push_identifier(column)
            .push_sql(" = ")
            .push_bind(value.clone(), types.type_name(column));
    }
    b.push_sql(" WHERE ");
    for (i, (column, value)) in key.iter().enumerate() {
        if i > 0 {
            b.push_sql(" AND ");
        }
        b.push_identifier(column)
            .push_sql(" = ")
            .push_bind(value.clone(), types.type_name(column));
    }
    Ok(b.build())
}

/// `INSERT INTO <table> (c1, ...) VALUES (?, ...)`
pub fn insert_row(
    db: DatabaseType,
    table: &TableName,
    values: &[(String, QueryParam)],
    types: &ColumnTypes,
) -> SqlStatement {
    let mut b = StatementBuilder::new(db);
    b.push_sql("INSERT INTO ").push_identifier(table.as_str());

    if values.is_empty() {
        match db {
            DatabaseType::MySQL => b.push_sql(" () VALUES ()"),
            DatabaseType::PostgreSQL | DatabaseType::SQLite => b.push_sql(" DEFAULT VALUES"),
        };
        return b.build();
    }

    b.push_sql(" (");
    for (i, (column, _)) in values.iter().enumerate() {
        if i > 0 {
            b.push_sql(", ");
        }
        b.push_identifier(column);
    }
    b.push_sql(") VALUES (");
    for (i, (column, value)) in values.iter().enumerate() {
        if i > 0 {
            b.push_sql(", ");
        }
        b.push_bind(value.clone(), types.type_name(column));
    }
    b.push_sql(")");
    b.build()
}
