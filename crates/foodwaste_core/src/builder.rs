//! Statement construction from a table schema.
//!
//! Proxies produce their column values in schema order; these functions
//! turn them into statements. Keys are always bound in canonical form.

use crate::schema::TableSchema;
use foodwaste_sql::{ColumnRef, Delete, Insert, Predicate, Select, SqlValue, Statement, Update};

/// `SELECT <all columns> FROM <table>`.
#[must_use]
pub fn select_all(schema: &TableSchema) -> Select {
    Select::from(schema.table()).columns(schema.column_refs())
}

/// `SELECT <all columns> FROM <table> WHERE <column>=<key>`.
#[must_use]
pub fn select_where(schema: &TableSchema, column: &'static str, key: &str) -> Select {
    select_all(schema).filter_eq(ColumnRef::new(column), key)
}

/// Selects the row with the given key.
#[must_use]
pub fn select_by_key(schema: &TableSchema, key: &str) -> Statement {
    Statement::Select(select_where(schema, schema.key(), key))
}

/// Inserts one row. `values` are in schema column order.
#[must_use]
pub fn insert(schema: &TableSchema, values: Vec<SqlValue>) -> Statement {
    debug_assert_eq!(values.len(), schema.columns.len(), "{}", schema.name);
    Statement::Insert(Insert {
        table: schema.name,
        columns: schema.columns.to_vec(),
        values,
    })
}

/// Updates every non-key column of the row keyed by `values[0]`.
#[must_use]
pub fn update(schema: &TableSchema, values: Vec<SqlValue>) -> Statement {
    debug_assert_eq!(values.len(), schema.columns.len(), "{}", schema.name);
    let mut values = values.into_iter();
    let key = values.next().unwrap_or(SqlValue::Null);
    Statement::Update(Update {
        table: schema.name,
        assignments: schema.columns[1..].iter().copied().zip(values).collect(),
        filter: vec![Predicate::Eq(ColumnRef::new(schema.key()), key)],
    })
}

/// Deletes the row with the given key.
#[must_use]
pub fn delete(schema: &TableSchema, key: &str) -> Statement {
    Statement::Delete(Delete {
        table: schema.name,
        filter: vec![Predicate::Eq(ColumnRef::new(schema.key()), SqlValue::text(key))],
    })
}
