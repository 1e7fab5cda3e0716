//! Structured statements and their deterministic text rendering.
//!
//! A [`Statement`] is built from static table and column names plus bound
//! [`SqlValue`]s. It renders two ways, both reproducible byte for byte:
//!
//! - [`Statement::sql`] with `?` placeholders, paired with
//!   [`Statement::params`] in placeholder order, for execution;
//! - [`fmt::Display`] with every value inlined as a literal, for logs and
//!   for pinning statement text in tests.

use crate::value::SqlValue;
use std::fmt::{self, Write};

/// A table in a `FROM` or `JOIN` clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableRef {
    /// Table name.
    pub name: &'static str,
    /// Optional alias used to qualify columns.
    pub alias: Option<&'static str>,
}

impl TableRef {
    /// A table without alias.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self { name, alias: None }
    }

    /// A table with an alias.
    #[must_use]
    pub const fn aliased(name: &'static str, alias: &'static str) -> Self {
        Self {
            name,
            alias: Some(alias),
        }
    }

    /// The name columns of this table are qualified with.
    #[must_use]
    pub fn qualifier(&self) -> &'static str {
        self.alias.unwrap_or(self.name)
    }

    fn render(&self, out: &mut String) {
        out.push_str(self.name);
        if let Some(alias) = self.alias {
            let _ = write!(out, " AS {alias}");
        }
    }
}

/// A column reference, optionally qualified and optionally renamed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnRef {
    /// Table name or alias the column belongs to.
    pub qualifier: Option<&'static str>,
    /// Column name.
    pub name: &'static str,
    /// Output name in a select list.
    pub alias: Option<&'static str>,
}

impl ColumnRef {
    /// An unqualified column.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self {
            qualifier: None,
            name,
            alias: None,
        }
    }

    /// A column qualified by a table name or alias.
    #[must_use]
    pub const fn qualified(qualifier: &'static str, name: &'static str) -> Self {
        Self {
            qualifier: Some(qualifier),
            name,
            alias: None,
        }
    }

    /// Renames the column in the result set.
    #[must_use]
    pub const fn as_name(mut self, alias: &'static str) -> Self {
        self.alias = Some(alias);
        self
    }

    /// The name this column carries in a result row.
    #[must_use]
    pub fn output_name(&self) -> &'static str {
        self.alias.unwrap_or(self.name)
    }

    fn render_ref(&self, out: &mut String) {
        if let Some(q) = self.qualifier {
            out.push_str(q);
            out.push('.');
        }
        out.push_str(self.name);
    }

    fn render_projection(&self, out: &mut String) {
        self.render_ref(out);
        if let Some(alias) = self.alias {
            let _ = write!(out, " AS {alias}");
        }
    }
}

/// A condition in a `WHERE` clause. Conditions are joined with `AND`.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `column = value`
    Eq(ColumnRef, SqlValue),
    /// `column IS NULL`
    IsNull(ColumnRef),
}

impl Predicate {
    /// The column the predicate tests.
    #[must_use]
    pub fn column(&self) -> &ColumnRef {
        match self {
            Predicate::Eq(column, _) | Predicate::IsNull(column) => column,
        }
    }
}

/// An inner join of a second table.
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    /// Joined table.
    pub table: TableRef,
    /// Column of the joined table.
    pub left: ColumnRef,
    /// Column of the base table it must equal.
    pub right: ColumnRef,
}

/// `SELECT` statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    /// Base table.
    pub from: TableRef,
    /// Projected columns, in result order.
    pub columns: Vec<ColumnRef>,
    /// Optional inner join.
    pub join: Option<Join>,
    /// Conditions.
    pub filter: Vec<Predicate>,
    /// Sort keys, ascending.
    pub order_by: Vec<ColumnRef>,
}

impl Select {
    /// Starts a select from `from`.
    #[must_use]
    pub fn from(from: TableRef) -> Self {
        Self {
            from,
            columns: Vec::new(),
            join: None,
            filter: Vec::new(),
            order_by: Vec::new(),
        }
    }

    /// Adds a projected column.
    #[must_use]
    pub fn column(mut self, column: ColumnRef) -> Self {
        self.columns.push(column);
        self
    }

    /// Adds projected columns.
    #[must_use]
    pub fn columns(mut self, columns: impl IntoIterator<Item = ColumnRef>) -> Self {
        self.columns.extend(columns);
        self
    }

    /// Joins `table` on `left = right`.
    #[must_use]
    pub fn inner_join(mut self, table: TableRef, left: ColumnRef, right: ColumnRef) -> Self {
        self.join = Some(Join { table, left, right });
        self
    }

    /// Adds a `column = value` condition.
    #[must_use]
    pub fn filter_eq(mut self, column: ColumnRef, value: impl Into<SqlValue>) -> Self {
        self.filter.push(Predicate::Eq(column, value.into()));
        self
    }

    /// Adds a `column IS NULL` condition.
    #[must_use]
    pub fn filter_null(mut self, column: ColumnRef) -> Self {
        self.filter.push(Predicate::IsNull(column));
        self
    }

    /// Adds a sort key.
    #[must_use]
    pub fn order_by(mut self, column: ColumnRef) -> Self {
        self.order_by.push(column);
        self
    }
}

/// `INSERT` statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Insert {
    /// Target table.
    pub table: &'static str,
    /// Column names, 1:1 with `values`.
    pub columns: Vec<&'static str>,
    /// Values, 1:1 with `columns`.
    pub values: Vec<SqlValue>,
}

/// `UPDATE` statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    /// Target table.
    pub table: &'static str,
    /// `column = value` pairs.
    pub assignments: Vec<(&'static str, SqlValue)>,
    /// Conditions.
    pub filter: Vec<Predicate>,
}

/// `DELETE` statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Delete {
    /// Target table.
    pub table: &'static str,
    /// Conditions.
    pub filter: Vec<Predicate>,
}

/// The kind of a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementKind {
    /// Read.
    Select,
    /// Row creation.
    Insert,
    /// Row modification.
    Update,
    /// Row removal.
    Delete,
}

impl StatementKind {
    /// Whether the statement modifies the store.
    #[must_use]
    pub const fn is_write(self) -> bool {
        !matches!(self, StatementKind::Select)
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StatementKind::Select => "SELECT",
            StatementKind::Insert => "INSERT",
            StatementKind::Update => "UPDATE",
            StatementKind::Delete => "DELETE",
        })
    }
}

/// A statement ready to be executed by an accessor.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// Read rows.
    Select(Select),
    /// Create a row.
    Insert(Insert),
    /// Modify rows.
    Update(Update),
    /// Remove rows.
    Delete(Delete),
}

#[derive(Clone, Copy)]
enum Mode {
    Placeholders,
    Literals,
}

impl Statement {
    /// Returns the statement kind.
    #[must_use]
    pub fn kind(&self) -> StatementKind {
        match self {
            Statement::Select(_) => StatementKind::Select,
            Statement::Insert(_) => StatementKind::Insert,
            Statement::Update(_) => StatementKind::Update,
            Statement::Delete(_) => StatementKind::Delete,
        }
    }

    /// Returns the base table of the statement.
    #[must_use]
    pub fn table(&self) -> &'static str {
        match self {
            Statement::Select(s) => s.from.name,
            Statement::Insert(s) => s.table,
            Statement::Update(s) => s.table,
            Statement::Delete(s) => s.table,
        }
    }

    /// Renders the statement with `?` placeholders.
    #[must_use]
    pub fn sql(&self) -> String {
        let mut out = String::new();
        self.render(&mut out, Mode::Placeholders);
        out
    }

    /// Returns the bound values in placeholder order.
    #[must_use]
    pub fn params(&self) -> Vec<&SqlValue> {
        let mut params = Vec::new();
        match self {
            Statement::Select(s) => collect_filter(&s.filter, &mut params),
            Statement::Insert(s) => params.extend(s.values.iter()),
            Statement::Update(s) => {
                params.extend(s.assignments.iter().map(|(_, v)| v));
                collect_filter(&s.filter, &mut params);
            }
            Statement::Delete(s) => collect_filter(&s.filter, &mut params),
        }
        params
    }

    fn render(&self, out: &mut String, mode: Mode) {
        match self {
            Statement::Select(s) => {
                out.push_str("SELECT ");
                for (i, column) in s.columns.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    column.render_projection(out);
                }
                out.push_str(" FROM ");
                s.from.render(out);
                if let Some(join) = &s.join {
                    out.push_str(" INNER JOIN ");
                    join.table.render(out);
                    out.push_str(" ON ");
                    join.left.render_ref(out);
                    out.push('=');
                    join.right.render_ref(out);
                }
                render_filter(&s.filter, out, mode);
                if !s.order_by.is_empty() {
                    out.push_str(" ORDER BY ");
                    for (i, column) in s.order_by.iter().enumerate() {
                        if i > 0 {
                            out.push(',');
                        }
                        column.render_ref(out);
                    }
                }
            }
            Statement::Insert(s) => {
                let _ = write!(out, "INSERT INTO {} (", s.table);
                out.push_str(&s.columns.join(","));
                out.push_str(") VALUES(");
                for (i, value) in s.values.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    render_value(value, out, mode);
                }
                out.push(')');
            }
            Statement::Update(s) => {
                let _ = write!(out, "UPDATE {} SET ", s.table);
                for (i, (column, value)) in s.assignments.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    out.push_str(column);
                    out.push('=');
                    render_value(value, out, mode);
                }
                render_filter(&s.filter, out, mode);
            }
            Statement::Delete(s) => {
                let _ = write!(out, "DELETE FROM {}", s.table);
                render_filter(&s.filter, out, mode);
            }
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        self.render(&mut out, Mode::Literals);
        f.write_str(&out)
    }
}

impl From<Select> for Statement {
    fn from(select: Select) -> Self {
        Statement::Select(select)
    }
}

impl From<Insert> for Statement {
    fn from(insert: Insert) -> Self {
        Statement::Insert(insert)
    }
}

impl From<Update> for Statement {
    fn from(update: Update) -> Self {
        Statement::Update(update)
    }
}

impl From<Delete> for Statement {
    fn from(delete: Delete) -> Self {
        Statement::Delete(delete)
    }
}

fn collect_filter<'a>(filter: &'a [Predicate], params: &mut Vec<&'a SqlValue>) {
    for predicate in filter {
        if let Predicate::Eq(_, value) = predicate {
            params.push(value);
        }
    }
}

fn render_value(value: &SqlValue, out: &mut String, mode: Mode) {
    match mode {
        Mode::Placeholders => out.push('?'),
        Mode::Literals => out.push_str(&value.to_literal()),
    }
}

fn render_filter(filter: &[Predicate], out: &mut String, mode: Mode) {
    for (i, predicate) in filter.iter().enumerate() {
        out.push_str(if i == 0 { " WHERE " } else { " AND " });
        match predicate {
            Predicate::Eq(column, value) => {
                column.render_ref(out);
                out.push('=');
                render_value(value, out, mode);
            }
            Predicate::IsNull(column) => {
                column.render_ref(out);
                out.push_str(" IS NULL");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "11111111-1111-1111-1111-111111111111";

    #[test]
    fn select_by_key() {
        let stmt = Statement::Select(
            Select::from(TableRef::new("FoodGroups"))
                .columns([
                    ColumnRef::new("FoodGroupIdentifier"),
                    ColumnRef::new("ParentIdentifier"),
                    ColumnRef::new("IsActive"),
                ])
                .filter_eq(ColumnRef::new("FoodGroupIdentifier"), KEY),
        );
        assert_eq!(
            stmt.sql(),
            "SELECT FoodGroupIdentifier,ParentIdentifier,IsActive FROM FoodGroups WHERE FoodGroupIdentifier=?"
        );
        assert_eq!(
            stmt.to_string(),
            format!("SELECT FoodGroupIdentifier,ParentIdentifier,IsActive FROM FoodGroups WHERE FoodGroupIdentifier='{KEY}'")
        );
        assert_eq!(stmt.params(), vec![&SqlValue::text(KEY)]);
    }

    #[test]
    fn select_with_join_and_alias() {
        let stmt = Statement::Select(
            Select::from(TableRef::aliased("Storages", "s"))
                .column(ColumnRef::qualified("s", "StorageIdentifier"))
                .column(ColumnRef::qualified("st", "SortOrder").as_name("StorageTypeSortOrder"))
                .inner_join(
                    TableRef::aliased("StorageTypes", "st"),
                    ColumnRef::qualified("st", "StorageTypeIdentifier"),
                    ColumnRef::qualified("s", "StorageTypeIdentifier"),
                )
                .filter_eq(ColumnRef::qualified("s", "HouseholdIdentifier"), KEY)
                .order_by(ColumnRef::qualified("s", "SortOrder")),
        );
        assert_eq!(
            stmt.sql(),
            "SELECT s.StorageIdentifier,st.SortOrder AS StorageTypeSortOrder FROM Storages AS s \
             INNER JOIN StorageTypes AS st ON st.StorageTypeIdentifier=s.StorageTypeIdentifier \
             WHERE s.HouseholdIdentifier=? ORDER BY s.SortOrder"
        );
    }

    #[test]
    fn insert_renders_values_in_column_order() {
        let stmt = Statement::Insert(Insert {
            table: "FoodItemGroups",
            columns: vec!["FoodItemGroupIdentifier", "IsPrimary", "Note"],
            values: vec![SqlValue::text(KEY), SqlValue::Bool(true), SqlValue::Null],
        });
        assert_eq!(
            stmt.sql(),
            "INSERT INTO FoodItemGroups (FoodItemGroupIdentifier,IsPrimary,Note) VALUES(?,?,?)"
        );
        assert_eq!(
            stmt.to_string(),
            format!("INSERT INTO FoodItemGroups (FoodItemGroupIdentifier,IsPrimary,Note) VALUES('{KEY}',1,NULL)")
        );
        assert_eq!(stmt.params().len(), 3);
    }

    #[test]
    fn update_params_follow_assignments_then_filter() {
        let stmt = Statement::Update(Update {
            table: "FoodItems",
            assignments: vec![("IsActive", SqlValue::Bool(false))],
            filter: vec![Predicate::Eq(
                ColumnRef::new("FoodItemIdentifier"),
                SqlValue::text(KEY),
            )],
        });
        assert_eq!(
            stmt.sql(),
            "UPDATE FoodItems SET IsActive=? WHERE FoodItemIdentifier=?"
        );
        assert_eq!(
            stmt.params(),
            vec![&SqlValue::Bool(false), &SqlValue::text(KEY)]
        );
    }

    #[test]
    fn delete_and_is_null() {
        let stmt = Statement::Delete(Delete {
            table: "FoodGroups",
            filter: vec![Predicate::IsNull(ColumnRef::new("ParentIdentifier"))],
        });
        assert_eq!(stmt.to_string(), "DELETE FROM FoodGroups WHERE ParentIdentifier IS NULL");
        assert!(stmt.params().is_empty());
        assert_eq!(stmt.kind(), StatementKind::Delete);
        assert!(stmt.kind().is_write());
    }
}
