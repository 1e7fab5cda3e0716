//! In-memory relational store for testing.

use crate::accessor::DataAccessor;
use crate::error::{StoreError, StoreResult};
use crate::reader::RowReader;
use foodwaste_sql::{
    ColumnRef, Delete, Insert, Predicate, Row, Select, SqlValue, Statement, StatementKind, Update,
};
use parking_lot::{Mutex, RwLock};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

/// A statement executed by a [`MemoryAccessor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalEntry {
    /// Session that executed the statement.
    pub session: u64,
    /// Statement kind.
    pub kind: StatementKind,
    /// Base table.
    pub table: &'static str,
    /// Statement text with literals inlined.
    pub text: String,
    /// Rows returned (select) or affected (writes).
    pub rows: u64,
}

#[derive(Debug, Default)]
struct MemoryTable {
    columns: Vec<String>,
    rows: Vec<Vec<SqlValue>>,
}

impl MemoryTable {
    fn index(&self, table: &str, column: &str) -> StoreResult<usize> {
        self.columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(column))
            .ok_or_else(|| StoreError::unknown_column(table, column))
    }
}

#[derive(Debug, Default)]
struct Shared {
    tables: RwLock<BTreeMap<String, MemoryTable>>,
    journal: Mutex<Vec<JournalEntry>>,
    sessions: AtomicU64,
    clones: AtomicU64,
}

/// An in-memory relational store.
///
/// Tables are created by their first insert (or by [`MemoryAccessor::create_table`]);
/// the first column of a table is its key and must be unique. Every statement
/// is appended to a journal shared by all sessions, which makes the exact
/// statements and clone counts of an operation observable in tests.
///
/// [`Clone`] returns another handle on the same session and is not counted;
/// [`DataAccessor::clone_accessor`] opens a new, counted session.
///
/// # Example
///
/// ```rust
/// use foodwaste_store::{DataAccessor, MemoryAccessor};
/// use foodwaste_sql::{ColumnRef, Insert, Select, SqlValue, Statement, TableRef};
///
/// let mut accessor = MemoryAccessor::new();
/// accessor
///     .execute(&Statement::Insert(Insert {
///         table: "FoodItems",
///         columns: vec!["FoodItemIdentifier", "IsActive"],
///         values: vec![SqlValue::text("A"), SqlValue::Bool(true)],
///     }))
///     .unwrap();
/// let reader = accessor
///     .query(&Statement::Select(
///         Select::from(TableRef::new("FoodItems")).column(ColumnRef::new("IsActive")),
///     ))
///     .unwrap();
/// assert_eq!(reader.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct MemoryAccessor {
    shared: Arc<Shared>,
    session: u64,
}

impl MemoryAccessor {
    /// Creates an empty store and returns its first session.
    #[must_use]
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared::default()),
            session: 0,
        }
    }

    /// Declares a table with the given columns, replacing any existing one.
    pub fn create_table(&self, table: &str, columns: &[&str]) {
        self.shared.tables.write().insert(
            table.to_string(),
            MemoryTable {
                columns: columns.iter().map(|c| (*c).to_string()).collect(),
                rows: Vec::new(),
            },
        );
    }

    /// Returns every statement executed so far, oldest first.
    #[must_use]
    pub fn journal(&self) -> Vec<JournalEntry> {
        self.shared.journal.lock().clone()
    }

    /// Returns the executed inserts, updates and deletes.
    #[must_use]
    pub fn writes(&self) -> Vec<JournalEntry> {
        self.shared
            .journal
            .lock()
            .iter()
            .filter(|e| e.kind.is_write())
            .cloned()
            .collect()
    }

    /// Number of sessions cloned since creation or the last [`Self::reset_journal`].
    #[must_use]
    pub fn clone_count(&self) -> u64 {
        self.shared.clones.load(Ordering::SeqCst)
    }

    /// Clears the journal and the clone counter. Table contents are kept.
    pub fn reset_journal(&self) {
        self.shared.journal.lock().clear();
        self.shared.clones.store(0, Ordering::SeqCst);
    }

    /// Returns a snapshot of all rows of `table`.
    #[must_use]
    pub fn rows(&self, table: &str) -> Vec<Row> {
        let tables = self.shared.tables.read();
        let Some(t) = tables.get(table) else {
            return Vec::new();
        };
        let columns: Arc<[String]> = t.columns.iter().cloned().collect();
        t.rows
            .iter()
            .map(|values| Row::new(Arc::clone(&columns), values.clone()))
            .collect()
    }

    /// Number of rows in `table`.
    #[must_use]
    pub fn row_count(&self, table: &str) -> usize {
        self.shared
            .tables
            .read()
            .get(table)
            .map_or(0, |t| t.rows.len())
    }

    fn record(&self, statement: &Statement, rows: u64) {
        let text = statement.to_string();
        debug!(session = self.session, rows, statement = %text, "memory statement");
        self.shared.journal.lock().push(JournalEntry {
            session: self.session,
            kind: statement.kind(),
            table: statement.table(),
            text,
            rows,
        });
    }

    fn select(&self, select: &Select) -> StoreResult<RowReader> {
        let columns: Arc<[String]> = select
            .columns
            .iter()
            .map(|c| c.output_name().to_string())
            .collect();
        let tables = self.shared.tables.read();

        let Some(base) = tables.get(select.from.name) else {
            return Ok(RowReader::empty(columns));
        };
        let joined = match &select.join {
            Some(join) => match tables.get(join.table.name) {
                Some(table) => Some((join, table)),
                None => return Ok(RowReader::empty(columns)),
            },
            None => None,
        };

        let scope = Scope {
            base: (select.from.name, select.from.qualifier(), base),
            joined: joined.map(|(join, table)| (join.table.name, join.table.qualifier(), table)),
        };

        let mut matches: Vec<(&Vec<SqlValue>, Option<&Vec<SqlValue>>)> = Vec::new();
        for base_row in &base.rows {
            match joined {
                Some((join, table)) => {
                    for join_row in &table.rows {
                        let pair = (base_row, Some(join_row));
                        let left = scope.resolve(&join.left, pair)?;
                        let right = scope.resolve(&join.right, pair)?;
                        if left.store_eq(right) && scope.matches(&select.filter, pair)? {
                            matches.push(pair);
                        }
                    }
                }
                None => {
                    if scope.matches(&select.filter, (base_row, None))? {
                        matches.push((base_row, None));
                    }
                }
            }
        }

        let mut keyed = Vec::with_capacity(matches.len());
        for pair in matches {
            let mut sort_key = Vec::with_capacity(select.order_by.len());
            for column in &select.order_by {
                sort_key.push(scope.resolve(column, pair)?.clone());
            }
            let mut values = Vec::with_capacity(select.columns.len());
            for column in &select.columns {
                values.push(scope.resolve(column, pair)?.clone());
            }
            keyed.push((sort_key, values));
        }
        keyed.sort_by(|(a, _), (b, _)| {
            a.iter()
                .zip(b.iter())
                .map(|(x, y)| x.cmp_store(y))
                .find(|o| o.is_ne())
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let rows = keyed
            .into_iter()
            .map(|(_, values)| Row::new(Arc::clone(&columns), values))
            .collect();
        Ok(RowReader::new(columns, rows))
    }

    fn insert(&self, insert: &Insert) -> StoreResult<u64> {
        let mut tables = self.shared.tables.write();
        let table = tables
            .entry(insert.table.to_string())
            .or_insert_with(|| MemoryTable {
                columns: insert.columns.iter().map(|c| (*c).to_string()).collect(),
                rows: Vec::new(),
            });

        let mut row = vec![SqlValue::Null; table.columns.len()];
        for (column, value) in insert.columns.iter().zip(insert.values.iter()) {
            let index = table.index(insert.table, column)?;
            row[index] = value.clone();
        }

        if let Some(key) = row.first() {
            if table.rows.iter().any(|r| r[0].store_eq(key)) {
                return Err(StoreError::constraint(
                    insert.table,
                    format!("duplicate key {key}"),
                ));
            }
        }
        table.rows.push(row);
        Ok(1)
    }

    fn update(&self, update: &Update) -> StoreResult<u64> {
        let mut tables = self.shared.tables.write();
        let Some(table) = tables.get_mut(update.table) else {
            return Ok(0);
        };
        let mut assignments = Vec::with_capacity(update.assignments.len());
        for (column, value) in &update.assignments {
            assignments.push((table.index(update.table, column)?, value));
        }
        let selected = filter_rows(update.table, table, &update.filter)?;
        for &i in &selected {
            for (index, value) in &assignments {
                table.rows[i][*index] = (*value).clone();
            }
        }
        Ok(selected.len() as u64)
    }

    fn delete(&self, delete: &Delete) -> StoreResult<u64> {
        let mut tables = self.shared.tables.write();
        let Some(table) = tables.get_mut(delete.table) else {
            return Ok(0);
        };
        let selected = filter_rows(delete.table, table, &delete.filter)?;
        for &i in selected.iter().rev() {
            table.rows.remove(i);
        }
        Ok(selected.len() as u64)
    }
}

impl Default for MemoryAccessor {
    fn default() -> Self {
        Self::new()
    }
}

impl DataAccessor for MemoryAccessor {
    fn clone_accessor(&self) -> StoreResult<Box<dyn DataAccessor>> {
        self.shared.clones.fetch_add(1, Ordering::SeqCst);
        let session = self.shared.sessions.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(Box::new(Self {
            shared: Arc::clone(&self.shared),
            session,
        }))
    }

    fn query(&mut self, statement: &Statement) -> StoreResult<RowReader> {
        let Statement::Select(select) = statement else {
            return Err(StoreError::UnexpectedStatement {
                expected: "SELECT",
                actual: statement.kind(),
            });
        };
        let reader = self.select(select)?;
        self.record(statement, reader.len() as u64);
        Ok(reader)
    }

    fn execute(&mut self, statement: &Statement) -> StoreResult<u64> {
        let affected = match statement {
            Statement::Insert(insert) => self.insert(insert)?,
            Statement::Update(update) => self.update(update)?,
            Statement::Delete(delete) => self.delete(delete)?,
            Statement::Select(_) => {
                return Err(StoreError::UnexpectedStatement {
                    expected: "INSERT, UPDATE or DELETE",
                    actual: StatementKind::Select,
                })
            }
        };
        self.record(statement, affected);
        Ok(affected)
    }

    fn session_id(&self) -> u64 {
        self.session
    }
}

type ScopeTable<'a> = (&'static str, &'static str, &'a MemoryTable);
type RowPair<'a> = (&'a Vec<SqlValue>, Option<&'a Vec<SqlValue>>);

struct Scope<'a> {
    base: ScopeTable<'a>,
    joined: Option<ScopeTable<'a>>,
}

impl<'a> Scope<'a> {
    fn resolve(&self, column: &ColumnRef, (base_row, join_row): RowPair<'a>) -> StoreResult<&'a SqlValue> {
        let (name, qualifier, table) = self.base;
        let in_base = column.qualifier.map_or(true, |q| q == qualifier || q == name);
        if in_base {
            if let Some(i) = table.columns.iter().position(|c| c.eq_ignore_ascii_case(column.name)) {
                return Ok(&base_row[i]);
            }
        }
        if let (Some((join_name, join_qualifier, join_table)), Some(join_row)) = (self.joined, join_row) {
            if column.qualifier.map_or(true, |q| q == join_qualifier || q == join_name) {
                if let Some(i) = join_table
                    .columns
                    .iter()
                    .position(|c| c.eq_ignore_ascii_case(column.name))
                {
                    return Ok(&join_row[i]);
                }
            }
        }
        Err(StoreError::unknown_column(
            column.qualifier.unwrap_or(name),
            column.name,
        ))
    }

    fn matches(&self, filter: &[Predicate], pair: RowPair<'a>) -> StoreResult<bool> {
        for predicate in filter {
            let keep = match predicate {
                Predicate::Eq(column, value) => self.resolve(column, pair)?.store_eq(value),
                Predicate::IsNull(column) => self.resolve(column, pair)?.is_null(),
            };
            if !keep {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

fn filter_rows(name: &'static str, table: &MemoryTable, filter: &[Predicate]) -> StoreResult<Vec<usize>> {
    let scope = Scope {
        base: (name, name, table),
        joined: None,
    };
    let mut selected = Vec::new();
    for (i, row) in table.rows.iter().enumerate() {
        if scope.matches(filter, (row, None))? {
            selected.push(i);
        }
    }
    Ok(selected)
}
