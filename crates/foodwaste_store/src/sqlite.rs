//! SQLite-backed accessor.

use crate::accessor::DataAccessor;
use crate::error::{StoreError, StoreResult};
use crate::reader::RowReader;
use foodwaste_sql::{Row, SqlValue, Statement, StatementKind, TIMESTAMP_FORMAT};
use rusqlite::types::{Value, ValueRef};
use rusqlite::{params_from_iter, Connection, OpenFlags};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Configuration for opening a SQLite store.
#[derive(Debug, Clone)]
pub struct SqliteConfig {
    /// Database file path, or a `file:` URI.
    pub path: PathBuf,

    /// How long a session waits for a lock held by another session.
    pub busy_timeout: Duration,

    /// Whether to enforce foreign key constraints.
    pub foreign_keys: bool,
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("foodwaste.db"),
            busy_timeout: Duration::from_secs(5),
            foreign_keys: false,
        }
    }
}

impl SqliteConfig {
    /// Creates a configuration for the database file at `path`.
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    /// Creates a configuration for a named in-memory database shared by
    /// every session opened from it.
    #[must_use]
    pub fn shared_memory(name: &str) -> Self {
        Self::new(format!("file:{name}?mode=memory&cache=shared"))
    }

    /// Sets the busy timeout.
    #[must_use]
    pub const fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    /// Sets whether foreign keys are enforced.
    #[must_use]
    pub const fn foreign_keys(mut self, value: bool) -> Self {
        self.foreign_keys = value;
        self
    }
}

/// A session against a SQLite database.
///
/// Every clone opens its own connection to the same database, so a nested
/// query never touches the connection that produced an outer result set.
pub struct SqliteAccessor {
    conn: Connection,
    config: Arc<SqliteConfig>,
    sessions: Arc<AtomicU64>,
    session: u64,
}

impl SqliteAccessor {
    /// Opens (or creates) the database described by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened.
    pub fn open(config: SqliteConfig) -> StoreResult<Self> {
        let conn = connect(&config)?;
        Ok(Self {
            conn,
            config: Arc::new(config),
            sessions: Arc::new(AtomicU64::new(0)),
            session: 0,
        })
    }

    /// Runs a batch of `;`-separated statements, such as a schema script.
    ///
    /// # Errors
    ///
    /// Returns an error if any statement fails.
    pub fn execute_script(&self, script: &str) -> StoreResult<()> {
        self.conn.execute_batch(script)?;
        Ok(())
    }

    /// The configuration this store was opened with.
    #[must_use]
    pub fn config(&self) -> &SqliteConfig {
        &self.config
    }
}

impl std::fmt::Debug for SqliteAccessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteAccessor")
            .field("path", &self.config.path)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl DataAccessor for SqliteAccessor {
    fn clone_accessor(&self) -> StoreResult<Box<dyn DataAccessor>> {
        let conn = connect(&self.config)?;
        let session = self.sessions.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(Box::new(Self {
            conn,
            config: Arc::clone(&self.config),
            sessions: Arc::clone(&self.sessions),
            session,
        }))
    }

    fn query(&mut self, statement: &Statement) -> StoreResult<RowReader> {
        if statement.kind() != StatementKind::Select {
            return Err(StoreError::UnexpectedStatement {
                expected: "SELECT",
                actual: statement.kind(),
            });
        }
        debug!(session = self.session, statement = %statement, "sqlite query");

        let sql = statement.sql();
        let mut prepared = self.conn.prepare(&sql)?;
        let columns: Arc<[String]> = prepared
            .column_names()
            .into_iter()
            .map(str::to_string)
            .collect();

        let mut rows = Vec::new();
        let mut cursor = prepared.query(params_from_iter(bind(statement)))?;
        while let Some(row) = cursor.next()? {
            let mut values = Vec::with_capacity(columns.len());
            for (i, name) in columns.iter().enumerate() {
                values.push(read_value(name, row.get_ref(i)?)?);
            }
            rows.push(Row::new(Arc::clone(&columns), values));
        }
        Ok(RowReader::new(columns, rows))
    }

    fn execute(&mut self, statement: &Statement) -> StoreResult<u64> {
        if statement.kind() == StatementKind::Select {
            return Err(StoreError::UnexpectedStatement {
                expected: "INSERT, UPDATE or DELETE",
                actual: StatementKind::Select,
            });
        }
        debug!(session = self.session, statement = %statement, "sqlite execute");

        let affected = self
            .conn
            .execute(&statement.sql(), params_from_iter(bind(statement)))?;
        Ok(affected as u64)
    }

    fn session_id(&self) -> u64 {
        self.session
    }
}

fn connect(config: &SqliteConfig) -> StoreResult<Connection> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_URI
        | OpenFlags::SQLITE_OPEN_NO_MUTEX;
    let conn = Connection::open_with_flags(&config.path, flags)?;
    conn.busy_timeout(config.busy_timeout)?;
    conn.pragma_update(None, "foreign_keys", if config.foreign_keys { "ON" } else { "OFF" })?;
    Ok(conn)
}

fn bind(statement: &Statement) -> Vec<Value> {
    statement
        .params()
        .into_iter()
        .map(|value| match value {
            SqlValue::Null => Value::Null,
            SqlValue::Bool(b) => Value::Integer(i64::from(*b)),
            SqlValue::Integer(n) => Value::Integer(*n),
            SqlValue::Real(r) => Value::Real(*r),
            SqlValue::Text(s) => Value::Text(s.clone()),
            SqlValue::Timestamp(t) => Value::Text(t.format(TIMESTAMP_FORMAT).to_string()),
        })
        .collect()
}

fn read_value(column: &str, value: ValueRef<'_>) -> StoreResult<SqlValue> {
    Ok(match value {
        ValueRef::Null => SqlValue::Null,
        ValueRef::Integer(n) => SqlValue::Integer(n),
        ValueRef::Real(r) => SqlValue::Real(r),
        ValueRef::Text(bytes) => SqlValue::Text(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(_) => {
            return Err(StoreError::UnsupportedValue {
                column: column.to_string(),
                type_name: "blob",
            })
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accessor::DataReader;
    use foodwaste_sql::{ColumnRef, Insert, Select, TableRef};
    use tempfile::TempDir;

    fn open() -> (TempDir, SqliteAccessor) {
        let dir = TempDir::new().unwrap();
        let accessor = SqliteAccessor::open(SqliteConfig::new(dir.path().join("test.db"))).unwrap();
        accessor
            .execute_script(
                "CREATE TABLE FoodItems (FoodItemIdentifier CHAR(36) PRIMARY KEY, IsActive INTEGER NOT NULL);",
            )
            .unwrap();
        (dir, accessor)
    }

    fn insert_item(id: &str, active: bool) -> Statement {
        Statement::Insert(Insert {
            table: "FoodItems",
            columns: vec!["FoodItemIdentifier", "IsActive"],
            values: vec![SqlValue::text(id), SqlValue::Bool(active)],
        })
    }

    #[test]
    fn insert_then_query() {
        let (_dir, mut accessor) = open();
        assert_eq!(accessor.execute(&insert_item("A", true)).unwrap(), 1);

        let mut reader = accessor
            .query(&Statement::Select(
                Select::from(TableRef::new("FoodItems"))
                    .columns([ColumnRef::new("FoodItemIdentifier"), ColumnRef::new("IsActive")])
                    .filter_eq(ColumnRef::new("FoodItemIdentifier"), "A"),
            ))
            .unwrap();
        assert!(reader.read());
        let row = reader.current().unwrap();
        assert!(row.bool("IsActive").unwrap());
        assert!(!reader.read());
    }

    #[test]
    fn clone_sees_writes_of_other_sessions() {
        let (_dir, mut accessor) = open();
        let mut clone = accessor.clone_accessor().unwrap();
        clone.execute(&insert_item("B", false)).unwrap();
        drop(clone);

        let reader = accessor
            .query(&Statement::Select(
                Select::from(TableRef::new("FoodItems")).column(ColumnRef::new("FoodItemIdentifier")),
            ))
            .unwrap();
        assert_eq!(reader.len(), 1);
    }

    #[test]
    fn primary_key_violation_is_reported() {
        let (_dir, mut accessor) = open();
        accessor.execute(&insert_item("A", true)).unwrap();
        assert!(matches!(
            accessor.execute(&insert_item("A", true)),
            Err(StoreError::Sqlite(_))
        ));
    }

    #[test]
    fn execute_rejects_select() {
        let (_dir, mut accessor) = open();
        let err = accessor
            .execute(&Statement::Select(
                Select::from(TableRef::new("FoodItems")).column(ColumnRef::new("IsActive")),
            ))
            .unwrap_err();
        assert!(matches!(err, StoreError::UnexpectedStatement { .. }));
    }
}
