//! The buffered row cursor returned by every accessor.

use crate::accessor::DataReader;
use foodwaste_sql::Row;
use std::any::Any;
use std::sync::Arc;

/// Cursor over a fully materialized result set.
///
/// Rows are buffered when the query runs, so the session that produced them
/// is free again as soon as `query` returns.
#[derive(Debug, Clone)]
pub struct RowReader {
    columns: Arc<[String]>,
    rows: Vec<Row>,
    position: Option<usize>,
}

impl RowReader {
    /// Creates a cursor over `rows`, positioned before the first row.
    #[must_use]
    pub fn new(columns: Arc<[String]>, rows: Vec<Row>) -> Self {
        Self {
            columns,
            rows,
            position: None,
        }
    }

    /// Creates a cursor with no rows.
    #[must_use]
    pub fn empty(columns: Arc<[String]>) -> Self {
        Self::new(columns, Vec::new())
    }

    /// Column names of the result set.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of rows in the result set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the result set has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Consumes the cursor and returns the remaining rows.
    #[must_use]
    pub fn into_rows(self) -> Vec<Row> {
        let skip = self.position.map_or(0, |p| p + 1);
        self.rows.into_iter().skip(skip).collect()
    }
}

impl DataReader for RowReader {
    fn read(&mut self) -> bool {
        let next = self.position.map_or(0, |p| p + 1);
        if next < self.rows.len() {
            self.position = Some(next);
            true
        } else {
            self.position = Some(self.rows.len());
            false
        }
    }

    fn current(&self) -> Option<&Row> {
        self.position.and_then(|p| self.rows.get(p))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
