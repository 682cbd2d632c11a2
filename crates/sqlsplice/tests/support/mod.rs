//! In-memory driver for integration tests.
//!
//! Counts every fetch and cursor close so tests can assert on exactly how much I/O
//! the facade performed.

#![allow(dead_code)]

use sqlsplice::{Connection, Row, RowCursor, Value};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MockError {
    #[error("cannot connect to {0}")]
    Connect(String),
    #[error("statement failed: {0}")]
    Statement(String),
    #[error("fetch failed at row {0}")]
    Fetch(usize),
    #[error("close failed")]
    Close,
}

/// Scripted connection: every query returns `rows`.
#[derive(Debug, Default)]
pub struct MockConnection {
    pub rows: Vec<Row>,
    /// Every SQL string received, in order.
    pub statements: Vec<String>,
    pub fetches: usize,
    pub cursor_closes: usize,
    pub cursors_opened: usize,
    pub fail_statement: Option<String>,
    /// Fail the fetch of this zero-based row.
    pub fail_fetch_at: Option<usize>,
    pub fail_close: bool,
}

impl MockConnection {
    pub fn with_rows(rows: Vec<Row>) -> Self {
        Self {
            rows,
            ..Self::default()
        }
    }

    /// `n` single-column rows holding `1..=n`.
    pub fn counting(n: i64) -> Self {
        Self::with_rows((1..=n).map(|i| vec![Some(Value::Int(i))]).collect())
    }

    fn statement(&mut self, sql: &str) -> Result<(), MockError> {
        self.statements.push(sql.to_string());
        match &self.fail_statement {
            Some(msg) => Err(MockError::Statement(msg.clone())),
            None => Ok(()),
        }
    }
}

pub struct MockCursor<'c> {
    conn: &'c mut MockConnection,
    next: usize,
}

impl RowCursor for MockCursor<'_> {
    type Error = MockError;

    fn fetch(&mut self) -> Result<Option<Row>, MockError> {
        self.conn.fetches += 1;
        if self.conn.fail_fetch_at == Some(self.next) {
            return Err(MockError::Fetch(self.next));
        }
        let row = self.conn.rows.get(self.next).cloned();
        self.next += 1;
        Ok(row)
    }

    fn close(&mut self) -> Result<(), MockError> {
        self.conn.cursor_closes += 1;
        if self.conn.fail_close {
            return Err(MockError::Close);
        }
        Ok(())
    }
}

impl Connection for MockConnection {
    type Descriptor = str;
    type Error = MockError;
    type Cursor<'c> = MockCursor<'c>;

    fn connect(descriptor: &str) -> Result<Self, MockError> {
        if descriptor.starts_with("mock:") {
            Ok(Self::default())
        } else {
            Err(MockError::Connect(descriptor.to_string()))
        }
    }

    fn close(self) -> Result<(), MockError> {
        if self.fail_close {
            return Err(MockError::Close);
        }
        Ok(())
    }

    fn raw_exec(&mut self, sql: &str) -> Result<(), MockError> {
        self.statement(sql)
    }

    fn raw_query(&mut self, sql: &str) -> Result<Vec<Row>, MockError> {
        self.statement(sql)?;
        Ok(self.rows.clone())
    }

    fn raw_stream(&mut self, sql: &str) -> Result<MockCursor<'_>, MockError> {
        self.statement(sql)?;
        self.cursors_opened += 1;
        Ok(MockCursor {
            conn: self,
            next: 0,
        })
    }
}
