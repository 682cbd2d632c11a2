//! Driver interface.
//!
//! sqlsplice never talks to a server itself. A driver supplies a [`Connection`] that
//! accepts rendered SQL text and hands back rows of [`Value`](crate::Value)s, either all
//! at once ([`Connection::raw_query`]) or through a [`RowCursor`].
//!
//! A connection must not be used for two operations at once. The `&mut self`
//! receivers enforce this for safe code; the crate performs no further locking.

use crate::row::Row;

/// Server-side result cursor produced by [`Connection::raw_stream`].
///
/// [`close`](RowCursor::close) releases the cursor. The execution facade calls it
/// exactly once on every exit path; implementations should also release on `Drop`
/// for cursors that are abandoned by other callers.
pub trait RowCursor {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Fetch the next row, `None` once the result set is exhausted.
    fn fetch(&mut self) -> Result<Option<Row>, Self::Error>;

    fn close(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// A live connection to a database server.
pub trait Connection: Sized {
    /// Whatever identifies the server: a URL, a config struct, a file path.
    type Descriptor: ?Sized;

    type Error: std::error::Error + Send + Sync + 'static;

    type Cursor<'c>: RowCursor<Error = Self::Error>
    where
        Self: 'c;

    fn connect(descriptor: &Self::Descriptor) -> Result<Self, Self::Error>;

    fn close(self) -> Result<(), Self::Error>;

    /// Run a statement, discarding any result.
    fn raw_exec(&mut self, sql: &str) -> Result<(), Self::Error>;

    /// Run a query and materialise every row.
    fn raw_query(&mut self, sql: &str) -> Result<Vec<Row>, Self::Error>;

    /// Open a cursor over the result of `sql`. No row is fetched until the caller asks.
    fn raw_stream(&mut self, sql: &str) -> Result<Self::Cursor<'_>, Self::Error>;
}
