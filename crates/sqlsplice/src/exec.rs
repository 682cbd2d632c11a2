//! Execution facade.
//!
//! Every operation renders the [`Query`] once and hands the text to the driver:
//!
//! - [`exec`] runs a statement and discards its result.
//! - [`buffered_query`] materialises every row, then converts each with [`FromRow`].
//! - [`streaming_fold`] walks a cursor one row at a time, threading a state through a
//!   step function that decides whether to continue or stop.
//!
//! The same operations are available as methods on [`Query`]. Driver failures come back
//! as [`Error::Driver`], shape mismatches as [`Error::Conversion`]. Nothing is retried.

use crate::driver::{Connection, RowCursor};
use crate::error::{Error, Result};
use crate::query::Query;
use crate::row::{FromRow, Row};
use tracing::{debug, warn};

/// Continue/stop signal returned by the step function of a streaming fold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step<S> {
    /// Fetch the next row with this state.
    Continue(S),
    /// Release the cursor and return this state. No further row is fetched.
    Stop(S),
}

impl<S> Step<S> {
    pub fn into_inner(self) -> S {
        match self {
            Step::Continue(s) | Step::Stop(s) => s,
        }
    }

    pub fn is_stop(&self) -> bool {
        matches!(self, Step::Stop(_))
    }
}

/// Run `query` for its side effects.
pub fn exec<C: Connection>(conn: &mut C, query: &Query) -> Result<()> {
    let sql = query.to_sql();
    debug!(target: "sqlsplice::exec", op = "exec", sql_len = sql.len(), values = query.value_count());
    conn.raw_exec(&sql).map_err(Error::driver)
}

/// Run `query` and convert every returned row. Fails on the first row that does not fit `T`.
pub fn buffered_query<C, T>(conn: &mut C, query: &Query) -> Result<Vec<T>>
where
    C: Connection,
    T: FromRow,
{
    let sql = query.to_sql();
    debug!(target: "sqlsplice::exec", op = "query", sql_len = sql.len(), values = query.value_count());
    let rows = conn.raw_query(&sql).map_err(Error::driver)?;
    debug!(target: "sqlsplice::exec", op = "query", rows = rows.len(), "rows received");
    rows.into_iter()
        .map(|row| T::from_row(row).map_err(Error::from))
        .collect()
}

/// Left-fold over the rows of `query` with early termination.
///
/// `step` receives the current state and the next converted row and answers with a
/// [`Step`]. On [`Step::Stop`] the cursor is released without fetching again. A row
/// that fails to convert aborts the fold; bad rows are never skipped.
pub fn streaming_fold<C, T, S, F>(conn: &mut C, query: &Query, init: S, mut step: F) -> Result<S>
where
    C: Connection,
    T: FromRow,
    F: FnMut(S, T) -> Step<S>,
{
    try_streaming_fold(conn, query, init, |state, row| Ok(step(state, row)))
}

/// Like [`streaming_fold`], but the step function may itself fail.
pub fn try_streaming_fold<C, T, S, F>(
    conn: &mut C,
    query: &Query,
    init: S,
    mut step: F,
) -> Result<S>
where
    C: Connection,
    T: FromRow,
    F: FnMut(S, T) -> Result<Step<S>>,
{
    let sql = query.to_sql();
    debug!(target: "sqlsplice::exec", op = "stream", sql_len = sql.len(), values = query.value_count());
    let cursor = conn.raw_stream(&sql).map_err(Error::driver)?;
    let mut guard = CursorGuard::new(cursor);

    let mut state = init;
    let mut rows = 0usize;
    loop {
        let row = match guard.fetch() {
            Ok(Some(row)) => row,
            Ok(None) => break,
            Err(e) => return Err(guard.fail(e)),
        };
        rows += 1;
        let item = match T::from_row(row) {
            Ok(item) => item,
            Err(e) => return Err(guard.fail(e.into())),
        };
        match step(state, item) {
            Ok(Step::Continue(next)) => state = next,
            Ok(Step::Stop(last)) => {
                state = last;
                debug!(target: "sqlsplice::exec", op = "stream", rows, "stopped by caller");
                break;
            }
            Err(e) => return Err(guard.fail(e)),
        }
    }

    guard.close()?;
    debug!(target: "sqlsplice::exec", op = "stream", rows, "cursor released");
    Ok(state)
}

/// Connect, run `f`, and close the connection whatever `f` returns.
///
/// A close failure after `f` succeeded is returned; after `f` failed it is logged and
/// `f`'s error wins.
pub fn with_connection<C, R, F>(descriptor: &C::Descriptor, f: F) -> Result<R>
where
    C: Connection,
    F: FnOnce(&mut C) -> Result<R>,
{
    let mut conn = C::connect(descriptor).map_err(Error::driver)?;
    match f(&mut conn) {
        Ok(value) => {
            conn.close().map_err(Error::driver)?;
            Ok(value)
        }
        Err(err) => {
            if let Err(close_err) = conn.close() {
                warn!(target: "sqlsplice::exec", error = %close_err, "failed to close connection after error");
            }
            Err(err)
        }
    }
}

// Closes the cursor exactly once: through `close`, `fail`, or on drop (a panicking step).
struct CursorGuard<Cur: RowCursor> {
    cursor: Cur,
    closed: bool,
}

impl<Cur: RowCursor> CursorGuard<Cur> {
    fn new(cursor: Cur) -> Self {
        Self {
            cursor,
            closed: false,
        }
    }

    fn fetch(&mut self) -> Result<Option<Row>> {
        self.cursor.fetch().map_err(Error::driver)
    }

    fn close(mut self) -> Result<()> {
        self.closed = true;
        self.cursor.close().map_err(Error::driver)
    }

    fn fail(mut self, err: Error) -> Error {
        self.closed = true;
        if let Err(close_err) = self.cursor.close() {
            warn!(target: "sqlsplice::exec", error = %close_err, "failed to close cursor after error");
        }
        err
    }
}

impl<Cur: RowCursor> Drop for CursorGuard<Cur> {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        if let Err(e) = self.cursor.close() {
            warn!(target: "sqlsplice::exec", error = %e, "failed to close abandoned cursor");
        }
    }
}

impl Query {
    /// See [`exec`].
    pub fn execute<C: Connection>(&self, conn: &mut C) -> Result<()> {
        exec(conn, self)
    }

    /// See [`buffered_query`].
    pub fn fetch_all<T: FromRow, C: Connection>(&self, conn: &mut C) -> Result<Vec<T>> {
        buffered_query(conn, self)
    }

    /// See [`streaming_fold`].
    pub fn fold<T, S, F, C>(&self, conn: &mut C, init: S, step: F) -> Result<S>
    where
        C: Connection,
        T: FromRow,
        F: FnMut(S, T) -> Step<S>,
    {
        streaming_fold(conn, self, init, step)
    }

    /// See [`try_streaming_fold`].
    pub fn try_fold<T, S, F, C>(&self, conn: &mut C, init: S, step: F) -> Result<S>
    where
        C: Connection,
        T: FromRow,
        F: FnMut(S, T) -> Result<Step<S>>,
    {
        try_streaming_fold(conn, self, init, step)
    }

    /// First row, if any. Only one row is fetched.
    pub fn fetch_optional<T: FromRow, C: Connection>(&self, conn: &mut C) -> Result<Option<T>> {
        self.fold(conn, None, |_, row| Step::Stop(Some(row)))
    }

    /// First row, or [`Error::NotFound`] when the result is empty.
    pub fn fetch_one<T: FromRow, C: Connection>(&self, conn: &mut C) -> Result<T> {
        self.fetch_optional(conn)?
            .ok_or_else(|| Error::not_found("query returned no rows"))
    }
}
