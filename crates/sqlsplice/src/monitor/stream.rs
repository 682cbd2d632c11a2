use super::config::MonitorConfig;
use super::instrumented::report;
use super::types::{QueryContext, QueryHook, QueryMonitor, QueryOutcome};
use crate::driver::{Connection, RowCursor};
use crate::error::{Error, Result};
use crate::row::Row;
use std::sync::Arc;
use std::time::Instant;

/// Cursor returned by [`InstrumentedConnection`](super::InstrumentedConnection).
///
/// Reports exactly once: when the result is exhausted, on the first error, on close,
/// or on drop, whichever comes first. The reported duration spans open to finish and
/// the row count covers rows actually fetched.
pub struct InstrumentedCursor<'c, C: Connection + 'c> {
    inner: C::Cursor<'c>,
    monitor: Arc<dyn QueryMonitor>,
    hook: Option<Arc<dyn QueryHook>>,
    config: MonitorConfig,
    ctx: QueryContext,
    start: Instant,
    rows: usize,
    finished: bool,
}

impl<'c, C: Connection + 'c> InstrumentedCursor<'c, C> {
    pub(super) fn new(
        inner: C::Cursor<'c>,
        monitor: Arc<dyn QueryMonitor>,
        hook: Option<Arc<dyn QueryHook>>,
        config: MonitorConfig,
        ctx: QueryContext,
        start: Instant,
    ) -> Self {
        Self {
            inner,
            monitor,
            hook,
            config,
            ctx,
            start,
            rows: 0,
            finished: false,
        }
    }

    /// Rows fetched so far.
    pub fn rows(&self) -> usize {
        self.rows
    }

    fn finalize(&mut self, dropped: bool, err: Option<&Error>) {
        if self.finished {
            return;
        }
        self.finished = true;
        self.ctx
            .fields
            .insert("stream_dropped".to_string(), dropped.to_string());

        let outcome = match err {
            None => QueryOutcome::Rows(self.rows),
            Some(e) => QueryOutcome::error(e.to_string()),
        };
        report(
            &self.config,
            self.monitor.as_ref(),
            self.hook.as_deref(),
            &self.ctx,
            self.start.elapsed(),
            &outcome,
        );
    }
}

impl<'c, C: Connection + 'c> RowCursor for InstrumentedCursor<'c, C> {
    type Error = Error;

    fn fetch(&mut self) -> Result<Option<Row>> {
        match self.inner.fetch().map_err(Error::driver) {
            Ok(Some(row)) => {
                self.rows += 1;
                Ok(Some(row))
            }
            Ok(None) => {
                self.finalize(false, None);
                Ok(None)
            }
            Err(e) => {
                self.finalize(false, Some(&e));
                Err(e)
            }
        }
    }

    fn close(&mut self) -> Result<()> {
        let result = self.inner.close().map_err(Error::driver);
        self.finalize(false, result.as_ref().err());
        result
    }
}

impl<'c, C: Connection + 'c> Drop for InstrumentedCursor<'c, C> {
    fn drop(&mut self) {
        self.finalize(true, None);
    }
}
