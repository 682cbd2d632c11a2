use super::config::MonitorConfig;
use super::monitors::{CompositeHook, NoopMonitor};
use super::stream::InstrumentedCursor;
use super::types::{HookAction, Operation, QueryContext, QueryHook, QueryMonitor, QueryOutcome};
use crate::driver::Connection;
use crate::error::{Error, Result};
use crate::row::Row;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A [`Connection`] wrapper that runs hooks and reports every statement to a monitor.
///
/// Monitoring must be explicitly enabled via [`MonitorConfig::enable_monitoring`].
/// Hooks always run. A hook abort surfaces as [`Error::Aborted`] and the statement
/// never reaches the wrapped connection.
pub struct InstrumentedConnection<C> {
    pub(super) conn: C,
    pub(super) monitor: Arc<dyn QueryMonitor>,
    pub(super) hook: Option<Arc<dyn QueryHook>>,
    pub(super) config: MonitorConfig,
    pub(super) tag: Option<String>,
}

impl<C: Connection> InstrumentedConnection<C> {
    /// Wrap `conn` with no monitoring.
    pub fn new(conn: C) -> Self {
        Self {
            conn,
            monitor: Arc::new(NoopMonitor),
            hook: None,
            config: MonitorConfig::default(),
            tag: None,
        }
    }

    /// Set the monitor configuration.
    pub fn with_config(mut self, config: MonitorConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the query monitor.
    pub fn with_monitor<M: QueryMonitor + 'static>(self, monitor: M) -> Self {
        self.with_monitor_arc(Arc::new(monitor))
    }

    /// Set the query monitor from an Arc.
    pub fn with_monitor_arc(mut self, monitor: Arc<dyn QueryMonitor>) -> Self {
        self.monitor = monitor;
        self
    }

    /// Set a query hook, replacing any existing one.
    pub fn with_hook<H: QueryHook + 'static>(mut self, hook: H) -> Self {
        self.hook = Some(Arc::new(hook));
        self
    }

    /// Add a query hook.
    ///
    /// If a hook is already set, this composes it with the new hook (existing first).
    pub fn add_hook<H: QueryHook + 'static>(self, hook: H) -> Self {
        self.add_hook_arc(Arc::new(hook))
    }

    /// Add a query hook from an `Arc`.
    pub fn add_hook_arc(mut self, hook: Arc<dyn QueryHook>) -> Self {
        self.hook = Some(match self.hook.take() {
            None => hook,
            Some(existing) => Arc::new(CompositeHook::new().add_arc(existing).add_arc(hook)),
        });
        self
    }

    /// Enable monitoring.
    pub fn enable_monitoring(mut self) -> Self {
        self.config.monitoring_enabled = true;
        self
    }

    /// Disable monitoring.
    pub fn disable_monitoring(mut self) -> Self {
        self.config.monitoring_enabled = false;
        self
    }

    /// Tag every subsequent statement; `None` clears the tag.
    pub fn set_tag(&mut self, tag: Option<String>) {
        self.tag = tag;
    }

    /// Check if monitoring is enabled.
    pub fn is_monitoring_enabled(&self) -> bool {
        self.config.monitoring_enabled
    }

    /// Get the current configuration.
    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Get a reference to the inner connection.
    pub fn inner(&self) -> &C {
        &self.conn
    }

    /// Get the inner connection, consuming this wrapper.
    pub fn into_inner(self) -> C {
        self.conn
    }

    fn begin(&self, sql: &str, operation: Operation) -> Result<QueryContext> {
        let mut ctx = QueryContext::new(sql, operation);
        ctx.tag.clone_from(&self.tag);

        if let Some(hook) = &self.hook {
            if let HookAction::Abort(reason) = hook.before_query(&ctx) {
                return Err(Error::Aborted(reason));
            }
        }

        if self.config.monitoring_enabled {
            self.monitor.on_query_start(&ctx);
        }
        Ok(ctx)
    }

    fn report(&self, ctx: &QueryContext, duration: Duration, outcome: &QueryOutcome) {
        report(
            &self.config,
            self.monitor.as_ref(),
            self.hook.as_deref(),
            ctx,
            duration,
            outcome,
        );
    }
}

pub(super) fn report(
    config: &MonitorConfig,
    monitor: &dyn QueryMonitor,
    hook: Option<&dyn QueryHook>,
    ctx: &QueryContext,
    duration: Duration,
    outcome: &QueryOutcome,
) {
    if !config.monitoring_enabled {
        return;
    }

    if let Some(hook) = hook {
        hook.after_query(ctx, duration, outcome);
    }

    monitor.on_query_complete(ctx, duration, outcome);

    if config.is_slow(duration) {
        monitor.on_slow_query(ctx, duration);
    }
}

impl<C: Connection> Connection for InstrumentedConnection<C> {
    type Descriptor = C::Descriptor;
    type Error = Error;
    type Cursor<'c>
        = InstrumentedCursor<'c, C>
    where
        Self: 'c;

    /// Connects the inner driver with monitoring disabled; configure it afterwards.
    fn connect(descriptor: &Self::Descriptor) -> Result<Self> {
        C::connect(descriptor).map(Self::new).map_err(Error::driver)
    }

    fn close(self) -> Result<()> {
        self.conn.close().map_err(Error::driver)
    }

    fn raw_exec(&mut self, sql: &str) -> Result<()> {
        let ctx = self.begin(sql, Operation::Exec)?;
        let start = Instant::now();
        let result = self.conn.raw_exec(sql).map_err(Error::driver);
        let outcome = match &result {
            Ok(()) => QueryOutcome::Executed,
            Err(e) => QueryOutcome::error(e.to_string()),
        };
        self.report(&ctx, start.elapsed(), &outcome);
        result
    }

    fn raw_query(&mut self, sql: &str) -> Result<Vec<Row>> {
        let ctx = self.begin(sql, Operation::Query)?;
        let start = Instant::now();
        let result = self.conn.raw_query(sql).map_err(Error::driver);
        let outcome = match &result {
            Ok(rows) => QueryOutcome::Rows(rows.len()),
            Err(e) => QueryOutcome::error(e.to_string()),
        };
        self.report(&ctx, start.elapsed(), &outcome);
        result
    }

    fn raw_stream(&mut self, sql: &str) -> Result<Self::Cursor<'_>> {
        let ctx = self.begin(sql, Operation::Stream)?;
        let start = Instant::now();
        match self.conn.raw_stream(sql) {
            Ok(cursor) => Ok(InstrumentedCursor::new(
                cursor,
                self.monitor.clone(),
                self.hook.clone(),
                self.config.clone(),
                ctx,
                start,
            )),
            Err(e) => {
                let err = Error::driver(e);
                report(
                    &self.config,
                    self.monitor.as_ref(),
                    self.hook.as_deref(),
                    &ctx,
                    start.elapsed(),
                    &QueryOutcome::error(err.to_string()),
                );
                Err(err)
            }
        }
    }
}
