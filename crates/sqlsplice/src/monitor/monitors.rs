use super::truncate_sql_bytes;
use super::types::{HookAction, QueryContext, QueryHook, QueryMonitor, QueryOutcome, QueryType};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// A no-op monitor that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMonitor;

impl QueryMonitor for NoopMonitor {
    fn on_query_complete(&self, _ctx: &QueryContext, _duration: Duration, _outcome: &QueryOutcome) {}
}

/// A monitor that reports completed statements as `tracing` events.
///
/// Completions are emitted at `DEBUG` (`WARN` for failures), slow queries at `WARN`,
/// all under the `sqlsplice::monitor` target.
#[derive(Debug, Clone)]
pub struct TracingMonitor {
    /// Minimum duration to report (filters out fast statements).
    pub min_duration: Option<Duration>,
    /// Truncate long SQL strings (in bytes). `None` means no truncation.
    pub max_sql_length: Option<usize>,
}

impl Default for TracingMonitor {
    fn default() -> Self {
        Self {
            min_duration: None,
            max_sql_length: Some(200),
        }
    }
}

impl TracingMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only report statements slower than this duration.
    pub fn min_duration(mut self, duration: Duration) -> Self {
        self.min_duration = Some(duration);
        self
    }

    /// Set maximum SQL length to display.
    pub fn max_sql_length(mut self, len: usize) -> Self {
        self.max_sql_length = Some(len);
        self
    }

    pub(crate) fn truncate_sql(&self, sql: &str) -> String {
        match self.max_sql_length {
            Some(max) if sql.len() > max => format!("{}...", truncate_sql_bytes(sql, max)),
            _ => sql.to_string(),
        }
    }
}

impl QueryMonitor for TracingMonitor {
    fn on_query_complete(&self, ctx: &QueryContext, duration: Duration, outcome: &QueryOutcome) {
        if self.min_duration.is_some_and(|min| duration < min) {
            return;
        }

        let sql = self.truncate_sql(&ctx.sql);
        let tag = ctx.tag.as_deref().unwrap_or("-");
        match outcome {
            QueryOutcome::Error(error) => tracing::warn!(
                target: "sqlsplice::monitor",
                query_type = ?ctx.query_type,
                operation = ?ctx.operation,
                tag,
                ?duration,
                error = %error,
                sql = %sql,
                "statement failed"
            ),
            _ => tracing::debug!(
                target: "sqlsplice::monitor",
                query_type = ?ctx.query_type,
                operation = ?ctx.operation,
                tag,
                ?duration,
                outcome = %outcome,
                sql = %sql,
                "statement completed"
            ),
        }
    }

    fn on_slow_query(&self, ctx: &QueryContext, duration: Duration) {
        tracing::warn!(
            target: "sqlsplice::monitor",
            query_type = ?ctx.query_type,
            operation = ?ctx.operation,
            ?duration,
            sql = %self.truncate_sql(&ctx.sql),
            "slow query"
        );
    }
}

/// A monitor that tracks query statistics.
#[derive(Debug, Default)]
pub struct StatsMonitor {
    total_queries: AtomicU64,
    failed_queries: AtomicU64,
    total_duration_nanos: AtomicU64,
    select_count: AtomicU64,
    insert_count: AtomicU64,
    update_count: AtomicU64,
    delete_count: AtomicU64,
    rows_returned: AtomicU64,
    max_duration_nanos: AtomicU64,
    slowest_query: Mutex<Option<String>>,
}

/// Collected query statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryStats {
    /// Total number of statements executed.
    pub total_queries: u64,
    /// Total number of failed statements.
    pub failed_queries: u64,
    /// Total execution time.
    pub total_duration: Duration,
    pub select_count: u64,
    pub insert_count: u64,
    pub update_count: u64,
    pub delete_count: u64,
    /// Rows delivered across all buffered queries and streams.
    pub rows_returned: u64,
    /// Slowest statement duration.
    pub max_duration: Duration,
    /// Slowest statement SQL.
    pub slowest_query: Option<String>,
}

fn saturating_add(counter: &AtomicU64, value: u64) {
    let prev = counter.fetch_add(value, Ordering::Relaxed);
    if prev.checked_add(value).is_none() {
        counter.store(u64::MAX, Ordering::Relaxed);
    }
}

impl StatsMonitor {
    /// Create a new stats monitor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a snapshot of current statistics.
    pub fn stats(&self) -> QueryStats {
        QueryStats {
            total_queries: self.total_queries.load(Ordering::Relaxed),
            failed_queries: self.failed_queries.load(Ordering::Relaxed),
            total_duration: Duration::from_nanos(self.total_duration_nanos.load(Ordering::Relaxed)),
            select_count: self.select_count.load(Ordering::Relaxed),
            insert_count: self.insert_count.load(Ordering::Relaxed),
            update_count: self.update_count.load(Ordering::Relaxed),
            delete_count: self.delete_count.load(Ordering::Relaxed),
            rows_returned: self.rows_returned.load(Ordering::Relaxed),
            max_duration: Duration::from_nanos(self.max_duration_nanos.load(Ordering::Relaxed)),
            slowest_query: self
                .slowest_query
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone(),
        }
    }

    /// Reset all statistics.
    pub fn reset(&self) {
        for counter in [
            &self.total_queries,
            &self.failed_queries,
            &self.total_duration_nanos,
            &self.select_count,
            &self.insert_count,
            &self.update_count,
            &self.delete_count,
            &self.rows_returned,
            &self.max_duration_nanos,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
        *self
            .slowest_query
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }
}

impl QueryMonitor for StatsMonitor {
    fn on_query_complete(&self, ctx: &QueryContext, duration: Duration, outcome: &QueryOutcome) {
        let duration_nanos = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);

        self.total_queries.fetch_add(1, Ordering::Relaxed);
        saturating_add(&self.total_duration_nanos, duration_nanos);

        let by_type = match ctx.query_type {
            QueryType::Select => Some(&self.select_count),
            QueryType::Insert => Some(&self.insert_count),
            QueryType::Update => Some(&self.update_count),
            QueryType::Delete => Some(&self.delete_count),
            QueryType::Other => None,
        };
        if let Some(counter) = by_type {
            counter.fetch_add(1, Ordering::Relaxed);
        }

        match outcome {
            QueryOutcome::Error(_) => {
                self.failed_queries.fetch_add(1, Ordering::Relaxed);
            }
            QueryOutcome::Rows(n) => {
                saturating_add(&self.rows_returned, u64::try_from(*n).unwrap_or(u64::MAX));
            }
            QueryOutcome::Executed => {}
        }

        // Update max duration + slowest query only when we actually become the new max.
        let mut current_max = self.max_duration_nanos.load(Ordering::Relaxed);
        while duration_nanos > current_max {
            match self.max_duration_nanos.compare_exchange_weak(
                current_max,
                duration_nanos,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => {
                    *self
                        .slowest_query
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner) = Some(ctx.sql.clone());
                    break;
                }
                Err(updated) => current_max = updated,
            }
        }
    }
}

/// A composite monitor that delegates to multiple monitors.
#[derive(Default)]
pub struct CompositeMonitor {
    monitors: Vec<Arc<dyn QueryMonitor>>,
}

impl CompositeMonitor {
    /// Create an empty composite monitor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a monitor.
    #[allow(clippy::should_implement_trait)]
    pub fn add<M: QueryMonitor + 'static>(self, monitor: M) -> Self {
        self.add_arc(Arc::new(monitor))
    }

    /// Add an Arc-wrapped monitor.
    pub fn add_arc(mut self, monitor: Arc<dyn QueryMonitor>) -> Self {
        self.monitors.push(monitor);
        self
    }

    pub fn len(&self) -> usize {
        self.monitors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.monitors.is_empty()
    }
}

impl QueryMonitor for CompositeMonitor {
    fn on_query_start(&self, ctx: &QueryContext) {
        for monitor in &self.monitors {
            monitor.on_query_start(ctx);
        }
    }

    fn on_query_complete(&self, ctx: &QueryContext, duration: Duration, outcome: &QueryOutcome) {
        for monitor in &self.monitors {
            monitor.on_query_complete(ctx, duration, outcome);
        }
    }

    fn on_slow_query(&self, ctx: &QueryContext, duration: Duration) {
        for monitor in &self.monitors {
            monitor.on_slow_query(ctx, duration);
        }
    }
}

/// A composite hook that runs multiple hooks in sequence.
///
/// The first hook to abort wins; later hooks are not consulted.
#[derive(Default)]
pub struct CompositeHook {
    hooks: Vec<Arc<dyn QueryHook>>,
}

impl CompositeHook {
    /// Create an empty composite hook.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a hook.
    #[allow(clippy::should_implement_trait)]
    pub fn add<H: QueryHook + 'static>(self, hook: H) -> Self {
        self.add_arc(Arc::new(hook))
    }

    /// Add an Arc-wrapped hook.
    pub fn add_arc(mut self, hook: Arc<dyn QueryHook>) -> Self {
        self.hooks.push(hook);
        self
    }
}

impl QueryHook for CompositeHook {
    fn before_query(&self, ctx: &QueryContext) -> HookAction {
        for hook in &self.hooks {
            if let action @ HookAction::Abort(_) = hook.before_query(ctx) {
                return action;
            }
        }
        HookAction::Continue
    }

    fn after_query(&self, ctx: &QueryContext, duration: Duration, outcome: &QueryOutcome) {
        for hook in &self.hooks {
            hook.after_query(ctx, duration, outcome);
        }
    }
}
