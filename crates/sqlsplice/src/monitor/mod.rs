//! Statement monitoring and hooks.
//!
//! This module provides traits and utilities for:
//! - Timing every statement that reaches the driver
//! - Hooking into the execution lifecycle (inspect or abort before execution)
//! - Logging through `tracing` and collecting counters
//!
//! # Example
//!
//! ```rust,ignore
//! use sqlsplice::monitor::{InstrumentedConnection, MonitorConfig, StatsMonitor, TracingSqlHook};
//! use std::time::Duration;
//!
//! let config = MonitorConfig::new()
//!     .with_slow_query_threshold(Duration::from_secs(5))
//!     .enable_monitoring();
//!
//! let mut conn = InstrumentedConnection::new(driver_conn)
//!     .with_config(config)
//!     .with_monitor(StatsMonitor::new())
//!     .add_hook(TracingSqlHook::new());
//!
//! let ids: Vec<(i64,)> = sql("SELECT id FROM users").fetch_all(&mut conn)?;
//! ```

mod config;
mod instrumented;
mod monitors;
mod stream;
mod tracing_hook;
mod types;


pub use config::MonitorConfig;
pub use instrumented::InstrumentedConnection;
pub use monitors::{
    CompositeHook, CompositeMonitor, NoopMonitor, QueryStats, StatsMonitor, TracingMonitor,
};
pub use stream::InstrumentedCursor;
pub use tracing_hook::TracingSqlHook;
pub use types::{HookAction, Operation, QueryContext, QueryHook, QueryMonitor, QueryOutcome, QueryType};

pub(crate) fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}
