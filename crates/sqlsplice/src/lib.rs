//! # sqlsplice
//!
//! Safe SQL construction for drivers that only accept plain command text.
//!
//! ## Features
//!
//! - **SQL explicit**: queries are written as SQL and composed with `+`
//! - **Values stay typed**: literal SQL and data never mix until rendering, and every
//!   text or binary value is escaped with a strict allowlist
//! - **Type-safe mapping**: Row → tuple or struct via the `FromRow` trait
//! - **Three execution modes**: fire-and-forget, buffered, and a streaming fold the
//!   caller can stop at any row
//! - **Query monitoring**: timing, `tracing` output and hooks around any driver
//!
//! ## Building queries
//!
//! ```
//! use sqlsplice::{param, sql, Query};
//!
//! let ids = [3, 5, 8];
//! let q = sql("SELECT id, name FROM users WHERE id IN (")
//!     .bind_list(ids)
//!     .push(") AND name <> ")
//!     .bind("O'Brien");
//!
//! assert_eq!(
//!     q.to_sql(),
//!     "SELECT id, name FROM users WHERE id IN (3, 5, 8) AND name <> (N'O'+NCHAR(39)+'Brien')"
//! );
//!
//! let filters = vec![sql("a = ") + param(1), sql("b = ") + param(true)];
//! assert_eq!(Query::join(" AND ", filters).to_sql(), "a = 1 AND b = 1");
//! ```
//!
//! ## Running them
//!
//! Any type implementing [`Connection`] can run a [`Query`]:
//!
//! ```ignore
//! use sqlsplice::{sql, FromRow, Step};
//!
//! #[derive(FromRow)]
//! struct User {
//!     id: i64,
//!     name: String,
//! }
//!
//! let users: Vec<User> = sql("SELECT id, name FROM users").fetch_all(&mut conn)?;
//!
//! // Stop as soon as ten active users have been seen; no further rows are fetched.
//! let active = sql("SELECT id, name FROM users").fold(&mut conn, Vec::new(), |mut acc, u: User| {
//!     acc.push(u);
//!     if acc.len() == 10 { Step::Stop(acc) } else { Step::Continue(acc) }
//! })?;
//! ```

pub mod driver;
pub mod error;
pub mod exec;
pub mod monitor;
pub mod query;
pub mod render;
pub mod row;
pub mod to_query;
pub mod value;

pub use driver::{Connection, RowCursor};
pub use error::{ConversionError, DriverError, Error, Result};
pub use exec::{
    Step, buffered_query, exec, streaming_fold, try_streaming_fold, with_connection,
};
pub use monitor::{
    CompositeHook, CompositeMonitor, HookAction, InstrumentedConnection, MonitorConfig,
    NoopMonitor, QueryContext, QueryHook, QueryMonitor, QueryOutcome, QueryStats, QueryType,
    StatsMonitor, TracingMonitor, TracingSqlHook,
};
pub use query::{Part, Query, param, sql};
pub use row::{FromRow, FromValue, Row, RowReader};
pub use to_query::ToQuery;
pub use value::{Value, ValueKind};

#[cfg(feature = "derive")]
pub use sqlsplice_derive::FromRow;
