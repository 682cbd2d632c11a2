//! Basic usage example for sqlsplice
//!
//! Run with: cargo run --example basic -p sqlsplice
//!
//! Uses a tiny in-memory driver so it runs without a database server.
//! Set `RUST_LOG=sqlsplice=debug` to see the statements as they are executed.

use sqlsplice::{
    Connection, FromRow, InstrumentedConnection, MonitorConfig, Row, RowCursor, StatsMonitor,
    Step, TracingMonitor, TracingSqlHook, Value, param, sql,
};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Debug, FromRow)]
#[allow(dead_code)]
struct User {
    id: i64,
    username: String,
    email: Option<String>,
}

/// Pretends every SELECT returns the same three users.
#[derive(Default)]
struct MemoryConnection {
    users: Vec<Row>,
}

#[derive(Debug, thiserror::Error)]
#[error("memory driver: {0}")]
struct MemoryError(String);

struct MemoryCursor<'c> {
    rows: std::slice::Iter<'c, Row>,
}

impl RowCursor for MemoryCursor<'_> {
    type Error = MemoryError;

    fn fetch(&mut self) -> Result<Option<Row>, MemoryError> {
        Ok(self.rows.next().cloned())
    }
}

impl Connection for MemoryConnection {
    type Descriptor = str;
    type Error = MemoryError;
    type Cursor<'c> = MemoryCursor<'c>;

    fn connect(_: &str) -> Result<Self, MemoryError> {
        let user = |id: i64, name: &str, email: Option<&str>| {
            vec![
                Some(Value::Int(id)),
                Some(Value::from(name)),
                email.map(Value::from),
            ]
        };
        Ok(Self {
            users: vec![
                user(1, "ada", Some("ada@example.com")),
                user(2, "grace", None),
                user(3, "o'brien", Some("ob@example.com")),
            ],
        })
    }

    fn close(self) -> Result<(), MemoryError> {
        Ok(())
    }

    fn raw_exec(&mut self, sql: &str) -> Result<(), MemoryError> {
        println!("exec:   {sql}");
        Ok(())
    }

    fn raw_query(&mut self, sql: &str) -> Result<Vec<Row>, MemoryError> {
        println!("query:  {sql}");
        Ok(self.users.clone())
    }

    fn raw_stream(&mut self, sql: &str) -> Result<MemoryCursor<'_>, MemoryError> {
        println!("stream: {sql}");
        Ok(MemoryCursor {
            rows: self.users.iter(),
        })
    }
}

fn main() -> Result<(), sqlsplice::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let stats = Arc::new(StatsMonitor::new());
    let driver = MemoryConnection::connect("memory:").map_err(sqlsplice::Error::driver)?;
    let mut conn = InstrumentedConnection::new(driver)
        .with_config(
            MonitorConfig::new()
                .with_slow_query_threshold(Duration::from_millis(50))
                .enable_monitoring(),
        )
        .with_monitor_arc(Arc::new(
            sqlsplice::CompositeMonitor::new()
                .add(TracingMonitor::new())
                .add_arc(stats.clone()),
        ))
        .add_hook(TracingSqlHook::new());

    // Hostile input stays data.
    let name = "o'brien'; DROP TABLE users; --";
    sql("UPDATE users SET last_seen = CURRENT_TIMESTAMP WHERE username = ")
        .bind(name)
        .execute(&mut conn)?;

    let users: Vec<User> = sql("SELECT id, username, email FROM users WHERE id IN (")
        .bind_list([1, 2, 3])
        .push(")")
        .fetch_all(&mut conn)?;
    for user in &users {
        println!("  {user:?}");
    }

    // Stop after the first user without an email; later rows are never fetched.
    let missing = sql("SELECT id, username, email FROM users ORDER BY id").fold(
        &mut conn,
        None,
        |_, user: User| match user.email {
            None => Step::Stop(Some(user.username)),
            Some(_) => Step::Continue(None),
        },
    )?;
    println!("first user without email: {missing:?}");

    let first: Option<(i64, String, Option<String>)> =
        (sql("SELECT id, username, email FROM users WHERE id > ") + param(0))
            .fetch_optional(&mut conn)?;
    println!("first row: {first:?}");

    println!("{:#?}", stats.stats());
    conn.close()
}
