use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// The type of SQL operation being performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryType {
    /// SELECT query
    Select,
    /// INSERT statement
    Insert,
    /// UPDATE statement
    Update,
    /// DELETE statement
    Delete,
    /// Other SQL (e.g., DDL, custom)
    Other,
}

impl QueryType {
    /// Detect query type from the rendered SQL.
    ///
    /// Leading whitespace, `--` line comments and `/* */` block comments are skipped.
    /// For CTEs (`WITH ...`), looks past the CTE definitions to the final statement.
    pub fn from_sql(sql: &str) -> Self {
        let trimmed = strip_sql_prefix(sql);
        if starts_with_keyword(trimmed, "SELECT") {
            QueryType::Select
        } else if starts_with_keyword(trimmed, "INSERT") {
            QueryType::Insert
        } else if starts_with_keyword(trimmed, "UPDATE") {
            QueryType::Update
        } else if starts_with_keyword(trimmed, "DELETE") {
            QueryType::Delete
        } else if starts_with_keyword(trimmed, "WITH") {
            Self::detect_cte_dml(trimmed)
        } else {
            QueryType::Other
        }
    }

    // The final statement follows the last closing paren at depth zero.
    fn detect_cte_dml(sql: &str) -> Self {
        let mut depth: i32 = 0;
        let mut last_top_level = 0;
        let mut in_literal = false;
        for (i, b) in sql.bytes().enumerate() {
            if in_literal {
                // A doubled quote toggles out and straight back in.
                in_literal = b != b'\'';
                continue;
            }
            match b {
                b'\'' => in_literal = true,
                b'(' => depth += 1,
                b')' => {
                    depth -= 1;
                    if depth == 0 {
                        last_top_level = i + 1;
                    }
                }
                _ => {}
            }
        }

        let remainder = sql[last_top_level..].trim_start();
        if starts_with_keyword(remainder, "INSERT") {
            QueryType::Insert
        } else if starts_with_keyword(remainder, "UPDATE") {
            QueryType::Update
        } else if starts_with_keyword(remainder, "DELETE") {
            QueryType::Delete
        } else {
            QueryType::Select
        }
    }
}

fn strip_sql_prefix(mut sql: &str) -> &str {
    loop {
        sql = sql.trim_start();
        if let Some(rest) = sql.strip_prefix("--") {
            sql = rest.find('\n').map_or("", |i| &rest[i + 1..]);
        } else if let Some(rest) = sql.strip_prefix("/*") {
            sql = rest.find("*/").map_or("", |i| &rest[i + 2..]);
        } else {
            return sql;
        }
    }
}

fn starts_with_keyword(sql: &str, keyword: &str) -> bool {
    let Some(head) = sql.get(..keyword.len()) else {
        return false;
    };
    head.eq_ignore_ascii_case(keyword)
        && sql[keyword.len()..]
            .chars()
            .next()
            .is_none_or(|c| !(c.is_ascii_alphanumeric() || c == '_'))
}

/// Which facade entry point issued the statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// `raw_exec`: result discarded.
    Exec,
    /// `raw_query`: all rows buffered.
    Query,
    /// `raw_stream`: rows pulled through a cursor.
    Stream,
}

/// Context information about the statement being executed.
#[derive(Debug, Clone)]
pub struct QueryContext {
    /// Rendered SQL handed to the driver.
    pub sql: String,
    /// Detected query type.
    pub query_type: QueryType,
    pub operation: Operation,
    /// Optional query name/tag for identification.
    pub tag: Option<String>,
    /// Optional structured fields for observability (low-cardinality).
    pub fields: BTreeMap<String, String>,
}

impl QueryContext {
    /// Create a new query context.
    pub fn new(sql: &str, operation: Operation) -> Self {
        Self {
            sql: sql.to_string(),
            query_type: QueryType::from_sql(sql),
            operation,
            tag: None,
            fields: BTreeMap::new(),
        }
    }

    /// Add a tag to identify this query.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Add a structured field (low-cardinality).
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }
}

/// Maximum length for error messages in `QueryOutcome::Error`.
const MAX_ERROR_LEN: usize = 512;

/// Outcome of a statement for monitoring purposes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    /// Statement ran; its result was discarded.
    Executed,
    /// Rows delivered to the caller (for streams: rows fetched before the cursor closed).
    Rows(usize),
    /// Statement failed (message truncated to 512 bytes).
    Error(String),
}

impl QueryOutcome {
    /// Create an error outcome, truncating the message to avoid monitoring data explosion.
    pub fn error(msg: impl Into<String>) -> Self {
        let msg = msg.into();
        if msg.len() <= MAX_ERROR_LEN {
            return Self::Error(msg);
        }
        Self::Error(format!("{}...", super::truncate_sql_bytes(&msg, MAX_ERROR_LEN)))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

impl fmt::Display for QueryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryOutcome::Executed => f.write_str("executed"),
            QueryOutcome::Rows(n) => write!(f, "{n} rows"),
            QueryOutcome::Error(e) => write!(f, "error: {e}"),
        }
    }
}

/// Trait for monitoring SQL execution.
///
/// Implement this trait to collect metrics, log queries, or integrate
/// with observability systems.
pub trait QueryMonitor: Send + Sync {
    /// Called before a statement reaches the driver.
    fn on_query_start(&self, _ctx: &QueryContext) {}

    /// Called after a statement completes (success or failure).
    fn on_query_complete(&self, ctx: &QueryContext, duration: Duration, outcome: &QueryOutcome);

    /// Called when a statement exceeds the configured slow query threshold.
    fn on_slow_query(&self, _ctx: &QueryContext, _duration: Duration) {}
}

/// Action to take after a hook inspects a statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookAction {
    /// Let the statement through.
    Continue,
    /// Refuse the statement; it never reaches the driver.
    Abort(String),
}

/// Trait for hooking into the execution lifecycle.
pub trait QueryHook: Send + Sync {
    /// Called before a statement is handed to the driver.
    fn before_query(&self, ctx: &QueryContext) -> HookAction {
        let _ = ctx;
        HookAction::Continue
    }

    /// Called after a statement completes, before monitors see it.
    fn after_query(&self, _ctx: &QueryContext, _duration: Duration, _outcome: &QueryOutcome) {}
}
