//! Query builder.
//!
//! A [`Query`] is an ordered list of [`Part`]s: trusted SQL written by the developer
//! ([`Part::Literal`]) and typed data ([`Part::Value`]). Values stay typed until
//! [`Query::to_sql`] renders them, so a value can never be mistaken for SQL text.
//!
//! # Example
//!
//! ```
//! use sqlsplice::{param, sql};
//!
//! let q = sql("SELECT * FROM t WHERE id = ") + param(123) + " AND name = " + param("O'Brien");
//! assert_eq!(
//!     q.to_sql(),
//!     "SELECT * FROM t WHERE id = 123 AND name = (N'O'+NCHAR(39)+'Brien')"
//! );
//! ```
//!
//! Queries form a monoid: [`Query::empty`] is the identity and `+` (or
//! [`Query::append`]) is associative. Combinators consume `self` and return a new
//! query; nothing mutates a query that has already been handed out.

use crate::to_query::ToQuery;
use crate::value::Value;
use std::fmt;
use std::iter::Sum;
use std::ops::Add;


/// One fragment of a query.
#[derive(Debug, Clone, PartialEq)]
pub enum Part {
    /// SQL text, emitted verbatim.
    Literal(String),
    /// Typed data, emitted through the value renderer.
    Value(Value),
}

impl Part {
    fn write_sql(&self, out: &mut String) {
        match self {
            Part::Literal(s) => out.push_str(s),
            Part::Value(v) => v.write_sql(out),
        }
    }
}

/// An ordered composition of literal SQL and typed values.
#[must_use]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    parts: Vec<Part>,
}

/// Start a query from literal SQL text.
pub fn sql(text: impl Into<String>) -> Query {
    Query::literal(text)
}

/// A single-fragment query built from `value` by outbound conversion.
pub fn param<T: ToQuery>(value: T) -> Query {
    value.to_query()
}

impl Query {
    /// The identity query: renders to the empty string.
    pub fn empty() -> Self {
        Self { parts: Vec::new() }
    }

    /// A query holding one literal fragment.
    pub fn literal(text: impl Into<String>) -> Self {
        Self::empty().push_part(Part::Literal(text.into()))
    }

    /// A query holding one value fragment.
    pub fn value(value: impl Into<Value>) -> Self {
        Self {
            parts: vec![Part::Value(value.into())],
        }
    }

    /// Concatenate two queries.
    pub fn append(mut self, other: Query) -> Self {
        self.parts.reserve(other.parts.len());
        for part in other.parts {
            self = self.push_part(part);
        }
        self
    }

    /// Append literal SQL text.
    pub fn push(self, text: &str) -> Self {
        self.push_part(Part::Literal(text.to_string()))
    }

    /// Append `value` through its outbound conversion.
    pub fn bind<T: ToQuery>(self, value: T) -> Self {
        self.append(value.to_query())
    }

    /// Append a comma-separated list of values.
    ///
    /// An empty list appends `NULL`, so `IN (NULL)` stays valid SQL (and matches nothing).
    pub fn bind_list<T, I>(self, values: I) -> Self
    where
        T: ToQuery,
        I: IntoIterator<Item = T>,
    {
        let mut iter = values.into_iter();
        let Some(first) = iter.next() else {
            return self.push("NULL");
        };

        let mut q = self.bind(first);
        for v in iter {
            q = q.push(", ").bind(v);
        }
        q
    }

    /// Concatenate `queries` with the literal `separator` between each pair.
    pub fn join<I>(separator: &str, queries: I) -> Self
    where
        I: IntoIterator<Item = Query>,
    {
        let mut out = Query::empty();
        for (i, q) in queries.into_iter().enumerate() {
            if i > 0 {
                out = out.push(separator);
            }
            out = out.append(q);
        }
        out
    }

    // Adjacent literals are merged and empty literals dropped, so the fragment list
    // is canonical: `empty` is a structural identity and `append` is associative.
    fn push_part(mut self, part: Part) -> Self {
        match part {
            Part::Literal(text) if text.is_empty() => {}
            Part::Literal(text) => match self.parts.last_mut() {
                Some(Part::Literal(last)) => last.push_str(&text),
                _ => self.parts.push(Part::Literal(text)),
            },
            value => self.parts.push(value),
        }
        self
    }

    /// Render to the final SQL command text.
    pub fn to_sql(&self) -> String {
        let mut out = String::with_capacity(self.size_hint());
        for part in &self.parts {
            part.write_sql(&mut out);
        }
        out
    }

    // Literal bytes plus a rough guess for values; only used to pre-size the buffer.
    fn size_hint(&self) -> usize {
        self.parts
            .iter()
            .map(|p| match p {
                Part::Literal(s) => s.len(),
                Part::Value(Value::Text(s)) => s.len() + 5,
                Part::Value(Value::Binary(b)) => b.len() + 4,
                Part::Value(_) => 20,
            })
            .sum()
    }

    /// The fragments, in textual order.
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Number of value fragments.
    pub fn value_count(&self) -> usize {
        self.parts
            .iter()
            .filter(|p| matches!(p, Part::Value(_)))
            .count()
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql())
    }
}

impl From<&str> for Query {
    fn from(value: &str) -> Self {
        Query::literal(value)
    }
}

impl From<String> for Query {
    fn from(value: String) -> Self {
        Query::literal(value)
    }
}

impl From<Value> for Query {
    fn from(value: Value) -> Self {
        Query::value(value)
    }
}

impl From<Part> for Query {
    fn from(value: Part) -> Self {
        Query::empty().push_part(value)
    }
}

impl<Q: Into<Query>> Add<Q> for Query {
    type Output = Query;

    fn add(self, rhs: Q) -> Self::Output {
        self.append(rhs.into())
    }
}

impl Sum for Query {
    fn sum<I: Iterator<Item = Query>>(iter: I) -> Self {
        iter.fold(Query::empty(), Query::append)
    }
}

impl FromIterator<Query> for Query {
    fn from_iter<I: IntoIterator<Item = Query>>(iter: I) -> Self {
        iter.into_iter().sum()
    }
}

impl Extend<Query> for Query {
    fn extend<I: IntoIterator<Item = Query>>(&mut self, iter: I) {
        let this = std::mem::take(self);
        *self = iter.into_iter().fold(this, Query::append);
    }
}
