//! Outbound conversion: Rust values into query fragments.

use crate::query::Query;
use crate::value::Value;

/// Types that can be spliced into a [`Query`].
///
/// Implement this for your own types to make them usable with [`param`](crate::param)
/// and [`Query::bind`]. Most types map onto a single [`Value`]:
///
/// ```
/// use sqlsplice::{Query, ToQuery, Value, sql};
///
/// struct Sku(u32);
///
/// impl ToQuery for Sku {
///     fn to_query(&self) -> Query {
///         Query::value(Value::Text(format!("SKU-{:06}", self.0)))
///     }
/// }
///
/// let q = sql("SELECT 1 WHERE sku = ").bind(Sku(42));
/// assert_eq!(q.to_sql(), "SELECT 1 WHERE sku = (N'SKU-000042')");
/// ```
pub trait ToQuery {
    fn to_query(&self) -> Query;
}

/// Splices the query as-is. Its literal parts are trusted SQL and pass through
/// unescaped, so `bind(sql(..))` is composition, not data binding.
impl ToQuery for Query {
    fn to_query(&self) -> Query {
        self.clone()
    }
}

impl ToQuery for Value {
    fn to_query(&self) -> Query {
        Query::value(self.clone())
    }
}

impl<T: ToQuery + ?Sized> ToQuery for &T {
    fn to_query(&self) -> Query {
        (**self).to_query()
    }
}

impl<T: ToQuery + ?Sized> ToQuery for Box<T> {
    fn to_query(&self) -> Query {
        (**self).to_query()
    }
}

/// `None` renders as the literal `NULL`.
impl<T: ToQuery> ToQuery for Option<T> {
    fn to_query(&self) -> Query {
        match self {
            Some(v) => v.to_query(),
            None => Query::literal("NULL"),
        }
    }
}

macro_rules! impl_to_query {
    ($($source:ty),* $(,)?) => {
        $(
            impl ToQuery for $source {
                fn to_query(&self) -> Query {
                    Query::value(Value::from(*self))
                }
            }
        )*
    };
}

impl_to_query!(bool, f64, f32, i64, i32, i16, i8, u32, u16, u8);

impl ToQuery for str {
    fn to_query(&self) -> Query {
        Query::value(Value::Text(self.to_owned()))
    }
}

impl ToQuery for String {
    fn to_query(&self) -> Query {
        Query::value(Value::Text(self.clone()))
    }
}

impl ToQuery for [u8] {
    fn to_query(&self) -> Query {
        Query::value(Value::Binary(self.to_vec()))
    }
}

impl ToQuery for Vec<u8> {
    fn to_query(&self) -> Query {
        Query::value(Value::Binary(self.clone()))
    }
}

// Date/time, uuid and json values travel as formatted text.

impl ToQuery for chrono::NaiveDate {
    fn to_query(&self) -> Query {
        Query::value(Value::Text(self.format("%Y-%m-%d").to_string()))
    }
}

impl ToQuery for chrono::NaiveTime {
    fn to_query(&self) -> Query {
        Query::value(Value::Text(self.format("%H:%M:%S%.f").to_string()))
    }
}

impl ToQuery for chrono::NaiveDateTime {
    fn to_query(&self) -> Query {
        Query::value(Value::Text(self.format("%Y-%m-%d %H:%M:%S%.f").to_string()))
    }
}

impl ToQuery for chrono::DateTime<chrono::Utc> {
    fn to_query(&self) -> Query {
        Query::value(Value::Text(self.to_rfc3339()))
    }
}

impl ToQuery for uuid::Uuid {
    fn to_query(&self) -> Query {
        Query::value(Value::Text(self.hyphenated().to_string()))
    }
}

impl ToQuery for serde_json::Value {
    fn to_query(&self) -> Query {
        Query::value(Value::Text(self.to_string()))
    }
}

#[cfg(feature = "rust_decimal")]
impl ToQuery for rust_decimal::Decimal {
    fn to_query(&self) -> Query {
        Query::value(Value::Text(self.to_string()))
    }
}

#[cfg(feature = "time")]
mod time_support {
    use super::*;
    use crate::row::time_formats;

    // The descriptions cover every component of their types. Should formatting
    // still fail, the value goes out in its display form, never as empty text.
    fn formatted(
        result: Result<String, time::error::Format>,
        display: impl FnOnce() -> String,
    ) -> Query {
        let text = result.unwrap_or_else(|err| {
            tracing::warn!(
                target: "sqlsplice::to_query",
                error = %err,
                "time value formatting failed, using display form"
            );
            display()
        });
        Query::value(Value::Text(text))
    }

    impl ToQuery for time::Date {
        fn to_query(&self) -> Query {
            formatted(self.format(time_formats::DATE), || self.to_string())
        }
    }

    impl ToQuery for time::PrimitiveDateTime {
        fn to_query(&self) -> Query {
            formatted(self.format(time_formats::DATE_TIME), || self.to_string())
        }
    }

    impl ToQuery for time::OffsetDateTime {
        fn to_query(&self) -> Query {
            formatted(self.format(time_formats::OFFSET_DATE_TIME), || {
                self.to_string()
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::Part;

    fn single_value(q: Query) -> Value {
        match q.parts() {
            [Part::Value(v)] => v.clone(),
            other => panic!("expected one value part, got {other:?}"),
        }
    }

    #[test]
    fn scalars_produce_one_value_part() {
        assert_eq!(single_value(true.to_query()), Value::Bool(true));
        assert_eq!(single_value(1.5_f64.to_query()), Value::Double(1.5));
        assert_eq!(single_value(1.5_f32.to_query()), Value::Float(1.5));
        assert_eq!(single_value((-3_i32).to_query()), Value::Int(-3));
        assert_eq!(single_value(7_u8.to_query()), Value::UInt8(7));
        assert_eq!(single_value("x".to_query()), Value::Text("x".into()));
        assert_eq!(
            single_value(vec![1_u8, 2].to_query()),
            Value::Binary(vec![1, 2])
        );
    }

    #[test]
    fn option_none_is_null_literal() {
        let q = None::<i64>.to_query();
        assert_eq!(q.parts(), &[Part::Literal("NULL".into())]);
        assert_eq!(Some(5_i64).to_query().to_sql(), "5");
    }

    #[test]
    fn chrono_and_uuid_are_text() {
        let d = chrono::NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(single_value(d.to_query()), Value::Text("2024-02-29".into()));

        let dt = d.and_hms_opt(13, 5, 9).unwrap();
        assert_eq!(
            single_value(dt.to_query()),
            Value::Text("2024-02-29 13:05:09".into())
        );

        let id = uuid::Uuid::nil();
        assert_eq!(
            id.to_query().to_sql(),
            "(N'00000000-0000-0000-0000-000000000000')"
        );
    }

    #[test]
    fn bound_query_keeps_its_literal_parts() {
        let inner = crate::query::sql("a = ").bind("x'y");
        let q = crate::query::sql("WHERE ").bind(inner);
        assert_eq!(q.to_sql(), "WHERE a = (N'x'+NCHAR(39)+'y')");
        assert_eq!(q.value_count(), 1);
    }

    #[test]
    fn json_is_compact_text() {
        let v = serde_json::json!({"a": 1});
        assert_eq!(single_value(v.to_query()), Value::Text(r#"{"a":1}"#.into()));
    }
}
