//! Row mapping traits and utilities

use crate::error::ConversionError;
use crate::value::Value;

/// One result row as produced by the driver: positional, `None` for SQL NULL.
pub type Row = Vec<Option<Value>>;

/// Trait for reconstructing a Rust value from one (possibly NULL) column.
pub trait FromValue: Sized {
    fn from_value(value: Option<Value>) -> Result<Self, ConversionError>;
}

/// Trait for converting a database row into a Rust type.
///
/// Two shapes are built in: [`Row`] itself, which accepts anything, and tuples,
/// which require an exact column count. Structs usually derive it:
///
/// ```ignore
/// use sqlsplice::FromRow;
///
/// #[derive(FromRow)]
/// struct User {
///     id: i64,
///     username: String,
///     email: Option<String>,
/// }
/// ```
///
/// Columns map onto fields by position, in declaration order.
pub trait FromRow: Sized {
    fn from_row(row: Row) -> Result<Self, ConversionError>;
}

/// Positional column reader that tags errors with their column index.
///
/// Building block for [`FromRow`] implementations:
///
/// ```
/// use sqlsplice::{ConversionError, FromRow, Row, RowReader, Value};
///
/// struct Point { x: i64, y: i64 }
///
/// impl FromRow for Point {
///     fn from_row(row: Row) -> Result<Self, ConversionError> {
///         let mut r = RowReader::new(row, 2)?;
///         Ok(Point { x: r.next()?, y: r.next()? })
///     }
/// }
///
/// let p = Point::from_row(vec![Some(Value::Int(1)), Some(Value::Int(2))]).unwrap();
/// assert_eq!((p.x, p.y), (1, 2));
/// ```
#[derive(Debug)]
pub struct RowReader {
    columns: std::vec::IntoIter<Option<Value>>,
    index: usize,
}

impl RowReader {
    /// Fails with [`ConversionError::ArityMismatch`] unless `row` has exactly `arity` columns.
    pub fn new(row: Row, arity: usize) -> Result<Self, ConversionError> {
        if row.len() != arity {
            return Err(ConversionError::ArityMismatch {
                expected: arity,
                actual: row.len(),
            });
        }
        Ok(Self {
            columns: row.into_iter(),
            index: 0,
        })
    }

    /// Decode the next column.
    #[allow(clippy::should_implement_trait)]
    pub fn next<T: FromValue>(&mut self) -> Result<T, ConversionError> {
        let index = self.index;
        let Some(value) = self.columns.next() else {
            return Err(ConversionError::ArityMismatch {
                expected: index + 1,
                actual: index,
            });
        };
        self.index += 1;
        T::from_value(value).map_err(|e| e.at_column(index))
    }

    /// Index of the next column to be read.
    pub fn position(&self) -> usize {
        self.index
    }
}

impl FromRow for Row {
    fn from_row(row: Row) -> Result<Self, ConversionError> {
        Ok(row)
    }
}

macro_rules! impl_from_row_tuple {
    ($arity:expr; $($t:ident),+) => {
        impl<$($t: FromValue),+> FromRow for ($($t,)+) {
            fn from_row(row: Row) -> Result<Self, ConversionError> {
                let mut reader = RowReader::new(row, $arity)?;
                Ok(($(reader.next::<$t>()?,)+))
            }
        }
    };
}

impl_from_row_tuple!(1; A);
impl_from_row_tuple!(2; A, B);
impl_from_row_tuple!(3; A, B, C);
impl_from_row_tuple!(4; A, B, C, D);
impl_from_row_tuple!(5; A, B, C, D, E);
impl_from_row_tuple!(6; A, B, C, D, E, F);
impl_from_row_tuple!(7; A, B, C, D, E, F, G);
impl_from_row_tuple!(8; A, B, C, D, E, F, G, H);
impl_from_row_tuple!(9; A, B, C, D, E, F, G, H, I);
impl_from_row_tuple!(10; A, B, C, D, E, F, G, H, I, J);
impl_from_row_tuple!(11; A, B, C, D, E, F, G, H, I, J, K);
impl_from_row_tuple!(12; A, B, C, D, E, F, G, H, I, J, K, L);

fn require(value: Option<Value>, expected: &'static str) -> Result<Value, ConversionError> {
    value.ok_or_else(|| ConversionError::unexpected_null(expected))
}

impl FromValue for Value {
    fn from_value(value: Option<Value>) -> Result<Self, ConversionError> {
        require(value, "value")
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Option<Value>) -> Result<Self, ConversionError> {
        match value {
            None => Ok(None),
            some => T::from_value(some).map(Some),
        }
    }
}

impl FromValue for String {
    fn from_value(value: Option<Value>) -> Result<Self, ConversionError> {
        match require(value, "String")? {
            Value::Text(s) => Ok(s),
            other => Err(ConversionError::type_mismatch("String", other.kind())),
        }
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: Option<Value>) -> Result<Self, ConversionError> {
        match require(value, "Vec<u8>")? {
            Value::Binary(b) => Ok(b),
            other => Err(ConversionError::type_mismatch("Vec<u8>", other.kind())),
        }
    }
}

impl FromValue for bool {
    fn from_value(value: Option<Value>) -> Result<Self, ConversionError> {
        match require(value, "bool")? {
            Value::Bool(b) => Ok(b),
            other => Err(ConversionError::type_mismatch("bool", other.kind())),
        }
    }
}

impl FromValue for f64 {
    fn from_value(value: Option<Value>) -> Result<Self, ConversionError> {
        match require(value, "f64")? {
            Value::Double(f) => Ok(f),
            Value::Float(f) => Ok(f64::from(f)),
            other => Err(ConversionError::type_mismatch("f64", other.kind())),
        }
    }
}

impl FromValue for f32 {
    fn from_value(value: Option<Value>) -> Result<Self, ConversionError> {
        match require(value, "f32")? {
            Value::Float(f) => Ok(f),
            other => Err(ConversionError::type_mismatch("f32", other.kind())),
        }
    }
}

// Integer targets accept both integer variants and range-check the payload.
macro_rules! impl_from_value_int {
    ($($target:ty),* $(,)?) => {
        $(
            impl FromValue for $target {
                fn from_value(value: Option<Value>) -> Result<Self, ConversionError> {
                    const NAME: &str = stringify!($target);
                    let wide = match require(value, NAME)? {
                        Value::Int(i) => i,
                        Value::UInt8(u) => i64::from(u),
                        other => return Err(ConversionError::type_mismatch(NAME, other.kind())),
                    };
                    <$target>::try_from(wide).map_err(|_| {
                        ConversionError::invalid(NAME, format!("{wide} is out of range"))
                    })
                }
            }
        )*
    };
}

impl_from_value_int!(i64, i32, i16, i8, u32, u16, u8);

fn require_text(value: Option<Value>, expected: &'static str) -> Result<String, ConversionError> {
    match require(value, expected)? {
        Value::Text(s) => Ok(s),
        other => Err(ConversionError::type_mismatch(expected, other.kind())),
    }
}

impl FromValue for chrono::NaiveDate {
    fn from_value(value: Option<Value>) -> Result<Self, ConversionError> {
        let text = require_text(value, "NaiveDate")?;
        chrono::NaiveDate::parse_from_str(&text, "%Y-%m-%d")
            .map_err(|e| ConversionError::invalid("NaiveDate", format!("{text:?}: {e}")))
    }
}

impl FromValue for chrono::NaiveTime {
    fn from_value(value: Option<Value>) -> Result<Self, ConversionError> {
        let text = require_text(value, "NaiveTime")?;
        chrono::NaiveTime::parse_from_str(&text, "%H:%M:%S%.f")
            .map_err(|e| ConversionError::invalid("NaiveTime", format!("{text:?}: {e}")))
    }
}

impl FromValue for chrono::NaiveDateTime {
    fn from_value(value: Option<Value>) -> Result<Self, ConversionError> {
        let text = require_text(value, "NaiveDateTime")?;
        chrono::NaiveDateTime::parse_from_str(&text, "%Y-%m-%d %H:%M:%S%.f")
            .or_else(|_| chrono::NaiveDateTime::parse_from_str(&text, "%Y-%m-%dT%H:%M:%S%.f"))
            .map_err(|e| ConversionError::invalid("NaiveDateTime", format!("{text:?}: {e}")))
    }
}

impl FromValue for chrono::DateTime<chrono::Utc> {
    fn from_value(value: Option<Value>) -> Result<Self, ConversionError> {
        let text = require_text(value, "DateTime<Utc>")?;
        chrono::DateTime::parse_from_rfc3339(&text)
            .map(|dt| dt.with_timezone(&chrono::Utc))
            .map_err(|e| ConversionError::invalid("DateTime<Utc>", format!("{text:?}: {e}")))
    }
}

impl FromValue for uuid::Uuid {
    fn from_value(value: Option<Value>) -> Result<Self, ConversionError> {
        match require(value, "Uuid")? {
            Value::Text(s) => uuid::Uuid::parse_str(&s)
                .map_err(|e| ConversionError::invalid("Uuid", format!("{s:?}: {e}"))),
            Value::Binary(b) => uuid::Uuid::from_slice(&b)
                .map_err(|e| ConversionError::invalid("Uuid", e.to_string())),
            other => Err(ConversionError::type_mismatch("Uuid", other.kind())),
        }
    }
}

impl FromValue for serde_json::Value {
    fn from_value(value: Option<Value>) -> Result<Self, ConversionError> {
        let text = require_text(value, "json")?;
        serde_json::from_str(&text).map_err(|e| ConversionError::invalid("json", e.to_string()))
    }
}

#[cfg(feature = "rust_decimal")]
impl FromValue for rust_decimal::Decimal {
    fn from_value(value: Option<Value>) -> Result<Self, ConversionError> {
        use std::str::FromStr;

        match require(value, "Decimal")? {
            Value::Text(s) => rust_decimal::Decimal::from_str(&s)
                .map_err(|e| ConversionError::invalid("Decimal", format!("{s:?}: {e}"))),
            Value::Int(i) => Ok(rust_decimal::Decimal::from(i)),
            Value::UInt8(u) => Ok(rust_decimal::Decimal::from(u)),
            other => Err(ConversionError::type_mismatch("Decimal", other.kind())),
        }
    }
}

#[cfg(feature = "time")]
pub(crate) mod time_formats {
    use time::format_description::BorrowedFormatItem;
    use time::macros::format_description;

    pub(crate) const DATE: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");
    pub(crate) const DATE_TIME: &[BorrowedFormatItem<'static>] = format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second][optional [.[subsecond]]]"
    );
    /// Unlike RFC 3339 this covers negative years and offsets with seconds.
    pub(crate) const OFFSET_DATE_TIME: &[BorrowedFormatItem<'static>] = format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond] [offset_hour sign:mandatory]:[offset_minute]:[offset_second]"
    );
}

#[cfg(feature = "time")]
mod time_support {
    use super::*;

    impl FromValue for time::Date {
        fn from_value(value: Option<Value>) -> Result<Self, ConversionError> {
            let text = require_text(value, "Date")?;
            time::Date::parse(&text, time_formats::DATE)
                .map_err(|e| ConversionError::invalid("Date", format!("{text:?}: {e}")))
        }
    }

    impl FromValue for time::PrimitiveDateTime {
        fn from_value(value: Option<Value>) -> Result<Self, ConversionError> {
            let text = require_text(value, "PrimitiveDateTime")?;
            time::PrimitiveDateTime::parse(&text, time_formats::DATE_TIME).map_err(|e| {
                ConversionError::invalid("PrimitiveDateTime", format!("{text:?}: {e}"))
            })
        }
    }

    impl FromValue for time::OffsetDateTime {
        fn from_value(value: Option<Value>) -> Result<Self, ConversionError> {
            let text = require_text(value, "OffsetDateTime")?;
            time::OffsetDateTime::parse(&text, time_formats::OFFSET_DATE_TIME)
                .or_else(|_| {
                    time::OffsetDateTime::parse(
                        &text,
                        &time::format_description::well_known::Rfc3339,
                    )
                })
                .map_err(|e| ConversionError::invalid("OffsetDateTime", format!("{text:?}: {e}")))
        }
    }
}
