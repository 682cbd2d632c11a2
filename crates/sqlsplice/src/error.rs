//! Error types for sqlsplice

use crate::value::ValueKind;
use thiserror::Error;

/// Result type alias for sqlsplice operations
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed error produced by the underlying driver.
pub type DriverError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error types for query execution
#[derive(Debug, Error)]
pub enum Error {
    /// Failure reported by the driver (execution, connectivity, ...), forwarded as-is
    #[error("Driver error: {0}")]
    Driver(#[source] DriverError),

    /// Row decode/mapping error
    #[error("Conversion error: {0}")]
    Conversion(#[from] ConversionError),

    /// Row not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Query aborted by a hook before reaching the driver
    #[error("Query aborted: {0}")]
    Aborted(String),
}

impl Error {
    /// Wrap a driver error.
    ///
    /// A driver that already speaks [`Error`] (such as an instrumented connection)
    /// is passed through unwrapped.
    pub fn driver<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        let boxed: DriverError = Box::new(err);
        match boxed.downcast::<Error>() {
            Ok(inner) => *inner,
            Err(other) => Self::Driver(other),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Check if this error came from the driver
    pub fn is_driver(&self) -> bool {
        matches!(self, Self::Driver(_))
    }

    /// Check if this is a conversion error
    pub fn is_conversion(&self) -> bool {
        matches!(self, Self::Conversion(_))
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Borrow the original driver error as `E`, if this is a driver error of that type.
    pub fn downcast_driver<E>(&self) -> Option<&E>
    where
        E: std::error::Error + 'static,
    {
        match self {
            Self::Driver(err) => err.downcast_ref::<E>(),
            _ => None,
        }
    }

    /// The conversion error, if any.
    pub fn as_conversion(&self) -> Option<&ConversionError> {
        match self {
            Self::Conversion(err) => Some(err),
            _ => None,
        }
    }
}

/// Driver data could not be reshaped into the requested Rust type.
///
/// Column indexes are zero-based. Errors raised by [`FromValue`](crate::FromValue)
/// carry no column until the row decoder attaches one with [`ConversionError::at_column`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    /// Row has a different number of columns than the target shape
    #[error("expected {expected} columns, got {actual}")]
    ArityMismatch { expected: usize, actual: usize },

    /// NULL where the target type does not accept one
    #[error("{}unexpected NULL, expected {expected}", column_prefix(.column))]
    UnexpectedNull {
        column: Option<usize>,
        expected: &'static str,
    },

    /// Value variant does not match the target type
    #[error("{}expected {expected}, got {actual}", column_prefix(.column))]
    TypeMismatch {
        column: Option<usize>,
        expected: &'static str,
        actual: ValueKind,
    },

    /// Value has the right variant but its content is unusable (out of range, unparsable)
    #[error("{}invalid {expected}: {message}", column_prefix(.column))]
    Invalid {
        column: Option<usize>,
        expected: &'static str,
        message: String,
    },
}

fn column_prefix(column: &Option<usize>) -> String {
    match column {
        Some(i) => format!("column {i}: "),
        None => String::new(),
    }
}

impl ConversionError {
    pub fn unexpected_null(expected: &'static str) -> Self {
        Self::UnexpectedNull {
            column: None,
            expected,
        }
    }

    pub fn type_mismatch(expected: &'static str, actual: ValueKind) -> Self {
        Self::TypeMismatch {
            column: None,
            expected,
            actual,
        }
    }

    pub fn invalid(expected: &'static str, message: impl Into<String>) -> Self {
        Self::Invalid {
            column: None,
            expected,
            message: message.into(),
        }
    }

    /// Attach a column index. An index that is already set is kept.
    pub fn at_column(mut self, index: usize) -> Self {
        match &mut self {
            Self::ArityMismatch { .. } => {}
            Self::UnexpectedNull { column, .. }
            | Self::TypeMismatch { column, .. }
            | Self::Invalid { column, .. } => {
                column.get_or_insert(index);
            }
        }
        self
    }

    /// Zero-based column index the error refers to, if known.
    pub fn column(&self) -> Option<usize> {
        match self {
            Self::ArityMismatch { .. } => None,
            Self::UnexpectedNull { column, .. }
            | Self::TypeMismatch { column, .. }
            | Self::Invalid { column, .. } => *column,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_is_attached_once() {
        let err = ConversionError::type_mismatch("i64", ValueKind::Text)
            .at_column(2)
            .at_column(5);
        assert_eq!(err.column(), Some(2));
        assert_eq!(err.to_string(), "column 2: expected i64, got text");
    }

    #[test]
    fn arity_mismatch_message() {
        let err = ConversionError::ArityMismatch {
            expected: 2,
            actual: 3,
        };
        assert_eq!(err.to_string(), "expected 2 columns, got 3");
        assert_eq!(err.at_column(1).column(), None);
    }

    #[test]
    fn null_without_column() {
        let err = ConversionError::unexpected_null("String");
        assert_eq!(err.to_string(), "unexpected NULL, expected String");
    }

    #[test]
    fn driver_error_is_recoverable() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "gone");
        let err = Error::driver(io);
        assert!(err.is_driver());
        let inner = err.downcast_driver::<std::io::Error>().unwrap();
        assert_eq!(inner.kind(), std::io::ErrorKind::BrokenPipe);
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn crate_errors_are_not_rewrapped() {
        let err = Error::driver(Error::Aborted("read only".into()));
        assert!(matches!(err, Error::Aborted(ref r) if r == "read only"));

        let inner = Error::driver(std::io::Error::other("gone"));
        let err = Error::driver(inner);
        assert!(err.downcast_driver::<std::io::Error>().is_some());
    }
}
