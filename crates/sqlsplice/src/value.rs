//! The closed set of scalars a query fragment or result column can hold.

use std::fmt;

/// A typed scalar: query parameter or result column.
///
/// Equality and ordering are structural: variants compare by declaration order
/// first, then by payload.
#[derive(Debug, Clone, PartialEq, PartialOrd)]
pub enum Value {
    /// Unicode text, rendered as an `N'...'` literal.
    Text(String),
    /// Raw bytes, rendered as a `'...'` literal.
    Binary(Vec<u8>),
    Bool(bool),
    /// Rendered in plain decimal. NaN and the infinities render as
    /// `CAST((N'NaN') AS FLOAT)` and friends, never as bare words.
    Double(f64),
    /// Widened to `f64` before rendering; non-finite values as for `Double`.
    Float(f32),
    Int(i64),
    UInt8(u8),
}

/// Payload-free tag of a [`Value`], used in conversion errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ValueKind {
    Text,
    Binary,
    Bool,
    Double,
    Float,
    Int,
    UInt8,
}

impl ValueKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ValueKind::Text => "text",
            ValueKind::Binary => "binary",
            ValueKind::Bool => "bool",
            ValueKind::Double => "double",
            ValueKind::Float => "float",
            ValueKind::Int => "int",
            ValueKind::UInt8 => "uint8",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Text(_) => ValueKind::Text,
            Value::Binary(_) => ValueKind::Binary,
            Value::Bool(_) => ValueKind::Bool,
            Value::Double(_) => ValueKind::Double,
            Value::Float(_) => ValueKind::Float,
            Value::Int(_) => ValueKind::Int,
            Value::UInt8(_) => ValueKind::UInt8,
        }
    }

    /// Render as an injection-safe SQL literal expression.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.write_sql(&mut out);
        out
    }

    /// Append the rendered literal to `out`.
    pub fn write_sql(&self, out: &mut String) {
        crate::render::write_value(out, self);
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_binary(&self) -> Option<&[u8]> {
        match self {
            Value::Binary(b) => Some(b),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

macro_rules! impl_from_scalar {
    ($source:ty, $variant:ident $(as $widen:ty)?) => {
        impl From<$source> for Value {
            fn from(value: $source) -> Self {
                Value::$variant(value $(as $widen)?)
            }
        }
    };
}

impl_from_scalar!(bool, Bool);
impl_from_scalar!(f64, Double);
impl_from_scalar!(f32, Float);
impl_from_scalar!(i64, Int);
impl_from_scalar!(i32, Int as i64);
impl_from_scalar!(i16, Int as i64);
impl_from_scalar!(i8, Int as i64);
impl_from_scalar!(u32, Int as i64);
impl_from_scalar!(u16, Int as i64);
impl_from_scalar!(u8, UInt8);
impl_from_scalar!(String, Text);
impl_from_scalar!(Vec<u8>, Binary);

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_owned())
    }
}

impl From<&[u8]> for Value {
    fn from(value: &[u8]) -> Self {
        Value::Binary(value.to_vec())
    }
}
