//! Value rendering.
//!
//! Turns a [`Value`] into SQL literal text. Text and binary payloads are escaped
//! with an allowlist: ASCII alphanumerics, space, `,`, `.`, `-` and `_` pass through,
//! every other character closes the literal, emits its code through `NCHAR(n)` (text)
//! or `CHAR(n)` (binary) and reopens the literal:
//!
//! ```
//! use sqlsplice::Value;
//!
//! assert_eq!(Value::from("a;b").render(), "(N'a'+NCHAR(59)+'b')");
//! assert_eq!(Value::from(vec![b'x', 0]).render(), "('x'+CHAR(0)+'')");
//! ```
//!
//! Rendering is total and deterministic.

use crate::value::Value;
use std::fmt::Write;


/// Whether `c` is emitted verbatim inside a text or binary literal.
#[inline]
pub fn is_safe_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, ' ' | ',' | '.' | '-' | '_')
}

/// Append the rendered literal for `value` to `out`.
pub fn write_value(out: &mut String, value: &Value) {
    match value {
        Value::Text(s) => write_text(out, s),
        Value::Binary(b) => write_binary(out, b),
        Value::Bool(b) => out.push(if *b { '1' } else { '0' }),
        Value::Double(f) => write_float(out, *f),
        Value::Float(f) => write_float(out, f64::from(*f)),
        Value::Int(i) => {
            let _ = write!(out, "{i}");
        }
        Value::UInt8(u) => {
            let _ = write!(out, "{u}");
        }
    }
}

/// `(N'...')` with every unsafe char spliced as `'+NCHAR(code)+'`.
pub fn write_text(out: &mut String, value: &str) {
    out.reserve(value.len() + 5);
    out.push_str("(N'");
    let mut pos = 0;
    for (i, c) in value.char_indices() {
        if !is_safe_char(c) {
            out.push_str(&value[pos..i]);
            let _ = write!(out, "'+NCHAR({})+'", u32::from(c));
            pos = i + c.len_utf8();
        }
    }
    out.push_str(&value[pos..]);
    out.push_str("')");
}

/// `('...')` with every unsafe byte spliced as `'+CHAR(byte)+'`.
pub fn write_binary(out: &mut String, value: &[u8]) {
    out.reserve(value.len() + 4);
    out.push_str("('");
    for &b in value {
        if is_safe_char(char::from(b)) {
            out.push(char::from(b));
        } else {
            let _ = write!(out, "'+CHAR({b})+'");
        }
    }
    out.push_str("')");
}

/// Finite values use plain `Display`. NaN and the infinities have no SQL literal
/// form, so their names go through the text path inside a `CAST`, which the
/// server rejects rather than reading them as identifiers.
fn write_float(out: &mut String, value: f64) {
    if value.is_finite() {
        let _ = write!(out, "{value}");
    } else {
        out.push_str("CAST(");
        write_text(out, &value.to_string());
        out.push_str(" AS FLOAT)");
    }
}
