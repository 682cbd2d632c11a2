//! Derive macros for sqlsplice
//!
//! Provides `#[derive(FromRow)]`.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod from_row;

/// Derive `FromRow` trait for a struct.
///
/// Columns map onto fields by position, in declaration order, and the row must have
/// exactly as many columns as there are (non-skipped) fields.
///
/// # Example
///
/// ```ignore
/// use sqlsplice::FromRow;
///
/// #[derive(FromRow)]
/// struct User {
///     id: i64,
///     username: String,
///     email: Option<String>,
///     #[sqlsplice(skip)]
///     cached_score: Option<f64>,
/// }
///
/// #[derive(FromRow)]
/// struct Pair(i64, String);
/// ```
///
/// # Attributes
///
/// - `#[sqlsplice(skip)]` - Do not read a column for this field; fill it with `Default::default()`
#[proc_macro_derive(FromRow, attributes(sqlsplice))]
pub fn derive_from_row(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    from_row::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
