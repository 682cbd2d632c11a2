#![allow(dead_code)]

mod support;

use sqlsplice::{ConversionError, FromRow, Row, Value, ValueKind, sql};
use support::MockConnection;

#[derive(Debug, PartialEq, FromRow)]
struct User {
    id: i64,
    username: String,
    email: Option<String>,
    created_at: chrono::NaiveDateTime,
}

#[derive(Debug, PartialEq, FromRow)]
struct Pair(i32, Vec<u8>);

#[derive(Debug, PartialEq, FromRow)]
struct WithSkipped {
    id: uuid::Uuid,
    #[sqlsplice(skip)]
    score: Option<f64>,
    active: bool,
}

fn text(s: &str) -> Option<Value> {
    Some(Value::Text(s.to_string()))
}

#[test]
fn named_fields_map_by_position() {
    let row: Row = vec![
        Some(Value::Int(7)),
        text("ada"),
        None,
        text("2024-01-02 03:04:05"),
    ];
    let user = User::from_row(row).unwrap();
    assert_eq!(
        user,
        User {
            id: 7,
            username: "ada".into(),
            email: None,
            created_at: chrono::NaiveDate::from_ymd_opt(2024, 1, 2)
                .unwrap()
                .and_hms_opt(3, 4, 5)
                .unwrap(),
        }
    );
}

#[test]
fn tuple_struct() {
    let row: Row = vec![Some(Value::UInt8(9)), Some(Value::Binary(vec![0, 1]))];
    assert_eq!(Pair::from_row(row).unwrap(), Pair(9, vec![0, 1]));
}

#[test]
fn skipped_fields_take_default_and_do_not_count() {
    let row: Row = vec![text("6f1c2a6e-8e2b-4a53-9a5f-0c1d2e3f4a5b"), Some(Value::Bool(true))];
    let v = WithSkipped::from_row(row).unwrap();
    assert_eq!(v.score, None);
    assert!(v.active);
    assert_eq!(v.id.to_string(), "6f1c2a6e-8e2b-4a53-9a5f-0c1d2e3f4a5b");
}

#[test]
fn arity_is_checked() {
    let row: Row = vec![Some(Value::Int(1)), text("a"), None];
    assert_eq!(
        User::from_row(row),
        Err(ConversionError::ArityMismatch {
            expected: 4,
            actual: 3
        })
    );
}

#[test]
fn errors_name_the_column() {
    let row: Row = vec![Some(Value::Int(1)), Some(Value::Int(2)), None, text("x")];
    assert_eq!(
        User::from_row(row),
        Err(ConversionError::TypeMismatch {
            column: Some(1),
            expected: "String",
            actual: ValueKind::Int,
        })
    );
}

#[test]
fn derived_rows_through_the_facade() {
    let mut conn = MockConnection::with_rows(vec![
        vec![Some(Value::Int(1)), Some(Value::Binary(b"a".to_vec()))],
        vec![Some(Value::Int(2)), Some(Value::Binary(Vec::new()))],
    ]);
    let pairs: Vec<Pair> = sql("SELECT n, blob FROM t").fetch_all(&mut conn).unwrap();
    assert_eq!(pairs, vec![Pair(1, b"a".to_vec()), Pair(2, Vec::new())]);
}
