mod support;

use sqlsplice::{
    ConversionError, Error, Query, Row, Step, Value, buffered_query, exec, param, sql,
    streaming_fold, with_connection,
};
use support::{MockConnection, MockError};

fn two_columns() -> Vec<Row> {
    vec![
        vec![Some(Value::Int(1)), Some(Value::Text("ada".into()))],
        vec![Some(Value::Int(2)), None],
        vec![Some(Value::Int(3)), Some(Value::Text("O'Brien".into()))],
    ]
}

#[test]
fn exec_sends_rendered_sql() {
    let mut conn = MockConnection::default();
    let q = sql("DELETE FROM t WHERE name = ") + param("x'y");
    exec(&mut conn, &q).unwrap();
    assert_eq!(conn.statements, vec!["DELETE FROM t WHERE name = (N'x'+NCHAR(39)+'y')"]);
    assert_eq!(conn.fetches, 0);
}

#[test]
fn exec_forwards_driver_error() {
    let mut conn = MockConnection {
        fail_statement: Some("syntax error".into()),
        ..MockConnection::default()
    };
    let err = sql("SELEC 1").execute(&mut conn).unwrap_err();
    assert!(err.is_driver());
    assert_eq!(
        err.downcast_driver::<MockError>(),
        Some(&MockError::Statement("syntax error".into()))
    );
    assert_eq!(err.to_string(), "Driver error: statement failed: syntax error");
}

#[test]
fn buffered_query_into_tuples() {
    let mut conn = MockConnection::with_rows(two_columns());
    let rows: Vec<(i64, Option<String>)> =
        buffered_query(&mut conn, &sql("SELECT id, name FROM users")).unwrap();
    assert_eq!(
        rows,
        vec![
            (1, Some("ada".to_string())),
            (2, None),
            (3, Some("O'Brien".to_string())),
        ]
    );
}

#[test]
fn buffered_query_loose_rows_always_succeed() {
    let mut conn = MockConnection::with_rows(two_columns());
    let rows: Vec<Row> = sql("SELECT *").fetch_all(&mut conn).unwrap();
    assert_eq!(rows, two_columns());
}

#[test]
fn buffered_query_fails_on_first_bad_row() {
    let mut conn = MockConnection::with_rows(two_columns());
    let err = sql("SELECT id, name FROM users")
        .fetch_all::<(i64, String), _>(&mut conn)
        .unwrap_err();
    assert_eq!(
        err.as_conversion(),
        Some(&ConversionError::UnexpectedNull {
            column: Some(1),
            expected: "String",
        })
    );
}

#[test]
fn buffered_query_arity_mismatch() {
    let mut conn = MockConnection::with_rows(vec![vec![
        Some(Value::Int(1)),
        Some(Value::Int(2)),
        Some(Value::Int(3)),
    ]]);
    let err = sql("SELECT a, b, c")
        .fetch_all::<(i64, i64), _>(&mut conn)
        .unwrap_err();
    assert!(err.is_conversion());
    assert_eq!(
        err.as_conversion(),
        Some(&ConversionError::ArityMismatch {
            expected: 2,
            actual: 3
        })
    );
}

#[test]
fn fold_stops_without_fetching_further() {
    let mut conn = MockConnection::counting(5);
    let seen = streaming_fold(
        &mut conn,
        &sql("SELECT n FROM big"),
        Vec::new(),
        |mut acc: Vec<i64>, (n,): (i64,)| {
            acc.push(n);
            if n == 2 { Step::Stop(acc) } else { Step::Continue(acc) }
        },
    )
    .unwrap();

    assert_eq!(seen, vec![1, 2]);
    assert_eq!(conn.fetches, 2);
    assert_eq!(conn.cursor_closes, 1);
}

#[test]
fn fold_runs_to_exhaustion() {
    let mut conn = MockConnection::counting(5);
    let sum = sql("SELECT n FROM big")
        .fold(&mut conn, 0i64, |acc, (n,): (i64,)| Step::Continue(acc + n))
        .unwrap();
    assert_eq!(sum, 15);
    // Five rows plus the fetch that reports exhaustion.
    assert_eq!(conn.fetches, 6);
    assert_eq!(conn.cursor_closes, 1);
}

#[test]
fn fold_over_empty_result_returns_init() {
    let mut conn = MockConnection::default();
    let state = sql("SELECT 1 WHERE 1 = 0")
        .fold(&mut conn, "init", |_, _: Row| Step::Stop("touched"))
        .unwrap();
    assert_eq!(state, "init");
    assert_eq!(conn.fetches, 1);
    assert_eq!(conn.cursor_closes, 1);
}

#[test]
fn fold_conversion_error_aborts_and_closes() {
    let mut rows: Vec<Row> = (1..=4).map(|i| vec![Some(Value::Int(i))]).collect();
    rows[2] = vec![Some(Value::Text("three".into()))];
    let mut conn = MockConnection::with_rows(rows);

    let mut visited = 0;
    let err = sql("SELECT n")
        .fold(&mut conn, (), |(), (_n,): (i64,)| {
            visited += 1;
            Step::Continue(())
        })
        .unwrap_err();

    assert_eq!(visited, 2);
    assert_eq!(err.as_conversion().and_then(ConversionError::column), Some(0));
    assert_eq!(conn.fetches, 3);
    assert_eq!(conn.cursor_closes, 1);
}

#[test]
fn fold_driver_error_closes_cursor() {
    let mut conn = MockConnection {
        fail_fetch_at: Some(1),
        ..MockConnection::counting(5)
    };
    let err = sql("SELECT n")
        .fold(&mut conn, 0, |acc, _: Row| Step::Continue(acc + 1))
        .unwrap_err();
    assert_eq!(err.downcast_driver::<MockError>(), Some(&MockError::Fetch(1)));
    assert_eq!(conn.cursor_closes, 1);
}

#[test]
fn try_fold_step_error_closes_cursor() {
    let mut conn = MockConnection::counting(5);
    let err = sql("SELECT n")
        .try_fold(&mut conn, 0i64, |acc, (n,): (i64,)| {
            if n == 3 {
                Err(Error::not_found("stop at three"))
            } else {
                Ok(Step::Continue(acc + n))
            }
        })
        .unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(conn.fetches, 3);
    assert_eq!(conn.cursor_closes, 1);
}

#[test]
fn close_error_on_success_path_is_returned() {
    let mut conn = MockConnection {
        fail_close: true,
        ..MockConnection::counting(2)
    };
    let err = sql("SELECT n")
        .fold(&mut conn, 0, |acc, _: Row| Step::Continue(acc + 1))
        .unwrap_err();
    assert_eq!(err.downcast_driver::<MockError>(), Some(&MockError::Close));
    assert_eq!(conn.cursor_closes, 1);
}

#[test]
fn close_error_on_error_path_keeps_original_error() {
    let mut conn = MockConnection {
        fail_close: true,
        fail_fetch_at: Some(0),
        ..MockConnection::counting(2)
    };
    let err = sql("SELECT n")
        .fold(&mut conn, 0, |acc, _: Row| Step::Continue(acc + 1))
        .unwrap_err();
    assert_eq!(err.downcast_driver::<MockError>(), Some(&MockError::Fetch(0)));
    assert_eq!(conn.cursor_closes, 1);
}

#[test]
fn stream_open_failure_fetches_nothing() {
    let mut conn = MockConnection {
        fail_statement: Some("no such table".into()),
        ..MockConnection::counting(2)
    };
    let err = sql("SELECT n FROM missing")
        .fold(&mut conn, 0, |acc, _: Row| Step::Continue(acc + 1))
        .unwrap_err();
    assert!(err.is_driver());
    assert_eq!(conn.fetches, 0);
    assert_eq!(conn.cursor_closes, 0);
}

#[test]
fn fold_step_panic_still_closes_cursor() {
    let mut conn = MockConnection::counting(3);
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let _ = sql("SELECT n").fold(&mut conn, (), |(), _: Row| -> Step<()> {
            panic!("step exploded")
        });
    }));
    assert!(result.is_err());
    assert_eq!(conn.cursor_closes, 1);
}

#[test]
fn fetch_optional_reads_one_row() {
    let mut conn = MockConnection::counting(5);
    let first: Option<(i64,)> = sql("SELECT n").fetch_optional(&mut conn).unwrap();
    assert_eq!(first, Some((1,)));
    assert_eq!(conn.fetches, 1);
    assert_eq!(conn.cursor_closes, 1);

    let mut empty = MockConnection::default();
    let none: Option<(i64,)> = sql("SELECT n").fetch_optional(&mut empty).unwrap();
    assert_eq!(none, None);
}

#[test]
fn fetch_one_not_found() {
    let mut conn = MockConnection::default();
    let err = sql("SELECT n").fetch_one::<(i64,), _>(&mut conn).unwrap_err();
    assert!(err.is_not_found());

    let mut conn = MockConnection::counting(3);
    let (n,): (i64,) = sql("SELECT n").fetch_one(&mut conn).unwrap();
    assert_eq!(n, 1);
}

#[test]
fn with_connection_connects_and_closes() {
    let rows = with_connection::<MockConnection, _, _>("mock:memory", |conn| {
        conn.rows = vec![vec![Some(Value::Bool(true))]];
        sql("SELECT flag").fetch_all::<(bool,), _>(conn)
    })
    .unwrap();
    assert_eq!(rows, vec![(true,)]);

    let err = with_connection::<MockConnection, (), _>("tcp://nowhere", |_| Ok(())).unwrap_err();
    assert_eq!(
        err.downcast_driver::<MockError>(),
        Some(&MockError::Connect("tcp://nowhere".into()))
    );
}

#[test]
fn with_connection_returns_closure_error() {
    let err = with_connection::<MockConnection, (), _>("mock:memory", |conn| {
        conn.fail_close = true;
        Err(Error::not_found("inner"))
    })
    .unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn query_can_be_reused() {
    let q: Query = sql("SELECT n FROM t WHERE n > ") + param(0);
    let mut conn = MockConnection::counting(2);
    let a: Vec<(i64,)> = q.fetch_all(&mut conn).unwrap();
    let b: Vec<(i64,)> = q.fetch_all(&mut conn).unwrap();
    assert_eq!(a, b);
    assert_eq!(conn.statements, vec!["SELECT n FROM t WHERE n > 0"; 2]);
}
