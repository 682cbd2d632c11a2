use sqlsplice::{Query, ToQuery, Value, param, sql};

#[test]
fn end_to_end_example() {
    let q = sql("SELECT * FROM t WHERE id = ") + 123_i32.to_query() + " AND name = " + "O'Brien".to_query();
    assert_eq!(
        q.to_sql(),
        "SELECT * FROM t WHERE id = 123 AND name = (N'O'+NCHAR(39)+'Brien')"
    );
}

#[test]
fn every_unsafe_ascii_char_is_spliced() {
    for b in 0u8..=127 {
        let c = char::from(b);
        let rendered = Value::Text(c.to_string()).render();
        if c.is_ascii_alphanumeric() || matches!(c, ' ' | ',' | '.' | '-' | '_') {
            assert_eq!(rendered, format!("(N'{c}')"));
        } else {
            assert_eq!(rendered, format!("(N''+NCHAR({b})+'')"));
        }
    }
}

#[test]
fn composite_statement() {
    let name: Option<&str> = None;
    let q = sql("INSERT INTO logs (level, msg, payload, ok, ratio, who) VALUES (")
        + Query::join(
            ", ",
            vec![
                param(3_u8),
                param("disk 93% full"),
                param(vec![0xde_u8, 0xad]),
                param(false),
                param(0.25_f32),
                param(name),
            ],
        )
        + ")";
    assert_eq!(
        q.to_sql(),
        "INSERT INTO logs (level, msg, payload, ok, ratio, who) VALUES (\
         3, (N'disk 93'+NCHAR(37)+' full'), (''+CHAR(222)+''+CHAR(173)+''), 0, 0.25, NULL)"
    );
    assert_eq!(q.value_count(), 5);
}

#[test]
fn non_finite_parameters_stay_out_of_identifier_space() {
    let q = sql("SELECT * FROM t WHERE x = ") + param(f64::INFINITY) + " OR y = " + param(f64::NAN);
    assert_eq!(
        q.to_sql(),
        "SELECT * FROM t WHERE x = CAST((N'inf') AS FLOAT) OR y = CAST((N'NaN') AS FLOAT)"
    );
}
