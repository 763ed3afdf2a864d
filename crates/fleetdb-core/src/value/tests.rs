use super::*;
use rust_decimal::Decimal;
use std::str::FromStr;

fn dec(s: &str) -> Value {
    Value::Decimal(Decimal::from_str(s).expect("decimal literal"))
}

#[test]
fn numeric_widening_compares_across_variants() {
    assert_eq!(
        Value::Int(3).cmp_numeric(&Value::Uint(3)),
        Some(Ordering::Equal)
    );
    assert_eq!(Value::Int(-1).cmp_numeric(&Value::Uint(0)), Some(Ordering::Less));
    assert_eq!(dec("2.5").cmp_numeric(&Value::from(2.4)), Some(Ordering::Greater));
    assert_eq!(Value::Int(1).cmp_numeric(&Value::Text("1".into())), None);

    // beyond decimal range: falls back to float comparison
    assert_eq!(Value::from(1e30).cmp_numeric(&Value::Int(1)), Some(Ordering::Greater));
    assert_eq!(dec("1.5").cmp_numeric(&Value::from(-1e30)), Some(Ordering::Greater));
}

#[test]
fn partial_cmp_value_rejects_mismatched_non_numeric_variants() {
    assert_eq!(
        Value::partial_cmp_value(&Value::Text("a".into()), &Value::Bool(true)),
        None
    );
    assert_eq!(
        Value::partial_cmp_value(&Value::Text("a".into()), &Value::Text("b".into())),
        Some(Ordering::Less)
    );
}

#[test]
fn canonical_cmp_orders_null_first_and_is_antisymmetric() {
    let values = vec![
        Value::Text("x".into()),
        Value::Null,
        Value::Int(5),
        Value::Uint(2),
        dec("3.5"),
        Value::Bool(false),
        Value::Enum("ACTIVE".into()),
    ];

    for left in &values {
        for right in &values {
            assert_eq!(
                Value::canonical_cmp(left, right),
                Value::canonical_cmp(right, left).reverse(),
                "canonical order must be antisymmetric for {left:?} / {right:?}",
            );
        }
    }

    let mut sorted = values;
    sorted.sort_by(Value::canonical_cmp);
    assert_eq!(sorted[0], Value::Null);
    assert_eq!(sorted[2], Value::Uint(2));
    assert_eq!(sorted[3], dec("3.5"));
    assert_eq!(sorted[4], Value::Int(5));
}

#[test]
fn text_ops_honor_mode() {
    let hay = Value::Text("Downtown Depot".into());
    let needle = Value::Text("depot".into());

    assert_eq!(hay.text_contains(&needle, TextMode::Cs), Some(false));
    assert_eq!(hay.text_contains(&needle, TextMode::Ci), Some(true));
    assert_eq!(
        hay.text_starts_with(&Value::Text("DOWN".into()), TextMode::Ci),
        Some(true)
    );
    assert_eq!(
        Value::Text("B".into()).text_cmp(&Value::Text("a".into()), TextMode::Ci),
        Some(Ordering::Greater)
    );
    assert_eq!(hay.text_eq(&Value::Int(1), TextMode::Ci), None);
}

#[test]
fn option_and_float_conversions() {
    assert_eq!(Value::from(None::<i64>), Value::Null);
    assert_eq!(Value::from(Some("a")), Value::Text("a".into()));
    assert_eq!(Value::from(f64::NAN), Value::Null);
    assert_eq!(
        Value::from(vec![1_i64, 2]),
        Value::List(vec![Value::Int(1), Value::Int(2)])
    );
}

#[test]
fn serializes_untagged() {
    let json = serde_json::to_string(&Value::List(vec![
        Value::Null,
        Value::Int(1),
        Value::Text("a".into()),
        Value::Enum("IDLE".into()),
    ]))
    .expect("value serializes");

    assert_eq!(json, r#"[null,1,"a","IDLE"]"#);
}
