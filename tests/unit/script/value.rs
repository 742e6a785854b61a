use super::*;

#[test]
fn display_prints_integers_without_fraction() {
    assert_eq!(Value::Num(3.0).to_string(), "3");
    assert_eq!(Value::Num(2.5).to_string(), "2.5");
    assert_eq!(
        Value::List(vec![Value::Num(1.0), Value::from("a"), Value::Null]).to_string(),
        "[1, a, null]"
    );
}

#[test]
fn json_conversion_keeps_structure() {
    let v = Value::List(vec![Value::Num(1.5), Value::Bool(true), Value::from("x")]);
    let j = v.to_json();
    assert_eq!(j, serde_json::json!([1.5, true, "x"]));
    assert_eq!(Value::from_json(&j), v);
    assert_eq!(Value::Num(f64::NAN).to_json(), serde_json::Value::Null);
    assert_eq!(Value::from_json(&serde_json::json!({"a": 1})), Value::Null);
}

#[test]
fn typed_accessors_report_actual_type() {
    let err = Value::from("x").as_f64().unwrap_err();
    assert!(err.message.contains("string"));
    assert!(Value::Null.as_bool().is_err());
    assert_eq!(Value::Num(2.0).as_f64().unwrap(), 2.0);
}

#[test]
fn integral_numbers_serialize_as_json_integers() {
    assert_eq!(Value::Num(3.0).to_json(), serde_json::json!(3));
    assert_eq!(Value::Num(-2.0).to_json(), serde_json::json!(-2));
    assert_eq!(Value::Num(0.25).to_json(), serde_json::json!(0.25));
}
