//! Helpers for the `serde_json::Value` values that flow through a chain.

use serde_json::{Number, Value};

/// Default is-empty predicate: `null` or the empty string.
pub fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Render a value into template text.
///
/// Strings are emitted verbatim, whole numbers without a fractional part,
/// `null` as nothing, arrays and objects as compact JSON.
pub fn render(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => render_number(n),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

fn render_number(n: &Number) -> String {
    if n.is_i64() || n.is_u64() {
        return n.to_string();
    }
    match n.as_f64() {
        Some(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
        Some(f) => format!("{}", f),
        None => n.to_string(),
    }
}

/// Build a number value, keeping whole numbers integral.
///
/// Non-finite input becomes `null`.
pub fn number(f: f64) -> Value {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 9.0e15 {
        Value::from(f as i64)
    } else {
        Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null)
    }
}

/// Numeric view of a value: numbers as-is, strings parsed after trimming,
/// booleans as 0/1.
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_means_null_or_empty_string() {
        assert!(is_empty(&Value::Null));
        assert!(is_empty(&json!("")));
        assert!(!is_empty(&json!(" ")));
        assert!(!is_empty(&json!(0)));
        assert!(!is_empty(&json!(false)));
        assert!(!is_empty(&json!([])));
    }

    #[test]
    fn render_drops_trailing_zero_fraction() {
        assert_eq!(render(&json!(3)), "3");
        assert_eq!(render(&json!(3.0)), "3");
        assert_eq!(render(&json!(2.5)), "2.5");
        assert_eq!(render(&json!(-4.0)), "-4");
    }

    #[test]
    fn render_scalars_and_containers() {
        assert_eq!(render(&Value::Null), "");
        assert_eq!(render(&json!(true)), "true");
        assert_eq!(render(&json!("x")), "x");
        assert_eq!(render(&json!([1, 2])), "[1,2]");
        assert_eq!(render(&json!({"a": 1})), r#"{"a":1}"#);
    }

    #[test]
    fn number_keeps_integers_integral() {
        assert!(number(6.0).is_i64());
        assert_eq!(number(1.5), json!(1.5));
        assert_eq!(number(f64::NAN), Value::Null);
    }

    #[test]
    fn as_number_accepts_numeric_strings() {
        assert_eq!(as_number(&json!(" 42 ")), Some(42.0));
        assert_eq!(as_number(&json!("x")), None);
        assert_eq!(as_number(&json!(true)), Some(1.0));
        assert_eq!(as_number(&Value::Null), None);
    }
}
