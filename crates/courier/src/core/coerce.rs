use serde_json::{Number, Value};

/// Convert a JSON value to the string a form or query field would carry.
///
/// Follows the usual loose string conversion of dynamic languages rather than
/// JSON serialization: strings are not quoted, integral floats drop their
/// fraction, arrays are joined with `,` and objects collapse to a fixed tag.
///
/// # Examples
///
/// ```
/// use courier::core::coerce_to_string;
/// use serde_json::json;
///
/// assert_eq!(coerce_to_string(&json!("a b")), "a b");
/// assert_eq!(coerce_to_string(&json!(2.0)), "2");
/// assert_eq!(coerce_to_string(&json!([1, null, "x"])), "1,,x");
/// assert_eq!(coerce_to_string(&json!({ "k": 1 })), "[object Object]");
/// ```
pub fn coerce_to_string(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Bool(flag) => flag.to_string(),
        Value::Null => "null".to_string(),
        Value::Number(number) => match number.as_f64() {
            Some(float) if number.is_f64() => coerce_float(number, float),
            _ => number.to_string(),
        },
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => coerce_to_string(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

// Signed zero prints as `0`; large exponents carry an explicit `+`.
fn coerce_float(number: &Number, float: f64) -> String {
    if float == 0.0 {
        return "0".to_string();
    }
    if float.fract() == 0.0 && float.abs() < 1e21 {
        return format!("{float:.0}");
    }

    let text = number.to_string();
    match text.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => {
            format!("{mantissa}e+{exponent}")
        }
        _ => text,
    }
}
