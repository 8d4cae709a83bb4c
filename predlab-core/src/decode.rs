//! Typed field reads over loosely typed JSON.
//!
//! Every read either yields the expected Rust type or a `Type Error`
//! violation. Strings are never parsed as numbers and nulls are never
//! treated as zero.

use serde_json::{Map, Value};

use crate::violation::Violation;

/// JSON kind name used in type error messages.
pub fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Follow a dotted path (`data.metadata.prediction_days`) through nested objects.
pub fn lookup<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(root, |node, key| node.as_object()?.get(key))
}

/// Join a parent path and a child key.
pub fn join(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}

/// Path of an array element.
pub fn index(parent: &str, i: usize) -> String {
    format!("{parent}[{i}]")
}

pub fn wrong_type(path: &str, expected: &'static str, value: &Value) -> Violation {
    let found = match value {
        Value::String(s) => format!("string {s:?}"),
        other => kind(other).to_string(),
    };
    Violation::WrongType {
        path: path.to_string(),
        expected,
        found,
    }
}

pub fn number(value: &Value, path: &str) -> Result<f64, Violation> {
    value
        .as_f64()
        .filter(|v| v.is_finite())
        .ok_or_else(|| wrong_type(path, "a finite number", value))
}

/// A JSON integer. Floats such as `5.0` are rejected.
pub fn integer(value: &Value, path: &str) -> Result<i64, Violation> {
    value
        .as_i64()
        .ok_or_else(|| wrong_type(path, "an integer", value))
}

pub fn string<'a>(value: &'a Value, path: &str) -> Result<&'a str, Violation> {
    value
        .as_str()
        .ok_or_else(|| wrong_type(path, "a string", value))
}

pub fn boolean(value: &Value, path: &str) -> Result<bool, Violation> {
    value
        .as_bool()
        .ok_or_else(|| wrong_type(path, "a boolean", value))
}

pub fn array<'a>(value: &'a Value, path: &str) -> Result<&'a [Value], Violation> {
    value
        .as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| wrong_type(path, "an array", value))
}

pub fn object<'a>(value: &'a Value, path: &str) -> Result<&'a Map<String, Value>, Violation> {
    value
        .as_object()
        .ok_or_else(|| wrong_type(path, "an object", value))
}

/// Read a required key from an object, reporting absence as `Missing Field`.
pub fn field<'a>(
    obj: &'a Map<String, Value>,
    parent: &str,
    key: &str,
) -> Result<&'a Value, Violation> {
    obj.get(key).ok_or_else(|| Violation::MissingField {
        path: join(parent, key),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn lookup_follows_nested_objects() {
        let v = json!({"data": {"metadata": {"prediction_days": 5}}});
        assert_eq!(lookup(&v, "data.metadata.prediction_days"), Some(&json!(5)));
        assert_eq!(lookup(&v, "data.missing"), None);
        assert_eq!(lookup(&json!([1, 2]), "data"), None);
    }

    #[test]
    fn numbers_in_strings_fail_closed() {
        let err = number(&json!("12.5"), "summary_stats.last_close").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Type Error: summary_stats.last_close must be a finite number, found string \"12.5\""
        );
        assert!(number(&Value::Null, "x").is_err());
        assert_eq!(number(&json!(12.5), "x").unwrap(), 12.5);
    }

    #[test]
    fn integer_rejects_floats() {
        assert!(integer(&json!(5.0), "x").is_err());
        assert_eq!(integer(&json!(5), "x").unwrap(), 5);
    }

    #[test]
    fn join_handles_empty_parent() {
        assert_eq!(join("", "ticker_info"), "ticker_info");
        assert_eq!(join("data", "predictions"), "data.predictions");
        assert_eq!(index("data.predictions", 2), "data.predictions[2]");
    }
}
