//! Top-level JSON-schema checks on tool arguments before dispatch.

use serde_json::Value;

use crate::error::ScoutError;

/// Check `args` against an object schema.
///
/// Only the top level is checked: the value must be an object, required keys
/// must be present and non-null, and declared properties must have the declared
/// primitive type. `null` is accepted for optional properties.
pub fn validate_arguments(args: &Value, schema: &Value) -> Result<(), ScoutError> {
    let invalid = |msg: String| Err(ScoutError::InvalidArgument(msg));

    if schema.get("type").and_then(Value::as_str) == Some("object") && !args.is_object() {
        return invalid(format!("expected object arguments, got {}", json_type_name(args)));
    }
    let Some(obj) = args.as_object() else {
        return Ok(());
    };

    let required: Vec<&str> = schema
        .get("required")
        .and_then(Value::as_array)
        .map(|r| r.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();
    for name in &required {
        if obj.get(*name).map_or(true, Value::is_null) {
            return invalid(format!("missing required field '{name}'"));
        }
    }

    let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
        return Ok(());
    };
    for (key, value) in obj {
        if value.is_null() {
            continue;
        }
        let expected = properties
            .get(key)
            .and_then(|p| p.get("type"))
            .and_then(Value::as_str);
        if let Some(expected) = expected {
            if !value_matches_type(value, expected) {
                return invalid(format!(
                    "field '{key}' expected type '{expected}', got {}",
                    json_type_name(value)
                ));
            }
        }
    }
    Ok(())
}

fn value_matches_type(value: &Value, expected: &str) -> bool {
    match expected {
        "string" => value.is_string(),
        "number" => value.is_number(),
        "integer" => value.is_i64() || value.is_u64(),
        "boolean" => value.is_boolean(),
        "object" => value.is_object(),
        "array" => value.is_array(),
        _ => true,
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
