//! Declared output shapes.
//!
//! A small JSON-schema subset: `type` (object, array, string, integer, number,
//! boolean), `properties`, `required` and `items`. The same document is shown to
//! the model and used to check its reply.

use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq)]
pub struct OutputSchema {
    pub name: &'static str,
    pub schema: Value,
}

impl OutputSchema {
    pub fn new(name: &'static str, schema: Value) -> Self {
        Self { name, schema }
    }

    /// Formatting instruction appended to every prompt.
    pub fn instruction(&self) -> String {
        let pretty = serde_json::to_string_pretty(&self.schema).unwrap_or_default();
        format!(
            "Respond only with a JSON value that conforms to this JSON schema, \
             with no commentary and no Markdown:\n{}",
            pretty
        )
    }

    /// Wrap a bare array reply when the schema is an object whose only
    /// required field is an array, e.g. `[...]` becomes `{"words": [...]}`.
    pub fn normalize(&self, value: Value) -> Value {
        if !value.is_array() {
            return value;
        }
        match self.single_array_field() {
            Some(field) => {
                let mut wrapped = Map::new();
                wrapped.insert(field.to_string(), value);
                Value::Object(wrapped)
            }
            None => value,
        }
    }

    fn single_array_field(&self) -> Option<&str> {
        if self.schema.get("type").and_then(Value::as_str) != Some("object") {
            return None;
        }
        let required = self.schema.get("required")?.as_array()?;
        let [field] = required.as_slice() else {
            return None;
        };
        let field = field.as_str()?;
        let field_type = self
            .schema
            .pointer(&format!("/properties/{}/type", field))
            .and_then(Value::as_str)?;
        (field_type == "array").then_some(field)
    }

    pub fn validate(&self, value: &Value) -> Result<(), String> {
        validate_node(&self.schema, value, "$")
    }
}

fn validate_node(schema: &Value, value: &Value, path: &str) -> Result<(), String> {
    let Some(expected) = schema.get("type").and_then(Value::as_str) else {
        return Ok(());
    };

    match expected {
        "object" => {
            let obj = value
                .as_object()
                .ok_or_else(|| mismatch(path, expected, value))?;

            if let Some(required) = schema.get("required").and_then(Value::as_array) {
                for field in required.iter().filter_map(Value::as_str) {
                    if !obj.contains_key(field) {
                        return Err(format!("{}: missing required field '{}'", path, field));
                    }
                }
            }

            if let Some(properties) = schema.get("properties").and_then(Value::as_object) {
                for (field, sub_schema) in properties {
                    if let Some(sub_value) = obj.get(field) {
                        validate_node(sub_schema, sub_value, &format!("{}.{}", path, field))?;
                    }
                }
            }
            Ok(())
        }
        "array" => {
            let items = value
                .as_array()
                .ok_or_else(|| mismatch(path, expected, value))?;
            if let Some(item_schema) = schema.get("items") {
                for (i, item) in items.iter().enumerate() {
                    validate_node(item_schema, item, &format!("{}[{}]", path, i))?;
                }
            }
            Ok(())
        }
        "string" if value.is_string() => Ok(()),
        "integer" if value.is_i64() || value.is_u64() => Ok(()),
        "number" if value.is_number() => Ok(()),
        "boolean" if value.is_boolean() => Ok(()),
        "string" | "integer" | "number" | "boolean" => Err(mismatch(path, expected, value)),
        other => Err(format!("{}: unsupported schema type '{}'", path, other)),
    }
}

fn mismatch(path: &str, expected: &str, value: &Value) -> String {
    let found = match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    };
    format!("{}: expected {}, found {}", path, expected, found)
}
