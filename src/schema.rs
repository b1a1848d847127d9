//! @ai:module:intent Declared shape of extraction results, checked at runtime
//! @ai:module:layer domain
//! @ai:module:public_api Schema, Field
//! @ai:module:stateless true
//!
//! The extraction service is untyped at its boundary. Tasks declare the shape
//! they expect, the shape is sent along with the instruction as a JSON schema,
//! and whatever comes back is validated before it is deserialized.

use crate::error::{EvalError, Result};
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};

/// @ai:intent Structural type descriptor for extracted JSON
#[derive(Debug, Clone, PartialEq)]
pub enum Schema {
    String { description: Option<String> },
    Integer { description: Option<String> },
    Number { description: Option<String> },
    Boolean { description: Option<String> },
    Array { items: Box<Schema>, description: Option<String> },
    Object { fields: Vec<Field>, description: Option<String> },
}

/// @ai:intent A named member of an object schema
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub schema: Schema,
    pub optional: bool,
}

impl Field {
    pub fn new(name: impl Into<String>, schema: Schema) -> Self {
        Self {
            name: name.into(),
            schema,
            optional: false,
        }
    }

    /// @ai:intent Allow the field to be missing or null
    /// @ai:effects pure
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

impl Schema {
    pub fn string() -> Self {
        Schema::String { description: None }
    }

    pub fn integer() -> Self {
        Schema::Integer { description: None }
    }

    pub fn number() -> Self {
        Schema::Number { description: None }
    }

    pub fn boolean() -> Self {
        Schema::Boolean { description: None }
    }

    pub fn array(items: Schema) -> Self {
        Schema::Array {
            items: Box::new(items),
            description: None,
        }
    }

    pub fn object(fields: Vec<Field>) -> Self {
        Schema::Object {
            fields,
            description: None,
        }
    }

    /// @ai:intent Attach a description the extraction model sees
    /// @ai:effects pure
    pub fn describe(mut self, text: impl Into<String>) -> Self {
        let text = Some(text.into());
        match &mut self {
            Schema::String { description }
            | Schema::Integer { description }
            | Schema::Number { description }
            | Schema::Boolean { description }
            | Schema::Array { description, .. }
            | Schema::Object { description, .. } => *description = text,
        }
        self
    }

    fn description(&self) -> Option<&str> {
        match self {
            Schema::String { description }
            | Schema::Integer { description }
            | Schema::Number { description }
            | Schema::Boolean { description }
            | Schema::Array { description, .. }
            | Schema::Object { description, .. } => description.as_deref(),
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            Schema::String { .. } => "string",
            Schema::Integer { .. } => "integer",
            Schema::Number { .. } => "number",
            Schema::Boolean { .. } => "boolean",
            Schema::Array { .. } => "array",
            Schema::Object { .. } => "object",
        }
    }

    /// @ai:intent Render as a JSON schema object for the extraction request
    /// @ai:effects pure
    pub fn to_json_schema(&self) -> Value {
        let mut out = Map::new();
        out.insert("type".to_string(), json!(self.type_name()));

        if let Some(text) = self.description() {
            out.insert("description".to_string(), json!(text));
        }

        match self {
            Schema::Array { items, .. } => {
                out.insert("items".to_string(), items.to_json_schema());
            }
            Schema::Object { fields, .. } => {
                let properties: Map<String, Value> = fields
                    .iter()
                    .map(|f| (f.name.clone(), f.schema.to_json_schema()))
                    .collect();
                let required: Vec<&str> = fields
                    .iter()
                    .filter(|f| !f.optional)
                    .map(|f| f.name.as_str())
                    .collect();

                out.insert("properties".to_string(), Value::Object(properties));
                out.insert("required".to_string(), json!(required));
            }
            _ => {}
        }

        Value::Object(out)
    }

    /// @ai:intent Check a value against this schema
    /// @ai:effects pure
    pub fn validate(&self, value: &Value) -> Result<()> {
        self.validate_at(value, "$")
    }

    /// @ai:intent Validate, then deserialize into a typed result
    /// @ai:effects pure
    pub fn parse<T: DeserializeOwned>(&self, value: Value) -> Result<T> {
        self.validate(&value)?;
        serde_json::from_value(value).map_err(|e| EvalError::Schema {
            path: "$".to_string(),
            message: e.to_string(),
        })
    }

    fn validate_at(&self, value: &Value, path: &str) -> Result<()> {
        let type_ok = match self {
            Schema::String { .. } => value.is_string(),
            Schema::Integer { .. } => value.is_i64() || value.is_u64(),
            Schema::Number { .. } => value.is_number(),
            Schema::Boolean { .. } => value.is_boolean(),
            Schema::Array { .. } => value.is_array(),
            Schema::Object { .. } => value.is_object(),
        };

        if !type_ok {
            return Err(EvalError::Schema {
                path: path.to_string(),
                message: format!("expected {}, found {}", self.type_name(), json_type(value)),
            });
        }

        match (self, value) {
            (Schema::Array { items, .. }, Value::Array(elements)) => {
                for (i, element) in elements.iter().enumerate() {
                    items.validate_at(element, &format!("{}[{}]", path, i))?;
                }
            }
            (Schema::Object { fields, .. }, Value::Object(members)) => {
                for field in fields {
                    let field_path = format!("{}.{}", path, field.name);
                    match members.get(&field.name) {
                        None | Some(Value::Null) if field.optional => {}
                        None => {
                            return Err(EvalError::Schema {
                                path: field_path,
                                message: "missing required field".to_string(),
                            });
                        }
                        Some(member) => field.schema.validate_at(member, &field_path)?,
                    }
                }
            }
            _ => {}
        }

        Ok(())
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde::Deserialize;

    fn press_schema() -> Schema {
        Schema::object(vec![Field::new(
            "items",
            Schema::array(Schema::object(vec![
                Field::new("title", Schema::string().describe("The title")),
                Field::new("publish_date", Schema::string()),
            ])),
        )])
    }

    #[test]
    fn test_json_schema_rendering() {
        let rendered = press_schema().to_json_schema();
        assert_eq!(rendered["type"], "object");
        assert_eq!(rendered["required"], json!(["items"]));
        let item = &rendered["properties"]["items"]["items"];
        assert_eq!(item["properties"]["title"]["description"], "The title");
        assert_eq!(item["required"], json!(["title", "publish_date"]));
    }

    #[test]
    fn test_validate_reports_path() {
        let value = json!({ "items": [
            { "title": "a", "publish_date": "b" },
            { "title": 7, "publish_date": "c" }
        ]});

        let err = press_schema().validate(&value).unwrap_err();
        match err {
            EvalError::Schema { path, message } => {
                assert_eq!(path, "$.items[1].title");
                assert_eq!(message, "expected string, found number");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_required_field() {
        let err = press_schema().validate(&json!({})).unwrap_err();
        assert!(matches!(err, EvalError::Schema { ref path, .. } if path == "$.items"));
    }

    #[test]
    fn test_optional_field_may_be_null() {
        let schema = Schema::object(vec![Field::new("note", Schema::string()).optional()]);
        assert!(schema.validate(&json!({ "note": null })).is_ok());
        assert!(schema.validate(&json!({})).is_ok());
        assert!(schema.validate(&json!({ "note": 1 })).is_err());
    }

    #[test]
    fn test_parse_into_typed_value() {
        #[derive(Deserialize)]
        struct Part {
            count: u32,
        }

        let schema = Schema::object(vec![Field::new("count", Schema::integer())]);
        let part: Part = schema.parse(json!({ "count": 3, "extra": true })).unwrap();
        assert_eq!(part.count, 3);
        assert!(schema.parse::<Part>(json!({ "count": 1.5 })).is_err());
    }
}
