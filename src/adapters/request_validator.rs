use crate::adapters::media_type;
use crate::domain::{
    HttpContent, HttpOperation, HttpParam, IncomingRequest, RequestValidatorPort, SchemaNode,
    SchemaType, TypeDecl, ValidationResult, Violation,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use tracing::warn;

/// Validates requests against declared parameters and body schemas with
/// `jsonschema`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SchemaRequestValidator;

impl SchemaRequestValidator {
    pub fn new() -> Self {
        Self
    }
}

impl RequestValidatorPort for SchemaRequestValidator {
    fn validate(
        &self,
        operation: &HttpOperation,
        request: &IncomingRequest,
        path_params: &HashMap<String, String>,
    ) -> ValidationResult {
        let shape = &operation.request;
        let mut violations = Vec::new();

        for param in &shape.path {
            let value = path_params.get(&param.name).map(String::as_str);
            check_param("path", param, value, &mut violations);
        }
        for param in &shape.query {
            check_param("query", param, request.query_param(&param.name), &mut violations);
        }
        for param in &shape.headers {
            check_param("header", param, request.header(&param.name), &mut violations);
        }

        if let Some(body) = &shape.body {
            match &request.body {
                None if body.required => violations.push(Violation::error(
                    "body",
                    "required",
                    "Body parameter is required",
                )),
                None => {}
                Some(payload) => {
                    let content_type = request.header("content-type");
                    if let Some(schema) = body_schema(&body.contents, content_type) {
                        violations.extend(schema_violations("body", schema, payload));
                    }
                }
            }
        }

        ValidationResult { input: violations }
    }
}

fn check_param(location: &str, param: &HttpParam, raw: Option<&str>, violations: &mut Vec<Violation>) {
    let path = format!("{}.{}", location, param.name);
    let Some(raw) = raw else {
        if param.required {
            violations.push(Violation::error(
                path,
                "required",
                format!("Missing required {} parameter '{}'", location, param.name),
            ));
        }
        return;
    };

    if let Some(schema) = &param.schema {
        let value = coerce(raw, schema);
        violations.extend(schema_violations(&path, schema, &value));
    }
}

/// Parameters arrive as text; convert to the schema's primitive type so the
/// JSON Schema check sees a typed value.
fn coerce(raw: &str, schema: &SchemaNode) -> Value {
    let ty = schema.schema_type.as_ref().and_then(TypeDecl::primary);
    match ty {
        Some(SchemaType::Integer) => raw
            .parse::<i64>()
            .map(Value::from)
            .unwrap_or_else(|_| Value::String(raw.to_string())),
        Some(SchemaType::Number) => raw
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(raw.to_string())),
        Some(SchemaType::Boolean) => match raw {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            _ => Value::String(raw.to_string()),
        },
        Some(SchemaType::Object) | Some(SchemaType::Array) => {
            serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
        }
        _ => Value::String(raw.to_string()),
    }
}

fn body_schema<'a>(contents: &'a [HttpContent], content_type: Option<&str>) -> Option<&'a SchemaNode> {
    let content = match content_type {
        Some(content_type) => media_type::find_content(Some(content_type), contents),
        None => None,
    }
    .or_else(|| contents.first())?;
    content.schema.as_ref()
}

/// Subschema positions holding a single schema.
const SUBSCHEMA_KEYWORDS: [&str; 7] = ["items", "not", "additionalProperties", "if", "then", "else", "contains"];
/// Subschema positions holding a list of schemas.
const SUBSCHEMA_LIST_KEYWORDS: [&str; 5] = ["anyOf", "oneOf", "allOf", "prefixItems", "items"];
/// Subschema positions holding a name to schema map.
const SUBSCHEMA_MAP_KEYWORDS: [&str; 3] = ["properties", "definitions", "patternProperties"];

/// Serializes `schema` as a JSON Schema document with the meaning it was
/// loaded with: named sub-schemas always live under `definitions`, so
/// `#/$defs/` pointers are redirected there, and `nullable: true` becomes a
/// `null` member of the type union.
fn validation_document(schema: &SchemaNode) -> Result<Value, serde_json::Error> {
    let mut document = serde_json::to_value(schema)?;
    to_json_schema(&mut document);
    Ok(document)
}

fn to_json_schema(node: &mut Value) {
    let Value::Object(object) = node else {
        return;
    };

    if let Some(Value::String(reference)) = object.get_mut("$ref") {
        if let Some(rest) = reference.strip_prefix("#/$defs/") {
            let redirected = format!("#/definitions/{}", rest);
            *reference = redirected;
        }
    }

    if matches!(object.remove("nullable"), Some(Value::Bool(true))) {
        let widened = match object.get("type") {
            Some(Value::String(single)) if single != "null" => Some(json!([single, "null"])),
            Some(Value::Array(types)) if !types.iter().any(|t| t.as_str() == Some("null")) => {
                let mut types = types.clone();
                types.push(json!("null"));
                Some(Value::Array(types))
            }
            _ => None,
        };
        if let Some(widened) = widened {
            object.insert("type".to_string(), widened);
        }
        if let Some(Value::Array(values)) = object.get_mut("enum") {
            if !values.contains(&Value::Null) {
                values.push(Value::Null);
            }
        }
    }

    for key in SUBSCHEMA_KEYWORDS {
        if let Some(child) = object.get_mut(key) {
            to_json_schema(child);
        }
    }
    for key in SUBSCHEMA_LIST_KEYWORDS {
        if let Some(Value::Array(children)) = object.get_mut(key) {
            children.iter_mut().for_each(to_json_schema);
        }
    }
    for key in SUBSCHEMA_MAP_KEYWORDS {
        if let Some(Value::Object(children)) = object.get_mut(key) {
            children.values_mut().for_each(to_json_schema);
        }
    }
}

/// Checks `instance` against `schema`. Schemas that fail to compile are
/// logged and treated as accepting everything.
pub fn schema_violations(prefix: &str, schema: &SchemaNode, instance: &Value) -> Vec<Violation> {
    let schema_value = match validation_document(schema) {
        Ok(value) => value,
        Err(e) => {
            warn!("Failed to serialize schema for {}: {}", prefix, e);
            return Vec::new();
        }
    };

    let validator = match jsonschema::validator_for(&schema_value) {
        Ok(validator) => validator,
        Err(e) => {
            warn!("Skipping validation of {}, schema does not compile: {}", prefix, e);
            return Vec::new();
        }
    };

    validator
        .iter_errors(instance)
        .map(|error| {
            let pointer = error.instance_path.to_string();
            Violation::error(format!("{}{}", prefix, pointer), "schema", error.to_string())
        })
        .collect()
}
