use super::example_generator::{generate, generate_static, generate_with_rng};
use crate::domain::{MockError, SchemaNode};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::{json, Value};

fn schema(value: Value) -> SchemaNode {
    serde_json::from_value(value).unwrap()
}

#[test]
fn test_default_wins_over_examples_and_enum() {
    let schema = schema(json!({
        "type": "string",
        "default": "JJ",
        "examples": ["WW"],
        "enum": ["A", "B"]
    }));
    assert_eq!(generate_static(&schema).unwrap(), json!("JJ"));
    assert_eq!(generate(&schema).unwrap(), json!("JJ"));
}

#[test]
fn test_explicit_null_default_is_kept() {
    let schema = schema(json!({ "type": "integer", "default": null }));
    assert_eq!(generate_static(&schema).unwrap(), Value::Null);
}

#[test]
fn test_examples_then_single_example_then_enum() {
    let with_examples = schema(json!({ "type": "string", "examples": ["WW", "XX"], "example": "YY" }));
    assert_eq!(generate_static(&with_examples).unwrap(), json!("WW"));

    let with_example = schema(json!({ "type": "string", "example": "YY", "enum": ["A"] }));
    assert_eq!(generate_static(&with_example).unwrap(), json!("YY"));

    let with_enum = schema(json!({ "type": "string", "enum": ["completed", "pending"] }));
    assert_eq!(generate(&with_enum).unwrap(), json!("completed"));
}

#[test]
fn test_static_object_includes_every_property() {
    let schema = schema(json!({
        "type": "object",
        "required": ["name"],
        "properties": {
            "name": { "type": "string" },
            "email": { "type": "string", "format": "email" },
            "deposit": { "type": "number" },
            "age": { "type": "integer" },
            "active": { "type": "boolean" },
            "tags": { "type": "array", "items": { "type": "string" } },
            "address": {
                "type": "object",
                "properties": { "city": { "type": "string", "default": "Oslo" } }
            }
        }
    }));

    assert_eq!(
        generate_static(&schema).unwrap(),
        json!({
            "name": "string",
            "email": "user@example.com",
            "deposit": 0,
            "age": 0,
            "active": true,
            "tags": ["string"],
            "address": { "city": "Oslo" }
        })
    );
}

#[test]
fn test_array_without_items_is_empty() {
    let schema = schema(json!({ "type": "array" }));
    assert_eq!(generate_static(&schema).unwrap(), json!([]));
}

#[test]
fn test_nullable_and_untyped_yield_null() {
    assert_eq!(generate_static(&schema(json!({ "type": "string", "nullable": true }))).unwrap(), Value::Null);
    assert_eq!(generate_static(&schema(json!({ "type": ["integer", "null"] }))).unwrap(), Value::Null);
    assert_eq!(generate_static(&schema(json!({}))).unwrap(), Value::Null);
}

#[test]
fn test_combinators_use_first_branch() {
    let any_of = schema(json!({ "anyOf": [{ "type": "integer", "examples": [1958] }, { "type": "string" }] }));
    assert_eq!(generate_static(&any_of).unwrap(), json!(1958));

    let one_of = schema(json!({ "oneOf": [{ "type": "string" }, { "type": "integer" }] }));
    assert_eq!(generate_static(&one_of).unwrap(), json!("string"));

    let all_of = schema(json!({ "allOf": [{ "type": "string" }, { "default": "hello" }] }));
    assert_eq!(generate_static(&all_of).unwrap(), json!("string"));
}

#[test]
fn test_local_references_resolve() {
    let schema = schema(json!({
        "type": "object",
        "properties": {
            "owner": { "$ref": "#/definitions/Person" }
        },
        "definitions": {
            "Person": {
                "type": "object",
                "properties": { "middlename": { "type": "string", "examples": ["WW"] } }
            }
        }
    }));
    assert_eq!(
        generate_static(&schema).unwrap(),
        json!({ "owner": { "middlename": "WW" } })
    );
}

#[test]
fn test_unresolvable_reference_yields_null() {
    let schema = schema(json!({ "$ref": "#/definitions/Missing" }));
    assert_eq!(generate_static(&schema).unwrap(), Value::Null);
}

#[test]
fn test_circular_reference_fails() {
    let schema = schema(json!({
        "$ref": "#/definitions/Node",
        "definitions": {
            "Node": {
                "type": "object",
                "properties": { "next": { "$ref": "#/definitions/Node" } }
            }
        }
    }));
    let result = generate_static(&schema);
    assert!(matches!(result, Err(MockError::SynthesisFailure(_))));
    assert!(generate(&schema).is_err());
}

#[test]
fn test_static_generation_is_deterministic() {
    let schema = schema(json!({
        "type": "object",
        "properties": {
            "id": { "type": "string", "format": "uuid" },
            "at": { "type": "string", "format": "date-time" },
            "score": { "type": "number" }
        }
    }));
    assert_eq!(generate_static(&schema).unwrap(), generate_static(&schema).unwrap());
}

#[test]
fn test_seeded_generation_is_reproducible() {
    let schema = schema(json!({
        "type": "object",
        "properties": {
            "name": { "type": "string" },
            "count": { "type": "integer" },
            "email": { "type": "string", "format": "email" }
        }
    }));
    let first = generate_with_rng(&schema, StdRng::seed_from_u64(7)).unwrap();
    let second = generate_with_rng(&schema, StdRng::seed_from_u64(7)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_random_leaves_have_declared_types() {
    let schema = schema(json!({
        "type": "object",
        "properties": {
            "email": { "type": "string", "format": "email" },
            "id": { "type": "string", "format": "uuid" },
            "count": { "type": "integer" },
            "ratio": { "type": "number" },
            "flag": { "type": "boolean" }
        }
    }));

    for seed in 0..20 {
        let value = generate_with_rng(&schema, StdRng::seed_from_u64(seed)).unwrap();
        assert!(value["email"].as_str().unwrap().contains('@'));
        assert!(uuid::Uuid::parse_str(value["id"].as_str().unwrap()).is_ok());
        let count = value["count"].as_i64().unwrap();
        assert!((0..1000).contains(&count));
        assert!(value["ratio"].is_number());
        assert!(value["flag"].is_boolean());
    }
}

#[test]
fn test_random_byte_format_is_base64() {
    let schema = schema(json!({ "type": "string", "format": "byte" }));

    for seed in 0..10 {
        let value = generate_with_rng(&schema, StdRng::seed_from_u64(seed)).unwrap();
        let encoded = value.as_str().unwrap();
        let decoded =
            base64::Engine::decode(&base64::engine::general_purpose::STANDARD, encoded).unwrap();
        assert_eq!(decoded.len(), 12);
    }
}
