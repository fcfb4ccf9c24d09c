//! Loading schema definitions from files

use schemata_core::loader::load_schema_file;
use schemata_core::{Error, ErrorKind, SchemaError, SchemaOptions, TypeRegistry};
use serde_json::json;
use std::fs;
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_load_json_schema_file() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "user.json",
        r#"{
            "email": {"type": "string", "required": true, "lowercase": true, "match": "^[^@]+@[^@]+$"},
            "age": {"type": "int32", "min": 0},
            "roles": ["string"]
        }"#,
    );

    let schema = load_schema_file(&path, SchemaOptions::default(), &TypeRegistry::new()).unwrap();
    let out = schema
        .validate(json!({"email": "Ann@Example.com", "age": "31", "roles": ["admin"]}))
        .unwrap();
    assert_eq!(out, json!({"email": "ann@example.com", "age": 31, "roles": ["admin"]}));

    let err = schema.validate(json!({"age": 1})).unwrap_err();
    assert_eq!((err.kind, err.path.as_str()), (ErrorKind::Required, "email"));
}

#[test]
fn test_load_yaml_schema_file_keeps_declaration_order() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "order.yml",
        "zeta:\n  type: number\n  required: true\nalpha:\n  type: number\n  required: true\n",
    );

    let schema = load_schema_file(&path, SchemaOptions::default(), &TypeRegistry::new()).unwrap();
    let err = schema.validate(json!({})).unwrap_err();
    assert_eq!(err.path, "zeta");
}

#[test]
fn test_load_with_partial_options() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "p.yaml", "name: {type: string, required: true}\n");

    let schema = load_schema_file(&path, SchemaOptions::partial(), &TypeRegistry::new()).unwrap();
    assert_eq!(schema.validate(json!({})).unwrap(), json!({}));
}

#[test]
fn test_load_errors() {
    let dir = TempDir::new().unwrap();
    let registry = TypeRegistry::new();

    let missing = dir.path().join("missing.json");
    assert!(matches!(
        load_schema_file(&missing, SchemaOptions::default(), &registry),
        Err(Error::Io { .. })
    ));

    let toml = write(&dir, "schema.toml", "a = 1");
    assert!(matches!(
        load_schema_file(&toml, SchemaOptions::default(), &registry),
        Err(Error::UnsupportedFormat { .. })
    ));

    let unknown = write(&dir, "unknown.json", r#"{"a": "Money"}"#);
    let err = load_schema_file(&unknown, SchemaOptions::default(), &registry).unwrap_err();
    assert!(matches!(err, Error::Schema(SchemaError::UnknownType { .. })));
    assert_eq!(err.to_string(), "Unknown type: money");

    let broken = write(&dir, "broken.json", "{");
    assert!(matches!(
        load_schema_file(&broken, SchemaOptions::default(), &registry),
        Err(Error::Json { .. })
    ));
}
