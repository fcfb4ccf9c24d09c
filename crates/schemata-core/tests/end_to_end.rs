//! End-to-end validation through the public `Schema` API

use schemata_core::{
    ErrorKind, FieldDef, Schema, SchemaDef, SchemaOptions, TypeKind, ValidateSpec,
};
use serde_json::{json, Value};

fn schema(def: SchemaDef) -> Schema {
    Schema::new(def, SchemaOptions::default()).unwrap()
}

fn schema_json(def: Value) -> Schema {
    Schema::from_json(&def, SchemaOptions::default(), &Default::default()).unwrap()
}

#[test]
fn test_nested_defaults_and_coercion() {
    let schema = schema(SchemaDef::object([
        (
            "name",
            SchemaDef::object([
                ("first", FieldDef::new(TypeKind::String).default("A")),
                ("last", FieldDef::new(TypeKind::String).default("B")),
            ]),
        ),
        ("age", FieldDef::new(TypeKind::Number).default(18).into()),
    ]));

    let out = schema
        .validate(json!({"name": {"last": "D"}, "age": "20"}))
        .unwrap();
    assert_eq!(out, json!({"name": {"first": "A", "last": "D"}, "age": 20}));

    let out = schema.validate(json!({})).unwrap();
    assert_eq!(out, json!({"name": {"first": "A", "last": "B"}, "age": 18}));
}

#[test]
fn test_range_messages_and_kinds() {
    let schema = schema_json(json!({
        "age": {"type": "Number", "min": [0, "too young"], "max": 120}
    }));

    let err = schema.validate(json!({"age": -1})).unwrap_err();
    assert_eq!(err.message, "too young");
    assert_eq!(err.kind, ErrorKind::Min);

    let err = schema.validate(json!({"age": 150})).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Max);
    assert_eq!(err.path, "age");
    assert_eq!(err.value, json!(150));
    assert_eq!(err.to_string(), "Field \"age\" must be <= 120");

    assert_eq!(schema.validate(json!({"age": 0})).unwrap(), json!({"age": 0}));
    assert_eq!(schema.validate(json!({"age": 120})).unwrap(), json!({"age": 120}));
}

#[test]
fn test_array_elements_fail_in_index_order() {
    let strict = schema(SchemaDef::object([(
        "tags",
        SchemaDef::array(FieldDef::new(TypeKind::Number).coerce(false)),
    )]));
    let err = strict.validate(json!({"tags": [1, "2", true]})).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Number);
    assert_eq!(err.path, "tags[1]");
    assert_eq!(err.value, json!("2"));

    let coercing = schema(SchemaDef::object([("tags", SchemaDef::array(TypeKind::Number))]));
    assert_eq!(
        coercing.validate(json!({"tags": [1, "2", true]})).unwrap(),
        json!({"tags": [1, 2, 1]})
    );
    let err = coercing.validate(json!({"tags": [1, "x", "y"]})).unwrap_err();
    assert_eq!(err.path, "tags[1]");
}

#[test]
fn test_enum_membership() {
    let schema = schema_json(json!({"n": {"type": "number", "enum": [1, 2, 3]}}));
    assert_eq!(schema.validate(json!({"n": "2"})).unwrap(), json!({"n": 2}));

    let err = schema.validate(json!({"n": 4})).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Enum);
    assert_eq!(err.message, "Field \"n\" must be one of: 1, 2, 3");

    let words = schema_json(json!({"s": {"type": "string", "enum": [["a", "b"], "pick a or b"]}}));
    assert_eq!(words.validate(json!({"s": "c"})).unwrap_err().message, "pick a or b");
}

#[test]
fn test_fail_fast_reports_first_declared_field() {
    let schema = schema(SchemaDef::object([
        ("b", FieldDef::new(TypeKind::Number).required(true)),
        ("a", FieldDef::new(TypeKind::Number).required(true)),
    ]));
    let err = schema.validate(json!({"a": "x"})).unwrap_err();
    assert_eq!(err.path, "b");
    assert_eq!(err.kind, ErrorKind::Required);
}

#[test]
fn test_required_and_default_ordering() {
    let schema = schema(SchemaDef::object([(
        "role",
        FieldDef::new(TypeKind::String).required(true).default("user"),
    )]));
    assert_eq!(schema.validate(json!({})).unwrap(), json!({"role": "user"}));

    // present but empty is not defaulted
    let err = schema.validate(json!({"role": ""})).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Required);
    let err = schema.validate(json!({"role": null})).unwrap_err();
    assert_eq!(err.message, "Field \"role\" is required");
}

#[test]
fn test_default_generator_runs_per_call() {
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    let counter = Arc::new(AtomicU64::new(0));
    let seen = Arc::clone(&counter);
    let schema = schema(SchemaDef::object([(
        "seq",
        FieldDef::new(TypeKind::Number).default_with(move || json!(seen.fetch_add(1, Ordering::SeqCst))),
    )]));

    assert_eq!(schema.validate(json!({})).unwrap(), json!({"seq": 0}));
    assert_eq!(schema.validate(json!({})).unwrap(), json!({"seq": 1}));
    assert_eq!(schema.validate(json!({"seq": 9})).unwrap(), json!({"seq": 9}));
    assert_eq!(counter.load(Ordering::SeqCst), 2);
}

#[test]
fn test_partial_mode() {
    let schema = Schema::new(
        SchemaDef::object([
            ("name", FieldDef::new(TypeKind::String).required(true)),
            ("age", FieldDef::new(TypeKind::Number).required(true)),
        ]),
        SchemaOptions::partial(),
    )
    .unwrap();

    assert_eq!(schema.validate(json!({"age": "3"})).unwrap(), json!({"age": 3}));
    let err = schema.validate(json!({"name": ""})).unwrap_err();
    assert_eq!((err.kind, err.path.as_str()), (ErrorKind::Required, "name"));
}

#[test]
fn test_validate_only_mode() {
    let schema = Schema::new(
        SchemaDef::object([
            ("n", FieldDef::new(TypeKind::Number).default(5)),
            ("s", FieldDef::new(TypeKind::String).trim()),
        ]),
        SchemaOptions::validate_only(),
    )
    .unwrap();

    let input = json!({"s": "  untouched  ", "other": 1});
    assert_eq!(schema.validate(input.clone()).unwrap(), input);

    let err = schema.validate(json!({"n": "5"})).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Number);
}

#[test]
fn test_passthrough_objects_keep_unknown_keys() {
    let schema = schema(SchemaDef::object([(
        "meta",
        SchemaDef::object([("stats", SchemaDef::object([("count", TypeKind::Int32)]))]),
    )]));

    let out = schema
        .validate(json!({
            "meta": {"stats": {"count": "4", "dropped": true}, "note": "kept"},
            "top": [1, 2]
        }))
        .unwrap();
    assert_eq!(
        out,
        json!({"meta": {"stats": {"count": 4}, "note": "kept"}, "top": [1, 2]})
    );
}

#[test]
fn test_typed_objects_drop_unknown_keys() {
    let schema = schema(SchemaDef::object([("safe", TypeKind::String)]));
    let out = schema
        .validate(json!({"safe": "ok", "__proto__": {"polluted": true}}))
        .unwrap();
    assert_eq!(out, json!({"safe": "ok"}));
}

#[test]
fn test_proto_keys_stay_ordinary_properties() {
    let schema = schema(SchemaDef::object([(
        "outer",
        SchemaDef::object([("inner", SchemaDef::object([("x", "number")]))]),
    )]));
    let out = schema
        .validate(json!({"__proto__": {"polluted": true}, "outer": {"__proto__": 1}}))
        .unwrap();
    assert_eq!(out["__proto__"], json!({"polluted": true}));
    assert_eq!(out["outer"]["__proto__"], json!(1));
    assert!(json!({}).get("polluted").is_none());
}

#[test]
fn test_empty_containers_survive() {
    let schema = schema(SchemaDef::object([
        ("tags", SchemaDef::array(TypeKind::String)),
        ("profile", SchemaDef::object([("bio", TypeKind::String)])),
        ("n", SchemaDef::from(TypeKind::Number)),
    ]));
    assert_eq!(
        schema.validate(json!({"tags": [], "profile": {}})).unwrap(),
        json!({"tags": [], "profile": {}})
    );
    assert_eq!(schema.validate(json!({"n": 1})).unwrap(), json!({"n": 1}));
}

#[test]
fn test_arrays_of_objects() {
    let schema = schema_json(json!({
        "items": [{
            "id": {"type": "string", "required": true},
            "qty": {"type": "int", "default": 1, "min": 1}
        }]
    }));

    let out = schema
        .validate(json!({"items": [{"id": "a"}, {"id": "b", "qty": "3"}]}))
        .unwrap();
    assert_eq!(out, json!({"items": [{"id": "a", "qty": 1}, {"id": "b", "qty": 3}]}));

    let err = schema
        .validate(json!({"items": [{"id": "a", "qty": 0}]}))
        .unwrap_err();
    assert_eq!((err.kind, err.path.as_str()), (ErrorKind::Min, "items[0].qty"));
}

#[test]
fn test_arrays_of_objects_keep_element_positions() {
    let schema = schema(SchemaDef::object([(
        "items",
        SchemaDef::array(SchemaDef::object([("id", "string")])),
    )]));

    assert_eq!(
        schema.validate(json!({"items": [{"id": "a"}, null]})).unwrap(),
        json!({"items": [{"id": "a"}, null]})
    );
    assert_eq!(
        schema.validate(json!({"items": [null, {"id": "a"}, ""]})).unwrap(),
        json!({"items": [null, {"id": "a"}, ""]})
    );

    let err = schema.validate(json!({"items": ["x", 5]})).unwrap_err();
    assert_eq!((err.kind, err.path.as_str()), (ErrorKind::Object, "items[0]"));
    assert_eq!(err.message, "Field \"items[0]\" must be an object");

    let err = schema.validate(json!({"items": [{"id": "a"}, 5]})).unwrap_err();
    assert_eq!((err.kind, err.path.as_str()), (ErrorKind::Object, "items[1]"));
}

#[test]
fn test_nested_arrays() {
    let schema = schema(SchemaDef::object([(
        "matrix",
        SchemaDef::array(SchemaDef::array(TypeKind::Int32)),
    )]));
    assert_eq!(
        schema.validate(json!({"matrix": [["1", 2], [], [3]]})).unwrap(),
        json!({"matrix": [[1, 2], [], [3]]})
    );
    let err = schema.validate(json!({"matrix": [[1], [2.5]]})).unwrap_err();
    assert_eq!((err.kind, err.path.as_str()), (ErrorKind::Int32, "matrix[1][0]"));
}

#[test]
fn test_custom_validate_shapes() {
    let even = |value: &Value| value.as_i64().map_or(false, |n| n % 2 == 0);

    let bare = schema(SchemaDef::object([("n", FieldDef::new(TypeKind::Number).validate_fn(even))]));
    let err = bare.validate(json!({"n": 3})).unwrap_err();
    assert_eq!(err.kind, ErrorKind::User);
    assert_eq!(err.message, "Field \"n\" failed custom validation");
    assert_eq!(bare.validate(json!({"n": "4"})).unwrap(), json!({"n": 4}));

    let with_message = schema(SchemaDef::object([(
        "n",
        FieldDef::new(TypeKind::Number).validate_with_message(even, "must be even"),
    )]));
    assert_eq!(with_message.validate(json!({"n": 3})).unwrap_err().message, "must be even");

    let spec = ValidateSpec::new(even, Some("spec message".to_string()));
    let overridden = schema(SchemaDef::object([(
        "n",
        FieldDef::new(TypeKind::Number)
            .validate(schemata_core::ValidateDef::Override(spec, "override".to_string())),
    )]));
    assert_eq!(overridden.validate(json!({"n": 3})).unwrap_err().message, "override");

    // empty values skip custom predicates
    assert_eq!(bare.validate(json!({"n": null})).unwrap(), json!({"n": null}));
}

#[test]
fn test_check_order_enum_match_validate() {
    let schema = schema(SchemaDef::object([(
        "code",
        FieldDef::new(TypeKind::String)
            .one_of(json!(["AB", "CD", "x"]))
            .matches(json!(["^[A-Z]+$", "letters only"]))
            .validate_with_message(|v| v != &json!("CD"), "CD is retired"),
    )]));

    assert_eq!(schema.validate(json!({"code": "zz"})).unwrap_err().kind, ErrorKind::Enum);
    assert_eq!(schema.validate(json!({"code": "x"})).unwrap_err().message, "letters only");
    assert_eq!(schema.validate(json!({"code": "CD"})).unwrap_err().message, "CD is retired");
    assert!(schema.validate(json!({"code": "AB"})).is_ok());
}

#[test]
fn test_field_message_overrides_defaults() {
    let schema = schema_json(json!({
        "email": {"type": "string", "required": true, "match": "@", "message": "bad email"}
    }));
    assert_eq!(schema.validate(json!({})).unwrap_err().message, "bad email");
    assert_eq!(schema.validate(json!({"email": "nope"})).unwrap_err().message, "bad email");
}

#[test]
fn test_string_transforms_and_lengths() {
    let schema = schema_json(json!({
        "code": {"type": "string", "trim": true, "uppercase": true, "minLength": 2, "max_length": [4, "too long"]}
    }));
    assert_eq!(schema.validate(json!({"code": "  ab "})).unwrap(), json!({"code": "AB"}));
    assert_eq!(schema.validate(json!({"code": " a "})).unwrap_err().kind, ErrorKind::MinLength);
    assert_eq!(schema.validate(json!({"code": "abcde"})).unwrap_err().message, "too long");
}

#[test]
fn test_boolean_and_date_fields() {
    let schema = schema_json(json!({
        "active": "bool",
        "at": {"type": "date", "min": "2020-01-01", "max": "2020-12-31T23:59:59Z"}
    }));

    let out = schema.validate(json!({"active": "yes", "at": "2020-06-01"})).unwrap();
    assert_eq!(out, json!({"active": true, "at": "2020-06-01T00:00:00.000Z"}));

    let err = schema.validate(json!({"active": "maybe"})).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Boolean);

    let err = schema.validate(json!({"at": "2019-12-31"})).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Min);
    assert_eq!(err.message, "Field \"at\" must be after 2020-01-01T00:00:00.000Z");
}

#[test]
fn test_date_enum_matches_coerced_dates() {
    let schema = schema_json(json!({"at": {"type": "date", "enum": ["2020-01-01", "2021-01-01"]}}));
    assert_eq!(
        schema.validate(json!({"at": "2020-01-01"})).unwrap(),
        json!({"at": "2020-01-01T00:00:00.000Z"})
    );
    assert_eq!(schema.validate(json!({"at": "2020-01-02"})).unwrap_err().kind, ErrorKind::Enum);
}

#[test]
fn test_object_field_type() {
    let schema = schema(SchemaDef::object([
        ("o", SchemaDef::from(TypeKind::Object)),
        ("list", SchemaDef::from(TypeKind::Array)),
    ]));
    assert_eq!(
        schema.validate(json!({"o": {"deep": [1]}, "list": [1, "a"]})).unwrap(),
        json!({"o": {"deep": [1]}, "list": [1, "a"]})
    );
    assert_eq!(schema.validate(json!({"o": null})).unwrap(), json!({"o": null}));
    assert_eq!(schema.validate(json!({"o": [1]})).unwrap_err().kind, ErrorKind::Object);
    assert_eq!(schema.validate(json!({"list": "x"})).unwrap_err().message, "Field \"list\" must be an array");
}

#[test]
fn test_validation_error_serializes() {
    let schema = schema(SchemaDef::object([("n", TypeKind::Int32)]));
    let err = schema.validate(json!({"n": "abc"})).unwrap_err();
    assert_eq!(
        serde_json::to_value(&err).unwrap(),
        json!({"kind": "int32", "message": "Field \"n\" must be an integer", "path": "n", "value": "abc"})
    );
}

#[test]
fn test_concurrent_validation() {
    let schema = schema(SchemaDef::object([
        ("id", SchemaDef::from(FieldDef::new(TypeKind::Int32).required(true))),
        ("tags", SchemaDef::array(TypeKind::String)),
    ]));

    std::thread::scope(|scope| {
        for worker in 0..4 {
            let schema = &schema;
            scope.spawn(move || {
                for i in 0..100 {
                    let out = schema
                        .validate(json!({"id": (worker * 100 + i).to_string(), "tags": [i]}))
                        .unwrap();
                    assert_eq!(out, json!({"id": worker * 100 + i, "tags": [i.to_string()]}));
                }
            });
        }
    });
}
