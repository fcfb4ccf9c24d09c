//! Authoring form of a schema definition
//!
//! A [`SchemaDef`] is what users write: bare type references, typed fields
//! carrying loosely-shaped constraints, nested objects and one-element arrays.
//! It can be built in Rust or parsed from JSON/YAML via [`SchemaDef::from_json`].
//! Nothing here is validated until the definition is normalized.
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

use super::node::{DefaultValue, Predicate, ValidateSpec};
use crate::error::SchemaError;
use crate::types::{TypeKind, TypeRef};
use regex::Regex;
use serde_json::{Map, Value};

/// Raw schema definition
#[derive(Debug, Clone)]
pub enum SchemaDef {
    /// Bare type reference, e.g. `String` or `"number"`
    Type(TypeRef),
    /// Typed field with constraints
    Field(FieldDef),
    /// Nested object, in declaration order
    Object(Vec<(String, SchemaDef)>),
    /// Array shorthand; must hold exactly one item schema
    Array(Vec<SchemaDef>),
}

impl SchemaDef {
    /// Build an object definition from `(name, definition)` pairs
    pub fn object<I, K, D>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, D)>,
        K: Into<String>,
        D: Into<SchemaDef>,
    {
        SchemaDef::Object(
            fields
                .into_iter()
                .map(|(key, def)| (key.into(), def.into()))
                .collect(),
        )
    }

    /// Build an array definition around a single item schema
    pub fn array(item: impl Into<SchemaDef>) -> Self {
        SchemaDef::Array(vec![item.into()])
    }

    /// Parse the pure-data form of a definition
    ///
    /// Strings are type references, one-element arrays are arrays, objects
    /// whose `type` key is a string are fields, and every other object is a
    /// nested object.
    pub fn from_json(value: &Value) -> Result<Self, SchemaError> {
        parse(value, "")
    }
}

fn child_path(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", path, key)
    }
}

fn parse(value: &Value, path: &str) -> Result<SchemaDef, SchemaError> {
    match value {
        Value::String(name) => Ok(SchemaDef::Type(TypeRef::Name(name.clone()))),
        Value::Array(items) => {
            let item_path = format!("{}[]", path);
            items
                .iter()
                .map(|item| parse(item, &item_path))
                .collect::<Result<Vec<_>, _>>()
                .map(SchemaDef::Array)
        }
        Value::Object(map) => match map.get("type") {
            Some(Value::String(type_name)) => parse_field(type_name, map, path),
            _ => map
                .iter()
                .map(|(key, def)| Ok((key.clone(), parse(def, &child_path(path, key))?)))
                .collect::<Result<Vec<_>, _>>()
                .map(SchemaDef::Object),
        },
        other => Err(SchemaError::definition(
            path,
            format!("expected a type name, an object or an array, found {}", other),
        )),
    }
}

fn parse_field(type_name: &str, map: &Map<String, Value>, path: &str) -> Result<SchemaDef, SchemaError> {
    let mut field = FieldDef::new(TypeRef::Name(type_name.to_string()));
    for (key, value) in map {
        match key.as_str() {
            "type" => {}
            "default" => field.default = Some(DefaultValue::Value(value.clone())),
            "validate" => {
                return Err(SchemaError::constraint(
                    path,
                    "validate",
                    "custom validators cannot be expressed in data; attach them with FieldDef::validate",
                ))
            }
            _ => {
                field.constraints.insert(key.clone(), value.clone());
            }
        }
    }
    Ok(SchemaDef::Field(field))
}

impl From<TypeKind> for SchemaDef {
    fn from(kind: TypeKind) -> Self {
        SchemaDef::Type(TypeRef::Kind(kind))
    }
}

impl From<TypeRef> for SchemaDef {
    fn from(type_ref: TypeRef) -> Self {
        SchemaDef::Type(type_ref)
    }
}

impl From<&str> for SchemaDef {
    fn from(name: &str) -> Self {
        SchemaDef::Type(TypeRef::from(name))
    }
}

impl From<FieldDef> for SchemaDef {
    fn from(field: FieldDef) -> Self {
        SchemaDef::Field(field)
    }
}

/// Every accepted shape of the `validate` constraint
#[derive(Debug, Clone)]
pub enum ValidateDef {
    /// Bare predicate
    Bare(Predicate),
    /// `[predicate, message]`
    WithMessage(Predicate, String),
    /// `{validator, message}`
    Spec(ValidateSpec),
    /// `[{validator, message}, message_override]`
    Override(ValidateSpec, String),
}

impl ValidateDef {
    /// Canonical `{validator, message}` form
    pub fn canonical(&self) -> ValidateSpec {
        match self {
            ValidateDef::Bare(validator) => ValidateSpec {
                validator: validator.clone(),
                message: None,
            },
            ValidateDef::WithMessage(validator, message) => ValidateSpec {
                validator: validator.clone(),
                message: Some(message.clone()),
            },
            ValidateDef::Spec(spec) => spec.clone(),
            ValidateDef::Override(spec, message) => ValidateSpec {
                validator: spec.validator.clone(),
                message: Some(message.clone()),
            },
        }
    }
}

impl From<ValidateSpec> for ValidateDef {
    fn from(spec: ValidateSpec) -> Self {
        ValidateDef::Spec(spec)
    }
}

impl From<Predicate> for ValidateDef {
    fn from(predicate: Predicate) -> Self {
        ValidateDef::Bare(predicate)
    }
}

/// Typed field definition
///
/// Constraints are kept exactly as written (`min: 0`, `min: [0, "too young"]`,
/// `enum: [[1, 2], "pick one"]` ...) and canonicalized during normalization.
#[derive(Debug, Clone)]
pub struct FieldDef {
    pub(crate) type_ref: TypeRef,
    pub(crate) constraints: Map<String, Value>,
    pub(crate) default: Option<DefaultValue>,
    pub(crate) validate: Option<ValidateDef>,
    pub(crate) pattern: Option<(Regex, Option<String>)>,
}

impl FieldDef {
    pub fn new(type_ref: impl Into<TypeRef>) -> Self {
        Self {
            type_ref: type_ref.into(),
            constraints: Map::new(),
            default: None,
            validate: None,
            pattern: None,
        }
    }

    pub fn type_ref(&self) -> &TypeRef {
        &self.type_ref
    }

    /// Constraints as written
    pub fn constraints(&self) -> &Map<String, Value> {
        &self.constraints
    }

    /// Set any constraint by key
    pub fn constraint(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.constraints.insert(key.into(), value.into());
        self
    }

    /// `true`, or `[true, "message"]`
    pub fn required(self, flag: impl Into<Value>) -> Self {
        self.constraint("required", flag)
    }

    pub fn min(self, bound: impl Into<Value>) -> Self {
        self.constraint("min", bound)
    }

    pub fn max(self, bound: impl Into<Value>) -> Self {
        self.constraint("max", bound)
    }

    pub fn min_length(self, length: impl Into<Value>) -> Self {
        self.constraint("minLength", length)
    }

    pub fn max_length(self, length: impl Into<Value>) -> Self {
        self.constraint("maxLength", length)
    }

    /// Pattern source, or `[pattern, "message"]`
    pub fn matches(self, pattern: impl Into<Value>) -> Self {
        self.constraint("match", pattern)
    }

    /// Precompiled pattern; takes precedence over a `match` constraint
    pub fn pattern(mut self, pattern: Regex, message: Option<String>) -> Self {
        self.pattern = Some((pattern, message));
        self
    }

    /// Allowed values, or `[values, "message"]`
    pub fn one_of(self, values: impl Into<Value>) -> Self {
        self.constraint("enum", values)
    }

    pub fn coerce(self, coerce: bool) -> Self {
        self.constraint("coerce", coerce)
    }

    pub fn trim(self) -> Self {
        self.constraint("trim", true)
    }

    pub fn lowercase(self) -> Self {
        self.constraint("lowercase", true)
    }

    pub fn uppercase(self) -> Self {
        self.constraint("uppercase", true)
    }

    pub fn message(self, message: impl Into<String>) -> Self {
        self.constraint("message", message.into())
    }

    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(DefaultValue::Value(value.into()));
        self
    }

    /// Default computed on every use
    pub fn default_with<F>(mut self, generator: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        self.default = Some(DefaultValue::generator(generator));
        self
    }

    /// Custom predicate in any of its accepted shapes
    pub fn validate(mut self, validate: impl Into<ValidateDef>) -> Self {
        self.validate = Some(validate.into());
        self
    }

    /// Shorthand for a bare predicate
    pub fn validate_fn<F>(self, predicate: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.validate(ValidateDef::Bare(Predicate::new(predicate)))
    }

    /// Shorthand for `[predicate, message]`
    pub fn validate_with_message<F>(self, predicate: F, message: impl Into<String>) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.validate(ValidateDef::WithMessage(Predicate::new(predicate), message.into()))
    }
}
