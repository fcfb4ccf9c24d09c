//! Normalization of authored definitions into a [`NormalizedSchema`]
//!
//! One depth-first walk resolves every type reference through the registry,
//! expands every shorthand constraint into its canonical form, compiles
//! patterns and parses date bounds. Any problem is reported here as a
//! [`SchemaError`], never later from `validate()`.
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

use super::def::{FieldDef, SchemaDef};
use super::node::{
    ArraySpec, Bound, DefaultValue, EnumSpec, FieldSpec, Flag, MatchSpec, NormalizedSchema,
    ObjectSpec, SchemaNode,
};
use super::options::SchemaOptions;
use crate::error::SchemaError;
use crate::types::builtin::{date_from_millis, format_date, parse_date};
use crate::types::{TypeDescriptor, TypeKind, TypeRegistry};
use regex::Regex;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;

/// Normalize a root definition, which must be an object
pub fn normalize(
    def: &SchemaDef,
    options: &SchemaOptions,
    registry: &TypeRegistry,
) -> Result<NormalizedSchema, SchemaError> {
    let normalizer = Normalizer { options, registry };
    match def {
        SchemaDef::Object(fields) => Ok(NormalizedSchema {
            root: normalizer.object(fields, "")?,
        }),
        _ => Err(SchemaError::definition("", "the root schema must be an object")),
    }
}

/// Normalize a single typed field definition
#[cfg(test)]
pub(crate) fn normalize_field(
    def: &FieldDef,
    options: &SchemaOptions,
    registry: &TypeRegistry,
    path: &str,
) -> Result<FieldSpec, SchemaError> {
    Normalizer { options, registry }.field(def, path)
}

struct Normalizer<'a> {
    options: &'a SchemaOptions,
    registry: &'a TypeRegistry,
}

impl Normalizer<'_> {
    fn node(&self, def: &SchemaDef, path: &str) -> Result<SchemaNode, SchemaError> {
        match def {
            SchemaDef::Type(type_ref) => {
                let descriptor = self.registry.resolve(type_ref)?;
                Ok(SchemaNode::Field(self.bare_field(descriptor)))
            }
            SchemaDef::Field(field) => self.field(field, path).map(SchemaNode::Field),
            SchemaDef::Object(fields) => self.object(fields, path).map(SchemaNode::Object),
            SchemaDef::Array(items) => {
                if items.len() != 1 {
                    return Err(SchemaError::ArrayArity {
                        path: path.to_string(),
                        found: items.len(),
                    });
                }
                let item = self.node(&items[0], &format!("{}[]", path))?;
                Ok(SchemaNode::Array(ArraySpec {
                    item: Box::new(item),
                }))
            }
        }
    }

    fn object(&self, fields: &[(String, SchemaDef)], path: &str) -> Result<ObjectSpec, SchemaError> {
        let mut seen = HashSet::new();
        let mut nodes = Vec::with_capacity(fields.len());

        for (name, def) in fields {
            let child = if path.is_empty() {
                name.clone()
            } else {
                format!("{}.{}", path, name)
            };
            if name.is_empty() || name.contains(['.', '[', ']']) {
                return Err(SchemaError::definition(
                    child,
                    "field names must be non-empty and must not contain '.', '[' or ']'",
                ));
            }
            if !seen.insert(name.as_str()) {
                return Err(SchemaError::definition(child, "field is declared twice"));
            }
            nodes.push((name.clone(), self.node(def, &child)?));
        }

        let passthrough = !nodes
            .iter()
            .any(|(_, node)| matches!(node, SchemaNode::Field(_)));

        Ok(ObjectSpec {
            fields: nodes,
            passthrough,
        })
    }

    fn bare_field(&self, descriptor: Arc<TypeDescriptor>) -> FieldSpec {
        let mut field = FieldSpec::new(descriptor);
        field.coerce = self.options.coerce && field.descriptor.coerce();
        field
    }

    fn field(&self, def: &FieldDef, path: &str) -> Result<FieldSpec, SchemaError> {
        let descriptor = self.registry.resolve(def.type_ref())?;
        let dated = descriptor.base() == Some(TypeKind::Date);
        let mut field = self.bare_field(descriptor);

        for (key, value) in def.constraints() {
            match canonical_key(key) {
                Some("coerce") => field.coerce = as_bool(value, path, key)?,
                Some("required") => {
                    let (flag, msg) = split_flag(value, path, key)?;
                    field.required = Some(Flag::new(as_bool(&flag, path, key)?, msg));
                }
                Some("min") => field.min = Some(bound(value, dated, path, key)?),
                Some("max") => field.max = Some(bound(value, dated, path, key)?),
                Some("minLength") => field.min_length = Some(length(value, path, key)?),
                Some("maxLength") => field.max_length = Some(length(value, path, key)?),
                Some("match") => field.pattern = Some(pattern(value, path)?),
                Some("enum") => field.allowed = Some(allowed(value, path, key)?),
                Some("trim") => field.trim = as_bool(value, path, key)?,
                Some("lowercase") => field.lowercase = as_bool(value, path, key)?,
                Some("uppercase") => field.uppercase = as_bool(value, path, key)?,
                Some("message") => {
                    field.message = Some(
                        value
                            .as_str()
                            .ok_or_else(|| SchemaError::constraint(path, key, "expected a string"))?
                            .to_string(),
                    )
                }
                Some("default") => field.default = Some(DefaultValue::Value(value.clone())),
                _ => log::warn!("Ignoring unknown constraint '{}' on field '{}'", key, path),
            }
        }

        if dated && field.coerce {
            if let Some(allowed) = &mut field.allowed {
                canonical_dates(&mut allowed.values);
            }
        }

        if let Some(default) = &def.default {
            field.default = Some(default.clone());
        }
        if let Some(validate) = &def.validate {
            field.validate = Some(validate.canonical());
        }
        if let Some((regex, msg)) = &def.pattern {
            field.pattern = Some(MatchSpec {
                value: regex.clone(),
                msg: msg.clone(),
            });
        }

        Ok(field)
    }
}

fn canonical_key(key: &str) -> Option<&'static str> {
    let key = match key {
        "coerce" => "coerce",
        "required" => "required",
        "min" => "min",
        "max" => "max",
        "minLength" | "min_length" | "minlength" => "minLength",
        "maxLength" | "max_length" | "maxlength" => "maxLength",
        "match" => "match",
        "enum" => "enum",
        "trim" => "trim",
        "lowercase" => "lowercase",
        "uppercase" => "uppercase",
        "message" => "message",
        "default" => "default",
        _ => return None,
    };
    Some(key)
}

/// Split `value`, `[value, message]` or `{flag, msg}` into its parts
fn split_flag(value: &Value, path: &str, key: &str) -> Result<(Value, Option<String>), SchemaError> {
    match value {
        Value::Array(parts) => match parts.as_slice() {
            [flag] => Ok((flag.clone(), None)),
            [flag, message] => Ok((flag.clone(), message_of(message, path, key)?)),
            _ => Err(SchemaError::constraint(
                path,
                key,
                "expected a value or a [value, message] pair",
            )),
        },
        Value::Object(map) if map.contains_key("flag") => Ok((
            map["flag"].clone(),
            message_of(map.get("msg").unwrap_or(&Value::Null), path, key)?,
        )),
        other => Ok((other.clone(), None)),
    }
}

fn message_of(value: &Value, path: &str, key: &str) -> Result<Option<String>, SchemaError> {
    match value {
        Value::Null => Ok(None),
        Value::String(message) => Ok(Some(message.clone())),
        _ => Err(SchemaError::constraint(path, key, "message must be a string")),
    }
}

fn as_bool(value: &Value, path: &str, key: &str) -> Result<bool, SchemaError> {
    value
        .as_bool()
        .ok_or_else(|| SchemaError::constraint(path, key, "expected a boolean"))
}

fn bound(value: &Value, dated: bool, path: &str, key: &str) -> Result<Flag<Bound>, SchemaError> {
    let (raw, msg) = split_flag(value, path, key)?;
    let parsed = match (&raw, dated) {
        (Value::String(text), true) => parse_date(text).map(Bound::Date),
        (Value::Number(n), true) => n.as_f64().and_then(date_from_millis).map(Bound::Date),
        (Value::Number(n), false) => n.as_f64().map(Bound::Number),
        _ => None,
    };
    parsed.map(|bound| Flag::new(bound, msg)).ok_or_else(|| {
        let expected = if dated { "a date" } else { "a number" };
        SchemaError::constraint(path, key, format!("expected {}, found {}", expected, raw))
    })
}

fn length(value: &Value, path: &str, key: &str) -> Result<Flag<usize>, SchemaError> {
    let (raw, msg) = split_flag(value, path, key)?;
    match raw.as_f64() {
        Some(n) if n >= 0.0 && n.fract() == 0.0 => Ok(Flag::new(n as usize, msg)),
        _ => Err(SchemaError::constraint(
            path,
            key,
            format!("expected a non-negative integer, found {}", raw),
        )),
    }
}

fn pattern(value: &Value, path: &str) -> Result<MatchSpec, SchemaError> {
    let (source, msg) = match value {
        Value::Object(map) if map.contains_key("value") => (
            map["value"].clone(),
            message_of(map.get("msg").unwrap_or(&Value::Null), path, "match")?,
        ),
        other => split_flag(other, path, "match")?,
    };
    let source = source
        .as_str()
        .ok_or_else(|| SchemaError::constraint(path, "match", "expected a pattern string"))?;
    let regex = Regex::new(source).map_err(|e| SchemaError::InvalidPattern {
        path: path.to_string(),
        message: e.to_string(),
    })?;
    Ok(MatchSpec { value: regex, msg })
}

/// Rewrite allowed dates in the form coerced date fields produce
fn canonical_dates(values: &mut [Value]) {
    for value in values {
        let date = match value {
            Value::String(text) => parse_date(text),
            Value::Number(n) => n.as_f64().and_then(date_from_millis),
            _ => None,
        };
        if let Some(date) = date {
            *value = Value::String(format_date(&date));
        }
    }
}

/// `[a, b]`, `[[a, b], message]` or `{values, msg}`
fn allowed(value: &Value, path: &str, key: &str) -> Result<EnumSpec, SchemaError> {
    match value {
        Value::Array(parts) => match parts.as_slice() {
            [Value::Array(values), Value::String(message)] => Ok(EnumSpec {
                values: values.clone(),
                msg: Some(message.clone()),
            }),
            _ => Ok(EnumSpec {
                values: parts.clone(),
                msg: None,
            }),
        },
        Value::Object(map) => match map.get("values") {
            Some(Value::Array(values)) => Ok(EnumSpec {
                values: values.clone(),
                msg: message_of(map.get("msg").unwrap_or(&Value::Null), path, key)?,
            }),
            _ => Err(SchemaError::constraint(path, key, "expected a list of values")),
        },
        _ => Err(SchemaError::constraint(path, key, "expected a list of values")),
    }
}
