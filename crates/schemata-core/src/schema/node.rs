//! Canonical schema tree produced by normalization
//!
//! Every shorthand constraint form has already been expanded here: flags are
//! `{flag, msg}`, patterns are compiled, date bounds are parsed and each field
//! holds a resolved type descriptor. Nothing downstream looks at the authored
//! form again.
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

use crate::types::builtin::{format_date, is_blank, is_empty};
use crate::types::{TypeDescriptor, TypeKind};
use crate::validation::{ErrorKind, ValidationError, ValidationResult};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Constraint value with an optional message override
#[derive(Debug, Clone, PartialEq)]
pub struct Flag<T> {
    pub flag: T,
    pub msg: Option<String>,
}

impl<T> Flag<T> {
    pub fn new(flag: T, msg: Option<String>) -> Self {
        Self { flag, msg }
    }
}

/// Inclusive `min`/`max` bound
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bound {
    Number(f64),
    Date(DateTime<Utc>),
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bound::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            Bound::Number(n) => write!(f, "{}", n),
            Bound::Date(date) => f.write_str(&format_date(date)),
        }
    }
}

/// Compiled `match` pattern
#[derive(Debug, Clone)]
pub struct MatchSpec {
    pub value: Regex,
    pub msg: Option<String>,
}

impl MatchSpec {
    /// Test the pattern against the textual form of `value`
    pub fn is_match(&self, value: &Value) -> bool {
        match value {
            Value::String(s) => self.value.is_match(s),
            Value::Number(n) => self.value.is_match(&n.to_string()),
            Value::Bool(b) => self.value.is_match(&b.to_string()),
            _ => false,
        }
    }
}

/// Allowed values for `enum`
#[derive(Debug, Clone, PartialEq)]
pub struct EnumSpec {
    pub values: Vec<Value>,
    pub msg: Option<String>,
}

impl EnumSpec {
    /// Membership by value equality; numbers compare numerically
    pub fn contains(&self, value: &Value) -> bool {
        self.values.iter().any(|allowed| match (allowed, value) {
            (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
            _ => allowed == value,
        })
    }

    fn describe(&self) -> String {
        self.values
            .iter()
            .map(|value| match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Predicate used by `validate`
#[derive(Clone)]
pub struct Predicate(Arc<dyn Fn(&Value) -> bool + Send + Sync>);

impl Predicate {
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Self(Arc::new(predicate))
    }

    pub fn test(&self, value: &Value) -> bool {
        (self.0)(value)
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Predicate(..)")
    }
}

/// Canonical `validate` constraint
#[derive(Debug, Clone)]
pub struct ValidateSpec {
    pub validator: Predicate,
    pub message: Option<String>,
}

impl ValidateSpec {
    pub fn new<F>(validator: F, message: Option<String>) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Self {
            validator: Predicate::new(validator),
            message,
        }
    }
}

/// Value written when a field is absent
#[derive(Clone)]
pub enum DefaultValue {
    Value(Value),
    /// Invoked on every use, e.g. for timestamps
    Generator(Arc<dyn Fn() -> Value + Send + Sync>),
}

impl DefaultValue {
    pub fn generator<F>(generator: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        DefaultValue::Generator(Arc::new(generator))
    }

    pub fn resolve(&self) -> Value {
        match self {
            DefaultValue::Value(value) => value.clone(),
            DefaultValue::Generator(generator) => generator(),
        }
    }
}

impl fmt::Debug for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultValue::Value(value) => f.debug_tuple("Value").field(value).finish(),
            DefaultValue::Generator(_) => f.write_str("Generator(..)"),
        }
    }
}

/// Leaf of the schema tree: one typed field and its constraints
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub(crate) descriptor: Arc<TypeDescriptor>,
    pub(crate) coerce: bool,
    pub(crate) required: Option<Flag<bool>>,
    pub(crate) default: Option<DefaultValue>,
    pub(crate) min: Option<Flag<Bound>>,
    pub(crate) max: Option<Flag<Bound>>,
    pub(crate) min_length: Option<Flag<usize>>,
    pub(crate) max_length: Option<Flag<usize>>,
    pub(crate) pattern: Option<MatchSpec>,
    pub(crate) allowed: Option<EnumSpec>,
    pub(crate) validate: Option<ValidateSpec>,
    pub(crate) trim: bool,
    pub(crate) lowercase: bool,
    pub(crate) uppercase: bool,
    pub(crate) message: Option<String>,
}

impl FieldSpec {
    /// Bare field of the given type, coercing, with no constraints
    pub fn new(descriptor: Arc<TypeDescriptor>) -> Self {
        let coerce = descriptor.coerce();
        Self {
            descriptor,
            coerce,
            required: None,
            default: None,
            min: None,
            max: None,
            min_length: None,
            max_length: None,
            pattern: None,
            allowed: None,
            validate: None,
            trim: false,
            lowercase: false,
            uppercase: false,
            message: None,
        }
    }

    pub fn descriptor(&self) -> &Arc<TypeDescriptor> {
        &self.descriptor
    }

    pub fn coerce(&self) -> bool {
        self.coerce
    }

    pub fn required(&self) -> Option<&Flag<bool>> {
        self.required.as_ref()
    }

    pub fn is_required(&self) -> bool {
        self.required.as_ref().is_some_and(|required| required.flag)
    }

    pub fn default_value(&self) -> Option<&DefaultValue> {
        self.default.as_ref()
    }

    pub fn min(&self) -> Option<&Flag<Bound>> {
        self.min.as_ref()
    }

    pub fn max(&self) -> Option<&Flag<Bound>> {
        self.max.as_ref()
    }

    pub fn min_length(&self) -> Option<&Flag<usize>> {
        self.min_length.as_ref()
    }

    pub fn max_length(&self) -> Option<&Flag<usize>> {
        self.max_length.as_ref()
    }

    pub fn pattern(&self) -> Option<&MatchSpec> {
        self.pattern.as_ref()
    }

    /// The `enum` constraint
    pub fn allowed(&self) -> Option<&EnumSpec> {
        self.allowed.as_ref()
    }

    pub fn validate(&self) -> Option<&ValidateSpec> {
        self.validate.as_ref()
    }

    pub fn trim(&self) -> bool {
        self.trim
    }

    pub fn lowercase(&self) -> bool {
        self.lowercase
    }

    pub fn uppercase(&self) -> bool {
        self.uppercase
    }

    /// Field-level message override
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Pick the constraint message, then the field message, then the default
    pub fn message_for<F>(&self, specific: Option<&str>, default: F) -> String
    where
        F: FnOnce() -> String,
    {
        specific
            .or(self.message.as_deref())
            .map(str::to_string)
            .unwrap_or_else(default)
    }

    /// Emptiness as the field's type defines it
    pub fn is_empty_value(&self, value: &Value) -> bool {
        if self.descriptor.base() == Some(TypeKind::Boolean) {
            is_blank(value)
        } else {
            is_empty(value)
        }
    }

    pub(crate) fn required_error(&self, path: &str, value: &Value) -> ValidationError {
        let specific = self.required.as_ref().and_then(|required| required.msg.as_deref());
        ValidationError::required(
            path,
            self.message_for(specific, || format!("Field \"{}\" is required", path)),
            value.clone(),
        )
    }

    /// `enum`, then `match`, then `validate`
    pub(crate) fn check_constraints(&self, value: &Value, path: &str) -> ValidationResult<()> {
        if let Some(allowed) = &self.allowed {
            if !allowed.contains(value) {
                return Err(ValidationError::new(
                    ErrorKind::Enum,
                    path,
                    self.message_for(allowed.msg.as_deref(), || {
                        format!("Field \"{}\" must be one of: {}", path, allowed.describe())
                    }),
                    value.clone(),
                ));
            }
        }

        if let Some(pattern) = &self.pattern {
            if !pattern.is_match(value) {
                return Err(ValidationError::new(
                    ErrorKind::Match,
                    path,
                    self.message_for(pattern.msg.as_deref(), || {
                        format!("Field \"{}\" does not match required pattern", path)
                    }),
                    value.clone(),
                ));
            }
        }

        if let Some(validate) = &self.validate {
            if !validate.validator.test(value) {
                return Err(ValidationError::user(
                    path,
                    self.message_for(validate.message.as_deref(), || {
                        format!("Field \"{}\" failed custom validation", path)
                    }),
                    value.clone(),
                ));
            }
        }

        Ok(())
    }
}

/// Nested object: declared fields in declaration order
#[derive(Debug, Clone)]
pub struct ObjectSpec {
    pub(crate) fields: Vec<(String, SchemaNode)>,
    pub(crate) passthrough: bool,
}

impl ObjectSpec {
    pub fn fields(&self) -> &[(String, SchemaNode)] {
        &self.fields
    }

    pub fn get(&self, key: &str) -> Option<&SchemaNode> {
        self.fields
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, node)| node)
    }

    /// No immediate child is a typed field: undeclared input keys are kept
    pub fn is_passthrough(&self) -> bool {
        self.passthrough
    }
}

/// Array whose every element matches `item`
#[derive(Debug, Clone)]
pub struct ArraySpec {
    pub(crate) item: Box<SchemaNode>,
}

impl ArraySpec {
    pub fn item(&self) -> &SchemaNode {
        &self.item
    }
}

#[derive(Debug, Clone)]
pub enum SchemaNode {
    Field(FieldSpec),
    Object(ObjectSpec),
    Array(ArraySpec),
}

impl SchemaNode {
    /// Number of typed fields in this subtree
    pub fn field_count(&self) -> usize {
        match self {
            SchemaNode::Field(_) => 1,
            SchemaNode::Object(object) => {
                object.fields.iter().map(|(_, node)| node.field_count()).sum()
            }
            SchemaNode::Array(array) => array.item.field_count(),
        }
    }

    pub fn as_field(&self) -> Option<&FieldSpec> {
        match self {
            SchemaNode::Field(field) => Some(field),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectSpec> {
        match self {
            SchemaNode::Object(object) => Some(object),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ArraySpec> {
        match self {
            SchemaNode::Array(array) => Some(array),
            _ => None,
        }
    }
}

/// Root of a normalized schema; read-only once built
#[derive(Debug, Clone)]
pub struct NormalizedSchema {
    pub(crate) root: ObjectSpec,
}

impl NormalizedSchema {
    pub fn root(&self) -> &ObjectSpec {
        &self.root
    }

    /// Look up a node by dotted path (`name.first`, `tags[]` for items)
    pub fn node(&self, path: &str) -> Option<&SchemaNode> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut node = lookup(&self.root, first)?;
        for segment in segments {
            node = lookup(node.as_object()?, segment)?;
        }
        Some(node)
    }

    pub fn field_count(&self) -> usize {
        self.root
            .fields
            .iter()
            .map(|(_, node)| node.field_count())
            .sum()
    }
}

fn lookup<'a>(object: &'a ObjectSpec, segment: &str) -> Option<&'a SchemaNode> {
    let (name, depth) = match segment.find("[]") {
        Some(at) => (&segment[..at], segment[at..].matches("[]").count()),
        None => (segment, 0),
    };
    let mut node = object.get(name)?;
    for _ in 0..depth {
        node = node.as_array()?.item();
    }
    Some(node)
}
