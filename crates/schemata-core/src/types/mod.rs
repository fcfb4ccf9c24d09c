//! Type registry mapping type references to coercion contracts
//!
//! A type reference is either a [`TypeKind`] (the built-in, constructor-like
//! identifiers) or a case-insensitive name, including registered aliases.
//! Resolution happens once per field while a schema is normalized, so an
//! unknown type fails at construction rather than on the first `validate()`.
//!
//! The registry is an explicit value: build it once, extend it with
//! [`TypeRegistry::register_type`], then hand it to schema construction by
//! reference. Schemas keep `Arc` handles to the descriptors they resolved,
//! so later registrations never affect an already-built schema.
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

pub mod builtin;

use crate::error::SchemaError;
use crate::schema::FieldSpec;
use crate::validation::{ErrorKind, ValidationResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

pub use builtin::{is_blank, is_empty};

/// Built-in type identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeKind {
    String,
    Boolean,
    Number,
    Int32,
    Decimal128,
    Double,
    Date,
    Object,
    Array,
}

impl TypeKind {
    /// All built-in kinds in registration order
    pub const ALL: [TypeKind; 9] = [
        TypeKind::String,
        TypeKind::Boolean,
        TypeKind::Number,
        TypeKind::Int32,
        TypeKind::Decimal128,
        TypeKind::Double,
        TypeKind::Date,
        TypeKind::Object,
        TypeKind::Array,
    ];

    /// Display name of the type
    pub fn name(&self) -> &'static str {
        match self {
            TypeKind::String => "String",
            TypeKind::Boolean => "Boolean",
            TypeKind::Number => "Number",
            TypeKind::Int32 => "Int32",
            TypeKind::Decimal128 => "Decimal128",
            TypeKind::Double => "Double",
            TypeKind::Date => "Date",
            TypeKind::Object => "Object",
            TypeKind::Array => "Array",
        }
    }

    /// Canonical registry key
    pub fn key(&self) -> &'static str {
        match self {
            TypeKind::String => "string",
            TypeKind::Boolean => "boolean",
            TypeKind::Number => "number",
            TypeKind::Int32 => "int32",
            TypeKind::Decimal128 => "decimal128",
            TypeKind::Double => "double",
            TypeKind::Date => "date",
            TypeKind::Object => "object",
            TypeKind::Array => "array",
        }
    }

    /// Short alias accepted in string type references
    pub fn alias(&self) -> Option<&'static str> {
        match self {
            TypeKind::String => Some("str"),
            TypeKind::Boolean => Some("bool"),
            TypeKind::Number => Some("num"),
            TypeKind::Int32 => Some("int"),
            TypeKind::Decimal128 => Some("decimal"),
            _ => None,
        }
    }

    /// Error kind raised when a value does not fit this type
    pub fn error_kind(&self) -> ErrorKind {
        match self {
            TypeKind::String => ErrorKind::String,
            TypeKind::Boolean => ErrorKind::Boolean,
            TypeKind::Number => ErrorKind::Number,
            TypeKind::Int32 => ErrorKind::Int32,
            TypeKind::Decimal128 => ErrorKind::Decimal128,
            TypeKind::Double => ErrorKind::Double,
            TypeKind::Date => ErrorKind::Date,
            TypeKind::Object => ErrorKind::Object,
            TypeKind::Array => ErrorKind::Array,
        }
    }

    /// Noun phrase used in default messages ("must be {noun}")
    pub fn noun(&self) -> &'static str {
        match self {
            TypeKind::String => "a string",
            TypeKind::Boolean => "a boolean",
            TypeKind::Number => "a number",
            TypeKind::Int32 => "an integer",
            TypeKind::Decimal128 => "a decimal",
            TypeKind::Double => "a double",
            TypeKind::Date => "a valid date",
            TypeKind::Object => "an object",
            TypeKind::Array => "an array",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            TypeKind::Number | TypeKind::Int32 | TypeKind::Decimal128 | TypeKind::Double
        )
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Reference to a type as written in a schema definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRef {
    /// Built-in identifier
    Kind(TypeKind),
    /// Case-insensitive name or alias
    Name(String),
}

impl TypeRef {
    fn lookup_key(&self) -> String {
        match self {
            TypeRef::Kind(kind) => kind.key().to_string(),
            TypeRef::Name(name) => name.trim().to_lowercase(),
        }
    }
}

impl From<TypeKind> for TypeRef {
    fn from(kind: TypeKind) -> Self {
        TypeRef::Kind(kind)
    }
}

impl From<&str> for TypeRef {
    fn from(name: &str) -> Self {
        TypeRef::Name(name.to_string())
    }
}

impl From<String> for TypeRef {
    fn from(name: String) -> Self {
        TypeRef::Name(name)
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Kind(kind) => write!(f, "{}", kind),
            TypeRef::Name(name) => f.write_str(name),
        }
    }
}

/// Uniform coercion/validation contract behind every type
pub trait TypeContract: Send + Sync {
    /// Coerce `value` to the canonical form of the type (when the field
    /// allows it), check the type-level constraints, and return the value
    /// to write to the output.
    fn coerce_and_validate(
        &self,
        field: &FieldSpec,
        value: &Value,
        path: &str,
    ) -> ValidationResult<Value>;
}

impl TypeContract for TypeKind {
    fn coerce_and_validate(
        &self,
        field: &FieldSpec,
        value: &Value,
        path: &str,
    ) -> ValidationResult<Value> {
        builtin::coerce_and_validate(*self, field, value, path)
    }
}

/// Validator function supplied when registering a type
pub type TypeValidator =
    Arc<dyn Fn(&FieldSpec, &Value, &str) -> ValidationResult<Value> + Send + Sync>;

struct FnContract(TypeValidator);

impl TypeContract for FnContract {
    fn coerce_and_validate(
        &self,
        field: &FieldSpec,
        value: &Value,
        path: &str,
    ) -> ValidationResult<Value> {
        (self.0)(field, value, path)
    }
}

/// Canonical description of a resolvable type
pub struct TypeDescriptor {
    key: String,
    name: String,
    base: Option<TypeKind>,
    aliases: Vec<String>,
    coerce: bool,
    message: String,
    contract: Arc<dyn TypeContract>,
}

impl TypeDescriptor {
    fn builtin(kind: TypeKind) -> Self {
        Self {
            key: kind.key().to_string(),
            name: kind.name().to_string(),
            base: Some(kind),
            aliases: kind.alias().map(str::to_string).into_iter().collect(),
            coerce: true,
            message: format!("Field must be {}", kind.noun()),
            contract: Arc::new(kind),
        }
    }

    /// Canonical lowercase key
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Name as registered
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Built-in type this descriptor behaves like, if any
    pub fn base(&self) -> Option<TypeKind> {
        self.base
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// Whether fields of this type coerce by default
    pub fn coerce(&self) -> bool {
        self.coerce
    }

    /// Default error message template
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn coerce_and_validate(
        &self,
        field: &FieldSpec,
        value: &Value,
        path: &str,
    ) -> ValidationResult<Value> {
        self.contract.coerce_and_validate(field, value, path)
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("key", &self.key)
            .field("name", &self.name)
            .field("base", &self.base)
            .field("aliases", &self.aliases)
            .field("coerce", &self.coerce)
            .finish()
    }
}

/// Options accepted by [`TypeRegistry::register_type`]
#[derive(Clone, Default)]
pub struct TypeOptions {
    /// Coercion/validation function (required)
    pub validator: Option<TypeValidator>,
    /// Built-in type the new type behaves like (decides how bounds parse)
    pub base: Option<TypeKind>,
    /// Additional name the type resolves under
    pub alias: Option<String>,
    /// Default coercion for fields of this type; `None` means enabled
    pub coerce: Option<bool>,
    /// Default error message
    pub message: Option<String>,
}

impl TypeOptions {
    /// Create options around a validator function
    pub fn new<F>(validator: F) -> Self
    where
        F: Fn(&FieldSpec, &Value, &str) -> ValidationResult<Value> + Send + Sync + 'static,
    {
        Self {
            validator: Some(Arc::new(validator)),
            ..Self::default()
        }
    }

    pub fn with_base(mut self, base: TypeKind) -> Self {
        self.base = Some(base);
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn with_coerce(mut self, coerce: bool) -> Self {
        self.coerce = Some(coerce);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Mapping from type references to descriptors
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    /// Keyed by lowercase name and lowercase alias
    types: HashMap<String, Arc<TypeDescriptor>>,
}

impl TypeRegistry {
    /// Create a registry holding the built-in types
    pub fn new() -> Self {
        let mut types = HashMap::new();
        for kind in TypeKind::ALL {
            let descriptor = Arc::new(TypeDescriptor::builtin(kind));
            if let Some(alias) = kind.alias() {
                types.insert(alias.to_string(), Arc::clone(&descriptor));
            }
            types.insert(kind.key().to_string(), descriptor);
        }
        Self { types }
    }

    /// Resolve a type reference to its descriptor
    pub fn resolve(&self, type_ref: &TypeRef) -> Result<Arc<TypeDescriptor>, SchemaError> {
        let key = type_ref.lookup_key();
        self.types
            .get(&key)
            .cloned()
            .ok_or(SchemaError::UnknownType { name: key })
    }

    /// Whether a name or alias resolves
    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(&name.trim().to_lowercase())
    }

    /// Canonical names of every registered type, sorted
    pub fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .types
            .iter()
            .filter(|(key, descriptor)| key.as_str() == descriptor.key())
            .map(|(_, descriptor)| descriptor.name())
            .collect();
        names.sort_unstable();
        names
    }

    /// Register a new type under `name` (and optionally an alias)
    pub fn register_type(
        &mut self,
        name: &str,
        options: TypeOptions,
    ) -> Result<Arc<TypeDescriptor>, SchemaError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SchemaError::InvalidTypeName);
        }

        let key = name.to_lowercase();
        if self.types.contains_key(&key) {
            return Err(SchemaError::DuplicateType {
                name: name.to_string(),
            });
        }

        let validator = options
            .validator
            .ok_or_else(|| SchemaError::MissingValidator {
                name: name.to_string(),
            })?;

        let alias = options
            .alias
            .map(|alias| alias.trim().to_lowercase())
            .filter(|alias| !alias.is_empty() && *alias != key);
        if let Some(alias) = &alias {
            if self.types.contains_key(alias) {
                return Err(SchemaError::DuplicateType {
                    name: alias.clone(),
                });
            }
        }

        let descriptor = Arc::new(TypeDescriptor {
            key: key.clone(),
            name: name.to_string(),
            base: options.base,
            aliases: alias.iter().cloned().collect(),
            coerce: options.coerce.unwrap_or(true),
            message: options
                .message
                .unwrap_or_else(|| format!("Field must be a valid {}", name)),
            contract: Arc::new(FnContract(validator)),
        });

        if let Some(alias) = alias {
            self.types.insert(alias, Arc::clone(&descriptor));
        }
        self.types.insert(key, Arc::clone(&descriptor));
        log::debug!("Registered type '{}'", name);

        Ok(descriptor)
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
