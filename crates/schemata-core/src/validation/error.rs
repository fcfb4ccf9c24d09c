//! Validation error types raised by compiled schemas
//!
//! Every rejection carries a [`ErrorKind`] discriminator so callers can branch
//! on the failure programmatically instead of matching message text.
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

use serde::{Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Discriminator for a validation failure
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Required value missing or empty
    Required,
    String,
    Boolean,
    Number,
    Int32,
    Decimal128,
    Double,
    Date,
    Object,
    Array,
    /// Below the inclusive lower bound
    Min,
    /// Above the inclusive upper bound
    Max,
    MinLength,
    MaxLength,
    /// Not a member of the declared enumeration
    Enum,
    /// Pattern did not match
    Match,
    /// Custom `validate` predicate returned false
    User,
    /// Raised by a registered type under its own name
    Type(String),
}

impl ErrorKind {
    /// Returns the lowercase discriminator string
    pub fn as_str(&self) -> &str {
        match self {
            ErrorKind::Required => "required",
            ErrorKind::String => "string",
            ErrorKind::Boolean => "boolean",
            ErrorKind::Number => "number",
            ErrorKind::Int32 => "int32",
            ErrorKind::Decimal128 => "decimal128",
            ErrorKind::Double => "double",
            ErrorKind::Date => "date",
            ErrorKind::Object => "object",
            ErrorKind::Array => "array",
            ErrorKind::Min => "min",
            ErrorKind::Max => "max",
            ErrorKind::MinLength => "minlength",
            ErrorKind::MaxLength => "maxlength",
            ErrorKind::Enum => "enum",
            ErrorKind::Match => "match",
            ErrorKind::User => "user",
            ErrorKind::Type(name) => name,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ErrorKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// First constraint violation found while validating a value
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[error("{message}")]
pub struct ValidationError {
    /// What kind of rule was violated
    pub kind: ErrorKind,
    /// Human-readable message, possibly overridden by the schema author
    pub message: String,
    /// Fully-qualified path of the offending field (e.g. `tags[1]`)
    pub path: String,
    /// The offending value as seen by the failing check
    pub value: Value,
}

impl ValidationError {
    /// Create a new validation error
    pub fn new<P, M>(kind: ErrorKind, path: P, message: M, value: Value) -> Self
    where
        P: Into<String>,
        M: Into<String>,
    {
        Self {
            kind,
            message: message.into(),
            path: path.into(),
            value,
        }
    }

    /// Create a `required` error
    pub fn required<P, M>(path: P, message: M, value: Value) -> Self
    where
        P: Into<String>,
        M: Into<String>,
    {
        Self::new(ErrorKind::Required, path, message, value)
    }

    /// Create a `user` error for a failed custom predicate
    pub fn user<P, M>(path: P, message: M, value: Value) -> Self
    where
        P: Into<String>,
        M: Into<String>,
    {
        Self::new(ErrorKind::User, path, message, value)
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn value(&self) -> &Value {
        &self.value
    }
}

/// Result type for validation operations
pub type ValidationResult<T> = Result<T, ValidationError>;
