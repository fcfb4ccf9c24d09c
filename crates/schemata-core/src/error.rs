//! Error types for the schemata core library
//!
//! Construction-time failures ([`SchemaError`]) are kept apart from
//! validation-time failures ([`ValidationError`]): the former surface from
//! schema construction and type registration, never from `validate()`.
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

use crate::validation::ValidationError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while building a schema or extending the type registry
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    /// Type reference has no mapping in the registry
    #[error("Unknown type: {name}")]
    UnknownType { name: String },

    /// Registered type name was empty
    #[error("Type name must be a non-empty string")]
    InvalidTypeName,

    /// Type name or alias already registered
    #[error("Type \"{name}\" already exists")]
    DuplicateType { name: String },

    /// Registration without a validator function
    #[error("Type \"{name}\" must have a validator function")]
    MissingValidator { name: String },

    /// `match` pattern failed to compile
    #[error("Invalid pattern for field \"{path}\": {message}")]
    InvalidPattern { path: String, message: String },

    /// Constraint value has the wrong shape for its key
    #[error("Invalid constraint \"{constraint}\" for field \"{path}\": {message}")]
    InvalidConstraint {
        path: String,
        constraint: String,
        message: String,
    },

    /// Array shorthand must wrap exactly one item schema
    #[error("Array schema at \"{path}\" must declare exactly one element, found {found}")]
    ArrayArity { path: String, found: usize },

    /// Structurally invalid definition
    #[error("Invalid schema definition at \"{path}\": {message}")]
    InvalidDefinition { path: String, message: String },
}

impl SchemaError {
    pub(crate) fn constraint(
        path: impl Into<String>,
        constraint: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        SchemaError::InvalidConstraint {
            path: path.into(),
            constraint: constraint.into(),
            message: message.into(),
        }
    }

    pub(crate) fn definition(path: impl Into<String>, message: impl Into<String>) -> Self {
        SchemaError::InvalidDefinition {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Main error type for schemata operations
#[derive(Error, Debug)]
pub enum Error {
    /// Schema construction failed
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Input rejected by a compiled schema
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// JSON parsing errors
    #[error("Failed to parse JSON schema definition: {source}")]
    Json {
        #[source]
        source: serde_json::Error,
    },

    /// YAML parsing errors
    #[error("Failed to parse YAML schema definition: {source}")]
    Yaml {
        #[source]
        source: serde_yaml::Error,
    },

    /// File I/O errors
    #[error("Failed to read schema file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Unsupported file format
    #[error("Unsupported file format for '{path}'. Expected .yaml, .yml, or .json")]
    UnsupportedFormat { path: PathBuf },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;
