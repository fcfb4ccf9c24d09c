//! Schemata Core - schema-driven validation and coercion of JSON values
//!
//! A schema describes the expected shape, types and constraints of an object.
//! It is normalized and compiled once; the resulting [`Schema`] then checks
//! any number of inputs, coercing values to their canonical types, filling in
//! defaults, and either returning the normalized value or the first
//! violation as a [`ValidationError`].
//!
//! # Main Components
//!
//! - **Type Registry**: maps type references to coercion contracts, extensible at runtime
//! - **Normalizer**: expands authored definitions into a canonical schema tree
//! - **Compiler**: turns that tree into a reusable tree of closures
//! - **Path Reconstructor**: expands the flat `path -> value` output into nested values
//!
//! # Example
//!
//! ```rust
//! use schemata_core::{FieldDef, Schema, SchemaDef, SchemaOptions, TypeKind};
//! use serde_json::json;
//!
//! let schema = Schema::new(
//!     SchemaDef::object([
//!         ("name", SchemaDef::object([
//!             ("first", FieldDef::new(TypeKind::String).default("A")),
//!             ("last", FieldDef::new(TypeKind::String).default("B")),
//!         ])),
//!         ("age", SchemaDef::from(FieldDef::new(TypeKind::Number).default(18))),
//!     ]),
//!     SchemaOptions::default(),
//! )
//! .unwrap();
//!
//! let out = schema.validate(json!({"name": {"last": "D"}, "age": "20"})).unwrap();
//! assert_eq!(out, json!({"name": {"first": "A", "last": "D"}, "age": 20}));
//! ```
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

pub mod compile;
pub mod error;
pub mod loader;
pub mod path;
pub mod schema;
pub mod types;
pub mod validation;

// Re-export main types for convenience
pub use compile::Validator;
pub use error::{Error, Result, SchemaError};
pub use path::{flatten, reconstruct, FlatMap, Segment};
pub use schema::{
    FieldDef, FieldSpec, NormalizedSchema, Predicate, Schema, SchemaDef, SchemaNode,
    SchemaOptions, ValidateDef, ValidateSpec,
};
pub use types::{
    TypeContract, TypeDescriptor, TypeKind, TypeOptions, TypeRef, TypeRegistry, TypeValidator,
};
pub use validation::{ErrorKind, ValidationError, ValidationResult};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
