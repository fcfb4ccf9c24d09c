//! Schema definitions, normalization and the compiled [`Schema`]
//!
//! A [`Schema`] is built once from a [`SchemaDef`] and [`SchemaOptions`]:
//! the definition is normalized against a [`TypeRegistry`] and compiled into
//! a [`Validator`]. Both are read-only afterwards, so a schema can be shared
//! across threads and validated against concurrently.
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

pub mod def;
pub mod node;
pub mod normalize;
pub mod options;

pub use def::{FieldDef, SchemaDef, ValidateDef};
pub use node::{
    ArraySpec, Bound, DefaultValue, EnumSpec, FieldSpec, Flag, MatchSpec, NormalizedSchema,
    ObjectSpec, Predicate, SchemaNode, ValidateSpec,
};
pub use options::SchemaOptions;

use crate::compile::Validator;
use crate::error::SchemaError;
use crate::path::FlatMap;
use crate::types::TypeRegistry;
use crate::validation::ValidationResult;
use serde_json::Value;

/// Compiled, reusable schema
#[derive(Debug)]
pub struct Schema {
    normalized: NormalizedSchema,
    validator: Validator,
}

impl Schema {
    /// Build a schema resolving types against the built-in registry
    pub fn new(def: impl Into<SchemaDef>, options: SchemaOptions) -> Result<Self, SchemaError> {
        Self::with_registry(def, options, &TypeRegistry::new())
    }

    /// Build a schema resolving types against `registry`
    ///
    /// The schema keeps its own handles to the resolved types; the registry
    /// can be extended or dropped afterwards.
    pub fn with_registry(
        def: impl Into<SchemaDef>,
        options: SchemaOptions,
        registry: &TypeRegistry,
    ) -> Result<Self, SchemaError> {
        let normalized = normalize::normalize(&def.into(), &options, registry)?;
        let validator = Validator::compile(&normalized, options);
        Ok(Self {
            normalized,
            validator,
        })
    }

    /// Build a schema from its pure-data form
    pub fn from_json(
        def: &Value,
        options: SchemaOptions,
        registry: &TypeRegistry,
    ) -> Result<Self, SchemaError> {
        Self::with_registry(SchemaDef::from_json(def)?, options, registry)
    }

    pub fn options(&self) -> SchemaOptions {
        self.validator.options()
    }

    pub fn normalized(&self) -> &NormalizedSchema {
        &self.normalized
    }

    /// Validate `data`, returning the coerced output
    ///
    /// With coercion disabled nothing is rewritten and `data` itself is
    /// handed back once it passes.
    pub fn validate(&self, data: Value) -> ValidationResult<Value> {
        let flat = self.validator.run(&data)?;
        if self.options().coerce {
            Ok(flat.into_value())
        } else {
            Ok(data)
        }
    }

    /// Validate `data` and return the flat `path -> value` output
    pub fn validate_flat(&self, data: &Value) -> ValidationResult<FlatMap> {
        self.validator.run(data)
    }
}

impl TryFrom<SchemaDef> for Schema {
    type Error = SchemaError;

    fn try_from(def: SchemaDef) -> Result<Self, Self::Error> {
        Schema::new(def, SchemaOptions::default())
    }
}
