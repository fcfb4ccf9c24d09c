//! Loading schema definitions from JSON and YAML files
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

use crate::error::{Error, Result};
use crate::schema::{Schema, SchemaDef, SchemaOptions};
use crate::types::TypeRegistry;
use serde_json::Value;
use std::path::Path;

/// Supported definition formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// JSON format (.json)
    Json,
    /// YAML format (.yaml, .yml)
    Yaml,
}

impl Format {
    /// Detect format from file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase)
            .as_deref()
        {
            Some("json") => Ok(Format::Json),
            Some("yaml") | Some("yml") => Ok(Format::Yaml),
            _ => Err(Error::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }
}

/// Parse definition text into a JSON value
pub fn parse_value(content: &str, format: Format) -> Result<Value> {
    match format {
        Format::Json => serde_json::from_str(content).map_err(|source| Error::Json { source }),
        Format::Yaml => {
            // through serde_yaml::Value so YAML errors keep their own variant
            let yaml: serde_yaml::Value =
                serde_yaml::from_str(content).map_err(|source| Error::Yaml { source })?;
            serde_json::to_value(yaml).map_err(|source| Error::Json { source })
        }
    }
}

/// Parse definition text into a [`SchemaDef`]
pub fn parse_definition(content: &str, format: Format) -> Result<SchemaDef> {
    let value = parse_value(content, format)?;
    Ok(SchemaDef::from_json(&value)?)
}

/// Read, parse and compile a schema file
pub fn load_schema_file(
    path: impl AsRef<Path>,
    options: SchemaOptions,
    registry: &TypeRegistry,
) -> Result<Schema> {
    let path = path.as_ref();
    let format = Format::from_path(path)?;
    let content = std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let def = parse_definition(&content, format)?;
    log::debug!("Loaded schema definition from {}", path.display());
    Ok(Schema::with_registry(def, options, registry)?)
}
