//! Schema-wide options
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

use serde::{Deserialize, Serialize};

/// Options fixed when a schema is built
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaOptions {
    /// Coerce values and produce output; when false, `validate` only checks
    /// and hands the input back unchanged
    pub coerce: bool,
    /// Skip `required` checks for absent fields
    pub partial: bool,
}

impl Default for SchemaOptions {
    fn default() -> Self {
        Self {
            coerce: true,
            partial: false,
        }
    }
}

impl SchemaOptions {
    /// Check without coercing or building output
    pub fn validate_only() -> Self {
        Self {
            coerce: false,
            ..Self::default()
        }
    }

    /// Coerce and tolerate missing required fields
    pub fn partial() -> Self {
        Self {
            partial: true,
            ..Self::default()
        }
    }

    pub fn with_coerce(mut self, coerce: bool) -> Self {
        self.coerce = coerce;
        self
    }

    pub fn with_partial(mut self, partial: bool) -> Self {
        self.partial = partial;
        self
    }
}
