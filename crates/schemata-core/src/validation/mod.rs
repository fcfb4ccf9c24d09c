//! Validation-time error model
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

pub mod error;

pub use error::{ErrorKind, ValidationError, ValidationResult};
