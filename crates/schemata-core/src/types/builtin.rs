//! Built-in coercion and validation rules
//!
//! Each rule follows the same outline: empty values (`null`, `""`) pass
//! through unchanged unless the field is required; otherwise the value is
//! coerced to the canonical form when the field allows it, then checked
//! against the type and its bounds.
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

use super::TypeKind;
use crate::schema::{Bound, FieldSpec};
use crate::validation::{ErrorKind, ValidationError, ValidationResult};
use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde_json::{Number, Value};

const INT32_MIN: f64 = -2_147_483_648.0;
const INT32_MAX: f64 = 2_147_483_647.0;

const TRUE_WORDS: [&str; 3] = ["1", "true", "yes"];
const FALSE_WORDS: [&str; 3] = ["0", "false", "no"];

/// `null` and `""` are empty for every type
pub fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Boolean emptiness: also all-whitespace strings, never `false`
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Dispatch to the rule for `kind`
pub(crate) fn coerce_and_validate(
    kind: TypeKind,
    field: &FieldSpec,
    value: &Value,
    path: &str,
) -> ValidationResult<Value> {
    let empty = if kind == TypeKind::Boolean {
        is_blank(value)
    } else {
        is_empty(value)
    };
    if empty {
        if field.is_required() {
            return Err(field.required_error(path, value));
        }
        return Ok(value.clone());
    }

    match kind {
        TypeKind::String => coerce_string(field, value, path),
        TypeKind::Boolean => coerce_boolean(field, value, path),
        TypeKind::Number | TypeKind::Int32 | TypeKind::Decimal128 | TypeKind::Double => {
            coerce_numeric(kind, field, value, path)
        }
        TypeKind::Date => coerce_date(field, value, path),
        TypeKind::Object => match value {
            Value::Object(_) => Ok(value.clone()),
            _ => Err(type_error(kind, field, value, path)),
        },
        TypeKind::Array => match value {
            Value::Array(_) => Ok(value.clone()),
            _ => Err(type_error(kind, field, value, path)),
        },
    }
}

fn type_error(kind: TypeKind, field: &FieldSpec, value: &Value, path: &str) -> ValidationError {
    ValidationError::new(
        kind.error_kind(),
        path,
        field.message_for(None, || format!("Field \"{}\" must be {}", path, kind.noun())),
        value.clone(),
    )
}

fn coerce_string(field: &FieldSpec, value: &Value, path: &str) -> ValidationResult<Value> {
    let mut text = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) if field.coerce() => match n.as_f64() {
            // 1.0 reads as "1"
            Some(x) if n.is_f64() && x.fract() == 0.0 => number_value(x).to_string(),
            _ => n.to_string(),
        },
        Value::Bool(b) if field.coerce() => b.to_string(),
        _ => return Err(type_error(TypeKind::String, field, value, path)),
    };

    if field.coerce() {
        if field.trim() {
            text = text.trim().to_string();
        }
        if field.lowercase() {
            text = text.to_lowercase();
        }
        if field.uppercase() {
            text = text.to_uppercase();
        }
    }

    let length = text.chars().count();
    if let Some(min) = field.min_length() {
        if length < min.flag {
            return Err(ValidationError::new(
                ErrorKind::MinLength,
                path,
                field.message_for(min.msg.as_deref(), || {
                    format!("Field \"{}\" length must be >= {}", path, min.flag)
                }),
                Value::String(text),
            ));
        }
    }
    if let Some(max) = field.max_length() {
        if length > max.flag {
            return Err(ValidationError::new(
                ErrorKind::MaxLength,
                path,
                field.message_for(max.msg.as_deref(), || {
                    format!("Field \"{}\" length must be <= {}", path, max.flag)
                }),
                Value::String(text),
            ));
        }
    }

    Ok(Value::String(text))
}

fn coerce_boolean(field: &FieldSpec, value: &Value, path: &str) -> ValidationResult<Value> {
    match value {
        Value::Bool(_) => Ok(value.clone()),
        Value::Number(n) if field.coerce() => match n.as_f64() {
            Some(x) if x == 1.0 => Ok(Value::Bool(true)),
            Some(x) if x == 0.0 => Ok(Value::Bool(false)),
            _ => Err(type_error(TypeKind::Boolean, field, value, path)),
        },
        Value::String(s) if field.coerce() => {
            let word = s.to_lowercase();
            if TRUE_WORDS.contains(&word.as_str()) {
                Ok(Value::Bool(true))
            } else if FALSE_WORDS.contains(&word.as_str()) {
                Ok(Value::Bool(false))
            } else {
                Err(ValidationError::new(
                    ErrorKind::Boolean,
                    path,
                    field.message_for(None, || {
                        format!("Field \"{}\" value \"{}\" is not allowed for a boolean", path, s)
                    }),
                    value.clone(),
                ))
            }
        }
        _ => Err(type_error(TypeKind::Boolean, field, value, path)),
    }
}

fn coerce_numeric(
    kind: TypeKind,
    field: &FieldSpec,
    value: &Value,
    path: &str,
) -> ValidationResult<Value> {
    let (num, coerced) = match value {
        Value::Number(n) => match n.as_f64() {
            Some(x) => (x, false),
            None => return Err(type_error(kind, field, value, path)),
        },
        Value::String(s) if field.coerce() => match s.trim().parse::<f64>() {
            Ok(x) if !x.is_nan() => (x, true),
            _ => return Err(type_error(kind, field, value, path)),
        },
        Value::Bool(b) if field.coerce() => (if *b { 1.0 } else { 0.0 }, true),
        _ => return Err(type_error(kind, field, value, path)),
    };

    if !num.is_finite() {
        return Err(ValidationError::new(
            kind.error_kind(),
            path,
            field.message_for(None, || {
                format!("Field \"{}\" must be a valid finite {}", path, finite_noun(kind))
            }),
            value.clone(),
        ));
    }

    if kind == TypeKind::Int32 {
        if num.fract() != 0.0 {
            return Err(type_error(kind, field, value, path));
        }
        if !(INT32_MIN..=INT32_MAX).contains(&num) {
            return Err(ValidationError::new(
                ErrorKind::Int32,
                path,
                field.message_for(None, || {
                    format!(
                        "Field \"{}\" must be an integer between {} and {}",
                        path, INT32_MIN, INT32_MAX
                    )
                }),
                number_value(num),
            ));
        }
    }

    let output = if coerced { number_value(num) } else { value.clone() };

    if let Some(min) = field.min() {
        if let Bound::Number(bound) = min.flag {
            if num < bound {
                return Err(ValidationError::new(
                    ErrorKind::Min,
                    path,
                    field.message_for(min.msg.as_deref(), || {
                        format!("Field \"{}\" must be >= {}", path, min.flag)
                    }),
                    output,
                ));
            }
        }
    }
    if let Some(max) = field.max() {
        if let Bound::Number(bound) = max.flag {
            if num > bound {
                return Err(ValidationError::new(
                    ErrorKind::Max,
                    path,
                    field.message_for(max.msg.as_deref(), || {
                        format!("Field \"{}\" must be <= {}", path, max.flag)
                    }),
                    output,
                ));
            }
        }
    }

    Ok(output)
}

fn finite_noun(kind: TypeKind) -> &'static str {
    match kind {
        TypeKind::Decimal128 => "decimal",
        TypeKind::Double => "double",
        TypeKind::Int32 => "integer",
        _ => "number",
    }
}

fn coerce_date(field: &FieldSpec, value: &Value, path: &str) -> ValidationResult<Value> {
    let parsed = match value {
        Value::String(s) if field.coerce() => parse_date(s),
        Value::String(s) => DateTime::parse_from_rfc3339(s.trim())
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Value::Number(n) if field.coerce() => n.as_f64().and_then(date_from_millis),
        _ => None,
    };
    let date = parsed.ok_or_else(|| type_error(TypeKind::Date, field, value, path))?;

    let output = if field.coerce() {
        Value::String(format_date(&date))
    } else {
        value.clone()
    };

    if let Some(min) = field.min() {
        if let Bound::Date(bound) = min.flag {
            if date < bound {
                return Err(ValidationError::new(
                    ErrorKind::Min,
                    path,
                    field.message_for(min.msg.as_deref(), || {
                        format!("Field \"{}\" must be after {}", path, min.flag)
                    }),
                    output,
                ));
            }
        }
    }
    if let Some(max) = field.max() {
        if let Bound::Date(bound) = max.flag {
            if date > bound {
                return Err(ValidationError::new(
                    ErrorKind::Max,
                    path,
                    field.message_for(max.msg.as_deref(), || {
                        format!("Field \"{}\" must be before {}", path, max.flag)
                    }),
                    output,
                ));
            }
        }
    }

    Ok(output)
}

/// Parse the date forms accepted by coercion (all interpreted as UTC)
pub fn parse_date(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Interpret a number as milliseconds since the Unix epoch
pub fn date_from_millis(millis: f64) -> Option<DateTime<Utc>> {
    if !millis.is_finite() || millis.fract() != 0.0 {
        return None;
    }
    Utc.timestamp_millis_opt(millis as i64).single()
}

/// Canonical RFC 3339 form with millisecond precision
pub fn format_date(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// JSON number for a coerced value: integral values become integers
pub(crate) fn number_value(num: f64) -> Value {
    if num.fract() == 0.0 && num >= i64::MIN as f64 && num < i64::MAX as f64 {
        Value::Number(Number::from(num as i64))
    } else {
        Number::from_f64(num).map(Value::Number).unwrap_or(Value::Null)
    }
}
