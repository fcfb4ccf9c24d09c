//! Compilation of a normalized schema into a tree of closures
//!
//! The schema tree is walked once, up front. Each node becomes a boxed step
//! that, per call, reads its value from the input, checks it and writes the
//! result into a [`FlatMap`] under its fully-qualified path. Nothing on the
//! per-call path looks at the schema definition again.
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

use crate::path::FlatMap;
use crate::schema::{ArraySpec, FieldSpec, NormalizedSchema, ObjectSpec, SchemaNode, SchemaOptions};
use crate::types::is_empty;
use crate::validation::{ErrorKind, ValidationError, ValidationResult};
use serde_json::{Map, Value};
use std::fmt;

type Step = Box<dyn Fn(Option<&Value>, &mut Frame) -> ValidationResult<()> + Send + Sync>;

/// Per-call traversal state
struct Frame {
    path: String,
    out: FlatMap,
    emit: bool,
}

impl Frame {
    fn new(emit: bool, capacity: usize) -> Self {
        Self {
            path: String::new(),
            out: FlatMap::with_capacity(if emit { capacity } else { 0 }),
            emit,
        }
    }

    fn enter_key(&mut self, key: &str) -> usize {
        let mark = self.path.len();
        if mark > 0 {
            self.path.push('.');
        }
        self.path.push_str(key);
        mark
    }

    fn enter_index(&mut self, index: usize) -> usize {
        let mark = self.path.len();
        self.path.push('[');
        self.path.push_str(&index.to_string());
        self.path.push(']');
        mark
    }

    fn leave(&mut self, mark: usize) {
        self.path.truncate(mark);
    }

    fn emit(&mut self, value: Value) {
        if self.emit {
            self.out.insert(self.path.clone(), value);
        }
    }
}

/// Reusable validation routine built from a [`NormalizedSchema`]
pub struct Validator {
    root: Step,
    field_count: usize,
    options: SchemaOptions,
}

impl Validator {
    /// Compile `schema` once
    pub fn compile(schema: &NormalizedSchema, options: SchemaOptions) -> Self {
        let field_count = schema.field_count();
        log::debug!(
            "Compiling schema with {} fields (coerce: {}, partial: {})",
            field_count,
            options.coerce,
            options.partial
        );
        Self {
            root: object_step(schema.root(), options, true),
            field_count,
            options,
        }
    }

    /// Run the compiled steps against `data`, stopping at the first violation
    ///
    /// With coercion disabled the returned map is always empty.
    pub fn run(&self, data: &Value) -> ValidationResult<FlatMap> {
        let mut frame = Frame::new(self.options.coerce, self.field_count);
        (self.root)(Some(data), &mut frame)?;
        Ok(frame.out)
    }

    pub fn options(&self) -> SchemaOptions {
        self.options
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("field_count", &self.field_count)
            .field("options", &self.options)
            .finish()
    }
}

fn node_step(node: &SchemaNode, options: SchemaOptions) -> Step {
    match node {
        SchemaNode::Field(field) => field_step(field.clone(), options),
        SchemaNode::Object(object) => object_step(object, options, false),
        SchemaNode::Array(array) => array_step(array, options),
    }
}

fn field_step(field: FieldSpec, options: SchemaOptions) -> Step {
    Box::new(move |value: Option<&Value>, frame: &mut Frame| {
        let Some(value) = value else {
            // default first: required only fires when nothing was filled in
            if let Some(default) = field.default_value().filter(|_| field.coerce()) {
                frame.emit(default.resolve());
                return Ok(());
            }
            if field.is_required() && !options.partial {
                return Err(field.required_error(&frame.path, &Value::Null));
            }
            return Ok(());
        };

        if field.is_required() && field.is_empty_value(value) {
            return Err(field.required_error(&frame.path, value));
        }

        let output = field
            .descriptor()
            .coerce_and_validate(&field, value, &frame.path)?;
        if !field.is_empty_value(&output) {
            field.check_constraints(&output, &frame.path)?;
        }
        frame.emit(output);
        Ok(())
    })
}

fn object_step(object: &ObjectSpec, options: SchemaOptions, root: bool) -> Step {
    let children: Vec<(String, Step)> = object
        .fields()
        .iter()
        .map(|(key, node)| (key.clone(), node_step(node, options)))
        .collect();
    let passthrough = object.is_passthrough();

    Box::new(move |value: Option<&Value>, frame: &mut Frame| {
        // anything other than an object counts as a missing container
        let input = value.and_then(Value::as_object);

        if let Some(input) = input {
            if passthrough && frame.emit {
                let extra: Map<String, Value> = input
                    .iter()
                    .filter(|(key, _)| !children.iter().any(|(name, _)| name == *key))
                    .map(|(key, item)| (key.clone(), item.clone()))
                    .collect();
                frame.emit(Value::Object(extra));
            } else if !root {
                frame.emit(Value::Object(Map::new()));
            }
        }

        for (key, step) in &children {
            let mark = frame.enter_key(key);
            step(input.and_then(|input| input.get(key)), frame)?;
            frame.leave(mark);
        }
        Ok(())
    })
}

fn array_step(array: &ArraySpec, options: SchemaOptions) -> Step {
    let item = node_step(array.item(), options);
    let object_items = matches!(array.item(), SchemaNode::Object(_));

    Box::new(move |value: Option<&Value>, frame: &mut Frame| match value {
        None => Ok(()),
        Some(value) if is_empty(value) => {
            frame.emit(value.clone());
            Ok(())
        }
        Some(Value::Array(items)) => {
            frame.emit(Value::Array(Vec::new()));
            for (index, element) in items.iter().enumerate() {
                let mark = frame.enter_index(index);
                if object_items && !element.is_object() {
                    // every index is written so elements keep their positions
                    if !is_empty(element) {
                        return Err(ValidationError::new(
                            ErrorKind::Object,
                            frame.path.as_str(),
                            format!("Field \"{}\" must be an object", frame.path),
                            element.clone(),
                        ));
                    }
                    frame.emit(element.clone());
                } else {
                    item(Some(element), frame)?;
                }
                frame.leave(mark);
            }
            Ok(())
        }
        Some(other) => Err(ValidationError::new(
            ErrorKind::Array,
            frame.path.as_str(),
            format!("Field \"{}\" must be an array", frame.path),
            other.clone(),
        )),
    })
}
