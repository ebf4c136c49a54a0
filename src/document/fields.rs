//! Document field model.
//!
//! [`expand`] flattens a document into editable field descriptors;
//! [`collapse`] applies edited values back onto a copy of the document.
//!
//! # Expansion Order
//!
//! ```text
//! title: Hi                 title          (text)
//! authors:                  authors        (array)
//!   - name: Ann               authors.0    (object)
//!     site: a.dev               authors.0.name  (text)
//!                               authors.0.site  (text)
//! ```
//!
//! Container descriptors come before their children, children follow the
//! document's own key/element order.

use super::{
    infer::{FieldKind, infer},
    path::{self, FieldPath, key_text, untag},
};
use crate::{
    error::{EditorError, Result},
    log,
};
use serde::{Deserialize, Serialize};
use serde_yaml::{Number, Value};
use std::collections::BTreeMap;

/// Edited values keyed by the path they replace.
pub type Edits = BTreeMap<FieldPath, Value>;

/// One addressable value inside a document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDescriptor {
    pub path: FieldPath,
    pub name: String,
    pub kind: FieldKind,
    pub value: Value,
    /// A key on the path contains `.`, so the dotted form cannot round-trip.
    pub ambiguous: bool,
}

impl FieldDescriptor {
    /// True if no other descriptor lives below this one.
    pub fn is_leaf(&self) -> bool {
        match untag(&self.value) {
            Value::Sequence(seq) => seq.is_empty(),
            Value::Mapping(map) => map.is_empty(),
            _ => true,
        }
    }
}

// ============================================================================
// Expansion
// ============================================================================

/// Flatten `document` into descriptors in document order.
///
/// A root sequence yields one group per element, named `#1`, `#2`, ...; a
/// scalar root yields nothing.
pub fn expand(document: &Value) -> Vec<FieldDescriptor> {
    let mut fields = Vec::new();
    match untag(document) {
        Value::Mapping(_) => expand_children(document, &FieldPath::root(), &mut fields),
        Value::Sequence(seq) => {
            for (index, item) in seq.iter().enumerate() {
                let name = format!("#{}", index + 1);
                push_field(&mut fields, FieldPath::root().index(index), name, item);
            }
        }
        _ => {}
    }
    fields
}

/// Push a descriptor for `value` followed by everything below it.
fn push_field(fields: &mut Vec<FieldDescriptor>, path: FieldPath, name: String, value: &Value) {
    let ambiguous = path.is_ambiguous();
    if ambiguous {
        log!("fields"; "key in `{path}` contains '.', its dotted path is ambiguous");
    }
    fields.push(FieldDescriptor {
        kind: infer(&name, value),
        ambiguous,
        path: path.clone(),
        name,
        value: value.clone(),
    });
    expand_children(value, &path, fields);
}

fn expand_children(value: &Value, parent: &FieldPath, fields: &mut Vec<FieldDescriptor>) {
    match untag(value) {
        Value::Mapping(map) => {
            for (key, child) in map {
                let Some(name) = key_text(key) else {
                    log!("fields"; "skipping non-scalar key under `{parent}`");
                    continue;
                };
                push_field(fields, parent.key(name.clone()), name, child);
            }
        }
        Value::Sequence(seq) => {
            let base = parent.last().map(ToString::to_string).unwrap_or_default();
            for (index, child) in seq.iter().enumerate() {
                let name = format!("{base} #{}", index + 1);
                push_field(fields, parent.index(index), name, child);
            }
        }
        _ => {}
    }
}

// ============================================================================
// Collapse
// ============================================================================

/// Rebuild a document from `base` with `edits` applied.
///
/// `base` is deep-copied, so fields never surfaced as editable survive
/// unchanged. Edits target disjoint paths; their order does not matter.
///
/// # Errors
///
/// [`EditorError::InvalidPath`] if an edit does not address a location
/// inside `base`.
pub fn collapse(base: &Value, edits: &Edits) -> Result<Value> {
    let mut document = base.clone();
    for (path, value) in edits {
        path::set(&mut document, path, value.clone())?;
    }
    Ok(document)
}

// ============================================================================
// Input Coercion
// ============================================================================

/// Raw value collected from an editing control.
///
/// In JSON a string is [`FieldInput::Text`] and a boolean is
/// [`FieldInput::Checked`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FieldInput {
    /// Text typed into an input or widget.
    Text(String),
    /// Checkbox state.
    Checked(bool),
}

/// Convert collected input into a document value for a field of `kind`.
///
/// Numbers are parsed as `f64`; integral results that fit `i64` are stored
/// as integers so `3` does not come back as `3.0`.
///
/// # Errors
///
/// [`EditorError::ValidationFailure`] for unparsable numbers, or when the
/// input shape does not fit the kind (text for a checkbox, a checkbox for
/// a text field, anything for a container).
pub fn coerce(kind: FieldKind, input: FieldInput) -> Result<Value> {
    match (kind, input) {
        (FieldKind::Boolean, FieldInput::Checked(checked)) => Ok(Value::Bool(checked)),
        (FieldKind::Number, FieldInput::Text(text)) => parse_number(&text),
        (FieldKind::Markdown | FieldKind::Url | FieldKind::Text, FieldInput::Text(text)) => {
            Ok(Value::String(text))
        }
        (kind, input) => Err(EditorError::ValidationFailure(format!(
            "{input:?} cannot be stored in a {kind:?} field"
        ))),
    }
}

fn parse_number(text: &str) -> Result<Value> {
    let number: f64 = text
        .trim()
        .parse()
        .map_err(|_| EditorError::ValidationFailure(format!("`{text}` is not a number")))?;

    #[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
    let integral = number.fract() == 0.0 && number.abs() < i64::MAX as f64;
    if integral {
        Ok(Value::Number(Number::from(number as i64)))
    } else {
        Ok(Value::Number(Number::from(number)))
    }
}

// ============================================================================
// Tests
// ============================================================================
