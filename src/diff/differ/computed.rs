//! The unknown check: values deferred to apply time.

use anyhow::Result;

use crate::diff::change::{Change, Renderer};
use crate::diff::mask::Mask;
use crate::diff::value::Value;

use super::{compute_change, SchemaKind};

pub(super) fn check(value: &Value, kind: SchemaKind<'_>) -> Result<Option<Change>> {
    if !value.is_unknown() {
        return Ok(None);
    }

    // The after value is null while unknown; forcing it explicit keeps the
    // leaf rule from reading this as a delete.
    let mut value = value.clone();
    value.after_explicit = true;

    if value.before.is_null() {
        return Ok(Some(value.as_change(Renderer::Computed { before: None })));
    }

    // With a before value present, diff the before side on its own and let
    // the renderer show it flowing into (known after apply). Nested types
    // expand the unknown scalar over their declared attributes so those
    // children render as computed instead of deleted.
    let child_unknown = match kind {
        SchemaKind::NestedType(nested) => Mask::all_keys(nested.attributes.keys()),
        SchemaKind::NestedAttributes(attributes) => Mask::all_keys(attributes.keys()),
        _ => Mask::default(),
    };

    let before_value = Value {
        before: value.before.clone(),
        before_sensitive: value.before_sensitive.clone(),
        unknown: child_unknown,
        ..Value::default()
    };
    let before_change = compute_change(&before_value, kind)?;

    Ok(Some(value.as_change(Renderer::Computed {
        before: Some(Box::new(before_change)),
    })))
}
