//! Diffing of sequences.
//!
//! Plainly typed lists and sets align their elements with the LCS walk, so
//! unchanged elements keep their position and similar objects pair into
//! in-place updates. Nested lists and sets of blocks zip positionally:
//! each index is its own identity.

use std::collections::HashMap;

use anyhow::{Context, Result};

use crate::diff::action::Action;
use crate::diff::change::{Change, Renderer};
use crate::diff::lcs;
use crate::diff::value::Value;
use crate::schema::{Attribute, AttributeType, Block};

use super::{compute_change, SchemaKind};

pub(super) fn attribute_list(value: &Value, element_type: &AttributeType) -> Result<Change> {
    let (elements, current) = sequence_elements(value, element_type)?;
    Ok(Change::new(
        Renderer::List { elements },
        current,
        value.replace(),
    ))
}

pub(super) fn attribute_set(value: &Value, element_type: &AttributeType) -> Result<Change> {
    let (elements, current) = sequence_elements(value, element_type)?;
    Ok(Change::new(
        Renderer::Set { elements },
        current,
        value.replace(),
    ))
}

fn sequence_elements(
    value: &Value,
    element_type: &AttributeType,
) -> Result<(Vec<Change>, Action)> {
    let slice_value = value.as_slice()?;
    let mut current = value.default_action_for_iteration();

    let mut pairs = Vec::new();
    lcs::process(
        slice_value.before_items(),
        slice_value.after_items(),
        |_| element_type.is_object(),
        |before_ix, after_ix| pairs.push((before_ix, after_ix)),
    );

    let mut elements = Vec::new();
    for (before_ix, after_ix) in pairs {
        let child_value = slice_value.child(before_ix, after_ix);
        let child = compute_change(&child_value, SchemaKind::Type(element_type))
            .with_context(|| format!("element {}", before_ix.or(after_ix).unwrap_or(0)))?;
        current = current.combine(child.action);
        elements.push(child);
    }

    Ok((elements, current))
}

pub(super) fn attribute_tuple(value: &Value, element_types: &[AttributeType]) -> Result<Change> {
    let slice_value = value.as_slice()?;
    let mut current = value.default_action_for_iteration();

    let mut elements = Vec::new();
    for (ix, element_type) in element_types.iter().enumerate() {
        let child_value = slice_value.child(Some(ix), Some(ix));
        let child = compute_change(&child_value, SchemaKind::Type(element_type))
            .with_context(|| format!("element {}", ix))?;
        current = current.combine(child.action);
        elements.push(child);
    }

    Ok(Change::new(
        Renderer::List { elements },
        current,
        value.replace(),
    ))
}

pub(super) fn nested_list(
    value: &Value,
    attributes: &HashMap<String, Attribute>,
) -> Result<Change> {
    let (elements, current) = nested_elements(value, SchemaKind::NestedAttributes(attributes))?;
    Ok(Change::new(
        Renderer::NestedList { elements },
        current,
        value.replace(),
    ))
}

pub(super) fn nested_set(
    value: &Value,
    attributes: &HashMap<String, Attribute>,
) -> Result<Change> {
    let (elements, current) = nested_elements(value, SchemaKind::NestedAttributes(attributes))?;
    Ok(Change::new(
        Renderer::Set { elements },
        current,
        value.replace(),
    ))
}

pub(super) fn block_sequence(value: &Value, block_schema: &Block) -> Result<(Vec<Change>, Action)> {
    nested_elements(value, SchemaKind::Block(block_schema))
}

fn nested_elements(value: &Value, kind: SchemaKind<'_>) -> Result<(Vec<Change>, Action)> {
    let slice_value = value.as_slice()?;
    let mut current = value.default_action_for_iteration();

    let mut elements = Vec::new();
    let len = slice_value.before_len().max(slice_value.after_len());
    for ix in 0..len {
        let child_value = slice_value.child(Some(ix), Some(ix));
        let child = compute_change(&child_value, kind)
            .with_context(|| format!("element {}", ix))?;
        current = current.combine(child.action);
        elements.push(child);
    }

    Ok((elements, current))
}
