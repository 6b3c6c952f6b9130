//! Diffing of maps.
//!
//! Maps diff over the union of before and after keys. Nested attribute
//! maps hand the parent's replace paths to their children unfiltered and
//! never flag the map node itself.

use std::collections::{BTreeMap, HashMap};

use anyhow::{Context, Result};

use crate::diff::action::Action;
use crate::diff::change::{Change, Renderer};
use crate::diff::value::Value;
use crate::schema::{Attribute, AttributeType, Block};

use super::{compute_change, SchemaKind};

pub(super) fn attribute_map(value: &Value, element_type: &AttributeType) -> Result<Change> {
    let map_value = value.as_map()?;
    let mut current = value.default_action_for_iteration();

    let mut elements = BTreeMap::new();
    for key in map_value.keys() {
        let child_value = map_value.child(key, false);
        let child = compute_change(&child_value, SchemaKind::Type(element_type))
            .with_context(|| format!("element {:?}", key))?;
        current = current.combine(child.action);
        elements.insert(key.to_string(), child);
    }

    Ok(Change::new(
        Renderer::Map { elements },
        current,
        value.replace(),
    ))
}

pub(super) fn nested_map(
    value: &Value,
    attributes: &HashMap<String, Attribute>,
) -> Result<Change> {
    let map_value = value.as_map()?;
    let mut current = value.default_action_for_iteration();

    let mut elements = BTreeMap::new();
    for key in map_value.keys() {
        let child_value = map_value.child(key, true);
        let child = compute_change(&child_value, SchemaKind::NestedAttributes(attributes))
            .with_context(|| format!("element {:?}", key))?;
        current = current.combine(child.action);
        elements.insert(key.to_string(), child);
    }

    Ok(Change::new(Renderer::Map { elements }, current, false))
}

pub(super) fn block_map(
    value: &Value,
    block_schema: &Block,
) -> Result<(BTreeMap<String, Change>, Action)> {
    let map_value = value.as_map()?;
    let mut current = value.default_action_for_iteration();

    let mut elements = BTreeMap::new();
    for key in map_value.keys() {
        let child_value = map_value.child(key, false);
        let child = compute_change(&child_value, SchemaKind::Block(block_schema))
            .with_context(|| format!("block {:?}", key))?;
        current = current.combine(child.action);
        elements.insert(key.to_string(), child);
    }

    Ok((elements, current))
}
