//! Schema-driven construction of the change tree.
//!
//! [`compute_change`] walks a [`Value`] and a schema node together. At
//! every node the unknown check runs first, then the sensitive check, and
//! only then does the node dispatch on its schema kind. Shape mismatches
//! between the value and the schema are errors carrying the offending path.

mod block;
mod computed;
mod list;
mod map;
mod object;
mod sensitive;

use std::collections::HashMap;

use anyhow::Result;

use crate::diff::change::{json, Change, PrimitiveType, Renderer};
use crate::diff::value::Value;
use crate::schema::{Attribute, AttributeType, Block, NestedType, NestingMode};

/// The part of the schema a value is being diffed against.
#[derive(Clone, Copy)]
pub enum SchemaKind<'a> {
    Type(&'a AttributeType),
    NestedType(&'a NestedType),
    NestedAttributes(&'a HashMap<String, Attribute>),
    Block(&'a Block),
}

/// Diff a value against an attribute's schema.
pub fn compute_change_for_attribute(value: &Value, attribute: &Attribute) -> Result<Change> {
    if let Some(nested) = &attribute.nested_type {
        return compute_change(value, SchemaKind::NestedType(nested));
    }
    match &attribute.attribute_type {
        Some(attribute_type) => compute_change(value, SchemaKind::Type(attribute_type)),
        None => compute_change(value, SchemaKind::Type(&AttributeType::Dynamic)),
    }
}

/// Diff an output change, which has no schema beyond its JSON shape.
pub fn compute_change_for_output(value: &Value) -> Result<Change> {
    let inner = compute_change(value, SchemaKind::Type(&AttributeType::Dynamic))?;
    let action = inner.action;
    let replace = inner.replace;
    Ok(Change::new(
        Renderer::Output {
            inner: Box::new(inner),
        },
        action,
        replace,
    ))
}

/// Diff a value against a schema node.
pub fn compute_change(value: &Value, kind: SchemaKind<'_>) -> Result<Change> {
    if let Some(change) = computed::check(value, kind)? {
        return Ok(change);
    }
    if let Some(change) = sensitive::check(value, kind)? {
        return Ok(change);
    }

    match kind {
        SchemaKind::Type(attribute_type) => compute_change_for_type(value, attribute_type),
        SchemaKind::NestedType(nested) => match nested.nesting_mode {
            NestingMode::Single | NestingMode::Group => {
                object::nested_object(value, &nested.attributes)
            }
            NestingMode::List => list::nested_list(value, &nested.attributes),
            NestingMode::Set => list::nested_set(value, &nested.attributes),
            NestingMode::Map => map::nested_map(value, &nested.attributes),
        },
        SchemaKind::NestedAttributes(attributes) => object::nested_object(value, attributes),
        SchemaKind::Block(block_schema) => block::compute(value, block_schema),
    }
}

fn compute_change_for_type(value: &Value, attribute_type: &AttributeType) -> Result<Change> {
    match attribute_type {
        AttributeType::Bool => Ok(primitive(value, PrimitiveType::Bool)),
        AttributeType::Number => Ok(primitive(value, PrimitiveType::Number)),
        AttributeType::String => Ok(primitive(value, PrimitiveType::String)),
        AttributeType::Dynamic => {
            let mut change = json::compute_change(&value.before, &value.after);
            change.replace = value.replace();
            Ok(change)
        }
        AttributeType::List(element_type) => list::attribute_list(value, element_type),
        AttributeType::Set(element_type) => list::attribute_set(value, element_type),
        AttributeType::Map(element_type) => map::attribute_map(value, element_type),
        AttributeType::Tuple(element_types) => list::attribute_tuple(value, element_types),
        AttributeType::Object(attribute_types) => object::attribute_object(value, attribute_types),
    }
}

fn primitive(value: &Value, ty: PrimitiveType) -> Change {
    value.as_change(Renderer::Primitive {
        before: value.before.clone(),
        after: value.after.clone(),
        ty,
    })
}
