//! Diffing of blocks.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use serde_json::Value as Json;

use crate::diff::action::Action;
use crate::diff::change::{Change, Renderer};
use crate::diff::value::Value;
use crate::schema::{Block, NestingMode};

use super::{compute_change, compute_change_for_attribute, list, map, SchemaKind};

pub(super) fn compute(value: &Value, block_schema: &Block) -> Result<Change> {
    let block_value = value.as_map()?;
    let mut current = value.default_action_for_iteration();

    let mut attribute_keys: Vec<&String> = block_schema.attributes.keys().collect();
    attribute_keys.sort();

    let mut attributes = BTreeMap::new();
    for key in attribute_keys {
        let mut child_value = block_value.child(key, false);

        // Empty strings in blocks are considered null for legacy reasons;
        // the wire format cannot express null strings there yet.
        if child_value.before.as_str() == Some("") {
            child_value.before = Json::Null;
        }
        if child_value.after.as_str() == Some("") {
            child_value.after = Json::Null;
        }

        // Changes inside blocks are always implicit.
        child_value.before_explicit = false;
        child_value.after_explicit = false;

        let child = compute_change_for_attribute(&child_value, &block_schema.attributes[key])
            .with_context(|| format!("attribute {:?}", key))?;

        if child.action == Action::NoOp
            && child_value.before.is_null()
            && child_value.after.is_null()
        {
            // Null on both sides of a block is not recorded at all.
            continue;
        }

        current = current.combine(child.action);
        attributes.insert(key.clone(), child);
    }

    let mut block_type_keys: Vec<&String> = block_schema.block_types.keys().collect();
    block_type_keys.sort();

    let mut blocks: BTreeMap<String, Vec<Change>> = BTreeMap::new();
    let mut map_blocks: BTreeMap<String, BTreeMap<String, Change>> = BTreeMap::new();
    for key in block_type_keys {
        let block_type = &block_schema.block_types[key];
        let child_value = block_value.child(key, false);
        let context = || format!("block type {:?}", key);

        match block_type.nesting_mode {
            NestingMode::List | NestingMode::Set => {
                let (children, next) =
                    list::block_sequence(&child_value, &block_type.block).with_context(context)?;
                if omit_null_noop(next, &child_value) {
                    continue;
                }
                blocks.insert(key.clone(), children);
                current = current.combine(next);
            }
            NestingMode::Map => {
                let (children, next) =
                    map::block_map(&child_value, &block_type.block).with_context(context)?;
                if omit_null_noop(next, &child_value) {
                    continue;
                }
                map_blocks.insert(key.clone(), children);
                current = current.combine(next);
            }
            NestingMode::Single | NestingMode::Group => {
                let child = compute_change(&child_value, SchemaKind::Block(&block_type.block))
                    .with_context(context)?;
                let next = child.action;
                if omit_null_noop(next, &child_value) {
                    continue;
                }
                blocks.insert(key.clone(), vec![child]);
                current = current.combine(next);
            }
        }
    }

    Ok(Change::new(
        Renderer::Block {
            attributes,
            blocks,
            map_blocks,
        },
        current,
        value.replace(),
    ))
}

fn omit_null_noop(action: Action, value: &Value) -> bool {
    action == Action::NoOp && value.before.is_null() && value.after.is_null()
}
