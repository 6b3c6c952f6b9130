//! Rendering of blocks.
//!
//! Blocks print their attributes first, then their nested block instances,
//! separated by a blank line. Instances of map-nested block types carry
//! their quoted map key. A block whose attributes hide a changing sensitive
//! value elides its whole body.

use std::collections::BTreeMap;

use crate::diff::action::Action;

use super::{
    escape_attribute_name, important_attribute, indent, unchanged, Change, RenderOpts,
};

pub(super) fn render(
    change: &Change,
    attributes: &BTreeMap<String, Change>,
    blocks: &BTreeMap<String, Vec<Change>>,
    map_blocks: &BTreeMap<String, BTreeMap<String, Change>>,
    indent_level: usize,
    opts: &RenderOpts,
) -> String {
    if attributes.is_empty() && blocks.is_empty() && map_blocks.is_empty() {
        return format!("{{}}{}", change.forces_replacement());
    }

    if opts.elide_sensitive_blocks && change.contains_sensitive() {
        let line_indent = format!("{}{} ", indent(indent_level), Action::NoOp.symbol());
        return format!(
            "{{{}\n{}  # At least one attribute in this block is (or was) sensitive,\n{}  # so its contents will not be displayed\n{}}}",
            change.forces_replacement(),
            line_indent,
            line_indent,
            line_indent
        );
    }

    let mut unchanged_attributes = 0;
    let mut unchanged_blocks = 0;

    let mut escaped: Vec<(String, String)> = attributes
        .keys()
        .map(|key| (escape_attribute_name(key), key.clone()))
        .collect();
    escaped.sort();
    let maximum_key_len = escaped.iter().map(|(esc, _)| esc.len()).max().unwrap_or(0);

    let mut buf = format!("{{{}\n", change.forces_replacement());
    for (esc, key) in &escaped {
        let attribute = &attributes[key.as_str()];
        if !important_attribute(key)
            && attribute.action == Action::NoOp
            && !opts.show_unchanged_children
        {
            unchanged_attributes += 1;
            continue;
        }

        for warning in attribute.warnings() {
            buf.push_str(&format!("{}{}\n", indent(indent_level + 1), warning));
        }

        // Unchanged attributes kept visible still render their children.
        let attribute_opts = if attribute.action == Action::NoOp {
            let mut shown = opts.clone();
            shown.show_unchanged_children = true;
            shown
        } else {
            opts.clone()
        };

        buf.push_str(&format!(
            "{}{} {:<width$} = {}\n",
            indent(indent_level + 1),
            attribute.action.symbol(),
            esc,
            attribute.render(indent_level + 1, &attribute_opts),
            width = maximum_key_len
        ));
    }

    if unchanged_attributes > 0 {
        buf.push_str(&format!(
            "{}{} {}\n",
            indent(indent_level + 1),
            Action::NoOp.symbol(),
            unchanged("attribute", unchanged_attributes)
        ));
    }

    let mut block_opts = opts.clone();
    block_opts.elide_sensitive_blocks = true;

    let mut block_keys: Vec<&String> = blocks.keys().chain(map_blocks.keys()).collect();
    block_keys.sort();
    block_keys.dedup();

    for key in block_keys {
        if let Some(instances) = blocks.get(key) {
            let mut found_changed_block = false;
            for block in instances {
                if block.action == Action::NoOp && !opts.show_unchanged_children {
                    unchanged_blocks += 1;
                    continue;
                }

                if !found_changed_block && !attributes.is_empty() {
                    buf.push('\n');
                    found_changed_block = true;
                }

                for warning in block.warnings() {
                    buf.push_str(&format!("{}{}\n", indent(indent_level + 1), warning));
                }
                buf.push_str(&format!(
                    "{}{} {} {}\n",
                    indent(indent_level + 1),
                    block.action.symbol(),
                    escape_attribute_name(key),
                    block.render(indent_level + 1, &block_opts)
                ));
            }
        }

        if let Some(instances) = map_blocks.get(key) {
            let mut found_changed_block = false;
            for (map_key, block) in instances {
                if block.action == Action::NoOp && !opts.show_unchanged_children {
                    unchanged_blocks += 1;
                    continue;
                }

                if !found_changed_block && !attributes.is_empty() {
                    buf.push('\n');
                    found_changed_block = true;
                }

                for warning in block.warnings() {
                    buf.push_str(&format!("{}{}\n", indent(indent_level + 1), warning));
                }
                buf.push_str(&format!(
                    "{}{} {} \"{}\" {}\n",
                    indent(indent_level + 1),
                    block.action.symbol(),
                    escape_attribute_name(key),
                    map_key,
                    block.render(indent_level + 1, &block_opts)
                ));
            }
        }
    }

    if unchanged_blocks > 0 {
        buf.push_str(&format!(
            "\n{}{} {}\n",
            indent(indent_level + 1),
            Action::NoOp.symbol(),
            unchanged("block", unchanged_blocks)
        ));
    }

    buf.push_str(&format!("{}{} }}", indent(indent_level), Action::NoOp.symbol()));
    buf
}
