//! Rendering of objects and nested objects.

use std::collections::BTreeMap;

use crate::diff::action::Action;

use super::{
    escape_attribute_name, important_attribute, indent, unchanged, Change, RenderOpts,
};

pub(super) fn render(
    change: &Change,
    attributes: &BTreeMap<String, Change>,
    override_null_suffix: bool,
    indent_level: usize,
    opts: &RenderOpts,
) -> String {
    if attributes.is_empty() {
        return format!(
            "{{}}{}{}",
            change.null_suffix(opts.override_null_suffix),
            change.forces_replacement()
        );
    }

    let mut attribute_opts = opts.clone();
    attribute_opts.override_null_suffix = override_null_suffix;

    let mut escaped: Vec<(String, String)> = attributes
        .keys()
        .map(|key| (escape_attribute_name(key), key.clone()))
        .collect();
    escaped.sort();
    let maximum_key_len = escaped.iter().map(|(esc, _)| esc.len()).max().unwrap_or(0);

    let mut unchanged_attributes = 0;
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

    buf.push_str(&format!(
        "{}{} }}{}",
        indent(indent_level),
        Action::NoOp.symbol(),
        change.null_suffix(opts.override_null_suffix)
    ));
    buf
}
