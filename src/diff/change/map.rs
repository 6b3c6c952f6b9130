//! Rendering of maps. Keys are always quoted and aligned.

use std::collections::BTreeMap;

use crate::diff::action::Action;

use super::{indent, unchanged, Change, RenderOpts};

pub(super) fn render(
    change: &Change,
    elements: &BTreeMap<String, Change>,
    indent_level: usize,
    opts: &RenderOpts,
) -> String {
    if elements.is_empty() {
        return format!(
            "{{}}{}{}",
            change.null_suffix(opts.override_null_suffix),
            change.forces_replacement()
        );
    }

    let maximum_key_len = elements
        .keys()
        .map(|key| format!("{:?}", key).len())
        .max()
        .unwrap_or(0);

    let mut unchanged_elements = 0;
    let mut buf = format!("{{{}\n", change.forces_replacement());
    for (key, element) in elements {
        if element.action == Action::NoOp && !opts.show_unchanged_children {
            unchanged_elements += 1;
            continue;
        }

        for warning in element.warnings() {
            buf.push_str(&format!("{}{}\n", indent(indent_level + 1), warning));
        }

        buf.push_str(&format!(
            "{}{} {:<width$} = {}\n",
            indent(indent_level + 1),
            element.action.symbol(),
            format!("{:?}", key),
            element.render(indent_level + 1, opts),
            width = maximum_key_len
        ));
    }

    if unchanged_elements > 0 {
        buf.push_str(&format!(
            "{}{} {}\n",
            indent(indent_level + 1),
            Action::NoOp.symbol(),
            unchanged("element", unchanged_elements)
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::change::{PrimitiveType, Renderer};
    use serde_json::{json, Value as Json};

    fn primitive(before: Json, after: Json, action: Action) -> Change {
        Change::new(
            Renderer::Primitive {
                before,
                after,
                ty: PrimitiveType::String,
            },
            action,
            false,
        )
    }

    fn map(elements: Vec<(&str, Change)>, action: Action) -> Change {
        Change::new(
            Renderer::Map {
                elements: elements
                    .into_iter()
                    .map(|(key, change)| (key.to_string(), change))
                    .collect(),
            },
            action,
            false,
        )
    }

    #[test]
    fn test_keys_are_quoted_and_sorted() {
        let rendered = map(
            vec![
                ("zone", primitive(json!("a"), json!("b"), Action::Update)),
                ("name", primitive(json!(null), json!("x"), Action::Create)),
            ],
            Action::Update,
        )
        .render(0, &RenderOpts::default());

        assert!(rendered.contains("\"name\""));
        assert!(rendered.contains("\"zone\""));
        assert!(rendered.find("\"name\"").unwrap() < rendered.find("\"zone\"").unwrap());
    }

    #[test]
    fn test_unchanged_entries_summarised() {
        let rendered = map(
            vec![
                ("same", primitive(json!("x"), json!("x"), Action::NoOp)),
                ("new", primitive(json!(null), json!("y"), Action::Create)),
            ],
            Action::Update,
        )
        .render(0, &RenderOpts::default());

        assert!(rendered.contains("# (1 unchanged element hidden)"));
        assert!(!rendered.contains("same"));
    }

    #[test]
    fn test_deleted_entries_keep_null_suffix() {
        let rendered = map(
            vec![("gone", primitive(json!("x"), json!(null), Action::Delete))],
            Action::Update,
        )
        .render(0, &RenderOpts::default());

        assert!(rendered.contains("-> null"));
    }
}
