//! Rendering of lists, nested lists, and sets.

use crate::diff::action::Action;

use super::{indent, unchanged, Change, RenderOpts};

pub(super) fn render(
    change: &Change,
    elements: &[Change],
    override_null_suffix: bool,
    indent_level: usize,
    opts: &RenderOpts,
) -> String {
    if elements.is_empty() {
        return format!(
            "[]{}{}",
            change.null_suffix(opts.override_null_suffix),
            change.forces_replacement()
        );
    }

    let mut element_opts = opts.clone();
    element_opts.override_null_suffix = override_null_suffix;

    let mut unchanged_elements = 0;
    let mut buf = format!("[{}\n", change.forces_replacement());
    for element in elements {
        if element.action == Action::NoOp && !opts.show_unchanged_children {
            unchanged_elements += 1;
            continue;
        }

        for warning in element.warnings() {
            buf.push_str(&format!("{}{}\n", indent(indent_level + 1), warning));
        }

        buf.push_str(&format!(
            "{}{} {},\n",
            indent(indent_level + 1),
            element.action.symbol(),
            element.render(indent_level + 1, &element_opts)
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
        "{}{} ]{}",
        indent(indent_level),
        Action::NoOp.symbol(),
        change.null_suffix(opts.override_null_suffix)
    ));
    buf
}
