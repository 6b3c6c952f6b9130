//! Rendering of primitive values.
//!
//! Booleans and numbers print their literals. Strings get three special
//! treatments: values that parse as JSON are diffed structurally and
//! wrapped in `jsonencode(...)`, multi-line values render as heredocs with
//! a per-line diff, and everything else is quoted.

use serde_json::Value as Json;

use crate::diff::action::Action;
use crate::diff::lcs;

use super::{indent, json, Change, PrimitiveType, RenderOpts, Renderer};

pub(super) fn render(
    change: &Change,
    before: &Json,
    after: &Json,
    ty: PrimitiveType,
    indent_level: usize,
    opts: &RenderOpts,
) -> String {
    if ty == PrimitiveType::String {
        return render_string_value(change, before, after, indent_level + 1, opts);
    }

    let before_value = render_primitive_value(before);
    let after_value = render_primitive_value(after);

    match change.action {
        Action::Create => format!("{}{}", after_value, change.forces_replacement()),
        Action::Delete => format!(
            "{}{}{}",
            before_value,
            change.null_suffix(opts.override_null_suffix),
            change.forces_replacement()
        ),
        Action::NoOp => format!("{}{}", before_value, change.forces_replacement()),
        _ => format!(
            "{} [yellow]->[reset] {}{}",
            before_value,
            after_value,
            change.forces_replacement()
        ),
    }
}

fn render_primitive_value(value: &Json) -> String {
    match value {
        Json::Null => "[dark_gray]null[reset]".to_string(),
        Json::Bool(true) => "true".to_string(),
        Json::Bool(false) => "false".to_string(),
        Json::Number(number) => number.to_string(),
        other => other.to_string(),
    }
}

fn render_string_value(
    change: &Change,
    before: &Json,
    after: &Json,
    indent_level: usize,
    opts: &RenderOpts,
) -> String {
    let mut lines: Vec<String> = Vec::new();

    match change.action {
        Action::Create | Action::NoOp => {
            let concrete = concretize(after);

            if let Some(parsed) = &concrete.json {
                return format_json(
                    change,
                    indent_level,
                    &json::compute_change(&Json::Null, parsed),
                    change.action,
                    false,
                    opts,
                );
            }

            if !concrete.multiline {
                return format!("{}{}", concrete.display, change.forces_replacement());
            }
            push_plain_lines(&mut lines, &concrete.display, indent_level);
        }
        Action::Delete => {
            let concrete = concretize(before);

            if let Some(parsed) = &concrete.json {
                return format_json(
                    change,
                    indent_level,
                    &json::compute_change(parsed, &Json::Null),
                    change.action,
                    false,
                    opts,
                );
            }

            if !concrete.multiline {
                return format!(
                    "{}{}{}",
                    concrete.display,
                    change.null_suffix(opts.override_null_suffix),
                    change.forces_replacement()
                );
            }
            push_plain_lines(&mut lines, &concrete.display, indent_level);
        }
        _ => {
            let before_concrete = concretize(before);
            let after_concrete = concretize(after);

            match (&before_concrete.json, &after_concrete.json) {
                (Some(before_parsed), Some(after_parsed)) => {
                    return format_json(
                        change,
                        indent_level,
                        &json::compute_change(before_parsed, after_parsed),
                        change.action,
                        before_parsed == after_parsed,
                        opts,
                    );
                }
                (Some(_), None) | (None, Some(_)) => {
                    // Only one side is JSON, so the value changed type as
                    // far as the reader is concerned.
                    let from = Change::new(
                        Renderer::Primitive {
                            before: before.clone(),
                            after: Json::Null,
                            ty: PrimitiveType::String,
                        },
                        Action::Delete,
                        false,
                    );
                    let to = Change::new(
                        Renderer::Primitive {
                            before: Json::Null,
                            after: after.clone(),
                            ty: PrimitiveType::String,
                        },
                        Action::Create,
                        false,
                    );
                    return Change::new(
                        Renderer::TypeChange {
                            before: Box::new(from),
                            after: Box::new(to),
                        },
                        change.action,
                        change.replace,
                    )
                    .render(indent_level, opts);
                }
                (None, None) => {
                    if !before_concrete.multiline && !after_concrete.multiline {
                        return format!(
                            "{} [yellow]->[reset] {}{}",
                            before_concrete.display,
                            after_concrete.display,
                            change.forces_replacement()
                        );
                    }

                    let before_lines: Vec<&str> = before_concrete.display.split('\n').collect();
                    let after_lines: Vec<&str> = after_concrete.display.split('\n').collect();
                    lcs::process(
                        &before_lines,
                        &after_lines,
                        |_| false,
                        |before_ix, after_ix| match (before_ix, after_ix) {
                            (None, Some(after_ix)) => lines.push(format!(
                                "{}{} {}",
                                indent(indent_level),
                                Action::Create.symbol(),
                                after_lines[after_ix]
                            )),
                            (Some(before_ix), None) => lines.push(format!(
                                "{}{} {}",
                                indent(indent_level),
                                Action::Delete.symbol(),
                                before_lines[before_ix]
                            )),
                            (Some(before_ix), Some(_)) => lines.push(format!(
                                "{}{} {}",
                                indent(indent_level),
                                Action::NoOp.symbol(),
                                before_lines[before_ix]
                            )),
                            (None, None) => {}
                        },
                    );
                }
            }
        }
    }

    format!(
        "<<-EOT{}\n{}\n{}EOT{}",
        change.forces_replacement(),
        lines.join("\n"),
        indent(indent_level),
        change.null_suffix(opts.override_null_suffix)
    )
}

fn push_plain_lines(lines: &mut Vec<String>, display: &str, indent_level: usize) {
    for line in display.split('\n') {
        lines.push(format!(
            "{}{} {}",
            indent(indent_level),
            Action::NoOp.symbol(),
            line
        ));
    }
}

struct ConcreteString {
    display: String,
    json: Option<Json>,
    multiline: bool,
}

fn concretize(value: &Json) -> ConcreteString {
    match value {
        Json::Null => ConcreteString {
            display: "null".to_string(),
            json: None,
            multiline: false,
        },
        Json::String(text) => {
            if text.starts_with('{') || text.starts_with('[') {
                if let Ok(parsed) = serde_json::from_str::<Json>(text) {
                    return ConcreteString {
                        display: text.clone(),
                        json: Some(parsed),
                        multiline: false,
                    };
                }
            }
            if text.contains('\n') {
                return ConcreteString {
                    display: text.trim().to_string(),
                    json: None,
                    multiline: true,
                };
            }
            ConcreteString {
                display: format!("\"{}\"", text),
                json: None,
                multiline: false,
            }
        }
        other => ConcreteString {
            display: other.to_string(),
            json: None,
            multiline: false,
        },
    }
}

fn format_json(
    current: &Change,
    indent_level: usize,
    target: &Change,
    action: Action,
    whitespace_only: bool,
    opts: &RenderOpts,
) -> String {
    let mut action = action;
    let rendered;
    let mut whitespace = "";
    let mut replace = "";

    if whitespace_only {
        // The values agree once parsed; show the whole document unchanged
        // and just note the whitespace difference.
        let mut unchanged_opts = opts.clone();
        unchanged_opts.show_unchanged_children = true;
        rendered = target.render(indent_level, &unchanged_opts);
        whitespace = if current.replace {
            " # whitespace changes force replacement"
        } else {
            " # whitespace changes"
        };
        action = Action::NoOp;
    } else {
        rendered = target.render(indent_level, opts);
        replace = current.forces_replacement();
    }

    if rendered.contains('\n') {
        let symbol = if action == Action::Update {
            Action::Update.symbol()
        } else {
            Action::NoOp.symbol()
        };
        format!(
            "jsonencode({}\n{}{} {}{}\n{})",
            whitespace,
            indent(indent_level),
            symbol,
            rendered,
            replace,
            indent(indent_level)
        )
    } else {
        format!("jsonencode({}){}", rendered, current.forces_replacement())
    }
}
