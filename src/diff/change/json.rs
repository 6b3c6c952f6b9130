//! Diffing of untyped JSON values.
//!
//! Used for strings containing embedded JSON documents and for output
//! changes, where there is no schema and the JSON shape of the values is
//! all there is to go on. Values of matching shape diff structurally;
//! mismatched shapes become a type change.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value as Json;

use crate::diff::action::Action;
use crate::diff::lcs;

use super::{Change, PrimitiveType, Renderer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JsonShape {
    Null,
    Bool,
    Number,
    String,
    Array,
    Object,
}

fn shape(value: &Json) -> JsonShape {
    match value {
        Json::Null => JsonShape::Null,
        Json::Bool(_) => JsonShape::Bool,
        Json::Number(_) => JsonShape::Number,
        Json::String(_) => JsonShape::String,
        Json::Array(_) => JsonShape::Array,
        Json::Object(_) => JsonShape::Object,
    }
}

/// Diff two JSON values into a change tree.
pub fn compute_change(before: &Json, after: &Json) -> Change {
    let before_shape = shape(before);
    let after_shape = shape(after);

    if before_shape == after_shape
        || before_shape == JsonShape::Null
        || after_shape == JsonShape::Null
    {
        let target = if before_shape == JsonShape::Null {
            after_shape
        } else {
            before_shape
        };
        return compute_update(before, after, target);
    }

    let from = compute_update(before, &Json::Null, before_shape);
    let to = compute_update(&Json::Null, after, after_shape);
    Change::new(
        Renderer::TypeChange {
            before: Box::new(from),
            after: Box::new(to),
        },
        Action::Update,
        false,
    )
}

fn compute_update(before: &Json, after: &Json, target: JsonShape) -> Change {
    match target {
        JsonShape::Null => compute_primitive(before, after, PrimitiveType::Null),
        JsonShape::Bool => compute_primitive(before, after, PrimitiveType::Bool),
        JsonShape::Number => compute_primitive(before, after, PrimitiveType::Number),
        JsonShape::String => compute_primitive(before, after, PrimitiveType::String),
        JsonShape::Object => compute_object(before, after),
        JsonShape::Array => compute_array(before, after),
    }
}

fn compute_primitive(before: &Json, after: &Json, ty: PrimitiveType) -> Change {
    let action = if before.is_null() && !after.is_null() {
        Action::Create
    } else if !before.is_null() && after.is_null() {
        Action::Delete
    } else if before == after {
        Action::NoOp
    } else {
        Action::Update
    };
    Change::new(
        Renderer::Primitive {
            before: before.clone(),
            after: after.clone(),
            ty,
        },
        action,
        false,
    )
}

fn compute_object(before: &Json, after: &Json) -> Change {
    let before_entries = before.as_object();
    let after_entries = after.as_object();

    let mut current = match (before_entries.is_some(), after_entries.is_some()) {
        (true, false) => Action::Delete,
        (false, true) => Action::Create,
        _ => Action::NoOp,
    };

    let mut keys = BTreeSet::new();
    if let Some(entries) = before_entries {
        keys.extend(entries.keys());
    }
    if let Some(entries) = after_entries {
        keys.extend(entries.keys());
    }

    let null = Json::Null;
    let mut attributes = BTreeMap::new();
    for key in keys {
        let child_before = before_entries
            .and_then(|entries| entries.get(key))
            .unwrap_or(&null);
        let child_after = after_entries
            .and_then(|entries| entries.get(key))
            .unwrap_or(&null);
        let child = compute_change(child_before, child_after);
        current = current.combine(child.action);
        attributes.insert(key.clone(), child);
    }

    Change::new(Renderer::Object { attributes }, current, false)
}

fn compute_array(before: &Json, after: &Json) -> Change {
    let empty = Vec::new();
    let before_items = before.as_array().unwrap_or(&empty);
    let after_items = after.as_array().unwrap_or(&empty);

    let mut current = match (before.is_null(), after.is_null()) {
        (false, true) => Action::Delete,
        (true, false) => Action::Create,
        _ => Action::NoOp,
    };

    let mut pairs = Vec::new();
    lcs::process(
        before_items,
        after_items,
        |item| shape(item) == JsonShape::Object,
        |before_ix, after_ix| pairs.push((before_ix, after_ix)),
    );

    let null = Json::Null;
    let mut elements = Vec::new();
    for (before_ix, after_ix) in pairs {
        let child_before = before_ix
            .and_then(|ix| before_items.get(ix))
            .unwrap_or(&null);
        let child_after = after_ix
            .and_then(|ix| after_items.get(ix))
            .unwrap_or(&null);
        let child = compute_change(child_before, child_after);
        current = current.combine(child.action);
        elements.push(child);
    }

    Change::new(Renderer::List { elements }, current, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::change::RenderOpts;
    use serde_json::json;

    #[test]
    fn test_primitive_actions() {
        assert_eq!(compute_change(&json!(1), &json!(1)).action, Action::NoOp);
        assert_eq!(compute_change(&json!(1), &json!(2)).action, Action::Update);
        assert_eq!(
            compute_change(&json!(null), &json!(2)).action,
            Action::Create
        );
        assert_eq!(
            compute_change(&json!(1), &json!(null)).action,
            Action::Delete
        );
    }

    #[test]
    fn test_shape_mismatch_becomes_type_change() {
        let change = compute_change(&json!(true), &json!("true"));
        assert_eq!(change.action, Action::Update);
        assert!(matches!(change.renderer, Renderer::TypeChange { .. }));
    }

    #[test]
    fn test_object_children_follow_key_union() {
        let change = compute_change(&json!({"a": 1, "b": 2}), &json!({"b": 3, "c": 4}));
        assert_eq!(change.action, Action::Update);
        let Renderer::Object { attributes } = &change.renderer else {
            panic!("expected an object renderer");
        };
        assert_eq!(attributes["a"].action, Action::Delete);
        assert_eq!(attributes["b"].action, Action::Update);
        assert_eq!(attributes["c"].action, Action::Create);
    }

    #[test]
    fn test_array_elements_align_via_lcs() {
        let change = compute_change(&json!([1, 2, 3]), &json!([1, 3, 4]));
        let Renderer::List { elements } = &change.renderer else {
            panic!("expected a list renderer");
        };
        let actions: Vec<Action> = elements.iter().map(|element| element.action).collect();
        assert_eq!(
            actions,
            vec![Action::NoOp, Action::Delete, Action::NoOp, Action::Create]
        );
    }

    #[test]
    fn test_similar_objects_in_arrays_pair_up() {
        let change = compute_change(
            &json!([{"name": "a", "port": 80}]),
            &json!([{"name": "a", "port": 443}]),
        );
        let Renderer::List { elements } = &change.renderer else {
            panic!("expected a list renderer");
        };
        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].action, Action::Update);
    }

    #[test]
    fn test_whole_object_deletion_keeps_delete_action() {
        let change = compute_change(&json!({"a": 1}), &json!(null));
        assert_eq!(change.action, Action::Delete);
    }

    #[test]
    fn test_rendered_object_is_sorted_and_aligned() {
        let change = compute_change(&json!({"bb": 1, "a": 2}), &json!({"bb": 9, "a": 2}));
        let rendered = change.render(0, &RenderOpts::default());
        assert!(rendered.contains("bb = 1 [yellow]->[reset] 9"));
        // The unchanged "a" is summarised away.
        assert!(rendered.contains("# (1 unchanged attribute hidden)"));
    }
}
