//! Diffing of objects and nested attribute objects.
//!
//! Both iterate the schema's declared attributes, not the value's keys, so
//! attributes missing on one side diff as null there.

use std::collections::{BTreeMap, HashMap};

use anyhow::{Context, Result};

use crate::diff::change::{Change, Renderer};
use crate::diff::value::Value;
use crate::schema::{Attribute, AttributeType};

use super::{compute_change, compute_change_for_attribute, SchemaKind};

pub(super) fn attribute_object(
    value: &Value,
    attribute_types: &BTreeMap<String, AttributeType>,
) -> Result<Change> {
    let map_value = value.as_map()?;
    let mut current = value.default_action_for_iteration();

    let mut attributes = BTreeMap::new();
    for (key, attribute_type) in attribute_types {
        let child_value = map_value.child(key, false);
        let child = compute_change(&child_value, SchemaKind::Type(attribute_type))
            .with_context(|| format!("attribute {:?}", key))?;
        current = current.combine(child.action);
        attributes.insert(key.clone(), child);
    }

    Ok(Change::new(
        Renderer::Object { attributes },
        current,
        value.replace(),
    ))
}

pub(super) fn nested_object(
    value: &Value,
    attribute_schemas: &HashMap<String, Attribute>,
) -> Result<Change> {
    let map_value = value.as_map()?;
    let mut current = value.default_action_for_iteration();

    let mut keys: Vec<&String> = attribute_schemas.keys().collect();
    keys.sort();

    let mut attributes = BTreeMap::new();
    for key in keys {
        let child_value = map_value.child(key, false);
        let child = compute_change_for_attribute(&child_value, &attribute_schemas[key])
            .with_context(|| format!("attribute {:?}", key))?;
        current = current.combine(child.action);
        attributes.insert(key.clone(), child);
    }

    Ok(Change::new(
        Renderer::NestedObject { attributes },
        current,
        value.replace(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::action::Action;
    use serde_json::json;

    #[test]
    fn test_schema_declared_keys_drive_the_diff() {
        let mut types = BTreeMap::new();
        types.insert("present".to_string(), AttributeType::String);
        types.insert("missing".to_string(), AttributeType::String);

        let value = Value {
            before: json!({"present": "a", "extra": "ignored"}),
            after: json!({"present": "b"}),
            ..Value::default()
        };
        let change = attribute_object(&value, &types).unwrap();

        let Renderer::Object { attributes } = &change.renderer else {
            panic!("expected an object renderer");
        };
        assert!(attributes.contains_key("present"));
        assert!(attributes.contains_key("missing"));
        assert!(!attributes.contains_key("extra"));
        assert_eq!(attributes["missing"].action, Action::NoOp);
        assert_eq!(attributes["present"].action, Action::Update);
    }

    #[test]
    fn test_object_creation_seeds_create_action() {
        let mut types = BTreeMap::new();
        types.insert("a".to_string(), AttributeType::String);

        let value = Value {
            before: json!(null),
            after: json!({"a": "x"}),
            ..Value::default()
        };
        let change = attribute_object(&value, &types).unwrap();
        assert_eq!(change.action, Action::Create);
    }
}
