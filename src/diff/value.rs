//! The input value tree fed to the differ.
//!
//! A [`Value`] bundles the before and after values of one position in the
//! plan together with the unknown and sensitive masks and the remaining
//! replace paths. The explicit flags distinguish a value that is literally
//! null from one that is simply absent: removing an element from a list
//! leaves the after value null and implicit, while setting it to null in
//! configuration leaves it null and explicit. Without that bit the differ
//! could not tell a delete from an update-to-null.

use anyhow::{bail, Result};
use serde_json::Value as Json;
use std::collections::BTreeSet;

use crate::diff::action::Action;
use crate::diff::change::{Change, Renderer};
use crate::diff::mask::{Mask, ReplacePaths};
use crate::plan::PlanChange;

/// One node of the input tree, before schema interpretation.
#[derive(Debug, Clone, Default)]
pub struct Value {
    /// Whether the before value was explicitly set rather than implied.
    pub before_explicit: bool,
    /// Whether the after value was explicitly set rather than implied.
    pub after_explicit: bool,
    /// The value before the proposed change. Null doubles as absent; see
    /// `before_explicit`.
    pub before: Json,
    /// The value after the proposed change.
    pub after: Json,
    /// Which parts of the after value are not yet known.
    pub unknown: Mask,
    /// Which parts of the before value are sensitive.
    pub before_sensitive: Mask,
    /// Which parts of the after value are sensitive.
    pub after_sensitive: Mask,
    /// Paths beneath this node whose changes force replacement.
    pub replace_paths: ReplacePaths,
}

impl Value {
    /// Build the root value for a resource or output change from its plan
    /// file representation.
    pub fn from_change(change: &PlanChange) -> Result<Value> {
        Ok(Value {
            before_explicit: false,
            after_explicit: false,
            before: change.before.clone(),
            after: change.after.clone(),
            unknown: Mask::from_json(&change.after_unknown)?,
            before_sensitive: Mask::from_json(&change.before_sensitive)?,
            after_sensitive: Mask::from_json(&change.after_sensitive)?,
            replace_paths: ReplacePaths::from_json(&change.replace_paths)?,
        })
    }

    /// Wrap a renderer into a change node using this value's leaf action
    /// and replace flag.
    pub fn as_change(&self, renderer: Renderer) -> Change {
        Change::new(renderer, self.calculate_action(), self.replace())
    }

    /// The leaf action rule, applied before schema descent.
    pub fn calculate_action(&self) -> Action {
        if (self.before.is_null() && !self.before_explicit)
            && (!self.after.is_null() || self.after_explicit)
        {
            return Action::Create;
        }
        if (self.after.is_null() && !self.after_explicit)
            && (!self.before.is_null() || self.before_explicit)
        {
            return Action::Delete;
        }

        if self.before == self.after
            && self.before_explicit == self.after_explicit
            && self.is_before_sensitive() == self.is_after_sensitive()
        {
            return Action::NoOp;
        }

        Action::Update
    }

    /// The starting action for folding a container's children together.
    pub fn default_action_for_iteration(&self) -> Action {
        if self.before.is_null() && self.after.is_null() {
            return Action::NoOp;
        }
        if self.before.is_null() {
            return Action::Create;
        }
        if self.after.is_null() {
            return Action::Delete;
        }
        Action::NoOp
    }

    pub fn is_unknown(&self) -> bool {
        self.unknown.is_true()
    }

    pub fn is_before_sensitive(&self) -> bool {
        self.before_sensitive.is_true()
    }

    pub fn is_after_sensitive(&self) -> bool {
        self.after_sensitive.is_true()
    }

    /// Whether a replace path terminates exactly at this node.
    pub fn replace(&self) -> bool {
        self.replace_paths.matches()
    }

    /// View this value as a mapping, failing on a shape mismatch.
    pub fn as_map(&self) -> Result<MapValue<'_>> {
        Ok(MapValue {
            before: as_object(&self.before)?,
            after: as_object(&self.after)?,
            value: self,
        })
    }

    /// View this value as a sequence, failing on a shape mismatch.
    pub fn as_slice(&self) -> Result<SliceValue<'_>> {
        Ok(SliceValue {
            before: as_array(&self.before)?,
            after: as_array(&self.after)?,
            value: self,
        })
    }
}

fn as_object(value: &Json) -> Result<Option<&serde_json::Map<String, Json>>> {
    match value {
        Json::Null => Ok(None),
        Json::Object(entries) => Ok(Some(entries)),
        other => bail!("expected an object, found {}", json_type_name(other)),
    }
}

fn as_array(value: &Json) -> Result<Option<&Vec<Json>>> {
    match value {
        Json::Null => Ok(None),
        Json::Array(items) => Ok(Some(items)),
        other => bail!("expected an array, found {}", json_type_name(other)),
    }
}

pub(crate) fn json_type_name(value: &Json) -> &'static str {
    match value {
        Json::Null => "null",
        Json::Bool(_) => "a bool",
        Json::Number(_) => "a number",
        Json::String(_) => "a string",
        Json::Array(_) => "an array",
        Json::Object(_) => "an object",
    }
}

/// A value whose before and after sides are mappings (or absent).
pub struct MapValue<'a> {
    before: Option<&'a serde_json::Map<String, Json>>,
    after: Option<&'a serde_json::Map<String, Json>>,
    value: &'a Value,
}

impl MapValue<'_> {
    /// The union of before and after keys, in lexicographic order.
    pub fn keys(&self) -> BTreeSet<&str> {
        let mut keys = BTreeSet::new();
        if let Some(before) = self.before {
            keys.extend(before.keys().map(String::as_str));
        }
        if let Some(after) = self.after {
            keys.extend(after.keys().map(String::as_str));
        }
        keys
    }

    /// The child value for one key. Presence of the key doubles as the
    /// explicit flag for that side. When `propagate_replace` is set the
    /// parent's replace paths are handed down unfiltered, which is how
    /// nested attribute maps behave.
    pub fn child(&self, key: &str, propagate_replace: bool) -> Value {
        let (before, before_explicit) = lookup_key(self.before, key);
        let (after, after_explicit) = lookup_key(self.after, key);

        let replace_paths = if propagate_replace {
            self.value.replace_paths.clone()
        } else {
            self.value.replace_paths.step_key(key)
        };

        Value {
            before_explicit,
            after_explicit,
            before,
            after,
            unknown: self.value.unknown.key(key),
            before_sensitive: self.value.before_sensitive.key(key),
            after_sensitive: self.value.after_sensitive.key(key),
            replace_paths,
        }
    }
}

fn lookup_key(entries: Option<&serde_json::Map<String, Json>>, key: &str) -> (Json, bool) {
    match entries {
        Some(entries) => match entries.get(key) {
            Some(value) => (value.clone(), true),
            None => (Json::Null, false),
        },
        None => (Json::Null, false),
    }
}

/// A value whose before and after sides are sequences (or absent).
pub struct SliceValue<'a> {
    before: Option<&'a Vec<Json>>,
    after: Option<&'a Vec<Json>>,
    value: &'a Value,
}

impl SliceValue<'_> {
    pub fn before_len(&self) -> usize {
        self.before.map(Vec::len).unwrap_or(0)
    }

    pub fn after_len(&self) -> usize {
        self.after.map(Vec::len).unwrap_or(0)
    }

    pub fn before_items(&self) -> &[Json] {
        self.before.map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn after_items(&self) -> &[Json] {
        self.after.map(Vec::as_slice).unwrap_or(&[])
    }

    /// The child value for one aligned index pair. `None` (or an index past
    /// the end) means the element is absent on that side. The unknown and
    /// after-sensitive masks follow the after index, the before-sensitive
    /// mask and replace paths follow the before index.
    pub fn child(&self, before_ix: Option<usize>, after_ix: Option<usize>) -> Value {
        let (before, before_explicit) = lookup_index(self.before, before_ix);
        let (after, after_explicit) = lookup_index(self.after, after_ix);

        let unknown = match after_ix {
            Some(ix) => self.value.unknown.index(ix),
            None => Mask::default(),
        };
        let before_sensitive = match before_ix {
            Some(ix) => self.value.before_sensitive.index(ix),
            None => Mask::default(),
        };
        let after_sensitive = match after_ix {
            Some(ix) => self.value.after_sensitive.index(ix),
            None => Mask::default(),
        };
        let replace_paths = match before_ix {
            Some(ix) => self.value.replace_paths.step_index(ix),
            None => ReplacePaths::default(),
        };

        Value {
            before_explicit,
            after_explicit,
            before,
            after,
            unknown,
            before_sensitive,
            after_sensitive,
            replace_paths,
        }
    }
}

fn lookup_index(items: Option<&Vec<Json>>, ix: Option<usize>) -> (Json, bool) {
    match (items, ix) {
        (Some(items), Some(ix)) => match items.get(ix) {
            Some(value) => (value.clone(), true),
            None => (Json::Null, false),
        },
        _ => (Json::Null, false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn value(before: Json, after: Json) -> Value {
        Value {
            before,
            after,
            ..Value::default()
        }
    }

    #[test]
    fn test_leaf_rule_create() {
        assert_eq!(
            value(json!(null), json!("x")).calculate_action(),
            Action::Create
        );
        // Explicitly null after still counts as created.
        let mut explicit = value(json!(null), json!(null));
        explicit.after_explicit = true;
        assert_eq!(explicit.calculate_action(), Action::Create);
    }

    #[test]
    fn test_leaf_rule_delete() {
        assert_eq!(
            value(json!("x"), json!(null)).calculate_action(),
            Action::Delete
        );
    }

    #[test]
    fn test_leaf_rule_noop_and_update() {
        assert_eq!(
            value(json!("x"), json!("x")).calculate_action(),
            Action::NoOp
        );
        assert_eq!(
            value(json!("x"), json!("y")).calculate_action(),
            Action::Update
        );
    }

    #[test]
    fn test_leaf_rule_explicit_null_is_update_not_delete() {
        let mut v = value(json!("x"), json!(null));
        v.before_explicit = true;
        v.after_explicit = true;
        assert_eq!(v.calculate_action(), Action::Update);
    }

    #[test]
    fn test_leaf_rule_sensitivity_transition_is_update() {
        let mut v = value(json!("x"), json!("x"));
        v.after_sensitive = Mask::Scalar(true);
        assert_eq!(v.calculate_action(), Action::Update);
    }

    #[test]
    fn test_map_child_presence_sets_explicit() {
        let v = value(json!({"a": 1}), json!({"b": 2}));
        let map = v.as_map().unwrap();
        let a = map.child("a", false);
        assert!(a.before_explicit);
        assert!(!a.after_explicit);
        assert_eq!(a.before, json!(1));
        assert!(a.after.is_null());
    }

    #[test]
    fn test_map_keys_are_union_in_order() {
        let v = value(json!({"b": 1, "a": 1}), json!({"c": 2}));
        let map = v.as_map().unwrap();
        let keys: Vec<&str> = map.keys().into_iter().collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_shape_mismatch_is_an_error() {
        let v = value(json!("scalar"), json!(null));
        assert!(v.as_map().is_err());
        assert!(v.as_slice().is_err());
    }

    #[test]
    fn test_slice_child_out_of_range_is_absent() {
        let v = value(json!([1]), json!([1, 2]));
        let slice = v.as_slice().unwrap();
        let child = slice.child(None, Some(1));
        assert!(child.before.is_null());
        assert!(!child.before_explicit);
        assert_eq!(child.after, json!(2));
        assert!(child.after_explicit);
    }

    #[test]
    fn test_default_action_for_iteration() {
        assert_eq!(
            value(json!(null), json!({})).default_action_for_iteration(),
            Action::Create
        );
        assert_eq!(
            value(json!({}), json!(null)).default_action_for_iteration(),
            Action::Delete
        );
        assert_eq!(
            value(json!({}), json!({})).default_action_for_iteration(),
            Action::NoOp
        );
    }
}
