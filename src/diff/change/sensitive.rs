//! Rendering of sensitive values.

use crate::diff::action::Action;

use super::Change;

pub(super) fn render(change: &Change) -> String {
    format!("(sensitive value){}", change.forces_replacement())
}

/// A warning when the change adds or removes sensitivity. Creations and
/// deletions carry no warning since there is no transition to call out.
pub(super) fn warnings(
    inner: &Change,
    before_sensitive: bool,
    after_sensitive: bool,
) -> Vec<String> {
    if before_sensitive == after_sensitive
        || inner.action == Action::Create
        || inner.action == Action::Delete
    {
        return Vec::new();
    }

    let warning = if before_sensitive {
        "  # [yellow]Warning:[reset] this attribute value will no longer be marked as sensitive after applying this change"
    } else {
        "  # [yellow]Warning:[reset] this attribute value will be marked as sensitive after applying this change"
    };
    vec![warning.to_string()]
}
