//! The sensitive check: values that must not be shown.

use anyhow::Result;

use crate::diff::action::Action;
use crate::diff::change::{Change, Renderer};
use crate::diff::mask::Mask;
use crate::diff::value::Value;

use super::{compute_change, SchemaKind};

pub(super) fn check(value: &Value, kind: SchemaKind<'_>) -> Result<Option<Change>> {
    let before_sensitive = value.is_before_sensitive();
    let after_sensitive = value.is_after_sensitive();
    if !before_sensitive && !after_sensitive {
        return Ok(None);
    }

    // Compute the real change with the sensitivity cleared, then wrap it so
    // only the action survives into the output.
    let mut inner_value = value.clone();
    inner_value.before_sensitive = Mask::default();
    inner_value.after_sensitive = Mask::default();
    let inner = compute_change(&inner_value, kind)?;

    let mut action = inner.action;
    if action == Action::NoOp && before_sensitive != after_sensitive {
        // The value is unchanged but its sensitivity is not.
        action = Action::Update;
    }

    Ok(Some(Change::new(
        Renderer::Sensitive {
            inner: Box::new(inner),
            before_sensitive,
            after_sensitive,
        },
        action,
        value.replace(),
    )))
}
