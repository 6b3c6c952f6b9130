//! Rendering of values that are only known after apply.

use crate::diff::action::Action;

use super::{Change, RenderOpts};

pub(super) fn render(
    change: &Change,
    before: &Option<Box<Change>>,
    indent_level: usize,
    opts: &RenderOpts,
) -> String {
    match before {
        Some(before) if change.action != Action::Create => {
            // Children of computed changes never print a null suffix; the
            // arrow into (known after apply) already says it.
            let mut before_opts = opts.clone();
            before_opts.override_null_suffix = true;
            format!(
                "{} -> (known after apply)",
                before.render(indent_level, &before_opts)
            )
        }
        _ => "(known after apply)".to_string(),
    }
}
