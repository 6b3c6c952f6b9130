//! Rendering of values whose JSON type changed.

use super::{Change, RenderOpts};

pub(super) fn render(
    before: &Change,
    after: &Change,
    indent_level: usize,
    opts: &RenderOpts,
) -> String {
    let mut opts = opts.clone();
    opts.override_null_suffix = true;
    format!(
        "{} [yellow]->[reset] {}",
        before.render(indent_level, &opts),
        after.render(indent_level, &opts)
    )
}
