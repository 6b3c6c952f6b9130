//! Change actions and their combination rules.
//!
//! Every node in a change tree carries an [`Action`]. Parents derive their
//! action from their children with [`Action::combine`]; leaves derive theirs
//! from the before/after values directly.

use anyhow::{bail, Result};

/// The kind of change planned for a value or resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// No change.
    NoOp,
    /// The value or resource will be created.
    Create,
    /// A data source will be read during apply.
    Read,
    /// The value or resource will be updated in place.
    Update,
    /// The value or resource will be destroyed.
    Delete,
    /// Replacement creating the new object before destroying the old one.
    CreateThenDelete,
    /// Replacement destroying the old object before creating the new one.
    DeleteThenCreate,
}

impl Action {
    /// Fold a child action into the running action for a container node.
    ///
    /// `NoOp` children leave the parent untouched, matching children keep
    /// it, and any disagreement collapses to `Update`. `Create` and `Delete`
    /// can therefore only come from the iteration seed, never from mixing
    /// children.
    pub fn combine(self, next: Action) -> Action {
        if next == Action::NoOp {
            return self;
        }
        if self != next {
            return Action::Update;
        }
        self
    }

    /// Decode the `actions` list from a plan file.
    pub fn from_actions(actions: &[String]) -> Result<Action> {
        let actions: Vec<&str> = actions.iter().map(String::as_str).collect();
        let action = match actions.as_slice() {
            ["no-op"] => Action::NoOp,
            ["create"] => Action::Create,
            ["read"] => Action::Read,
            ["update"] => Action::Update,
            ["delete"] => Action::Delete,
            ["delete", "create"] => Action::DeleteThenCreate,
            ["create", "delete"] => Action::CreateThenDelete,
            other => bail!("unrecognized action sequence: {:?}", other),
        };
        Ok(action)
    }

    /// The colour-tagged diff symbol for this action.
    ///
    /// All symbols occupy three visible columns so diff lines align. `NoOp`
    /// renders as blank padding.
    pub fn symbol(self) -> &'static str {
        match self {
            Action::NoOp => "   ",
            Action::Create => "  [green]+[reset]",
            Action::Delete => "  [red]-[reset]",
            Action::Update => "  [yellow]~[reset]",
            Action::Read => " [cyan]<=[reset]",
            Action::DeleteThenCreate => "[red]-[reset]/[green]+[reset]",
            Action::CreateThenDelete => "[green]+[reset]/[red]-[reset]",
        }
    }

    /// The legend line explaining this action's symbol.
    pub fn description(self) -> &'static str {
        match self {
            Action::Create => "  [green]+[reset] create",
            Action::Delete => "  [red]-[reset] destroy",
            Action::Update => "  [yellow]~[reset] update in-place",
            Action::CreateThenDelete => {
                "[green]+[reset]/[red]-[reset] create replacement and then destroy"
            }
            Action::DeleteThenCreate => {
                "[red]-[reset]/[green]+[reset] destroy and then create replacement"
            }
            Action::Read => " [cyan]<=[reset] read (data resources)",
            Action::NoOp => "",
        }
    }
}
