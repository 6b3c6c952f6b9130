//! The change tree and its renderers.
//!
//! A [`Change`] is one node of the output tree: a [`Renderer`] variant
//! describing how to print it, the [`Action`] computed for it, and whether
//! it forces replacement. The tree is built bottom-up by the differ and
//! frozen; rendering only reads.

mod block;
mod computed;
pub mod json;
mod map;
mod object;
mod primitive;
mod sensitive;
mod sequence;
mod type_change;

use std::collections::BTreeMap;

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value as Json;

use crate::diff::action::Action;

/// Attributes rendered even when unchanged, because readers orient by them.
const IMPORTANT_ATTRIBUTES: [&str; 3] = ["id", "name", "tags"];

pub(crate) fn important_attribute(name: &str) -> bool {
    IMPORTANT_ATTRIBUTES.contains(&name)
}

/// Options threaded through rendering, cloned with modified fields on
/// descent.
#[derive(Debug, Clone, Default)]
pub struct RenderOpts {
    /// Render unchanged children instead of summarising them.
    pub show_unchanged_children: bool,
    /// Suppress the ` -> null` suffix on deleted values.
    pub override_null_suffix: bool,
    /// Replace block bodies containing sensitive attributes with a
    /// redaction message.
    pub elide_sensitive_blocks: bool,
}

/// The JSON scalar kind of a primitive change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveType {
    Bool,
    Number,
    String,
    Null,
}

/// How one change node prints, with ownership of its children.
#[derive(Debug, Clone)]
pub enum Renderer {
    Primitive {
        before: Json,
        after: Json,
        ty: PrimitiveType,
    },
    Object {
        attributes: BTreeMap<String, Change>,
    },
    /// Like `Object`, but children keep their ` -> null` suffixes.
    NestedObject {
        attributes: BTreeMap<String, Change>,
    },
    Map {
        elements: BTreeMap<String, Change>,
    },
    List {
        elements: Vec<Change>,
    },
    /// Like `List`, but children keep their ` -> null` suffixes.
    NestedList {
        elements: Vec<Change>,
    },
    Set {
        elements: Vec<Change>,
    },
    Block {
        attributes: BTreeMap<String, Change>,
        blocks: BTreeMap<String, Vec<Change>>,
        map_blocks: BTreeMap<String, BTreeMap<String, Change>>,
    },
    TypeChange {
        before: Box<Change>,
        after: Box<Change>,
    },
    Computed {
        before: Option<Box<Change>>,
    },
    Sensitive {
        inner: Box<Change>,
        before_sensitive: bool,
        after_sensitive: bool,
    },
    Output {
        inner: Box<Change>,
    },
}

/// One node of the change tree.
#[derive(Debug, Clone)]
pub struct Change {
    pub renderer: Renderer,
    pub action: Action,
    pub replace: bool,
}

impl Change {
    pub fn new(renderer: Renderer, action: Action, replace: bool) -> Change {
        Change {
            renderer,
            action,
            replace,
        }
    }

    /// Render this node at the given indent level.
    pub fn render(&self, indent: usize, opts: &RenderOpts) -> String {
        match &self.renderer {
            Renderer::Primitive { before, after, ty } => {
                primitive::render(self, before, after, *ty, indent, opts)
            }
            Renderer::Object { attributes } => {
                object::render(self, attributes, true, indent, opts)
            }
            Renderer::NestedObject { attributes } => {
                object::render(self, attributes, false, indent, opts)
            }
            Renderer::Map { elements } => map::render(self, elements, indent, opts),
            Renderer::List { elements } => sequence::render(self, elements, true, indent, opts),
            Renderer::NestedList { elements } => {
                sequence::render(self, elements, false, indent, opts)
            }
            Renderer::Set { elements } => sequence::render(self, elements, true, indent, opts),
            Renderer::Block {
                attributes,
                blocks,
                map_blocks,
            } => block::render(self, attributes, blocks, map_blocks, indent, opts),
            Renderer::TypeChange { before, after } => {
                type_change::render(before, after, indent, opts)
            }
            Renderer::Computed { before } => computed::render(self, before, indent, opts),
            Renderer::Sensitive { .. } => sensitive::render(self),
            Renderer::Output { inner } => inner.render(indent, opts),
        }
    }

    /// Warning lines to print above this node, if any.
    pub fn warnings(&self) -> Vec<String> {
        match &self.renderer {
            Renderer::Sensitive {
                inner,
                before_sensitive,
                after_sensitive,
            } => sensitive::warnings(inner, *before_sensitive, *after_sensitive),
            _ => Vec::new(),
        }
    }

    /// Whether this subtree hides a sensitive value that is actually
    /// changing, which makes enclosing blocks elide their bodies.
    pub fn contains_sensitive(&self) -> bool {
        match &self.renderer {
            Renderer::Sensitive { inner, .. } => inner.action != Action::NoOp,
            Renderer::Computed { before } => match before {
                Some(before) => before.action != Action::NoOp && before.contains_sensitive(),
                None => false,
            },
            Renderer::Object { attributes } | Renderer::NestedObject { attributes } => {
                attributes.values().any(Change::contains_sensitive)
            }
            Renderer::Map { elements } => elements.values().any(Change::contains_sensitive),
            Renderer::List { elements }
            | Renderer::NestedList { elements }
            | Renderer::Set { elements } => elements.iter().any(Change::contains_sensitive),
            Renderer::Block { attributes, .. } => {
                attributes.values().any(Change::contains_sensitive)
            }
            Renderer::TypeChange { before, after } => {
                before.contains_sensitive() || after.contains_sensitive()
            }
            Renderer::Primitive { .. } => false,
            Renderer::Output { inner } => inner.contains_sensitive(),
        }
    }

    pub(crate) fn forces_replacement(&self) -> &'static str {
        if self.replace {
            " [red]# forces replacement[reset]"
        } else {
            ""
        }
    }

    pub(crate) fn null_suffix(&self, override_null_suffix: bool) -> &'static str {
        if !override_null_suffix && self.action == Action::Delete {
            " [dark_gray]-> null[reset]"
        } else {
            ""
        }
    }
}

/// Four spaces per level.
pub(crate) fn indent(level: usize) -> String {
    "    ".repeat(level)
}

/// The summary line for hidden unchanged children.
pub(crate) fn unchanged(noun: &str, count: usize) -> String {
    if count == 1 {
        format!("[dark_gray]# ({} unchanged {} hidden)[reset]", count, noun)
    } else {
        format!("[dark_gray]# ({} unchanged {}s hidden)[reset]", count, noun)
    }
}

/// Quote attribute names that are not plain identifiers.
pub(crate) fn escape_attribute_name(name: &str) -> String {
    lazy_static! {
        static ref IDENTIFIER: Regex = Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_-]*$").unwrap();
    }
    if IDENTIFIER.is_match(name) {
        name.to_string()
    } else {
        format!("{:?}", name)
    }
}
