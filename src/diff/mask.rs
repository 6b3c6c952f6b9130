//! Unknown/sensitive masks and replace paths.
//!
//! Plan files carry three parallel trees alongside the data: the unknown
//! mask, the before-sensitive mask, and the after-sensitive mask. Each mask
//! mirrors the shape of its value, except that a scalar `true` applies to
//! the entire subtree beneath it. Replace paths are a separate set of paths
//! into the value marking positions that force resource replacement.

use std::collections::BTreeMap;

use anyhow::{bail, Result};
use serde_json::Value as Json;

/// A mask over a value tree: a scalar flag, per-index flags, or per-key
/// flags.
#[derive(Debug, Clone, PartialEq)]
pub enum Mask {
    Scalar(bool),
    Seq(Vec<Mask>),
    Map(BTreeMap<String, Mask>),
}

impl Default for Mask {
    fn default() -> Self {
        Mask::Scalar(false)
    }
}

impl Mask {
    /// Decode a mask from its JSON wire form. Anything other than booleans,
    /// arrays, objects, or null is malformed and fatal.
    pub fn from_json(value: &Json) -> Result<Mask> {
        match value {
            Json::Null => Ok(Mask::default()),
            Json::Bool(flag) => Ok(Mask::Scalar(*flag)),
            Json::Array(items) => {
                let masks = items.iter().map(Mask::from_json).collect::<Result<_>>()?;
                Ok(Mask::Seq(masks))
            }
            Json::Object(entries) => {
                let mut masks = BTreeMap::new();
                for (key, entry) in entries {
                    masks.insert(key.clone(), Mask::from_json(entry)?);
                }
                Ok(Mask::Map(masks))
            }
            other => bail!("malformed mask value: {}", other),
        }
    }

    /// A mask flagging every named key as true, used when an unknown scalar
    /// needs to be expanded over a nested type's declared attributes.
    pub fn all_keys<'a>(keys: impl Iterator<Item = &'a String>) -> Mask {
        Mask::Map(
            keys.map(|key| (key.clone(), Mask::Scalar(true)))
                .collect(),
        )
    }

    /// Whether the mask is scalar true at this node.
    pub fn is_true(&self) -> bool {
        matches!(self, Mask::Scalar(true))
    }

    /// The mask for a named child. Scalar masks apply to the whole subtree
    /// and are inherited.
    pub fn key(&self, key: &str) -> Mask {
        match self {
            Mask::Scalar(flag) => Mask::Scalar(*flag),
            Mask::Map(masks) => masks.get(key).cloned().unwrap_or_default(),
            Mask::Seq(_) => Mask::default(),
        }
    }

    /// The mask for an indexed child. Scalar masks are inherited.
    pub fn index(&self, ix: usize) -> Mask {
        match self {
            Mask::Scalar(flag) => Mask::Scalar(*flag),
            Mask::Seq(masks) => masks.get(ix).cloned().unwrap_or_default(),
            Mask::Map(_) => Mask::default(),
        }
    }
}

/// One step in a replace path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathStep {
    Key(String),
    Index(usize),
}

/// The set of paths whose values force the resource to be replaced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplacePaths(Vec<Vec<PathStep>>);

impl ReplacePaths {
    /// Decode from the wire form: an array of paths, each an array of
    /// string keys or numeric indices.
    pub fn from_json(value: &Json) -> Result<ReplacePaths> {
        let paths = match value {
            Json::Null => Vec::new(),
            Json::Array(raw_paths) => {
                let mut paths = Vec::with_capacity(raw_paths.len());
                for raw_path in raw_paths {
                    let Json::Array(raw_steps) = raw_path else {
                        bail!("malformed replace path: {}", raw_path);
                    };
                    let mut steps = Vec::with_capacity(raw_steps.len());
                    for raw_step in raw_steps {
                        match raw_step {
                            Json::String(key) => steps.push(PathStep::Key(key.clone())),
                            Json::Number(n) => match n.as_u64() {
                                Some(ix) => steps.push(PathStep::Index(ix as usize)),
                                None => bail!("malformed replace path index: {}", n),
                            },
                            other => bail!("malformed replace path step: {}", other),
                        }
                    }
                    paths.push(steps);
                }
                paths
            }
            other => bail!("malformed replace paths: {}", other),
        };
        Ok(ReplacePaths(paths))
    }

    /// Whether any path terminates at this node, forcing replacement here.
    pub fn matches(&self) -> bool {
        self.0.iter().any(|path| path.is_empty())
    }

    /// The paths remaining after descending into the named key.
    pub fn step_key(&self, key: &str) -> ReplacePaths {
        self.step(|step| matches!(step, PathStep::Key(k) if k == key))
    }

    /// The paths remaining after descending into the indexed element.
    pub fn step_index(&self, ix: usize) -> ReplacePaths {
        self.step(|step| matches!(step, PathStep::Index(i) if *i == ix))
    }

    fn step(&self, matches_first: impl Fn(&PathStep) -> bool) -> ReplacePaths {
        ReplacePaths(
            self.0
                .iter()
                .filter(|path| path.first().map(&matches_first).unwrap_or(false))
                .map(|path| path[1..].to_vec())
                .collect(),
        )
    }
}
