//! Plan file input model.
//!
//! This is the machine-readable plan produced by `plan -json` style
//! tooling: resource changes, detected drift, output changes, and the
//! provider schemas needed to interpret them. The before/after values and
//! the masks stay as raw JSON here; the differ decodes them into its own
//! typed form.

use std::collections::{BTreeMap, HashMap};

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value as Json;

use crate::schema::Provider;

/// A parsed plan file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Plan {
    #[serde(default)]
    pub output_changes: BTreeMap<String, PlanChange>,
    #[serde(default)]
    pub resource_changes: Vec<ResourceChange>,
    #[serde(default)]
    pub resource_drift: Vec<ResourceChange>,
    #[serde(default)]
    pub provider_schemas: HashMap<String, Provider>,
}

impl Plan {
    /// Parse a plan from its JSON text.
    pub fn parse(text: &str) -> Result<Plan> {
        serde_json::from_str(text).context("failed to parse plan file")
    }
}

/// The change recorded for one resource or output.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlanChange {
    #[serde(default)]
    pub actions: Vec<String>,
    #[serde(default)]
    pub before: Json,
    #[serde(default)]
    pub after: Json,
    #[serde(default)]
    pub after_unknown: Json,
    #[serde(default)]
    pub before_sensitive: Json,
    #[serde(default)]
    pub after_sensitive: Json,
    #[serde(default)]
    pub replace_paths: Json,
}

/// One entry of `resource_changes` or `resource_drift`.
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceChange {
    pub address: String,
    #[serde(default)]
    pub previous_address: String,
    #[serde(default)]
    pub module_address: String,
    pub mode: ResourceMode,
    #[serde(rename = "type")]
    pub resource_type: String,
    pub name: String,
    /// The count index or for_each key, kept raw since its JSON type
    /// selects the wording of some delete annotations.
    #[serde(default)]
    pub index: Json,
    #[serde(default)]
    pub deposed: String,
    pub provider_name: String,
    #[serde(default)]
    pub action_reason: Option<ActionReason>,
    pub change: PlanChange,
}

/// Whether a resource is managed or a data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceMode {
    Managed,
    Data,
}

/// Why an action was chosen, for header annotations. Reasons this renderer
/// does not recognise decode to `Unknown` and simply drop the annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionReason {
    Tainted,
    Requested,
    ReplaceTriggeredBy,
    NoResourceConfig,
    NoMoveTarget,
    NoModule,
    WrongRepetition,
    CountIndex,
    EachKey,
    BecauseConfigUnknown,
    BecauseDependencyPending,
    Unknown,
}

impl<'de> Deserialize<'de> for ActionReason {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(match raw.as_str() {
            "tainted" => ActionReason::Tainted,
            "requested" => ActionReason::Requested,
            "replace_triggered_by" => ActionReason::ReplaceTriggeredBy,
            "no_resource_config" => ActionReason::NoResourceConfig,
            "no_move_target" => ActionReason::NoMoveTarget,
            "no_module" => ActionReason::NoModule,
            "wrong_repetition" => ActionReason::WrongRepetition,
            "count_index" => ActionReason::CountIndex,
            "each_key" => ActionReason::EachKey,
            "because_config_unknown" => ActionReason::BecauseConfigUnknown,
            "because_dependency_pending" => ActionReason::BecauseDependencyPending,
            _ => ActionReason::Unknown,
        })
    }
}
