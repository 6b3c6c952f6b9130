//! Human-readable plan rendering.
//!
//! The driver walks the parsed plan in input order: drift first, then the
//! action legend and resource diffs, the totals line, and finally output
//! changes. A resource whose diff cannot be computed produces a one-line
//! diagnostic and rendering continues with the next resource.

use std::collections::HashMap;

use anyhow::{Context, Result};
use serde_json::Value as Json;

use crate::diff::action::Action;
use crate::diff::change::RenderOpts;
use crate::diff::differ::{self, SchemaKind};
use crate::diff::value::Value;
use crate::plan::{ActionReason, Plan, PlanChange, ResourceChange, ResourceMode};
use crate::schema::Provider;

/// Why a resource diff is being rendered, which selects its wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChangeCause {
    Proposed,
    Drift,
}

/// Renders a parsed plan into colour-tagged, human-readable text.
#[derive(Debug, Default)]
pub struct PlanRenderer;

impl PlanRenderer {
    pub fn new() -> Self {
        PlanRenderer
    }

    pub fn render_plan(&self, plan: &Plan) -> Result<String> {
        let mut buf = String::new();

        // Drift: changes made outside the tool since the last apply.
        let mut printed_drift_note = false;
        for drift in &plan.resource_drift {
            match self.render_resource_change(drift, &plan.provider_schemas, ChangeCause::Drift) {
                Ok(Some(diff)) => {
                    if !printed_drift_note {
                        buf.push_str("\n[bold][cyan]Note:[reset][bold] Objects have changed outside of Terraform\n\n");
                        buf.push_str("Terraform detected the following changes made outside of Terraform since the last \"terraform apply\" which may have affected this plan:\n");
                        printed_drift_note = true;
                    }
                    buf.push('\n');
                    buf.push_str(&diff);
                    buf.push('\n');
                }
                Ok(None) => {}
                Err(err) => {
                    buf.push_str(&format!("\n  # {}: {:#}\n", drift.address, err));
                }
            }
        }

        // Count actions first so the legend and the totals only mention
        // what the plan actually contains.
        let mut counts: HashMap<Action, usize> = HashMap::new();
        for resource in &plan.resource_changes {
            let action = Action::from_actions(&resource.change.actions)?;
            if action == Action::NoOp {
                continue;
            }
            if action == Action::Delete && resource.mode != ResourceMode::Managed {
                continue;
            }
            *counts.entry(action).or_insert(0) += 1;
        }
        let count = |action: Action| counts.get(&action).copied().unwrap_or(0);

        if counts.values().sum::<usize>() > 0 {
            buf.push_str("\nTerraform used the selected providers to generate the following execution plan. Resource actions are indicated with the following symbols:\n");
            for action in [
                Action::Create,
                Action::Update,
                Action::Delete,
                Action::DeleteThenCreate,
                Action::CreateThenDelete,
                Action::Read,
            ] {
                if count(action) > 0 {
                    buf.push_str(action.description());
                    buf.push('\n');
                }
            }
            buf.push_str("\nTerraform will perform the following actions:\n");
        }

        for resource in &plan.resource_changes {
            match self.render_resource_change(resource, &plan.provider_schemas, ChangeCause::Proposed)
            {
                Ok(Some(diff)) => {
                    buf.push('\n');
                    buf.push_str(&diff);
                    buf.push('\n');
                }
                Ok(None) => {}
                Err(err) => {
                    buf.push_str(&format!("\n  # {}: {:#}\n", resource.address, err));
                }
            }
        }

        buf.push_str(&format!(
            "\nPlan: {} to add, {} to change, {} to destroy.\n",
            count(Action::Create) + count(Action::DeleteThenCreate) + count(Action::CreateThenDelete),
            count(Action::Update),
            count(Action::Delete) + count(Action::DeleteThenCreate) + count(Action::CreateThenDelete),
        ));

        let mut printed_outputs = false;
        for (name, output) in &plan.output_changes {
            let action = Action::from_actions(&output.actions)?;
            if action == Action::NoOp {
                continue;
            }
            if !printed_outputs {
                buf.push_str("\nChanges to Outputs:\n");
                printed_outputs = true;
            }
            match self.render_output_change(output) {
                Ok(rendered) => {
                    buf.push_str(&format!("{} {} = {}\n", action.symbol(), name, rendered));
                }
                Err(err) => {
                    buf.push_str(&format!("  # {}: {:#}\n", name, err));
                }
            }
        }

        Ok(buf)
    }

    fn render_output_change(&self, output: &PlanChange) -> Result<String> {
        let value = Value::from_change(output)?;
        let change = differ::compute_change_for_output(&value)?;
        Ok(change.render(0, &RenderOpts::default()))
    }

    fn render_resource_change(
        &self,
        resource: &ResourceChange,
        providers: &HashMap<String, Provider>,
        cause: ChangeCause,
    ) -> Result<Option<String>> {
        let action = Action::from_actions(&resource.change.actions)?;

        let moved = !resource.previous_address.is_empty()
            && resource.previous_address != resource.address;
        if action == Action::NoOp && !moved && cause != ChangeCause::Drift {
            return Ok(None);
        }
        if action == Action::Delete && resource.mode != ResourceMode::Managed {
            // Data sources dropping out of state are not worth showing.
            return Ok(None);
        }

        let provider = providers
            .get(&resource.provider_name)
            .with_context(|| format!("no schema for provider {:?}", resource.provider_name))?;
        let schema = provider
            .resource_schemas
            .get(&resource.resource_type)
            .with_context(|| format!("no schema for resource type {:?}", resource.resource_type))?;

        let value = Value::from_change(&resource.change)?;
        let change = differ::compute_change(&value, SchemaKind::Block(&schema.block))?;

        let mut buf = self.change_comment(resource, action, cause);
        let header = self.change_header(resource);
        let body = change.render(0, &RenderOpts::default());
        if action == Action::NoOp {
            buf.push_str(&format!("    {} {}", header, body));
        } else {
            buf.push_str(&format!("{} {} {}", action.symbol(), header, body));
        }
        Ok(Some(buf))
    }

    fn change_comment(
        &self,
        resource: &ResourceChange,
        action: Action,
        cause: ChangeCause,
    ) -> String {
        let mut buf = String::new();

        let mut display_address = resource.address.clone();
        if !resource.deposed.is_empty() {
            display_address = format!("{} (deposed object {})", display_address, resource.deposed);
        }

        match action {
            Action::Create => {
                buf.push_str(&format!(
                    "[bold]  # {}[reset] will be created",
                    display_address
                ));
            }
            Action::Read => {
                buf.push_str(&format!(
                    "[bold]  # {}[reset] will be read during apply",
                    display_address
                ));
                match resource.action_reason {
                    Some(ActionReason::BecauseConfigUnknown) => {
                        buf.push_str("\n  # (config refers to values not yet known)");
                    }
                    Some(ActionReason::BecauseDependencyPending) => {
                        buf.push_str(
                            "\n  # (depends on a resource or a module with changes pending)",
                        );
                    }
                    _ => {}
                }
            }
            Action::Update => match cause {
                ChangeCause::Proposed => {
                    buf.push_str(&format!(
                        "[bold]  # {}[reset] will be updated in-place",
                        display_address
                    ));
                }
                ChangeCause::Drift => {
                    buf.push_str(&format!("[bold]  # {}[reset] has changed", display_address));
                }
            },
            Action::CreateThenDelete | Action::DeleteThenCreate => {
                match resource.action_reason {
                    Some(ActionReason::Tainted) => {
                        buf.push_str(&format!(
                            "[bold]  # {}[reset] is tainted, so must be [bold][red]replaced[reset]",
                            display_address
                        ));
                    }
                    Some(ActionReason::Requested) => {
                        buf.push_str(&format!(
                            "[bold]  # {}[reset] will be [bold][red]replaced[reset], as requested",
                            display_address
                        ));
                    }
                    Some(ActionReason::ReplaceTriggeredBy) => {
                        buf.push_str(&format!(
                            "[bold]  # {}[reset] will be [bold][red]replaced[reset] due to changes in replace_triggered_by",
                            display_address
                        ));
                    }
                    _ => {
                        buf.push_str(&format!(
                            "[bold]  # {}[reset] must be [bold][red]replaced[reset]",
                            display_address
                        ));
                    }
                }
            }
            Action::Delete => {
                match cause {
                    ChangeCause::Proposed => {
                        buf.push_str(&format!(
                            "[bold]  # {}[reset] will be [bold][red]destroyed[reset]",
                            display_address
                        ));
                    }
                    ChangeCause::Drift => {
                        buf.push_str(&format!(
                            "[bold]  # {}[reset] has been deleted",
                            display_address
                        ));
                    }
                }
                // Extra detail goes in separate notes so the main
                // statement stays consistent and easy to scan.
                match resource.action_reason {
                    Some(ActionReason::NoResourceConfig) => {
                        buf.push_str(&format!(
                            "\n  # (because {}.{} is not in configuration)",
                            resource.resource_type, resource.name
                        ));
                    }
                    Some(ActionReason::NoMoveTarget) => {
                        buf.push_str(&format!(
                            "\n  # (because {} was moved to {}, which is not in configuration)",
                            resource.previous_address, resource.address
                        ));
                    }
                    Some(ActionReason::NoModule) => {
                        buf.push_str(&format!(
                            "\n  # (because {} is not in configuration)",
                            resource.module_address
                        ));
                    }
                    Some(ActionReason::WrongRepetition) => match &resource.index {
                        Json::Null => {
                            buf.push_str("\n  # (because resource uses count or for_each)");
                        }
                        Json::Number(_) => {
                            buf.push_str("\n  # (because resource does not use count)");
                        }
                        Json::String(_) => {
                            buf.push_str("\n  # (because resource does not use for_each)");
                        }
                        _ => {}
                    },
                    Some(ActionReason::CountIndex) => {
                        buf.push_str(&format!(
                            "\n  # (because index [{}] is out of range for count)",
                            resource.index
                        ));
                    }
                    Some(ActionReason::EachKey) => {
                        buf.push_str(&format!(
                            "\n  # (because key [{}] is not in for_each map)",
                            resource.index
                        ));
                    }
                    _ => {}
                }
                if !resource.deposed.is_empty() {
                    buf.push_str(
                        "\n  # (left over from a partially-failed replacement of this instance)",
                    );
                }
            }
            Action::NoOp => {
                if !resource.previous_address.is_empty()
                    && resource.previous_address != resource.address
                {
                    buf.push_str(&format!(
                        "[bold]  # {}[reset] has moved to [bold]{}[reset]",
                        resource.previous_address, display_address
                    ));
                } else {
                    buf.push_str(&format!("[bold]  # {}[reset] has changed", display_address));
                }
            }
        }
        buf.push('\n');

        if !resource.previous_address.is_empty()
            && resource.previous_address != resource.address
            && action != Action::NoOp
        {
            buf.push_str(&format!(
                "  # [reset](moved from {})\n",
                resource.previous_address
            ));
        }

        buf
    }

    fn change_header(&self, resource: &ResourceChange) -> String {
        let mode = match resource.mode {
            ResourceMode::Managed => "resource",
            ResourceMode::Data => "data",
        };
        format!("{} \"{}\" \"{}\"", mode, resource.resource_type, resource.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::Colorize;
    use serde_json::json;

    fn render(plan: serde_json::Value) -> String {
        let plan: Plan = serde_json::from_value(plan).unwrap();
        let rendered = PlanRenderer::new().render_plan(&plan).unwrap();
        Colorize::new(true).color(&rendered)
    }

    fn aws_schemas(attributes: serde_json::Value) -> serde_json::Value {
        json!({
            "aws": {
                "resource_schemas": {
                    "aws_instance": {"block": {"attributes": attributes}}
                }
            }
        })
    }

    #[test]
    fn test_create_resource_renders_header_and_totals() {
        let rendered = render(json!({
            "resource_changes": [{
                "address": "aws_instance.web",
                "mode": "managed",
                "type": "aws_instance",
                "name": "web",
                "provider_name": "aws",
                "change": {
                    "actions": ["create"],
                    "before": null,
                    "after": {"id": "i-1"}
                }
            }],
            "provider_schemas": aws_schemas(json!({"id": {"type": "string"}}))
        }));

        assert!(rendered.contains("# aws_instance.web will be created"));
        assert!(rendered.contains("+ resource \"aws_instance\" \"web\" {"));
        assert!(rendered.contains("+ id = \"i-1\""));
        assert!(rendered.contains("  + create"));
        assert!(rendered.contains("Plan: 1 to add, 0 to change, 0 to destroy."));
    }

    #[test]
    fn test_replace_counts_on_both_sides() {
        let rendered = render(json!({
            "resource_changes": [{
                "address": "aws_instance.web",
                "mode": "managed",
                "type": "aws_instance",
                "name": "web",
                "provider_name": "aws",
                "action_reason": "requested",
                "change": {
                    "actions": ["delete", "create"],
                    "before": {"id": "a"},
                    "after": {"id": "b"}
                }
            }],
            "provider_schemas": aws_schemas(json!({"id": {"type": "string"}}))
        }));

        assert!(rendered.contains("will be replaced, as requested"));
        assert!(rendered.contains("-/+ resource \"aws_instance\" \"web\" {"));
        assert!(rendered.contains("Plan: 1 to add, 0 to change, 1 to destroy."));
    }

    #[test]
    fn test_noop_resources_are_skipped() {
        let rendered = render(json!({
            "resource_changes": [{
                "address": "aws_instance.web",
                "mode": "managed",
                "type": "aws_instance",
                "name": "web",
                "provider_name": "aws",
                "change": {
                    "actions": ["no-op"],
                    "before": {"id": "a"},
                    "after": {"id": "a"}
                }
            }],
            "provider_schemas": aws_schemas(json!({"id": {"type": "string"}}))
        }));

        assert!(!rendered.contains("aws_instance.web"));
        assert!(rendered.contains("Plan: 0 to add, 0 to change, 0 to destroy."));
    }

    #[test]
    fn test_moved_noop_renders_move_comment() {
        let rendered = render(json!({
            "resource_changes": [{
                "address": "aws_instance.new_name",
                "previous_address": "aws_instance.old_name",
                "mode": "managed",
                "type": "aws_instance",
                "name": "new_name",
                "provider_name": "aws",
                "change": {
                    "actions": ["no-op"],
                    "before": {"id": "a"},
                    "after": {"id": "a"}
                }
            }],
            "provider_schemas": aws_schemas(json!({"id": {"type": "string"}}))
        }));

        assert!(rendered.contains("# aws_instance.old_name has moved to aws_instance.new_name"));
    }

    #[test]
    fn test_deleted_data_sources_are_hidden() {
        let rendered = render(json!({
            "resource_changes": [{
                "address": "data.aws_instance.lookup",
                "mode": "data",
                "type": "aws_instance",
                "name": "lookup",
                "provider_name": "aws",
                "change": {
                    "actions": ["delete"],
                    "before": {"id": "a"},
                    "after": null
                }
            }],
            "provider_schemas": aws_schemas(json!({"id": {"type": "string"}}))
        }));

        assert!(!rendered.contains("lookup"));
        assert!(rendered.contains("Plan: 0 to add, 0 to change, 0 to destroy."));
    }

    #[test]
    fn test_drift_section_wording() {
        let rendered = render(json!({
            "resource_drift": [{
                "address": "aws_instance.web",
                "mode": "managed",
                "type": "aws_instance",
                "name": "web",
                "provider_name": "aws",
                "change": {
                    "actions": ["update"],
                    "before": {"id": "a"},
                    "after": {"id": "b"}
                }
            }],
            "provider_schemas": aws_schemas(json!({"id": {"type": "string"}}))
        }));

        assert!(rendered.contains("Objects have changed outside of Terraform"));
        assert!(rendered.contains("# aws_instance.web has changed"));
    }

    #[test]
    fn test_drift_delete_wording() {
        let rendered = render(json!({
            "resource_drift": [{
                "address": "aws_instance.web",
                "mode": "managed",
                "type": "aws_instance",
                "name": "web",
                "provider_name": "aws",
                "change": {
                    "actions": ["delete"],
                    "before": {"id": "a"},
                    "after": null
                }
            }],
            "provider_schemas": aws_schemas(json!({"id": {"type": "string"}}))
        }));

        assert!(rendered.contains("# aws_instance.web has been deleted"));
    }

    #[test]
    fn test_tainted_replace_reason() {
        let rendered = render(json!({
            "resource_changes": [{
                "address": "aws_instance.web",
                "mode": "managed",
                "type": "aws_instance",
                "name": "web",
                "provider_name": "aws",
                "action_reason": "tainted",
                "change": {
                    "actions": ["delete", "create"],
                    "before": {"id": "a"},
                    "after": {"id": "b"}
                }
            }],
            "provider_schemas": aws_schemas(json!({"id": {"type": "string"}}))
        }));

        assert!(rendered.contains("is tainted, so must be replaced"));
    }

    #[test]
    fn test_delete_reason_notes() {
        let rendered = render(json!({
            "resource_changes": [{
                "address": "aws_instance.web[0]",
                "mode": "managed",
                "type": "aws_instance",
                "name": "web",
                "index": 3,
                "provider_name": "aws",
                "action_reason": "count_index",
                "change": {
                    "actions": ["delete"],
                    "before": {"id": "a"},
                    "after": null
                }
            }],
            "provider_schemas": aws_schemas(json!({"id": {"type": "string"}}))
        }));

        assert!(rendered.contains("will be destroyed"));
        assert!(rendered.contains("# (because index [3] is out of range for count)"));
    }

    #[test]
    fn test_unrecognized_action_reason_drops_annotation() {
        let rendered = render(json!({
            "resource_changes": [{
                "address": "aws_instance.web",
                "mode": "managed",
                "type": "aws_instance",
                "name": "web",
                "provider_name": "aws",
                "action_reason": "brand_new_reason",
                "change": {
                    "actions": ["delete", "create"],
                    "before": {"id": "a"},
                    "after": {"id": "b"}
                }
            }],
            "provider_schemas": aws_schemas(json!({"id": {"type": "string"}}))
        }));

        assert!(rendered.contains("must be replaced"));
        assert!(!rendered.contains("brand_new_reason"));
    }

    #[test]
    fn test_deposed_objects_annotated() {
        let rendered = render(json!({
            "resource_changes": [{
                "address": "aws_instance.web",
                "mode": "managed",
                "type": "aws_instance",
                "name": "web",
                "deposed": "abcdef01",
                "provider_name": "aws",
                "change": {
                    "actions": ["delete"],
                    "before": {"id": "a"},
                    "after": null
                }
            }],
            "provider_schemas": aws_schemas(json!({"id": {"type": "string"}}))
        }));

        assert!(rendered.contains("aws_instance.web (deposed object abcdef01)"));
        assert!(rendered.contains("left over from a partially-failed replacement"));
    }

    #[test]
    fn test_output_changes_section() {
        let rendered = render(json!({
            "output_changes": {
                "endpoint": {
                    "actions": ["update"],
                    "before": "http://old",
                    "after": "http://new"
                },
                "steady": {
                    "actions": ["no-op"],
                    "before": "same",
                    "after": "same"
                }
            }
        }));

        assert!(rendered.contains("Changes to Outputs:"));
        assert!(rendered.contains("~ endpoint = \"http://old\" -> \"http://new\""));
        assert!(!rendered.contains("steady"));
    }

    #[test]
    fn test_missing_schema_is_contained_per_resource() {
        let rendered = render(json!({
            "resource_changes": [
                {
                    "address": "mystery_thing.x",
                    "mode": "managed",
                    "type": "mystery_thing",
                    "name": "x",
                    "provider_name": "mystery",
                    "change": {
                        "actions": ["create"],
                        "before": null,
                        "after": {"id": "a"}
                    }
                },
                {
                    "address": "aws_instance.web",
                    "mode": "managed",
                    "type": "aws_instance",
                    "name": "web",
                    "provider_name": "aws",
                    "change": {
                        "actions": ["create"],
                        "before": null,
                        "after": {"id": "i-1"}
                    }
                }
            ],
            "provider_schemas": aws_schemas(json!({"id": {"type": "string"}}))
        }));

        // The broken resource reports a diagnostic, the healthy one still
        // renders.
        assert!(rendered.contains("# mystery_thing.x: no schema for provider"));
        assert!(rendered.contains("+ id = \"i-1\""));
    }

    #[test]
    fn test_sensitive_values_never_leak_end_to_end() {
        let rendered = render(json!({
            "resource_changes": [{
                "address": "aws_instance.web",
                "mode": "managed",
                "type": "aws_instance",
                "name": "web",
                "provider_name": "aws",
                "change": {
                    "actions": ["update"],
                    "before": {"id": "hunter2"},
                    "after": {"id": "hunter3"},
                    "before_sensitive": {"id": true},
                    "after_sensitive": {"id": true}
                }
            }],
            "provider_schemas": aws_schemas(json!({"id": {"type": "string"}}))
        }));

        assert!(rendered.contains("(sensitive value)"));
        assert!(!rendered.contains("hunter2"));
        assert!(!rendered.contains("hunter3"));
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let plan = json!({
            "resource_changes": [{
                "address": "aws_instance.web",
                "mode": "managed",
                "type": "aws_instance",
                "name": "web",
                "provider_name": "aws",
                "change": {
                    "actions": ["update"],
                    "before": {"id": "a", "tags": {"x": "1", "y": "2"}},
                    "after": {"id": "b", "tags": {"x": "2", "z": "3"}}
                }
            }],
            "provider_schemas": aws_schemas(json!({
                "id": {"type": "string"},
                "tags": {"type": ["map", "string"]}
            }))
        });

        assert_eq!(render(plan.clone()), render(plan));
    }
}
