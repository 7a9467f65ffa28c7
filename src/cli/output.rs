//! Output formatting for CLI commands.
//!
//! This module provides formatting utilities for displaying
//! composition results in various formats.

use colored::Colorize;
use std::fmt::Write;
use std::path::Path;
use tabled::{Table, Tabled};

use crate::composer::{CompositionResult, DeploymentUnit, UnitKind};
use crate::config::{OptionHasher, ValidationWarning};
use crate::engine::PlanManifest;

use super::commands::OutputFormat;

/// Output formatter for CLI.
#[derive(Debug)]
pub struct OutputFormatter {
    /// Output format.
    format: OutputFormat,
}

/// Unit row for table display.
#[derive(Tabled)]
struct UnitRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Unit")]
    id: String,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Stack name")]
    stack_name: String,
    #[tabled(rename = "Depends on")]
    depends_on: String,
}

/// Provisioning step row for table display.
#[derive(Tabled)]
struct StepRow {
    #[tabled(rename = "Step")]
    step: usize,
    #[tabled(rename = "Unit")]
    id: String,
    #[tabled(rename = "After")]
    after: String,
}

impl OutputFormatter {
    /// Creates a new output formatter.
    #[must_use]
    pub const fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats the outcome of a validation run.
    #[must_use]
    pub fn format_validation(&self, result: &CompositionResult, show_warnings: bool) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(&serde_json::json!({
                "valid": true,
                "stage": result.stage,
                "deployId": result.deploy_id,
                "fingerprint": result.fingerprint,
                "enabledUnits": result.len(),
                "warnings": result.warnings,
            }))
            .unwrap_or_default(),
            OutputFormat::Text => {
                let mut output = format!("{} Configuration is valid\n\n", "✓".green());
                let _ = writeln!(output, "   Stage: {}", result.stage);
                let _ = writeln!(output, "   Deployment: {}", result.deploy_id);
                let _ = writeln!(output, "   Fingerprint: {}", OptionHasher::short(&result.fingerprint));
                let _ = writeln!(output, "   Enabled units: {}", result.len());
                let _ = writeln!(output, "   Warnings: {}", result.warnings.len());

                if show_warnings {
                    Self::push_warnings(&mut output, &result.warnings);
                }

                output
            }
        }
    }

    /// Formats the enabled units of a composition.
    #[must_use]
    pub fn format_plan(&self, result: &CompositionResult) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(result).unwrap_or_default(),
            OutputFormat::Text => Self::format_plan_text(result),
        }
    }

    fn format_plan_text(result: &CompositionResult) -> String {
        if result.is_empty() {
            return format!("{} No units are enabled.\n", "⚠".yellow());
        }

        let mut output = String::new();
        let _ = writeln!(
            output,
            "\nComposition for stage '{}' (deployment '{}')",
            result.stage, result.deploy_id
        );
        let _ = write!(
            output,
            "   Fingerprint: {}\n\n",
            OptionHasher::short(&result.fingerprint)
        );

        let rows: Vec<UnitRow> = result
            .units
            .iter()
            .enumerate()
            .map(|(i, unit)| UnitRow {
                index: i + 1,
                id: unit.id.to_string(),
                kind: Self::format_kind(unit.kind),
                stack_name: unit.stack_name.clone(),
                depends_on: Self::join_ids(unit),
            })
            .collect();

        output.push_str(&Table::new(rows).to_string());
        output.push('\n');

        let _ = write!(
            output,
            "\nPlan: {} units, {} dependencies\n",
            result.len().to_string().green(),
            result.edges.len().to_string().cyan()
        );

        Self::push_warnings(&mut output, &result.warnings);
        output
    }

    /// Formats the provisioning order, or the dependencies of one unit.
    #[must_use]
    pub fn format_graph(&self, result: &CompositionResult, focus: Option<&DeploymentUnit>) -> String {
        match (self.format, focus) {
            (OutputFormat::Json, Some(unit)) => serde_json::to_string_pretty(&serde_json::json!({
                "unit": unit.id,
                "dependsOn": unit.depends_on,
            }))
            .unwrap_or_default(),
            (OutputFormat::Json, None) => serde_json::to_string_pretty(&serde_json::json!({
                "provisioningOrder": result.provisioning_order,
                "edges": result.edges,
            }))
            .unwrap_or_default(),
            (OutputFormat::Text, Some(unit)) => {
                if unit.depends_on.is_empty() {
                    format!("{} has no dependencies\n", unit.id.to_string().bold())
                } else {
                    let mut output = format!("{} depends on:\n", unit.id.to_string().bold());
                    for id in &unit.depends_on {
                        let _ = writeln!(output, "   - {id}");
                    }
                    output
                }
            }
            (OutputFormat::Text, None) => {
                let rows: Vec<StepRow> = result
                    .provisioning_order
                    .iter()
                    .enumerate()
                    .filter_map(|(i, id)| {
                        let unit = result.unit_by_id(id.as_str()).ok()?;
                        Some(StepRow {
                            step: i + 1,
                            id: id.to_string(),
                            after: Self::join_ids(unit),
                        })
                    })
                    .collect();

                let mut output = String::from("\nProvisioning order\n\n");
                output.push_str(&Table::new(rows).to_string());
                output.push('\n');
                output
            }
        }
    }

    /// Formats the outcome of an export.
    #[must_use]
    pub fn format_export(&self, manifest: &PlanManifest, path: &Path) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(&serde_json::json!({
                "runId": manifest.run_id,
                "path": path.display().to_string(),
                "units": manifest.units.len(),
            }))
            .unwrap_or_default(),
            OutputFormat::Text => format!(
                "{} Wrote {} units to {}\n",
                "✓".green(),
                manifest.units.len(),
                path.display()
            ),
        }
    }

    fn push_warnings(output: &mut String, warnings: &[ValidationWarning]) {
        if warnings.is_empty() {
            return;
        }

        let _ = write!(output, "\n{} Warnings:\n", "⚠".yellow());
        for warning in warnings {
            let _ = writeln!(output, "   - {warning}");
        }
    }

    /// Formats a unit kind with color.
    fn format_kind(kind: UnitKind) -> String {
        match kind {
            UnitKind::Network | UnitKind::SearchDomain | UnitKind::AnalyticsDomain => {
                kind.label().cyan().to_string()
            }
            UnitKind::MigrationAssistance | UnitKind::MskUtility | UnitKind::FetchMigration => {
                kind.label().yellow().to_string()
            }
            _ => kind.label().green().to_string(),
        }
    }

    fn join_ids(unit: &DeploymentUnit) -> String {
        if unit.depends_on.is_empty() {
            return "-".dimmed().to_string();
        }

        unit.depends_on
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composer::{ComposeContext, StackComposer};
    use crate::config::OptionTable;

    fn composition() -> CompositionResult {
        let raw = OptionTable::new()
            .with("stage", "dev")
            .with("domainName", "target")
            .with("engineVersion", "OS_2.11")
            .with("vpcEnabled", true);
        StackComposer::new(ComposeContext::new("us-east-1"))
            .compose(&OptionTable::new(), &raw)
            .unwrap()
    }

    #[test]
    fn test_plan_text_lists_units() {
        colored::control::set_override(false);
        let output = OutputFormatter::new(OutputFormat::Text).format_plan(&composition());
        assert!(output.contains("networkStack-default"));
        assert!(output.contains("OSMigrations-dev-us-east-1-default-OpenSearchDomain"));
        assert!(output.contains("Plan: 2 units, 1 dependencies"));
    }

    #[test]
    fn test_plan_json_is_parseable() {
        let output = OutputFormatter::new(OutputFormat::Json).format_plan(&composition());
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["units"].as_array().unwrap().len(), 2);
        assert_eq!(value["provisioningOrder"][0], "networkStack-default");
    }

    #[test]
    fn test_graph_focus() {
        let result = composition();
        let domain = result.unit(UnitKind::SearchDomain).unwrap();
        let output = OutputFormatter::new(OutputFormat::Json).format_graph(&result, Some(domain));
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["dependsOn"][0], "networkStack-default");
    }
}
