//! Cross-field checks on bound options.
//!
//! Type and closed-set errors are fatal and raised while binding; this
//! module only reports recoverable inconsistencies. Warnings never stop a
//! composition run.

use serde::Serialize;
use tracing::{debug, warn};

use super::options::ComposerOptions;
use super::schema;
use super::value::RawConfig;

/// Validator for composer options.
#[derive(Debug, Default)]
pub struct OptionValidator;

/// A single recoverable inconsistency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationWarning {
    /// The option the warning is about.
    pub field: String,
    /// The warning message.
    pub message: String,
}

/// Validation result containing all warnings found.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    /// List of warnings (non-fatal issues).
    pub warnings: Vec<ValidationWarning>,
}

impl OptionValidator {
    /// Creates a new validator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Checks bound options against the raw configuration they came from.
    #[must_use]
    pub fn validate(&self, options: &ComposerOptions, raw: &RawConfig) -> ValidationReport {
        let mut report = ValidationReport::default();

        Self::validate_addon(options, &mut report);
        Self::validate_access(options, &mut report);
        Self::validate_stage(&options.stage, &mut report);
        Self::validate_names(raw, &mut report);

        for warning in &report.warnings {
            warn!("{warning}");
        }
        debug!("Option validation finished with {} warnings", report.warnings.len());

        report
    }

    fn validate_addon(options: &ComposerOptions, report: &mut ValidationReport) {
        if !options.is_addon() {
            return;
        }

        if options.network.vpc_id.is_some() {
            report.push(
                "vpcId",
                "Addon deployments will use the original deployment 'vpcId' regardless of passed 'vpcId' values",
            );
        }

        if options.migration.enabled {
            report.push(
                "migrationAssistanceEnabled",
                "Addon deployments reuse the original deployment's migration infrastructure; this flag is ignored",
            );
        }
    }

    fn validate_access(options: &ComposerOptions, report: &mut ValidationReport) {
        if options.domain.open_access_policy_enabled && options.domain.access_policies.is_some() {
            report.push(
                "accessPolicies",
                "Ignored because 'openAccessPolicyEnabled' grants open access to the domain",
            );
        }
    }

    fn validate_stage(stage: &str, report: &mut ValidationReport) {
        if !is_valid_stage(stage) {
            report.push(
                "stage",
                format!("Stage '{stage}' should be alphanumeric with hyphens, starting with a letter"),
            );
        }
    }

    fn validate_names(raw: &RawConfig, report: &mut ValidationReport) {
        let unknown: Vec<String> = raw
            .names()
            .filter(|name| schema::lookup(name).is_none())
            .map(str::to_string)
            .collect();

        for name in unknown {
            report.push(name, "Unrecognized option is ignored");
        }
    }
}

/// Stages become part of provisioning names.
/// They must start with a letter and contain only letters, digits and hyphens.
fn is_valid_stage(stage: &str) -> bool {
    let mut chars = stage.chars();

    let Some(first) = chars.next() else {
        return false;
    };

    first.is_ascii_alphabetic() && chars.all(|c| c.is_ascii_alphanumeric() || c == '-')
}

impl ValidationReport {
    fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ValidationWarning {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Returns the number of warnings.
    #[must_use]
    pub const fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// Returns true if a warning was raised for the given option.
    #[must_use]
    pub fn has_warning_for(&self, field: &str) -> bool {
        self.warnings.iter().any(|w| w.field == field)
    }
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{OptionTable, ResolvedOptions};

    fn validate(raw: &RawConfig) -> ValidationReport {
        let resolved = ResolvedOptions::resolve_all(&OptionTable::new(), raw).unwrap();
        let options = ComposerOptions::bind(&resolved).unwrap();
        OptionValidator::new().validate(&options, raw)
    }

    fn base() -> RawConfig {
        OptionTable::new().with("stage", "dev").with("domainName", "target")
    }

    #[test]
    fn test_clean_options_have_no_warnings() {
        assert_eq!(validate(&base()).warning_count(), 0);
    }

    #[test]
    fn test_addon_with_vpc_warns() {
        let raw = base()
            .with("addOnMigrationDeployId", "second")
            .with("vpcId", "vpc-123");
        let report = validate(&raw);
        assert!(report.has_warning_for("vpcId"));
    }

    #[test]
    fn test_unknown_option_warns() {
        let report = validate(&base().with("domainNmae", "typo"));
        assert!(report.has_warning_for("domainNmae"));
    }

    #[test]
    fn test_stage_names() {
        assert!(is_valid_stage("dev"));
        assert!(is_valid_stage("Beta-2"));
        assert!(!is_valid_stage(""));
        assert!(!is_valid_stage("2dev"));
        assert!(!is_valid_stage("dev_test"));
    }
}
