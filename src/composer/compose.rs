//! The stack composer.
//!
//! One call to [`StackComposer::compose`] turns a raw configuration and a
//! default table into a [`CompositionResult`]: options are resolved and bound,
//! access policies are derived, each descriptor is evaluated in order, and the
//! dependency graph fixes the provisioning order.

use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::config::{
    ComposerOptions, DefaultTable, OptionHasher, OptionValidator, RawConfig, ResolvedOptions,
};
use crate::error::Result;
use crate::policy::{PolicyStatement, parse_policies};

use super::descriptors::DESCRIPTORS;
use super::graph::DependencyGraph;
use super::params::ParamContext;
use super::result::{CompositionResult, DependencyEdge};
use super::units::{DeploymentUnit, UnitKind, UnitParams};

/// Prefix of every provisioning name.
pub const STACK_NAME_PREFIX: &str = "OSMigrations";

/// Deployment target of a composition run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposeContext {
    /// Target region.
    pub region: String,
    /// Target account, if known.
    pub account: Option<String>,
    /// Application registry every unit is associated with.
    pub app_registry_arn: Option<String>,
}

impl ComposeContext {
    /// Creates a context for a region.
    #[must_use]
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            account: None,
            app_registry_arn: None,
        }
    }

    /// Sets the target account.
    #[must_use]
    pub fn with_account(mut self, account: impl Into<String>) -> Self {
        self.account = Some(account.into());
        self
    }

    /// Sets the application registry.
    #[must_use]
    pub fn with_app_registry_arn(mut self, arn: impl Into<String>) -> Self {
        self.app_registry_arn = Some(arn.into());
        self
    }

    /// Resource ARN covering every path of a search domain.
    fn domain_resource(&self, domain_name: &str) -> String {
        format!(
            "arn:aws:es:{}:{}:domain/{domain_name}/*",
            self.region,
            self.account.as_deref().unwrap_or("*")
        )
    }
}

/// Composes deployment units from configuration.
#[derive(Debug)]
pub struct StackComposer {
    context: ComposeContext,
    validator: OptionValidator,
    hasher: OptionHasher,
}

impl StackComposer {
    /// Creates a composer for a deployment target.
    #[must_use]
    pub const fn new(context: ComposeContext) -> Self {
        Self {
            context,
            validator: OptionValidator::new(),
            hasher: OptionHasher::new(),
        }
    }

    /// Returns the deployment target.
    #[must_use]
    pub const fn context(&self) -> &ComposeContext {
        &self.context
    }

    /// Runs one composition.
    ///
    /// # Errors
    ///
    /// Returns the first configuration, policy, or graph error. Nothing is
    /// returned partially: on error no unit is produced.
    #[instrument(skip_all, fields(region = %self.context.region))]
    pub fn compose(&self, defaults: &DefaultTable, raw: &RawConfig) -> Result<CompositionResult> {
        let resolved = ResolvedOptions::resolve_all(defaults, raw)?;
        let options = ComposerOptions::bind(&resolved)?;
        let report = self.validator.validate(&options, raw);

        info!(
            "Composing stage '{}' for deployment '{}'",
            options.stage,
            options.deploy_id()
        );

        let access_policies = self.access_policies(&options)?;

        let mut params = ParamContext {
            options: &options,
            access_policies: access_policies.as_deref(),
            network: None,
        };
        let mut units: Vec<DeploymentUnit> = Vec::new();

        for descriptor in DESCRIPTORS {
            let enabled = descriptor.is_enabled(&options, |kind| units.iter().any(|u| u.kind == kind));
            if !enabled {
                debug!("Unit not enabled: {}", descriptor.kind);
                continue;
            }

            let unit = self.unit(&options, descriptor.kind, params.build(descriptor.kind)?);
            if descriptor.kind == UnitKind::Network {
                params.network = Some(unit.id.clone());
            }
            debug!("Unit enabled: {}", unit.id);
            units.push(unit);
        }

        let kinds: Vec<UnitKind> = units.iter().map(|u| u.kind).collect();
        let graph = DependencyGraph::build(&kinds)?;

        let id_of = |kind: UnitKind| kind.unit_id(options.deploy_id());

        for unit in &mut units {
            unit.depends_on = graph.dependencies_of(unit.kind).into_iter().map(id_of).collect();
        }

        let edges = graph
            .edges()
            .into_iter()
            .map(|(dependency, dependent)| DependencyEdge {
                unit: id_of(dependent),
                depends_on: id_of(dependency),
            })
            .collect();

        let provisioning_order = graph.provisioning_order().iter().copied().map(id_of).collect();

        info!(
            "Composed {} units with {} dependencies",
            units.len(),
            graph.edge_count()
        );

        Ok(CompositionResult {
            run_id: Uuid::new_v4(),
            created_at: chrono::Utc::now(),
            fingerprint: self.hasher.fingerprint(&resolved),
            stage: options.stage.clone(),
            deploy_id: options.deploy_id().to_string(),
            units,
            edges,
            provisioning_order,
            warnings: report.warnings,
        })
    }

    /// Open access replaces any supplied document.
    fn access_policies(&self, options: &ComposerOptions) -> Result<Option<Vec<PolicyStatement>>> {
        let domain = &options.domain;

        if domain.open_access_policy_enabled {
            let resource = self.context.domain_resource(&domain.domain_name);
            return Ok(Some(vec![PolicyStatement::allow_all(resource)]));
        }

        match &domain.access_policies {
            Some(doc) => Ok(Some(parse_policies("accessPolicies", doc)?)),
            None => Ok(None),
        }
    }

    fn unit(&self, options: &ComposerOptions, kind: UnitKind, params: UnitParams) -> DeploymentUnit {
        let deploy_id = options.deploy_id();

        let suffix = if kind.is_per_deployment() {
            format!("{deploy_id}-{}", kind.name_suffix())
        } else {
            kind.name_suffix().to_string()
        };

        DeploymentUnit {
            id: kind.unit_id(deploy_id),
            kind,
            stack_name: format!(
                "{STACK_NAME_PREFIX}-{}-{}-{suffix}",
                options.stage, self.context.region
            ),
            description: kind.description().to_string(),
            params,
            depends_on: Vec::new(),
            app_registry_arn: self.context.app_registry_arn.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OptionTable;

    fn composer() -> StackComposer {
        StackComposer::new(ComposeContext::new("us-east-1").with_account("123456789012"))
    }

    fn base() -> RawConfig {
        OptionTable::new()
            .with("stage", "dev")
            .with("domainName", "target")
            .with("engineVersion", "OS_2.11")
    }

    #[test]
    fn test_minimal_composition_is_domain_only() {
        let result = composer().compose(&OptionTable::new(), &base()).unwrap();
        assert_eq!(result.len(), 1);
        let domain = result.unit(UnitKind::SearchDomain).unwrap();
        assert_eq!(domain.id.as_str(), "openSearchDomainStack-default");
        assert_eq!(domain.stack_name, "OSMigrations-dev-us-east-1-default-OpenSearchDomain");
        assert!(domain.depends_on.is_empty());
    }

    #[test]
    fn test_shared_unit_names() {
        let raw = base()
            .with("vpcEnabled", true)
            .with("migrationAssistanceEnabled", true);
        let result = composer().compose(&OptionTable::new(), &raw).unwrap();
        let msk = result.unit(UnitKind::MskUtility).unwrap();
        assert_eq!(msk.stack_name, "OSMigrations-dev-us-east-1-MSKUtility");
        assert!(result.has_edge(UnitKind::MigrationAssistance, UnitKind::MskUtility));
    }

    #[test]
    fn test_open_access_policy() {
        let raw = base().with("openAccessPolicyEnabled", true);
        let result = composer().compose(&OptionTable::new(), &raw).unwrap();
        let Some(UnitParams::SearchDomain(params)) =
            result.unit(UnitKind::SearchDomain).map(|u| u.params.clone())
        else {
            panic!("search domain missing");
        };
        let policies = params.access_policies.unwrap();
        assert_eq!(policies.len(), 1);
        assert_eq!(
            policies[0].resources,
            vec!["arn:aws:es:us-east-1:123456789012:domain/target/*".to_string()]
        );
    }

    #[test]
    fn test_open_access_without_account() {
        let composer = StackComposer::new(ComposeContext::new("eu-west-1"));
        let raw = base().with("openAccessPolicyEnabled", true);
        let result = composer.compose(&OptionTable::new(), &raw).unwrap();
        let Some(UnitParams::SearchDomain(params)) =
            result.unit(UnitKind::SearchDomain).map(|u| u.params.clone())
        else {
            panic!("search domain missing");
        };
        assert_eq!(
            params.access_policies.unwrap()[0].resources,
            vec!["arn:aws:es:eu-west-1:*:domain/target/*".to_string()]
        );
    }

    #[test]
    fn test_version_not_required_without_domain() {
        let raw = OptionTable::new()
            .with("stage", "dev")
            .with("domainName", "target")
            .with("searchDomainEnabled", false)
            .with("vpcEnabled", true);
        let result = composer().compose(&OptionTable::new(), &raw).unwrap();
        assert!(!result.contains(UnitKind::SearchDomain));
        assert!(result.contains(UnitKind::Network));
    }

    #[test]
    fn test_app_registry_tag_on_every_unit() {
        let composer = StackComposer::new(
            ComposeContext::new("us-east-1").with_app_registry_arn("arn:aws:servicecatalog:app/1"),
        );
        let raw = base().with("vpcEnabled", true).with("migrationConsoleServiceEnabled", true);
        let result = composer.compose(&OptionTable::new(), &raw).unwrap();
        assert!(result.len() >= 2);
        assert!(
            result
                .units
                .iter()
                .all(|u| u.app_registry_arn.as_deref() == Some("arn:aws:servicecatalog:app/1"))
        );
    }
}
