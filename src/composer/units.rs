//! Deployment unit types.
//!
//! A deployment unit is one independently provisionable component. Each unit
//! carries the parameter set resolved for its kind and the ids of the units it
//! must be provisioned after.

use serde::Serialize;
use std::fmt;

use crate::config::{EbsOptions, EngineVersion, NodeOptions, RemovalPolicy, SecurityOptions, TlsSecurityPolicy};
use crate::policy::PolicyStatement;

/// Every kind of unit the composer can produce, in composition order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum UnitKind {
    /// Shared network.
    Network,
    /// Primary search domain (migration target).
    SearchDomain,
    /// Migration infrastructure (message broker cluster).
    MigrationAssistance,
    /// Message-broker utility resources.
    MskUtility,
    /// Analytics search domain.
    AnalyticsDomain,
    /// Analytics telemetry collector.
    AnalyticsCollector,
    /// Offline historical data migration.
    FetchMigration,
    /// Capture proxy colocated with the mock source cluster.
    CaptureProxyEs,
    /// Traffic replayer.
    TrafficReplayer,
    /// Mock source cluster.
    Elasticsearch,
    /// Standalone capture proxy.
    CaptureProxy,
    /// Kafka broker service.
    KafkaBroker,
    /// Kafka zookeeper service.
    KafkaZookeeper,
    /// Operator console.
    MigrationConsole,
}

/// Stable identifier of a unit within one composition run.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct UnitId(String);

/// Where the shared network comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "source", rename_all = "camelCase")]
pub enum NetworkSource {
    /// A new network is created.
    Create,
    /// An existing network is imported.
    Import {
        /// Network identifier.
        vpc_id: String,
    },
    /// The network of another deployment is reused.
    Reuse {
        /// Deployment whose network is reused.
        deploy_id: String,
    },
}

/// Network parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkParams {
    /// Network source.
    pub source: NetworkSource,
    /// Number of availability zones.
    pub availability_zone_count: Option<u32>,
    /// Whether analytics endpoints are needed in the network.
    pub migration_analytics_enabled: bool,
    /// Add-on deployment id, if any.
    pub addon_deploy_id: Option<String>,
}

/// Primary search domain parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainParams {
    /// Network the domain is placed into.
    pub network: Option<UnitId>,
    /// Domain name.
    pub domain_name: String,
    /// Engine family and version.
    pub engine_version: EngineVersion,
    /// Node layout.
    pub nodes: NodeOptions,
    /// Access policies; `None` means no explicit policy.
    pub access_policies: Option<Vec<PolicyStatement>>,
    /// Allow unsigned basic-auth requests.
    pub use_unsigned_basic_auth: Option<bool>,
    /// Fine-grained access control manager user ARN.
    pub fine_grained_manager_user_arn: Option<String>,
    /// Fine-grained access control manager user name.
    pub fine_grained_manager_user_name: Option<String>,
    /// Secret holding the manager user's password.
    pub fine_grained_manager_user_secret_arn: Option<String>,
    /// Create a demo admin user.
    pub enable_demo_admin: Option<bool>,
    /// Minimum TLS policy.
    pub tls_security_policy: Option<TlsSecurityPolicy>,
    /// Block storage.
    pub ebs: EbsOptions,
    /// Encryption and logging.
    pub security: SecurityOptions,
    /// Subnets the domain is placed into.
    pub vpc_subnet_ids: Option<Vec<String>>,
    /// Security groups attached to the domain.
    pub vpc_security_group_ids: Option<Vec<String>>,
    /// Number of availability zones.
    pub availability_zone_count: Option<u32>,
    /// Removal policy.
    pub removal_policy: Option<RemovalPolicy>,
}

/// Migration assistance parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationParams {
    /// Network reference.
    pub network: UnitId,
    /// Existing broker cluster to import.
    pub msk_import_arn: Option<String>,
    /// Expose public broker endpoints.
    pub msk_enable_public_endpoints: Option<bool>,
    /// Public access restriction target.
    pub msk_restrict_public_access_to: Option<String>,
    /// Public access restriction kind.
    pub msk_restrict_public_access_type: Option<String>,
    /// Number of broker nodes.
    pub msk_broker_node_count: Option<u32>,
}

/// Message-broker utility parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MskUtilityParams {
    /// Network reference.
    pub network: UnitId,
    /// Expose public broker endpoints.
    pub msk_enable_public_endpoints: Option<bool>,
}

/// Analytics domain parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsDomainParams {
    /// Network reference.
    pub network: UnitId,
    /// Engine family and version.
    pub engine_version: EngineVersion,
    /// Node layout.
    pub nodes: NodeOptions,
    /// Block storage.
    pub ebs: EbsOptions,
    /// Encryption and logging.
    pub security: SecurityOptions,
    /// Subnets the domain is placed into.
    pub vpc_subnet_ids: Option<Vec<String>>,
    /// Security groups attached to the domain.
    pub vpc_security_group_ids: Option<Vec<String>>,
    /// Number of availability zones.
    pub availability_zone_count: Option<u32>,
}

/// Analytics collector parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectorParams {
    /// Network reference.
    pub network: UnitId,
    /// Analytics domain the collector ships to.
    pub analytics_domain: UnitId,
    /// Collector configuration file.
    pub otel_config_file_path: Option<String>,
}

/// Offline data migration parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchMigrationParams {
    /// Network reference.
    pub network: UnitId,
    /// Data pipeline template path.
    pub pipeline_template_path: Option<String>,
    /// Source cluster endpoint.
    pub source_endpoint: Option<String>,
}

/// Capture proxy parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureProxyParams {
    /// Network reference.
    pub network: UnitId,
    /// Proxy runs next to the mock source cluster.
    pub colocated_source: bool,
    /// Custom source cluster endpoint.
    pub source_endpoint: Option<String>,
}

/// Traffic replayer parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayerParams {
    /// Network reference.
    pub network: UnitId,
    /// Authenticate with fine-grained access control.
    pub enable_cluster_fgac_auth: Option<bool>,
    /// Add-on deployment id, if any.
    pub addon_deploy_id: Option<String>,
    /// Custom target endpoint.
    pub target_endpoint: Option<String>,
    /// Custom Kafka consumer group id.
    pub group_id: Option<String>,
    /// Extra command-line arguments.
    pub extra_args: Option<String>,
}

/// Parameters of units that only need a network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceParams {
    /// Network reference.
    pub network: UnitId,
}

/// Operator console parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsoleParams {
    /// Network reference.
    pub network: UnitId,
    /// Whether offline data migration is part of this deployment.
    pub fetch_migration_enabled: bool,
}

/// Resolved parameter set of a unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum UnitParams {
    /// Network.
    Network(NetworkParams),
    /// Primary search domain.
    SearchDomain(DomainParams),
    /// Migration assistance.
    MigrationAssistance(MigrationParams),
    /// Message-broker utility.
    MskUtility(MskUtilityParams),
    /// Analytics domain.
    AnalyticsDomain(AnalyticsDomainParams),
    /// Analytics collector.
    AnalyticsCollector(CollectorParams),
    /// Offline data migration.
    FetchMigration(FetchMigrationParams),
    /// Either capture proxy variant.
    CaptureProxy(CaptureProxyParams),
    /// Traffic replayer.
    TrafficReplayer(ReplayerParams),
    /// Mock source cluster and Kafka services.
    Service(ServiceParams),
    /// Operator console.
    MigrationConsole(ConsoleParams),
}

/// One provisionable component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentUnit {
    /// Unit id.
    pub id: UnitId,
    /// Unit kind.
    pub kind: UnitKind,
    /// Name used by the provisioning engine.
    pub stack_name: String,
    /// Human-readable description.
    pub description: String,
    /// Resolved parameters.
    pub params: UnitParams,
    /// Units that must be provisioned first.
    pub depends_on: Vec<UnitId>,
    /// Application registry the unit is associated with.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_registry_arn: Option<String>,
}

impl UnitKind {
    /// All kinds, in composition order.
    pub const ALL: [Self; 14] = [
        Self::Network,
        Self::SearchDomain,
        Self::MigrationAssistance,
        Self::MskUtility,
        Self::AnalyticsDomain,
        Self::AnalyticsCollector,
        Self::FetchMigration,
        Self::CaptureProxyEs,
        Self::TrafficReplayer,
        Self::Elasticsearch,
        Self::CaptureProxy,
        Self::KafkaBroker,
        Self::KafkaZookeeper,
        Self::MigrationConsole,
    ];

    /// Returns true for units whose name embeds the deployment id.
    #[must_use]
    pub const fn is_per_deployment(self) -> bool {
        matches!(self, Self::Network | Self::SearchDomain | Self::TrafficReplayer)
    }

    /// Returns the id of this kind's unit for a deployment.
    #[must_use]
    pub fn unit_id(self, deploy_id: &str) -> UnitId {
        let base = match self {
            Self::Network => "networkStack",
            Self::SearchDomain => "openSearchDomainStack",
            Self::MigrationAssistance => "migrationInfraStack",
            Self::MskUtility => "mskUtilityStack",
            Self::AnalyticsDomain => "openSearchAnalyticsStack",
            Self::AnalyticsCollector => "migration-analytics",
            Self::FetchMigration => "fetchMigrationStack",
            Self::CaptureProxyEs => "capture-proxy-es",
            Self::TrafficReplayer => "traffic-replayer",
            Self::Elasticsearch => "elasticsearch",
            Self::CaptureProxy => "capture-proxy",
            Self::KafkaBroker => "kafka-broker",
            Self::KafkaZookeeper => "kafka-zookeeper",
            Self::MigrationConsole => "migration-console",
        };

        if self.is_per_deployment() {
            UnitId(format!("{base}-{deploy_id}"))
        } else {
            UnitId(base.to_string())
        }
    }

    /// Returns the provisioning name suffix of this kind.
    #[must_use]
    pub const fn name_suffix(self) -> &'static str {
        match self {
            Self::Network => "NetworkInfra",
            Self::SearchDomain => "OpenSearchDomain",
            Self::MigrationAssistance => "MigrationInfra",
            Self::MskUtility => "MSKUtility",
            Self::AnalyticsDomain => "OpenSearchAnalytics",
            Self::AnalyticsCollector => "MigrationAnalytics",
            Self::FetchMigration => "FetchMigration",
            Self::CaptureProxyEs => "CaptureProxyES",
            Self::TrafficReplayer => "TrafficReplayer",
            Self::Elasticsearch => "Elasticsearch",
            Self::CaptureProxy => "CaptureProxy",
            Self::KafkaBroker => "KafkaBroker",
            Self::KafkaZookeeper => "KafkaZookeeper",
            Self::MigrationConsole => "MigrationConsole",
        }
    }

    /// Returns a human-readable description of this kind.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Network => "Networking for an OpenSearch Service domain",
            Self::SearchDomain => "An OpenSearch Service domain",
            Self::MigrationAssistance => "Resources to assist migrating an OpenSearch Service domain",
            Self::MskUtility => "Custom resources adding functionality to the message broker cluster",
            Self::AnalyticsDomain => "The analytics OpenSearch cluster",
            Self::AnalyticsCollector => "The OpenTelemetry collector for migration analytics",
            Self::FetchMigration => "Resources to migrate historical data to an OpenSearch Service domain",
            Self::CaptureProxyEs => "The Capture Proxy/Elasticsearch service",
            Self::TrafficReplayer => "The Traffic Replayer service",
            Self::Elasticsearch => "A mock single-node Elasticsearch source cluster",
            Self::CaptureProxy => "The Capture Proxy service",
            Self::KafkaBroker => "The Kafka Broker service",
            Self::KafkaZookeeper => "The Kafka Zookeeper service",
            Self::MigrationConsole => "The Migration Console service",
        }
    }

    /// Returns the display label of this kind.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::SearchDomain => "search-domain",
            Self::MigrationAssistance => "migration-assistance",
            Self::MskUtility => "msk-utility",
            Self::AnalyticsDomain => "analytics-domain",
            Self::AnalyticsCollector => "analytics-collector",
            Self::FetchMigration => "fetch-migration",
            Self::CaptureProxyEs => "capture-proxy-es",
            Self::TrafficReplayer => "traffic-replayer",
            Self::Elasticsearch => "elasticsearch",
            Self::CaptureProxy => "capture-proxy",
            Self::KafkaBroker => "kafka-broker",
            Self::KafkaZookeeper => "kafka-zookeeper",
            Self::MigrationConsole => "migration-console",
        }
    }
}

impl UnitId {
    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl DeploymentUnit {
    /// Returns the network this unit is placed into, if any.
    #[must_use]
    pub const fn network(&self) -> Option<&UnitId> {
        match &self.params {
            UnitParams::Network(_) => None,
            UnitParams::SearchDomain(p) => p.network.as_ref(),
            UnitParams::MigrationAssistance(MigrationParams { network, .. })
            | UnitParams::MskUtility(MskUtilityParams { network, .. })
            | UnitParams::AnalyticsDomain(AnalyticsDomainParams { network, .. })
            | UnitParams::AnalyticsCollector(CollectorParams { network, .. })
            | UnitParams::FetchMigration(FetchMigrationParams { network, .. })
            | UnitParams::CaptureProxy(CaptureProxyParams { network, .. })
            | UnitParams::TrafficReplayer(ReplayerParams { network, .. })
            | UnitParams::Service(ServiceParams { network })
            | UnitParams::MigrationConsole(ConsoleParams { network, .. }) => Some(network),
        }
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for DeploymentUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.id, self.stack_name)?;
        if !self.depends_on.is_empty() {
            let deps: Vec<&str> = self.depends_on.iter().map(UnitId::as_str).collect();
            write!(f, " after {}", deps.join(", "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_ids() {
        assert_eq!(UnitKind::Network.unit_id("default").as_str(), "networkStack-default");
        assert_eq!(UnitKind::TrafficReplayer.unit_id("second").as_str(), "traffic-replayer-second");
        assert_eq!(UnitKind::MskUtility.unit_id("second").as_str(), "mskUtilityStack");
    }

    #[test]
    fn test_all_is_in_declaration_order() {
        let mut sorted = UnitKind::ALL;
        sorted.sort();
        assert_eq!(sorted, UnitKind::ALL);
    }
}
