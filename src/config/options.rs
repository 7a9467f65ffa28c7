//! Strongly typed composer options.
//!
//! These structs are bound from [`ResolvedOptions`] in one step and describe
//! the desired deployment completely. Closed-set options are already
//! resolved to their enum variants; engine versions and access policies are
//! derived later by the composer because their validity depends on which
//! units are enabled.

use serde::Serialize;
use serde_json::Value;

use crate::error::ConfigError;

use super::enums::{resolve_enum, EbsVolumeType, RemovalPolicy, TlsSecurityPolicy};
use super::schema::ResolvedOptions;

/// Root of the typed option tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposerOptions {
    /// Deployment stage, e.g. `dev`.
    pub stage: String,
    /// Identifier of the deployment this one is an add-on to.
    pub addon_deploy_id: Option<String>,
    /// Network options.
    pub network: NetworkOptions,
    /// Primary search domain options.
    pub domain: DomainOptions,
    /// Migration assistance options.
    pub migration: MigrationOptions,
    /// Migration analytics options.
    pub analytics: AnalyticsOptions,
    /// Offline data migration options.
    pub fetch: FetchMigrationOptions,
    /// Capture proxy options.
    pub capture_proxy: CaptureProxyOptions,
    /// Traffic replayer options.
    pub replayer: ReplayerOptions,
    /// Remaining service flags.
    pub services: ServiceFlags,
}

/// Network options.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NetworkOptions {
    /// Whether a network is created or imported.
    pub vpc_enabled: bool,
    /// Existing network to import.
    pub vpc_id: Option<String>,
    /// Number of availability zones.
    pub availability_zone_count: Option<u32>,
    /// Subnets the domain is placed into.
    pub subnet_ids: Option<Vec<String>>,
    /// Security groups attached to the domain.
    pub security_group_ids: Option<Vec<String>>,
}

/// Node layout of a search domain.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeOptions {
    /// Data node instance type.
    pub data_node_type: Option<String>,
    /// Number of data nodes.
    pub data_node_count: Option<u32>,
    /// Dedicated manager node instance type.
    pub dedicated_manager_node_type: Option<String>,
    /// Number of dedicated manager nodes.
    pub dedicated_manager_node_count: Option<u32>,
    /// Warm node instance type.
    pub warm_node_type: Option<String>,
    /// Number of warm nodes.
    pub warm_node_count: Option<u32>,
}

/// Block storage of a search domain.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EbsOptions {
    /// Whether block storage is attached.
    pub enabled: Option<bool>,
    /// Provisioned IOPS.
    pub iops: Option<u32>,
    /// Volume size in GiB.
    pub volume_size: Option<u32>,
    /// Volume class.
    pub volume_type: Option<EbsVolumeType>,
}

/// Encryption and logging shared by both search domains.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityOptions {
    /// Require HTTPS for all traffic.
    pub enforce_https: Option<bool>,
    /// Encrypt data at rest.
    pub encryption_at_rest_enabled: Option<bool>,
    /// KMS key for encryption at rest.
    pub encryption_at_rest_kms_key_arn: Option<String>,
    /// Ship application logs.
    pub app_log_enabled: Option<bool>,
    /// Log group for application logs.
    pub app_log_group_arn: Option<String>,
    /// Encrypt node-to-node traffic.
    pub node_to_node_encryption_enabled: Option<bool>,
}

/// Primary search domain options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainOptions {
    /// Whether the search domain unit is provisioned.
    pub enabled: bool,
    /// Domain name.
    pub domain_name: String,
    /// Raw engine version string, e.g. `OS_2.11`.
    pub engine_version: Option<String>,
    /// Node layout.
    pub nodes: NodeOptions,
    /// Block storage.
    pub ebs: EbsOptions,
    /// Encryption and logging.
    pub security: SecurityOptions,
    /// Minimum TLS policy.
    pub tls_security_policy: Option<TlsSecurityPolicy>,
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
    /// Replace access policies with a single allow-all statement.
    pub open_access_policy_enabled: bool,
    /// Raw access-policy document.
    pub access_policies: Option<Value>,
    /// Removal policy for the domain.
    pub removal_policy: Option<RemovalPolicy>,
}

/// Migration assistance options.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MigrationOptions {
    /// Whether migration assistance is provisioned.
    pub enabled: bool,
    /// Existing message broker cluster to import.
    pub msk_arn: Option<String>,
    /// Expose public broker endpoints.
    pub msk_enable_public_endpoints: Option<bool>,
    /// CIDR or security group public access is restricted to.
    pub msk_restrict_public_access_to: Option<String>,
    /// Kind of restriction (`ipv4`, `ipv6`, `prefixList`, `securityGroupId`).
    pub msk_restrict_public_access_type: Option<String>,
    /// Number of broker nodes.
    pub msk_broker_node_count: Option<u32>,
}

/// Migration analytics options.
///
/// The analytics domain has no fine-grained manager user options.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AnalyticsOptions {
    /// Whether analytics is provisioned.
    pub enabled: bool,
    /// Collector configuration file.
    pub otel_config_file_path: Option<String>,
    /// Raw engine version string; inherits the primary domain's when unset.
    pub engine_version: Option<String>,
    /// Node layout.
    pub nodes: NodeOptions,
    /// Block storage.
    pub ebs: EbsOptions,
    /// Encryption and logging.
    pub security: SecurityOptions,
}

/// Offline data migration options.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FetchMigrationOptions {
    /// Whether offline data migration is provisioned.
    pub enabled: bool,
    /// Data pipeline template path.
    pub pipeline_template_path: Option<String>,
    /// Source cluster endpoint.
    pub source_cluster_endpoint: Option<String>,
}

/// Capture proxy options.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CaptureProxyOptions {
    /// Standalone capture proxy.
    pub enabled: bool,
    /// Capture proxy colocated with the mock source cluster.
    pub es_enabled: bool,
    /// Custom source cluster endpoint for the standalone proxy.
    pub source_endpoint: Option<String>,
}

/// Traffic replayer options.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReplayerOptions {
    /// Whether the replayer is provisioned.
    pub enabled: bool,
    /// Authenticate against the target with fine-grained access control.
    pub enable_cluster_fgac_auth: Option<bool>,
    /// Custom target endpoint.
    pub target_endpoint: Option<String>,
    /// Custom Kafka consumer group id.
    pub group_id: Option<String>,
    /// Extra command-line arguments.
    pub extra_args: Option<String>,
}

/// Flags for units without further options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ServiceFlags {
    /// Mock source cluster.
    pub elasticsearch: bool,
    /// Kafka broker.
    pub kafka_broker: bool,
    /// Kafka zookeeper.
    pub kafka_zookeeper: bool,
    /// Operator console.
    pub migration_console: bool,
}

impl ComposerOptions {
    /// Binds typed options from resolved values.
    ///
    /// # Errors
    ///
    /// Returns an error for out-of-range counts, malformed id lists, unknown
    /// closed-set values, or missing mandatory strings.
    pub fn bind(resolved: &ResolvedOptions) -> Result<Self, ConfigError> {
        let stage = resolved
            .string("stage")
            .ok_or_else(|| ConfigError::missing("stage"))?;
        let domain_name = resolved
            .string("domainName")
            .ok_or_else(|| ConfigError::missing("domainName"))?;

        Ok(Self {
            stage,
            addon_deploy_id: resolved.string("addOnMigrationDeployId"),
            network: NetworkOptions {
                vpc_enabled: resolved.flag("vpcEnabled"),
                vpc_id: resolved.string("vpcId"),
                availability_zone_count: resolved.count("availabilityZoneCount")?,
                subnet_ids: resolved.string_list("vpcSubnetIds")?,
                security_group_ids: resolved.string_list("vpcSecurityGroupIds")?,
            },
            domain: DomainOptions {
                enabled: resolved.boolean("searchDomainEnabled").unwrap_or(true),
                domain_name,
                engine_version: resolved.string("engineVersion"),
                nodes: NodeOptions {
                    data_node_type: resolved.string("dataNodeType"),
                    data_node_count: resolved.count("dataNodeCount")?,
                    dedicated_manager_node_type: resolved.string("dedicatedManagerNodeType"),
                    dedicated_manager_node_count: resolved.count("dedicatedManagerNodeCount")?,
                    warm_node_type: resolved.string("warmNodeType"),
                    warm_node_count: resolved.count("warmNodeCount")?,
                },
                ebs: EbsOptions {
                    enabled: resolved.boolean("ebsEnabled"),
                    iops: resolved.count("ebsIops")?,
                    volume_size: resolved.count("ebsVolumeSize")?,
                    volume_type: enum_option(resolved, "ebsVolumeType")?,
                },
                security: SecurityOptions {
                    enforce_https: resolved.boolean("enforceHTTPS"),
                    encryption_at_rest_enabled: resolved.boolean("encryptionAtRestEnabled"),
                    encryption_at_rest_kms_key_arn: resolved.string("encryptionAtRestKmsKeyARN"),
                    app_log_enabled: resolved.boolean("loggingAppLogEnabled"),
                    app_log_group_arn: resolved.string("loggingAppLogGroupARN"),
                    node_to_node_encryption_enabled: resolved
                        .boolean("nodeToNodeEncryptionEnabled"),
                },
                tls_security_policy: enum_option(resolved, "tlsSecurityPolicy")?,
                use_unsigned_basic_auth: resolved.boolean("useUnsignedBasicAuth"),
                fine_grained_manager_user_arn: resolved.string("fineGrainedManagerUserARN"),
                fine_grained_manager_user_name: resolved.string("fineGrainedManagerUserName"),
                fine_grained_manager_user_secret_arn: resolved
                    .string("fineGrainedManagerUserSecretManagerKeyARN"),
                enable_demo_admin: resolved.boolean("enableDemoAdmin"),
                open_access_policy_enabled: resolved.flag("openAccessPolicyEnabled"),
                access_policies: resolved.structured("accessPolicies").cloned(),
                removal_policy: enum_option(resolved, "domainRemovalPolicy")?,
            },
            migration: MigrationOptions {
                enabled: resolved.flag("migrationAssistanceEnabled"),
                msk_arn: resolved.string("mskARN"),
                msk_enable_public_endpoints: resolved.boolean("mskEnablePublicEndpoints"),
                msk_restrict_public_access_to: resolved.string("mskRestrictPublicAccessTo"),
                msk_restrict_public_access_type: resolved.string("mskRestrictPublicAccessType"),
                msk_broker_node_count: resolved.count("mskBrokerNodeCount")?,
            },
            analytics: AnalyticsOptions {
                enabled: resolved.flag("migrationAnalyticsServiceEnabled"),
                otel_config_file_path: resolved.string("otelConfigFilePath"),
                engine_version: resolved.string("analyticsDomainEngineVersion"),
                nodes: NodeOptions {
                    data_node_type: resolved.string("analyticsDomainDataNodeType"),
                    data_node_count: resolved.count("analyticsDomainDataNodeCount")?,
                    dedicated_manager_node_type: resolved
                        .string("analyticsDomainDedicatedManagerNodeType"),
                    dedicated_manager_node_count: resolved
                        .count("analyticsDomainDedicatedManagerNodeCount")?,
                    warm_node_type: resolved.string("analyticsDomainWarmNodeType"),
                    warm_node_count: resolved.count("analyticsDomainWarmNodeCount")?,
                },
                ebs: EbsOptions {
                    enabled: resolved.boolean("analyticsDomainEbsEnabled"),
                    iops: resolved.count("analyticsDomainEbsIops")?,
                    volume_size: resolved.count("analyticsDomainEbsVolumeSize")?,
                    volume_type: enum_option(resolved, "analyticsDomainEbsVolumeType")?,
                },
                security: SecurityOptions {
                    enforce_https: resolved.boolean("analyticsDomainEnforceHTTPS"),
                    encryption_at_rest_enabled: resolved
                        .boolean("analyticsDomainEncryptionAtRestEnabled"),
                    encryption_at_rest_kms_key_arn: resolved
                        .string("analyticsDomainEncryptionAtRestKmsKeyARN"),
                    app_log_enabled: resolved.boolean("analyticsDomainLoggingAppLogEnabled"),
                    app_log_group_arn: resolved.string("analyticsDomainLoggingAppLogGroupARN"),
                    node_to_node_encryption_enabled: resolved
                        .boolean("analyticsDomainNodeToNodeEncryptionEnabled"),
                },
            },
            fetch: FetchMigrationOptions {
                enabled: resolved.flag("fetchMigrationEnabled"),
                pipeline_template_path: resolved.string("dpPipelineTemplatePath"),
                source_cluster_endpoint: resolved.string("sourceClusterEndpoint"),
            },
            capture_proxy: CaptureProxyOptions {
                enabled: resolved.flag("captureProxyServiceEnabled"),
                es_enabled: resolved.flag("captureProxyESServiceEnabled"),
                source_endpoint: resolved.string("captureProxySourceEndpoint"),
            },
            replayer: ReplayerOptions {
                enabled: resolved.flag("trafficReplayerServiceEnabled"),
                enable_cluster_fgac_auth: resolved.boolean("trafficReplayerEnableClusterFGACAuth"),
                target_endpoint: resolved.string("trafficReplayerTargetEndpoint"),
                group_id: resolved.string("trafficReplayerGroupId"),
                extra_args: resolved.string("trafficReplayerExtraArgs"),
            },
            services: ServiceFlags {
                elasticsearch: resolved.flag("elasticsearchServiceEnabled"),
                kafka_broker: resolved.flag("kafkaBrokerServiceEnabled"),
                kafka_zookeeper: resolved.flag("kafkaZookeeperServiceEnabled"),
                migration_console: resolved.flag("migrationConsoleServiceEnabled"),
            },
        })
    }

    /// Returns the deployment id: the add-on id, or `default`.
    #[must_use]
    pub fn deploy_id(&self) -> &str {
        self.addon_deploy_id.as_deref().unwrap_or(DEFAULT_DEPLOY_ID)
    }

    /// Returns true for add-on deployments.
    #[must_use]
    pub const fn is_addon(&self) -> bool {
        self.addon_deploy_id.is_some()
    }
}

/// Deployment id used when no add-on id is supplied.
pub const DEFAULT_DEPLOY_ID: &str = "default";

fn enum_option<E: super::enums::EnumOption>(
    resolved: &ResolvedOptions,
    name: &str,
) -> Result<Option<E>, ConfigError> {
    resolve_enum(name, resolved.get(name).as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OptionTable;

    fn bind(raw: &OptionTable) -> Result<ComposerOptions, ConfigError> {
        ComposerOptions::bind(&ResolvedOptions::resolve_all(&OptionTable::new(), raw)?)
    }

    #[test]
    fn test_bind_minimal() {
        let raw = OptionTable::new().with("stage", "dev").with("domainName", "target");
        let options = bind(&raw).unwrap();
        assert_eq!(options.stage, "dev");
        assert_eq!(options.domain.domain_name, "target");
        assert!(options.domain.enabled);
        assert!(!options.network.vpc_enabled);
        assert_eq!(options.deploy_id(), "default");
        assert!(!options.is_addon());
    }

    #[test]
    fn test_bind_enums() {
        let raw = OptionTable::new()
            .with("stage", "dev")
            .with("domainName", "target")
            .with("tlsSecurityPolicy", "TLS_1_2")
            .with("ebsVolumeType", "GP3")
            .with("domainRemovalPolicy", "");
        let options = bind(&raw).unwrap();
        assert_eq!(options.domain.tls_security_policy, Some(TlsSecurityPolicy::Tls1_2));
        assert_eq!(options.domain.ebs.volume_type, Some(EbsVolumeType::Gp3));
        assert_eq!(options.domain.removal_policy, None);
    }

    #[test]
    fn test_bind_rejects_unknown_enum() {
        let raw = OptionTable::new()
            .with("stage", "dev")
            .with("domainName", "target")
            .with("analyticsDomainEbsVolumeType", "FAST");
        let err = bind(&raw).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::UnknownEnumValue { ref option, .. } if option == "analyticsDomainEbsVolumeType"
        ));
    }

    #[test]
    fn test_addon_deploy_id() {
        let raw = OptionTable::new()
            .with("stage", "dev")
            .with("domainName", "target")
            .with("addOnMigrationDeployId", "second");
        let options = bind(&raw).unwrap();
        assert!(options.is_addon());
        assert_eq!(options.deploy_id(), "second");
    }
}
