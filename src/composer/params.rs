//! Parameter sets for each unit kind.

use crate::config::{ComposerOptions, DEFAULT_DEPLOY_ID, EngineVersion, NodeOptions};
use crate::error::{GraphError, Result};
use crate::policy::PolicyStatement;

use super::units::{
    AnalyticsDomainParams, CaptureProxyParams, CollectorParams, ConsoleParams, DomainParams,
    FetchMigrationParams, MigrationParams, MskUtilityParams, NetworkParams, NetworkSource,
    ReplayerParams, ServiceParams, UnitId, UnitKind, UnitParams,
};

/// Values shared by every unit of one composition run.
#[derive(Debug)]
pub(crate) struct ParamContext<'a> {
    pub options: &'a ComposerOptions,
    pub access_policies: Option<&'a [PolicyStatement]>,
    pub network: Option<UnitId>,
}

impl ParamContext<'_> {
    /// Every unit except the network and the search domain sits in the network.
    fn network(&self, kind: UnitKind) -> Result<UnitId> {
        self.network.clone().ok_or_else(|| {
            GraphError::InternalInvariant {
                unit: kind.label().to_string(),
            }
            .into()
        })
    }

    /// The primary version is only required by the units that consume it.
    fn primary_version(&self) -> Result<EngineVersion> {
        let version = self.options.domain.engine_version.as_deref();
        Ok(EngineVersion::parse("engineVersion", version)?)
    }

    /// Builds the parameter set of an enabled unit.
    pub fn build(&self, kind: UnitKind) -> Result<UnitParams> {
        let o = self.options;

        let params = match kind {
            UnitKind::Network => UnitParams::Network(self.network_params()),
            UnitKind::SearchDomain => UnitParams::SearchDomain(self.domain_params()?),
            UnitKind::MigrationAssistance => UnitParams::MigrationAssistance(MigrationParams {
                network: self.network(kind)?,
                msk_import_arn: o.migration.msk_arn.clone(),
                msk_enable_public_endpoints: o.migration.msk_enable_public_endpoints,
                msk_restrict_public_access_to: o.migration.msk_restrict_public_access_to.clone(),
                msk_restrict_public_access_type: o.migration.msk_restrict_public_access_type.clone(),
                msk_broker_node_count: o.migration.msk_broker_node_count,
            }),
            UnitKind::MskUtility => UnitParams::MskUtility(MskUtilityParams {
                network: self.network(kind)?,
                msk_enable_public_endpoints: o.migration.msk_enable_public_endpoints,
            }),
            UnitKind::AnalyticsDomain => UnitParams::AnalyticsDomain(self.analytics_params()?),
            UnitKind::AnalyticsCollector => UnitParams::AnalyticsCollector(CollectorParams {
                network: self.network(kind)?,
                analytics_domain: UnitKind::AnalyticsDomain.unit_id(o.deploy_id()),
                otel_config_file_path: o.analytics.otel_config_file_path.clone(),
            }),
            UnitKind::FetchMigration => UnitParams::FetchMigration(FetchMigrationParams {
                network: self.network(kind)?,
                pipeline_template_path: o.fetch.pipeline_template_path.clone(),
                source_endpoint: o.fetch.source_cluster_endpoint.clone(),
            }),
            UnitKind::CaptureProxyEs => UnitParams::CaptureProxy(CaptureProxyParams {
                network: self.network(kind)?,
                colocated_source: true,
                source_endpoint: None,
            }),
            UnitKind::CaptureProxy => UnitParams::CaptureProxy(CaptureProxyParams {
                network: self.network(kind)?,
                colocated_source: false,
                source_endpoint: o.capture_proxy.source_endpoint.clone(),
            }),
            UnitKind::TrafficReplayer => UnitParams::TrafficReplayer(ReplayerParams {
                network: self.network(kind)?,
                enable_cluster_fgac_auth: o.replayer.enable_cluster_fgac_auth,
                addon_deploy_id: o.addon_deploy_id.clone(),
                target_endpoint: o.replayer.target_endpoint.clone(),
                group_id: o.replayer.group_id.clone(),
                extra_args: o.replayer.extra_args.clone(),
            }),
            UnitKind::Elasticsearch | UnitKind::KafkaBroker | UnitKind::KafkaZookeeper => {
                UnitParams::Service(ServiceParams {
                    network: self.network(kind)?,
                })
            }
            UnitKind::MigrationConsole => UnitParams::MigrationConsole(ConsoleParams {
                network: self.network(kind)?,
                fetch_migration_enabled: o.fetch.enabled,
            }),
        };

        Ok(params)
    }

    fn network_params(&self) -> NetworkParams {
        let o = self.options;

        // Add-ons always sit in the original deployment's network
        let source = match (&o.addon_deploy_id, &o.network.vpc_id) {
            (Some(_), _) => NetworkSource::Reuse {
                deploy_id: DEFAULT_DEPLOY_ID.to_string(),
            },
            (None, Some(vpc_id)) => NetworkSource::Import {
                vpc_id: vpc_id.clone(),
            },
            (None, None) => NetworkSource::Create,
        };

        NetworkParams {
            source,
            availability_zone_count: o.network.availability_zone_count,
            migration_analytics_enabled: o.analytics.enabled,
            addon_deploy_id: o.addon_deploy_id.clone(),
        }
    }

    fn domain_params(&self) -> Result<DomainParams> {
        let o = self.options;
        let d = &o.domain;

        Ok(DomainParams {
            network: self.network.clone(),
            domain_name: d.domain_name.clone(),
            engine_version: self.primary_version()?,
            nodes: d.nodes.clone(),
            access_policies: self.access_policies.map(<[PolicyStatement]>::to_vec),
            use_unsigned_basic_auth: d.use_unsigned_basic_auth,
            fine_grained_manager_user_arn: d.fine_grained_manager_user_arn.clone(),
            fine_grained_manager_user_name: d.fine_grained_manager_user_name.clone(),
            fine_grained_manager_user_secret_arn: d.fine_grained_manager_user_secret_arn.clone(),
            enable_demo_admin: d.enable_demo_admin,
            tls_security_policy: d.tls_security_policy,
            ebs: d.ebs.clone(),
            security: d.security.clone(),
            vpc_subnet_ids: o.network.subnet_ids.clone(),
            vpc_security_group_ids: o.network.security_group_ids.clone(),
            availability_zone_count: o.network.availability_zone_count,
            removal_policy: d.removal_policy,
        })
    }

    /// Version and data node count fall back to the primary domain's values.
    fn analytics_params(&self) -> Result<AnalyticsDomainParams> {
        let o = self.options;
        let a = &o.analytics;

        let engine_version = match &a.engine_version {
            Some(raw) => EngineVersion::parse("analyticsDomainEngineVersion", Some(raw))?,
            None => self.primary_version()?,
        };

        let data_node_count = a
            .nodes
            .data_node_count
            .or(o.domain.nodes.data_node_count)
            .or(o.network.availability_zone_count);

        Ok(AnalyticsDomainParams {
            network: self.network(UnitKind::AnalyticsDomain)?,
            engine_version,
            nodes: NodeOptions {
                data_node_count,
                ..a.nodes.clone()
            },
            ebs: a.ebs.clone(),
            security: a.security.clone(),
            vpc_subnet_ids: o.network.subnet_ids.clone(),
            vpc_security_group_ids: o.network.security_group_ids.clone(),
            availability_zone_count: o.network.availability_zone_count,
        })
    }
}
