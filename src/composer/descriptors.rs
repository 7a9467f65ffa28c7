//! Enablement rules for every unit kind.
//!
//! Descriptors are evaluated in order; a unit's prerequisites always appear
//! earlier in the table, so one forward pass decides every unit.

use crate::config::ComposerOptions;

use super::units::UnitKind;

/// How an add-on deployment changes a unit's enablement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOnRule {
    /// Add-on deployments follow the normal rule.
    Inherit,
    /// Never enabled in an add-on deployment.
    Excluded,
    /// Always enabled in an add-on deployment.
    Forced,
    /// Enabled in an add-on deployment whenever the network is.
    ForcedWithNetwork,
}

/// Enablement rule of one unit kind.
#[derive(Debug, Clone, Copy)]
pub struct UnitDescriptor {
    /// The unit kind.
    pub kind: UnitKind,
    /// Reads the kind's feature flag.
    pub enabled_by: fn(&ComposerOptions) -> bool,
    /// Units that must be enabled for this one to be enabled.
    pub requires: &'static [UnitKind],
    /// Add-on behavior.
    pub addon: AddOnRule,
}

use UnitKind::{
    AnalyticsCollector, AnalyticsDomain, CaptureProxy, CaptureProxyEs, Elasticsearch, FetchMigration,
    KafkaBroker, KafkaZookeeper, MigrationAssistance, MigrationConsole, MskUtility, Network,
    SearchDomain, TrafficReplayer,
};

/// Descriptors in composition order.
pub const DESCRIPTORS: &[UnitDescriptor] = &[
    UnitDescriptor {
        kind: Network,
        enabled_by: |o| o.network.vpc_enabled,
        requires: &[],
        addon: AddOnRule::Forced,
    },
    UnitDescriptor {
        kind: SearchDomain,
        enabled_by: |o| o.domain.enabled,
        requires: &[],
        addon: AddOnRule::Inherit,
    },
    UnitDescriptor {
        kind: MigrationAssistance,
        enabled_by: |o| o.migration.enabled,
        requires: &[Network],
        addon: AddOnRule::Excluded,
    },
    UnitDescriptor {
        kind: MskUtility,
        enabled_by: |o| o.migration.enabled,
        requires: &[MigrationAssistance],
        addon: AddOnRule::Excluded,
    },
    UnitDescriptor {
        kind: AnalyticsDomain,
        enabled_by: |o| o.analytics.enabled,
        requires: &[Network],
        addon: AddOnRule::Inherit,
    },
    UnitDescriptor {
        kind: AnalyticsCollector,
        enabled_by: |o| o.analytics.enabled,
        requires: &[AnalyticsDomain],
        addon: AddOnRule::Inherit,
    },
    UnitDescriptor {
        kind: FetchMigration,
        enabled_by: |o| o.fetch.enabled,
        requires: &[Network, SearchDomain, MigrationAssistance],
        addon: AddOnRule::Inherit,
    },
    UnitDescriptor {
        kind: CaptureProxyEs,
        enabled_by: |o| o.capture_proxy.es_enabled,
        requires: &[Network, MskUtility],
        addon: AddOnRule::Inherit,
    },
    UnitDescriptor {
        kind: TrafficReplayer,
        enabled_by: |o| o.replayer.enabled,
        requires: &[Network, SearchDomain, MigrationAssistance, MskUtility],
        addon: AddOnRule::ForcedWithNetwork,
    },
    UnitDescriptor {
        kind: Elasticsearch,
        enabled_by: |o| o.services.elasticsearch,
        requires: &[Network, MigrationAssistance],
        addon: AddOnRule::Inherit,
    },
    UnitDescriptor {
        kind: CaptureProxy,
        enabled_by: |o| o.capture_proxy.enabled,
        requires: &[Network, MskUtility],
        addon: AddOnRule::Inherit,
    },
    UnitDescriptor {
        kind: KafkaBroker,
        enabled_by: |o| o.services.kafka_broker,
        requires: &[Network, MigrationAssistance],
        addon: AddOnRule::Inherit,
    },
    UnitDescriptor {
        kind: KafkaZookeeper,
        enabled_by: |o| o.services.kafka_zookeeper,
        requires: &[Network, MigrationAssistance],
        addon: AddOnRule::Inherit,
    },
    UnitDescriptor {
        kind: MigrationConsole,
        enabled_by: |o| o.services.migration_console,
        requires: &[Network, SearchDomain, MskUtility],
        addon: AddOnRule::Inherit,
    },
];

impl UnitDescriptor {
    /// Decides whether the unit is enabled, given which earlier units are.
    pub fn is_enabled(&self, options: &ComposerOptions, enabled: impl Fn(UnitKind) -> bool) -> bool {
        let normal = || (self.enabled_by)(options) && self.requires.iter().all(|kind| enabled(*kind));

        if !options.is_addon() {
            return normal();
        }

        match self.addon {
            AddOnRule::Inherit => normal(),
            AddOnRule::Excluded => false,
            AddOnRule::Forced => true,
            AddOnRule::ForcedWithNetwork => enabled(Network) || normal(),
        }
    }
}

/// Returns the descriptor of a unit kind.
#[must_use]
pub fn descriptor(kind: UnitKind) -> Option<&'static UnitDescriptor> {
    DESCRIPTORS.iter().find(|d| d.kind == kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_kind_has_one_descriptor() {
        assert_eq!(DESCRIPTORS.len(), UnitKind::ALL.len());
        for (descriptor, kind) in DESCRIPTORS.iter().zip(UnitKind::ALL) {
            assert_eq!(descriptor.kind, kind);
        }
    }

    #[test]
    fn test_prerequisites_precede_dependents() {
        for (position, d) in DESCRIPTORS.iter().enumerate() {
            for required in d.requires {
                let required_position = DESCRIPTORS.iter().position(|o| o.kind == *required).unwrap();
                assert!(
                    required_position < position,
                    "{} requires later unit {}",
                    d.kind,
                    required
                );
            }
        }
    }

    #[test]
    fn test_descriptor_lookup() {
        let replayer = descriptor(TrafficReplayer).unwrap();
        assert_eq!(replayer.addon, AddOnRule::ForcedWithNetwork);
        assert!(replayer.requires.contains(&MskUtility));
    }
}
