//! Option schema and one-pass resolution.
//!
//! Every option the composer understands is declared once in
//! [`OPTION_SCHEMA`] together with its type and whether it is mandatory.
//! [`ResolvedOptions::resolve_all`] walks the table a single time, applying
//! the value-resolution contract to each entry.

use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

use crate::error::ConfigError;

use super::value::{resolve, DefaultTable, ExpectedType, RawConfig, ResolvedOption};

/// Whether an option must resolve to a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// Absence after defaulting is fatal.
    Required,
    /// Absence is allowed.
    Optional,
}

/// Declaration of a single option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionSpec {
    /// Option name as it appears in the raw configuration.
    pub name: &'static str,
    /// Declared type.
    pub expected: ExpectedType,
    /// Whether the option is mandatory.
    pub requirement: Requirement,
}

const fn required(name: &'static str, expected: ExpectedType) -> OptionSpec {
    OptionSpec {
        name,
        expected,
        requirement: Requirement::Required,
    }
}

const fn optional(name: &'static str, expected: ExpectedType) -> OptionSpec {
    OptionSpec {
        name,
        expected,
        requirement: Requirement::Optional,
    }
}

use super::value::ExpectedType::{Boolean, Number, String as Str, Structured};

/// Every option understood by the composer.
pub const OPTION_SCHEMA: &[OptionSpec] = &[
    // Deployment
    required("stage", Str),
    optional("addOnMigrationDeployId", Str),
    // Network
    optional("vpcEnabled", Boolean),
    optional("vpcId", Str),
    optional("vpcSecurityGroupIds", Structured),
    optional("vpcSubnetIds", Structured),
    optional("availabilityZoneCount", Number),
    // Primary search domain
    optional("searchDomainEnabled", Boolean),
    required("domainName", Str),
    optional("engineVersion", Str),
    optional("dataNodeType", Str),
    optional("dataNodeCount", Number),
    optional("dedicatedManagerNodeType", Str),
    optional("dedicatedManagerNodeCount", Number),
    optional("warmNodeType", Str),
    optional("warmNodeCount", Number),
    optional("useUnsignedBasicAuth", Boolean),
    optional("fineGrainedManagerUserARN", Str),
    optional("fineGrainedManagerUserName", Str),
    optional("fineGrainedManagerUserSecretManagerKeyARN", Str),
    optional("enableDemoAdmin", Boolean),
    optional("enforceHTTPS", Boolean),
    optional("tlsSecurityPolicy", Str),
    optional("ebsEnabled", Boolean),
    optional("ebsIops", Number),
    optional("ebsVolumeSize", Number),
    optional("ebsVolumeType", Str),
    optional("encryptionAtRestEnabled", Boolean),
    optional("encryptionAtRestKmsKeyARN", Str),
    optional("loggingAppLogEnabled", Boolean),
    optional("loggingAppLogGroupARN", Str),
    optional("nodeToNodeEncryptionEnabled", Boolean),
    optional("openAccessPolicyEnabled", Boolean),
    optional("accessPolicies", Structured),
    optional("domainRemovalPolicy", Str),
    // Migration assistance
    optional("migrationAssistanceEnabled", Boolean),
    optional("mskARN", Str),
    optional("mskEnablePublicEndpoints", Boolean),
    optional("mskRestrictPublicAccessTo", Str),
    optional("mskRestrictPublicAccessType", Str),
    optional("mskBrokerNodeCount", Number),
    // Services
    optional("captureProxyESServiceEnabled", Boolean),
    optional("captureProxyServiceEnabled", Boolean),
    optional("captureProxySourceEndpoint", Str),
    optional("migrationConsoleServiceEnabled", Boolean),
    optional("trafficReplayerServiceEnabled", Boolean),
    optional("trafficReplayerEnableClusterFGACAuth", Boolean),
    optional("trafficReplayerTargetEndpoint", Str),
    optional("trafficReplayerGroupId", Str),
    optional("trafficReplayerExtraArgs", Str),
    optional("elasticsearchServiceEnabled", Boolean),
    optional("kafkaBrokerServiceEnabled", Boolean),
    optional("kafkaZookeeperServiceEnabled", Boolean),
    optional("fetchMigrationEnabled", Boolean),
    optional("dpPipelineTemplatePath", Str),
    optional("sourceClusterEndpoint", Str),
    // Migration analytics
    optional("migrationAnalyticsServiceEnabled", Boolean),
    optional("otelConfigFilePath", Str),
    optional("analyticsDomainEngineVersion", Str),
    optional("analyticsDomainDataNodeType", Str),
    optional("analyticsDomainDataNodeCount", Number),
    optional("analyticsDomainDedicatedManagerNodeType", Str),
    optional("analyticsDomainDedicatedManagerNodeCount", Number),
    optional("analyticsDomainWarmNodeType", Str),
    optional("analyticsDomainWarmNodeCount", Number),
    optional("analyticsDomainEnforceHTTPS", Boolean),
    optional("analyticsDomainEbsEnabled", Boolean),
    optional("analyticsDomainEbsIops", Number),
    optional("analyticsDomainEbsVolumeSize", Number),
    optional("analyticsDomainEbsVolumeType", Str),
    optional("analyticsDomainEncryptionAtRestEnabled", Boolean),
    optional("analyticsDomainEncryptionAtRestKmsKeyARN", Str),
    optional("analyticsDomainLoggingAppLogEnabled", Boolean),
    optional("analyticsDomainLoggingAppLogGroupARN", Str),
    optional("analyticsDomainNodeToNodeEncryptionEnabled", Boolean),
];

/// Looks up the declaration of an option.
#[must_use]
pub fn lookup(name: &str) -> Option<&'static OptionSpec> {
    OPTION_SCHEMA.iter().find(|spec| spec.name == name)
}

/// All options resolved against the schema.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedOptions {
    values: BTreeMap<&'static str, ResolvedOption>,
}

static ABSENT: ResolvedOption = ResolvedOption::Absent;

impl ResolvedOptions {
    /// Resolves every schema option from the raw configuration and defaults.
    ///
    /// # Errors
    ///
    /// Returns the first type or literal error encountered, or
    /// [`ConfigError::MissingRequiredField`] for an absent mandatory option.
    pub fn resolve_all(defaults: &DefaultTable, raw: &RawConfig) -> Result<Self, ConfigError> {
        let mut values = BTreeMap::new();

        for spec in OPTION_SCHEMA {
            let value = resolve(spec.name, spec.expected, defaults, raw)?;

            if value.is_absent() && spec.requirement == Requirement::Required {
                return Err(ConfigError::missing(spec.name));
            }

            values.insert(spec.name, value);
        }

        debug!("Resolved {} options", values.values().filter(|v| !v.is_absent()).count());
        Ok(Self { values })
    }

    /// Returns the resolved value of an option.
    #[must_use]
    pub fn get(&self, name: &str) -> &ResolvedOption {
        self.values.get(name).unwrap_or(&ABSENT)
    }

    /// Returns a string option.
    #[must_use]
    pub fn string(&self, name: &str) -> Option<String> {
        self.get(name).as_str().map(str::to_string)
    }

    /// Returns a boolean option, if set.
    #[must_use]
    pub fn boolean(&self, name: &str) -> Option<bool> {
        self.get(name).as_bool()
    }

    /// Returns a feature flag; unset means disabled.
    #[must_use]
    pub fn flag(&self, name: &str) -> bool {
        self.boolean(name).unwrap_or(false)
    }

    /// Returns a count option as an unsigned integer.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::TypeMismatch`] for negative, fractional or
    /// out-of-range numbers.
    pub fn count(&self, name: &str) -> Result<Option<u32>, ConfigError> {
        let Some(number) = self.get(name).as_number() else {
            return Ok(None);
        };

        number
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .map(Some)
            .ok_or_else(|| ConfigError::type_mismatch(name, format!("number {number}"), "unsigned integer"))
    }

    /// Returns a structured option as a list of strings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::TypeMismatch`] if the value is not an array of
    /// strings.
    pub fn string_list(&self, name: &str) -> Result<Option<Vec<String>>, ConfigError> {
        let Some(value) = self.get(name).as_structured() else {
            return Ok(None);
        };

        let mismatch = || ConfigError::type_mismatch(name, "object", "array of strings");

        value
            .as_array()
            .ok_or_else(mismatch)?
            .iter()
            .map(|item| item.as_str().map(str::to_string).ok_or_else(mismatch))
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }

    /// Returns a structured option verbatim.
    #[must_use]
    pub fn structured(&self, name: &str) -> Option<&Value> {
        self.get(name).as_structured()
    }

    /// Iterates over every option that resolved to a value.
    pub fn present(&self) -> impl Iterator<Item = (&'static str, &ResolvedOption)> {
        self.values
            .iter()
            .filter(|(_, v)| !v.is_absent())
            .map(|(k, v)| (*k, v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OptionTable;
    use std::collections::HashSet;

    fn minimal() -> RawConfig {
        OptionTable::new().with("stage", "dev").with("domainName", "target")
    }

    #[test]
    fn test_schema_names_are_unique() {
        let mut seen = HashSet::new();
        for spec in OPTION_SCHEMA {
            assert!(seen.insert(spec.name), "duplicate option {}", spec.name);
        }
    }

    #[test]
    fn test_required_option_missing() {
        let raw = OptionTable::new().with("stage", "dev");
        let err = ResolvedOptions::resolve_all(&OptionTable::new(), &raw).unwrap_err();
        assert!(matches!(err, ConfigError::MissingRequiredField { ref option } if option == "domainName"));
    }

    #[test]
    fn test_required_option_satisfied_by_default() {
        let defaults = OptionTable::new().with("domainName", "from-default");
        let raw = OptionTable::new().with("stage", "dev");
        let options = ResolvedOptions::resolve_all(&defaults, &raw).unwrap();
        assert_eq!(options.string("domainName").as_deref(), Some("from-default"));
    }

    #[test]
    fn test_counts_and_lists() {
        let raw = minimal()
            .with("dataNodeCount", "3")
            .with("vpcSubnetIds", serde_json::json!(["a", "b"]))
            .with("warmNodeCount", -1);
        let options = ResolvedOptions::resolve_all(&OptionTable::new(), &raw).unwrap();

        assert_eq!(options.count("dataNodeCount").unwrap(), Some(3));
        assert_eq!(options.count("ebsIops").unwrap(), None);
        assert!(options.count("warmNodeCount").is_err());
        assert_eq!(
            options.string_list("vpcSubnetIds").unwrap(),
            Some(vec![String::from("a"), String::from("b")])
        );
    }

    #[test]
    fn test_flags_default_to_disabled() {
        let options = ResolvedOptions::resolve_all(&OptionTable::new(), &minimal()).unwrap();
        assert!(!options.flag("vpcEnabled"));
        assert_eq!(options.boolean("enforceHTTPS"), None);
        assert!(lookup("vpcEnabled").is_some());
        assert!(lookup("notAnOption").is_none());
    }
}
