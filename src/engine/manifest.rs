//! Manifest engine.
//!
//! Records what a provisioning engine would be asked to do and writes it as a
//! JSON plan manifest for review or for a downstream deployment tool.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;
use tokio::fs;
use tracing::{debug, info};
use uuid::Uuid;

use crate::composer::{CompositionResult, DeploymentUnit, UnitId, UnitKind};
use crate::error::{ComposerError, EngineError, Result};

use super::ProvisioningEngine;

/// Manifest format version.
const MANIFEST_VERSION: u32 = 1;

/// A serializable record of one composition hand-off.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanManifest {
    /// Manifest format version.
    pub version: u32,
    /// Composition run the manifest belongs to.
    pub run_id: Uuid,
    /// When the manifest was generated.
    pub generated_at: DateTime<Utc>,
    /// Fingerprint of the resolved options.
    pub fingerprint: String,
    /// Deployment stage.
    pub stage: String,
    /// Deployment id.
    pub deploy_id: String,
    /// Registered units, in registration order.
    pub units: Vec<ManifestUnit>,
}

/// One registered unit.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestUnit {
    /// Unit id.
    pub id: UnitId,
    /// Unit kind.
    pub kind: UnitKind,
    /// Provisioning name.
    pub stack_name: String,
    /// Description.
    pub description: String,
    /// Resolved parameters.
    pub params: serde_json::Value,
    /// Declared dependencies.
    pub depends_on: Vec<UnitId>,
    /// Application registry association.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_registry_arn: Option<String>,
}

/// Engine that builds a [`PlanManifest`].
#[derive(Debug)]
pub struct ManifestEngine {
    manifest: PlanManifest,
}

impl ManifestEngine {
    /// Creates an engine for a composition run.
    #[must_use]
    pub fn for_composition(result: &CompositionResult) -> Self {
        Self {
            manifest: PlanManifest {
                version: MANIFEST_VERSION,
                run_id: result.run_id,
                generated_at: Utc::now(),
                fingerprint: result.fingerprint.clone(),
                stage: result.stage.clone(),
                deploy_id: result.deploy_id.clone(),
                units: Vec::new(),
            },
        }
    }

    /// Returns the manifest built so far.
    #[must_use]
    pub const fn manifest(&self) -> &PlanManifest {
        &self.manifest
    }

    /// Consumes the engine and returns the manifest.
    #[must_use]
    pub fn into_manifest(self) -> PlanManifest {
        self.manifest
    }

    fn position(&self, id: &UnitId) -> Option<usize> {
        self.manifest.units.iter().position(|u| u.id == *id)
    }
}

impl PlanManifest {
    /// Renders the manifest as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            ComposerError::Engine(EngineError::Serialization {
                message: e.to_string(),
            })
        })
    }

    /// Writes the manifest to a file, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or any file operation fails.
    pub async fn write_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = self.to_json()?;

        let missing_parent = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty() && !p.exists());
        if let Some(parent) = missing_parent {
            debug!("Creating manifest directory: {}", parent.display());
            fs::create_dir_all(parent).await?;
        }

        fs::write(path, content).await?;
        info!("Plan manifest written to: {}", path.display());
        Ok(())
    }

    /// Returns a registered unit.
    #[must_use]
    pub fn unit(&self, id: &str) -> Option<&ManifestUnit> {
        self.units.iter().find(|u| u.id.as_str() == id)
    }
}

#[async_trait]
impl ProvisioningEngine for ManifestEngine {
    async fn register(&mut self, unit: &DeploymentUnit) -> Result<()> {
        let rejected = |reason: String| EngineError::RegistrationFailed {
            unit: unit.id.to_string(),
            reason,
        };

        if self.position(&unit.id).is_some() {
            return Err(rejected(String::from("unit is already registered")).into());
        }

        let params = serde_json::to_value(&unit.params).map_err(|e| rejected(e.to_string()))?;

        self.manifest.units.push(ManifestUnit {
            id: unit.id.clone(),
            kind: unit.kind,
            stack_name: unit.stack_name.clone(),
            description: unit.description.clone(),
            params,
            depends_on: Vec::new(),
            app_registry_arn: unit.app_registry_arn.clone(),
        });

        Ok(())
    }

    async fn declare_dependency(&mut self, unit: &UnitId, depends_on: &UnitId) -> Result<()> {
        let rejected = |reason: &str| EngineError::DependencyRejected {
            unit: unit.to_string(),
            depends_on: depends_on.to_string(),
            reason: reason.to_string(),
        };

        let dependent = self
            .position(unit)
            .ok_or_else(|| rejected("unit is not registered"))?;
        let prerequisite = self
            .position(depends_on)
            .ok_or_else(|| rejected("prerequisite is not registered"))?;

        if prerequisite >= dependent {
            return Err(rejected("prerequisite was registered after the unit").into());
        }

        let entry = &mut self.manifest.units[dependent];
        if !entry.depends_on.contains(depends_on) {
            entry.depends_on.push(depends_on.clone());
        }

        Ok(())
    }

    fn engine_type(&self) -> &'static str {
        "manifest"
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
            .with("vpcEnabled", true)
            .with("migrationAssistanceEnabled", true);
        StackComposer::new(ComposeContext::new("us-east-1"))
            .compose(&OptionTable::new(), &raw)
            .unwrap()
    }

    #[test]
    fn test_apply_records_every_unit_and_edge() {
        let result = composition();
        let mut engine = ManifestEngine::for_composition(&result);

        let summary = tokio_test::block_on(result.apply(&mut engine)).unwrap();
        assert_eq!(summary.units_registered, result.len());
        assert_eq!(summary.dependencies_declared, result.edges.len());

        let manifest = engine.into_manifest();
        assert_eq!(manifest.run_id, result.run_id);
        let msk = manifest.unit("mskUtilityStack").unwrap();
        assert_eq!(msk.depends_on, vec![UnitKind::MigrationAssistance.unit_id("default")]);
    }

    #[test]
    fn test_rejects_out_of_order_dependency() {
        let result = composition();
        let mut engine = ManifestEngine::for_composition(&result);
        let network = result.unit(UnitKind::Network).unwrap();

        tokio_test::block_on(engine.register(network)).unwrap();
        let duplicate = tokio_test::block_on(engine.register(network));
        assert!(duplicate.is_err());

        let domain = result.unit(UnitKind::SearchDomain).unwrap();
        let err = tokio_test::block_on(engine.declare_dependency(&network.id, &domain.id)).unwrap_err();
        assert!(matches!(err, ComposerError::Engine(EngineError::DependencyRejected { .. })));
    }

    #[test]
    fn test_write_manifest() {
        let result = composition();
        let mut engine = ManifestEngine::for_composition(&result);
        tokio_test::block_on(result.apply(&mut engine)).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("plan.json");
        tokio_test::block_on(engine.manifest().write_to(&path)).unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["stage"], "dev");
        assert_eq!(written["units"].as_array().unwrap().len(), result.len());
    }
}
