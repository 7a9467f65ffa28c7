//! Provisioning engine interface.
//!
//! A composition result is handed to an engine in two passes: every unit is
//! registered in provisioning order, then every dependency is declared.
//! Engines never see a disabled unit.

mod manifest;

pub use manifest::{ManifestEngine, ManifestUnit, PlanManifest};

use async_trait::async_trait;

use crate::composer::{DeploymentUnit, UnitId};
use crate::error::Result;

/// Trait for provisioning engines.
#[async_trait]
pub trait ProvisioningEngine: Send {
    /// Registers a unit.
    async fn register(&mut self, unit: &DeploymentUnit) -> Result<()>;

    /// Declares that `unit` must be provisioned after `depends_on`.
    async fn declare_dependency(&mut self, unit: &UnitId, depends_on: &UnitId) -> Result<()>;

    /// Gets the engine type name.
    fn engine_type(&self) -> &'static str;
}

#[async_trait]
impl ProvisioningEngine for Box<dyn ProvisioningEngine> {
    async fn register(&mut self, unit: &DeploymentUnit) -> Result<()> {
        (**self).register(unit).await
    }

    async fn declare_dependency(&mut self, unit: &UnitId, depends_on: &UnitId) -> Result<()> {
        (**self).declare_dependency(unit, depends_on).await
    }

    fn engine_type(&self) -> &'static str {
        (**self).engine_type()
    }
}
