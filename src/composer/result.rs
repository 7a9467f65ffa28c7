//! Output of a composition run.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::ValidationWarning;
use crate::engine::ProvisioningEngine;
use crate::error::{GraphError, Result};

use super::units::{DeploymentUnit, UnitId, UnitKind};

/// An ordering constraint between two units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyEdge {
    /// The unit that waits.
    pub unit: UnitId,
    /// The unit provisioned first.
    pub depends_on: UnitId,
}

/// Enabled units, their ordering, and the warnings raised along the way.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositionResult {
    /// Unique id of this run.
    pub run_id: Uuid,
    /// When the composition was produced.
    pub created_at: DateTime<Utc>,
    /// Fingerprint of the resolved options.
    pub fingerprint: String,
    /// Deployment stage.
    pub stage: String,
    /// Deployment id.
    pub deploy_id: String,
    /// Enabled units in composition order.
    pub units: Vec<DeploymentUnit>,
    /// Every dependency edge.
    pub edges: Vec<DependencyEdge>,
    /// Unit ids in provisioning order.
    pub provisioning_order: Vec<UnitId>,
    /// Recoverable inconsistencies.
    pub warnings: Vec<ValidationWarning>,
}

/// Counts reported after handing a composition to an engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplySummary {
    /// Units registered.
    pub units_registered: usize,
    /// Dependencies declared.
    pub dependencies_declared: usize,
}

impl CompositionResult {
    /// Returns the unit of a kind, if enabled.
    #[must_use]
    pub fn unit(&self, kind: UnitKind) -> Option<&DeploymentUnit> {
        self.units.iter().find(|u| u.kind == kind)
    }

    /// Returns the unit with an id.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UnknownUnit`] if no enabled unit has this id.
    pub fn unit_by_id(&self, id: &str) -> Result<&DeploymentUnit> {
        self.units.iter().find(|u| u.id.as_str() == id).ok_or_else(|| {
            GraphError::UnknownUnit {
                unit: id.to_string(),
            }
            .into()
        })
    }

    /// Returns true if a unit of this kind is enabled.
    #[must_use]
    pub fn contains(&self, kind: UnitKind) -> bool {
        self.unit(kind).is_some()
    }

    /// Returns true if `dependent` must wait for `dependency`.
    #[must_use]
    pub fn has_edge(&self, dependency: UnitKind, dependent: UnitKind) -> bool {
        match (self.unit(dependency), self.unit(dependent)) {
            (Some(from), Some(to)) => to.depends_on.contains(&from.id),
            _ => false,
        }
    }

    /// Returns the position of a kind in provisioning order.
    #[must_use]
    pub fn position(&self, kind: UnitKind) -> Option<usize> {
        let unit = self.unit(kind)?;
        self.provisioning_order.iter().position(|id| *id == unit.id)
    }

    /// Returns the number of enabled units.
    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Returns true if no unit is enabled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Registers every unit with an engine in provisioning order, then
    /// declares every dependency.
    ///
    /// # Errors
    ///
    /// Returns the first error reported by the engine.
    pub async fn apply<E>(&self, engine: &mut E) -> Result<ApplySummary>
    where
        E: ProvisioningEngine + ?Sized,
    {
        info!(
            "Handing {} units to the {} engine",
            self.units.len(),
            engine.engine_type()
        );

        let mut summary = ApplySummary::default();

        for id in &self.provisioning_order {
            let unit = self.unit_by_id(id.as_str())?;
            debug!("Registering unit: {}", unit.id);
            engine.register(unit).await?;
            summary.units_registered += 1;
        }

        for edge in &self.edges {
            engine.declare_dependency(&edge.unit, &edge.depends_on).await?;
            summary.dependencies_declared += 1;
        }

        info!(
            "Registered {} units and {} dependencies",
            summary.units_registered, summary.dependencies_declared
        );

        Ok(summary)
    }
}
