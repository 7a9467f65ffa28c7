//! Unit composition.
//!
//! This module decides which deployment units are enabled, resolves the
//! parameter set of each, and orders them by their dependencies:
//! - [`units`]: unit kinds, ids and parameter sets
//! - [`DESCRIPTORS`]: enablement rules, in composition order
//! - [`DependencyGraph`]: ordering constraints between enabled units
//! - [`StackComposer`]: one composition run end to end

mod compose;
mod descriptors;
mod graph;
mod params;
mod result;
pub mod units;

pub use compose::{ComposeContext, StackComposer, STACK_NAME_PREFIX};
pub use descriptors::{descriptor, AddOnRule, UnitDescriptor, DESCRIPTORS};
pub use graph::{DependencyGraph, DEPENDENCY_RULES};
pub use result::{ApplySummary, CompositionResult, DependencyEdge};
pub use units::{DeploymentUnit, NetworkSource, UnitId, UnitKind, UnitParams};
