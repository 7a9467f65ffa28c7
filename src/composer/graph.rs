//! Dependency graph over enabled units.
//!
//! The dependency relation is a fixed table; an edge is only added when both
//! of its endpoints are enabled. Each dependency appears before its
//! dependents in the provisioning order.

use petgraph::Direction;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;
use tracing::{debug, error};

use crate::error::GraphError;

use super::units::UnitKind;
use UnitKind::{
    AnalyticsCollector, AnalyticsDomain, CaptureProxy, CaptureProxyEs, Elasticsearch, FetchMigration,
    KafkaBroker, KafkaZookeeper, MigrationAssistance, MigrationConsole, MskUtility, Network,
    SearchDomain, TrafficReplayer,
};

/// `(A, B)` means A must be provisioned before B.
pub const DEPENDENCY_RULES: &[(UnitKind, UnitKind)] = &[
    // Network hosts every other in-network unit
    (Network, SearchDomain),
    (Network, MigrationAssistance),
    (Network, AnalyticsDomain),
    (Network, TrafficReplayer),
    // Search domain
    (SearchDomain, MigrationAssistance),
    (SearchDomain, FetchMigration),
    (SearchDomain, TrafficReplayer),
    (SearchDomain, MigrationConsole),
    // Migration infrastructure
    (MigrationAssistance, MskUtility),
    (MigrationAssistance, FetchMigration),
    (MigrationAssistance, TrafficReplayer),
    (MigrationAssistance, Elasticsearch),
    (MigrationAssistance, KafkaBroker),
    (MigrationAssistance, KafkaZookeeper),
    // Broker utilities
    (MskUtility, CaptureProxyEs),
    (MskUtility, CaptureProxy),
    (MskUtility, TrafficReplayer),
    (MskUtility, MigrationConsole),
    // Analytics
    (AnalyticsDomain, AnalyticsCollector),
    // Console and proxies
    (Elasticsearch, CaptureProxy),
    (Elasticsearch, MigrationConsole),
    (CaptureProxyEs, MigrationConsole),
    (CaptureProxy, MigrationConsole),
    (FetchMigration, MigrationConsole),
];

/// Directed acyclic graph of enabled units.
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    graph: DiGraph<UnitKind, ()>,
    nodes: HashMap<UnitKind, NodeIndex>,
    order: Vec<UnitKind>,
}

impl DependencyGraph {
    /// Builds the graph of the given enabled units.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InternalInvariant`] if the dependency table
    /// contains a cycle.
    pub fn build(enabled: &[UnitKind]) -> Result<Self, GraphError> {
        Self::with_rules(enabled, DEPENDENCY_RULES)
    }

    pub(crate) fn with_rules(
        enabled: &[UnitKind],
        rules: &[(UnitKind, UnitKind)],
    ) -> Result<Self, GraphError> {
        let mut graph = DiGraph::new();
        let mut nodes = HashMap::new();

        for &kind in enabled {
            let idx = graph.add_node(kind);
            nodes.insert(kind, idx);
        }

        for (from, to) in rules {
            if let (Some(&from_idx), Some(&to_idx)) = (nodes.get(from), nodes.get(to)) {
                graph.add_edge(from_idx, to_idx, ());
            }
        }

        let order = match toposort(&graph, None) {
            Ok(order) => order.into_iter().map(|idx| graph[idx]).collect(),
            Err(cycle) => {
                let unit = graph[cycle.node_id()];
                error!("Dependency table contains a cycle involving unit: {unit}");
                return Err(GraphError::InternalInvariant {
                    unit: unit.label().to_string(),
                });
            }
        };

        debug!(
            "Built dependency graph with {} units and {} edges",
            graph.node_count(),
            graph.edge_count()
        );

        Ok(Self { graph, nodes, order })
    }

    /// Returns the units in provisioning order.
    #[must_use]
    pub fn provisioning_order(&self) -> &[UnitKind] {
        &self.order
    }

    /// Returns the direct dependencies of a unit, in composition order.
    #[must_use]
    pub fn dependencies_of(&self, kind: UnitKind) -> Vec<UnitKind> {
        self.neighbors(kind, Direction::Incoming)
    }

    /// Returns the units that directly depend on a unit, in composition order.
    #[must_use]
    pub fn dependents_of(&self, kind: UnitKind) -> Vec<UnitKind> {
        self.neighbors(kind, Direction::Outgoing)
    }

    fn neighbors(&self, kind: UnitKind, direction: Direction) -> Vec<UnitKind> {
        let Some(&idx) = self.nodes.get(&kind) else {
            return Vec::new();
        };

        let mut kinds: Vec<UnitKind> = self
            .graph
            .neighbors_directed(idx, direction)
            .map(|n| self.graph[n])
            .collect();
        kinds.sort_unstable();
        kinds
    }

    /// Returns every edge as `(dependency, dependent)`, in table order.
    #[must_use]
    pub fn edges(&self) -> Vec<(UnitKind, UnitKind)> {
        self.graph
            .raw_edges()
            .iter()
            .map(|e| (self.graph[e.source()], self.graph[e.target()]))
            .collect()
    }

    /// Returns the number of units.
    #[must_use]
    pub fn unit_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns the number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(graph: &DependencyGraph, kind: UnitKind) -> usize {
        graph.provisioning_order().iter().position(|k| *k == kind).unwrap()
    }

    #[test]
    fn test_full_graph_respects_every_rule() {
        let graph = DependencyGraph::build(&UnitKind::ALL).unwrap();
        assert_eq!(graph.unit_count(), 14);
        assert_eq!(graph.edge_count(), DEPENDENCY_RULES.len());

        for (from, to) in DEPENDENCY_RULES {
            assert!(position(&graph, *from) < position(&graph, *to), "{from} before {to}");
        }
    }

    #[test]
    fn test_edges_only_between_enabled_units() {
        let graph = DependencyGraph::build(&[Network, SearchDomain, MigrationConsole]).unwrap();
        assert_eq!(graph.edges(), vec![(Network, SearchDomain), (SearchDomain, MigrationConsole)]);
        assert!(graph.dependencies_of(MigrationConsole).contains(&SearchDomain));
        assert!(graph.dependencies_of(TrafficReplayer).is_empty());
    }

    #[test]
    fn test_dependents() {
        let graph = DependencyGraph::build(&UnitKind::ALL).unwrap();
        assert_eq!(
            graph.dependents_of(MskUtility),
            vec![CaptureProxyEs, TrafficReplayer, CaptureProxy, MigrationConsole]
        );
    }

    #[test]
    fn test_cycle_is_internal_invariant() {
        let rules = [(Network, SearchDomain), (SearchDomain, Network)];
        let err = DependencyGraph::with_rules(&[Network, SearchDomain], &rules).unwrap_err();
        assert!(matches!(err, GraphError::InternalInvariant { .. }));
    }
}
