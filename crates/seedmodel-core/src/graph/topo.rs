use petgraph::algo::{tarjan_scc, toposort};
use petgraph::visit::EdgeRef;

use crate::error::{Result, SeedModelError};
use crate::graph::dag::RelationshipGraph;

/// Result of topological sorting — an ordered list of table names
/// for bottom-up modeling (children before parents).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelingOrder {
    /// Tables in the order they should be modeled (leaves first).
    pub tables: Vec<String>,
}

impl ModelingOrder {
    /// Whether every child appears strictly before each of its parents.
    pub fn respects(&self, graph: &RelationshipGraph) -> bool {
        let position = |name: &str| self.tables.iter().position(|t| t == name);
        self.tables.len() == graph.table_count()
            && graph.graph.edge_references().all(|edge| {
                let child = position(graph.table_name(edge.source()));
                let parent = position(graph.table_name(edge.target()));
                matches!((child, parent), (Some(c), Some(p)) if c < p)
            })
    }
}

/// Compute the bottom-up modeling order of the relationship graph.
///
/// Edges go child → parent, so petgraph's toposort already yields tables
/// nobody references (leaves) first and roots last. Any cycle, including a
/// table referencing itself, is an error.
pub fn modeling_order(graph: &RelationshipGraph) -> Result<ModelingOrder> {
    if let Some(tables) = find_cycle(graph) {
        return Err(SeedModelError::CircularDependency { tables });
    }

    match toposort(&graph.graph, None) {
        Ok(sorted_indices) => {
            let tables: Vec<String> = sorted_indices
                .iter()
                .map(|&idx| graph.table_name(idx).to_string())
                .collect();
            tracing::debug!("Modeling order: {}", tables.join(" -> "));
            Ok(ModelingOrder { tables })
        }
        Err(cycle_node) => Err(SeedModelError::CircularDependency {
            tables: graph.table_name(cycle_node.node_id()).to_string(),
        }),
    }
}

/// Names of the tables in the first cycle found, joined with ", ".
fn find_cycle(graph: &RelationshipGraph) -> Option<String> {
    for scc in tarjan_scc(&graph.graph) {
        let self_loop = scc.len() == 1 && graph.graph.contains_edge(scc[0], scc[0]);
        if scc.len() > 1 || self_loop {
            let mut names: Vec<&str> = scc.iter().map(|&n| graph.table_name(n)).collect();
            names.sort_unstable();
            return Some(names.join(", "));
        }
    }
    None
}
