use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::HashMap;

use crate::error::{Result, SeedModelError};
use crate::schema::types::DatasetMeta;

/// A directed graph of parent/child relationships between tables.
/// Edges point from child table to parent table (child → parent).
pub struct RelationshipGraph {
    pub graph: DiGraph<String, RelationEdge>,
    pub node_indices: HashMap<String, NodeIndex>,
}

/// Information about an edge (one foreign key field of the child).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationEdge {
    /// Foreign key field in the child table
    pub foreign_key: String,
    /// Referenced field (the parent's primary key)
    pub referenced_field: String,
}

impl RelationshipGraph {
    /// Build the relationship graph from dataset metadata.
    /// Each table becomes a node, each `ref` annotation a child → parent edge.
    ///
    /// References to unknown tables or fields are rejected.
    pub fn from_meta(meta: &DatasetMeta) -> Result<Self> {
        let mut graph = DiGraph::new();
        let mut node_indices = HashMap::new();

        for table_name in meta.tables.keys() {
            let idx = graph.add_node(table_name.clone());
            node_indices.insert(table_name.clone(), idx);
        }

        for (table_name, table) in &meta.tables {
            for (field, reference) in table.references() {
                let parent = meta.tables.get(&reference.table).filter(|parent| {
                    parent.fields.contains_key(&reference.field)
                });
                let (Some(_), Some(&parent_idx)) =
                    (parent, node_indices.get(&reference.table))
                else {
                    return Err(SeedModelError::UnknownReference {
                        table: table_name.clone(),
                        field: field.name.clone(),
                        referenced: format!("{}.{}", reference.table, reference.field),
                    });
                };

                graph.add_edge(
                    node_indices[table_name],
                    parent_idx,
                    RelationEdge {
                        foreign_key: field.name.clone(),
                        referenced_field: reference.field.clone(),
                    },
                );
            }
        }

        Ok(Self {
            graph,
            node_indices,
        })
    }

    /// Get the table name for a node index.
    pub fn table_name(&self, idx: NodeIndex) -> &str {
        &self.graph[idx]
    }

    /// Get node index for a table name.
    pub fn node_index(&self, table_name: &str) -> Option<NodeIndex> {
        self.node_indices.get(table_name).copied()
    }

    /// Get all table names in the graph, in metadata order.
    pub fn table_names(&self) -> Vec<&str> {
        self.graph.node_weights().map(|s| s.as_str()).collect()
    }

    /// Child tables of `table_name`, in metadata order, each listed once.
    pub fn children(&self, table_name: &str) -> Result<Vec<String>> {
        let idx = self.require(table_name)?;
        let mut children: Vec<NodeIndex> = self
            .graph
            .edges_directed(idx, Direction::Incoming)
            .map(|e| e.source())
            .collect();
        children.sort();
        children.dedup();
        Ok(children
            .into_iter()
            .map(|c| self.table_name(c).to_string())
            .collect())
    }

    /// The first parent declared by `table_name`, if any.
    pub fn parent(&self, table_name: &str) -> Result<Option<String>> {
        let idx = self.require(table_name)?;
        Ok(self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .min_by_key(|e| e.id())
            .map(|e| self.table_name(e.target()).to_string()))
    }

    /// Get the number of tables.
    pub fn table_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Get the number of relationship edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    fn require(&self, table_name: &str) -> Result<NodeIndex> {
        self.node_index(table_name)
            .ok_or_else(|| SeedModelError::UnknownTable {
                table: table_name.to_string(),
            })
    }
}
