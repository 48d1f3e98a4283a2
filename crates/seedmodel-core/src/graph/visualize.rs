use crate::graph::dag::RelationshipGraph;
use crate::graph::topo::ModelingOrder;
use petgraph::visit::EdgeRef;

/// Output format for graph visualization.
pub enum GraphFormat {
    Mermaid,
    Dot,
}

/// Render the relationship graph. Node labels carry each table's
/// position in the modeling order when one is given.
pub fn visualize(
    graph: &RelationshipGraph,
    order: Option<&ModelingOrder>,
    format: GraphFormat,
) -> String {
    match format {
        GraphFormat::Mermaid => generate_mermaid(graph, order),
        GraphFormat::Dot => generate_dot(graph, order),
    }
}

fn node_label(name: &str, order: Option<&ModelingOrder>) -> String {
    match order.and_then(|o| o.tables.iter().position(|t| t == name)) {
        Some(pos) => format!("{} #{}", name, pos + 1),
        None => name.to_string(),
    }
}

fn generate_mermaid(graph: &RelationshipGraph, order: Option<&ModelingOrder>) -> String {
    let mut output = String::from("graph BT\n");

    for node in graph.graph.node_indices() {
        let name = graph.table_name(node);
        output.push_str(&format!("    {}[{}]\n", name, node_label(name, order)));
    }

    output.push('\n');

    for edge in graph.graph.edge_references() {
        let from = graph.table_name(edge.source());
        let to = graph.table_name(edge.target());
        let label = format!("{} → {}", edge.weight().foreign_key, edge.weight().referenced_field);
        output.push_str(&format!("    {} -->|{}| {}\n", from, label, to));
    }

    output
}

fn generate_dot(graph: &RelationshipGraph, order: Option<&ModelingOrder>) -> String {
    let mut output = String::from("digraph relationships {\n");
    output.push_str("    rankdir=BT;\n");
    output.push_str("    node [shape=box, style=rounded];\n\n");

    for node in graph.graph.node_indices() {
        let name = graph.table_name(node);
        output.push_str(&format!(
            "    \"{}\" [label=\"{}\"];\n",
            name,
            node_label(name, order)
        ));
    }

    for edge in graph.graph.edge_references() {
        let from = graph.table_name(edge.source());
        let to = graph.table_name(edge.target());
        output.push_str(&format!(
            "    \"{}\" -> \"{}\" [label=\"{}\"];\n",
            from,
            to,
            edge.weight().foreign_key
        ));
    }

    output.push_str("}\n");
    output
}
