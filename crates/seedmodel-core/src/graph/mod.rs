//! # Relationship Graph
//!
//! Tables are nodes and every foreign key `ref` is a child → parent edge.
//! The modeling order is the topological order of this graph: a table is
//! modeled only after all of its children, because its model is fit over
//! their aggregated parameters.

pub mod dag;
pub mod topo;
pub mod visualize;
