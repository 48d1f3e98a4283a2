//! # Dataset Metadata
//!
//! Describes the tables of a relational dataset: their fields, primary keys
//! and the `ref` annotations that link a child's foreign key to a parent's
//! primary key.

pub mod types;
