//! # Error Types
//!
//! Defines `SeedModelError`, the unified error enum for every failure mode in
//! the modeling pipeline. Every variant carries the table, column or key names
//! involved so a failed modeling pass can be diagnosed from the message alone.
//!
//! Degenerate child groups are not errors: they are absorbed by the extension
//! builder's fallback policy and surfaced through `tracing::warn!` and the
//! modeling report.

use thiserror::Error;

/// All errors that can occur in SeedModel operations.
#[derive(Error, Debug)]
pub enum SeedModelError {
    #[error("No foreign key in table '{child}' references primary key '{primary_key}' of '{parent}'\n  Add a `ref` annotation to the child field that points at {parent}.{primary_key}")]
    MissingForeignKey {
        child: String,
        parent: String,
        primary_key: String,
    },

    #[error("Table '{table}' has child tables but declares no primary key")]
    MissingPrimaryKey { table: String },

    #[error("Shape mismatch on table '{table}': expected {expected_rows} rows, got {actual_rows} ({detail})")]
    ShapeMismatch {
        table: String,
        expected_rows: usize,
        actual_rows: usize,
        detail: String,
    },

    #[error("Extension column '{column}' collides with an existing column of table '{table}'")]
    ColumnCollision { table: String, column: String },

    #[error("Cannot aggregate '{child}' into '{table}': the child table has not been modeled yet")]
    NotYetModeled { table: String, child: String },

    #[error("Circular dependency detected involving tables: {tables}\n  Relational modeling requires an acyclic parent/child graph")]
    CircularDependency { tables: String },

    #[error("Unknown table '{table}'")]
    UnknownTable { table: String },

    #[error("Field {table}.{field} references unknown table or field '{referenced}'")]
    UnknownReference {
        table: String,
        field: String,
        referenced: String,
    },

    #[error("Cannot reconstruct model parameters: expected {expected} values, got {actual}")]
    Reconstruct { expected: usize, actual: usize },

    #[error("Nested parameter structure exceeds the maximum depth of {max_depth}")]
    NestingTooDeep { max_depth: usize },

    #[error("Flattened key '{key}' is produced by more than one path")]
    DuplicateKey { key: String },

    #[error("Model fitting failed: {message}")]
    Fit { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Dataset error: {message}")]
    Dataset { message: String },

    #[error("Snapshot error: {message}")]
    Snapshot { message: String },

    #[error("Output error: {message}: {source}")]
    Output {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, SeedModelError>;
