pub mod config;
pub mod data;
pub mod error;
pub mod graph;
pub mod model;
pub mod modeler;
pub mod navigator;
pub mod schema;
pub mod snapshot;

// Re-export key types for convenience
pub use error::{Result, SeedModelError};
pub use model::{GaussianCopula, MultivariateModel};
pub use modeler::{Modeler, ModelerOptions, ModelingResult};
pub use navigator::{DataNavigator, InMemoryNavigator};
pub use schema::types::DatasetMeta;
