//! # Table Data
//!
//! Raw row-oriented tables (`Dataset`), their column-major numeric
//! representation (`NumericTable`), the encoder that produces one from the
//! other, the mean imputer applied before every fit, and the JSON loader.

pub mod encode;
pub mod frame;
pub mod impute;
pub mod loader;
pub mod numeric;
pub mod value;

pub use frame::Dataset;
pub use numeric::NumericTable;
pub use value::Value;
