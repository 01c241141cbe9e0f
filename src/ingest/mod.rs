mod error;
mod normalizer;

pub use error::SchemaError;
pub use normalizer::{normalize, read_input, TemperatureUnit};
