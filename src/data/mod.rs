//! Field storage: sample types, per-cell time levels and the local grid.

pub mod field_value;
pub mod grid;
pub mod sample;

pub use field_value::{FieldPointValue, TimeLevels};
pub use grid::{Grid, ValueRange};
pub use sample::Sample;
