//! Small row-major containers for the feature table and label vector.
//!
//! `Array2` holds one clinical record per row; `Array1` holds per-row values
//! such as outcome labels or predicted class codes.
pub mod matrix;
pub mod vector;

pub use matrix::{Array2, ShapeError};
pub use vector::Array1;
