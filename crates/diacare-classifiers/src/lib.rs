//! diacare-classifiers: diabetes risk classification from clinical measurements.
//!
//! The pipeline is dataset loading (`io`), a fixed-parameter entropy decision
//! tree (`models`), prediction with an optional model cache (`predictor`),
//! class-code to diagnosis mapping (`diagnosis`), and report export (`report`).
//! Every stage is deterministic. A loaded dataset and a trained model are
//! immutable and can be shared read-only across sessions.
pub mod config;
pub mod data_handling;
pub mod diagnosis;
pub mod error;
pub mod io;
pub mod math;
pub mod models;
pub mod predictor;
pub mod report;
pub mod stats;

pub use error::DiagnosisError;
