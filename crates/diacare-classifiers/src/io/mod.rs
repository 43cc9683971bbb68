//! Readers for the clinical dataset and for uploaded patient parameter files.

pub mod clinical_csv;
pub mod upload;

pub use clinical_csv::{load_dataset, read_dataset, DatasetCache};
pub use upload::{read_parameter_csv, read_parameter_file, UploadedParameters};
