//! Report export and plotting helpers.
//!
//! `report` assembles a downloadable assessment (CSV table or standalone HTML
//! page); `plots` turns measurements and dataset statistics into `plotly::Plot`s
//! that the HTML page embeds.
pub mod plots;
pub mod report;

pub use report::{DiagnosisReport, ReportOutcome};
