use chrono::NaiveDateTime;
use maud::{html, PreEscaped, DOCTYPE};

use crate::data_handling::FeatureVector;
use crate::diagnosis::Diagnosis;
use crate::error::{DiagnosisError, Result};
use crate::report::plots::{plot_class_distribution, plot_measurements};

pub const REPORT_TITLE: &str = "Diabetes Risk Assessment Report";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.12.1.min.js";

/// Prediction part of a report; absent when the user has not run a prediction yet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReportOutcome {
    pub diagnosis: Diagnosis,
    /// Displayed accuracy, already calibrated, in percent.
    pub accuracy_percent: f64,
}

impl ReportOutcome {
    pub fn accuracy_sentence(&self) -> String {
        format!(
            "The model used has an accuracy of {:.2}%",
            self.accuracy_percent
        )
    }
}

/// Assessment for one named user.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagnosisReport {
    pub user_name: String,
    pub generated_at: NaiveDateTime,
    pub outcome: Option<ReportOutcome>,
    pub measurements: FeatureVector,
}

impl DiagnosisReport {
    /// Fails with `Report` when `user_name` is blank.
    pub fn new(
        user_name: &str,
        measurements: FeatureVector,
        generated_at: NaiveDateTime,
    ) -> Result<Self> {
        let user_name = user_name.trim();
        if user_name.is_empty() {
            return Err(DiagnosisError::Report(
                "a user name is required to export a report".to_string(),
            ));
        }
        Ok(Self {
            user_name: user_name.to_string(),
            generated_at,
            outcome: None,
            measurements,
        })
    }

    pub fn with_outcome(mut self, outcome: ReportOutcome) -> Self {
        self.outcome = Some(outcome);
        self
    }

    pub fn timestamp(&self) -> String {
        self.generated_at.format(TIMESTAMP_FORMAT).to_string()
    }

    pub fn html_file_name(&self) -> String {
        format!("{}_diabetes_report.html", file_stem(&self.user_name))
    }

    pub fn csv_file_name(&self) -> String {
        format!("{}_diabetes_data.csv", file_stem(&self.user_name))
    }

    /// The measurements as a two-column `Feature,Value` table.
    pub fn to_csv(&self) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        let io_err = |e: csv::Error| DiagnosisError::Report(format!("failed to write CSV: {}", e));
        writer.write_record(["Feature", "Value"]).map_err(io_err)?;
        for (feature, value) in self.measurements.named() {
            writer
                .write_record([feature.display_name().to_string(), value.to_string()])
                .map_err(io_err)?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| DiagnosisError::Report(format!("failed to flush CSV: {}", e)))?;
        String::from_utf8(bytes).map_err(|e| DiagnosisError::Report(e.to_string()))
    }

    /// Standalone HTML page; `class_distribution` adds a dataset overview chart.
    pub fn to_html(&self, class_distribution: Option<&[(i64, usize)]>) -> String {
        let measurement_plot = plot_measurements(&self.measurements, "Measurements")
            .to_inline_html(Some("measurements"));
        let distribution_plot = class_distribution.map(|dist| {
            plot_class_distribution(dist, "Diabetes Classification Distribution")
                .to_inline_html(Some("class-distribution"))
        });

        html! {
            (DOCTYPE)
            html {
                head {
                    meta charset="utf-8";
                    title { (REPORT_TITLE) }
                    script src=(PLOTLY_CDN) {}
                }
                body {
                    h1 { (REPORT_TITLE) }
                    p { "User Name: " (self.user_name) }
                    p { "Date: " (self.timestamp()) }
                    @if let Some(outcome) = &self.outcome {
                        h2 { "Prediction Result:" }
                        p { (outcome.diagnosis.sentence()) }
                        h2 { "Model Accuracy:" }
                        p { (outcome.accuracy_sentence()) }
                    }
                    h2 { "Measurements:" }
                    table {
                        @for (feature, value) in self.measurements.named() {
                            tr {
                                td { (feature.display_name()) ":" }
                                td { (value) }
                            }
                        }
                    }
                    (PreEscaped(measurement_plot))
                    @if let Some(plot) = distribution_plot {
                        (PreEscaped(plot))
                    }
                }
            }
        }
        .into_string()
    }
}

fn file_stem(user_name: &str) -> String {
    user_name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names_are_sanitised() {
        assert_eq!(file_stem("Jane Doe"), "Jane_Doe");
        assert_eq!(file_stem("../etc"), "___etc");
    }
}
