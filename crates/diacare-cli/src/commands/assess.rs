//! Assessment of an uploaded patient parameter file.
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

use diacare_classifiers::diagnosis::map_label;
use diacare_classifiers::io::read_parameter_file;
use diacare_classifiers::predictor::Predictor;

use crate::commands::{active_session, load_training_data};
use crate::config::AppConfig;
use crate::util::validate_csv_file;

pub const HEALTHY_RECOMMENDATION: &str = "Maintain a healthy lifestyle.";

/// Diagnosis for an uploaded file and what follows from it.
///
/// At-risk results carry the disease type and the patient's parameters, the
/// input a medication advice service works from. Everyone else gets the
/// healthy lifestyle recommendation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assessment {
    pub sentence: String,
    pub disease_type: Option<String>,
    pub parameters: Vec<(String, String)>,
    pub recommendation: Option<String>,
    /// Displayed accuracy, already calibrated, in percent.
    pub accuracy_percent: f64,
}

impl Assessment {
    pub fn render(&self) -> String {
        let mut out = self.sentence.clone();
        if let Some(disease_type) = &self.disease_type {
            out.push_str(&format!("\nDisease type: {}", disease_type));
            out.push_str("\nPatient parameters:");
            for (name, value) in &self.parameters {
                out.push_str(&format!("\n  {}: {}", name, value));
            }
        }
        if let Some(recommendation) = &self.recommendation {
            out.push_str(&format!("\n{}", recommendation));
        }
        out.push_str(&format!(
            "\nPrediction confidence: {:.2}%",
            self.accuracy_percent
        ));
        out
    }
}

pub fn run_assess(
    config: &AppConfig,
    upload_path: &str,
    now: DateTime<Utc>,
) -> Result<Assessment> {
    active_session(config, now)?;
    validate_csv_file(upload_path)?;
    let upload = read_parameter_file(upload_path)
        .with_context(|| format!("Failed to read uploaded file: {}", upload_path))?;
    let dataset = load_training_data(config)?;
    let result = Predictor::new().predict_dataset(&dataset, &upload.features)?;
    let diagnosis = map_label(result.class_code, upload.features.pregnancies());
    log::info!("[DiaCare::Assess] {} -> {}", upload_path, diagnosis.label());

    let accuracy_percent = config.calibration().percent(result.score);
    let assessment = if diagnosis.is_at_risk() {
        Assessment {
            sentence: diagnosis.sentence().to_string(),
            disease_type: Some(diagnosis.disease_type().to_string()),
            parameters: upload.parameters,
            recommendation: None,
            accuracy_percent,
        }
    } else {
        Assessment {
            sentence: diagnosis.sentence().to_string(),
            disease_type: None,
            parameters: upload.parameters,
            recommendation: Some(HEALTHY_RECOMMENDATION.to_string()),
            accuracy_percent,
        }
    };
    Ok(assessment)
}
