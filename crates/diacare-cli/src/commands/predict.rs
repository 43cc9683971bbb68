use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

use diacare_classifiers::data_handling::{Dataset, FeatureVector};
use diacare_classifiers::diagnosis::map_label;
use diacare_classifiers::predictor::Predictor;
use diacare_classifiers::stats::DatasetSummary;

use crate::commands::{active_session, load_training_data};
use crate::config::AppConfig;
use crate::session::LastPrediction;

/// What the diagnosis screen shows for one prediction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionOutput {
    pub class_code: i64,
    pub label: String,
    pub sentence: String,
    pub raw_score: f64,
    pub accuracy_percent: f64,
    /// Display names of measurements outside the range seen in the dataset.
    pub out_of_range: Vec<String>,
}

impl PredictionOutput {
    pub fn render(&self) -> String {
        let mut out = format!(
            "{}\nThe model used has an accuracy of {:.2}%",
            self.sentence, self.accuracy_percent
        );
        if !self.out_of_range.is_empty() {
            out.push_str(&format!(
                "\nNote: outside the range of the reference data: {}",
                self.out_of_range.join(", ")
            ));
        }
        out
    }
}

/// Predict against an already loaded dataset.
pub fn predict_with_dataset(
    config: &AppConfig,
    predictor: &Predictor,
    dataset: &Dataset,
    features: &FeatureVector,
) -> Result<PredictionOutput> {
    let result = predictor.predict_dataset(dataset, features)?;
    let diagnosis = map_label(result.class_code, features.pregnancies());
    let out_of_range = DatasetSummary::from_dataset(dataset)
        .out_of_range(features)
        .into_iter()
        .map(|f| f.display_name().to_string())
        .collect();

    Ok(PredictionOutput {
        class_code: result.class_code,
        label: diagnosis.label().to_string(),
        sentence: diagnosis.sentence().to_string(),
        raw_score: result.score,
        accuracy_percent: config.calibration().percent(result.score),
        out_of_range,
    })
}

/// Predict for the logged-in user and remember the result in their session.
pub fn run_predict(
    config: &AppConfig,
    features: FeatureVector,
    now: DateTime<Utc>,
) -> Result<PredictionOutput> {
    let mut session = active_session(config, now)?;
    let dataset = load_training_data(config)?;
    let output = predict_with_dataset(config, &Predictor::new(), &dataset, &features)?;

    log::info!(
        "[DiaCare::Predict] Class {} for user '{}'",
        output.class_code,
        session.username
    );
    session.record_prediction(LastPrediction {
        features,
        class_code: output.class_code,
        score: output.raw_score,
        predicted_at: now,
    });
    session.save(&config.session_path)?;
    Ok(output)
}
