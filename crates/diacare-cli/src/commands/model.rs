//! Inspection of the tree trained on the reference dataset.
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use diacare_classifiers::data_handling::FEATURES;
use diacare_classifiers::predictor::train_model;
use diacare_classifiers::report::plots::plot_feature_importances;

use crate::commands::{active_session, load_training_data};
use crate::config::AppConfig;
use crate::util::write_bytes_to_file;

#[derive(Debug, Clone, PartialEq)]
pub struct ModelDescription {
    pub tree: String,
    pub importances: Vec<(String, f64)>,
    pub raw_score: f64,
    pub accuracy_percent: f64,
}

impl ModelDescription {
    pub fn render(&self) -> String {
        let mut out = format!(
            "{}\nThe model used has an accuracy of {:.2}%\n\nFeature importances:\n",
            self.tree, self.accuracy_percent
        );
        for (name, importance) in &self.importances {
            out.push_str(&format!("  {:<22}{:.4}\n", name, importance));
        }
        out
    }
}

/// Train on the dataset and describe the result. With `plot_path`, the
/// importances chart is also written there as HTML.
pub fn run_model(
    config: &AppConfig,
    plot_path: Option<&PathBuf>,
    now: DateTime<Utc>,
) -> Result<ModelDescription> {
    active_session(config, now)?;
    let dataset = load_training_data(config)?;
    let model = train_model(&dataset.x, &dataset.y)?;
    let names: Vec<&str> = FEATURES.iter().map(|f| f.display_name()).collect();
    let importances = model.tree.feature_importances();

    if let Some(path) = plot_path {
        let html = plot_feature_importances(&importances, "Feature Importances").to_html();
        write_bytes_to_file(path, html.as_bytes())
            .with_context(|| format!("Failed to write plot: {}", path.display()))?;
        log::info!("[DiaCare::Model] Importance plot written to {}", path.display());
    }

    Ok(ModelDescription {
        tree: model.tree.render(&names),
        importances: names
            .iter()
            .map(|n| n.to_string())
            .zip(importances)
            .collect(),
        raw_score: model.score,
        accuracy_percent: config.calibration().percent(model.score),
    })
}
