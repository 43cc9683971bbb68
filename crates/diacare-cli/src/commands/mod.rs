pub mod assess;
pub mod data;
pub mod model;
pub mod predict;
pub mod report;
pub mod user;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use diacare_classifiers::data_handling::Dataset;
use diacare_classifiers::io::load_dataset;

use crate::config::AppConfig;
use crate::session::{require_session, SessionContext};

/// The logged-in session every command except `user` runs under.
pub fn active_session(config: &AppConfig, now: DateTime<Utc>) -> Result<SessionContext> {
    require_session(&config.session_path, now, config.session_expiry()?)
}

/// Load the reference dataset named by the config.
pub fn load_training_data(config: &AppConfig) -> Result<Dataset> {
    let dataset = load_dataset(&config.dataset_path)
        .with_context(|| format!("Failed to load dataset: {}", config.dataset_path))?;
    dataset.log_input_data_summary();
    Ok(dataset)
}
