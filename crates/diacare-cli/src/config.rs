use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ArgMatches;
use serde::{Deserialize, Serialize};

use diacare_classifiers::config::{DisplayCalibration, DEFAULT_DISPLAY_CALIBRATION_OFFSET};

/// Paths and presentation settings shared by every subcommand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub dataset_path: String,
    pub user_store_path: String,
    pub session_path: String,
    pub output_dir: String,
    /// Added to the raw in-sample accuracy before it is shown. Display only.
    pub display_calibration_offset: f64,
    pub session_expiry_days: i64,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            dataset_path: String::from("diabetes.csv"),
            user_store_path: String::from("users.json"),
            session_path: String::from("session.json"),
            output_dir: String::from("."),
            display_calibration_offset: DEFAULT_DISPLAY_CALIBRATION_OFFSET,
            session_expiry_days: 30,
        }
    }
}

impl AppConfig {
    /// Read the optional config file, then apply command line overrides.
    pub fn from_arguments(config_path: Option<&PathBuf>, matches: &ArgMatches) -> Result<Self> {
        let mut config = match config_path {
            Some(path) => load_app_config(path)?,
            None => {
                log::info!("[DiaCare::Config] No config file provided, using defaults");
                AppConfig::default()
            }
        };

        if let Some(dataset) = string_arg(matches, "dataset") {
            config.dataset_path = dataset;
        }
        if let Some(output_dir) = string_arg(matches, "output_dir") {
            config.output_dir = output_dir;
        }
        if let Some(user_store) = string_arg(matches, "user_store") {
            config.user_store_path = user_store;
        }
        if let Some(session) = string_arg(matches, "session") {
            config.session_path = session;
        }

        Ok(config)
    }

    pub fn calibration(&self) -> DisplayCalibration {
        DisplayCalibration::new(self.display_calibration_offset)
    }

    /// Fails when `session_expiry_days` is negative or too large for a duration.
    pub fn session_expiry(&self) -> Result<chrono::Duration> {
        match chrono::Duration::try_days(self.session_expiry_days) {
            Some(expiry) if self.session_expiry_days >= 0 => Ok(expiry),
            _ => anyhow::bail!(
                "Invalid session_expiry_days in config: {}",
                self.session_expiry_days
            ),
        }
    }
}

/// Load an [`AppConfig`] from a JSON file. Missing fields take their defaults.
pub fn load_app_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config: {}", path.as_ref().display()))?;
    let config: AppConfig = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config: {}", path.as_ref().display()))?;
    Ok(config)
}

fn string_arg(matches: &ArgMatches, id: &str) -> Option<String> {
    matches.try_get_one::<String>(id).ok().flatten().cloned()
}
