//! Views over the reference dataset.
use anyhow::Result;
use chrono::{DateTime, Utc};

use diacare_classifiers::stats::{column_values, DatasetSummary};

use crate::commands::{active_session, load_training_data};
use crate::config::AppConfig;

pub fn run_summary(config: &AppConfig, now: DateTime<Utc>) -> Result<DatasetSummary> {
    active_session(config, now)?;
    let dataset = load_training_data(config)?;
    Ok(DatasetSummary::from_dataset(&dataset))
}

/// Values of one column, by CSV header name.
pub fn run_column(config: &AppConfig, name: &str, now: DateTime<Utc>) -> Result<Vec<f64>> {
    active_session(config, now)?;
    let dataset = load_training_data(config)?;
    match column_values(&dataset, name) {
        Some(values) => Ok(values),
        None => anyhow::bail!("Unknown column: {}", name),
    }
}

/// Fixed-width table in the layout of a dataframe `describe()`.
pub fn format_summary(summary: &DatasetSummary) -> String {
    let mut out = format!(
        "{:<26}{:>8}{:>11}{:>11}{:>9}{:>9}{:>9}{:>9}{:>9}\n",
        "column", "count", "mean", "std", "min", "25%", "50%", "75%", "max"
    );
    for c in &summary.columns {
        out.push_str(&format!(
            "{:<26}{:>8}{:>11.3}{:>11.3}{:>9.2}{:>9.2}{:>9.2}{:>9.2}{:>9.2}\n",
            c.name, c.count, c.mean, c.std, c.min, c.q25, c.q50, c.q75, c.max
        ));
    }
    out.push_str("\nOutcome distribution:\n");
    for (class_code, count) in &summary.class_distribution {
        out.push_str(&format!("  {}: {}\n", class_code, count));
    }
    out
}
