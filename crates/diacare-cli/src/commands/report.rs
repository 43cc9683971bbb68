use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Local, Utc};

use diacare_classifiers::report::{DiagnosisReport, ReportOutcome};
use diacare_classifiers::stats::class_distribution;

use crate::commands::{active_session, load_training_data};
use crate::config::AppConfig;
use crate::util::write_bytes_to_file;

/// Paths of the files written by one export.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedReport {
    pub html: PathBuf,
    pub csv: PathBuf,
}

/// Export the session's last prediction as HTML and CSV in `output_dir`.
///
/// `name` defaults to the logged-in user's full name.
pub fn run_report(
    config: &AppConfig,
    name: Option<&str>,
    now: DateTime<Utc>,
) -> Result<ExportedReport> {
    let session = active_session(config, now)?;
    let Some(prediction) = &session.last_prediction else {
        anyhow::bail!("No prediction in this session. Run `diacare predict` first.");
    };

    let name = name.unwrap_or(&session.name);
    let generated_at = now.with_timezone(&Local).naive_local();
    let report = DiagnosisReport::new(name, prediction.features, generated_at)?
        .with_outcome(ReportOutcome {
            diagnosis: prediction.diagnosis(),
            accuracy_percent: config.calibration().percent(prediction.score),
        });

    let dataset = load_training_data(config)?;
    let distribution = class_distribution(&dataset);

    let output_dir = Path::new(&config.output_dir);
    let html = output_dir.join(report.html_file_name());
    write_bytes_to_file(&html, report.to_html(Some(&distribution)).as_bytes())
        .with_context(|| format!("Failed to write report: {}", html.display()))?;

    let csv = output_dir.join(report.csv_file_name());
    write_bytes_to_file(&csv, report.to_csv()?.as_bytes())
        .with_context(|| format!("Failed to write report data: {}", csv.display()))?;

    log::info!("[DiaCare::Report] Report written to {}", html.display());
    Ok(ExportedReport { html, csv })
}
