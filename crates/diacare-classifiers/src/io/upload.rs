//! Reader for two-column (parameter, value) patient files.
//!
//! The first row is a header and is skipped. Column one names a measurement
//! using its display name (for example `HbA1c Level` or `Genetic Correlation`),
//! column two holds its value. Extra columns are ignored.
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use crate::data_handling::{Feature, FeatureVector, FEATURES, N_FEATURES};
use crate::error::{DiagnosisError, Result};

/// Parameters read from an uploaded file plus the feature vector built from them.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedParameters {
    /// Every (parameter, value) pair in file order, as written.
    pub parameters: Vec<(String, String)>,
    pub features: FeatureVector,
}

pub fn read_parameter_file<P: AsRef<Path>>(path: P) -> Result<UploadedParameters> {
    let file = std::fs::File::open(&path).map_err(|e| {
        DiagnosisError::InvalidUpload(format!(
            "failed to open {}: {}",
            path.as_ref().display(),
            e
        ))
    })?;
    read_parameter_csv(file)
}

pub fn read_parameter_csv<R: Read>(source: R) -> Result<UploadedParameters> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(source);

    let headers = reader
        .headers()
        .map_err(|e| DiagnosisError::InvalidUpload(format!("failed to read header row: {}", e)))?;
    if headers.len() < 2 {
        return Err(DiagnosisError::InvalidUpload(
            "CSV file must have at least two columns: parameters and values".to_string(),
        ));
    }

    let mut parameters = Vec::new();
    let mut lookup: HashMap<String, String> = HashMap::new();
    for (row_idx, result) in reader.records().enumerate() {
        let record = result.map_err(|e| {
            DiagnosisError::InvalidUpload(format!("failed to read row {}: {}", row_idx + 1, e))
        })?;
        let name = record.get(0).unwrap_or_default().to_string();
        let value = record.get(1).unwrap_or_default().to_string();
        lookup.insert(name.clone(), value.clone());
        parameters.push((name, value));
    }

    let missing: Vec<&str> = FEATURES
        .iter()
        .map(|f| f.display_name())
        .filter(|name| !lookup.contains_key(*name))
        .collect();
    if !missing.is_empty() {
        return Err(DiagnosisError::InvalidUpload(format!(
            "missing required parameters: {}",
            missing.join(", ")
        )));
    }

    let mut values = [0.0; N_FEATURES];
    for feature in FEATURES {
        let raw = lookup
            .get(feature.display_name())
            .map(String::as_str)
            .unwrap_or_default();
        values[feature.index()] = parse_value(feature, raw)?;
    }

    Ok(UploadedParameters {
        parameters,
        features: FeatureVector::new(&values)?,
    })
}

/// Pregnancies defaults to 0 when blank or unreadable and is truncated to a
/// whole number; every other parameter must parse as a number.
fn parse_value(feature: Feature, raw: &str) -> Result<f64> {
    let parsed = raw.parse::<f64>().ok().filter(|v| v.is_finite());
    match (feature, parsed) {
        (Feature::Pregnancies, Some(v)) => Ok(v.trunc()),
        (Feature::Pregnancies, None) => Ok(0.0),
        (_, Some(v)) => Ok(v),
        (_, None) => Err(DiagnosisError::InvalidFeatureVector(format!(
            "'{}' value '{}' is not numeric",
            feature.display_name(),
            raw
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pregnancies_falls_back_to_zero() {
        assert_eq!(parse_value(Feature::Pregnancies, "").unwrap(), 0.0);
        assert_eq!(parse_value(Feature::Pregnancies, "abc").unwrap(), 0.0);
        assert_eq!(parse_value(Feature::Pregnancies, "2.7").unwrap(), 2.0);
    }

    #[test]
    fn other_parameters_must_be_numeric() {
        assert_eq!(parse_value(Feature::Glucose, "120").unwrap(), 120.0);
        assert!(matches!(
            parse_value(Feature::Glucose, "high"),
            Err(DiagnosisError::InvalidFeatureVector(_))
        ));
        assert!(parse_value(Feature::Age, "nan").is_err());
    }
}
