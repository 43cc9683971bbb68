//! Clinical records, the fixed feature order, and the training table.
//!
//! Every feature vector the classifier sees is laid out in the order of
//! [`FEATURES`]. The loader, the uploaded-file reader and the predictor all go
//! through this module so the training and inference orders cannot drift apart.
use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::error::{DiagnosisError, Result};
use crate::math::{Array1, Array2};

pub const N_FEATURES: usize = 9;

/// Name of the label column in the dataset file.
pub const OUTCOME_COLUMN: &str = "Outcome";

/// One clinical measurement used as a model input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Feature {
    HbA1c,
    Glucose,
    BloodPressure,
    SkinThickness,
    Insulin,
    Bmi,
    PedigreeFunction,
    Pregnancies,
    Age,
}

/// Feature order shared by training and prediction.
pub const FEATURES: [Feature; N_FEATURES] = [
    Feature::HbA1c,
    Feature::Glucose,
    Feature::BloodPressure,
    Feature::SkinThickness,
    Feature::Insulin,
    Feature::Bmi,
    Feature::PedigreeFunction,
    Feature::Pregnancies,
    Feature::Age,
];

impl Feature {
    /// Position of this feature in a [`FeatureVector`].
    pub fn index(self) -> usize {
        match self {
            Feature::HbA1c => 0,
            Feature::Glucose => 1,
            Feature::BloodPressure => 2,
            Feature::SkinThickness => 3,
            Feature::Insulin => 4,
            Feature::Bmi => 5,
            Feature::PedigreeFunction => 6,
            Feature::Pregnancies => 7,
            Feature::Age => 8,
        }
    }

    /// Header of the column holding this feature in the dataset file.
    pub fn column_name(self) -> &'static str {
        match self {
            Feature::HbA1c => "HbA1c_level",
            Feature::Glucose => "Glucose",
            Feature::BloodPressure => "BloodPressure",
            Feature::SkinThickness => "SkinThickness",
            Feature::Insulin => "Insulin",
            Feature::Bmi => "BMI",
            Feature::PedigreeFunction => "DiabetesPedigreeFunction",
            Feature::Pregnancies => "Pregnancies",
            Feature::Age => "Age",
        }
    }

    /// Name shown to users and expected in uploaded parameter files.
    pub fn display_name(self) -> &'static str {
        match self {
            Feature::HbA1c => "HbA1c Level",
            Feature::Glucose => "Glucose",
            Feature::BloodPressure => "BloodPressure",
            Feature::SkinThickness => "SkinThickness",
            Feature::Insulin => "Insulin",
            Feature::Bmi => "BMI",
            Feature::PedigreeFunction => "Genetic Correlation",
            Feature::Pregnancies => "Pregnancies",
            Feature::Age => "Age",
        }
    }

    pub fn from_display_name(name: &str) -> Option<Feature> {
        FEATURES.iter().copied().find(|f| f.display_name() == name)
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// One row of the dataset file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClinicalRecord {
    #[serde(rename = "HbA1c_level")]
    pub hba1c: f64,
    #[serde(rename = "Pregnancies")]
    pub pregnancies: f64,
    #[serde(rename = "Glucose")]
    pub glucose: f64,
    #[serde(rename = "BloodPressure")]
    pub blood_pressure: f64,
    #[serde(rename = "SkinThickness")]
    pub skin_thickness: f64,
    #[serde(rename = "Insulin")]
    pub insulin: f64,
    #[serde(rename = "BMI")]
    pub bmi: f64,
    #[serde(rename = "DiabetesPedigreeFunction")]
    pub pedigree: f64,
    #[serde(rename = "Age")]
    pub age: f64,
    #[serde(rename = "Outcome")]
    pub outcome: i64,
}

impl ClinicalRecord {
    pub fn measurements(&self) -> Measurements {
        Measurements {
            hba1c: self.hba1c,
            glucose: self.glucose,
            blood_pressure: self.blood_pressure,
            skin_thickness: self.skin_thickness,
            insulin: self.insulin,
            bmi: self.bmi,
            pedigree: self.pedigree,
            pregnancies: self.pregnancies,
            age: self.age,
        }
    }
}

/// Named clinical measurements for one patient.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Measurements {
    pub hba1c: f64,
    pub glucose: f64,
    pub blood_pressure: f64,
    pub skin_thickness: f64,
    pub insulin: f64,
    pub bmi: f64,
    pub pedigree: f64,
    pub pregnancies: f64,
    pub age: f64,
}

impl Measurements {
    /// Encode into the classifier's feature order.
    pub fn to_feature_vector(&self) -> Result<FeatureVector> {
        FeatureVector::new(&[
            self.hba1c,
            self.glucose,
            self.blood_pressure,
            self.skin_thickness,
            self.insulin,
            self.bmi,
            self.pedigree,
            self.pregnancies,
            self.age,
        ])
    }
}

/// Nine finite values in [`FEATURES`] order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct FeatureVector([f64; N_FEATURES]);

impl FeatureVector {
    /// Validate a raw slice as a feature vector.
    ///
    /// Fails with `InvalidFeatureVector` when the length is not 9 or a value
    /// is NaN or infinite.
    pub fn new(values: &[f64]) -> Result<Self> {
        if values.len() != N_FEATURES {
            return Err(DiagnosisError::InvalidFeatureVector(format!(
                "expected {} values, got {}",
                N_FEATURES,
                values.len()
            )));
        }
        let mut out = [0.0; N_FEATURES];
        for (idx, &value) in values.iter().enumerate() {
            if !value.is_finite() {
                return Err(DiagnosisError::InvalidFeatureVector(format!(
                    "'{}' is not a finite number ({})",
                    FEATURES[idx].display_name(),
                    value
                )));
            }
            out[idx] = value;
        }
        Ok(Self(out))
    }

    pub fn get(&self, feature: Feature) -> f64 {
        self.0[feature.index()]
    }

    pub fn pregnancies(&self) -> f64 {
        self.get(Feature::Pregnancies)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Pairs of (feature, value) in feature order.
    pub fn named(&self) -> impl Iterator<Item = (Feature, f64)> + '_ {
        FEATURES.iter().copied().zip(self.0.iter().copied())
    }

    /// Decode back into named measurements.
    pub fn to_measurements(&self) -> Measurements {
        Measurements {
            hba1c: self.get(Feature::HbA1c),
            glucose: self.get(Feature::Glucose),
            blood_pressure: self.get(Feature::BloodPressure),
            skin_thickness: self.get(Feature::SkinThickness),
            insulin: self.get(Feature::Insulin),
            bmi: self.get(Feature::Bmi),
            pedigree: self.get(Feature::PedigreeFunction),
            pregnancies: self.get(Feature::Pregnancies),
            age: self.get(Feature::Age),
        }
    }
}

impl TryFrom<Vec<f64>> for FeatureVector {
    type Error = DiagnosisError;

    fn try_from(value: Vec<f64>) -> Result<Self> {
        FeatureVector::new(&value)
    }
}

impl From<FeatureVector> for Vec<f64> {
    fn from(value: FeatureVector) -> Self {
        value.0.to_vec()
    }
}

/// The loaded dataset: raw records plus the derived feature table and labels.
///
/// Immutable once built, so it can be shared read-only between sessions.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub records: Vec<ClinicalRecord>,
    pub x: Array2<f64>,
    pub y: Array1<i64>,
}

impl Dataset {
    pub fn from_records(records: Vec<ClinicalRecord>) -> Result<Self> {
        let mut features = Vec::with_capacity(records.len() * N_FEATURES);
        let mut labels = Vec::with_capacity(records.len());
        for (row_idx, record) in records.iter().enumerate() {
            if record.outcome < 0 {
                return Err(DiagnosisError::DataUnavailable(format!(
                    "negative outcome {} at row {}",
                    record.outcome,
                    row_idx + 1
                )));
            }
            let vector = record.measurements().to_feature_vector().map_err(|e| {
                DiagnosisError::DataUnavailable(format!("row {}: {}", row_idx + 1, e))
            })?;
            features.extend_from_slice(vector.as_slice());
            labels.push(record.outcome);
        }

        let x = Array2::from_shape_vec((records.len(), N_FEATURES), features)
            .map_err(|e| DiagnosisError::DataUnavailable(e.to_string()))?;
        let y = Array1::from_vec(labels);
        Ok(Self { records, x, y })
    }

    pub fn n_rows(&self) -> usize {
        self.records.len()
    }

    /// Distinct outcome codes, ascending.
    pub fn classes(&self) -> Vec<i64> {
        distinct_classes(&self.y)
    }

    pub fn fingerprint(&self) -> u64 {
        fingerprint(&self.x, &self.y)
    }

    pub fn log_input_data_summary(&self) {
        log::info!("----- Input Data Summary -----");
        log::info!(
            "{} clinical records, {} feature columns",
            self.n_rows(),
            self.x.ncols()
        );
        log::info!("Outcome classes: {:?}", self.classes());
        log::info!("-------------------------------");
    }
}

pub fn distinct_classes(y: &Array1<i64>) -> Vec<i64> {
    y.iter().copied().collect::<BTreeSet<_>>().into_iter().collect()
}

/// Identity of a training set: equal tables hash equal within one process.
pub fn fingerprint(x: &Array2<f64>, y: &Array1<i64>) -> u64 {
    let mut hasher = DefaultHasher::new();
    x.shape().hash(&mut hasher);
    for value in x.as_slice() {
        value.to_bits().hash(&mut hasher);
    }
    y.as_slice().hash(&mut hasher);
    hasher.finish()
}
