//! Mapping from predicted class codes to diagnosis labels.
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Diagnosis {
    NoDiabetes,
    Type1,
    Type2,
    Gestational,
    Prediabetic,
    /// Monogenic diabetes, latent autoimmune diabetes in adults, or type 3c.
    MonogenicLadaType3c,
}

/// Map a class code and pregnancy count to a diagnosis.
///
/// Total over every integer: unknown codes (negative or above 5) fall back to
/// [`Diagnosis::NoDiabetes`]. Code 3 means gestational diabetes only when the
/// patient has at least one pregnancy; with zero pregnancies it also falls back
/// to `NoDiabetes`, and a warning is logged because the classifier and the
/// input disagree.
pub fn map_label(class_code: i64, pregnancies: f64) -> Diagnosis {
    match class_code {
        1 => Diagnosis::Type1,
        2 => Diagnosis::Type2,
        3 if pregnancies > 0.0 => Diagnosis::Gestational,
        3 => {
            log::warn!(
                "Class 3 (gestational) predicted with {} pregnancies; reporting no diabetes",
                pregnancies
            );
            Diagnosis::NoDiabetes
        }
        4 => Diagnosis::Prediabetic,
        5 => Diagnosis::MonogenicLadaType3c,
        _ => Diagnosis::NoDiabetes,
    }
}

impl Diagnosis {
    /// Short label.
    pub fn label(&self) -> &'static str {
        match self {
            Diagnosis::NoDiabetes => "free from diabetes",
            Diagnosis::Type1 => "high risk of diabetes type 1",
            Diagnosis::Type2 => "high risk of diabetes type 2",
            Diagnosis::Gestational => "high risk of gestational diabetes",
            Diagnosis::Prediabetic => "prediabetic",
            Diagnosis::MonogenicLadaType3c => "Monogenic/LADA/type 3c diabetes",
        }
    }

    /// Full sentence used on the diagnosis screen and in reports.
    pub fn sentence(&self) -> &'static str {
        match self {
            Diagnosis::NoDiabetes => "The person is free from diabetes",
            Diagnosis::Type1 => "The person has a high risk of diabetes type 1",
            Diagnosis::Type2 => "The person has a high risk of diabetes type 2",
            Diagnosis::Gestational => "The person has a high risk of gestational diabetes",
            Diagnosis::Prediabetic => "The person is prediabetic",
            Diagnosis::MonogenicLadaType3c => {
                "The person is having Monogenic Diabetes, Latent Autoimmune Diabetes in Adults or type 3c diabetes"
            }
        }
    }

    /// Disease type as passed to medication guidance for uploaded files.
    pub fn disease_type(&self) -> &'static str {
        match self {
            Diagnosis::NoDiabetes => "No diabetes detected",
            Diagnosis::Type1 => "High risk of diabetes type 1",
            Diagnosis::Type2 => "High risk of diabetes type 2",
            Diagnosis::Gestational => "High risk of gestational diabetes",
            Diagnosis::Prediabetic => "Prediabetes",
            Diagnosis::MonogenicLadaType3c => "Monogenic Diabetes or Type 3c diabetes",
        }
    }

    pub fn is_at_risk(&self) -> bool {
        !matches!(self, Diagnosis::NoDiabetes)
    }
}

impl fmt::Display for Diagnosis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
