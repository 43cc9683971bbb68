//! Descriptive statistics over the loaded dataset.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use statrs::statistics::{Data, Distribution, Max, Min, OrderStatistics};

use crate::data_handling::{Dataset, Feature, FeatureVector, FEATURES, OUTCOME_COLUMN};

/// Count, moments and quartiles of one dataset column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSummary {
    pub name: String,
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (n - 1 denominator).
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub q50: f64,
    pub q75: f64,
    pub max: f64,
}

impl ColumnSummary {
    /// Summarise `values`; empty input yields a zero count and NaN statistics.
    pub fn from_values(name: &str, values: Vec<f64>) -> Self {
        let count = values.len();
        if count == 0 {
            return Self {
                name: name.to_string(),
                count,
                mean: f64::NAN,
                std: f64::NAN,
                min: f64::NAN,
                q25: f64::NAN,
                q50: f64::NAN,
                q75: f64::NAN,
                max: f64::NAN,
            };
        }
        let mut data = Data::new(values);
        Self {
            name: name.to_string(),
            count,
            mean: data.mean().unwrap_or(f64::NAN),
            std: data.std_dev().unwrap_or(f64::NAN),
            min: data.min(),
            q25: data.quantile(0.25),
            q50: data.quantile(0.5),
            q75: data.quantile(0.75),
            max: data.max(),
        }
    }
}

/// Per-column summaries (nine features then the outcome) and outcome counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub n_rows: usize,
    pub columns: Vec<ColumnSummary>,
    /// (class code, number of rows), ascending by class code.
    pub class_distribution: Vec<(i64, usize)>,
}

impl DatasetSummary {
    pub fn from_dataset(dataset: &Dataset) -> Self {
        let mut columns: Vec<ColumnSummary> = FEATURES
            .iter()
            .map(|f| {
                ColumnSummary::from_values(f.column_name(), dataset.x.column(f.index()).to_vec())
            })
            .collect();
        columns.push(ColumnSummary::from_values(
            OUTCOME_COLUMN,
            dataset.y.iter().map(|&v| v as f64).collect(),
        ));

        Self {
            n_rows: dataset.n_rows(),
            columns,
            class_distribution: class_distribution(dataset),
        }
    }

    pub fn column(&self, name: &str) -> Option<&ColumnSummary> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Observed (min, max) of a feature: the accepted input range for that measurement.
    pub fn range(&self, feature: Feature) -> Option<(f64, f64)> {
        self.column(feature.column_name()).map(|c| (c.min, c.max))
    }

    /// Features of `features` lying outside the observed dataset range.
    pub fn out_of_range(&self, features: &FeatureVector) -> Vec<Feature> {
        features
            .named()
            .filter(|(feature, value)| {
                self.range(*feature)
                    .map_or(false, |(lo, hi)| *value < lo || *value > hi)
            })
            .map(|(feature, _)| feature)
            .collect()
    }
}

pub fn class_distribution(dataset: &Dataset) -> Vec<(i64, usize)> {
    let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
    for &label in dataset.y.iter() {
        *counts.entry(label).or_default() += 1;
    }
    counts.into_iter().collect()
}

/// Values of one dataset column by header name, outcome included.
pub fn column_values(dataset: &Dataset, name: &str) -> Option<Vec<f64>> {
    if name == OUTCOME_COLUMN {
        return Some(dataset.y.iter().map(|&v| v as f64).collect());
    }
    FEATURES
        .iter()
        .find(|f| f.column_name() == name)
        .map(|f| dataset.x.column(f.index()).to_vec())
}
