//! Training and prediction entry points.
//!
//! `predict` trains a fresh tree for every call. `Predictor` gives the same
//! answers but keeps fitted models in a [`ModelCache`] keyed by the training
//! set fingerprint, so a dataset is only trained once per process.
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use crate::config::TreeParams;
use crate::data_handling::{fingerprint, Dataset, FeatureVector};
use crate::error::Result;
use crate::math::{Array1, Array2};
use crate::models::{ClassifierModel, DecisionTreeClassifier};

/// Class code predicted for one feature vector and the raw in-sample accuracy
/// of the model that produced it.
///
/// `score` is measured on the training rows themselves. It is not a
/// generalisation estimate and carries no display calibration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub class_code: i64,
    pub score: f64,
}

/// A fitted tree together with its in-sample accuracy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainedModel {
    pub tree: DecisionTreeClassifier,
    pub score: f64,
    pub fingerprint: u64,
}

impl TrainedModel {
    pub fn predict(&self, features: &FeatureVector) -> Result<PredictionResult> {
        let class_code = self.tree.predict_row(features.as_slice())?;
        Ok(PredictionResult {
            class_code,
            score: self.score,
        })
    }

    pub fn predict_batch(&self, x: &Array2<f64>) -> Result<Array1<i64>> {
        self.tree.predict(x)
    }
}

/// Fit a tree with the fixed production hyper-parameters.
pub fn train_model(x: &Array2<f64>, y: &Array1<i64>) -> Result<TrainedModel> {
    train_model_with_params(x, y, TreeParams::default())
}

pub fn train_model_with_params(
    x: &Array2<f64>,
    y: &Array1<i64>,
    params: TreeParams,
) -> Result<TrainedModel> {
    let mut tree = DecisionTreeClassifier::new(params);
    tree.fit(x, y)?;
    let score = tree.score(x, y)?;
    log::debug!(
        "Trained {} on {} rows, in-sample accuracy {:.4}",
        tree.name(),
        x.nrows(),
        score
    );
    Ok(TrainedModel {
        tree,
        score,
        fingerprint: fingerprint(x, y),
    })
}

/// Train on `(x, y)` and classify one raw feature vector.
///
/// Fails with `InvalidFeatureVector` before any training when `features` does
/// not hold exactly nine finite values.
pub fn predict(x: &Array2<f64>, y: &Array1<i64>, features: &[f64]) -> Result<PredictionResult> {
    let features = FeatureVector::new(features)?;
    train_model(x, y)?.predict(&features)
}

/// Fitted models keyed by training set fingerprint.
#[derive(Debug, Default)]
pub struct ModelCache {
    entries: RwLock<HashMap<u64, Arc<TrainedModel>>>,
}

impl ModelCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_train(&self, x: &Array2<f64>, y: &Array1<i64>) -> Result<Arc<TrainedModel>> {
        let key = fingerprint(x, y);
        if let Some(model) = self
            .entries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&key)
        {
            log::trace!("Model cache hit for training set {:016x}", key);
            return Ok(Arc::clone(model));
        }

        let model = Arc::new(train_model(x, y)?);
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        // Another caller may have trained the same set meanwhile; both results are identical.
        let entry = entries.entry(key).or_insert(model);
        Ok(Arc::clone(entry))
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }
}

/// Cached front end over [`predict`].
#[derive(Debug, Default)]
pub struct Predictor {
    cache: ModelCache,
}

impl Predictor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn model(&self, x: &Array2<f64>, y: &Array1<i64>) -> Result<Arc<TrainedModel>> {
        self.cache.get_or_train(x, y)
    }

    pub fn predict(
        &self,
        x: &Array2<f64>,
        y: &Array1<i64>,
        features: &[f64],
    ) -> Result<PredictionResult> {
        let features = FeatureVector::new(features)?;
        self.model(x, y)?.predict(&features)
    }

    pub fn predict_dataset(
        &self,
        dataset: &Dataset,
        features: &FeatureVector,
    ) -> Result<PredictionResult> {
        self.model(&dataset.x, &dataset.y)?.predict(features)
    }

    pub fn cache(&self) -> &ModelCache {
        &self.cache
    }
}
