use crate::error::{DiagnosisError, Result};
use crate::math::{Array1, Array2};

/// Contract shared by the classifiers the predictor can train.
///
/// Labels are integer class codes as they appear in the dataset's outcome column.
pub trait ClassifierModel {
    /// Fit the model on a feature table and its labels.
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<i64>) -> Result<()>;

    /// Predict a class code for every row of `x`.
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<i64>>;

    /// Fraction of rows in `x` whose prediction equals `y`.
    fn score(&self, x: &Array2<f64>, y: &Array1<i64>) -> Result<f64> {
        if x.nrows() != y.len() {
            return Err(DiagnosisError::TrainingError(format!(
                "cannot score {} rows against {} labels",
                x.nrows(),
                y.len()
            )));
        }
        if y.is_empty() {
            return Ok(0.0);
        }
        let predictions = self.predict(x)?;
        let correct = predictions
            .iter()
            .zip(y.iter())
            .filter(|(pred, truth)| pred == truth)
            .count();
        Ok(correct as f64 / y.len() as f64)
    }

    /// Optional human readable name for the model
    fn name(&self) -> &str {
        "classifier"
    }
}
