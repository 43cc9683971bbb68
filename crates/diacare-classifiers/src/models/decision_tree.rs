//! Single decision tree classifier with best-split search.
//!
//! Nodes are split greedily on the (feature, threshold) pair that minimises the
//! weighted impurity of the two children. Candidate thresholds are midpoints
//! between consecutive distinct values of a feature. Features are visited in a
//! per-node permutation drawn from a generator seeded with
//! `TreeParams::random_state`; when two splits are equally good the one visited
//! first wins, so a fixed seed and a fixed dataset always yield the same tree.
use std::fmt::Write as _;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::{Criterion, TreeParams};
use crate::data_handling::distinct_classes;
use crate::error::{DiagnosisError, Result};
use crate::math::{Array1, Array2};
use crate::models::classifier_trait::ClassifierModel;

/// Values closer than this are treated as equal when placing thresholds.
const FEATURE_THRESHOLD: f64 = 1e-7;

/// Nodes whose impurity is at or below this are pure.
const IMPURITY_EPSILON: f64 = 1e-12;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TreeNode {
    /// Internal node; rows with `x[feature] <= threshold` go left.
    Split {
        feature: usize,
        threshold: f64,
        impurity: f64,
        n_samples: usize,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
    /// Terminal node holding the training class counts that reached it.
    Leaf {
        class_counts: Vec<usize>,
        impurity: f64,
        n_samples: usize,
    },
}

impl TreeNode {
    /// Number of split levels below this node (a lone leaf has depth 0).
    pub fn depth(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 0,
            TreeNode::Split { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    pub fn n_leaves(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 1,
            TreeNode::Split { left, right, .. } => left.n_leaves() + right.n_leaves(),
        }
    }

    fn leaf_for(&self, row: &[f64]) -> &[usize] {
        let mut node = self;
        loop {
            match node {
                TreeNode::Leaf { class_counts, .. } => return class_counts,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    node = if row[*feature] <= *threshold {
                        left.as_ref()
                    } else {
                        right.as_ref()
                    };
                }
            }
        }
    }
}

/// Decision tree over integer class codes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTreeClassifier {
    params: TreeParams,
    classes: Vec<i64>,
    n_features: usize,
    root: Option<TreeNode>,
    importances: Vec<f64>,
}

struct SplitCandidate {
    feature: usize,
    threshold: f64,
    child_impurity: f64,
}

impl DecisionTreeClassifier {
    pub fn new(params: TreeParams) -> Self {
        DecisionTreeClassifier {
            params,
            classes: Vec::new(),
            n_features: 0,
            root: None,
            importances: Vec::new(),
        }
    }

    pub fn params(&self) -> &TreeParams {
        &self.params
    }

    /// Class codes seen during fitting, ascending.
    pub fn classes(&self) -> &[i64] {
        &self.classes
    }

    pub fn root(&self) -> Option<&TreeNode> {
        self.root.as_ref()
    }

    /// Total impurity decrease contributed by each feature, normalised to sum to 1.
    ///
    /// All zeros when the tree never split.
    pub fn feature_importances(&self) -> Vec<f64> {
        let total: f64 = self.importances.iter().sum();
        if total <= 0.0 {
            return vec![0.0; self.importances.len()];
        }
        self.importances.iter().map(|v| v / total).collect()
    }

    /// Predict the class code of a single row.
    pub fn predict_row(&self, row: &[f64]) -> Result<i64> {
        let root = self.root.as_ref().ok_or_else(|| {
            DiagnosisError::TrainingError("decision tree has not been fitted".to_string())
        })?;
        if row.len() != self.n_features {
            return Err(DiagnosisError::InvalidFeatureVector(format!(
                "model expects {} features, got {}",
                self.n_features,
                row.len()
            )));
        }
        let counts = root.leaf_for(row);
        Ok(self.classes[argmax(counts)])
    }

    /// Human readable dump of the fitted tree, one node per line.
    pub fn render(&self, feature_names: &[&str]) -> String {
        let mut out = String::new();
        if let Some(root) = &self.root {
            self.render_node(root, feature_names, 0, &mut out);
        }
        out
    }

    fn render_node(&self, node: &TreeNode, names: &[&str], depth: usize, out: &mut String) {
        let indent = "|   ".repeat(depth);
        match node {
            TreeNode::Leaf { class_counts, .. } => {
                let class = self.classes[argmax(class_counts)];
                let _ = writeln!(out, "{}|--- class: {}", indent, class);
            }
            TreeNode::Split {
                feature,
                threshold,
                left,
                right,
                ..
            } => {
                let name = names
                    .get(*feature)
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| format!("feature_{}", feature));
                let _ = writeln!(out, "{}|--- {} <= {:.2}", indent, name, threshold);
                self.render_node(left, names, depth + 1, out);
                let _ = writeln!(out, "{}|--- {} >  {:.2}", indent, name, threshold);
                self.render_node(right, names, depth + 1, out);
            }
        }
    }

    fn build(
        &mut self,
        x: &Array2<f64>,
        codes: &[usize],
        indices: Vec<usize>,
        depth: usize,
        rng: &mut StdRng,
    ) -> TreeNode {
        let n_classes = self.classes.len();
        let counts = class_counts(codes, &indices, n_classes);
        let n_samples = indices.len();
        let impurity = node_impurity(self.params.criterion, &counts, n_samples);

        let is_leaf = depth >= self.params.max_depth
            || n_samples < self.params.min_samples_split
            || n_samples < 2 * self.params.min_samples_leaf
            || impurity <= IMPURITY_EPSILON;

        let split = if is_leaf {
            None
        } else {
            self.find_best_split(x, codes, &indices, rng)
        };

        let Some(split) = split else {
            return TreeNode::Leaf {
                class_counts: counts,
                impurity,
                n_samples,
            };
        };

        let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&row| x[(row, split.feature)] <= split.threshold);

        self.importances[split.feature] +=
            n_samples as f64 * impurity - n_samples as f64 * split.child_impurity;

        log::trace!(
            "depth {}: split feature {} at {:.4} ({} | {} rows)",
            depth,
            split.feature,
            split.threshold,
            left_idx.len(),
            right_idx.len()
        );

        let left = self.build(x, codes, left_idx, depth + 1, rng);
        let right = self.build(x, codes, right_idx, depth + 1, rng);

        TreeNode::Split {
            feature: split.feature,
            threshold: split.threshold,
            impurity,
            n_samples,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    fn find_best_split(
        &self,
        x: &Array2<f64>,
        codes: &[usize],
        indices: &[usize],
        rng: &mut StdRng,
    ) -> Option<SplitCandidate> {
        let mut order: Vec<usize> = (0..self.n_features).collect();
        order.shuffle(rng);

        let per_feature: Vec<Option<SplitCandidate>> = order
            .par_iter()
            .map(|&feature| {
                best_split_on_feature(
                    x,
                    codes,
                    indices,
                    feature,
                    self.classes.len(),
                    self.params.criterion,
                    self.params.min_samples_leaf,
                )
            })
            .collect();

        // Reduce in permutation order; strict comparison keeps the first of equal splits.
        let mut best: Option<SplitCandidate> = None;
        for candidate in per_feature.into_iter().flatten() {
            let better = best
                .as_ref()
                .map_or(true, |b| candidate.child_impurity < b.child_impurity);
            if better {
                best = Some(candidate);
            }
        }
        best
    }
}

impl ClassifierModel for DecisionTreeClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<i64>) -> Result<()> {
        if x.nrows() != y.len() {
            return Err(DiagnosisError::TrainingError(format!(
                "feature table has {} rows but label vector has {}",
                x.nrows(),
                y.len()
            )));
        }
        if x.nrows() == 0 || x.ncols() == 0 {
            return Err(DiagnosisError::TrainingError(
                "training set is empty".to_string(),
            ));
        }
        let classes = distinct_classes(y);
        if classes.len() < 2 {
            return Err(DiagnosisError::TrainingError(format!(
                "need at least 2 distinct classes, found {}",
                classes.len()
            )));
        }

        // Every label is in `classes`.
        let codes: Vec<usize> = y
            .iter()
            .map(|label| classes.binary_search(label).unwrap_or(0))
            .collect();

        self.classes = classes;
        self.n_features = x.ncols();
        self.importances = vec![0.0; x.ncols()];

        let mut rng = StdRng::seed_from_u64(self.params.random_state);
        let root = self.build(x, &codes, (0..x.nrows()).collect(), 0, &mut rng);

        log::debug!(
            "Fitted decision tree: depth {}, {} leaves, {} classes",
            root.depth(),
            root.n_leaves(),
            self.classes.len()
        );
        self.root = Some(root);
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<i64>> {
        x.rows()
            .map(|row| self.predict_row(row))
            .collect::<Result<Vec<_>>>()
            .map(Array1::from_vec)
    }

    fn name(&self) -> &str {
        "decision_tree"
    }
}

fn best_split_on_feature(
    x: &Array2<f64>,
    codes: &[usize],
    indices: &[usize],
    feature: usize,
    n_classes: usize,
    criterion: Criterion,
    min_samples_leaf: usize,
) -> Option<SplitCandidate> {
    let mut sorted: Vec<(f64, usize)> = indices
        .iter()
        .map(|&row| (x[(row, feature)], codes[row]))
        .collect();
    sorted.sort_by(|a, b| a.0.total_cmp(&b.0));

    let n = sorted.len();
    let (first, last) = (sorted[0].0, sorted[n - 1].0);
    if last <= first + FEATURE_THRESHOLD {
        return None;
    }

    let mut left = vec![0usize; n_classes];
    let mut right = vec![0usize; n_classes];
    for &(_, code) in &sorted {
        right[code] += 1;
    }

    let mut best: Option<SplitCandidate> = None;
    for pos in 0..n - 1 {
        let (value, code) = sorted[pos];
        left[code] += 1;
        right[code] -= 1;

        let next = sorted[pos + 1].0;
        if next <= value + FEATURE_THRESHOLD {
            continue;
        }
        let n_left = pos + 1;
        let n_right = n - n_left;
        if n_left < min_samples_leaf || n_right < min_samples_leaf {
            continue;
        }

        let child_impurity = (n_left as f64 * node_impurity(criterion, &left, n_left)
            + n_right as f64 * node_impurity(criterion, &right, n_right))
            / n as f64;

        if best.as_ref().map_or(true, |b| child_impurity < b.child_impurity) {
            let mut threshold = value / 2.0 + next / 2.0;
            if threshold == next || !threshold.is_finite() {
                threshold = value;
            }
            best = Some(SplitCandidate {
                feature,
                threshold,
                child_impurity,
            });
        }
    }
    best
}

fn class_counts(codes: &[usize], indices: &[usize], n_classes: usize) -> Vec<usize> {
    let mut counts = vec![0usize; n_classes];
    for &row in indices {
        counts[codes[row]] += 1;
    }
    counts
}

fn node_impurity(criterion: Criterion, counts: &[usize], n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let n = n as f64;
    match criterion {
        Criterion::Entropy => counts
            .iter()
            .filter(|&&c| c > 0)
            .map(|&c| {
                let p = c as f64 / n;
                -p * p.log2()
            })
            .sum(),
        Criterion::Gini => {
            1.0 - counts
                .iter()
                .map(|&c| {
                    let p = c as f64 / n;
                    p * p
                })
                .sum::<f64>()
        }
    }
}

/// Index of the largest count; the lowest index wins ties.
fn argmax(counts: &[usize]) -> usize {
    let mut best = 0;
    for (idx, &count) in counts.iter().enumerate() {
        if count > counts[best] {
            best = idx;
        }
    }
    best
}
