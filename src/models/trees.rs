//! Bagged regression trees, the optional secondary model
//!
//! A random-forest style ensemble: each tree is grown on a bootstrap sample
//! with variance-reduction splits over a random feature subset, and the
//! prediction is the average over trees. The RNG is injected so tests can
//! pin the bootstrap.

use crate::config::TreesConfig;
use crate::error::{ForecastError, Result};
use rand::seq::SliceRandom;
use rand::Rng;

/// Number of features per training row: calendar month, calendar quarter,
/// exogenous value, and the three sales lags.
pub const FEATURE_COUNT: usize = 6;

#[derive(Debug, Clone)]
enum Node {
    Leaf(f64),
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    fn eval(&self, row: &[f64]) -> f64 {
        match self {
            Node::Leaf(value) => *value,
            Node::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                if row[*feature] <= *threshold {
                    left.eval(row)
                } else {
                    right.eval(row)
                }
            }
        }
    }
}

/// Bagged regression tree ensemble specification.
#[derive(Debug, Clone)]
pub struct BaggedTrees {
    config: TreesConfig,
}

/// A fitted ensemble ready to predict.
#[derive(Debug, Clone)]
pub struct FittedBaggedTrees {
    trees: Vec<Node>,
}

impl BaggedTrees {
    pub fn new(config: TreesConfig) -> Self {
        Self { config }
    }

    /// Fit the ensemble. Failures here are internal: the engine logs them
    /// and degrades to primary-model output.
    pub fn fit<R: Rng + ?Sized>(
        &self,
        rows: &[Vec<f64>],
        targets: &[f64],
        rng: &mut R,
    ) -> Result<FittedBaggedTrees> {
        if rows.is_empty() || rows.len() != targets.len() {
            return Err(ForecastError::SecondaryModelDegraded(format!(
                "training shape mismatch: {} rows, {} targets",
                rows.len(),
                targets.len()
            )));
        }
        let width = rows[0].len();
        if width == 0 || rows.iter().any(|r| r.len() != width) {
            return Err(ForecastError::SecondaryModelDegraded(
                "ragged training rows".to_string(),
            ));
        }
        if rows
            .iter()
            .flatten()
            .chain(targets)
            .any(|v| !v.is_finite())
        {
            return Err(ForecastError::SecondaryModelDegraded(
                "non-finite training values".to_string(),
            ));
        }

        let mut trees = Vec::with_capacity(self.config.n_trees);
        for _ in 0..self.config.n_trees {
            let sample: Vec<usize> = (0..rows.len())
                .map(|_| rng.gen_range(0..rows.len()))
                .collect();
            let boot_rows: Vec<&[f64]> = sample.iter().map(|&i| rows[i].as_slice()).collect();
            let boot_y: Vec<f64> = sample.iter().map(|&i| targets[i]).collect();
            trees.push(self.grow(&boot_rows, &boot_y, 0, rng));
        }

        Ok(FittedBaggedTrees { trees })
    }

    fn grow<R: Rng + ?Sized>(&self, rows: &[&[f64]], y: &[f64], depth: usize, rng: &mut R) -> Node {
        let mean = y.iter().sum::<f64>() / y.len() as f64;
        if depth >= self.config.max_depth
            || y.len() < self.config.min_leaf * 2
            || sum_sq_dev(y, mean) < f64::EPSILON
        {
            return Node::Leaf(mean);
        }

        let width = rows[0].len();
        let mut features: Vec<usize> = (0..width).collect();
        features.shuffle(rng);
        features.truncate(self.config.max_split_features.min(width));

        let parent_score = sum_sq_dev(y, mean);
        let mut best: Option<(usize, f64, f64)> = None;
        for &feature in &features {
            let mut values: Vec<f64> = rows.iter().map(|r| r[feature]).collect();
            values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            values.dedup();
            for pair in values.windows(2) {
                let threshold = (pair[0] + pair[1]) / 2.0;
                let (left, right) = partition_targets(rows, y, feature, threshold);
                if left.len() < self.config.min_leaf || right.len() < self.config.min_leaf {
                    continue;
                }
                let score = sum_sq_dev(&left, mean_of(&left)) + sum_sq_dev(&right, mean_of(&right));
                if score < best.map_or(parent_score, |(_, _, s)| s) {
                    best = Some((feature, threshold, score));
                }
            }
        }

        match best {
            Some((feature, threshold, _)) => {
                let mut left_rows = Vec::new();
                let mut left_y = Vec::new();
                let mut right_rows = Vec::new();
                let mut right_y = Vec::new();
                for (row, &target) in rows.iter().zip(y) {
                    if row[feature] <= threshold {
                        left_rows.push(*row);
                        left_y.push(target);
                    } else {
                        right_rows.push(*row);
                        right_y.push(target);
                    }
                }
                Node::Split {
                    feature,
                    threshold,
                    left: Box::new(self.grow(&left_rows, &left_y, depth + 1, rng)),
                    right: Box::new(self.grow(&right_rows, &right_y, depth + 1, rng)),
                }
            }
            None => Node::Leaf(mean),
        }
    }
}

impl FittedBaggedTrees {
    /// Average prediction over all trees.
    pub fn predict(&self, row: &[f64]) -> f64 {
        let sum: f64 = self.trees.iter().map(|t| t.eval(row)).sum();
        sum / self.trees.len() as f64
    }
}

fn mean_of(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn sum_sq_dev(values: &[f64], mean: f64) -> f64 {
    values.iter().map(|v| (v - mean) * (v - mean)).sum()
}

/// Target values partitioned by a feature threshold.
fn partition_targets(
    rows: &[&[f64]],
    y: &[f64],
    feature: usize,
    threshold: f64,
) -> (Vec<f64>, Vec<f64>) {
    let mut left = Vec::new();
    let mut right = Vec::new();
    for (row, &target) in rows.iter().zip(y) {
        if row[feature] <= threshold {
            left.push(target);
        } else {
            right.push(target);
        }
    }
    (left, right)
}
