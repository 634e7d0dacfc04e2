//! Random forest of CART trees (Gini impurity, bootstrap rows, random
//! feature subsets per split, probability averaging).

#![allow(non_snake_case)]

use super::{Classifier, ModelError};
use ndarray::{Array1, Array2, ArrayView1};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

#[derive(Debug, Clone, PartialEq)]
pub struct ForestParams {
    pub n_trees: usize,
    /// Candidate features per split; `None` means `sqrt(n_features)`.
    pub max_features: Option<usize>,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub bootstrap: bool,
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_features: None,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            bootstrap: true,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Leaf {
        /// Share of positive samples reaching this leaf.
        proba: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// Single classification tree stored as a node arena; node 0 is the root.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionTree {
    nodes: Vec<Node>,
}

impl DecisionTree {
    /// Grow a tree on `samples` (row indices, repeats allowed).
    fn grow(
        X: &Array2<f64>,
        y: &[u8],
        samples: Vec<usize>,
        params: &ForestParams,
        max_features: usize,
        rng: StdRng,
    ) -> Self {
        let mut builder = TreeBuilder {
            X,
            y,
            params,
            max_features,
            rng,
            features: (0..X.ncols()).collect(),
            nodes: Vec::new(),
        };
        builder.build(samples, 0);
        Self {
            nodes: builder.nodes,
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], id: usize) -> usize {
            match nodes[id] {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => 1 + walk(nodes, left).max(walk(nodes, right)),
            }
        }
        if self.nodes.is_empty() {
            0
        } else {
            walk(&self.nodes, 0)
        }
    }

    pub fn predict_row(&self, row: &ArrayView1<f64>) -> f64 {
        let mut id = 0;
        loop {
            match self.nodes[id] {
                Node::Leaf { proba } => return proba,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    id = if row[feature] <= threshold { left } else { right };
                }
            }
        }
    }
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    impurity: f64,
}

struct TreeBuilder<'a> {
    X: &'a Array2<f64>,
    y: &'a [u8],
    params: &'a ForestParams,
    max_features: usize,
    rng: StdRng,
    /// Feature indices, reshuffled lazily at every node.
    features: Vec<usize>,
    nodes: Vec<Node>,
}

impl TreeBuilder<'_> {
    fn build(&mut self, samples: Vec<usize>, depth: usize) -> usize {
        let n = samples.len();
        let positives = samples.iter().filter(|&&i| self.y[i] == 1).count();
        let proba = positives as f64 / n.max(1) as f64;

        let id = self.nodes.len();
        self.nodes.push(Node::Leaf { proba });

        let pure = positives == 0 || positives == n;
        let too_small = n < self.params.min_samples_split || n < 2 * self.params.min_samples_leaf;
        let too_deep = self.params.max_depth.is_some_and(|d| depth >= d);
        if pure || too_small || too_deep {
            return id;
        }

        let Some(split) = self.best_split(&samples) else {
            return id;
        };

        let (left_samples, right_samples): (Vec<usize>, Vec<usize>) = samples
            .into_iter()
            .partition(|&i| self.X[[i, split.feature]] <= split.threshold);

        let left = self.build(left_samples, depth + 1);
        let right = self.build(right_samples, depth + 1);
        self.nodes[id] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        id
    }

    /// Visit features in random order until `max_features` non-constant ones
    /// have been evaluated; return the lowest weighted Gini split.
    ///
    /// The order is drawn one position at a time (partial Fisher-Yates), so
    /// wide one-hot inputs only pay for the features actually visited.
    fn best_split(&mut self, samples: &[usize]) -> Option<BestSplit> {
        let n_features = self.features.len();

        let mut best: Option<BestSplit> = None;
        let mut visited = 0;
        for k in 0..n_features {
            if visited >= self.max_features {
                break;
            }
            let pick = self.rng.gen_range(k..n_features);
            self.features.swap(k, pick);
            let feature = self.features[k];

            let first = self.X[[samples[0], feature]];
            if samples.iter().all(|&i| self.X[[i, feature]] == first) {
                continue;
            }
            visited += 1;

            let mut pairs: Vec<(f64, u8)> = samples
                .iter()
                .map(|&i| (self.X[[i, feature]], self.y[i]))
                .collect();
            pairs.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

            if let Some(candidate) = self.scan_feature(feature, &pairs) {
                if best.as_ref().map_or(true, |b| candidate.impurity < b.impurity) {
                    best = Some(candidate);
                }
            }
        }
        best
    }

    fn scan_feature(&self, feature: usize, pairs: &[(f64, u8)]) -> Option<BestSplit> {
        let n = pairs.len();
        let total_pos = pairs.iter().filter(|p| p.1 == 1).count();
        let min_leaf = self.params.min_samples_leaf;

        let mut best: Option<BestSplit> = None;
        let mut left_pos = 0;
        for k in 0..n - 1 {
            left_pos += pairs[k].1 as usize;
            let left_n = k + 1;
            let right_n = n - left_n;

            if pairs[k].0 == pairs[k + 1].0 || left_n < min_leaf || right_n < min_leaf {
                continue;
            }

            let impurity = (left_n as f64 * gini(left_pos, left_n)
                + right_n as f64 * gini(total_pos - left_pos, right_n))
                / n as f64;

            if best.as_ref().map_or(true, |b| impurity < b.impurity) {
                let mut threshold = (pairs[k].0 + pairs[k + 1].0) / 2.0;
                if threshold == pairs[k + 1].0 {
                    threshold = pairs[k].0;
                }
                best = Some(BestSplit {
                    feature,
                    threshold,
                    impurity,
                });
            }
        }
        best
    }
}

fn gini(positives: usize, n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let p = positives as f64 / n as f64;
    2.0 * p * (1.0 - p)
}

/// Bagged ensemble of decision trees.
#[derive(Debug, Clone)]
pub struct RandomForest {
    params: ForestParams,
    trees: Vec<DecisionTree>,
    n_features: usize,
}

impl RandomForest {
    pub fn new(params: ForestParams) -> Self {
        Self {
            params,
            trees: Vec::new(),
            n_features: 0,
        }
    }

    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }
}

impl Default for RandomForest {
    fn default() -> Self {
        Self::new(ForestParams::default())
    }
}

impl Classifier for RandomForest {
    fn name(&self) -> &'static str {
        "Random Forest"
    }

    fn fit(&mut self, X: &Array2<f64>, y: &[u8]) -> Result<(), ModelError> {
        let (n, p) = X.dim();
        if n == 0 || p == 0 {
            return Err(ModelError::EmptyDataset);
        }
        if y.len() != n {
            return Err(ModelError::ShapeMismatch {
                expected: n,
                found: y.len(),
            });
        }

        let max_features = self
            .params
            .max_features
            .unwrap_or_else(|| (p as f64).sqrt() as usize)
            .clamp(1, p);

        // Per-tree seeds drawn up front so results do not depend on scheduling
        let mut rng = StdRng::seed_from_u64(self.params.seed);
        let seeds: Vec<u64> = (0..self.params.n_trees).map(|_| rng.gen()).collect();

        let params = &self.params;
        self.trees = seeds
            .into_par_iter()
            .map(|seed| {
                let mut tree_rng = StdRng::seed_from_u64(seed);
                let samples: Vec<usize> = if params.bootstrap {
                    (0..n).map(|_| tree_rng.gen_range(0..n)).collect()
                } else {
                    (0..n).collect()
                };
                DecisionTree::grow(X, y, samples, params, max_features, tree_rng)
            })
            .collect();
        self.n_features = p;

        tracing::debug!(
            trees = self.trees.len(),
            max_features,
            mean_depth = self.trees.iter().map(DecisionTree::depth).sum::<usize>() as f64
                / self.trees.len().max(1) as f64,
            "random forest fitted"
        );
        Ok(())
    }

    fn predict_proba(&self, X: &Array2<f64>) -> Result<Array1<f64>, ModelError> {
        if self.trees.is_empty() {
            return Err(ModelError::NotFitted);
        }
        if X.ncols() != self.n_features {
            return Err(ModelError::ShapeMismatch {
                expected: self.n_features,
                found: X.ncols(),
            });
        }

        let n_trees = self.trees.len() as f64;
        let proba: Vec<f64> = (0..X.nrows())
            .into_par_iter()
            .map(|i| {
                let row = X.row(i);
                self.trees.iter().map(|t| t.predict_row(&row)).sum::<f64>() / n_trees
            })
            .collect();
        Ok(Array1::from(proba))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn xor_like() -> (Array2<f64>, Vec<u8>) {
        let mut data = Vec::new();
        let mut y = Vec::new();
        for i in 0..40 {
            let a = (i % 2) as f64;
            let b = ((i / 2) % 2) as f64;
            data.extend_from_slice(&[a, b, (i % 7) as f64]);
            y.push(((a as u8) ^ (b as u8)) as u8);
        }
        (Array2::from_shape_vec((40, 3), data).unwrap(), y)
    }

    #[test]
    fn single_tree_fits_training_data_exactly() {
        let (X, y) = xor_like();
        let params = ForestParams {
            n_trees: 1,
            max_features: Some(3),
            bootstrap: false,
            ..ForestParams::default()
        };
        let mut forest = RandomForest::new(params);
        forest.fit(&X, &y).unwrap();
        assert_eq!(forest.predict(&X).unwrap(), y);
        assert!(forest.trees()[0].depth() >= 2);
    }

    #[test]
    fn same_seed_gives_identical_probabilities() {
        let (X, y) = xor_like();
        let params = ForestParams {
            n_trees: 15,
            ..ForestParams::default()
        };
        let mut a = RandomForest::new(params.clone());
        let mut b = RandomForest::new(params);
        a.fit(&X, &y).unwrap();
        b.fit(&X, &y).unwrap();
        assert_eq!(a.predict_proba(&X).unwrap(), b.predict_proba(&X).unwrap());
    }

    #[test]
    fn max_depth_limits_growth() {
        let (X, y) = xor_like();
        let params = ForestParams {
            n_trees: 3,
            max_depth: Some(1),
            ..ForestParams::default()
        };
        let mut forest = RandomForest::new(params);
        forest.fit(&X, &y).unwrap();
        assert!(forest.trees().iter().all(|t| t.depth() <= 1));
    }

    #[test]
    fn probabilities_are_in_unit_interval() {
        let (X, y) = xor_like();
        let mut forest = RandomForest::new(ForestParams {
            n_trees: 10,
            ..ForestParams::default()
        });
        forest.fit(&X, &y).unwrap();
        let proba = forest.predict_proba(&X).unwrap();
        assert!(proba.iter().all(|p| (0.0..=1.0).contains(p)));
    }

    #[test]
    fn rejects_wrong_feature_count() {
        let (X, y) = xor_like();
        let mut forest = RandomForest::new(ForestParams {
            n_trees: 2,
            ..ForestParams::default()
        });
        forest.fit(&X, &y).unwrap();
        let narrow = Array2::zeros((1, 2));
        assert!(matches!(
            forest.predict_proba(&narrow),
            Err(ModelError::ShapeMismatch { expected: 3, found: 2 })
        ));
    }

    #[test]
    fn fits_wide_identifier_columns() {
        // One indicator column per row followed by a noisy signal column
        let n = 50;
        let mut X = Array2::zeros((n, n + 1));
        let mut y = Vec::with_capacity(n);
        for i in 0..n {
            X[[i, i]] = 1.0;
            X[[i, n]] = (i % 10) as f64;
            y.push(u8::from(i % 10 >= 5 || i % 7 == 0));
        }

        let mut forest = RandomForest::new(ForestParams {
            n_trees: 3,
            bootstrap: false,
            ..ForestParams::default()
        });
        forest.fit(&X, &y).unwrap();
        assert_eq!(forest.predict(&X).unwrap(), y);
    }
}
