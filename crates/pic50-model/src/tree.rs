//! CART regression tree with the squared-error criterion.
//!
//! Nodes live in a flat arena; children are indices into it. Every node
//! examines all features, visited in a random order per node, and the first
//! feature reaching the best improvement wins ties. Thresholds are midpoints
//! between adjacent distinct values.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Adjacent values closer than this are treated as equal when splitting.
const FEATURE_THRESHOLD: f64 = 1e-7;

/// Growth limits shared by every tree in a forest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeParams {
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    Leaf {
        value: f64,
        n_samples: usize,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
        n_samples: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    nodes: Vec<Node>,
    n_features: usize,
    /// Unnormalised weighted impurity decrease per feature.
    importances: Vec<f64>,
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    proxy: f64,
}

impl RegressionTree {
    /// Grow a tree on `samples`, a list of row indices into `x`/`y` that may
    /// contain repeats (bootstrap draws).
    pub fn fit<R: Rng>(
        x: &[Vec<f64>],
        y: &[f64],
        samples: &[usize],
        params: &TreeParams,
        rng: &mut R,
    ) -> Self {
        let n_features = x.first().map_or(0, Vec::len);
        let mut tree = Self {
            nodes: Vec::new(),
            n_features,
            importances: vec![0.0; n_features],
        };
        let mut features: Vec<usize> = (0..n_features).collect();
        tree.grow(x, y, samples.to_vec(), 0, params, &mut features, rng);
        tree
    }

    #[allow(clippy::too_many_arguments)]
    fn grow<R: Rng>(
        &mut self,
        x: &[Vec<f64>],
        y: &[f64],
        mut samples: Vec<usize>,
        depth: usize,
        params: &TreeParams,
        features: &mut [usize],
        rng: &mut R,
    ) -> usize {
        let n = samples.len();
        let (sum, sum_sq) = samples
            .iter()
            .fold((0.0, 0.0), |(s, sq), &i| (s + y[i], sq + y[i] * y[i]));
        let mean = sum / n as f64;
        let impurity = (sum_sq / n as f64 - mean * mean).max(0.0);

        let id = self.nodes.len();
        self.nodes.push(Node::Leaf { value: mean, n_samples: n });

        let depth_reached = params.max_depth.is_some_and(|d| depth >= d);
        if depth_reached
            || n < params.min_samples_split
            || n < 2 * params.min_samples_leaf
            || impurity <= f64::EPSILON
        {
            return id;
        }

        features.shuffle(rng);
        let Some(best) = best_split(x, y, &mut samples, sum, features, params.min_samples_leaf)
        else {
            return id;
        };

        let (left, right): (Vec<usize>, Vec<usize>) = samples
            .iter()
            .copied()
            .partition(|&i| x[i][best.feature] <= best.threshold);

        // weighted impurity decrease: n * (impurity - child impurities)
        let parent_term = sum * sum / n as f64;
        self.importances[best.feature] += best.proxy - parent_term;

        let left_id = self.grow(x, y, left, depth + 1, params, features, rng);
        let right_id = self.grow(x, y, right, depth + 1, params, features, rng);
        self.nodes[id] = Node::Split {
            feature: best.feature,
            threshold: best.threshold,
            left: left_id,
            right: right_id,
            n_samples: n,
        };
        id
    }

    pub fn predict_row(&self, row: &[f64]) -> f64 {
        let mut id = 0;
        loop {
            match &self.nodes[id] {
                Node::Leaf { value, .. } => return *value,
                Node::Split { feature, threshold, left, right, .. } => {
                    id = if row[*feature] <= *threshold { *left } else { *right };
                }
            }
        }
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn n_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| matches!(n, Node::Leaf { .. })).count()
    }

    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], id: usize) -> usize {
            match &nodes[id] {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => 1 + walk(nodes, *left).max(walk(nodes, *right)),
            }
        }
        if self.nodes.is_empty() { 0 } else { walk(&self.nodes, 0) }
    }

    /// Impurity decrease per feature, normalised to sum to 1 (all zeros for
    /// a single-leaf tree).
    pub fn feature_importances(&self) -> Vec<f64> {
        let total: f64 = self.importances.iter().sum();
        if total > 0.0 {
            self.importances.iter().map(|v| v / total).collect()
        } else {
            vec![0.0; self.n_features]
        }
    }
}

/// Search every feature in `features` order for the split maximising
/// `sum_l^2 / n_l + sum_r^2 / n_r`, which is equivalent to minimising the
/// weighted child variance. Returns `None` when no valid split exists.
fn best_split(
    x: &[Vec<f64>],
    y: &[f64],
    samples: &mut [usize],
    total_sum: f64,
    features: &[usize],
    min_leaf: usize,
) -> Option<BestSplit> {
    let n = samples.len();
    let mut best: Option<BestSplit> = None;

    for &f in features {
        samples.sort_by(|&a, &b| x[a][f].total_cmp(&x[b][f]));
        if x[samples[n - 1]][f] <= x[samples[0]][f] + FEATURE_THRESHOLD {
            continue;
        }

        let mut left_sum = 0.0;
        for pos in 0..n - 1 {
            left_sum += y[samples[pos]];
            let n_left = pos + 1;
            let n_right = n - n_left;
            if n_left < min_leaf {
                continue;
            }
            if n_right < min_leaf {
                break;
            }
            let here = x[samples[pos]][f];
            let next = x[samples[pos + 1]][f];
            if next <= here + FEATURE_THRESHOLD {
                continue;
            }

            let right_sum = total_sum - left_sum;
            let proxy = left_sum * left_sum / n_left as f64 + right_sum * right_sum / n_right as f64;
            if best.as_ref().map_or(true, |b| proxy > b.proxy) {
                let mut threshold = here / 2.0 + next / 2.0;
                if threshold >= next || !threshold.is_finite() {
                    threshold = here;
                }
                best = Some(BestSplit { feature: f, threshold, proxy });
            }
        }
    }
    best
}
