//! The fitted ensemble and the per-tree sampling helpers.

use rand::Rng;

use crate::tree::DecisionTree;

/// A fitted Random Forest ensemble.
#[derive(Debug, Clone)]
pub struct RandomForest {
    pub(crate) trees: Vec<DecisionTree>,
    pub(crate) n_features: usize,
    pub(crate) n_classes: usize,
}

impl RandomForest {
    pub(crate) fn empty(n_features: usize, n_classes: usize) -> Self {
        Self {
            trees: Vec::new(),
            n_features,
            n_classes,
        }
    }

    /// Borrow the individual trees in training order.
    #[must_use]
    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }
}

/// Draw `draw_count` row indices with replacement and collect the rows never drawn.
///
/// Returns `(bootstrap_indices, oob_indices)`; OOB indices are ascending.
pub(crate) fn bootstrap_sample(
    n_samples: usize,
    draw_count: usize,
    rng: &mut impl Rng,
) -> (Vec<usize>, Vec<usize>) {
    let mut in_bag = vec![false; n_samples];
    let bootstrap_indices: Vec<usize> = (0..draw_count)
        .map(|_| {
            let idx = rng.gen_range(0..n_samples);
            in_bag[idx] = true;
            idx
        })
        .collect();
    let oob_indices = (0..n_samples).filter(|&i| !in_bag[i]).collect();
    (bootstrap_indices, oob_indices)
}
