//! Out-of-bag (OOB) evaluation, accumulated tree by tree.

use crate::error::RfError;
use crate::tree::DecisionTree;

/// Out-of-bag evaluation result.
#[derive(Debug, Clone, PartialEq)]
pub struct OobScore {
    /// OOB accuracy (fraction of correctly predicted OOB samples).
    ///
    /// Samples that no tree left out are excluded from the denominator
    /// rather than counted as class-0 predictions, so this can read higher
    /// than scikit-learn's `oob_score_` on very small ensembles.
    pub accuracy: f64,
    /// OOB confusion matrix: `confusion_matrix[true][predicted]`.
    pub confusion_matrix: Vec<Vec<usize>>,
    /// Number of samples that had at least one OOB tree.
    pub n_oob_samples: usize,
}

impl OobScore {
    /// Return the OOB error rate, `1 - accuracy`.
    #[must_use]
    pub fn error(&self) -> f64 {
        1.0 - self.accuracy
    }
}

/// Running per-sample sums of OOB class probabilities.
///
/// Adding a tree only touches the samples left out of its bootstrap, so
/// the score after `n` trees costs one pass over the new trees' OOB sets
/// plus one pass over the samples.
#[derive(Debug, Clone)]
pub(crate) struct OobAccumulator {
    proba_sums: Vec<Vec<f64>>,
    n_oob_trees: Vec<usize>,
}

impl OobAccumulator {
    pub(crate) fn new(n_samples: usize, n_classes: usize) -> Self {
        Self {
            proba_sums: vec![vec![0.0; n_classes]; n_samples],
            n_oob_trees: vec![0; n_samples],
        }
    }

    /// Add one tree's votes for the samples it did not see.
    pub(crate) fn add_tree(&mut self, tree: &DecisionTree, features: &[Vec<f64>], oob_indices: &[usize]) {
        for &si in oob_indices {
            let proba = tree.leaf_distribution(&features[si]);
            for (sum, p) in self.proba_sums[si].iter_mut().zip(proba) {
                *sum += p;
            }
            self.n_oob_trees[si] += 1;
        }
    }

    /// Score the averaged OOB predictions against `labels`.
    ///
    /// Samples with no OOB tree are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::OobEvaluationFailed`] when no sample has an OOB tree.
    pub(crate) fn score(&self, labels: &[usize]) -> Result<OobScore, RfError> {
        let n_classes = self.proba_sums.first().map_or(0, Vec::len);
        let mut confusion = vec![vec![0usize; n_classes]; n_classes];
        let mut correct = 0usize;
        let mut n_oob_samples = 0usize;

        for ((sums, &n_trees), &label) in self.proba_sums.iter().zip(&self.n_oob_trees).zip(labels) {
            if n_trees == 0 {
                continue;
            }
            n_oob_samples += 1;
            // Averaging does not change the argmax; first maximum wins.
            let predicted = sums
                .iter()
                .enumerate()
                .fold((0, f64::NEG_INFINITY), |best, (class, &s)| {
                    if s > best.1 {
                        (class, s)
                    } else {
                        best
                    }
                })
                .0;
            confusion[label][predicted] += 1;
            if predicted == label {
                correct += 1;
            }
        }

        if n_oob_samples == 0 {
            return Err(RfError::OobEvaluationFailed {
                reason: "no sample has any OOB tree".to_string(),
            });
        }

        Ok(OobScore {
            accuracy: correct as f64 / n_oob_samples as f64,
            confusion_matrix: confusion,
            n_oob_samples,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::OobAccumulator;
    use crate::tree::DecisionTreeConfig;
    use crate::RfError;

    fn stump_data() -> (Vec<Vec<f64>>, Vec<usize>) {
        let features = vec![vec![0.0], vec![1.0], vec![10.0], vec![11.0]];
        (features, vec![0, 0, 1, 1])
    }

    #[test]
    fn empty_accumulator_fails() {
        let acc = OobAccumulator::new(4, 2);
        let err = acc.score(&[0, 0, 1, 1]).unwrap_err();
        assert!(matches!(err, RfError::OobEvaluationFailed { .. }));
    }

    #[test]
    fn only_samples_with_oob_trees_are_scored() {
        let (features, labels) = stump_data();
        let tree = DecisionTreeConfig::new().fit(&features, &labels).unwrap();
        let mut acc = OobAccumulator::new(4, 2);
        acc.add_tree(&tree, &features, &[1, 2]);

        let score = acc.score(&labels).unwrap();
        assert_eq!(score.n_oob_samples, 2);
        assert!((score.accuracy - 1.0).abs() < f64::EPSILON);
        assert_eq!(score.error(), 0.0);
        assert_eq!(score.confusion_matrix, vec![vec![1, 0], vec![0, 1]]);
    }

    #[test]
    fn wrong_votes_count_as_errors() {
        let (features, labels) = stump_data();
        let tree = DecisionTreeConfig::new().fit(&features, &labels).unwrap();
        let flipped = vec![1, 1, 0, 0];
        let mut acc = OobAccumulator::new(4, 2);
        acc.add_tree(&tree, &features, &[0, 1, 2, 3]);

        let score = acc.score(&flipped).unwrap();
        assert_eq!(score.n_oob_samples, 4);
        assert!((score.error() - 1.0).abs() < f64::EPSILON);
        assert_eq!(score.confusion_matrix, vec![vec![0, 2], vec![2, 0]]);
    }
}
