use rand::Rng;

use crate::node::FeatureIndex;

/// Criterion for measuring the quality of a split.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitCriterion {
    /// Gini impurity: 1 - Σ(p_i²)
    Gini,
    /// Information entropy: -Σ(p_i · ln(p_i))
    Entropy,
}

impl SplitCriterion {
    /// Compute the impurity of a node from its class counts.
    ///
    /// An empty node is pure (0.0).
    #[must_use]
    pub fn impurity(&self, class_counts: &[usize], n_samples: usize) -> f64 {
        if n_samples == 0 {
            return 0.0;
        }
        let n = n_samples as f64;
        match self {
            SplitCriterion::Gini => {
                let sum_sq: f64 = class_counts
                    .iter()
                    .map(|&c| {
                        let p = c as f64 / n;
                        p * p
                    })
                    .sum();
                1.0 - sum_sq
            }
            SplitCriterion::Entropy => -class_counts
                .iter()
                .filter(|&&c| c > 0)
                .map(|&c| {
                    let p = c as f64 / n;
                    p * p.ln()
                })
                .sum::<f64>(),
        }
    }
}

/// Best split found for a node, with the samples already partitioned.
#[derive(Debug, Clone)]
pub(crate) struct SplitResult {
    pub(crate) feature: FeatureIndex,
    pub(crate) threshold: f64,
    pub(crate) left_indices: Vec<usize>,
    pub(crate) right_indices: Vec<usize>,
}

/// Inputs shared by every split search within one tree.
pub(crate) struct SplitContext<'a> {
    /// Column-major: `columns[feature_idx][sample_idx]`.
    pub(crate) columns: &'a [Vec<f64>],
    pub(crate) labels: &'a [usize],
    pub(crate) n_classes: usize,
    pub(crate) criterion: SplitCriterion,
    pub(crate) max_features: usize,
    pub(crate) min_samples_leaf: usize,
}

/// Find the best split among a random subset of features.
///
/// Features are drawn without replacement. Features that offer no valid
/// threshold over `sample_indices` (constant, or every cut leaves a side
/// below `min_samples_leaf`) do not count towards `max_features`, so the
/// search keeps drawing until `max_features` usable features have been
/// scanned or none remain. Each scanned feature is sorted and swept left-to-right with
/// incremental class counts.
///
/// `sample_indices` may contain repeats (bootstrap draws); each occurrence
/// is weighted once.
///
/// Returns `None` when no valid split exists.
pub(crate) fn find_best_split(
    ctx: &SplitContext<'_>,
    sample_indices: &[usize],
    rng: &mut impl Rng,
) -> Option<SplitResult> {
    let n_features = ctx.columns.len();
    let n_samples = sample_indices.len();
    if n_samples < 2 || n_features == 0 {
        return None;
    }

    let mut parent_counts = vec![0usize; ctx.n_classes];
    for &si in sample_indices {
        parent_counts[ctx.labels[si]] += 1;
    }
    let parent_impurity = ctx.criterion.impurity(&parent_counts, n_samples);

    let mut feature_order: Vec<usize> = (0..n_features).collect();
    let mut visited = 0usize;
    let mut best_decrease = f64::NEG_INFINITY;
    let mut best: Option<(usize, f64)> = None;
    let mut sorted: Vec<(f64, usize)> = Vec::with_capacity(n_samples);

    // Lazy Fisher-Yates: position i is fixed just before it is used.
    for i in 0..n_features {
        if visited >= ctx.max_features {
            break;
        }
        let j = rng.gen_range(i..n_features);
        feature_order.swap(i, j);
        let feat_idx = feature_order[i];
        let column = &ctx.columns[feat_idx];

        sorted.clear();
        sorted.extend(sample_indices.iter().map(|&si| (column[si], si)));
        sorted.sort_unstable_by(|a, b| a.0.total_cmp(&b.0));

        if sorted[0].0 == sorted[n_samples - 1].0 {
            continue;
        }
        let mut usable = false;

        let mut left_counts = vec![0usize; ctx.n_classes];
        let mut right_counts = parent_counts.clone();

        for k in 0..(n_samples - 1) {
            let (value, si) = sorted[k];
            let class = ctx.labels[si];
            left_counts[class] += 1;
            right_counts[class] -= 1;

            let next_value = sorted[k + 1].0;
            if value == next_value {
                continue;
            }

            let n_left = k + 1;
            let n_right = n_samples - n_left;
            if n_left < ctx.min_samples_leaf || n_right < ctx.min_samples_leaf {
                continue;
            }
            usable = true;

            let decrease = (n_samples as f64) * parent_impurity
                - (n_left as f64) * ctx.criterion.impurity(&left_counts, n_left)
                - (n_right as f64) * ctx.criterion.impurity(&right_counts, n_right);

            if decrease > best_decrease {
                best_decrease = decrease;
                let mut threshold = value / 2.0 + next_value / 2.0;
                // Midpoint can round up to the right value for adjacent floats.
                if threshold >= next_value {
                    threshold = value;
                }
                best = Some((feat_idx, threshold));
            }
        }
        if usable {
            visited += 1;
        }
    }

    let (feat_idx, threshold) = best?;
    let column = &ctx.columns[feat_idx];
    let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = sample_indices
        .iter()
        .copied()
        .partition(|&si| column[si] <= threshold);

    Some(SplitResult {
        feature: FeatureIndex::new(feat_idx),
        threshold,
        left_indices,
        right_indices,
    })
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::{find_best_split, SplitContext, SplitCriterion};

    fn context<'a>(
        columns: &'a [Vec<f64>],
        labels: &'a [usize],
        max_features: usize,
        min_samples_leaf: usize,
    ) -> SplitContext<'a> {
        SplitContext {
            columns,
            labels,
            n_classes: 2,
            criterion: SplitCriterion::Gini,
            max_features,
            min_samples_leaf,
        }
    }

    #[test]
    fn gini_binary_balanced() {
        let imp = SplitCriterion::Gini.impurity(&[5, 5], 10);
        assert!((imp - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn entropy_binary_balanced() {
        let imp = SplitCriterion::Entropy.impurity(&[5, 5], 10);
        assert!((imp - 2.0_f64.ln()).abs() < 1e-10);
    }

    #[test]
    fn pure_node_has_zero_impurity() {
        assert_eq!(SplitCriterion::Gini.impurity(&[0, 7], 7), 0.0);
        assert_eq!(SplitCriterion::Entropy.impurity(&[7, 0], 7), 0.0);
    }

    #[test]
    fn separable_data_finds_correct_split() {
        let columns = vec![vec![1.0, 2.0, 3.0, 10.0, 11.0, 12.0]];
        let labels = vec![0, 0, 0, 1, 1, 1];
        let ctx = context(&columns, &labels, 1, 1);
        let samples: Vec<usize> = (0..6).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        let split = find_best_split(&ctx, &samples, &mut rng).expect("should find a split");
        assert_eq!(split.feature.index(), 0);
        assert!(split.threshold > 3.0 && split.threshold < 10.0);
        assert_eq!(split.left_indices, vec![0, 1, 2]);
        assert_eq!(split.right_indices, vec![3, 4, 5]);
    }

    #[test]
    fn constant_features_do_not_use_up_the_budget() {
        // Only the last column is informative; with max_features = 1 the
        // search must skip past the constant columns to reach it.
        let columns = vec![
            vec![5.0; 6],
            vec![5.0; 6],
            vec![5.0; 6],
            vec![1.0, 2.0, 3.0, 10.0, 11.0, 12.0],
        ];
        let labels = vec![0, 0, 0, 1, 1, 1];
        let ctx = context(&columns, &labels, 1, 1);
        let samples: Vec<usize> = (0..6).collect();
        for seed in 0..10 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let split = find_best_split(&ctx, &samples, &mut rng).expect("split exists");
            assert_eq!(split.feature.index(), 3);
        }
    }

    #[test]
    fn duplicated_bootstrap_samples_stay_together() {
        let columns = vec![vec![1.0, 2.0, 10.0, 11.0]];
        let labels = vec![0, 0, 1, 1];
        let ctx = context(&columns, &labels, 1, 1);
        let samples = vec![0, 0, 1, 2, 3, 3];
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        let split = find_best_split(&ctx, &samples, &mut rng).unwrap();
        assert_eq!(split.left_indices, vec![0, 0, 1]);
        assert_eq!(split.right_indices, vec![2, 3, 3]);
    }

    #[test]
    fn all_constant_returns_none() {
        let columns = vec![vec![5.0, 5.0, 5.0, 5.0]];
        let labels = vec![0, 0, 1, 1];
        let ctx = context(&columns, &labels, 1, 1);
        let samples: Vec<usize> = (0..4).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        assert!(find_best_split(&ctx, &samples, &mut rng).is_none());
    }

    #[test]
    fn min_samples_leaf_enforced() {
        let columns = vec![vec![1.0, 10.0]];
        let labels = vec![0, 1];
        let ctx = context(&columns, &labels, 1, 2);
        let samples: Vec<usize> = (0..2).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        assert!(find_best_split(&ctx, &samples, &mut rng).is_none());
    }
}
