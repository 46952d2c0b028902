//! Warm-start training: grow an existing forest without refitting its trees.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, instrument, warn};

use crate::config::{OobMode, RandomForestConfig};
use crate::error::RfError;
use crate::forest::{bootstrap_sample, RandomForest};
use crate::oob::{OobAccumulator, OobScore};
use crate::tree::{to_columns, validate_dataset, DecisionTreeConfig};

/// Shape of a fitted ensemble.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainingMetadata {
    pub n_trees: usize,
    pub n_features: usize,
    pub n_classes: usize,
    pub n_samples: usize,
    /// `max_features` after resolving it against `n_features`.
    pub max_features_resolved: usize,
}

/// A Random Forest that keeps its trees between fits.
///
/// Tree `i` is always seeded from the `i`-th draw of a stream seeded by
/// the config seed, so growing `50 -> 51 -> ... -> n` yields exactly the
/// forest a single cold fit with `n` trees would.
///
/// ```no_run
/// # use grove_rf::{RandomForestConfig, OobMode};
/// # fn demo(features: &[Vec<f64>], labels: &[usize]) -> Result<(), grove_rf::RfError> {
/// let mut forest = RandomForestConfig::new(50)?
///     .with_oob_mode(OobMode::Enabled)
///     .warm_start();
/// forest.fit(features, labels)?;
/// for n in 51..=60 {
///     forest.set_n_trees(n)?;
///     forest.fit(features, labels)?;
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct WarmStartForest {
    config: RandomForestConfig,
    state: Option<FittedState>,
}

#[derive(Debug)]
struct FittedState {
    forest: RandomForest,
    n_samples: usize,
    max_features: usize,
    draw_count: usize,
    seed_stream: ChaCha8Rng,
    oob_indices_per_tree: Vec<Vec<usize>>,
    oob: Option<OobAccumulator>,
    oob_score: Option<OobScore>,
    features_fingerprint: u64,
}

impl WarmStartForest {
    /// Wrap a config; no trees are grown until [`WarmStartForest::fit`].
    #[must_use]
    pub fn new(config: RandomForestConfig) -> Self {
        Self { config, state: None }
    }

    /// Borrow the config, including the current target ensemble size.
    #[must_use]
    pub fn config(&self) -> &RandomForestConfig {
        &self.config
    }

    /// Set the target ensemble size for the next fit.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::InvalidTreeCount`] if `n_trees` is zero.
    pub fn set_n_trees(&mut self, n_trees: usize) -> Result<(), RfError> {
        if n_trees == 0 {
            return Err(RfError::InvalidTreeCount { n_trees });
        }
        self.config.n_trees = n_trees;
        Ok(())
    }

    /// Number of trees currently in the ensemble.
    #[must_use]
    pub fn n_trees_fitted(&self) -> usize {
        self.state.as_ref().map_or(0, |s| s.forest.trees.len())
    }

    /// Borrow the fitted forest, if any tree has been grown.
    #[must_use]
    pub fn forest(&self) -> Option<&RandomForest> {
        self.state.as_ref().map(|s| &s.forest)
    }

    /// OOB score of the ensemble as of the latest fit.
    ///
    /// `None` before the first fit or when OOB scoring is disabled.
    #[must_use]
    pub fn oob_score(&self) -> Option<&OobScore> {
        self.state.as_ref().and_then(|s| s.oob_score.as_ref())
    }

    /// Grow the ensemble up to the configured `n_trees`.
    ///
    /// The first call validates the config and fixes the sample count,
    /// feature count and class count. Later calls only train the missing
    /// trees. Asking for exactly the fitted size logs a warning and changes
    /// nothing. Returns the number of trees added.
    ///
    /// # Errors
    ///
    /// The dataset and config errors of [`RandomForestConfig::fit`], plus
    /// [`RfError::ShrinkingWarmStart`], [`RfError::WarmStartShapeMismatch`]
    /// and [`RfError::UnseenClass`]. On any error the ensemble keeps the
    /// trees it had before the call.
    #[instrument(
        skip_all,
        fields(n_trees = self.config.n_trees, fitted = self.n_trees_fitted(), n_samples = features.len())
    )]
    pub fn fit(&mut self, features: &[Vec<f64>], labels: &[usize]) -> Result<usize, RfError> {
        let (n_samples, n_features) = validate_dataset(features, labels)?;
        let fingerprint = fingerprint(features);

        let state = match self.state.take() {
            Some(state) => self.restore(state, n_samples, n_features, labels)?,
            None => self.initial_state(n_samples, n_features, labels, fingerprint)?,
        };
        let state = self.state.insert(state);

        let fitted = state.forest.trees.len();
        let target = self.config.n_trees;
        if target < fitted {
            return Err(RfError::ShrinkingWarmStart {
                requested: target,
                fitted,
            });
        }
        if target == fitted {
            warn!(
                n_trees = target,
                "warm start requested no new trees; the ensemble is unchanged"
            );
            return Ok(0);
        }

        // Trees, seeds and votes are staged; nothing is committed until the OOB score succeeds.
        let columns = to_columns(features);
        let mut seed_stream = state.seed_stream.clone();
        let mut oob = state.oob.clone();
        if let Some(oob) = oob.as_mut() {
            if state.features_fingerprint != fingerprint {
                debug!("training features changed; rebuilding OOB votes");
                *oob = OobAccumulator::new(n_samples, state.forest.n_classes);
                for (tree, oob_indices) in state.forest.trees.iter().zip(&state.oob_indices_per_tree) {
                    oob.add_tree(tree, features, oob_indices);
                }
            }
        }

        let tree_config = DecisionTreeConfig::new()
            .with_criterion(self.config.criterion)
            .with_max_depth(self.config.max_depth)
            .with_min_samples_split(self.config.min_samples_split)
            .with_min_samples_leaf(self.config.min_samples_leaf);

        let mut new_trees = Vec::with_capacity(target - fitted);
        let mut new_oob_indices = Vec::with_capacity(target - fitted);
        for _ in fitted..target {
            let mut rng = ChaCha8Rng::seed_from_u64(seed_stream.r#gen());
            let (in_bag, oob_indices) = if self.config.bootstrap {
                bootstrap_sample(n_samples, state.draw_count, &mut rng)
            } else {
                ((0..n_samples).collect(), Vec::new())
            };
            let tree = tree_config.clone().with_seed(rng.r#gen()).fit_columns(
                &columns,
                labels,
                &in_bag,
                state.forest.n_classes,
                state.max_features,
            );
            if let Some(oob) = oob.as_mut() {
                oob.add_tree(&tree, features, &oob_indices);
            }
            new_trees.push(tree);
            new_oob_indices.push(oob_indices);
        }

        let oob_score = oob.as_ref().map(|oob| oob.score(labels)).transpose()?;

        state.forest.trees.extend(new_trees);
        state.oob_indices_per_tree.extend(new_oob_indices);
        state.seed_stream = seed_stream;
        state.oob = oob;
        state.oob_score = oob_score;
        state.features_fingerprint = fingerprint;

        let added = target - fitted;
        debug!(
            added,
            n_trees = target,
            oob_error = state.oob_score.as_ref().map(OobScore::error),
            "forest grown"
        );
        Ok(added)
    }

    /// Add `additional` trees on top of the current ensemble.
    ///
    /// # Errors
    ///
    /// Same as [`WarmStartForest::fit`]; also [`RfError::InvalidTreeCount`]
    /// when the resulting size would be zero.
    pub fn grow(
        &mut self,
        additional: usize,
        features: &[Vec<f64>],
        labels: &[usize],
    ) -> Result<usize, RfError> {
        self.set_n_trees(self.n_trees_fitted() + additional)?;
        self.fit(features, labels)
    }

    /// Shape of the fitted ensemble, or `None` before the first fit.
    #[must_use]
    pub fn metadata(&self) -> Option<TrainingMetadata> {
        self.state.as_ref().map(|s| TrainingMetadata {
            n_trees: s.forest.trees.len(),
            n_features: s.forest.n_features,
            n_classes: s.forest.n_classes,
            n_samples: s.n_samples,
            max_features_resolved: s.max_features,
        })
    }

    /// Rows left out of each tree's bootstrap, in tree order.
    ///
    /// Empty per tree when bootstrap is disabled, and empty overall before
    /// the first fit.
    #[must_use]
    pub fn oob_indices_per_tree(&self) -> &[Vec<usize>] {
        self.state
            .as_ref()
            .map_or(&[][..], |s| &s.oob_indices_per_tree[..])
    }

    /// Consume the handle and keep only the fitted ensemble.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::NotFitted`] if [`WarmStartForest::fit`] never succeeded.
    pub fn into_forest(self) -> Result<RandomForest, RfError> {
        self.state.map(|s| s.forest).ok_or(RfError::NotFitted)
    }

    fn initial_state(
        &self,
        n_samples: usize,
        n_features: usize,
        labels: &[usize],
        fingerprint: u64,
    ) -> Result<FittedState, RfError> {
        let config = &self.config;
        let max_features = config.max_features.resolve(n_features)?;
        if !(config.bootstrap_fraction > 0.0 && config.bootstrap_fraction <= 1.0) {
            return Err(RfError::InvalidBootstrapFraction {
                fraction: config.bootstrap_fraction,
            });
        }
        if config.oob_mode == OobMode::Enabled && !config.bootstrap {
            return Err(RfError::OobWithoutBootstrap);
        }
        DecisionTreeConfig::new()
            .with_max_depth(config.max_depth)
            .with_min_samples_split(config.min_samples_split)
            .with_min_samples_leaf(config.min_samples_leaf)
            .validate()?;

        let n_classes = labels.iter().max().copied().unwrap_or(0) + 1;
        let draw_count = ((n_samples as f64 * config.bootstrap_fraction).round() as usize).max(1);

        debug!(
            n_samples,
            n_features,
            n_classes,
            max_features,
            draw_count,
            "warm-start forest initialised"
        );

        Ok(FittedState {
            forest: RandomForest::empty(n_features, n_classes),
            n_samples,
            max_features,
            draw_count,
            seed_stream: ChaCha8Rng::seed_from_u64(config.seed),
            oob_indices_per_tree: Vec::new(),
            oob: (config.oob_mode == OobMode::Enabled)
                .then(|| OobAccumulator::new(n_samples, n_classes)),
            oob_score: None,
            features_fingerprint: fingerprint,
        })
    }

    /// Hand back a previous state once the new data matches it.
    ///
    /// On mismatch the state is put back untouched.
    fn restore(
        &mut self,
        state: FittedState,
        n_samples: usize,
        n_features: usize,
        labels: &[usize],
    ) -> Result<FittedState, RfError> {
        let check = if n_samples != state.n_samples || n_features != state.forest.n_features {
            Err(RfError::WarmStartShapeMismatch {
                expected_samples: state.n_samples,
                expected_features: state.forest.n_features,
                got_samples: n_samples,
                got_features: n_features,
            })
        } else {
            check_labels(labels, state.forest.n_classes)
        };
        match check {
            Ok(()) => Ok(state),
            Err(err) => {
                self.state = Some(state);
                Err(err)
            }
        }
    }
}

fn check_labels(labels: &[usize], n_classes: usize) -> Result<(), RfError> {
    match labels.iter().position(|&label| label >= n_classes) {
        Some(sample_index) => Err(RfError::UnseenClass {
            label: labels[sample_index],
            sample_index,
            n_classes,
        }),
        None => Ok(()),
    }
}

fn fingerprint(features: &[Vec<f64>]) -> u64 {
    let mut hasher = DefaultHasher::new();
    for row in features {
        for value in row {
            value.to_bits().hash(&mut hasher);
        }
    }
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use crate::config::{OobMode, RandomForestConfig};
    use crate::error::RfError;

    fn blobs() -> (Vec<Vec<f64>>, Vec<usize>) {
        let mut features = Vec::new();
        let mut labels = Vec::new();
        for i in 0..40_u32 {
            let x = f64::from(i);
            features.push(vec![x, (x * 0.37).sin(), 40.0 - x]);
            labels.push(usize::from(i >= 20));
        }
        (features, labels)
    }

    #[test]
    fn unfitted_handle_has_no_result() {
        let forest = RandomForestConfig::new(3).unwrap().warm_start();
        assert_eq!(forest.n_trees_fitted(), 0);
        assert!(forest.oob_score().is_none());
        assert!(forest.metadata().is_none());
        assert!(forest.oob_indices_per_tree().is_empty());
        assert!(matches!(forest.into_forest(), Err(RfError::NotFitted)));
    }

    #[test]
    fn label_beyond_first_fit_classes_is_rejected() {
        let (features, labels) = blobs();
        let mut forest = RandomForestConfig::new(2).unwrap().warm_start();
        forest.fit(&features, &labels).unwrap();

        let mut relabelled = labels.clone();
        relabelled[5] = 2;
        forest.set_n_trees(3).unwrap();
        let err = forest.fit(&features, &relabelled).unwrap_err();
        assert!(matches!(
            err,
            RfError::UnseenClass {
                label: 2,
                sample_index: 5,
                n_classes: 2
            }
        ));
        assert_eq!(forest.n_trees_fitted(), 2);
    }

    #[test]
    fn shape_change_keeps_existing_trees() {
        let (features, labels) = blobs();
        let mut forest = RandomForestConfig::new(2).unwrap().warm_start();
        forest.fit(&features, &labels).unwrap();

        forest.set_n_trees(4).unwrap();
        let err = forest.fit(&features[..30], &labels[..30]).unwrap_err();
        assert!(matches!(err, RfError::WarmStartShapeMismatch { .. }));
        assert_eq!(forest.n_trees_fitted(), 2);
    }

    #[test]
    fn oob_without_bootstrap_is_rejected() {
        let (features, labels) = blobs();
        let mut forest = RandomForestConfig::new(2)
            .unwrap()
            .with_bootstrap(false)
            .with_oob_mode(OobMode::Enabled)
            .warm_start();
        assert!(matches!(
            forest.fit(&features, &labels),
            Err(RfError::OobWithoutBootstrap)
        ));
    }

    #[test]
    fn grow_adds_the_requested_trees() {
        let (features, labels) = blobs();
        let mut forest = RandomForestConfig::new(2)
            .unwrap()
            .with_oob_mode(OobMode::Enabled)
            .warm_start();
        forest.fit(&features, &labels).unwrap();
        assert_eq!(forest.grow(3, &features, &labels).unwrap(), 3);
        assert_eq!(forest.n_trees_fitted(), 5);
        assert_eq!(forest.config().n_trees(), 5);
        assert!(forest.oob_score().is_some());
    }

    #[test]
    fn changed_features_rebuild_oob_votes() {
        let (features, labels) = blobs();
        let mut warm = RandomForestConfig::new(3)
            .unwrap()
            .with_oob_mode(OobMode::Enabled)
            .warm_start();

        let shifted: Vec<Vec<f64>> = features
            .iter()
            .map(|row| row.iter().map(|v| v + 1000.0).collect())
            .collect();

        warm.fit(&features, &labels).unwrap();
        warm.set_n_trees(6).unwrap();
        warm.fit(&shifted, &labels).unwrap();

        // Votes from the first three trees are re-cast on the shifted rows,
        // so every OOB sample is still counted exactly once per OOB tree.
        let score = warm.oob_score().unwrap();
        assert!(score.n_oob_samples <= features.len());
        assert!(score.accuracy >= 0.0 && score.accuracy <= 1.0);
    }

    #[test]
    fn failed_oob_scoring_keeps_previous_ensemble() {
        // A single row is drawn into every bootstrap, so no tree has an OOB sample.
        let features = vec![vec![1.0, 2.0]];
        let labels = vec![0];
        let mut forest = RandomForestConfig::new(3)
            .unwrap()
            .with_oob_mode(OobMode::Enabled)
            .warm_start();

        let err = forest.fit(&features, &labels).unwrap_err();
        assert!(matches!(err, RfError::OobEvaluationFailed { .. }));
        assert_eq!(forest.n_trees_fitted(), 0);
        assert!(forest.oob_indices_per_tree().is_empty());

        // A retry re-runs the same trees instead of reporting a no-op.
        let err = forest.fit(&features, &labels).unwrap_err();
        assert!(matches!(err, RfError::OobEvaluationFailed { .. }));
        assert_eq!(forest.n_trees_fitted(), 0);
        assert!(forest.oob_score().is_none());
    }

    #[test]
    fn failed_growth_matches_untouched_growth() {
        let (features, labels) = blobs();
        let config = RandomForestConfig::new(2)
            .unwrap()
            .with_oob_mode(OobMode::Enabled);

        let mut interrupted = config.clone().warm_start();
        interrupted.fit(&features, &labels).unwrap();
        interrupted.set_n_trees(4).unwrap();
        assert!(interrupted.fit(&features[..1], &labels[..1]).is_err());
        interrupted.fit(&features, &labels).unwrap();

        let mut straight = config.warm_start();
        straight.fit(&features, &labels).unwrap();
        straight.set_n_trees(4).unwrap();
        straight.fit(&features, &labels).unwrap();

        assert_eq!(interrupted.oob_score(), straight.oob_score());
        assert_eq!(interrupted.oob_indices_per_tree(), straight.oob_indices_per_tree());
    }

    #[test]
    fn bootstrap_fraction_must_be_in_unit_interval() {
        let (features, labels) = blobs();
        for fraction in [0.0, -0.5, 1.5, f64::NAN] {
            let mut forest = RandomForestConfig::new(2)
                .unwrap()
                .with_bootstrap_fraction(fraction)
                .warm_start();
            let err = forest.fit(&features, &labels).unwrap_err();
            assert!(
                matches!(err, RfError::InvalidBootstrapFraction { .. }),
                "fraction {fraction} accepted"
            );
            assert!(forest.metadata().is_none());
        }
    }

    #[test]
    fn bootstrap_fraction_shrinks_each_draw() {
        let (features, labels) = blobs();
        let mut forest = RandomForestConfig::new(5)
            .unwrap()
            .with_bootstrap_fraction(0.25)
            .with_oob_mode(OobMode::Enabled)
            .warm_start();
        forest.fit(&features, &labels).unwrap();

        // 10 draws out of 40 rows leave at least 30 rows out of every tree.
        for oob in forest.oob_indices_per_tree() {
            assert!(oob.len() >= 30, "only {} OOB rows", oob.len());
        }
        let metadata = forest.metadata().unwrap();
        assert_eq!(metadata.n_trees, 5);
        assert_eq!(metadata.n_samples, 40);
        assert_eq!(metadata.max_features_resolved, 1);
    }
}
