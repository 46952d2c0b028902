//! Named forest configurations whose trajectories are compared.

use grove_rf::{MaxFeatures, OobMode, RandomForestConfig, RfError, WarmStartForest};

/// A labelled warm-start forest.
///
/// The forest keeps its trees across the whole sweep, so each step of a
/// trajectory only trains the trees it adds.
#[derive(Debug)]
pub struct EnsembleConfiguration {
    label: String,
    forest: WarmStartForest,
}

impl EnsembleConfiguration {
    #[must_use]
    pub fn new(label: impl Into<String>, forest: WarmStartForest) -> Self {
        Self {
            label: label.into(),
            forest,
        }
    }

    /// A bootstrapped, OOB-scored forest with the given split feature policy.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::InvalidTreeCount`] if `initial_trees` is zero.
    pub fn oob_forest(
        label: impl Into<String>,
        max_features: MaxFeatures,
        initial_trees: usize,
        seed: u64,
    ) -> Result<Self, RfError> {
        let forest = RandomForestConfig::new(initial_trees)?
            .with_max_features(max_features)
            .with_oob_mode(OobMode::Enabled)
            .with_seed(seed)
            .warm_start();
        Ok(Self::new(label, forest))
    }

    /// The three policies compared by the experiment: `sqrt`, `log2` and all features.
    ///
    /// All three share `seed`, so they see identical bootstrap samples and
    /// differ only in how many features each split may consider.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::InvalidTreeCount`] if `initial_trees` is zero.
    pub fn standard(initial_trees: usize, seed: u64) -> Result<Vec<Self>, RfError> {
        [
            ("max_features=sqrt", MaxFeatures::Sqrt),
            ("max_features=log2", MaxFeatures::Log2),
            ("max_features=all", MaxFeatures::All),
        ]
        .into_iter()
        .map(|(label, max_features)| Self::oob_forest(label, max_features, initial_trees, seed))
        .collect()
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn forest(&self) -> &WarmStartForest {
        &self.forest
    }

    pub fn forest_mut(&mut self) -> &mut WarmStartForest {
        &mut self.forest
    }
}
