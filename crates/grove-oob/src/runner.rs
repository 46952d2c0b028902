//! Sweeps each configuration across the estimator range and records its OOB error.

use grove_datasets::Dataset;
use grove_rf::OobMode;
use tracing::{debug, info, instrument};

use crate::ensemble::EnsembleConfiguration;
use crate::error::TrajectoryError;
use crate::range::EstimatorRange;
use crate::table::ErrorRateTable;

/// Out-of-bag error as a function of ensemble size.
///
/// For every configuration in turn and every size `n` in the range
/// (ascending), the forest is grown to `n` trees and `1 - OOB accuracy`
/// is recorded. Trees are never retrained, so one sweep trains exactly
/// `max` trees per configuration.
#[derive(Debug, Clone, Copy)]
pub struct OobTrajectory {
    range: EstimatorRange,
}

impl OobTrajectory {
    /// Create a trajectory over the inclusive range `[min, max]`.
    ///
    /// # Errors
    ///
    /// Returns [`TrajectoryError::InvalidRange`] if `min == 0` or `min > max`.
    pub fn new(min: usize, max: usize) -> Result<Self, TrajectoryError> {
        Ok(Self {
            range: EstimatorRange::new(min, max)?,
        })
    }

    #[must_use]
    pub fn range(&self) -> EstimatorRange {
        self.range
    }

    /// Run the sweep and return the populated table.
    ///
    /// Configurations are visited in slice order and keep their grown
    /// forests afterwards.
    ///
    /// # Errors
    ///
    /// | Variant                            | When                                            |
    /// |------------------------------------|-------------------------------------------------|
    /// | [`TrajectoryError::DuplicateLabel`] | two configurations share a label               |
    /// | [`TrajectoryError::OobDisabled`]   | a configuration does not compute OOB scores     |
    /// | [`TrajectoryError::Forest`]        | any fit fails; the sweep stops at that point    |
    #[instrument(
        skip_all,
        fields(
            min = self.range.min(),
            max = self.range.max(),
            n_configs = configs.len(),
            n_samples = dataset.n_samples()
        )
    )]
    pub fn run(
        &self,
        dataset: &Dataset,
        configs: &mut [EnsembleConfiguration],
    ) -> Result<ErrorRateTable, TrajectoryError> {
        let mut table = ErrorRateTable::new(self.range);
        for config in configs.iter() {
            if config.forest().config().oob_mode() != OobMode::Enabled {
                return Err(TrajectoryError::OobDisabled {
                    label: config.label().to_string(),
                });
            }
            table.add_series(config.label())?;
        }

        for config in configs.iter_mut() {
            info!(label = config.label(), "sweeping configuration");
            let label = config.label().to_string();
            let forest = config.forest_mut();

            for n in self.range.iter() {
                forest.set_n_trees(n)?;
                let added = forest.fit(dataset.features(), dataset.labels())?;
                let oob_error = forest
                    .oob_score()
                    .ok_or_else(|| TrajectoryError::OobDisabled {
                        label: label.clone(),
                    })?
                    .error();
                debug!(label = %label, n, added, oob_error, "step complete");
                table.record(&label, n, oob_error)?;
            }

            let series = table.get(&label);
            info!(
                label = %label,
                final_error = series.and_then(|s| s.final_point()).map(|p| p.oob_error),
                min_error = series.and_then(|s| s.min_point()).map(|p| p.oob_error),
                "configuration complete"
            );
        }

        info!(
            min = self.range.min(),
            max = self.range.max(),
            "trajectory complete"
        );
        Ok(table)
    }
}
