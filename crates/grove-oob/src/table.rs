//! The error-rate table: per configuration, OOB error at each ensemble size.

use serde::Serialize;

use crate::error::TrajectoryError;
use crate::range::EstimatorRange;

/// OOB error of one configuration at one ensemble size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ErrorPoint {
    pub n_estimators: usize,
    pub oob_error: f64,
}

/// The trajectory of one configuration, in ascending ensemble size.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorSeries {
    label: String,
    points: Vec<ErrorPoint>,
}

impl ErrorSeries {
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn points(&self) -> &[ErrorPoint] {
        &self.points
    }

    /// Split into parallel `(n_estimators, oob_error)` vectors.
    #[must_use]
    pub fn unzip(&self) -> (Vec<usize>, Vec<f64>) {
        self.points
            .iter()
            .map(|p| (p.n_estimators, p.oob_error))
            .unzip()
    }

    /// The point at the largest ensemble size recorded so far.
    #[must_use]
    pub fn final_point(&self) -> Option<ErrorPoint> {
        self.points.last().copied()
    }

    /// The lowest-error point; ties go to the smaller ensemble.
    #[must_use]
    pub fn min_point(&self) -> Option<ErrorPoint> {
        self.points.iter().copied().fold(None, |best, p| match best {
            Some(b) if b.oob_error <= p.oob_error => Some(b),
            _ => Some(p),
        })
    }
}

/// Insertion-ordered map from configuration label to its [`ErrorSeries`].
///
/// Every series covers a prefix of the table's [`EstimatorRange`] with no
/// gaps, and every error lies in [0, 1]. [`ErrorRateTable::record`] refuses
/// any point that would break this.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorRateTable {
    range: EstimatorRange,
    series: Vec<ErrorSeries>,
}

impl ErrorRateTable {
    /// Create an empty table whose series will span `range`.
    #[must_use]
    pub fn new(range: EstimatorRange) -> Self {
        Self {
            range,
            series: Vec::new(),
        }
    }

    /// Start an empty series for `label`.
    ///
    /// # Errors
    ///
    /// Returns [`TrajectoryError::DuplicateLabel`] if `label` is already tracked.
    pub fn add_series(&mut self, label: impl Into<String>) -> Result<(), TrajectoryError> {
        let label = label.into();
        if self.get(&label).is_some() {
            return Err(TrajectoryError::DuplicateLabel { label });
        }
        self.series.push(ErrorSeries {
            label,
            points: Vec::with_capacity(self.range.len()),
        });
        Ok(())
    }

    /// Append `(n_estimators, oob_error)` to the series for `label`.
    ///
    /// # Errors
    ///
    /// | Variant                               | When                                          |
    /// |---------------------------------------|-----------------------------------------------|
    /// | [`TrajectoryError::UnknownLabel`]     | no series was added for `label`               |
    /// | [`TrajectoryError::ErrorOutOfRange`]  | `oob_error` is not in [0, 1]                  |
    /// | [`TrajectoryError::SeriesComplete`]   | the series already reaches the range maximum  |
    /// | [`TrajectoryError::NonContiguous`]    | `n_estimators` is not the next expected size  |
    pub fn record(
        &mut self,
        label: &str,
        n_estimators: usize,
        oob_error: f64,
    ) -> Result<(), TrajectoryError> {
        let range = self.range;
        let series = self
            .series
            .iter_mut()
            .find(|s| s.label == label)
            .ok_or_else(|| TrajectoryError::UnknownLabel {
                label: label.to_string(),
            })?;

        if !(0.0..=1.0).contains(&oob_error) {
            return Err(TrajectoryError::ErrorOutOfRange {
                label: label.to_string(),
                n_estimators,
                oob_error,
            });
        }

        let expected = series
            .points
            .last()
            .map_or(range.min(), |p| p.n_estimators + 1);
        if expected > range.max() {
            return Err(TrajectoryError::SeriesComplete {
                label: label.to_string(),
                max: range.max(),
            });
        }
        if n_estimators != expected {
            return Err(TrajectoryError::NonContiguous {
                label: label.to_string(),
                expected,
                got: n_estimators,
            });
        }

        series.points.push(ErrorPoint {
            n_estimators,
            oob_error,
        });
        Ok(())
    }

    #[must_use]
    pub fn range(&self) -> EstimatorRange {
        self.range
    }

    /// Series in insertion order.
    #[must_use]
    pub fn series(&self) -> &[ErrorSeries] {
        &self.series
    }

    /// Look up a series by label.
    #[must_use]
    pub fn get(&self, label: &str) -> Option<&ErrorSeries> {
        self.series.iter().find(|s| s.label == label)
    }

    /// Labels in insertion order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.series.iter().map(|s| s.label.as_str())
    }

    /// `true` when no point has been recorded in any series.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.series.iter().all(|s| s.points.is_empty())
    }

    /// `true` when every series covers the whole range.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.series.is_empty() && self.series.iter().all(|s| s.points.len() == self.range.len())
    }

    /// Largest recorded error across all series.
    #[must_use]
    pub fn max_error(&self) -> Option<f64> {
        self.series
            .iter()
            .flat_map(|s| &s.points)
            .map(|p| p.oob_error)
            .reduce(f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::ErrorRateTable;
    use crate::error::TrajectoryError;
    use crate::range::EstimatorRange;

    fn table() -> ErrorRateTable {
        let mut table = ErrorRateTable::new(EstimatorRange::new(3, 5).unwrap());
        table.add_series("a").unwrap();
        table.add_series("b").unwrap();
        table
    }

    #[test]
    fn records_in_order() {
        let mut table = table();
        for (n, e) in [(3, 0.4), (4, 0.3), (5, 0.35)] {
            table.record("a", n, e).unwrap();
        }
        let a = table.get("a").unwrap();
        assert_eq!(a.unzip(), (vec![3, 4, 5], vec![0.4, 0.3, 0.35]));
        assert_eq!(a.final_point().unwrap().n_estimators, 5);
        assert_eq!(a.min_point().unwrap().n_estimators, 4);
        assert!(!table.is_complete());
        assert_eq!(table.max_error(), Some(0.4));
        assert_eq!(table.labels().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn duplicate_and_unknown_labels() {
        let mut table = table();
        assert!(matches!(
            table.add_series("a"),
            Err(TrajectoryError::DuplicateLabel { .. })
        ));
        assert!(matches!(
            table.record("c", 3, 0.1),
            Err(TrajectoryError::UnknownLabel { .. })
        ));
    }

    #[test]
    fn gaps_and_overruns_are_rejected() {
        let mut table = table();
        assert!(matches!(
            table.record("a", 4, 0.1),
            Err(TrajectoryError::NonContiguous {
                expected: 3,
                got: 4,
                ..
            })
        ));
        for n in 3..=5 {
            table.record("a", n, 0.1).unwrap();
        }
        assert!(matches!(
            table.record("a", 6, 0.1),
            Err(TrajectoryError::SeriesComplete { max: 5, .. })
        ));
    }

    #[test]
    fn errors_outside_unit_interval_are_rejected() {
        let mut table = table();
        assert!(matches!(
            table.record("a", 3, 1.5),
            Err(TrajectoryError::ErrorOutOfRange { .. })
        ));
        assert!(matches!(
            table.record("a", 3, f64::NAN),
            Err(TrajectoryError::ErrorOutOfRange { .. })
        ));
        assert!(table.is_empty());
    }
}
