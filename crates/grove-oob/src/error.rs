use std::path::PathBuf;

use grove_rf::RfError;

/// Errors from building, running or rendering an OOB error trajectory.
#[derive(Debug, thiserror::Error)]
pub enum TrajectoryError {
    /// Returned when the estimator range is empty or starts at zero.
    #[error("estimator range must satisfy 1 <= min ({min}) <= max ({max})")]
    InvalidRange {
        /// Lower bound (inclusive).
        min: usize,
        /// Upper bound (inclusive).
        max: usize,
    },

    /// Returned when a configuration does not compute out-of-bag scores.
    #[error("configuration '{label}' does not have OOB scoring enabled")]
    OobDisabled {
        /// The offending configuration label.
        label: String,
    },

    /// Returned when two configurations share a label.
    #[error("configuration label '{label}' is used more than once")]
    DuplicateLabel {
        /// The repeated label.
        label: String,
    },

    /// Returned when recording a point for a label the table does not track.
    #[error("no error series for label '{label}'")]
    UnknownLabel {
        /// The unknown label.
        label: String,
    },

    /// Returned when a recorded estimator count does not continue the series.
    #[error("series '{label}' expects n_estimators={expected} next, got {got}")]
    NonContiguous {
        /// The series label.
        label: String,
        /// The only count the series accepts next.
        expected: usize,
        /// The count that was recorded.
        got: usize,
    },

    /// Returned when a recorded count falls beyond the range maximum.
    #[error("series '{label}' is already complete at n_estimators={max}")]
    SeriesComplete {
        /// The series label.
        label: String,
        /// The range maximum.
        max: usize,
    },

    /// Returned when an error rate is outside [0, 1].
    #[error("OOB error {oob_error} for '{label}' at n_estimators={n_estimators} is outside [0, 1]")]
    ErrorOutOfRange {
        /// The series label.
        label: String,
        /// The estimator count being recorded.
        n_estimators: usize,
        /// The rejected error value.
        oob_error: f64,
    },

    /// Returned when rendering a table with no recorded points.
    #[error("error-rate table has no points to plot")]
    EmptyTable,

    /// Returned when the plotting backend fails.
    #[error("failed to render plot to {path}: {reason}")]
    Plot {
        /// The target file.
        path: PathBuf,
        /// Backend error message.
        reason: String,
    },

    /// A forest fit failed.
    #[error(transparent)]
    Forest(#[from] RfError),
}
