use std::ops::RangeInclusive;

use serde::Serialize;

use crate::error::TrajectoryError;

/// An inclusive `[min, max]` range of ensemble sizes, `1 <= min <= max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EstimatorRange {
    min: usize,
    max: usize,
}

impl EstimatorRange {
    /// Create a validated range.
    ///
    /// # Errors
    ///
    /// Returns [`TrajectoryError::InvalidRange`] if `min == 0` or `min > max`.
    pub fn new(min: usize, max: usize) -> Result<Self, TrajectoryError> {
        if min == 0 || min > max {
            return Err(TrajectoryError::InvalidRange { min, max });
        }
        Ok(Self { min, max })
    }

    #[must_use]
    pub fn min(&self) -> usize {
        self.min
    }

    #[must_use]
    pub fn max(&self) -> usize {
        self.max
    }

    /// Number of ensemble sizes in the range.
    #[must_use]
    pub fn len(&self) -> usize {
        self.max - self.min + 1
    }

    /// Always `false`; a validated range holds at least one size.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Iterate the sizes in ascending order.
    pub fn iter(&self) -> RangeInclusive<usize> {
        self.min..=self.max
    }
}
