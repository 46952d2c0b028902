//! Out-of-bag error trajectories for warm-started random forests.
//!
//! An [`OobTrajectory`] grows each [`EnsembleConfiguration`] one tree at a
//! time across an [`EstimatorRange`], recording `1 - OOB accuracy` at every
//! size into an [`ErrorRateTable`]. [`ErrorRatePlot`] renders the table as
//! an SVG line chart.

mod ensemble;
mod error;
mod plot;
mod range;
mod runner;
mod table;

pub use ensemble::EnsembleConfiguration;
pub use error::TrajectoryError;
pub use plot::ErrorRatePlot;
pub use range::EstimatorRange;
pub use runner::OobTrajectory;
pub use table::{ErrorPoint, ErrorRateTable, ErrorSeries};
