//! Seeded synthetic datasets for classifier experiments.
//!
//! [`ClassificationConfig`] places Gaussian clusters on the vertices of a
//! hypercube, adds redundant, repeated and noise columns, flips a fraction
//! of labels and shuffles. The same seed always yields the same [`Dataset`].

mod config;
mod dataset;
mod error;

pub use config::ClassificationConfig;
pub use dataset::Dataset;
pub use error::DatasetError;
