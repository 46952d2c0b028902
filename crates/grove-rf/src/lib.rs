//! Random Forest classification with warm start and out-of-bag scoring.
//!
//! CART decision trees with Gini/Entropy criteria, bootstrap sampling and
//! per-split feature subsampling. A [`WarmStartForest`] keeps its trees
//! between fits and updates its out-of-bag score incrementally, so sweeping
//! the ensemble size costs one tree per step.

mod config;
mod error;
mod forest;
mod node;
mod oob;
mod predict;
mod split;
mod tree;
mod warm;

pub use config::{MaxFeatures, OobMode, RandomForestConfig};
pub use error::RfError;
pub use forest::RandomForest;
pub use node::{FeatureIndex, Node, NodeIndex};
pub use oob::OobScore;
pub use predict::ClassDistribution;
pub use split::SplitCriterion;
pub use tree::{DecisionTree, DecisionTreeConfig};
pub use warm::{TrainingMetadata, WarmStartForest};
