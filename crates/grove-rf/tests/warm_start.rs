//! Warm-start and out-of-bag regression tests for grove-rf.
//!
//! A forest grown one tree at a time must be indistinguishable from a
//! forest fitted cold at the final size, and its OOB score must track the
//! cold score at every step.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use grove_rf::{MaxFeatures, OobMode, RandomForestConfig, RfError};

// ---------------------------------------------------------------------------
// Helper: deterministic synthetic classification dataset
// ---------------------------------------------------------------------------

/// Generate a 200-sample, 8-feature, 2-class dataset.
///
/// Features 0-1 are informative (class * 2.0 + noise in [0, 1.5]).
/// Features 2-7 are pure noise in [0, 1.5].
fn make_classification() -> (Vec<Vec<f64>>, Vec<usize>) {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let n_samples = 200;
    let n_features = 8;

    let mut features = Vec::with_capacity(n_samples);
    let mut labels = Vec::with_capacity(n_samples);
    for i in 0..n_samples {
        let class = i % 2;
        labels.push(class);
        let row: Vec<f64> = (0..n_features)
            .map(|f| {
                let base = if f < 2 { class as f64 * 2.0 } else { 0.0 };
                base + rng.r#gen::<f64>() * 1.5
            })
            .collect();
        features.push(row);
    }
    (features, labels)
}

fn oob_config(n_trees: usize, max_features: MaxFeatures) -> RandomForestConfig {
    RandomForestConfig::new(n_trees)
        .unwrap()
        .with_seed(7)
        .with_max_features(max_features)
        .with_oob_mode(OobMode::Enabled)
}

// ---------------------------------------------------------------------------
// a) warm growth matches a cold fit
// ---------------------------------------------------------------------------

#[test]
fn warm_growth_matches_cold_fit() {
    let (features, labels) = make_classification();

    let mut warm = oob_config(5, MaxFeatures::Sqrt).warm_start();
    warm.fit(&features, &labels).unwrap();
    for n in 6..=20 {
        warm.set_n_trees(n).unwrap();
        assert_eq!(warm.fit(&features, &labels).unwrap(), 1);

        let cold = oob_config(n, MaxFeatures::Sqrt).fit(&features, &labels).unwrap();
        assert_eq!(
            warm.oob_score(),
            cold.oob_score(),
            "OOB score diverged at n_trees={n}"
        );
    }

    let cold = oob_config(20, MaxFeatures::Sqrt).fit(&features, &labels).unwrap();
    assert_eq!(warm.oob_indices_per_tree(), cold.oob_indices_per_tree());
    assert_eq!(warm.metadata(), cold.metadata());

    let warm_forest = warm.into_forest().unwrap();
    let cold_forest = cold.into_forest().unwrap();
    assert_eq!(warm_forest.trees().len(), 20);
    for (w, c) in warm_forest.trees().iter().zip(cold_forest.trees()) {
        assert_eq!(w.n_nodes(), c.n_nodes());
        assert_eq!(w.depth(), c.depth());
    }

    let warm_proba = warm_forest.predict_proba_batch(&features).unwrap();
    let cold_proba = cold_forest.predict_proba_batch(&features).unwrap();
    for (w, c) in warm_proba.iter().zip(&cold_proba) {
        assert_eq!(w.as_slice(), c.as_slice());
    }
}

// ---------------------------------------------------------------------------
// b) warm-start target checks
// ---------------------------------------------------------------------------

#[test]
fn shrinking_target_is_rejected() {
    let (features, labels) = make_classification();
    let mut warm = oob_config(10, MaxFeatures::Sqrt).warm_start();
    warm.fit(&features, &labels).unwrap();

    warm.set_n_trees(9).unwrap();
    let err = warm.fit(&features, &labels).unwrap_err();
    assert!(matches!(
        err,
        RfError::ShrinkingWarmStart {
            requested: 9,
            fitted: 10
        }
    ));
    assert_eq!(warm.n_trees_fitted(), 10);
}

#[test]
fn equal_target_is_a_no_op() {
    let (features, labels) = make_classification();
    let mut warm = oob_config(10, MaxFeatures::Sqrt).warm_start();
    warm.fit(&features, &labels).unwrap();
    let before = warm.oob_score().cloned();

    assert_eq!(warm.fit(&features, &labels).unwrap(), 0);
    assert_eq!(warm.n_trees_fitted(), 10);
    assert_eq!(warm.oob_score().cloned(), before);
}

#[test]
fn zero_target_is_rejected() {
    let mut warm = oob_config(1, MaxFeatures::Sqrt).warm_start();
    assert!(matches!(
        warm.set_n_trees(0),
        Err(RfError::InvalidTreeCount { n_trees: 0 })
    ));
}

// ---------------------------------------------------------------------------
// c) OOB behaviour
// ---------------------------------------------------------------------------

/// OOB accuracy with 60 trees must exceed 0.80 on the easy dataset.
#[test]
fn oob_accuracy_above_threshold() {
    let (features, labels) = make_classification();
    let result = oob_config(60, MaxFeatures::Sqrt).fit(&features, &labels).unwrap();

    let oob = result.oob_score().expect("OOB score must be computed when OobMode::Enabled");
    assert!(oob.accuracy > 0.80, "oob_accuracy {} <= 0.80", oob.accuracy);
    assert_eq!(oob.n_oob_samples, features.len());
    let total: usize = oob.confusion_matrix.iter().flatten().sum();
    assert_eq!(total, oob.n_oob_samples);
}

#[test]
fn oob_disabled_leaves_score_empty() {
    let (features, labels) = make_classification();
    let result = RandomForestConfig::new(10)
        .unwrap()
        .fit(&features, &labels)
        .unwrap();
    assert!(result.oob_score().is_none());
}

#[test]
fn max_features_strategies_diverge() {
    let (features, labels) = make_classification();
    let sqrt = oob_config(30, MaxFeatures::Sqrt).fit(&features, &labels).unwrap();
    let all = oob_config(30, MaxFeatures::All).fit(&features, &labels).unwrap();

    assert_eq!(sqrt.metadata().unwrap().max_features_resolved, 2);
    assert_eq!(all.metadata().unwrap().max_features_resolved, 8);
    // Same seed means same bootstraps; only the split candidates differ.
    assert_eq!(sqrt.oob_indices_per_tree(), all.oob_indices_per_tree());

    let sqrt_proba = sqrt.forest().unwrap().predict_proba_batch(&features).unwrap();
    let all_proba = all.forest().unwrap().predict_proba_batch(&features).unwrap();
    assert!(sqrt_proba
        .iter()
        .zip(&all_proba)
        .any(|(a, b)| a.as_slice() != b.as_slice()));
}

// ---------------------------------------------------------------------------
// d) determinism and prediction
// ---------------------------------------------------------------------------

/// Same config and seed must produce identical predictions across two independent runs.
#[test]
fn deterministic_predictions() {
    let (features, labels) = make_classification();
    let rf_config = RandomForestConfig::new(40).unwrap().with_seed(42);

    let forest1 = rf_config.fit(&features, &labels).unwrap().into_forest().unwrap();
    let forest2 = rf_config.fit(&features, &labels).unwrap().into_forest().unwrap();
    let preds1 = forest1.predict_batch(&features).unwrap();
    let preds2 = forest2.predict_batch(&features).unwrap();

    assert_eq!(preds1, preds2, "predictions differ across runs with the same seed");
}

/// Training accuracy with 40 trees must exceed 0.95.
#[test]
fn prediction_accuracy_on_training_data() {
    let (features, labels) = make_classification();
    let result = RandomForestConfig::new(40)
        .unwrap()
        .with_seed(42)
        .fit(&features, &labels)
        .unwrap();

    let predictions = result.forest().unwrap().predict_batch(&features).unwrap();
    let correct = predictions
        .iter()
        .zip(&labels)
        .filter(|&(&p, &l)| p == l)
        .count();
    let accuracy = correct as f64 / labels.len() as f64;

    assert!(accuracy > 0.95, "training accuracy {accuracy} <= 0.95");
}

#[test]
fn prediction_rejects_wrong_width() {
    let (features, labels) = make_classification();
    let result = RandomForestConfig::new(5).unwrap().fit(&features, &labels).unwrap();
    assert!(matches!(
        result.forest().unwrap().predict(&[0.0; 3]),
        Err(RfError::PredictionFeatureMismatch { expected: 8, got: 3 })
    ));
}
