/// Errors from synthetic dataset generation.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    /// Returned when zero samples are requested.
    #[error("n_samples must be at least 1")]
    ZeroSamples,

    /// Returned when zero features are requested.
    #[error("n_features must be at least 1")]
    ZeroFeatures,

    /// Returned when no informative feature is requested.
    #[error("n_informative must be at least 1")]
    ZeroInformative,

    /// Returned when informative, redundant and repeated features exceed the total.
    #[error(
        "n_informative ({n_informative}) + n_redundant ({n_redundant}) + n_repeated ({n_repeated}) must not exceed n_features ({n_features})"
    )]
    TooManyStructuredFeatures {
        /// Requested informative features.
        n_informative: usize,
        /// Requested redundant features.
        n_redundant: usize,
        /// Requested repeated features.
        n_repeated: usize,
        /// Total feature count.
        n_features: usize,
    },

    /// Returned when fewer than two classes are requested.
    #[error("n_classes must be at least 2, got {n_classes}")]
    TooFewClasses {
        /// The invalid class count.
        n_classes: usize,
    },

    /// Returned when zero clusters per class are requested.
    #[error("n_clusters_per_class must be at least 1")]
    ZeroClustersPerClass,

    /// Returned when the clusters do not fit on the informative hypercube.
    #[error(
        "n_classes * n_clusters_per_class = {n_clusters} exceeds the 2^{n_informative} hypercube vertices"
    )]
    TooManyClusters {
        /// Total number of clusters requested.
        n_clusters: usize,
        /// Number of informative dimensions.
        n_informative: usize,
    },

    /// Returned when flip_y is not in [0.0, 1.0].
    #[error("flip_y must be in [0.0, 1.0], got {flip_y}")]
    InvalidFlipY {
        /// The invalid flip_y value.
        flip_y: f64,
    },

    /// Returned when class_sep is not a positive finite number.
    #[error("class_sep must be positive and finite, got {class_sep}")]
    InvalidClassSep {
        /// The invalid class_sep value.
        class_sep: f64,
    },

    /// Returned when scale is not a positive finite number.
    #[error("scale must be positive and finite, got {scale}")]
    InvalidScale {
        /// The invalid scale value.
        scale: f64,
    },

    /// Returned when shift is NaN or infinite.
    #[error("shift must be finite, got {shift}")]
    InvalidShift {
        /// The invalid shift value.
        shift: f64,
    },
}
