//! Configuration builder and generator for classification datasets.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::StandardNormal;
use tracing::{debug, info, instrument};

use crate::dataset::Dataset;
use crate::error::DatasetError;

/// Configuration for a synthetic classification problem.
///
/// Construct via [`ClassificationConfig::new`], then chain `with_*` methods.
///
/// # Defaults
///
/// | Parameter              | Default |
/// |------------------------|---------|
/// | `n_informative`        | 2       |
/// | `n_redundant`          | 2       |
/// | `n_repeated`           | 0       |
/// | `n_classes`            | 2       |
/// | `n_clusters_per_class` | 2       |
/// | `flip_y`               | 0.01    |
/// | `class_sep`            | 1.0     |
/// | `hypercube`            | `true`  |
/// | `shift`                | 0.0     |
/// | `scale`                | 1.0     |
/// | `shuffle`              | `true`  |
/// | `seed`                 | 42      |
#[derive(Debug, Clone)]
pub struct ClassificationConfig {
    n_samples: usize,
    n_features: usize,
    n_informative: usize,
    n_redundant: usize,
    n_repeated: usize,
    n_classes: usize,
    n_clusters_per_class: usize,
    flip_y: f64,
    class_sep: f64,
    hypercube: bool,
    shift: f64,
    scale: f64,
    shuffle: bool,
    seed: u64,
}

impl ClassificationConfig {
    /// Create a config for `n_samples` rows of `n_features` columns.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::ZeroSamples`] or [`DatasetError::ZeroFeatures`].
    pub fn new(n_samples: usize, n_features: usize) -> Result<Self, DatasetError> {
        if n_samples == 0 {
            return Err(DatasetError::ZeroSamples);
        }
        if n_features == 0 {
            return Err(DatasetError::ZeroFeatures);
        }
        Ok(Self {
            n_samples,
            n_features,
            n_informative: 2,
            n_redundant: 2,
            n_repeated: 0,
            n_classes: 2,
            n_clusters_per_class: 2,
            flip_y: 0.01,
            class_sep: 1.0,
            hypercube: true,
            shift: 0.0,
            scale: 1.0,
            shuffle: true,
            seed: 42,
        })
    }

    #[must_use]
    pub fn with_n_informative(mut self, n_informative: usize) -> Self {
        self.n_informative = n_informative;
        self
    }

    /// Columns built as random linear combinations of the informative ones.
    #[must_use]
    pub fn with_n_redundant(mut self, n_redundant: usize) -> Self {
        self.n_redundant = n_redundant;
        self
    }

    /// Columns copied from randomly chosen informative or redundant ones.
    #[must_use]
    pub fn with_n_repeated(mut self, n_repeated: usize) -> Self {
        self.n_repeated = n_repeated;
        self
    }

    #[must_use]
    pub fn with_n_classes(mut self, n_classes: usize) -> Self {
        self.n_classes = n_classes;
        self
    }

    #[must_use]
    pub fn with_n_clusters_per_class(mut self, n_clusters_per_class: usize) -> Self {
        self.n_clusters_per_class = n_clusters_per_class;
        self
    }

    /// Fraction of labels replaced by a uniformly random class.
    #[must_use]
    pub fn with_flip_y(mut self, flip_y: f64) -> Self {
        self.flip_y = flip_y;
        self
    }

    /// Half the hypercube side; larger values spread clusters apart.
    #[must_use]
    pub fn with_class_sep(mut self, class_sep: f64) -> Self {
        self.class_sep = class_sep;
        self
    }

    /// When `false`, centroids are pulled toward the origin per dimension.
    #[must_use]
    pub fn with_hypercube(mut self, hypercube: bool) -> Self {
        self.hypercube = hypercube;
        self
    }

    #[must_use]
    pub fn with_shift(mut self, shift: f64) -> Self {
        self.shift = shift;
        self
    }

    #[must_use]
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// Shuffle rows, then permute columns, after generation.
    #[must_use]
    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    #[must_use]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    #[must_use]
    pub fn n_informative(&self) -> usize {
        self.n_informative
    }

    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    fn validate(&self) -> Result<(), DatasetError> {
        if self.n_informative == 0 {
            return Err(DatasetError::ZeroInformative);
        }
        if self.n_informative + self.n_redundant + self.n_repeated > self.n_features {
            return Err(DatasetError::TooManyStructuredFeatures {
                n_informative: self.n_informative,
                n_redundant: self.n_redundant,
                n_repeated: self.n_repeated,
                n_features: self.n_features,
            });
        }
        if self.n_classes < 2 {
            return Err(DatasetError::TooFewClasses {
                n_classes: self.n_classes,
            });
        }
        if self.n_clusters_per_class == 0 {
            return Err(DatasetError::ZeroClustersPerClass);
        }
        let n_clusters = self.n_classes.saturating_mul(self.n_clusters_per_class);
        let fits = u32::try_from(self.n_informative)
            .ok()
            .and_then(|bits| 1usize.checked_shl(bits))
            .map_or(true, |n_vertices| n_clusters <= n_vertices);
        if !fits {
            return Err(DatasetError::TooManyClusters {
                n_clusters,
                n_informative: self.n_informative,
            });
        }
        if !(0.0..=1.0).contains(&self.flip_y) {
            return Err(DatasetError::InvalidFlipY {
                flip_y: self.flip_y,
            });
        }
        if !(self.class_sep.is_finite() && self.class_sep > 0.0) {
            return Err(DatasetError::InvalidClassSep {
                class_sep: self.class_sep,
            });
        }
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(DatasetError::InvalidScale { scale: self.scale });
        }
        if !self.shift.is_finite() {
            return Err(DatasetError::InvalidShift { shift: self.shift });
        }
        Ok(())
    }

    /// Generate the dataset.
    ///
    /// # Errors
    ///
    /// | Variant                                     | When                                                   |
    /// |---------------------------------------------|--------------------------------------------------------|
    /// | [`DatasetError::ZeroInformative`]           | `n_informative == 0`                                   |
    /// | [`DatasetError::TooManyStructuredFeatures`] | informative + redundant + repeated > `n_features`      |
    /// | [`DatasetError::TooFewClasses`]             | `n_classes < 2`                                        |
    /// | [`DatasetError::ZeroClustersPerClass`]      | `n_clusters_per_class == 0`                            |
    /// | [`DatasetError::TooManyClusters`]           | more clusters than hypercube vertices                  |
    /// | [`DatasetError::InvalidFlipY`]              | `flip_y` outside [0, 1]                                |
    /// | [`DatasetError::InvalidClassSep`]           | `class_sep` not positive and finite                    |
    /// | [`DatasetError::InvalidScale`]              | `scale` not positive and finite                        |
    /// | [`DatasetError::InvalidShift`]              | `shift` not finite                                     |
    #[instrument(
        skip(self),
        fields(
            n_samples = self.n_samples,
            n_features = self.n_features,
            n_informative = self.n_informative,
            seed = self.seed
        )
    )]
    pub fn generate(&self) -> Result<Dataset, DatasetError> {
        self.validate()?;

        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let n_informative = self.n_informative;
        let n_structured = n_informative + self.n_redundant;
        let n_clusters = self.n_classes * self.n_clusters_per_class;

        let mut samples_per_cluster = vec![self.n_samples / n_clusters; n_clusters];
        for count in samples_per_cluster.iter_mut().take(self.n_samples % n_clusters) {
            *count += 1;
        }

        let centroids = self.centroids(n_clusters, &mut rng);

        let mut features = vec![vec![0.0f64; self.n_features]; self.n_samples];
        let mut labels = vec![0usize; self.n_samples];

        // Informative block: standard normal, mixed by a per-cluster covariance, then centred.
        let mut start = 0;
        for (cluster, (&size, centroid)) in samples_per_cluster.iter().zip(&centroids).enumerate() {
            let covariance = uniform_matrix(n_informative, n_informative, &mut rng);
            for row in start..start + size {
                labels[row] = cluster % self.n_classes;
                let noise: Vec<f64> = (0..n_informative)
                    .map(|_| rng.sample(StandardNormal))
                    .collect();
                for (j, value) in features[row][..n_informative].iter_mut().enumerate() {
                    let mixed: f64 = noise
                        .iter()
                        .zip(&covariance)
                        .map(|(&z, cov_row)| z * cov_row[j])
                        .sum();
                    *value = mixed + centroid[j];
                }
            }
            start += size;
        }

        if self.n_redundant > 0 {
            let mixing = uniform_matrix(n_informative, self.n_redundant, &mut rng);
            for row in &mut features {
                for k in 0..self.n_redundant {
                    let combined: f64 = (0..n_informative).map(|j| row[j] * mixing[j][k]).sum();
                    row[n_informative + k] = combined;
                }
            }
        }

        if self.n_repeated > 0 {
            let sources: Vec<usize> = (0..self.n_repeated)
                .map(|_| rng.gen_range(0..n_structured))
                .collect();
            for row in &mut features {
                for (k, &source) in sources.iter().enumerate() {
                    row[n_structured + k] = row[source];
                }
            }
        }

        let n_useful = n_structured + self.n_repeated;
        for row in &mut features {
            for value in &mut row[n_useful..] {
                *value = rng.sample(StandardNormal);
            }
        }

        let mut n_flipped = 0usize;
        if self.flip_y > 0.0 {
            for label in &mut labels {
                if rng.r#gen::<f64>() < self.flip_y {
                    *label = rng.gen_range(0..self.n_classes);
                    n_flipped += 1;
                }
            }
        }

        for row in &mut features {
            for value in row.iter_mut() {
                *value = (*value + self.shift) * self.scale;
            }
        }

        if self.shuffle {
            let mut order: Vec<usize> = (0..self.n_samples).collect();
            order.shuffle(&mut rng);
            let mut columns: Vec<usize> = (0..self.n_features).collect();
            columns.shuffle(&mut rng);

            let rows: Vec<Vec<f64>> = order
                .iter()
                .map(|&r| columns.iter().map(|&c| features[r][c]).collect())
                .collect();
            labels = order.iter().map(|&r| labels[r]).collect();
            features = rows;
        }

        debug!(n_clusters, n_flipped, "classification dataset generated");
        let dataset = Dataset::new(features, labels, self.n_classes);
        info!(class_counts = ?dataset.class_counts(), "dataset ready");
        Ok(dataset)
    }

    /// Distinct hypercube vertices with coordinates `±class_sep`.
    fn centroids(&self, n_clusters: usize, rng: &mut ChaCha8Rng) -> Vec<Vec<f64>> {
        let mut seen: HashSet<Vec<bool>> = HashSet::with_capacity(n_clusters);
        let mut vertices = Vec::with_capacity(n_clusters);
        while vertices.len() < n_clusters {
            let vertex: Vec<bool> = (0..self.n_informative).map(|_| rng.r#gen()).collect();
            if seen.insert(vertex.clone()) {
                vertices.push(vertex);
            }
        }

        let mut centroids: Vec<Vec<f64>> = vertices
            .iter()
            .map(|vertex| {
                vertex
                    .iter()
                    .map(|&bit| if bit { self.class_sep } else { -self.class_sep })
                    .collect()
            })
            .collect();

        if !self.hypercube {
            let dims: Vec<f64> = (0..self.n_informative).map(|_| rng.r#gen()).collect();
            for centroid in &mut centroids {
                for (c, d) in centroid.iter_mut().zip(&dims) {
                    *c *= d;
                }
            }
        }
        centroids
    }
}

/// A `rows x cols` matrix with entries uniform in [-1, 1).
fn uniform_matrix(rows: usize, cols: usize, rng: &mut impl Rng) -> Vec<Vec<f64>> {
    (0..rows)
        .map(|_| (0..cols).map(|_| rng.gen_range(-1.0..1.0)).collect())
        .collect()
}
