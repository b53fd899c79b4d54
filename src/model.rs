//! K-Means clustering model and training diagnostics

use crate::data::RhythmData;
use linfa::prelude::*;
use linfa_clustering::KMeans;
use linfa_nn::distance::L2Dist;
use ndarray::{Array1, Array2, ArrayView1};
use rand::rngs::SmallRng;
use rand::SeedableRng;

/// Fixed cluster count: one cluster per rhythm state.
pub const N_CLUSTERS: usize = 5;

/// Fixed seed so centroid initialization is reproducible across runs.
pub const RANDOM_SEED: u64 = 42;

/// Fitted K-Means model over standardized rhythm features.
#[derive(Debug)]
pub struct KMeansModel {
    /// Cluster centroids in standardized feature space (N_CLUSTERS, 3)
    pub centroids: Array2<f64>,
    /// Cluster assignments for the training rows
    pub labels: Array1<usize>,
    /// Within-cluster sum of squares
    pub inertia: f64,
}

/// Per-cluster diagnostic row: raw feature means rounded to 2 decimal places.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterSummaryRow {
    pub cluster: usize,
    pub size: usize,
    pub feature_means: [f64; 3],
}

impl KMeansModel {
    /// Nearest-centroid assignment for a standardized feature row.
    pub fn predict(&self, features: &ArrayView1<f64>) -> crate::Result<usize> {
        if features.len() != self.centroids.ncols() {
            anyhow::bail!(
                "feature vector must have exactly {} dimensions",
                self.centroids.ncols()
            );
        }
        nearest_centroid(&self.centroids, features)
            .ok_or_else(|| anyhow::anyhow!("model has no centroids"))
    }

    /// Number of training rows assigned to each cluster.
    pub fn cluster_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; N_CLUSTERS];
        for &label in self.labels.iter() {
            if label < N_CLUSTERS {
                sizes[label] += 1;
            }
        }
        sizes
    }

    /// Per-cluster mean of each raw feature, rounded to 2 decimal places.
    ///
    /// This is the table a human inspects to author the cluster-to-state
    /// mapping after a retraining run.
    pub fn cluster_summary(&self, raw_features: &Array2<f64>) -> Vec<ClusterSummaryRow> {
        let n_features = raw_features.ncols();
        let mut sums = vec![vec![0.0; n_features]; N_CLUSTERS];
        let mut counts = vec![0usize; N_CLUSTERS];

        for (i, &cluster) in self.labels.iter().enumerate() {
            if cluster < N_CLUSTERS {
                counts[cluster] += 1;
                for j in 0..n_features {
                    sums[cluster][j] += raw_features[[i, j]];
                }
            }
        }

        (0..N_CLUSTERS)
            .map(|cluster| {
                let mut feature_means = [0.0; 3];
                if counts[cluster] > 0 {
                    for j in 0..n_features.min(3) {
                        let mean = sums[cluster][j] / counts[cluster] as f64;
                        feature_means[j] = (mean * 100.0).round() / 100.0;
                    }
                }
                ClusterSummaryRow {
                    cluster,
                    size: counts[cluster],
                    feature_means,
                }
            })
            .collect()
    }

    /// Mean silhouette coefficient over a sample of training rows.
    pub fn compute_silhouette_sample(&self, features: &Array2<f64>, sample_size: usize) -> f64 {
        let n_samples = features.nrows().min(sample_size);
        if n_samples < 2 {
            return 0.0;
        }

        let mut silhouette_sum = 0.0;
        for i in 0..n_samples {
            let point = features.row(i);
            let own_cluster = self.labels[i];

            let mut own_distances = Vec::new();
            let mut other_distances: Vec<Vec<f64>> = vec![Vec::new(); N_CLUSTERS];

            for j in 0..n_samples {
                if i == j {
                    continue;
                }
                let distance = euclidean_distance(&point, &features.row(j));
                let other_cluster = self.labels[j];
                if other_cluster == own_cluster {
                    own_distances.push(distance);
                } else if other_cluster < N_CLUSTERS {
                    other_distances[other_cluster].push(distance);
                }
            }

            let a_i = if own_distances.is_empty() {
                0.0
            } else {
                own_distances.iter().sum::<f64>() / own_distances.len() as f64
            };
            let b_i = other_distances
                .iter()
                .filter(|d| !d.is_empty())
                .map(|d| d.iter().sum::<f64>() / d.len() as f64)
                .fold(f64::INFINITY, f64::min);

            let s_i = if b_i.is_infinite() || (a_i == 0.0 && b_i == 0.0) {
                0.0
            } else {
                (b_i - a_i) / a_i.max(b_i)
            };
            silhouette_sum += s_i;
        }

        silhouette_sum / n_samples as f64
    }
}

/// Fit K-Means with the fixed cluster count and seed on prepared rhythm data.
///
/// # Arguments
/// * `data` - Prepared data with standardized features
/// * `max_iters` - Maximum iterations for convergence
/// * `tolerance` - Convergence tolerance
pub fn fit_kmeans(data: &RhythmData, max_iters: usize, tolerance: f64) -> crate::Result<KMeansModel> {
    let n_samples = data.features.nrows();
    if n_samples < N_CLUSTERS {
        anyhow::bail!(
            "dataset has {} rows; at least {} are required to fit {} clusters",
            n_samples,
            N_CLUSTERS,
            N_CLUSTERS
        );
    }

    // Dummy targets for the unsupervised fit
    let targets: Array1<usize> = Array1::zeros(n_samples);
    let dataset = Dataset::new(data.features.clone(), targets);

    let rng = SmallRng::seed_from_u64(RANDOM_SEED);
    let model = KMeans::params_with(N_CLUSTERS, rng, L2Dist)
        .max_n_iterations(max_iters as u64)
        .tolerance(tolerance)
        .fit(&dataset)?;

    let labels = model.predict(&data.features);
    let centroids = model.centroids().clone();
    let inertia = compute_inertia(&data.features, &labels, &centroids);

    Ok(KMeansModel {
        centroids,
        labels,
        inertia,
    })
}

/// Index of the centroid nearest to `features`, or None for an empty matrix.
pub fn nearest_centroid(centroids: &Array2<f64>, features: &ArrayView1<f64>) -> Option<usize> {
    let mut min_distance = f64::INFINITY;
    let mut closest = None;

    for (cluster, centroid) in centroids.outer_iter().enumerate() {
        let distance = euclidean_distance(features, &centroid);
        if distance < min_distance {
            min_distance = distance;
            closest = Some(cluster);
        }
    }

    closest
}

/// Within-cluster sum of squares over the training assignment.
fn compute_inertia(features: &Array2<f64>, labels: &Array1<usize>, centroids: &Array2<f64>) -> f64 {
    let mut inertia = 0.0;
    for (i, &cluster) in labels.iter().enumerate() {
        if cluster < centroids.nrows() {
            let point = features.row(i);
            let centroid = centroids.row(cluster);
            inertia += point
                .iter()
                .zip(centroid.iter())
                .map(|(a, b)| (a - b).powi(2))
                .sum::<f64>();
        }
    }
    inertia
}

fn euclidean_distance(a: &ArrayView1<f64>, b: &ArrayView1<f64>) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::StandardScaler;
    use ndarray::{array, Array2};

    /// Five tight groups of two points each, already standardized-ish.
    fn create_test_data() -> RhythmData {
        let features = Array2::from_shape_vec(
            (10, 3),
            vec![
                -2.0, -2.0, -2.0, //
                -2.1, -1.9, -2.0, //
                2.0, 2.0, 2.0, //
                2.1, 1.9, 2.0, //
                -2.0, 2.0, 0.0, //
                -1.9, 2.1, 0.0, //
                2.0, -2.0, 0.0, //
                2.1, -1.9, 0.0, //
                0.0, 0.0, 0.0, //
                0.1, -0.1, 0.0, //
            ],
        )
        .unwrap();
        let raw_features = &features * 2.0 + 6.0;
        let scaler = StandardScaler::fit(&raw_features).unwrap();

        RhythmData {
            features,
            raw_features,
            scaler,
            imputed_counts: [0, 0, 0],
        }
    }

    #[test]
    fn test_fit_kmeans() {
        let data = create_test_data();
        let model = fit_kmeans(&data, 100, 1e-4).unwrap();

        assert_eq!(model.labels.len(), 10);
        assert_eq!(model.centroids.shape(), &[5, 3]);
        assert!(model.inertia.is_finite());
        assert!(model.inertia >= 0.0);

        let sizes = model.cluster_sizes();
        assert_eq!(sizes.iter().sum::<usize>(), 10);
    }

    #[test]
    fn test_fit_is_reproducible_with_fixed_seed() {
        let data = create_test_data();
        let first = fit_kmeans(&data, 100, 1e-4).unwrap();
        let second = fit_kmeans(&data, 100, 1e-4).unwrap();

        assert_eq!(first.labels, second.labels);
        for (a, b) in first.centroids.iter().zip(second.centroids.iter()) {
            assert!((a - b).abs() < 1e-12);
        }
    }

    #[test]
    fn test_fit_rejects_tiny_dataset() {
        let data = create_test_data();
        let small = RhythmData {
            features: data.features.slice(ndarray::s![..3, ..]).to_owned(),
            raw_features: data.raw_features.slice(ndarray::s![..3, ..]).to_owned(),
            scaler: data.scaler.clone(),
            imputed_counts: [0, 0, 0],
        };
        assert!(fit_kmeans(&small, 100, 1e-4).is_err());
    }

    #[test]
    fn test_nearest_centroid() {
        let centroids = array![[0.0, 0.0, 0.0], [10.0, 0.0, 0.0], [0.0, 10.0, 0.0]];
        let point = array![9.0, 1.0, 0.0];
        assert_eq!(nearest_centroid(&centroids, &point.view()), Some(1));

        let empty = Array2::<f64>::zeros((0, 3));
        assert_eq!(nearest_centroid(&empty, &point.view()), None);
    }

    #[test]
    fn test_cluster_summary_means_rounded() {
        let raw_features = Array2::from_shape_vec(
            (4, 3),
            vec![
                1.0, 2.0, 3.0, //
                2.0, 3.0, 4.0, //
                10.0, 10.0, 10.0, //
                10.0, 10.0, 10.0, //
            ],
        )
        .unwrap();
        let model = KMeansModel {
            centroids: Array2::zeros((5, 3)),
            labels: array![0, 0, 1, 1],
            inertia: 0.0,
        };

        let summary = model.cluster_summary(&raw_features);
        assert_eq!(summary.len(), 5);
        assert_eq!(summary[0].size, 2);
        assert_eq!(summary[0].feature_means, [1.5, 2.5, 3.5]);
        assert_eq!(summary[1].feature_means, [10.0, 10.0, 10.0]);
        assert_eq!(summary[2].size, 0);

        // Rounding to 2 dp
        let model2 = KMeansModel {
            centroids: Array2::zeros((5, 3)),
            labels: array![0, 0, 0],
            inertia: 0.0,
        };
        let raw2 =
            Array2::from_shape_vec((3, 3), vec![1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.005, 0.0, 0.0])
                .unwrap();
        let summary2 = model2.cluster_summary(&raw2);
        assert_eq!(summary2[0].feature_means[0], 1.0);
    }

    #[test]
    fn test_predict_rejects_wrong_dimension() {
        let model = KMeansModel {
            centroids: Array2::zeros((5, 3)),
            labels: array![0],
            inertia: 0.0,
        };
        let bad = array![1.0, 2.0];
        assert!(model.predict(&bad.view()).is_err());
    }
}
