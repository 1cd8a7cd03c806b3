use crate::config::KMeansConfig;
use crate::distance::{assign_labels, nearest_centroid};
use crate::error::ClusterError;
use crate::point::{Point, WeightedCluster};
use crate::shape::{Euclidean, Shape};
use log::{debug, warn};

/// Result of the k-means reassignment loop
pub struct KMeansResult<T> {
    /// Groups sorted by descending membership
    pub clusters: Vec<WeightedCluster<T>>,
    /// Number of full passes over the data
    pub n_iterations: usize,
    /// Whether the last pass made no reassignment
    pub converged: bool,
}

/// Split the points into `k` contiguous groups. The last group takes the
/// remainder when `k` does not divide the number of points.
fn split<T: Point>(points: &[T], k: usize) -> Vec<Vec<T>> {
    let size = points.len() / k;
    (0..k)
        .map(|i| {
            let start = i * size;
            let end = if i == k - 1 { points.len() } else { start + size };
            points[start..end].to_vec()
        })
        .collect()
}

/// Partition `points` into `config.k` groups by moving points to their
/// nearest centroid until a full pass moves nothing.
///
/// Centroids are recomputed as soon as a point moves. A point only moves
/// when another centroid is strictly closer than its own, and never out of
/// a group with a single member, so no group ever becomes empty.
pub fn kmeans_partition<T, S>(
    points: &[T],
    shape: &S,
    config: &KMeansConfig,
) -> Result<KMeansResult<T>, ClusterError>
where
    T: Point,
    S: Shape<T>,
{
    let n_samples = points.len();
    let k = config.k;

    if n_samples == 0 {
        return Err(ClusterError::EmptyInput);
    }

    if k == 0 {
        return Err(ClusterError::InvalidK(
            "k must be greater than 0".to_string(),
        ));
    }

    if n_samples < k {
        return Err(ClusterError::InsufficientData(format!(
            "Number of samples ({}) is less than k ({})",
            n_samples, k
        )));
    }

    debug!("Training k-means: {} samples, {} groups", n_samples, k);

    let mut groups = split(points, k);
    let mut centroids: Vec<T> = groups.iter().map(|g| shape.average(g)).collect();

    let mut n_iterations = 0;
    let mut converged = false;

    while n_iterations < config.max_iters {
        n_iterations += 1;
        let mut moved = 0usize;

        for g in 0..groups.len() {
            let mut p = 0;
            while p < groups[g].len() {
                let point = groups[g][p];
                let nearest = nearest_centroid(shape, &point, &centroids);
                let closer = nearest != g
                    && shape.distance_squared(&point, &centroids[nearest])
                        < shape.distance_squared(&point, &centroids[g]);

                if closer && groups[g].len() > 1 {
                    groups[g].swap_remove(p);
                    groups[nearest].push(point);
                    centroids[g] = shape.average(&groups[g]);
                    centroids[nearest] = shape.average(&groups[nearest]);
                    moved += 1;
                } else {
                    p += 1;
                }
            }
        }

        debug!("  Pass {}: moved {} points", n_iterations, moved);

        if moved == 0 {
            converged = true;
            break;
        }
    }

    if !converged {
        warn!(
            "k-means stopped after {} passes without settling",
            config.max_iters
        );
    }

    let mut clusters: Vec<WeightedCluster<T>> = centroids
        .into_iter()
        .zip(&groups)
        .map(|(centroid, members)| WeightedCluster::new(centroid, members.len()))
        .collect();
    clusters.sort_by(|a, b| b.count.cmp(&a.count));

    Ok(KMeansResult {
        clusters,
        n_iterations,
        converged,
    })
}

/// K-Means clustering over a point type `T` and a shape `S`.
///
/// # Example
///
/// ```
/// use meanshift_rs::KMeans;
///
/// let points = [0.0f64, 1.0, 8.0, 10.0, 12.0, 22.0, 24.0];
///
/// let mut kmeans = KMeans::new(3);
/// kmeans.train(&points).unwrap();
///
/// let clusters = kmeans.clusters().unwrap();
/// assert_eq!(clusters[0].count, 3);
/// ```
pub struct KMeans<T, S = Euclidean> {
    /// Model configuration
    config: KMeansConfig,

    shape: S,

    /// Groups from the last training run (None if not yet fitted)
    clusters: Option<Vec<WeightedCluster<T>>>,
}

impl<T> KMeans<T, Euclidean>
where
    T: Point,
    Euclidean: Shape<T>,
{
    /// Create a new KMeans instance with Euclidean geometry.
    ///
    /// # Panics
    ///
    /// Panics if `k` is 0.
    pub fn new(k: usize) -> Self {
        Self::with_config(KMeansConfig::new(k))
    }

    /// Create a new KMeans instance with a custom configuration.
    ///
    /// # Panics
    ///
    /// Panics if `config.k` is 0.
    pub fn with_config(config: KMeansConfig) -> Self {
        Self::with_shape(Euclidean, config)
    }
}

impl<T, S> KMeans<T, S>
where
    T: Point,
    S: Shape<T>,
{
    /// Create a new KMeans instance over a custom shape.
    ///
    /// # Panics
    ///
    /// Panics if `config.k` is 0.
    pub fn with_shape(shape: S, config: KMeansConfig) -> Self {
        assert!(config.k > 0, "k must be greater than 0");

        Self {
            config,
            shape,
            clusters: None,
        }
    }

    /// Partition the given points.
    ///
    /// # Errors
    ///
    /// Returns an error if there are no points or fewer points than groups.
    pub fn train(&mut self, points: &[T]) -> Result<(), ClusterError> {
        let result = kmeans_partition(points, &self.shape, &self.config)?;
        self.clusters = Some(result.clusters);
        Ok(())
    }

    /// Fit the model to the data. Equivalent to `train()`.
    pub fn fit(&mut self, points: &[T]) -> Result<&mut Self, ClusterError> {
        self.train(points)?;
        Ok(self)
    }

    /// Index into `clusters()` of the nearest centroid for each point.
    pub fn predict(&self, points: &[T]) -> Result<Vec<usize>, ClusterError> {
        let clusters = self.clusters.as_ref().ok_or(ClusterError::NotFitted)?;
        let centroids: Vec<T> = clusters.iter().map(|c| c.centroid).collect();
        Ok(assign_labels(&self.shape, points, &centroids))
    }

    /// Fit the model and label the same points in one call.
    pub fn fit_predict(&mut self, points: &[T]) -> Result<Vec<usize>, ClusterError> {
        self.train(points)?;
        self.predict(points)
    }

    /// Groups sorted by descending membership, if fitted.
    pub fn clusters(&self) -> Option<&[WeightedCluster<T>]> {
        self.clusters.as_deref()
    }

    /// Get the number of groups.
    pub fn k(&self) -> usize {
        self.config.k
    }

    /// Get the configuration.
    pub fn config(&self) -> &KMeansConfig {
        &self.config
    }
}
