use crate::algorithm::{mean_shift, weighted_mean_shift};
use crate::config::MeanShiftConfig;
use crate::distance::assign_labels;
use crate::error::ClusterError;
use crate::kernel::Kernel;
use crate::point::{Point, Weighted, WeightedCluster};
use crate::shape::{Euclidean, Shape};

/// Mean Shift clustering over a point type `T`, a kernel `K` and a shape `S`.
///
/// Every seed cluster is moved to the nearest local maximum of the
/// kernel-weighted density of the input; clusters that converge within the
/// kernel window of each other are merged and reported with the number of
/// seeds they absorbed, largest first.
///
/// # Example
///
/// ```
/// use meanshift_rs::{FlatKernel, MeanShift};
///
/// let points = [0.0f64, 1.0, 8.0, 10.0, 12.0, 22.0, 24.0];
///
/// let mut model = MeanShift::new(FlatKernel::new(5.0));
/// model.train(&points).unwrap();
///
/// let clusters = model.clusters().unwrap();
/// assert_eq!(clusters.len(), 3);
/// assert_eq!(clusters[0].count, 3);
/// ```
pub struct MeanShift<T, K, S = Euclidean> {
    /// Model configuration
    config: MeanShiftConfig,

    kernel: K,

    shape: S,

    /// Merged clusters (None if not yet fitted)
    clusters: Option<Vec<WeightedCluster<T>>>,
}

impl<T, K> MeanShift<T, K, Euclidean>
where
    T: Point,
    K: Kernel,
    Euclidean: Shape<T>,
{
    /// Create a new Mean Shift model with the default configuration and
    /// Euclidean geometry.
    pub fn new(kernel: K) -> Self {
        Self::with_config(kernel, MeanShiftConfig::default())
    }

    /// Create a new Mean Shift model with a custom configuration and
    /// Euclidean geometry.
    pub fn with_config(kernel: K, config: MeanShiftConfig) -> Self {
        Self::with_shape(kernel, Euclidean, config)
    }
}

impl<T, K, S> MeanShift<T, K, S>
where
    T: Point,
    K: Kernel,
    S: Shape<T>,
{
    /// Create a new Mean Shift model over a custom shape.
    pub fn with_shape(kernel: K, shape: S, config: MeanShiftConfig) -> Self {
        Self {
            config,
            kernel,
            shape,
            clusters: None,
        }
    }

    /// Cluster the given points.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, the configuration or kernel
    /// window is out of range, or a cluster drifts out of reach of every
    /// point.
    pub fn train(&mut self, points: &[T]) -> Result<(), ClusterError> {
        let clusters = mean_shift(points, self.kernel, self.shape, &self.config)?;
        self.clusters = Some(clusters);
        Ok(())
    }

    /// Cluster points that already carry a multiplicity.
    ///
    /// `config.fold_duplicates` is ignored; the input is used as given.
    pub fn train_weighted(&mut self, points: &[Weighted<T>]) -> Result<(), ClusterError> {
        let clusters = weighted_mean_shift(points, self.kernel, self.shape, &self.config)?;
        self.clusters = Some(clusters);
        Ok(())
    }

    /// Fit the model to the data. Equivalent to `train()`.
    ///
    /// Returns `&mut Self` for method chaining.
    pub fn fit(&mut self, points: &[T]) -> Result<&mut Self, ClusterError> {
        self.train(points)?;
        Ok(self)
    }

    /// Index into `clusters()` of the nearest merged centroid for each point.
    ///
    /// # Errors
    ///
    /// Returns [`ClusterError::NotFitted`] before the model has been trained.
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

    /// Merged clusters sorted by descending count, if fitted.
    pub fn clusters(&self) -> Option<&[WeightedCluster<T>]> {
        self.clusters.as_deref()
    }

    /// Take ownership of the merged clusters, leaving the model unfitted.
    pub fn take_clusters(&mut self) -> Option<Vec<WeightedCluster<T>>> {
        self.clusters.take()
    }

    pub fn kernel(&self) -> &K {
        &self.kernel
    }

    pub fn shape(&self) -> &S {
        &self.shape
    }

    /// Get the configuration.
    pub fn config(&self) -> &MeanShiftConfig {
        &self.config
    }
}
