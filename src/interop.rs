//! Conversions between ndarray row matrices and fixed-size array points.

use crate::error::ClusterError;
use crate::point::WeightedCluster;
use ndarray::{Array1, Array2, ArrayView2};

/// Read each row of `data` as an `N`-dimensional point.
///
/// # Errors
///
/// Returns [`ClusterError::InvalidDimensions`] if `data` does not have
/// exactly `N` columns.
pub fn points_from_rows<A: Copy, const N: usize>(
    data: &ArrayView2<A>,
) -> Result<Vec<[A; N]>, ClusterError> {
    let n_features = data.ncols();
    if n_features != N {
        return Err(ClusterError::InvalidDimensions(format!(
            "Expected {} features, got {}",
            N, n_features
        )));
    }

    Ok(data
        .outer_iter()
        .map(|row| std::array::from_fn(|j| row[j]))
        .collect())
}

/// Stack cluster centroids into a `(n_clusters, N)` matrix.
pub fn centroids_to_array<A: Copy, const N: usize>(
    clusters: &[WeightedCluster<[A; N]>],
) -> Array2<A> {
    Array2::from_shape_fn((clusters.len(), N), |(i, j)| clusters[i].centroid[j])
}

/// Cluster counts in the same order as `centroids_to_array`.
pub fn counts_to_array<T>(clusters: &[WeightedCluster<T>]) -> Array1<usize> {
    clusters.iter().map(|c| c.count).collect()
}
