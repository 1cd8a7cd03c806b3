use crate::shape::Shape;
use rayon::prelude::*;

/// Inputs smaller than this are labelled on the calling thread
const PARALLEL_THRESHOLD: usize = 4_096;

/// Index of the centroid closest to `point`; ties go to the lowest index.
///
/// Returns 0 for an empty centroid list.
#[inline]
pub fn nearest_centroid<T, S: Shape<T>>(shape: &S, point: &T, centroids: &[T]) -> usize {
    let mut best = 0;
    let mut best_dist = f64::INFINITY;

    for (i, centroid) in centroids.iter().enumerate() {
        let dist = shape.distance_squared(point, centroid);
        if dist < best_dist {
            best_dist = dist;
            best = i;
        }
    }

    best
}

/// Assign each point to its nearest centroid (serial version for small inputs)
pub fn assign_labels_serial<T, S: Shape<T>>(
    shape: &S,
    points: &[T],
    centroids: &[T],
) -> Vec<usize> {
    points
        .iter()
        .map(|p| nearest_centroid(shape, p, centroids))
        .collect()
}

/// Assign each point to its nearest centroid, in parallel for large inputs
pub fn assign_labels<T: Sync, S: Shape<T>>(shape: &S, points: &[T], centroids: &[T]) -> Vec<usize> {
    if points.len() < PARALLEL_THRESHOLD {
        return assign_labels_serial(shape, points, centroids);
    }

    points
        .par_iter()
        .map(|p| nearest_centroid(shape, p, centroids))
        .collect()
}
