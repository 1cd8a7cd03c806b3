use crate::config::{Execution, MeanShiftConfig};
use crate::error::ClusterError;
use crate::kernel::Kernel;
use crate::merge::{fold_duplicates, merge_converged};
use crate::point::{Point, Sample, Weighted, WeightedCluster};
use crate::shape::Shape;
use log::{debug, trace, warn};
use rayon::prelude::*;
use std::sync::Mutex;
use std::thread;
use std::time::Instant;

/// Select seed clusters at an even stride through the samples.
///
/// `initial_clusters == 0`, or a request larger than the number of samples,
/// seeds one cluster per sample.
pub fn seed_clusters<S: Copy>(samples: &[S], initial_clusters: usize) -> Vec<S> {
    let n = samples.len();
    let (count, step) = if initial_clusters == 0 || initial_clusters > n {
        (n, 1)
    } else {
        (initial_clusters, n / initial_clusters)
    };

    (0..count).map(|i| samples[i * step]).collect()
}

/// Moves a single cluster to its local density maximum.
#[derive(Debug, Clone, Copy)]
pub struct Shifter<K, S> {
    pub kernel: K,
    pub shape: S,
    pub epsilon: f64,
    pub max_iters: usize,
}

impl<K: Kernel, S> Shifter<K, S> {
    /// One mean shift step: the kernel-weighted average of every sample as
    /// seen from `position`.
    ///
    /// `scratch` must be as long as `samples`; it is overwritten.
    ///
    /// # Errors
    ///
    /// Returns [`ClusterError::InvalidDimensions`] on a scratch length
    /// mismatch, [`ClusterError::InvalidParameter`] if the total weight is NaN
    /// and [`ClusterError::ZeroWeight`] if it is zero.
    pub fn shift<T, P>(
        &self,
        position: &T,
        samples: &[P],
        scratch: &mut [(T, f64)],
    ) -> Result<T, ClusterError>
    where
        T: Point,
        P: Sample<T>,
        S: Shape<T>,
    {
        if scratch.len() != samples.len() {
            return Err(ClusterError::InvalidDimensions(format!(
                "scratch buffer holds {} entries for {} samples",
                scratch.len(),
                samples.len()
            )));
        }

        let mut total_weight = 0.0f64;
        for (slot, sample) in scratch.iter_mut().zip(samples) {
            let point = sample.point();
            let distance = self.shape.distance_squared(position, &point);
            let weight = self.kernel.weight(distance) * sample.count() as f64;
            total_weight += weight;
            *slot = (point, weight);
        }

        if total_weight.is_nan() {
            return Err(ClusterError::InvalidParameter(format!(
                "total kernel weight around {:?} is NaN, samples must be finite",
                position
            )));
        }

        if total_weight <= 0.0 {
            return Err(ClusterError::ZeroWeight(format!(
                "no sample lies within the kernel window of {:?}",
                position
            )));
        }

        Ok(self.shape.weighted_average(scratch))
    }

    /// Shift `start` until successive positions agree within `epsilon`, or
    /// until `max_iters` steps have been taken.
    pub fn converge<T, P>(
        &self,
        start: T,
        samples: &[P],
        scratch: &mut [(T, f64)],
    ) -> Result<T, ClusterError>
    where
        T: Point,
        P: Sample<T>,
        S: Shape<T>,
    {
        let mut position = start;
        for iteration in 1..=self.max_iters {
            let next = self.shift(&position, samples, scratch)?;
            let settled = self.shape.are_equal(&next, &position, self.epsilon);
            position = next;

            if settled {
                trace!("Cluster converged after {} iterations", iteration);
                return Ok(position);
            }
        }

        warn!(
            "Cluster starting at {:?} did not converge within {} iterations, keeping {:?}",
            start, self.max_iters, position
        );
        Ok(position)
    }
}

fn new_scratch<T: Point, P: Sample<T>>(samples: &[P]) -> Vec<(T, f64)> {
    samples.iter().map(|s| (s.point(), 0.0)).collect()
}

/// Shift every cluster on the calling thread with a single scratch buffer.
pub fn shift_sequential<T, P, K, S>(
    clusters: &mut [WeightedCluster<T>],
    samples: &[P],
    shifter: &Shifter<K, S>,
) -> Result<(), ClusterError>
where
    T: Point,
    P: Sample<T>,
    K: Kernel,
    S: Shape<T>,
{
    let mut scratch = new_scratch::<T, P>(samples);
    for cluster in clusters.iter_mut() {
        cluster.centroid = shifter.converge(cluster.centroid, samples, &mut scratch)?;
    }
    Ok(())
}

/// Shift clusters as rayon tasks. Each task writes only its own cluster slot.
pub fn shift_parallel<T, P, K, S>(
    clusters: &mut [WeightedCluster<T>],
    samples: &[P],
    shifter: &Shifter<K, S>,
) -> Result<(), ClusterError>
where
    T: Point,
    P: Sample<T>,
    K: Kernel,
    S: Shape<T>,
{
    clusters.par_iter_mut().try_for_each_init(
        || new_scratch::<T, P>(samples),
        |scratch, cluster| {
            cluster.centroid = shifter.converge(cluster.centroid, samples, scratch)?;
            Ok(())
        },
    )
}

/// Shift clusters on a fixed set of worker threads.
///
/// Workers claim the next unshifted cluster index from a shared counter,
/// converge it with a private scratch buffer and loop until the counter runs
/// past the last cluster. Results are written back after every worker joins.
pub fn shift_fixed_pool<T, P, K, S>(
    clusters: &mut [WeightedCluster<T>],
    samples: &[P],
    shifter: &Shifter<K, S>,
    threads: usize,
) -> Result<(), ClusterError>
where
    T: Point,
    P: Sample<T>,
    K: Kernel,
    S: Shape<T>,
{
    let threads = if threads == 0 { num_cpus::get() } else { threads };
    let threads = threads.min(clusters.len()).max(1);

    let starts: Vec<T> = clusters.iter().map(|c| c.centroid).collect();
    let next = Mutex::new(0usize);
    let starts = &starts[..];
    let next = &next;

    let results: Vec<Result<Vec<(usize, T)>, ClusterError>> = thread::scope(|scope| {
        let handles: Vec<_> = (0..threads)
            .map(|_| {
                scope.spawn(move || -> Result<Vec<(usize, T)>, ClusterError> {
                    let mut scratch = new_scratch::<T, P>(samples);
                    let mut shifted = Vec::new();
                    loop {
                        let index = {
                            let mut guard =
                                next.lock().map_err(|_| ClusterError::WorkerPanicked)?;
                            let claimed = *guard;
                            *guard += 1;
                            claimed
                        };
                        if index >= starts.len() {
                            return Ok(shifted);
                        }
                        match shifter.converge(starts[index], samples, &mut scratch) {
                            Ok(centroid) => shifted.push((index, centroid)),
                            Err(err) => {
                                // drain the counter so the other workers stop claiming
                                if let Ok(mut guard) = next.lock() {
                                    *guard = starts.len();
                                }
                                return Err(err);
                            }
                        }
                    }
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|handle| handle.join().unwrap_or(Err(ClusterError::WorkerPanicked)))
            .collect()
    });

    for result in results {
        for (index, centroid) in result? {
            clusters[index].centroid = centroid;
        }
    }
    Ok(())
}

fn validate<K: Kernel>(
    n_samples: usize,
    kernel: &K,
    config: &MeanShiftConfig,
) -> Result<(), ClusterError> {
    if n_samples == 0 {
        return Err(ClusterError::EmptyInput);
    }

    let window = kernel.window_size();
    if !(window > 0.0) || !window.is_finite() {
        return Err(ClusterError::InvalidParameter(format!(
            "kernel window must be positive and finite, got {}",
            window
        )));
    }

    if !(config.epsilon >= 0.0) || !config.epsilon.is_finite() {
        return Err(ClusterError::InvalidParameter(format!(
            "epsilon must be non-negative and finite, got {}",
            config.epsilon
        )));
    }

    if config.max_iters == 0 {
        return Err(ClusterError::InvalidParameter(
            "max_iters must be greater than 0".to_string(),
        ));
    }

    Ok(())
}

/// Seed, shift and merge over any sample type.
fn run<T, P, K, S>(
    samples: &[P],
    kernel: K,
    shape: S,
    config: &MeanShiftConfig,
) -> Result<Vec<WeightedCluster<T>>, ClusterError>
where
    T: Point,
    P: Sample<T>,
    K: Kernel,
    S: Shape<T>,
{
    validate(samples.len(), &kernel, config)?;

    let start = Instant::now();
    let mut clusters: Vec<WeightedCluster<T>> = seed_clusters(samples, config.initial_clusters)
        .iter()
        .map(|s| WeightedCluster::new(s.point(), s.count()))
        .collect();

    debug!(
        "Mean shift: {} samples, {} seed clusters, window {}, {:?}",
        samples.len(),
        clusters.len(),
        kernel.window_size(),
        config.execution
    );

    let shifter = Shifter {
        kernel,
        shape,
        epsilon: config.epsilon,
        max_iters: config.max_iters,
    };

    match config.execution {
        Execution::Sequential => shift_sequential(&mut clusters, samples, &shifter)?,
        Execution::Parallel => shift_parallel(&mut clusters, samples, &shifter)?,
        Execution::FixedPool { threads } => {
            shift_fixed_pool(&mut clusters, samples, &shifter, threads)?
        }
    }

    let merged = merge_converged(clusters, &shape, kernel.window_size());

    debug!(
        "Mean shift finished: {} clusters in {:.4}s",
        merged.len(),
        start.elapsed().as_secs_f64()
    );

    Ok(merged)
}

/// Run Mean Shift over plain points.
///
/// When `config.fold_duplicates` is set, repeated points are collapsed into
/// `(point, count)` pairs first and the weighted path is used instead.
///
/// The counts of the returned clusters sum to the number of seed clusters,
/// which is the number of points when `initial_clusters` is 0.
pub fn mean_shift<T, K, S>(
    points: &[T],
    kernel: K,
    shape: S,
    config: &MeanShiftConfig,
) -> Result<Vec<WeightedCluster<T>>, ClusterError>
where
    T: Point,
    K: Kernel,
    S: Shape<T>,
{
    if config.fold_duplicates {
        let folded = fold_duplicates(points);
        debug!(
            "Folded {} points into {} distinct points",
            points.len(),
            folded.len()
        );
        return run(&folded, kernel, shape, config);
    }

    run(points, kernel, shape, config)
}

/// Run Mean Shift over points that already carry a multiplicity.
///
/// # Errors
///
/// Besides the checks of [`mean_shift`], returns
/// [`ClusterError::InvalidParameter`] if any point has a count of 0.
pub fn weighted_mean_shift<T, K, S>(
    points: &[Weighted<T>],
    kernel: K,
    shape: S,
    config: &MeanShiftConfig,
) -> Result<Vec<WeightedCluster<T>>, ClusterError>
where
    T: Point,
    K: Kernel,
    S: Shape<T>,
{
    if let Some(empty) = points.iter().find(|p| p.count == 0) {
        return Err(ClusterError::InvalidParameter(format!(
            "weighted point {:?} has a count of 0",
            empty.point
        )));
    }

    run(points, kernel, shape, config)
}
