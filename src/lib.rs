//! # meanshift-rs
//!
//! Generic Mean Shift and K-Means clustering over any point type, with
//! pluggable distance/averaging ("shape") and weighting ("kernel")
//! strategies resolved at compile time.
//!
//! ## Features
//!
//! - **Mean Shift**: every seed cluster climbs to its local density maximum,
//!   then clusters that converge within the kernel window are merged and
//!   reported with their counts, largest first
//! - **Three execution strategies**: sequential, one rayon task per cluster,
//!   or a fixed pool of worker threads
//! - **Duplicate folding**: repeated input points are collapsed into
//!   `(point, count)` pairs so each iteration costs O(distinct points)
//! - **K-Means**: a smaller sibling partitioning into a fixed number of groups
//! - **ndarray compatible**: row matrices convert to and from array points
//!
//! ## Example
//!
//! ```rust
//! use meanshift_rs::{FlatKernel, MeanShift};
//!
//! let points = [[0.0f64, 2.0], [1.0, 1.0], [2.0, 0.0], [7.0, 5.0], [5.0, 7.0], [6.0, 6.0]];
//!
//! let mut model = MeanShift::new(FlatKernel::new(5.0));
//! model.train(&points).unwrap();
//!
//! let clusters = model.clusters().unwrap();
//! assert_eq!(clusters.len(), 2);
//! assert_eq!(clusters[0].count, 3);
//! ```
//!
//! ## Custom Configuration
//!
//! ```rust
//! use meanshift_rs::{Execution, GaussianKernel, MeanShift, MeanShiftConfig};
//!
//! let points: Vec<f64> = (0..200).map(|i| (i % 20) as f64).collect();
//!
//! let config = MeanShiftConfig {
//!     initial_clusters: 50,
//!     epsilon: 1e-8,
//!     max_iters: 1_000,
//!     execution: Execution::FixedPool { threads: 4 },
//!     fold_duplicates: true,
//! };
//!
//! let mut model = MeanShift::with_config(GaussianKernel::new(2.0), config);
//! model.train(&points).unwrap();
//! ```
//!
//! ## Custom Shapes
//!
//! Implement [`Point`] for the value type and [`Shape`] for a zero-sized
//! strategy, then build the model with [`MeanShift::with_shape`].

mod algorithm;
mod config;
mod distance;
mod error;
mod interop;
mod kernel;
mod kmeans;
mod meanshift;
mod merge;
mod point;
mod shape;

pub use algorithm::{mean_shift, seed_clusters, weighted_mean_shift, Shifter};
pub use config::{Execution, KMeansConfig, MeanShiftConfig};
pub use error::ClusterError;
pub use interop::{centroids_to_array, counts_to_array, points_from_rows};
pub use kernel::{FlatKernel, GaussianKernel, Kernel};
pub use kmeans::{kmeans_partition, KMeans, KMeansResult};
pub use meanshift::MeanShift;
pub use merge::{connect_components, fold_duplicates, merge_converged};
pub use point::{Point, Sample, Weighted, WeightedCluster};
pub use shape::{Euclidean, Shape};
