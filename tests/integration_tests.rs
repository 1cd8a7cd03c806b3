use approx::assert_relative_eq;
use meanshift_rs::{
    centroids_to_array, merge_converged, points_from_rows, ClusterError, Euclidean, Execution,
    FlatKernel, GaussianKernel, KMeans, KMeansConfig, Kernel, MeanShift, MeanShiftConfig, Shape,
    Weighted, WeightedCluster,
};
use ndarray::Array2;
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const POINTS_1D: [f64; 7] = [0.0, 1.0, 8.0, 10.0, 12.0, 22.0, 24.0];

const POINTS_2D: [[f64; 2]; 6] = [
    [0.0, 2.0],
    [1.0, 1.0],
    [2.0, 0.0],
    [7.0, 5.0],
    [5.0, 7.0],
    [6.0, 6.0],
];

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Points scattered around a few well separated centers, snapped to a 0.5
/// grid so the set contains many exact duplicates.
fn generate_blobs(n_samples: usize, centers: &[[f64; 2]], seed: u64) -> Vec<[f64; 2]> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    (0..n_samples)
        .map(|i| {
            let center = centers[i % centers.len()];
            let dx: f64 = rng.gen_range(-2.0..2.0);
            let dy: f64 = rng.gen_range(-2.0..2.0);
            [
                ((center[0] + dx) * 2.0).round() / 2.0,
                ((center[1] + dy) * 2.0).round() / 2.0,
            ]
        })
        .collect()
}

fn run<K: Kernel>(
    points: &[[f64; 2]],
    kernel: K,
    config: MeanShiftConfig,
) -> Vec<WeightedCluster<[f64; 2]>> {
    let mut model = MeanShift::with_config(kernel, config);
    model.train(points).unwrap();
    model.take_clusters().unwrap()
}

fn sorted_by_position(
    mut clusters: Vec<WeightedCluster<[f64; 2]>>,
) -> Vec<WeightedCluster<[f64; 2]>> {
    clusters.sort_by(|a, b| {
        a.centroid[0]
            .partial_cmp(&b.centroid[0])
            .unwrap()
            .then(a.centroid[1].partial_cmp(&b.centroid[1]).unwrap())
    });
    clusters
}

fn total_count<T>(clusters: &[WeightedCluster<T>]) -> usize {
    clusters.iter().map(|c| c.count).sum()
}

// ============================================================================
// Reference Scenarios
// ============================================================================

#[test]
fn test_scenario_1d_flat_kernel() {
    init_logging();
    let mut model = MeanShift::new(FlatKernel::new(5.0));
    model.train(&POINTS_1D).unwrap();

    let clusters = model.clusters().unwrap();
    assert_eq!(clusters.len(), 3, "Should find three modes");

    assert_relative_eq!(clusters[0].centroid, 10.0, epsilon = 1e-6);
    assert_eq!(clusters[0].count, 3);

    // The two clusters of size two are ordered by first appearance
    assert_relative_eq!(clusters[1].centroid, 0.5, epsilon = 1e-6);
    assert_eq!(clusters[1].count, 2);
    assert_relative_eq!(clusters[2].centroid, 23.0, epsilon = 1e-6);
    assert_eq!(clusters[2].count, 2);
}

#[test]
fn test_scenario_2d_flat_kernel() {
    init_logging();
    let mut model = MeanShift::new(FlatKernel::new(5.0));
    model.train(&POINTS_2D).unwrap();

    let clusters = sorted_by_position(model.clusters().unwrap().to_vec());
    assert_eq!(clusters.len(), 2);

    assert_relative_eq!(clusters[0].centroid[0], 1.0, epsilon = 1e-6);
    assert_relative_eq!(clusters[0].centroid[1], 1.0, epsilon = 1e-6);
    assert_eq!(clusters[0].count, 3);

    assert_relative_eq!(clusters[1].centroid[0], 6.0, epsilon = 1e-6);
    assert_relative_eq!(clusters[1].centroid[1], 6.0, epsilon = 1e-6);
    assert_eq!(clusters[1].count, 3);
}

#[test]
fn test_scenario_kmeans_matches_mean_shift_groups() {
    let mut kmeans = KMeans::new(3);
    kmeans.train(&POINTS_1D).unwrap();
    let kmeans_clusters = kmeans.clusters().unwrap();

    let mut model = MeanShift::new(FlatKernel::new(5.0));
    model.train(&POINTS_1D).unwrap();
    let shift_clusters = model.clusters().unwrap();

    assert_eq!(kmeans_clusters.len(), shift_clusters.len());
    for (k, m) in kmeans_clusters.iter().zip(shift_clusters) {
        assert_eq!(k.count, m.count);
    }

    let kmeans_labels = kmeans.predict(&POINTS_1D).unwrap();
    let shift_labels = model.predict(&POINTS_1D).unwrap();
    for i in 0..POINTS_1D.len() {
        for j in 0..POINTS_1D.len() {
            assert_eq!(
                kmeans_labels[i] == kmeans_labels[j],
                shift_labels[i] == shift_labels[j],
                "Points {} and {} should be grouped the same way",
                i,
                j
            );
        }
    }
}

// ============================================================================
// Weight Conservation
// ============================================================================

#[test]
fn test_weight_conservation_unweighted() {
    let points = generate_blobs(300, &[[0.0, 0.0], [15.0, 0.0], [0.0, 15.0]], 7);

    for kernel_window in [1.0, 3.0, 6.0] {
        let clusters = run(&points, FlatKernel::new(kernel_window), MeanShiftConfig::default());
        assert_eq!(total_count(&clusters), points.len());
    }
}

#[test]
fn test_weight_conservation_weighted() {
    let points = [
        Weighted::new([0.0f64, 0.0], 5),
        Weighted::new([0.5, 0.0], 2),
        Weighted::new([10.0, 10.0], 9),
        Weighted::new([10.5, 10.0], 1),
    ];

    let mut model = MeanShift::new(GaussianKernel::new(1.0));
    model.train_weighted(&points).unwrap();

    assert_eq!(total_count(model.clusters().unwrap()), 17);
}

#[test]
fn test_weight_conservation_with_iteration_cap() {
    let points = generate_blobs(120, &[[0.0, 0.0], [12.0, 12.0]], 3);
    let config = MeanShiftConfig::default().with_max_iters(1);

    let clusters = run(&points, GaussianKernel::new(2.0), config);
    assert_eq!(total_count(&clusters), points.len());
}

#[test]
fn test_subsampled_seeds_count_seeds() {
    let points = generate_blobs(100, &[[0.0, 0.0], [20.0, 0.0]], 11);
    let config = MeanShiftConfig::new(10);

    let clusters = run(&points, FlatKernel::new(4.0), config);
    assert_eq!(total_count(&clusters), 10);
}

// ============================================================================
// Execution Strategy Equivalence
// ============================================================================

#[test]
fn test_parallel_matches_sequential() {
    init_logging();
    let points = generate_blobs(400, &[[0.0, 0.0], [15.0, 0.0], [0.0, 15.0]], 42);
    let kernel = GaussianKernel::new(1.5);

    let sequential = run(&points, kernel, MeanShiftConfig::default());
    let parallel = run(
        &points,
        kernel,
        MeanShiftConfig::default().with_execution(Execution::Parallel),
    );

    assert_eq!(sequential, parallel);
}

#[test]
fn test_fixed_pool_matches_sequential() {
    let points = generate_blobs(400, &[[0.0, 0.0], [15.0, 0.0], [0.0, 15.0]], 42);
    let kernel = GaussianKernel::new(1.5);

    let sequential = run(&points, kernel, MeanShiftConfig::default());

    for threads in [0, 1, 3, 8] {
        let pooled = run(
            &points,
            kernel,
            MeanShiftConfig::default().with_execution(Execution::FixedPool { threads }),
        );
        assert_eq!(sequential, pooled, "FixedPool with {} threads", threads);
    }
}

#[test]
fn test_folded_matches_unfolded() {
    let points = generate_blobs(500, &[[0.0, 0.0], [15.0, 0.0], [0.0, 15.0]], 5);
    let kernel = FlatKernel::new(3.0);

    let plain = sorted_by_position(run(&points, kernel, MeanShiftConfig::default()));

    for execution in [
        Execution::Sequential,
        Execution::Parallel,
        Execution::FixedPool { threads: 4 },
    ] {
        let config = MeanShiftConfig::default()
            .with_fold_duplicates(true)
            .with_execution(execution);
        let folded = sorted_by_position(run(&points, kernel, config));

        assert_eq!(plain.len(), folded.len(), "{:?}", execution);
        for (a, b) in plain.iter().zip(&folded) {
            assert_eq!(a.count, b.count);
            assert!(Euclidean.distance_squared(&a.centroid, &b.centroid) <= 1e-6);
        }
    }
}

// ============================================================================
// Merge Idempotence
// ============================================================================

#[test]
fn test_merge_idempotent_on_results() {
    let points = generate_blobs(300, &[[0.0, 0.0], [8.0, 0.0], [0.0, 8.0]], 99);
    let kernel = GaussianKernel::new(1.0);

    let clusters = run(&points, kernel, MeanShiftConfig::default());
    let again = merge_converged(clusters.clone(), &Euclidean, kernel.window_size());
    assert_eq!(again, clusters);

    for (i, a) in clusters.iter().enumerate() {
        for b in &clusters[i + 1..] {
            assert!(Euclidean.distance_squared(&a.centroid, &b.centroid) >= kernel.window_size());
        }
    }
}

#[test]
fn test_results_sorted_by_count() {
    let points = generate_blobs(250, &[[0.0, 0.0], [20.0, 20.0]], 8);
    let clusters = run(&points, FlatKernel::new(2.0), MeanShiftConfig::default());

    for pair in clusters.windows(2) {
        assert!(pair[0].count >= pair[1].count);
    }
}

// ============================================================================
// K-Means
// ============================================================================

#[test]
fn test_kmeans_groups_never_empty() {
    let points = generate_blobs(200, &[[0.0, 0.0], [30.0, 30.0]], 13);

    for k in [1, 2, 5, 17, 200] {
        let mut kmeans = KMeans::with_config(KMeansConfig::new(k));
        kmeans.train(&points).unwrap();

        let clusters = kmeans.clusters().unwrap();
        assert_eq!(clusters.len(), k);
        assert!(clusters.iter().all(|c| c.count > 0));
        assert_eq!(total_count(clusters), points.len());
    }
}

#[test]
fn test_kmeans_separated_blobs() {
    // Blobs are laid out one after another so each starting group holds one blob
    let points: Vec<[f64; 2]> = [[0.0, 0.0], [30.0, 0.0], [0.0, 30.0]]
        .iter()
        .enumerate()
        .flat_map(|(i, &center)| generate_blobs(100, &[center], i as u64))
        .collect();

    let mut kmeans = KMeans::new(3);
    let labels = kmeans.fit_predict(&points).unwrap();

    for blob in labels.chunks(100) {
        assert!(blob.iter().all(|&label| label == blob[0]));
    }
    assert_ne!(labels[0], labels[100]);
    assert_ne!(labels[100], labels[200]);
    assert_ne!(labels[0], labels[200]);

    let clusters = kmeans.clusters().unwrap();
    assert!(clusters.iter().all(|c| c.count == 100));
}

#[test]
fn test_kmeans_insufficient_data() {
    let mut kmeans = KMeans::new(10);
    let result = kmeans.train(&POINTS_1D);
    assert!(matches!(result, Err(ClusterError::InsufficientData(_))));
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_empty_input_fails() {
    let empty: Vec<f64> = Vec::new();
    let mut model = MeanShift::new(FlatKernel::new(1.0));
    assert!(matches!(model.train(&empty), Err(ClusterError::EmptyInput)));
}

#[test]
fn test_invalid_window_fails() {
    let mut model = MeanShift::new(GaussianKernel::new(-1.0));
    let result = model.train(&POINTS_1D);
    assert!(matches!(result, Err(ClusterError::InvalidParameter(_))));
}

#[test]
fn test_predict_before_fit_fails() {
    let model: MeanShift<f64, _> = MeanShift::new(FlatKernel::new(1.0));
    assert!(matches!(
        model.predict(&POINTS_1D),
        Err(ClusterError::NotFitted)
    ));
}

// ============================================================================
// ndarray Interop
// ============================================================================

#[test]
fn test_ndarray_round_trip() {
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let data = Array2::random_using((200, 3), Uniform::new(-1.0, 1.0), &mut rng);

    let points: Vec<[f64; 3]> = points_from_rows(&data.view()).unwrap();
    assert_eq!(points.len(), 200);

    let mut model = MeanShift::with_config(
        GaussianKernel::new(0.5),
        MeanShiftConfig::new(20).with_execution(Execution::Parallel),
    );
    model.train(&points).unwrap();

    let clusters = model.clusters().unwrap();
    let centroids = centroids_to_array(clusters);
    assert_eq!(centroids.nrows(), clusters.len());
    assert_eq!(centroids.ncols(), 3);
    assert_eq!(total_count(clusters), 20);
}

#[test]
fn test_f32_points() {
    let points: Vec<[f32; 2]> = POINTS_2D
        .iter()
        .map(|p| [p[0] as f32, p[1] as f32])
        .collect();

    let mut model = MeanShift::new(FlatKernel::new(5.0));
    model.train(&points).unwrap();

    let clusters = model.clusters().unwrap();
    assert_eq!(clusters.len(), 2);
    assert_eq!(total_count(clusters), 6);
}
