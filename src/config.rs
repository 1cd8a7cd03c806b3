/// How converging clusters are scheduled across threads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Execution {
    /// Shift every cluster on the calling thread, reusing one scratch buffer.
    #[default]
    Sequential,

    /// One rayon task per cluster, each with its own scratch buffer.
    Parallel,

    /// A fixed number of worker threads claiming clusters from a shared index.
    /// `threads == 0` uses one worker per logical core.
    FixedPool { threads: usize },
}

/// Configuration for the Mean Shift algorithm
#[derive(Debug, Clone)]
pub struct MeanShiftConfig {
    /// Number of seed clusters, taken at an even stride through the input.
    /// 0 seeds one cluster per input point.
    pub initial_clusters: usize,

    /// Squared-distance tolerance below which a cluster is considered converged
    pub epsilon: f64,

    /// Maximum shift iterations per cluster. A cluster that reaches the cap
    /// keeps its last position.
    pub max_iters: usize,

    /// Thread scheduling strategy
    pub execution: Execution,

    /// Collapse repeated input points into (point, count) pairs before shifting
    pub fold_duplicates: bool,
}

impl Default for MeanShiftConfig {
    fn default() -> Self {
        Self {
            initial_clusters: 0,
            epsilon: 5e-6,
            max_iters: 10_000,
            execution: Execution::Sequential,
            fold_duplicates: false,
        }
    }
}

impl MeanShiftConfig {
    /// Create a new configuration with the specified number of seed clusters
    pub fn new(initial_clusters: usize) -> Self {
        Self {
            initial_clusters,
            ..Default::default()
        }
    }

    /// Set the number of seed clusters
    pub fn with_initial_clusters(mut self, initial_clusters: usize) -> Self {
        self.initial_clusters = initial_clusters;
        self
    }

    /// Set the convergence tolerance
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Set the per-cluster iteration cap
    pub fn with_max_iters(mut self, max_iters: usize) -> Self {
        self.max_iters = max_iters;
        self
    }

    /// Set the execution strategy
    pub fn with_execution(mut self, execution: Execution) -> Self {
        self.execution = execution;
        self
    }

    /// Enable or disable duplicate folding
    pub fn with_fold_duplicates(mut self, fold_duplicates: bool) -> Self {
        self.fold_duplicates = fold_duplicates;
        self
    }
}

/// Configuration for the K-Means algorithm
#[derive(Debug, Clone)]
pub struct KMeansConfig {
    /// Number of groups
    pub k: usize,

    /// Maximum number of reassignment passes
    pub max_iters: usize,
}

impl Default for KMeansConfig {
    fn default() -> Self {
        Self {
            k: 8,
            max_iters: 300,
        }
    }
}

impl KMeansConfig {
    /// Create a new configuration with the specified number of groups
    pub fn new(k: usize) -> Self {
        Self {
            k,
            ..Default::default()
        }
    }

    /// Set the maximum number of passes
    pub fn with_max_iters(mut self, max_iters: usize) -> Self {
        self.max_iters = max_iters;
        self
    }
}
