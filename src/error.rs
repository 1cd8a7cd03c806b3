use thiserror::Error;

/// Error types for the clustering library
#[derive(Error, Debug)]
pub enum ClusterError {
    /// No points were supplied
    #[error("Empty input: at least one point is required")]
    EmptyInput,

    /// The number of K-Means groups is invalid (must be > 0)
    #[error("Invalid k value: {0}")]
    InvalidK(String),

    /// Not enough data points for the requested number of groups
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// A configuration or kernel parameter is out of range
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Every kernel weight was zero, so the weighted average is undefined
    #[error("Zero total weight: {0}")]
    ZeroWeight(String),

    /// Model has not been fitted yet
    #[error("Model has not been fitted. Call train() or fit() first.")]
    NotFitted,

    /// Dimension mismatch between data and the requested point type
    #[error("Dimension mismatch: {0}")]
    InvalidDimensions(String),

    /// A fixed-pool worker thread panicked while shifting clusters
    #[error("A worker thread panicked during mean shift")]
    WorkerPanicked,
}
