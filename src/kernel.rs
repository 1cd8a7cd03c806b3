/// Converts a squared distance into an influence weight.
///
/// Weights are non-negative and non-increasing in distance. The configured
/// window doubles as the tolerance of the post-convergence merge.
pub trait Kernel: Copy + Send + Sync {
    fn weight(&self, distance_squared: f64) -> f64;

    /// Bandwidth the kernel was built with.
    fn window_size(&self) -> f64;
}

/// Hard cutoff: every point inside the window counts equally.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlatKernel {
    window: f64,
    window_squared: f64,
}

impl FlatKernel {
    pub fn new(window: f64) -> Self {
        Self {
            window,
            window_squared: window * window,
        }
    }
}

impl Kernel for FlatKernel {
    #[inline]
    fn weight(&self, distance_squared: f64) -> f64 {
        if distance_squared < self.window_squared {
            1.0
        } else {
            0.0
        }
    }

    fn window_size(&self) -> f64 {
        self.window
    }
}

/// Gaussian falloff `exp(-d² / 2h²)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussianKernel {
    bandwidth: f64,
    // -2h², precomputed for the hot loop
    denominator: f64,
}

impl GaussianKernel {
    pub fn new(bandwidth: f64) -> Self {
        Self {
            bandwidth,
            denominator: -2.0 * bandwidth * bandwidth,
        }
    }
}

impl Kernel for GaussianKernel {
    #[inline]
    fn weight(&self, distance_squared: f64) -> f64 {
        (distance_squared / self.denominator).exp()
    }

    fn window_size(&self) -> f64 {
        self.bandwidth
    }
}
