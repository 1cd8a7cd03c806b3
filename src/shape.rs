/// Distance and averaging strategy over a point type.
///
/// Shapes are stateless values resolved at compile time, so the shift and
/// reassignment loops monomorphize over them.
///
/// `weighted_average` and `average` are only called with non-empty input
/// whose total weight is positive; the algorithms check this before calling.
pub trait Shape<T>: Copy + Send + Sync {
    /// Squared distance between two points. Symmetric and never negative.
    fn distance_squared(&self, a: &T, b: &T) -> f64;

    /// Weighted centroid of `(point, weight)` pairs.
    fn weighted_average(&self, items: &[(T, f64)]) -> T;

    /// Unweighted centroid.
    fn average(&self, items: &[T]) -> T;

    #[inline]
    fn are_equal(&self, a: &T, b: &T, epsilon: f64) -> bool {
        self.distance_squared(a, b) <= epsilon
    }
}

/// Euclidean geometry over scalars and fixed-size float arrays.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Euclidean;

macro_rules! impl_scalar {
    ($t:ty) => {
        impl Shape<$t> for Euclidean {
            #[inline]
            fn distance_squared(&self, a: &$t, b: &$t) -> f64 {
                let d = (*a - *b) as f64;
                d * d
            }

            fn weighted_average(&self, items: &[($t, f64)]) -> $t {
                let mut sum = 0.0f64;
                let mut total_weight = 0.0f64;
                for &(x, w) in items {
                    sum += x as f64 * w;
                    total_weight += w;
                }
                (sum / total_weight) as $t
            }

            fn average(&self, items: &[$t]) -> $t {
                let sum: f64 = items.iter().map(|&x| x as f64).sum();
                (sum / items.len() as f64) as $t
            }
        }
    };
}

macro_rules! impl_array {
    ($t:ty) => {
        impl<const N: usize> Shape<[$t; N]> for Euclidean {
            #[inline]
            fn distance_squared(&self, a: &[$t; N], b: &[$t; N]) -> f64 {
                let mut dist = 0.0f64;
                for j in 0..N {
                    let d = (a[j] - b[j]) as f64;
                    dist += d * d;
                }
                dist
            }

            fn weighted_average(&self, items: &[([$t; N], f64)]) -> [$t; N] {
                let mut sum = [0.0f64; N];
                let mut total_weight = 0.0f64;
                for (x, w) in items {
                    for j in 0..N {
                        sum[j] += x[j] as f64 * w;
                    }
                    total_weight += w;
                }
                std::array::from_fn(|j| (sum[j] / total_weight) as $t)
            }

            fn average(&self, items: &[[$t; N]]) -> [$t; N] {
                let mut sum = [0.0f64; N];
                for x in items {
                    for j in 0..N {
                        sum[j] += x[j] as f64;
                    }
                }
                let n = items.len() as f64;
                std::array::from_fn(|j| (sum[j] / n) as $t)
            }
        }
    };
}

impl_scalar!(f64);
impl_scalar!(f32);
impl_array!(f64);
impl_array!(f32);
