use std::fmt::Debug;
use std::hash::Hash;

/// A value that can be clustered.
///
/// Points are plain copyable values shared read-only across worker threads.
/// `key` exposes an exact-equality fingerprint so repeated points and
/// bit-identical centroids can be folded through a hash map; floats do not
/// implement `Hash` themselves.
pub trait Point: Copy + PartialEq + Debug + Send + Sync {
    /// Hashable fingerprint. Two points with equal keys must compare equal.
    type Key: Eq + Hash;

    fn key(&self) -> Self::Key;
}

#[inline]
fn f64_bits(x: f64) -> u64 {
    // +0.0 and -0.0 compare equal, so they must share a key
    if x == 0.0 {
        0
    } else {
        x.to_bits()
    }
}

#[inline]
fn f32_bits(x: f32) -> u32 {
    if x == 0.0 {
        0
    } else {
        x.to_bits()
    }
}

impl Point for f64 {
    type Key = u64;

    fn key(&self) -> u64 {
        f64_bits(*self)
    }
}

impl Point for f32 {
    type Key = u32;

    fn key(&self) -> u32 {
        f32_bits(*self)
    }
}

impl<const N: usize> Point for [f64; N] {
    type Key = [u64; N];

    fn key(&self) -> [u64; N] {
        std::array::from_fn(|i| f64_bits(self[i]))
    }
}

impl<const N: usize> Point for [f32; N] {
    type Key = [u32; N];

    fn key(&self) -> [u32; N] {
        std::array::from_fn(|i| f32_bits(self[i]))
    }
}

/// A point paired with its multiplicity, the input of the weighted path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Weighted<T> {
    pub point: T,
    pub count: usize,
}

impl<T> Weighted<T> {
    pub fn new(point: T, count: usize) -> Self {
        Self { point, count }
    }
}

/// A converged cluster: its centroid and how many input points it absorbed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightedCluster<T> {
    pub centroid: T,
    pub count: usize,
}

impl<T> WeightedCluster<T> {
    pub fn new(centroid: T, count: usize) -> Self {
        Self { centroid, count }
    }
}

/// Something the shift loop can average over.
///
/// Implemented for bare points (multiplicity one) and for [`Weighted`]
/// points, so both paths share one monomorphized loop.
pub trait Sample<T>: Copy + Send + Sync {
    fn point(&self) -> T;

    fn count(&self) -> usize;
}

impl<T: Point> Sample<T> for T {
    #[inline(always)]
    fn point(&self) -> T {
        *self
    }

    #[inline(always)]
    fn count(&self) -> usize {
        1
    }
}

impl<T: Point> Sample<T> for Weighted<T> {
    #[inline(always)]
    fn point(&self) -> T {
        self.point
    }

    #[inline(always)]
    fn count(&self) -> usize {
        self.count
    }
}
