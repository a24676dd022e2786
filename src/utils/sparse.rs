use num::Float;
use serde::{Deserialize, Serialize};

/// Sparse weight vector stored as parallel index/value arrays.
///
/// Indices are term ids and are kept sorted ascending, so two vectors can be
/// combined in a single merge pass without touching the dense dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SparseVector<N>
where
    N: Float,
{
    indices: Vec<u32>,
    values: Vec<N>,
}

impl<N> SparseVector<N>
where
    N: Float,
{
    pub fn new() -> Self {
        Self {
            indices: Vec::new(),
            values: Vec::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            indices: Vec::with_capacity(capacity),
            values: Vec::with_capacity(capacity),
        }
    }

    /// Append an entry. Entries must arrive in ascending index order.
    #[inline]
    pub fn push(&mut self, index: u32, value: N) {
        debug_assert!(
            self.indices.last().map_or(true, |&last| last < index),
            "sparse entries must be pushed in ascending index order"
        );
        self.indices.push(index);
        self.values.push(value);
    }

    /// Number of stored (non-zero) entries.
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    pub fn is_zero(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, N)> + '_ {
        self.indices.iter().copied().zip(self.values.iter().copied())
    }

    /// Dot product by merging the two sorted index lists.
    pub fn dot(&self, other: &Self) -> N {
        let mut acc = N::zero();
        let (mut a, mut b) = (0usize, 0usize);
        while a < self.indices.len() && b < other.indices.len() {
            match self.indices[a].cmp(&other.indices[b]) {
                std::cmp::Ordering::Equal => {
                    acc = acc + self.values[a] * other.values[b];
                    a += 1;
                    b += 1;
                }
                std::cmp::Ordering::Less => a += 1,
                std::cmp::Ordering::Greater => b += 1,
            }
        }
        acc
    }

    /// Euclidean norm.
    pub fn norm(&self) -> N {
        self.dot(self).sqrt()
    }

    /// Scale the vector to unit Euclidean norm.
    /// A zero vector is left untouched, never divided.
    pub fn l2_normalize(&mut self) {
        let norm = self.norm();
        if norm > N::zero() {
            for value in &mut self.values {
                *value = *value / norm;
            }
        }
    }

    pub fn shrink_to_fit(&mut self) {
        self.indices.shrink_to_fit();
        self.values.shrink_to_fit();
    }
}

impl<N> Default for SparseVector<N>
where
    N: Float,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vec_from(entries: &[(u32, f64)]) -> SparseVector<f64> {
        let mut v = SparseVector::new();
        for &(i, x) in entries {
            v.push(i, x);
        }
        v
    }

    #[test]
    fn dot_merges_only_shared_indices() {
        let a = vec_from(&[(0, 1.0), (2, 2.0), (5, 3.0)]);
        let b = vec_from(&[(1, 4.0), (2, 5.0), (5, 6.0), (9, 7.0)]);
        assert_eq!(a.dot(&b), 2.0 * 5.0 + 3.0 * 6.0);
        assert_eq!(a.dot(&b), b.dot(&a));
    }

    #[test]
    fn dot_with_zero_vector_is_zero() {
        let a = vec_from(&[(0, 1.0), (3, 2.0)]);
        let zero = SparseVector::<f64>::new();
        assert_eq!(a.dot(&zero), 0.0);
        assert_eq!(zero.dot(&zero), 0.0);
    }

    #[test]
    fn l2_normalize_yields_unit_norm() {
        let mut v = vec_from(&[(0, 3.0), (1, 4.0)]);
        v.l2_normalize();
        assert!((v.norm() - 1.0).abs() < 1e-12);
        assert_eq!(v.iter().collect::<Vec<_>>(), vec![(0, 0.6), (1, 0.8)]);
    }

    #[test]
    fn l2_normalize_leaves_zero_vector_alone() {
        let mut v = SparseVector::<f32>::new();
        v.l2_normalize();
        assert!(v.is_zero());
        assert_eq!(v.norm(), 0.0);
    }
}
