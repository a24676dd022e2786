use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::utils::sparse::SparseVector;

/// Dense symmetric matrix of pairwise cosine similarities.
///
/// Row and column order is corpus order, the same order the title index is
/// built from. Entries are plain dot products because the document vectors
/// are unit-normalized. The upper triangle is computed once and mirrored,
/// so `get(i, j)` and `get(j, i)` are bit-identical.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityMatrix {
    n: usize,
    values: Vec<f32>,
}

impl SimilarityMatrix {
    /// Build the full pairwise matrix. The heavy step of the offline build,
    /// row-parallel across the upper triangle.
    pub fn build(vectors: &[SparseVector<f32>]) -> Self {
        let n = vectors.len();
        let upper: Vec<Vec<f32>> = (0..n)
            .into_par_iter()
            .map(|i| {
                let vi = &vectors[i];
                (i..n)
                    .map(|j| {
                        if i == j {
                            // Exact 1.0 on the diagonal for any document with
                            // surviving terms; zero vectors keep 0.0.
                            if vi.is_zero() {
                                0.0
                            } else {
                                1.0
                            }
                        } else {
                            vi.dot(&vectors[j])
                        }
                    })
                    .collect()
            })
            .collect();

        let mut values = vec![0.0f32; n * n];
        for (i, row) in upper.iter().enumerate() {
            for (offset, &value) in row.iter().enumerate() {
                let j = i + offset;
                values[i * n + j] = value;
                values[j * n + i] = value;
            }
        }
        Self { n, values }
    }

    /// Number of rows (and columns).
    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f32 {
        self.values[i * self.n + j]
    }

    /// All similarities of document `i`, in column (corpus) order.
    pub fn row(&self, i: usize) -> &[f32] {
        &self.values[i * self.n..(i + 1) * self.n]
    }
}
