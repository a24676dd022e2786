use num::Float;

use crate::utils::sparse::SparseVector;
use crate::vectorizer::Vocabulary;

/// Term weighting strategy plugged into the vectorizer.
///
/// Implementations produce the per-term IDF table and the L2-normalized
/// TF-IDF vector of a single document. `counts` pairs `(term id, raw count)`
/// and is sorted by term id.
pub trait TfIdfEngine<N>
where
    N: Float,
{
    /// IDF weight for every vocabulary term, in term-id order.
    fn idf_vec(vocab: &Vocabulary) -> Vec<N>;

    /// Unit-norm TF-IDF vector for one document.
    /// Documents whose every term has zero weight yield the zero vector.
    fn doc_vec(counts: &[(u32, u32)], idf: &[N]) -> SparseVector<N>;
}

/// Textbook TF-IDF: `tf * ln(doc_count / df)`, unsmoothed.
///
/// Raw term counts serve as tf; the per-document constant between raw counts
/// and relative frequency is absorbed by the L2 normalization.
#[derive(Debug)]
pub struct DefaultTfIdfEngine;

impl TfIdfEngine<f32> for DefaultTfIdfEngine {
    fn idf_vec(vocab: &Vocabulary) -> Vec<f32> {
        let doc_count = vocab.doc_count() as f64;
        vocab
            .document_frequencies()
            .map(|df| (doc_count / df as f64).ln() as f32)
            .collect()
    }

    fn doc_vec(counts: &[(u32, u32)], idf: &[f32]) -> SparseVector<f32> {
        let mut vec = SparseVector::with_capacity(counts.len());
        for &(term_id, count) in counts {
            // Terms appearing in every document carry zero IDF and are skipped.
            let weight = count as f32 * idf[term_id as usize];
            if weight != 0.0 {
                vec.push(term_id, weight);
            }
        }
        vec.l2_normalize();
        vec.shrink_to_fit();
        vec
    }
}

impl TfIdfEngine<f64> for DefaultTfIdfEngine {
    fn idf_vec(vocab: &Vocabulary) -> Vec<f64> {
        let doc_count = vocab.doc_count() as f64;
        vocab
            .document_frequencies()
            .map(|df| (doc_count / df as f64).ln())
            .collect()
    }

    fn doc_vec(counts: &[(u32, u32)], idf: &[f64]) -> SparseVector<f64> {
        let mut vec = SparseVector::with_capacity(counts.len());
        for &(term_id, count) in counts {
            let weight = count as f64 * idf[term_id as usize];
            if weight != 0.0 {
                vec.push(term_id, weight);
            }
        }
        vec.l2_normalize();
        vec.shrink_to_fit();
        vec
    }
}
