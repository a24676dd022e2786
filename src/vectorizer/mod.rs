pub mod tfidf;
pub mod tokenizer;

use std::marker::PhantomData;

use indexmap::IndexMap;
use num::Float;
use rayon::prelude::*;

use crate::utils::sparse::SparseVector;
use crate::vectorizer::tfidf::{DefaultTfIdfEngine, TfIdfEngine};
use crate::vectorizer::tokenizer::tokenize;

/// Terms surviving tokenization across the whole corpus.
///
/// Term ids follow first appearance in corpus order, and each term carries
/// the number of documents it appears in. Built once per corpus, immutable
/// afterwards.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    terms: IndexMap<String, u64>,
    doc_count: u64,
}

impl Vocabulary {
    /// Number of distinct terms.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Total number of documents the vocabulary was fit on,
    /// including documents that contributed no terms.
    pub fn doc_count(&self) -> u64 {
        self.doc_count
    }

    /// Documents containing `term`, 0 for unknown terms.
    pub fn df(&self, term: &str) -> u64 {
        self.terms.get(term).copied().unwrap_or(0)
    }

    pub fn term_id(&self, term: &str) -> Option<u32> {
        self.terms.get_index_of(term).map(|i| i as u32)
    }

    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.terms.keys().map(String::as_str)
    }

    /// Document frequencies in term-id order.
    pub fn document_frequencies(&self) -> impl Iterator<Item = u64> + '_ {
        self.terms.values().copied()
    }

    /// Look up `term`'s id, registering it on first sight,
    /// and count one containing document.
    fn intern(&mut self, term: String) -> u32 {
        let entry = self.terms.entry(term);
        let id = entry.index() as u32;
        *entry.or_insert(0) += 1;
        id
    }
}

/// Batch TF-IDF vectorizer.
///
/// `N` is the weight type (`f32` by default), `E` the weighting engine.
/// One call to [`Vectorizer::fit_transform`] turns an ordered corpus of
/// texts into the vocabulary and one unit-norm vector per document.
#[derive(Debug)]
pub struct Vectorizer<N = f32, E = DefaultTfIdfEngine>
where
    N: Float + Send + Sync,
    E: TfIdfEngine<N>,
{
    _marker: PhantomData<(N, E)>,
}

impl<N, E> Vectorizer<N, E>
where
    N: Float + Send + Sync,
    E: TfIdfEngine<N>,
{
    pub fn fit_transform<S>(texts: &[S]) -> (Vocabulary, Vec<SparseVector<N>>)
    where
        S: AsRef<str> + Sync,
    {
        let mut vocab = Vocabulary {
            terms: IndexMap::new(),
            doc_count: texts.len() as u64,
        };

        // Single sequential pass assigns term ids in first-appearance order
        // and counts document frequencies, one increment per containing doc.
        let mut per_doc: Vec<Vec<(u32, u32)>> = Vec::with_capacity(texts.len());
        for text in texts {
            let mut counts: IndexMap<String, u32> = IndexMap::new();
            for token in tokenize(text.as_ref()) {
                *counts.entry(token).or_insert(0) += 1;
            }
            let mut entries = Vec::with_capacity(counts.len());
            for (term, count) in counts {
                entries.push((vocab.intern(term), count));
            }
            entries.sort_unstable_by_key(|&(id, _)| id);
            per_doc.push(entries);
        }

        let idf = E::idf_vec(&vocab);
        let vectors = per_doc
            .par_iter()
            .map(|counts| E::doc_vec(counts, &idf))
            .collect();
        (vocab, vectors)
    }
}
