/// This crate is a content-based movie recommendation engine.
/// It turns a catalog of title/description pairs into a TF-IDF vector space,
/// precomputes the dense pairwise cosine-similarity matrix, and serves
/// ranked "movies like this one" queries over it, with fuzzy resolution of
/// imprecise user titles to exact catalog entries.
pub mod corpus;
pub mod error;
pub mod model;
pub mod resolver;
pub mod service;
pub mod similarity;
pub mod title_index;
pub mod utils;
pub mod vectorizer;

/// Built recommendation model.
/// One owned aggregate of the deduplicated corpus, the title index and the
/// similarity matrix, all constructed from the same corpus ordering so the
/// index can never drift from the matrix rows.
///
/// # Serialization
/// Persisted as a single versioned CBOR artifact via `save`/`load` (or
/// `to_writer`/`from_reader`); an artifact with a different schema version
/// is rejected at load time.
pub use model::Model;

/// Read-only serving facade.
/// Holds the model behind a write-once initialization gate: queries before
/// the artifact is installed fail with `QueryError::NotReady`, afterwards
/// the state is immutable and safe to share across threads without locking.
pub use service::{Recommendation, Recommender};

/// Corpus ingestion.
/// `CorpusBuilder` accumulates records from one or more CSV sources,
/// deduplicates by title (first seen wins) and optionally caps the corpus
/// to the most popular records before the build.
pub use corpus::{Corpus, CorpusBuilder, CsvColumns, Document};

/// Batch TF-IDF vectorizer.
/// Generic over the weight type (`f32` by default) and the weighting
/// engine; `DefaultTfIdfEngine` performs textbook `tf * ln(N/df)` weighting
/// with per-document L2 normalization.
pub use vectorizer::tfidf::{DefaultTfIdfEngine, TfIdfEngine};
pub use vectorizer::{Vectorizer, Vocabulary};

/// Dense symmetric cosine-similarity matrix over all document vectors.
pub use similarity::SimilarityMatrix;

/// Title-to-matrix-row lookup table.
pub use title_index::TitleIndex;

/// Error taxonomy.
/// `ModelError` covers artifact build/load failures (fatal to serving
/// start), `IngestError` covers CSV ingestion, and `QueryError` carries the
/// per-query conditions the boundary layer maps to client responses.
pub use error::{IngestError, ModelError, QueryError};
