use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::corpus::Corpus;
use crate::error::{ModelError, QueryError};
use crate::resolver;
use crate::similarity::SimilarityMatrix;
use crate::title_index::TitleIndex;
use crate::vectorizer::Vectorizer;

/// Schema tag written into every artifact. A serving process refuses to load
/// artifacts carrying a different tag.
pub const FORMAT_VERSION: u32 = 1;

/// Default number of titles returned per query.
pub const DEFAULT_RECOMMENDATIONS: usize = 10;

/// The built recommendation model: corpus, title index and similarity matrix
/// as one owned aggregate.
///
/// The three parts are constructed together from one corpus ordering and
/// serialized together, so the title index can never drift from the matrix
/// rows. The model is immutable once built; a new corpus means a full
/// rebuild, never an in-place patch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    corpus: Corpus,
    title_index: TitleIndex,
    matrix: SimilarityMatrix,
}

#[derive(Serialize)]
struct ArtifactRecordRef<'a> {
    version: u32,
    corpus: &'a Corpus,
    title_index: &'a TitleIndex,
    matrix: &'a SimilarityMatrix,
}

#[derive(Deserialize)]
struct ArtifactRecord {
    version: u32,
    corpus: Corpus,
    title_index: TitleIndex,
    matrix: SimilarityMatrix,
}

#[derive(Deserialize)]
struct VersionProbe {
    version: u32,
}

impl Model {
    /// Run the full offline build: vectorize every description, compute the
    /// pairwise similarity matrix and index the titles, all from the same
    /// corpus order.
    pub fn build(corpus: Corpus) -> Self {
        let texts: Vec<&str> = corpus.documents().map(|d| d.text.as_str()).collect();
        let (vocab, vectors) = Vectorizer::<f32>::fit_transform(&texts);
        info!(
            documents = corpus.len(),
            vocabulary = vocab.len(),
            "vector space built"
        );
        let matrix = SimilarityMatrix::build(&vectors);
        info!(rows = matrix.len(), "similarity matrix built");
        let title_index =
            TitleIndex::from_titles(corpus.documents().map(|d| d.title.clone()));
        Self {
            corpus,
            title_index,
            matrix,
        }
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn title_index(&self) -> &TitleIndex {
        &self.title_index
    }

    pub fn matrix(&self) -> &SimilarityMatrix {
        &self.matrix
    }

    /// Fuzzily map user input to a canonical title.
    pub fn resolve(&self, input: &str, cutoff: f64) -> Option<&str> {
        resolver::resolve(self.title_index.titles(), input, cutoff)
    }

    /// The `k` titles most similar to an exact catalog title.
    ///
    /// Fails with [`QueryError::UnknownTitle`] when `title` is not an exact
    /// index key; fuzzy resolution is deliberately not attempted here.
    /// Results are ordered by descending similarity, ties broken by
    /// ascending build order, and never include the queried title. Fewer
    /// than `k` titles come back when the catalog is smaller than `k + 1`.
    pub fn recommend(&self, title: &str, k: usize) -> Result<Vec<String>, QueryError> {
        let position = self
            .title_index
            .position(title)
            .ok_or_else(|| QueryError::UnknownTitle(title.to_string()))?;

        let row = self.matrix.row(position);
        let mut ranked: Vec<(usize, f32)> = row
            .iter()
            .copied()
            .enumerate()
            .filter(|&(j, _)| j != position)
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(k);

        Ok(ranked
            .into_iter()
            .filter_map(|(j, _)| self.title_index.title_at(j).map(str::to_string))
            .collect())
    }

    /// Serialize as one versioned CBOR artifact.
    pub fn to_writer<W: Write>(&self, writer: W) -> Result<(), ModelError> {
        let record = ArtifactRecordRef {
            version: FORMAT_VERSION,
            corpus: &self.corpus,
            title_index: &self.title_index,
            matrix: &self.matrix,
        };
        serde_cbor::to_writer(writer, &record)?;
        Ok(())
    }

    /// Load an artifact, rejecting unknown schema versions before decoding
    /// the payload.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self, ModelError> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        let probe: VersionProbe = serde_cbor::from_slice(&bytes)?;
        if probe.version != FORMAT_VERSION {
            return Err(ModelError::Version {
                found: probe.version,
                expected: FORMAT_VERSION,
            });
        }
        let record: ArtifactRecord = serde_cbor::from_slice(&bytes)?;
        Ok(Self {
            corpus: record.corpus,
            title_index: record.title_index,
            matrix: record.matrix,
        })
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ModelError> {
        let file = File::create(path.as_ref())?;
        self.to_writer(BufWriter::new(file))?;
        info!(path = %path.as_ref().display(), "model artifact written");
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let file = File::open(path.as_ref())?;
        let model = Self::from_reader(BufReader::new(file))?;
        info!(
            path = %path.as_ref().display(),
            documents = model.corpus.len(),
            "model artifact loaded"
        );
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::CorpusBuilder;

    fn sample_model() -> Model {
        let mut builder = CorpusBuilder::new();
        builder.push("Alpha Rising", "a hero saves the world");
        builder.push("Alpha Rise", "a hero saves the planet");
        builder.push("Gamma", "an unrelated romance");
        Model::build(builder.build(None))
    }

    #[test]
    fn recommend_ranks_overlapping_description_first() {
        let model = sample_model();
        let recs = model.recommend("Alpha Rising", 2).unwrap();
        assert_eq!(recs, vec!["Alpha Rise", "Gamma"]);
    }

    #[test]
    fn recommend_never_includes_the_queried_title() {
        let model = sample_model();
        for title in ["Alpha Rising", "Alpha Rise", "Gamma"] {
            let recs = model.recommend(title, 10).unwrap();
            assert!(!recs.iter().any(|r| r == title));
            assert_eq!(recs.len(), 2, "min(k, n - 1) titles expected");
        }
    }

    #[test]
    fn recommend_is_sorted_with_build_order_tie_break() {
        let model = sample_model();
        let matrix = model.matrix();
        let index = model.title_index();
        for i in 0..index.len() {
            let title = index.title_at(i).unwrap();
            let recs = model.recommend(title, 10).unwrap();
            let scores: Vec<f32> = recs
                .iter()
                .map(|t| matrix.get(i, index.position(t).unwrap()))
                .collect();
            for pair in scores.windows(2) {
                assert!(pair[0] >= pair[1], "row {i} not sorted: {scores:?}");
            }
            // Equal scores must come back in ascending build order.
            for pair in recs.windows(2) {
                let (a, b) = (
                    index.position(&pair[0]).unwrap(),
                    index.position(&pair[1]).unwrap(),
                );
                let (sa, sb) = (matrix.get(i, a), matrix.get(i, b));
                if sa == sb {
                    assert!(a < b, "tie not broken by build order in row {i}");
                }
            }
        }
    }

    #[test]
    fn unknown_exact_title_is_an_error() {
        let model = sample_model();
        let err = model.recommend("alpha rising", 2).unwrap_err();
        assert_eq!(err, QueryError::UnknownTitle("alpha rising".to_string()));
    }

    #[test]
    fn zero_vector_document_falls_back_to_build_order() {
        let mut builder = CorpusBuilder::new();
        builder.push("Blank", "");
        builder.push("First", "hero saves world");
        builder.push("Second", "quiet romance");
        builder.push("Third", "space opera finale");
        let model = Model::build(builder.build(None));
        // Every similarity in Blank's row is 0, so the top-k are simply the
        // first documents in build order.
        let recs = model.recommend("Blank", 2).unwrap();
        assert_eq!(recs, vec!["First", "Second"]);
    }

    #[test]
    fn small_catalog_returns_fewer_than_k() {
        let mut builder = CorpusBuilder::new();
        builder.push("Only", "a single film");
        let model = Model::build(builder.build(None));
        assert!(model.recommend("Only", 10).unwrap().is_empty());
    }

    #[test]
    fn fuzzy_resolve_then_recommend_round_trip() {
        let model = sample_model();
        let matched = model.resolve("alpha rising ", 70.0).unwrap();
        assert_eq!(matched, "Alpha Rising");
        let matched = matched.to_string();
        assert!(model.recommend(&matched, 2).is_ok());
        assert_eq!(model.resolve("zzz nonexistent", 70.0), None);
    }

    #[test]
    fn artifact_round_trips_through_cbor() {
        let model = sample_model();
        let mut bytes = Vec::new();
        model.to_writer(&mut bytes).unwrap();
        let restored = Model::from_reader(bytes.as_slice()).unwrap();
        assert_eq!(restored, model);
        assert_eq!(
            restored.recommend("Alpha Rising", 2).unwrap(),
            vec!["Alpha Rise", "Gamma"]
        );
    }

    #[test]
    fn artifacts_are_byte_identical_across_rebuilds() {
        let mut first = Vec::new();
        sample_model().to_writer(&mut first).unwrap();
        let mut second = Vec::new();
        sample_model().to_writer(&mut second).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn incompatible_artifact_version_is_rejected() {
        #[derive(Serialize)]
        struct FutureArtifact<'a> {
            version: u32,
            corpus: &'a Corpus,
            title_index: &'a TitleIndex,
            matrix: &'a SimilarityMatrix,
        }
        let model = sample_model();
        let bytes = serde_cbor::to_vec(&FutureArtifact {
            version: FORMAT_VERSION + 1,
            corpus: model.corpus(),
            title_index: model.title_index(),
            matrix: model.matrix(),
        })
        .unwrap();
        let err = Model::from_reader(bytes.as_slice()).unwrap_err();
        assert!(matches!(
            err,
            ModelError::Version { found, expected }
                if found == FORMAT_VERSION + 1 && expected == FORMAT_VERSION
        ));
    }

    #[test]
    fn garbage_bytes_are_a_codec_error() {
        let err = Model::from_reader(&b"not cbor at all"[..]).unwrap_err();
        assert!(matches!(err, ModelError::Codec(_)));
    }

    #[test]
    fn empty_corpus_builds_an_empty_model() {
        let model = Model::build(CorpusBuilder::new().build(None));
        assert!(model.title_index().is_empty());
        assert!(model.matrix().is_empty());
        assert_eq!(model.resolve("anything", 70.0), None);
        assert!(matches!(
            model.recommend("anything", 5),
            Err(QueryError::UnknownTitle(_))
        ));
    }
}
