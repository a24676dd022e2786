use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::IngestError;

/// One catalog entry. Identity is the title; the text feeds the vector space
/// and may be empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub title: String,
    pub text: String,
}

/// Deduplicated catalog in final build order.
///
/// Indices `0..N-1` in this order are the join key between the title index
/// and the similarity matrix; any change here requires a full rebuild.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Corpus {
    documents: Vec<Document>,
}

impl Corpus {
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Document> {
        self.documents.get(index)
    }

    pub fn documents(&self) -> impl Iterator<Item = &Document> {
        self.documents.iter()
    }
}

/// Which CSV header names carry the corpus fields.
///
/// `popularity` enables the optional build-time cap ranking; set it to
/// `None` to ingest without a popularity signal.
#[derive(Debug, Clone)]
pub struct CsvColumns {
    pub title: String,
    pub text: String,
    pub popularity: Option<String>,
}

impl Default for CsvColumns {
    fn default() -> Self {
        Self {
            title: "title".to_string(),
            text: "overview".to_string(),
            popularity: Some("vote_count".to_string()),
        }
    }
}

/// Accumulates raw records, deduplicates by title (first seen wins) and
/// produces the final [`Corpus`].
///
/// Multiple CSV sources may be ingested back to back; ingestion order is the
/// dedup precedence order.
#[derive(Debug, Default)]
pub struct CorpusBuilder {
    records: Vec<(Document, f64)>,
    seen: HashSet<String>,
}

impl CorpusBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one raw record with a popularity signal.
    /// Returns false when the title is empty or already present.
    pub fn push_with_popularity(
        &mut self,
        title: impl Into<String>,
        text: impl Into<String>,
        popularity: f64,
    ) -> bool {
        let title = title.into();
        let title = title.trim().to_string();
        if title.is_empty() || !self.seen.insert(title.clone()) {
            return false;
        }
        self.records.push((
            Document {
                title,
                text: text.into(),
            },
            popularity,
        ));
        true
    }

    /// Add one raw record without a popularity signal.
    pub fn push(&mut self, title: impl Into<String>, text: impl Into<String>) -> bool {
        self.push_with_popularity(title, text, 0.0)
    }

    /// Ingest a CSV stream. Rows with an empty title are skipped; an
    /// unparsable popularity value counts as 0. Returns the number of
    /// records accepted (post-dedup).
    pub fn read_csv<R: Read>(&mut self, reader: R, columns: &CsvColumns) -> Result<usize, IngestError> {
        let mut csv = csv::Reader::from_reader(reader);
        let headers = csv.headers()?.clone();
        let find = |name: &str| headers.iter().position(|h| h == name);

        let title_at = find(&columns.title)
            .ok_or_else(|| IngestError::MissingColumn(columns.title.clone()))?;
        let text_at = find(&columns.text)
            .ok_or_else(|| IngestError::MissingColumn(columns.text.clone()))?;
        let popularity_at = match &columns.popularity {
            Some(name) => {
                Some(find(name).ok_or_else(|| IngestError::MissingColumn(name.clone()))?)
            }
            None => None,
        };

        let mut accepted = 0usize;
        for record in csv.records() {
            let record = record?;
            let title = record.get(title_at).unwrap_or("");
            let text = record.get(text_at).unwrap_or("");
            let popularity = popularity_at
                .and_then(|at| record.get(at))
                .and_then(|raw| raw.trim().parse::<f64>().ok())
                .unwrap_or(0.0);
            if self.push_with_popularity(title, text, popularity) {
                accepted += 1;
            }
        }
        debug!(accepted, "ingested csv source");
        Ok(accepted)
    }

    /// Ingest a CSV file from disk.
    pub fn read_csv_path(
        &mut self,
        path: impl AsRef<Path>,
        columns: &CsvColumns,
    ) -> Result<usize, IngestError> {
        let file = File::open(path.as_ref())?;
        let accepted = self.read_csv(file, columns)?;
        info!(path = %path.as_ref().display(), accepted, "loaded corpus csv");
        Ok(accepted)
    }

    /// Finalize the corpus.
    ///
    /// With a cap, records are stably sorted by descending popularity before
    /// truncation, so equally popular rows keep ingestion order and the
    /// sorted order becomes the final corpus order. Without a cap, ingestion
    /// order is the final order.
    pub fn build(self, cap: Option<usize>) -> Corpus {
        let mut records = self.records;
        if let Some(cap) = cap {
            records.sort_by(|a, b| b.1.total_cmp(&a.1));
            records.truncate(cap);
        }
        let documents: Vec<Document> = records.into_iter().map(|(doc, _)| doc).collect();
        info!(documents = documents.len(), "corpus finalized");
        Corpus { documents }
    }
}
