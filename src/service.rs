use std::path::Path;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ModelError, QueryError};
use crate::model::Model;
use crate::resolver::DEFAULT_SCORE_CUTOFF;

/// Boundary response for one recommendation query.
///
/// `matched_title` is the canonical title the engine actually used, echoed
/// so callers can see how their input resolved. An empty `recommendations`
/// list with a `matched_title` present means "matched but nothing similar",
/// which is distinct from a failed match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub input_title: String,
    pub matched_title: String,
    pub recommendations: Vec<String>,
}

/// Read-only serving facade around the loaded [`Model`].
///
/// The model is installed exactly once; until then every query fails with
/// [`QueryError::NotReady`]. After installation the state is immutable, so
/// any number of threads may query concurrently without locking.
#[derive(Debug, Default)]
pub struct Recommender {
    model: OnceLock<Model>,
}

impl Recommender {
    pub const fn new() -> Self {
        Self {
            model: OnceLock::new(),
        }
    }

    /// Install an already-built model. The first installation wins; later
    /// calls are ignored and return false.
    pub fn install(&self, model: Model) -> bool {
        let installed = self.model.set(model).is_ok();
        if !installed {
            warn!("model already installed; ignoring replacement");
        }
        installed
    }

    /// Load the artifact at `path` and install it.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<(), ModelError> {
        let model = Model::load(path)?;
        self.install(model);
        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        self.model.get().is_some()
    }

    pub fn model(&self) -> Result<&Model, QueryError> {
        self.model.get().ok_or(QueryError::NotReady)
    }

    /// Resolve user input fuzzily, then rank the `k` most similar titles.
    pub fn recommend(
        &self,
        input_title: &str,
        k: usize,
        cutoff: f64,
    ) -> Result<Recommendation, QueryError> {
        let model = self.model()?;
        let matched_title = model
            .resolve(input_title, cutoff)
            .ok_or_else(|| QueryError::NoMatch {
                input: input_title.to_string(),
            })?
            .to_string();
        let recommendations = model.recommend(&matched_title, k)?;
        Ok(Recommendation {
            input_title: input_title.to_string(),
            matched_title,
            recommendations,
        })
    }

    /// [`Recommender::recommend`] with the default fuzzy cutoff.
    pub fn recommend_default(
        &self,
        input_title: &str,
        k: usize,
    ) -> Result<Recommendation, QueryError> {
        self.recommend(input_title, k, DEFAULT_SCORE_CUTOFF)
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
    fn queries_before_install_are_not_ready() {
        let service = Recommender::new();
        assert!(!service.is_ready());
        assert_eq!(
            service.recommend_default("Alpha Rising", 2).unwrap_err(),
            QueryError::NotReady
        );
    }

    #[test]
    fn fuzzy_input_resolves_and_ranks() {
        let service = Recommender::new();
        assert!(service.install(sample_model()));
        let rec = service.recommend("alpha rising ", 2, 70.0).unwrap();
        assert_eq!(rec.input_title, "alpha rising ");
        assert_eq!(rec.matched_title, "Alpha Rising");
        assert_eq!(rec.recommendations, vec!["Alpha Rise", "Gamma"]);
    }

    #[test]
    fn unresolvable_input_is_echoed_back() {
        let service = Recommender::new();
        service.install(sample_model());
        let err = service.recommend("zzz nonexistent", 2, 70.0).unwrap_err();
        assert_eq!(
            err,
            QueryError::NoMatch {
                input: "zzz nonexistent".to_string()
            }
        );
    }

    #[test]
    fn second_install_is_ignored() {
        let service = Recommender::new();
        assert!(service.install(sample_model()));
        assert!(!service.install(Model::build(CorpusBuilder::new().build(None))));
        // The first model keeps serving.
        assert!(service.recommend_default("Gamma", 1).is_ok());
    }

    #[test]
    fn empty_corpus_serves_no_match_for_everything() {
        let service = Recommender::new();
        service.install(Model::build(CorpusBuilder::new().build(None)));
        assert!(service.is_ready());
        assert!(matches!(
            service.recommend_default("anything", 5),
            Err(QueryError::NoMatch { .. })
        ));
    }

    #[test]
    fn shared_across_threads_without_locking() {
        let service = std::sync::Arc::new(Recommender::new());
        service.install(sample_model());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let service = std::sync::Arc::clone(&service);
                std::thread::spawn(move || {
                    service.recommend_default("Alpha Rising", 2).unwrap()
                })
            })
            .collect();
        for handle in handles {
            let rec = handle.join().unwrap();
            assert_eq!(rec.recommendations, vec!["Alpha Rise", "Gamma"]);
        }
    }
}
