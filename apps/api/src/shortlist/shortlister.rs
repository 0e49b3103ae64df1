//! Shortlister: embeds a query and every candidate, scores by cosine similarity, and
//! splits the result at a threshold.
//!
//! Failure policy:
//! - empty query or out-of-range threshold → `InvalidArgument`, no provider calls
//! - query embedding fails or times out → `UpstreamUnavailable`, no partial result
//! - a candidate's embedding fails, times out, or yields no defined score → the
//!   candidate is logged and excluded; the rest of the batch proceeds

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::inference::{FallbackChain, InferenceClient, InferenceError};
use crate::shortlist::similarity::cosine_similarity;

// ────────────────────────────────────────────────────────────────────────────
// Provider seam
// ────────────────────────────────────────────────────────────────────────────

/// Converts text into a fixed-length vector. Carried as `Arc<dyn EmbeddingProvider>`.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, InferenceError>;
}

#[async_trait]
impl<C> EmbeddingProvider for FallbackChain<C>
where
    C: InferenceClient<Output = Vec<f32>>,
{
    async fn embed(&self, text: &str) -> Result<Vec<f32>, InferenceError> {
        Ok(self.run(text).await?.output)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub id: i32,
    pub display_name: String,
    /// Resume text; may be empty.
    pub document_text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoredCandidate {
    pub candidate: Candidate,
    pub score: f32,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Shortlist {
    /// score > threshold, best first
    pub matching: Vec<ScoredCandidate>,
    /// score <= threshold, best first
    pub not_matching: Vec<ScoredCandidate>,
    /// Candidates dropped because no score could be computed, in input order.
    pub excluded: Vec<i32>,
}

#[derive(Debug, Error)]
pub enum ShortlistError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Embedding provider unavailable: {0}")]
    UpstreamUnavailable(String),
}

impl From<ShortlistError> for AppError {
    fn from(err: ShortlistError) -> Self {
        match err {
            ShortlistError::InvalidArgument(msg) => AppError::Validation(msg),
            ShortlistError::UpstreamUnavailable(msg) => AppError::UpstreamUnavailable(msg),
        }
    }
}

/// Why a single candidate was left out. Logged, never surfaced as a failure.
#[derive(Debug, Error)]
enum CandidateFailure {
    #[error("embedding request failed: {0}")]
    Embedding(#[from] InferenceError),

    #[error("embedding request timed out after {0:?}")]
    Timeout(Duration),

    #[error("similarity is undefined for this embedding")]
    Unscorable,
}

// ────────────────────────────────────────────────────────────────────────────
// Shortlister
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ShortlistSettings {
    pub default_threshold: f32,
    /// Max embedding requests in flight per shortlist call.
    pub max_concurrency: usize,
    /// Applied to every embedding request, query included.
    pub request_timeout: Duration,
}

impl Default for ShortlistSettings {
    fn default() -> Self {
        Self {
            default_threshold: 0.6,
            max_concurrency: 8,
            request_timeout: Duration::from_secs(20),
        }
    }
}

#[derive(Clone)]
pub struct Shortlister {
    provider: Arc<dyn EmbeddingProvider>,
    settings: ShortlistSettings,
}

impl Shortlister {
    pub fn new(provider: Arc<dyn EmbeddingProvider>, settings: ShortlistSettings) -> Self {
        Self { provider, settings }
    }

    pub fn default_threshold(&self) -> f32 {
        self.settings.default_threshold
    }

    /// Checks the caller's arguments without touching the provider.
    pub fn validate(query: &str, threshold: f32) -> Result<(), ShortlistError> {
        if query.trim().is_empty() {
            return Err(ShortlistError::InvalidArgument(
                "query cannot be empty".to_string(),
            ));
        }
        if !threshold.is_finite() || !(-1.0..=1.0).contains(&threshold) {
            return Err(ShortlistError::InvalidArgument(format!(
                "threshold must be within [-1, 1], got {threshold}"
            )));
        }
        Ok(())
    }

    /// Scores every candidate against `query` and partitions them at `threshold`.
    pub async fn shortlist(
        &self,
        query: &str,
        candidates: Vec<Candidate>,
        threshold: f32,
    ) -> Result<Shortlist, ShortlistError> {
        Self::validate(query, threshold)?;

        let timeout = self.settings.request_timeout;
        let query_embedding = match embed_with_timeout(self.provider.as_ref(), query, timeout).await
        {
            Ok(embedding) => Arc::new(embedding),
            Err(failure) => {
                return Err(ShortlistError::UpstreamUnavailable(format!(
                    "query {failure}"
                )))
            }
        };

        let total = candidates.len();
        let provider = Arc::clone(&self.provider);

        // `buffered` keeps input order, which the stable sorts below rely on
        let scored: Vec<(Candidate, Result<f32, CandidateFailure>)> = stream::iter(candidates)
            .map(move |candidate| {
                let provider = Arc::clone(&provider);
                let query_embedding = Arc::clone(&query_embedding);
                async move {
                    let score =
                        score_candidate(provider.as_ref(), &candidate, &query_embedding, timeout)
                            .await;
                    (candidate, score)
                }
            })
            .buffered(self.settings.max_concurrency.max(1))
            .collect()
            .await;

        let mut shortlist = Shortlist::default();
        for (candidate, outcome) in scored {
            match outcome {
                Ok(score) => {
                    let entry = ScoredCandidate { candidate, score };
                    if score > threshold {
                        shortlist.matching.push(entry);
                    } else {
                        shortlist.not_matching.push(entry);
                    }
                }
                Err(failure) => {
                    warn!(
                        "Excluding candidate {} ({}) from shortlist: {failure}",
                        candidate.id, candidate.display_name
                    );
                    shortlist.excluded.push(candidate.id);
                }
            }
        }

        sort_by_score_desc(&mut shortlist.matching);
        sort_by_score_desc(&mut shortlist.not_matching);

        info!(
            "Shortlisted {total} candidate(s) at threshold {threshold}: {} matching, {} not matching, {} excluded",
            shortlist.matching.len(),
            shortlist.not_matching.len(),
            shortlist.excluded.len()
        );

        Ok(shortlist)
    }
}

async fn score_candidate(
    provider: &dyn EmbeddingProvider,
    candidate: &Candidate,
    query_embedding: &[f32],
    timeout: Duration,
) -> Result<f32, CandidateFailure> {
    let embedding = embed_with_timeout(provider, &candidate.document_text, timeout).await?;
    cosine_similarity(query_embedding, &embedding).ok_or(CandidateFailure::Unscorable)
}

async fn embed_with_timeout(
    provider: &dyn EmbeddingProvider,
    text: &str,
    timeout: Duration,
) -> Result<Vec<f32>, CandidateFailure> {
    match tokio::time::timeout(timeout, provider.embed(text)).await {
        Ok(result) => Ok(result?),
        Err(_) => Err(CandidateFailure::Timeout(timeout)),
    }
}

/// Stable: equal scores keep their input order.
fn sort_by_score_desc(entries: &mut [ScoredCandidate]) {
    entries.sort_by(|a, b| b.score.total_cmp(&a.score));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const QUERY: &str = "cloud architecture";

    enum Scripted {
        Vector(Vec<f32>),
        Fail,
        Hang,
    }

    /// Answers by exact text; unknown text fails. Tracks calls and peak concurrency.
    struct ScriptedProvider {
        answers: HashMap<String, Scripted>,
        delay: Duration,
        calls: AtomicUsize,
        in_flight: AtomicUsize,
        peak_in_flight: AtomicUsize,
    }

    impl ScriptedProvider {
        fn new() -> Self {
            Self {
                answers: HashMap::new(),
                delay: Duration::ZERO,
                calls: AtomicUsize::new(0),
                in_flight: AtomicUsize::new(0),
                peak_in_flight: AtomicUsize::new(0),
            }
        }

        fn with(mut self, text: &str, answer: Scripted) -> Self {
            self.answers.insert(text.to_string(), answer);
            self
        }

        fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }
    }

    #[async_trait]
    impl EmbeddingProvider for ScriptedProvider {
        async fn embed(&self, text: &str) -> Result<Vec<f32>, InferenceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }

            let result = match self.answers.get(text) {
                Some(Scripted::Vector(v)) => Ok(v.clone()),
                Some(Scripted::Hang) => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Err(InferenceError::EmptyContent)
                }
                Some(Scripted::Fail) | None => Err(InferenceError::Api {
                    status: 503,
                    message: "unavailable".to_string(),
                }),
            };

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            result
        }
    }

    fn candidate(id: i32, text: &str) -> Candidate {
        Candidate {
            id,
            display_name: format!("Consultant {id}"),
            document_text: text.to_string(),
        }
    }

    /// Unit vector at cosine `score` from the query axis [1, 0].
    fn at_score(score: f32) -> Scripted {
        Scripted::Vector(vec![score, (1.0 - score * score).sqrt()])
    }

    fn shortlister(provider: Arc<ScriptedProvider>) -> Shortlister {
        Shortlister::new(
            provider,
            ShortlistSettings {
                default_threshold: 0.6,
                max_concurrency: 4,
                request_timeout: Duration::from_secs(5),
            },
        )
    }

    fn ids(entries: &[ScoredCandidate]) -> Vec<i32> {
        entries.iter().map(|e| e.candidate.id).collect()
    }

    #[tokio::test]
    async fn test_cloud_architecture_scenario() {
        let provider = Arc::new(
            ScriptedProvider::new()
                .with(QUERY, Scripted::Vector(vec![1.0, 0.0]))
                .with("AWS Lambda and RDS specialist", at_score(0.82))
                .with("Frontend React developer", at_score(0.31)),
        );
        let candidates = vec![
            candidate(1, "AWS Lambda and RDS specialist"),
            candidate(2, "Frontend React developer"),
        ];

        let result = shortlister(provider)
            .shortlist(QUERY, candidates, 0.6)
            .await
            .unwrap();

        assert_eq!(ids(&result.matching), vec![1]);
        assert_eq!(ids(&result.not_matching), vec![2]);
        assert!((result.matching[0].score - 0.82).abs() < 1e-4);
        assert!((result.not_matching[0].score - 0.31).abs() < 1e-4);
        assert!(result.excluded.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timed_out_candidate_is_silently_dropped() {
        let provider = Arc::new(
            ScriptedProvider::new()
                .with(QUERY, Scripted::Vector(vec![1.0, 0.0]))
                .with("AWS Lambda and RDS specialist", at_score(0.82))
                .with("Frontend React developer", Scripted::Hang),
        );
        let candidates = vec![
            candidate(1, "AWS Lambda and RDS specialist"),
            candidate(2, "Frontend React developer"),
        ];

        let result = shortlister(provider)
            .shortlist(QUERY, candidates, 0.6)
            .await
            .unwrap();

        assert_eq!(ids(&result.matching), vec![1]);
        assert!(result.not_matching.is_empty());
        assert_eq!(result.excluded, vec![2]);
    }

    #[tokio::test]
    async fn test_empty_query_issues_no_requests() {
        let provider = Arc::new(ScriptedProvider::new());
        let err = shortlister(provider.clone())
            .shortlist("   ", vec![candidate(1, "anything")], 0.6)
            .await
            .unwrap_err();

        assert!(matches!(err, ShortlistError::InvalidArgument(_)));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_out_of_range_threshold_is_invalid() {
        let provider = Arc::new(ScriptedProvider::new());
        let shortlister = shortlister(provider.clone());

        for threshold in [1.5, -1.01, f32::NAN] {
            let err = shortlister
                .shortlist(QUERY, vec![], threshold)
                .await
                .unwrap_err();
            assert!(matches!(err, ShortlistError::InvalidArgument(_)));
        }
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_query_embedding_failure_is_upstream_unavailable() {
        let provider = Arc::new(
            ScriptedProvider::new()
                .with(QUERY, Scripted::Fail)
                .with("resume", at_score(0.9)),
        );
        let err = shortlister(provider.clone())
            .shortlist(QUERY, vec![candidate(1, "resume")], 0.6)
            .await
            .unwrap_err();

        assert!(matches!(err, ShortlistError::UpstreamUnavailable(_)));
        // no candidate requests after the query failed
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_query_embedding_timeout_is_upstream_unavailable() {
        let provider = Arc::new(ScriptedProvider::new().with(QUERY, Scripted::Hang));
        let err = shortlister(provider)
            .shortlist(QUERY, vec![candidate(1, "resume")], 0.6)
            .await
            .unwrap_err();

        assert!(matches!(err, ShortlistError::UpstreamUnavailable(_)));
    }

    #[tokio::test]
    async fn test_failed_candidate_is_excluded_and_rest_proceed() {
        let provider = Arc::new(
            ScriptedProvider::new()
                .with(QUERY, Scripted::Vector(vec![1.0, 0.0]))
                .with("a", at_score(0.7))
                .with("b", Scripted::Fail)
                .with("c", at_score(0.2)),
        );
        let candidates = vec![candidate(1, "a"), candidate(2, "b"), candidate(3, "c")];

        let result = shortlister(provider)
            .shortlist(QUERY, candidates, 0.6)
            .await
            .unwrap();

        assert_eq!(ids(&result.matching), vec![1]);
        assert_eq!(ids(&result.not_matching), vec![3]);
        assert_eq!(result.excluded, vec![2]);
    }

    #[tokio::test]
    async fn test_zero_vector_candidate_is_excluded() {
        let provider = Arc::new(
            ScriptedProvider::new()
                .with(QUERY, Scripted::Vector(vec![1.0, 0.0]))
                .with("", Scripted::Vector(vec![0.0, 0.0]))
                .with("b", at_score(0.5)),
        );
        let candidates = vec![candidate(1, ""), candidate(2, "b")];

        let result = shortlister(provider)
            .shortlist(QUERY, candidates, 0.6)
            .await
            .unwrap();

        assert!(result.matching.is_empty());
        assert_eq!(ids(&result.not_matching), vec![2]);
        assert_eq!(result.excluded, vec![1]);
    }

    #[tokio::test]
    async fn test_empty_document_is_still_embedded() {
        let provider = Arc::new(
            ScriptedProvider::new()
                .with(QUERY, Scripted::Vector(vec![1.0, 0.0]))
                .with("", at_score(0.1)),
        );
        let result = shortlister(provider.clone())
            .shortlist(QUERY, vec![candidate(1, "")], 0.6)
            .await
            .unwrap();

        assert_eq!(ids(&result.not_matching), vec![1]);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_score_equal_to_threshold_is_not_matching() {
        let provider = Arc::new(
            ScriptedProvider::new()
                .with(QUERY, Scripted::Vector(vec![1.0, 0.0]))
                .with("exact", Scripted::Vector(vec![1.0, 0.0])),
        );
        let result = shortlister(provider)
            .shortlist(QUERY, vec![candidate(1, "exact")], 1.0)
            .await
            .unwrap();

        assert!(result.matching.is_empty());
        assert_eq!(ids(&result.not_matching), vec![1]);
    }

    #[tokio::test]
    async fn test_lists_sorted_desc_with_stable_ties() {
        let provider = Arc::new(
            ScriptedProvider::new()
                .with(QUERY, Scripted::Vector(vec![1.0, 0.0]))
                .with("low", at_score(0.1))
                .with("tie", Scripted::Vector(vec![0.8, 0.6]))
                .with("top", at_score(0.95))
                .with("mid", at_score(0.4)),
        );
        // ids 2, 4 and 5 share the "tie" embedding
        let candidates = vec![
            candidate(1, "low"),
            candidate(2, "tie"),
            candidate(3, "top"),
            candidate(4, "tie"),
            candidate(5, "tie"),
            candidate(6, "mid"),
        ];

        let result = shortlister(provider)
            .shortlist(QUERY, candidates, 0.6)
            .await
            .unwrap();

        assert_eq!(ids(&result.matching), vec![3, 2, 4, 5]);
        assert_eq!(ids(&result.not_matching), vec![6, 1]);
        for list in [&result.matching, &result.not_matching] {
            assert!(list.windows(2).all(|w| w[0].score >= w[1].score));
        }
    }

    #[tokio::test]
    async fn test_outputs_partition_the_input() {
        let mut provider =
            ScriptedProvider::new().with(QUERY, Scripted::Vector(vec![1.0, 0.0]));
        let mut candidates = Vec::new();
        for i in 0..40 {
            let text = format!("resume {i}");
            let score = (i as f32 / 20.0) - 1.0; // -1.0 ..= 0.95
            provider = provider.with(&text, at_score(score));
            candidates.push(candidate(i, &text));
        }

        let result = shortlister(Arc::new(provider))
            .shortlist(QUERY, candidates, 0.0)
            .await
            .unwrap();

        let mut seen: Vec<i32> = ids(&result.matching);
        seen.extend(ids(&result.not_matching));
        seen.sort_unstable();
        assert_eq!(seen, (0..40).collect::<Vec<_>>());
        assert!(result.matching.iter().all(|e| e.score > 0.0));
        assert!(result.not_matching.iter().all(|e| e.score <= 0.0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrency_is_bounded() {
        let mut provider = ScriptedProvider::new()
            .with(QUERY, Scripted::Vector(vec![1.0, 0.0]))
            .with_delay(Duration::from_millis(50));
        let mut candidates = Vec::new();
        for i in 0..20 {
            let text = format!("resume {i}");
            provider = provider.with(&text, at_score(0.5));
            candidates.push(candidate(i, &text));
        }
        let provider = Arc::new(provider);

        let shortlister = Shortlister::new(
            provider.clone(),
            ShortlistSettings {
                default_threshold: 0.6,
                max_concurrency: 3,
                request_timeout: Duration::from_secs(5),
            },
        );
        let result = shortlister.shortlist(QUERY, candidates, 0.6).await.unwrap();

        assert_eq!(result.not_matching.len(), 20);
        assert!(provider.peak_in_flight.load(Ordering::SeqCst) <= 3);
    }

    #[test]
    fn test_shortlist_error_maps_to_app_error() {
        let app: AppError = ShortlistError::InvalidArgument("x".into()).into();
        assert!(matches!(app, AppError::Validation(_)));
        let app: AppError = ShortlistError::UpstreamUnavailable("x".into()).into();
        assert!(matches!(app, AppError::UpstreamUnavailable(_)));
    }
}
