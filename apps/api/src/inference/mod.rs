//! Inference: the single point of entry for all remote model calls.
//!
//! Text generation and embedding are the same capability with different outputs:
//! send text to a hosted model, get something back. Both go through an
//! [`InferenceClient`] wrapped in a [`FallbackChain`] that walks an ordered list of
//! model ids until one succeeds.
//!
//! No other module may call a model API directly.

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, warn};

pub mod gemini;

/// One failed attempt inside a fallback chain.
#[derive(Debug, Clone)]
pub struct ModelFailure {
    pub model: String,
    pub error: String,
}

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("Model returned empty content")]
    EmptyContent,

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("All models failed: {}", describe_failures(.0))]
    Exhausted(Vec<ModelFailure>),
}

fn describe_failures(failures: &[ModelFailure]) -> String {
    if failures.is_empty() {
        return "no models configured".to_string();
    }
    failures
        .iter()
        .map(|f| format!("{} ({})", f.model, f.error))
        .collect::<Vec<_>>()
        .join("; ")
}

/// A remote text-to-X model endpoint. `model` selects which hosted model serves the call.
#[async_trait]
pub trait InferenceClient: Send + Sync {
    type Output: Send;

    /// Short label used in logs, e.g. "generate" or "embed".
    fn capability(&self) -> &'static str;

    async fn infer(&self, model: &str, input: &str) -> Result<Self::Output, InferenceError>;
}

/// Output of a successful chain run, tagged with the model that produced it.
#[derive(Debug, Clone)]
pub struct Completion<T> {
    pub model: String,
    pub output: T,
}

/// Ordered list of models tried in sequence against one client.
#[derive(Debug, Clone)]
pub struct FallbackChain<C> {
    client: C,
    models: Vec<String>,
}

impl<C: InferenceClient> FallbackChain<C> {
    pub fn new(client: C, models: Vec<String>) -> Self {
        Self { client, models }
    }

    pub fn models(&self) -> &[String] {
        &self.models
    }

    /// Runs `input` against each model in order and returns the first success.
    /// Fails with `Exhausted` only after every model has failed.
    pub async fn run(&self, input: &str) -> Result<Completion<C::Output>, InferenceError> {
        let mut failures = Vec::with_capacity(self.models.len());

        for model in &self.models {
            debug!("Trying {} model: {model}", self.client.capability());
            match self.client.infer(model, input).await {
                Ok(output) => {
                    if !failures.is_empty() {
                        debug!(
                            "{} succeeded on fallback model {model} after {} failure(s)",
                            self.client.capability(),
                            failures.len()
                        );
                    }
                    return Ok(Completion {
                        model: model.clone(),
                        output,
                    });
                }
                Err(e) => {
                    warn!("{} model {model} failed: {e}", self.client.capability());
                    failures.push(ModelFailure {
                        model: model.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        Err(InferenceError::Exhausted(failures))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fails for every model listed in `broken`, echoes the input otherwise.
    struct ScriptedClient {
        broken: Vec<&'static str>,
        calls: AtomicUsize,
    }

    impl ScriptedClient {
        fn new(broken: Vec<&'static str>) -> Self {
            Self {
                broken,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl InferenceClient for ScriptedClient {
        type Output = String;

        fn capability(&self) -> &'static str {
            "generate"
        }

        async fn infer(&self, model: &str, input: &str) -> Result<String, InferenceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.broken.iter().any(|b| *b == model) {
                return Err(InferenceError::Api {
                    status: 404,
                    message: format!("{model} not found"),
                });
            }
            Ok(format!("{model}:{input}"))
        }
    }

    fn models(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_first_model_wins_when_healthy() {
        let chain = FallbackChain::new(ScriptedClient::new(vec![]), models(&["a", "b"]));
        let completion = chain.run("hi").await.unwrap();
        assert_eq!(completion.model, "a");
        assert_eq!(completion.output, "a:hi");
        assert_eq!(chain.client.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_falls_back_to_next_model() {
        let chain = FallbackChain::new(ScriptedClient::new(vec!["a"]), models(&["a", "b"]));
        let completion = chain.run("hi").await.unwrap();
        assert_eq!(completion.model, "b");
        assert_eq!(chain.client.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_exhausted_lists_every_failure() {
        let chain = FallbackChain::new(
            ScriptedClient::new(vec!["a", "b"]),
            models(&["a", "b"]),
        );
        match chain.run("hi").await {
            Err(InferenceError::Exhausted(failures)) => {
                let names: Vec<_> = failures.iter().map(|f| f.model.as_str()).collect();
                assert_eq!(names, vec!["a", "b"]);
            }
            other => panic!("expected Exhausted, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_chain_is_exhausted() {
        let chain = FallbackChain::new(ScriptedClient::new(vec![]), vec![]);
        let err = chain.run("hi").await.unwrap_err();
        assert!(err.to_string().contains("no models configured"));
    }
}
