//! Gemini REST backends for text generation and embeddings.
//!
//! Both clients share one [`GeminiTransport`], which owns the HTTP client, the API
//! key and the retry policy. Retries cover 429 and 5xx; other 4xx fail immediately so
//! the fallback chain can move on to the next model.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, warn};

use super::{InferenceClient, InferenceError};

const API_VERSION: &str = "v1beta";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
const MAX_RETRIES: u32 = 3;
const RETRY_BACKOFF: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone)]
pub struct GeminiTransport {
    client: Client,
    api_key: String,
    base_url: String,
    max_retries: u32,
    retry_backoff: Duration,
}

impl GeminiTransport {
    pub fn new(api_key: impl Into<String>, base_url: &str) -> Result<Self, InferenceError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
            max_retries: MAX_RETRIES,
            retry_backoff: RETRY_BACKOFF,
        })
    }

    /// Overrides the retry policy. `max_retries` counts total attempts.
    pub fn with_retry_policy(mut self, max_retries: u32, retry_backoff: Duration) -> Self {
        self.max_retries = max_retries.max(1);
        self.retry_backoff = retry_backoff;
        self
    }

    fn endpoint(&self, model: &str, method: &str) -> String {
        format!("{}/{API_VERSION}/models/{model}:{method}", self.base_url)
    }

    /// POSTs `body` to `url`, retrying 429 and 5xx with exponential backoff.
    async fn post<B, R>(&self, url: &str, body: &B) -> Result<R, InferenceError>
    where
        B: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        let mut last_error: Option<InferenceError> = None;

        for attempt in 0..self.max_retries {
            if attempt > 0 {
                // 1x, 2x, 4x the base delay
                let delay = self.retry_backoff * (1 << (attempt - 1));
                warn!(
                    "Gemini call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(url)
                .header("x-goog-api-key", &self.api_key)
                .header("content-type", "application/json")
                .json(body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(InferenceError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("Gemini API returned {}: {}", status, body);
                last_error = Some(InferenceError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<GeminiError>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(InferenceError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let text = response.text().await?;
            return serde_json::from_str(&text)
                .map_err(|e| InferenceError::Malformed(e.to_string()));
        }

        Err(last_error.unwrap_or(InferenceError::RateLimited {
            retries: self.max_retries,
        }))
    }
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}

/// Non-text parts (e.g. `functionCall`) deserialize with empty text.
#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

impl Content {
    fn user_text(text: &str) -> Self {
        Self {
            role: Some("user".to_string()),
            parts: vec![Part {
                text: text.to_string(),
            }],
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Text generation
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<GenerateCandidate>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct GenerateCandidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate.
    fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content.parts.iter().map(|p| p.text.as_str()).collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

/// `:generateContent` client. Output is the model's raw text.
#[derive(Debug, Clone)]
pub struct GeminiGenerator {
    transport: GeminiTransport,
}

impl GeminiGenerator {
    pub fn new(transport: GeminiTransport) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl InferenceClient for GeminiGenerator {
    type Output = String;

    fn capability(&self) -> &'static str {
        "generate"
    }

    async fn infer(&self, model: &str, input: &str) -> Result<String, InferenceError> {
        let request = GenerateRequest {
            contents: vec![Content::user_text(input)],
        };
        let url = self.transport.endpoint(model, "generateContent");
        let response: GenerateResponse = self.transport.post(&url, &request).await?;

        if let Some(usage) = &response.usage_metadata {
            debug!(
                "Gemini generate succeeded: model={model}, prompt_tokens={}, output_tokens={}",
                usage.prompt_token_count, usage.candidates_token_count
            );
        }

        response.text().ok_or(InferenceError::EmptyContent)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Embeddings
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct EmbedRequest {
    model: String,
    content: Content,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embedding: EmbeddingValues,
}

#[derive(Debug, Deserialize)]
struct EmbeddingValues {
    values: Vec<f32>,
}

/// `:embedContent` client. Output is the embedding vector.
#[derive(Debug, Clone)]
pub struct GeminiEmbedder {
    transport: GeminiTransport,
}

impl GeminiEmbedder {
    pub fn new(transport: GeminiTransport) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl InferenceClient for GeminiEmbedder {
    type Output = Vec<f32>;

    fn capability(&self) -> &'static str {
        "embed"
    }

    async fn infer(&self, model: &str, input: &str) -> Result<Vec<f32>, InferenceError> {
        let request = EmbedRequest {
            model: format!("models/{model}"),
            content: Content {
                role: None,
                parts: vec![Part {
                    text: input.to_string(),
                }],
            },
        };
        let url = self.transport.endpoint(model, "embedContent");
        let response: EmbedResponse = self.transport.post(&url, &request).await?;

        let values = response.embedding.values;
        if values.is_empty() {
            return Err(InferenceError::EmptyContent);
        }
        Ok(values)
    }
}
