// src/summarizer.rs
// Remote summarization caller.
// One POST per chunk against a hosted inference endpoint, bounded retry on
// transport failures, and a tagged outcome instead of a raised error.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::InferenceConfig;
use crate::error::ConfigError;

/// Prefix shared by every rendered failure.
pub const FAILURE_MARKER: &str = "⚠️";

/// Response bodies are cut to this many characters before they are echoed back.
pub const MAX_ECHOED_BODY_CHARS: usize = 200;

pub const DEFAULT_MIN_LENGTH: u32 = 20;
pub const DEFAULT_MAX_LENGTH: u32 = 120;

/// Length bounds forwarded to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryBounds {
    pub min_length: u32,
    pub max_length: u32,
}

impl Default for SummaryBounds {
    fn default() -> Self {
        Self {
            min_length: DEFAULT_MIN_LENGTH,
            max_length: DEFAULT_MAX_LENGTH,
        }
    }
}

impl SummaryBounds {
    pub fn new(min_length: u32, max_length: u32) -> Result<Self, ConfigError> {
        if min_length > max_length {
            return Err(ConfigError::InvalidBounds {
                min: min_length,
                max: max_length,
            });
        }
        Ok(Self {
            min_length,
            max_length,
        })
    }

    /// Bounds for the second pass over the joined chunk summaries.
    pub fn condensed(&self) -> Self {
        Self {
            min_length: 30,
            max_length: (self.max_length / 2).max(80),
        }
    }
}

/// Why a single chunk produced no summary.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SummaryFailure {
    #[error("⚠️ Network error: {message} (after {attempts} attempts)")]
    Transport { attempts: u32, message: String },

    #[error("⚠️ HF error {status}: {body}")]
    Endpoint { status: u16, body: String },

    #[error("⚠️ Unexpected HF response: {body}")]
    UnexpectedShape { body: String },

    #[error("⚠️ Response parse error: {message}")]
    Parse { message: String },
}

/// Result of summarizing one piece of text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SummaryOutcome {
    Success { summary: String },
    Failure { error: SummaryFailure },
}

impl SummaryOutcome {
    pub fn success(summary: impl Into<String>) -> Self {
        Self::Success {
            summary: summary.into(),
        }
    }

    pub fn failure(error: SummaryFailure) -> Self {
        Self::Failure { error }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure { .. })
    }

    pub fn failure_reason(&self) -> Option<&SummaryFailure> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { error } => Some(error),
        }
    }

    /// Text shown to the user: the summary, or the failure message.
    pub fn rendered(&self) -> String {
        match self {
            Self::Success { summary } => summary.clone(),
            Self::Failure { error } => error.to_string(),
        }
    }
}

/// Anything that can turn a piece of text into a summary.
#[async_trait::async_trait]
pub trait Summarizer: Send + Sync {
    /// Never fails: every problem is reported through the outcome.
    async fn summarize(&self, text: &str, bounds: SummaryBounds) -> SummaryOutcome;
    fn model_name(&self) -> &str;
}

#[derive(Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
    parameters: GenerationParameters,
}

#[derive(Serialize)]
struct GenerationParameters {
    min_length: u32,
    max_length: u32,
    do_sample: bool,
}

pub(crate) fn truncate_chars(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}

/// Interpret a 2xx body: a list whose first element carries `summary_text`.
pub fn parse_summary_body(body: &str) -> SummaryOutcome {
    let data: Value = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(e) => {
            return SummaryOutcome::failure(SummaryFailure::Parse {
                message: e.to_string(),
            })
        }
    };

    let summary = data
        .as_array()
        .and_then(|items| items.first())
        .and_then(|first| first.get("summary_text"))
        .and_then(Value::as_str);

    match summary {
        Some(text) => SummaryOutcome::success(text),
        None => SummaryOutcome::failure(SummaryFailure::UnexpectedShape {
            body: truncate_chars(&data.to_string(), MAX_ECHOED_BODY_CHARS),
        }),
    }
}

/// Hosted inference endpoint client (Hugging Face router API shape).
pub struct HfInferenceClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    max_attempts: u32,
    retry_delay: Duration,
}

impl HfInferenceClient {
    pub fn from_config(config: &InferenceConfig) -> Result<Self, ConfigError> {
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::MissingCredential)?
            .to_string();

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        info!(model = %config.model, endpoint = %config.endpoint_url(), "Inference client ready");
        Ok(Self {
            client,
            endpoint: config.endpoint_url(),
            api_key,
            model: config.model.clone(),
            max_attempts: config.max_attempts.max(1),
            retry_delay: config.retry_delay,
        })
    }

    /// Turn a fully read response into an outcome. Non-2xx is never retried.
    fn interpret(status: reqwest::StatusCode, body: &str) -> SummaryOutcome {
        if !status.is_success() {
            warn!(status = status.as_u16(), "Inference endpoint rejected request");
            return SummaryOutcome::failure(SummaryFailure::Endpoint {
                status: status.as_u16(),
                body: truncate_chars(body, MAX_ECHOED_BODY_CHARS),
            });
        }

        parse_summary_body(body)
    }
}

#[async_trait::async_trait]
impl Summarizer for HfInferenceClient {
    async fn summarize(&self, text: &str, bounds: SummaryBounds) -> SummaryOutcome {
        let payload = InferenceRequest {
            inputs: text,
            parameters: GenerationParameters {
                min_length: bounds.min_length,
                max_length: bounds.max_length,
                do_sample: false,
            },
        };

        let mut last_error = String::new();
        for attempt in 1..=self.max_attempts {
            debug!(attempt, input_len = text.len(), "Posting to inference endpoint");
            let sent = self
                .client
                .post(&self.endpoint)
                .bearer_auth(&self.api_key)
                .json(&payload)
                .send()
                .await;

            // The client timeout covers the body too, so a stalled body read
            // is a transport failure like a stalled connect.
            let received = match sent {
                Ok(response) => {
                    let status = response.status();
                    response.text().await.map(|body| (status, body))
                }
                Err(e) => Err(e),
            };

            match received {
                Ok((status, body)) => {
                    let outcome = Self::interpret(status, &body);
                    if let Some(reason) = outcome.failure_reason() {
                        warn!(attempt, error = %reason, "Summarization failed");
                    } else {
                        debug!(attempt, "Summarization complete");
                    }
                    return outcome;
                }
                Err(e) => {
                    warn!(attempt, max_attempts = self.max_attempts, error = %e, "Transport failure");
                    last_error = e.to_string();
                    if attempt < self.max_attempts && !self.retry_delay.is_zero() {
                        tokio::time::sleep(self.retry_delay).await;
                    }
                }
            }
        }

        SummaryOutcome::failure(SummaryFailure::Transport {
            attempts: self.max_attempts,
            message: last_error,
        })
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
