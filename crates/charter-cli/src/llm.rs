//! OpenAI-compatible completion backend.
//!
//! Sends each prompt as a single user message to `{base_url}/chat/completions`
//! and returns the first choice's text. Transient HTTP failures are retried
//! with exponential backoff.

use std::time::Duration;

use async_trait::async_trait;
use charter_core::{Completion, CompletionError, CompletionSettings};
use log::{debug, warn};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

/// Maximum number of retries for transient errors
const MAX_RETRIES: u32 = 3;

/// Initial backoff delay for retries
const INITIAL_BACKOFF_MS: u64 = 500;

fn is_retryable_status(status: u16) -> bool {
    matches!(status, 408 | 429 | 500 | 502 | 503 | 504)
}

/// Completion client for OpenAI-style chat endpoints.
pub struct OpenAiCompletion {
    model: String,
    api_key: Option<String>,
    base_url: String,
    max_tokens: u32,
    http: Client,
}

impl OpenAiCompletion {
    /// Build a client from configuration. The API key is read from the
    /// environment variable named in the settings; local endpoints often need
    /// none, so a missing key is only logged.
    pub fn from_settings(settings: &CompletionSettings) -> Result<Self, CompletionError> {
        let api_key = std::env::var(&settings.api_key_env).ok();
        if api_key.is_none() {
            warn!(
                "{} is not set, sending completion requests without an API key",
                settings.api_key_env
            );
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| CompletionError::Request(e.to_string()))?;

        Ok(Self {
            model: settings.model.clone(),
            api_key,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            max_tokens: settings.max_tokens,
            http,
        })
    }

    fn request_body(&self, prompt: &str) -> Value {
        json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "messages": [{"role": "user", "content": prompt}],
        })
    }
}

#[async_trait]
impl Completion for OpenAiCompletion {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = self.request_body(prompt);

        let mut last_error = None;
        for attempt in 0..=MAX_RETRIES {
            if attempt > 0 {
                let backoff = INITIAL_BACKOFF_MS * 2u64.pow(attempt - 1);
                warn!("Retrying completion request in {backoff} ms (attempt {attempt})");
                tokio::time::sleep(Duration::from_millis(backoff)).await;
            }

            let mut request = self.http.post(&url).json(&body);
            if let Some(key) = &self.api_key {
                request = request.bearer_auth(key);
            }

            let response = match request.send().await {
                Ok(r) => r,
                Err(e) => {
                    debug!("Completion request failed on attempt {attempt}: {e}");
                    last_error = Some(CompletionError::Request(e.to_string()));
                    continue;
                }
            };

            let status = response.status().as_u16();
            if is_retryable_status(status) && attempt < MAX_RETRIES {
                debug!("Completion endpoint answered {status}, will retry");
                last_error = Some(CompletionError::Request(format!("HTTP {status}")));
                continue;
            }
            if !response.status().is_success() {
                let text = response.text().await.unwrap_or_default();
                return Err(CompletionError::Request(format!("HTTP {status}: {text}")));
            }

            let api_response: ChatResponse = response
                .json()
                .await
                .map_err(|e| CompletionError::InvalidResponse(e.to_string()))?;
            return first_choice(api_response);
        }

        Err(last_error
            .unwrap_or_else(|| CompletionError::Request("retries exhausted".to_string())))
    }
}

fn first_choice(response: ChatResponse) -> Result<String, CompletionError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|text| !text.trim().is_empty())
        .ok_or(CompletionError::EmptyResponse)
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}
