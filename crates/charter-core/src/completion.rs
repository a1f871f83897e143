//! The text-completion seam every LLM-backed component goes through.
//!
//! The core only ever asks for `complete(prompt) -> text`. Providers, retries
//! and timeouts belong to whoever implements [`Completion`]; the core is only
//! responsible for surviving whatever text comes back.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::CompletionError;

/// Asynchronous text completion backed by any language model provider.
#[async_trait]
pub trait Completion: Send + Sync {
    /// Complete a single prompt. Each call is independent.
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError>;
}

#[async_trait]
impl<T: Completion + ?Sized> Completion for Arc<T> {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        (**self).complete(prompt).await
    }
}

/// Completion backed by a plain closure.
///
/// Useful for scripted backends and tests:
///
/// ```rust
/// use charter_core::completion::{Completion, FnCompletion};
///
/// # async fn example() {
/// let backend = FnCompletion::new(|prompt: &str| Ok(format!("echo: {prompt}")));
/// assert_eq!(backend.complete("hi").await.unwrap(), "echo: hi");
/// # }
/// ```
pub struct FnCompletion<F> {
    f: F,
}

impl<F> FnCompletion<F>
where
    F: Fn(&str) -> Result<String, CompletionError> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F> Completion for FnCompletion<F>
where
    F: Fn(&str) -> Result<String, CompletionError> + Send + Sync,
{
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        (self.f)(prompt)
    }
}

/// Completion that always fails. Every component then produces its
/// deterministic fallback.
#[derive(Debug, Clone, Default)]
pub struct UnavailableCompletion {
    reason: String,
}

impl UnavailableCompletion {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl Completion for UnavailableCompletion {
    async fn complete(&self, _prompt: &str) -> Result<String, CompletionError> {
        let reason = if self.reason.is_empty() {
            "no completion backend configured"
        } else {
            self.reason.as_str()
        };
        Err(CompletionError::Unavailable(reason.to_string()))
    }
}

/// Locate the JSON object inside a model response.
///
/// Models wrap JSON in prose or markdown fences often enough that the raw
/// text cannot be handed to `serde_json` directly. This returns the span from
/// the first `{` to the last `}`, or `None` when there is no such span.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

/// Run a completion and deserialize the JSON object in its answer.
pub(crate) async fn complete_json<T>(
    completion: &dyn Completion,
    prompt: &str,
) -> Result<T, CompletionError>
where
    T: serde::de::DeserializeOwned,
{
    let text = completion.complete(prompt).await?;
    if text.trim().is_empty() {
        return Err(CompletionError::EmptyResponse);
    }
    let json = extract_json_object(&text)
        .ok_or_else(|| CompletionError::InvalidResponse("no JSON object in response".into()))?;
    serde_json::from_str(json).map_err(|e| CompletionError::InvalidResponse(e.to_string()))
}
