//! Intent parser: free text to [`RtfStructure`].

use std::{collections::HashMap, sync::Arc};

use log::{debug, warn};
use tokio::sync::Mutex;

use crate::{
    completion::{complete_json, Completion},
    error::{PlannerError, Result},
    models::{RawRtf, RtfStructure},
    prompts,
};

/// Parses requests into RTF structures through the completion backend.
///
/// Successful extractions are memoized per `(input, context)` for the life
/// of the parser. The cache never expires; call [`RtfParser::clear_cache`]
/// to bound it. Heuristic fallbacks are not cached, so a transient backend
/// failure is retried on the next identical request.
pub struct RtfParser {
    completion: Arc<dyn Completion>,
    cache: Mutex<HashMap<CacheKey, RtfStructure>>,
}

/// Request text and optional conversation context.
type CacheKey = (String, Option<String>);

impl RtfParser {
    pub fn new(completion: Arc<dyn Completion>) -> Self {
        Self {
            completion,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Parse one request.
    ///
    /// Backend failures and malformed answers never surface: the result is
    /// then a fallback structure with `metadata.fallback = true`.
    ///
    /// # Errors
    ///
    /// Returns `PlannerError::InvalidInput` if `input` is empty or blank.
    pub async fn parse(&self, input: &str, context: Option<&str>) -> Result<RtfStructure> {
        if input.trim().is_empty() {
            return Err(PlannerError::invalid_input("input").with_reason("must not be empty"));
        }

        let key = cache_key(input, context);
        if let Some(hit) = self.cache.lock().await.get(&key) {
            debug!("RTF cache hit ({} chars)", input.len());
            return Ok(hit.clone());
        }

        let prompt = prompts::rtf_extraction(input, context);
        let rtf = match complete_json::<RawRtf>(self.completion.as_ref(), &prompt).await {
            Ok(raw) => RtfStructure::from_raw(raw, input),
            Err(e) => {
                warn!("RTF extraction failed, using heuristic fallback: {e}");
                return Ok(RtfStructure::fallback(input));
            }
        };

        self.cache.lock().await.insert(key, rtf.clone());
        Ok(rtf)
    }

    pub async fn clear_cache(&self) {
        self.cache.lock().await.clear();
    }

    pub async fn cache_len(&self) -> usize {
        self.cache.lock().await.len()
    }
}

fn cache_key(input: &str, context: Option<&str>) -> CacheKey {
    (input.to_string(), context.map(str::to_string))
}
