//! Step handlers: the work performed when an execution step is attempted.
//!
//! The state manager picks a handler by [`StepType`]. Every type has one by
//! default; [`crate::StateManagerBuilder::with_handler`] replaces it per type.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::{
    completion::{extract_json_object, Completion},
    error::{CompletionError, Result},
    models::{ExecutionStep, Plan, StepType},
    prompts,
};

/// What a handler reports for one step attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    pub success: bool,
    /// Result text for a successful step, or the failure reason
    pub output: String,
}

impl StepOutcome {
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: output.into(),
        }
    }

    pub fn failure(reason: impl Into<String>) -> Self {
        Self {
            success: false,
            output: reason.into(),
        }
    }
}

/// Executes one step of a plan.
///
/// Returning `Ok` with `success = false` is a reported failure; returning
/// `Err` is a handler error. Both block the step and land in the execution's
/// `errors`, but they are reported to observers as different events.
#[async_trait]
pub trait StepHandler: Send + Sync {
    async fn execute(&self, step: &ExecutionStep, plan: &Plan) -> Result<StepOutcome>;
}

/// Handler that asks the completion backend to carry out the step.
pub struct CompletionStepHandler {
    completion: Arc<dyn Completion>,
}

#[derive(Debug, Deserialize)]
struct RawOutcome {
    #[serde(default = "default_success")]
    success: bool,
    #[serde(default)]
    output: Value,
}

fn default_success() -> bool {
    true
}

impl CompletionStepHandler {
    pub fn new(completion: Arc<dyn Completion>) -> Self {
        Self { completion }
    }
}

#[async_trait]
impl StepHandler for CompletionStepHandler {
    async fn execute(&self, step: &ExecutionStep, plan: &Plan) -> Result<StepOutcome> {
        let prompt = prompts::step_execution(step, plan);
        let text = self.completion.complete(&prompt).await?;
        if text.trim().is_empty() {
            return Err(CompletionError::EmptyResponse.into());
        }
        Ok(interpret(&text))
    }
}

/// Read a handler answer. A `{"success", "output"}` object is taken at its
/// word; any other non-empty text is the step's output.
fn interpret(text: &str) -> StepOutcome {
    let parsed = extract_json_object(text)
        .and_then(|json| serde_json::from_str::<RawOutcome>(json).ok());

    let Some(raw) = parsed else {
        return StepOutcome::success(text.trim());
    };

    let output = match raw.output {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    };

    if raw.success {
        StepOutcome::success(output)
    } else if output.is_empty() {
        StepOutcome::failure("step reported failure")
    } else {
        StepOutcome::failure(output)
    }
}

/// The handler set used when nothing is overridden: one completion-backed
/// handler shared by every step type.
pub(crate) fn default_handlers(
    completion: &Arc<dyn Completion>,
) -> HashMap<StepType, Arc<dyn StepHandler>> {
    let shared: Arc<dyn StepHandler> = Arc::new(CompletionStepHandler::new(Arc::clone(completion)));
    StepType::ALL
        .into_iter()
        .map(|step_type| (step_type, Arc::clone(&shared)))
        .collect()
}
