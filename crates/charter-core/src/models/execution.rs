//! Execution requests, results and status views.

use std::{fmt, sync::Arc};

use serde::{Deserialize, Serialize};

use super::{ExecutionStep, Plan, StepStatus};

/// Transition reported to an execution observer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum StepEvent {
    /// Handler is about to run
    Started,
    /// Handler succeeded
    Completed,
    /// Handler reported an unsuccessful outcome
    Failed,
    /// Handler returned an error
    Error,
    /// Prerequisites were not completed; the step was skipped
    Blocked,
}

impl StepEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepEvent::Started => "started",
            StepEvent::Completed => "completed",
            StepEvent::Failed => "failed",
            StepEvent::Error => "error",
            StepEvent::Blocked => "blocked",
        }
    }
}

/// Synchronous observer invoked for every step transition.
pub type NotificationCallback = Arc<dyn Fn(&ExecutionStep, StepEvent) + Send + Sync>;

/// Options for one `execute_plan` call.
#[derive(Clone)]
pub struct ExecuteOptions {
    /// Run every attemptable step; when false, stop after the first attempt
    pub auto_execute: bool,
    pub notification_callback: Option<NotificationCallback>,
}

impl ExecuteOptions {
    /// Attempt a single step and return.
    pub fn single_step() -> Self {
        Self {
            auto_execute: false,
            notification_callback: None,
        }
    }

    pub fn with_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(&ExecutionStep, StepEvent) + Send + Sync + 'static,
    {
        self.notification_callback = Some(Arc::new(callback));
        self
    }

    pub(crate) fn notify(&self, step: &ExecutionStep, event: StepEvent) {
        if let Some(callback) = &self.notification_callback {
            callback(step, event);
        }
    }
}

impl Default for ExecuteOptions {
    fn default() -> Self {
        Self {
            auto_execute: true,
            notification_callback: None,
        }
    }
}

impl fmt::Debug for ExecuteOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecuteOptions")
            .field("auto_execute", &self.auto_execute)
            .field(
                "notification_callback",
                &self.notification_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

/// Outcome of an `execute_plan` call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    /// True when no step recorded an error
    pub success: bool,
    /// Ids of every completed step, including ones completed earlier
    pub completed_steps: Vec<String>,
    pub errors: Vec<String>,
}

/// Read-only snapshot of a plan's progress.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PlanStatusView {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<Plan>,
    /// Completed / total steps
    pub progress: f64,
    /// First pending step whose prerequisites are all completed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_step: Option<ExecutionStep>,
    pub blocked_steps: Vec<ExecutionStep>,
}

impl PlanStatusView {
    pub fn from_plan(plan: Plan) -> Self {
        let next_step = plan
            .execution_plan
            .iter()
            .find(|s| s.status == StepStatus::Pending && plan.prerequisites_met(s))
            .cloned();
        let blocked_steps = plan
            .execution_plan
            .iter()
            .filter(|s| s.status == StepStatus::Blocked)
            .cloned()
            .collect();

        Self {
            progress: plan.progress(),
            next_step,
            blocked_steps,
            plan: Some(plan),
        }
    }
}
