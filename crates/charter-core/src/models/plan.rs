//! Plan aggregate and its execution steps.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::{ActionPlan, ActionStep, PlanStatus, Resource, RiskNote, RtfStructure, SowDocument, StepStatus};

/// An action plan step annotated with mutable execution state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionStep {
    #[serde(flatten)]
    pub step: ActionStep,

    pub status: StepStatus,

    /// Handler output for completed steps
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,

    /// Why the step is blocked
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<Timestamp>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<Timestamp>,
}

impl ExecutionStep {
    pub fn new(step: ActionStep) -> Self {
        Self {
            step,
            status: StepStatus::Pending,
            result: None,
            error: None,
            started_at: None,
            completed_at: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.step.id
    }

    pub fn name(&self) -> &str {
        &self.step.name
    }

    pub fn is_completed(&self) -> bool {
        self.status == StepStatus::Completed
    }
}

/// Incremental annotation applied by a refinement request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlanRefinement {
    pub feedback: String,
    pub intent: String,
    #[serde(default)]
    pub added_requirements: Vec<String>,
    #[serde(default)]
    pub added_constraints: Vec<String>,
    pub confidence: f64,
    pub at: Timestamp,
}

/// Aggregate root tracking an action plan's execution end to end.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub id: String,

    pub title: String,

    pub description: String,

    pub rtf_structure: RtfStructure,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sow_document: Option<SowDocument>,

    pub execution_plan: Vec<ExecutionStep>,

    #[serde(default)]
    pub resources: Vec<Resource>,

    #[serde(default)]
    pub risk_assessment: Vec<RiskNote>,

    #[serde(default)]
    pub refinements: Vec<PlanRefinement>,

    #[serde(default)]
    pub status: PlanStatus,

    pub created_at: Timestamp,

    pub updated_at: Timestamp,
}

impl Plan {
    /// Wrap a synthesized action plan into a fresh draft plan.
    pub fn new(rtf: RtfStructure, action_plan: ActionPlan) -> Self {
        let now = Timestamp::now();
        Self {
            id: format!("plan_{}", uuid::Uuid::new_v4().simple()),
            title: rtf.task.intent.clone(),
            description: rtf.task.description.clone(),
            sow_document: None,
            execution_plan: action_plan
                .steps
                .into_iter()
                .map(ExecutionStep::new)
                .collect(),
            resources: action_plan.resources,
            risk_assessment: action_plan.risk_assessment,
            refinements: Vec::new(),
            status: PlanStatus::Draft,
            rtf_structure: rtf,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn step(&self, id: &str) -> Option<&ExecutionStep> {
        self.execution_plan.iter().find(|s| s.id() == id)
    }

    /// Whether every prerequisite of `step` is completed.
    pub fn prerequisites_met(&self, step: &ExecutionStep) -> bool {
        self.unmet_prerequisites(step).is_empty()
    }

    /// Prerequisite ids of `step` that are not completed (or do not exist).
    pub fn unmet_prerequisites<'a>(&self, step: &'a ExecutionStep) -> Vec<&'a str> {
        step.step
            .prerequisites
            .iter()
            .filter(|p| !self.step(p).is_some_and(ExecutionStep::is_completed))
            .map(String::as_str)
            .collect()
    }

    pub fn completed_count(&self) -> usize {
        self.execution_plan.iter().filter(|s| s.is_completed()).count()
    }

    /// Completed / total, or 0 for a plan without steps.
    pub fn progress(&self) -> f64 {
        if self.execution_plan.is_empty() {
            0.0
        } else {
            self.completed_count() as f64 / self.execution_plan.len() as f64
        }
    }

    pub fn all_completed(&self) -> bool {
        !self.execution_plan.is_empty() && self.execution_plan.iter().all(ExecutionStep::is_completed)
    }

    /// Steps as an action plan again, e.g. as effort hints for a SOW.
    pub fn action_plan(&self) -> ActionPlan {
        ActionPlan {
            steps: self.execution_plan.iter().map(|s| s.step.clone()).collect(),
            resources: self.resources.clone(),
            risk_assessment: self.risk_assessment.clone(),
            fallback: false,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Timestamp::now();
    }
}
