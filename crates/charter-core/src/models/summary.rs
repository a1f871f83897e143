//! Plan summary types and functionality.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::{Plan, PlanStatus, StepStatus};

/// Summary information about a plan with step statistics.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlanSummary {
    pub id: String,
    pub title: String,
    pub status: PlanStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub total_steps: u32,
    pub completed_steps: u32,
    pub blocked_steps: u32,
    pub has_sow: bool,
}

impl From<&Plan> for PlanSummary {
    fn from(plan: &Plan) -> Self {
        let count = |status: StepStatus| {
            plan.execution_plan
                .iter()
                .filter(|step| step.status == status)
                .count() as u32
        };

        Self {
            id: plan.id.clone(),
            title: plan.title.clone(),
            status: plan.status,
            created_at: plan.created_at,
            updated_at: plan.updated_at,
            total_steps: plan.execution_plan.len() as u32,
            completed_steps: count(StepStatus::Completed),
            blocked_steps: count(StepStatus::Blocked),
            has_sow: plan.sow_document.is_some(),
        }
    }
}
