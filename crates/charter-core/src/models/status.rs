//! Status enumerations for plans and execution steps.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Lifecycle status of a plan.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum PlanStatus {
    /// Plan has been created but not executed
    #[default]
    Draft,

    /// Plan was explicitly approved by the caller
    Approved,

    /// At least one execution pass has run and work remains
    InProgress,

    /// Every execution step is completed
    Completed,

    /// Plan was cancelled and can no longer be executed
    Cancelled,
}

impl FromStr for PlanStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "draft" => Ok(PlanStatus::Draft),
            "approved" => Ok(PlanStatus::Approved),
            "in-progress" | "inprogress" => Ok(PlanStatus::InProgress),
            "completed" | "done" => Ok(PlanStatus::Completed),
            "cancelled" | "canceled" => Ok(PlanStatus::Cancelled),
            _ => Err(format!("Invalid plan status: {s}")),
        }
    }
}

impl PlanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanStatus::Draft => "draft",
            PlanStatus::Approved => "approved",
            PlanStatus::InProgress => "in-progress",
            PlanStatus::Completed => "completed",
            PlanStatus::Cancelled => "cancelled",
        }
    }

    /// Whether execution may still be started or resumed.
    pub fn is_executable(&self) -> bool {
        !matches!(self, PlanStatus::Cancelled)
    }
}

/// Execution status of a single step.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum StepStatus {
    /// Step has not been attempted yet
    #[default]
    Pending,

    /// Step handler is running
    InProgress,

    /// Step handler succeeded
    Completed,

    /// Step failed or its prerequisites were not completed
    Blocked,
}

impl FromStr for StepStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "pending" | "todo" => Ok(StepStatus::Pending),
            "in-progress" | "inprogress" => Ok(StepStatus::InProgress),
            "completed" | "done" => Ok(StepStatus::Completed),
            "blocked" => Ok(StepStatus::Blocked),
            _ => Err(format!("Invalid step status: {s}")),
        }
    }
}

impl StepStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepStatus::Pending => "pending",
            StepStatus::InProgress => "in-progress",
            StepStatus::Completed => "completed",
            StepStatus::Blocked => "blocked",
        }
    }

    /// Get status with consistent icon formatting for display.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use charter_core::models::StepStatus;
    ///
    /// assert_eq!(StepStatus::Completed.with_icon(), "✓ Completed");
    /// assert_eq!(StepStatus::Blocked.with_icon(), "✗ Blocked");
    /// ```
    pub fn with_icon(&self) -> &'static str {
        match self {
            StepStatus::Completed => "✓ Completed",
            StepStatus::InProgress => "➤ In Progress",
            StepStatus::Pending => "○ Pending",
            StepStatus::Blocked => "✗ Blocked",
        }
    }
}
