//! Display implementations for domain models.
//!
//! Every implementation produces markdown for rich terminal display.

use std::fmt;

use super::datetime::LocalDateTime;
use crate::models::{
    ConversationContext, ExecutionStep, Phase, Plan, PlanStatus, PlanSummary, Priority,
    RtfStructure, StepStatus, StepType, TaskType,
};

impl fmt::Display for PlanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for StepType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, heading: &str, items: &[String]) -> fmt::Result {
    if items.is_empty() {
        return Ok(());
    }
    writeln!(f, "### {heading}")?;
    writeln!(f)?;
    for item in items {
        writeln!(f, "- {item}")?;
    }
    writeln!(f)
}

impl fmt::Display for RtfStructure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# {}", self.task.intent)?;
        writeln!(f)?;
        if self.is_fallback() {
            writeln!(
                f,
                "> Extracted without the completion backend; fields are heuristic."
            )?;
            writeln!(f)?;
        }

        writeln!(f, "- **Role**: {}", self.role)?;
        writeln!(f, "- **Type**: {}", self.task.task_type)?;
        writeln!(f, "- **Scope**: {}", self.task.scope.as_str())?;
        writeln!(f, "- **Priority**: {}", self.task.priority)?;
        writeln!(f, "- **Output**: {}", self.format.output_type)?;
        writeln!(f, "- **Complexity**: {}", self.metadata.complexity.as_str())?;
        writeln!(f, "- **Confidence**: {:.0}%", self.confidence * 100.0)?;
        writeln!(f)?;

        writeln!(f, "## Task")?;
        writeln!(f)?;
        writeln!(f, "{}", self.task.description)?;
        writeln!(f)?;
        writeln!(f, "Expected outcome: {}", self.task.expected_outcome)?;
        writeln!(f)?;
        write_list(f, "Requirements", &self.task.requirements)?;
        write_list(f, "Constraints", &self.task.constraints)?;
        write_list(f, "Dependencies", &self.task.dependencies)?;

        writeln!(f, "## Format")?;
        writeln!(f)?;
        writeln!(f, "- **Structure**: {}", self.format.structure)?;
        writeln!(f, "- **Style**: {}", self.format.style)?;
        writeln!(f, "- **Timeline**: {}", self.format.timeline)?;
        for deliverable in &self.format.deliverables {
            writeln!(
                f,
                "- **Deliverable**: {} ({}, {} priority)",
                deliverable.name, deliverable.deliverable_type, deliverable.priority
            )?;
        }

        if !self.metadata.keywords.is_empty() {
            writeln!(f)?;
            writeln!(f, "Keywords: {}", self.metadata.keywords.join(", "))?;
        }

        Ok(())
    }
}

impl ExecutionStep {
    fn fmt_step(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "### {}. {} ({})",
            self.id(),
            self.name(),
            self.status.with_icon()
        )?;
        writeln!(f)?;

        writeln!(
            f,
            "*{}, {:.1} h, delivers: {}*",
            self.step.step_type, self.step.estimated_time, self.step.deliverable
        )?;
        writeln!(f)?;

        if !self.step.description.is_empty() {
            writeln!(f, "{}", self.step.description)?;
            writeln!(f)?;
        }

        if !self.step.prerequisites.is_empty() {
            writeln!(f, "Requires: {}", self.step.prerequisites.join(", "))?;
            writeln!(f)?;
        }

        if !self.step.validation_criteria.is_empty() {
            writeln!(f, "#### Validation")?;
            writeln!(f)?;
            for criterion in &self.step.validation_criteria {
                writeln!(f, "- {criterion}")?;
            }
            writeln!(f)?;
        }

        if self.status == StepStatus::Completed {
            if let Some(result) = &self.result {
                writeln!(f, "#### Result")?;
                writeln!(f)?;
                writeln!(f, "{result}")?;
                writeln!(f)?;
            }
        }

        if let Some(error) = &self.error {
            writeln!(f, "> {error}")?;
            writeln!(f)?;
        }

        Ok(())
    }
}

impl fmt::Display for ExecutionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_step(f)
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# {}", self.title)?;
        writeln!(f)?;

        writeln!(f, "- ID: {}", self.id)?;
        writeln!(f, "- Status: {}", self.status)?;
        writeln!(
            f,
            "- Progress: {}/{} steps",
            self.completed_count(),
            self.execution_plan.len()
        )?;
        writeln!(f, "- Role: {}", self.rtf_structure.role)?;
        writeln!(f, "- Created: {}", LocalDateTime(&self.created_at))?;
        writeln!(f, "- Updated: {}", LocalDateTime(&self.updated_at))?;
        if let Some(sow) = &self.sow_document {
            writeln!(
                f,
                "- Statement of work: {:.1} h over {} day(s)",
                sow.timeline.total_hours, sow.timeline.total_days
            )?;
        }

        writeln!(f)?;
        writeln!(f, "{}", self.description)?;

        if self.execution_plan.is_empty() {
            writeln!(f, "\nNo steps in this plan.")?;
        } else {
            writeln!(f, "\n## Steps")?;
            writeln!(f)?;
            for step in &self.execution_plan {
                write!(f, "{step}")?;
            }
        }

        if !self.risk_assessment.is_empty() {
            writeln!(f, "## Risks")?;
            writeln!(f)?;
            for risk in &self.risk_assessment {
                writeln!(f, "- **{}** ({} impact): {}", risk.description, risk.impact, risk.mitigation)?;
            }
            writeln!(f)?;
        }

        if !self.refinements.is_empty() {
            writeln!(f, "## Refinements")?;
            writeln!(f)?;
            for refinement in &self.refinements {
                writeln!(
                    f,
                    "- {}: {}",
                    LocalDateTime(&refinement.at),
                    refinement.feedback
                )?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

impl fmt::Display for PlanSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "## {} (ID: {}) ({}/{})",
            self.title, self.id, self.completed_steps, self.total_steps
        )?;
        writeln!(f)?;
        writeln!(f, "- **Status**: {}", self.status)?;
        if self.blocked_steps > 0 {
            writeln!(f, "- **Blocked**: {}", self.blocked_steps)?;
        }
        if self.has_sow {
            writeln!(f, "- **Statement of work**: yes")?;
        }
        writeln!(f, "- **Created**: {}", LocalDateTime(&self.created_at))?;
        writeln!(f)
    }
}

impl fmt::Display for ConversationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# Conversation {}", self.id)?;
        writeln!(f)?;
        writeln!(f, "- Phase: {}", self.state.phase)?;
        if let Some(task) = &self.state.current_task {
            writeln!(f, "- Current task: {task}")?;
        }
        writeln!(f, "- Messages: {}", self.history.len())?;
        writeln!(f)?;
        write_list(f, "Pending", &self.state.pending_actions)?;
        write_list(f, "Done", &self.state.completed_actions)
    }
}
