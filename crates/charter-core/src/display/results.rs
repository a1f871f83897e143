//! Display types for operation results.

use std::fmt;

use crate::models::{ExecutionResult, PlanStatusView};

impl fmt::Display for ExecutionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.success {
            writeln!(f, "Execution succeeded.")?;
        } else {
            writeln!(f, "Execution finished with {} error(s).", self.errors.len())?;
        }
        writeln!(f)?;

        if self.completed_steps.is_empty() {
            writeln!(f, "No steps completed.")?;
        } else {
            writeln!(f, "Completed steps: {}", self.completed_steps.join(", "))?;
        }

        if !self.errors.is_empty() {
            writeln!(f)?;
            writeln!(f, "## Errors")?;
            writeln!(f)?;
            for error in &self.errors {
                writeln!(f, "- {error}")?;
            }
        }

        Ok(())
    }
}

impl fmt::Display for PlanStatusView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(plan) = &self.plan else {
            return writeln!(f, "Plan not found.");
        };

        writeln!(f, "# {} ({})", plan.title, plan.status)?;
        writeln!(f)?;
        writeln!(f, "Progress: {:.0}%", self.progress * 100.0)?;
        writeln!(f)?;

        match &self.next_step {
            Some(step) => writeln!(f, "Next: {} ({})", step.name(), step.id())?,
            None => writeln!(f, "Next: nothing ready to run")?,
        }

        if !self.blocked_steps.is_empty() {
            writeln!(f)?;
            writeln!(f, "## Blocked")?;
            writeln!(f)?;
            for step in &self.blocked_steps {
                match &step.error {
                    Some(error) => writeln!(f, "- {}: {error}", step.id())?,
                    None => writeln!(f, "- {}", step.id())?,
                }
            }
        }

        Ok(())
    }
}
