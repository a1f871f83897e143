//! Collection wrapper types for displaying groups of domain objects.

use std::fmt;

use serde::Serialize;

use crate::models::PlanSummary;

/// Newtype wrapper for displaying collections of plan summaries.
///
/// ```rust
/// use charter_core::display::PlanSummaries;
///
/// let empty = PlanSummaries(Vec::new());
/// assert_eq!(empty.to_string(), "No plans found.\n");
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct PlanSummaries(pub Vec<PlanSummary>);

impl PlanSummaries {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Display for PlanSummaries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No plans found.");
        }
        for summary in &self.0 {
            write!(f, "{summary}")?;
        }
        Ok(())
    }
}
