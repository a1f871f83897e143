//! Markdown rendering for statements of work.

use std::fmt;

use super::datetime::CalendarDate;
use crate::models::{Budget, RiskLevel, SowDocument};

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for Budget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "| Item | Amount |")?;
        writeln!(f, "|:-|-:|")?;
        for line in &self.line_items {
            writeln!(f, "| {} | {:.2} |", line.item, line.amount)?;
        }
        writeln!(f, "| **Total** | **{:.2}** |", self.total)
    }
}

impl fmt::Display for SowDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# {}", self.title)?;
        writeln!(f)?;
        if self.fallback {
            writeln!(f, "> Minimal estimate; the completion backend was unavailable.")?;
            writeln!(f)?;
        }
        writeln!(f, "- Confidence: {:.0}%", self.confidence * 100.0)?;
        writeln!(
            f,
            "- Effort: {:.1} h over {} working day(s) at {:.1} h/day",
            self.timeline.total_hours, self.timeline.total_days, self.timeline.hours_per_day
        )?;
        writeln!(
            f,
            "- Dates: {} to {}",
            CalendarDate(&self.timeline.start_date),
            CalendarDate(&self.timeline.end_date)
        )?;
        writeln!(f)?;

        writeln!(f, "## Scope")?;
        writeln!(f)?;
        writeln!(f, "{}", self.scope.summary)?;
        writeln!(f)?;
        for (label, items) in [
            ("Objectives", &self.scope.objectives),
            ("Included", &self.scope.inclusions),
            ("Excluded", &self.scope.exclusions),
            ("Assumptions", &self.scope.assumptions),
        ] {
            if !items.is_empty() {
                writeln!(f, "**{label}**: {}", items.join("; "))?;
                writeln!(f)?;
            }
        }

        writeln!(f, "## Deliverables")?;
        writeln!(f)?;
        writeln!(f, "| Deliverable | Optimistic | Most likely | Pessimistic | Expected | σ |")?;
        writeln!(f, "|:-|-:|-:|-:|-:|-:|")?;
        for d in &self.deliverables {
            let e = &d.estimate;
            writeln!(
                f,
                "| {} | {:.1} | {:.1} | {:.1} | {:.1} | {:.2} |",
                d.name, e.optimistic, e.most_likely, e.pessimistic, e.expected, e.standard_deviation
            )?;
        }
        writeln!(f)?;

        writeln!(f, "## Timeline")?;
        writeln!(f)?;
        for (phase, milestone) in self.timeline.phases.iter().zip(&self.timeline.milestones) {
            writeln!(
                f,
                "- **{}** ({:.0}%, {:.1} days), due {}",
                phase.name,
                phase.share * 100.0,
                phase.duration_days,
                CalendarDate(&milestone.due)
            )?;
        }
        writeln!(f)?;

        writeln!(f, "## Resources")?;
        writeln!(f)?;
        for r in &self.resource_plan {
            writeln!(
                f,
                "- {} ({:.0}% allocation, {:.1} h)",
                r.role,
                r.allocation * 100.0,
                r.hours
            )?;
        }
        writeln!(f)?;

        let risk = &self.risk_assessment;
        writeln!(f, "## Risks ({} overall)", risk.overall_level)?;
        writeln!(f)?;
        if risk.risks.is_empty() {
            writeln!(f, "No risks identified.")?;
        }
        for r in &risk.risks {
            writeln!(
                f,
                "- {} [{}] score {:.2} (p {:.2} × i {:.2})",
                r.description, r.category, r.score, r.probability, r.impact
            )?;
            if !r.mitigation.is_empty() {
                writeln!(f, "  - Mitigation: {}", r.mitigation)?;
            }
        }

        if let Some(budget) = &self.budget {
            writeln!(f)?;
            writeln!(f, "## Budget")?;
            writeln!(f)?;
            write!(f, "{budget}")?;
        }

        Ok(())
    }
}
