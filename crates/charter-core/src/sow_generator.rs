//! Statement-of-work generator.
//!
//! The completion backend proposes scope, deliverable estimates, staffing
//! and risks. Everything numeric that follows from those proposals (PERT
//! expectations, the phase timeline, risk scores and the budget) is computed
//! here so it stays consistent regardless of what the model returns.

use std::sync::Arc;

use jiff::{civil::Date, Span, Zoned};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::{
    completion::{complete_json, Completion},
    config::PipelineConfig,
    models::{
        rtf::{clean_list, non_empty},
        ActionPlan, Budget, EffortEstimate, Milestone, ResourceAllocation, Risk, RiskAssessment,
        RtfStructure, SowDeliverable, SowDocument, SowScope, Timeline, TimelinePhase,
    },
    prompts,
};

/// Effort assumed for a deliverable when nothing better is known.
const DEFAULT_DELIVERABLE_HOURS: f64 = 8.0;

/// Fallback documents plan one working week.
const FALLBACK_DAYS: u32 = 5;
const FALLBACK_CONFIDENCE: f64 = 0.3;

/// Longest timeline a generated document may span (about 100 years).
const MAX_TIMELINE_DAYS: u32 = 36_500;

/// Analysis, execution and review shares of the total duration.
const PHASES: [(&str, f64, &[&str]); 3] = [
    ("Analysis", 0.2, &["Requirements review", "Approach definition"]),
    ("Execution", 0.6, &["Deliverable production"]),
    ("Review", 0.2, &["Quality review", "Final revisions"]),
];

/// Per-call overrides for SOW generation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct SowOptions {
    pub hourly_rate: Option<f64>,
    pub hours_per_day: Option<f64>,
    pub include_budget: bool,
    /// Overrides the tool cost the model proposes
    pub tool_costs: Option<f64>,
    /// Overrides the external cost the model proposes
    pub external_costs: Option<f64>,
    /// Defaults to today
    pub start_date: Option<Date>,
}

impl Default for SowOptions {
    fn default() -> Self {
        Self {
            hourly_rate: None,
            hours_per_day: None,
            include_budget: true,
            tool_costs: None,
            external_costs: None,
            start_date: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawScope {
    summary: Option<String>,
    objectives: Vec<String>,
    inclusions: Vec<String>,
    exclusions: Vec<String>,
    assumptions: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawSowDeliverable {
    name: Option<String>,
    description: Option<String>,
    optimistic: Option<f64>,
    most_likely: Option<f64>,
    pessimistic: Option<f64>,
    acceptance_criteria: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawAllocation {
    role: Option<String>,
    skills: Vec<String>,
    allocation: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawRisk {
    description: Option<String>,
    category: Option<String>,
    probability: Option<f64>,
    impact: Option<f64>,
    mitigation: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawSow {
    scope: Option<RawScope>,
    deliverables: Vec<RawSowDeliverable>,
    resources: Vec<RawAllocation>,
    risks: Vec<RawRisk>,
    tool_costs: Option<f64>,
    external_costs: Option<f64>,
}

/// Derives statements of work from RTF structures.
pub struct SowGenerator {
    completion: Arc<dyn Completion>,
    hourly_rate: f64,
    hours_per_day: f64,
}

impl SowGenerator {
    pub fn new(completion: Arc<dyn Completion>, config: &PipelineConfig) -> Self {
        Self {
            completion,
            hourly_rate: config.hourly_rate,
            hours_per_day: config.hours_per_day,
        }
    }

    /// Generate a SOW. `action_plan`, when given, supplies effort hints.
    ///
    /// Never fails: any generation problem yields [`SowGenerator::fallback`].
    pub async fn generate(
        &self,
        rtf: &RtfStructure,
        action_plan: Option<&ActionPlan>,
        options: &SowOptions,
    ) -> SowDocument {
        let prompt = prompts::statement_of_work(rtf, action_plan);
        match complete_json::<RawSow>(self.completion.as_ref(), &prompt).await {
            Ok(raw) => match self.build(raw, rtf, action_plan, options) {
                Some(sow) => sow,
                None => {
                    warn!(
                        "Proposed effort exceeds {MAX_TIMELINE_DAYS} days, using minimal fallback"
                    );
                    self.fallback(rtf, options)
                }
            },
            Err(e) => {
                warn!("SOW generation failed, using minimal fallback: {e}");
                self.fallback(rtf, options)
            }
        }
    }

    /// Deterministic minimal SOW: one generic deliverable over one week.
    pub fn fallback(&self, rtf: &RtfStructure, options: &SowOptions) -> SowDocument {
        let hours_per_day = self.hours_per_day(options);
        let estimate = EffortEstimate::pert(
            0.8 * f64::from(FALLBACK_DAYS) * hours_per_day,
            f64::from(FALLBACK_DAYS) * hours_per_day,
            1.2 * f64::from(FALLBACK_DAYS) * hours_per_day,
        );
        let total_hours = estimate.expected;

        let risks = RiskAssessment::new(vec![Risk::new(
            "Estimates were produced without a detailed analysis".to_string(),
            "estimation".to_string(),
            0.5,
            0.5,
            "Re-estimate once requirements are confirmed".to_string(),
        )]);

        SowDocument {
            title: format!("Statement of Work: {}", rtf.task.intent),
            scope: SowScope {
                summary: rtf.task.description.clone(),
                objectives: vec![rtf.task.expected_outcome.clone()],
                inclusions: rtf.task.requirements.clone(),
                exclusions: Vec::new(),
                assumptions: vec!["Scope to be confirmed with the requester".to_string()],
            },
            deliverables: vec![SowDeliverable {
                name: "Project deliverable".to_string(),
                description: rtf.task.description.clone(),
                estimate,
                acceptance_criteria: Vec::new(),
            }],
            timeline: build_timeline(total_hours, hours_per_day, FALLBACK_DAYS, start_date(options)),
            resource_plan: vec![ResourceAllocation {
                role: rtf.role.clone(),
                skills: Vec::new(),
                allocation: 1.0,
                hours: total_hours,
            }],
            risk_assessment: risks,
            budget: self.budget(total_hours, options, None, None),
            confidence: FALLBACK_CONFIDENCE,
            fallback: true,
        }
    }

    fn build(
        &self,
        raw: RawSow,
        rtf: &RtfStructure,
        action_plan: Option<&ActionPlan>,
        options: &SowOptions,
    ) -> Option<SowDocument> {
        let deliverables = deliverables(raw.deliverables, rtf, action_plan);
        let total_hours: f64 = deliverables.iter().map(|d| d.estimate.expected).sum();
        let hours_per_day = self.hours_per_day(options);
        let total_days = days_for(total_hours, hours_per_day)?;

        let scope = raw.scope.unwrap_or_default();
        let scope = SowScope {
            summary: non_empty(scope.summary).unwrap_or_else(|| rtf.task.description.clone()),
            objectives: or_else(clean_list(scope.objectives), || {
                vec![rtf.task.expected_outcome.clone()]
            }),
            inclusions: or_else(clean_list(scope.inclusions), || rtf.task.requirements.clone()),
            exclusions: clean_list(scope.exclusions),
            assumptions: or_else(clean_list(scope.assumptions), || rtf.task.constraints.clone()),
        };

        let mut resource_plan: Vec<ResourceAllocation> = raw
            .resources
            .into_iter()
            .filter_map(|r| {
                let role = non_empty(r.role)?;
                let allocation = match r.allocation {
                    Some(a) if a.is_finite() && a > 0.0 => a.min(1.0),
                    _ => 1.0,
                };
                Some(ResourceAllocation {
                    role,
                    skills: clean_list(r.skills),
                    allocation,
                    hours: total_hours * allocation,
                })
            })
            .collect();
        if resource_plan.is_empty() {
            resource_plan.push(ResourceAllocation {
                role: rtf.role.clone(),
                skills: Vec::new(),
                allocation: 1.0,
                hours: total_hours,
            });
        }

        let risks = raw
            .risks
            .into_iter()
            .filter_map(|r| {
                Some(Risk::new(
                    non_empty(r.description)?,
                    non_empty(r.category).unwrap_or_else(|| "general".to_string()),
                    r.probability.unwrap_or(0.0),
                    r.impact.unwrap_or(0.0),
                    non_empty(r.mitigation).unwrap_or_default(),
                ))
            })
            .collect();

        Some(SowDocument {
            title: format!("Statement of Work: {}", rtf.task.intent),
            scope,
            deliverables,
            timeline: build_timeline(total_hours, hours_per_day, total_days, start_date(options)),
            resource_plan,
            risk_assessment: RiskAssessment::new(risks),
            budget: self.budget(total_hours, options, raw.tool_costs, raw.external_costs),
            confidence: rtf.confidence,
            fallback: false,
        })
    }

    fn hours_per_day(&self, options: &SowOptions) -> f64 {
        options
            .hours_per_day
            .filter(|h| h.is_finite() && *h > 0.0)
            .unwrap_or(self.hours_per_day)
    }

    fn budget(
        &self,
        total_hours: f64,
        options: &SowOptions,
        proposed_tools: Option<f64>,
        proposed_external: Option<f64>,
    ) -> Option<Budget> {
        if !options.include_budget {
            return None;
        }
        let rate = options
            .hourly_rate
            .filter(|r| r.is_finite() && *r >= 0.0)
            .unwrap_or(self.hourly_rate);
        let tools = options.tool_costs.or(proposed_tools).unwrap_or(0.0);
        let external = options.external_costs.or(proposed_external).unwrap_or(0.0);
        Some(Budget::compute(total_hours, rate, finite(tools), finite(external)))
    }
}

fn deliverables(
    raw: Vec<RawSowDeliverable>,
    rtf: &RtfStructure,
    action_plan: Option<&ActionPlan>,
) -> Vec<SowDeliverable> {
    let named: Vec<RawSowDeliverable> = raw
        .into_iter()
        .filter(|d| d.name.as_deref().is_some_and(|n| !n.trim().is_empty()))
        .collect();

    let count = if named.is_empty() {
        rtf.format.deliverables.len().max(1)
    } else {
        named.len()
    };
    let hint = match action_plan {
        Some(plan) if plan.total_hours() > 0.0 => plan.total_hours() / count as f64,
        _ => DEFAULT_DELIVERABLE_HOURS,
    };

    if !named.is_empty() {
        return named
            .into_iter()
            .map(|d| {
                let name = non_empty(d.name).unwrap_or_default();
                SowDeliverable {
                    description: non_empty(d.description).unwrap_or_else(|| name.clone()),
                    estimate: estimate_from(d.optimistic, d.most_likely, d.pessimistic, hint),
                    acceptance_criteria: clean_list(d.acceptance_criteria),
                    name,
                }
            })
            .collect();
    }

    let from_format: Vec<SowDeliverable> = rtf
        .format
        .deliverables
        .iter()
        .map(|d| SowDeliverable {
            name: d.name.clone(),
            description: d.description.clone(),
            estimate: estimate_from(None, None, None, hint),
            acceptance_criteria: Vec::new(),
        })
        .collect();
    if !from_format.is_empty() {
        return from_format;
    }

    vec![SowDeliverable {
        name: rtf.task.intent.clone(),
        description: rtf.task.description.clone(),
        estimate: estimate_from(None, None, None, hint),
        acceptance_criteria: Vec::new(),
    }]
}

/// Three-point estimate from whatever subset of points the model gave.
fn estimate_from(
    optimistic: Option<f64>,
    most_likely: Option<f64>,
    pessimistic: Option<f64>,
    hint: f64,
) -> EffortEstimate {
    let given: Vec<f64> = [optimistic, most_likely, pessimistic]
        .into_iter()
        .flatten()
        .filter(|v| v.is_finite() && *v >= 0.0)
        .collect();
    let m = most_likely
        .filter(|v| v.is_finite() && *v >= 0.0)
        .unwrap_or_else(|| {
            if given.is_empty() {
                hint
            } else {
                given.iter().sum::<f64>() / given.len() as f64
            }
        });
    EffortEstimate::pert(
        optimistic.unwrap_or(m * 0.75),
        m,
        pessimistic.unwrap_or(m * 1.5),
    )
}

/// Working days needed for `total_hours`, or `None` past [`MAX_TIMELINE_DAYS`].
fn days_for(total_hours: f64, hours_per_day: f64) -> Option<u32> {
    let days = (total_hours / hours_per_day).ceil();
    if !days.is_finite() {
        return None;
    }
    if days < 1.0 {
        return Some(1);
    }
    (days <= f64::from(MAX_TIMELINE_DAYS)).then_some(days as u32)
}

fn build_timeline(total_hours: f64, hours_per_day: f64, total_days: u32, start: Date) -> Timeline {
    let mut offset = 0.0;
    let mut phases = Vec::with_capacity(PHASES.len());
    let mut milestones = Vec::with_capacity(PHASES.len());

    for (name, share, activities) in PHASES {
        let duration_days = f64::from(total_days) * share;
        phases.push(TimelinePhase {
            name: name.to_string(),
            share,
            duration_days,
            start_offset_days: offset,
            activities: activities.iter().map(|a| a.to_string()).collect(),
        });
        offset += duration_days;
        milestones.push(Milestone {
            name: format!("{name} complete"),
            due: add_days(start, offset.ceil() as i64),
        });
    }

    Timeline {
        total_hours,
        total_days,
        hours_per_day,
        start_date: start,
        end_date: add_days(start, i64::from(total_days)),
        phases,
        milestones,
    }
}

fn add_days(date: Date, days: i64) -> Date {
    Span::new()
        .try_days(days)
        .ok()
        .and_then(|span| date.checked_add(span).ok())
        .unwrap_or(date)
}

fn start_date(options: &SowOptions) -> Date {
    options.start_date.unwrap_or_else(|| Zoned::now().date())
}

fn or_else<F: FnOnce() -> Vec<String>>(items: Vec<String>, f: F) -> Vec<String> {
    if items.is_empty() {
        f()
    } else {
        items
    }
}

fn finite(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests;
