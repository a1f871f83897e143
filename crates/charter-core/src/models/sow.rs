//! Statement-of-work document model.

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

/// Share of a budget's subtotal reserved as contingency.
pub const CONTINGENCY_RATE: f64 = 0.15;

/// Three-point effort estimate in hours.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EffortEstimate {
    pub optimistic: f64,
    pub most_likely: f64,
    pub pessimistic: f64,
    /// `(optimistic + 4 * most_likely + pessimistic) / 6`
    pub expected: f64,
    /// `(pessimistic - optimistic) / 6`
    pub standard_deviation: f64,
}

impl EffortEstimate {
    /// PERT estimate. Negative inputs clamp to zero and an out-of-order
    /// triple is sorted so `optimistic <= most_likely <= pessimistic`.
    pub fn pert(optimistic: f64, most_likely: f64, pessimistic: f64) -> Self {
        let mut triple = [optimistic, most_likely, pessimistic].map(|v| {
            if v.is_finite() {
                v.max(0.0)
            } else {
                0.0
            }
        });
        triple.sort_by(f64::total_cmp);
        let [o, m, p] = triple;

        Self {
            optimistic: o,
            most_likely: m,
            pessimistic: p,
            expected: (o + 4.0 * m + p) / 6.0,
            standard_deviation: (p - o) / 6.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SowScope {
    pub summary: String,
    #[serde(default)]
    pub objectives: Vec<String>,
    #[serde(default)]
    pub inclusions: Vec<String>,
    #[serde(default)]
    pub exclusions: Vec<String>,
    #[serde(default)]
    pub assumptions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SowDeliverable {
    pub name: String,
    pub description: String,
    pub estimate: EffortEstimate,
    #[serde(default)]
    pub acceptance_criteria: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TimelinePhase {
    pub name: String,
    /// Share of the total duration, 0..1
    pub share: f64,
    pub duration_days: f64,
    pub start_offset_days: f64,
    #[serde(default)]
    pub activities: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    pub name: String,
    pub due: Date,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Timeline {
    pub total_hours: f64,
    pub total_days: u32,
    pub hours_per_day: f64,
    pub start_date: Date,
    pub end_date: Date,
    pub phases: Vec<TimelinePhase>,
    #[serde(default)]
    pub milestones: Vec<Milestone>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResourceAllocation {
    pub role: String,
    #[serde(default)]
    pub skills: Vec<String>,
    /// Fraction of a full-time person, 0..1
    pub allocation: f64,
    pub hours: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    #[default]
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        }
    }

    /// Bucket from the highest and the average risk score.
    pub fn from_scores(max: f64, average: f64) -> Self {
        if max >= 0.8 || average >= 0.6 {
            RiskLevel::Critical
        } else if max >= 0.6 || average >= 0.4 {
            RiskLevel::High
        } else if max >= 0.3 || average >= 0.2 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Risk {
    pub description: String,
    pub category: String,
    pub probability: f64,
    pub impact: f64,
    /// `probability * impact`
    pub score: f64,
    pub mitigation: String,
}

impl Risk {
    pub fn new(
        description: String,
        category: String,
        probability: f64,
        impact: f64,
        mitigation: String,
    ) -> Self {
        let probability = unit(probability);
        let impact = unit(impact);
        Self {
            description,
            category,
            probability,
            impact,
            score: probability * impact,
            mitigation,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    pub risks: Vec<Risk>,
    pub max_score: f64,
    pub average_score: f64,
    pub overall_level: RiskLevel,
}

impl RiskAssessment {
    pub fn new(risks: Vec<Risk>) -> Self {
        let max_score = risks.iter().map(|r| r.score).fold(0.0, f64::max);
        let average_score = if risks.is_empty() {
            0.0
        } else {
            risks.iter().map(|r| r.score).sum::<f64>() / risks.len() as f64
        };
        Self {
            overall_level: RiskLevel::from_scores(max_score, average_score),
            risks,
            max_score,
            average_score,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BudgetLine {
    pub item: String,
    pub amount: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    pub hourly_rate: f64,
    pub labor_hours: f64,
    pub labor_cost: f64,
    pub tool_costs: f64,
    pub external_costs: f64,
    pub subtotal: f64,
    pub contingency: f64,
    pub total: f64,
    pub line_items: Vec<BudgetLine>,
}

impl Budget {
    /// Labor plus tools plus external costs, with the fixed contingency on top.
    pub fn compute(labor_hours: f64, hourly_rate: f64, tool_costs: f64, external_costs: f64) -> Self {
        let labor_cost = labor_hours * hourly_rate;
        let tool_costs = tool_costs.max(0.0);
        let external_costs = external_costs.max(0.0);
        let subtotal = labor_cost + tool_costs + external_costs;
        let contingency = subtotal * CONTINGENCY_RATE;

        let line_items = vec![
            BudgetLine {
                item: format!("Labor ({labor_hours:.1} h at {hourly_rate:.2}/h)"),
                amount: labor_cost,
            },
            BudgetLine {
                item: "Tools".to_string(),
                amount: tool_costs,
            },
            BudgetLine {
                item: "External services".to_string(),
                amount: external_costs,
            },
            BudgetLine {
                item: format!("Contingency ({:.0}%)", CONTINGENCY_RATE * 100.0),
                amount: contingency,
            },
        ];

        Self {
            hourly_rate,
            labor_hours,
            labor_cost,
            tool_costs,
            external_costs,
            subtotal,
            contingency,
            total: subtotal + contingency,
            line_items,
        }
    }
}

/// Effort, timeline, resource, risk and budget view of a request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SowDocument {
    pub title: String,
    pub scope: SowScope,
    pub deliverables: Vec<SowDeliverable>,
    pub timeline: Timeline,
    pub resource_plan: Vec<ResourceAllocation>,
    pub risk_assessment: RiskAssessment,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<Budget>,
    pub confidence: f64,
    #[serde(default)]
    pub fallback: bool,
}

fn unit(v: f64) -> f64 {
    if v.is_finite() {
        v.clamp(0.0, 1.0)
    } else {
        0.0
    }
}
