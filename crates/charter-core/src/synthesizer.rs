//! Action plan synthesizer: RTF structure to ordered, dependency-annotated steps.

use std::{collections::HashSet, sync::Arc};

use log::warn;
use serde::Deserialize;

use crate::{
    completion::{complete_json, Completion},
    models::{
        find_dependency_cycle,
        rtf::{clean_list, non_empty, parse_or},
        ActionPlan, ActionStep, Priority, Resource, RiskNote, RtfStructure, StepType,
    },
    prompts,
};

const DEFAULT_STEP_HOURS: f64 = 1.0;

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawActionPlan {
    steps: Vec<RawActionStep>,
    resources: Vec<RawResource>,
    risk_assessment: Vec<RawRiskNote>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawActionStep {
    id: Option<String>,
    name: Option<String>,
    description: Option<String>,
    #[serde(rename = "type")]
    step_type: Option<String>,
    estimated_time: Option<f64>,
    prerequisites: Vec<String>,
    deliverable: Option<String>,
    tools: Vec<String>,
    validation_criteria: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawResource {
    name: Option<String>,
    #[serde(rename = "type")]
    resource_type: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawRiskNote {
    description: Option<String>,
    impact: Option<String>,
    mitigation: Option<String>,
}

/// Expands RTF structures into action plans through the completion backend.
///
/// Always yields at least one step: failures, empty answers and cyclic
/// prerequisite graphs all produce [`ActionPlan::fallback`].
pub struct ActionPlanSynthesizer {
    completion: Arc<dyn Completion>,
}

impl ActionPlanSynthesizer {
    pub fn new(completion: Arc<dyn Completion>) -> Self {
        Self { completion }
    }

    pub async fn synthesize(&self, rtf: &RtfStructure) -> ActionPlan {
        let prompt = prompts::action_plan(rtf);
        let raw = match complete_json::<RawActionPlan>(self.completion.as_ref(), &prompt).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Action plan synthesis failed, using single-step fallback: {e}");
                return ActionPlan::fallback(&rtf.task.intent);
            }
        };

        match validate(raw) {
            Ok(plan) => plan,
            Err(reason) => {
                warn!("Synthesized action plan rejected ({reason}), using single-step fallback");
                ActionPlan::fallback(&rtf.task.intent)
            }
        }
    }
}

/// Turn model output into a usable action plan.
///
/// Unnamed steps are dropped, missing or duplicate ids are replaced with
/// `step_<n>`, self references and prerequisites naming unknown steps are
/// removed. A remaining cycle rejects the whole plan.
fn validate(raw: RawActionPlan) -> Result<ActionPlan, String> {
    let mut steps: Vec<ActionStep> = Vec::with_capacity(raw.steps.len());
    let mut seen: HashSet<String> = HashSet::new();

    for raw_step in raw.steps {
        let Some(name) = non_empty(raw_step.name) else {
            continue;
        };
        let position = steps.len() + 1;
        let id = match non_empty(raw_step.id) {
            Some(id) if !seen.contains(&id) => id,
            _ => {
                let mut n = position;
                while seen.contains(&format!("step_{n}")) {
                    n += 1;
                }
                format!("step_{n}")
            }
        };
        seen.insert(id.clone());

        let estimated_time = match raw_step.estimated_time {
            Some(hours) if hours.is_finite() && hours > 0.0 => hours,
            _ => DEFAULT_STEP_HOURS,
        };

        steps.push(ActionStep {
            description: non_empty(raw_step.description).unwrap_or_else(|| name.clone()),
            step_type: parse_or(raw_step.step_type.as_deref(), StepType::Analysis),
            prerequisites: clean_list(raw_step.prerequisites),
            deliverable: non_empty(raw_step.deliverable)
                .unwrap_or_else(|| format!("{name} output")),
            tools: clean_list(raw_step.tools),
            validation_criteria: clean_list(raw_step.validation_criteria),
            estimated_time,
            name,
            id,
        });
    }

    if steps.is_empty() {
        return Err("no usable steps".to_string());
    }

    for step in &mut steps {
        let own_id = step.id.clone();
        let before = step.prerequisites.len();
        step.prerequisites
            .retain(|p| *p != own_id && seen.contains(p));
        if step.prerequisites.len() != before {
            warn!(
                "Dropped {} invalid prerequisite(s) from step {}",
                before - step.prerequisites.len(),
                step.id
            );
        }
    }

    if let Some(cycle) = find_dependency_cycle(
        steps
            .iter()
            .map(|s| (s.id.as_str(), s.prerequisites.as_slice())),
    ) {
        return Err(format!("cyclic prerequisites {}", cycle.join(" -> ")));
    }

    let resources = raw
        .resources
        .into_iter()
        .filter_map(|r| {
            let name = non_empty(r.name)?;
            Some(Resource {
                resource_type: non_empty(r.resource_type).unwrap_or_else(|| "general".to_string()),
                description: non_empty(r.description).unwrap_or_default(),
                name,
            })
        })
        .collect();

    let risk_assessment = raw
        .risk_assessment
        .into_iter()
        .filter_map(|r| {
            let description = non_empty(r.description)?;
            Some(RiskNote {
                impact: parse_or(r.impact.as_deref(), Priority::Medium),
                mitigation: non_empty(r.mitigation).unwrap_or_default(),
                description,
            })
        })
        .collect();

    Ok(ActionPlan {
        steps,
        resources,
        risk_assessment,
        fallback: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::{FnCompletion, UnavailableCompletion};

    fn rtf() -> RtfStructure {
        RtfStructure::fallback("Write a short report on cache eviction")
    }

    fn synthesizer(response: &'static str) -> ActionPlanSynthesizer {
        ActionPlanSynthesizer::new(Arc::new(FnCompletion::new(move |_: &str| {
            Ok(response.to_string())
        })))
    }

    #[tokio::test]
    async fn test_synthesize_valid_plan() {
        let synth = synthesizer(
            r#"{
              "steps": [
                {"id": "a", "name": "Survey eviction policies", "type": "research", "estimatedTime": 3},
                {"id": "b", "name": "Write the report", "type": "creation", "estimatedTime": 4, "prerequisites": ["a"]},
                {"id": "c", "name": "Proofread", "type": "review", "prerequisites": ["b"]}
              ],
              "resources": [{"name": "Papers", "type": "reference"}],
              "riskAssessment": [{"description": "Scope creep", "impact": "high", "mitigation": "Timebox"}]
            }"#,
        );

        let plan = synth.synthesize(&rtf()).await;
        assert!(!plan.fallback);
        assert_eq!(plan.steps.len(), 3);
        assert_eq!(plan.steps[1].step_type, StepType::Creation);
        assert_eq!(plan.steps[1].prerequisites, vec!["a"]);
        assert_eq!(plan.steps[2].estimated_time, DEFAULT_STEP_HOURS);
        assert_eq!(plan.total_hours(), 8.0);
        assert_eq!(plan.resources.len(), 1);
        assert_eq!(plan.risk_assessment[0].impact, Priority::High);
    }

    #[tokio::test]
    async fn test_synthesize_failure_yields_single_step() {
        let synth = ActionPlanSynthesizer::new(Arc::new(UnavailableCompletion::default()));
        let plan = synth.synthesize(&rtf()).await;

        assert!(plan.fallback);
        assert_eq!(plan.steps.len(), 1);
        assert_eq!(plan.steps[0].name, "Initial Analysis");
        assert!(plan.steps[0].prerequisites.is_empty());
    }

    #[tokio::test]
    async fn test_synthesize_empty_steps_yields_fallback() {
        let plan = synthesizer(r#"{"steps": [{"description": "no name"}]}"#)
            .synthesize(&rtf())
            .await;
        assert!(plan.fallback);
    }

    #[tokio::test]
    async fn test_synthesize_cycle_yields_fallback() {
        let plan = synthesizer(
            r#"{"steps": [
                {"id": "a", "name": "A", "prerequisites": ["b"]},
                {"id": "b", "name": "B", "prerequisites": ["a"]}
            ]}"#,
        )
        .synthesize(&rtf())
        .await;
        assert!(plan.fallback);
        assert_eq!(plan.steps.len(), 1);
    }

    #[test]
    fn test_validate_repairs_ids_and_prerequisites() {
        let raw: RawActionPlan = serde_json::from_str(
            r#"{"steps": [
                {"id": "x", "name": "First", "prerequisites": ["x", "ghost"]},
                {"id": "x", "name": "Second", "prerequisites": ["x"]},
                {"name": "Third", "type": "weird"}
            ]}"#,
        )
        .unwrap();

        let plan = validate(raw).unwrap();
        let ids: Vec<&str> = plan.steps.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["x", "step_2", "step_3"]);
        assert!(plan.steps[0].prerequisites.is_empty());
        assert_eq!(plan.steps[1].prerequisites, vec!["x"]);
        assert_eq!(plan.steps[2].step_type, StepType::Analysis);
    }
}
