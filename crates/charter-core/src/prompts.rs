//! Prompt templates for the completion-backed components.
//!
//! Every prompt asks for a single JSON object; the shapes here mirror the
//! `Raw*` types the answers are deserialized into.

use crate::models::{ActionPlan, ConversationContext, ExecutionStep, Plan, RtfStructure, StepType};

pub fn rtf_extraction(input: &str, context: Option<&str>) -> String {
    let context = context
        .filter(|c| !c.trim().is_empty())
        .map(|c| format!("\nPrior context:\n{c}\n"))
        .unwrap_or_default();

    format!(
        r#"Extract a Role/Task/Format structure from the request below.
Answer with one JSON object and nothing else:
{{
  "role": "persona best suited to do the work",
  "task": {{
    "type": "general|paper|document|presentation|research|analysis|code|design|planning|communication",
    "intent": "short goal",
    "description": "full description",
    "scope": "single-action|multi-step|iterative|collaborative",
    "priority": "low|medium|high|urgent",
    "requirements": [], "constraints": [], "dependencies": [],
    "expectedOutcome": "what done looks like"
  }},
  "format": {{
    "outputType": "document|presentation|code|report|text|...",
    "structure": "...", "style": "...",
    "deliverables": [{{"name": "", "type": "", "description": "", "format": "", "priority": "medium"}}],
    "timeline": "..."
  }},
  "confidence": 0.0,
  "metadata": {{"language": "en", "complexity": "simple|moderate|complex|very-complex", "domain": "", "keywords": []}}
}}
{context}
Request:
{input}"#
    )
}

pub fn action_plan(rtf: &RtfStructure) -> String {
    let rtf_json = serde_json::to_string_pretty(rtf).unwrap_or_default();
    format!(
        r#"Break the task below into an ordered list of actionable steps.
Each step may list the ids of earlier steps it depends on as prerequisites.
Answer with one JSON object and nothing else:
{{
  "steps": [{{
    "id": "step_1", "name": "", "description": "",
    "type": "research|analysis|creation|review|communication|technical",
    "estimatedTime": 1.0,
    "prerequisites": [], "deliverable": "", "tools": [], "validationCriteria": []
  }}],
  "resources": [{{"name": "", "type": "", "description": ""}}],
  "riskAssessment": [{{"description": "", "impact": "low|medium|high|urgent", "mitigation": ""}}]
}}

Task:
{rtf_json}"#
    )
}

pub fn statement_of_work(rtf: &RtfStructure, action_plan: Option<&ActionPlan>) -> String {
    let rtf_json = serde_json::to_string_pretty(rtf).unwrap_or_default();
    let steps = action_plan
        .map(|plan| {
            let lines: Vec<String> = plan
                .steps
                .iter()
                .map(|s| format!("- {} ({:.1} h): {}", s.name, s.estimated_time, s.description))
                .collect();
            format!("\nPlanned steps:\n{}\n", lines.join("\n"))
        })
        .unwrap_or_default();

    format!(
        r#"Draft a statement of work for the task below. Estimates are in hours;
probability and impact are between 0 and 1.
Answer with one JSON object and nothing else:
{{
  "scope": {{"summary": "", "objectives": [], "inclusions": [], "exclusions": [], "assumptions": []}},
  "deliverables": [{{"name": "", "description": "", "optimistic": 0, "mostLikely": 0, "pessimistic": 0, "acceptanceCriteria": []}}],
  "resources": [{{"role": "", "skills": [], "allocation": 1.0}}],
  "risks": [{{"description": "", "category": "", "probability": 0.0, "impact": 0.0, "mitigation": ""}}],
  "toolCosts": 0,
  "externalCosts": 0
}}

Task:
{rtf_json}
{steps}"#
    )
}

pub fn conversation_state(context: &ConversationContext) -> String {
    let state_json = serde_json::to_string_pretty(&context.state).unwrap_or_default();
    format!(
        r#"Given the planning conversation below, decide where it stands now.
Answer with one JSON object and nothing else:
{{
  "phase": "initiation|analysis|planning|execution|review|completion",
  "currentTask": "",
  "addPendingActions": [],
  "removePendingActions": [],
  "addCompletedActions": []
}}

Current state:
{state_json}

Conversation:
{}"#,
        context.transcript(10)
    )
}

fn step_instructions(step_type: StepType) -> &'static str {
    match step_type {
        StepType::Research => "Gather the information this step needs and summarize the findings with sources.",
        StepType::Analysis => "Analyze the material available for this step and state the conclusions.",
        StepType::Creation => "Produce the deliverable for this step.",
        StepType::Review => "Review the work so far against the validation criteria and list any issues.",
        StepType::Communication => "Draft the communication this step calls for.",
        StepType::Technical => "Carry out the technical work for this step and describe the result.",
    }
}

pub fn step_execution(step: &ExecutionStep, plan: &Plan) -> String {
    let criteria = if step.step.validation_criteria.is_empty() {
        "none".to_string()
    } else {
        step.step.validation_criteria.join("; ")
    };

    format!(
        r#"You are acting as: {role}
Overall goal: {goal}

Current step: {name} ({step_type})
{description}
Expected deliverable: {deliverable}
Validation criteria: {criteria}

{instructions}
Answer with one JSON object and nothing else:
{{"success": true, "output": "the result of this step"}}"#,
        role = plan.rtf_structure.role,
        goal = plan.title,
        name = step.step.name,
        step_type = step.step.step_type.as_str(),
        description = step.step.description,
        deliverable = step.step.deliverable,
        instructions = step_instructions(step.step.step_type),
    )
}
