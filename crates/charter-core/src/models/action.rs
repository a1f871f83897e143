//! Action plan model: synthesized steps with prerequisites and effort.

use std::{collections::HashMap, str::FromStr};

use serde::{Deserialize, Serialize};

use super::Priority;

/// Kind of work a step represents. Selects the step handler at execution.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum StepType {
    Research,
    #[default]
    Analysis,
    Creation,
    Review,
    Communication,
    Technical,
}

impl StepType {
    pub const ALL: [StepType; 6] = [
        StepType::Research,
        StepType::Analysis,
        StepType::Creation,
        StepType::Review,
        StepType::Communication,
        StepType::Technical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StepType::Research => "research",
            StepType::Analysis => "analysis",
            StepType::Creation => "creation",
            StepType::Review => "review",
            StepType::Communication => "communication",
            StepType::Technical => "technical",
        }
    }
}

impl FromStr for StepType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.to_lowercase();
        let s = s.trim();
        if s.starts_with("research") {
            Ok(StepType::Research)
        } else if s.starts_with("analy") {
            Ok(StepType::Analysis)
        } else if s.starts_with("creat") || s == "writing" || s == "drafting" {
            Ok(StepType::Creation)
        } else if s.starts_with("review") || s == "validation" || s == "testing" {
            Ok(StepType::Review)
        } else if s.starts_with("communicat") {
            Ok(StepType::Communication)
        } else if s.starts_with("tech") || s == "implementation" {
            Ok(StepType::Technical)
        } else {
            Err(format!("Invalid step type: {s}"))
        }
    }
}

/// One unit of synthesized work. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActionStep {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub step_type: StepType,
    /// Estimated effort in hours
    pub estimated_time: f64,
    /// Ids of steps that must be completed first
    #[serde(default)]
    pub prerequisites: Vec<String>,
    pub deliverable: String,
    #[serde(default)]
    pub tools: Vec<String>,
    #[serde(default)]
    pub validation_criteria: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub name: String,
    #[serde(rename = "type")]
    pub resource_type: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RiskNote {
    pub description: String,
    pub impact: Priority,
    pub mitigation: String,
}

/// Ordered, dependency-annotated steps plus resource and risk notes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActionPlan {
    pub steps: Vec<ActionStep>,
    #[serde(default)]
    pub resources: Vec<Resource>,
    #[serde(default)]
    pub risk_assessment: Vec<RiskNote>,
    #[serde(default)]
    pub fallback: bool,
}

impl ActionPlan {
    /// Single-step plan used when synthesis fails.
    pub fn fallback(intent: &str) -> Self {
        Self {
            steps: vec![ActionStep {
                id: "step_1".to_string(),
                name: "Initial Analysis".to_string(),
                description: format!("Analyze the request and outline an approach: {intent}"),
                step_type: StepType::Analysis,
                estimated_time: 2.0,
                prerequisites: Vec::new(),
                deliverable: "Analysis summary".to_string(),
                tools: Vec::new(),
                validation_criteria: vec![
                    "Requirements are understood and documented".to_string(),
                ],
            }],
            resources: Vec::new(),
            risk_assessment: Vec::new(),
            fallback: true,
        }
    }

    /// Total estimated hours across all steps.
    pub fn total_hours(&self) -> f64 {
        self.steps.iter().map(|s| s.estimated_time).sum()
    }
}

/// Find a cycle in a prerequisite graph.
///
/// Returns the ids along the cycle with the first id repeated at the end
/// (`a -> b -> a`), or `None` when the graph is acyclic. Prerequisites that
/// name unknown ids are ignored.
pub fn find_dependency_cycle<'a, I>(steps: I) -> Option<Vec<String>>
where
    I: IntoIterator<Item = (&'a str, &'a [String])>,
{
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Unvisited,
        Active,
        Done,
    }

    let edges: Vec<(&str, &[String])> = steps.into_iter().collect();
    let index: HashMap<&str, usize> = edges
        .iter()
        .enumerate()
        .map(|(i, (id, _))| (*id, i))
        .collect();
    let mut marks = vec![Mark::Unvisited; edges.len()];

    for root in 0..edges.len() {
        if marks[root] != Mark::Unvisited {
            continue;
        }
        // Iterative DFS; `path` mirrors the active stack for cycle reporting.
        let mut stack: Vec<(usize, usize)> = vec![(root, 0)];
        let mut path: Vec<usize> = vec![root];
        marks[root] = Mark::Active;

        while let Some((node, next_edge)) = stack.last_mut() {
            let node = *node;
            let prereqs = edges[node].1;
            if *next_edge < prereqs.len() {
                let target = prereqs[*next_edge].as_str();
                *next_edge += 1;
                let Some(&t) = index.get(target) else {
                    continue;
                };
                match marks[t] {
                    Mark::Active => {
                        let start = path.iter().position(|&p| p == t).unwrap_or(0);
                        let mut cycle: Vec<String> =
                            path[start..].iter().map(|&p| edges[p].0.to_string()).collect();
                        cycle.push(edges[t].0.to_string());
                        return Some(cycle);
                    }
                    Mark::Unvisited => {
                        marks[t] = Mark::Active;
                        stack.push((t, 0));
                        path.push(t);
                    }
                    Mark::Done => {}
                }
            } else {
                marks[node] = Mark::Done;
                stack.pop();
                path.pop();
            }
        }
    }

    None
}
