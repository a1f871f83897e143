use std::sync::Arc;

use charter_core::{
    completion::{Completion, FnCompletion, UnavailableCompletion},
    StateManager, StateManagerBuilder,
};

pub const PAPER_RTF: &str = r#"Here is the structure:
```json
{
  "role": "academic writer",
  "task": {
    "type": "paper",
    "intent": "Write an IEEE paper on distributed caching",
    "description": "A 5-page IEEE-formatted paper on distributed caching",
    "scope": "multi-step",
    "priority": "high",
    "requirements": ["IEEE format", "5 pages"]
  },
  "format": {"outputType": "document", "structure": "IEEE conference paper", "style": "academic"},
  "confidence": 0.88,
  "metadata": {"complexity": "complex", "domain": "distributed systems", "keywords": ["caching", "IEEE"]}
}
```"#;

pub const PAPER_PLAN: &str = r#"{
  "steps": [
    {"id": "research", "name": "Survey caching literature", "type": "research", "estimatedTime": 4},
    {"id": "outline", "name": "Outline sections", "type": "analysis", "estimatedTime": 1, "prerequisites": ["research"]},
    {"id": "draft", "name": "Write the draft", "type": "creation", "estimatedTime": 8, "prerequisites": ["outline"]}
  ],
  "resources": [{"name": "IEEE template", "type": "tool"}]
}"#;

pub const PAPER_SOW: &str = r#"{
  "scope": {"summary": "IEEE paper on distributed caching", "objectives": ["Publishable draft"]},
  "deliverables": [
    {"name": "Literature survey", "optimistic": 2, "mostLikely": 4, "pessimistic": 9},
    {"name": "Paper draft", "optimistic": 6, "mostLikely": 8, "pessimistic": 16}
  ],
  "risks": [{"description": "Reviewer delays", "category": "schedule", "probability": 0.3, "impact": 0.6}]
}"#;

/// Backend answering every pipeline prompt with the IEEE paper fixtures.
pub fn paper_backend() -> Arc<dyn Completion> {
    Arc::new(FnCompletion::new(|prompt: &str| {
        let answer = if prompt.starts_with("Extract a Role/Task/Format") {
            PAPER_RTF
        } else if prompt.starts_with("Break the task") {
            PAPER_PLAN
        } else if prompt.starts_with("Draft a statement of work") {
            PAPER_SOW
        } else if prompt.starts_with("Given the planning conversation") {
            r#"{"phase": "planning"}"#
        } else {
            r#"{"success": true, "output": "step done"}"#
        };
        Ok(answer.to_string())
    }))
}

/// Helper function to create a manager over the scripted paper backend
pub fn create_test_manager() -> StateManager {
    StateManagerBuilder::new()
        .with_completion(paper_backend())
        .build()
        .expect("Failed to create manager")
}

/// Helper function to create a manager whose backend always fails
pub fn create_offline_manager() -> StateManager {
    StateManagerBuilder::new()
        .with_completion(Arc::new(UnavailableCompletion::new("offline")))
        .build()
        .expect("Failed to create manager")
}
