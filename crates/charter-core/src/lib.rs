//! Core library for the Charter conversational task planner.
//!
//! A free-text request flows through four components:
//!
//! 1. [`parser::RtfParser`] extracts a Role/Task/Format structure
//! 2. [`synthesizer::ActionPlanSynthesizer`] expands it into dependency-ordered steps
//! 3. [`sow_generator::SowGenerator`] optionally derives a statement of work
//! 4. [`StateManager`] registers the plan, executes its steps and tracks
//!    conversation state per session
//!
//! Every language-model call goes through the [`completion::Completion`]
//! trait. Extraction failures never surface as errors: each component falls
//! back to a deterministic result and flags it (`metadata.fallback`,
//! `ActionPlan::fallback`, `SowDocument::fallback`). Unknown plan ids, blank
//! input and cyclic step graphs are the hard errors, reported as
//! [`PlannerError`].
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use charter_core::{
//!     completion::FnCompletion, ExecuteOptions, PlanContext, StateManagerBuilder,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let backend = FnCompletion::new(|_prompt: &str| Ok(r#"{"success": true, "output": "ok"}"#.to_string()));
//! let manager = StateManagerBuilder::new()
//!     .with_completion(Arc::new(backend))
//!     .build()?;
//!
//! let plan = manager
//!     .create_task_plan("Summarize last week's incidents", &PlanContext::default())
//!     .await?;
//! println!("{plan}");
//!
//! let result = manager.execute_plan(&plan.id, &ExecuteOptions::default()).await?;
//! println!("{result}");
//! # Ok(())
//! # }
//! ```

pub mod completion;
pub mod config;
pub mod display;
pub mod error;
pub mod handlers;
pub mod manager;
pub mod models;
pub mod parser;
pub mod prompts;
pub mod registry;
pub mod sow_generator;
pub mod synthesizer;

// Re-export commonly used types
pub use completion::{Completion, FnCompletion, UnavailableCompletion};
pub use config::{CharterConfig, CompletionSettings, PipelineConfig};
pub use display::{LocalDateTime, PlanSummaries};
pub use error::{CompletionError, PlannerError, Result};
pub use handlers::{CompletionStepHandler, StepHandler, StepOutcome};
pub use manager::{PlanContext, SowSource, StateManager, StateManagerBuilder};
pub use models::{
    ActionPlan, ActionStep, ConversationContext, ExecuteOptions, ExecutionResult, ExecutionStep,
    Message, MessageRole, Plan, PlanStatus, PlanStatusView, PlanSummary, RtfStructure,
    SowDocument, StepEvent, StepStatus, StepType,
};
pub use registry::{ConversationRegistry, PlanRegistry};
pub use sow_generator::SowOptions;
