//! Data models for the planning pipeline.
//!
//! - [`rtf`]: the Role/Task/Format structure produced by the parser
//! - [`action`]: synthesized action plans and their steps
//! - [`plan`]: the plan aggregate with per-step execution state
//! - [`sow`]: statements of work
//! - [`conversation`]: per-session conversation state
//! - [`execution`]: execution options, results and status views
//!
//! Display implementations live in [`crate::display`] and render every model
//! as markdown.

pub mod action;
pub mod conversation;
pub mod execution;
pub mod plan;
pub mod rtf;
pub mod sow;
pub mod status;
pub mod summary;

#[cfg(test)]
mod tests;

pub use action::{find_dependency_cycle, ActionPlan, ActionStep, Resource, RiskNote, StepType};
pub use conversation::{ConversationContext, ConversationState, Message, MessageRole, Phase};
pub use execution::{
    ExecuteOptions, ExecutionResult, NotificationCallback, PlanStatusView, StepEvent,
};
pub use plan::{ExecutionStep, Plan, PlanRefinement};
pub use rtf::{
    Complexity, Deliverable, Format, Priority, RawRtf, RtfMetadata, RtfStructure, Task, TaskScope,
    TaskType,
};
pub use sow::{
    Budget, EffortEstimate, Milestone, ResourceAllocation, Risk, RiskAssessment, RiskLevel,
    SowDeliverable, SowDocument, SowScope, Timeline, TimelinePhase,
};
pub use status::{PlanStatus, StepStatus};
pub use summary::PlanSummary;
