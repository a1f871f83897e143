//! State manager: the public entry point of the planning pipeline.
//!
//! [`StateManager`] owns the plan and conversation registries and drives the
//! parser, synthesizer, SOW generator and step handlers.
//!
//! ```text
//!  input ──▶ RtfParser ──▶ ActionPlanSynthesizer ──▶ PlanRegistry
//!                 │                                      │
//!                 └──────▶ SowGenerator (optional)       ▼
//!                                                 execute_plan ──▶ StepHandler
//! ```
//!
//! ## Submodules
//!
//! - [`builder`]: [`StateManagerBuilder`], wiring configuration and collaborators
//! - `plan_ops`: plan creation, refinement, execution, status and SOW operations
//! - `conversation_ops`: conversation context updates and cleanup
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use charter_core::{completion::UnavailableCompletion, PlanContext, StateManagerBuilder};
//!
//! # async fn example() -> charter_core::Result<()> {
//! let manager = StateManagerBuilder::new()
//!     .with_completion(Arc::new(UnavailableCompletion::default()))
//!     .build()?;
//!
//! let plan = manager
//!     .create_task_plan("Write a 5-page IEEE paper on distributed caching", &PlanContext::default())
//!     .await?;
//! assert!(!plan.execution_plan.is_empty());
//! # Ok(())
//! # }
//! ```

use std::{collections::HashMap, sync::Arc};

use crate::{
    completion::Completion,
    config::PipelineConfig,
    handlers::StepHandler,
    models::{RtfStructure, StepType},
    parser::RtfParser,
    registry::{ConversationRegistry, PlanRegistry},
    sow_generator::{SowGenerator, SowOptions},
    synthesizer::ActionPlanSynthesizer,
};

pub mod builder;
mod conversation_ops;
mod plan_ops;


pub use builder::StateManagerBuilder;

/// Optional inputs for [`StateManager::create_task_plan`].
#[derive(Debug, Clone, Default)]
pub struct PlanContext {
    /// Session whose conversation context is initialized with the new plan
    pub session_id: Option<String>,
    /// Prior conversation text handed to the parser
    pub context: Option<String>,
    /// Overrides `PipelineConfig::generate_sow`
    pub generate_sow: Option<bool>,
    pub sow_options: Option<SowOptions>,
}

impl PlanContext {
    pub fn for_session(session_id: impl Into<String>) -> Self {
        Self {
            session_id: Some(session_id.into()),
            ..Self::default()
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_sow(mut self, options: SowOptions) -> Self {
        self.generate_sow = Some(true);
        self.sow_options = Some(options);
        self
    }
}

/// What a statement of work is generated from.
#[derive(Debug, Clone, Copy)]
pub enum SowSource<'a> {
    /// A standalone RTF structure; the document is only returned
    Rtf(&'a RtfStructure),
    /// A registered plan; its steps are effort hints and the document is
    /// stored on the plan
    Plan(&'a str),
}

/// Coordinates the planning pipeline and owns its registries.
pub struct StateManager {
    pub(crate) config: PipelineConfig,
    pub(crate) completion: Arc<dyn Completion>,
    pub(crate) parser: RtfParser,
    pub(crate) synthesizer: ActionPlanSynthesizer,
    pub(crate) sow_generator: SowGenerator,
    pub(crate) plans: Arc<PlanRegistry>,
    pub(crate) conversations: Arc<ConversationRegistry>,
    pub(crate) handlers: HashMap<StepType, Arc<dyn StepHandler>>,
}

impl StateManager {
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn plans(&self) -> &Arc<PlanRegistry> {
        &self.plans
    }

    pub fn conversations(&self) -> &Arc<ConversationRegistry> {
        &self.conversations
    }

    /// Drop every memoized RTF extraction.
    pub async fn clear_cache(&self) {
        self.parser.clear_cache().await;
    }
}
