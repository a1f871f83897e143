//! Builder for creating and configuring StateManager instances.

use std::{collections::HashMap, sync::Arc};

use log::warn;

use super::StateManager;
use crate::{
    completion::{Completion, UnavailableCompletion},
    config::PipelineConfig,
    error::Result,
    handlers::{default_handlers, StepHandler},
    models::StepType,
    parser::RtfParser,
    registry::{ConversationRegistry, PlanRegistry},
    sow_generator::SowGenerator,
    synthesizer::ActionPlanSynthesizer,
};

/// Builder for creating and configuring StateManager instances.
#[derive(Default)]
pub struct StateManagerBuilder {
    completion: Option<Arc<dyn Completion>>,
    config: PipelineConfig,
    plans: Option<Arc<PlanRegistry>>,
    conversations: Option<Arc<ConversationRegistry>>,
    handlers: HashMap<StepType, Arc<dyn StepHandler>>,
}

impl StateManagerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the completion backend used by every component.
    ///
    /// If not specified, an [`UnavailableCompletion`] is used and every
    /// component produces its fallback.
    pub fn with_completion(mut self, completion: Arc<dyn Completion>) -> Self {
        self.completion = Some(completion);
        self
    }

    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// Shares an existing plan registry instead of creating a private one.
    pub fn with_plan_registry(mut self, plans: Arc<PlanRegistry>) -> Self {
        self.plans = Some(plans);
        self
    }

    /// Shares an existing conversation registry instead of creating a private
    /// one.
    pub fn with_conversation_registry(mut self, conversations: Arc<ConversationRegistry>) -> Self {
        self.conversations = Some(conversations);
        self
    }

    /// Replaces the handler for one step type.
    pub fn with_handler(mut self, step_type: StepType, handler: Arc<dyn StepHandler>) -> Self {
        self.handlers.insert(step_type, handler);
        self
    }

    /// Builds the configured state manager.
    ///
    /// # Errors
    ///
    /// Returns `PlannerError::Configuration` if the pipeline configuration is
    /// out of range.
    pub fn build(self) -> Result<StateManager> {
        self.config.validate()?;

        let completion: Arc<dyn Completion> = match self.completion {
            Some(completion) => completion,
            None => {
                warn!("No completion backend configured; every component will use its fallback");
                Arc::new(UnavailableCompletion::default())
            }
        };

        let mut handlers = default_handlers(&completion);
        handlers.extend(self.handlers);

        Ok(StateManager {
            parser: RtfParser::new(Arc::clone(&completion)),
            synthesizer: ActionPlanSynthesizer::new(Arc::clone(&completion)),
            sow_generator: SowGenerator::new(Arc::clone(&completion), &self.config),
            plans: self.plans.unwrap_or_default(),
            conversations: self.conversations.unwrap_or_default(),
            config: self.config,
            completion,
            handlers,
        })
    }
}
