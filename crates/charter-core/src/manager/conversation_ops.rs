//! Conversation context operations.

use jiff::Timestamp;
use log::{debug, info, warn};
use serde::Deserialize;
use serde_json::{Map, Value};

use super::StateManager;
use crate::{
    completion::complete_json,
    error::{PlannerError, Result},
    models::{
        rtf::{clean_list, non_empty},
        ConversationContext, Message, MessageRole, Phase,
    },
    prompts,
};

/// Proposed state change from the conversation analysis prompt.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawStateUpdate {
    phase: Option<String>,
    current_task: Option<String>,
    add_pending_actions: Vec<String>,
    remove_pending_actions: Vec<String>,
    add_completed_actions: Vec<String>,
}

impl RawStateUpdate {
    fn apply(self, context: &mut ConversationContext) {
        if let Some(phase) = self.phase.as_deref().and_then(|p| p.parse::<Phase>().ok()) {
            context.state.phase = phase;
        }
        if let Some(task) = non_empty(self.current_task) {
            context.state.current_task = Some(task);
        }

        let removed = clean_list(self.remove_pending_actions);
        context
            .state
            .pending_actions
            .retain(|a| !removed.contains(a));

        for action in clean_list(self.add_completed_actions) {
            context.complete_action(&action);
        }

        for action in clean_list(self.add_pending_actions) {
            let state = &mut context.state;
            if !state.pending_actions.contains(&action) && !state.completed_actions.contains(&action)
            {
                state.pending_actions.push(action);
            }
        }
    }
}

impl StateManager {
    /// Current context for a session, if one exists.
    pub async fn get_conversation_context(&self, session_id: &str) -> Option<ConversationContext> {
        self.conversations.get(session_id).await
    }

    /// Append a message to a session's conversation, creating the context on
    /// first use.
    ///
    /// User messages additionally run the state analysis prompt, whose
    /// proposal updates the phase, current task and action lists. Analysis
    /// failures are logged and leave the prior state untouched.
    ///
    /// # Errors
    ///
    /// Returns `PlannerError::InvalidInput` if the session id or the content
    /// is blank.
    pub async fn add_message(
        &self,
        session_id: &str,
        role: MessageRole,
        content: &str,
        metadata: Map<String, Value>,
    ) -> Result<ConversationContext> {
        if session_id.trim().is_empty() {
            return Err(PlannerError::invalid_input("session_id").with_reason("must not be empty"));
        }
        if content.trim().is_empty() {
            return Err(PlannerError::invalid_input("content").with_reason("must not be empty"));
        }

        let mut message = Message::new(role, content);
        message.metadata = metadata;
        let max_history = self.config.max_history;
        let context = self
            .conversations
            .update(session_id, |c| c.push_message(message, max_history))
            .await;

        if role != MessageRole::User {
            return Ok(context);
        }

        let prompt = prompts::conversation_state(&context);
        match complete_json::<RawStateUpdate>(self.completion.as_ref(), &prompt).await {
            Ok(update) => {
                let context = self
                    .conversations
                    .update(session_id, |c| update.apply(c))
                    .await;
                debug!(
                    "Conversation {session_id} is now in phase {}",
                    context.state.phase.as_str()
                );
                Ok(context)
            }
            Err(e) => {
                warn!("Conversation state analysis failed for {session_id}, keeping prior state: {e}");
                Ok(context)
            }
        }
    }

    /// Remove conversations idle for longer than the configured retention.
    ///
    /// Nothing schedules this; callers invoke it periodically. Returns the
    /// number of removed contexts.
    pub async fn cleanup_expired_conversations(&self) -> usize {
        let cutoff = Timestamp::now()
            .checked_sub(self.config.retention())
            .unwrap_or(Timestamp::MIN);
        let removed = self.conversations.cleanup_expired(cutoff).await;
        if removed > 0 {
            info!("Removed {removed} expired conversation(s)");
        }
        removed
    }
}
