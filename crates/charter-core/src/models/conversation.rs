//! Per-session conversation state.

use std::str::FromStr;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

impl FromStr for MessageRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(MessageRole::User),
            "assistant" => Ok(MessageRole::Assistant),
            _ => Err(format!("Invalid message role: {s}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
    pub timestamp: Timestamp,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
}

impl Message {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Timestamp::now(),
            metadata: Map::new(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }
}

/// Where a planning conversation currently stands.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Initiation,
    Analysis,
    Planning,
    Execution,
    Review,
    Completion,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Initiation => "initiation",
            Phase::Analysis => "analysis",
            Phase::Planning => "planning",
            Phase::Execution => "execution",
            Phase::Review => "review",
            Phase::Completion => "completion",
        }
    }
}

impl FromStr for Phase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().trim() {
            "initiation" => Ok(Phase::Initiation),
            "analysis" => Ok(Phase::Analysis),
            "planning" => Ok(Phase::Planning),
            "execution" => Ok(Phase::Execution),
            "review" => Ok(Phase::Review),
            "completion" | "complete" => Ok(Phase::Completion),
            _ => Err(format!("Invalid conversation phase: {s}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ConversationState {
    pub phase: Phase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_task: Option<String>,
    #[serde(default)]
    pub pending_actions: Vec<String>,
    #[serde(default)]
    pub completed_actions: Vec<String>,
    #[serde(default)]
    pub working_memory: Map<String, Value>,
}

/// Running state of one planning session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConversationContext {
    #[serde(rename = "type")]
    pub context_type: String,
    pub id: String,
    pub history: Vec<Message>,
    pub state: ConversationState,
    pub created_at: Timestamp,
}

impl ConversationContext {
    pub const TASK_PLANNING: &'static str = "task-planning";

    pub fn new(id: impl Into<String>) -> Self {
        Self {
            context_type: Self::TASK_PLANNING.to_string(),
            id: id.into(),
            history: Vec::new(),
            state: ConversationState::default(),
            created_at: Timestamp::now(),
        }
    }

    /// Append a message and trim history to at most `max_history` entries.
    pub fn push_message(&mut self, message: Message, max_history: usize) {
        self.history.push(message);
        self.trim_history(max_history);
    }

    /// Drop messages from the middle, keeping the first message and the most
    /// recent window.
    pub fn trim_history(&mut self, max_history: usize) {
        let len = self.history.len();
        if max_history == 0 || len <= max_history {
            return;
        }
        if max_history == 1 {
            self.history.truncate(1);
            return;
        }
        let keep_recent = max_history - 1;
        self.history.drain(1..len - keep_recent);
    }

    /// Timestamp of the latest message, or creation time for an empty history.
    pub fn last_activity(&self) -> Timestamp {
        self.history
            .last()
            .map(|m| m.timestamp)
            .unwrap_or(self.created_at)
    }

    /// Recent history rendered as `role: content` lines, oldest first.
    pub fn transcript(&self, last: usize) -> String {
        let skip = self.history.len().saturating_sub(last);
        self.history
            .iter()
            .skip(skip)
            .map(|m| format!("{}: {}", m.role.as_str(), m.content))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Record an action as done and drop it from pending.
    pub fn complete_action(&mut self, action: &str) {
        self.state.pending_actions.retain(|a| a != action);
        if !self.state.completed_actions.iter().any(|a| a == action) {
            self.state.completed_actions.push(action.to_string());
        }
    }
}
