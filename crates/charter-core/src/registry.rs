//! In-memory registries for plans and conversation contexts.
//!
//! Both registries are plain values injected into the state manager, so tests
//! and embedders can share or isolate them as they see fit.
//!
//! Each plan sits behind its own [`tokio::sync::Mutex`]. Holding a plan's
//! handle for the duration of an operation serializes every mutation of that
//! plan, while operations on different plans only share the short read lock on
//! the map itself.

use std::{collections::HashMap, sync::Arc};

use jiff::Timestamp;
use log::debug;
use tokio::sync::{Mutex, RwLock};

use crate::{
    error::{PlannerError, Result},
    models::{find_dependency_cycle, ConversationContext, Plan, PlanSummary},
};

/// Shared handle to one registered plan.
pub type PlanHandle = Arc<Mutex<Plan>>;

/// Plans keyed by id.
#[derive(Debug, Default)]
pub struct PlanRegistry {
    plans: RwLock<HashMap<String, PlanHandle>>,
}

impl PlanRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a plan under its id, replacing any previous plan with that id.
    ///
    /// # Errors
    ///
    /// Returns `PlannerError::CyclicDependency` if the plan's step
    /// prerequisites form a cycle.
    pub async fn register(&self, plan: Plan) -> Result<PlanHandle> {
        if let Some(steps) = find_dependency_cycle(
            plan.execution_plan
                .iter()
                .map(|s| (s.id(), s.step.prerequisites.as_slice())),
        ) {
            return Err(PlannerError::CyclicDependency {
                plan_id: plan.id,
                steps,
            });
        }

        let id = plan.id.clone();
        let handle = Arc::new(Mutex::new(plan));
        self.plans
            .write()
            .await
            .insert(id.clone(), Arc::clone(&handle));
        debug!("Registered plan {id}");
        Ok(handle)
    }

    pub async fn get(&self, id: &str) -> Option<PlanHandle> {
        self.plans.read().await.get(id).cloned()
    }

    /// Handle for `id`, or `PlanNotFound`.
    pub async fn require(&self, id: &str) -> Result<PlanHandle> {
        self.get(id)
            .await
            .ok_or_else(|| PlannerError::plan_not_found(id))
    }

    /// Copy of the plan's current state. Waits for any in-flight mutation.
    pub async fn snapshot(&self, id: &str) -> Option<Plan> {
        let handle = self.get(id).await?;
        let plan = handle.lock().await;
        Some(plan.clone())
    }

    pub async fn remove(&self, id: &str) -> Option<PlanHandle> {
        self.plans.write().await.remove(id)
    }

    /// Summaries of every plan, oldest first.
    pub async fn list(&self) -> Vec<PlanSummary> {
        let handles: Vec<PlanHandle> = self.plans.read().await.values().cloned().collect();
        let mut summaries = Vec::with_capacity(handles.len());
        for handle in handles {
            summaries.push(PlanSummary::from(&*handle.lock().await));
        }
        summaries.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        summaries
    }

    pub async fn len(&self) -> usize {
        self.plans.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.plans.read().await.is_empty()
    }
}

/// Conversation contexts keyed by session id.
#[derive(Debug, Default)]
pub struct ConversationRegistry {
    contexts: RwLock<HashMap<String, ConversationContext>>,
}

impl ConversationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, session_id: &str) -> Option<ConversationContext> {
        self.contexts.read().await.get(session_id).cloned()
    }

    /// Existing context for the session, or a fresh task-planning context.
    pub async fn get_or_create(&self, session_id: &str) -> ConversationContext {
        self.contexts
            .write()
            .await
            .entry(session_id.to_string())
            .or_insert_with(|| ConversationContext::new(session_id))
            .clone()
    }

    pub async fn insert(&self, context: ConversationContext) {
        self.contexts
            .write()
            .await
            .insert(context.id.clone(), context);
    }

    /// Apply `f` to the session's context, creating it first if needed, and
    /// return the updated copy.
    pub async fn update<F>(&self, session_id: &str, f: F) -> ConversationContext
    where
        F: FnOnce(&mut ConversationContext),
    {
        let mut contexts = self.contexts.write().await;
        let context = contexts
            .entry(session_id.to_string())
            .or_insert_with(|| ConversationContext::new(session_id));
        f(context);
        context.clone()
    }

    pub async fn remove(&self, session_id: &str) -> Option<ConversationContext> {
        self.contexts.write().await.remove(session_id)
    }

    /// Drop every context whose last activity is before `cutoff`.
    pub async fn cleanup_expired(&self, cutoff: Timestamp) -> usize {
        let mut contexts = self.contexts.write().await;
        let before = contexts.len();
        contexts.retain(|_, context| context.last_activity() >= cutoff);
        before - contexts.len()
    }

    pub async fn len(&self) -> usize {
        self.contexts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.contexts.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use jiff::SignedDuration;

    use super::*;
    use crate::models::{ActionPlan, ActionStep, Message, RtfStructure, StepType};

    fn plan_with(steps: &[(&str, &[&str])]) -> Plan {
        let steps = steps
            .iter()
            .map(|(id, prereqs)| ActionStep {
                id: id.to_string(),
                name: id.to_uppercase(),
                description: String::new(),
                step_type: StepType::Research,
                estimated_time: 1.0,
                prerequisites: prereqs.iter().map(|p| p.to_string()).collect(),
                deliverable: String::new(),
                tools: Vec::new(),
                validation_criteria: Vec::new(),
            })
            .collect();
        Plan::new(
            RtfStructure::fallback("registry test"),
            ActionPlan {
                steps,
                resources: Vec::new(),
                risk_assessment: Vec::new(),
                fallback: false,
            },
        )
    }

    #[tokio::test]
    async fn test_register_and_lookup() {
        let registry = PlanRegistry::new();
        let plan = plan_with(&[("a", &[]), ("b", &["a"])]);
        let id = plan.id.clone();

        registry.register(plan).await.unwrap();
        assert_eq!(registry.len().await, 1);
        assert_eq!(registry.snapshot(&id).await.unwrap().execution_plan.len(), 2);
        assert!(registry.get("missing").await.is_none());

        let err = registry.require("missing").await.unwrap_err();
        assert!(matches!(err, PlannerError::PlanNotFound { ref id } if id == "missing"));

        assert!(registry.remove(&id).await.is_some());
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_register_rejects_cycles() {
        let registry = PlanRegistry::new();
        let plan = plan_with(&[("a", &["c"]), ("b", &["a"]), ("c", &["b"])]);

        let err = registry.register(plan).await.unwrap_err();
        match err {
            PlannerError::CyclicDependency { steps, .. } => {
                assert_eq!(steps.first(), steps.last());
                assert_eq!(steps.len(), 4);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_list_returns_summaries() {
        let registry = PlanRegistry::new();
        registry.register(plan_with(&[("a", &[])])).await.unwrap();
        registry
            .register(plan_with(&[("a", &[]), ("b", &[])]))
            .await
            .unwrap();

        let summaries = registry.list().await;
        assert_eq!(summaries.len(), 2);
        assert!(summaries[0].created_at <= summaries[1].created_at);
    }

    #[tokio::test]
    async fn test_conversation_update_and_cleanup() {
        let registry = ConversationRegistry::new();
        assert!(registry.get("s1").await.is_none());

        let context = registry
            .update("s1", |c| c.push_message(Message::user("hello"), 50))
            .await;
        assert_eq!(context.history.len(), 1);
        assert_eq!(registry.get_or_create("s1").await.history.len(), 1);

        let mut stale = ConversationContext::new("s2");
        let mut old = Message::user("old");
        old.timestamp = Timestamp::now() - SignedDuration::from_hours(48);
        stale.history.push(old);
        registry.insert(stale).await;
        assert_eq!(registry.len().await, 2);

        let cutoff = Timestamp::now() - SignedDuration::from_hours(24);
        assert_eq!(registry.cleanup_expired(cutoff).await, 1);
        assert!(registry.get("s2").await.is_none());
        assert!(registry.get("s1").await.is_some());
        assert!(registry.remove("s1").await.is_some());
    }
}
