//! Plan operations: creation, refinement, execution, status and SOWs.

use jiff::Timestamp;
use log::{debug, info, warn};
use serde_json::json;

use super::{PlanContext, SowSource, StateManager};
use crate::{
    display::PlanSummaries,
    error::{PlannerError, Result},
    handlers::StepOutcome,
    models::{
        rtf::clean_list, ExecuteOptions, ExecutionResult, Message, Phase, Plan, PlanRefinement,
        PlanStatus, PlanStatusView, RtfStructure, SowDocument, StepEvent, StepStatus,
    },
    sow_generator::SowOptions,
};

impl StateManager {
    /// Parse free text into an RTF structure.
    ///
    /// # Errors
    ///
    /// Returns `PlannerError::InvalidInput` if `input` is blank. Extraction
    /// failures are never errors; they yield a fallback structure.
    pub async fn parse_rtf(&self, input: &str, context: Option<&str>) -> Result<RtfStructure> {
        self.parser.parse(input, context).await
    }

    /// Turn a request into a registered draft plan.
    ///
    /// Parsing finishes before synthesis, and synthesis before registration.
    /// When a SOW is requested it is generated concurrently with synthesis,
    /// since both only depend on the parsed structure. A supplied session id
    /// gets a conversation context seeded with the request and the new plan.
    ///
    /// # Errors
    ///
    /// Returns `PlannerError::InvalidInput` for blank input and
    /// `PlannerError::CyclicDependency` if the plan cannot be registered.
    pub async fn create_task_plan(&self, input: &str, context: &PlanContext) -> Result<Plan> {
        let rtf = self.parser.parse(input, context.context.as_deref()).await?;

        let generate_sow = context.generate_sow.unwrap_or(self.config.generate_sow);
        let (action_plan, sow_document) = if generate_sow {
            let sow_options = context.sow_options.clone().unwrap_or_default();
            let (action_plan, sow) = tokio::join!(
                self.synthesizer.synthesize(&rtf),
                self.sow_generator.generate(&rtf, None, &sow_options)
            );
            (action_plan, Some(sow))
        } else {
            (self.synthesizer.synthesize(&rtf).await, None)
        };

        let mut plan = Plan::new(rtf, action_plan);
        plan.sow_document = sow_document;
        let created = plan.clone();
        self.plans.register(plan).await?;
        info!(
            "Created plan {} with {} step(s)",
            created.id,
            created.execution_plan.len()
        );

        if let Some(session_id) = context.session_id.as_deref() {
            let max_history = self.config.max_history;
            self.conversations
                .update(session_id, |conversation| {
                    conversation.push_message(Message::user(input), max_history);
                    conversation.push_message(
                        Message::assistant(format!(
                            "Created plan \"{}\" with {} step(s).",
                            created.title,
                            created.execution_plan.len()
                        )),
                        max_history,
                    );
                    let state = &mut conversation.state;
                    state.phase = Phase::Planning;
                    state.current_task = Some(created.title.clone());
                    state.pending_actions = created
                        .execution_plan
                        .iter()
                        .map(|s| s.name().to_string())
                        .collect();
                    state
                        .working_memory
                        .insert("planId".to_string(), json!(created.id));
                })
                .await;
        }

        Ok(created)
    }

    /// Apply feedback to a plan as an incremental annotation.
    ///
    /// The feedback is parsed as a secondary RTF signal. New requirements,
    /// constraints and keywords are merged into the plan's structure and the
    /// refinement is recorded; execution steps are never touched.
    ///
    /// # Errors
    ///
    /// Returns `PlannerError::PlanNotFound` for an unknown id and
    /// `PlannerError::InvalidInput` for blank feedback.
    pub async fn refine_plan(
        &self,
        plan_id: &str,
        feedback: &str,
        session_id: Option<&str>,
    ) -> Result<Plan> {
        let handle = self.plans.require(plan_id).await?;
        let mut plan = handle.lock().await;

        let context = format!("Refining the plan \"{}\": {}", plan.title, plan.description);
        let signal = self.parser.parse(feedback, Some(&context)).await?;

        let task = &mut plan.rtf_structure.task;
        let added_requirements = merge_new(&mut task.requirements, &signal.task.requirements);
        let added_constraints = merge_new(&mut task.constraints, &signal.task.constraints);
        if !signal.is_fallback() {
            merge_new(
                &mut plan.rtf_structure.metadata.keywords,
                &signal.metadata.keywords,
            );
        }

        plan.refinements.push(PlanRefinement {
            feedback: feedback.to_string(),
            intent: signal.task.intent.clone(),
            added_requirements,
            added_constraints,
            confidence: signal.confidence,
            at: Timestamp::now(),
        });
        plan.touch();
        let refined = plan.clone();
        drop(plan);

        info!(
            "Refined plan {} ({} refinement(s))",
            refined.id,
            refined.refinements.len()
        );

        if let Some(session_id) = session_id {
            let max_history = self.config.max_history;
            self.conversations
                .update(session_id, |conversation| {
                    conversation.push_message(Message::user(feedback), max_history);
                    conversation.push_message(
                        Message::assistant(format!("Updated plan \"{}\".", refined.title)),
                        max_history,
                    );
                })
                .await;
        }

        Ok(refined)
    }

    /// Run a plan's steps in list order.
    ///
    /// Completed steps are skipped. A step whose prerequisites are not all
    /// completed is marked blocked without being attempted; anything else is
    /// handed to the handler for its type. With `auto_execute` off the call
    /// returns after the first attempted step. The plan stays locked for the
    /// whole call, so concurrent executions of one plan run one after the
    /// other.
    ///
    /// # Errors
    ///
    /// Returns `PlannerError::PlanNotFound` for an unknown id and
    /// `PlannerError::InvalidInput` for a cancelled plan. Step failures are
    /// reported in the result's `errors`, not as `Err`.
    pub async fn execute_plan(
        &self,
        plan_id: &str,
        options: &ExecuteOptions,
    ) -> Result<ExecutionResult> {
        let handle = self.plans.require(plan_id).await?;
        let mut plan = handle.lock().await;

        if !plan.status.is_executable() {
            return Err(PlannerError::invalid_input("plan_id")
                .with_reason(format!("plan {plan_id} is {}", plan.status.as_str())));
        }
        plan.status = PlanStatus::InProgress;
        plan.touch();

        let mut errors = Vec::new();
        for index in 0..plan.execution_plan.len() {
            if plan.execution_plan[index].is_completed() {
                continue;
            }

            let unmet: Vec<String> = plan
                .unmet_prerequisites(&plan.execution_plan[index])
                .into_iter()
                .map(str::to_string)
                .collect();
            if !unmet.is_empty() {
                let step = &mut plan.execution_plan[index];
                let message = format!(
                    "Step {} ({}) is blocked: prerequisites not completed: {}",
                    step.id(),
                    step.name(),
                    unmet.join(", ")
                );
                debug!("{message}");
                step.status = StepStatus::Blocked;
                step.error = Some(message.clone());
                options.notify(step, StepEvent::Blocked);
                errors.push(message);
                continue;
            }

            let step_type = {
                let step = &mut plan.execution_plan[index];
                step.status = StepStatus::InProgress;
                step.error = None;
                step.started_at = Some(Timestamp::now());
                debug!("Starting step {} of plan {plan_id}", step.id());
                options.notify(step, StepEvent::Started);
                step.step.step_type
            };

            let outcome = match self.handlers.get(&step_type) {
                Some(handler) => {
                    let step = plan.execution_plan[index].clone();
                    handler.execute(&step, &plan).await
                }
                None => Err(PlannerError::Configuration {
                    message: format!("no handler for step type {}", step_type.as_str()),
                }),
            };

            let step = &mut plan.execution_plan[index];
            match outcome {
                Ok(StepOutcome {
                    success: true,
                    output,
                }) => {
                    step.status = StepStatus::Completed;
                    step.result = Some(output);
                    step.completed_at = Some(Timestamp::now());
                    debug!("Completed step {} of plan {plan_id}", step.id());
                    options.notify(step, StepEvent::Completed);
                }
                Ok(StepOutcome {
                    success: false,
                    output,
                }) => {
                    let message = format!("Step {} ({}) failed: {output}", step.id(), step.name());
                    warn!("{message}");
                    step.status = StepStatus::Blocked;
                    step.error = Some(message.clone());
                    options.notify(step, StepEvent::Failed);
                    errors.push(message);
                }
                Err(e) => {
                    let message = format!("Step {} ({}) errored: {e}", step.id(), step.name());
                    warn!("{message}");
                    step.status = StepStatus::Blocked;
                    step.error = Some(message.clone());
                    options.notify(step, StepEvent::Error);
                    errors.push(message);
                }
            }

            if !options.auto_execute {
                break;
            }
        }

        if plan.all_completed() {
            plan.status = PlanStatus::Completed;
            info!("Plan {plan_id} completed");
        }
        plan.touch();

        let completed_steps = plan
            .execution_plan
            .iter()
            .filter(|s| s.is_completed())
            .map(|s| s.id().to_string())
            .collect();

        Ok(ExecutionResult {
            success: errors.is_empty(),
            completed_steps,
            errors,
        })
    }

    /// Progress view of a plan. Unknown ids yield an empty view, not an
    /// error.
    pub async fn get_plan_status(&self, plan_id: &str) -> PlanStatusView {
        match self.plans.snapshot(plan_id).await {
            Some(plan) => PlanStatusView::from_plan(plan),
            None => PlanStatusView::default(),
        }
    }

    /// Generate a statement of work from an RTF structure or a registered
    /// plan. For a plan, its steps serve as effort hints and the document is
    /// stored on the plan.
    ///
    /// # Errors
    ///
    /// Returns `PlannerError::PlanNotFound` for an unknown plan id.
    pub async fn generate_sow(
        &self,
        source: SowSource<'_>,
        options: &SowOptions,
    ) -> Result<SowDocument> {
        match source {
            SowSource::Rtf(rtf) => Ok(self.sow_generator.generate(rtf, None, options).await),
            SowSource::Plan(plan_id) => {
                let handle = self.plans.require(plan_id).await?;
                let mut plan = handle.lock().await;
                let hints = plan.action_plan();
                let sow = self
                    .sow_generator
                    .generate(&plan.rtf_structure, Some(&hints), options)
                    .await;
                plan.sow_document = Some(sow.clone());
                plan.touch();
                info!("Stored statement of work on plan {plan_id}");
                Ok(sow)
            }
        }
    }

    /// Summaries of every registered plan, oldest first.
    pub async fn list_plans(&self) -> PlanSummaries {
        PlanSummaries(self.plans.list().await)
    }

    /// Destroy a plan and return its final state.
    ///
    /// # Errors
    ///
    /// Returns `PlannerError::PlanNotFound` for an unknown id.
    pub async fn remove_plan(&self, plan_id: &str) -> Result<Plan> {
        let handle = self
            .plans
            .remove(plan_id)
            .await
            .ok_or_else(|| PlannerError::plan_not_found(plan_id))?;
        let plan = handle.lock().await.clone();
        info!("Removed plan {plan_id}");
        Ok(plan)
    }

    /// Cancel a plan. Cancelled plans can no longer be executed; step states
    /// are left as they are.
    ///
    /// # Errors
    ///
    /// Returns `PlannerError::PlanNotFound` for an unknown id.
    pub async fn cancel_plan(&self, plan_id: &str) -> Result<Plan> {
        let handle = self.plans.require(plan_id).await?;
        let mut plan = handle.lock().await;
        plan.status = PlanStatus::Cancelled;
        plan.touch();
        info!("Cancelled plan {plan_id}");
        Ok(plan.clone())
    }

    /// Approve a draft plan.
    ///
    /// # Errors
    ///
    /// Returns `PlannerError::PlanNotFound` for an unknown id and
    /// `PlannerError::InvalidInput` if the plan is not a draft.
    pub async fn approve_plan(&self, plan_id: &str) -> Result<Plan> {
        let handle = self.plans.require(plan_id).await?;
        let mut plan = handle.lock().await;
        if plan.status != PlanStatus::Draft {
            return Err(PlannerError::invalid_input("plan_id").with_reason(format!(
                "only draft plans can be approved, plan {plan_id} is {}",
                plan.status.as_str()
            )));
        }
        plan.status = PlanStatus::Approved;
        plan.touch();
        Ok(plan.clone())
    }
}

/// Append the items of `incoming` missing from `existing`; returns what was
/// added.
fn merge_new(existing: &mut Vec<String>, incoming: &[String]) -> Vec<String> {
    let added: Vec<String> = clean_list(incoming.to_vec())
        .into_iter()
        .filter(|item| !existing.iter().any(|e| e.eq_ignore_ascii_case(item)))
        .collect();
    existing.extend(added.iter().cloned());
    added
}
