mod common;

use std::sync::{Arc, Mutex};

use charter_core::{
    models::{ActionPlan, ActionStep, TaskType},
    ExecuteOptions, Plan, PlanContext, PlanStatus, PlannerError, RtfStructure, SowOptions,
    SowSource, StepEvent, StepStatus, StepType,
};
use common::{create_offline_manager, create_test_manager};

const PAPER_REQUEST: &str = "Write a 5-page IEEE paper on distributed caching";

fn hand_built_plan(steps: &[(&str, &[&str])]) -> Plan {
    let steps = steps
        .iter()
        .map(|(id, prerequisites)| ActionStep {
            id: (*id).to_string(),
            name: format!("Step {id}"),
            description: String::new(),
            step_type: StepType::Creation,
            estimated_time: 2.0,
            prerequisites: prerequisites.iter().map(|p| (*p).to_string()).collect(),
            deliverable: String::new(),
            tools: Vec::new(),
            validation_criteria: Vec::new(),
        })
        .collect();
    Plan::new(
        RtfStructure::fallback("Hand-built plan"),
        ActionPlan {
            steps,
            resources: Vec::new(),
            risk_assessment: Vec::new(),
            fallback: false,
        },
    )
}

#[tokio::test]
async fn test_parse_paper_request() {
    let manager = create_test_manager();

    let rtf = manager
        .parse_rtf(PAPER_REQUEST, None)
        .await
        .expect("Failed to parse request");

    assert!(rtf.task.task_type.is_document_family());
    assert_eq!(rtf.task.task_type, TaskType::Paper);
    assert_eq!(rtf.format.output_type, "document");
    assert!(rtf.confidence > 0.5);
    assert!(!rtf.is_fallback());
    assert_eq!(rtf.role, "academic writer");
}

#[tokio::test]
async fn test_parse_with_failing_backend_falls_back() {
    let manager = create_offline_manager();

    let rtf = manager
        .parse_rtf(PAPER_REQUEST, None)
        .await
        .expect("Fallback parse must not fail");

    assert!(rtf.metadata.fallback);
    assert_eq!(rtf.task.task_type, TaskType::General);
    assert_eq!(rtf.task.description, PAPER_REQUEST);
    assert!((0.0..=1.0).contains(&rtf.confidence));
    assert!(!rtf.format.output_type.is_empty());
}

#[tokio::test]
async fn test_parse_rejects_blank_input() {
    let manager = create_test_manager();
    let err = manager.parse_rtf("   ", None).await.expect_err("blank input");
    assert!(matches!(err, PlannerError::InvalidInput { .. }));
}

#[tokio::test]
async fn test_create_plan_with_failing_backend_has_one_step() {
    let manager = create_offline_manager();

    let plan = manager
        .create_task_plan(PAPER_REQUEST, &PlanContext::default())
        .await
        .expect("Failed to create plan");

    assert_eq!(plan.execution_plan.len(), 1);
    assert_eq!(plan.status, PlanStatus::Draft);
    assert!(plan.execution_plan[0].step.prerequisites.is_empty());
}

#[tokio::test]
async fn test_full_paper_workflow() {
    let manager = create_test_manager();

    let plan = manager
        .create_task_plan(
            PAPER_REQUEST,
            &PlanContext::for_session("session-1").with_sow(SowOptions::default()),
        )
        .await
        .expect("Failed to create plan");
    assert_eq!(plan.execution_plan.len(), 3);
    let sow = plan.sow_document.as_ref().expect("SOW requested");
    assert_eq!(sow.deliverables.len(), 2);
    assert!(!sow.fallback);

    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    let options = ExecuteOptions::default().with_callback(move |step, event| {
        sink.lock()
            .expect("event lock")
            .push((step.id().to_string(), event));
    });

    let result = manager
        .execute_plan(&plan.id, &options)
        .await
        .expect("Failed to execute plan");
    assert!(result.success);
    assert_eq!(result.completed_steps, vec!["research", "outline", "draft"]);

    let events = events.lock().expect("event lock");
    assert_eq!(events.len(), 6);
    assert_eq!(events[0], ("research".to_string(), StepEvent::Started));
    assert_eq!(events[5], ("draft".to_string(), StepEvent::Completed));

    let status = manager.get_plan_status(&plan.id).await;
    assert_eq!(status.progress, 1.0);
    assert!(status.next_step.is_none());
    assert!(status.blocked_steps.is_empty());
    let stored = status.plan.expect("plan exists");
    assert_eq!(stored.status, PlanStatus::Completed);

    let context = manager
        .get_conversation_context("session-1")
        .await
        .expect("session seeded");
    assert_eq!(context.history.len(), 2);
}

#[tokio::test]
async fn test_unmet_prerequisite_blocks_step() {
    let manager = create_test_manager();
    let mut plan = hand_built_plan(&[("a", &[]), ("b", &["a"])]);
    // "b" comes first in execution order, so "a" is still pending when it is reached
    plan.execution_plan.reverse();
    let plan_id = plan.id.clone();
    manager
        .plans()
        .register(plan)
        .await
        .expect("Failed to register plan");

    let result = manager
        .execute_plan(&plan_id, &ExecuteOptions::default())
        .await
        .expect("Failed to execute plan");

    assert!(!result.success);
    assert_eq!(result.completed_steps, vec!["a"]);
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].contains("Step b"));

    let status = manager.get_plan_status(&plan_id).await;
    assert_eq!(status.blocked_steps.len(), 1);
    assert_eq!(status.blocked_steps[0].status, StepStatus::Blocked);
    assert_eq!(status.blocked_steps[0].id(), "b");
    assert_eq!(status.progress, 0.5);
}

#[tokio::test]
async fn test_single_step_mode_advances_one_step_per_call() {
    let manager = create_test_manager();
    let plan = hand_built_plan(&[("a", &[]), ("b", &["a"]), ("c", &["b"])]);
    let plan_id = plan.id.clone();
    manager
        .plans()
        .register(plan)
        .await
        .expect("Failed to register plan");

    let first = manager
        .execute_plan(&plan_id, &ExecuteOptions::single_step())
        .await
        .expect("Failed to execute first step");
    assert_eq!(first.completed_steps, vec!["a"]);

    let second = manager
        .execute_plan(&plan_id, &ExecuteOptions::single_step())
        .await
        .expect("Failed to execute second step");
    assert_eq!(second.completed_steps, vec!["a", "b"]);

    let status = manager.get_plan_status(&plan_id).await;
    let next = status.next_step.expect("c is next");
    assert_eq!(next.id(), "c");
    assert_eq!(
        status.plan.expect("plan exists").status,
        PlanStatus::InProgress
    );
}

#[tokio::test]
async fn test_failing_backend_execution_reports_errors() {
    let manager = create_offline_manager();
    let plan = manager
        .create_task_plan(PAPER_REQUEST, &PlanContext::default())
        .await
        .expect("Failed to create plan");

    let result = manager
        .execute_plan(&plan.id, &ExecuteOptions::default())
        .await
        .expect("Step failures are not hard errors");

    assert!(!result.success);
    assert!(result.completed_steps.is_empty());
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].contains("offline"));
}

#[tokio::test]
async fn test_unknown_plan_ids() {
    let manager = create_test_manager();

    let status = manager.get_plan_status("plan_missing").await;
    assert!(status.plan.is_none());
    assert_eq!(status.progress, 0.0);
    assert!(status.blocked_steps.is_empty());

    let err = manager
        .refine_plan("plan_missing", "Add benchmarks", None)
        .await
        .expect_err("unknown plan");
    assert!(err.is_not_found());

    let err = manager
        .execute_plan("plan_missing", &ExecuteOptions::default())
        .await
        .expect_err("unknown plan");
    assert!(matches!(err, PlannerError::PlanNotFound { .. }));
}

#[tokio::test]
async fn test_cyclic_plan_rejected_at_registration() {
    let manager = create_test_manager();
    let plan = hand_built_plan(&[("a", &["b"]), ("b", &["a"])]);

    let err = manager
        .plans()
        .register(plan)
        .await
        .expect_err("cycle must be rejected");
    assert!(matches!(err, PlannerError::CyclicDependency { .. }));
    assert!(manager.list_plans().await.is_empty());
}

#[tokio::test]
async fn test_sow_pert_expectations() {
    let manager = create_test_manager();
    let rtf = manager
        .parse_rtf(PAPER_REQUEST, None)
        .await
        .expect("Failed to parse request");

    let sow = manager
        .generate_sow(SowSource::Rtf(&rtf), &SowOptions::default())
        .await
        .expect("Failed to generate SOW");

    for deliverable in &sow.deliverables {
        let e = &deliverable.estimate;
        assert!(e.optimistic <= e.most_likely && e.most_likely <= e.pessimistic);
        let expected = (e.optimistic + 4.0 * e.most_likely + e.pessimistic) / 6.0;
        assert!((e.expected - expected).abs() < 1e-9);
    }
    assert!((sow.deliverables[0].estimate.expected - 4.5).abs() < 1e-9);
    assert!((sow.deliverables[1].estimate.expected - 9.0).abs() < 1e-9);
}
