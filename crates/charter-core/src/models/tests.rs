#[cfg(test)]
mod model_tests {
    use crate::models::{
        find_dependency_cycle,
        rtf::{clamp_confidence, summarize, DEFAULT_CONFIDENCE, DEFAULT_ROLE},
        ActionPlan, ActionStep, Budget, ConversationContext, Message, Phase, Plan, PlanStatus,
        PlanStatusView, PlanSummary, RawRtf, Risk, RtfStructure, StepStatus, StepType, TaskScope,
        TaskType,
    };

    fn step(id: &str, prerequisites: &[&str]) -> ActionStep {
        ActionStep {
            id: id.to_string(),
            name: format!("Step {id}"),
            description: format!("Do {id}"),
            step_type: StepType::Analysis,
            estimated_time: 1.0,
            prerequisites: prerequisites.iter().map(|p| p.to_string()).collect(),
            deliverable: format!("{id} output"),
            tools: Vec::new(),
            validation_criteria: Vec::new(),
        }
    }

    fn create_test_plan() -> Plan {
        let action_plan = ActionPlan {
            steps: vec![step("a", &[]), step("b", &["a"]), step("c", &[])],
            resources: Vec::new(),
            risk_assessment: Vec::new(),
            fallback: false,
        };
        Plan::new(RtfStructure::fallback("Organize the quarterly review"), action_plan)
    }

    fn edges(steps: &[ActionStep]) -> Option<Vec<String>> {
        find_dependency_cycle(
            steps
                .iter()
                .map(|s| (s.id.as_str(), s.prerequisites.as_slice())),
        )
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!("in_progress".parse::<PlanStatus>(), Ok(PlanStatus::InProgress));
        assert_eq!("Canceled".parse::<PlanStatus>(), Ok(PlanStatus::Cancelled));
        assert!("archived".parse::<PlanStatus>().is_err());
        assert_eq!("blocked".parse::<StepStatus>(), Ok(StepStatus::Blocked));
        assert_eq!(
            serde_json::to_string(&StepStatus::InProgress).unwrap(),
            "\"in-progress\""
        );
        assert!(!PlanStatus::Cancelled.is_executable());
        assert!(PlanStatus::Completed.is_executable());
    }

    #[test]
    fn test_lenient_category_parsing() {
        assert_eq!("paper_writing".parse::<TaskType>(), Ok(TaskType::Paper));
        assert_eq!("Slide deck".parse::<TaskType>(), Ok(TaskType::Presentation));
        assert_eq!("".parse::<TaskType>(), Ok(TaskType::General));
        assert!("juggling".parse::<TaskType>().is_err());
        assert_eq!("multi_step".parse::<TaskScope>(), Ok(TaskScope::MultiStep));
        assert_eq!("drafting".parse::<StepType>(), Ok(StepType::Creation));
        assert_eq!("Technical work".parse::<StepType>(), Ok(StepType::Technical));
    }

    #[test]
    fn test_from_raw_fills_required_sections() {
        let input = "Prepare onboarding notes";
        let rtf = RtfStructure::from_raw(RawRtf::default(), input);

        assert_eq!(rtf.role, DEFAULT_ROLE);
        assert_eq!(rtf.task.task_type, TaskType::General);
        assert_eq!(rtf.task.description, input);
        assert_eq!(rtf.task.intent, input);
        assert_eq!(rtf.format.output_type, "text");
        assert_eq!(rtf.confidence, DEFAULT_CONFIDENCE);
        assert!(!rtf.is_fallback());
    }

    #[test]
    fn test_confidence_clamping() {
        assert_eq!(clamp_confidence(Some(0.4)), 0.4);
        assert_eq!(clamp_confidence(Some(1.0)), 1.0);
        assert_eq!(clamp_confidence(Some(-0.2)), DEFAULT_CONFIDENCE);
        assert_eq!(clamp_confidence(Some(1.5)), DEFAULT_CONFIDENCE);
        assert_eq!(clamp_confidence(Some(f64::NAN)), DEFAULT_CONFIDENCE);
        assert_eq!(clamp_confidence(None), DEFAULT_CONFIDENCE);
    }

    #[test]
    fn test_summarize_cuts_long_lines() {
        let long = "x".repeat(150);
        let intent = summarize(&long);
        assert_eq!(intent.chars().count(), 103);
        assert!(intent.ends_with("..."));
        assert_eq!(summarize("\n  first line  \nsecond"), "first line");
    }

    #[test]
    fn test_history_keeps_first_and_recent_messages() {
        let mut context = ConversationContext::new("session-1");
        for i in 0..6 {
            context.push_message(Message::user(format!("m{i}")), 3);
        }
        let contents: Vec<&str> = context.history.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["m0", "m4", "m5"]);
        assert_eq!(context.last_activity(), context.history[2].timestamp);
        assert_eq!(context.transcript(2), "user: m4\nuser: m5");
    }

    #[test]
    fn test_complete_action_moves_from_pending() {
        let mut context = ConversationContext::new("session-1");
        context.state.pending_actions = vec!["draft outline".to_string(), "collect refs".to_string()];
        context.complete_action("draft outline");
        context.complete_action("draft outline");

        assert_eq!(context.state.pending_actions, vec!["collect refs"]);
        assert_eq!(context.state.completed_actions, vec!["draft outline"]);
        assert_eq!(context.state.phase, Phase::Initiation);
    }

    #[test]
    fn test_dependency_cycle_detection() {
        assert_eq!(edges(&[step("a", &[]), step("b", &["a"])]), None);
        assert_eq!(
            edges(&[step("a", &["b"]), step("b", &["a"])]),
            Some(vec!["a".to_string(), "b".to_string(), "a".to_string()])
        );
        assert_eq!(
            edges(&[step("a", &["a"])]),
            Some(vec!["a".to_string(), "a".to_string()])
        );
        // Unknown ids are not edges.
        assert_eq!(edges(&[step("a", &["ghost"])]), None);
        // Diamond shapes are fine.
        assert_eq!(
            edges(&[
                step("a", &[]),
                step("b", &["a"]),
                step("c", &["a"]),
                step("d", &["b", "c"]),
            ]),
            None
        );
    }

    #[test]
    fn test_plan_progress_and_prerequisites() {
        let mut plan = create_test_plan();
        assert!(plan.id.starts_with("plan_"));
        assert_eq!(plan.status, PlanStatus::Draft);
        assert_eq!(plan.progress(), 0.0);
        assert!(plan.execution_plan.iter().all(|s| s.status == StepStatus::Pending));

        let b = plan.step("b").cloned().unwrap();
        assert_eq!(plan.unmet_prerequisites(&b), vec!["a"]);

        plan.execution_plan[0].status = StepStatus::Completed;
        assert!(plan.prerequisites_met(&b));
        assert!((plan.progress() - 1.0 / 3.0).abs() < 1e-9);
        assert!(!plan.all_completed());
        assert_eq!(plan.action_plan().total_hours(), 3.0);
    }

    #[test]
    fn test_status_view_picks_first_ready_step() {
        let mut plan = create_test_plan();
        plan.execution_plan[0].status = StepStatus::Blocked;

        let view = PlanStatusView::from_plan(plan);
        // "b" waits on "a", so "c" is next.
        assert_eq!(view.next_step.as_ref().map(|s| s.id()), Some("c"));
        assert_eq!(view.blocked_steps.len(), 1);
        assert_eq!(view.progress, 0.0);

        let empty = PlanStatusView::default();
        assert!(empty.plan.is_none());
        assert_eq!(empty.progress, 0.0);
        assert!(empty.blocked_steps.is_empty());
    }

    #[test]
    fn test_plan_summary_counts() {
        let mut plan = create_test_plan();
        plan.execution_plan[0].status = StepStatus::Completed;
        plan.execution_plan[1].status = StepStatus::Blocked;

        let summary = PlanSummary::from(&plan);
        assert_eq!(summary.total_steps, 3);
        assert_eq!(summary.completed_steps, 1);
        assert_eq!(summary.blocked_steps, 1);
        assert!(!summary.has_sow);
    }

    #[test]
    fn test_risk_and_budget_arithmetic() {
        let risk = Risk::new("r".into(), "c".into(), 1.4, 0.5, String::new());
        assert_eq!(risk.probability, 1.0);
        assert_eq!(risk.score, 0.5);

        let budget = Budget::compute(10.0, 50.0, -5.0, 100.0);
        assert_eq!(budget.labor_cost, 500.0);
        assert_eq!(budget.tool_costs, 0.0);
        assert_eq!(budget.subtotal, 600.0);
        assert!((budget.total - 690.0).abs() < 1e-9);
        assert_eq!(budget.line_items.len(), 4);
        assert_eq!(budget.line_items[3].item, "Contingency (15%)");
    }

    #[test]
    fn test_plan_serializes_camel_case() {
        let plan = create_test_plan();
        let json = serde_json::to_value(&plan).unwrap();
        assert!(json.get("rtfStructure").is_some());
        assert!(json.get("sowDocument").is_none());
        let first = &json["executionPlan"][0];
        assert_eq!(first["id"], "a");
        assert_eq!(first["type"], "analysis");
        assert_eq!(first["status"], "pending");

        let back: Plan = serde_json::from_value(json).unwrap();
        assert_eq!(back, plan);
    }
}
