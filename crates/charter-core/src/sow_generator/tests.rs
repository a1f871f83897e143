//! Tests for the SOW generator.

use jiff::civil::date;

use super::*;
use crate::{
    completion::{FnCompletion, UnavailableCompletion},
    models::{sow::CONTINGENCY_RATE, RiskLevel},
};

fn generator(response: &'static str) -> SowGenerator {
    SowGenerator::new(
        Arc::new(FnCompletion::new(move |_: &str| Ok(response.to_string()))),
        &PipelineConfig::default(),
    )
}

fn options() -> SowOptions {
    SowOptions {
        start_date: Some(date(2025, 3, 3)),
        ..SowOptions::default()
    }
}

fn rtf() -> RtfStructure {
    RtfStructure::fallback("Write a 5-page IEEE paper on distributed caching")
}

const SOW_RESPONSE: &str = r#"{
  "scope": {"summary": "Paper on distributed caching", "objectives": ["Publishable draft"]},
  "deliverables": [
    {"name": "Literature review", "optimistic": 4, "mostLikely": 6, "pessimistic": 14},
    {"name": "Paper draft", "optimistic": 10, "mostLikely": 12, "pessimistic": 20}
  ],
  "resources": [{"role": "Researcher", "skills": ["caching"], "allocation": 0.5}],
  "risks": [
    {"description": "Reviewer turnaround", "category": "schedule", "probability": 0.5, "impact": 0.6},
    {"description": "Missing benchmarks", "probability": 0.2, "impact": 0.5}
  ],
  "toolCosts": 50,
  "externalCosts": 150
}"#;

#[test]
fn test_pert_expected_matches_formula() {
    let triples = [
        (1.0, 2.0, 3.0),
        (0.0, 0.0, 0.0),
        (2.5, 4.0, 12.0),
        (8.0, 8.0, 8.0),
        (0.5, 10.0, 100.0),
    ];
    for (o, m, p) in triples {
        let estimate = EffortEstimate::pert(o, m, p);
        let expected = (o + 4.0 * m + p) / 6.0;
        assert!((estimate.expected - expected).abs() < 1e-9, "{o} {m} {p}");
        assert!((estimate.standard_deviation - (p - o) / 6.0).abs() < 1e-9);
    }
}

#[test]
fn test_pert_sorts_out_of_order_triples() {
    let estimate = EffortEstimate::pert(10.0, 2.0, -4.0);
    assert_eq!(estimate.optimistic, 0.0);
    assert_eq!(estimate.most_likely, 2.0);
    assert_eq!(estimate.pessimistic, 10.0);
}

#[tokio::test]
async fn test_generate_from_model_output() {
    let sow = generator(SOW_RESPONSE)
        .generate(&rtf(), None, &options())
        .await;

    assert!(!sow.fallback);
    assert_eq!(sow.deliverables.len(), 2);
    // (4 + 24 + 14) / 6 = 7, (10 + 48 + 20) / 6 = 13
    assert!((sow.deliverables[0].estimate.expected - 7.0).abs() < 1e-9);
    assert!((sow.deliverables[1].estimate.expected - 13.0).abs() < 1e-9);

    let timeline = &sow.timeline;
    assert!((timeline.total_hours - 20.0).abs() < 1e-9);
    assert_eq!(timeline.total_days, 4); // ceil(20 / 6)
    assert_eq!(timeline.start_date, date(2025, 3, 3));
    assert_eq!(timeline.end_date, date(2025, 3, 7));
    let shares: Vec<f64> = timeline.phases.iter().map(|p| p.share).collect();
    assert_eq!(shares, vec![0.2, 0.6, 0.2]);
    assert!((timeline.phases[1].duration_days - 2.4).abs() < 1e-9);
    assert!((timeline.phases[2].start_offset_days - 3.2).abs() < 1e-9);
    assert_eq!(timeline.milestones.len(), 3);

    assert_eq!(sow.resource_plan[0].role, "Researcher");
    assert!((sow.resource_plan[0].hours - 10.0).abs() < 1e-9);

    let risk = &sow.risk_assessment;
    assert!((risk.risks[0].score - 0.3).abs() < 1e-9);
    assert!((risk.max_score - 0.3).abs() < 1e-9);
    assert!((risk.average_score - 0.2).abs() < 1e-9);
    assert_eq!(risk.overall_level, RiskLevel::Medium);

    let budget = sow.budget.expect("budget included by default");
    assert!((budget.labor_cost - 2000.0).abs() < 1e-9);
    assert!((budget.subtotal - 2200.0).abs() < 1e-9);
    assert!((budget.contingency - 2200.0 * CONTINGENCY_RATE).abs() < 1e-9);
    assert!((budget.total - 2530.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_generate_uses_action_plan_hints_when_estimates_missing() {
    let plan = ActionPlan::fallback("paper"); // one 2 h step
    let sow = generator(r#"{"deliverables": [{"name": "Outline"}]}"#)
        .generate(&rtf(), Some(&plan), &options())
        .await;

    let estimate = sow.deliverables[0].estimate;
    assert_eq!(estimate.most_likely, 2.0);
    assert_eq!(estimate.optimistic, 1.5);
    assert_eq!(estimate.pessimistic, 3.0);
}

#[tokio::test]
async fn test_generate_respects_option_overrides() {
    let opts = SowOptions {
        hourly_rate: Some(10.0),
        tool_costs: Some(0.0),
        external_costs: Some(0.0),
        ..options()
    };
    let sow = generator(SOW_RESPONSE).generate(&rtf(), None, &opts).await;
    let budget = sow.budget.unwrap();
    assert!((budget.total - 230.0).abs() < 1e-9);

    let no_budget = SowOptions {
        include_budget: false,
        ..options()
    };
    let sow = generator(SOW_RESPONSE).generate(&rtf(), None, &no_budget).await;
    assert!(sow.budget.is_none());
}

#[tokio::test]
async fn test_generate_failure_yields_fallback() {
    let generator = SowGenerator::new(
        Arc::new(UnavailableCompletion::default()),
        &PipelineConfig::default(),
    );
    let sow = generator.generate(&rtf(), None, &options()).await;

    assert!(sow.fallback);
    assert_eq!(sow.deliverables.len(), 1);
    assert_eq!(sow.timeline.total_days, 5);
    assert_eq!(sow.timeline.end_date, date(2025, 3, 8));
    assert!(sow.confidence < 0.5);
    assert!((sow.deliverables[0].estimate.expected - 30.0).abs() < 1e-9);
}

#[test]
fn test_risk_level_bands() {
    assert_eq!(RiskLevel::from_scores(0.0, 0.0), RiskLevel::Low);
    assert_eq!(RiskLevel::from_scores(0.3, 0.1), RiskLevel::Medium);
    assert_eq!(RiskLevel::from_scores(0.25, 0.2), RiskLevel::Medium);
    assert_eq!(RiskLevel::from_scores(0.6, 0.1), RiskLevel::High);
    assert_eq!(RiskLevel::from_scores(0.5, 0.45), RiskLevel::High);
    assert_eq!(RiskLevel::from_scores(0.85, 0.1), RiskLevel::Critical);
    assert_eq!(RiskLevel::from_scores(0.7, 0.65), RiskLevel::Critical);
    assert_eq!(RiskAssessment::new(Vec::new()).overall_level, RiskLevel::Low);
}

#[tokio::test]
async fn test_oversized_estimates_yield_fallback() {
    let sow = generator(
        r#"{"deliverables": [{"name": "Big", "optimistic": 1e9, "mostLikely": 1e9, "pessimistic": 1e9}]}"#,
    )
    .generate(&rtf(), None, &options())
    .await;

    assert!(sow.fallback);
    assert_eq!(sow.timeline.total_days, 5);
    assert_eq!(sow.timeline.end_date, date(2025, 3, 8));
}

#[tokio::test]
async fn test_tiny_hours_per_day_yields_fallback() {
    let options = SowOptions {
        hours_per_day: Some(0.0001),
        ..options()
    };
    let sow = generator(SOW_RESPONSE)
        .generate(&rtf(), None, &options)
        .await;

    assert!(sow.fallback);
    assert_eq!(sow.deliverables.len(), 1);
}

#[test]
fn test_days_for_bounds() {
    assert_eq!(days_for(0.0, 6.0), Some(1));
    assert_eq!(days_for(13.0, 6.0), Some(3));
    assert_eq!(days_for(f64::from(MAX_TIMELINE_DAYS) * 6.0, 6.0), Some(MAX_TIMELINE_DAYS));
    assert_eq!(days_for(1e12, 6.0), None);
    assert_eq!(days_for(f64::INFINITY, 6.0), None);
}

#[test]
fn test_add_days_out_of_range_keeps_date() {
    let start = date(2025, 3, 3);
    assert_eq!(add_days(start, 5), date(2025, 3, 8));
    assert_eq!(add_days(start, 10_000_000), start);
}
