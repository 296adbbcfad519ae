use crate::models::state::{slots, SessionState, Stage};
use crate::orchestrator::{TurnStatus, WorkflowOrchestrator};
use crate::stages::{AnalysisChain, FnStage, HandlerOutcome};
use serde_json::json;

fn silent_orchestrator(analysis: AnalysisChain) -> WorkflowOrchestrator {
    WorkflowOrchestrator::new(
        Box::new(FnStage::new("intake", slots::INITIAL_SCENARIO, |_| {
            Ok(HandlerOutcome::awaiting_silently())
        })),
        Box::new(FnStage::new("scoping", slots::RISK_SCENARIO_SUMMARY, |_| {
            Ok(HandlerOutcome::awaiting_silently())
        })),
        analysis,
    )
}

#[test]
fn test_prepopulated_slot_skips_waiting_stage() {
    // Output written by an earlier turn satisfies the stage even if the
    // handler still reports that it is waiting
    let orchestrator = silent_orchestrator(AnalysisChain::new());
    let mut state = SessionState::new();
    state.write_slot(slots::INITIAL_SCENARIO, json!("Laptop theft"));
    state.write_slot(slots::RISK_SCENARIO_SUMMARY, json!({"asset": "laptops"}));

    let report = orchestrator.advance(&mut state).unwrap();

    assert_eq!(report.status, TurnStatus::Completed);
    assert_eq!(state.stage(), Some(&Stage::Done));
    assert_eq!(report.transitions.len(), 3);
}

#[test]
fn test_null_slot_is_not_populated() {
    let orchestrator = silent_orchestrator(AnalysisChain::new());
    let mut state = SessionState::new();
    state.write_slot(slots::INITIAL_SCENARIO, serde_json::Value::Null);

    let report = orchestrator.advance(&mut state).unwrap();

    assert_eq!(report.status, TurnStatus::AwaitingInput);
    assert_eq!(state.stage(), Some(&Stage::Intake));
}

#[test]
fn test_completed_output_lands_in_declared_slot_only() {
    let analysis = AnalysisChain::new().then(Box::new(FnStage::new(
        "report_author",
        slots::FINAL_REPORT,
        |_| Ok(HandlerOutcome::completed("Quarterly exposure report")),
    )));
    let orchestrator = silent_orchestrator(analysis);
    let mut state = SessionState::new();
    state.set_stage(Stage::Analysis);
    state.write_slot(slots::RISK_SCENARIO_SUMMARY, json!({"asset": "crm"}));

    orchestrator.advance(&mut state).unwrap();

    let written: Vec<&str> = state.slots().keys().map(String::as_str).collect();
    assert_eq!(written, vec![slots::FINAL_REPORT, slots::RISK_SCENARIO_SUMMARY]);
}

#[test]
fn test_clear_slot_resets_presence() {
    let mut state = SessionState::new();
    state.write_slot(slots::FAIR_PARAMETERS, json!({"TEF": {"min": 1, "most_likely": 1, "max": 1}}));
    assert!(state.has_slot(slots::FAIR_PARAMETERS));

    assert!(state.clear_slot(slots::FAIR_PARAMETERS).is_some());
    assert!(!state.has_slot(slots::FAIR_PARAMETERS));
}
