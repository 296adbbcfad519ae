//! Checkpoint Tests - Save/Load Session State
//!
//! Critical invariants tested:
//! - Exactness: a restored session equals the captured one
//! - Resumption: a restored session continues where it suspended
//! - Integrity: tampered or foreign-version snapshots are rejected

use risk_quant_core_rs::models::{slots, SessionState, Stage};
use risk_quant_core_rs::orchestrator::{
    SessionSnapshot, TurnStatus, WorkflowError, WorkflowOrchestrator, SNAPSHOT_VERSION,
};
use risk_quant_core_rs::stages::{AnalysisChain, FnStage, HandlerOutcome, QuantitativeRiskStage};
use risk_quant_core_rs::QuantConfig;
use serde_json::json;
use std::collections::BTreeMap;
use uuid::Uuid;

// ============================================================================
// Test Helpers
// ============================================================================

fn orchestrator() -> WorkflowOrchestrator {
    WorkflowOrchestrator::new(
        Box::new(FnStage::new("intake", slots::INITIAL_SCENARIO, |_| {
            Ok(HandlerOutcome::completed("Ransomware on the billing database"))
        })),
        Box::new(FnStage::new("scoping", slots::RISK_SCENARIO_SUMMARY, |state| {
            // Waits until the user has confirmed the asset
            match state.slot("confirmed_asset") {
                Some(asset) => Ok(HandlerOutcome::completed(json!({"asset": asset}))),
                None => Ok(HandlerOutcome::awaiting("Which system holds the billing data?")),
            }
        })),
        AnalysisChain::new()
            .then(Box::new(FnStage::new("factor_estimation", slots::FAIR_PARAMETERS, |_| {
                Ok(HandlerOutcome::completed(json!({
                    "TEF": {"min": 0.5, "most_likely": 1.5, "max": 4},
                    "Vuln": {"min": 0.05, "most_likely": 0.2, "max": 0.6},
                    "LM_Primary": {"min": 250000, "most_likely": 750000, "max": 3000000}
                })))
            })))
            .then(Box::new(QuantitativeRiskStage::new(
                QuantConfig::default().with_trials(500).with_seed(99),
            ))),
    )
}

fn simulated_session() -> SessionState {
    let mut stored = BTreeMap::new();
    stored.insert(slots::INITIAL_SCENARIO.to_string(), json!("Ransomware"));
    stored.insert(slots::RISK_SCENARIO_SUMMARY.to_string(), json!({"asset": "billing"}));
    let mut session = SessionState::restore(Uuid::new_v4(), Some(Stage::Analysis), stored);
    orchestrator().advance(&mut session).unwrap();
    session
}

// ============================================================================
// Round Trip
// ============================================================================

#[test]
fn test_fresh_session_round_trip() {
    let session = SessionState::new();
    let snapshot = SessionSnapshot::capture(&session).unwrap();

    assert_eq!(snapshot.version, SNAPSHOT_VERSION);
    assert_eq!(snapshot.stage, None);
    assert_eq!(snapshot.restore().unwrap(), session);
}

#[test]
fn test_restored_session_is_identical_after_json() {
    let session = simulated_session();
    assert_eq!(session.stage(), Some(&Stage::Done));

    let json = SessionSnapshot::capture(&session).unwrap().to_json().unwrap();
    let restored = SessionSnapshot::from_json(&json).unwrap().restore().unwrap();

    assert_eq!(restored, session);
    assert_eq!(
        restored.slot(slots::SIMULATION_RESULTS),
        session.slot(slots::SIMULATION_RESULTS)
    );
}

#[test]
fn test_fingerprint_is_deterministic() {
    let session = simulated_session();
    let a = SessionSnapshot::capture(&session).unwrap();
    let b = SessionSnapshot::capture(&session).unwrap();

    assert_eq!(a.fingerprint, b.fingerprint);
    assert_eq!(a.fingerprint.len(), 64);
}

#[test]
fn test_suspended_session_resumes_after_restore() {
    let orchestrator = orchestrator();
    let mut session = SessionState::new();

    let report = orchestrator.advance(&mut session).unwrap();
    assert_eq!(report.status, TurnStatus::AwaitingInput);
    assert_eq!(session.stage(), Some(&Stage::Scoping));

    // Persist, then answer the question in a "later process"
    let json = SessionSnapshot::capture(&session).unwrap().to_json().unwrap();
    let restored = SessionSnapshot::from_json(&json).unwrap().restore().unwrap();
    let (id, stage, mut stored) = restored.into_parts();
    stored.insert("confirmed_asset".to_string(), json!("billing-db-01"));
    let mut resumed = SessionState::restore(id, stage, stored);

    let report = orchestrator.advance(&mut resumed).unwrap();
    assert_eq!(report.status, TurnStatus::Completed);
    assert_eq!(resumed.id(), session.id());
    assert!(resumed.has_slot(slots::SIMULATION_RESULTS));
}

#[test]
fn test_legacy_stage_name_loads() {
    let session = SessionState::restore(Uuid::new_v4(), Some(Stage::Intake), BTreeMap::new());
    let json = SessionSnapshot::capture(&session)
        .unwrap()
        .to_json()
        .unwrap()
        .replace("\"intake\"", "\"greeting\"");

    let snapshot = SessionSnapshot::from_json(&json).unwrap();
    assert_eq!(snapshot.stage, Some(Stage::Intake));
    assert_eq!(snapshot.restore().unwrap(), session);
}

// ============================================================================
// Integrity
// ============================================================================

#[test]
fn test_tampered_slot_is_rejected() {
    let session = simulated_session();
    let mut snapshot = SessionSnapshot::capture(&session).unwrap();
    snapshot
        .slots
        .insert(slots::FINAL_REPORT.to_string(), json!("Everything is fine."));

    let err = snapshot.restore().unwrap_err();
    assert!(matches!(err, WorkflowError::StateValidationError(_)));
}

#[test]
fn test_tampered_stage_is_rejected() {
    let session = simulated_session();
    let mut snapshot = SessionSnapshot::capture(&session).unwrap();
    snapshot.stage = Some(Stage::Scoping);

    assert!(matches!(
        snapshot.restore().unwrap_err(),
        WorkflowError::StateValidationError(_)
    ));
}

#[test]
fn test_unknown_version_is_rejected() {
    let mut snapshot = SessionSnapshot::capture(&SessionState::new()).unwrap();
    snapshot.version = SNAPSHOT_VERSION + 1;

    let err = snapshot.restore().unwrap_err();
    assert!(err.to_string().contains("layout version"));
}

#[test]
fn test_malformed_json_is_serialization_error() {
    let err = SessionSnapshot::from_json("{\"version\": 1").unwrap_err();
    assert!(matches!(err, WorkflowError::SerializationError(_)));
}
