//! Checkpoint - Save/Load Session State
//!
//! Serializes a suspended session so it can be resumed later, possibly in
//! another process.
//!
//! # Critical Invariants
//!
//! - **Layout versioning**: slot names are a contract with external
//!   handlers; a snapshot from a different layout version is rejected
//! - **Integrity**: the SHA-256 fingerprint of the canonical JSON must
//!   match on restore
//! - **Exactness**: restore yields a session equal to the captured one

use crate::models::state::{SessionState, Stage};
use crate::orchestrator::WorkflowError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Current slot layout version
pub const SNAPSHOT_VERSION: u32 = 1;

// ============================================================================
// Snapshot Structures
// ============================================================================

/// Complete session snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub version: u32,
    pub session_id: Uuid,
    pub stage: Option<Stage>,
    pub slots: BTreeMap<String, Value>,
    /// SHA-256 of the canonical JSON of all fields above
    pub fingerprint: String,
}

#[derive(Serialize)]
struct FingerprintInput<'a> {
    version: u32,
    session_id: &'a Uuid,
    stage: &'a Option<Stage>,
    slots: &'a BTreeMap<String, Value>,
}

impl SessionSnapshot {
    /// Capture a session
    pub fn capture(state: &SessionState) -> Result<Self, WorkflowError> {
        let (session_id, stage, slots) = state.clone().into_parts();
        let fingerprint = compute_fingerprint(&FingerprintInput {
            version: SNAPSHOT_VERSION,
            session_id: &session_id,
            stage: &stage,
            slots: &slots,
        })?;

        Ok(SessionSnapshot {
            version: SNAPSHOT_VERSION,
            session_id,
            stage,
            slots,
            fingerprint,
        })
    }

    /// Rebuild the session after validating version and fingerprint
    pub fn restore(self) -> Result<SessionState, WorkflowError> {
        validate_snapshot(&self)?;
        Ok(SessionState::restore(self.session_id, self.stage, self.slots))
    }

    pub fn to_json(&self) -> Result<String, WorkflowError> {
        serde_json::to_string(self).map_err(|e| {
            WorkflowError::SerializationError(format!("Snapshot serialization failed: {}", e))
        })
    }

    pub fn from_json(json: &str) -> Result<Self, WorkflowError> {
        serde_json::from_str(json).map_err(|e| {
            WorkflowError::SerializationError(format!("Snapshot deserialization failed: {}", e))
        })
    }
}

// ============================================================================
// Fingerprinting
// ============================================================================

/// Compute deterministic SHA256 hash of any serializable value
///
/// Uses canonical JSON serialization with sorted keys so the hash does not
/// depend on map iteration order.
pub fn compute_fingerprint<T: Serialize>(value: &T) -> Result<String, WorkflowError> {
    fn canonicalize(value: Value) -> Value {
        match value {
            Value::Object(map) => {
                let sorted: BTreeMap<String, Value> =
                    map.into_iter().map(|(k, v)| (k, canonicalize(v))).collect();
                Value::Object(sorted.into_iter().collect())
            }
            Value::Array(arr) => Value::Array(arr.into_iter().map(canonicalize).collect()),
            other => other,
        }
    }

    let value = serde_json::to_value(value).map_err(|e| {
        WorkflowError::SerializationError(format!("Fingerprint serialization failed: {}", e))
    })?;

    let json = serde_json::to_string(&canonicalize(value)).map_err(|e| {
        WorkflowError::SerializationError(format!("Fingerprint serialization failed: {}", e))
    })?;

    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

// ============================================================================
// Validation
// ============================================================================

/// Check layout version and fingerprint
pub fn validate_snapshot(snapshot: &SessionSnapshot) -> Result<(), WorkflowError> {
    if snapshot.version != SNAPSHOT_VERSION {
        return Err(WorkflowError::StateValidationError(format!(
            "Unsupported snapshot layout version {} (expected {})",
            snapshot.version, SNAPSHOT_VERSION
        )));
    }

    let expected = compute_fingerprint(&FingerprintInput {
        version: snapshot.version,
        session_id: &snapshot.session_id,
        stage: &snapshot.stage,
        slots: &snapshot.slots,
    })?;

    if expected != snapshot.fingerprint {
        return Err(WorkflowError::StateValidationError(format!(
            "Fingerprint mismatch for session {}: snapshot was modified",
            snapshot.session_id
        )));
    }

    Ok(())
}
