//! In-crate orchestrator tests
//!
//! These use the crate-private slot writers to build sessions that external
//! callers can only reach through `SessionState::restore`.

mod test_turn_rule;
