//! Use Case Factory
//!
//! Creates use cases with infrastructure dependencies wired up.
//! This is the dependency injection point for the binary.

use std::path::Path;
use std::sync::Arc;

use crate::application::ReconcileUseCase;
use crate::error::ReconcileResult;
use crate::infrastructure::{JsonEventSink, StateFileRuntime};

/// Type alias for the reconcile use case over a state file
pub type StateFileUseCase = ReconcileUseCase<StateFileRuntime>;

/// Create a reconcile use case backed by the state file at `state`
///
/// With `events`, reconcile events stream to stderr as NDJSON.
pub fn create_reconcile_use_case(state: &Path, events: bool) -> ReconcileResult<StateFileUseCase> {
    let use_case = ReconcileUseCase::new(StateFileRuntime::new(state))?;
    Ok(if events {
        use_case.with_events(Arc::new(JsonEventSink::stderr()))
    } else {
        use_case
    })
}
