//! Reconcile Event Port
//!
//! Provides an observable interface for reconcile operations.
//! Enables progress reporting, JSON event streams, and debugging.

use crate::domain::services::ConvergenceAction;
use crate::domain::value_objects::DesiredState;

/// Event emitted during reconcile operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileEvent {
    /// Reconcile started
    Started {
        project: String,
        desired: DesiredState,
        dry_run: bool,
    },

    /// Planner decided an action for a service
    ServicePlanned {
        service: String,
        action: ConvergenceAction,
        containers: usize,
    },

    /// A runtime call was issued for a service
    ActionApplied { service: String, action: String },

    /// A modifier (stop, restart, scale, teardown) finished
    ModifierApplied { modifier: String, changed: bool },

    /// Containers owned by undeclared services were found
    OrphansDetected { count: usize },

    /// Reconcile completed
    Completed { changed: bool, services: usize },
}

/// Trait for receiving reconcile events
///
/// Implementations can be:
/// - JsonEventSink: NDJSON event stream for automation
/// - NoopEventSink: Silent operation
pub trait ReconcileEventSink {
    /// Handle a reconcile event
    fn on_event(&self, event: ReconcileEvent);

    /// Check if this sink wants per-service events
    ///
    /// Summary-only sinks skip `ServicePlanned` and `ActionApplied`.
    fn wants_detailed_events(&self) -> bool {
        true
    }
}

/// No-op event sink for silent operation
pub struct NoopEventSink;

impl ReconcileEventSink for NoopEventSink {
    fn on_event(&self, _event: ReconcileEvent) {}

    fn wants_detailed_events(&self) -> bool {
        false
    }
}
