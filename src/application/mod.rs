//! Application Layer
//!
//! Use cases that orchestrate the business flow.
//! This layer:
//! - Depends on Domain layer (entities, services, ports)
//! - Does NOT contain planning rules (those are in Domain)
//! - Coordinates between the runtime client and Domain
//!
//! ## Use Cases
//!
//! - `ReconcileUseCase` - Resolve, plan, execute, apply modifiers, collect facts
//!
//! ## Services
//!
//! - `LifecycleExecutor` - Applies plans and direct commands (stop, restart, teardown)
//! - `ScaleReconciler` - Moves container counts toward targets
//! - `FactReporter` - Post-run fact collection

pub mod executor;
pub mod reconcile;
pub mod report;
pub mod scale;

#[cfg(test)]
pub(crate) mod testing;

pub use executor::LifecycleExecutor;
pub use reconcile::{ExecutionResult, ReconcileOptions, ReconcileUseCase};
pub use report::{
    ContainerRef, DiffAction, FactReporter, OperationOutcome, ProjectFacts, ServiceDiff,
};
pub use scale::{ScaleChange, ScaleReconciler};
