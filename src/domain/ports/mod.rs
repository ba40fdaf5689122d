//! Domain Ports (Interfaces)
//!
//! These traits define the boundaries of the domain layer.
//! Infrastructure layer provides concrete implementations.

pub mod reconcile_events;
pub mod runtime_client;

pub use reconcile_events::{NoopEventSink, ReconcileEvent, ReconcileEventSink};
pub use runtime_client::{
    CallOptions, RuntimeClient, RuntimeError, RuntimeResult, TeardownOptions,
};
