//! Stevedore - convergence engine for compose projects
//!
//! Stevedore takes a service graph (images, commands, dependencies, replica
//! counts) and a desired state, inspects what a container runtime currently
//! runs, and issues the minimal create/recreate/start/stop/scale/remove calls
//! that bring the two into agreement. Every run reports whether anything
//! changed, a per-service diff, and post-run container facts.
//!
//! ## Layers
//!
//! - `domain` - graph, planning rules, ports (no I/O)
//! - `application` - the reconcile use case and its executors
//! - `infrastructure` - state-file runtime, NDJSON event sink
//! - `config` - TOML configuration with environment overrides
//! - `presentation` - CLI definition and rendering

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod presentation;

// Re-exports for convenience
pub use application::{ExecutionResult, ReconcileOptions, ReconcileUseCase};
pub use config::EngineConfig;
pub use domain::entities::{ContainerConfig, ServiceGraph, ServiceSpec};
pub use domain::ports::{RuntimeClient, RuntimeError};
pub use domain::value_objects::{DesiredState, ImageRemoval};
pub use error::{ReconcileError, ReconcileResult};
pub use infrastructure::StateFileRuntime;
