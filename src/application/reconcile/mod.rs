//! Reconcile Module
//!
//! The single entry point combining resolution, planning, execution,
//! modifiers, and fact collection.
//!
//! ## Structure
//!
//! - `options` - Configuration types (`ReconcileOptions`)
//! - `result` - Result types (`ExecutionResult`)
//! - `use_case` - Core use case logic (`ReconcileUseCase`)
//!
//! ## Usage
//!
//! ```ignore
//! use stevedore::application::reconcile::{ReconcileOptions, ReconcileUseCase};
//!
//! let use_case = ReconcileUseCase::new(runtime)?;
//! let result = use_case.up(&graph, &ReconcileOptions::new())?;
//! ```

mod options;
mod result;
mod use_case;

pub use options::ReconcileOptions;
pub use result::ExecutionResult;
pub use use_case::ReconcileUseCase;
