//! Infrastructure Layer
//!
//! Concrete implementations of domain ports.
//! This layer handles all I/O operations.
//!
//! ## Structure
//!
//! - `runtime/` - Runtime clients (JSON state file)
//! - `events/` - Event sinks (JSON lines)

pub mod events;
pub mod runtime;

// Re-export for convenience
pub use events::JsonEventSink;
pub use runtime::StateFileRuntime;
