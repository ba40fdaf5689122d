//! Domain Layer
//!
//! The core of Stevedore: planning logic without direct runtime access.
//!
//! ## Structure
//!
//! - `entities/` - Core domain entities (ServiceSpec, ServiceGraph, RuntimeContainer)
//! - `value_objects/` - Immutable value types (Fingerprint, DesiredState, ContainerId)
//! - `services/` - Domain services (DependencyResolver, ConvergencePlanner, OrphanDetector)
//! - `ports/` - Interface definitions for infrastructure
//!
//! ## Design Principles
//!
//! 1. **No I/O** - Runtime access only happens through the `RuntimeClient` port
//! 2. **Pure Functions** - Planning is stateless and testable
//! 3. **Ports & Adapters** - All I/O goes through trait-defined ports

pub mod entities;
pub mod ports;
pub mod services;
pub mod value_objects;
