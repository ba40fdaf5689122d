//! Domain Entities
//!
//! - `ServiceSpec` / `ContainerConfig` - Desired shape of one service
//! - `ServiceGraph` - The desired project with its dependency edges
//! - `RuntimeContainer` / `ContainerInspection` - Read-only runtime views

mod container;
mod graph;
mod service;

pub use container::{ContainerInspection, NetworkAttachment, RuntimeContainer};
pub use graph::{ServiceGraph, ServiceGraphBuilder};
pub use service::{ContainerConfig, ServiceSpec};
