//! Domain Value Objects
//!
//! Immutable value types that represent domain concepts.

mod container_id;
mod desired_state;
mod fingerprint;
mod image_removal;

pub use container_id::ContainerId;
pub use desired_state::DesiredState;
pub use fingerprint::Fingerprint;
pub use image_removal::ImageRemoval;
