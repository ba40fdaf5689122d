//! Domain Services
//!
//! Pure business logic with no I/O beyond the ports handed in.

pub mod dependency_resolver;
pub mod facts;
pub mod orphan_detector;
pub mod planner;
pub mod snapshot;

pub use dependency_resolver::DependencyResolver;
pub use facts::{ContainerFacts, ContainerState, NetworkFacts};
pub use orphan_detector::{OrphanDetectionResult, OrphanDetector};
pub use planner::{
    ConvergenceAction, ConvergencePlan, ConvergencePlanner, PlanOptions, PlannedService,
};
pub use snapshot::RuntimeSnapshot;
