//! Convergence planning service
//!
//! Pure domain logic deciding, per service, what has to happen for the
//! runtime to match the graph. No runtime calls are made here; the caller
//! hands in a snapshot taken beforehand.

use std::fmt;

use serde::Serialize;

use crate::domain::entities::{RuntimeContainer, ServiceSpec};
use crate::domain::services::RuntimeSnapshot;
use crate::domain::value_objects::ContainerId;

/// The action to take for a service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConvergenceAction {
    /// Already converged
    None,
    /// No containers yet
    Create,
    /// Replace existing containers
    Recreate,
    /// Containers match but some are not running
    Start,
}

impl ConvergenceAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConvergenceAction::None => "none",
            ConvergenceAction::Create => "create",
            ConvergenceAction::Recreate => "recreate",
            ConvergenceAction::Start => "start",
        }
    }

    /// Whether this action changes runtime state
    pub fn is_change(&self) -> bool {
        !matches!(self, ConvergenceAction::None)
    }
}

impl fmt::Display for ConvergenceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Planner switches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanOptions {
    /// Recreate every existing container, drift or not
    pub force_recreate: bool,
    /// Recreate containers whose fingerprint drifted
    pub allow_recreate: bool,
}

impl Default for PlanOptions {
    fn default() -> Self {
        Self {
            force_recreate: false,
            allow_recreate: true,
        }
    }
}

/// A planned action for a single service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedService {
    pub service: ServiceSpec,
    pub action: ConvergenceAction,
    /// Containers the action touches (empty for `Create`)
    pub containers: Vec<RuntimeContainer>,
}

impl PlannedService {
    pub fn name(&self) -> &str {
        self.service.name()
    }

    pub fn container_ids(&self) -> Vec<ContainerId> {
        self.containers.iter().map(|c| c.id.clone()).collect()
    }

    pub fn is_change(&self) -> bool {
        self.action.is_change()
    }
}

/// Ordered result of planning
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConvergencePlan {
    entries: Vec<PlannedService>,
}

impl ConvergencePlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, entry: PlannedService) {
        self.entries.push(entry);
    }

    /// Every planned service, in resolved order, including no-ops
    pub fn entries(&self) -> &[PlannedService] {
        &self.entries
    }

    /// Entries whose action changes runtime state
    pub fn actions(&self) -> impl Iterator<Item = &PlannedService> {
        self.entries.iter().filter(|e| e.is_change())
    }

    pub fn action_count(&self) -> usize {
        self.actions().count()
    }

    /// True iff at least one service needs an action
    pub fn changed(&self) -> bool {
        self.entries.iter().any(PlannedService::is_change)
    }

    pub fn get(&self, service: &str) -> Option<&PlannedService> {
        self.entries.iter().find(|e| e.name() == service)
    }
}

/// Pure planning service
#[derive(Debug, Clone, Copy, Default)]
pub struct ConvergencePlanner {
    options: PlanOptions,
}

impl ConvergencePlanner {
    pub fn new(options: PlanOptions) -> Self {
        Self { options }
    }

    /// Plan every service in the given (already resolved) order
    pub fn plan(&self, ordered: &[&ServiceSpec], snapshot: &RuntimeSnapshot) -> ConvergencePlan {
        let mut plan = ConvergencePlan::new();
        for service in ordered {
            let existing = snapshot.containers(service.name());
            let (action, containers) = self.plan_service(service, existing);
            plan.add(PlannedService {
                service: (*service).clone(),
                action,
                containers,
            });
        }
        plan
    }

    /// Decide the action for one service
    ///
    /// Rules, first match wins: no containers → create; force → recreate all;
    /// drift with recreation allowed → recreate all; any stopped → start the
    /// stopped ones; otherwise nothing.
    pub fn plan_service(
        &self,
        service: &ServiceSpec,
        existing: &[RuntimeContainer],
    ) -> (ConvergenceAction, Vec<RuntimeContainer>) {
        if existing.is_empty() {
            return (ConvergenceAction::Create, Vec::new());
        }

        if self.options.force_recreate {
            return (ConvergenceAction::Recreate, existing.to_vec());
        }

        let desired = service.fingerprint();
        if self.options.allow_recreate && existing.iter().any(|c| !c.matches(&desired)) {
            return (ConvergenceAction::Recreate, existing.to_vec());
        }

        let stopped: Vec<RuntimeContainer> =
            existing.iter().filter(|c| !c.running).cloned().collect();
        if !stopped.is_empty() {
            return (ConvergenceAction::Start, stopped);
        }

        (ConvergenceAction::None, Vec::new())
    }
}
