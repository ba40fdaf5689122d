//! Fact & diff reporting
//!
//! Every operation (up, stop, restart, scale, teardown, orphan removal)
//! returns its own `OperationOutcome` fragment. The reconcile use case merges
//! them in a fixed order; nothing accumulates into shared state.

use std::collections::BTreeMap;

use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::debug;

use crate::domain::entities::{RuntimeContainer, ServiceGraph};
use crate::domain::ports::{CallOptions, RuntimeClient};
use crate::domain::services::{ContainerFacts, ConvergenceAction};
use crate::error::{ReconcileError, ReconcileResult};

/// Action name used as a key in a service's diff entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiffAction {
    Create,
    Recreate,
    Start,
    Stop,
    Restart,
    /// Orphan removed during `present`
    Removed,
    /// Container removed by teardown
    Deleted,
}

impl DiffAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiffAction::Create => "create",
            DiffAction::Recreate => "recreate",
            DiffAction::Start => "start",
            DiffAction::Stop => "stop",
            DiffAction::Restart => "restart",
            DiffAction::Removed => "removed",
            DiffAction::Deleted => "deleted",
        }
    }

    /// Diff key for a convergence action, `None` for no-ops
    pub fn from_convergence(action: ConvergenceAction) -> Option<Self> {
        match action {
            ConvergenceAction::None => None,
            ConvergenceAction::Create => Some(DiffAction::Create),
            ConvergenceAction::Recreate => Some(DiffAction::Recreate),
            ConvergenceAction::Start => Some(DiffAction::Start),
        }
    }
}

impl std::fmt::Display for DiffAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of a container in a diff entry
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ContainerRef {
    pub id: String,
    pub name: String,
    pub short_id: String,
}

impl From<&RuntimeContainer> for ContainerRef {
    fn from(container: &RuntimeContainer) -> Self {
        Self {
            id: container.id.as_str().to_string(),
            name: container.name.clone(),
            short_id: container.short_id().to_string(),
        }
    }
}

/// Diff entry for one service
///
/// Serialises as `{"<action>": [containers...], "scale": <delta>}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceDiff {
    pub actions: BTreeMap<DiffAction, Vec<ContainerRef>>,
    pub scale: Option<i64>,
}

impl ServiceDiff {
    pub fn containers(&self, action: DiffAction) -> &[ContainerRef] {
        self.actions.get(&action).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has(&self, action: DiffAction) -> bool {
        self.actions.contains_key(&action)
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty() && self.scale.is_none()
    }

    fn merge(&mut self, other: ServiceDiff) {
        for (action, refs) in other.actions {
            self.actions.entry(action).or_default().extend(refs);
        }
        if other.scale.is_some() {
            self.scale = other.scale;
        }
    }
}

impl Serialize for ServiceDiff {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = self.actions.len() + usize::from(self.scale.is_some());
        let mut map = serializer.serialize_map(Some(len))?;
        for (action, refs) in &self.actions {
            map.serialize_entry(action.as_str(), refs)?;
        }
        if let Some(delta) = self.scale {
            map.serialize_entry("scale", &delta)?;
        }
        map.end()
    }
}

/// Result fragment of a single operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationOutcome {
    pub changed: bool,
    pub diff: BTreeMap<String, ServiceDiff>,
}

impl OperationOutcome {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_changed(&mut self) {
        self.changed = true;
    }

    /// Record containers under `service` / `action`
    ///
    /// An empty container list still creates the entry (a `create` has no
    /// containers yet).
    pub fn record<'a, I>(&mut self, service: &str, action: DiffAction, containers: I)
    where
        I: IntoIterator<Item = &'a RuntimeContainer>,
    {
        self.diff
            .entry(service.to_string())
            .or_default()
            .actions
            .entry(action)
            .or_default()
            .extend(containers.into_iter().map(ContainerRef::from));
    }

    pub fn record_scale(&mut self, service: &str, delta: i64) {
        self.diff.entry(service.to_string()).or_default().scale = Some(delta);
    }

    /// Fold a later fragment into this one
    pub fn merge(&mut self, other: OperationOutcome) {
        self.changed |= other.changed;
        for (service, diff) in other.diff {
            self.diff.entry(service).or_default().merge(diff);
        }
    }

    pub fn merged(mut self, other: OperationOutcome) -> Self {
        self.merge(other);
        self
    }
}

/// Facts keyed by service, then container name
pub type ProjectFacts = BTreeMap<String, BTreeMap<String, ContainerFacts>>;

/// Collects post-operation facts through the runtime client
///
/// Only read calls are issued; failures surface as `ReconcileError::Query`.
pub struct FactReporter<'c, C: RuntimeClient + ?Sized> {
    client: &'c C,
    project: &'c str,
    call: CallOptions,
}

impl<'c, C: RuntimeClient + ?Sized> FactReporter<'c, C> {
    pub fn new(client: &'c C, project: &'c str, call: CallOptions) -> Self {
        Self {
            client,
            project,
            call,
        }
    }

    /// Facts for every container of a service, stopped ones included
    pub fn collect_facts(&self, service: &str) -> ReconcileResult<BTreeMap<String, ContainerFacts>> {
        let containers = self
            .client
            .list_containers(self.project, service, &self.call)
            .map_err(|e| ReconcileError::query(self.project, e))?;

        let mut facts = BTreeMap::new();
        for container in &containers {
            let inspection = self
                .client
                .inspect(&container.id, &self.call)
                .map_err(|e| ReconcileError::query(self.project, e))?;
            facts.insert(container.name.clone(), ContainerFacts::from(&inspection));
        }
        debug!(service, containers = facts.len(), "collected facts");
        Ok(facts)
    }

    /// Facts for every service in the graph, including services without containers
    pub fn collect_all(&self, graph: &ServiceGraph) -> ReconcileResult<ProjectFacts> {
        graph
            .names()
            .map(|name| Ok((name.to_string(), self.collect_facts(name)?)))
            .collect()
    }
}
