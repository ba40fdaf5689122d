//! Runtime state snapshot
//!
//! Groups the containers that currently exist for a project by owning
//! service. Snapshots are taken fresh for each phase of an invocation and are
//! never mutated in place.

use std::collections::BTreeMap;

use tracing::debug;

use crate::domain::entities::RuntimeContainer;
use crate::domain::ports::{CallOptions, RuntimeClient};
use crate::error::{ReconcileError, ReconcileResult};

/// Point-in-time view of a project's containers
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuntimeSnapshot {
    project: String,
    by_service: BTreeMap<String, Vec<RuntimeContainer>>,
}

impl RuntimeSnapshot {
    /// Query the runtime for the given services
    pub fn capture<'a, C, I>(
        client: &C,
        project: &str,
        services: I,
        options: &CallOptions,
    ) -> ReconcileResult<Self>
    where
        C: RuntimeClient + ?Sized,
        I: IntoIterator<Item = &'a str>,
    {
        let mut by_service = BTreeMap::new();
        for service in services {
            let containers = client
                .list_containers(project, service, options)
                .map_err(|e| ReconcileError::query(project, e))?;
            debug!(
                project,
                service,
                containers = containers.len(),
                "captured service snapshot"
            );
            by_service.insert(service.to_string(), containers);
        }
        Ok(Self {
            project: project.to_string(),
            by_service,
        })
    }

    /// Build a snapshot from an already-listed container set
    pub fn from_containers(project: impl Into<String>, containers: Vec<RuntimeContainer>) -> Self {
        let mut by_service: BTreeMap<String, Vec<RuntimeContainer>> = BTreeMap::new();
        for container in containers {
            by_service
                .entry(container.service.clone())
                .or_default()
                .push(container);
        }
        Self {
            project: project.into(),
            by_service,
        }
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    /// All containers of a service, running or not
    pub fn containers(&self, service: &str) -> &[RuntimeContainer] {
        self.by_service
            .get(service)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn running(&self, service: &str) -> impl Iterator<Item = &RuntimeContainer> {
        self.containers(service).iter().filter(|c| c.running)
    }

    pub fn count(&self, service: &str) -> usize {
        self.containers(service).len()
    }

    pub fn total(&self) -> usize {
        self.by_service.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}
