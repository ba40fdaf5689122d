//! In-memory runtime for application-layer tests

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::time::Duration;

use crate::domain::entities::{
    ContainerConfig, ContainerInspection, RuntimeContainer, ServiceGraph, ServiceSpec,
};
use crate::domain::ports::{
    CallOptions, ReconcileEvent, ReconcileEventSink, RuntimeClient, RuntimeError, RuntimeResult,
    TeardownOptions,
};
use crate::domain::value_objects::{ContainerId, Fingerprint};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    Fail,
    Timeout,
}

/// Mock runtime that mutates an in-memory container list and records every
/// mutating call as `"<operation> <target>"`
///
/// Listing calls are kept apart in `reads`, with the timeout they were given.
#[derive(Default)]
pub struct MockRuntime {
    pub containers: RefCell<Vec<RuntimeContainer>>,
    pub calls: RefCell<Vec<String>>,
    pub reads: RefCell<Vec<(String, Duration)>>,
    pub inspections: Cell<usize>,
    pub unavailable: bool,
    faults: RefCell<BTreeMap<(String, String), Fault>>,
    next_id: Cell<u64>,
}

impl MockRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    /// Seed `count` running containers matching the service's fingerprint
    pub fn with_running(self, service: &ServiceSpec, count: usize) -> Self {
        for _ in 0..count {
            let c = self.spawn(service.name(), service.fingerprint());
            self.containers.borrow_mut().push(c);
        }
        self
    }

    pub fn with_container(self, container: RuntimeContainer) -> Self {
        self.containers.borrow_mut().push(container);
        self
    }

    pub fn with_fault(self, operation: &str, target: &str, fault: Fault) -> Self {
        self.faults
            .borrow_mut()
            .insert((operation.to_string(), target.to_string()), fault);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn count(&self, service: &str) -> usize {
        self.containers
            .borrow()
            .iter()
            .filter(|c| c.service == service)
            .count()
    }

    pub fn running(&self, service: &str) -> usize {
        self.containers
            .borrow()
            .iter()
            .filter(|c| c.service == service && c.running)
            .count()
    }

    /// Build a container owned by `service` with a fresh id and next free name
    pub fn spawn(&self, service: &str, fingerprint: Fingerprint) -> RuntimeContainer {
        let n = self.next_id.get() + 1;
        self.next_id.set(n);
        let index = self.count(service) + 1;
        RuntimeContainer::new(
            format!("{:012x}{:052x}", n.wrapping_mul(0x9e37_79b1), n),
            format!("p_{}_{}", service, index),
            service,
            fingerprint,
        )
    }

    fn call(&self, operation: &str, target: &str, options: &CallOptions) -> RuntimeResult<()> {
        self.calls
            .borrow_mut()
            .push(format!("{} {}", operation, target));
        self.fault(operation, target, options)
    }

    fn read(&self, target: &str, options: &CallOptions) -> RuntimeResult<()> {
        self.reads
            .borrow_mut()
            .push((target.to_string(), options.timeout));
        self.fault("list", target, options)
    }

    fn fault(&self, operation: &str, target: &str, options: &CallOptions) -> RuntimeResult<()> {
        match self
            .faults
            .borrow()
            .get(&(operation.to_string(), target.to_string()))
        {
            Some(Fault::Fail) => Err(RuntimeError::failed(operation, "injected failure")),
            Some(Fault::Timeout) => Err(RuntimeError::Timeout {
                operation: operation.to_string(),
                after: options.timeout,
            }),
            None => Ok(()),
        }
    }

    fn add(&self, service: &ServiceSpec, count: usize) {
        for _ in 0..count {
            let c = self.spawn(service.name(), service.fingerprint());
            self.containers.borrow_mut().push(c);
        }
    }
}

impl RuntimeClient for MockRuntime {
    fn ensure_available(&self) -> RuntimeResult<()> {
        if self.unavailable {
            return Err(RuntimeError::Unavailable("mock offline".to_string()));
        }
        Ok(())
    }

    fn list_containers(
        &self,
        _project: &str,
        service: &str,
        options: &CallOptions,
    ) -> RuntimeResult<Vec<RuntimeContainer>> {
        self.read(service, options)?;
        Ok(self
            .containers
            .borrow()
            .iter()
            .filter(|c| c.service == service)
            .cloned()
            .collect())
    }

    fn list_project_containers(
        &self,
        project: &str,
        options: &CallOptions,
    ) -> RuntimeResult<Vec<RuntimeContainer>> {
        self.read(project, options)?;
        Ok(self.containers.borrow().clone())
    }

    fn create(&self, _project: &str, service: &ServiceSpec, options: &CallOptions) -> RuntimeResult<()> {
        self.call("create", service.name(), options)?;
        self.add(service, service.replicas() as usize);
        Ok(())
    }

    fn recreate(
        &self,
        _project: &str,
        service: &ServiceSpec,
        containers: &[ContainerId],
        options: &CallOptions,
    ) -> RuntimeResult<()> {
        self.call("recreate", service.name(), options)?;
        self.containers
            .borrow_mut()
            .retain(|c| !containers.contains(&c.id));
        self.add(service, containers.len());
        Ok(())
    }

    fn start(
        &self,
        _project: &str,
        service: &str,
        containers: &[ContainerId],
        options: &CallOptions,
    ) -> RuntimeResult<()> {
        self.call("start", service, options)?;
        for c in self.containers.borrow_mut().iter_mut() {
            if containers.contains(&c.id) {
                c.running = true;
                c.status = "running".to_string();
            }
        }
        Ok(())
    }

    fn stop(&self, _project: &str, service: &str, options: &CallOptions) -> RuntimeResult<()> {
        self.call("stop", service, options)?;
        for c in self.containers.borrow_mut().iter_mut() {
            if c.service == service {
                c.running = false;
                c.status = "exited".to_string();
            }
        }
        Ok(())
    }

    fn restart(&self, _project: &str, service: &str, options: &CallOptions) -> RuntimeResult<()> {
        self.call("restart", service, options)?;
        for c in self.containers.borrow_mut().iter_mut() {
            if c.service == service {
                c.running = true;
                c.status = "running".to_string();
            }
        }
        Ok(())
    }

    fn scale(
        &self,
        _project: &str,
        service: &ServiceSpec,
        count: u32,
        options: &CallOptions,
    ) -> RuntimeResult<()> {
        self.call("scale", service.name(), options)?;
        let current = self.count(service.name());
        let target = count as usize;
        if target > current {
            self.add(service, target - current);
        } else {
            let mut seen = 0;
            self.containers.borrow_mut().retain(|c| {
                if c.service != service.name() {
                    return true;
                }
                seen += 1;
                seen <= target
            });
        }
        Ok(())
    }

    fn remove_containers(
        &self,
        _project: &str,
        containers: &[ContainerId],
        options: &CallOptions,
    ) -> RuntimeResult<()> {
        let target = containers
            .iter()
            .map(|id| id.short().to_string())
            .collect::<Vec<_>>()
            .join(",");
        self.call("remove", &target, options)?;
        self.containers
            .borrow_mut()
            .retain(|c| !containers.contains(&c.id));
        Ok(())
    }

    fn remove_project(
        &self,
        project: &str,
        teardown: &TeardownOptions,
        options: &CallOptions,
    ) -> RuntimeResult<()> {
        self.call("down", project, options)?;
        self.containers
            .borrow_mut()
            .retain(|c| !teardown.covers(&c.service));
        Ok(())
    }

    fn inspect(&self, id: &ContainerId, _options: &CallOptions) -> RuntimeResult<ContainerInspection> {
        self.inspections.set(self.inspections.get() + 1);
        let containers = self.containers.borrow();
        let container = containers
            .iter()
            .find(|c| &c.id == id)
            .ok_or_else(|| RuntimeError::NotFound { id: id.to_string() })?;
        Ok(ContainerInspection {
            command: vec![container.service.clone()],
            labels: BTreeMap::from([(
                "com.docker.compose.service".to_string(),
                container.service.clone(),
            )]),
            image: format!("{}:latest", container.service),
            running: container.running,
            status: container.status.clone(),
            networks: container.networks.clone(),
        })
    }
}

/// Event sink that keeps every event
#[derive(Default)]
pub struct RecordingSink {
    pub events: std::sync::Mutex<Vec<ReconcileEvent>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<ReconcileEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

impl ReconcileEventSink for RecordingSink {
    fn on_event(&self, event: ReconcileEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

pub fn service(name: &str, deps: &[&str]) -> ServiceSpec {
    deps.iter().fold(
        ServiceSpec::new(name, ContainerConfig::new(format!("{}:1", name))),
        |spec, dep| spec.with_dependency(*dep),
    )
}

/// `db` and `web`, web depending on db
pub fn web_and_db() -> ServiceGraph {
    ServiceGraph::builder("p")
        .service(service("db", &[]))
        .service(service("web", &["db"]))
        .build()
        .unwrap()
}

pub fn quick() -> CallOptions {
    CallOptions::new(Duration::from_secs(5))
}
