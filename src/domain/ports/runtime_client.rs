//! Runtime Client Port
//!
//! Abstracts the container runtime (create/start/stop/inspect/remove
//! primitives). The engine consumes this capability set and never talks to a
//! daemon directly.

use std::time::Duration;

use thiserror::Error;

use crate::domain::entities::{ContainerInspection, RuntimeContainer, ServiceSpec};
use crate::domain::value_objects::{ContainerId, ImageRemoval};

/// Error reported by a runtime client
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("container runtime unavailable: {0}")]
    Unavailable(String),

    #[error("{operation} timed out after {}s", after.as_secs())]
    Timeout { operation: String, after: Duration },

    #[error("container not found: {id}")]
    NotFound { id: String },

    #[error("{operation} failed: {message}")]
    Failed { operation: String, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RuntimeError {
    pub fn failed(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Failed {
            operation: operation.into(),
            message: message.into(),
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, RuntimeError::Timeout { .. })
    }
}

/// Result type for runtime client calls
pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Per-call settings forwarded to every blocking runtime call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallOptions {
    /// Upper bound for the call; exceeding it is reported, never retried
    pub timeout: Duration,
    /// Build images before creating containers
    pub build: bool,
}

impl CallOptions {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            build: true,
        }
    }

    pub fn with_build(mut self, build: bool) -> Self {
        self.build = build;
        self
    }
}

impl Default for CallOptions {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TIMEOUT)
    }
}

/// Flags for a project teardown
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TeardownOptions {
    /// Services declared by the graph; their containers are always removed
    pub services: Vec<String>,
    pub images: ImageRemoval,
    pub volumes: bool,
    /// Also remove project containers of undeclared services
    pub orphans: bool,
}

impl TeardownOptions {
    pub fn new<I, S>(services: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            services: services.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Whether a container owned by `service` goes away with this teardown
    pub fn covers(&self, service: &str) -> bool {
        self.orphans || self.services.iter().any(|s| s == service)
    }
}

/// Trait for container runtimes
///
/// Listing calls return stopped containers too; callers filter on
/// `RuntimeContainer::running`. Every blocking call, reads included, must
/// honor `CallOptions::timeout` and report `RuntimeError::Timeout` on expiry.
pub trait RuntimeClient {
    /// Capability check, performed once before any planning
    fn ensure_available(&self) -> RuntimeResult<()> {
        Ok(())
    }

    /// Containers of one service of a project
    fn list_containers(
        &self,
        project: &str,
        service: &str,
        options: &CallOptions,
    ) -> RuntimeResult<Vec<RuntimeContainer>>;

    /// Every container labelled with the project, whatever its service
    fn list_project_containers(
        &self,
        project: &str,
        options: &CallOptions,
    ) -> RuntimeResult<Vec<RuntimeContainer>>;

    /// Create and start `service.replicas()` containers
    fn create(&self, project: &str, service: &ServiceSpec, options: &CallOptions)
        -> RuntimeResult<()>;

    /// Replace the given containers with fresh ones and start them
    fn recreate(
        &self,
        project: &str,
        service: &ServiceSpec,
        containers: &[ContainerId],
        options: &CallOptions,
    ) -> RuntimeResult<()>;

    /// Start existing containers
    fn start(
        &self,
        project: &str,
        service: &str,
        containers: &[ContainerId],
        options: &CallOptions,
    ) -> RuntimeResult<()>;

    /// Stop every running container of a service
    fn stop(&self, project: &str, service: &str, options: &CallOptions) -> RuntimeResult<()>;

    /// Restart every container of a service, running or not
    fn restart(&self, project: &str, service: &str, options: &CallOptions) -> RuntimeResult<()>;

    /// Bring a service to exactly `count` containers
    fn scale(
        &self,
        project: &str,
        service: &ServiceSpec,
        count: u32,
        options: &CallOptions,
    ) -> RuntimeResult<()>;

    /// Stop and remove specific containers
    fn remove_containers(
        &self,
        project: &str,
        containers: &[ContainerId],
        options: &CallOptions,
    ) -> RuntimeResult<()>;

    /// Remove every project container, plus images/volumes/orphans per flags
    fn remove_project(
        &self,
        project: &str,
        teardown: &TeardownOptions,
        options: &CallOptions,
    ) -> RuntimeResult<()>;

    /// Inspect one container
    fn inspect(&self, id: &ContainerId, options: &CallOptions) -> RuntimeResult<ContainerInspection>;
}

impl<T: RuntimeClient + ?Sized> RuntimeClient for &T {
    fn ensure_available(&self) -> RuntimeResult<()> {
        (**self).ensure_available()
    }

    fn list_containers(
        &self,
        project: &str,
        service: &str,
        options: &CallOptions,
    ) -> RuntimeResult<Vec<RuntimeContainer>> {
        (**self).list_containers(project, service, options)
    }

    fn list_project_containers(
        &self,
        project: &str,
        options: &CallOptions,
    ) -> RuntimeResult<Vec<RuntimeContainer>> {
        (**self).list_project_containers(project, options)
    }

    fn create(
        &self,
        project: &str,
        service: &ServiceSpec,
        options: &CallOptions,
    ) -> RuntimeResult<()> {
        (**self).create(project, service, options)
    }

    fn recreate(
        &self,
        project: &str,
        service: &ServiceSpec,
        containers: &[ContainerId],
        options: &CallOptions,
    ) -> RuntimeResult<()> {
        (**self).recreate(project, service, containers, options)
    }

    fn start(
        &self,
        project: &str,
        service: &str,
        containers: &[ContainerId],
        options: &CallOptions,
    ) -> RuntimeResult<()> {
        (**self).start(project, service, containers, options)
    }

    fn stop(&self, project: &str, service: &str, options: &CallOptions) -> RuntimeResult<()> {
        (**self).stop(project, service, options)
    }

    fn restart(&self, project: &str, service: &str, options: &CallOptions) -> RuntimeResult<()> {
        (**self).restart(project, service, options)
    }

    fn scale(
        &self,
        project: &str,
        service: &ServiceSpec,
        count: u32,
        options: &CallOptions,
    ) -> RuntimeResult<()> {
        (**self).scale(project, service, count, options)
    }

    fn remove_containers(
        &self,
        project: &str,
        containers: &[ContainerId],
        options: &CallOptions,
    ) -> RuntimeResult<()> {
        (**self).remove_containers(project, containers, options)
    }

    fn remove_project(
        &self,
        project: &str,
        teardown: &TeardownOptions,
        options: &CallOptions,
    ) -> RuntimeResult<()> {
        (**self).remove_project(project, teardown, options)
    }

    fn inspect(&self, id: &ContainerId, options: &CallOptions) -> RuntimeResult<ContainerInspection> {
        (**self).inspect(id, options)
    }
}
