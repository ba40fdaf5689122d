//! Service graph entity
//!
//! The desired project: an ordered set of services plus the dependency edges
//! between them. Built once per invocation and immutable afterwards.
//!
//! Edges are stored as index lists (`dependencies[i]` holds the indices of the
//! services that service `i` depends on), so graph walks never need
//! back-pointers between specs.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::entities::ServiceSpec;
use crate::error::{ReconcileError, ReconcileResult};

/// Serialized form of a graph, before validation
#[derive(Debug, Clone, Serialize, Deserialize)]
struct GraphDocument {
    project: String,
    #[serde(default)]
    services: Vec<ServiceSpec>,
}

/// Validated, immutable service graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "GraphDocument", into = "GraphDocument")]
pub struct ServiceGraph {
    project: String,
    services: Vec<ServiceSpec>,
    index: HashMap<String, usize>,
    dependencies: Vec<Vec<usize>>,
}

impl ServiceGraph {
    /// Build a graph, rejecting duplicate names, zero replica counts and
    /// dangling dependency edges
    ///
    /// Cycles are accepted here and rejected by the dependency resolver.
    pub fn new(project: impl Into<String>, services: Vec<ServiceSpec>) -> ReconcileResult<Self> {
        let project = project.into();
        if project.trim().is_empty() {
            return Err(ReconcileError::configuration("project name must not be empty"));
        }

        let mut index = HashMap::with_capacity(services.len());
        for (i, service) in services.iter().enumerate() {
            if service.name().trim().is_empty() {
                return Err(ReconcileError::configuration(format!(
                    "service #{} in project '{}' has an empty name",
                    i, project
                )));
            }
            if service.replicas() == 0 {
                return Err(ReconcileError::configuration(format!(
                    "service '{}' must want at least one replica",
                    service.name()
                )));
            }
            if index.insert(service.name().to_string(), i).is_some() {
                return Err(ReconcileError::configuration(format!(
                    "service '{}' is declared more than once",
                    service.name()
                )));
            }
        }

        let mut dependencies = Vec::with_capacity(services.len());
        for service in &services {
            let mut edges = Vec::with_capacity(service.dependencies().len());
            for dep in service.dependencies() {
                let target = index
                    .get(dep)
                    .copied()
                    .ok_or_else(|| ReconcileError::unknown_service(dep.clone()))?;
                edges.push(target);
            }
            dependencies.push(edges);
        }

        Ok(Self {
            project,
            services,
            index,
            dependencies,
        })
    }

    pub fn builder(project: impl Into<String>) -> ServiceGraphBuilder {
        ServiceGraphBuilder {
            project: project.into(),
            services: Vec::new(),
        }
    }

    /// Project identity; containers are labelled with it
    pub fn project(&self) -> &str {
        &self.project
    }

    /// Services in declaration order
    pub fn services(&self) -> &[ServiceSpec] {
        &self.services
    }

    pub fn get(&self, name: &str) -> Option<&ServiceSpec> {
        self.index_of(name).map(|i| &self.services[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Declaration index of a service
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Service at a declaration index
    pub fn service_at(&self, index: usize) -> Option<&ServiceSpec> {
        self.services.get(index)
    }

    /// Dependency edges by declaration index
    pub fn dependency_indices(&self) -> &[Vec<usize>] {
        &self.dependencies
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.services.iter().map(ServiceSpec::name)
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

impl TryFrom<GraphDocument> for ServiceGraph {
    type Error = ReconcileError;

    fn try_from(doc: GraphDocument) -> Result<Self, Self::Error> {
        ServiceGraph::new(doc.project, doc.services)
    }
}

impl From<ServiceGraph> for GraphDocument {
    fn from(graph: ServiceGraph) -> Self {
        GraphDocument {
            project: graph.project,
            services: graph.services,
        }
    }
}

/// Incremental graph construction
#[derive(Debug, Clone)]
pub struct ServiceGraphBuilder {
    project: String,
    services: Vec<ServiceSpec>,
}

impl ServiceGraphBuilder {
    pub fn service(mut self, service: ServiceSpec) -> Self {
        self.services.push(service);
        self
    }

    pub fn build(self) -> ReconcileResult<ServiceGraph> {
        ServiceGraph::new(self.project, self.services)
    }
}
