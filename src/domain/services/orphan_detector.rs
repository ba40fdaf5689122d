//! Orphan detection service
//!
//! An orphan is a container labelled with the project whose owning service is
//! no longer declared in the graph.

use std::collections::BTreeMap;

use crate::domain::entities::{RuntimeContainer, ServiceGraph};

/// Result of orphan detection
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrphanDetectionResult {
    pub orphans: Vec<RuntimeContainer>,
}

impl OrphanDetectionResult {
    pub fn is_empty(&self) -> bool {
        self.orphans.is_empty()
    }

    pub fn len(&self) -> usize {
        self.orphans.len()
    }

    /// Orphans grouped by the (undeclared) service that owns them
    pub fn by_service(&self) -> BTreeMap<&str, Vec<&RuntimeContainer>> {
        let mut grouped: BTreeMap<&str, Vec<&RuntimeContainer>> = BTreeMap::new();
        for orphan in &self.orphans {
            grouped.entry(orphan.service.as_str()).or_default().push(orphan);
        }
        grouped
    }
}

/// Finds project containers that no declared service owns
pub struct OrphanDetector;

impl OrphanDetector {
    pub fn detect(graph: &ServiceGraph, containers: &[RuntimeContainer]) -> OrphanDetectionResult {
        OrphanDetectionResult {
            orphans: containers
                .iter()
                .filter(|c| !graph.contains(&c.service))
                .cloned()
                .collect(),
        }
    }
}
