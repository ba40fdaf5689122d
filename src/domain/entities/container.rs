//! Runtime container snapshots
//!
//! Read-only views of containers owned by the runtime. The engine never
//! mutates these; every change goes through the runtime client and is
//! observed by taking a fresh snapshot.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{ContainerId, Fingerprint};

/// Network attachment of a container
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkAttachment {
    pub ip_address: String,
    pub ip_prefix_len: u8,
    pub aliases: Vec<String>,
    pub global_ipv6: Option<String>,
    pub global_ipv6_prefix_len: Option<u8>,
    pub links: Vec<String>,
    pub mac_address: String,
}

/// A container as listed by the runtime
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeContainer {
    pub id: ContainerId,
    pub name: String,
    pub service: String,
    /// Fingerprint captured when the container was created
    pub fingerprint: Fingerprint,
    pub running: bool,
    pub status: String,
    #[serde(default)]
    pub networks: BTreeMap<String, NetworkAttachment>,
}

impl RuntimeContainer {
    /// A running container
    pub fn new(
        id: impl Into<ContainerId>,
        name: impl Into<String>,
        service: impl Into<String>,
        fingerprint: Fingerprint,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            service: service.into(),
            fingerprint,
            running: true,
            status: "running".to_string(),
            networks: BTreeMap::new(),
        }
    }

    /// Same container, exited
    pub fn stopped(mut self) -> Self {
        self.running = false;
        self.status = "exited".to_string();
        self
    }

    pub fn with_network(mut self, name: impl Into<String>, attachment: NetworkAttachment) -> Self {
        self.networks.insert(name.into(), attachment);
        self
    }

    pub fn short_id(&self) -> &str {
        self.id.short()
    }

    /// Whether this container was created from the given configuration
    pub fn matches(&self, fingerprint: &Fingerprint) -> bool {
        &self.fingerprint == fingerprint
    }
}

/// Result of inspecting a single container
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerInspection {
    pub command: Vec<String>,
    pub labels: BTreeMap<String, String>,
    pub image: String,
    pub running: bool,
    pub status: String,
    pub networks: BTreeMap<String, NetworkAttachment>,
}
