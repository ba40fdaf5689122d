//! Service specification entity
//!
//! A `ServiceSpec` is the desired shape of one compose service: the container
//! configuration its containers must carry, the services it depends on, and
//! how many replicas it wants when first created.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::Fingerprint;

/// Container settings that force recreation when they change
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    pub image: String,
    pub command: Vec<String>,
    pub environment: BTreeMap<String, String>,
    pub mounts: Vec<String>,
    pub ports: Vec<String>,
    pub labels: BTreeMap<String, String>,
}

impl ContainerConfig {
    pub fn new(image: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            ..Self::default()
        }
    }

    pub fn with_command<I, S>(mut self, command: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.command = command.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.environment.insert(key.into(), value.into());
        self
    }

    pub fn with_mount(mut self, mount: impl Into<String>) -> Self {
        self.mounts.push(mount.into());
        self
    }

    pub fn with_port(mut self, port: impl Into<String>) -> Self {
        self.ports.push(port.into());
        self
    }

    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    /// Compute the configuration fingerprint
    ///
    /// The encoding is length-prefixed per value and tagged per field, so
    /// moving a value from one field to another always changes the digest.
    /// Maps are already key-ordered; list order is significant.
    pub fn fingerprint(&self) -> Fingerprint {
        let mut buf = Vec::with_capacity(256);
        encode_field(&mut buf, "image", std::iter::once(self.image.as_str()));
        encode_field(&mut buf, "command", self.command.iter().map(String::as_str));
        encode_field(
            &mut buf,
            "environment",
            self.environment
                .iter()
                .flat_map(|(k, v)| [k.as_str(), v.as_str()]),
        );
        encode_field(&mut buf, "mounts", self.mounts.iter().map(String::as_str));
        encode_field(&mut buf, "ports", self.ports.iter().map(String::as_str));
        encode_field(
            &mut buf,
            "labels",
            self.labels.iter().flat_map(|(k, v)| [k.as_str(), v.as_str()]),
        );
        Fingerprint::from_bytes(&buf)
    }
}

fn encode_field<'a>(buf: &mut Vec<u8>, name: &str, values: impl Iterator<Item = &'a str>) {
    buf.extend_from_slice(name.as_bytes());
    buf.push(0);
    for value in values {
        buf.extend_from_slice(&(value.len() as u64).to_be_bytes());
        buf.extend_from_slice(value.as_bytes());
    }
    buf.push(0xff);
}

fn default_replicas() -> u32 {
    1
}

/// Desired specification of one service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceSpec {
    name: String,
    #[serde(default)]
    config: ContainerConfig,
    #[serde(default, alias = "links")]
    depends_on: Vec<String>,
    #[serde(default = "default_replicas")]
    replicas: u32,
}

impl ServiceSpec {
    pub fn new(name: impl Into<String>, config: ContainerConfig) -> Self {
        Self {
            name: name.into(),
            config,
            depends_on: Vec::new(),
            replicas: default_replicas(),
        }
    }

    /// Add a `depends_on`/link edge to another service
    pub fn with_dependency(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !self.depends_on.contains(&name) {
            self.depends_on.push(name);
        }
        self
    }

    pub fn with_replicas(mut self, replicas: u32) -> Self {
        self.replicas = replicas;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &ContainerConfig {
        &self.config
    }

    pub fn dependencies(&self) -> &[String] {
        &self.depends_on
    }

    pub fn replicas(&self) -> u32 {
        self.replicas
    }

    /// Fingerprint every container of this service must carry
    pub fn fingerprint(&self) -> Fingerprint {
        self.config.fingerprint()
    }
}
