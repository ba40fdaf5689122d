//! Container fact projection
//!
//! A fixed, read-only projection of inspection data. The key names are part of
//! the result wire shape and must stay stable.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::entities::{ContainerInspection, NetworkAttachment};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContainerState {
    pub running: bool,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkFacts {
    pub aliases: Vec<String>,
    #[serde(rename = "globalIPv6")]
    pub global_ipv6: Option<String>,
    #[serde(rename = "globalIPv6PrefixLen")]
    pub global_ipv6_prefix_len: Option<u8>,
    #[serde(rename = "IPAddress")]
    pub ip_address: String,
    #[serde(rename = "IPPrefixLen")]
    pub ip_prefix_len: u8,
    pub links: Vec<String>,
    #[serde(rename = "macAddress")]
    pub mac_address: String,
}

impl From<&NetworkAttachment> for NetworkFacts {
    fn from(net: &NetworkAttachment) -> Self {
        Self {
            aliases: net.aliases.clone(),
            global_ipv6: net.global_ipv6.clone(),
            global_ipv6_prefix_len: net.global_ipv6_prefix_len,
            ip_address: net.ip_address.clone(),
            ip_prefix_len: net.ip_prefix_len,
            links: net.links.clone(),
            mac_address: net.mac_address.clone(),
        }
    }
}

/// Facts reported for one container
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContainerFacts {
    pub cmd: Vec<String>,
    pub labels: BTreeMap<String, String>,
    pub image: String,
    pub state: ContainerState,
    pub networks: BTreeMap<String, NetworkFacts>,
}

impl From<&ContainerInspection> for ContainerFacts {
    fn from(inspection: &ContainerInspection) -> Self {
        Self {
            cmd: inspection.command.clone(),
            labels: inspection.labels.clone(),
            image: inspection.image.clone(),
            state: ContainerState {
                running: inspection.running,
                status: inspection.status.clone(),
            },
            networks: inspection
                .networks
                .iter()
                .map(|(name, net)| (name.clone(), NetworkFacts::from(net)))
                .collect(),
        }
    }
}
