//! JSON state-file runtime
//!
//! A `RuntimeClient` that keeps containers in a JSON document instead of
//! talking to a daemon. Every call takes an exclusive `fs2` lock on a `.lock`
//! sidecar, loads the document, applies the change and writes it back through
//! a temp file + rename. Lock acquisition honors `CallOptions::timeout`.
//!
//! Faults can be injected per operation/service to exercise failure paths.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::entities::{
    ContainerInspection, NetworkAttachment, RuntimeContainer, ServiceSpec,
};
use crate::domain::ports::{
    CallOptions, RuntimeClient, RuntimeError, RuntimeResult, TeardownOptions,
};
use crate::domain::value_objects::{ContainerId, Fingerprint, ImageRemoval};

const STATE_VERSION: u32 = 1;
const LOCK_POLL: Duration = Duration::from_millis(10);

// 172.18.0.0/16: .0.1 is the gateway, .255.255 the broadcast address
const FIRST_HOST: u32 = 2;
const LAST_HOST: u32 = 0xfffe;

pub const LABEL_PROJECT: &str = "com.docker.compose.project";
pub const LABEL_SERVICE: &str = "com.docker.compose.service";
pub const LABEL_NUMBER: &str = "com.docker.compose.container-number";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FaultKind {
    Fail,
    Timeout,
}

/// A failure to report instead of performing an operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InjectedFault {
    /// `create`, `recreate`, `start`, `stop`, `restart`, `scale`, `remove`, `down`, `inspect`
    pub operation: String,
    /// Service (or project, for `down`); `None` matches any
    #[serde(default)]
    pub target: Option<String>,
    pub kind: FaultKind,
    #[serde(default)]
    pub message: Option<String>,
}

impl InjectedFault {
    fn matches(&self, operation: &str, target: &str) -> bool {
        self.operation == operation && self.target.as_deref().is_none_or(|t| t == target)
    }
}

/// A container as persisted in the state file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredContainer {
    pub id: ContainerId,
    pub name: String,
    pub project: String,
    pub service: String,
    pub number: u32,
    pub fingerprint: Fingerprint,
    pub image: String,
    #[serde(default)]
    pub command: Vec<String>,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    #[serde(default)]
    pub volumes: Vec<String>,
    pub running: bool,
    pub status: String,
    pub created: DateTime<Utc>,
    #[serde(default)]
    pub networks: BTreeMap<String, NetworkAttachment>,
}

impl StoredContainer {
    fn view(&self) -> RuntimeContainer {
        RuntimeContainer {
            id: self.id.clone(),
            name: self.name.clone(),
            service: self.service.clone(),
            fingerprint: self.fingerprint.clone(),
            running: self.running,
            status: self.status.clone(),
            networks: self.networks.clone(),
        }
    }

    fn inspection(&self) -> ContainerInspection {
        ContainerInspection {
            command: self.command.clone(),
            labels: self.labels.clone(),
            image: self.image.clone(),
            running: self.running,
            status: self.status.clone(),
            networks: self.networks.clone(),
        }
    }

    fn set_running(&mut self, running: bool) {
        self.running = running;
        self.status = if running { "running" } else { "exited" }.to_string();
    }
}

/// The whole persisted runtime
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeState {
    pub version: u32,
    /// `false` makes the capability check fail
    #[serde(default = "default_available")]
    pub available: bool,
    #[serde(default)]
    pub next_id: u64,
    #[serde(default)]
    pub containers: Vec<StoredContainer>,
    /// Images present locally, mapped to whether they were built here
    #[serde(default)]
    pub images: BTreeMap<String, bool>,
    /// Named volumes per project
    #[serde(default)]
    pub volumes: BTreeMap<String, BTreeSet<String>>,
    #[serde(default)]
    pub faults: Vec<InjectedFault>,
}

fn default_available() -> bool {
    true
}

impl Default for RuntimeState {
    fn default() -> Self {
        Self {
            version: STATE_VERSION,
            available: true,
            next_id: 0,
            containers: Vec::new(),
            images: BTreeMap::new(),
            volumes: BTreeMap::new(),
            faults: Vec::new(),
        }
    }
}

impl RuntimeState {
    fn check_fault(&self, operation: &str, target: &str, options: &CallOptions) -> RuntimeResult<()> {
        match self.faults.iter().find(|f| f.matches(operation, target)) {
            None => Ok(()),
            Some(fault) => match fault.kind {
                FaultKind::Timeout => Err(RuntimeError::Timeout {
                    operation: operation.to_string(),
                    after: options.timeout,
                }),
                FaultKind::Fail => Err(RuntimeError::failed(
                    operation,
                    fault
                        .message
                        .clone()
                        .unwrap_or_else(|| format!("{} refused for {}", operation, target)),
                )),
            },
        }
    }

    fn service_containers<'a>(
        &'a self,
        project: &'a str,
        service: &'a str,
    ) -> impl Iterator<Item = &'a StoredContainer> + 'a {
        self.containers
            .iter()
            .filter(move |c| c.project == project && c.service == service)
    }

    /// Lowest host index in the project's /16 not used by another container
    fn free_host(&self, project: &str) -> Option<u32> {
        let used: BTreeSet<u32> = self
            .containers
            .iter()
            .filter(|c| c.project == project)
            .filter_map(|c| c.networks.values().next())
            .filter_map(|n| host_index(&n.ip_address))
            .collect();
        (FIRST_HOST..=LAST_HOST).find(|n| !used.contains(n))
    }

    fn free_number(&self, project: &str, service: &str) -> u32 {
        let used: BTreeSet<u32> = self
            .service_containers(project, service)
            .map(|c| c.number)
            .collect();
        (1..).find(|n| !used.contains(n)).unwrap_or(1)
    }

    /// Create and start one container for the service
    fn spawn(
        &mut self,
        project: &str,
        service: &ServiceSpec,
        options: &CallOptions,
    ) -> RuntimeResult<()> {
        let host = self.free_host(project).ok_or_else(|| {
            RuntimeError::failed(
                "create",
                format!("no free address left on network {}_default", project),
            )
        })?;
        let (high, low) = (host >> 8, host & 0xff);
        self.next_id += 1;
        let number = self.free_number(project, service.name());
        let name = format!("{}_{}_{}", project, service.name(), number);
        let seed = format!("{}/{}/{}", project, name, self.next_id);
        let id = ContainerId::new(Fingerprint::from_bytes(seed.as_bytes()).hex());
        let config = service.config();

        let mut labels = config.labels.clone();
        labels.insert(LABEL_PROJECT.to_string(), project.to_string());
        labels.insert(LABEL_SERVICE.to_string(), service.name().to_string());
        labels.insert(LABEL_NUMBER.to_string(), number.to_string());

        let volumes: Vec<String> = config
            .mounts
            .iter()
            .filter_map(|m| named_volume(m))
            .map(str::to_string)
            .collect();
        self.volumes
            .entry(project.to_string())
            .or_default()
            .extend(volumes.iter().cloned());
        self.images
            .entry(config.image.clone())
            .or_insert(options.build);

        let network = NetworkAttachment {
            ip_address: format!("172.18.{}.{}", high, low),
            ip_prefix_len: 16,
            aliases: vec![service.name().to_string(), id.short().to_string()],
            global_ipv6: None,
            global_ipv6_prefix_len: None,
            links: Vec::new(),
            mac_address: format!("02:42:ac:12:{:02x}:{:02x}", high, low),
        };

        self.containers.push(StoredContainer {
            name,
            project: project.to_string(),
            service: service.name().to_string(),
            number,
            fingerprint: service.fingerprint(),
            image: config.image.clone(),
            command: config.command.clone(),
            labels,
            volumes,
            running: true,
            status: "running".to_string(),
            created: Utc::now(),
            networks: BTreeMap::from([(format!("{}_default", project), network)]),
            id,
        });
        Ok(())
    }

    fn remove_ids(&mut self, ids: &[ContainerId]) -> RuntimeResult<()> {
        if let Some(missing) = ids
            .iter()
            .find(|id| !self.containers.iter().any(|c| &c.id == *id))
        {
            return Err(RuntimeError::NotFound {
                id: missing.to_string(),
            });
        }
        self.containers.retain(|c| !ids.contains(&c.id));
        Ok(())
    }

    fn prune_images(&mut self, project: &str, mode: ImageRemoval, removed: &[StoredContainer]) {
        if !mode.removes_images() {
            return;
        }
        let still_used: BTreeSet<&str> = self.containers.iter().map(|c| c.image.as_str()).collect();
        for container in removed.iter().filter(|c| c.project == project) {
            let image = container.image.as_str();
            if still_used.contains(image) {
                continue;
            }
            let built = self.images.get(image).copied().unwrap_or(false);
            if mode == ImageRemoval::All || built {
                self.images.remove(image);
            }
        }
    }
}

/// Host index of a `172.18.x.y` address within the project network
fn host_index(ip_address: &str) -> Option<u32> {
    let mut octets = ip_address.rsplit('.');
    let low: u32 = octets.next()?.parse().ok()?;
    let high: u32 = octets.next()?.parse().ok()?;
    Some((high << 8) | low)
}

/// `name:/path` mounts whose source is not a host path
fn named_volume(mount: &str) -> Option<&str> {
    let (source, _) = mount.split_once(':')?;
    let is_path = source.starts_with('/') || source.starts_with('.') || source.starts_with('~');
    (!source.is_empty() && !is_path).then_some(source)
}

/// Runtime backed by a JSON state file
#[derive(Debug, Clone)]
pub struct StateFileRuntime {
    path: PathBuf,
}

impl StateFileRuntime {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_path(&self) -> PathBuf {
        self.path.with_extension("lock")
    }

    /// Read the current state without locking
    pub fn load(&self) -> RuntimeResult<RuntimeState> {
        if !self.path.exists() {
            return Ok(RuntimeState::default());
        }
        let content = fs::read_to_string(&self.path)?;
        let state: RuntimeState = serde_json::from_str(&content)?;
        if state.version != STATE_VERSION {
            return Err(RuntimeError::Unavailable(format!(
                "unsupported state file version {} in {}",
                state.version,
                self.path.display()
            )));
        }
        Ok(state)
    }

    /// Persist state atomically
    pub fn save(&self, state: &RuntimeState) -> RuntimeResult<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;
        let bytes = serde_json::to_vec_pretty(state)?;
        let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
        tmp.write_all(&bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| RuntimeError::Io(e.error))?;
        Ok(())
    }

    fn acquire(&self, operation: &str, timeout: Duration) -> RuntimeResult<fs::File> {
        let lock_path = self.lock_path();
        if let Some(parent) = lock_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let lock_file = fs::File::create(&lock_path)?;
        let started = Instant::now();
        loop {
            match lock_file.try_lock_exclusive() {
                Ok(()) => return Ok(lock_file),
                Err(_) if started.elapsed() < timeout => thread::sleep(LOCK_POLL),
                Err(_) => {
                    return Err(RuntimeError::Timeout {
                        operation: operation.to_string(),
                        after: timeout,
                    })
                }
            }
        }
    }

    /// Load, mutate and save under the exclusive lock
    fn mutate<T, F>(&self, operation: &str, options: &CallOptions, apply: F) -> RuntimeResult<T>
    where
        F: FnOnce(&mut RuntimeState) -> RuntimeResult<T>,
    {
        let lock_file = self.acquire(operation, options.timeout)?;
        let result = self.load().and_then(|mut state| {
            let value = apply(&mut state)?;
            self.save(&state)?;
            Ok(value)
        });
        let _ = lock_file.unlock();
        debug!(operation, path = %self.path.display(), ok = result.is_ok(), "state file updated");
        result
    }

    fn read<T, F>(&self, operation: &str, options: &CallOptions, query: F) -> RuntimeResult<T>
    where
        F: FnOnce(&RuntimeState) -> RuntimeResult<T>,
    {
        let lock_file = self.acquire(operation, options.timeout)?;
        let result = self.load().and_then(|state| query(&state));
        let _ = lock_file.unlock();
        result
    }
}

impl RuntimeClient for StateFileRuntime {
    fn ensure_available(&self) -> RuntimeResult<()> {
        let state = self.load()?;
        if !state.available {
            return Err(RuntimeError::Unavailable(format!(
                "runtime marked unavailable in {}",
                self.path.display()
            )));
        }
        Ok(())
    }

    fn list_containers(
        &self,
        project: &str,
        service: &str,
        options: &CallOptions,
    ) -> RuntimeResult<Vec<RuntimeContainer>> {
        self.read("list", options, |state| {
            Ok(state
                .service_containers(project, service)
                .map(StoredContainer::view)
                .collect())
        })
    }

    fn list_project_containers(
        &self,
        project: &str,
        options: &CallOptions,
    ) -> RuntimeResult<Vec<RuntimeContainer>> {
        self.read("list", options, |state| {
            Ok(state
                .containers
                .iter()
                .filter(|c| c.project == project)
                .map(StoredContainer::view)
                .collect())
        })
    }

    fn create(&self, project: &str, service: &ServiceSpec, options: &CallOptions) -> RuntimeResult<()> {
        self.mutate("create", options, |state| {
            state.check_fault("create", service.name(), options)?;
            for _ in 0..service.replicas() {
                state.spawn(project, service, options)?;
            }
            Ok(())
        })
    }

    fn recreate(
        &self,
        project: &str,
        service: &ServiceSpec,
        containers: &[ContainerId],
        options: &CallOptions,
    ) -> RuntimeResult<()> {
        self.mutate("recreate", options, |state| {
            state.check_fault("recreate", service.name(), options)?;
            state.remove_ids(containers)?;
            for _ in 0..containers.len() {
                state.spawn(project, service, options)?;
            }
            Ok(())
        })
    }

    fn start(
        &self,
        project: &str,
        service: &str,
        containers: &[ContainerId],
        options: &CallOptions,
    ) -> RuntimeResult<()> {
        self.mutate("start", options, |state| {
            state.check_fault("start", service, options)?;
            for id in containers {
                let container = state
                    .containers
                    .iter_mut()
                    .find(|c| &c.id == id && c.project == project)
                    .ok_or_else(|| RuntimeError::NotFound { id: id.to_string() })?;
                container.set_running(true);
            }
            Ok(())
        })
    }

    fn stop(&self, project: &str, service: &str, options: &CallOptions) -> RuntimeResult<()> {
        self.mutate("stop", options, |state| {
            state.check_fault("stop", service, options)?;
            state
                .containers
                .iter_mut()
                .filter(|c| c.project == project && c.service == service)
                .for_each(|c| c.set_running(false));
            Ok(())
        })
    }

    fn restart(&self, project: &str, service: &str, options: &CallOptions) -> RuntimeResult<()> {
        self.mutate("restart", options, |state| {
            state.check_fault("restart", service, options)?;
            state
                .containers
                .iter_mut()
                .filter(|c| c.project == project && c.service == service)
                .for_each(|c| c.set_running(true));
            Ok(())
        })
    }

    fn scale(
        &self,
        project: &str,
        service: &ServiceSpec,
        count: u32,
        options: &CallOptions,
    ) -> RuntimeResult<()> {
        self.mutate("scale", options, |state| {
            state.check_fault("scale", service.name(), options)?;
            let mut current: Vec<(u32, ContainerId)> = state
                .service_containers(project, service.name())
                .map(|c| (c.number, c.id.clone()))
                .collect();
            let target = count as usize;
            if current.len() < target {
                for _ in current.len()..target {
                    state.spawn(project, service, options)?;
                }
            } else {
                // Highest container numbers go first
                current.sort();
                let surplus: Vec<ContainerId> =
                    current.split_off(target).into_iter().map(|(_, id)| id).collect();
                state.remove_ids(&surplus)?;
            }
            Ok(())
        })
    }

    fn remove_containers(
        &self,
        project: &str,
        containers: &[ContainerId],
        options: &CallOptions,
    ) -> RuntimeResult<()> {
        self.mutate("remove", options, |state| {
            state.check_fault("remove", project, options)?;
            state.remove_ids(containers)
        })
    }

    fn remove_project(
        &self,
        project: &str,
        teardown: &TeardownOptions,
        options: &CallOptions,
    ) -> RuntimeResult<()> {
        self.mutate("down", options, |state| {
            state.check_fault("down", project, options)?;
            let (removed, kept): (Vec<StoredContainer>, Vec<StoredContainer>) = state
                .containers
                .drain(..)
                .partition(|c| c.project == project && teardown.covers(&c.service));
            state.containers = kept;
            state.prune_images(project, teardown.images, &removed);
            if teardown.volumes {
                state.volumes.remove(project);
            }
            Ok(())
        })
    }

    fn inspect(&self, id: &ContainerId, options: &CallOptions) -> RuntimeResult<ContainerInspection> {
        self.read("inspect", options, |state| {
            let container = state
                .containers
                .iter()
                .find(|c| &c.id == id)
                .ok_or_else(|| RuntimeError::NotFound { id: id.to_string() })?;
            state.check_fault("inspect", &container.service, options)?;
            Ok(container.inspection())
        })
    }
}
