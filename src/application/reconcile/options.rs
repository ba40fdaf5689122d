//! Reconcile Options
//!
//! The explicit, exhaustively-enumerated option set of a reconcile run.

use std::collections::BTreeMap;
use std::time::Duration;

use crate::config::EngineConfig;
use crate::domain::entities::ServiceGraph;
use crate::domain::ports::{CallOptions, TeardownOptions};
use crate::domain::services::PlanOptions;
use crate::domain::value_objects::{DesiredState, ImageRemoval};
use crate::error::{ReconcileError, ReconcileResult};

/// Options for the reconcile use case
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileOptions {
    /// Services to converge (empty = all)
    pub services_filter: Vec<String>,
    /// Pull in transitive dependencies of the filtered services
    pub include_dependencies: bool,
    /// Recreate every existing container
    pub force_recreate: bool,
    /// Recreate containers whose configuration drifted
    pub allow_recreate: bool,
    /// Build images before creating containers
    pub build: bool,
    /// Target container counts, applied after convergence
    pub scale_targets: BTreeMap<String, u32>,
    /// Stop the targeted services after convergence
    pub stop_after_up: bool,
    /// Restart the targeted services after convergence
    pub restart_after_up: bool,
    /// Image removal on teardown
    pub image_removal: ImageRemoval,
    /// Remove named volumes on teardown
    pub remove_volumes: bool,
    /// Remove containers of services no longer in the graph
    pub remove_orphans: bool,
    /// Plan and report without issuing mutating runtime calls
    pub dry_run: bool,
    /// Collect per-container diff entries
    pub want_diff: bool,
    /// Upper bound for each blocking runtime call
    pub timeout: Duration,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl ReconcileOptions {
    pub fn new() -> Self {
        Self {
            services_filter: Vec::new(),
            include_dependencies: true,
            force_recreate: false,
            allow_recreate: true,
            build: true,
            scale_targets: BTreeMap::new(),
            stop_after_up: false,
            restart_after_up: false,
            image_removal: ImageRemoval::None,
            remove_volumes: false,
            remove_orphans: false,
            dry_run: false,
            want_diff: true,
            timeout: CallOptions::DEFAULT_TIMEOUT,
        }
    }

    /// Seed defaults from the engine configuration
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            include_dependencies: config.reconcile.include_dependencies,
            allow_recreate: config.reconcile.allow_recreate,
            build: config.reconcile.build,
            want_diff: config.reconcile.want_diff,
            timeout: config.runtime.timeout(),
            ..Self::new()
        }
    }

    pub fn with_services<I, S>(mut self, services: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.services_filter = services.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_include_dependencies(mut self, include: bool) -> Self {
        self.include_dependencies = include;
        self
    }

    pub fn with_force_recreate(mut self, force: bool) -> Self {
        self.force_recreate = force;
        self
    }

    pub fn with_allow_recreate(mut self, allow: bool) -> Self {
        self.allow_recreate = allow;
        self
    }

    pub fn with_build(mut self, build: bool) -> Self {
        self.build = build;
        self
    }

    pub fn with_scale(mut self, service: impl Into<String>, count: u32) -> Self {
        self.scale_targets.insert(service.into(), count);
        self
    }

    pub fn with_stopped(mut self, stopped: bool) -> Self {
        self.stop_after_up = stopped;
        self
    }

    pub fn with_restarted(mut self, restarted: bool) -> Self {
        self.restart_after_up = restarted;
        self
    }

    pub fn with_image_removal(mut self, images: ImageRemoval) -> Self {
        self.image_removal = images;
        self
    }

    pub fn with_remove_volumes(mut self, remove: bool) -> Self {
        self.remove_volumes = remove;
        self
    }

    pub fn with_remove_orphans(mut self, remove: bool) -> Self {
        self.remove_orphans = remove;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_want_diff(mut self, want_diff: bool) -> Self {
        self.want_diff = want_diff;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn call_options(&self) -> CallOptions {
        CallOptions::new(self.timeout).with_build(self.build)
    }

    pub fn plan_options(&self) -> PlanOptions {
        PlanOptions {
            force_recreate: self.force_recreate,
            allow_recreate: self.allow_recreate,
        }
    }

    pub fn teardown_options(&self, graph: &ServiceGraph) -> TeardownOptions {
        TeardownOptions {
            images: self.image_removal,
            volumes: self.remove_volumes,
            orphans: self.remove_orphans,
            ..TeardownOptions::new(graph.names())
        }
    }

    /// Reject unknown names and contradictory combinations before any runtime call
    pub fn validate(&self, graph: &ServiceGraph, desired: DesiredState) -> ReconcileResult<()> {
        if let Some(name) = self
            .services_filter
            .iter()
            .chain(self.scale_targets.keys())
            .find(|name| !graph.contains(name))
        {
            return Err(ReconcileError::unknown_service(name.as_str()));
        }

        if self.timeout.is_zero() {
            return Err(ReconcileError::configuration("timeout must be greater than zero"));
        }

        match desired {
            DesiredState::Absent => {
                let present_only = [
                    ("stopped", self.stop_after_up),
                    ("restarted", self.restart_after_up),
                    ("scale", !self.scale_targets.is_empty()),
                    ("force_recreate", self.force_recreate),
                ];
                if let Some((flag, _)) = present_only.iter().find(|(_, set)| *set) {
                    return Err(ReconcileError::configuration(format!(
                        "'{}' cannot be combined with state 'absent'",
                        flag
                    )));
                }
            }
            DesiredState::Present => {
                if self.image_removal.removes_images() {
                    return Err(ReconcileError::configuration(
                        "image removal is only valid with state 'absent'",
                    ));
                }
                if self.remove_volumes {
                    return Err(ReconcileError::configuration(
                        "volume removal is only valid with state 'absent'",
                    ));
                }
            }
        }

        Ok(())
    }
}
