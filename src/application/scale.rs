//! Scale reconciler
//!
//! Moves a service's container count toward a target. Scaling looks only at
//! counts; configuration drift is the planner's concern.

use std::collections::BTreeMap;

use tracing::info;

use crate::domain::entities::{ServiceGraph, ServiceSpec};
use crate::domain::ports::{CallOptions, ReconcileEvent, ReconcileEventSink, RuntimeClient};
use crate::domain::services::RuntimeSnapshot;
use crate::error::{ReconcileError, ReconcileResult};

use super::report::OperationOutcome;

/// Count change computed for one service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaleChange {
    pub service: String,
    /// Containers that exist now, running or stopped
    pub current: usize,
    pub target: u32,
}

impl ScaleChange {
    /// Signed `target - current`
    pub fn delta(&self) -> i64 {
        i64::from(self.target) - self.current as i64
    }

    pub fn changed(&self) -> bool {
        self.delta() != 0
    }
}

pub struct ScaleReconciler<'c, C: RuntimeClient + ?Sized> {
    client: &'c C,
    project: &'c str,
    call: CallOptions,
    dry_run: bool,
    want_diff: bool,
    events: &'c dyn ReconcileEventSink,
}

impl<'c, C: RuntimeClient + ?Sized> ScaleReconciler<'c, C> {
    pub fn new(
        client: &'c C,
        project: &'c str,
        call: CallOptions,
        events: &'c dyn ReconcileEventSink,
    ) -> Self {
        Self {
            client,
            project,
            call,
            dry_run: false,
            want_diff: true,
            events,
        }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_want_diff(mut self, want_diff: bool) -> Self {
        self.want_diff = want_diff;
        self
    }

    /// Scale one service, calling the runtime only when the count differs
    pub fn scale(
        &self,
        service: &ServiceSpec,
        target: u32,
        snapshot: &RuntimeSnapshot,
    ) -> ReconcileResult<ScaleChange> {
        let change = ScaleChange {
            service: service.name().to_string(),
            current: snapshot.count(service.name()),
            target,
        };

        if change.changed() && !self.dry_run {
            self.client
                .scale(self.project, service, target, &self.call)
                .map_err(|e| ReconcileError::convergence(service.name(), e))?;
            info!(
                project = self.project,
                service = service.name(),
                from = change.current,
                to = target,
                "scaled"
            );
            if self.events.wants_detailed_events() {
                self.events.on_event(ReconcileEvent::ActionApplied {
                    service: service.name().to_string(),
                    action: "scale".to_string(),
                });
            }
        }

        Ok(change)
    }

    /// Apply every scale target, in graph declaration order
    pub fn reconcile(
        &self,
        graph: &ServiceGraph,
        targets: &BTreeMap<String, u32>,
        snapshot: &RuntimeSnapshot,
    ) -> ReconcileResult<OperationOutcome> {
        if let Some(unknown) = targets.keys().find(|name| !graph.contains(name)) {
            return Err(ReconcileError::unknown_service(unknown.as_str()));
        }

        let mut outcome = OperationOutcome::new();
        for service in graph.services() {
            let Some(&target) = targets.get(service.name()) else {
                continue;
            };
            let change = self.scale(service, target, snapshot)?;
            if change.changed() {
                outcome.mark_changed();
                if self.want_diff {
                    outcome.record_scale(service.name(), change.delta());
                }
            }
        }
        Ok(outcome)
    }
}
