//! Lifecycle executor
//!
//! Applies a convergence plan and the direct operator commands (stop, restart,
//! teardown, orphan removal) through the runtime client. Every method first
//! computes its verdict and diff from the snapshot it is given, then issues
//! runtime calls only when not in dry-run. The first failing call aborts.

use tracing::{debug, info};

use crate::domain::entities::{RuntimeContainer, ServiceSpec};
use crate::domain::ports::{
    CallOptions, ReconcileEvent, ReconcileEventSink, RuntimeClient, TeardownOptions,
};
use crate::domain::services::{
    ConvergenceAction, ConvergencePlan, OrphanDetectionResult, RuntimeSnapshot,
};
use crate::domain::value_objects::ContainerId;
use crate::error::{ReconcileError, ReconcileResult};

use super::report::{DiffAction, OperationOutcome};

/// Executes lifecycle actions for one project
pub struct LifecycleExecutor<'c, C: RuntimeClient + ?Sized> {
    client: &'c C,
    project: &'c str,
    call: CallOptions,
    dry_run: bool,
    want_diff: bool,
    events: &'c dyn ReconcileEventSink,
}

impl<'c, C: RuntimeClient + ?Sized> LifecycleExecutor<'c, C> {
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

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    fn record<'a, I>(
        &self,
        outcome: &mut OperationOutcome,
        service: &str,
        action: DiffAction,
        containers: I,
    )
    where
        I: IntoIterator<Item = &'a RuntimeContainer>,
    {
        if self.want_diff {
            outcome.record(service, action, containers);
        }
    }

    fn applied(&self, service: &str, action: DiffAction) {
        info!(project = self.project, service, %action, "applied");
        if self.events.wants_detailed_events() {
            self.events.on_event(ReconcileEvent::ActionApplied {
                service: service.to_string(),
                action: action.as_str().to_string(),
            });
        }
    }

    /// Apply every non-noop entry of the plan, in plan order
    pub fn execute(&self, plan: &ConvergencePlan) -> ReconcileResult<OperationOutcome> {
        let mut outcome = OperationOutcome::new();
        outcome.changed = plan.changed();

        for entry in plan.actions() {
            if let Some(action) = DiffAction::from_convergence(entry.action) {
                self.record(&mut outcome, entry.name(), action, &entry.containers);
            }
        }

        if self.dry_run || !outcome.changed {
            debug!(dry_run = self.dry_run, changed = outcome.changed, "skipping plan execution");
            return Ok(outcome);
        }

        for entry in plan.actions() {
            let service = &entry.service;
            let result = match entry.action {
                ConvergenceAction::Create => self.client.create(self.project, service, &self.call),
                ConvergenceAction::Recreate => self.client.recreate(
                    self.project,
                    service,
                    &entry.container_ids(),
                    &self.call,
                ),
                ConvergenceAction::Start => self.client.start(
                    self.project,
                    service.name(),
                    &entry.container_ids(),
                    &self.call,
                ),
                ConvergenceAction::None => continue,
            };
            result.map_err(|e| ReconcileError::convergence(service.name(), e))?;
            if let Some(action) = DiffAction::from_convergence(entry.action) {
                self.applied(service.name(), action);
            }
        }

        Ok(outcome)
    }

    /// Stop every running container of the targeted services
    ///
    /// Services are stopped in reverse of the given (dependency) order.
    pub fn stop(
        &self,
        services: &[&ServiceSpec],
        snapshot: &RuntimeSnapshot,
    ) -> ReconcileResult<OperationOutcome> {
        let mut outcome = OperationOutcome::new();
        for service in services {
            let running: Vec<&RuntimeContainer> = snapshot.running(service.name()).collect();
            if running.is_empty() {
                continue;
            }
            outcome.mark_changed();
            self.record(&mut outcome, service.name(), DiffAction::Stop, running);
        }

        if !self.dry_run {
            for service in services.iter().rev() {
                if snapshot.running(service.name()).next().is_none() {
                    continue;
                }
                self.client
                    .stop(self.project, service.name(), &self.call)
                    .map_err(|e| ReconcileError::convergence(service.name(), e))?;
                self.applied(service.name(), DiffAction::Stop);
            }
        }

        Ok(outcome)
    }

    /// Restart every container of the targeted services, running or not
    pub fn restart(
        &self,
        services: &[&ServiceSpec],
        snapshot: &RuntimeSnapshot,
    ) -> ReconcileResult<OperationOutcome> {
        let mut outcome = OperationOutcome::new();
        for service in services {
            let containers = snapshot.containers(service.name());
            if containers.is_empty() {
                continue;
            }
            outcome.mark_changed();
            self.record(&mut outcome, service.name(), DiffAction::Restart, containers);
        }

        if !self.dry_run {
            for service in services {
                if snapshot.count(service.name()) == 0 {
                    continue;
                }
                self.client
                    .restart(self.project, service.name(), &self.call)
                    .map_err(|e| ReconcileError::convergence(service.name(), e))?;
                self.applied(service.name(), DiffAction::Restart);
            }
        }

        Ok(outcome)
    }

    /// Remove the whole project with a single teardown call
    ///
    /// `containers` is everything the teardown will delete; the verdict is
    /// changed iff it is non-empty.
    pub fn teardown(
        &self,
        containers: &[RuntimeContainer],
        teardown: &TeardownOptions,
    ) -> ReconcileResult<OperationOutcome> {
        let mut outcome = OperationOutcome::new();
        if containers.is_empty() {
            return Ok(outcome);
        }
        outcome.mark_changed();
        for container in containers {
            self.record(
                &mut outcome,
                &container.service,
                DiffAction::Deleted,
                std::iter::once(container),
            );
        }

        if !self.dry_run {
            self.client
                .remove_project(self.project, teardown, &self.call)
                .map_err(|e| ReconcileError::convergence(self.project, e))?;
            info!(
                project = self.project,
                containers = containers.len(),
                images = teardown.images.as_str(),
                volumes = teardown.volumes,
                "project removed"
            );
        }

        Ok(outcome)
    }

    /// Remove containers owned by services the graph no longer declares
    pub fn remove_orphans(
        &self,
        orphans: &OrphanDetectionResult,
    ) -> ReconcileResult<OperationOutcome> {
        let mut outcome = OperationOutcome::new();
        if orphans.is_empty() {
            return Ok(outcome);
        }
        outcome.mark_changed();

        let grouped = orphans.by_service();
        for (service, containers) in &grouped {
            self.record(
                &mut outcome,
                service,
                DiffAction::Removed,
                containers.iter().copied(),
            );
        }

        if !self.dry_run {
            for (service, containers) in grouped {
                let ids: Vec<ContainerId> = containers.iter().map(|c| c.id.clone()).collect();
                self.client
                    .remove_containers(self.project, &ids, &self.call)
                    .map_err(|e| ReconcileError::convergence(service, e))?;
                self.applied(service, DiffAction::Removed);
            }
        }

        Ok(outcome)
    }
}
