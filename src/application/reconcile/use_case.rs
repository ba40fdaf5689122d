//! Reconcile Use Case
//!
//! Orchestrates one invocation:
//! 1. Validate options against the graph
//! 2. Resolve service order
//! 3. Snapshot the runtime and plan
//! 4. Execute the plan (unless dry-run)
//! 5. Apply orphan removal, stop, restart and scale, in that order
//! 6. Collect facts
//!
//! Each step returns its own outcome fragment; fragments are merged here.

use std::sync::Arc;

use tracing::{debug, info};

use crate::application::executor::LifecycleExecutor;
use crate::application::report::{FactReporter, OperationOutcome};
use crate::application::scale::ScaleReconciler;
use crate::domain::entities::{RuntimeContainer, ServiceGraph, ServiceSpec};
use crate::domain::ports::{NoopEventSink, ReconcileEvent, ReconcileEventSink, RuntimeClient};
use crate::domain::services::{
    ConvergencePlan, ConvergencePlanner, DependencyResolver, OrphanDetectionResult,
    OrphanDetector, RuntimeSnapshot,
};
use crate::domain::value_objects::DesiredState;
use crate::error::{ReconcileError, ReconcileResult};

use super::options::ReconcileOptions;
use super::result::ExecutionResult;

/// Reconcile use case, generic over the runtime client
pub struct ReconcileUseCase<C: RuntimeClient> {
    client: C,
    events: Arc<dyn ReconcileEventSink>,
}

impl<C: RuntimeClient> std::fmt::Debug for ReconcileUseCase<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReconcileUseCase").finish_non_exhaustive()
    }
}

impl<C: RuntimeClient> ReconcileUseCase<C> {
    /// Wrap a runtime client, checking it is usable before anything is planned
    pub fn new(client: C) -> ReconcileResult<Self> {
        client.ensure_available().map_err(|e| {
            ReconcileError::configuration(format!("runtime client is not usable: {}", e))
        })?;
        Ok(Self {
            client,
            events: Arc::new(NoopEventSink),
        })
    }

    pub fn with_events(mut self, events: Arc<dyn ReconcileEventSink>) -> Self {
        self.events = events;
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Converge the project to `present`
    pub fn up(
        &self,
        graph: &ServiceGraph,
        options: &ReconcileOptions,
    ) -> ReconcileResult<ExecutionResult> {
        self.reconcile(graph, DesiredState::Present, options)
    }

    /// Tear the project down
    pub fn down(
        &self,
        graph: &ServiceGraph,
        options: &ReconcileOptions,
    ) -> ReconcileResult<ExecutionResult> {
        self.reconcile(graph, DesiredState::Absent, options)
    }

    /// Single entry point: resolve, plan, execute, apply modifiers, report
    pub fn reconcile(
        &self,
        graph: &ServiceGraph,
        desired: DesiredState,
        options: &ReconcileOptions,
    ) -> ReconcileResult<ExecutionResult> {
        options.validate(graph, desired)?;

        self.events.on_event(ReconcileEvent::Started {
            project: graph.project().to_string(),
            desired,
            dry_run: options.dry_run,
        });
        info!(
            project = graph.project(),
            desired = desired.as_str(),
            dry_run = options.dry_run,
            "reconcile started"
        );

        let result = match desired {
            DesiredState::Present => self.converge(graph, options)?,
            DesiredState::Absent => self.teardown(graph, options)?,
        };

        self.events.on_event(ReconcileEvent::Completed {
            changed: result.changed,
            services: result.diff.len(),
        });
        info!(
            project = graph.project(),
            changed = result.changed,
            "reconcile finished"
        );
        Ok(result)
    }

    /// Compute the convergence plan without touching the runtime
    pub fn plan(
        &self,
        graph: &ServiceGraph,
        options: &ReconcileOptions,
    ) -> ReconcileResult<ConvergencePlan> {
        options.validate(graph, DesiredState::Present)?;
        let ordered = DependencyResolver::new(graph)
            .order(&options.services_filter, options.include_dependencies)?;
        let snapshot = RuntimeSnapshot::capture(
            &self.client,
            graph.project(),
            ordered.iter().map(|s| s.name()),
            &options.call_options(),
        )?;
        let plan = ConvergencePlanner::new(options.plan_options()).plan(&ordered, &snapshot);
        if self.events.wants_detailed_events() {
            for entry in plan.entries() {
                self.events.on_event(ReconcileEvent::ServicePlanned {
                    service: entry.name().to_string(),
                    action: entry.action,
                    containers: entry.containers.len(),
                });
            }
        }
        Ok(plan)
    }

    fn executor<'a>(
        &'a self,
        project: &'a str,
        options: &ReconcileOptions,
    ) -> LifecycleExecutor<'a, C> {
        LifecycleExecutor::new(
            &self.client,
            project,
            options.call_options(),
            self.events.as_ref(),
        )
        .with_dry_run(options.dry_run)
        .with_want_diff(options.want_diff)
    }

    fn converge(
        &self,
        graph: &ServiceGraph,
        options: &ReconcileOptions,
    ) -> ReconcileResult<ExecutionResult> {
        let project = graph.project();
        let executor = self.executor(project, options);

        let plan = self.plan(graph, options)?;
        let mut outcome = executor.execute(&plan)?;
        let executed = outcome.changed && !options.dry_run;

        if options.remove_orphans {
            outcome.merge(self.remove_orphans(graph, options, &executor)?);
        }

        if options.stop_after_up || options.restart_after_up || !options.scale_targets.is_empty() {
            // Counts and running flags may have moved; modifiers see fresh state
            let snapshot = RuntimeSnapshot::capture(
                &self.client,
                project,
                graph.names(),
                &options.call_options(),
            )?;
            debug!(executed, containers = snapshot.total(), "modifier snapshot");
            let targets = self.modifier_targets(graph, options)?;

            if options.stop_after_up {
                let stopped = executor.stop(&targets, &snapshot)?;
                self.modifier_applied("stop", &stopped);
                outcome.merge(stopped);
            }

            if options.restart_after_up {
                let restarted = executor.restart(&targets, &snapshot)?;
                self.modifier_applied("restart", &restarted);
                outcome.merge(restarted);
            }

            if !options.scale_targets.is_empty() {
                let scaled = ScaleReconciler::new(
                    &self.client,
                    project,
                    options.call_options(),
                    self.events.as_ref(),
                )
                .with_dry_run(options.dry_run)
                .with_want_diff(options.want_diff)
                .reconcile(graph, &options.scale_targets, &snapshot)?;
                self.modifier_applied("scale", &scaled);
                outcome.merge(scaled);
            }
        }

        let facts = FactReporter::new(&self.client, project, options.call_options())
            .collect_all(graph)?;

        Ok(ExecutionResult::from_outcome(outcome)
            .with_facts(facts)
            .with_plan(plan))
    }

    fn teardown(
        &self,
        graph: &ServiceGraph,
        options: &ReconcileOptions,
    ) -> ReconcileResult<ExecutionResult> {
        let project = graph.project();
        let snapshot = RuntimeSnapshot::capture(
            &self.client,
            project,
            graph.names(),
            &options.call_options(),
        )?;

        let mut doomed: Vec<RuntimeContainer> = graph
            .names()
            .flat_map(|name| snapshot.containers(name).iter().cloned())
            .collect();
        if options.remove_orphans {
            doomed.extend(self.detect_orphans(graph, options)?.orphans);
        }

        let outcome = self
            .executor(project, options)
            .teardown(&doomed, &options.teardown_options(graph))?;
        self.modifier_applied("teardown", &outcome);
        Ok(ExecutionResult::from_outcome(outcome))
    }

    fn detect_orphans(
        &self,
        graph: &ServiceGraph,
        options: &ReconcileOptions,
    ) -> ReconcileResult<OrphanDetectionResult> {
        let containers = self
            .client
            .list_project_containers(graph.project(), &options.call_options())
            .map_err(|e| ReconcileError::query(graph.project(), e))?;
        let detected = OrphanDetector::detect(graph, &containers);
        if !detected.is_empty() {
            self.events.on_event(ReconcileEvent::OrphansDetected {
                count: detected.len(),
            });
        }
        Ok(detected)
    }

    fn remove_orphans(
        &self,
        graph: &ServiceGraph,
        options: &ReconcileOptions,
        executor: &LifecycleExecutor<'_, C>,
    ) -> ReconcileResult<OperationOutcome> {
        let orphans = self.detect_orphans(graph, options)?;
        let outcome = executor.remove_orphans(&orphans)?;
        self.modifier_applied("remove_orphans", &outcome);
        Ok(outcome)
    }

    /// Services targeted by stop/restart: the filter, or every service, in dependency order
    fn modifier_targets<'g>(
        &self,
        graph: &'g ServiceGraph,
        options: &ReconcileOptions,
    ) -> ReconcileResult<Vec<&'g ServiceSpec>> {
        let ordered = DependencyResolver::new(graph).order(&options.services_filter, true)?;
        if options.services_filter.is_empty() {
            return Ok(ordered);
        }
        Ok(ordered
            .into_iter()
            .filter(|s| options.services_filter.iter().any(|f| f == s.name()))
            .collect())
    }

    fn modifier_applied(&self, modifier: &str, outcome: &OperationOutcome) {
        debug!(modifier, changed = outcome.changed, "modifier applied");
        self.events.on_event(ReconcileEvent::ModifierApplied {
            modifier: modifier.to_string(),
            changed: outcome.changed,
        });
    }
}
