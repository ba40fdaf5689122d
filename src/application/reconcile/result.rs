//! Reconcile Result
//!
//! `ExecutionResult` is the wire contract consumed by the CLI and automation:
//! `{"changed": bool, "diff": {...}, "facts": {...}}`.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::application::report::{OperationOutcome, ProjectFacts, ServiceDiff};
use crate::domain::services::ConvergencePlan;

/// Result of a reconcile invocation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExecutionResult {
    pub changed: bool,
    pub diff: BTreeMap<String, ServiceDiff>,
    pub facts: ProjectFacts,
    /// The convergence plan behind an `up` (not part of the wire shape)
    #[serde(skip)]
    pub plan: Option<ConvergencePlan>,
}

impl ExecutionResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_outcome(outcome: OperationOutcome) -> Self {
        Self {
            changed: outcome.changed,
            diff: outcome.diff,
            ..Self::default()
        }
    }

    pub fn with_facts(mut self, facts: ProjectFacts) -> Self {
        self.facts = facts;
        self
    }

    pub fn with_plan(mut self, plan: ConvergencePlan) -> Self {
        self.plan = Some(plan);
        self
    }

    pub fn has_changes(&self) -> bool {
        self.changed
    }
}
