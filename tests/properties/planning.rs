//! Property tests for the convergence planner.

use proptest::prelude::*;

use stevedore::domain::entities::RuntimeContainer;
use stevedore::domain::services::{
    ConvergenceAction, ConvergencePlanner, DependencyResolver, PlanOptions, RuntimeSnapshot,
};
use stevedore::ServiceGraph;

use crate::strategies::acyclic_graph;

/// One running container per service, each matching its spec
fn converged_snapshot(graph: &ServiceGraph) -> RuntimeSnapshot {
    let containers = graph
        .services()
        .iter()
        .enumerate()
        .map(|(i, s)| {
            RuntimeContainer::new(
                format!("{:064x}", i + 1),
                format!("prop_{}_1", s.name()),
                s.name(),
                s.fingerprint(),
            )
        })
        .collect();
    RuntimeSnapshot::from_containers("prop", containers)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: a converged snapshot plans no action.
    #[test]
    fn property_converged_snapshot_is_idempotent(graph in acyclic_graph()) {
        let ordered = DependencyResolver::new(&graph).order(&[], true).unwrap();
        let plan = ConvergencePlanner::new(PlanOptions::default())
            .plan(&ordered, &converged_snapshot(&graph));

        prop_assert!(!plan.changed());
        prop_assert_eq!(plan.action_count(), 0);
    }

    /// PROPERTY: force recreate touches every service that has containers.
    #[test]
    fn property_force_recreate_dominates(graph in acyclic_graph(), allow in any::<bool>()) {
        let ordered = DependencyResolver::new(&graph).order(&[], true).unwrap();
        let options = PlanOptions { force_recreate: true, allow_recreate: allow };
        let plan = ConvergencePlanner::new(options).plan(&ordered, &converged_snapshot(&graph));

        prop_assert!(plan.entries().iter().all(|e| e.action == ConvergenceAction::Recreate));
    }

    /// PROPERTY: an empty snapshot creates every service, nothing else.
    #[test]
    fn property_empty_snapshot_creates_all(graph in acyclic_graph()) {
        let ordered = DependencyResolver::new(&graph).order(&[], true).unwrap();
        let plan = ConvergencePlanner::new(PlanOptions::default())
            .plan(&ordered, &RuntimeSnapshot::from_containers("prop", Vec::new()));

        prop_assert_eq!(plan.action_count(), graph.len());
        prop_assert!(plan.entries().iter().all(|e| e.action == ConvergenceAction::Create && e.containers.is_empty()));
    }
}
