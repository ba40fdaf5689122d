//! Property tests for dependency ordering.

use proptest::prelude::*;

use stevedore::domain::services::DependencyResolver;
use stevedore::ReconcileError;

use crate::strategies::{acyclic_graph, cyclic_graph};

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: every dependency is ordered before its dependents.
    #[test]
    fn property_dependencies_come_first(graph in acyclic_graph()) {
        let order = DependencyResolver::new(&graph).order(&[], true).unwrap();
        let position = |name: &str| order.iter().position(|s| s.name() == name).unwrap();

        prop_assert_eq!(order.len(), graph.len());
        for service in graph.services() {
            for dep in service.dependencies() {
                prop_assert!(position(dep) < position(service.name()));
            }
        }
    }

    /// PROPERTY: resolution is deterministic for identical input.
    #[test]
    fn property_order_is_stable(graph in acyclic_graph()) {
        let resolver = DependencyResolver::new(&graph);
        let first: Vec<&str> = resolver.order(&[], true).unwrap().iter().map(|s| s.name()).collect();
        let second: Vec<&str> = resolver.order(&[], true).unwrap().iter().map(|s| s.name()).collect();
        prop_assert_eq!(first, second);
    }

    /// PROPERTY: a filtered request pulls in exactly the transitive dependencies.
    #[test]
    fn property_filter_closure_is_complete(graph in acyclic_graph(), pick in any::<prop::sample::Index>()) {
        let target = graph.services()[pick.index(graph.len())].name().to_string();
        let order = DependencyResolver::new(&graph).order(&[target.clone()], true).unwrap();

        prop_assert_eq!(order.last().map(|s| s.name()), Some(target.as_str()));
        for service in &order {
            for dep in service.dependencies() {
                prop_assert!(order.iter().any(|s| s.name() == dep));
            }
        }
    }

    /// PROPERTY: cyclic graphs always fail with a closed trace.
    #[test]
    fn property_cycles_always_fail(graph in cyclic_graph(), include_deps in any::<bool>()) {
        match DependencyResolver::new(&graph).order(&[], include_deps) {
            Err(ReconcileError::Cycle { trace }) => {
                prop_assert!(trace.len() >= 3);
                prop_assert_eq!(trace.first(), trace.last());
            }
            other => prop_assert!(false, "expected a cycle, got {:?}", other.map(|o| o.len())),
        }
    }
}
