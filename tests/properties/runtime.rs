//! Property tests that run the full use case against a state file.

use proptest::prelude::*;

use stevedore::domain::ports::CallOptions;
use stevedore::{ReconcileOptions, ReconcileUseCase, RuntimeClient};

use crate::common::*;
use crate::strategies::acyclic_graph;

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 24,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: scaling changes only the target service, by exactly the delta.
    #[test]
    fn property_scale_delta(current in 1u32..4, target in 0u32..5) {
        let env = TestEnv::new();
        let use_case = ReconcileUseCase::new(env.runtime()).unwrap();
        let graph = shop_graph();
        use_case.up(&graph, &ReconcileOptions::new().with_scale("web", current)).unwrap();

        let result = use_case
            .up(&graph, &ReconcileOptions::new().with_scale("web", target))
            .unwrap();

        let delta = i64::from(target) - i64::from(current);
        prop_assert_eq!(result.changed, delta != 0);
        prop_assert_eq!(result.diff.get("web").and_then(|d| d.scale), (delta != 0).then_some(delta));
        prop_assert_eq!(env.runtime().list_containers("shop", "web", &CallOptions::default()).unwrap().len(), target as usize);
        prop_assert_eq!(env.runtime().list_containers("shop", "db", &CallOptions::default()).unwrap().len(), 1);
    }

    /// PROPERTY: a dry run leaves the runtime untouched and predicts the real run.
    #[test]
    fn property_dry_run_is_pure(before in acyclic_graph(), after in acyclic_graph(), force in any::<bool>()) {
        let env = TestEnv::new();
        let use_case = ReconcileUseCase::new(env.runtime()).unwrap();
        use_case.up(&before, &ReconcileOptions::new()).unwrap();
        let snapshot = env.state();

        let options = ReconcileOptions::new().with_force_recreate(force);
        let preview = use_case.up(&after, &options.clone().with_dry_run(true)).unwrap();
        prop_assert_eq!(&env.state(), &snapshot);

        let applied = use_case.up(&after, &options).unwrap();
        prop_assert_eq!(preview.changed, applied.changed);
        prop_assert_eq!(
            preview.diff.keys().collect::<Vec<_>>(),
            applied.diff.keys().collect::<Vec<_>>()
        );
    }

    /// PROPERTY: a second identical up never changes anything.
    #[test]
    fn property_second_up_is_idempotent(graph in acyclic_graph()) {
        let env = TestEnv::new();
        let use_case = ReconcileUseCase::new(env.runtime()).unwrap();
        use_case.up(&graph, &ReconcileOptions::new()).unwrap();

        let again = use_case.up(&graph, &ReconcileOptions::new()).unwrap();
        prop_assert!(!again.changed);
        prop_assert!(again.diff.is_empty());
    }
}
