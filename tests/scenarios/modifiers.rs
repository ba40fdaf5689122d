//! Scenario: modifiers applied after convergence
//!
//! Restart, stop and scale run after the base action and report their own
//! diff entries.

use stevedore::application::DiffAction;
use stevedore::domain::ports::CallOptions;
use stevedore::{ReconcileOptions, ReconcileUseCase, RuntimeClient};

use crate::common::*;

#[test]
fn scenario_restart_after_converged_up() {
    let env = TestEnv::new();
    let use_case = ReconcileUseCase::new(env.runtime()).unwrap();
    use_case.up(&shop_graph(), &ReconcileOptions::new()).unwrap();

    let result = use_case
        .up(&shop_graph(), &ReconcileOptions::new().with_restarted(true))
        .unwrap();

    assert_eq!(result.plan.as_ref().map(|p| p.changed()), Some(false));
    assert!(result.changed);
    assert_eq!(result.diff["db"].containers(DiffAction::Restart).len(), 1);
    assert_eq!(result.diff["web"].containers(DiffAction::Restart).len(), 1);
}

#[test]
fn scenario_scale_up_then_repeat() {
    let env = TestEnv::new();
    let use_case = ReconcileUseCase::new(env.runtime()).unwrap();
    use_case.up(&shop_graph(), &ReconcileOptions::new()).unwrap();
    let options = ReconcileOptions::new().with_scale("web", 2);

    let first = use_case.up(&shop_graph(), &options).unwrap();
    assert!(first.changed);
    assert_eq!(first.diff["web"].scale, Some(1));
    assert_eq!(count(&env, "web"), 2);
    assert_eq!(count(&env, "db"), 1);

    let second = use_case.up(&shop_graph(), &options).unwrap();
    assert!(!second.changed);
    assert!(second.diff.is_empty());
    assert_eq!(second.facts["web"].len(), 2);
}

#[test]
fn scenario_stopped_leaves_containers_in_place() {
    let env = TestEnv::new();
    let use_case = ReconcileUseCase::new(env.runtime()).unwrap();

    let result = use_case
        .up(&shop_graph(), &ReconcileOptions::new().with_stopped(true))
        .unwrap();

    assert!(result.changed);
    assert!(result.diff["web"].has(DiffAction::Create));
    assert!(result.diff["web"].has(DiffAction::Stop));
    let state = env.state();
    assert_eq!(state.containers.len(), 2);
    assert!(state.containers.iter().all(|c| !c.running));
    assert_eq!(result.facts["db"]["shop_db_1"].state.status, "exited");

    // Stopped containers are started again by the next plain up
    let restarted = use_case.up(&shop_graph(), &ReconcileOptions::new()).unwrap();
    assert!(restarted.diff["db"].has(DiffAction::Start));
    assert!(env.state().containers.iter().all(|c| c.running));
}

fn count(env: &TestEnv, service: &str) -> usize {
    env.runtime()
        .list_containers("shop", service, &CallOptions::default())
        .unwrap()
        .len()
}
