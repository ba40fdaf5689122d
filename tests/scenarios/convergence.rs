//! Scenario: bringing a project up and keeping it converged
//!
//! Journey:
//! 1. Empty runtime, `up` creates db then web
//! 2. `up` again changes nothing
//! 3. The web image changes, `up` recreates only web
//! 4. With recreation disallowed, drift is left alone

use std::time::{Duration, Instant};

use fs2::FileExt;
use stevedore::domain::services::ConvergenceAction;
use stevedore::{DesiredState, ReconcileError, ReconcileOptions, ReconcileUseCase, ServiceGraph};

use crate::common::*;

#[test]
fn scenario_fresh_project_is_created_in_dependency_order() {
    let env = TestEnv::new();
    let use_case = ReconcileUseCase::new(env.runtime()).unwrap();

    let result = use_case
        .reconcile(&shop_graph(), DesiredState::Present, &ReconcileOptions::new())
        .unwrap();

    assert!(result.changed);
    let plan = result.plan.as_ref().expect("up attaches its plan");
    let actions: Vec<(&str, ConvergenceAction)> =
        plan.entries().iter().map(|e| (e.name(), e.action)).collect();
    assert_eq!(
        actions,
        vec![
            ("db", ConvergenceAction::Create),
            ("web", ConvergenceAction::Create)
        ]
    );

    let state = env.state();
    let services: Vec<&str> = state.containers.iter().map(|c| c.service.as_str()).collect();
    assert_eq!(services, vec!["db", "web"]);
    assert!(state.containers.iter().all(|c| c.running));

    assert_eq!(result.facts["db"]["shop_db_1"].image, "postgres:16");
    assert!(result.facts["web"]["shop_web_1"].state.running);
}

#[test]
fn scenario_replicated_service_converges_once() {
    let env = TestEnv::new();
    let use_case = ReconcileUseCase::new(env.runtime()).unwrap();
    let graph = ServiceGraph::builder("shop")
        .service(db_spec().with_replicas(2))
        .build()
        .unwrap();

    let first = use_case.up(&graph, &ReconcileOptions::new()).unwrap();
    let second = use_case.up(&graph, &ReconcileOptions::new()).unwrap();

    assert!(first.changed);
    assert!(!second.changed);
    assert!(second.diff.is_empty());
    assert_eq!(env.state().containers.len(), 2);
    assert_eq!(second.facts["db"].len(), 2);
}

#[test]
fn scenario_converged_project_reports_no_change() {
    let env = TestEnv::new();
    let use_case = ReconcileUseCase::new(env.runtime()).unwrap();
    use_case.up(&shop_graph(), &ReconcileOptions::new()).unwrap();
    let before = env.state();

    let result = use_case.up(&shop_graph(), &ReconcileOptions::new()).unwrap();

    assert!(!result.changed);
    assert!(result.diff.is_empty());
    assert_eq!(result.plan.as_ref().map(|p| p.action_count()), Some(0));
    assert_eq!(env.state().containers, before.containers);
    assert_eq!(result.facts.len(), 2);
}

#[test]
fn scenario_image_change_recreates_only_the_drifted_service() {
    let env = TestEnv::new();
    let use_case = ReconcileUseCase::new(env.runtime()).unwrap();
    use_case.up(&shop_graph(), &ReconcileOptions::new()).unwrap();
    let db_before = env.state().containers[0].id.clone();

    let result = use_case
        .up(&shop_graph_with_web("shop/web:2"), &ReconcileOptions::new())
        .unwrap();

    assert!(result.changed);
    assert_eq!(result.diff.keys().collect::<Vec<_>>(), vec!["web"]);
    let state = env.state();
    assert_eq!(state.containers.iter().find(|c| c.service == "db").unwrap().id, db_before);
    let web = state.containers.iter().find(|c| c.service == "web").unwrap();
    assert_eq!(web.image, "shop/web:2");
}

#[test]
fn scenario_drift_ignored_when_recreate_disallowed() {
    let env = TestEnv::new();
    let use_case = ReconcileUseCase::new(env.runtime()).unwrap();
    use_case.up(&shop_graph(), &ReconcileOptions::new()).unwrap();

    let options = ReconcileOptions::new().with_allow_recreate(false);
    let result = use_case.up(&shop_graph_with_web("shop/web:2"), &options).unwrap();

    assert!(!result.changed);
    let web = env.state().containers.into_iter().find(|c| c.service == "web").unwrap();
    assert_eq!(web.image, "shop/web:1");
}

#[test]
fn scenario_dry_run_matches_execute_and_touches_nothing() {
    let env = TestEnv::new();
    let use_case = ReconcileUseCase::new(env.runtime()).unwrap();

    let preview = use_case
        .up(&shop_graph(), &ReconcileOptions::new().with_dry_run(true))
        .unwrap();
    assert!(!env.path(STATE_FILE).exists() || env.state().containers.is_empty());

    let applied = use_case.up(&shop_graph(), &ReconcileOptions::new()).unwrap();
    assert_eq!(preview.changed, applied.changed);
    assert_eq!(preview.diff, applied.diff);
}

#[test]
fn scenario_busy_runtime_times_out_instead_of_waiting() {
    let env = TestEnv::new();
    let use_case = ReconcileUseCase::new(env.runtime()).unwrap();
    use_case.up(&shop_graph(), &ReconcileOptions::new()).unwrap();

    let holder = std::fs::File::create(env.path("state/runtime.lock")).unwrap();
    holder.lock_exclusive().unwrap();

    let started = Instant::now();
    let err = use_case
        .up(
            &shop_graph(),
            &ReconcileOptions::new()
                .with_dry_run(true)
                .with_timeout(Duration::from_millis(200)),
        )
        .unwrap_err();

    assert!(started.elapsed() < Duration::from_secs(3));
    match err {
        ReconcileError::Query { project, source } => {
            assert_eq!(project, "shop");
            assert!(source.is_timeout(), "{}", source);
        }
        other => panic!("expected a query error, got {}", other),
    }
    holder.unlock().unwrap();
}
