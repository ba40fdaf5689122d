//! Scenario: tearing a project down, with and without orphans

use stevedore::application::DiffAction;
use stevedore::{ContainerConfig, ImageRemoval, ReconcileOptions, ReconcileUseCase, ServiceGraph, ServiceSpec};

use crate::common::*;

fn graph_with_legacy() -> ServiceGraph {
    ServiceGraph::builder("shop")
        .service(db_spec())
        .service(web_spec("shop/web:1"))
        .service(ServiceSpec::new("legacy", ContainerConfig::new("legacy:1")))
        .build()
        .unwrap()
}

#[test]
fn scenario_down_deletes_every_container() {
    let env = TestEnv::new();
    let use_case = ReconcileUseCase::new(env.runtime()).unwrap();
    use_case.up(&shop_graph(), &ReconcileOptions::new()).unwrap();

    let options = ReconcileOptions::new()
        .with_image_removal(ImageRemoval::All)
        .with_remove_volumes(true);
    let result = use_case.down(&shop_graph(), &options).unwrap();

    assert!(result.changed);
    assert_eq!(result.diff["db"].containers(DiffAction::Deleted)[0].name, "shop_db_1");
    assert_eq!(result.diff["web"].containers(DiffAction::Deleted)[0].name, "shop_web_1");
    assert!(result.facts.is_empty());

    let state = env.state();
    assert!(state.containers.is_empty());
    assert!(state.images.is_empty());
    assert!(!state.volumes.contains_key("shop"));
}

#[test]
fn scenario_down_on_empty_project_changes_nothing() {
    let env = TestEnv::new();
    let use_case = ReconcileUseCase::new(env.runtime()).unwrap();

    let result = use_case.down(&shop_graph(), &ReconcileOptions::new()).unwrap();

    assert!(!result.changed);
    assert!(result.diff.is_empty());
}

#[test]
fn scenario_orphans_removed_during_up() {
    let env = TestEnv::new();
    let use_case = ReconcileUseCase::new(env.runtime()).unwrap();
    use_case.up(&graph_with_legacy(), &ReconcileOptions::new()).unwrap();

    let kept = use_case.up(&shop_graph(), &ReconcileOptions::new()).unwrap();
    assert!(!kept.changed);
    assert_eq!(env.state().containers.len(), 3);

    let removed = use_case
        .up(&shop_graph(), &ReconcileOptions::new().with_remove_orphans(true))
        .unwrap();
    assert!(removed.changed);
    assert_eq!(removed.diff["legacy"].containers(DiffAction::Removed).len(), 1);
    assert!(env.state().containers.iter().all(|c| c.service != "legacy"));
}

#[test]
fn scenario_down_keeps_orphans_unless_asked() {
    let env = TestEnv::new();
    let use_case = ReconcileUseCase::new(env.runtime()).unwrap();
    use_case.up(&graph_with_legacy(), &ReconcileOptions::new()).unwrap();

    use_case.down(&shop_graph(), &ReconcileOptions::new()).unwrap();
    let remaining: Vec<String> = env.state().containers.into_iter().map(|c| c.service).collect();
    assert_eq!(remaining, vec!["legacy"]);

    let result = use_case
        .down(&shop_graph(), &ReconcileOptions::new().with_remove_orphans(true))
        .unwrap();
    assert!(result.diff["legacy"].has(DiffAction::Deleted));
    assert!(env.state().containers.is_empty());
}
