//! Reusable graphs

use stevedore::{ContainerConfig, ServiceGraph, ServiceSpec};

pub fn db_spec() -> ServiceSpec {
    ServiceSpec::new(
        "db",
        ContainerConfig::new("postgres:16")
            .with_env("POSTGRES_PASSWORD", "secret")
            .with_mount("pgdata:/var/lib/postgresql/data"),
    )
}

pub fn web_spec(image: &str) -> ServiceSpec {
    ServiceSpec::new(
        "web",
        ContainerConfig::new(image)
            .with_command(["gunicorn", "app:app"])
            .with_port("8080:80"),
    )
    .with_dependency("db")
}

/// `db` and `web`, web depends on db
pub fn shop_graph() -> ServiceGraph {
    shop_graph_with_web("shop/web:1")
}

pub fn shop_graph_with_web(image: &str) -> ServiceGraph {
    ServiceGraph::builder("shop")
        .service(db_spec())
        .service(web_spec(image))
        .build()
        .expect("valid graph")
}

/// A graph that cannot be ordered
pub const CYCLIC_GRAPH_JSON: &str = r#"{
  "project": "loop",
  "services": [
    { "name": "a", "config": { "image": "a:1" }, "depends_on": ["b"] },
    { "name": "b", "config": { "image": "b:1" }, "depends_on": ["a"] }
  ]
}"#;
