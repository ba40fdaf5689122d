//! Graph generators shared by the property tests.

use proptest::prelude::*;

use stevedore::{ContainerConfig, ServiceGraph, ServiceSpec};

pub fn service_name(i: usize) -> String {
    format!("s{}", i)
}

fn spec(i: usize, image_tag: u8) -> ServiceSpec {
    ServiceSpec::new(
        service_name(i),
        ContainerConfig::new(format!("img{}:{}", i, image_tag)),
    )
}

/// Acyclic graph: service `i` may only depend on services `j < i`.
///
/// Services are declared in a shuffled order so the resolver has to
/// reorder them.
pub fn acyclic_graph() -> impl Strategy<Value = ServiceGraph> {
    (1usize..8)
        .prop_flat_map(|n| {
            (
                proptest::collection::vec(proptest::collection::vec(any::<bool>(), n), n),
                Just((0..n).collect::<Vec<usize>>()).prop_shuffle(),
                proptest::collection::vec(1u8..3, n),
            )
        })
        .prop_map(|(edges, declaration, tags)| {
            let services = declaration
                .iter()
                .map(|&i| {
                    (0..i)
                        .filter(|&j| edges[i][j])
                        .fold(spec(i, tags[i]), |s, j| s.with_dependency(service_name(j)))
                })
                .collect();
            ServiceGraph::new("prop", services).expect("acyclic graph is valid")
        })
}

/// Ring of `k >= 2` services, each depending on the next
pub fn cyclic_graph() -> impl Strategy<Value = ServiceGraph> {
    (2usize..6).prop_map(|k| {
        let services = (0..k)
            .map(|i| spec(i, 1).with_dependency(service_name((i + 1) % k)))
            .collect();
        ServiceGraph::new("ring", services).expect("cycles are accepted at construction")
    })
}
