#![no_main]

use libfuzzer_sys::fuzz_target;
use stevedore::domain::services::DependencyResolver;
use stevedore::ServiceGraph;

fuzz_target!(|data: &[u8]| {
    // Any graph that deserializes must resolve or fail cleanly, never panic
    if let Ok(graph) = serde_json::from_slice::<ServiceGraph>(data) {
        let _ = DependencyResolver::new(&graph).order(&[], true);
        let _ = DependencyResolver::new(&graph).order(&[], false);
    }
});
