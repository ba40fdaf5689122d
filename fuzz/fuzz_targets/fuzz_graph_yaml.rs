#![no_main]

use libfuzzer_sys::fuzz_target;
use stevedore::presentation::graph_file::{parse_graph, GraphFormat};

fuzz_target!(|data: &[u8]| {
    if let Ok(content) = std::str::from_utf8(data) {
        let _ = parse_graph(content, GraphFormat::Yaml);
    }
});
