//! Presentation Layer
//!
//! This layer handles:
//! - CLI argument parsing (via clap)
//! - Loading the service graph file
//! - Creating use cases with infrastructure dependencies
//! - Output formatting (text/JSON)
//!
//! ## Structure
//!
//! - `cli` - Command line definition and flag-to-options mapping
//! - `factory` - Creates use cases with proper dependencies (dependency injection)
//! - `graph_file` - JSON/YAML graph documents
//! - `output` - Output rendering

pub mod cli;
pub mod factory;
pub mod graph_file;
pub mod output;

pub use cli::{Cli, ColorWhen, Commands};
pub use factory::create_reconcile_use_case;
pub use graph_file::load_graph;
pub use output::{JsonRenderer, OutputFormat, TextRenderer};
