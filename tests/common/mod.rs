//! Common test utilities for Stevedore scenario and CLI tests.
//!
//! This module provides:
//! - `TestEnv`: Isolated directory with a graph file and a runtime state file
//! - Fixtures: Reusable graphs

#![allow(dead_code)]

pub mod env;
pub mod fixtures;

pub use env::*;
pub use fixtures::*;
