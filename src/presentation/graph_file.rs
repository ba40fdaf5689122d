//! Service graph files
//!
//! The graph is read as an already-resolved `ServiceGraph` document:
//! JSON by default, YAML when the extension says so.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::domain::entities::ServiceGraph;

#[derive(Debug, Error)]
pub enum GraphFileError {
    #[error("failed to read graph file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid graph file {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphFormat {
    Json,
    Yaml,
}

impl GraphFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                GraphFormat::Yaml
            }
            _ => GraphFormat::Json,
        }
    }
}

/// Read and validate a graph file
pub fn load_graph(path: &Path) -> Result<ServiceGraph, GraphFileError> {
    let content = fs::read_to_string(path).map_err(|source| GraphFileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_graph(&content, GraphFormat::from_path(path)).map_err(|message| GraphFileError::Parse {
        path: path.to_path_buf(),
        message,
    })
}

pub fn parse_graph(content: &str, format: GraphFormat) -> Result<ServiceGraph, String> {
    match format {
        GraphFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
        GraphFormat::Yaml => serde_yaml_ng::from_str(content).map_err(|e| e.to_string()),
    }
}
