//! Configuration loading

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

use super::types::EngineConfig;

/// File name looked up in the working directory
pub const PROJECT_CONFIG_FILE: &str = "stevedore.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration in {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Non-fatal configuration warning surfaced to CLI users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub key: String,
    pub file: PathBuf,
    pub line: Option<usize>,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown config key '{}' in {}", self.key, self.file.display())?;
        if let Some(line) = self.line {
            write!(f, ":{}", line)?;
        }
        if let Some(suggestion) = &self.suggestion {
            write!(f, " (did you mean '{}'?)", suggestion)?;
        }
        Ok(())
    }
}

/// Configuration together with where it came from
#[derive(Debug, Clone, Default)]
pub struct LoadedConfig {
    pub config: EngineConfig,
    pub source: Option<PathBuf>,
    pub warnings: Vec<ConfigWarning>,
}

/// Load configuration and collect non-fatal warnings (e.g. unknown keys).
pub fn load_with_warnings(path: &Path) -> ConfigResult<(EngineConfig, Vec<ConfigWarning>)> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut unknown_paths: Vec<String> = Vec::new();
    let deserializer = toml::de::Deserializer::new(&content);

    let config: EngineConfig = serde_ignored::deserialize(deserializer, |p| {
        unknown_paths.push(p.to_string());
    })
    .map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let warnings = unknown_paths
        .iter()
        .map(|dotted| unknown_key_warning(path, &content, dotted))
        .collect();

    Ok((config, warnings))
}

/// Resolve configuration: explicit path, `./stevedore.toml`, user config, defaults
///
/// An explicit path must exist. Environment overrides are applied last.
pub fn resolve(explicit: Option<&Path>, working_dir: &Path) -> ConfigResult<LoadedConfig> {
    let candidate = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => [
            Some(working_dir.join(PROJECT_CONFIG_FILE)),
            user_config_path(),
        ]
        .into_iter()
        .flatten()
        .find(|p| p.is_file()),
    };

    let loaded = match candidate {
        Some(path) => {
            let (config, warnings) = load_with_warnings(&path)?;
            debug!(path = %path.display(), "loaded configuration");
            LoadedConfig {
                config,
                source: Some(path),
                warnings,
            }
        }
        None => LoadedConfig::default(),
    };

    Ok(LoadedConfig {
        config: with_env_overrides(loaded.config),
        ..loaded
    })
}

/// `<config dir>/stevedore/config.toml`
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("stevedore").join("config.toml"))
}

/// Apply environment variable overrides (STEVEDORE_* prefix)
///
/// Unparseable values are ignored with a warning.
pub fn with_env_overrides(mut config: EngineConfig) -> EngineConfig {
    // STEVEDORE_TIMEOUT_SECS
    if let Ok(val) = std::env::var("STEVEDORE_TIMEOUT_SECS") {
        match val.trim().parse::<u64>() {
            Ok(secs) => config.runtime.timeout_secs = secs,
            Err(_) => warn!(value = %val, "ignoring invalid STEVEDORE_TIMEOUT_SECS"),
        }
    }

    // STEVEDORE_ALLOW_RECREATE
    if let Some(flag) = env_flag("STEVEDORE_ALLOW_RECREATE") {
        config.reconcile.allow_recreate = flag;
    }

    // STEVEDORE_BUILD
    if let Some(flag) = env_flag("STEVEDORE_BUILD") {
        config.reconcile.build = flag;
    }

    // STEVEDORE_WANT_DIFF
    if let Some(flag) = env_flag("STEVEDORE_WANT_DIFF") {
        config.reconcile.want_diff = flag;
    }

    config
}

fn env_flag(var: &str) -> Option<bool> {
    let val = std::env::var(var).ok()?;
    let parsed = parse_flag(&val);
    if parsed.is_none() {
        warn!(var, value = %val, "ignoring invalid boolean");
    }
    parsed
}

/// Parse a boolean switch such as `1`, `true`, `off`
pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Keys accepted in each table; `""` lists the tables themselves
const KNOWN_KEYS: &[(&str, &[&str])] = &[
    ("", &["runtime", "reconcile", "output"]),
    ("runtime", &["timeout_secs"]),
    (
        "reconcile",
        &["allow_recreate", "build", "want_diff", "include_dependencies"],
    ),
    ("output", &["color"]),
];

fn unknown_key_warning(path: &Path, content: &str, dotted: &str) -> ConfigWarning {
    let (table, key) = dotted.rsplit_once('.').unwrap_or(("", dotted));
    ConfigWarning {
        key: key.to_string(),
        file: path.to_path_buf(),
        line: key_line(content, table, key),
        suggestion: closest_key(table, key).map(str::to_string),
    }
}

/// 1-based line where `key` is assigned inside `[table]`, or where a
/// top-level `[key]` header opens
fn key_line(content: &str, table: &str, key: &str) -> Option<usize> {
    let mut current = "";
    for (i, line) in content.lines().enumerate() {
        let line = line.trim();
        if let Some(header) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            current = header.trim();
            if table.is_empty() && current == key {
                return Some(i + 1);
            }
            continue;
        }
        let assigned = line.split_once('=').map(|(lhs, _)| lhs.trim());
        if current == table && assigned == Some(key) {
            return Some(i + 1);
        }
    }
    None
}

/// Nearest known key of the same table, within two edits
fn closest_key(table: &str, key: &str) -> Option<&'static str> {
    let (_, candidates) = KNOWN_KEYS.iter().find(|(t, _)| *t == table)?;
    candidates
        .iter()
        .map(|candidate| (edit_distance(key, candidate), *candidate))
        .filter(|(distance, _)| *distance <= 2)
        .min()
        .map(|(_, candidate)| candidate)
}

fn edit_distance(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut row: Vec<usize> = (0..=b.len()).collect();
    for (i, ca) in a.chars().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let above = row[j + 1];
            row[j + 1] = if ca == *cb {
                diagonal
            } else {
                1 + diagonal.min(above).min(row[j])
            };
            diagonal = above;
        }
    }
    row[b.len()]
}
