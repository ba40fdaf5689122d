//! CLI Argument Parsing
//!
//! This module defines the CLI interface using clap.
//!
//! ## Design Notes
//!
//! - Global flags (--json, --color, --verbose, --config, --events) are inherited by all subcommands
//! - Flags only ever narrow or widen what the loaded configuration seeds

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::application::ReconcileOptions;
use crate::domain::value_objects::ImageRemoval;

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorWhen {
    Auto,
    Always,
    Never,
}

/// Stevedore - converge compose projects against a container runtime
#[derive(Parser, Debug)]
#[command(name = "stevedore")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Print the execution result as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Color output mode
    #[arg(long, global = true, value_enum)]
    pub color: Option<ColorWhen>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Configuration file (default: ./stevedore.toml, then the user config)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Stream reconcile events as NDJSON on stderr
    #[arg(long, global = true)]
    pub events: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Converge the project to the graph (desired state `present`)
    Up(UpArgs),

    /// Tear the project down (desired state `absent`)
    Down(DownArgs),

    /// Show what `up` would do without touching the runtime
    Plan(PlanArgs),
}

/// Where the graph and the runtime state live
#[derive(Args, Debug, Clone)]
pub struct ProjectArgs {
    /// Service graph file (JSON, or YAML by extension)
    #[arg(short, long, default_value = "stevedore.json")]
    pub graph: PathBuf,

    /// Runtime state file
    #[arg(short, long, default_value = ".stevedore/runtime.json")]
    pub state: PathBuf,

    /// Per-call timeout in seconds (overrides configuration)
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,
}

/// Service selection shared by `up` and `plan`
#[derive(Args, Debug, Clone, Default)]
pub struct SelectionArgs {
    /// Only converge these services (repeatable)
    #[arg(long = "service", value_name = "NAME")]
    pub services: Vec<String>,

    /// Do not pull in dependencies of the selected services
    #[arg(long)]
    pub no_deps: bool,

    /// Recreate every existing container
    #[arg(long, conflicts_with = "no_recreate")]
    pub force_recreate: bool,

    /// Never recreate containers whose configuration drifted
    #[arg(long)]
    pub no_recreate: bool,
}

#[derive(Args, Debug, Clone)]
pub struct UpArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Do not build images before creating containers
    #[arg(long)]
    pub no_build: bool,

    /// Target container count, e.g. `--scale web=3` (repeatable)
    #[arg(long, value_name = "SERVICE=N", value_parser = parse_scale)]
    pub scale: Vec<(String, u32)>,

    /// Stop the selected services after convergence
    #[arg(long)]
    pub stopped: bool,

    /// Restart the selected services after convergence
    #[arg(long)]
    pub restarted: bool,

    /// Remove containers of services no longer in the graph
    #[arg(long)]
    pub remove_orphans: bool,

    /// Dry run - show what would be done
    #[arg(long)]
    pub dry_run: bool,

    /// Do not report per-container diff entries
    #[arg(long)]
    pub no_diff: bool,
}

#[derive(Args, Debug, Clone)]
pub struct DownArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Remove images: none, local or all
    #[arg(long, value_enum, default_value_t = ImageRemoval::None)]
    pub rmi: ImageRemoval,

    /// Remove named volumes
    #[arg(long)]
    pub volumes: bool,

    /// Also remove containers of services no longer in the graph
    #[arg(long)]
    pub remove_orphans: bool,

    /// Dry run - show what would be done
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args, Debug, Clone)]
pub struct PlanArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    #[command(flatten)]
    pub selection: SelectionArgs,
}

impl ProjectArgs {
    fn apply(&self, options: ReconcileOptions) -> ReconcileOptions {
        match self.timeout {
            Some(secs) => options.with_timeout(Duration::from_secs(secs)),
            None => options,
        }
    }
}

impl SelectionArgs {
    fn apply(&self, options: ReconcileOptions) -> ReconcileOptions {
        let options = options
            .with_services(self.services.clone())
            .with_force_recreate(self.force_recreate);
        let options = if self.no_deps {
            options.with_include_dependencies(false)
        } else {
            options
        };
        if self.no_recreate {
            options.with_allow_recreate(false)
        } else {
            options
        }
    }
}

impl UpArgs {
    /// Layer the flags over configuration-seeded options
    pub fn options(&self, base: ReconcileOptions) -> ReconcileOptions {
        let mut options = self.selection.apply(self.project.apply(base));
        if self.no_build {
            options = options.with_build(false);
        }
        if self.no_diff {
            options = options.with_want_diff(false);
        }
        for (service, count) in &self.scale {
            options = options.with_scale(service.clone(), *count);
        }
        options
            .with_stopped(self.stopped)
            .with_restarted(self.restarted)
            .with_remove_orphans(self.remove_orphans)
            .with_dry_run(self.dry_run)
    }
}

impl DownArgs {
    pub fn options(&self, base: ReconcileOptions) -> ReconcileOptions {
        self.project
            .apply(base)
            .with_image_removal(self.rmi)
            .with_remove_volumes(self.volumes)
            .with_remove_orphans(self.remove_orphans)
            .with_dry_run(self.dry_run)
    }
}

impl PlanArgs {
    pub fn options(&self, base: ReconcileOptions) -> ReconcileOptions {
        self.selection
            .apply(self.project.apply(base))
            .with_dry_run(true)
    }
}

/// Parse `SERVICE=N`
pub fn parse_scale(value: &str) -> Result<(String, u32), String> {
    let (service, count) = value
        .split_once('=')
        .ok_or_else(|| format!("expected SERVICE=N, got '{}'", value))?;
    let service = service.trim();
    if service.is_empty() {
        return Err(format!("missing service name in '{}'", value));
    }
    let count = count
        .trim()
        .parse::<u32>()
        .map_err(|e| format!("invalid count in '{}': {}", value, e))?;
    Ok((service.to_string(), count))
}
