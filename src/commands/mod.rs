//! Command handlers for the binary

mod plan;
mod reconcile;

use std::path::PathBuf;

use anyhow::{Context, Result};
use is_terminal::IsTerminal;
use tracing::warn;

use stevedore::config::{self, LoadedConfig};
use stevedore::presentation::output::{use_color, OutputFormat, TextRenderer};
use stevedore::presentation::{Cli, Commands};
use stevedore::ReconcileOptions;

/// Everything a handler needs besides its own arguments
pub struct Session {
    pub config: LoadedConfig,
    pub format: OutputFormat,
    pub text: TextRenderer,
    pub events: bool,
}

impl Session {
    fn new(cli: &Cli) -> Result<Self> {
        let cwd: PathBuf = std::env::current_dir().context("failed to read current directory")?;
        let loaded = config::resolve(cli.config.as_deref(), &cwd)
            .context("failed to load configuration")?;
        for warning in &loaded.warnings {
            warn!(%warning, "ignoring configuration key");
        }

        let color = use_color(
            cli.color,
            loaded.config.output.color,
            std::io::stdout().is_terminal(),
            std::env::var_os("NO_COLOR").is_some(),
        );

        Ok(Self {
            format: if cli.json {
                OutputFormat::Json
            } else {
                OutputFormat::Text
            },
            text: TextRenderer {
                color,
                verbose: cli.verbose,
                ..TextRenderer::default()
            },
            events: cli.events,
            config: loaded,
        })
    }

    /// Options seeded from configuration, before any flag is applied
    pub fn base_options(&self) -> ReconcileOptions {
        ReconcileOptions::from_config(&self.config.config)
    }
}

pub fn run(cli: &Cli) -> Result<()> {
    let session = Session::new(cli)?;
    match &cli.command {
        Commands::Up(args) => reconcile::up(&session, args),
        Commands::Down(args) => reconcile::down(&session, args),
        Commands::Plan(args) => plan::plan(&session, args),
    }
}
