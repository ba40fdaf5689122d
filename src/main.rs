//! Stevedore CLI - converge compose projects against a container runtime
//!
//! Usage: stevedore <COMMAND>
//!
//! Commands:
//!   up      Converge the project to the graph
//!   down    Tear the project down
//!   plan    Show what `up` would do

use std::process::ExitCode;

use clap::Parser;
use is_terminal::IsTerminal;
use tracing_subscriber::EnvFilter;

use stevedore::presentation::output::{JsonRenderer, TextRenderer};
use stevedore::presentation::Cli;

mod commands;

const LOG_ENV: &str = "STEVEDORE_LOG";

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match commands::run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if cli.json {
                println!("{}", JsonRenderer.render_error(&err));
            } else {
                let renderer = TextRenderer {
                    color: std::io::stderr().is_terminal() && std::env::var_os("NO_COLOR").is_none(),
                    ..TextRenderer::default()
                };
                eprintln!("{}", renderer.render_error(&err));
            }
            ExitCode::FAILURE
        }
    }
}
