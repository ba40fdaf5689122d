//! Output Rendering
//!
//! Turns execution results and plans into text or JSON. Renderers return
//! strings; the binary decides where they go.

use std::fmt::Write as _;

use crossterm::style::{Color, Stylize};
use serde_json::json;

use crate::application::{DiffAction, ExecutionResult};
use crate::config::ColorMode;
use crate::domain::services::{ConvergenceAction, ConvergencePlan};
use crate::domain::value_objects::DesiredState;
use crate::error::ReconcileError;
use crate::presentation::cli::ColorWhen;

/// Output format for rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output for scripting
    Json,
}

mod colors {
    use super::Color;

    pub const SUCCESS: Color = Color::Green;
    pub const ERROR: Color = Color::Red;
    pub const WARNING: Color = Color::Yellow;
    pub const INFO: Color = Color::Cyan;
    pub const DIM: Color = Color::DarkGrey;
}

/// Icons for output rendering
struct Icons {
    check: &'static str,
    cross: &'static str,
    arrow: &'static str,
}

impl Icons {
    fn unicode() -> Self {
        Self {
            check: "✓",
            cross: "✗",
            arrow: "→",
        }
    }

    fn ascii() -> Self {
        Self {
            check: "[OK]",
            cross: "[FAIL]",
            arrow: "->",
        }
    }
}

/// Decide whether to color output
///
/// The CLI flag wins over the configured mode; `auto` needs a terminal and
/// no `NO_COLOR`.
pub fn use_color(cli: Option<ColorWhen>, config: ColorMode, is_tty: bool, no_color: bool) -> bool {
    match cli {
        Some(ColorWhen::Never) => false,
        Some(ColorWhen::Always) => true,
        Some(ColorWhen::Auto) | None => match config {
            ColorMode::Never => false,
            ColorMode::Always => true,
            ColorMode::Auto => is_tty && !no_color,
        },
    }
}

/// Text renderer for results and plans
#[derive(Debug, Clone)]
pub struct TextRenderer {
    /// Whether to use colors
    pub color: bool,
    /// Whether to use unicode
    pub unicode: bool,
    /// Verbosity level
    pub verbose: u8,
}

impl Default for TextRenderer {
    fn default() -> Self {
        Self {
            color: false,
            unicode: true,
            verbose: 0,
        }
    }
}

impl TextRenderer {
    fn paint(&self, text: &str, color: Color) -> String {
        if self.color {
            format!("{}", text.with(color))
        } else {
            text.to_string()
        }
    }

    fn icons(&self) -> Icons {
        if self.unicode {
            Icons::unicode()
        } else {
            Icons::ascii()
        }
    }

    fn action_color(action: DiffAction) -> Color {
        match action {
            DiffAction::Create | DiffAction::Start | DiffAction::Restart => colors::SUCCESS,
            DiffAction::Recreate => colors::INFO,
            DiffAction::Stop => colors::WARNING,
            DiffAction::Removed | DiffAction::Deleted => colors::ERROR,
        }
    }

    pub fn render_result(
        &self,
        project: &str,
        desired: DesiredState,
        dry_run: bool,
        result: &ExecutionResult,
    ) -> String {
        let icons = self.icons();
        let mut out = String::new();
        let verb = match desired {
            DesiredState::Present => "up",
            DesiredState::Absent => "down",
        };
        let suffix = if dry_run { " (dry run)" } else { "" };

        if !result.changed {
            let _ = writeln!(
                out,
                "{} {} {}: already up-to-date{}",
                self.paint(icons.check, colors::SUCCESS),
                verb,
                project,
                suffix
            );
        } else {
            let status = if dry_run { "would change" } else { "changed" };
            let _ = writeln!(
                out,
                "{} {} {}: {}{}",
                self.paint(icons.check, colors::SUCCESS),
                verb,
                project,
                status,
                suffix
            );
        }

        for (service, diff) in &result.diff {
            let _ = writeln!(out, "  {}", service);
            for (action, refs) in &diff.actions {
                let label = self.paint(&format!("{:<9}", action.as_str()), Self::action_color(*action));
                if refs.is_empty() {
                    let _ = writeln!(out, "    {}", label.trim_end());
                }
                for container in refs {
                    let _ = writeln!(
                        out,
                        "    {} {} {}",
                        label,
                        container.name,
                        self.paint(&format!("({})", container.short_id), colors::DIM)
                    );
                }
            }
            if let Some(delta) = diff.scale {
                let _ = writeln!(out, "    {:<9} {:+}", "scale", delta);
            }
        }

        if self.verbose > 0 && !result.facts.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "  Facts:");
            for (service, containers) in &result.facts {
                for (name, facts) in containers {
                    let _ = writeln!(
                        out,
                        "    {} {} {} {} [{}]",
                        service,
                        icons.arrow,
                        name,
                        facts.image,
                        facts.state.status
                    );
                }
            }
        }

        out
    }

    pub fn render_plan(&self, project: &str, plan: &ConvergencePlan) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Plan for {}:", project);
        let width = plan
            .entries()
            .iter()
            .map(|e| e.name().len())
            .max()
            .unwrap_or(0);
        for entry in plan.entries() {
            let action = match entry.action {
                ConvergenceAction::None => self.paint("none", colors::DIM),
                ConvergenceAction::Create => self.paint("create", colors::SUCCESS),
                ConvergenceAction::Recreate => self.paint("recreate", colors::INFO),
                ConvergenceAction::Start => self.paint("start", colors::SUCCESS),
            };
            let count = entry.containers.len();
            let detail = match entry.action {
                ConvergenceAction::Create => format!(" ({} new)", entry.service.replicas()),
                _ if count > 0 => format!(" ({} container{})", count, if count == 1 { "" } else { "s" }),
                _ => String::new(),
            };
            let _ = writeln!(out, "  {:<width$}  {}{}", entry.name(), action, detail, width = width);
        }
        let _ = writeln!(out, "{} service(s) to change", plan.action_count());
        out
    }

    pub fn render_error(&self, error: &anyhow::Error) -> String {
        let icons = self.icons();
        let mut out = format!("{} {}", self.paint(icons.cross, colors::ERROR), error);
        for cause in error.chain().skip(1) {
            let _ = write!(out, "\n  caused by: {}", cause);
        }
        out
    }
}

/// JSON renderer
pub struct JsonRenderer;

impl JsonRenderer {
    pub fn render_result(&self, result: &ExecutionResult) -> serde_json::Result<String> {
        serde_json::to_string_pretty(result)
    }

    pub fn render_plan(&self, project: &str, plan: &ConvergencePlan) -> serde_json::Result<String> {
        let services: Vec<serde_json::Value> = plan
            .entries()
            .iter()
            .map(|entry| {
                json!({
                    "service": entry.name(),
                    "action": entry.action,
                    "containers": entry.containers.iter().map(|c| c.short_id()).collect::<Vec<_>>(),
                })
            })
            .collect();
        serde_json::to_string_pretty(&json!({
            "project": project,
            "changed": plan.changed(),
            "services": services,
        }))
    }

    pub fn render_error(&self, error: &anyhow::Error) -> String {
        let code = error
            .downcast_ref::<ReconcileError>()
            .map(ReconcileError::code)
            .unwrap_or("error");
        json!({
            "error": code,
            "message": format!("{:#}", error),
        })
        .to_string()
    }
}
