//! JSON Event Sink
//!
//! Outputs reconcile events as NDJSON for CI/automation consumption.

use crate::domain::ports::{ReconcileEvent, ReconcileEventSink};
use std::io::{self, Write};
use std::sync::Mutex;

/// Event sink that writes one JSON object per line
pub struct JsonEventSink {
    /// Mutex to ensure thread-safe writes
    writer: Mutex<Box<dyn Write + Send>>,
}

impl JsonEventSink {
    /// Create a new JSON event sink writing to stderr
    ///
    /// Stdout is reserved for the final result.
    pub fn stderr() -> Self {
        Self {
            writer: Mutex::new(Box::new(io::stderr())),
        }
    }

    /// Create a JSON event sink writing to a custom writer
    pub fn with_writer<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            writer: Mutex::new(Box::new(writer)),
        }
    }

    fn write_event(&self, event: serde_json::Value) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", event);
            let _ = writer.flush();
        }
    }
}

impl ReconcileEventSink for JsonEventSink {
    fn on_event(&self, event: ReconcileEvent) {
        let json = match event {
            ReconcileEvent::Started {
                project,
                desired,
                dry_run,
            } => {
                serde_json::json!({
                    "event": "start",
                    "project": project,
                    "state": desired.as_str(),
                    "dry_run": dry_run,
                })
            }

            ReconcileEvent::ServicePlanned {
                service,
                action,
                containers,
            } => {
                serde_json::json!({
                    "event": "planned",
                    "service": service,
                    "action": action.as_str(),
                    "containers": containers,
                })
            }

            ReconcileEvent::ActionApplied { service, action } => {
                serde_json::json!({
                    "event": "applied",
                    "service": service,
                    "action": action,
                })
            }

            ReconcileEvent::ModifierApplied { modifier, changed } => {
                serde_json::json!({
                    "event": "modifier",
                    "modifier": modifier,
                    "changed": changed,
                })
            }

            ReconcileEvent::OrphansDetected { count } => {
                serde_json::json!({
                    "event": "orphans_detected",
                    "count": count,
                })
            }

            ReconcileEvent::Completed { changed, services } => {
                serde_json::json!({
                    "event": "complete",
                    "changed": changed,
                    "services": services,
                })
            }
        };

        self.write_event(json);
    }
}
