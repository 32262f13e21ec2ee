//! Render `tracing` events into concise logfmt strings.
//!
//! Extracts level, target, and message from a `tracing::Event` and renders the
//! remaining fields in `key=value` form.

use std::fmt::{Debug, Write};

use tracing::{
    Event, Metadata,
    field::{Field, Visit},
};

/// Rendered fields extracted from a tracing Event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedLog {
    /// Severity level (e.g., INFO, WARN) for the event.
    pub level: String,
    /// Event target (typically the module path).
    pub target: String,
    /// Message followed by any `key=value` fields.
    pub message: String,
}

/// Collects the `message` field and the remaining fields of an event.
#[derive(Default)]
struct MsgVisitor {
    /// Captured `message` field, if present.
    msg: Option<String>,
    /// Accumulated non-message fields rendered as `key=value`.
    fields: String,
}

impl Visit for MsgVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.msg = Some(value.to_string());
        } else {
            let _ignored = write!(&mut self.fields, "{}=\"{}\" ", field.name(), value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn Debug) {
        if field.name() == "message" {
            self.msg = Some(format!("{:?}", value));
        } else {
            let _ignored = write!(&mut self.fields, "{}={:?} ", field.name(), value);
        }
    }
}

/// Extract a concise triple (level, target, message) from a tracing Event.
///
/// The message is the `message` field followed by the other fields as
/// `key=value` pairs. Events without a message render their fields only.
pub fn render_event(event: &Event<'_>) -> RenderedLog {
    let meta: &Metadata<'_> = event.metadata();
    let mut vis = MsgVisitor::default();
    event.record(&mut vis);
    let fields = vis.fields.trim_end();
    let message = match vis.msg {
        Some(msg) if fields.is_empty() => msg,
        Some(msg) => format!("{} {}", msg, fields),
        None => fields.to_string(),
    };
    RenderedLog {
        level: meta.level().to_string(),
        target: meta.target().to_string(),
        message,
    }
}
