//! Record formatter for loggers built by this crate.
//!
//! `tracing` field names are fixed at compile time, so a logger hands its tag
//! chain to the formatter as one JSON-encoded field. The formatter expands it
//! back into one member per binding, in binding order. Duplicate keys are
//! written once per binding.

use std::fmt;

use chrono::Local;
use serde_json::Value;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

use crate::config::{ISO8601_FORMAT, LogFormat};

/// Field carrying the encoded tag chain.
pub(crate) const TAGS_FIELD: &str = "tags";
/// Field carrying the call site.
pub(crate) const CALLER_FIELD: &str = "caller";
/// Field carrying `fatal`/`panic` for records above `ERROR`.
pub(crate) const SEVERITY_FIELD: &str = "severity";

/// Encode a tag chain for [`TAGS_FIELD`].
pub(crate) fn encode_tags(tags: &[(&str, &Value)]) -> Option<String> {
    if tags.is_empty() {
        return None;
    }
    serde_json::to_string(tags).ok()
}

/// Formats facade records as JSON objects or single text lines.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RecordFormat {
    format: LogFormat,
}

impl RecordFormat {
    pub(crate) fn new(format: LogFormat) -> Self {
        Self { format }
    }
}

#[derive(Default)]
struct RecordVisitor {
    message: String,
    caller: Option<String>,
    severity: Option<String>,
    tags: Vec<(String, Value)>,
}

impl RecordVisitor {
    fn record_tags(&mut self, encoded: &str) {
        match serde_json::from_str::<Vec<(String, Value)>>(encoded) {
            Ok(tags) => self.tags = tags,
            Err(_) => self
                .tags
                .push((TAGS_FIELD.to_string(), Value::String(encoded.to_string()))),
        }
    }
}

impl Visit for RecordVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            TAGS_FIELD => self.record_tags(value),
            CALLER_FIELD => self.caller = Some(value.to_string()),
            SEVERITY_FIELD => self.severity = Some(value.to_string()),
            "message" => self.message = value.to_string(),
            _ => {}
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        }
    }
}

impl<S, N> FormatEvent<S, N> for RecordFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let mut visitor = RecordVisitor::default();
        event.record(&mut visitor);

        let meta = event.metadata();
        let timestamp = Local::now().format(ISO8601_FORMAT).to_string();

        let mut members: Vec<(&str, Value)> = vec![
            ("timestamp", Value::String(timestamp)),
            ("level", Value::String(meta.level().to_string())),
            ("target", Value::String(meta.target().to_string())),
        ];
        if let Some(caller) = visitor.caller {
            members.push((CALLER_FIELD, Value::String(caller)));
        }
        members.push(("message", Value::String(visitor.message)));
        if let Some(severity) = visitor.severity {
            members.push((SEVERITY_FIELD, Value::String(severity)));
        }
        for (key, value) in &visitor.tags {
            members.push((key.as_str(), value.clone()));
        }

        match self.format {
            LogFormat::Json => write_json(&mut writer, &members),
            LogFormat::Text => write_text(&mut writer, &members),
        }
    }
}

fn write_json(writer: &mut Writer<'_>, members: &[(&str, Value)]) -> fmt::Result {
    // Built by hand rather than through a map so duplicate keys survive
    writer.write_char('{')?;
    for (i, (key, value)) in members.iter().enumerate() {
        if i > 0 {
            writer.write_char(',')?;
        }
        write!(writer, "{}:{}", Value::from(*key), value)?;
    }
    writer.write_str("}\n")
}

fn write_text(writer: &mut Writer<'_>, members: &[(&str, Value)]) -> fmt::Result {
    let lookup = |name: &str| {
        members
            .iter()
            .find(|(key, _)| *key == name)
            .and_then(|(_, value)| value.as_str())
            .unwrap_or_default()
    };
    write!(
        writer,
        "{} {:>5} {}: {}",
        lookup("timestamp"),
        lookup("level"),
        lookup("target"),
        lookup("message")
    )?;
    for (key, value) in members.iter().skip(3) {
        if *key == "message" {
            continue;
        }
        write!(writer, " {key}={value}")?;
    }
    writer.write_char('\n')
}
