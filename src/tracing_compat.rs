//! Compatibility bridge for `tracing`.
//!
//! [`SeqLayer`] is a `tracing_subscriber` layer that turns each event into a
//! [`LogEntry`] and delivers it through a [`FemtoHook`]. The `message` field
//! becomes the template, every other field is kept under its own name and
//! the event target is attached as `target`.

use std::error::Error as StdError;
use std::fmt;

use serde_json::Value;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;

use crate::hook::{FemtoHook, guard_reentry};
use crate::level::FemtoLevel;
use crate::log_entry::LogEntry;
use crate::rate_limited_warner::RateLimitedWarner;
use crate::seq::FemtoSeqForwarder;

const MESSAGE_FIELD: &str = "message";
const TARGET_KEY: &str = "target";

pub struct SeqLayer<H = FemtoSeqForwarder> {
    hook: H,
    warner: RateLimitedWarner,
}

fn map_tracing_level(level: &Level) -> FemtoLevel {
    match *level {
        Level::TRACE => FemtoLevel::Trace,
        Level::DEBUG => FemtoLevel::Debug,
        Level::INFO => FemtoLevel::Info,
        Level::WARN => FemtoLevel::Warn,
        _ => FemtoLevel::Error,
    }
}

#[derive(Default)]
struct EntryVisitor {
    message: Option<String>,
    fields: Vec<(&'static str, Value)>,
}

impl EntryVisitor {
    fn record_value(&mut self, field: &Field, value: Value) {
        if field.name() == MESSAGE_FIELD {
            self.message = Some(match value {
                Value::String(s) => s,
                other => other.to_string(),
            });
        } else {
            self.fields.push((field.name(), value));
        }
    }
}

impl Visit for EntryVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.record_value(field, Value::String(format!("{value:?}")));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.record_value(field, Value::from(value));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.record_value(field, Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.record_value(field, Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.record_value(field, Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.record_value(field, Value::from(value));
    }

    fn record_error(&mut self, field: &Field, value: &(dyn StdError + 'static)) {
        self.record_value(field, Value::String(value.to_string()));
    }
}

impl<H: FemtoHook> SeqLayer<H> {
    pub fn new(hook: H) -> Self {
        Self {
            hook,
            warner: RateLimitedWarner::default(),
        }
    }

    pub fn with_warner(hook: H, warner: RateLimitedWarner) -> Self {
        Self { hook, warner }
    }

    pub fn hook(&self) -> &H {
        &self.hook
    }

    /// Number of failed deliveries not yet reported on stderr.
    pub fn pending_failures(&self) -> u64 {
        self.warner.pending()
    }

    fn entry_from_event(level: FemtoLevel, event: &Event<'_>) -> LogEntry {
        let mut visitor = EntryVisitor::default();
        event.record(&mut visitor);
        let metadata = event.metadata();
        let message = visitor
            .message
            .unwrap_or_else(|| metadata.name().to_owned());
        let mut entry = LogEntry::new(level, message);
        entry.insert_field(TARGET_KEY, metadata.target().to_owned());
        for (key, value) in visitor.fields {
            entry.insert_field(key, value);
        }
        entry
    }
}

impl<S, H> Layer<S> for SeqLayer<H>
where
    S: Subscriber,
    H: FemtoHook + 'static,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let level = map_tracing_level(event.metadata().level());
        if !self.hook.is_enabled_for(level) {
            return;
        }
        let entry = Self::entry_from_event(level, event);
        if let Some(Err(err)) = guard_reentry(|| self.hook.deliver(&entry)) {
            self.warner.record_drop();
            self.warner.warn_if_due(|count| {
                eprintln!("femtoseq: failed to deliver {count} tracing events; last error: {err}");
            });
        }
    }
}
