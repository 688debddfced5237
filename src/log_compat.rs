//! Compatibility bridge for the Rust `log` crate.
//!
//! This module provides [`SeqLogAdapter`], an implementation of `log::Log`
//! that converts each record into a [`LogEntry`] and hands it to a
//! [`FemtoHook`] on the calling thread. `log::Log::log` cannot return an
//! error, so failed deliveries are counted and reported on stderr at a
//! limited rate instead of being logged through `log` again.

use log::kv::{self, Key, Value as KvValue, VisitSource};
use log::{LevelFilter, Metadata, Record, SetLoggerError};
use serde_json::Value;

use crate::hook::{FemtoHook, guard_reentry};
use crate::level::FemtoLevel;
use crate::log_entry::LogEntry;
use crate::rate_limited_warner::RateLimitedWarner;
use crate::seq::{DeliveryError, FemtoSeqForwarder};

/// Field name carrying the record target.
pub const TARGET_KEY: &str = "target";

/// Adapter implementing the Rust `log::Log` trait on top of a hook.
pub struct SeqLogAdapter<H = FemtoSeqForwarder> {
    hook: H,
    warner: RateLimitedWarner,
}

fn map_log_level(level: log::Level) -> FemtoLevel {
    match level {
        log::Level::Trace => FemtoLevel::Trace,
        log::Level::Debug => FemtoLevel::Debug,
        log::Level::Info => FemtoLevel::Info,
        log::Level::Warn => FemtoLevel::Warn,
        log::Level::Error => FemtoLevel::Error,
    }
}

fn map_femto_to_level_filter(level: FemtoLevel) -> LevelFilter {
    match level {
        FemtoLevel::Trace => LevelFilter::Trace,
        FemtoLevel::Debug => LevelFilter::Debug,
        FemtoLevel::Info => LevelFilter::Info,
        FemtoLevel::Warn => LevelFilter::Warn,
        FemtoLevel::Error | FemtoLevel::Fatal | FemtoLevel::Panic => LevelFilter::Error,
    }
}

impl From<log::Level> for FemtoLevel {
    fn from(level: log::Level) -> Self {
        map_log_level(level)
    }
}

struct FieldCollector<'a> {
    entry: &'a mut LogEntry,
}

impl<'kvs> VisitSource<'kvs> for FieldCollector<'_> {
    fn visit_pair(&mut self, key: Key<'kvs>, value: KvValue<'kvs>) -> Result<(), kv::Error> {
        self.entry.insert_field(key.as_str(), kv_to_json(&value));
        Ok(())
    }
}

fn kv_to_json(value: &KvValue<'_>) -> Value {
    if let Some(b) = value.to_bool() {
        return Value::Bool(b);
    }
    if let Some(n) = value.to_i64() {
        return Value::from(n);
    }
    if let Some(n) = value.to_u64() {
        return Value::from(n);
    }
    if let Some(n) = value.to_f64() {
        return Value::from(n);
    }
    Value::String(value.to_string())
}

impl<H: FemtoHook> SeqLogAdapter<H> {
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

    /// Most verbose `log` filter that still reaches an accepted level.
    pub fn max_level_filter(&self) -> LevelFilter {
        self.hook
            .accepted_levels()
            .iter()
            .map(|level| map_femto_to_level_filter(*level))
            .max()
            .unwrap_or(LevelFilter::Off)
    }

    /// Number of failed deliveries not yet reported on stderr.
    pub fn pending_failures(&self) -> u64 {
        self.warner.pending()
    }

    fn entry_from_record(record: &Record<'_>) -> LogEntry {
        let mut entry = LogEntry::new(record.level().into(), record.args().to_string());
        if !record.target().is_empty() {
            entry.insert_field(TARGET_KEY, record.target().to_owned());
        }
        let mut collector = FieldCollector { entry: &mut entry };
        // The collector never fails; an error here could only come from the source.
        let _ = record.key_values().visit(&mut collector);
        entry
    }

    fn report_failure(&self, err: &DeliveryError) {
        self.warner.record_drop();
        self.warner.warn_if_due(|count| {
            eprintln!("femtoseq: failed to deliver {count} log records; last error: {err}");
        });
    }
}

impl<H: FemtoHook> log::Log for SeqLogAdapter<H> {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        self.hook.is_enabled_for(metadata.level().into())
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let entry = Self::entry_from_record(record);
        if let Some(Err(err)) = guard_reentry(|| self.hook.deliver(&entry)) {
            self.report_failure(&err);
        }
    }

    fn flush(&self) {
        self.warner.flush(|count| {
            eprintln!("femtoseq: failed to deliver {count} log records");
        });
    }
}

/// Install `adapter` as the global `log` logger.
///
/// The global max level is lowered to the most verbose accepted level so the
/// `log` macros skip records the hook would discard anyway.
///
/// # Errors
///
/// Returns [`SetLoggerError`] when a global logger is already installed.
pub fn install_log_adapter<H>(adapter: SeqLogAdapter<H>) -> Result<(), SetLoggerError>
where
    H: FemtoHook + 'static,
{
    let max = adapter.max_level_filter();
    log::set_boxed_logger(Box::new(adapter))?;
    log::set_max_level(max);
    Ok(())
}
