//! Log entry representation consumed by the forwarder.
//!
//! A [`LogEntry`] carries a message template, a severity, a timezone-aware
//! timestamp and an ordered set of structured fields. Field values are kept
//! in their original Rust form and only converted to JSON when an event is
//! serialised, so a value that cannot be represented is reported at delivery
//! time rather than when the entry is built.

use std::collections::BTreeMap;
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Local, TimeZone};
use serde::Serialize;
use serde_json::Value;

use crate::json_value::to_json_value;
use crate::level::FemtoLevel;

/// Key used by [`LogEntry::with_error`].
pub const ERROR_KEY: &str = "error";

/// A structured field value that can be rendered as JSON on demand.
///
/// Implemented for every `Serialize + Debug + Send + Sync` type.
pub trait FieldValue: fmt::Debug + Send + Sync {
    /// Convert the value into a JSON tree.
    ///
    /// Fails for values JSON cannot hold, such as maps with non-string keys
    /// or NaN and infinite floats.
    fn to_json(&self) -> serde_json::Result<Value>;
}

impl<T> FieldValue for T
where
    T: Serialize + fmt::Debug + Send + Sync,
{
    fn to_json(&self) -> serde_json::Result<Value> {
        to_json_value(self)
    }
}

#[derive(Clone, Debug)]
pub struct LogEntry {
    level: FemtoLevel,
    message: String,
    timestamp: DateTime<FixedOffset>,
    fields: BTreeMap<String, Arc<dyn FieldValue>>,
}

impl LogEntry {
    /// Construct an entry stamped with the current local time.
    pub fn new(level: FemtoLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            timestamp: Local::now().fixed_offset(),
            fields: BTreeMap::new(),
        }
    }

    /// Replace the timestamp, keeping the offset of `timestamp`.
    pub fn with_timestamp<Tz: TimeZone>(mut self, timestamp: DateTime<Tz>) -> Self {
        self.timestamp = timestamp.fixed_offset();
        self
    }

    /// Attach a structured field, replacing any previous value for `key`.
    pub fn with_field(mut self, key: impl Into<String>, value: impl FieldValue + 'static) -> Self {
        self.insert_field(key, value);
        self
    }

    /// Attach the display text of `err` under the `error` key.
    pub fn with_error(self, err: &(dyn StdError + 'static)) -> Self {
        self.with_field(ERROR_KEY, err.to_string())
    }

    pub fn insert_field(&mut self, key: impl Into<String>, value: impl FieldValue + 'static) {
        self.fields.insert(key.into(), Arc::new(value));
    }

    pub fn level(&self) -> FemtoLevel {
        self.level
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn timestamp(&self) -> &DateTime<FixedOffset> {
        &self.timestamp
    }

    /// Iterate over the structured fields in key order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &dyn FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_ref()))
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.level, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::io;

    #[test]
    fn later_fields_replace_earlier_ones() {
        let entry = LogEntry::new(FemtoLevel::Info, "hi")
            .with_field("user", "alice")
            .with_field("user", "bob");
        assert_eq!(entry.field_count(), 1);
        let (_, value) = entry.fields().next().expect("field");
        assert_eq!(value.to_json().expect("json"), Value::from("bob"));
    }

    #[test]
    fn with_error_records_display_text() {
        let err = io::Error::other("disk on fire");
        let entry = LogEntry::new(FemtoLevel::Error, "write failed").with_error(&err);
        let (key, value) = entry.fields().next().expect("field");
        assert_eq!(key, ERROR_KEY);
        assert_eq!(value.to_json().expect("json"), Value::from("disk on fire"));
    }

    #[test]
    fn timestamp_keeps_supplied_instant() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let entry = LogEntry::new(FemtoLevel::Debug, "x").with_timestamp(ts);
        assert_eq!(entry.timestamp().timestamp(), ts.timestamp());
        assert_eq!(entry.timestamp().offset().local_minus_utc(), 0);
    }

    #[test]
    fn non_finite_field_has_no_json_form() {
        let entry = LogEntry::new(FemtoLevel::Info, "x").with_field("ratio", f64::NAN);
        let (_, value) = entry.fields().next().expect("field");
        assert!(value.to_json().is_err());
    }

    #[test]
    fn display_shows_level_and_message() {
        let entry = LogEntry::new(FemtoLevel::Warn, "careful");
        assert_eq!(entry.to_string(), "warning - careful");
    }
}
