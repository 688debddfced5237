//! CLEF representation of a [`LogEntry`].
//!
//! Borrows the template from the original entry and holds the fields already
//! converted to JSON, so every fallible step happens before serialisation.

use std::borrow::Cow;

use chrono::{DateTime, FixedOffset, SecondsFormat};
use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};
use serde_json::Value;

use crate::log_entry::LogEntry;

pub(super) const TIMESTAMP_KEY: &str = "@t";
pub(super) const LEVEL_KEY: &str = "@l";
pub(super) const TEMPLATE_KEY: &str = "@mt";
/// Prefix given to user fields that collide with a reserved key.
pub(super) const CLASH_PREFIX: &str = "fields.";

const RESERVED_KEYS: [&str; 3] = [TIMESTAMP_KEY, LEVEL_KEY, TEMPLATE_KEY];

pub(super) struct ClefRecord<'a> {
    pub(super) timestamp: String,
    pub(super) level: &'static str,
    pub(super) template: &'a str,
    pub(super) fields: Vec<(Cow<'a, str>, Value)>,
}

impl<'a> ClefRecord<'a> {
    /// Convert `entry`, failing if any field value has no JSON form.
    pub(super) fn try_from_entry(entry: &'a LogEntry) -> serde_json::Result<Self> {
        let mut fields = Vec::with_capacity(entry.field_count());
        for (key, value) in entry.fields() {
            fields.push((field_key(key), value.to_json()?));
        }
        Ok(Self {
            timestamp: format_timestamp(entry.timestamp()),
            level: entry.level().as_str(),
            template: entry.message(),
            fields,
        })
    }
}

/// RFC 3339 with up to nine fractional digits, trailing zeros dropped and
/// `Z` for UTC, e.g. `2024-06-01T08:00:00.25Z` or `2024-06-01T08:00:00Z`.
pub(super) fn format_timestamp(timestamp: &DateTime<FixedOffset>) -> String {
    let text = timestamp.to_rfc3339_opts(SecondsFormat::Nanos, true);
    let Some(dot) = text.find('.') else {
        return text;
    };
    let (head, rest) = text.split_at(dot);
    let offset_at = rest.find(['Z', '+', '-']).unwrap_or(rest.len());
    let (fraction, offset) = rest.split_at(offset_at);
    let digits = fraction[1..].trim_end_matches('0');
    if digits.is_empty() {
        format!("{head}{offset}")
    } else {
        format!("{head}.{digits}{offset}")
    }
}

fn field_key(key: &str) -> Cow<'_, str> {
    if RESERVED_KEYS.contains(&key) {
        Cow::Owned(format!("{CLASH_PREFIX}{key}"))
    } else {
        Cow::Borrowed(key)
    }
}

impl Serialize for ClefRecord<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(3 + self.fields.len()))?;
        map.serialize_entry(TIMESTAMP_KEY, &self.timestamp)?;
        map.serialize_entry(LEVEL_KEY, self.level)?;
        map.serialize_entry(TEMPLATE_KEY, self.template)?;
        for (key, value) in &self.fields {
            map.serialize_entry(key.as_ref(), value)?;
        }
        map.end()
    }
}
