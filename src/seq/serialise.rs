//! Serialisation of log entries into CLEF request bodies.

use super::record::ClefRecord;
use crate::log_entry::LogEntry;

/// Serialise `entry` as a single newline-terminated CLEF event.
///
/// # Errors
///
/// Returns an error if a field value cannot be represented as JSON.
pub fn serialise_clef(entry: &LogEntry) -> serde_json::Result<Vec<u8>> {
    let record = ClefRecord::try_from_entry(entry)?;
    let mut body = serde_json::to_vec(&record)?;
    body.push(b'\n');
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::FemtoLevel;
    use chrono::{FixedOffset, TimeZone, Utc};
    use rstest::{fixture, rstest};
    use serde_json::{Value, json};
    use std::collections::BTreeMap;

    #[fixture]
    fn test_entry() -> LogEntry {
        let ts = Utc
            .with_ymd_and_hms(2024, 3, 9, 16, 30, 5)
            .unwrap()
            .checked_add_signed(chrono::Duration::nanoseconds(123_456_789))
            .unwrap();
        LogEntry::new(FemtoLevel::Warn, "Disk {Mount} is {Percent}% full")
            .with_timestamp(ts)
            .with_field("Mount", "/var")
            .with_field("Percent", 93)
            .with_field("Tags", vec!["ops", "storage"])
    }

    fn parse(body: &[u8]) -> Value {
        serde_json::from_slice(body).expect("valid json")
    }

    #[rstest]
    fn maps_reserved_properties(test_entry: LogEntry) {
        let body = serialise_clef(&test_entry).expect("serialise");
        let parsed = parse(&body);
        assert_eq!(parsed["@mt"], "Disk {Mount} is {Percent}% full");
        assert_eq!(parsed["@l"], "warning");
        assert_eq!(parsed["@t"], "2024-03-09T16:30:05.123456789Z");
    }

    #[rstest]
    fn emits_fields_under_original_names(test_entry: LogEntry) {
        let parsed = parse(&serialise_clef(&test_entry).expect("serialise"));
        assert_eq!(parsed["Mount"], "/var");
        assert_eq!(parsed["Percent"], 93);
        assert_eq!(parsed["Tags"], json!(["ops", "storage"]));
        assert_eq!(parsed.as_object().expect("object").len(), 6);
    }

    #[rstest]
    fn body_is_single_newline_terminated_line(test_entry: LogEntry) {
        let body = serialise_clef(&test_entry).expect("serialise");
        assert_eq!(body.last(), Some(&b'\n'));
        assert_eq!(body.iter().filter(|b| **b == b'\n').count(), 1);
    }

    #[test]
    fn keeps_non_utc_offset() {
        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let ts = offset.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let entry = LogEntry::new(FemtoLevel::Info, "x").with_timestamp(ts);
        let parsed = parse(&serialise_clef(&entry).expect("serialise"));
        assert_eq!(parsed["@t"], "2024-01-02T03:04:05+02:00");
    }

    #[rstest]
    #[case("@t")]
    #[case("@l")]
    #[case("@mt")]
    fn prefixes_fields_that_clash_with_reserved_keys(#[case] key: &str) {
        let entry = LogEntry::new(FemtoLevel::Error, "template").with_field(key, "user value");
        let parsed = parse(&serialise_clef(&entry).expect("serialise"));
        assert_eq!(parsed[format!("fields.{key}")], "user value");
        assert_ne!(parsed[key], "user value");
    }

    #[test]
    fn unrepresentable_field_fails() {
        let mut bad = BTreeMap::new();
        bad.insert(vec![1u8, 2], "tuple keys have no JSON form");
        let entry = LogEntry::new(FemtoLevel::Info, "x").with_field("bad", bad);
        assert!(serialise_clef(&entry).is_err());
    }

    #[rstest]
    #[case::nan(f64::NAN)]
    #[case::infinity(f64::INFINITY)]
    #[case::negative_infinity(f64::NEG_INFINITY)]
    fn non_finite_float_field_fails(#[case] value: f64) {
        let entry = LogEntry::new(FemtoLevel::Info, "ratio {Ratio}").with_field("Ratio", value);
        assert!(serialise_clef(&entry).is_err());
    }

    #[test]
    fn non_finite_float_nested_in_field_fails() {
        let entry = LogEntry::new(FemtoLevel::Info, "x")
            .with_field("Samples", vec![f64::NEG_INFINITY])
            .with_field("Limit", Some(f32::NAN));
        assert!(serialise_clef(&entry).is_err());
    }

    #[test]
    fn finite_float_fields_serialise() {
        let entry = LogEntry::new(FemtoLevel::Info, "x").with_field("Ratio", 0.75);
        let parsed = parse(&serialise_clef(&entry).expect("serialise"));
        assert_eq!(parsed["Ratio"], 0.75);
    }
}
