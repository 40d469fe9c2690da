//! Primitive coercers for loosely-shaped backend values.
//!
//! Every function here is total: malformed, missing, or oddly-typed input
//! falls back to a caller-supplied default (or `None`) instead of erroring.
//! The entity normalizers in `catalog`, `srs`, and `journal` are built on
//! these, which keeps all tolerance behavior in one auditable place.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde_json::Value;

/// Epoch values above this magnitude are interpreted as milliseconds.
const EPOCH_MILLIS_THRESHOLD: f64 = 1e12;

/// Coerce a JSON value to a finite number.
///
/// Numbers pass through when finite, numeric strings are parsed, booleans
/// map to 1/0. Anything else yields `fallback`.
pub fn to_number(value: &Value, fallback: f64) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()).unwrap_or(fallback),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .unwrap_or(fallback),
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        _ => fallback,
    }
}

/// Coerce a JSON value to a boolean.
///
/// Booleans pass through; strings match `true/1/yes` and `false/0/no`
/// case-insensitively; numbers are truthy when nonzero. Anything else
/// yields `fallback`.
pub fn to_boolean(value: &Value, fallback: bool) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" => true,
            "false" | "0" | "no" => false,
            _ => fallback,
        },
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(fallback),
        _ => fallback,
    }
}

/// Coerce a timestamp-ish value to an ISO-8601 string in UTC.
///
/// Accepts epoch seconds or milliseconds (disambiguated by magnitude:
/// anything above `1e12` is already milliseconds), RFC-3339 strings,
/// `YYYY-MM-DD HH:MM:SS`, and bare dates. Returns `None` for anything
/// unparseable — never panics.
pub fn to_iso_string(value: &Value) -> Option<String> {
    let parsed = match value {
        Value::Number(n) => n.as_f64().and_then(datetime_from_epoch),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                None
            } else if let Some(dt) = datetime_from_str(s) {
                Some(dt)
            } else {
                // Some backends send epochs as strings.
                s.parse::<f64>().ok().and_then(datetime_from_epoch)
            }
        }
        _ => None,
    };

    parsed.map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true))
}

fn datetime_from_epoch(epoch: f64) -> Option<DateTime<Utc>> {
    if !epoch.is_finite() {
        return None;
    }
    if epoch.abs() > EPOCH_MILLIS_THRESHOLD {
        Utc.timestamp_millis_opt(epoch as i64).single()
    } else {
        Utc.timestamp_opt(epoch as i64, 0).single()
    }
}

fn datetime_from_str(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.and_utc());
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return d.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    }
    None
}

/// Normalize a tag list into plain strings.
///
/// Accepts an array of strings, an array of `{label|name|title|tag}`
/// objects, or a comma-separated string. Blanks are filtered and input
/// order is preserved; duplicates are left alone (callers that need set
/// semantics dedupe on their side).
pub fn normalize_tags(value: &Value) -> Vec<String> {
    match value {
        Value::Array(entries) => entries
            .iter()
            .filter_map(|entry| match entry {
                Value::String(s) => non_blank(s),
                Value::Object(_) => ["label", "name", "title", "tag"]
                    .iter()
                    .find_map(|key| entry.get(key).and_then(Value::as_str).and_then(non_blank)),
                _ => None,
            })
            .collect(),
        Value::String(s) => s.split(',').filter_map(non_blank).collect(),
        _ => Vec::new(),
    }
}

/// Trimmed, non-empty copy of a string, or `None`.
pub fn non_blank(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_to_number_passthrough_and_fallback() {
        assert_eq!(to_number(&json!(42), 0.0), 42.0);
        assert_eq!(to_number(&json!(-3.5), 0.0), -3.5);
        assert_eq!(to_number(&json!("17"), 0.0), 17.0);
        assert_eq!(to_number(&json!(" 2.25 "), 0.0), 2.25);
        assert_eq!(to_number(&json!(true), 0.0), 1.0);
        assert_eq!(to_number(&json!(false), 9.0), 0.0);
        assert_eq!(to_number(&json!("not a number"), 7.0), 7.0);
        assert_eq!(to_number(&json!(null), 7.0), 7.0);
        assert_eq!(to_number(&json!({}), 7.0), 7.0);
        assert_eq!(to_number(&json!([1]), 7.0), 7.0);
    }

    #[test]
    fn test_to_boolean_strings() {
        assert!(to_boolean(&json!("true"), false));
        assert!(to_boolean(&json!("YES"), false));
        assert!(to_boolean(&json!("1"), false));
        assert!(!to_boolean(&json!("false"), true));
        assert!(!to_boolean(&json!("No"), true));
        assert!(!to_boolean(&json!("0"), true));
        // Unrecognized strings fall back
        assert!(to_boolean(&json!("maybe"), true));
        assert!(!to_boolean(&json!("maybe"), false));
    }

    #[test]
    fn test_to_boolean_numbers_and_passthrough() {
        assert!(to_boolean(&json!(true), false));
        assert!(!to_boolean(&json!(false), true));
        assert!(to_boolean(&json!(1), false));
        assert!(to_boolean(&json!(-2), false));
        assert!(!to_boolean(&json!(0), true));
        assert!(to_boolean(&json!(null), true));
        assert!(!to_boolean(&json!([]), false));
    }

    #[test]
    fn test_to_iso_string_epoch_seconds_vs_millis() {
        // 2023-11-14T22:13:20Z as seconds and as milliseconds
        assert_eq!(
            to_iso_string(&json!(1700000000)),
            Some("2023-11-14T22:13:20Z".to_string())
        );
        assert_eq!(
            to_iso_string(&json!(1_700_000_000_000i64)),
            Some("2023-11-14T22:13:20Z".to_string())
        );
        // Epoch sent as a string
        assert_eq!(
            to_iso_string(&json!("1700000000")),
            Some("2023-11-14T22:13:20Z".to_string())
        );
    }

    #[test]
    fn test_to_iso_string_formats() {
        assert_eq!(
            to_iso_string(&json!("2024-03-01T09:30:00Z")),
            Some("2024-03-01T09:30:00Z".to_string())
        );
        assert_eq!(
            to_iso_string(&json!("2024-03-01T09:30:00+02:00")),
            Some("2024-03-01T07:30:00Z".to_string())
        );
        assert_eq!(
            to_iso_string(&json!("2024-03-01 09:30:00")),
            Some("2024-03-01T09:30:00Z".to_string())
        );
        assert_eq!(
            to_iso_string(&json!("2024-03-01")),
            Some("2024-03-01T00:00:00Z".to_string())
        );
    }

    #[test]
    fn test_to_iso_string_invalid_is_none() {
        assert_eq!(to_iso_string(&json!("soon")), None);
        assert_eq!(to_iso_string(&json!("")), None);
        assert_eq!(to_iso_string(&json!(null)), None);
        assert_eq!(to_iso_string(&json!({"at": 1})), None);
        assert_eq!(to_iso_string(&json!(true)), None);
    }

    #[test]
    fn test_normalize_tags_string_array() {
        assert_eq!(
            normalize_tags(&json!(["rust", " async ", "", "rust"])),
            vec!["rust", "async", "rust"]
        );
    }

    #[test]
    fn test_normalize_tags_object_array() {
        let tags = normalize_tags(&json!([
            {"label": "grammar"},
            {"name": "vocab"},
            {"title": "kanji"},
            {"tag": "n5"},
            {"emoji": "x"}
        ]));
        assert_eq!(tags, vec!["grammar", "vocab", "kanji", "n5"]);
    }

    #[test]
    fn test_normalize_tags_comma_string() {
        assert_eq!(
            normalize_tags(&json!("a, b,,c ")),
            vec!["a", "b", "c"]
        );
        assert!(normalize_tags(&json!(42)).is_empty());
        assert!(normalize_tags(&json!(null)).is_empty());
    }
}
