//! Ordered candidate-key resolution over raw payload objects.
//!
//! Backend payloads name the same field differently across API versions
//! (`id` vs `capsule_id` vs `uuid`, nested inside `metadata`, and so on).
//! Instead of ad hoc fallback chains at every call site, each canonical
//! field is resolved by probing an explicit ordered key list — first on the
//! object itself, then on its `metadata`/`meta` bags — so the tolerance
//! order is visible and testable in one place.

use serde_json::Value;

use super::coerce::{non_blank, to_boolean, to_number};

/// Nested bags probed after all top-level keys miss.
const META_BAGS: [&str; 2] = ["metadata", "meta"];

/// All non-null candidate values for `keys`, in resolution order: every
/// top-level key first, then the same keys inside each meta bag.
fn candidates<'a>(source: &'a Value, keys: &[&str]) -> Vec<&'a Value> {
    let Some(obj) = source.as_object() else {
        return Vec::new();
    };

    let mut found = Vec::new();
    for key in keys {
        if let Some(v) = obj.get(*key) {
            if !v.is_null() {
                found.push(v);
            }
        }
    }
    for bag in META_BAGS {
        if let Some(nested) = obj.get(bag).and_then(Value::as_object) {
            for key in keys {
                if let Some(v) = nested.get(*key) {
                    if !v.is_null() {
                        found.push(v);
                    }
                }
            }
        }
    }
    found
}

/// Resolve the first present, non-null value among `keys`.
pub fn pick<'a>(source: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    candidates(source, keys).into_iter().next()
}

/// First non-empty trimmed string among `keys`.
pub fn pick_string(source: &Value, keys: &[&str]) -> Option<String> {
    candidates(source, keys)
        .into_iter()
        .find_map(|v| v.as_str().and_then(non_blank))
}

/// All non-empty trimmed string candidates among `keys`, in resolution
/// order. For enum-valued fields where an unrecognized candidate should
/// not halt the probe.
pub fn pick_strings(source: &Value, keys: &[&str]) -> Vec<String> {
    candidates(source, keys)
        .into_iter()
        .filter_map(|v| v.as_str().and_then(non_blank))
        .collect()
}

/// First usable identifier among `keys`.
///
/// Ids arrive as strings or bare numbers depending on the backend version;
/// numeric ids are rendered to their decimal string form.
pub fn pick_id(source: &Value, keys: &[&str]) -> Option<String> {
    candidates(source, keys).into_iter().find_map(|v| match v {
        Value::String(s) => non_blank(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// First finite number among `keys`.
///
/// A present but unparseable candidate does not halt the probe; later keys
/// still get a chance.
pub fn pick_number(source: &Value, keys: &[&str]) -> Option<f64> {
    candidates(source, keys).into_iter().find_map(|v| {
        let n = to_number(v, f64::NAN);
        n.is_finite().then_some(n)
    })
}

/// First strictly positive number among `keys`.
///
/// Used where zero means "unset" (the capsule XP target rule).
pub fn pick_positive(source: &Value, keys: &[&str]) -> Option<f64> {
    candidates(source, keys).into_iter().find_map(|v| {
        let n = to_number(v, f64::NAN);
        (n.is_finite() && n > 0.0).then_some(n)
    })
}

/// First recognizable boolean among `keys`.
pub fn pick_bool(source: &Value, keys: &[&str]) -> Option<bool> {
    candidates(source, keys).into_iter().find_map(|v| match v {
        Value::Bool(b) => Some(*b),
        Value::String(_) | Value::Number(_) => {
            // Probe with both fallbacks; they agree only when the value was
            // actually recognized.
            let as_true = to_boolean(v, true);
            let as_false = to_boolean(v, false);
            (as_true == as_false).then_some(as_true)
        }
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pick_prefers_earlier_keys() {
        let payload = json!({"capsule_id": "c-2", "id": "c-1"});
        assert_eq!(pick_string(&payload, &["id", "capsule_id"]), Some("c-1".into()));
        assert_eq!(pick_string(&payload, &["capsule_id", "id"]), Some("c-2".into()));
    }

    #[test]
    fn test_pick_skips_null_and_blank() {
        let payload = json!({"id": null, "uuid": "  ", "slug": "intro-rust"});
        assert_eq!(
            pick_string(&payload, &["id", "uuid", "slug"]),
            Some("intro-rust".into())
        );
    }

    #[test]
    fn test_pick_falls_back_to_meta_bags() {
        let payload = json!({"metadata": {"xp_target": 4000}, "meta": {"title": "Hiragana"}});
        assert_eq!(pick_number(&payload, &["xp_target"]), Some(4000.0));
        assert_eq!(pick_string(&payload, &["title"]), Some("Hiragana".into()));
    }

    #[test]
    fn test_all_top_level_keys_beat_meta_bags() {
        // A later top-level candidate outranks an earlier key nested in
        // metadata.
        let payload = json!({"target_xp": 3000, "metadata": {"xp_target": 9000}});
        assert_eq!(pick_number(&payload, &["xp_target", "target_xp"]), Some(3000.0));
    }

    #[test]
    fn test_pick_strings_collects_in_resolution_order() {
        let payload = json!({
            "status": "published",
            "user_status": "completed",
            "metadata": { "status": "failed" },
        });
        assert_eq!(
            pick_strings(&payload, &["user_status", "status"]),
            vec!["completed", "published", "failed"]
        );
        assert!(pick_strings(&json!(null), &["status"]).is_empty());
    }

    #[test]
    fn test_pick_id_accepts_numbers() {
        assert_eq!(pick_id(&json!({"id": 91}), &["id"]), Some("91".into()));
        assert_eq!(pick_id(&json!({"id": "a-7"}), &["id"]), Some("a-7".into()));
        assert_eq!(pick_id(&json!({"id": true}), &["id"]), None);
        assert_eq!(pick_id(&json!(null), &["id"]), None);
    }

    #[test]
    fn test_pick_positive_skips_zero() {
        let payload = json!({"xp_target": 0, "goal_xp": 6500});
        assert_eq!(pick_positive(&payload, &["xp_target", "goal_xp"]), Some(6500.0));
        assert_eq!(pick_positive(&json!({"xp_target": 0}), &["xp_target"]), None);
    }

    #[test]
    fn test_pick_number_skips_unparseable() {
        let payload = json!({"order": "third", "position": "3"});
        assert_eq!(pick_number(&payload, &["order", "position"]), Some(3.0));
    }

    #[test]
    fn test_pick_bool_recognizes_strings_and_numbers() {
        assert_eq!(pick_bool(&json!({"locked": "yes"}), &["locked"]), Some(true));
        assert_eq!(pick_bool(&json!({"locked": 0}), &["locked"]), Some(false));
        assert_eq!(pick_bool(&json!({"locked": "maybe"}), &["locked"]), None);
        assert_eq!(pick_bool(&json!({"locked": true}), &["locked"]), Some(true));
    }

    #[test]
    fn test_non_object_sources_resolve_nothing() {
        assert!(pick(&json!([1, 2]), &["id"]).is_none());
        assert!(pick_string(&json!("plain"), &["id"]).is_none());
        assert!(pick_number(&json!(null), &["order"]).is_none());
    }
}
