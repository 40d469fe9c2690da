//! Envelope unwrapping: locating the real list inside an API payload.
//!
//! List endpoints disagree on where the list lives — bare array, `items`,
//! `results`, `data`, a key named after the entity, or nested pagination.
//! The probe order below is part of the observable contract: when a payload
//! ambiguously carries two candidate arrays, the earlier probe wins.
//! Reordering it changes which field wins, so don't.

use serde_json::Value;

/// Conventional list keys probed before any entity-named key.
const LIST_KEYS_HEAD: [&str; 3] = ["items", "results", "data"];

/// Conventional list keys probed after the entity-named keys.
const LIST_KEYS_TAIL: [&str; 3] = ["list", "entries", "records"];

/// Find the wrapped list inside `payload`.
///
/// Probe order: bare array → `pagination.items` → `items` → `results` →
/// `data` → the caller's entity-named keys → `list` → `entries` →
/// `records` → `values` → empty.
pub fn unwrap_collection<'a>(payload: &'a Value, named: &[&str]) -> &'a [Value] {
    if let Some(list) = payload.as_array() {
        return list;
    }

    if let Some(list) = payload
        .get("pagination")
        .and_then(|p| p.get("items"))
        .and_then(Value::as_array)
    {
        return list;
    }

    if let Some(list) = first_array(payload, &LIST_KEYS_HEAD) {
        return list;
    }
    if let Some(list) = first_array(payload, named) {
        return list;
    }
    if let Some(list) = first_array(payload, &LIST_KEYS_TAIL) {
        return list;
    }
    if let Some(list) = payload.get("values").and_then(Value::as_array) {
        return list;
    }

    &[]
}

/// The `toArray` convenience: like [`unwrap_collection`] minus the
/// pagination and `values` probes. Arrays pass through; objects are probed
/// at the conventional keys; anything else is empty.
pub fn to_array<'a>(payload: &'a Value, named: &[&str]) -> &'a [Value] {
    if let Some(list) = payload.as_array() {
        return list;
    }
    if let Some(list) = first_array(payload, &LIST_KEYS_HEAD) {
        return list;
    }
    if let Some(list) = first_array(payload, named) {
        return list;
    }
    if let Some(list) = first_array(payload, &LIST_KEYS_TAIL) {
        return list;
    }
    &[]
}

/// First key whose value is an array. Present-but-not-array values are
/// skipped so later probes still run.
fn first_array<'a>(payload: &'a Value, keys: &[&str]) -> Option<&'a Vec<Value>> {
    keys.iter()
        .find_map(|key| payload.get(key).and_then(Value::as_array))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bare_array_passes_through() {
        let payload = json!([1, 2, 3]);
        assert_eq!(unwrap_collection(&payload, &[]).len(), 3);
    }

    #[test]
    fn test_pagination_items_beats_conventional_keys() {
        let payload = json!({
            "pagination": {"items": [1]},
            "items": [2, 2]
        });
        assert_eq!(unwrap_collection(&payload, &[]), &[json!(1)]);
    }

    #[test]
    fn test_probe_priority_items_results_data() {
        let both = json!({"results": ["r"], "data": ["d"]});
        assert_eq!(unwrap_collection(&both, &[]), &[json!("r")]);

        let all = json!({"items": ["i"], "results": ["r"], "data": ["d"]});
        assert_eq!(unwrap_collection(&all, &[]), &[json!("i")]);

        let data_only = json!({"data": ["d"]});
        assert_eq!(unwrap_collection(&data_only, &[]), &[json!("d")]);
    }

    #[test]
    fn test_named_key_sits_between_data_and_list() {
        let payload = json!({"capsules": ["c"], "list": ["l"]});
        assert_eq!(unwrap_collection(&payload, &["capsules"]), &[json!("c")]);
        assert_eq!(unwrap_collection(&payload, &[]), &[json!("l")]);

        let with_data = json!({"data": ["d"], "capsules": ["c"]});
        assert_eq!(unwrap_collection(&with_data, &["capsules"]), &[json!("d")]);
    }

    #[test]
    fn test_to_array_probe_order() {
        let payload = json!(["a", "b"]);
        assert_eq!(to_array(&payload, &[]).len(), 2);

        let both = json!({"items": ["i"], "results": ["r"]});
        assert_eq!(to_array(&both, &[]), &[json!("i")]);

        let named = json!({"atoms": ["a"], "list": ["l"]});
        assert_eq!(to_array(&named, &["atoms"]), &[json!("a")]);
        assert_eq!(to_array(&named, &[]), &[json!("l")]);

        assert!(to_array(&json!("plain"), &[]).is_empty());
    }

    #[test]
    fn test_tail_keys_and_values() {
        assert_eq!(unwrap_collection(&json!({"entries": ["e"]}), &[]), &[json!("e")]);
        assert_eq!(unwrap_collection(&json!({"records": ["x"]}), &[]), &[json!("x")]);
        assert_eq!(unwrap_collection(&json!({"values": ["v"]}), &[]), &[json!("v")]);
        // `values` is an unwrap-only probe
        assert!(to_array(&json!({"values": ["v"]}), &[]).is_empty());
    }

    #[test]
    fn test_non_array_candidates_are_skipped() {
        let payload = json!({"items": "not a list", "results": ["r"]});
        assert_eq!(unwrap_collection(&payload, &[]), &[json!("r")]);
    }

    #[test]
    fn test_nothing_found_is_empty() {
        assert!(unwrap_collection(&json!({}), &[]).is_empty());
        assert!(unwrap_collection(&json!(null), &[]).is_empty());
        assert!(unwrap_collection(&json!("plain"), &[]).is_empty());
        assert!(unwrap_collection(&json!(42), &["atoms"]).is_empty());
    }
}
