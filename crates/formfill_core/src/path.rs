//! Dotted-path access into nested JSON mappings.
//!
//! # Responsibility
//! - Resolve `a.b.c` style paths against a member mapping.
//! - Assign values at a path, creating intermediate mappings on demand.
//!
//! # Invariants
//! - Reads never fail: a missing segment yields `None`, which is distinct
//!   from a stored `Value::Null`.
//! - Writes never fail: a non-mapping value found at an intermediate segment
//!   is replaced by a fresh empty mapping (destructive overwrite).

use serde_json::{Map, Value};

/// Separator between path segments.
pub const PATH_SEPARATOR: char = '.';

/// Returns the value stored at `path`, or `None` when any segment is missing.
pub fn get_path<'a>(root: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let mut segments = path.split(PATH_SEPARATOR);
    let first = segments.next()?;
    let mut current = root.get(first)?;

    for segment in segments {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) | Value::Array(_) => {
                return None;
            }
        };
    }

    Some(current)
}

/// Stores `value` at `path`, creating or replacing intermediate mappings.
///
/// Returns the previous value at the final segment, if there was one.
pub fn set_path(root: &mut Map<String, Value>, path: &str, value: Value) -> Option<Value> {
    let segments: Vec<&str> = path.split(PATH_SEPARATOR).collect();
    set_segments(root, &segments, value)
}

fn set_segments(map: &mut Map<String, Value>, segments: &[&str], value: Value) -> Option<Value> {
    match segments {
        [] => None,
        [leaf] => map.insert((*leaf).to_string(), value),
        [head, rest @ ..] => {
            // Entry keeps the key's position; the slot is refilled below.
            let slot = map.entry((*head).to_string()).or_insert(Value::Null);
            let mut child = match std::mem::take(slot) {
                Value::Object(inner) => inner,
                Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) | Value::Array(_) => {
                    Map::new()
                }
            };
            let previous = set_segments(&mut child, rest, value);
            *slot = Value::Object(child);
            previous
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{get_path, set_path};
    use serde_json::{json, Map, Value};

    fn member(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("fixture must be an object, got {other}"),
        }
    }

    #[test]
    fn get_path_distinguishes_absent_from_null() {
        let root = member(json!({ "health": { "allergies": null } }));
        assert_eq!(get_path(&root, "health.allergies"), Some(&Value::Null));
        assert_eq!(get_path(&root, "health.blood_type"), None);
        assert_eq!(get_path(&root, "missing.deeper"), None);
    }

    #[test]
    fn get_path_stops_at_scalar_intermediates() {
        let root = member(json!({ "first_name": "Jan", "tags": ["a"] }));
        assert_eq!(get_path(&root, "first_name.length"), None);
        assert_eq!(get_path(&root, "tags.0"), None);
    }

    #[test]
    fn set_path_creates_missing_intermediates() {
        let mut root = Map::new();
        set_path(&mut root, "permanent_address.city", json!("Brno"));
        assert_eq!(
            Value::Object(root),
            json!({ "permanent_address": { "city": "Brno" } })
        );
    }

    #[test]
    fn set_path_returns_previous_leaf_value() {
        let mut root = member(json!({ "first_name": null }));
        let previous = set_path(&mut root, "first_name", json!("Jan"));
        assert_eq!(previous, Some(Value::Null));
        assert_eq!(set_path(&mut root, "last_name", json!("Novák")), None);
    }

    #[test]
    fn set_path_overwrites_scalar_intermediate_with_mapping() {
        let mut root = member(json!({ "health": "good", "id": "m1" }));
        set_path(&mut root, "health.allergies", json!(["pollen"]));
        assert_eq!(
            Value::Object(root),
            json!({ "health": { "allergies": ["pollen"] }, "id": "m1" })
        );
    }

    #[test]
    fn set_then_get_roundtrips_every_value_kind() {
        let values = [
            Value::Null,
            json!(42),
            json!("text"),
            json!(true),
            json!({ "nested": { "deep": 1 } }),
            json!([1, 2, 3]),
        ];
        for value in values {
            let mut root = member(json!({ "a": { "b": "old" } }));
            set_path(&mut root, "a.b.c", value.clone());
            assert_eq!(get_path(&root, "a.b.c"), Some(&value));
        }
    }

    #[test]
    fn set_path_replaces_intermediate_in_place() {
        let mut root = member(json!({ "id": "m1", "health": 3, "role": "child" }));
        set_path(&mut root, "health.allergies.seasonal", json!(["pollen"]));
        let keys: Vec<&str> = root.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["id", "health", "role"]);
        assert_eq!(
            get_path(&root, "health.allergies.seasonal"),
            Some(&json!(["pollen"]))
        );
    }

    #[test]
    fn set_path_preserves_sibling_order() {
        let mut root = member(json!({ "id": "m1", "role": "child", "note": null }));
        set_path(&mut root, "role", json!("parent"));
        let keys: Vec<&str> = root.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["id", "role", "note"]);
    }
}
