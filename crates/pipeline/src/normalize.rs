//! Canonical attribute ordering of serialized nodes

use repograph_core::error::Result;
use repograph_core::node::{Node, CANONICAL_KEYS};
use serde_json::{Map, Value};

const CHILDREN_KEY: &str = "children";

/// Reorder a node-shaped JSON value, recursively.
///
/// Canonical keys come first in their fixed order, then any other keys in
/// their existing order, then `children`. Values that are not objects are
/// returned unchanged.
pub fn normalize(value: Value) -> Value {
    let Value::Object(mut map) = value else {
        return value;
    };

    let mut ordered = Map::with_capacity(map.len());
    for key in CANONICAL_KEYS {
        if let Some(v) = map.shift_remove(key) {
            ordered.insert(key.to_string(), v);
        }
    }

    let children = map.shift_remove(CHILDREN_KEY);
    for (key, v) in map {
        ordered.insert(key, v);
    }

    if let Some(children) = children {
        let children = match children {
            Value::Array(items) => Value::Array(items.into_iter().map(normalize).collect()),
            other => other,
        };
        ordered.insert(CHILDREN_KEY.to_string(), children);
    }

    Value::Object(ordered)
}

/// Normalize a whole graph document: the value under `root` when present,
/// otherwise the document itself
pub fn normalize_document(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.contains_key("root") => {
            if let Some(root) = map.shift_remove("root") {
                map.insert("root".to_string(), normalize(root));
            }
            Value::Object(map)
        }
        other => normalize(other),
    }
}

/// Canonical JSON of a node tree
pub fn to_canonical_value(node: &Node) -> Result<Value> {
    Ok(normalize(serde_json::to_value(node)?))
}
