//! Stub and error-marker nodes.
//!
//! A stub replaces a `$ref` expansion the resolver intentionally withheld;
//! an error marker flags a malformed or unresolvable internal reference.
//! Both are plain objects so the output stays ordinary JSON.

use serde_json::{Map, Value, json};

/// Why a `$ref` expansion was withheld.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StubReason {
    /// The named component already hit its occurrence cap.
    DuplicateLimit(String),
    /// The recursion ceiling was reached.
    MaxDepth,
    /// The referenced file could not be read or parsed.
    FileNotFound,
    /// Filtered out by the web-only mode.
    NotWebReleased,
}

impl StubReason {
    /// The `_reason` string carried by the stub node.
    pub fn as_code(&self) -> String {
        match self {
            Self::DuplicateLimit(name) => format!("duplicate_limit_reached_{name}"),
            Self::MaxDepth => "max_depth_reached".to_string(),
            Self::FileNotFound => "file_not_found".to_string(),
            Self::NotWebReleased => "not_web_released".to_string(),
        }
    }
}

/// Build a stub node for a withheld `$ref` expansion.
///
/// `component` and `first_path` are included when known so downstream
/// consumers can find the canonical expansion.
pub fn stub_node(
    ref_str: &str,
    reason: &StubReason,
    component: Option<&str>,
    first_path: Option<&str>,
) -> Value {
    let mut map = Map::new();
    map.insert("_ref_stub".to_string(), Value::Bool(true));
    map.insert("$ref".to_string(), Value::String(ref_str.to_string()));
    map.insert("_reason".to_string(), Value::String(reason.as_code()));
    if let Some(name) = component {
        map.insert(
            "_component_name".to_string(),
            Value::String(name.to_string()),
        );
    }
    if let Some(path) = first_path {
        map.insert(
            "_first_occurrence_path".to_string(),
            Value::String(path.to_string()),
        );
    }
    Value::Object(map)
}

/// Build an inline error marker for a malformed or dangling reference.
pub fn error_marker(message: impl Into<String>) -> Value {
    json!({ "_error": message.into() })
}

/// Keys a referencing site may contribute to its resolved target.
const SITE_OVERRIDE_KEYS: [&str; 3] = ["required", "description", "default"];

/// Merge `required`/`description`/`default` from the referencing node into a
/// resolved value. Keys already present on the target win; nothing else from
/// the referencing site is carried over.
pub fn merge_site_overrides(resolved: &mut Value, site: &Map<String, Value>) {
    let Some(target) = resolved.as_object_mut() else {
        return;
    };
    for key in SITE_OVERRIDE_KEYS {
        if !target.contains_key(key)
            && let Some(value) = site.get(key)
        {
            target.insert(key.to_string(), value.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stub_shape_carries_reason_and_back_pointers() {
        let stub = stub_node(
            "Card.json",
            &StubReason::DuplicateLimit("Card".to_string()),
            Some("Card"),
            Some("root.properties.a"),
        );
        assert_eq!(stub["_ref_stub"], true);
        assert_eq!(stub["$ref"], "Card.json");
        assert_eq!(stub["_reason"], "duplicate_limit_reached_Card");
        assert_eq!(stub["_component_name"], "Card");
        assert_eq!(stub["_first_occurrence_path"], "root.properties.a");
    }

    #[test]
    fn minimal_stub_omits_unknown_fields() {
        let stub = stub_node("gone.json", &StubReason::FileNotFound, None, None);
        assert_eq!(stub["_reason"], "file_not_found");
        assert!(stub.get("_component_name").is_none());
        assert!(stub.get("_first_occurrence_path").is_none());
    }

    #[test]
    fn reason_codes() {
        assert_eq!(StubReason::MaxDepth.as_code(), "max_depth_reached");
        assert_eq!(StubReason::NotWebReleased.as_code(), "not_web_released");
    }

    #[test]
    fn site_overrides_fill_only_missing_keys() {
        let mut site = Map::new();
        site.insert("description".to_string(), json!("from the site"));
        site.insert("default".to_string(), json!({"a": 1}));
        site.insert("type".to_string(), json!("ignored"));

        let mut resolved = json!({"type": "object", "description": "own"});
        merge_site_overrides(&mut resolved, &site);

        assert_eq!(resolved["description"], "own");
        assert_eq!(resolved["default"], json!({"a": 1}));
        assert_eq!(resolved["type"], "object");
    }

    #[test]
    fn site_overrides_skip_non_objects() {
        let mut site = Map::new();
        site.insert("description".to_string(), json!("x"));
        let mut resolved = json!("scalar");
        merge_site_overrides(&mut resolved, &site);
        assert_eq!(resolved, json!("scalar"));
    }
}
