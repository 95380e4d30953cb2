//! Schema file loading with per-run caching.
//!
//! Loading a referenced file is a soft operation: failures are reported as
//! values so the resolver can degrade to a stub and keep going. Parsing
//! tolerates comments and trailing commas (the schema corpus carries both)
//! by falling back to json5 when strict JSON parsing fails.

use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failure to load a schema file.
///
/// Fatal only for the root document; everywhere else the resolver maps this
/// into a `file_not_found` stub.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse '{path}': {reason}")]
    Parse { path: PathBuf, reason: String },
}

/// Loads and parses schema files, serving repeats from a per-run cache.
///
/// `load` hands out clones of the cached parse, so callers can merge local
/// overrides into a resolved value without ever mutating the shared copy.
/// The cache lives and dies with one resolution run; source files are
/// treated as immutable for its duration.
#[derive(Default)]
pub struct SchemaLoader {
    cache: HashMap<PathBuf, Value>,
}

impl SchemaLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a schema file, parsing it on first access.
    pub fn load(&mut self, path: &Path) -> Result<Value, LoadError> {
        if let Some(cached) = self.cache.get(path) {
            return Ok(cached.clone());
        }

        let content = fs::read_to_string(path).map_err(|source| LoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let value = parse_schema(&content).map_err(|reason| LoadError::Parse {
            path: path.to_path_buf(),
            reason,
        })?;

        self.cache.insert(path.to_path_buf(), value.clone());
        Ok(value)
    }

    /// Number of distinct files loaded so far.
    pub fn loaded_files(&self) -> usize {
        self.cache.len()
    }
}

/// Parse schema text, tolerating comments and trailing commas.
///
/// Strict JSON is tried first; on failure json5 gets a chance. The error
/// reported is the strict parser's, which points at the real problem for
/// files that are not valid under either syntax.
pub fn parse_schema(content: &str) -> Result<Value, String> {
    match serde_json::from_str(content) {
        Ok(value) => Ok(value),
        Err(json_err) => json5::from_str(content).map_err(|_| json_err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn loads_and_caches_a_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Button.json");
        fs::write(&path, r#"{"name": "Button", "type": "object"}"#).unwrap();

        let mut loader = SchemaLoader::new();
        let first = loader.load(&path).unwrap();
        assert_eq!(first, json!({"name": "Button", "type": "object"}));
        assert_eq!(loader.loaded_files(), 1);

        // Second load is served from cache even if the file disappears
        fs::remove_file(&path).unwrap();
        let second = loader.load(&path).unwrap();
        assert_eq!(second, first);
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let mut loader = SchemaLoader::new();
        let result = loader.load(Path::new("/does/not/exist.json"));
        assert!(matches!(result, Err(LoadError::Read { .. })));
    }

    #[test]
    fn invalid_json_is_a_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not valid").unwrap();

        let mut loader = SchemaLoader::new();
        let result = loader.load(&path);
        assert!(matches!(result, Err(LoadError::Parse { .. })));
    }

    #[test]
    fn parses_schemas_with_comments() {
        let content = r#"{
            // Component identity
            "name": "Banner",
            "releaseVersion": {
                "web": "released", // GA since 2.1
            },
        }"#;

        let value = parse_schema(content).expect("Should parse JSONC schema");
        assert_eq!(value["name"], "Banner");
        assert_eq!(value["releaseVersion"]["web"], "released");
    }

    #[test]
    fn cached_parse_is_not_aliased_by_callers() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Card.json");
        fs::write(&path, r#"{"name": "Card"}"#).unwrap();

        let mut loader = SchemaLoader::new();
        let mut first = loader.load(&path).unwrap();
        first
            .as_object_mut()
            .unwrap()
            .insert("description".to_string(), json!("local"));

        let second = loader.load(&path).unwrap();
        assert!(second.get("description").is_none());
    }
}
