//! `$ref` string parsing and target path normalization.
//!
//! References come in three forms: `relative/path.json`,
//! `relative/path.json#/fragment/path`, and `#/fragment/path`
//! (internal-only). Fragments are `/`-delimited object keys; array indices
//! are not part of this scheme.

use serde_json::Value;
use std::path::{Path, PathBuf};

/// A `$ref` string split into its file and fragment parts.
///
/// No validation happens at parse time; fragment syntax is checked by
/// [`parse_fragment`] when the reference is actually followed, so a
/// malformed fragment can degrade to an inline error marker instead of
/// failing the parse step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedRef {
    /// `#/...` - resolved against the document currently being walked
    Internal { fragment: String },
    /// `file.json` or `file.json#/...` - resolved against a loaded file
    External {
        file: String,
        fragment: Option<String>,
    },
}

/// Split a `$ref` string into file and fragment parts.
pub fn parse_ref(raw: &str) -> ParsedRef {
    if let Some(fragment) = raw.strip_prefix('#') {
        return ParsedRef::Internal {
            fragment: fragment.to_string(),
        };
    }
    match raw.split_once('#') {
        Some((file, fragment)) => ParsedRef::External {
            file: file.to_string(),
            fragment: Some(fragment.to_string()),
        },
        None => ParsedRef::External {
            file: raw.to_string(),
            fragment: None,
        },
    }
}

/// Validate and split a fragment (the part after `#`) into pointer segments.
///
/// The fragment must start with `/` and every `/`-delimited segment must be
/// non-empty.
pub fn parse_fragment(fragment: &str) -> Result<Vec<String>, String> {
    let Some(rest) = fragment.strip_prefix('/') else {
        return Err(format!("fragment must start with '/', got '{fragment}'"));
    };
    let segments: Vec<String> = rest.split('/').map(str::to_string).collect();
    if segments.iter().any(String::is_empty) {
        return Err(format!("fragment has an empty segment: '{fragment}'"));
    }
    Ok(segments)
}

/// Walk pointer segments into a document.
///
/// Every hop indexes an object by key; a missing key or a non-object node
/// resolves to `None`.
pub fn walk_pointer<'a>(doc: &'a Value, segments: &[String]) -> Option<&'a Value> {
    let mut node = doc;
    for segment in segments {
        node = node.as_object()?.get(segment)?;
    }
    Some(node)
}

/// Turn the file part of a reference into a concrete path.
///
/// Relative references are resolved against the referencing file's
/// directory, and `.json` is appended when the reference has no extension.
pub fn resolve_file_path(file_part: &str, current_file: &Path) -> PathBuf {
    let path = if Path::new(file_part).is_absolute() {
        PathBuf::from(file_part)
    } else {
        current_file
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join(file_part)
    };

    if path.extension().is_none() {
        path.with_extension("json")
    } else {
        path
    }
}
