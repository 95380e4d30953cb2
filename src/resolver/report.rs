//! Typed run reports and the `_metadata` block.

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Where one component showed up during a run.
#[derive(Debug, Clone, Serialize)]
pub struct ComponentNavigation {
    /// Path of the canonical (first) full expansion
    pub first_path: String,
    /// Total registrations, expansions and stubs both
    pub count: u64,
    /// Every path at which the component was registered
    pub paths: Vec<String>,
}

/// Summary of one resolution run.
///
/// Sorted maps keep the report and the `_metadata` block deterministic for
/// a given input, which the CLI relies on for diffable output.
#[derive(Debug, Clone, Serialize)]
pub struct ResolutionReport {
    /// Root file the run started from
    pub source_file: String,
    /// `$ref` resolutions attempted
    pub total_resolutions: u64,
    /// Stub nodes substituted
    pub total_stubs: u64,
    /// Inline `_error` markers produced
    pub error_markers: u64,
    /// Distinct component names encountered
    pub unique_components: usize,
    /// Component name -> occurrence count
    pub component_occurrences: BTreeMap<String, u64>,
    /// Component name -> where it appeared
    pub navigation_index: BTreeMap<String, ComponentNavigation>,
    /// Stub `_reason` code -> count
    pub stub_reasons: BTreeMap<String, u64>,
}

impl ResolutionReport {
    /// True when the output contains no stubs and no error markers.
    pub fn is_clean(&self) -> bool {
        self.total_stubs == 0 && self.error_markers == 0
    }

    /// The `_metadata` block attached to the resolved document.
    pub fn metadata_block(&self) -> Value {
        let mut meta = Map::new();
        meta.insert(
            "source_file".to_string(),
            Value::String(self.source_file.clone()),
        );
        meta.insert(
            "total_resolutions".to_string(),
            Value::from(self.total_resolutions),
        );
        meta.insert("total_stubs".to_string(), Value::from(self.total_stubs));
        meta.insert(
            "unique_components".to_string(),
            Value::from(self.unique_components as u64),
        );

        let mut occurrences = Map::new();
        for (name, count) in &self.component_occurrences {
            occurrences.insert(name.clone(), Value::from(*count));
        }
        meta.insert(
            "component_occurrences".to_string(),
            Value::Object(occurrences),
        );

        let mut navigation = Map::new();
        for (name, entry) in &self.navigation_index {
            let mut node = Map::new();
            node.insert(
                "first_path".to_string(),
                Value::String(entry.first_path.clone()),
            );
            node.insert("count".to_string(), Value::from(entry.count));
            node.insert(
                "paths".to_string(),
                Value::Array(
                    entry
                        .paths
                        .iter()
                        .map(|p| Value::String(p.clone()))
                        .collect(),
                ),
            );
            navigation.insert(name.clone(), Value::Object(node));
        }
        meta.insert("navigation_index".to_string(), Value::Object(navigation));

        Value::Object(meta)
    }
}

impl fmt::Display for ResolutionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Resolved {}", self.source_file)?;
        writeln!(f, "  $ref resolutions: {}", self.total_resolutions)?;
        writeln!(f, "  unique components: {}", self.unique_components)?;
        writeln!(f, "  error markers: {}", self.error_markers)?;
        write!(f, "  stubs: {}", self.total_stubs)?;
        if !self.stub_reasons.is_empty() {
            let breakdown: Vec<String> = self
                .stub_reasons
                .iter()
                .map(|(reason, count)| format!("{reason}: {count}"))
                .collect();
            write!(f, " ({})", breakdown.join(", "))?;
        }
        Ok(())
    }
}
