//! Per-run component occurrence tracking.
//!
//! The tracker is the single owner of the duplicate-capping state for one
//! resolution run. Components are keyed by name, not by file path: two
//! files declaring the same `name` count as one component. Construct a
//! fresh tracker per run; nothing here is shared or global.

use std::collections::HashMap;

/// Outcome of registering a component occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    /// Under the cap: expand the component in full at this site.
    Expanded,
    /// Over the cap: substitute a stub pointing at the canonical expansion.
    Capped { first_path: String },
}

/// Mutable occurrence state for one resolution run.
#[derive(Debug, Default)]
pub struct ComponentTracker {
    /// Component name -> navigation path of its first full expansion.
    /// Once set for a name, never overwritten.
    first_occurrences: HashMap<String, String>,
    /// Component name -> registrations requested, expansions and stubs both.
    occurrences: HashMap<String, u64>,
    /// Component name -> every path at which it was registered.
    paths: HashMap<String, Vec<String>>,
    /// Navigation path -> component expanded there. Probed by the
    /// owning-component lookup.
    expansions_by_path: HashMap<String, String>,
}

impl ComponentTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an occurrence of `name` at `path` under the given cap.
    ///
    /// The first occurrence always expands and becomes the canonical path
    /// for the name. Later occurrences expand until the running count
    /// exceeds the cap.
    pub fn register(&mut self, name: &str, path: &str, cap: u64) -> Registration {
        let count = self.occurrences.entry(name.to_string()).or_insert(0);
        *count += 1;
        let count = *count;

        self.paths
            .entry(name.to_string())
            .or_default()
            .push(path.to_string());

        if count == 1 {
            self.first_occurrences
                .insert(name.to_string(), path.to_string());
            self.expansions_by_path
                .insert(path.to_string(), name.to_string());
            return Registration::Expanded;
        }

        let first_path = self
            .first_occurrences
            .get(name)
            .cloned()
            .unwrap_or_else(|| path.to_string());

        if count > cap {
            Registration::Capped { first_path }
        } else {
            self.expansions_by_path
                .insert(path.to_string(), name.to_string());
            Registration::Expanded
        }
    }

    /// Best-effort lookup of the component whose expansion encloses a path.
    ///
    /// Probes the given prefixes (longest first) against recorded expansion
    /// sites. Diagnostics only; returning `None` is fine.
    pub fn owning_component(&self, prefixes: &[String]) -> Option<(String, String)> {
        for prefix in prefixes {
            if let Some(name) = self.expansions_by_path.get(prefix) {
                let first = self
                    .first_occurrences
                    .get(name)
                    .cloned()
                    .unwrap_or_else(|| prefix.clone());
                return Some((name.clone(), first));
            }
        }
        None
    }

    pub fn unique_components(&self) -> usize {
        self.occurrences.len()
    }

    pub fn occurrences(&self) -> &HashMap<String, u64> {
        &self.occurrences
    }

    pub fn paths(&self) -> &HashMap<String, Vec<String>> {
        &self.paths
    }

    pub fn first_occurrence(&self, name: &str) -> Option<&str> {
        self.first_occurrences.get(name).map(String::as_str)
    }
}
