//! Recursive `$ref` expansion over schema documents.
//!
//! The walk is depth-first, single-threaded, and rebuilds the tree on the
//! way out: every visited position produces a new value, and resolved
//! targets are clones of the loader's cached parse, so no shared state is
//! ever mutated in place. All per-run state lives in [`Run`], created fresh
//! for each top-level call; concurrent resolutions just use separate
//! `Resolver` calls.

use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};

use super::loader::{LoadError, SchemaLoader};
use super::navigation::NavPath;
use super::reference::{ParsedRef, parse_fragment, parse_ref, resolve_file_path, walk_pointer};
use super::report::{ComponentNavigation, ResolutionReport};
use super::stub::{StubReason, error_marker, merge_site_overrides, stub_node};
use super::tracker::{ComponentTracker, Registration};
use crate::error::{ResolveError, ResolveResult};

/// Schema composition keywords whose branches are resolved in place.
const COMPOSITION_KEYWORDS: [&str; 3] = ["oneOf", "anyOf", "allOf"];

/// Configuration for a resolution run.
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    /// Recursion ceiling; expansions at or past it become stubs
    pub max_depth: usize,
    /// Stub out components whose `releaseVersion.web` is not released
    pub web_only: bool,
    /// Occurrence cap for ordinary component names
    pub duplicate_cap: u64,
    /// Occurrence cap for the names in `cyclic_components`
    pub cyclic_cap: u64,
    /// Names known to form dense reference cycles
    pub cyclic_components: Vec<String>,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            max_depth: 50,
            web_only: false,
            duplicate_cap: 3,
            cyclic_cap: 2,
            cyclic_components: vec![
                "LayoutElement".to_string(),
                "LayoutElementContent".to_string(),
                "Action".to_string(),
            ],
        }
    }
}

impl ResolveOptions {
    /// Duplicate cap for a component name.
    pub fn cap_for(&self, name: &str) -> u64 {
        if self.cyclic_components.iter().any(|c| c == name) {
            self.cyclic_cap
        } else {
            self.duplicate_cap
        }
    }
}

/// A finished run: the inlined document plus its typed report.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// Root document with every reachable `$ref` inlined or stubbed,
    /// carrying a `_metadata` block
    pub document: Value,
    /// Counters and navigation index for the run
    pub report: ResolutionReport,
}

/// Expands `$ref` pointers in a schema file into a single inlined document.
pub struct Resolver {
    options: ResolveOptions,
}

impl Resolver {
    pub fn new(options: ResolveOptions) -> Self {
        Self { options }
    }

    /// Resolve a root schema file.
    ///
    /// Only an unreadable or unparsable root is an error. Every downstream
    /// failure degrades into stub or error-marker nodes, so a non-fatal run
    /// always produces a document.
    pub fn resolve_file(&self, root: &Path) -> ResolveResult<Resolution> {
        let mut run = Run::new(&self.options);

        let root_doc = run.loader.load(root).map_err(|e| match e {
            LoadError::Read { path, source } => ResolveError::RootRead { path, source },
            LoadError::Parse { path, reason } => ResolveError::RootParse { path, reason },
        })?;

        // The root is its own first occurrence; a self-referencing root is
        // a duplicate on first re-encounter, not a free inline.
        let root_name = component_name(&root_doc, root);
        run.tracker
            .register(&root_name, NavPath::ROOT, self.options.cap_for(&root_name));

        let resolved = run.resolve_schema(root_doc.clone(), root, &root_doc);
        let report = run.into_report(root);
        let document = attach_metadata(resolved, &report);
        Ok(Resolution { document, report })
    }
}

/// Mutable state for one resolution run.
struct Run<'a> {
    options: &'a ResolveOptions,
    loader: SchemaLoader,
    tracker: ComponentTracker,
    path: NavPath,
    depth: usize,
    total_resolutions: u64,
    stub_count: u64,
    error_markers: u64,
    stub_reasons: BTreeMap<String, u64>,
}

impl<'a> Run<'a> {
    fn new(options: &'a ResolveOptions) -> Self {
        Self {
            options,
            loader: SchemaLoader::new(),
            tracker: ComponentTracker::new(),
            path: NavPath::new(),
            depth: 0,
            total_resolutions: 0,
            stub_count: 0,
            error_markers: 0,
            stub_reasons: BTreeMap::new(),
        }
    }

    /// Resolve one node. Depth is incremented on entry and restored on every
    /// exit path, so stub substitution or an error marker in one branch
    /// never leaks depth into siblings.
    fn resolve_schema(&mut self, value: Value, file: &Path, doc: &Value) -> Value {
        self.depth += 1;
        let resolved = self.resolve_node(value, file, doc);
        self.depth -= 1;
        resolved
    }

    fn resolve_node(&mut self, value: Value, file: &Path, doc: &Value) -> Value {
        match value {
            Value::Object(map) => {
                if map.contains_key("$ref") {
                    self.resolve_ref_node(map, file, doc)
                } else if COMPOSITION_KEYWORDS.iter().any(|k| map.contains_key(*k)) {
                    self.resolve_composition(map, file, doc)
                } else {
                    let mut out = Map::with_capacity(map.len());
                    for (key, child) in map {
                        self.path.push_key(&key);
                        let resolved = self.resolve_schema(child, file, doc);
                        self.path.pop();
                        out.insert(key, resolved);
                    }
                    Value::Object(out)
                }
            }
            Value::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for (index, item) in items.into_iter().enumerate() {
                    self.path.push_index(index);
                    let resolved = self.resolve_schema(item, file, doc);
                    self.path.pop();
                    out.push(resolved);
                }
                Value::Array(out)
            }
            scalar => scalar,
        }
    }

    /// Composition node: resolve each branch under the keyword's path.
    /// Branch indices are not pushed, so sibling branches report the same
    /// path. Non-composition keys on the node pass through untouched.
    fn resolve_composition(&mut self, map: Map<String, Value>, file: &Path, doc: &Value) -> Value {
        let mut out = Map::with_capacity(map.len());
        for (key, child) in map {
            match child {
                Value::Array(branches) if COMPOSITION_KEYWORDS.contains(&key.as_str()) => {
                    self.path.push_key(&key);
                    let mut resolved = Vec::with_capacity(branches.len());
                    for branch in branches {
                        resolved.push(self.resolve_schema(branch, file, doc));
                    }
                    self.path.pop();
                    out.insert(key, Value::Array(resolved));
                }
                other => {
                    out.insert(key, other);
                }
            }
        }
        Value::Object(out)
    }

    /// A node carrying `$ref`: resolve the reference, then let the
    /// referencing site contribute `required`/`description`/`default`.
    fn resolve_ref_node(&mut self, map: Map<String, Value>, file: &Path, doc: &Value) -> Value {
        let Some(ref_str) = map.get("$ref").and_then(Value::as_str).map(str::to_string) else {
            warn!(path = %self.path.joined(), "non-string $ref value");
            self.error_markers += 1;
            return error_marker("$ref must be a string");
        };

        let mut resolved = self.resolve_reference(&ref_str, file, doc);
        merge_site_overrides(&mut resolved, &map);
        resolved
    }

    fn resolve_reference(&mut self, ref_str: &str, file: &Path, doc: &Value) -> Value {
        self.total_resolutions += 1;

        if self.depth >= self.options.max_depth {
            warn!(
                reference = ref_str,
                depth = self.depth,
                "max depth reached, substituting stub"
            );
            let owner = self
                .tracker
                .owning_component(&self.path.prefixes_longest_first());
            let (name, first_path) = match &owner {
                Some((name, first)) => (Some(name.as_str()), Some(first.as_str())),
                None => (None, None),
            };
            return self.stub(ref_str, StubReason::MaxDepth, name, first_path);
        }

        match parse_ref(ref_str) {
            ParsedRef::Internal { fragment } => {
                self.resolve_internal(ref_str, &fragment, file, doc)
            }
            ParsedRef::External { file: target, fragment } => {
                self.resolve_external(ref_str, &target, fragment.as_deref(), file)
            }
        }
    }

    /// Internal reference: walk the document currently being resolved, not
    /// the run's root.
    fn resolve_internal(&mut self, ref_str: &str, fragment: &str, file: &Path, doc: &Value) -> Value {
        let segments = match parse_fragment(fragment) {
            Ok(segments) => segments,
            Err(reason) => {
                warn!(reference = ref_str, "malformed internal reference");
                self.error_markers += 1;
                return error_marker(format!(
                    "malformed internal reference '{ref_str}': {reason}"
                ));
            }
        };

        match walk_pointer(doc, &segments) {
            Some(found) => {
                let found = found.clone();
                self.resolve_schema(found, file, doc)
            }
            None => {
                warn!(reference = ref_str, "internal reference target missing");
                self.error_markers += 1;
                error_marker(format!("internal reference '{ref_str}' does not resolve"))
            }
        }
    }

    fn resolve_external(
        &mut self,
        ref_str: &str,
        target: &str,
        fragment: Option<&str>,
        file: &Path,
    ) -> Value {
        let target_path = resolve_file_path(target, file);

        let loaded = match self.loader.load(&target_path) {
            Ok(value) => value,
            Err(e) => {
                warn!(reference = ref_str, error = %e, "referenced file unavailable, substituting stub");
                return self.stub(ref_str, StubReason::FileNotFound, None, None);
            }
        };

        let name = component_name(&loaded, &target_path);

        if self.options.web_only && !is_web_released(&loaded) {
            debug!(component = %name, "not released for web, substituting stub");
            return self.stub(ref_str, StubReason::NotWebReleased, Some(&name), None);
        }

        let site = self.path.joined();
        match self
            .tracker
            .register(&name, &site, self.options.cap_for(&name))
        {
            Registration::Capped { first_path } => {
                debug!(component = %name, site = %site, "duplicate cap reached, substituting stub");
                self.stub(
                    ref_str,
                    StubReason::DuplicateLimit(name.clone()),
                    Some(&name),
                    Some(&first_path),
                )
            }
            Registration::Expanded => {
                // The cap is checked before the fragment, so a capped
                // component never has its fragment evaluated.
                let selected = match fragment {
                    None => loaded.clone(),
                    Some(frag) => match parse_fragment(frag) {
                        Err(reason) => {
                            self.error_markers += 1;
                            return error_marker(format!(
                                "malformed fragment in '{ref_str}': {reason}"
                            ));
                        }
                        Ok(segments) => match walk_pointer(&loaded, &segments) {
                            Some(found) => found.clone(),
                            None => {
                                self.error_markers += 1;
                                return error_marker(format!(
                                    "fragment in '{ref_str}' does not resolve"
                                ));
                            }
                        },
                    },
                };
                self.resolve_schema(selected, &target_path, &loaded)
            }
        }
    }

    fn stub(
        &mut self,
        ref_str: &str,
        reason: StubReason,
        component: Option<&str>,
        first_path: Option<&str>,
    ) -> Value {
        self.stub_count += 1;
        *self.stub_reasons.entry(reason.as_code()).or_insert(0) += 1;
        stub_node(ref_str, &reason, component, first_path)
    }

    fn into_report(self, root: &Path) -> ResolutionReport {
        let mut component_occurrences = BTreeMap::new();
        for (name, count) in self.tracker.occurrences() {
            component_occurrences.insert(name.clone(), *count);
        }

        let mut navigation_index = BTreeMap::new();
        for (name, paths) in self.tracker.paths() {
            let first_path = self
                .tracker
                .first_occurrence(name)
                .map(str::to_string)
                .or_else(|| paths.first().cloned())
                .unwrap_or_default();
            navigation_index.insert(
                name.clone(),
                ComponentNavigation {
                    first_path,
                    count: paths.len() as u64,
                    paths: paths.clone(),
                },
            );
        }

        ResolutionReport {
            source_file: root.display().to_string(),
            total_resolutions: self.total_resolutions,
            total_stubs: self.stub_count,
            error_markers: self.error_markers,
            unique_components: self.tracker.unique_components(),
            component_occurrences,
            navigation_index,
            stub_reasons: self.stub_reasons,
        }
    }
}

/// Attach the `_metadata` block to a resolved root document.
fn attach_metadata(resolved: Value, report: &ResolutionReport) -> Value {
    match resolved {
        Value::Object(mut map) => {
            map.insert("_metadata".to_string(), report.metadata_block());
            Value::Object(map)
        }
        other => other,
    }
}

/// Canonical component name: the schema's `name` field, falling back to the
/// file stem.
pub(crate) fn component_name(schema: &Value, path: &Path) -> String {
    schema
        .get("name")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| {
            path.file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| "unknown".to_string())
        })
}

/// Web availability check for web-only runs.
///
/// A component passes when `releaseVersion.web` is `"released"` or a
/// version-looking string (leading digit). A schema with no `releaseVersion`
/// map is not a platform-gated component and passes; a map without a `web`
/// entry does not.
pub(crate) fn is_web_released(schema: &Value) -> bool {
    let Some(release) = schema.get("releaseVersion") else {
        return true;
    };
    let Some(release) = release.as_object() else {
        return true;
    };
    match release.get("web").and_then(Value::as_str) {
        Some("released") => true,
        Some(version) => version.chars().next().is_some_and(|c| c.is_ascii_digit()),
        None => false,
    }
}
