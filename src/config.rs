//! Configuration module for the schema resolver.
//!
//! This module provides a layered configuration system that supports:
//! - Default values
//! - TOML configuration file (`refsolve.toml`)
//! - Environment variable overrides
//! - CLI argument overrides
//!
//! # Environment Variables
//!
//! Environment variables must be prefixed with `REFSOLVE_` and use double
//! underscores to separate nested levels:
//! - `REFSOLVE_RESOLVER__MAX_DEPTH=20` sets `resolver.max_depth`
//! - `REFSOLVE_RESOLVER__WEB_ONLY=true` sets `resolver.web_only`
//! - `REFSOLVE_OUTPUT__PRETTY=false` sets `output.pretty`

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{ResolveError, ResolveResult};
use crate::resolver::ResolveOptions;

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "refsolve.toml";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    /// Version of the configuration schema
    #[serde(default = "default_version")]
    pub version: u32,

    /// Global debug mode
    #[serde(default = "default_false")]
    pub debug: bool,

    /// Resolver configuration
    #[serde(default)]
    pub resolver: ResolverConfig,

    /// Output formatting
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ResolverConfig {
    /// Recursion ceiling for `$ref` expansion
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Replace components not released for web with stubs
    #[serde(default = "default_false")]
    pub web_only: bool,

    /// How many times a component may be fully inlined before it is stubbed
    #[serde(default = "default_duplicate_cap")]
    pub duplicate_cap: u64,

    /// Tighter cap applied to the components in `cyclic_components`
    #[serde(default = "default_cyclic_cap")]
    pub cyclic_cap: u64,

    /// Component names known to form dense reference cycles.
    ///
    /// These inherit `cyclic_cap` instead of `duplicate_cap`. The default set
    /// matches the component graph this tool grew up with; override it per
    /// project when other schemas develop the same shape.
    #[serde(default = "default_cyclic_components")]
    pub cyclic_components: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct OutputConfig {
    /// Pretty-print resolved documents
    #[serde(default = "default_true")]
    pub pretty: bool,
}

// Default value functions
fn default_version() -> u32 {
    1
}
fn default_true() -> bool {
    true
}
fn default_false() -> bool {
    false
}
fn default_max_depth() -> usize {
    50
}
fn default_duplicate_cap() -> u64 {
    3
}
fn default_cyclic_cap() -> u64 {
    2
}
fn default_cyclic_components() -> Vec<String> {
    vec![
        "LayoutElement".to_string(),
        "LayoutElementContent".to_string(),
        "Action".to_string(),
    ]
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            debug: false,
            resolver: ResolverConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            web_only: false,
            duplicate_cap: default_duplicate_cap(),
            cyclic_cap: default_cyclic_cap(),
            cyclic_components: default_cyclic_components(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { pretty: true }
    }
}

impl Settings {
    /// Load settings from the layered sources.
    ///
    /// Order of precedence (later wins): defaults, `refsolve.toml` (or the
    /// explicitly provided file), `REFSOLVE_*` environment variables.
    pub fn load(config_path: Option<&Path>) -> ResolveResult<Self> {
        let toml_file = match config_path {
            Some(path) => {
                if !path.exists() {
                    return Err(ResolveError::ConfigError {
                        reason: format!("config file '{}' not found", path.display()),
                    });
                }
                path.to_path_buf()
            }
            None => Path::new(CONFIG_FILE).to_path_buf(),
        };

        Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(toml_file))
            .merge(Env::prefixed("REFSOLVE_").split("__"))
            .extract()
            .map_err(|e| ResolveError::ConfigError {
                reason: e.to_string(),
            })
    }

    /// Resolver options derived from these settings.
    pub fn resolve_options(&self) -> ResolveOptions {
        ResolveOptions {
            max_depth: self.resolver.max_depth,
            web_only: self.resolver.web_only,
            duplicate_cap: self.resolver.duplicate_cap,
            cyclic_cap: self.resolver.cyclic_cap,
            cyclic_components: self.resolver.cyclic_components.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let settings = Settings::default();
        assert_eq!(settings.resolver.max_depth, 50);
        assert!(!settings.resolver.web_only);
        assert_eq!(settings.resolver.duplicate_cap, 3);
        assert_eq!(settings.resolver.cyclic_cap, 2);
        assert_eq!(
            settings.resolver.cyclic_components,
            vec!["LayoutElement", "LayoutElementContent", "Action"]
        );
        assert!(settings.output.pretty);
    }

    #[test]
    fn toml_layer_overrides_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = dir.path().join("refsolve.toml");
        std::fs::write(
            &config,
            r#"
[resolver]
max_depth = 12
web_only = true
cyclic_components = ["Card"]
"#,
        )
        .unwrap();

        let settings = Settings::load(Some(&config)).expect("Should load settings from toml");
        assert_eq!(settings.resolver.max_depth, 12);
        assert!(settings.resolver.web_only);
        assert_eq!(settings.resolver.cyclic_components, vec!["Card"]);
        // Untouched sections keep their defaults
        assert_eq!(settings.resolver.duplicate_cap, 3);
        assert!(settings.output.pretty);
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        let result = Settings::load(Some(Path::new("/does/not/exist/refsolve.toml")));
        assert!(matches!(result, Err(ResolveError::ConfigError { .. })));
    }

    #[test]
    fn options_mirror_resolver_section() {
        let mut settings = Settings::default();
        settings.resolver.max_depth = 7;
        settings.resolver.web_only = true;

        let options = settings.resolve_options();
        assert_eq!(options.max_depth, 7);
        assert!(options.web_only);
        assert_eq!(options.cap_for("LayoutElement"), 2);
        assert_eq!(options.cap_for("Banner"), 3);
    }
}
