//! Project configuration loaded from `.codemask.toml`.
//!
//! Configuration problems are rejected here, before any source file is
//! touched; nothing downstream re-validates.

use crate::core::{CodemaskError, CodemaskResult};
use crate::naming::NamingConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::io::{BufReader, Read};
use std::path::Path;

pub const CONFIG_FILE_NAME: &str = ".codemask.toml";

/// Names and prefixes that must never be renamed. System API surface plus
/// lifecycle selectors the runtime looks up by name.
const SYSTEM_PREFIXES: &[&str] = &[
    "NS", "UI", "CA", "CG", "CF", "CL", "AV", "SK", "MK", "WK", "MF", "PH", "HK",
];

const SYSTEM_NAMES: &[&str] = &[
    "init",
    "dealloc",
    "alloc",
    "copy",
    "mutableCopy",
    "description",
    "debugDescription",
    "hash",
    "isEqual",
    "main",
    "self",
    "super",
    "viewDidLoad",
    "viewWillAppear",
    "viewDidAppear",
    "viewWillDisappear",
    "viewDidDisappear",
    "awakeFromNib",
    "application",
    "AppDelegate",
    "SceneDelegate",
];

/// Predicate over symbol names; a whitelisted name is never extracted and
/// never appears in the rename map.
#[derive(Debug, Clone, Default)]
pub struct Whitelist {
    exact: HashSet<String>,
    prefixes: Vec<String>,
}

impl Whitelist {
    /// Build from configuration, folding in the system defaults unless
    /// disabled.
    pub fn from_config(config: &WhitelistConfig) -> Self {
        let mut exact: HashSet<String> = config.names.iter().cloned().collect();
        let mut prefixes = config.prefixes.clone();

        if config.use_system_defaults {
            exact.extend(SYSTEM_NAMES.iter().map(|s| s.to_string()));
            prefixes.extend(SYSTEM_PREFIXES.iter().map(|s| s.to_string()));
        }

        Self { exact, prefixes }
    }

    /// Whitelist containing only the system defaults
    pub fn system_defaults() -> Self {
        Self::from_config(&WhitelistConfig::default())
    }

    /// An empty whitelist, for tests and callers that opt out entirely
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_names<I: IntoIterator<Item = String>>(mut self, names: I) -> Self {
        self.exact.extend(names);
        self
    }

    pub fn is_whitelisted(&self, name: &str) -> bool {
        if self.exact.contains(name) {
            return true;
        }
        self.prefixes.iter().any(|prefix| name.starts_with(prefix))
    }
}

/// `[whitelist]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhitelistConfig {
    /// Exact names to preserve
    #[serde(default)]
    pub names: Vec<String>,
    /// Name prefixes to preserve
    #[serde(default)]
    pub prefixes: Vec<String>,
    /// Fold in the built-in system API prefixes and lifecycle names
    #[serde(default = "default_true")]
    pub use_system_defaults: bool,
}

impl Default for WhitelistConfig {
    fn default() -> Self {
        Self {
            names: Vec::new(),
            prefixes: Vec::new(),
            use_system_defaults: true,
        }
    }
}

/// `[ignore]` section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IgnoreConfig {
    #[serde(default)]
    pub patterns: Vec<String>,
}

/// `[output]` section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Mirror directory for transformed files; in-place rewrite when unset
    #[serde(default)]
    pub directory: Option<String>,
    /// Mapping export path, relative to the project root
    #[serde(default)]
    pub mapping_file: Option<String>,
    /// Mapping export format: "json" (default) or "csv"
    #[serde(default)]
    pub mapping_format: Option<String>,
}

/// Root configuration document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CodemaskConfig {
    #[serde(default)]
    pub naming: NamingConfig,
    #[serde(default)]
    pub whitelist: WhitelistConfig,
    #[serde(default)]
    pub ignore: IgnoreConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl CodemaskConfig {
    /// Load `.codemask.toml` from the project root. A missing file yields
    /// defaults; a malformed file or invalid settings are configuration
    /// errors.
    pub fn load(project_root: &Path) -> CodemaskResult<Self> {
        let path = project_root.join(CONFIG_FILE_NAME);
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = read_config_file(&path)
            .map_err(|e| CodemaskError::Config(format!("failed to read {}: {e}", path.display())))?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> CodemaskResult<Self> {
        let config: CodemaskConfig = toml::from_str(contents)
            .map_err(|e| CodemaskError::Config(format!("failed to parse {CONFIG_FILE_NAME}: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject invalid settings up front; configuration errors must surface
    /// at validation time, never mid-run.
    pub fn validate(&self) -> CodemaskResult<()> {
        self.naming.validate()?;
        if let Some(format) = self.output.mapping_format.as_deref() {
            if format != "json" && format != "csv" {
                return Err(CodemaskError::Config(format!(
                    "unknown mapping format '{format}' (expected json or csv)"
                )));
            }
        }
        for pattern in &self.ignore.patterns {
            glob::Pattern::new(pattern).map_err(|e| {
                CodemaskError::Config(format!("invalid ignore pattern '{pattern}': {e}"))
            })?;
        }
        Ok(())
    }

    pub fn whitelist(&self) -> Whitelist {
        Whitelist::from_config(&self.whitelist)
    }
}

fn read_config_file(path: &Path) -> Result<String, std::io::Error> {
    let file = fs::File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut contents = String::new();
    reader.read_to_string(&mut contents)?;
    Ok(contents)
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    #[test]
    fn whitelist_matches_exact_names_and_prefixes() {
        let whitelist = Whitelist::system_defaults();
        assert!(whitelist.is_whitelisted("NSString"));
        assert!(whitelist.is_whitelisted("UIViewController"));
        assert!(whitelist.is_whitelisted("init"));
        assert!(!whitelist.is_whitelisted("MyViewController"));
    }

    #[test]
    fn empty_whitelist_matches_nothing() {
        let whitelist = Whitelist::empty();
        assert!(!whitelist.is_whitelisted("NSString"));
        assert!(!whitelist.is_whitelisted("init"));
    }

    #[test]
    fn user_names_extend_the_whitelist() {
        let whitelist = Whitelist::empty().with_names(vec!["Keep".to_string()]);
        assert!(whitelist.is_whitelisted("Keep"));
        // Exact names are not prefixes.
        assert!(!whitelist.is_whitelisted("KeepNot"));
    }

    #[test]
    fn missing_config_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = CodemaskConfig::load(dir.path()).unwrap();
        assert!(config.whitelist.use_system_defaults);
        assert!(config.output.directory.is_none());
    }

    #[test]
    fn parses_full_document() {
        let contents = indoc! {r#"
            [naming]
            strategy = "prefix"
            prefix = "XY"
            min_length = 8
            max_length = 16

            [whitelist]
            names = ["Keep"]
            prefixes = ["RX"]
            use_system_defaults = false

            [ignore]
            patterns = ["Pods/**"]

            [output]
            mapping_file = "mapping.json"
        "#};
        let config = CodemaskConfig::from_toml(contents).unwrap();
        assert_eq!(config.whitelist.names, vec!["Keep"]);
        assert!(!config.whitelist.use_system_defaults);
        assert_eq!(config.output.mapping_file.as_deref(), Some("mapping.json"));
    }

    #[test]
    fn rejects_unknown_mapping_format() {
        let contents = indoc! {r#"
            [output]
            mapping_format = "xml"
        "#};
        let err = CodemaskConfig::from_toml(contents).unwrap_err();
        assert!(err.to_string().contains("mapping format"));
    }

    #[test]
    fn rejects_invalid_ignore_pattern() {
        let contents = indoc! {r#"
            [ignore]
            patterns = ["[oops"]
        "#};
        assert!(CodemaskConfig::from_toml(contents).is_err());
    }
}
