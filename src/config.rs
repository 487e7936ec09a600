//! # Tool Settings
//!
//! `confgen.json` describes the site: which directories packages live under,
//! which paths to leave alone, which organization holds the repositories and
//! where clones and mirrors go. Every field is optional.
//!
//! ```json
//! {
//!   "root_prefixes": ["/site/packages/int/"],
//!   "ignore_patterns": ["/site/packages/dev/*"],
//!   "no_translate_patterns": ["/site/packages/ext/*", "/opt/*"],
//!   "organization": "acme-rnd",
//!   "clone_dir": "./clones",
//!   "ide_defaults": { "venv": "devenv39", "pythonVersion": "3.9" }
//! }
//! ```
//!
//! `ide_defaults` is merged key by key over the built-in pyright defaults.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

use crate::defaults;
use crate::error::{Error, Result};
use crate::identity::RootPrefixes;
use crate::pattern::PatternSet;

/// Settings for one confgen run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Directories packages live under, most specific first.
    pub root_prefixes: Vec<String>,
    /// Search paths matching these are dropped.
    pub ignore_patterns: Vec<String>,
    /// Search paths matching these are never rewritten.
    pub no_translate_patterns: Vec<String>,
    /// Environment variables the search paths are read from.
    pub path_variables: Vec<String>,
    /// Hosting organization whose repositories are cloned.
    pub organization: String,
    pub mirror_dir: PathBuf,
    pub clone_dir: PathBuf,
    /// IDE configuration file to write.
    pub output: PathBuf,
    /// IDE configuration fields that receive the search paths.
    pub add_to: Vec<String>,
    /// Concurrent git tasks; rayon's default when unset.
    pub jobs: Option<usize>,
    pub clone_timeout_secs: u64,
    /// Mirror with symlinks instead of copies.
    pub symlink: bool,
    pub ide_defaults: Map<String, Value>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            root_prefixes: Vec::new(),
            ignore_patterns: Vec::new(),
            no_translate_patterns: Vec::new(),
            path_variables: defaults::path_variables(),
            organization: String::new(),
            mirror_dir: PathBuf::from(defaults::MIRROR_DIR),
            clone_dir: PathBuf::from(defaults::CLONE_DIR),
            output: PathBuf::from(defaults::OUTPUT_FILE),
            add_to: defaults::add_to_fields(),
            jobs: None,
            clone_timeout_secs: defaults::CLONE_TIMEOUT_SECS,
            symlink: false,
            ide_defaults: Map::new(),
        }
    }
}

impl Settings {
    /// Parse settings from JSON text.
    pub fn parse(content: &str) -> Result<Self> {
        let settings: Settings = serde_json::from_str(content).map_err(|e| Error::ConfigParse {
            message: e.to_string(),
            hint: e
                .to_string()
                .contains("unknown field")
                .then(|| "Check the field name against the documented settings".to_string()),
        })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from `path`.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Load `path` when it exists, otherwise the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.is_file() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    fn validate(&self) -> Result<()> {
        if let Some(prefix) = self.root_prefixes.iter().find(|p| !p.starts_with('/')) {
            return Err(Error::ConfigParse {
                message: format!("root prefix '{}' is not absolute", prefix),
                hint: Some("Use a path starting with '/'".to_string()),
            });
        }
        if self.jobs == Some(0) {
            return Err(Error::ConfigParse {
                message: "jobs must be at least 1".to_string(),
                hint: None,
            });
        }
        PatternSet::new(&self.ignore_patterns)?;
        PatternSet::new(&self.no_translate_patterns)?;
        Ok(())
    }

    pub fn roots(&self) -> RootPrefixes {
        RootPrefixes::new(self.root_prefixes.iter().cloned())
    }

    pub fn ignore(&self) -> Result<PatternSet> {
        PatternSet::new(&self.ignore_patterns)
    }

    pub fn no_translate(&self) -> Result<PatternSet> {
        PatternSet::new(&self.no_translate_patterns)
    }

    /// Built-in pyright defaults with `ide_defaults` merged over them.
    pub fn ide_defaults(&self) -> Map<String, Value> {
        let mut merged = defaults::ide_defaults();
        for (key, value) in &self.ide_defaults {
            merged.insert(key.clone(), value.clone());
        }
        merged
    }
}
